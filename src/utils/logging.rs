/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::models::{BatchProgress, BatchStatistics, BatchSubmission};
use anyhow::Result;
use std::fs;
use tracing::info;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量改写日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_workers`: 工作线程数
/// - `max_batch_size`: 单批上限
pub fn log_startup(max_workers: usize, max_batch_size: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量文本改写模式");
    info!("📊 工作线程数: {}", max_workers);
    info!("📦 单批上限: {} 条", max_batch_size);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
pub fn log_batch_start(batch_num: usize, total_batches: usize, total_texts: usize, mode: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批文本: {} 条 | 模式: {}", total_texts, mode);
    info!("{}", "=".repeat(60));
}

/// 记录一次进度快照
pub fn log_progress(progress: &BatchProgress) {
    match progress.estimated_remaining_seconds {
        Some(eta) => info!(
            "[批次 {}] ⏳ 进度 {:.1}% ({} 成功 / {} 失败 / 共 {})，预计剩余 {:.1} 秒",
            progress.batch_id,
            progress.progress_percentage,
            progress.completed_count,
            progress.failed_count,
            progress.total_count,
            eta
        ),
        None => info!(
            "[批次 {}] ⏳ 进度 {:.1}% ({} 成功 / {} 失败 / 共 {})",
            progress.batch_id,
            progress.progress_percentage,
            progress.completed_count,
            progress.failed_count,
            progress.total_count
        ),
    }
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, submission: &BatchSubmission) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成 [{}]: 成功 {}/{}，耗时 {:.1} ms",
        batch_num,
        submission.batch_id,
        submission.successful_count,
        submission.total_texts,
        submission.total_processing_time_ms
    );
    log_statistics(&submission.statistics);
    info!("{}", "─".repeat(60));
}

/// 输出统计摘要
pub fn log_statistics(stats: &BatchStatistics) {
    match &stats.processing_time {
        Some(timing) => info!(
            "⏱️ 单条耗时: 平均 {:.2} ms, 最短 {:.2} ms, 最长 {:.2} ms",
            timing.average_ms, timing.minimum_ms, timing.maximum_ms
        ),
        None => info!("⏱️ 单条耗时: 无数据"),
    }
    info!(
        "🎯 准确度: AI {:.2}, 人工 {:.2}, 综合 {:.2}",
        stats.accuracy.average_ai_accuracy,
        stats.accuracy.average_human_accuracy,
        stats.accuracy.overall_accuracy
    );
    info!(
        "📏 长度变化: {:.2} -> {:.2} ({:+.2}%)",
        stats.text_length.average_original_length,
        stats.text_length.average_transformed_length,
        stats.text_length.length_change_percentage
    );
    for (name, tally) in &stats.usage {
        info!(
            "🔧 {}: 生效 {} / 失败 {} / 出现 {}",
            name, tally.applied, tally.failed, tally.seen
        );
    }
    if !stats.failed_indices.is_empty() {
        info!("❌ 失败条目: {:?}", stats.failed_indices);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
