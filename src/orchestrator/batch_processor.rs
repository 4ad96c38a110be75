//! 批量任务运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行程序的入口，负责把输入目录中的批次逐个交给协调器。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建改写器和协调器
//! 2. **批量加载**：扫描并加载所有待处理的 TOML 文件（`Vec<BatchInput>`）
//! 3. **进度观察**：批次运行期间后台定时输出进度快照
//! 4. **结果落盘**：每个批次写一份 `<batch_id>.json`
//! 5. **过期清理**：全部完成后清理过期的批次记录
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单条文本的细节
//! - **向下委托**：批次内的并发由 `BatchCoordinator` 负责

use crate::config::Config;
use crate::models::{BatchInput, BatchStatus, BatchSubmission, TransformMode};
use crate::orchestrator::coordinator::BatchCoordinator;
use crate::services::ContractionRewriter;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_progress, log_startup,
    print_final_stats,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    coordinator: Arc<BatchCoordinator>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        log_startup(config.max_workers, config.max_batch_size);

        let rewriter = ContractionRewriter::new().context("改写器初始化失败")?;
        let coordinator = Arc::new(BatchCoordinator::new(Arc::new(rewriter), &config));

        Ok(Self {
            config,
            coordinator,
        })
    }

    /// 使用已有的协调器（测试或嵌入时使用）
    pub fn with_coordinator(config: Config, coordinator: Arc<BatchCoordinator>) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &Arc<BatchCoordinator> {
        &self.coordinator
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        let inputs = self.load_inputs().await?;

        if inputs.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(RunSummary::default());
        }

        info!("✓ 找到 {} 个待处理的批次\n", inputs.len());

        let mut summary = RunSummary {
            total: inputs.len(),
            ..Default::default()
        };

        let total_batches = inputs.len();
        for (idx, input) in inputs.into_iter().enumerate() {
            let batch_num = idx + 1;
            match self.process_input(input, batch_num, total_batches).await {
                Ok(submission) => {
                    summary.success += 1;
                    summary.texts_succeeded += submission.successful_count;
                    summary.texts_failed += submission.failed_count;
                }
                Err(e) => {
                    error!("❌ 第 {} 批处理失败: {:#}", batch_num, e);
                    summary.failed += 1;
                }
            }
        }

        print_final_stats(
            summary.success,
            summary.failed,
            summary.total,
            &self.config.output_log_file,
        );

        let removed = self
            .coordinator
            .reap_older_than(self.config.reap_max_age_hours)
            .await;
        summary.reaped = removed;

        Ok(summary)
    }

    /// 加载输入
    async fn load_inputs(&self) -> Result<Vec<BatchInput>> {
        info!("\n📁 正在扫描待处理的批次...");
        crate::models::load_all_toml_files(&self.config.input_folder).await
    }

    /// 处理一个输入文件
    async fn process_input(
        &self,
        input: BatchInput,
        batch_num: usize,
        total_batches: usize,
    ) -> Result<BatchSubmission> {
        let mode_name = input
            .mode
            .clone()
            .unwrap_or_else(|| self.config.default_mode.clone());
        let mode: TransformMode = mode_name
            .parse()
            .with_context(|| format!("文件 {:?} 的模式无效", input.file_path))?;

        log_batch_start(batch_num, total_batches, input.texts.len(), mode.as_str());

        let coordinator = self.coordinator.clone();
        let texts = input.texts;
        let batch_id = input.batch_id;
        let mut handle =
            tokio::spawn(async move { coordinator.submit(texts, mode, batch_id).await });

        // 批次运行期间定时输出进度
        let mut ticker = tokio::time::interval(Duration::from_millis(
            self.config.progress_interval_ms.max(1),
        ));
        ticker.tick().await;

        let submission = loop {
            tokio::select! {
                joined = &mut handle => {
                    break joined.context("批次任务异常退出")??;
                }
                _ = ticker.tick() => {
                    for progress in self.coordinator.active_batches().await {
                        if progress.status == BatchStatus::Processing {
                            log_progress(&progress);
                        }
                    }
                }
            }
        };

        log_batch_complete(batch_num, &submission);
        self.write_output(&submission).await?;

        Ok(submission)
    }

    /// 写出结果 JSON
    async fn write_output(&self, submission: &BatchSubmission) -> Result<PathBuf> {
        let folder = PathBuf::from(&self.config.output_folder);
        tokio::fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", folder.display()))?;

        let path = folder.join(format!("{}.json", submission.batch_id));
        let content = serde_json::to_string_pretty(submission)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入结果文件: {}", path.display()))?;

        info!("💾 结果已保存至: {}", path.display());
        Ok(path)
    }
}

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 批次总数
    pub total: usize,
    /// 成功的批次
    pub success: usize,
    /// 失败的批次
    pub failed: usize,
    pub texts_succeeded: usize,
    pub texts_failed: usize,
    /// 清理掉的批次记录
    pub reaped: usize,
}
