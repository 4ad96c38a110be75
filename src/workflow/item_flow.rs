//! 条目处理流程 - 流程层
//!
//! 核心职责：定义"一条文本"的完整处理流程
//!
//! 流程顺序：
//! 1. 空文本检查
//! 2. 在阻塞线程中调用转换器（CPU 密集，不占用异步线程）
//! 3. 计时、计算目标 / 实际分数、组装成功结果

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::UnitError;
use crate::infrastructure::worker_pool::join_error_message;
use crate::models::{ItemSuccess, ScorePair, TransformMode};
use crate::services::TextTransform;
use crate::utils::{round_to, truncate_text};
use crate::workflow::item_ctx::ItemCtx;

/// 估算分数时允许的最大偏差
const MAX_SCORE_VARIATION: f64 = 3.0;

/// 条目处理流程
///
/// - 编排单条文本的处理
/// - 不持有任何批次状态
/// - 只依赖转换能力（services）
pub struct ItemFlow {
    transform: Arc<dyn TextTransform>,
    verbose_logging: bool,
}

impl ItemFlow {
    /// 创建新的条目处理流程
    pub fn new(transform: Arc<dyn TextTransform>, verbose_logging: bool) -> Self {
        Self {
            transform,
            verbose_logging,
        }
    }

    /// 转换器名称
    pub fn transform_name(&self) -> &str {
        self.transform.name()
    }

    pub async fn run(
        &self,
        text: String,
        mode: TransformMode,
        ctx: &ItemCtx,
    ) -> Result<ItemSuccess, UnitError> {
        if text.trim().is_empty() {
            warn!("{} ⚠️ 文本为空，跳过", ctx);
            return Err(UnitError::Failed("文本为空".to_string()));
        }

        if self.verbose_logging {
            info!("{} 原文: {}", ctx, truncate_text(&text, 80));
        }

        let started = Instant::now();
        let transform = self.transform.clone();
        let input = text.clone();

        let output = tokio::task::spawn_blocking(move || transform.transform(&input, mode))
            .await
            .map_err(|e| UnitError::Panicked(join_error_message(e)))?
            .map_err(|e| UnitError::Failed(format!("{:#}", e)))?;

        let processing_time_ms = round_to(started.elapsed().as_secs_f64() * 1000.0, 1);

        let target_score = mode.target_scores();
        let achieved_score = output
            .achieved_score
            .unwrap_or_else(|| estimate_achieved_score(target_score, &output.text));

        debug!(
            "{} ✓ 完成，耗时 {:.1} ms，长度 {} -> {}",
            ctx,
            processing_time_ms,
            text.chars().count(),
            output.text.chars().count()
        );

        Ok(ItemSuccess {
            original_length: text.chars().count(),
            transformed_length: output.text.chars().count(),
            original_text: text,
            transformed_text: output.text,
            mode,
            target_score,
            achieved_score,
            processing_time_ms,
            details: output.details,
        })
    }
}

/// 转换器没有给出分数时的估算
///
/// 在目标分数上叠加一个 [-3, 3] 的偏差（由改写后文本的 FNV-1a 哈希决定，
/// 跨版本、跨平台都可复现），两轴各自限制在 [0, 100]，再归一化到总和 100，保留一位小数
pub fn estimate_achieved_score(target: ScorePair, transformed: &str) -> ScorePair {
    let unit = (fnv1a(transformed.as_bytes()) % 10_001) as f64 / 10_000.0;
    let variation = (unit * 2.0 - 1.0) * MAX_SCORE_VARIATION;

    let mut ai = (target.ai_generated + variation).clamp(0.0, 100.0);
    let mut human = (target.human_written - variation).clamp(0.0, 100.0);

    let total = ai + human;
    if total > 0.0 {
        ai = ai / total * 100.0;
        human = human / total * 100.0;
    }

    ScorePair::new(round_to(ai, 1), round_to(human, 1))
}

/// 64 位 FNV-1a
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
