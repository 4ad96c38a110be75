//! 批次协调器 - 编排层
//!
//! ## 职责
//!
//! 一个批次从提交到完成的全过程：
//!
//! 1. **输入校验**：空批次 / 超出上限直接拒绝，不创建任何记录
//! 2. **注册批次**：在派发任何任务之前写入注册表
//! 3. **并发派发**：每条文本作为独立任务交给工作池
//! 4. **实时计数**：每个任务结束立即更新跟踪器
//! 5. **结果整理**：按输入顺序排序，计算统计
//! 6. **最终状态**：统计成功 -> Completed，统计失败 -> Failed
//!
//! 单条文本失败只影响那一条；只有统计阶段出错才会让整个批次失败。

use crate::config::Config;
use crate::error::{AppResult, BatchError, ValidationError};
use crate::infrastructure::{UnitOutcome, WorkerPool};
use crate::models::{
    BatchJob, BatchProgress, BatchSubmission, ItemResult, ItemSuccess, TransformMode,
};
use crate::orchestrator::registry::BatchRegistry;
use crate::orchestrator::tracker::ProgressTracker;
use crate::services::{StatisticsAggregator, TextTransform};
use crate::utils::{hours_to_duration, round_to};
use crate::workflow::{ItemCtx, ItemFlow};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 批次协调器
pub struct BatchCoordinator {
    registry: Arc<BatchRegistry>,
    pool: WorkerPool,
    flow: Arc<ItemFlow>,
    max_batch_size: usize,
    id_seq: AtomicU64,
}

impl BatchCoordinator {
    /// 使用独立的注册表创建协调器
    pub fn new(transform: Arc<dyn TextTransform>, config: &Config) -> Self {
        Self::with_registry(transform, config, Arc::new(BatchRegistry::new()))
    }

    /// 使用共享的注册表创建协调器
    pub fn with_registry(
        transform: Arc<dyn TextTransform>,
        config: &Config,
        registry: Arc<BatchRegistry>,
    ) -> Self {
        let pool = WorkerPool::new(config.max_workers)
            .with_unit_timeout(config.unit_timeout_secs.map(Duration::from_secs));

        Self {
            registry,
            pool,
            flow: Arc::new(ItemFlow::new(transform, config.verbose_logging)),
            max_batch_size: config.max_batch_size,
            id_seq: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<BatchRegistry> {
        &self.registry
    }

    /// 工作池并发数
    pub fn pool_width(&self) -> usize {
        self.pool.width()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// 按模式名称提交（模式名称不合法时返回校验错误）
    pub async fn submit_with_mode_name(
        &self,
        texts: Vec<String>,
        mode: &str,
        batch_id: Option<String>,
    ) -> AppResult<BatchSubmission> {
        let mode: TransformMode = mode.parse()?;
        self.submit(texts, mode, batch_id).await
    }

    /// 提交并等待一个批次处理完成
    ///
    /// # 参数
    /// - `texts`: 待处理文本（顺序即结果顺序）
    /// - `mode`: 处理模式
    /// - `batch_id`: 可选的批次ID，不提供时自动生成 `batch_<毫秒>`
    ///
    /// # 返回
    /// 成功时结果数量等于输入数量；校验失败、ID 冲突、统计失败时返回错误
    pub async fn submit(
        &self,
        texts: Vec<String>,
        mode: TransformMode,
        batch_id: Option<String>,
    ) -> AppResult<BatchSubmission> {
        self.validate(&texts)?;

        let total = texts.len();
        let tracker = match batch_id {
            Some(id) => self.registry.register(BatchJob::new(id, total)).await?,
            None => self.register_generated(total).await?,
        };
        let batch_id = tracker.batch_id();

        info!(
            "[批次 {}] 🚀 开始处理 {} 条文本 (模式: {}, 并发: {}, 转换器: {})",
            batch_id,
            total,
            mode,
            self.pool.width(),
            self.flow.transform_name()
        );

        let outcomes = self.dispatch(&batch_id, &texts, mode, &tracker).await;
        let results = collect_results(&batch_id, &texts, outcomes);

        let statistics = match StatisticsAggregator::from_results(&results) {
            Ok(statistics) => statistics,
            Err(e) => {
                error!("[批次 {}] ❌ 统计失败: {}", batch_id, e);
                tracker.fail(e.to_string());
                return Err(BatchError::Aggregation {
                    batch_id,
                    source: e,
                });
            }
        };

        tracker.complete();

        let submission = BatchSubmission {
            success: true,
            total_texts: total,
            successful_count: statistics.successful_count,
            failed_count: statistics.failed_count,
            total_processing_time_ms: round_to(tracker.elapsed().as_secs_f64() * 1000.0, 1),
            batch_id,
            mode,
            results,
            statistics,
        };

        info!(
            "[批次 {}] ✅ 处理完成: 成功 {}/{}, 失败 {}, 耗时 {:.1} ms",
            submission.batch_id,
            submission.successful_count,
            submission.total_texts,
            submission.failed_count,
            submission.total_processing_time_ms
        );

        Ok(submission)
    }

    /// 查询批次进度
    pub async fn get_status(&self, batch_id: &str) -> AppResult<BatchProgress> {
        Ok(self.registry.get(batch_id).await?.snapshot())
    }

    /// 所有仍被跟踪的批次
    pub async fn active_batches(&self) -> Vec<BatchProgress> {
        self.registry.snapshots().await
    }

    /// 清理开始时间超过 `max_age_hours` 小时的批次记录，返回删除数量
    ///
    /// 负数或 NaN 按 0 小时处理；大到无法表示的时长（包括无穷大）不清理任何记录
    pub async fn reap_older_than(&self, max_age_hours: f64) -> usize {
        if max_age_hours.is_nan() || max_age_hours < 0.0 {
            warn!("⚠️ 无效的保留时长 {}，按 0 小时处理", max_age_hours);
            return self.registry.reap(Duration::ZERO).await;
        }
        match hours_to_duration(max_age_hours) {
            Some(max_age) => self.registry.reap(max_age).await,
            None => {
                info!("🧹 保留时长 {} 小时超出范围，跳过清理", max_age_hours);
                0
            }
        }
    }

    fn validate(&self, texts: &[String]) -> Result<(), ValidationError> {
        if texts.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if texts.len() > self.max_batch_size {
            return Err(ValidationError::BatchTooLarge {
                size: texts.len(),
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// 自动生成ID并注册；同一毫秒内冲突时追加序号
    async fn register_generated(&self, total: usize) -> AppResult<ProgressTracker> {
        let base = format!("batch_{}", chrono::Utc::now().timestamp_millis());
        let mut candidate = base.clone();

        loop {
            match self.registry.register(BatchJob::new(&candidate, total)).await {
                Err(BatchError::DuplicateBatchId { .. }) => {
                    let seq = self.id_seq.fetch_add(1, Ordering::Relaxed) + 1;
                    candidate = format!("{}_{}", base, seq);
                }
                other => return other,
            }
        }
    }

    /// 把每条文本交给工作池，任务结束时更新计数
    async fn dispatch(
        &self,
        batch_id: &str,
        texts: &[String],
        mode: TransformMode,
        tracker: &ProgressTracker,
    ) -> Vec<UnitOutcome<ItemSuccess>> {
        let total = texts.len();
        let flow = self.flow.clone();
        let unit_batch_id = batch_id.to_string();

        let unit = move |index: usize, text: String| {
            let flow = flow.clone();
            let ctx = ItemCtx::new(unit_batch_id.clone(), index, total);
            async move { flow.run(text, mode, &ctx).await }
        };

        let on_complete = |outcome: &UnitOutcome<ItemSuccess>| {
            let success = outcome.result.is_ok();
            if !tracker.record_item(success) {
                warn!(
                    "[批次 {}] ⚠️ 文本 {} 的结果未计入（批次已结束或计数已满）",
                    batch_id, outcome.index
                );
            }
            debug!(
                "[批次 {}] 文本 {} 完成: {}",
                batch_id,
                outcome.index,
                if success { "成功" } else { "失败" }
            );
        };

        self.pool.execute(texts.to_vec(), unit, on_complete).await
    }
}

/// 转成结果列表并恢复输入顺序
fn collect_results(
    batch_id: &str,
    texts: &[String],
    outcomes: Vec<UnitOutcome<ItemSuccess>>,
) -> Vec<ItemResult> {
    let mut results: Vec<ItemResult> = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(success) => ItemResult::succeeded(outcome.index, success),
            Err(e) => {
                warn!("[批次 {}] 文本 {} 处理失败: {}", batch_id, outcome.index, e);
                let original = texts.get(outcome.index).cloned().unwrap_or_default();
                ItemResult::failed(outcome.index, original, e.to_string())
            }
        })
        .collect();

    results.sort_by_key(|r| r.index);
    results
}
