//! 批次注册表
//!
//! 进程内唯一的 批次ID -> 跟踪器 映射，读多写少，用读写锁保护

use crate::error::{AppResult, BatchError};
use crate::models::{BatchJob, BatchProgress};
use crate::orchestrator::tracker::ProgressTracker;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// 批次注册表
#[derive(Debug, Default)]
pub struct BatchRegistry {
    batches: RwLock<HashMap<String, ProgressTracker>>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册新批次，ID 已存在时返回错误且不修改原记录
    pub async fn register(&self, job: BatchJob) -> AppResult<ProgressTracker> {
        let batch_id = job.id().to_string();
        let mut batches = self.batches.write().await;

        if batches.contains_key(&batch_id) {
            warn!("[批次 {}] ⚠️ ID 已存在，拒绝注册", batch_id);
            return Err(BatchError::DuplicateBatchId { batch_id });
        }

        let tracker = ProgressTracker::new(job);
        batches.insert(batch_id.clone(), tracker.clone());
        debug!("[批次 {}] 已注册", batch_id);

        Ok(tracker)
    }

    /// 查找批次
    pub async fn get(&self, batch_id: &str) -> AppResult<ProgressTracker> {
        let batches = self.batches.read().await;
        batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| BatchError::not_found(batch_id))
    }

    pub async fn contains(&self, batch_id: &str) -> bool {
        self.batches.read().await.contains_key(batch_id)
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.batches.read().await.is_empty()
    }

    /// 所有批次的进度快照，按开始时间排序
    pub async fn snapshots(&self) -> Vec<BatchProgress> {
        let trackers: Vec<ProgressTracker> = self.batches.read().await.values().cloned().collect();

        let mut snapshots: Vec<BatchProgress> = trackers.iter().map(|t| t.snapshot()).collect();
        snapshots.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.batch_id.cmp(&b.batch_id))
        });
        snapshots
    }

    /// 删除开始时间距今不少于 `max_age` 的批次（不论状态），返回删除数量
    ///
    /// 仍在运行的批次也可能被删除；它的处理会继续，只是无法再查询进度
    pub async fn reap(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut batches = self.batches.write().await;
        let before = batches.len();

        batches.retain(|batch_id, tracker| {
            let keep = now.saturating_duration_since(tracker.started_at()) < max_age;
            if !keep {
                debug!("[批次 {}] 已过期，移除", batch_id);
            }
            keep
        });

        let removed = before - batches.len();
        info!("🧹 清理了 {} 条过期批次记录", removed);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatchStatus;

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = BatchRegistry::new();
        let tracker = registry.register(BatchJob::new("b1", 3)).await.unwrap();
        tracker.record_item(true);

        let fetched = registry.get("b1").await.unwrap();
        assert_eq!(fetched.snapshot().completed_count, 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let registry = BatchRegistry::new();
        let first = registry.register(BatchJob::new("dup", 1)).await.unwrap();
        first.complete();

        let err = registry.register(BatchJob::new("dup", 5)).await.unwrap_err();
        assert!(matches!(err, BatchError::DuplicateBatchId { .. }));

        // 原记录没有被覆盖
        let kept = registry.get("dup").await.unwrap();
        assert_eq!(kept.total_items(), 1);
        assert_eq!(kept.status(), BatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry = BatchRegistry::new();
        let err = registry.get("nope").await.unwrap_err();
        assert!(matches!(err, BatchError::NotFound { ref batch_id } if batch_id == "nope"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_by_age() {
        let registry = BatchRegistry::new();
        registry.register(BatchJob::new("old", 1)).await.unwrap();

        tokio::time::advance(Duration::from_secs(3600)).await;
        registry.register(BatchJob::new("new", 1)).await.unwrap();

        let removed = registry.reap(Duration::from_secs(1800)).await;
        assert_eq!(removed, 1);
        assert!(!registry.contains("old").await);
        assert!(registry.contains("new").await);
    }

    #[tokio::test]
    async fn test_reap_zero_removes_everything() {
        let registry = BatchRegistry::new();
        registry.register(BatchJob::new("a", 1)).await.unwrap();
        let running = registry.register(BatchJob::new("b", 2)).await.unwrap();
        running.record_item(true);

        assert_eq!(registry.reap(Duration::ZERO).await, 2);
        assert!(registry.is_empty().await);

        // 被移除的跟踪器仍然可以继续使用
        assert!(running.record_item(false));
    }

    #[tokio::test]
    async fn test_snapshots_sorted() {
        let registry = BatchRegistry::new();
        registry.register(BatchJob::new("x", 1)).await.unwrap();
        registry.register(BatchJob::new("y", 1)).await.unwrap();

        let snapshots = registry.snapshots().await;
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[0].started_at <= snapshots[1].started_at);
    }
}
