//! 批次进度跟踪器
//!
//! 一个批次只有一把锁，计数器和状态一起加锁，
//! 因此快照永远不会读到"完成数已加、失败数未加"这样的中间状态。

use crate::models::{BatchJob, BatchProgress, BatchStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// 批次进度跟踪器（可廉价克隆，所有克隆共享同一份记录）
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    job: Arc<Mutex<BatchJob>>,
}

impl ProgressTracker {
    pub fn new(job: BatchJob) -> Self {
        Self {
            job: Arc::new(Mutex::new(job)),
        }
    }

    // 锁内只做计数，不会在持锁期间 panic
    fn lock(&self) -> MutexGuard<'_, BatchJob> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn batch_id(&self) -> String {
        self.lock().id().to_string()
    }

    pub fn total_items(&self) -> usize {
        self.lock().total_items()
    }

    pub fn status(&self) -> BatchStatus {
        self.lock().status()
    }

    pub fn started_at(&self) -> Instant {
        self.lock().started_at()
    }

    /// 从开始到结束（或到现在）的时长
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed_at(Instant::now())
    }

    /// 记录一条文本的结果
    pub fn record_item(&self, success: bool) -> bool {
        self.lock().record_item(success)
    }

    /// 标记批次完成
    pub fn complete(&self) -> bool {
        self.lock().finish(BatchStatus::Completed, None)
    }

    /// 标记批次失败并记录原因
    pub fn fail(&self, error: impl Into<String>) -> bool {
        self.lock().finish(BatchStatus::Failed, Some(error.into()))
    }

    /// 当前进度快照
    pub fn snapshot(&self) -> BatchProgress {
        self.lock().progress_at(Instant::now())
    }

    /// 拷贝当前记录（只读）
    pub fn job(&self) -> BatchJob {
        self.lock().clone()
    }
}
