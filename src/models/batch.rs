//! 批次记录与状态快照

use super::item::ItemResult;
use super::mode::TransformMode;
use super::statistics::BatchStatistics;
use crate::utils::round_to;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// 批次状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BatchStatus::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一个已提交批次的跟踪记录
///
/// 字段不对外可写，计数器只能通过 `record_item` 单调递增，
/// 状态只能通过 `finish` 离开 Processing 一次。
/// 并发访问由外层的 `ProgressTracker` 负责加锁。
#[derive(Debug, Clone)]
pub struct BatchJob {
    id: String,
    total_items: usize,
    completed_count: usize,
    failed_count: usize,
    status: BatchStatus,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    finished_at: Option<Instant>,
    finished_at_utc: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl BatchJob {
    /// 创建处于 Processing 状态的新批次
    pub fn new(id: impl Into<String>, total_items: usize) -> Self {
        Self {
            id: id.into(),
            total_items,
            completed_count: 0,
            failed_count: 0,
            status: BatchStatus::Processing,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            finished_at: None,
            finished_at_utc: None,
            error: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 已结束（成功或失败）的条目数
    pub fn items_done(&self) -> usize {
        self.completed_count + self.failed_count
    }

    /// 记录一条文本的结果
    ///
    /// 批次已结束或计数已满时不做任何修改并返回 false
    pub fn record_item(&mut self, success: bool) -> bool {
        if self.status.is_terminal() || self.items_done() >= self.total_items {
            return false;
        }
        if success {
            self.completed_count += 1;
        } else {
            self.failed_count += 1;
        }
        true
    }

    /// 结束批次，只有第一次调用生效
    pub fn finish(&mut self, status: BatchStatus, error: Option<String>) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.finished_at = Some(Instant::now());
        self.finished_at_utc = Some(Utc::now());
        self.error = error;
        true
    }

    /// 批次已运行（或运行了）多久
    pub fn elapsed_at(&self, now: Instant) -> std::time::Duration {
        self.finished_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at)
    }

    /// 生成某一时刻的进度快照
    pub fn progress_at(&self, now: Instant) -> BatchProgress {
        let done = self.items_done();
        let progress_percentage = if self.total_items > 0 {
            round_to(100.0 * done as f64 / self.total_items as f64, 1)
        } else {
            0.0
        };

        let elapsed_seconds = self.elapsed_at(now).as_secs_f64();

        // 尚无任何条目完成时不给出估计
        let estimated_remaining_seconds = if self.status == BatchStatus::Processing && done > 0 {
            let remaining = self.total_items.saturating_sub(done);
            Some(round_to(elapsed_seconds / done as f64 * remaining as f64, 2))
        } else {
            None
        };

        BatchProgress {
            success: true,
            batch_id: self.id.clone(),
            status: self.status,
            total_count: self.total_items,
            completed_count: self.completed_count,
            failed_count: self.failed_count,
            progress_percentage,
            elapsed_seconds: round_to(elapsed_seconds, 2),
            estimated_remaining_seconds,
            started_at: self.started_at_utc,
            finished_at: self.finished_at_utc,
            error: self.error.clone(),
        }
    }
}

/// 批次进度快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// 查询结果标志，能拿到快照即为 true（查不到时返回 `NotFound`）
    pub success: bool,
    pub batch_id: String,
    pub status: BatchStatus,
    pub total_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub progress_percentage: f64,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_remaining_seconds: Option<f64>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 一次批量提交的完整结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSubmission {
    /// 批次整体是否成功；失败时 `submit` 直接返回错误，因此这里恒为 true
    pub success: bool,
    pub batch_id: String,
    pub mode: TransformMode,
    pub total_texts: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    /// 按输入顺序排列
    pub results: Vec<ItemResult>,
    pub statistics: BatchStatistics,
    pub total_processing_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_counters_never_exceed_total() {
        let mut job = BatchJob::new("b", 2);
        assert!(job.record_item(true));
        assert!(job.record_item(false));
        assert!(!job.record_item(true));
        assert_eq!(job.items_done(), 2);
        assert_eq!(job.completed_count(), 1);
        assert_eq!(job.failed_count(), 1);
    }

    #[test]
    fn test_finish_is_terminal() {
        let mut job = BatchJob::new("b", 1);
        assert!(!job.finish(BatchStatus::Processing, None));
        assert!(job.finish(BatchStatus::Completed, None));
        assert!(!job.finish(BatchStatus::Failed, Some("late".to_string())));
        assert_eq!(job.status(), BatchStatus::Completed);
        assert!(job.error().is_none());
        assert!(!job.record_item(true));
    }

    #[test]
    fn test_progress_without_done_items_has_no_estimate() {
        let job = BatchJob::new("b", 4);
        let progress = job.progress_at(job.started_at() + Duration::from_secs(10));
        assert_eq!(progress.progress_percentage, 0.0);
        assert!(progress.estimated_remaining_seconds.is_none());
    }

    #[test]
    fn test_progress_estimate() {
        let mut job = BatchJob::new("b", 3);
        job.record_item(true);
        let progress = job.progress_at(job.started_at() + Duration::from_secs(4));
        assert_eq!(progress.progress_percentage, 33.3);
        // 4 秒完成 1 条，剩余 2 条
        assert_eq!(progress.estimated_remaining_seconds, Some(8.0));
    }

    #[test]
    fn test_finished_batch_has_no_estimate() {
        let mut job = BatchJob::new("b", 1);
        job.record_item(false);
        job.finish(BatchStatus::Completed, None);
        let progress = job.progress_at(Instant::now());
        assert_eq!(progress.progress_percentage, 100.0);
        assert!(progress.estimated_remaining_seconds.is_none());
        assert!(progress.finished_at.is_some());
    }

    #[test]
    fn test_progress_serializes_success_flag() {
        let job = BatchJob::new("b", 2);
        let json = serde_json::to_value(job.progress_at(Instant::now())).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["status"], "processing");
        assert!(json.get("estimated_remaining_seconds").is_none());
    }
}
