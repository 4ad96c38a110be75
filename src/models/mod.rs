pub mod batch;
pub mod item;
pub mod loaders;
pub mod mode;
pub mod statistics;

pub use batch::{BatchJob, BatchProgress, BatchStatus, BatchSubmission};
pub use item::{DetailMap, ItemFailure, ItemOutcome, ItemResult, ItemSuccess};
pub use loaders::{load_all_toml_files, load_toml_to_batch_input};
pub use mode::{ScorePair, TransformMode};
pub use statistics::{AccuracyStats, BatchStatistics, LengthStats, TimingStats, UsageTally};

use serde::{Deserialize, Serialize};

/// 一个 TOML 输入文件描述的批次
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchInput {
    pub texts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}
