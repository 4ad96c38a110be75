//! 批次统计结果（只读，生成后不再修改）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub successful_count: usize,
    pub failed_count: usize,
    /// 没有成功条目时为 None
    pub processing_time: Option<TimingStats>,
    pub accuracy: AccuracyStats,
    pub text_length: LengthStats,
    /// 协作方名称 -> 使用次数
    pub usage: BTreeMap<String, UsageTally>,
    /// 失败条目在输入中的位置
    pub failed_indices: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingStats {
    pub average_ms: f64,
    pub minimum_ms: f64,
    pub maximum_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub average_ai_accuracy: f64,
    pub average_human_accuracy: f64,
    pub overall_accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LengthStats {
    pub average_original_length: f64,
    pub average_transformed_length: f64,
    pub average_length_change: f64,
    pub length_change_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageTally {
    /// 出现在明细中的次数
    pub seen: usize,
    pub applied: usize,
    pub failed: usize,
}

impl BatchStatistics {
    /// 是否有可用的成功样本
    pub fn has_data(&self) -> bool {
        self.successful_count > 0
    }
}
