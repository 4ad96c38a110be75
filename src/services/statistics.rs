//! 批次统计 - 业务能力层
//!
//! 纯函数：相同输入永远得到相同输出，不读写任何共享状态

use crate::error::AggregationError;
use crate::models::{
    AccuracyStats, BatchStatistics, ItemFailure, ItemOutcome, ItemResult, ItemSuccess,
    LengthStats, TimingStats, UsageTally,
};
use crate::utils::round_to;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// 统计聚合器
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// 从完整的结果列表计算统计（内部先按成功 / 失败拆分）
    pub fn from_results(results: &[ItemResult]) -> Result<BatchStatistics, AggregationError> {
        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for result in results {
            match &result.outcome {
                ItemOutcome::Success(s) => successful.push((result.index, s)),
                ItemOutcome::Failure(f) => failed.push((result.index, f)),
            }
        }
        Self::aggregate(&successful, &failed)
    }

    /// 计算统计
    ///
    /// # 参数
    /// - `successful`: (位置, 成功结果)
    /// - `failed`: (位置, 失败结果)
    ///
    /// # 返回
    /// 没有成功条目时所有数值为 0、耗时为 None；
    /// 只有输入中出现 NaN / 无穷大时才返回错误
    pub fn aggregate(
        successful: &[(usize, &ItemSuccess)],
        failed: &[(usize, &ItemFailure)],
    ) -> Result<BatchStatistics, AggregationError> {
        for (index, item) in successful {
            check_finite(*index, item)?;
        }

        let mut failed_indices: Vec<usize> = failed.iter().map(|(index, _)| *index).collect();
        failed_indices.sort_unstable();

        let mut stats = BatchStatistics {
            successful_count: successful.len(),
            failed_count: failed.len(),
            failed_indices,
            ..Default::default()
        };

        if successful.is_empty() {
            return Ok(stats);
        }

        let items: Vec<&ItemSuccess> = successful.iter().map(|(_, item)| *item).collect();

        stats.processing_time = Some(timing_stats(&items));
        stats.accuracy = accuracy_stats(&items);
        stats.text_length = length_stats(&items);
        stats.usage = usage_tally(&items);

        Ok(stats)
    }
}

fn check_finite(index: usize, item: &ItemSuccess) -> Result<(), AggregationError> {
    let fields = [
        ("processing_time_ms", item.processing_time_ms),
        ("target_score.ai_generated", item.target_score.ai_generated),
        ("target_score.human_written", item.target_score.human_written),
        ("achieved_score.ai_generated", item.achieved_score.ai_generated),
        ("achieved_score.human_written", item.achieved_score.human_written),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(AggregationError::NonFiniteValue {
                index,
                field,
                value,
            });
        }
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn timing_stats(items: &[&ItemSuccess]) -> TimingStats {
    let times = || items.iter().map(|i| i.processing_time_ms);
    TimingStats {
        average_ms: round_to(mean(times()), 2),
        minimum_ms: round_to(times().fold(f64::INFINITY, f64::min), 2),
        maximum_ms: round_to(times().fold(f64::NEG_INFINITY, f64::max), 2),
    }
}

/// 单轴准确度 = 100 - |实际 - 目标|
fn accuracy_stats(items: &[&ItemSuccess]) -> AccuracyStats {
    let ai = mean(
        items
            .iter()
            .map(|i| 100.0 - (i.achieved_score.ai_generated - i.target_score.ai_generated).abs()),
    );
    let human = mean(items.iter().map(|i| {
        100.0 - (i.achieved_score.human_written - i.target_score.human_written).abs()
    }));

    AccuracyStats {
        average_ai_accuracy: round_to(ai, 2),
        average_human_accuracy: round_to(human, 2),
        overall_accuracy: round_to((ai + human) / 2.0, 2),
    }
}

fn length_stats(items: &[&ItemSuccess]) -> LengthStats {
    let original = mean(items.iter().map(|i| i.original_length as f64));
    let transformed = mean(items.iter().map(|i| i.transformed_length as f64));
    let change = transformed - original;

    LengthStats {
        average_original_length: round_to(original, 2),
        average_transformed_length: round_to(transformed, 2),
        average_length_change: round_to(change, 2),
        length_change_percentage: if original > 0.0 {
            round_to(change / original * 100.0, 2)
        } else {
            0.0
        },
    }
}

/// 按明细键统计使用次数，未知的键同样计入
fn usage_tally(items: &[&ItemSuccess]) -> BTreeMap<String, UsageTally> {
    let mut usage: BTreeMap<String, UsageTally> = BTreeMap::new();

    for item in items {
        for (name, detail) in &item.details {
            let tally = usage.entry(name.clone()).or_default();
            tally.seen += 1;
            if detail_applied(detail) {
                tally.applied += 1;
            } else if detail_failed(detail) {
                tally.failed += 1;
            }
        }
    }

    usage
}

fn detail_applied(detail: &JsonValue) -> bool {
    match detail {
        JsonValue::Bool(applied) => *applied,
        JsonValue::Object(map) => map
            .get("applied")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        _ => false,
    }
}

fn detail_failed(detail: &JsonValue) -> bool {
    match detail.get("error") {
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => false,
        Some(JsonValue::String(msg)) => !msg.is_empty(),
        Some(_) => true,
    }
}
