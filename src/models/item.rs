//! 单条文本的处理结果

use super::mode::{ScorePair, TransformMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 转换器附带的明细信息
///
/// 键是协作方名称（如 `contractions`），值是任意 JSON，不约定固定结构
pub type DetailMap = BTreeMap<String, serde_json::Value>;

/// 单条文本的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    /// 在原始输入中的位置（从 0 开始）
    pub index: usize,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// 成功与失败两种形态，二者只会出现其一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    Success(ItemSuccess),
    Failure(ItemFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSuccess {
    pub original_text: String,
    pub transformed_text: String,
    pub mode: TransformMode,
    pub target_score: ScorePair,
    pub achieved_score: ScorePair,
    pub processing_time_ms: f64,
    pub original_length: usize,
    pub transformed_length: usize,
    #[serde(default)]
    pub details: DetailMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// 原文（用于排查）
    pub original_text: String,
    pub error_message: String,
}

impl ItemResult {
    pub fn succeeded(index: usize, success: ItemSuccess) -> Self {
        Self {
            index,
            outcome: ItemOutcome::Success(success),
        }
    }

    pub fn failed(
        index: usize,
        original_text: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            index,
            outcome: ItemOutcome::Failure(ItemFailure {
                original_text: original_text.into(),
                error_message: error_message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Success(_))
    }

    pub fn as_success(&self) -> Option<&ItemSuccess> {
        match &self.outcome {
            ItemOutcome::Success(s) => Some(s),
            ItemOutcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ItemFailure> {
        match &self.outcome {
            ItemOutcome::Success(_) => None,
            ItemOutcome::Failure(f) => Some(f),
        }
    }

    /// 原文（两种形态都有）
    pub fn original_text(&self) -> &str {
        match &self.outcome {
            ItemOutcome::Success(s) => &s.original_text,
            ItemOutcome::Failure(f) => &f.original_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_shape() {
        let result = ItemResult::failed(3, "原文", "转换失败");
        assert!(!result.is_success());
        assert!(result.as_success().is_none());
        assert_eq!(result.original_text(), "原文");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["status"], "failure");
        assert_eq!(json["error_message"], "转换失败");
        assert!(json.get("transformed_text").is_none());
    }
}
