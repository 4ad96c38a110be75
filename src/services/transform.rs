//! 文本转换接口 - 业务能力层
//!
//! 批量编排只通过这个 trait 调用具体的改写实现，不关心改写细节

use crate::models::{DetailMap, ScorePair, TransformMode};
use anyhow::Result;

/// 单条文本转换的输出
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformOutput {
    /// 改写后的文本
    pub text: String,
    /// 协作方明细，键值结构不固定
    pub details: DetailMap,
    /// 实现方能自行测得分数时填写，否则由编排层估算
    pub achieved_score: Option<ScorePair>,
}

impl TransformOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// 追加一条明细
    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn with_achieved_score(mut self, score: ScorePair) -> Self {
        self.achieved_score = Some(score);
        self
    }
}

/// 文本转换能力
///
/// 会被多个工作线程同时调用，实现内部不能持有可变共享状态
pub trait TextTransform: Send + Sync {
    /// 实现名称（仅用于日志）
    fn name(&self) -> &str {
        "custom"
    }

    /// 转换一条文本
    fn transform(&self, text: &str, mode: TransformMode) -> Result<TransformOutput>;
}

impl<F> TextTransform for F
where
    F: Fn(&str, TransformMode) -> Result<TransformOutput> + Send + Sync,
{
    fn transform(&self, text: &str, mode: TransformMode) -> Result<TransformOutput> {
        self(text, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_as_transform() {
        let upper = |text: &str, _mode: TransformMode| -> Result<TransformOutput> {
            Ok(TransformOutput::new(text.to_uppercase()).with_detail("upper", json!({"applied": true})))
        };

        let output = upper.transform("abc", TransformMode::Fast).unwrap();
        assert_eq!(output.text, "ABC");
        assert_eq!(output.details["upper"]["applied"], true);
        assert!(output.achieved_score.is_none());
        assert_eq!(upper.name(), "custom");
    }
}
