use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// 处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    /// 轻度改写
    Fast,
    /// 中度改写
    #[default]
    Balanced,
    /// 最大强度改写
    Aggressive,
}

/// 两个检测维度上的分数（AI 生成 / 人工撰写，单位：百分比）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScorePair {
    pub ai_generated: f64,
    pub human_written: f64,
}

impl ScorePair {
    pub fn new(ai_generated: f64, human_written: f64) -> Self {
        Self {
            ai_generated,
            human_written,
        }
    }
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [
        TransformMode::Fast,
        TransformMode::Balanced,
        TransformMode::Aggressive,
    ];

    /// 获取标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            TransformMode::Fast => "fast",
            TransformMode::Balanced => "balanced",
            TransformMode::Aggressive => "aggressive",
        }
    }

    /// 该模式的目标分数
    pub fn target_scores(self) -> ScorePair {
        match self {
            TransformMode::Fast => ScorePair::new(75.0, 25.0),
            TransformMode::Balanced => ScorePair::new(50.0, 50.0),
            TransformMode::Aggressive => ScorePair::new(0.0, 100.0),
        }
    }

    /// 改写强度（0.0 ~ 1.0），供转换器参考
    pub fn intensity(self) -> f64 {
        match self {
            TransformMode::Fast => 0.4,
            TransformMode::Balanced => 0.7,
            TransformMode::Aggressive => 1.0,
        }
    }
}

impl std::str::FromStr for TransformMode {
    type Err = ValidationError;

    /// 忽略大小写和首尾空白
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(TransformMode::Fast),
            "balanced" => Ok(TransformMode::Balanced),
            "aggressive" => Ok(TransformMode::Aggressive),
            _ => Err(ValidationError::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
