//! 错误类型
//!
//! 批次级错误（校验、聚合、查询）以 `BatchError` 的形式返回给调用方；
//! 单条文本的错误（`UnitError`）永远不会越过工作池边界，只会被转成失败的 `ItemResult`。

use thiserror::Error;

/// 批次级错误
#[derive(Debug, Error)]
pub enum BatchError {
    /// 输入校验失败（派发前，不会创建任何批次记录）
    #[error("输入校验失败: {0}")]
    Validation(#[from] ValidationError),

    /// 批次不存在或已被清理
    #[error("批次不存在: {batch_id}")]
    NotFound { batch_id: String },

    /// 批次 ID 已被占用
    #[error("批次 ID 已存在: {batch_id}")]
    DuplicateBatchId { batch_id: String },

    /// 统计聚合失败（整个批次标记为 Failed）
    #[error("批次 {batch_id} 统计失败: {source}")]
    Aggregation {
        batch_id: String,
        #[source]
        source: AggregationError,
    },
}

/// 输入校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 没有提供任何文本
    #[error("没有提供待处理的文本")]
    EmptyBatch,

    /// 批次过大
    #[error("批次过大: {size} 条文本，最多允许 {max} 条")]
    BatchTooLarge { size: usize, max: usize },

    /// 无法识别的处理模式
    #[error("无效的处理模式 '{mode}'，只支持 fast / balanced / aggressive")]
    InvalidMode { mode: String },
}

/// 统计聚合错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// 输入中出现了 NaN / 无穷大
    #[error("第 {index} 条结果的字段 {field} 不是有限数值: {value}")]
    NonFiniteValue {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

/// 单条文本处理错误（只存在于工作池内部和失败结果中）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// 转换器返回了错误
    #[error("{0}")]
    Failed(String),

    /// 处理过程中发生 panic
    #[error("处理线程崩溃: {0}")]
    Panicked(String),

    /// 超过单条处理时限
    #[error("处理超时 ({millis} ms)")]
    TimedOut { millis: u64 },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl BatchError {
    /// 创建批次不存在错误
    pub fn not_found(batch_id: impl Into<String>) -> Self {
        BatchError::NotFound {
            batch_id: batch_id.into(),
        }
    }

    /// 是否属于派发前的校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, BatchError::Validation(_))
    }
}

/// 库内部结果类型
pub type AppResult<T> = Result<T, BatchError>;
