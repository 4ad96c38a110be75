//! # Humanize Batch
//!
//! 批量文本改写的任务编排库
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（并发配额），只暴露能力
//! - `WorkerPool` - 有界并发执行，隔离单个任务的失败
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条文本或纯计算
//! - `TextTransform` - 文本转换接口（具体改写实现可替换）
//! - `ContractionRewriter` - 内置的简单改写器
//! - `StatisticsAggregator` - 批次统计
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条文本"的完整处理流程
//! - `ItemCtx` - 上下文封装（batch_id + index）
//! - `ItemFlow` - 流程编排（空文本检查 → 转换 → 计时 / 评分）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/coordinator` - 批次协调器，管理并发、计数和最终状态
//! - `orchestrator/registry` - 批次注册表，支持进度查询与过期清理
//! - `orchestrator/batch_processor` - 命令行运行器
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, BatchError, UnitError, ValidationError};
pub use infrastructure::WorkerPool;
pub use models::{
    BatchProgress, BatchStatistics, BatchStatus, BatchSubmission, ItemResult, TransformMode,
};
pub use orchestrator::{App, BatchCoordinator, BatchRegistry, ProgressTracker};
pub use services::{ContractionRewriter, StatisticsAggregator, TextTransform, TransformOutput};
pub use workflow::{ItemCtx, ItemFlow};
