//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次的调度和状态跟踪，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `coordinator` - 批次协调器
//! - 校验输入、注册批次
//! - 通过工作池并发处理每条文本
//! - 恢复输入顺序、计算统计、写入最终状态
//!
//! ### `registry` / `tracker` - 批次注册表与进度跟踪
//! - 注册表：批次ID -> 跟踪器，读写锁保护，支持过期清理
//! - 跟踪器：单个批次的计数器和状态，一把互斥锁
//!
//! ### `batch_processor` - 命令行运行器
//! - 加载 TOML 输入、后台输出进度、写结果文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<BatchInput>)
//!     ↓
//! coordinator (处理 Vec<String>)
//!     ↓
//! workflow::ItemFlow (处理单条文本)
//!     ↓
//! services (能力层：transform / statistics)
//!     ↓
//! infrastructure (基础设施：WorkerPool)
//! ```

pub mod batch_processor;
pub mod coordinator;
pub mod registry;
pub mod tracker;

pub use batch_processor::{App, RunSummary};
pub use coordinator::BatchCoordinator;
pub use registry::BatchRegistry;
pub use tracker::ProgressTracker;
