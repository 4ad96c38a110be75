//! 条目处理上下文
//!
//! 封装"我正在处理哪个批次的第几条文本"这一信息

use std::fmt::Display;

/// 条目处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 批次ID
    pub batch_id: String,

    /// 文本在输入中的位置（从0开始）
    pub index: usize,

    /// 本批文本总数（仅用于日志显示）
    pub total: usize,
}

impl ItemCtx {
    /// 创建新的条目上下文
    pub fn new(batch_id: String, index: usize, total: usize) -> Self {
        Self {
            batch_id,
            index,
            total,
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 {} 文本#{}/{}]",
            self.batch_id,
            self.index + 1,
            self.total
        )
    }
}
