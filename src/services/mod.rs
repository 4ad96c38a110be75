pub mod rewriter;
pub mod statistics;
pub mod transform;

pub use rewriter::ContractionRewriter;
pub use statistics::StatisticsAggregator;
pub use transform::{TextTransform, TransformOutput};
