pub mod worker_pool;

pub use worker_pool::{UnitOutcome, WorkerPool};
