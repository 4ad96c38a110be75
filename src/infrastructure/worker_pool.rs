//! 工作池 - 基础设施层
//!
//! 持有唯一的并发配额（Semaphore），只暴露"并发执行一组独立任务"的能力
//!
//! - 每个任务都会立即 `tokio::spawn`，在任务内部排队获取许可，
//!   tokio 的 Semaphore 是公平的，因此启动顺序基本等于提交顺序
//! - 结果按完成顺序交给调用方回调，而不是提交顺序
//! - 单个任务返回错误、panic 或超时，都只会变成这一条的 `UnitError`

use crate::error::UnitError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// 单个任务的执行结果
#[derive(Debug)]
pub struct UnitOutcome<T> {
    /// 任务在输入中的位置
    pub index: usize,
    pub result: Result<T, UnitError>,
}

/// 有界并发工作池
///
/// 职责：
/// - 限制同时运行的任务数
/// - 隔离单个任务的失败
/// - 不认识批次 / 文本
///
/// 宽度限制的是许可数，而不是实际在跑的阻塞调用数：
/// 任务超时后许可立即归还，但已经交给 `spawn_blocking` 的调用无法取消，
/// 会在阻塞线程池里跑完后被丢弃，因此同时执行的转换可能超过 `width`。
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    width: usize,
    unit_timeout: Option<Duration>,
}

impl WorkerPool {
    /// 创建工作池，宽度至少为 1
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(width)),
            width,
            unit_timeout: None,
        }
    }

    /// 设置单个任务的处理时限
    pub fn with_unit_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.unit_timeout = timeout;
        self
    }

    /// 并发上限
    pub fn width(&self) -> usize {
        self.width
    }

    /// 当前空闲的许可数
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 执行一组任务，全部完成后返回（按完成顺序）
    ///
    /// # 参数
    /// - `inputs`: 每个任务的输入
    /// - `unit`: 任务函数，接收 (位置, 输入)
    /// - `on_complete`: 每个任务结束时立即调用一次
    pub async fn execute<I, T, F, Fut, C>(
        &self,
        inputs: Vec<I>,
        unit: F,
        mut on_complete: C,
    ) -> Vec<UnitOutcome<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(usize, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, UnitError>> + Send + 'static,
        C: FnMut(&UnitOutcome<T>),
    {
        let unit = Arc::new(unit);
        let mut pending = FuturesUnordered::new();

        for (index, input) in inputs.into_iter().enumerate() {
            let semaphore = self.semaphore.clone();
            let unit = unit.clone();
            let unit_timeout = self.unit_timeout;

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| UnitError::Failed(format!("工作池已关闭: {}", e)))?;

                debug!("任务 {} 开始执行", index);
                let work = unit(index, input);

                match unit_timeout {
                    Some(limit) => tokio::time::timeout(limit, work)
                        .await
                        .map_err(|_| UnitError::TimedOut {
                            millis: limit.as_millis() as u64,
                        })?,
                    None => work.await,
                }
            });

            pending.push(async move { (index, handle.await) });
        }

        let mut outcomes = Vec::with_capacity(pending.len());

        while let Some((index, joined)) = pending.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!("任务 {} 执行失败: {}", index, e);
                    Err(UnitError::Panicked(join_error_message(e)))
                }
            };

            let outcome = UnitOutcome { index, result };
            on_complete(&outcome);
            outcomes.push(outcome);
        }

        outcomes
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(5)
    }
}

/// 从 JoinError 中取出 panic 信息
pub(crate) fn join_error_message(err: tokio::task::JoinError) -> String {
    if err.is_cancelled() {
        return "任务被取消".to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "未知 panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_all_units_complete() {
        let pool = WorkerPool::new(3);
        let mut seen = Vec::new();

        let outcomes = pool
            .execute(
                (0..10).collect::<Vec<u32>>(),
                |_, n| async move { Ok::<_, UnitError>(n * 2) },
                |outcome| seen.push(outcome.index),
            )
            .await;

        assert_eq!(outcomes.len(), 10);
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        for outcome in &outcomes {
            assert_eq!(outcome.result, Ok(outcome.index as u32 * 2));
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (r, p) = (running.clone(), peak.clone());
        pool.execute(
            vec![(); 8],
            move |_, _| {
                let running = r.clone();
                let peak = p.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, UnitError>(())
                }
            },
            |_| {},
        )
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.available_slots(), 2);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let pool = WorkerPool::new(2);

        let outcomes = pool
            .execute(
                vec![1, 2, 3],
                |_, n: i32| async move {
                    if n == 2 {
                        panic!("boom");
                    }
                    Ok::<_, UnitError>(n)
                },
                |_| {},
            )
            .await;

        assert_eq!(outcomes.len(), 3);
        let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index, 1);
        assert_eq!(failed[0].result, Err(UnitError::Panicked("boom".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unit_timeout() {
        let pool = WorkerPool::new(2).with_unit_timeout(Some(Duration::from_millis(50)));

        let outcomes = pool
            .execute(
                vec![10u64, 1_000],
                |_, ms| async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok::<_, UnitError>(ms)
                },
                |_| {},
            )
            .await;

        let mut outcomes = outcomes;
        outcomes.sort_by_key(|o| o.index);
        assert_eq!(outcomes[0].result, Ok(10));
        assert_eq!(outcomes[1].result, Err(UnitError::TimedOut { millis: 50 }));
    }

    #[tokio::test]
    async fn test_timeout_returns_slot_while_blocking_call_continues() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let pool = WorkerPool::new(1).with_unit_timeout(Some(Duration::from_millis(50)));
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let outcomes = pool
            .execute(
                vec![true, false],
                move |_, blocking| {
                    let flag = flag.clone();
                    async move {
                        if blocking {
                            tokio::task::spawn_blocking(move || {
                                std::thread::sleep(Duration::from_millis(300));
                                flag.store(true, Ordering::SeqCst);
                            })
                            .await
                            .map_err(|e| UnitError::Failed(e.to_string()))?;
                        }
                        Ok::<_, UnitError>(blocking)
                    }
                },
                |_| {},
            )
            .await;

        let mut outcomes = outcomes;
        outcomes.sort_by_key(|o| o.index);
        assert_eq!(outcomes[0].result, Err(UnitError::TimedOut { millis: 50 }));
        assert_eq!(outcomes[1].result, Ok(false));

        // 许可已归还，但超时的阻塞调用仍在后台执行
        assert_eq!(pool.available_slots(), 1);
        assert!(!finished.load(Ordering::SeqCst));
    }
}
