//! Fixed-size worker pool draining a shared FIFO queue.
//!
//! Workers sleep on a condition variable until a task arrives or the pool
//! shuts down. Each task runs outside the queue lock and reports through its
//! own [`TaskFuture`]. Dropping the pool joins every worker; tasks still
//! queued at that point are discarded and their futures read as abandoned.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::bounded;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::errors::{SparseGridError, SparseGridResult};
use crate::executor::config::{ExecutorConfig, WorkerContext};
use crate::executor::task_future::TaskFuture;

type Job = Box<dyn FnOnce(&mut WorkerContext) + Send + 'static>;

struct JobQueue {
    jobs: VecDeque<Job>,
    active: bool,
}

struct Shared {
    queue: Mutex<JobQueue>,
    available: Condvar,
    // Mirror of `jobs.len()`, written under the lock, read without it.
    pending: AtomicUsize,
}

pub struct ThreadPoolExecutor {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl ThreadPoolExecutor {
    /// Pool sized from the machine's available parallelism.
    pub fn new() -> SparseGridResult<Self> {
        Self::with_config(ExecutorConfig::default())
    }

    pub fn with_config(config: ExecutorConfig) -> SparseGridResult<Self> {
        config.validate()?;
        let capacity = config.worker_threads();

        let mut pool = Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(JobQueue {
                    jobs: VecDeque::new(),
                    active: true,
                }),
                available: Condvar::new(),
                pending: AtomicUsize::new(0),
            }),
            workers: Vec::with_capacity(capacity),
            capacity,
        };

        for worker_id in 0..capacity {
            let shared = Arc::clone(&pool.shared);
            // On failure `pool` drops here and joins the workers already spawned.
            let handle = thread::Builder::new()
                .name(format!("sparsegrid-worker-{worker_id}"))
                .spawn(move || worker_loop(&shared, WorkerContext::new(worker_id)))
                .map_err(|err| SparseGridError::WorkerSpawn {
                    worker_id,
                    reason: err.to_string(),
                })?;
            pool.workers.push(handle);
        }

        debug!(workers = capacity, cores = config.normalized_cores(), "executor started");
        Ok(pool)
    }

    /// Enqueues `task` unconditionally.
    pub fn send<F, R>(&self, task: F) -> TaskFuture<R>
    where
        F: FnOnce(&mut WorkerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (job, future) = package(task);
        {
            let mut queue = self.shared.queue.lock();
            queue.jobs.push_back(job);
            self.shared.pending.store(queue.jobs.len(), Ordering::Release);
        }
        self.shared.available.notify_one();
        future
    }

    /// Enqueues `task` only while fewer than `capacity()` tasks are waiting.
    /// A refused task is dropped unrun.
    pub fn try_send<F, R>(&self, task: F) -> Option<TaskFuture<R>>
    where
        F: FnOnce(&mut WorkerContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.pending() >= self.capacity {
            trace!(pending = self.pending(), "try_send refused");
            return None;
        }

        let future = {
            let mut queue = self.shared.queue.lock();
            if queue.jobs.len() >= self.capacity {
                trace!(pending = queue.jobs.len(), "try_send refused under lock");
                return None;
            }
            let (job, future) = package(task);
            queue.jobs.push_back(job);
            self.shared.pending.store(queue.jobs.len(), Ordering::Release);
            future
        };
        self.shared.available.notify_one();
        Some(future)
    }

    /// Number of worker threads.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks queued but not yet picked up by a worker.
    #[inline]
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        self.shared.queue.lock().active = false;
        self.shared.available.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked outside a task");
            }
        }

        let dropped = {
            let mut queue = self.shared.queue.lock();
            let dropped = queue.jobs.len();
            queue.jobs.clear();
            self.shared.pending.store(0, Ordering::Release);
            dropped
        };
        debug!(dropped_tasks = dropped, "executor shut down");
    }
}

fn package<F, R>(task: F) -> (Job, TaskFuture<R>)
where
    F: FnOnce(&mut WorkerContext) -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = bounded(1);
    let job: Job = Box::new(move |ctx: &mut WorkerContext| {
        match panic::catch_unwind(AssertUnwindSafe(|| task(ctx))) {
            // The caller may have dropped the future already.
            Ok(value) => {
                let _ = tx.send(value);
            }
            Err(_) => warn!(worker_id = ctx.worker_id(), "task panicked; future abandoned"),
        }
    });
    (job, TaskFuture::new(rx))
}

fn worker_loop(shared: &Shared, mut ctx: WorkerContext) {
    trace!(worker_id = ctx.worker_id(), "worker started");

    loop {
        let job = {
            let mut queue = shared.queue.lock();
            shared
                .available
                .wait_while(&mut queue, |q| q.active && q.jobs.is_empty());
            if !queue.active {
                break;
            }
            let Some(job) = queue.jobs.pop_front() else {
                continue;
            };
            shared.pending.store(queue.jobs.len(), Ordering::Release);
            job
        };

        job(&mut ctx);
        ctx.record_task();
    }

    trace!(worker_id = ctx.worker_id(), tasks_run = ctx.tasks_run(), "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::task_future::TaskAbandoned;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::collections::HashSet;
    use std::sync::atomic::AtomicU64;
    use std::time::Duration;

    fn pool(cores: usize) -> ThreadPoolExecutor {
        ThreadPoolExecutor::with_config(ExecutorConfig::with_cores(cores)).expect("pool should start")
    }

    /// Occupies every worker until the returned sender is dropped.
    fn block_all_workers(pool: &ThreadPoolExecutor) -> (Sender<()>, Vec<TaskFuture<()>>) {
        let (gate_tx, gate_rx) = unbounded::<()>();
        let (started_tx, started_rx) = unbounded::<()>();
        let futures = (0..pool.capacity())
            .map(|_| {
                let gate: Receiver<()> = gate_rx.clone();
                let started = started_tx.clone();
                pool.send(move |_ctx| {
                    let _ = started.send(());
                    let _ = gate.recv();
                })
            })
            .collect();
        for _ in 0..pool.capacity() {
            started_rx.recv().expect("worker should start the blocking task");
        }
        (gate_tx, futures)
    }

    #[test]
    fn capacity_leaves_one_core() {
        assert_eq!(pool(1).capacity(), 1);
        assert_eq!(pool(2).capacity(), 1);
        assert_eq!(pool(4).capacity(), 3);
        assert!(matches!(
            ThreadPoolExecutor::with_config(ExecutorConfig::with_cores(0)),
            Err(SparseGridError::InvalidExecutorConfig { .. })
        ));
    }

    #[test]
    fn send_returns_every_result() {
        let pool = pool(4);
        let futures: Vec<_> = (0..200u64).map(|i| pool.send(move |_ctx| i * i)).collect();
        let total: u64 = futures
            .into_iter()
            .map(|f| f.wait().expect("task should complete"))
            .sum();
        assert_eq!(total, (0..200u64).map(|i| i * i).sum());
    }

    #[test]
    fn worker_ids_are_stable_and_in_range() {
        let pool = pool(5);
        let ids: HashSet<usize> = (0..64)
            .map(|_| pool.send(|ctx| ctx.worker_id()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|f| f.wait().expect("task should complete"))
            .collect();
        assert!(!ids.is_empty());
        assert!(ids.iter().all(|&id| id < pool.capacity()));
    }

    #[test]
    fn try_send_admits_capacity_tasks_then_refuses() {
        let pool = pool(3);
        let (gate, blockers) = block_all_workers(&pool);
        assert_eq!(pool.pending(), 0);

        let admitted: Vec<_> = (0..pool.capacity())
            .map(|i| pool.try_send(move |_ctx| i).expect("below capacity"))
            .collect();
        assert_eq!(pool.pending(), pool.capacity());
        assert!(pool.try_send(|_ctx| 99usize).is_none());

        drop(gate);
        for blocker in blockers {
            blocker.wait().expect("blocker should finish");
        }
        let values: Vec<usize> = admitted
            .into_iter()
            .map(|f| f.wait().expect("admitted task should run"))
            .collect();
        assert_eq!(values, (0..pool.capacity()).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_discards_queued_tasks() {
        let pool = pool(1);
        let (gate, _blockers) = block_all_workers(&pool);
        let ran = Arc::new(AtomicU64::new(0));
        let queued: Vec<_> = (0..3)
            .map(|_| {
                let ran = Arc::clone(&ran);
                pool.send(move |_ctx| {
                    ran.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();
        assert_eq!(pool.pending(), 3);

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            drop(gate);
        });
        drop(pool);
        releaser.join().expect("releaser thread");

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        for future in queued {
            assert_eq!(future.wait(), Err(TaskAbandoned));
        }
    }

    #[test]
    fn panicking_task_abandons_future_and_worker_survives() {
        let pool = pool(1);
        let bad = pool.send(|_ctx| -> u32 { panic!("task failure") });
        assert_eq!(bad.wait(), Err(TaskAbandoned));

        let good = pool.send(|ctx| ctx.tasks_run());
        assert_eq!(good.wait(), Ok(1));
    }

    #[test]
    fn try_take_polls_without_blocking() {
        let pool = pool(1);
        let (gate_tx, gate_rx) = unbounded::<u32>();
        let future = pool.send(move |_ctx| gate_rx.recv().unwrap_or(0));
        assert_eq!(future.try_take(), None);
        gate_tx.send(11).expect("task should be waiting");
        assert_eq!(future.wait_timeout(Duration::from_secs(10)), Some(Ok(11)));
    }

    #[test]
    fn concurrent_producers() {
        let pool = pool(4);
        let counter = Arc::new(AtomicU64::new(0));
        thread::scope(|scope| {
            for _ in 0..4 {
                let pool = &pool;
                let counter = Arc::clone(&counter);
                scope.spawn(move || {
                    let futures: Vec<_> = (0..250)
                        .map(|_| {
                            let counter = Arc::clone(&counter);
                            pool.send(move |_ctx| {
                                counter.fetch_add(1, Ordering::Relaxed);
                            })
                        })
                        .collect();
                    for f in futures {
                        f.wait().expect("task should complete");
                    }
                });
            }
        });
        assert_eq!(counter.load(Ordering::Relaxed), 1000);
        assert_eq!(pool.pending(), 0);
    }
}
