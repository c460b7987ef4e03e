//! FIFO task queue over exclusively owned resources.
//!
//! Each worker is a Tokio task that owns one resource `R` (a renderer) and
//! runs queued tasks against it one at a time. With a single worker (the
//! default) at most one task touches the resource at any moment; exclusivity
//! follows from ownership, no lock guards `R`.
//!
//! Tasks are closures `FnOnce(&mut R) -> TaskFuture<'_, T>`. The queue erases
//! `T` behind a boxed job and routes the typed outcome back through a oneshot
//! channel, so one queue serves tasks of different result types.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::QueueConfig;
use crate::error::{QueueError, RenderError};

/// Future a task returns; may borrow the worker's resource.
pub type TaskFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RenderError>> + Send + 'a>>;

type JobFuture<'a> = Pin<Box<dyn Future<Output = Completion> + Send + 'a>>;

/// How a job left the worker's resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Completion {
    Finished,
    Panicked,
}

/// Resource a queue worker owns for its lifetime.
pub trait QueueResource: Send + 'static {
    /// Called once when the worker exits.
    fn dispose(&mut self);

    /// Called after a task panicked mid-use; the resource may hold partial
    /// state from that task.
    fn recover(&mut self) {}
}

trait Job<R>: Send {
    fn run<'a>(self: Box<Self>, resource: &'a mut R, limit: Option<Duration>) -> JobFuture<'a>;
    fn reject(self: Box<Self>, err: QueueError);
    fn seq(&self) -> u64;
}

struct TypedJob<F, T> {
    seq: u64,
    task: F,
    reply: oneshot::Sender<Result<T, QueueError>>,
}

impl<R, F, T> Job<R> for TypedJob<F, T>
where
    R: Send + 'static,
    T: Send + 'static,
    F: for<'a> FnOnce(&'a mut R) -> TaskFuture<'a, T> + Send + 'static,
{
    fn run<'a>(self: Box<Self>, resource: &'a mut R, limit: Option<Duration>) -> JobFuture<'a> {
        let TypedJob { seq, task, reply } = *self;
        Box::pin(async move {
            let guarded = AssertUnwindSafe(async move {
                let fut = task(resource);
                match limit {
                    Some(limit) => match tokio::time::timeout(limit, fut).await {
                        Ok(result) => result.map_err(QueueError::from),
                        Err(_) => {
                            log::warn!("task #{seq} exceeded {limit:?}; abandoning it");
                            Err(QueueError::TimedOut(limit))
                        }
                    },
                    None => fut.await.map_err(QueueError::from),
                }
            });
            let (outcome, completion) = match guarded.catch_unwind().await {
                Ok(outcome) => (outcome, Completion::Finished),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    log::error!("task #{seq} panicked: {message}");
                    (Err(QueueError::Panicked(message)), Completion::Panicked)
                }
            };
            if reply.send(outcome).is_err() {
                log::debug!("task #{seq} finished after its submitter went away");
            }
            completion
        })
    }

    fn reject(self: Box<Self>, err: QueueError) {
        let _ = self.reply.send(Err(err));
    }

    fn seq(&self) -> u64 {
        self.seq
    }
}

type JobBox<R> = Box<dyn Job<R>>;

#[derive(Debug, Default)]
struct Counters {
    disposed: AtomicBool,
    queued: AtomicUsize,
    running: AtomicUsize,
    submitted: AtomicU64,
}

/// Completion of one queued task.
///
/// The task is already enqueued when this handle exists; awaiting it only
/// waits for the outcome. Dropping it does not cancel the task.
#[must_use = "the task runs regardless; await the handle to observe its outcome"]
pub struct TaskHandle<T> {
    state: HandleState<T>,
}

enum HandleState<T> {
    Waiting(oneshot::Receiver<Result<T, QueueError>>),
    Rejected(Option<QueueError>),
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, QueueError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            HandleState::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|delivered| delivered.unwrap_or(Err(QueueError::Dropped))),
            HandleState::Rejected(err) => Poll::Ready(Err(err.take().unwrap_or(QueueError::Disposed))),
        }
    }
}

/// FIFO queue with `n` workers, each owning one `R`.
pub struct TaskQueue<R: QueueResource> {
    tx: Mutex<Option<mpsc::UnboundedSender<JobBox<R>>>>,
    counters: Arc<Counters>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<R: QueueResource> TaskQueue<R> {
    /// Single-worker queue owning `resource`. Must be called inside a Tokio
    /// runtime.
    pub fn new(resource: R, config: QueueConfig) -> Self {
        Self::spawn(vec![resource], config)
    }

    /// `workers` workers (at least one), each with a resource from `factory`.
    pub fn with_workers(workers: usize, factory: impl FnMut(usize) -> R, config: QueueConfig) -> Self {
        Self::spawn((0..workers.max(1)).map(factory).collect(), config)
    }

    fn spawn(resources: Vec<R>, config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let counters = Arc::new(Counters::default());

        let workers = resources
            .into_iter()
            .enumerate()
            .map(|(index, resource)| {
                tokio::spawn(worker_loop(index, resource, rx.clone(), counters.clone(), config))
            })
            .collect::<Vec<_>>();

        log::debug!(
            "task queue started: {} worker(s), pacing {:?}, timeout {:?}",
            workers.len(),
            config.pacing,
            config.task_timeout
        );

        Self {
            tx: Mutex::new(Some(tx)),
            counters,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueues `task` and returns a handle resolving to its outcome.
    ///
    /// Enqueueing happens before this returns, so submission order is call
    /// order. After [`dispose`](Self::dispose) the handle resolves to
    /// [`QueueError::Disposed`] without running anything.
    pub fn add<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: for<'a> FnOnce(&'a mut R) -> TaskFuture<'a, T> + Send + 'static,
    {
        let rejected = || TaskHandle {
            state: HandleState::Rejected(Some(QueueError::Disposed)),
        };

        if self.is_disposed() {
            return rejected();
        }
        let tx = lock(&self.tx);
        let Some(tx) = tx.as_ref() else {
            return rejected();
        };

        let seq = self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        let (reply, rx) = oneshot::channel();
        self.counters.queued.fetch_add(1, Ordering::SeqCst);
        let job: JobBox<R> = Box::new(TypedJob { seq, task, reply });
        if let Err(mpsc::error::SendError(job)) = tx.send(job) {
            self.counters.queued.fetch_sub(1, Ordering::SeqCst);
            job.reject(QueueError::Disposed);
        }

        TaskHandle {
            state: HandleState::Waiting(rx),
        }
    }

    /// Tasks submitted but not yet started.
    pub fn len(&self) -> usize {
        self.counters.queued.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tasks currently running.
    pub fn running(&self) -> usize {
        self.counters.running.load(Ordering::SeqCst)
    }

    /// Tasks ever accepted.
    pub fn submitted(&self) -> u64 {
        self.counters.submitted.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.counters.disposed.load(Ordering::SeqCst)
    }

    /// Closes the queue. Tasks not yet started are rejected with
    /// [`QueueError::Disposed`]; a running task finishes; workers then dispose
    /// their resources and exit. Idempotent.
    pub fn dispose(&self) {
        if self.counters.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        drop(lock(&self.tx).take());
        log::debug!("task queue disposed with {} task(s) pending", self.len());
    }

    /// Disposes and waits for every worker to exit.
    pub async fn shutdown(&self) {
        self.dispose();
        let workers = std::mem::take(&mut *lock(&self.workers));
        for worker in workers {
            if let Err(err) = worker.await {
                log::error!("queue worker failed: {err}");
            }
        }
    }
}

impl<R: QueueResource> Drop for TaskQueue<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn worker_loop<R: QueueResource>(
    index: usize,
    mut resource: R,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<JobBox<R>>>>,
    counters: Arc<Counters>,
    config: QueueConfig,
) {
    loop {
        let job = rx.lock().await.recv().await;
        let Some(job) = job else { break };

        if !counters.disposed.load(Ordering::SeqCst) && !config.pacing.is_zero() {
            tokio::time::sleep(config.pacing).await;
        }

        counters.queued.fetch_sub(1, Ordering::SeqCst);
        if counters.disposed.load(Ordering::SeqCst) {
            job.reject(QueueError::Disposed);
            continue;
        }

        let seq = job.seq();
        counters.running.fetch_add(1, Ordering::SeqCst);
        log::debug!("worker {index}: task #{seq} started");
        if job.run(&mut resource, config.task_timeout).await == Completion::Panicked {
            resource.recover();
        }
        counters.running.fetch_sub(1, Ordering::SeqCst);
        log::debug!("worker {index}: task #{seq} finished");
    }

    resource.dispose();
    log::debug!("worker {index}: stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::time::{Instant, sleep};

    use super::*;
    use crate::error::SceneError;

    /// Resource that records task order and detects overlapping use.
    #[derive(Default, Clone)]
    struct Probe {
        log: Arc<Mutex<Vec<usize>>>,
        busy: Arc<AtomicBool>,
        concurrent: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        disposed: Arc<AtomicUsize>,
        recovered: Arc<AtomicUsize>,
    }

    impl Probe {
        async fn work(&mut self, n: usize, dur: Duration) {
            let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            sleep(dur).await;
            self.log.lock().unwrap().push(n);
            self.concurrent.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl QueueResource for Probe {
        fn dispose(&mut self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }

        fn recover(&mut self) {
            self.recovered.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn explode() -> Result<i32, RenderError> {
        panic!("scene hook exploded")
    }

    fn fast() -> QueueConfig {
        QueueConfig {
            pacing: Duration::ZERO,
            task_timeout: None,
        }
    }

    // ── ordering and exclusivity ────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn tasks_run_in_fifo_order_without_overlap() {
        let probe = Probe::default();
        let queue = TaskQueue::new(probe.clone(), QueueConfig::default());

        let handles: Vec<_> = (0..5)
            .map(|n| {
                queue.add(move |p: &mut Probe| {
                    Box::pin(async move {
                        assert!(!p.busy.swap(true, Ordering::SeqCst), "re-entrant use");
                        // Later tasks finish faster; order must still hold.
                        p.work(n, Duration::from_millis(50 - n as u64 * 10)).await;
                        p.busy.store(false, Ordering::SeqCst);
                        Ok(n)
                    })
                })
            })
            .collect();

        for (n, h) in handles.into_iter().enumerate() {
            assert_eq!(h.await, Ok(n));
        }
        assert_eq!(*probe.log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn each_task_waits_the_pacing_delay() {
        let queue = TaskQueue::new(Probe::default(), QueueConfig::default());
        let start = Instant::now();

        let a = queue.add(|_: &mut Probe| Box::pin(async { Ok(()) }));
        let b = queue.add(|_: &mut Probe| Box::pin(async { Ok(()) }));
        let c = queue.add(|_: &mut Probe| Box::pin(async { Ok(()) }));
        let _ = (a.await, b.await, c.await);

        assert!(start.elapsed() >= Duration::from_millis(150), "{:?}", start.elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn worker_count_bounds_concurrency() {
        let probe = Probe::default();
        let shared = probe.clone();
        let queue = TaskQueue::with_workers(2, move |_| shared.clone(), fast());

        let handles: Vec<_> = (0..6)
            .map(|n| {
                queue.add(move |p: &mut Probe| {
                    Box::pin(async move {
                        p.work(n, Duration::from_millis(20)).await;
                        Ok(())
                    })
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(probe.peak.load(Ordering::SeqCst), 2);
        assert_eq!(probe.log.lock().unwrap().len(), 6);
    }

    // ── outcomes ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn failure_only_affects_its_own_caller() {
        let queue = TaskQueue::new(Probe::default(), fast());

        let ok1 = queue.add(|_: &mut Probe| Box::pin(async { Ok(1) }));
        let bad = queue.add(|_: &mut Probe| {
            Box::pin(async { Err::<i32, _>(RenderError::from(SceneError::new("boom"))) })
        });
        let ok2 = queue.add(|_: &mut Probe| Box::pin(async { Ok(2) }));

        assert_eq!(ok1.await, Ok(1));
        assert_eq!(
            bad.await,
            Err(QueueError::Task(RenderError::Scene(SceneError::new("boom"))))
        );
        assert_eq!(ok2.await, Ok(2));
    }

    #[tokio::test]
    async fn panicking_task_is_isolated_and_resource_recovered() {
        let probe = Probe::default();
        let queue = TaskQueue::new(probe.clone(), fast());

        let before = queue.add(|_: &mut Probe| Box::pin(async { Ok(1) }));
        let bad = queue.add(|_: &mut Probe| Box::pin(async { explode() }));
        let after = queue.add(|_: &mut Probe| Box::pin(async { Ok(2) }));

        assert_eq!(before.await, Ok(1));
        assert_eq!(bad.await, Err(QueueError::Panicked("scene hook exploded".into())));
        assert_eq!(after.await, Ok(2));
        assert_eq!(probe.recovered.load(Ordering::SeqCst), 1);
        assert_eq!(queue.running(), 0);
        assert!(!queue.is_disposed());
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_task_times_out_and_queue_moves_on() {
        let config = QueueConfig {
            pacing: Duration::ZERO,
            task_timeout: Some(Duration::from_secs(10)),
        };
        let queue = TaskQueue::new(Probe::default(), config);

        let stuck = queue.add(|_: &mut Probe| Box::pin(std::future::pending::<Result<(), RenderError>>()));
        let next = queue.add(|_: &mut Probe| Box::pin(async { Ok("done") }));

        assert_eq!(stuck.await, Err(QueueError::TimedOut(Duration::from_secs(10))));
        assert_eq!(next.await, Ok("done"));
        assert_eq!(queue.running(), 0);
    }

    // ── dispose ─────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn dispose_rejects_pending_and_lets_running_task_finish() {
        let probe = Probe::default();
        let queue = TaskQueue::new(probe.clone(), fast());

        let running = queue.add(|p: &mut Probe| {
            Box::pin(async move {
                p.work(0, Duration::from_millis(100)).await;
                Ok(0)
            })
        });
        let pending1 = queue.add(|_: &mut Probe| Box::pin(async { Ok(1) }));
        let pending2 = queue.add(|_: &mut Probe| Box::pin(async { Ok(2) }));

        // Let the worker pick up the first task.
        sleep(Duration::from_millis(10)).await;
        assert_eq!(queue.running(), 1);
        assert_eq!(queue.len(), 2);

        queue.dispose();
        let late = queue.add(|_: &mut Probe| Box::pin(async { Ok(3) }));

        assert_eq!(running.await, Ok(0));
        assert_eq!(pending1.await, Err(QueueError::Disposed));
        assert_eq!(pending2.await, Err(QueueError::Disposed));
        assert_eq!(late.await, Err(QueueError::Disposed));

        queue.shutdown().await;
        assert_eq!(probe.disposed.load(Ordering::SeqCst), 1);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.submitted(), 3);
    }

    #[tokio::test]
    async fn dispose_is_idempotent() {
        let probe = Probe::default();
        let queue = TaskQueue::new(probe.clone(), fast());
        queue.dispose();
        queue.dispose();
        queue.shutdown().await;
        assert!(queue.is_disposed());
        assert_eq!(probe.disposed.load(Ordering::SeqCst), 1);
    }
}
