mod job;
mod worker;

use std::{
  path::Path,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
  },
  thread::JoinHandle,
};

use arcstr::ArcStr;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use transpack_common::{TransformOptions, TransformOutput, Transformer};
use transpack_error::{BuildError, BuildResult};

use self::job::{Job, JobError, JobResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
  pub workers: usize,
  /// Transformer invocations, crashed ones included.
  pub transforms: usize,
  pub crashes: usize,
  pub respawns: usize,
}

#[derive(Default)]
struct Counters {
  transforms: AtomicUsize,
  crashes: AtomicUsize,
  respawns: AtomicUsize,
}

pub(crate) struct PoolShared {
  receiver: Mutex<mpsc::UnboundedReceiver<Job>>,
  transformer: Arc<dyn Transformer>,
  handles: Mutex<Vec<JoinHandle<()>>>,
  closed: AtomicBool,
  stats: Counters,
}

impl PoolShared {
  fn next_job(&self) -> Option<Job> {
    self.receiver.lock().unwrap_or_else(PoisonError::into_inner).blocking_recv()
  }

  fn lock_handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
    self.handles.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::Acquire)
  }
}

/// A fixed set of OS threads running the transformer.
///
/// Jobs are pulled from a single shared queue, so a free worker always picks the next job.
/// A panicking transformer only takes its own worker down, the job is retried once on a
/// fresh worker before the build fails.
pub struct WorkerPool {
  queue: Mutex<Option<mpsc::UnboundedSender<Job>>>,
  shared: Arc<PoolShared>,
  workers: usize,
}

impl WorkerPool {
  pub fn new(workers: usize, transformer: Arc<dyn Transformer>) -> BuildResult<Self> {
    let workers = workers.max(1);
    let (sender, receiver) = mpsc::unbounded_channel();
    let shared = Arc::new(PoolShared {
      receiver: Mutex::new(receiver),
      transformer,
      handles: Mutex::new(Vec::with_capacity(workers)),
      closed: AtomicBool::new(false),
      stats: Counters::default(),
    });

    let pool = Self { queue: Mutex::new(Some(sender)), shared, workers };
    for slot in 0..workers {
      worker::spawn_worker(&pool.shared, slot).map_err(BuildError::WorkerSpawn)?;
    }

    debug!(workers, "transform worker pool started");
    Ok(pool)
  }

  /// Transforms `source` on the next free worker.
  pub async fn submit(
    &self,
    path: &Path,
    source: ArcStr,
    options: Arc<TransformOptions>,
  ) -> BuildResult<TransformOutput> {
    let mut retried = false;
    loop {
      match self.dispatch(path, ArcStr::clone(&source), Arc::clone(&options)).await {
        Ok(output) => return Ok(output),
        Err(JobError::Failed(cause)) => {
          return Err(BuildError::Transform { module: path.display().to_string(), cause });
        }
        Err(JobError::Cancelled) => {
          return Err(BuildError::Cancelled { module: path.display().to_string() });
        }
        Err(JobError::Crashed { worker, message }) => {
          let crash = BuildError::WorkerCrash { worker, module: path.display().to_string(), message };
          if retried {
            return Err(BuildError::Transform {
              module: path.display().to_string(),
              cause: crash.into(),
            });
          }
          debug!("{crash}, retrying on another worker");
          retried = true;
        }
      }
    }
  }

  async fn dispatch(&self, path: &Path, source: ArcStr, options: Arc<TransformOptions>) -> JobResult {
    let (reply, receiver) = oneshot::channel();
    let job = Job { path: path.to_path_buf(), source, options, reply };

    let sent = match self.queue.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
      Some(sender) => sender.send(job).is_ok(),
      None => false,
    };
    if !sent {
      return Err(JobError::Cancelled);
    }

    // A dropped reply means the job was discarded while the pool was closing.
    receiver.await.unwrap_or(Err(JobError::Cancelled))
  }

  /// Stops accepting jobs and cancels the queued ones. Running jobs finish in the background.
  pub fn close(&self) {
    if self.shared.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    self.queue.lock().unwrap_or_else(PoisonError::into_inner).take();

    let mut receiver = self.shared.receiver.lock().unwrap_or_else(PoisonError::into_inner);
    receiver.close();
    while let Ok(job) = receiver.try_recv() {
      job.cancel();
    }
  }

  /// Closes the pool and waits for every worker thread to exit.
  ///
  /// Jobs already running are not interrupted, so this returns only once the slowest of them
  /// finished, even when nobody waits for its result anymore. Blocks the current thread, async
  /// callers should go through `spawn_blocking`.
  pub fn shutdown(&self) {
    self.close();
    loop {
      let next = self.shared.lock_handles().pop();
      let Some(handle) = next else { break };
      // A worker only panics outside of `catch_unwind` if the runtime itself is broken.
      let _ = handle.join();
    }
    debug!("transform worker pool stopped");
  }

  pub fn stats(&self) -> PoolStats {
    let stats = &self.shared.stats;
    PoolStats {
      workers: self.workers,
      transforms: stats.transforms.load(Ordering::Relaxed),
      crashes: stats.crashes.load(Ordering::Relaxed),
      respawns: stats.respawns.load(Ordering::Relaxed),
    }
  }
}

impl Drop for WorkerPool {
  fn drop(&mut self) {
    self.close();
  }
}

#[cfg(test)]
mod tests {
  use std::{
    path::Path,
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc, Mutex,
    },
    time::Duration,
  };

  use transpack_common::{TransformOptions, TransformOutput, Transformer};
  use transpack_error::BuildError;

  use super::WorkerPool;

  fn options() -> Arc<TransformOptions> {
    Arc::new(TransformOptions::default())
  }

  fn output(code: String) -> anyhow::Result<TransformOutput> {
    Ok(TransformOutput { code, dependencies: vec![] })
  }

  fn echo() -> Arc<dyn Transformer> {
    Arc::new(|source: &str, _: &Path, _: &TransformOptions| output(source.to_string()))
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn transforms_on_worker_threads() {
    let pool = WorkerPool::new(
      2,
      Arc::new(|source: &str, _: &Path, _: &TransformOptions| {
        let name = std::thread::current().name().unwrap_or_default().to_string();
        assert!(name.starts_with("transpack-worker-"));
        output(source.to_uppercase())
      }),
    )
    .unwrap();

    let output = pool.submit(Path::new("/a.js"), "abc".into(), options()).await.unwrap();
    assert_eq!(output.code, "ABC");
    assert_eq!(pool.stats().transforms, 1);
    pool.shutdown();
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn retries_a_crashed_job_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let pool = WorkerPool::new(
      1,
      Arc::new(move |source: &str, _: &Path, _: &TransformOptions| {
        assert!(counter.fetch_add(1, Ordering::SeqCst) > 0, "first attempt crashes");
        output(source.to_string())
      }),
    )
    .unwrap();

    let output = pool.submit(Path::new("/a.js"), "ok".into(), options()).await.unwrap();
    assert_eq!(output.code, "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let stats = pool.stats();
    assert_eq!(stats.crashes, 1);
    assert_eq!(stats.respawns, 1);
    pool.shutdown();
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn second_crash_fails_the_job() {
    let pool = WorkerPool::new(
      2,
      Arc::new(|_: &str, _: &Path, _: &TransformOptions| -> anyhow::Result<TransformOutput> {
        panic!("boom")
      }),
    )
    .unwrap();

    let err = pool.submit(Path::new("/a.js"), "x".into(), options()).await.unwrap_err();
    assert!(err.is_transform());
    assert!(err.to_string().contains("boom"), "{err}");

    let stats = pool.stats();
    assert_eq!(stats.crashes, 2);
    assert_eq!(stats.respawns, 2);

    // Crashed workers were replaced, the pool keeps its size.
    assert_eq!(stats.workers, 2);
    pool.shutdown();
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn closed_pool_cancels_new_jobs() {
    let pool = WorkerPool::new(1, echo()).unwrap();
    pool.shutdown();

    let err = pool.submit(Path::new("/a.js"), "x".into(), options()).await.unwrap_err();
    assert!(matches!(err, BuildError::Cancelled { .. }));
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn close_cancels_queued_jobs() {
    let (started_tx, started_rx) = std::sync::mpsc::channel::<()>();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let pool = Arc::new(
      WorkerPool::new(
        1,
        Arc::new(move |source: &str, _: &Path, _: &TransformOptions| {
          let _ = started_tx.send(());
          let _ = release_rx.lock().unwrap().recv();
          output(source.to_string())
        }),
      )
      .unwrap(),
    );

    let submit = |path: &'static str| {
      let pool = Arc::clone(&pool);
      tokio::spawn(async move { pool.submit(Path::new(path), path.into(), options()).await })
    };

    let running = submit("/running.js");
    tokio::task::spawn_blocking(move || started_rx.recv()).await.unwrap().unwrap();

    let queued = submit("/queued.js");
    tokio::time::sleep(Duration::from_millis(50)).await;
    pool.close();

    let err = queued.await.unwrap().unwrap_err();
    assert!(matches!(err, BuildError::Cancelled { ref module } if module == "/queued.js"));

    // The running job is not interrupted.
    release_tx.send(()).unwrap();
    assert_eq!(running.await.unwrap().unwrap().code, "/running.js");
    assert_eq!(pool.stats().transforms, 1);

    tokio::task::spawn_blocking(move || pool.shutdown()).await.unwrap();
  }

  #[test]
  fn at_least_one_worker() {
    let pool = WorkerPool::new(0, echo()).unwrap();
    assert_eq!(pool.stats().workers, 1);
    pool.shutdown();
  }
}
