use std::{
  any::Any,
  panic::{self, AssertUnwindSafe},
  sync::{atomic::Ordering, Arc},
  thread,
};

use tracing::{trace, warn};

use super::{
  job::{Job, JobError},
  PoolShared,
};

pub(super) fn spawn_worker(shared: &Arc<PoolShared>, slot: usize) -> std::io::Result<()> {
  let worker_shared = Arc::clone(shared);
  let handle = thread::Builder::new()
    .name(format!("transpack-worker-{slot}"))
    .spawn(move || run_worker(&worker_shared, slot))?;
  shared.lock_handles().push(handle);
  Ok(())
}

fn run_worker(shared: &Arc<PoolShared>, slot: usize) {
  trace!(worker = slot, "transform worker started");

  while let Some(job) = shared.next_job() {
    if shared.is_closed() {
      job.cancel();
      continue;
    }
    if job.is_abandoned() {
      continue;
    }

    let Job { path, source, options, reply } = job;
    shared.stats.transforms.fetch_add(1, Ordering::Relaxed);

    let ret = panic::catch_unwind(AssertUnwindSafe(|| {
      shared.transformer.transform(&source, &path, &options)
    }));

    match ret {
      Ok(ret) => {
        let _ = reply.send(ret.map_err(JobError::Failed));
      }
      Err(payload) => {
        let message = panic_message(payload.as_ref());
        warn!(worker = slot, module = %path.display(), %message, "transform worker crashed");
        shared.stats.crashes.fetch_add(1, Ordering::Relaxed);
        // The crashed worker is not reused, a fresh one takes over its slot.
        respawn(shared, slot);
        let _ = reply.send(Err(JobError::Crashed { worker: slot, message }));
        return;
      }
    }
  }

  trace!(worker = slot, "transform worker stopped");
}

fn respawn(shared: &Arc<PoolShared>, slot: usize) {
  if shared.is_closed() {
    return;
  }
  match spawn_worker(shared, slot) {
    Ok(()) => {
      shared.stats.respawns.fetch_add(1, Ordering::Relaxed);
    }
    Err(err) => warn!(worker = slot, "failed to respawn transform worker: {err}"),
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
