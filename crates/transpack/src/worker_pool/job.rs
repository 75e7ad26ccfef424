use std::{path::PathBuf, sync::Arc};

use arcstr::ArcStr;
use tokio::sync::oneshot;
use transpack_common::{TransformOptions, TransformOutput};

pub(super) enum JobError {
  /// The transformer returned an error. Not retried.
  Failed(anyhow::Error),
  /// The transformer panicked and took its worker down.
  Crashed { worker: usize, message: String },
  /// The pool was shut down before the job ran.
  Cancelled,
}

pub(super) type JobResult = Result<TransformOutput, JobError>;

pub(super) struct Job {
  pub path: PathBuf,
  pub source: ArcStr,
  pub options: Arc<TransformOptions>,
  pub reply: oneshot::Sender<JobResult>,
}

impl Job {
  pub fn cancel(self) {
    let _ = self.reply.send(Err(JobError::Cancelled));
  }

  /// Nobody waits for the result anymore.
  pub fn is_abandoned(&self) -> bool {
    self.reply.is_closed()
  }
}
