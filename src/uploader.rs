// The upload loop. Frames are processed strictly in sequence: each
// frame's network call, retries included, finishes before the next frame
// starts, and a fixed pacing delay precedes every frame to keep the
// request cadence rate-limit-safe.

use crate::api::PhotoApi;
use crate::batch::BatchBuffer;
use crate::config::{Config, UploadTarget};
use crate::ui::{Console, Tone};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// One frame's worth of work, created per index and consumed once.
#[derive(Debug)]
pub struct FrameTask {
    pub sequence: i64,
    pub local_path: PathBuf,
    pub caption: String,
}

/// Why a frame ended up failed.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("file not found")]
    MissingFile,
    #[error("upload failed")]
    UploadFailed,
}

/// Terminal result of one frame. Exactly one of these is produced per
/// task; `Staged` is a success that still owes a batch flush.
#[derive(Debug)]
pub enum UploadOutcome {
    Published,
    Staged { handle: String },
    Failed(FrameError),
}

/// Final tally of a run. A dry-run frame counts as a success.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub success: u64,
    pub fail: u64,
}

/// Per-run switches taken from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub start: i64,
    pub count: i64,
    pub target: UploadTarget,
    pub dry_run: bool,
    /// `Some(n)` collects frames into multi-photo posts of `n`; `None`
    /// publishes each frame on its own.
    pub batch_size: Option<usize>,
    /// Legacy policy: stop the whole run at the first failed frame.
    pub halt_on_failure: bool,
}

pub struct UploadRun<'a, A: PhotoApi> {
    cfg: &'a Config,
    api: &'a A,
    console: Console,
    cancel: Arc<AtomicBool>,
}

impl<'a, A: PhotoApi> UploadRun<'a, A> {
    pub fn new(cfg: &'a Config, api: &'a A, console: Console, cancel: Arc<AtomicBool>) -> Self {
        UploadRun {
            cfg,
            api,
            console,
            cancel,
        }
    }

    /// Walk `[start, start + count)` in order and upload every frame,
    /// then flush any staged remainder and print the tally. A count of
    /// zero or less is an empty run with a 0/0 summary.
    pub fn run(&self, opts: &RunOptions) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut batch = BatchBuffer::new();
        let mut last_caption = String::new();
        let mut interrupted = false;

        let end = opts.start.saturating_add(opts.count.max(0));
        for sequence in opts.start..end {
            if self.cancel.load(Ordering::SeqCst) {
                self.console
                    .say(Tone::Notice, "Interrupted, stopping before the next frame");
                interrupted = true;
                break;
            }
            // Unconditional, even for frames that end up skipped, so the
            // request cadence stays predictable.
            thread::sleep(self.cfg.pacing);

            let task = self.frame_task(sequence);
            let outcome = self.process_frame(&task, opts);
            let failed = matches!(outcome, UploadOutcome::Failed(_));
            match outcome {
                UploadOutcome::Published => summary.success += 1,
                UploadOutcome::Staged { handle } => {
                    summary.success += 1;
                    last_caption = task.caption.clone();
                    batch.offer(handle);
                    if let Some(bound) = opts.batch_size {
                        if batch.is_full(bound) {
                            self.flush(&mut batch, &last_caption);
                        }
                    }
                }
                UploadOutcome::Failed(reason) => {
                    summary.fail += 1;
                    self.console.say(
                        Tone::Failure,
                        &format!("Frame {:04} failed: {reason}", task.sequence),
                    );
                }
            }
            self.console.advance();
            if failed && opts.halt_on_failure {
                self.console.say(Tone::Notice, "Halting run on first failure");
                break;
            }
        }

        // Staged handles are abandoned on interrupt; the summary still
        // reflects every frame that got a decision.
        if !interrupted && !batch.is_empty() {
            self.flush(&mut batch, &last_caption);
        }

        self.console.say(Tone::Heading, "Upload Summary:");
        self.console.say(
            Tone::Success,
            &format!("Successfully uploaded: {} frames", summary.success),
        );
        self.console.say(
            Tone::Failure,
            &format!("Failed to upload: {} frames", summary.fail),
        );
        self.console.finish();
        summary
    }

    fn frame_task(&self, sequence: i64) -> FrameTask {
        FrameTask {
            sequence,
            local_path: self.cfg.frame_path(sequence),
            caption: self.cfg.caption.render(sequence),
        }
    }

    /// Resolve one task to its outcome. Local file deletion happens here,
    /// right after the upload that earned it, and never on failure.
    fn process_frame(&self, task: &FrameTask, opts: &RunOptions) -> UploadOutcome {
        if !task.local_path.exists() {
            return UploadOutcome::Failed(FrameError::MissingFile);
        }
        if opts.dry_run {
            self.console.say(
                Tone::Info,
                &format!("Dry run: frame {:04} would be uploaded", task.sequence),
            );
            return UploadOutcome::Published;
        }
        if opts.batch_size.is_some() {
            match self.api.stage(&task.local_path, &task.caption, &opts.target) {
                Some(handle) => {
                    self.delete_local(task);
                    UploadOutcome::Staged { handle }
                }
                None => UploadOutcome::Failed(FrameError::UploadFailed),
            }
        } else if self.api.publish(&task.local_path, &task.caption, &opts.target) {
            self.delete_local(task);
            UploadOutcome::Published
        } else {
            UploadOutcome::Failed(FrameError::UploadFailed)
        }
    }

    fn delete_local(&self, task: &FrameTask) {
        if let Err(err) = fs::remove_file(&task.local_path) {
            self.console.say(
                Tone::Notice,
                &format!("Could not delete {}: {err}", task.local_path.display()),
            );
        }
    }

    /// Drain the buffer into one feed post. The buffer is cleared whether
    /// or not the post succeeds; a failed batch is reported, not retried.
    fn flush(&self, batch: &mut BatchBuffer, caption: &str) {
        let handles = batch.drain();
        let message = format!("Uploaded {} frames: {caption}", handles.len());
        self.api.publish_batch(&handles, &message);
    }
}
