//! The admission controller: a fixed pool of worker slots over an
//! unbounded FIFO waiting queue, with a hard per-job execution deadline.
//!
//! Submission is non-blocking; the returned [`JobHandle`] is the only
//! externally visible suspension point. Exactly one outcome resolves
//! every submitted job: completed, failed, or timed out. The deadline is
//! measured from the start of execution -- queue wait does not count
//! against it, so client-observed latency is unbounded when the backlog
//! is deep.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, Mutex};
use uuid::Uuid;

use lexd_core::frequency::WordCount;

use crate::engine::{AnalysisEngine, FrequencyRequest, ProcessRequest, TaskOutput};

/// Default number of concurrent worker slots.
pub const DEFAULT_WORKERS: usize = 5;

/// Default execution deadline per job.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(180);

/// Worker pool sizing and deadline configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of jobs executing concurrently.
    pub workers: usize,
    /// Execution-time budget per job, measured from execution start.
    pub job_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

/// One unit of analysis work.
#[derive(Debug, Clone)]
pub enum JobPayload {
    Process(ProcessRequest),
    WordFrequency(FrequencyRequest),
}

/// Result attached to a completed job.
#[derive(Debug, Clone)]
pub enum JobResult {
    Tasks(TaskOutput),
    Frequency(Vec<WordCount>),
}

/// Exactly one of these terminates every submitted job.
#[derive(Debug)]
pub enum JobOutcome {
    Completed(JobResult),
    Failed(String),
    TimedOut,
}

struct QueuedJob {
    id: Uuid,
    payload: JobPayload,
    submitted_at: Instant,
    done: oneshot::Sender<JobOutcome>,
}

/// Resolves to the outcome of a submitted job.
pub struct JobHandle {
    id: Uuid,
    rx: oneshot::Receiver<JobOutcome>,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Suspend until the job resolves.
    ///
    /// Only fails internally if the pool shut down with the job still
    /// queued; that surfaces as a failed outcome, not a panic.
    pub async fn outcome(self) -> JobOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| JobOutcome::Failed("Analysis pool is shut down".to_string()))
    }
}

/// Bounded-concurrency admission controller over an [`AnalysisEngine`].
///
/// Spawns its worker tasks at construction; they live until the pool is
/// dropped and the queue drains. All slot assignment goes through one
/// synchronization point (the mutexed queue receiver), so dequeue order
/// is strictly arrival order.
pub struct AnalysisPool {
    queue: mpsc::UnboundedSender<QueuedJob>,
}

impl AnalysisPool {
    /// Start `config.workers` worker tasks over the given engine.
    pub fn start(engine: Arc<dyn AnalysisEngine>, config: PoolConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<QueuedJob>();
        let rx = Arc::new(Mutex::new(rx));

        let workers = config.workers.max(1);
        for slot in 0..workers {
            tokio::spawn(worker_loop(
                slot,
                Arc::clone(&rx),
                Arc::clone(&engine),
                config.job_timeout,
            ));
        }

        tracing::info!(
            workers,
            job_timeout_secs = config.job_timeout.as_secs(),
            "Analysis pool started",
        );

        Self { queue: tx }
    }

    /// Enqueue a job. Never blocks; backlog depth is unbounded.
    pub fn submit(&self, payload: JobPayload) -> JobHandle {
        let (done, rx) = oneshot::channel();
        let id = Uuid::new_v4();

        let job = QueuedJob {
            id,
            payload,
            submitted_at: Instant::now(),
            done,
        };

        // A send failure means every worker is gone (shutdown). Dropping
        // the job here drops its `done` sender, which resolves the handle
        // as failed.
        if self.queue.send(job).is_err() {
            tracing::error!(job_id = %id, "Job rejected: analysis pool is shut down");
        } else {
            tracing::debug!(job_id = %id, "Job queued");
        }

        JobHandle { id, rx }
    }
}

/// One worker slot: dequeue in arrival order, execute, repeat.
async fn worker_loop(
    slot: usize,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<QueuedJob>>>,
    engine: Arc<dyn AnalysisEngine>,
    job_timeout: Duration,
) {
    loop {
        // The lock is held only while waiting for the queue head, never
        // during execution, so a busy slot cannot stall the others.
        let next = {
            let mut queue = rx.lock().await;
            queue.recv().await
        };

        let Some(job) = next else {
            break;
        };

        execute(slot, job, &engine, job_timeout).await;
    }

    tracing::debug!(slot, "Analysis worker stopped");
}

/// Run one job to its single terminal outcome.
async fn execute(
    slot: usize,
    job: QueuedJob,
    engine: &Arc<dyn AnalysisEngine>,
    job_timeout: Duration,
) {
    let queue_wait_ms = job.submitted_at.elapsed().as_millis() as u64;
    tracing::debug!(job_id = %job.id, slot, queue_wait_ms, "Job running");

    let engine = Arc::clone(engine);
    let payload = job.payload.clone();
    let call = tokio::task::spawn_blocking(move || match payload {
        JobPayload::Process(request) => engine.process(&request).map(JobResult::Tasks),
        JobPayload::WordFrequency(request) => {
            engine.word_frequency(&request).map(JobResult::Frequency)
        }
    });

    // The deadline clock starts here, at execution -- not at enqueue.
    let outcome = match tokio::time::timeout(job_timeout, call).await {
        Ok(Ok(Ok(result))) => {
            tracing::debug!(job_id = %job.id, slot, "Job completed");
            JobOutcome::Completed(result)
        }
        Ok(Ok(Err(e))) => {
            tracing::warn!(job_id = %job.id, slot, error = %e, "Job failed");
            JobOutcome::Failed(e.to_string())
        }
        Ok(Err(join_err)) => {
            tracing::error!(job_id = %job.id, slot, error = %join_err, "Analysis call panicked");
            JobOutcome::Failed("Analysis engine panicked".to_string())
        }
        Err(_) => {
            // Abandon the in-flight call: dropping the JoinHandle detaches
            // the blocking task. It may run to completion eventually; its
            // result is discarded and the slot is free now.
            tracing::warn!(
                job_id = %job.id,
                slot,
                timeout_secs = job_timeout.as_secs(),
                "Job exceeded execution deadline",
            );
            JobOutcome::TimedOut
        }
    };

    // The submitter may have gone away (client disconnect); not an error.
    let _ = job.done.send(outcome);
}
