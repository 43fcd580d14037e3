use crate::{
    client::GenerationClient,
    config::OrchestratorConfig,
    error::JobError,
    observable::Observable,
    store::ArtifactStore,
    types::{GenerationRequest, JobPhase, JobProgress, JobSummary, OutputDescriptor, OutputFailure},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::time::Instant;

type CompletionCallback = Box<dyn FnMut(&JobSummary) + Send>;

fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives one generation job at a time: submit, wait with progress
/// estimation, download outputs, persist them.
///
/// The orchestrator publishes its user-facing state through four
/// [`Observable`] cells (progress fraction, percentage text, submit-enabled,
/// progress-hidden) and fires a completion callback once per finished job.
/// Only one job can be in flight; [`submit()`](Self::submit) rejects a
/// second request with [`JobError::AlreadyRunning`].
///
/// Waiting combines two signals: a steady tick publishes
/// `elapsed / expected_duration` as the progress estimate, while the order
/// status is polled for genuine completion. The wait ends as soon as the
/// service signals completion, or at the latest when the budget is
/// exhausted.
///
/// Observable subscribers run synchronously on the task driving `submit`;
/// a UI shell marshals to its own context inside its subscriber.
///
/// # Example
///
/// ```no_run
/// use neural_gallery::{
///     ArtifactStore, GenerationRequest, JobOrchestrator, NeuralClient, OrchestratorConfig,
/// };
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(ArtifactStore::open(None)?);
/// let client = NeuralClient::new("https://api.example.com/v1");
/// let orchestrator = JobOrchestrator::new(client, Arc::clone(&store), OrchestratorConfig::default());
///
/// orchestrator.progress_text().subscribe(|t| println!("{}", t));
/// let summary = orchestrator.submit(&GenerationRequest::default()).await?;
/// println!("saved {} of {}", summary.saved, summary.total);
/// # Ok(())
/// # }
/// ```
pub struct JobOrchestrator<C: GenerationClient> {
    client: C,
    store: Arc<ArtifactStore>,
    config: OrchestratorConfig,
    phase: Mutex<JobPhase>,
    cancel_requested: AtomicBool,
    progress: Observable<f32>,
    progress_text: Observable<String>,
    submit_enabled: Observable<bool>,
    progress_hidden: Observable<bool>,
    on_complete: Mutex<Option<CompletionCallback>>,
}

impl<C: GenerationClient> JobOrchestrator<C> {
    /// Create an orchestrator over the given client and store.
    pub fn new(client: C, store: Arc<ArtifactStore>, config: OrchestratorConfig) -> Self {
        Self {
            client,
            store,
            config,
            phase: Mutex::new(JobPhase::Idle),
            cancel_requested: AtomicBool::new(false),
            progress: Observable::new(0.0),
            progress_text: Observable::new("0 %".to_string()),
            submit_enabled: Observable::new(true),
            progress_hidden: Observable::new(true),
            on_complete: Mutex::new(None),
        }
    }

    /// Estimated completion fraction in `[0, 1]`.
    pub fn progress_fraction(&self) -> &Observable<f32> {
        &self.progress
    }

    /// Human-readable percentage, e.g. `"42 %"`.
    pub fn progress_text(&self) -> &Observable<String> {
        &self.progress_text
    }

    /// Whether a new job may be submitted (no job in flight).
    pub fn submit_enabled(&self) -> &Observable<bool> {
        &self.submit_enabled
    }

    /// Whether the progress UI should be hidden (no job in flight).
    pub fn progress_hidden(&self) -> &Observable<bool> {
        &self.progress_hidden
    }

    /// Attach the completion callback, replacing any previous one. Fired
    /// exactly once per job, after its artifacts have been persisted.
    pub fn on_complete(&self, callback: impl FnMut(&JobSummary) + Send + 'static) {
        *lock_recover(&self.on_complete) = Some(Box::new(callback));
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> JobPhase {
        *lock_recover(&self.phase)
    }

    /// Derived snapshot of the current job's progress state.
    pub fn progress(&self) -> JobProgress {
        let fraction = self.progress.get();
        JobProgress {
            percent_complete: fraction,
            is_complete: fraction >= 1.0,
            is_submittable: self.submit_enabled.get(),
        }
    }

    /// Request cancellation of the job currently waiting. Safe to call at
    /// any time; a no-op when no job is in flight. A waiting job observes
    /// the flag on its next tick and aborts to Idle. Downloads already in
    /// flight are not interrupted mid-save.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Run one generation job to completion.
    ///
    /// Fails immediately with [`JobError::AlreadyRunning`] if a job is
    /// already in flight, leaving state and all published values untouched.
    /// Per-output fetch/persist failures do not fail the job; they are
    /// recorded in the returned [`JobSummary`].
    pub async fn submit(&self, request: &GenerationRequest) -> Result<JobSummary, JobError> {
        self.begin()?;
        self.cancel_requested.store(false, Ordering::SeqCst);

        self.submit_enabled.set(false);
        self.progress_hidden.set(false);
        self.publish_progress(0.0);

        let order_id = match self.client.submit_order(request).await {
            Ok(id) => id,
            Err(e) => {
                self.reset_idle();
                return Err(JobError::Submission(e));
            }
        };

        self.set_phase(JobPhase::Waiting);
        let outputs = match self.wait_for_outputs(&order_id).await {
            Ok(outputs) => outputs,
            Err(e) => {
                self.reset_idle();
                return Err(e);
            }
        };

        self.set_phase(JobPhase::Downloading);
        self.publish_progress(1.0);

        let summary = self.download_outputs(order_id, outputs).await;

        self.reset_idle();
        self.fire_complete(&summary);
        Ok(summary)
    }

    /// Atomically claim the Idle -> Submitting transition.
    fn begin(&self) -> Result<(), JobError> {
        let mut phase = lock_recover(&self.phase);
        if *phase != JobPhase::Idle {
            return Err(JobError::AlreadyRunning);
        }
        *phase = JobPhase::Submitting;
        Ok(())
    }

    fn set_phase(&self, phase: JobPhase) {
        *lock_recover(&self.phase) = phase;
    }

    fn reset_idle(&self) {
        self.set_phase(JobPhase::Idle);
        self.progress_hidden.set(true);
        self.submit_enabled.set(true);
    }

    fn publish_progress(&self, fraction: f32) {
        self.progress.set(fraction);
        self.progress_text
            .set(format!("{} %", (fraction * 100.0) as u32));
    }

    fn fire_complete(&self, summary: &JobSummary) {
        if let Some(cb) = lock_recover(&self.on_complete).as_mut() {
            cb(summary);
        }
    }

    /// Wait for the order to complete, publishing the elapsed-time progress
    /// estimate on every tick and polling the order status for genuine
    /// completion. Ends early when the service signals done; ends at the
    /// latest when the expected-duration budget is exhausted, in which case
    /// the descriptor list is resolved with one final fetch.
    async fn wait_for_outputs(&self, order_id: &str) -> Result<Vec<OutputDescriptor>, JobError> {
        let started = Instant::now();
        let mut next_poll = started;

        loop {
            if self.cancel_requested.load(Ordering::SeqCst) {
                return Err(JobError::Cancelled);
            }

            let elapsed = started.elapsed();
            let fraction =
                (elapsed.as_secs_f32() / self.config.expected_duration.as_secs_f32()).min(1.0);
            self.publish_progress(fraction);

            if elapsed >= self.config.expected_duration {
                break;
            }

            if Instant::now() >= next_poll {
                next_poll = Instant::now() + self.config.poll_interval;
                match self.client.fetch_outputs(order_id).await {
                    Ok(status) if status.completed => return Ok(status.outputs),
                    Ok(_) => {}
                    Err(e) => {
                        eprintln!(
                            "[neural-gallery] status poll for order {} failed: {}",
                            order_id, e
                        );
                    }
                }
            }

            tokio::time::sleep(self.config.tick_interval).await;
        }

        // Budget exhausted without a completion signal; resolve whatever
        // the service has.
        match self.client.fetch_outputs(order_id).await {
            Ok(status) => Ok(status.outputs),
            Err(e) => Err(JobError::OutputsUnavailable(e)),
        }
    }

    /// Download every output and persist it. Descriptors are fetched
    /// concurrently; the store's atomic check-and-insert keeps dedup intact
    /// even when saves race. A failure for one output is recorded and does
    /// not abort the rest.
    async fn download_outputs(
        &self,
        order_id: String,
        outputs: Vec<OutputDescriptor>,
    ) -> JobSummary {
        let total = outputs.len();

        let tasks = outputs.into_iter().map(|descriptor| async move {
            let caption = descriptor.caption.clone();
            let outcome = self.download_one(&descriptor).await;
            (caption, outcome)
        });
        let results = futures::future::join_all(tasks).await;

        let mut saved = 0;
        let mut duplicates = 0;
        let mut failures = Vec::new();
        for (caption, outcome) in results {
            match outcome {
                Ok(true) => saved += 1,
                Ok(false) => duplicates += 1,
                Err(error) => {
                    eprintln!("[neural-gallery] output '{}' failed: {}", caption, error);
                    failures.push(OutputFailure { caption, error });
                }
            }
        }

        JobSummary {
            order_id,
            total,
            saved,
            duplicates,
            failures,
        }
    }

    /// Fetch one output's preview and full bytes (concurrently) and save
    /// them. `Ok(true)` = newly persisted, `Ok(false)` = caption already
    /// stored. Fetch and persistence failures are reported the same way.
    async fn download_one(&self, descriptor: &OutputDescriptor) -> Result<bool, String> {
        let (preview, full) = futures::join!(
            self.client.fetch_bytes(&descriptor.preview_url),
            self.client.fetch_bytes(&descriptor.full_url)
        );

        let preview = preview.map_err(|e| format!("preview fetch failed: {}", e))?;
        let full = full.map_err(|e| format!("full fetch failed: {}", e))?;

        self.store
            .save(&descriptor.caption, &preview, &full)
            .map_err(|e| format!("save failed: {}", e))
    }
}
