//! Bounded-concurrency generation scheduler
//!
//! A single control loop owns the reference pool and the checkpoint buffer.
//! Attempts run as spawned tasks that each wrap one remote call and report
//! back over an mpsc channel, so pool and buffer are only ever touched from
//! the loop itself:
//!
//! - launch attempts while `accepted + in_flight < target` and a slot is free
//! - wait for at least one completion, then drain every completion already queued
//! - flush the pending buffer after every `checkpoint_every` acceptances
//! - flush whatever is left once the loop ends
//!
//! Failed attempts are never retried. They hold their slot for the backoff
//! delay and are then replaced by a fresh attempt with a new sample.

use futures_util::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

use shared::{process_debug, process_error, process_info, process_warn, Persona, ProcessId};
use crate::config::SchedulerConfig;
use crate::core::pool::ReferencePool;
use crate::core::prompt::PromptComposer;
use crate::error::GeneratorResult;
use crate::traits::{CheckpointSink, ModelClient};
use crate::types::{
    ApiFailure, AttemptOutcome, AttemptResult, GenerationRequest, RunSummary, SampleOrigin,
};

#[derive(Debug, Default, Clone, Copy)]
struct RunCounters {
    accepted: usize,
    reset_accepted: usize,
    launched: usize,
    failed: usize,
    intermediate_flushes: usize,
    records_written: usize,
}

pub struct Scheduler<C, S>
where
    C: ModelClient + 'static,
    S: CheckpointSink,
{
    config: SchedulerConfig,
    client: Arc<C>,
    composer: PromptComposer,
    pool: ReferencePool,
    sink: S,
    pending: Vec<Persona>,
    rng: StdRng,
    counters: RunCounters,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Option<mpsc::Receiver<()>>,
}

impl<C, S> Scheduler<C, S>
where
    C: ModelClient + 'static,
    S: CheckpointSink,
{
    pub fn new(config: SchedulerConfig, client: C, composer: PromptComposer, pool: ReferencePool, sink: S) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            config,
            client: Arc::new(client),
            composer,
            pool,
            sink,
            pending: Vec::new(),
            rng: StdRng::from_entropy(),
            counters: RunCounters::default(),
            shutdown_tx,
            shutdown_rx: Some(shutdown_rx),
        }
    }

    /// Use a deterministic random source for sampling and prompt constraints
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Sender that stops new launches; in-flight attempts still resolve and
    /// the remainder is flushed before `run` returns
    pub fn shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn pool(&self) -> &ReferencePool {
        &self.pool
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Accepted personas not yet written to the checkpoint
    pub fn pending(&self) -> &[Persona] {
        &self.pending
    }

    /// Drive accepted count to the target, then flush the remainder.
    ///
    /// The summary is logged even when the final flush fails; in that case
    /// the error is returned and the records stay in `pending()` so
    /// `flush_pending` can be called again.
    pub async fn run(&mut self) -> GeneratorResult<RunSummary> {
        let target = self.config.target;
        process_info!(
            ProcessId::current(),
            "🚀 Starting persona generation. Target: {}, concurrency: {}, checkpoint every: {}, drift reset every: {}",
            target,
            self.config.concurrency,
            self.config.checkpoint_every,
            self.config.sampling.reset_every
        );
        process_info!(ProcessId::current(), "💾 Output: {}", self.sink.destination());

        let (outcome_tx, mut outcome_rx) = mpsc::channel::<AttemptOutcome>(self.config.concurrency.max(1));
        let mut shutdown_rx = self.shutdown_rx.take();
        let mut in_flight = 0usize;
        let mut interrupted = false;

        loop {
            if !interrupted {
                while in_flight < self.config.concurrency && self.counters.accepted + in_flight < target {
                    let index = self.counters.accepted + in_flight;
                    self.launch(index, outcome_tx.clone());
                    in_flight += 1;
                }
            }

            if in_flight == 0 {
                break;
            }

            tokio::select! {
                // outcome_tx lives for the whole loop, so recv() only yields Some
                Some(outcome) = outcome_rx.recv() => {
                    in_flight -= 1;
                    self.handle_outcome(outcome).await;

                    while let Ok(outcome) = outcome_rx.try_recv() {
                        in_flight -= 1;
                        self.handle_outcome(outcome).await;
                    }
                }
                _ = wait_for_shutdown(&mut shutdown_rx), if !interrupted => {
                    interrupted = true;
                    process_warn!(
                        ProcessId::current(),
                        "🛑 Shutdown requested, waiting for {} in-flight attempts",
                        in_flight
                    );
                }
            }
        }

        if !self.pending.is_empty() {
            process_info!(
                ProcessId::current(),
                "💾 FINAL SAVE: writing {} remaining personas to {}",
                self.pending.len(),
                self.sink.destination()
            );
        }
        let final_flush = self.flush_pending().await;

        let summary = self.summary(interrupted);
        process_info!(
            ProcessId::current(),
            "🏁 Target of {} requested, {} personas accepted ({} from seed-only resets, {} attempts launched, {} failed, {} written to {})",
            summary.requested,
            summary.accepted,
            summary.reset_accepted,
            summary.launched,
            summary.failed,
            summary.records_written,
            summary.destination
        );

        final_flush?;
        Ok(summary)
    }

    /// Hand the whole pending buffer to the sink; cleared only on success
    pub async fn flush_pending(&mut self) -> GeneratorResult<usize> {
        let written = self.sink.flush(&self.pending).await?;
        self.counters.records_written += written;
        self.pending.clear();
        Ok(written)
    }

    fn summary(&self, interrupted: bool) -> RunSummary {
        RunSummary {
            requested: self.config.target,
            accepted: self.counters.accepted,
            reset_accepted: self.counters.reset_accepted,
            launched: self.counters.launched,
            failed: self.counters.failed,
            intermediate_flushes: self.counters.intermediate_flushes,
            records_written: self.counters.records_written,
            unflushed: self.pending.len(),
            destination: self.sink.destination(),
            interrupted,
        }
    }

    fn launch(&mut self, index: usize, outcome_tx: mpsc::Sender<AttemptOutcome>) {
        let sample = self.pool.select(&self.config.sampling, index, &mut self.rng);
        if sample.origin == SampleOrigin::Bootstrap {
            process_info!(
                ProcessId::current(),
                "🔄 Attempt {}: resetting reference context to seed personas",
                index
            );
        }

        let request = GenerationRequest {
            attempt: index,
            messages: self.composer.compose(&sample, &mut self.rng),
            schema: Persona::json_schema(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let client = Arc::clone(&self.client);
        let backoff = self.config.failure_backoff;
        let origin = sample.origin;
        self.counters.launched += 1;

        tokio::spawn(async move {
            let result = match AssertUnwindSafe(client.generate(request)).catch_unwind().await {
                Ok(Ok(persona)) => match persona.validate() {
                    Ok(()) => AttemptResult::Succeeded(persona),
                    Err(e) => AttemptResult::Failed(ApiFailure::InvalidPayload(e.to_string())),
                },
                Ok(Err(failure)) => AttemptResult::Failed(failure),
                Err(_) => AttemptResult::Failed(ApiFailure::AttemptPanicked),
            };

            if matches!(result, AttemptResult::Failed(_)) {
                tokio::time::sleep(backoff).await;
            }

            let outcome = AttemptOutcome {
                attempt: index,
                origin,
                result,
            };
            // Receiver only goes away if run() itself was dropped
            let _ = outcome_tx.send(outcome).await;
        });
    }

    async fn handle_outcome(&mut self, outcome: AttemptOutcome) {
        match outcome.result {
            AttemptResult::Succeeded(persona) => {
                self.counters.accepted += 1;
                let reset_marker = if outcome.origin == SampleOrigin::Bootstrap {
                    self.counters.reset_accepted += 1;
                    " [seed references]"
                } else {
                    ""
                };
                process_info!(
                    ProcessId::current(),
                    "✅ ({}/{}) Generated: {}{}",
                    self.counters.accepted,
                    self.config.target,
                    persona.name,
                    reset_marker
                );

                self.pool.append(persona.clone());
                self.pending.push(persona);

                if self.config.checkpoint_every > 0 && self.counters.accepted % self.config.checkpoint_every == 0 {
                    self.checkpoint().await;
                }
            }
            AttemptResult::Failed(failure) => {
                self.counters.failed += 1;
                process_warn!(
                    ProcessId::current(),
                    "⚠️ Attempt {} failed: {}. Slot released for a fresh attempt",
                    outcome.attempt,
                    failure
                );
            }
        }
    }

    async fn checkpoint(&mut self) {
        let batch = self.pending.len();
        process_info!(
            ProcessId::current(),
            "💾 CHECKPOINT: saving {} personas to {}",
            batch,
            self.sink.destination()
        );

        match self.flush_pending().await {
            Ok(written) => {
                self.counters.intermediate_flushes += 1;
                process_debug!(ProcessId::current(), "✅ Checkpoint complete ({} records)", written);
            }
            Err(e) => {
                process_error!(
                    ProcessId::current(),
                    "❌ Checkpoint failed, keeping {} personas buffered: {}",
                    batch,
                    e
                );
            }
        }
    }
}

/// Resolves once a shutdown is requested; never resolves without a receiver
async fn wait_for_shutdown(shutdown_rx: &mut Option<mpsc::Receiver<()>>) {
    match shutdown_rx {
        Some(rx) => {
            if rx.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}
