//! Scripted model client and in-memory checkpoint sink

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use generator::{ApiFailure, CheckpointSink, GenerationRequest, GeneratorError, GeneratorResult, ModelClient};
use shared::Persona;
use super::fixtures::TestFixtures;

/// What the scripted client does for a given call number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Persona,
    Fail,
    Panic,
}

type Script = dyn Fn(usize) -> Reply + Send + Sync;
type DelayFor = dyn Fn(usize) -> Duration + Send + Sync;

/// Model client that answers from a script, recording every request, when
/// each call started and finished, and the peak number of concurrent calls
#[derive(Clone)]
pub struct ScriptedClient {
    script: Arc<Script>,
    delay: Arc<DelayFor>,
    calls: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    timings: Arc<Mutex<Vec<(Instant, Instant)>>>,
}

impl ScriptedClient {
    pub fn new(script: impl Fn(usize) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            script: Arc::new(script),
            delay: Arc::new(|_| Duration::from_millis(1)),
            calls: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            timings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always_succeeds() -> Self {
        Self::new(|_| Reply::Persona)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Arc::new(move |_| delay);
        self
    }

    /// Response delay chosen by attempt index
    pub fn with_delay_for(mut self, delay: impl Fn(usize) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(started, finished)` per call, in completion order
    pub fn timings(&self) -> Vec<(Instant, Instant)> {
        self.timings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Persona, ApiFailure> {
        let started = Instant::now();
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        let delay = (self.delay)(request.attempt);
        self.requests.lock().unwrap().push(request);

        tokio::time::sleep(delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.timings.lock().unwrap().push((started, Instant::now()));

        match (self.script)(call) {
            Reply::Persona => Ok(TestFixtures::generated(call)),
            Reply::Fail => Err(ApiFailure::RateLimitExceeded),
            Reply::Panic => panic!("scripted panic on call {call}"),
        }
    }
}

/// Checkpoint sink that keeps every flushed batch in memory and can be told
/// to fail the next few flushes
#[derive(Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Vec<Persona>>>>,
    failures_left: Arc<AtomicUsize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, flushes: usize) {
        self.failures_left.store(flushes, Ordering::SeqCst);
    }

    /// Every successful flush call, including empty ones
    pub fn batches(&self) -> Vec<Vec<Persona>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<Persona> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl CheckpointSink for MemorySink {
    async fn flush(&mut self, records: &[Persona]) -> GeneratorResult<usize> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(GeneratorError::persistence(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }

        self.batches.lock().unwrap().push(records.to_vec());
        Ok(records.len())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}
