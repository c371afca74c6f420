//! Reference pool of accepted personas
//!
//! The pool starts as the bootstrap seed set and only ever grows. Samples
//! share the stored personas through `Arc`, so nothing handed out can change
//! what the pool holds.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use shared::Persona;
use crate::error::{GeneratorError, GeneratorResult};
use crate::types::{ReferenceSample, SampleOrigin};

/// How references are chosen for each logical attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    /// References per attempt
    pub references: usize,
    /// Most recent pool entries eligible between resets
    pub lookback: usize,
    /// Every Nth logical attempt samples only seeds, 0 disables
    pub reset_every: usize,
}

impl SamplingPolicy {
    /// Whether the attempt at `index` must draw from the seed set only.
    /// Index 0 is excluded: the pool is still exactly the seed set then.
    pub fn is_reset(&self, index: usize) -> bool {
        self.reset_every > 0 && index > 0 && index % self.reset_every == 0
    }
}

/// Append-only pool of personas used as few-shot context
#[derive(Debug)]
pub struct ReferencePool {
    records: Vec<Arc<Persona>>,
    seed_len: usize,
}

impl ReferencePool {
    /// Create a pool from the bootstrap set. An empty set is a configuration
    /// error since drift resets would have nothing to fall back to.
    pub fn new(seeds: Vec<Persona>) -> GeneratorResult<Self> {
        if seeds.is_empty() {
            return Err(GeneratorError::config(
                "bootstrap persona set is empty, reference sampling needs at least one seed",
            ));
        }

        let seed_len = seeds.len();
        Ok(Self {
            records: seeds.into_iter().map(Arc::new).collect(),
            seed_len,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn seed_len(&self) -> usize {
        self.seed_len
    }

    pub fn append(&mut self, persona: Persona) {
        self.records.push(Arc::new(persona));
    }

    /// The original bootstrap set
    pub fn seeds(&self) -> &[Arc<Persona>] {
        &self.records[..self.seed_len]
    }

    /// The last `window` entries (or the whole pool if it is smaller)
    pub fn recent(&self, window: usize) -> &[Arc<Persona>] {
        let start = self.records.len().saturating_sub(window);
        &self.records[start..]
    }

    /// Up to `n` personas drawn without replacement from the last `window` entries
    pub fn sample<R: Rng + ?Sized>(&self, window: usize, n: usize, rng: &mut R) -> ReferenceSample {
        ReferenceSample {
            origin: SampleOrigin::Recent,
            personas: Self::choose(self.recent(window), n, rng),
        }
    }

    /// Up to `n` personas drawn without replacement from the seed set only
    pub fn bootstrap_sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> ReferenceSample {
        ReferenceSample {
            origin: SampleOrigin::Bootstrap,
            personas: Self::choose(self.seeds(), n, rng),
        }
    }

    /// Pick the reference sample for the logical attempt `index`
    pub fn select<R: Rng + ?Sized>(&self, policy: &SamplingPolicy, index: usize, rng: &mut R) -> ReferenceSample {
        if policy.is_reset(index) {
            self.bootstrap_sample(policy.references, rng)
        } else {
            self.sample(policy.lookback, policy.references, rng)
        }
    }

    fn choose<R: Rng + ?Sized>(source: &[Arc<Persona>], n: usize, rng: &mut R) -> Vec<Arc<Persona>> {
        source.choose_multiple(rng, n).cloned().collect()
    }
}
