//! Test fixtures shared by the generator integration suites

use std::time::Duration;

use generator::prompt::{NamePool, PersonaComponents, Profession, WeightedValue};
use generator::{PromptComposer, ReferencePool, SamplingPolicy, SchedulerConfig};
use shared::Persona;

pub struct TestFixtures;

impl TestFixtures {
    pub const SEED_COUNT: usize = 4;
    pub const SEED_PREFIX: &'static str = "Seed Person";
    pub const GENERATED_PREFIX: &'static str = "Generated";

    pub fn persona(name: &str) -> Persona {
        Persona {
            name: name.to_string(),
            username: None,
            age: 37,
            traits: vec!["methodical".to_string(), "warm".to_string()],
            background: format!("{name} keeps bees on a city rooftop."),
            chatting_style: "Careful punctuation, asks follow-up questions.".to_string(),
        }
    }

    pub fn seeds() -> Vec<Persona> {
        (0..Self::SEED_COUNT)
            .map(|i| Self::persona(&format!("{} {}", Self::SEED_PREFIX, i)))
            .collect()
    }

    pub fn generated(call: usize) -> Persona {
        Self::persona(&format!("{} {}", Self::GENERATED_PREFIX, call))
    }

    pub fn pool() -> ReferencePool {
        ReferencePool::new(Self::seeds()).unwrap()
    }

    pub fn composer() -> PromptComposer {
        let weighted = |value: &str| WeightedValue {
            value: value.to_string(),
            weight: 1.0,
        };
        let components = PersonaComponents {
            professions: vec![Profession {
                value: "ferry mechanic".to_string(),
                weight: 1.0,
                min_age: Some(25),
                max_age: Some(60),
            }],
            life_contexts: vec![weighted("learning the cello")],
            chatting_quirks: vec![weighted("signs off every message")],
            traits: vec![weighted("frank"), weighted("restless"), weighted("kind")],
        };
        let names = NamePool {
            first_names: vec!["Rowan".to_string()],
            last_names: vec!["Ellery".to_string()],
        };
        PromptComposer::new(components, names).unwrap()
    }

    /// Fast settings: no backoff, small checkpoint interval
    pub fn scheduler_config(target: usize, concurrency: usize, checkpoint_every: usize) -> SchedulerConfig {
        SchedulerConfig {
            target,
            concurrency,
            checkpoint_every,
            failure_backoff: Duration::ZERO,
            sampling: SamplingPolicy {
                references: 3,
                lookback: 20,
                reset_every: 50,
            },
            temperature: 0.8,
            max_tokens: 512,
        }
    }
}
