//! Prompt construction for a single generation attempt
//!
//! Each attempt gets randomly drawn building blocks (profession, age, life
//! context, chat quirk, traits and a name) and the reference sample rendered
//! as JSON lines the model is told to steer away from.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;

use crate::error::{GeneratorError, GeneratorResult};
use crate::types::{ChatMessage, ReferenceSample};

/// Default age bounds for professions that do not declare their own
pub const DEFAULT_MIN_AGE: u32 = 19;
pub const DEFAULT_MAX_AGE: u32 = 75;

/// Trait draws per attempt before de-duplication
pub const TRAIT_DRAWS: usize = 6;

const SYSTEM_PROMPT: &str = "You are a persona generator. Reply with exactly one JSON object \
that follows the provided schema. Do not add commentary or any text outside the object.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightedValue {
    pub value: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profession {
    pub value: String,
    pub weight: f64,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
}

impl Profession {
    pub fn age_range(&self) -> (u32, u32) {
        (
            self.min_age.unwrap_or(DEFAULT_MIN_AGE),
            self.max_age.unwrap_or(DEFAULT_MAX_AGE),
        )
    }
}

/// Weighted building blocks loaded from `persona_components.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonaComponents {
    pub professions: Vec<Profession>,
    pub life_contexts: Vec<WeightedValue>,
    pub chatting_quirks: Vec<WeightedValue>,
    pub traits: Vec<WeightedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamePool {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
}

/// Building blocks drawn for one attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub name: String,
    pub profession: String,
    pub age: u32,
    pub life_context: String,
    pub chat_quirk: String,
    pub traits: Vec<String>,
}

/// Weighted table with its sampling distribution built once up front
#[derive(Debug, Clone)]
struct WeightedTable<T> {
    items: Vec<T>,
    index: WeightedIndex<f64>,
}

impl<T> WeightedTable<T> {
    fn new(label: &str, items: Vec<T>, weight: impl Fn(&T) -> f64) -> GeneratorResult<Self> {
        let index = WeightedIndex::new(items.iter().map(&weight))
            .map_err(|e| GeneratorError::config(format!("invalid weights for {label}: {e}")))?;
        Ok(Self { items, index })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.items[self.index.sample(rng)]
    }
}

/// Renders the chat messages for each attempt
#[derive(Debug, Clone)]
pub struct PromptComposer {
    professions: WeightedTable<Profession>,
    life_contexts: WeightedTable<WeightedValue>,
    chatting_quirks: WeightedTable<WeightedValue>,
    traits: WeightedTable<WeightedValue>,
    names: NamePool,
}

impl PromptComposer {
    pub fn new(components: PersonaComponents, names: NamePool) -> GeneratorResult<Self> {
        if names.first_names.is_empty() || names.last_names.is_empty() {
            return Err(GeneratorError::config("first and last name lists must not be empty"));
        }
        if let Some(bad) = components.professions.iter().find(|p| {
            let (min, max) = p.age_range();
            min > max
        }) {
            return Err(GeneratorError::config(format!(
                "profession '{}' has min_age above max_age",
                bad.value
            )));
        }

        Ok(Self {
            professions: WeightedTable::new("professions", components.professions, |p| p.weight)?,
            life_contexts: WeightedTable::new("life_contexts", components.life_contexts, |v| v.weight)?,
            chatting_quirks: WeightedTable::new("chatting_quirks", components.chatting_quirks, |v| v.weight)?,
            traits: WeightedTable::new("traits", components.traits, |v| v.weight)?,
            names,
        })
    }

    pub fn draw_constraints<R: Rng + ?Sized>(&self, rng: &mut R) -> Constraints {
        let profession = self.professions.draw(rng);
        let (min_age, max_age) = profession.age_range();

        let mut traits: Vec<String> = Vec::with_capacity(TRAIT_DRAWS);
        for _ in 0..TRAIT_DRAWS {
            let candidate = &self.traits.draw(rng).value;
            if !traits.contains(candidate) {
                traits.push(candidate.clone());
            }
        }

        Constraints {
            name: self.random_name(rng),
            profession: profession.value.clone(),
            age: rng.gen_range(min_age..=max_age),
            life_context: self.life_contexts.draw(rng).value.clone(),
            chat_quirk: self.chatting_quirks.draw(rng).value.clone(),
            traits,
        }
    }

    /// Messages for one attempt with freshly drawn constraints
    pub fn compose<R: Rng + ?Sized>(&self, sample: &ReferenceSample, rng: &mut R) -> Vec<ChatMessage> {
        let constraints = self.draw_constraints(rng);
        self.render(sample, &constraints)
    }

    pub fn render(&self, sample: &ReferenceSample, constraints: &Constraints) -> Vec<ChatMessage> {
        let references = sample
            .personas
            .iter()
            .filter_map(|p| serde_json::to_string(p.as_ref()).ok())
            .collect::<Vec<_>>()
            .join("\n");

        let Constraints {
            name,
            profession,
            age,
            life_context,
            chat_quirk,
            traits,
        } = constraints;

        let instruction = format!(
            "Personas generated so far are listed below. Do not reuse their themes or come too close to any of them:\n\
             {references}\n\n\
             ---\n\
             Write a NEW, believable persona that blends the following building blocks into one coherent person \
             instead of listing them.\n\n\
             BUILDING BLOCKS:\n\
             - Profession: {profession}\n\
             - Age: {age}\n\
             - Life context: currently {life_context}\n\
             - Personality: {traits}\n\
             - Base chat style: \"{chat_quirk}\"\n\n\
             ---\n\
             Return one JSON object for a persona named '{name}'.\n\
             - traits: 3 to 6 adjectives from the personality list that fit the finished character.\n\
             - background: one or two specific sentences (at most 300 characters) tying profession, age and life context together.\n\
             - chatting_style: at most 120 characters describing how a {age}-year-old {profession} would use or bend \"{chat_quirk}\".\n\
             Output only the JSON object.",
            traits = traits.join(", "),
        );

        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(instruction)]
    }

    fn random_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let first = &self.names.first_names[rng.gen_range(0..self.names.first_names.len())];
        let last = &self.names.last_names[rng.gen_range(0..self.names.last_names.len())];
        format!("{first} {last}")
    }
}
