//! Order-insensitive persona fingerprint and first-occurrence deduplication

use std::collections::{BTreeSet, HashSet};

use shared::{ConsolidatedPersona, Persona};

/// Fingerprint of a persona's semantic fields. Traits compare as a set, so
/// reordering or repeating a trait does not make a record unique. `username`
/// and the consolidation stamps are not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    name: String,
    age: u32,
    traits: BTreeSet<String>,
    background: String,
    chatting_style: String,
}

impl DedupKey {
    pub fn of(persona: &Persona) -> Self {
        Self {
            name: persona.name.clone(),
            age: persona.age,
            traits: persona.traits.iter().cloned().collect(),
            background: persona.background.clone(),
            chatting_style: persona.chatting_style.clone(),
        }
    }
}

/// Keep the first record for every key, preserving input order
pub fn dedup_first(records: Vec<ConsolidatedPersona>) -> Vec<ConsolidatedPersona> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(DedupKey::of(&record.persona)))
        .collect()
}
