//! Common test utilities for the generator suites

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{MemorySink, Reply, ScriptedClient};
