//! Generator services implementations

pub mod checkpoint;
pub mod model_client;
pub mod seed;

#[cfg(test)]
pub mod tests;

pub use checkpoint::*;
pub use model_client::*;
pub use seed::SeedData;
