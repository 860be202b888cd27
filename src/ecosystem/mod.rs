//! Population lifecycle, AI state machines, and steering

pub mod agent;
pub mod ai;
pub mod simulator;
pub mod steering;

pub use agent::{Agent, AiState, Direction};
pub use simulator::Ecosystem;
