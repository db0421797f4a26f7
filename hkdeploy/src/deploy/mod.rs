//! Deploy orchestration

pub mod git;
pub mod orchestrator;
pub mod scaler;

pub use orchestrator::Deployer;
pub use scaler::Scaler;
