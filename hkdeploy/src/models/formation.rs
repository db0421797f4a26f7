//! Formation models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size class the platform treats as free tier. Free-tier apps are capped at
/// 2 dynos, which forbids batch formation updates.
pub const FREE_TIER_SIZE: &str = "Free";

/// Process type of a formation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Worker,
    Clock,
    #[serde(untagged)]
    Other(String),
}

impl ProcessType {
    /// Capitalized form used in operator-facing messages
    pub fn title(&self) -> &str {
        match self {
            ProcessType::Worker => "Worker",
            ProcessType::Clock => "Clock",
            ProcessType::Other(name) => name,
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessType::Worker => write!(f, "worker"),
            ProcessType::Clock => write!(f, "clock"),
            ProcessType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A formation entry as reported by the platform.
///
/// Fetched fresh on every scale call; remote state may have changed
/// out-of-band, so these are never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    /// Process type ('worker', 'clock', 'web', ...)
    #[serde(rename = "type")]
    pub process_type: ProcessType,

    /// Number of dynos currently running this process type
    pub quantity: u32,

    /// Dyno size class ('Free', 'standard-1X', ...)
    pub size: String,
}

/// A single formation change to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleUpdate {
    /// Process type to update
    #[serde(rename = "process")]
    pub process_type: ProcessType,

    /// Target number of dynos
    pub quantity: u32,

    /// Dyno size class, carried over from the current formation
    pub size: String,
}

/// Requested target quantities. `None` means "leave unchanged".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScaleTargets {
    pub worker: Option<u32>,
    pub clock: Option<u32>,
}

impl ScaleTargets {
    /// Targets that stop all background work (worker and clock to zero)
    pub fn quiesce() -> Self {
        Self {
            worker: Some(0),
            clock: Some(0),
        }
    }

    /// The requested quantity for a process type, if any
    pub fn target_for(&self, process_type: &ProcessType) -> Option<u32> {
        match process_type {
            ProcessType::Worker => self.worker,
            ProcessType::Clock => self.clock,
            ProcessType::Other(_) => None,
        }
    }
}
