//! Deployment models

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Credentials and name of the app a deployment targets.
///
/// The API key is wrapped in a `SecretString` so it is redacted in Debug
/// output and never logged.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    api_key: SecretString,
    app_name: String,
}

impl AppIdentity {
    pub fn new(api_key: SecretString, app_name: impl Into<String>) -> Self {
        Self {
            api_key,
            app_name: app_name.into(),
        }
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

/// A request to deploy a branch
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Local git ref to push to the remote's master line
    pub branch: String,

    /// Target worker quantity after the deploy (`None` = leave unchanged)
    pub worker: Option<u32>,

    /// Target clock quantity after the deploy (`None` = leave unchanged)
    pub clock: Option<u32>,

    /// Put the app into maintenance mode around push + migration
    pub enable_maintenance: bool,
}

/// Stage at which a deploy failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployStage {
    RemoteSetup,
    Push,
    Migrate,
    Scale,
    Unknown,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStage::RemoteSetup => write!(f, "remote-setup"),
            DeployStage::Push => write!(f, "push"),
            DeployStage::Migrate => write!(f, "migrate"),
            DeployStage::Scale => write!(f, "scale"),
            DeployStage::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of a deploy, built once and never mutated after return
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub success: bool,
    pub failure_stage: Option<DeployStage>,
    pub message: String,
}

impl DeployOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            failure_stage: None,
            message: message.into(),
        }
    }

    pub fn failed(stage: DeployStage, message: impl Into<String>) -> Self {
        Self {
            success: false,
            failure_stage: Some(stage),
            message: message.into(),
        }
    }
}
