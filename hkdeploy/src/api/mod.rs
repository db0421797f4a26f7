//! Platform API facade
//!
//! `PlatformApi` is the seam between the deploy/scale logic and the remote
//! platform. `PlatformClient` implements it over HTTP; tests substitute
//! fakes.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::HelperError;
use crate::models::formation::{Formation, ProcessType, ScaleUpdate};

pub mod apps;
pub mod builds;
pub mod client;
pub mod dynos;
pub mod formations;

pub use client::PlatformClient;

/// App details returned by the platform
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfo {
    /// App name
    #[serde(default)]
    pub name: String,

    /// Endpoint code is pushed to; absent when the app has no git remote
    pub git_url: Option<String>,

    /// Whether the app is currently in maintenance mode
    #[serde(default)]
    pub maintenance: bool,
}

/// A one-off dyno created with `attach: true`
#[derive(Debug, Clone, Deserialize)]
pub struct AttachedDyno {
    /// Dyno name (e.g. "run.1")
    #[serde(default)]
    pub name: String,

    /// Rendezvous URL for the dyno's live output
    pub attach_url: Option<String>,
}

/// One entry of the app's build list
#[derive(Debug, Clone, Deserialize)]
pub struct Build {
    pub source_blob: SourceBlob,
}

/// Origin of a build's source code
#[derive(Debug, Clone, Deserialize)]
pub struct SourceBlob {
    /// Version label supplied when the build was created
    pub version: Option<String>,
}

/// Remote operations the orchestrator and scaler depend on.
///
/// Every call is a synchronous remote round-trip that may fail with a
/// transport or authorization error; no call is retried.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn app_info(&self, app: &str) -> Result<AppInfo, HelperError>;

    async fn set_maintenance(&self, app: &str, enabled: bool) -> Result<(), HelperError>;

    async fn run_command(&self, app: &str, command: &str) -> Result<AttachedDyno, HelperError>;

    async fn restart_all(&self, app: &str) -> Result<(), HelperError>;

    async fn list_formations(&self, app: &str) -> Result<Vec<Formation>, HelperError>;

    async fn update_formation(
        &self,
        app: &str,
        process_type: &ProcessType,
        quantity: u32,
    ) -> Result<(), HelperError>;

    async fn batch_update_formations(
        &self,
        app: &str,
        updates: &[ScaleUpdate],
    ) -> Result<(), HelperError>;

    async fn list_builds(&self, app: &str) -> Result<Vec<Build>, HelperError>;
}

#[async_trait]
impl PlatformApi for PlatformClient {
    async fn app_info(&self, app: &str) -> Result<AppInfo, HelperError> {
        PlatformClient::app_info(self, app).await
    }

    async fn set_maintenance(&self, app: &str, enabled: bool) -> Result<(), HelperError> {
        PlatformClient::set_maintenance(self, app, enabled).await
    }

    async fn run_command(&self, app: &str, command: &str) -> Result<AttachedDyno, HelperError> {
        PlatformClient::run_command(self, app, command).await
    }

    async fn restart_all(&self, app: &str) -> Result<(), HelperError> {
        PlatformClient::restart_all(self, app).await
    }

    async fn list_formations(&self, app: &str) -> Result<Vec<Formation>, HelperError> {
        PlatformClient::list_formations(self, app).await
    }

    async fn update_formation(
        &self,
        app: &str,
        process_type: &ProcessType,
        quantity: u32,
    ) -> Result<(), HelperError> {
        PlatformClient::update_formation(self, app, process_type, quantity).await
    }

    async fn batch_update_formations(
        &self,
        app: &str,
        updates: &[ScaleUpdate],
    ) -> Result<(), HelperError> {
        PlatformClient::batch_update_formations(self, app, updates).await
    }

    async fn list_builds(&self, app: &str) -> Result<Vec<Build>, HelperError> {
        PlatformClient::list_builds(self, app).await
    }
}
