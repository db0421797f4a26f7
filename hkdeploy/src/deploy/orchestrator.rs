//! Deployment orchestrator
//!
//! Runs the ordered deploy protocol: resolve the push endpoint, prepare the
//! git remote, quiesce background dynos, optionally enter maintenance, push,
//! migrate, leave maintenance, rescale. Each step's failure short-circuits
//! the rest; nothing that already ran is rolled back.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::{PlatformApi, PlatformClient};
use crate::deploy::git::{GitCli, GitRemote};
use crate::deploy::scaler::Scaler;
use crate::errors::HelperError;
use crate::models::deployment::{AppIdentity, DeployOutcome, DeployRequest, DeployStage};
use crate::models::formation::ScaleTargets;
use crate::rendezvous::{LogStream, Rendezvous, DEFAULT_ACTIVITY_TIMEOUT};

const MIGRATE_COMMAND: &str = "rake db:migrate";

/// An error tagged with the deploy stage it occurred in
struct StagedError {
    stage: DeployStage,
    source: HelperError,
}

impl StagedError {
    fn at(stage: DeployStage, source: HelperError) -> Self {
        Self { stage, source }
    }
}

impl From<HelperError> for StagedError {
    fn from(source: HelperError) -> Self {
        // Anything not explicitly categorized is an unknown failure
        Self::at(DeployStage::Unknown, source)
    }
}

/// Orchestrates deploys for a single app.
///
/// Owns the app identity and the three collaborators (platform API, git,
/// log stream). Not reentrant: concurrent deploys against the same app must
/// be serialized by the caller.
pub struct Deployer {
    identity: AppIdentity,
    api: Arc<dyn PlatformApi>,
    git: Arc<dyn GitRemote>,
    stream: Arc<dyn LogStream>,
    activity_timeout: Duration,
}

impl Deployer {
    pub fn new(
        identity: AppIdentity,
        api: Arc<dyn PlatformApi>,
        git: Arc<dyn GitRemote>,
        stream: Arc<dyn LogStream>,
    ) -> Self {
        Self {
            identity,
            api,
            git,
            stream,
            activity_timeout: DEFAULT_ACTIVITY_TIMEOUT,
        }
    }

    /// Create a deployer with the real collaborators: the platform HTTP
    /// client, the git CLI in the current directory, and the rendezvous
    /// log stream
    pub fn connect(identity: AppIdentity) -> Result<Self, HelperError> {
        let api = Arc::new(PlatformClient::new(identity.api_key().clone())?);
        Ok(Self::new(
            identity,
            api,
            Arc::new(GitCli::new(".")),
            Arc::new(Rendezvous),
        ))
    }

    pub fn app_name(&self) -> &str {
        self.identity.app_name()
    }

    fn scaler(&self) -> Scaler {
        Scaler::new(self.api.clone(), self.app_name())
    }

    /// Deploy a branch. Never returns an error: every failure is folded
    /// into the outcome with the stage it occurred in.
    pub async fn deploy(&self, req: DeployRequest) -> DeployOutcome {
        let app = self.app_name();
        match self.run_deploy(&req).await {
            Ok(()) => {
                info!("Deployed {}", app);
                DeployOutcome::succeeded(format!("Deployed {}", app))
            }
            Err(StagedError { stage, source }) => {
                let message = match stage {
                    DeployStage::RemoteSetup => {
                        format!(
                            "Could not set up the {} remote, nothing was deployed. Error: {}",
                            app, source
                        )
                    }
                    _ => format!(
                        "FAILED TO DEPLOY {} at stage '{}'. The app may be scaled to zero \
                         or in maintenance mode and needs to be fixed manually. Error: {}",
                        app, stage, source
                    ),
                };
                error!("{}", message);
                DeployOutcome::failed(stage, message)
            }
        }
    }

    async fn run_deploy(&self, req: &DeployRequest) -> Result<(), StagedError> {
        if req.branch.is_empty() {
            return Err(StagedError::from(HelperError::ConfigError(
                "branch must not be empty".to_string(),
            )));
        }

        let app = self.app_name();

        // Resolve the push endpoint before touching anything
        let info = self
            .api
            .app_info(app)
            .await
            .map_err(|e| StagedError::at(DeployStage::RemoteSetup, e))?;
        let git_url = info
            .git_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                StagedError::at(
                    DeployStage::RemoteSetup,
                    HelperError::ApiError(format!("cannot determine git url for {}", app)),
                )
            })?;

        self.git
            .prepare_remote(app, &git_url)
            .await
            .map_err(|e| StagedError::at(DeployStage::RemoteSetup, e))?;

        // Quiesce background work before altering application state
        self.scaler()
            .scale(ScaleTargets::quiesce())
            .await
            .map_err(|e| StagedError::at(DeployStage::Scale, e))?;

        if req.enable_maintenance {
            self.maintenance(true).await?;
        }

        self.git
            .push(app, &req.branch)
            .await
            .map_err(|e| StagedError::at(DeployStage::Push, e))?;

        self.migrate()
            .await
            .map_err(|e| StagedError::at(DeployStage::Migrate, e))?;

        if req.enable_maintenance {
            self.maintenance(false).await?;
        }

        self.scaler()
            .scale(ScaleTargets {
                worker: req.worker,
                clock: req.clock,
            })
            .await
            .map_err(|e| StagedError::at(DeployStage::Scale, e))?;

        Ok(())
    }

    /// Scale the app's worker and clock formations
    pub async fn scale(&self, targets: ScaleTargets) -> Result<(), HelperError> {
        self.scaler().scale(targets).await
    }

    /// Toggle the app's maintenance mode
    pub async fn maintenance(&self, enabled: bool) -> Result<(), HelperError> {
        let app = self.app_name();
        if enabled {
            info!("Enabling maintenance for {}", app);
        } else {
            info!("Disabling maintenance for {}", app);
        }
        self.api.set_maintenance(app, enabled).await
    }

    /// Run the database migration in a one-off dyno and stream its output.
    ///
    /// Failing to create the dyno is an error; failing to capture its output
    /// is not — the migration may still complete on the remote side, so
    /// stream errors are downgraded to warnings.
    pub async fn migrate(&self) -> Result<(), HelperError> {
        let app = self.app_name();
        let dyno = self.api.run_command(app, MIGRATE_COMMAND).await?;

        info!("Running migrations");
        match dyno.attach_url {
            Some(url) => {
                if let Err(e) = self.stream.attach(&url, self.activity_timeout).await {
                    warn!("Error capturing output for dyno: {}", e);
                }
            }
            None => warn!("Migration dyno has no attach URL, output not captured"),
        }

        Ok(())
    }

    /// Restart all of the app's dynos
    pub async fn restart(&self) -> Result<(), HelperError> {
        let app = self.app_name();
        self.api.restart_all(app).await?;
        info!("{} restarted", app);
        Ok(())
    }

    /// Report the version label of the latest build
    pub async fn version(&self) -> Result<String, HelperError> {
        let app = self.app_name();
        let builds = self.api.list_builds(app).await?;
        let version = builds
            .last()
            .and_then(|build| build.source_blob.version.clone())
            .ok_or_else(|| {
                HelperError::ApiError(format!("no build version available for {}", app))
            })?;
        info!("{}::version {}", app, version);
        Ok(version)
    }
}
