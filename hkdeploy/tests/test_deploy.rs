//! Deploy sequence tests against fake collaborators
//!
//! The fakes share one event log so tests can assert the exact order of
//! side effects across the platform API, git, and the log stream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use hkdeploy::api::{AppInfo, AttachedDyno, Build, PlatformApi, SourceBlob};
use hkdeploy::deploy::git::GitRemote;
use hkdeploy::deploy::Deployer;
use hkdeploy::errors::HelperError;
use hkdeploy::models::deployment::{AppIdentity, DeployRequest, DeployStage};
use hkdeploy::models::formation::{Formation, ProcessType, ScaleUpdate};
use hkdeploy::rendezvous::LogStream;

type Events = Arc<Mutex<Vec<String>>>;

struct FakePlatform {
    events: Events,
    git_url: Option<String>,
    formations: Vec<Formation>,
    builds: Vec<Build>,
    fail_run_command: bool,
}

impl FakePlatform {
    fn new(events: Events) -> Self {
        Self {
            events,
            git_url: Some("https://git.remote.example/demo-app.git".to_string()),
            formations: vec![Formation {
                process_type: ProcessType::Worker,
                quantity: 1,
                size: "standard-1X".to_string(),
            }],
            builds: Vec::new(),
            fail_run_command: false,
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn app_info(&self, _app: &str) -> Result<AppInfo, HelperError> {
        self.record("app_info");
        Ok(AppInfo {
            name: "demo-app".to_string(),
            git_url: self.git_url.clone(),
            maintenance: false,
        })
    }

    async fn set_maintenance(&self, _app: &str, enabled: bool) -> Result<(), HelperError> {
        self.record(if enabled {
            "maintenance:on"
        } else {
            "maintenance:off"
        });
        Ok(())
    }

    async fn run_command(&self, _app: &str, command: &str) -> Result<AttachedDyno, HelperError> {
        if self.fail_run_command {
            return Err(HelperError::ApiError("cannot create dyno".to_string()));
        }
        self.record(format!("run_command:{}", command));
        Ok(AttachedDyno {
            name: "run.1".to_string(),
            attach_url: Some("rendezvous://rendezvous.example:5000/secret".to_string()),
        })
    }

    async fn restart_all(&self, _app: &str) -> Result<(), HelperError> {
        self.record("restart_all");
        Ok(())
    }

    async fn list_formations(&self, _app: &str) -> Result<Vec<Formation>, HelperError> {
        self.record("list_formations");
        Ok(self.formations.clone())
    }

    async fn update_formation(
        &self,
        _app: &str,
        process_type: &ProcessType,
        quantity: u32,
    ) -> Result<(), HelperError> {
        self.record(format!("update:{}={}", process_type, quantity));
        Ok(())
    }

    async fn batch_update_formations(
        &self,
        _app: &str,
        updates: &[ScaleUpdate],
    ) -> Result<(), HelperError> {
        let summary = updates
            .iter()
            .map(|u| format!("{}={}", u.process_type, u.quantity))
            .collect::<Vec<_>>()
            .join(",");
        self.record(format!("batch:{}", summary));
        Ok(())
    }

    async fn list_builds(&self, _app: &str) -> Result<Vec<Build>, HelperError> {
        self.record("list_builds");
        Ok(self.builds.clone())
    }
}

struct FakeGit {
    events: Events,
    fail_push: bool,
}

#[async_trait]
impl GitRemote for FakeGit {
    async fn prepare_remote(&self, _remote: &str, _url: &str) -> Result<(), HelperError> {
        self.events.lock().unwrap().push("prepare_remote".to_string());
        Ok(())
    }

    async fn push(&self, _remote: &str, branch: &str) -> Result<(), HelperError> {
        if self.fail_push {
            return Err(HelperError::GitError("push rejected".to_string()));
        }
        self.events.lock().unwrap().push(format!("push:{}", branch));
        Ok(())
    }
}

struct FakeStream {
    events: Events,
    fail: bool,
}

#[async_trait]
impl LogStream for FakeStream {
    async fn attach(
        &self,
        _attach_url: &str,
        _activity_timeout: Duration,
    ) -> Result<(), HelperError> {
        if self.fail {
            return Err(HelperError::StreamError("connection reset".to_string()));
        }
        self.events.lock().unwrap().push("attach".to_string());
        Ok(())
    }
}

struct Harness {
    events: Events,
    deployer: Deployer,
}

fn harness(
    configure: impl FnOnce(&mut FakePlatform, &mut FakeGit, &mut FakeStream),
) -> Harness {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let mut api = FakePlatform::new(events.clone());
    let mut git = FakeGit {
        events: events.clone(),
        fail_push: false,
    };
    let mut stream = FakeStream {
        events: events.clone(),
        fail: false,
    };
    configure(&mut api, &mut git, &mut stream);

    let identity = AppIdentity::new(SecretString::from("test-key"), "demo-app");
    let deployer = Deployer::new(identity, Arc::new(api), Arc::new(git), Arc::new(stream));
    Harness { events, deployer }
}

fn request(branch: &str, worker: Option<u32>, maintenance: bool) -> DeployRequest {
    DeployRequest {
        branch: branch.to_string(),
        worker,
        clock: None,
        enable_maintenance: maintenance,
    }
}

fn events(harness: &Harness) -> Vec<String> {
    harness.events.lock().unwrap().clone()
}

#[tokio::test]
async fn test_deploy_without_git_url_fails_before_side_effects() {
    let h = harness(|api, _, _| api.git_url = None);

    let outcome = h.deployer.deploy(request("main", Some(1), true)).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_stage, Some(DeployStage::RemoteSetup));
    assert_eq!(events(&h), vec!["app_info"]);
}

#[tokio::test]
async fn test_deploy_empty_git_url_is_remote_setup_failure() {
    let h = harness(|api, _, _| api.git_url = Some(String::new()));

    let outcome = h.deployer.deploy(request("main", None, false)).await;

    assert_eq!(outcome.failure_stage, Some(DeployStage::RemoteSetup));
    assert_eq!(events(&h), vec!["app_info"]);
}

#[tokio::test]
async fn test_push_failure_after_scale_down_before_migrate() {
    let h = harness(|_, git, _| git.fail_push = true);

    let outcome = h.deployer.deploy(request("main", Some(1), false)).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_stage, Some(DeployStage::Push));
    // Scaled to zero exactly once, never migrated, never rescaled
    assert_eq!(
        events(&h),
        vec!["app_info", "prepare_remote", "list_formations", "batch:worker=0"]
    );
    assert!(outcome.message.contains("fixed manually"));
}

#[tokio::test]
async fn test_deploy_with_maintenance_window() {
    let h = harness(|_, _, _| {});

    let outcome = h.deployer.deploy(request("feature-x", Some(2), true)).await;

    assert!(outcome.success, "unexpected failure: {}", outcome.message);
    assert_eq!(
        events(&h),
        vec![
            "app_info",
            "prepare_remote",
            "list_formations",
            "batch:worker=0",
            "maintenance:on",
            "push:feature-x",
            "run_command:rake db:migrate",
            "attach",
            "maintenance:off",
            "list_formations",
            "batch:worker=2",
        ]
    );
}

#[tokio::test]
async fn test_deploy_without_maintenance_window() {
    let h = harness(|_, _, _| {});

    let outcome = h.deployer.deploy(request("main", Some(1), false)).await;

    assert!(outcome.success);
    let log = events(&h);
    assert!(!log.iter().any(|e| e.starts_with("maintenance")));
}

#[tokio::test]
async fn test_stream_error_does_not_fail_the_deploy() {
    let h = harness(|_, _, stream| stream.fail = true);

    let outcome = h.deployer.deploy(request("main", Some(2), false)).await;

    assert!(outcome.success);
    let log = events(&h);
    assert!(log.contains(&"run_command:rake db:migrate".to_string()));
    assert!(!log.contains(&"attach".to_string()));
    // The deploy still rescales after the stream error
    assert_eq!(log.last().unwrap(), "batch:worker=2");
}

#[tokio::test]
async fn test_migration_dyno_failure_is_fatal() {
    let h = harness(|api, _, _| api.fail_run_command = true);

    let outcome = h.deployer.deploy(request("main", Some(1), true)).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_stage, Some(DeployStage::Migrate));
    let log = events(&h);
    assert!(log.contains(&"maintenance:on".to_string()));
    // Maintenance is never cleared: the operator has to intervene
    assert!(!log.contains(&"maintenance:off".to_string()));
}

#[tokio::test]
async fn test_deploy_rejects_empty_branch() {
    let h = harness(|_, _, _| {});

    let outcome = h.deployer.deploy(request("", Some(1), false)).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure_stage, Some(DeployStage::Unknown));
    assert!(events(&h).is_empty());
}

#[tokio::test]
async fn test_restart_all_dynos() {
    let h = harness(|_, _, _| {});

    h.deployer.restart().await.unwrap();

    assert_eq!(events(&h), vec!["restart_all"]);
}

#[tokio::test]
async fn test_version_reports_latest_build() {
    let h = harness(|api, _, _| {
        api.builds = vec![
            Build {
                source_blob: SourceBlob {
                    version: Some("v1.2.9".to_string()),
                },
            },
            Build {
                source_blob: SourceBlob {
                    version: Some("v1.3.0".to_string()),
                },
            },
        ];
    });

    let version = h.deployer.version().await.unwrap();
    assert_eq!(version, "v1.3.0");
}

#[tokio::test]
async fn test_version_without_builds_is_an_error() {
    let h = harness(|_, _, _| {});

    let result = h.deployer.version().await;
    assert!(matches!(result, Err(HelperError::ApiError(_))));
}

#[tokio::test]
async fn test_maintenance_toggle_passthrough() {
    let h = harness(|_, _, _| {});

    h.deployer.maintenance(true).await.unwrap();
    h.deployer.maintenance(false).await.unwrap();

    assert_eq!(events(&h), vec!["maintenance:on", "maintenance:off"]);
}
