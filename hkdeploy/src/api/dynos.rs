//! Dyno endpoints: one-off commands and restarts

use crate::api::client::PlatformClient;
use crate::api::AttachedDyno;
use crate::errors::HelperError;

impl PlatformClient {
    /// Run a one-off command in a new dyno, requesting an attach URL for
    /// its live output
    pub async fn run_command(&self, app: &str, command: &str) -> Result<AttachedDyno, HelperError> {
        let path = format!("/apps/{}/dynos", app);
        let body = serde_json::json!({
            "command": command,
            "attach": true,
        });
        self.post(&path, &body).await
    }

    /// Restart all of the app's dynos
    pub async fn restart_all(&self, app: &str) -> Result<(), HelperError> {
        let path = format!("/apps/{}/dynos", app);
        let _: serde_json::Value = self.delete(&path).await?;
        Ok(())
    }
}
