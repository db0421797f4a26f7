//! App info and maintenance endpoints

use crate::api::client::PlatformClient;
use crate::api::AppInfo;
use crate::errors::HelperError;

impl PlatformClient {
    /// Fetch app details, including the git push endpoint
    pub async fn app_info(&self, app: &str) -> Result<AppInfo, HelperError> {
        let path = format!("/apps/{}", app);
        self.get(&path).await
    }

    /// Toggle the app's maintenance mode
    pub async fn set_maintenance(&self, app: &str, enabled: bool) -> Result<(), HelperError> {
        let path = format!("/apps/{}", app);
        let body = serde_json::json!({ "maintenance": enabled });
        let _: serde_json::Value = self.patch(&path, &body).await?;
        Ok(())
    }
}
