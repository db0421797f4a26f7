//! Build endpoints

use crate::api::client::PlatformClient;
use crate::api::Build;
use crate::errors::HelperError;

impl PlatformClient {
    /// List the app's builds, oldest first
    pub async fn list_builds(&self, app: &str) -> Result<Vec<Build>, HelperError> {
        let path = format!("/apps/{}/builds", app);
        self.get(&path).await
    }
}
