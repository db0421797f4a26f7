//! Formation endpoints

use crate::api::client::PlatformClient;
use crate::errors::HelperError;
use crate::models::formation::{Formation, ProcessType, ScaleUpdate};

impl PlatformClient {
    /// List the app's formations (one entry per process type)
    pub async fn list_formations(&self, app: &str) -> Result<Vec<Formation>, HelperError> {
        let path = format!("/apps/{}/formation", app);
        self.get(&path).await
    }

    /// Update the quantity of a single process type
    pub async fn update_formation(
        &self,
        app: &str,
        process_type: &ProcessType,
        quantity: u32,
    ) -> Result<(), HelperError> {
        let path = format!("/apps/{}/formation/{}", app, process_type);
        let body = serde_json::json!({ "quantity": quantity });
        let _: serde_json::Value = self.patch(&path, &body).await?;
        Ok(())
    }

    /// Update several process types in one call
    pub async fn batch_update_formations(
        &self,
        app: &str,
        updates: &[ScaleUpdate],
    ) -> Result<(), HelperError> {
        let path = format!("/apps/{}/formation", app);
        let body = serde_json::json!({ "updates": updates });
        let _: serde_json::Value = self.patch(&path, &body).await?;
        Ok(())
    }
}
