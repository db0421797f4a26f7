//! Formation scaler
//!
//! Diffs requested worker/clock quantities against the app's current
//! formations and applies the minimal set of updates.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::PlatformApi;
use crate::errors::HelperError;
use crate::models::formation::{Formation, ScaleTargets, ScaleUpdate, FREE_TIER_SIZE};

/// Applies formation changes for one app
pub struct Scaler {
    api: Arc<dyn PlatformApi>,
    app_name: String,
}

impl Scaler {
    pub fn new(api: Arc<dyn PlatformApi>, app_name: impl Into<String>) -> Self {
        Self {
            api,
            app_name: app_name.into(),
        }
    }

    /// Scale the app's worker and clock formations to the requested targets.
    ///
    /// Formations are fetched fresh on every call. Types already at their
    /// target and types the app does not have are skipped. Free-tier apps
    /// cannot take a batch update (2-dyno cap), so their updates are applied
    /// one at a time in ascending target-quantity order.
    pub async fn scale(&self, targets: ScaleTargets) -> Result<(), HelperError> {
        let formations = self.api.list_formations(&self.app_name).await?;
        let mut updates = plan_updates(&formations, &targets);

        if updates.is_empty() {
            warn!("Nothing to scale. Please check your configurations");
            return Ok(());
        }

        if updates.iter().any(|update| update.size == FREE_TIER_SIZE) {
            warn!("You can only run 2 dynos on the free tier");
            // Stable sort keeps discovery order on equal quantities
            updates.sort_by_key(|update| update.quantity);
            for update in &updates {
                self.api
                    .update_formation(&self.app_name, &update.process_type, update.quantity)
                    .await?;
            }
        } else {
            self.api
                .batch_update_formations(&self.app_name, &updates)
                .await?;
        }

        Ok(())
    }
}

/// Compute the updates needed to move `formations` to `targets`.
///
/// Only formations whose quantity differs from a requested target produce an
/// update; requested types without a matching formation are silently
/// ignored.
pub fn plan_updates(formations: &[Formation], targets: &ScaleTargets) -> Vec<ScaleUpdate> {
    let mut updates = Vec::new();

    for formation in formations {
        let Some(target) = targets.target_for(&formation.process_type) else {
            continue;
        };

        if formation.quantity != target {
            info!("Scaling {} to {}", formation.process_type, target);
            updates.push(ScaleUpdate {
                process_type: formation.process_type.clone(),
                quantity: target,
                size: formation.size.clone(),
            });
        } else {
            warn!(
                "{} is already scaled to {}",
                formation.process_type.title(),
                target
            );
        }
    }

    updates
}
