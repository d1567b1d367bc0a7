//! Temporary grant loading.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use gatekeeper_core::{IdentityId, TemporaryGrant};
use gatekeeper_perms::retain_active;
use gatekeeper_store::GrantStore;

use crate::error::Result;

/// Loads an identity's temporary grants from the grant store.
pub struct TemporaryGrantOverlay {
    store: Arc<dyn GrantStore>,
}

impl TemporaryGrantOverlay {
    pub fn new(store: Arc<dyn GrantStore>) -> Self {
        Self { store }
    }

    /// All grants of `identity_id` in store order, expired ones included.
    ///
    /// Expiry is decided at check time against the evaluation instant, so
    /// nothing is filtered here.
    pub async fn load_grants(&self, identity_id: &IdentityId) -> Result<Vec<TemporaryGrant>> {
        if identity_id.is_empty() {
            return Ok(Vec::new());
        }

        let grants = self.store.find_grants_for_identity(identity_id).await?;
        tracing::debug!(identity_id = %identity_id, count = grants.len(), "loaded temporary grants");
        Ok(grants)
    }

    /// Grants of `identity_id` active at `now`, in store order.
    pub async fn load_active_grants(
        &self,
        identity_id: &IdentityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<TemporaryGrant>> {
        let grants = self.load_grants(identity_id).await?;
        Ok(retain_active(grants, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gatekeeper_core::StoredIdentity;
    use gatekeeper_store::{IdentityStore, MemoryStore};

    async fn overlay_with_grants(now: DateTime<Utc>) -> TemporaryGrantOverlay {
        let store = Arc::new(MemoryStore::new());
        let identity = StoredIdentity::new("u1")
            .with_role("administrator")
            .with_grant(TemporaryGrant::new("expired", now - Duration::minutes(5)))
            .with_grant(TemporaryGrant::new("active", now + Duration::minutes(5)))
            .with_grant(TemporaryGrant::new("boundary", now));
        store.save_identity(&identity).await.unwrap();
        TemporaryGrantOverlay::new(store)
    }

    #[tokio::test]
    async fn test_load_grants_keeps_everything() {
        let now = Utc::now();
        let overlay = overlay_with_grants(now).await;

        let names: Vec<_> = overlay
            .load_grants(&IdentityId::new("u1"))
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.action_name)
            .collect();
        assert_eq!(names, ["expired", "active", "boundary"]);
    }

    #[tokio::test]
    async fn test_load_active_grants_filters_expired() {
        let now = Utc::now();
        let overlay = overlay_with_grants(now).await;

        let active = overlay
            .load_active_grants(&IdentityId::new("u1"), now)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].action_name, "active");
    }

    #[tokio::test]
    async fn test_unknown_or_empty_identity() {
        let overlay = overlay_with_grants(Utc::now()).await;

        assert!(overlay.load_grants(&IdentityId::new("ghost")).await.unwrap().is_empty());
        assert!(overlay.load_grants(&IdentityId::new("")).await.unwrap().is_empty());
    }
}
