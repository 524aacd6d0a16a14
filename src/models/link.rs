use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum LinkStatus {
    Enabled,
    Disabled,
}

/// A shareable, access-controlled curated view of the catalog.
///
/// The allow-list holds *references* to catalog item ids, not owned data;
/// a stale id simply stops matching anything active and drops out of the
/// rendered view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorefrontLink {
    pub id: String,
    pub title: String,
    /// Short opaque access token, unique across links. Embedded in the
    /// shareable URL.
    pub code: String,
    pub status: LinkStatus,
    pub created_date: DateTime<Utc>,
    pub warehouse: String,
    /// Catalog item ids visible through this link.
    pub allowed_models: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl StorefrontLink {
    pub fn is_enabled(&self) -> bool {
        self.status == LinkStatus::Enabled
    }

    /// Shareable customer-facing URL for this link.
    pub fn share_url(&self, host: &str) -> String {
        format!("https://{}/store/{}", host, self.code)
    }
}

impl Record for StorefrontLink {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}
