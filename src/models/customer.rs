use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Record;

/// A customer the back office can order or broadcast on behalf of.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Secondary display line, typically firm name or phone.
    #[serde(default)]
    pub subtext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl Customer {
    pub fn new(name: impl Into<String>, subtext: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            subtext: subtext.into(),
            instance_id: None,
        }
    }
}

impl Record for Customer {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}

/// A named roster of customer ids used as a broadcast audience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BroadcastGroup {
    pub id: String,
    pub name: String,
    /// Customer ids. References, not ownership; stale ids are skipped at
    /// dispatch time.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl Record for BroadcastGroup {
    fn id(&self) -> &str {
        &self.id
    }

    fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}
