use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{CatalogItem, LinkStatus, StorefrontLink};
use crate::store::collections::keys;
use crate::store::{seed, Collection, KeyValueStore};

const CODE_LENGTH: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_MAX_ATTEMPTS: usize = 16;
const COPY_SUFFIX: &str = " (COPY)";

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub warehouse: String,
}

/// The visibility split for a link's management screen: active items
/// outside the allow-list ("master") and inside it ("portal"), both
/// filtered by the same search term. The two sides are disjoint and
/// together cover the filtered active catalog.
#[derive(Clone, Debug, Serialize)]
pub struct CatalogPartition {
    pub master: Vec<CatalogItem>,
    pub portal: Vec<CatalogItem>,
}

/// Manages storefront links and their allow-lists.
#[derive(Clone)]
pub struct LinkService {
    links: Collection<StorefrontLink>,
    items: Collection<CatalogItem>,
    event_sender: EventSender,
    share_host: String,
    instance_id: Option<String>,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let instance_id = config.instance_id.clone();
        Self {
            links: Collection::unseeded(store.clone(), keys::LINKS, instance_id.clone()),
            items: Collection::new(
                store,
                keys::INVENTORY,
                instance_id.clone(),
                seed::catalog_seed,
            ),
            event_sender,
            share_host: config.links.share_host.clone(),
            instance_id,
        }
    }

    pub async fn list(&self) -> Result<Vec<StorefrontLink>, ServiceError> {
        self.links.fetch_all().await
    }

    pub async fn get(&self, link_id: &str) -> Result<StorefrontLink, ServiceError> {
        self.links
            .get(link_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("storefront link", link_id))
    }

    /// Creates an enabled link with an empty allow-list and a fresh
    /// unique code.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(
        &self,
        request: CreateLinkRequest,
    ) -> Result<StorefrontLink, ServiceError> {
        request.validate()?;

        let link = StorefrontLink {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            code: self.unique_code().await?,
            status: LinkStatus::Enabled,
            created_date: Utc::now(),
            warehouse: request.warehouse,
            allowed_models: Default::default(),
            instance_id: self.instance_id.clone(),
        };
        self.links.insert(link.clone()).await?;

        // Already persisted; the event is best-effort.
        if let Err(e) = self
            .event_sender
            .send(Event::LinkCreated {
                link_id: link.id.clone(),
                code: link.code.clone(),
            })
            .await
        {
            warn!(error = %e, "failed to publish link creation event");
        }

        info!(link_id = %link.id, code = %link.code, "storefront link created");
        Ok(link)
    }

    /// Clones a link: same title (suffixed), warehouse and allow-list,
    /// fresh id, code and creation date.
    #[instrument(skip(self))]
    pub async fn duplicate(&self, link_id: &str) -> Result<StorefrontLink, ServiceError> {
        let source = self.get(link_id).await?;
        let copy = StorefrontLink {
            id: Uuid::new_v4().to_string(),
            title: format!("{}{}", source.title, COPY_SUFFIX),
            code: self.unique_code().await?,
            status: source.status,
            created_date: Utc::now(),
            warehouse: source.warehouse,
            allowed_models: source.allowed_models,
            instance_id: source.instance_id,
        };
        self.links.insert(copy.clone()).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::LinkCreated {
                link_id: copy.id.clone(),
                code: copy.code.clone(),
            })
            .await
        {
            warn!(error = %e, "failed to publish link creation event");
        }
        Ok(copy)
    }

    pub async fn rename(&self, link_id: &str, title: &str) -> Result<StorefrontLink, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::ValidationError("Title is required".into()));
        }
        let mut link = self.get(link_id).await?;
        link.title = title.to_string();
        self.links.replace(link.clone()).await?;
        Ok(link)
    }

    /// Idempotent status flip; persists (and emits) only on change.
    #[instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        link_id: &str,
        enabled: bool,
    ) -> Result<StorefrontLink, ServiceError> {
        let mut link = self.get(link_id).await?;
        let target = if enabled {
            LinkStatus::Enabled
        } else {
            LinkStatus::Disabled
        };
        if link.status == target {
            return Ok(link);
        }
        link.status = target;
        self.links.replace(link.clone()).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::LinkStatusChanged {
                link_id: link.id.clone(),
                enabled,
            })
            .await
        {
            warn!(error = %e, "failed to publish link status event");
        }
        Ok(link)
    }

    pub async fn delete(&self, link_id: &str) -> Result<(), ServiceError> {
        self.links.remove(link_id).await
    }

    /// Set-union of `item_ids` into the allow-list. An empty id slice is
    /// a no-op and does not persist.
    pub async fn add_to_allow_list(
        &self,
        link_id: &str,
        item_ids: &[String],
    ) -> Result<StorefrontLink, ServiceError> {
        let mut link = self.get(link_id).await?;
        if item_ids.is_empty() {
            return Ok(link);
        }
        let mut changed = false;
        for id in item_ids {
            changed |= link.allowed_models.insert(id.clone());
        }
        if changed {
            self.links.replace(link.clone()).await?;
        }
        Ok(link)
    }

    /// Set-difference of `item_ids` from the allow-list. An empty id
    /// slice is a no-op and does not persist.
    pub async fn remove_from_allow_list(
        &self,
        link_id: &str,
        item_ids: &[String],
    ) -> Result<StorefrontLink, ServiceError> {
        let mut link = self.get(link_id).await?;
        if item_ids.is_empty() {
            return Ok(link);
        }
        let mut changed = false;
        for id in item_ids {
            changed |= link.allowed_models.remove(id.as_str());
        }
        if changed {
            self.links.replace(link.clone()).await?;
        }
        Ok(link)
    }

    /// The master/portal split for a link's visibility screen, against
    /// the current active catalog.
    pub async fn visibility(
        &self,
        link_id: &str,
        search_term: &str,
    ) -> Result<CatalogPartition, ServiceError> {
        let link = self.get(link_id).await?;
        let active: Vec<CatalogItem> = self
            .items
            .fetch_all()
            .await?
            .into_iter()
            .filter(CatalogItem::is_active)
            .collect();
        Ok(partition_catalog(&link, search_term, &active))
    }

    /// Shareable URL for a link, using the configured host.
    pub fn share_url(&self, link: &StorefrontLink) -> String {
        link.share_url(&self.share_host)
    }

    /// Resolves a customer-held code. Disabled links keep their data but
    /// deny access.
    pub async fn resolve_code(&self, code: &str) -> Result<StorefrontLink, ServiceError> {
        let link = self
            .list()
            .await?
            .into_iter()
            .find(|l| l.code == code)
            .ok_or_else(|| ServiceError::not_found("storefront link with code", code))?;
        if !link.is_enabled() {
            return Err(ServiceError::InvalidOperation(format!(
                "storefront link {} is disabled",
                link.id
            )));
        }
        Ok(link)
    }

    async fn unique_code(&self) -> Result<String, ServiceError> {
        let existing: std::collections::HashSet<String> =
            self.list().await?.into_iter().map(|l| l.code).collect();
        for _ in 0..CODE_MAX_ATTEMPTS {
            let code = generate_code();
            if !existing.contains(&code) {
                return Ok(code);
            }
        }
        Err(ServiceError::InvalidOperation(
            "could not allocate a unique link code".into(),
        ))
    }
}

/// Splits active items matching `term` into those outside the allow-list
/// (master) and those inside it (portal). Inactive items appear on
/// neither side, which is how stale allow-list references degrade.
pub fn partition_catalog(
    link: &StorefrontLink,
    term: &str,
    active_catalog: &[CatalogItem],
) -> CatalogPartition {
    let mut master = Vec::new();
    let mut portal = Vec::new();
    for item in active_catalog {
        if !item.is_active() || !item.matches(term) {
            continue;
        }
        if link.allowed_models.contains(&item.id) {
            portal.push(item.clone());
        } else {
            master.push(item.clone());
        }
    }
    CatalogPartition { master, portal }
}

/// Random 6-character uppercase alphanumeric access token.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}
