use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{BroadcastGroup, Customer};
use crate::store::collections::keys;
use crate::store::{seed, Collection, KeyValueStore};

/// Who a broadcast goes to: every member of a named group, or an explicit
/// customer-id list.
#[derive(Clone, Debug, Deserialize)]
pub enum BroadcastAudience {
    Group(String),
    Customers(Vec<String>),
}

#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastRequest {
    pub audience: BroadcastAudience,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

/// Synchronous acknowledgement that the send intent was recorded. Not a
/// delivery guarantee; there is no transport behind it.
#[derive(Clone, Debug, Serialize)]
pub struct BroadcastReceipt {
    pub recipient_count: usize,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Boundary stub for outbound messaging: resolves recipients, records the
/// intent as a domain event, reports success. Any real transport is an
/// external collaborator.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    customers: Collection<Customer>,
    groups: Collection<BroadcastGroup>,
    event_sender: EventSender,
}

impl BroadcastDispatcher {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let instance_id = config.instance_id.clone();
        Self {
            customers: Collection::new(
                store.clone(),
                keys::CUSTOMERS,
                instance_id.clone(),
                seed::customer_seed,
            ),
            groups: Collection::unseeded(store, keys::GROUPS, instance_id),
            event_sender,
        }
    }

    /// Fires a broadcast. Unknown customer ids in the audience are
    /// skipped with a warning; an audience that resolves to nobody is a
    /// validation error.
    #[instrument(skip(self, request), fields(message_len = request.message.len()))]
    pub async fn dispatch(
        &self,
        request: BroadcastRequest,
    ) -> Result<BroadcastReceipt, ServiceError> {
        request.validate()?;

        let candidate_ids: Vec<String> = match &request.audience {
            BroadcastAudience::Group(group_id) => {
                let group = self
                    .groups
                    .get(group_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("broadcast group", group_id))?;
                group.members
            }
            BroadcastAudience::Customers(ids) => ids.clone(),
        };

        let known: HashSet<String> = self
            .customers
            .fetch_all()
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let mut recipients: HashSet<&str> = HashSet::new();
        for id in &candidate_ids {
            if known.contains(id) {
                recipients.insert(id.as_str());
            } else {
                warn!(customer_id = %id, "skipping unknown broadcast recipient");
            }
        }

        if recipients.is_empty() {
            return Err(ServiceError::ValidationError(
                "broadcast audience resolves to no known customers".into(),
            ));
        }

        let receipt = BroadcastReceipt {
            recipient_count: recipients.len(),
            message: request.message.clone(),
            sent_at: Utc::now(),
        };

        // Fire-and-forget: the receipt stands even when no consumer is
        // listening for the intent event.
        if let Err(e) = self
            .event_sender
            .send(Event::BroadcastSent {
                recipient_count: receipt.recipient_count,
                message: request.message,
                sent_at: receipt.sent_at,
            })
            .await
        {
            warn!(error = %e, "failed to publish broadcast event");
        }

        info!(recipients = receipt.recipient_count, "broadcast dispatched");
        Ok(receipt)
    }
}
