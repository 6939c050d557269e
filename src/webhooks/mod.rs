//! Outbound webhook configuration
//!
//! The admin form for webhooks edits a flat draft (`WebhookForm`) that is
//! validated and converted into the stored `Webhook`. Delivery and
//! triggering happen elsewhere.

mod form;

pub use form::{FormErrors, HeaderRow, WebhookForm, MESSAGE_INVALID, MESSAGE_REGEX, MESSAGE_REQUIRED};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Content events a webhook can subscribe to
pub const ENTRY_EVENTS: &[&str] = &["entry.create", "entry.update", "entry.delete"];

/// Events only emitted when draft-and-publish is enabled
pub const DRAFT_AND_PUBLISH_EVENTS: &[&str] = &["entry.publish", "entry.unpublish"];

/// Upload events
pub const MEDIA_EVENTS: &[&str] = &["media.create", "media.update", "media.delete"];

/// Event names a webhook may subscribe to
pub fn available_events(draft_and_publish: bool) -> Vec<&'static str> {
    let mut events: Vec<&'static str> = ENTRY_EVENTS.to_vec();
    if draft_and_publish {
        events.extend_from_slice(DRAFT_AND_PUBLISH_EVENTS);
    }
    events.extend_from_slice(MEDIA_EVENTS);
    events
}

/// A stored webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}
