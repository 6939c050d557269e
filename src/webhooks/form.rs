//! Webhook form state
//!
//! Field errors carry translation ids rather than rendered text; the admin
//! panel formats them.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{available_events, Webhook};

pub const MESSAGE_REQUIRED: &str = "components.Input.error.validation.required";
pub const MESSAGE_REGEX: &str = "components.Input.error.validation.regex";
pub const MESSAGE_INVALID: &str = "components.Input.error.validation.invalid";

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z][_0-9A-Za-z ]*$").expect("Invalid regex constant"))
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^https?://.+").expect("Invalid regex constant"))
}

/// One editable header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl HeaderRow {
    fn is_blank(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

/// Field errors keyed by form path (`name`, `headers[1].key`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("webhook form has {} invalid field(s)", .fields.len())]
pub struct FormErrors {
    fields: BTreeMap<String, String>,
}

impl FormErrors {
    fn add(&mut self, field: impl Into<String>, message: &str) {
        self.fields.entry(field.into()).or_insert_with(|| message.to_string());
    }

    /// Translation id of the error on `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Editable webhook draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HeaderRow>,
    #[serde(default)]
    pub events: Vec<String>,
}

impl WebhookForm {
    /// Initial form values, from an existing webhook or blank.
    ///
    /// There is always at least one header row to edit.
    pub fn initial(data: Option<&Webhook>) -> Self {
        let mut headers: Vec<HeaderRow> = data
            .map(|hook| {
                hook.headers
                    .iter()
                    .map(|(key, value)| HeaderRow {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        if headers.is_empty() {
            headers.push(HeaderRow::default());
        }

        Self {
            name: data.map(|hook| hook.name.clone()).unwrap_or_default(),
            url: data.map(|hook| hook.url.clone()).unwrap_or_default(),
            headers,
            events: data.map(|hook| hook.events.clone()).unwrap_or_default(),
        }
    }

    /// Checks every field; all errors are reported at once.
    pub fn validate(&self, draft_and_publish: bool) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.is_empty() {
            errors.add("name", MESSAGE_REQUIRED);
        } else if !name_regex().is_match(&self.name) {
            errors.add("name", MESSAGE_REGEX);
        }

        if self.url.is_empty() {
            errors.add("url", MESSAGE_REQUIRED);
        } else if !url_regex().is_match(&self.url) {
            errors.add("url", MESSAGE_REGEX);
        }

        // A single untouched row means "no headers"
        let only_blank_row = self.headers.len() == 1 && self.headers[0].is_blank();
        if !only_blank_row {
            for (i, row) in self.headers.iter().enumerate() {
                if row.key.is_empty() {
                    errors.add(format!("headers[{}].key", i), MESSAGE_REQUIRED);
                }
                if row.value.is_empty() {
                    errors.add(format!("headers[{}].value", i), MESSAGE_REQUIRED);
                }
            }
        }

        let known = available_events(draft_and_publish);
        if self.events.iter().any(|event| !known.contains(&event.as_str())) {
            errors.add("events", MESSAGE_INVALID);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Converts the draft into a stored webhook, dropping blank header rows.
    pub fn into_webhook(self, id: Option<u64>) -> Webhook {
        let headers = self
            .headers
            .into_iter()
            .filter(|row| !row.is_blank())
            .map(|row| (row.key, row.value))
            .collect();

        Webhook {
            id,
            name: self.name,
            url: self.url,
            headers,
            events: self.events,
            is_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> WebhookForm {
        WebhookForm {
            name: "Deploy site".into(),
            url: "https://ci.example.com/hooks/deploy".into(),
            headers: vec![HeaderRow::default()],
            events: vec!["entry.create".into(), "media.delete".into()],
        }
    }

    #[test]
    fn test_initial_blank_form() {
        let form = WebhookForm::initial(None);
        assert_eq!(form.name, "");
        assert_eq!(form.url, "");
        assert_eq!(form.headers, vec![HeaderRow::default()]);
        assert!(form.events.is_empty());
    }

    #[test]
    fn test_initial_from_webhook() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer t".to_string());
        let hook = Webhook {
            id: Some(3),
            name: "deploy".into(),
            url: "https://example.com".into(),
            headers,
            events: vec!["entry.update".into()],
            is_enabled: true,
        };

        let form = WebhookForm::initial(Some(&hook));
        assert_eq!(form.name, "deploy");
        assert_eq!(
            form.headers,
            vec![HeaderRow {
                key: "Authorization".into(),
                value: "Bearer t".into(),
            }]
        );
        assert_eq!(form.events, vec!["entry.update".to_string()]);
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate(false).is_ok());
    }

    #[test]
    fn test_required_fields() {
        let errors = WebhookForm::initial(None).validate(false).unwrap_err();
        assert_eq!(errors.get("name"), Some(MESSAGE_REQUIRED));
        assert_eq!(errors.get("url"), Some(MESSAGE_REQUIRED));
        assert_eq!(errors.get("headers[0].key"), None);
    }

    #[test]
    fn test_name_and_url_format() {
        let form = WebhookForm {
            name: "1st hook!".into(),
            url: "ftp://example.com".into(),
            ..valid_form()
        };
        let errors = form.validate(false).unwrap_err();
        assert_eq!(errors.get("name"), Some(MESSAGE_REGEX));
        assert_eq!(errors.get("url"), Some(MESSAGE_REGEX));
    }

    #[test]
    fn test_incomplete_header_rows() {
        let form = WebhookForm {
            headers: vec![
                HeaderRow {
                    key: "X-Token".into(),
                    value: "abc".into(),
                },
                HeaderRow {
                    key: "".into(),
                    value: "orphan".into(),
                },
            ],
            ..valid_form()
        };
        let errors = form.validate(false).unwrap_err();
        assert_eq!(errors.get("headers[1].key"), Some(MESSAGE_REQUIRED));
        assert_eq!(errors.fields().len(), 1);
    }

    #[test]
    fn test_publish_events_need_draft_and_publish() {
        let form = WebhookForm {
            events: vec!["entry.publish".into()],
            ..valid_form()
        };
        assert_eq!(form.validate(false).unwrap_err().get("events"), Some(MESSAGE_INVALID));
        assert!(form.validate(true).is_ok());
    }

    #[test]
    fn test_into_webhook_drops_blank_rows() {
        let mut form = valid_form();
        form.headers.push(HeaderRow {
            key: "X-Env".into(),
            value: "prod".into(),
        });

        let hook = form.into_webhook(Some(1));
        assert_eq!(hook.id, Some(1));
        assert_eq!(hook.headers.len(), 1);
        assert_eq!(hook.headers["X-Env"], "prod");
        assert!(hook.is_enabled);
    }
}
