//! Ingress event shape, validation, and attribute filtering

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use counterd_config::AttributesConfig;
use counterd_keys::{KEY_SEPARATOR, NULL_ATTRIBUTE};
use serde::Deserialize;
use thiserror::Error;

/// Reasons an event fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing request id")]
    MissingId,

    #[error("invalid use of ':' in attribute key/value")]
    SeparatorInAttribute,
}

/// Input for ingress as a JSON object
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IngressRequest {
    /// Unique identifier for this event
    pub id: String,

    /// Date of the event, set to the current time if omitted.
    /// Expected to be RFC 3339 format.
    pub date: Option<DateTime<Utc>>,

    /// Attributes are an opaque set of key/value pairs. If none provided,
    /// the null attribute is automatically injected.
    pub attributes: BTreeMap<String, String>,
}

impl IngressRequest {
    /// Sanity check a request and initialize defaults
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingId);
        }

        if self.date.is_none() {
            self.date = Some(Utc::now());
        }

        if self.attributes.is_empty() {
            self.inject_null_attribute();
        } else {
            for (key, value) in &self.attributes {
                if key.contains(KEY_SEPARATOR) || value.contains(KEY_SEPARATOR) {
                    return Err(ValidationError::SeparatorInAttribute);
                }
            }
        }
        Ok(())
    }

    /// Apply whitelist/blacklist filtering.
    ///
    /// The whitelist is applied first, then the blacklist. If filtering
    /// removes every attribute the null attribute is re-injected so the
    /// event still counts somewhere.
    pub fn filter_attributes(&mut self, config: &AttributesConfig) {
        if !config.whitelist.is_empty() {
            self.attributes
                .retain(|key, _| config.whitelist.contains(key));
        }
        if !config.blacklist.is_empty() {
            self.attributes
                .retain(|key, _| !config.blacklist.contains(key));
        }
        if self.attributes.is_empty() {
            self.inject_null_attribute();
        }
    }

    fn inject_null_attribute(&mut self) {
        self.attributes
            .insert(NULL_ATTRIBUTE.to_string(), NULL_ATTRIBUTE.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn filter(whitelist: &[&str], blacklist: &[&str]) -> AttributesConfig {
        AttributesConfig {
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_validate_requires_id() {
        let mut request = IngressRequest::default();
        assert_eq!(request.validate(), Err(ValidationError::MissingId));

        request.id = "12345".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_defaults_date() {
        let mut request = IngressRequest {
            id: "12345".to_string(),
            ..Default::default()
        };
        request.validate().unwrap();

        let date = request.date.expect("date was defaulted");
        assert!((Utc::now() - date).num_seconds() < 1);
    }

    #[test]
    fn test_validate_injects_null_attribute() {
        let mut request = IngressRequest {
            id: "12345".to_string(),
            ..Default::default()
        };
        request.validate().unwrap();
        assert_eq!(request.attributes, attrs(&[("null", "null")]));
    }

    #[test]
    fn test_validate_rejects_separator() {
        let mut request = IngressRequest {
            id: "12345".to_string(),
            attributes: attrs(&[("foo:bar", "baz")]),
            ..Default::default()
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::SeparatorInAttribute)
        );

        let mut request = IngressRequest {
            id: "12345".to_string(),
            attributes: attrs(&[("foo", "bar:baz")]),
            ..Default::default()
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::SeparatorInAttribute)
        );
    }

    #[test]
    fn test_parse_ingress_request() {
        let input = r#"{"id": "1234", "date": "2009-11-10T23:00:00Z", "attributes": {"foo": "bar"}}"#;
        let request: IngressRequest = serde_json::from_str(input).unwrap();
        assert_eq!(request.id, "1234");
        assert_eq!(
            request.date.unwrap().to_rfc3339(),
            "2009-11-10T23:00:00+00:00"
        );
        assert_eq!(request.attributes, attrs(&[("foo", "bar")]));
    }

    #[test]
    fn test_filter_whitelist() {
        let mut request = IngressRequest {
            id: "1".to_string(),
            attributes: attrs(&[("name", "a"), ("color", "b"), ("src", "c")]),
            ..Default::default()
        };
        request.filter_attributes(&filter(&["color", "name"], &[]));
        assert_eq!(request.attributes, attrs(&[("name", "a"), ("color", "b")]));
    }

    #[test]
    fn test_filter_blacklist() {
        let mut request = IngressRequest {
            id: "1".to_string(),
            attributes: attrs(&[("name", "a"), ("src", "c")]),
            ..Default::default()
        };
        request.filter_attributes(&filter(&[], &["src"]));
        assert_eq!(request.attributes, attrs(&[("name", "a")]));
    }

    #[test]
    fn test_filter_whitelist_then_blacklist() {
        let mut request = IngressRequest {
            id: "1".to_string(),
            attributes: attrs(&[("name", "a"), ("color", "b"), ("src", "c")]),
            ..Default::default()
        };
        // Whitelist keeps name+color, blacklist then drops color
        request.filter_attributes(&filter(&["color", "name"], &["color"]));
        assert_eq!(request.attributes, attrs(&[("name", "a")]));
    }

    #[test]
    fn test_filter_reinjects_null_attribute() {
        let mut request = IngressRequest {
            id: "1".to_string(),
            attributes: attrs(&[("src", "c")]),
            ..Default::default()
        };
        request.filter_attributes(&filter(&[], &["src"]));
        assert_eq!(request.attributes, attrs(&[("null", "null")]));
    }

    #[test]
    fn test_filter_empty_config_keeps_everything() {
        let original = attrs(&[("name", "a"), ("src", "c")]);
        let mut request = IngressRequest {
            id: "1".to_string(),
            attributes: original.clone(),
            ..Default::default()
        };
        request.filter_attributes(&filter(&[], &[]));
        assert_eq!(request.attributes, original);
    }
}
