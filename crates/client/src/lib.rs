//! counterd client library
//!
//! A small client for submitting events to a counterd server. Used by the
//! `counterd sim` traffic generator and usable as an SDK reference.
//!
//! # Example
//!
//! ```no_run
//! use counterd_client::{Client, ClientOptions, Event};
//!
//! # async fn example() -> Result<(), counterd_client::ClientError> {
//! let client = Client::new(
//!     "http://127.0.0.1:8001",
//!     ClientOptions { auth_token: None },
//! )?;
//!
//! let mut event = Event::new("user-1234");
//! event.attributes.insert("color".to_string(), "blue".to_string());
//! client.send_event(&event).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A single countable event
///
/// Serializes to the ingress wire shape. The date is optional; the server
/// fills in the current time when omitted. Events without attributes are
/// counted under the server's sentinel attribute.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Unique identifier for this event
    pub id: String,

    /// Date of the event, RFC 3339; server-side "now" when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Opaque key/value attributes; keys and values must not contain ':'
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Event {
    /// Create an event with no date or attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            attributes: BTreeMap::new(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Bearer token sent with every request, if the server requires auth
    pub auth_token: Option<String>,
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request construction or transport failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("bad response code {0}")]
    Status(u16),
}

/// High-level API client for counterd
pub struct Client {
    addr: String,
    opts: ClientOptions,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for the server at `addr` (e.g.
    /// `http://127.0.0.1:8001`)
    pub fn new(addr: impl Into<String>, opts: ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            addr: addr.into(),
            opts,
            http,
        })
    }

    /// Submit an event to be ingressed
    pub async fn send_event(&self, event: &Event) -> Result<(), ClientError> {
        let url = format!("{}/v1/ingress", self.addr);
        let mut request = self.http.put(url).json(event);

        if let Some(token) = &self.opts.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_serialization() {
        let mut event = Event::new("1234");
        event.date = Some(Utc.with_ymd_and_hms(2009, 11, 10, 23, 0, 0).unwrap());
        event
            .attributes
            .insert("foo".to_string(), "bar".to_string());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], "1234");
        assert_eq!(json["date"], "2009-11-10T23:00:00Z");
        assert_eq!(json["attributes"]["foo"], "bar");
    }

    #[test]
    fn test_event_omits_empty_fields() {
        let event = Event::new("1234");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], "1234");
        assert!(json.get("date").is_none());
        assert!(json.get("attributes").is_none());
    }
}
