//! [`HttpRemote`]: the remote accessor over HTTP
//!
//! ```text
//! GET    {base}/organizations/{org}/{kind}          fetch_all
//! POST   {base}/organizations/{org}/{kind}          create
//! PUT    {base}/organizations/{org}/{kind}/{name}   replace
//! DELETE {base}/organizations/{org}/{kind}/{name}   delete
//! PUT    {base}/organizations/{org}/{kind}/bulk     bulk_reconcile
//! ```

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use polsync_core::remote::{BulkOutcome, RemoteAccessor, RemoteError};
use polsync_core::RemoteSettings;
use polsync_meta::{Kind, Record, RecordSet};

use crate::{Error, Result};

const BULK_SEGMENT: &str = "bulk";

#[derive(Serialize)]
struct BulkRequest<'a, R> {
    records: &'a [R],
    delete_missing: bool,
}

/// Blocking HTTP client for one organization.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base: Url,
    organization: String,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(settings: &RemoteSettings) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidUrl {
            url: settings.url.clone(),
            message: message.to_string(),
        };
        let base = Url::parse(&settings.url).map_err(|e| invalid(&e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL"));
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("polsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base,
            organization: settings.organization.clone(),
            token: settings.token.clone(),
        })
    }

    /// `{base}/organizations/{org}/{kind}`
    pub fn collection_url(&self, kind: Kind) -> Url {
        self.url(kind, None)
    }

    /// `{base}/organizations/{org}/{kind}/{name}`, with `name` percent-encoded.
    pub fn record_url(&self, kind: Kind, name: &str) -> Url {
        self.url(kind, Some(name))
    }

    fn url(&self, kind: Kind, name: Option<&str>) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("organizations")
                .push(&self.organization)
                .push(kind.as_str());
            if let Some(name) = name {
                path.push(name);
            }
        }
        url
    }

    fn send(&self, request: RequestBuilder) -> std::result::Result<Response, RemoteError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Records from a list response: a bare array, or an object with `items`.
fn list_items(value: Value) -> std::result::Result<Vec<Value>, RemoteError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(RemoteError::Decode(
                "expected an array or an object with 'items'".into(),
            )),
        },
        _ => Err(RemoteError::Decode("expected an array of records".into())),
    }
}

impl RemoteAccessor for HttpRemote {
    fn fetch_all<R: Record>(&self) -> std::result::Result<RecordSet<R>, RemoteError> {
        let url = self.collection_url(R::KIND);
        tracing::debug!(%url, "GET");
        let value: Value = self
            .send(self.client.get(url))?
            .json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let mut set = RecordSet::new();
        for item in list_items(value)? {
            let record: R =
                serde_json::from_value(item).map_err(|e| RemoteError::Decode(e.to_string()))?;
            set.insert(record)
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
        }
        tracing::debug!(kind = %R::KIND, count = set.len(), "Fetched");
        Ok(set)
    }

    fn create<R: Record>(&self, record: &R) -> std::result::Result<(), RemoteError> {
        let url = self.collection_url(R::KIND);
        tracing::debug!(%url, record = record.name(), "POST");
        self.send(self.client.post(url).json(record))?;
        Ok(())
    }

    fn replace<R: Record>(&self, record: &R) -> std::result::Result<(), RemoteError> {
        let url = self.record_url(R::KIND, record.name());
        tracing::debug!(%url, "PUT");
        self.send(self.client.put(url).json(record))?;
        Ok(())
    }

    fn delete(&self, kind: Kind, name: &str) -> std::result::Result<(), RemoteError> {
        let url = self.record_url(kind, name);
        tracing::debug!(%url, "DELETE");
        self.send(self.client.delete(url))?;
        Ok(())
    }

    fn bulk_reconcile<R: Record>(
        &self,
        records: &[R],
        delete_missing: bool,
    ) -> std::result::Result<BulkOutcome, RemoteError> {
        let url = self.record_url(R::KIND, BULK_SEGMENT);
        tracing::debug!(%url, records = records.len(), delete_missing, "PUT bulk");
        let body = BulkRequest {
            records,
            delete_missing,
        };
        self.send(self.client.put(url).json(&body))?
            .json()
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    fn remote(url: &str) -> HttpRemote {
        HttpRemote::new(&RemoteSettings {
            url: url.to_string(),
            organization: "acme".to_string(),
            token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[rstest]
    #[case("https://policy.example.com/api")]
    #[case("https://policy.example.com/api/")]
    fn test_collection_url(#[case] base: &str) {
        assert_eq!(
            remote(base).collection_url(Kind::ClusterPolicies).as_str(),
            "https://policy.example.com/api/organizations/acme/cluster-policies"
        );
    }

    #[test]
    fn test_record_name_is_encoded() {
        assert_eq!(
            remote("https://policy.example.com")
                .record_url(Kind::Teams, "a b/c")
                .as_str(),
            "https://policy.example.com/organizations/acme/teams/a%20b%2Fc"
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:ops@example.com")]
    fn test_invalid_base_url(#[case] url: &str) {
        let err = HttpRemote::new(&RemoteSettings {
            url: url.to_string(),
            organization: "acme".to_string(),
            token: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_list_items_accepts_wrapped_arrays() {
        let items = list_items(serde_json::json!({"items": [{"name": "a"}]})).unwrap();
        assert_eq!(items.len(), 1);
        assert!(list_items(serde_json::json!({"name": "a"})).is_err());
    }
}
