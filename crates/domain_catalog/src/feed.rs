//! External country feed client
//!
//! The feed is a public REST endpoint returning a JSON array of country
//! records. The client reduces each record to the fields the catalog
//! persists, skipping records that lack the ISO code or the Spanish
//! translation (the name of record). A non-success HTTP status is logged and
//! treated as "no data", not a fault; only transport-level failures are
//! errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

use core_kernel::{DomainPort, PortError};

use crate::country::CountryRecord;

/// Configuration for the feed client
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Full URL of the feed endpoint, including any field filters
    pub url: String,
    /// Read timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://restcountries.com/v3.1/all?fields=name,cca3,translations,flags"
                .to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Port for the external country source
#[async_trait]
pub trait CountryFeed: DomainPort {
    /// Retrieves the current country list. An unreachable or misbehaving
    /// upstream that still answers HTTP yields an empty list; transport
    /// failures are errors.
    async fn fetch(&self) -> Result<Vec<CountryRecord>, PortError>;
}

/// Wire shape of one feed record.
///
/// Every field is optional: the upstream occasionally omits translations or
/// flags, and a missing mandatory field downgrades the record to a skip, not
/// a parse failure for the whole batch.
#[derive(Debug, Deserialize)]
struct WireRecord {
    cca3: Option<String>,
    name: Option<WireName>,
    translations: Option<WireTranslations>,
    flags: Option<WireFlags>,
}

#[derive(Debug, Deserialize)]
struct WireName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTranslations {
    spa: Option<WireName>,
}

#[derive(Debug, Deserialize)]
struct WireFlags {
    png: Option<String>,
}

impl WireRecord {
    /// Reduces the wire record to a [`CountryRecord`], or explains why it was
    /// skipped.
    fn into_record(self) -> Result<CountryRecord, &'static str> {
        let code = match self.cca3 {
            Some(code) if !code.is_empty() => code,
            _ => return Err("missing cca3 code"),
        };
        let name = match self.translations.and_then(|t| t.spa).and_then(|n| n.common) {
            Some(name) if !name.is_empty() => name,
            _ => return Err("missing Spanish translation"),
        };
        let flag_url = self.flags.and_then(|f| f.png).unwrap_or_default();
        Ok(CountryRecord {
            code,
            name,
            flag_url,
        })
    }

    /// Best-effort label for skip warnings
    fn label(&self) -> String {
        self.name
            .as_ref()
            .and_then(|n| n.common.clone())
            .or_else(|| self.cca3.clone())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// HTTP client for the REST-countries feed
#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    config: FeedConfig,
    client: Client,
}

impl RestCountriesClient {
    /// Builds the client with the configured timeouts.
    pub fn new(config: FeedConfig) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { config, client })
    }

    /// The configured feed URL
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

impl DomainPort for RestCountriesClient {}

#[async_trait]
impl CountryFeed for RestCountriesClient {
    async fn fetch(&self) -> Result<Vec<CountryRecord>, PortError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::Timeout {
                        operation: "fetch country feed".to_string(),
                    }
                } else {
                    PortError::Connection {
                        message: format!("country feed request to {} failed", self.config.url),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, url = %self.config.url, "country feed returned non-success status");
            return Ok(Vec::new());
        }

        let wire: Vec<WireRecord> = response.json().await.map_err(|e| PortError::Internal {
            message: "country feed returned malformed JSON".to_string(),
            source: Some(Box::new(e)),
        })?;

        let total = wire.len();
        let mut records = Vec::with_capacity(total);
        for raw in wire {
            let label = raw.label();
            match raw.into_record() {
                Ok(record) => records.push(record),
                Err(reason) => warn!(country = %label, reason, "skipping incomplete feed record"),
            }
        }

        info!(fetched = records.len(), total, "fetched country feed");
        Ok(records)
    }
}
