//! Service entities, junction rows, and read projections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

use core_kernel::{CountryId, ProviderId, ProviderServiceId, ServiceCountryId, ServiceId};

/// A persisted service row.
///
/// `value_per_hour_usd` is stored and compared as text by design of the
/// upstream store; it is validated as a parseable decimal at the input edge
/// but never coerced to a numeric type here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub value_per_hour_usd: String,
}

/// A service row about to be inserted
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct NewService {
    #[validate(length(min = 1, message = "service name must not be empty"))]
    pub name: String,
    #[validate(custom(function = "validate_rate"))]
    pub value_per_hour_usd: String,
}

/// Incoming update for a service: scalar fields plus the full intended set of
/// country associations. Countries omitted from the set are unlinked.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceUpdate {
    pub id: ServiceId,
    #[validate(length(min = 1, message = "service name must not be empty"))]
    pub name: String,
    #[validate(custom(function = "validate_rate"))]
    pub value_per_hour_usd: String,
    #[serde(default)]
    pub countries: Vec<CountryId>,
}

/// Checks that an hourly rate parses as a decimal without coercing it.
pub fn validate_rate(value: &str) -> Result<(), ValidationError> {
    if Decimal::from_str(value).is_err() {
        return Err(ValidationError::new("rate_not_decimal")
            .with_message("value per hour must be a decimal number".into()));
    }
    Ok(())
}

/// Junction row linking a provider to a service it offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderServiceLink {
    pub id: ProviderServiceId,
    pub provider_id: ProviderId,
    pub service_id: ServiceId,
}

/// A provider-service link about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProviderServiceLink {
    pub provider_id: ProviderId,
    pub service_id: ServiceId,
}

/// Junction row linking a service to a country it is available in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCountryLink {
    pub id: ServiceCountryId,
    pub service_id: ServiceId,
    pub country_id: CountryId,
}

/// A service-country link about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceCountryLink {
    pub service_id: ServiceId,
    pub country_id: CountryId,
}

/// One row of the services-by-provider-name projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderServiceSummary {
    pub provider_name: String,
    pub provider_nit: String,
    pub service_name: String,
}

/// One raw row of the services-by-country join, before grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryServiceRow {
    pub country_name: String,
    pub service: Service,
}

/// Services grouped under one country, as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryServices {
    pub country_name: String,
    pub services: Vec<Service>,
}
