//! Provider aggregate entities and DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CountryId, CustomFieldId, ProviderId};
use domain_catalog::Country;

/// A persisted provider row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    /// Tax id; a business identifier, uniqueness not enforced at this layer
    pub nit: String,
    pub name: String,
    pub email: String,
}

/// A provider row about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvider {
    pub nit: String,
    pub name: String,
    pub email: String,
}

/// A persisted custom field, exclusively owned by one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: CustomFieldId,
    pub provider_id: ProviderId,
    pub field_name: String,
    pub field_value: String,
}

/// A custom field row about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomField {
    pub provider_id: ProviderId,
    pub field_name: String,
    pub field_value: String,
}

/// An incoming custom field. An absent or non-positive id marks the field as
/// new; a positive id claims a persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomFieldInput {
    #[serde(default)]
    pub id: CustomFieldId,
    #[validate(length(min = 1, message = "field name must not be empty"))]
    pub field_name: String,
    pub field_value: String,
}

/// Incoming graph for creating a provider together with its children.
///
/// Services listed here are created fresh and linked; their countries must
/// reference already-synchronized catalog ids.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProviderGraph {
    #[validate(length(min = 1, message = "nit must not be empty"))]
    pub nit: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    #[validate(nested)]
    pub custom_fields: Vec<CustomFieldInput>,
    #[serde(default)]
    #[validate(nested)]
    pub services: Vec<NewServiceGraph>,
}

/// A service nested inside a provider-create graph
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewServiceGraph {
    #[validate(length(min = 1, message = "service name must not be empty"))]
    pub name: String,
    #[validate(custom(function = "crate::service::validate_rate"))]
    pub value_per_hour_usd: String,
    /// Catalog ids of the countries the service is available in
    #[serde(default)]
    pub countries: Vec<CountryId>,
}

/// Incoming update for a provider: scalar fields plus the full intended set
/// of custom fields. Fields omitted from the set are removed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProviderUpdate {
    pub id: ProviderId,
    #[validate(length(min = 1, message = "nit must not be empty"))]
    pub nit: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    #[validate(nested)]
    pub custom_fields: Vec<CustomFieldInput>,
}

/// A custom field as exposed in the complete provider graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomFieldView {
    pub id: CustomFieldId,
    pub field_name: String,
    pub field_value: String,
}

impl From<CustomField> for CustomFieldView {
    fn from(row: CustomField) -> Self {
        Self {
            id: row.id,
            field_name: row.field_name,
            field_value: row.field_value,
        }
    }
}

/// A service with its countries resolved, inside a complete provider graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteService {
    pub id: core_kernel::ServiceId,
    pub name: String,
    pub value_per_hour_usd: String,
    pub countries: Vec<Country>,
}

/// The eagerly-resolved provider graph returned by `list_complete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteProvider {
    pub id: ProviderId,
    pub nit: String,
    pub name: String,
    pub email: String,
    pub custom_fields: Vec<CustomFieldView>,
    pub services: Vec<CompleteService>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn graph_input_deserializes_with_defaults() {
        let graph: NewProviderGraph = serde_json::from_str(
            r#"{"nit":"900123","name":"Acme","email":"ops@acme.co"}"#,
        )
        .unwrap();
        assert!(graph.custom_fields.is_empty());
        assert!(graph.services.is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn custom_field_input_defaults_to_unassigned_id() {
        let field: CustomFieldInput =
            serde_json::from_str(r#"{"field_name":"phone","field_value":"555"}"#).unwrap();
        assert!(!field.id.is_assigned());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let graph: NewProviderGraph =
            serde_json::from_str(r#"{"nit":"1","name":"A","email":"not-an-email"}"#).unwrap();
        assert!(graph.validate().is_err());
    }

    #[test]
    fn nested_service_rate_is_validated() {
        let graph: NewProviderGraph = serde_json::from_str(
            r#"{"nit":"1","name":"A","email":"a@b.co",
                "services":[{"name":"Support","value_per_hour_usd":"not a number"}]}"#,
        )
        .unwrap();
        assert!(graph.validate().is_err());
    }
}
