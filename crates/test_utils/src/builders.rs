//! Test Data Builders
//!
//! Builder patterns for constructing aggregate test data with sensible
//! defaults, so tests specify only the fields they care about.

use core_kernel::{CountryId, CustomFieldId, ProviderId, ServiceId};
use domain_providers::{
    CustomFieldInput, NewProviderGraph, NewService, NewServiceGraph, ProviderUpdate,
    ServiceUpdate,
};

/// Builder for the nested provider-create graph
pub struct ProviderGraphBuilder {
    nit: String,
    name: String,
    email: String,
    custom_fields: Vec<CustomFieldInput>,
    services: Vec<NewServiceGraph>,
}

impl Default for ProviderGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderGraphBuilder {
    /// Creates a builder with a plausible default provider
    pub fn new() -> Self {
        Self {
            nit: "900123456".to_string(),
            name: "Acme Consulting".to_string(),
            email: "ops@acme.co".to_string(),
            custom_fields: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn with_nit(mut self, nit: impl Into<String>) -> Self {
        self.nit = nit.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Appends a new (id-less) custom field
    pub fn with_custom_field(
        mut self,
        field_name: impl Into<String>,
        field_value: impl Into<String>,
    ) -> Self {
        self.custom_fields.push(CustomFieldInput {
            id: CustomFieldId::unassigned(),
            field_name: field_name.into(),
            field_value: field_value.into(),
        });
        self
    }

    /// Appends a nested service with its country ids
    pub fn with_service(
        mut self,
        name: impl Into<String>,
        rate: impl Into<String>,
        countries: Vec<CountryId>,
    ) -> Self {
        self.services.push(NewServiceGraph {
            name: name.into(),
            value_per_hour_usd: rate.into(),
            countries,
        });
        self
    }

    pub fn build(self) -> NewProviderGraph {
        NewProviderGraph {
            nit: self.nit,
            name: self.name,
            email: self.email,
            custom_fields: self.custom_fields,
            services: self.services,
        }
    }
}

/// Builder for provider updates carrying the full intended custom-field set
pub struct ProviderUpdateBuilder {
    id: ProviderId,
    nit: String,
    name: String,
    email: String,
    custom_fields: Vec<CustomFieldInput>,
}

impl ProviderUpdateBuilder {
    /// Starts from the scalar values of the default graph builder
    pub fn for_provider(id: ProviderId) -> Self {
        Self {
            id,
            nit: "900123456".to_string(),
            name: "Acme Consulting".to_string(),
            email: "ops@acme.co".to_string(),
            custom_fields: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Keeps a persisted field, optionally with a new value
    pub fn keeping_field(
        mut self,
        id: CustomFieldId,
        field_name: impl Into<String>,
        field_value: impl Into<String>,
    ) -> Self {
        self.custom_fields.push(CustomFieldInput {
            id,
            field_name: field_name.into(),
            field_value: field_value.into(),
        });
        self
    }

    /// Adds a fresh field with no id
    pub fn adding_field(
        mut self,
        field_name: impl Into<String>,
        field_value: impl Into<String>,
    ) -> Self {
        self.custom_fields.push(CustomFieldInput {
            id: CustomFieldId::unassigned(),
            field_name: field_name.into(),
            field_value: field_value.into(),
        });
        self
    }

    pub fn build(self) -> ProviderUpdate {
        ProviderUpdate {
            id: self.id,
            nit: self.nit,
            name: self.name,
            email: self.email,
            custom_fields: self.custom_fields,
        }
    }
}

/// Builder for service rows and updates
pub struct ServiceBuilder {
    name: String,
    value_per_hour_usd: String,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            name: "Support".to_string(),
            value_per_hour_usd: "45.50".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.value_per_hour_usd = rate.into();
        self
    }

    pub fn build(self) -> NewService {
        NewService {
            name: self.name,
            value_per_hour_usd: self.value_per_hour_usd,
        }
    }

    /// Turns the builder into an update for an existing service, with the
    /// full intended country set
    pub fn build_update(self, id: ServiceId, countries: Vec<CountryId>) -> ServiceUpdate {
        ServiceUpdate {
            id,
            name: self.name,
            value_per_hour_usd: self.value_per_hour_usd,
            countries,
        }
    }
}
