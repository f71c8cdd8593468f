//! Provider and service aggregates
//!
//! The domain accepts fully nested aggregate DTOs (a provider with its custom
//! fields and services, a service with its country associations) and
//! reconciles them against persisted state: per child record, keep-and-update,
//! insert-as-new, or delete. Surrogate-key generation order is a hard
//! constraint: parents are flushed first so child foreign keys can be built.
//!
//! Writers commit once per logical operation. There is no concurrency token;
//! two concurrent updates to the same aggregate race and the later commit
//! wins.

pub mod error;
pub mod ports;
pub mod provider;
pub mod provider_writer;
pub mod service;
pub mod service_writer;

pub use error::ProviderError;
pub use ports::ProviderStore;
pub use provider::{
    CompleteProvider, CompleteService, CustomField, CustomFieldInput, CustomFieldView,
    NewCustomField, NewProvider, NewProviderGraph, NewServiceGraph, Provider, ProviderUpdate,
};
pub use provider_writer::ProviderWriter;
pub use service::{
    CountryServiceRow, CountryServices, NewProviderServiceLink, NewService, NewServiceCountryLink,
    ProviderServiceLink, ProviderServiceSummary, Service, ServiceCountryLink, ServiceUpdate,
};
pub use service_writer::ServiceWriter;
