//! Strongly-typed identifiers for domain entities
//!
//! All entities are surrogate-keyed by an integer id assigned by the store on
//! insert. Newtype wrappers prevent accidental mixing of identifier types,
//! e.g. passing a service id where a provider id is expected.
//!
//! An id of zero or below means the row has not been persisted yet; incoming
//! DTOs use this to mark children as "new" during reconciliation.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wraps a store-assigned id
            pub fn new(id: i32) -> Self {
                Self(id)
            }

            /// Sentinel for a row that has not been persisted yet
            pub fn unassigned() -> Self {
                Self(0)
            }

            /// Returns true if the id was assigned by the store (> 0)
            pub fn is_assigned(&self) -> bool {
                self.0 > 0
            }

            /// Returns the raw integer value
            pub fn value(&self) -> i32 {
                self.0
            }

            /// Entity name for diagnostics
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::unassigned()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> i32 {
                id.0
            }
        }
    };
}

define_id!(ProviderId, "provider");
define_id!(CustomFieldId, "custom field");
define_id!(ServiceId, "service");
define_id!(CountryId, "country");
define_id!(ProviderServiceId, "provider-service link");
define_id!(ServiceCountryId, "service-country link");
