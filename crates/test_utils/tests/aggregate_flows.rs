//! Cross-domain integration suite
//!
//! Drives the catalog synchronizer and the aggregate writers together
//! against the in-memory mock stores: sync the catalog, build provider
//! graphs over it, reconcile updates, and verify the read projections.

use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, WriteOutcome};
use domain_catalog::ports::mock::MockCountryStore;
use domain_catalog::{CountryFeed, CountryRecord, CountrySynchronizer, NewCountry};
use domain_providers::ports::mock::MockProviderStore;
use domain_providers::{ProviderWriter, ServiceWriter};
use test_utils::{
    CountryFixtures, FeedFixtures, ProviderGraphBuilder, ProviderUpdateBuilder, ServiceBuilder,
};

struct StubFeed {
    records: Vec<CountryRecord>,
}

impl DomainPort for StubFeed {}

#[async_trait]
impl CountryFeed for StubFeed {
    async fn fetch(&self) -> Result<Vec<CountryRecord>, PortError> {
        Ok(self.records.clone())
    }
}

/// Runs one sync pass into a fresh catalog store and mirrors the synced
/// rows into the provider store's country table.
async fn synced_stores() -> (Arc<MockProviderStore>, Arc<MockCountryStore>) {
    let catalog = Arc::new(MockCountryStore::new());
    let synchronizer = CountrySynchronizer::new(
        Arc::new(StubFeed {
            records: FeedFixtures::standard_feed(),
        }),
        catalog.clone(),
    );
    let summary = synchronizer.synchronize().await.unwrap();
    assert_eq!(summary.inserted, 3);

    let providers = Arc::new(MockProviderStore::new());
    let rows = catalog
        .snapshot()
        .await
        .into_iter()
        .map(|c| NewCountry {
            iso_code: c.iso_code,
            name: c.name,
            flag_url: c.flag_url,
        })
        .collect();
    providers.seed_countries(rows).await;
    (providers, catalog)
}

#[tokio::test]
async fn full_provider_lifecycle_over_a_synced_catalog() {
    let (store, _catalog) = synced_stores().await;
    // Mirror step assigned ids in feed order: COL=1, PER=2, ARG=3
    let colombia = core_kernel::CountryId::new(1);

    let writer = ProviderWriter::new(store.clone());
    let graph = ProviderGraphBuilder::new()
        .with_custom_field("phone", "555-0100")
        .with_custom_field("segment", "enterprise")
        .with_service("Support", "45.50", vec![colombia])
        .build();

    let id = writer.create(graph).await.unwrap();

    // Round trip through the eager read model
    let complete = writer.list_complete().await.unwrap();
    assert_eq!(complete.len(), 1);
    let provider = &complete[0];
    assert_eq!(provider.id, id);
    assert_eq!(provider.custom_fields.len(), 2);
    assert_eq!(provider.services.len(), 1);
    assert_eq!(provider.services[0].countries[0].iso_code, "COL");

    // Reconcile: rename one field, drop the other, add a third
    let phone = store
        .custom_fields()
        .await
        .into_iter()
        .find(|f| f.field_name == "phone")
        .unwrap();
    let update = ProviderUpdateBuilder::for_provider(id)
        .with_name("Acme Consulting SAS")
        .keeping_field(phone.id, "phone", "555-0199")
        .adding_field("website", "acme.co")
        .build();
    assert!(writer.update(update).await.unwrap().is_applied());

    let fields = store.custom_fields().await;
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().any(|f| f.field_name == "website"));
    assert!(!fields.iter().any(|f| f.field_name == "segment"));

    // Delete: fields and links go, the shared service row stays
    assert!(writer.delete(id).await.unwrap().is_applied());
    assert!(store.providers().await.is_empty());
    assert!(store.custom_fields().await.is_empty());
    assert!(store.provider_links().await.is_empty());
    assert_eq!(store.services().await.len(), 1);
}

#[tokio::test]
async fn service_reconciliation_and_country_projection() {
    let (store, _catalog) = synced_stores().await;
    let writer = ServiceWriter::new(store.clone());

    let id = writer.create(ServiceBuilder::new().build()).await.unwrap();
    let all_ids: Vec<_> = (1..=3).map(core_kernel::CountryId::new).collect();

    // Link everywhere, then shrink to one country
    let update = ServiceBuilder::new().build_update(id, all_ids.clone());
    assert!(writer.update(update).await.unwrap().is_applied());
    assert_eq!(store.country_links().await.len(), 3);

    let shrink = ServiceBuilder::new().build_update(id, vec![all_ids[1]]);
    assert!(writer.update(shrink).await.unwrap().is_applied());
    let links = store.country_links().await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].country_id, all_ids[1]);

    // Projection groups by the synced country's name
    let grouped = writer.services_by_country("PER").await.unwrap();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].country_name, "Perú");
    assert_eq!(grouped[0].services[0].name, "Support");

    // The other codes now resolve to nothing
    assert!(writer.services_by_country("COL").await.unwrap().is_empty());
}

#[tokio::test]
async fn second_sync_pass_updates_only_changed_rows() {
    let catalog = Arc::new(MockCountryStore::with_countries(CountryFixtures::standard_catalog()).await);

    let synchronizer = CountrySynchronizer::new(
        Arc::new(StubFeed {
            records: FeedFixtures::feed_with_renamed_colombia(),
        }),
        catalog.clone(),
    );
    let summary = synchronizer.synchronize().await.unwrap();
    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 1);

    let rows = catalog.snapshot().await;
    assert_eq!(rows.len(), 3);
    let colombia = rows.iter().find(|c| c.iso_code == "COL").unwrap();
    assert_eq!(colombia.name, "República de Colombia");
}

#[tokio::test]
async fn not_found_boundaries_issue_no_writes() {
    let (store, _catalog) = synced_stores().await;
    let providers = ProviderWriter::new(store.clone());
    let services = ServiceWriter::new(store.clone());

    let outcome = providers
        .delete(core_kernel::ProviderId::new(77))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::not_found("provider", 77));

    let outcome = services
        .delete(core_kernel::ServiceId::new(77))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::not_found("service", 77));

    assert_eq!(store.staged_ops().await, 0);
}
