//! Router-level tests against the in-memory store mocks
//!
//! These exercise the full HTTP surface: routing, validation, the response
//! envelope, and the outcome-to-status mapping, with the domain writers
//! running against mock stores.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_catalog::ports::mock::MockCountryStore;
use domain_catalog::{Country, CountryFeed, CountryRecord, CountryStore, NewCountry};
use domain_providers::ports::mock::MockProviderStore;
use domain_providers::ProviderStore;
use interface_api::{create_router, AppState};

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

struct AlwaysHealthy;

#[async_trait]
impl HealthCheckable for AlwaysHealthy {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "test".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

struct Harness {
    server: TestServer,
    providers: Arc<MockProviderStore>,
    catalog: Arc<MockCountryStore>,
}

fn harness_with_feed(records: Vec<CountryRecord>) -> Harness {
    let providers = Arc::new(MockProviderStore::new());
    let catalog = Arc::new(MockCountryStore::new());

    let provider_handle = providers.clone();
    let catalog_handle = catalog.clone();
    let state = AppState::with_ports(
        Arc::new(move || provider_handle.clone() as Arc<dyn ProviderStore>),
        Arc::new(move || catalog_handle.clone() as Arc<dyn CountryStore>),
        Arc::new(StubFeed { records }),
        Arc::new(AlwaysHealthy),
    );

    let server = TestServer::new(create_router(state)).expect("router must build");
    Harness {
        server,
        providers,
        catalog,
    }
}

fn harness() -> Harness {
    harness_with_feed(Vec::new())
}

fn acme() -> Value {
    json!({
        "nit": "900123456",
        "name": "Acme Consulting",
        "email": "ops@acme.co",
        "custom_fields": [
            {"field_name": "phone", "field_value": "555-0100"}
        ]
    })
}

#[tokio::test]
async fn provider_create_then_list_round_trip() {
    let h = harness();

    let response = h.server.post("/api/providers").json(&acme()).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], json!(true));
    assert_eq!(body["message"], json!("OK"));
    let id = body["id"].as_i64().expect("create returns the generated id");

    let list: Value = h.server.get("/api/providers").await.json();
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["id"].as_i64(), Some(id));
    assert_eq!(list[0]["name"], json!("Acme Consulting"));

    let complete: Value = h.server.get("/api/providers/complete").await.json();
    assert_eq!(complete[0]["custom_fields"].as_array().map(Vec::len), Some(1));
    assert_eq!(complete[0]["services"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn provider_create_rejects_invalid_email() {
    let h = harness();
    let mut body = acme();
    body["email"] = json!("not-an-email");

    let response = h.server.post("/api/providers").json(&body).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(h.providers.providers().await.is_empty());
}

#[tokio::test]
async fn provider_update_of_unknown_id_is_404_with_message() {
    let h = harness();
    let response = h
        .server
        .put("/api/providers")
        .json(&json!({
            "id": 42,
            "nit": "1",
            "name": "Ghost",
            "email": "g@x.co"
        }))
        .await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["status"], json!(false));
    assert_eq!(body["message"], json!("The provider with id 42 was not found"));
}

#[tokio::test]
async fn provider_idempotent_update_reports_no_changes() {
    let h = harness();
    let created: Value = h.server.post("/api/providers").json(&acme()).await.json();
    let id = created["id"].as_i64().unwrap();
    let fields = h.providers.custom_fields().await;

    let response = h
        .server
        .put("/api/providers")
        .json(&json!({
            "id": id,
            "nit": "900123456",
            "name": "Acme Consulting",
            "email": "ops@acme.co",
            "custom_fields": [{
                "id": fields[0].id.value(),
                "field_name": "phone",
                "field_value": "555-0100"
            }]
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], json!(true));
    assert_eq!(
        body["message"],
        json!(format!("No changes for the provider with id {}", id))
    );
}

#[tokio::test]
async fn provider_delete_round_trip() {
    let h = harness();
    let created: Value = h.server.post("/api/providers").json(&acme()).await.json();
    let id = created["id"].as_i64().unwrap();

    let response = h.server.delete(&format!("/api/providers/{}", id)).await;
    response.assert_status_ok();
    assert!(h.providers.providers().await.is_empty());

    let again = h.server.delete(&format!("/api/providers/{}", id)).await;
    again.assert_status_not_found();
}

#[tokio::test]
async fn service_create_update_and_country_queries() {
    let h = harness();
    let countries = h
        .providers
        .seed_countries(vec![NewCountry {
            iso_code: "COL".into(),
            name: "Colombia".into(),
            flag_url: "https://flagcdn.com/w320/co.png".into(),
        }])
        .await;

    let created: Value = h
        .server
        .post("/api/services")
        .json(&json!({"name": "Support", "value_per_hour_usd": "45.50"}))
        .await
        .json();
    assert_eq!(created["status"], json!(true));
    let id = created["id"].as_i64().unwrap();

    let response = h
        .server
        .put("/api/services")
        .json(&json!({
            "id": id,
            "name": "Support",
            "value_per_hour_usd": "45.50",
            "countries": [countries[0].value()]
        }))
        .await;
    response.assert_status_ok();

    let grouped: Value = h.server.get("/api/services/by-country/COL").await.json();
    assert_eq!(grouped[0]["country_name"], json!("Colombia"));
    assert_eq!(grouped[0]["services"].as_array().map(Vec::len), Some(1));

    let empty: Value = h.server.get("/api/services/by-country/BRA").await.json();
    assert_eq!(empty.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn service_create_rejects_non_decimal_rate() {
    let h = harness();
    let response = h
        .server
        .post("/api/services")
        .json(&json!({"name": "Support", "value_per_hour_usd": "a lot"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn services_by_provider_name_query() {
    let h = harness();
    let mut body = acme();
    body["services"] = json!([{"name": "Auditing", "value_per_hour_usd": "80"}]);
    h.server.post("/api/providers").json(&body).await.assert_status_ok();

    let rows: Value = h
        .server
        .get("/api/services/by-provider")
        .add_query_param("name", "Acme")
        .await
        .json();
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0]["service_name"], json!("Auditing"));
}

#[tokio::test]
async fn country_sync_inserts_feed_records() {
    let h = harness_with_feed(vec![
        CountryRecord {
            code: "COL".into(),
            name: "Colombia".into(),
            flag_url: "https://flagcdn.com/w320/co.png".into(),
        },
        CountryRecord {
            code: "PER".into(),
            name: "Perú".into(),
            flag_url: "https://flagcdn.com/w320/pe.png".into(),
        },
    ]);

    let response = h.server.post("/api/countries/sync").await;
    response.assert_status_ok();
    let summary: Value = response.json();
    assert_eq!(summary["fetched"], json!(2));
    assert_eq!(summary["inserted"], json!(2));
    assert_eq!(summary["updated"], json!(0));

    let listed: Vec<Country> = h.server.get("/api/countries").await.json();
    assert_eq!(listed.len(), 2);
    assert_eq!(h.catalog.snapshot().await.len(), 2);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let h = harness();
    h.server.get("/health").await.assert_status_ok();
    h.server.get("/health/ready").await.assert_status_ok();
}
