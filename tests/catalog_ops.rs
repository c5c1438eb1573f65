//! Integration tests for catalog listing and dataset lookups.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cms_data_sync::catalog::{catalog, dataset_by_id, datasets_by_keyword};
use cms_data_sync::config::PackageConfig;
use cms_data_sync::Retriever;

const ORDER_UUID: &str = "9887a515-7552-4693-bf58-735c77af46d7";
const OPTOUT_UUID: &str = "11111111-2222-3333-4444-555555555555";
const ABSENT_UUID: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";

fn test_config(server: &MockServer, cache_dir: &TempDir) -> PackageConfig {
    let mut config = PackageConfig::default();
    config.request.base_url = server.uri();
    config.cache.cache_directory = cache_dir.path().to_path_buf();
    config
}

fn catalog_body(server: &MockServer) -> serde_json::Value {
    let base = server.uri();
    json!({
        "conformsTo": "https://project-open-data.cio.gov/v1.1/schema",
        "dataset": [
            {
                "title": "Order and Referring",
                "description": "Providers eligible to order and refer",
                "keyword": ["Medicare"],
                "modified": "2023-08-01",
                "accessLevel": "public",
                "identifier": format!("{base}/data-api/v1/dataset/{ORDER_UUID}/data-viewer"),
                "distribution": [
                    {"format": "API", "accessURL": format!("{base}/data-api/v1/dataset/{ORDER_UUID}/data-viewer")}
                ]
            },
            {
                "title": "Opt Out Affidavits",
                "keyword": ["Medicare"],
                "modified": "2023-07-15",
                "accessLevel": "public",
                "identifier": format!("{base}/data-api/v1/dataset/{OPTOUT_UUID}/data-viewer"),
                "distribution": [
                    {"format": "csv", "downloadURL": format!("{base}/files/optout.csv")}
                ]
            }
        ]
    })
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body(server)))
        .mount(server)
        .await;
}

// ---- Integration test: catalog decodes and fills dataset ids ----

#[tokio::test]
async fn test_catalog_fills_dataset_ids_from_identifiers() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let config = test_config(&server, &cache_dir);
    mount_catalog(&server).await;

    let retriever = Retriever::from_config(&config).unwrap();
    let catalog = catalog(&retriever, &config).await.unwrap();

    assert_eq!(catalog.dataset.len(), 2);
    assert_eq!(catalog.dataset[0].id, ORDER_UUID);
    assert_eq!(catalog.dataset[1].id, OPTOUT_UUID);
}

// ---- Integration test: keyword search keeps only API-backed datasets ----

#[tokio::test]
async fn test_datasets_by_keyword_requires_api_distribution() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let config = test_config(&server, &cache_dir);
    mount_catalog(&server).await;

    let retriever = Retriever::from_config(&config).unwrap();
    let datasets = datasets_by_keyword(&retriever, "Medicare", &config)
        .await
        .unwrap();

    // Both datasets carry the keyword, but only one exposes an API endpoint.
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0].title, "Order and Referring");

    let none = datasets_by_keyword(&retriever, "Medicaid", &config)
        .await
        .unwrap();
    assert!(none.is_empty());
}

// ---- Integration test: lookup by UUID finds the matching entry ----

#[tokio::test]
async fn test_dataset_by_id_finds_matching_entry() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let config = test_config(&server, &cache_dir);
    mount_catalog(&server).await;

    let retriever = Retriever::from_config(&config).unwrap();

    let found = dataset_by_id(&retriever, ORDER_UUID, &config).await.unwrap();
    assert_eq!(found.unwrap().title, "Order and Referring");

    // A well-formed UUID that is not in the catalog is a clean None.
    let absent = dataset_by_id(&retriever, ABSENT_UUID, &config).await.unwrap();
    assert!(absent.is_none());
}

// ---- Integration test: a catalog that is not JSON fails to decode ----

#[tokio::test]
async fn test_catalog_with_unexpected_shape_is_decode_error() {
    let server = MockServer::start().await;
    let cache_dir = TempDir::new().unwrap();
    let config = test_config(&server, &cache_dir);

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dataset": "not-a-list"})))
        .mount(&server)
        .await;

    let retriever = Retriever::from_config(&config).unwrap();
    let result = catalog(&retriever, &config).await;
    assert!(result.is_err());
}
