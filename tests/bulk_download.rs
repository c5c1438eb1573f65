//! Integration tests for page-wise bulk dataset downloads.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cms_data_sync::bulk::{download_all, download_by_keyword, page_file_path};
use cms_data_sync::config::PackageConfig;
use cms_data_sync::Retriever;

const UUID: &str = "9887a515-7552-4693-bf58-735c77af46d7";
const SECOND_UUID: &str = "11111111-2222-3333-4444-555555555555";

/// Helper: config pointing at the mock server with caching off, so every
/// page maps to exactly one GET.
fn test_config(server: &MockServer) -> PackageConfig {
    let mut config = PackageConfig::default();
    config.request.base_url = server.uri();
    config.cache.enable_local_cache = false;
    config.network.page_wait = std::time::Duration::ZERO;
    config
}

fn viewer_path() -> String {
    format!("/data-api/v1/dataset/{UUID}/data-viewer")
}

fn meta_body(total_rows: u64, size: u64) -> serde_json::Value {
    json!({
        "meta": {
            "total_rows": total_rows,
            "size": size,
            "headers": ["NPI", "LAST_NAME"],
            "data_file_meta_data": {}
        },
        "data": []
    })
}

fn page_body(total_rows: u64, offset: u64, rows: serde_json::Value) -> serde_json::Value {
    json!({
        "meta": {
            "total_rows": total_rows,
            "offset": offset,
            "size": 5000,
            "headers": ["NPI", "LAST_NAME"],
            "data_file_meta_data": {}
        },
        "data": rows
    })
}

// ---- Integration test: three pages for 12000 rows, all persisted ----

#[tokio::test]
async fn test_download_all_persists_every_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = test_config(&server);

    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meta_body(12_000, 0)))
        .expect(1)
        .mount(&server)
        .await;

    for offset in [0_u64, 5_000, 10_000] {
        Mock::given(method("GET"))
            .and(path(viewer_path()))
            .and(query_param("size", "5000"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
                12_000,
                offset,
                json!([["123", "SMITH"]]),
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let retriever = Retriever::from_config(&config).unwrap();
    let outcomes = download_all(&retriever, UUID, output.path(), &config)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    let offsets: Vec<u64> = outcomes.iter().map(|o| o.offset).collect();
    assert_eq!(offsets, vec![0, 5_000, 10_000]);

    for outcome in &outcomes {
        let path = outcome.result.as_ref().unwrap();
        assert_eq!(path, &page_file_path(output.path(), UUID, outcome.offset));
        let contents = std::fs::read_to_string(path).unwrap();
        // Each page file holds the raw row array, not the full envelope.
        let rows: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(rows, json!([["123", "SMITH"]]));
    }
}

// ---- Integration test: one failed page never aborts its siblings ----

#[tokio::test]
async fn test_download_all_settles_pages_independently() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = test_config(&server);

    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meta_body(12_000, 0)))
        .mount(&server)
        .await;

    for offset in [0_u64, 10_000] {
        Mock::given(method("GET"))
            .and(path(viewer_path()))
            .and(query_param("size", "5000"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
                12_000,
                offset,
                json!([["123", "SMITH"]]),
            )))
            .mount(&server)
            .await;
    }
    // The middle page fails with a server error.
    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "5000"))
        .and(query_param("offset", "5000"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let retriever = Retriever::from_config(&config).unwrap();
    let outcomes = download_all(&retriever, UUID, output.path(), &config)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[1].result.is_err());
    assert!(outcomes[2].result.is_ok());

    assert!(page_file_path(output.path(), UUID, 0).exists());
    assert!(!page_file_path(output.path(), UUID, 5_000).exists());
    assert!(page_file_path(output.path(), UUID, 10_000).exists());
}

// ---- Integration test: a failed probe aborts before any page request ----

#[tokio::test]
async fn test_download_all_fails_fast_when_probe_fails() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = test_config(&server);

    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let retriever = Retriever::from_config(&config).unwrap();
    let result = download_all(&retriever, UUID, output.path(), &config).await;

    assert!(result.is_err());
    // No dataset directory was created.
    assert!(!output.path().join(UUID).exists());
}

// ---- Integration test: zero simultaneous_requests must not deadlock ----

#[tokio::test]
async fn test_download_all_completes_with_zero_simultaneous_requests() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let mut config = test_config(&server);
    // Set directly, bypassing the clamping config merge.
    config.network.simultaneous_requests = 0;

    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meta_body(1, 0)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "5000"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            1,
            0,
            json!([["123", "SMITH"]]),
        )))
        .mount(&server)
        .await;

    let retriever = Retriever::from_config(&config).unwrap();
    let outcomes = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        download_all(&retriever, UUID, output.path(), &config),
    )
    .await
    .expect("download must not hang on a zero concurrency cap")
    .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.is_ok());
}

// ---- Integration test: keyword download settles datasets independently ----

#[tokio::test]
async fn test_download_by_keyword_isolates_failed_dataset() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = test_config(&server);
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dataset": [
                {
                    "title": "Order and Referring",
                    "keyword": ["Medicare"],
                    "identifier": format!("{base}/data-api/v1/dataset/{UUID}/data-viewer"),
                    "distribution": [{"format": "API"}]
                },
                {
                    "title": "Opt Out Affidavits",
                    "keyword": ["Medicare"],
                    "identifier": format!("{base}/data-api/v1/dataset/{SECOND_UUID}/data-viewer"),
                    "distribution": [{"format": "API"}]
                }
            ]
        })))
        .mount(&server)
        .await;

    // The first dataset's metadata probe fails outright.
    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // The second dataset downloads normally.
    let second_path = format!("/data-api/v1/dataset/{SECOND_UUID}/data-viewer");
    Mock::given(method("GET"))
        .and(path(second_path.as_str()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meta_body(1, 0)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(second_path.as_str()))
        .and(query_param("size", "5000"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            1,
            0,
            json!([["456", "JONES"]]),
        )))
        .mount(&server)
        .await;

    let retriever = Retriever::from_config(&config).unwrap();
    let outcomes = download_by_keyword(&retriever, "Medicare", output.path(), &config)
        .await
        .unwrap();

    // Both datasets settle, in catalog order; the failure stays contained.
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].dataset.id, UUID);
    assert!(outcomes[0].pages.is_err());
    assert_eq!(outcomes[1].dataset.id, SECOND_UUID);
    let pages = outcomes[1].pages.as_ref().unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].result.is_ok());
    assert!(page_file_path(output.path(), SECOND_UUID, 0).exists());
}

// ---- Integration test: empty dataset settles with zero pages ----

#[tokio::test]
async fn test_download_all_empty_dataset_has_no_pages() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = test_config(&server);

    Mock::given(method("GET"))
        .and(path(viewer_path()))
        .and(query_param("size", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(meta_body(0, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let retriever = Retriever::from_config(&config).unwrap();
    let outcomes = download_all(&retriever, UUID, output.path(), &config)
        .await
        .unwrap();

    assert!(outcomes.is_empty());
}
