//! End-to-end crawls over HTTP against a mock directory

use crate::common::{detail_page, listing_page, profile};
use dircrawl::crawler::{Coordinator, OpenGate};
use dircrawl::navigator::HttpNavigator;
use dircrawl::storage::CsvRecordStore;
use dircrawl::CrawlOutcome;
use std::future::pending;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_html(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

/// Two listing pages (the second behind `?page=2`) and three detail pages
async fn mock_directory(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/firms"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[("Gamma Inc", "/firms/gamma")], None)),
        )
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/firms"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[("Acme LLC", "/firms/acme"), ("Beta Corp", "/firms/beta")],
            Some(&format!("{}/firms?page=2", base)),
        )))
        .with_priority(2)
        .mount(server)
        .await;

    // each detail page is fetched once across both runs
    mount_html(server, "/firms/acme", detail_page("Acme LLC", "https://acme.example"), 1).await;
    mount_html(server, "/firms/beta", detail_page("Beta Corp", "https://beta.example"), 1).await;
    mount_html(server, "/firms/gamma", detail_page("Gamma Inc", "https://gamma.example"), 1).await;
}

async fn run_crawl(server: &MockServer, output: &Path) -> dircrawl::output::CrawlSummary {
    let config = profile(
        &format!("{}/firms", server.uri()),
        &output.display().to_string(),
        "",
    );
    let navigator = HttpNavigator::from_config(&config).unwrap();
    let store = CsvRecordStore::new(output, config.field_names());
    let mut coordinator = Coordinator::new(config, navigator, store, OpenGate).unwrap();
    coordinator.run_until(pending()).await.unwrap()
}

#[tokio::test]
async fn test_http_crawl_writes_csv_and_resumes() {
    let server = MockServer::start().await;
    mock_directory(&server).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("brokers.csv");

    let summary = run_crawl(&server, &output).await;
    assert_eq!(summary.outcome, CrawlOutcome::Completed);
    assert_eq!(summary.tally.saved, 3);
    assert_eq!(summary.tally.listing_pages, 2);

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        text,
        "identifier,Company,Website,Location\n\
         Acme LLC,Acme LLC,https://acme.example/,Denver\n\
         Beta Corp,Beta Corp,https://beta.example/,Denver\n\
         Gamma Inc,Gamma Inc,https://gamma.example/,Denver\n"
    );

    let again = run_crawl(&server, &output).await;
    assert_eq!(again.tally.processed, 0);
    assert_eq!(again.tally.skipped, 3);
    assert_eq!(again.tally.saved, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), text);
}

#[tokio::test]
async fn test_http_crawl_survives_missing_detail_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/firms"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[("Gone Inc", "/firms/gone"), ("Acme LLC", "/firms/acme")],
            None,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/firms/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;
    mount_html(&server, "/firms/acme", detail_page("Acme LLC", "https://acme.example"), 1).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("brokers.csv");
    let summary = run_crawl(&server, &output).await;

    assert_eq!(summary.tally.failed, 1);
    assert_eq!(summary.tally.saved, 1);
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("Acme LLC"));
    assert!(!text.contains("Gone Inc"));
}
