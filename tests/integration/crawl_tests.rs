//! Whole crawls over in-memory directories

use crate::common::{detail_url, directory, listing_page, page_url, profile};
use dircrawl::config::DelayRange;
use dircrawl::crawler::{Coordinator, OpenGate};
use dircrawl::navigator::FixtureNavigator;
use dircrawl::storage::MemoryRecordStore;
use dircrawl::{CrawlError, CrawlOutcome, FieldValue, Record};
use std::future::pending;
use std::time::Duration;

async fn crawl(
    nav: FixtureNavigator,
    store: MemoryRecordStore,
    extra: &str,
) -> Coordinator<FixtureNavigator, MemoryRecordStore, OpenGate> {
    let config = profile(&page_url(0), "unused.csv", extra);
    let mut coordinator = Coordinator::new(config, nav, store, OpenGate).unwrap();
    coordinator.run_until(pending()).await.unwrap();
    coordinator
}

#[tokio::test]
async fn test_full_crawl_across_pages() {
    let pages: &[&[&str]] = &[&["Acme LLC", "Beta Corp"], &["Gamma Inc", "Acme LLC"], &["Delta Co"]];
    let coordinator = crawl(directory(pages), MemoryRecordStore::new(), "").await;

    let ids: Vec<_> = coordinator
        .checkpoint()
        .store()
        .records()
        .iter()
        .map(|r| r.identifier().to_string())
        .collect();
    assert_eq!(ids, vec!["Acme LLC", "Beta Corp", "Gamma Inc", "Delta Co"]);

    let nav = coordinator.navigator();
    assert_eq!(nav.visit_count(&detail_url("Acme LLC")), 1);
    assert_eq!(nav.visit_count(&page_url(2)), 1);
    assert_eq!(nav.close_count(), 1);

    let summary = coordinator.summary().unwrap();
    assert_eq!(summary.outcome, CrawlOutcome::Completed);
    assert_eq!(summary.tally.listing_pages, 3);
    assert_eq!(summary.tally.saved, 4);
}

#[tokio::test]
async fn test_records_use_fallback_strategies() {
    let pages: &[&[&str]] = &[&["Acme LLC"]];
    let coordinator = crawl(directory(pages), MemoryRecordStore::new(), "").await;

    let record = &coordinator.checkpoint().store().records()[0];
    assert_eq!(record.get("Company"), &FieldValue::Found("Acme LLC".into()));
    assert_eq!(
        record.get("Website"),
        &FieldValue::Found("https://acme-llc.example/".into())
    );
    assert_eq!(record.get("Location"), &FieldValue::Found("Denver".into()));
}

#[tokio::test]
async fn test_known_entity_is_never_visited() {
    let pages: &[&[&str]] = &[&["Acme LLC", "Beta Corp"]];
    let known = vec![Record::new("Acme LLC").unwrap()];
    let coordinator = crawl(directory(pages), MemoryRecordStore::with_records(known), "").await;

    let nav = coordinator.navigator();
    assert_eq!(nav.visit_count(&detail_url("Acme LLC")), 0);
    assert_eq!(nav.visit_count(&detail_url("Beta Corp")), 1);

    let store = coordinator.checkpoint().store();
    assert_eq!(store.append_batches(), &[1]);
    assert_eq!(store.records()[1].identifier(), "Beta Corp");
    assert_eq!(coordinator.summary().unwrap().tally.skipped, 1);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let pages: &[&[&str]] = &[&["Acme LLC", "Beta Corp"], &["Gamma Inc"]];
    let first = crawl(directory(pages), MemoryRecordStore::new(), "").await;
    let captured = first.checkpoint().store().records().to_vec();
    assert_eq!(captured.len(), 3);

    let second = crawl(directory(pages), MemoryRecordStore::with_records(captured), "").await;
    let nav = second.navigator();
    for name in ["Acme LLC", "Beta Corp", "Gamma Inc"] {
        assert_eq!(nav.visit_count(&detail_url(name)), 0);
    }
    assert!(second.checkpoint().store().append_batches().is_empty());
    assert_eq!(second.summary().unwrap().tally.skipped, 3);
}

#[tokio::test]
async fn test_flush_threshold_batches() {
    let pages: &[&[&str]] = &[&["A1", "A2", "A3", "A4"], &["B1", "B2", "B3"]];
    let coordinator = crawl(directory(pages), MemoryRecordStore::new(), "").await;

    let store = coordinator.checkpoint().store();
    assert_eq!(store.append_batches(), &[5, 2]);
    assert_eq!(store.flush_count(), 2);
    assert_eq!(coordinator.checkpoint().pending_len(), 0);
}

#[tokio::test]
async fn test_unready_detail_yields_not_found_record() {
    let nav = FixtureNavigator::new()
        .with_page(
            &page_url(0),
            listing_page(&[("Slow Co", "/firms/slow-co")], None),
        )
        .with_page(&detail_url("Slow Co"), "<html><body><div id=\"app\"></div></body></html>");
    let coordinator = crawl(nav, MemoryRecordStore::new(), "").await;

    let records = coordinator.checkpoint().store().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identifier(), "Slow Co");
    assert_eq!(records[0].found_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_flushes_pending_batch_once() {
    let pages: &[&[&str]] = &[&["A1", "A2", "A3", "A4"]];
    let mut config = profile(&page_url(0), "unused.csv", "");
    config.crawler.request_delay = DelayRange::new(100, 100);

    let mut coordinator =
        Coordinator::new(config, directory(pages), MemoryRecordStore::new(), OpenGate).unwrap();
    let summary = coordinator
        .run_until(tokio::time::sleep(Duration::from_millis(150)))
        .await
        .unwrap();

    assert_eq!(summary.outcome, CrawlOutcome::Interrupted);
    let store = coordinator.checkpoint().store();
    assert_eq!(store.append_batches(), &[2]);
    assert_eq!(store.flush_count(), 1);
    assert_eq!(coordinator.navigator().close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_keeps_skips_after_last_capture() {
    let pages: &[&[&str]] = &[&["New One"], &["Known One", "Known Two"], &["New Two"]];
    let known = vec![
        Record::new("Known One").unwrap(),
        Record::new("Known Two").unwrap(),
    ];
    let nav = directory(pages).with_failures(&page_url(2), 10);
    let mut config = profile(&page_url(0), "unused.csv", "");
    config.crawler.request_delay = DelayRange::new(100, 100);
    config.crawler.retry_backoff = DelayRange::new(1000, 1000);

    let mut coordinator =
        Coordinator::new(config, nav, MemoryRecordStore::with_records(known), OpenGate).unwrap();
    let summary = coordinator
        .run_until(tokio::time::sleep(Duration::from_millis(150)))
        .await
        .unwrap();

    assert_eq!(summary.outcome, CrawlOutcome::Interrupted);
    assert_eq!(summary.tally.processed, 1);
    assert_eq!(summary.tally.skipped, 2);
    assert_eq!(summary.tally.listing_pages, 2);
    assert_eq!(coordinator.checkpoint().store().append_batches(), &[1]);
}

#[tokio::test]
async fn test_persistence_failure_is_fatal_after_draining() {
    let pages: &[&[&str]] = &[&["Acme LLC", "Beta Corp"]];
    let mut store = MemoryRecordStore::new();
    store.set_fail_appends(true);
    let mut config = profile(&page_url(0), "unused.csv", "");
    config.crawler.flush_threshold = 1;

    let mut coordinator = Coordinator::new(config, directory(pages), store, OpenGate).unwrap();
    let result = coordinator.run_until(pending()).await;

    assert!(matches!(result, Err(CrawlError::Persistence(_))));
    let nav = coordinator.navigator();
    assert_eq!(nav.visit_count(&detail_url("Beta Corp")), 0);
    assert_eq!(nav.close_count(), 1);

    let summary = coordinator.summary().unwrap();
    assert_eq!(summary.outcome, CrawlOutcome::Failed);
    assert_eq!(summary.unsaved, 1);
}
