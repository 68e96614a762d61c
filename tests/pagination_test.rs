mod common;

use cci_scrape::config::PageCountStrategy;
use cci_scrape::core::form::FormDriver;
use cci_scrape::core::paginate::PaginationWalker;
use cci_scrape::domain::model::{columns, Cell, ProjectId, ProjectOutcome};
use cci_scrape::{CsvExporter, ScrapeConfig, ScrapeError, ScrapePipeline};
use common::{fast_config, page, FakePortal, Page, SUBCONTRACTS};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// `count` pages holding `page_number` rows each.
fn pages(count: usize) -> Vec<Page> {
    (1..=count)
        .map(|n| {
            (1..=n)
                .map(|row| (format!("Sub {}-{}", n, row), format!("${}.00", row * 100)))
                .collect()
        })
        .collect()
}

async fn walk(
    portal: &FakePortal,
    config: &ScrapeConfig,
    project: &str,
) -> anyhow::Result<Option<cci_scrape::domain::model::ResultTable>> {
    let project = ProjectId::parse(project).unwrap();
    FormDriver::new(portal, config)
        .search(SUBCONTRACTS, &project)
        .await?;
    Ok(PaginationWalker::new(portal, config).walk().await?)
}

#[tokio::test]
async fn test_follows_next_until_disabled() -> anyhow::Result<()> {
    for count in 1..=5 {
        let portal = FakePortal::new().with_project("1000", pages(count));
        let config = fast_config();

        let table = walk(&portal, &config, "1000").await?.unwrap();

        let expected_rows: usize = (1..=count).sum();
        assert_eq!(table.len(), expected_rows, "{} page(s)", count);
        assert_eq!(portal.next_clicks(), count - 1, "{} page(s)", count);
    }
    Ok(())
}

#[tokio::test]
async fn test_link_count_strategy_visits_the_same_pages() -> anyhow::Result<()> {
    for count in 1..=5 {
        let portal = FakePortal::new().with_project("1000", pages(count));
        let mut config = fast_config();
        config.pagination.strategy = PageCountStrategy::LinkCount;

        let table = walk(&portal, &config, "1000").await?.unwrap();

        assert_eq!(table.len(), (1..=count).sum::<usize>(), "{} page(s)", count);
        assert_eq!(portal.next_clicks(), count - 1, "{} page(s)", count);
    }
    Ok(())
}

#[tokio::test]
async fn test_rows_keep_page_order_and_prime_contractor() -> anyhow::Result<()> {
    let portal = FakePortal::new().with_project(
        "2000",
        vec![
            page(&[("First Co", "$1.00")]),
            page(&[("Second Co", "$2.00"), ("Third Co", "$3.00")]),
        ],
    );
    let config = fast_config();

    let table = walk(&portal, &config, "2000").await?.unwrap();

    let idx = table.column_index(columns::PRIME_CONTRACTOR).unwrap();
    let names: Vec<String> = table.rows().iter().map(|r| r[0].to_string()).collect();
    assert_eq!(names, vec!["First Co", "Second Co", "Third Co"]);
    assert!(table
        .rows()
        .iter()
        .all(|r| r[idx] == Cell::text("ACME Road Builders")));
    Ok(())
}

#[tokio::test]
async fn test_missing_table_means_no_results() -> anyhow::Result<()> {
    let portal = FakePortal::new();
    let config = fast_config();

    assert!(walk(&portal, &config, "3000").await?.is_none());
    assert_eq!(portal.next_clicks(), 0);
    Ok(())
}

#[tokio::test]
async fn test_enabled_next_on_last_page_is_not_clicked() -> anyhow::Result<()> {
    for count in 1..=5 {
        let mut portal = FakePortal::new().with_project("4000", pages(count));
        portal.next_always_enabled = true;
        let mut config = fast_config();
        config.timing.table_timeout_ms = 2_000;

        let started = Instant::now();
        let table = walk(&portal, &config, "4000").await?.unwrap();

        assert_eq!(table.len(), (1..=count).sum::<usize>(), "{} page(s)", count);
        assert_eq!(portal.next_clicks(), count - 1, "{} page(s)", count);
        assert!(started.elapsed() < Duration::from_millis(1_000));
    }
    Ok(())
}

#[tokio::test]
async fn test_unchanged_page_stops_the_walk_without_page_numbers() -> anyhow::Result<()> {
    let mut portal = FakePortal::new().with_project("4100", pages(2));
    portal.next_always_enabled = true;
    portal.hide_page_numbers = true;
    let config = fast_config();

    // Nothing tells the walker page 2 is the last, so it clicks next once more
    // and gives up when the rows stay the same
    let table = walk(&portal, &config, "4100").await?.unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(portal.next_clicks(), 2);
    Ok(())
}

#[tokio::test]
async fn test_stale_table_after_click_is_waited_out() -> anyhow::Result<()> {
    let mut portal = FakePortal::new().with_project("4200", pages(3));
    portal.stale_after_click = true;
    let config = fast_config();

    let table = walk(&portal, &config, "4200").await?.unwrap();

    assert_eq!(table.len(), 6);
    assert_eq!(portal.next_clicks(), 2);
    Ok(())
}

#[tokio::test]
async fn test_max_pages_caps_the_walk() -> anyhow::Result<()> {
    let portal = FakePortal::new().with_project("5000", pages(5));
    let mut config = fast_config();
    config.pagination.max_pages = 2;

    let table = walk(&portal, &config, "5000").await?.unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(portal.next_clicks(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_report_type_is_an_error() {
    let portal = FakePortal::new();
    let config = fast_config();
    let form = FormDriver::new(&portal, &config);

    form.open_home().await.unwrap();
    let err = form.select_report("Bid Letting Results").await.unwrap_err();

    assert!(matches!(err, ScrapeError::ElementNotFound { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_portal_not_ready_is_transient_after_retries() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let mut portal = FakePortal::new().with_project("6000", pages(1));
    portal.ready = false;

    let mut config = fast_config();
    config.timing.retry_attempts = 3;
    let exporter = CsvExporter::new(temp_dir.path(), config.output.mode);
    let pipeline = ScrapePipeline::new(config, exporter);

    let outcome = pipeline
        .extract(&portal, &ProjectId::parse("6000").unwrap())
        .await?;

    match outcome {
        ProjectOutcome::Transient { reason } => assert!(reason.contains("Timed out")),
        other => panic!("expected a transient outcome, got {:?}", other),
    }
    Ok(())
}
