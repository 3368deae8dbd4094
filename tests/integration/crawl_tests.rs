//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use domain_trawler::config::{
    Config, FetchConfig, JobConfig, PageConfig, SearchConfig, StoreBackend, StoreConfig,
};
use domain_trawler::crawler::Crawler;
use domain_trawler::output::ErrorLog;
use domain_trawler::state::{FrontierSet, StopReason};
use domain_trawler::storage::{open_store, FrontierStore, MemoryStore};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `start_url` into `download_dir`
fn create_test_config(start_url: String, download_dir: &TempDir) -> Config {
    Config {
        job: JobConfig {
            start_url,
            download_path: download_dir.path().to_str().unwrap().to_string(),
            allow: vec![],
            avoid: vec![],
            find_more_links: true,
            limit: 100,
        },
        fetch: FetchConfig {
            delay_ms: 0, // No politeness delay against the mock server
            connect_timeout_secs: 2,
            read_timeout_secs: 2,
            ..FetchConfig::default()
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        },
        search: None,
        page: None,
    }
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// home -> path1, path2; path2 -> path3 (given as an absolute URL)
async fn mount_small_site(server: &MockServer) {
    let base_url = server.uri();
    mount_page(
        server,
        "/home",
        r#"<html><body><a href="/path1">One</a><a href="/path2">Two</a></body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/path1",
        r#"<html><body><a href="/home">Home</a></body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/path2",
        &format!(
            r#"<html><body><a href="{}/path3">Three</a></body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(server, "/path3", "<html><body>The end</body></html>").await;
}

async fn sorted_members(store: &dyn FrontierStore, domain: &str, set: FrontierSet) -> Vec<String> {
    let mut members = store.members(domain, set).await.expect("Failed to read set");
    members.sort();
    members
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    mount_small_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/home", mock_server.uri()), &dir);
    let store = Arc::new(MemoryStore::new());

    let mut crawler = Crawler::from_config(&config, store.clone()).expect("Failed to build crawler");
    let domain = crawler.job().domain.clone();
    let report = crawler.crawl_domain().await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(report.downloaded, 4);
    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Finished).await,
        vec!["/home", "/path1", "/path2", "/path3"]
    );
    assert_eq!(
        store.count(&domain, FrontierSet::InProgress).await.unwrap(),
        0
    );

    for file in ["home.html", "path1.html", "path2.html", "path3.html"] {
        assert!(dir.path().join(file).exists(), "missing {}", file);
    }
    let home = std::fs::read_to_string(dir.path().join("home.html")).unwrap();
    assert!(home.contains(r#"<a href="/path1">One</a>"#));
}

#[tokio::test]
async fn test_avoid_takes_precedence() {
    let mock_server = MockServer::start().await;
    mount_small_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/home", mock_server.uri()), &dir);
    config.job.avoid = vec!["path2".to_string()];
    let store = Arc::new(MemoryStore::new());

    let mut crawler = Crawler::from_config(&config, store.clone()).unwrap();
    let domain = crawler.job().domain.clone();
    crawler.crawl_domain().await.unwrap();

    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Finished).await,
        vec!["/home", "/path1"]
    );
    assert!(!dir.path().join("path3.html").exists());
}

#[tokio::test]
async fn test_redirect_consolidation() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/home",
        r#"<html><body><a href="/old-recipe">Old</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old-recipe"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new-recipe"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new-recipe", "<html><body>Cake</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/home", mock_server.uri()), &dir);
    let store = Arc::new(MemoryStore::new());

    let mut crawler = Crawler::from_config(&config, store.clone()).unwrap();
    let domain = crawler.job().domain.clone();
    let report = crawler.crawl_domain().await.unwrap();

    assert_eq!(report.redirected, 1);
    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Finished).await,
        vec!["/home", "/new-recipe", "/old-recipe"]
    );
    assert!(sorted_members(store.as_ref(), &domain, FrontierSet::InProgress)
        .await
        .is_empty());
    assert!(dir.path().join("new-recipe.html").exists());
}

#[tokio::test]
async fn test_errors_are_isolated_and_logged() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/home",
        r#"<html><body>
        <a href="/broken">Broken</a>
        <a href="/missing">Missing</a>
        <a href="/fine">Fine</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", "<html><body>ok</body></html>").await;
    // "/missing" is not mounted: wiremock answers 404

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/home", mock_server.uri()), &dir);
    let store = Arc::new(MemoryStore::new());

    let mut crawler = Crawler::from_config(&config, store.clone()).unwrap();
    let domain = crawler.job().domain.clone();
    let report = crawler.crawl_domain().await.unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(report.downloaded, 2);
    assert_eq!(crawler.job().page_count(), 4);
    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Errored).await,
        vec!["/broken", "/missing"]
    );
    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Finished).await,
        vec!["/fine", "/home"]
    );

    let records = ErrorLog::new(dir.path()).read_all().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.error_kind == "HttpStatus"));
    assert!(records.iter().all(|r| r.note.is_none()));
}

#[tokio::test]
async fn test_crawl_resumes_from_sqlite_frontier() {
    let mock_server = MockServer::start().await;
    mount_small_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let db_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/home", mock_server.uri()), &dir);
    config.store = StoreConfig {
        backend: StoreBackend::Sqlite,
        sqlite_path: db_dir
            .path()
            .join("frontier.db")
            .to_str()
            .unwrap()
            .to_string(),
        ..StoreConfig::default()
    };
    config.job.limit = 2;

    // First run stops at the page limit with work left over
    let domain = {
        let store = open_store(&config.store).await.expect("Failed to open store");
        let mut crawler = Crawler::from_config(&config, store.clone()).unwrap();
        let report = crawler.crawl_domain().await.unwrap();
        assert_eq!(report.stop_reason, StopReason::PageLimit);
        assert_eq!(
            store
                .count(&crawler.job().domain, FrontierSet::Finished)
                .await
                .unwrap(),
            2
        );
        crawler.job().domain.clone()
    };

    // A fresh process picks up the remaining frontier
    config.job.limit = 100;
    let store = open_store(&config.store).await.unwrap();
    assert!(store.count(&domain, FrontierSet::InProgress).await.unwrap() > 0);

    let mut crawler = Crawler::from_config(&config, store.clone()).unwrap();
    crawler.crawl_domain().await.unwrap();

    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Finished).await,
        vec!["/home", "/path1", "/path2", "/path3"]
    );
    assert_eq!(store.count(&domain, FrontierSet::InProgress).await.unwrap(), 0);
}

#[tokio::test]
async fn test_search_then_drain_with_trimmed_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <a href="/recipes/cake"><img src="/thumb.png"></a>
            <a href="/recipes/pie">Pie</a>
            <a href="/about">About</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><h1>Don't  Cry</h1></body></html>"),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/recipes/cake",
        r#"<html><body><nav>Site menu</nav>
        <div class="main-content"><h1>Cake</h1>
        <div class="recipe-image"><img srcset="/photos/cake.jpg"></div>
        </div></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/recipes/pie"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photos/cake.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/search?page=1", mock_server.uri()), &dir);
    config.job.allow = vec!["/recipes/".to_string()];
    let search = SearchConfig {
        path_template: "/search?page={page}".to_string(),
        start_page: 1,
        max_page: 50,
        sentinel_selector: "h1".to_string(),
        sentinel_pattern: r"(?i)don't\s+cry".to_string(),
    };
    config.page = Some(PageConfig {
        content_selector: "div.main-content".to_string(),
        image_selector: Some("div.recipe-image img".to_string()),
        image_attr: "srcset".to_string(),
    });
    let store = Arc::new(MemoryStore::new());

    let mut crawler = Crawler::from_config(&config, store.clone()).unwrap();
    let domain = crawler.job().domain.clone();

    let report = crawler.crawl_search(&search).await.unwrap();
    assert_eq!(report.stop_reason, StopReason::SentinelReached);
    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::InProgress).await,
        vec!["/recipes/cake", "/recipes/pie"]
    );

    let report = crawler.drain().await.unwrap();
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failed, 1);

    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Finished).await,
        vec!["/recipes/cake", "/search?page=1"]
    );
    assert_eq!(
        sorted_members(store.as_ref(), &domain, FrontierSet::Errored).await,
        vec!["/recipes/pie"]
    );

    let cake = std::fs::read_to_string(dir.path().join("recipes_-_cake.html")).unwrap();
    assert!(cake.contains("<h1>Cake</h1>"));
    assert!(!cake.contains("Site menu"));
    assert_eq!(
        std::fs::read(dir.path().join("recipes_-_cake.jpg")).unwrap(),
        b"jpeg"
    );

    let records = ErrorLog::new(dir.path()).read_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path, "/recipes/pie");
    assert_eq!(records[0].error_kind, "HttpStatus");

    // A second search pass skips the finished first page
    let report = crawler.crawl_search(&search).await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.stop_reason, StopReason::SentinelReached);
}
