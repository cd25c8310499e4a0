//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use page_spider::config::PageEncoding;
use page_spider::output::RecordingListener;
use page_spider::{CrawlConfig, Spider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a page at `route` with the given body
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts a page that answers only after `delay`
async fn mount_slow_page(server: &MockServer, route: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html>{}</html>", route))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Paths the server has been asked for, in arrival order
async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

fn create_spider(config: CrawlConfig) -> (Spider, Arc<RecordingListener>) {
    let listener = Arc::new(RecordingListener::new());
    (Spider::new(config, listener.clone()), listener)
}

#[tokio::test]
async fn test_domain_and_suffix_filtering() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{base}/a">A</a>
            <a href="http://other.com/b">B</a>
            <link rel="stylesheet" href="{base}/style.css">
            </body></html>"#,
            base = base_url
        ),
    )
    .await;
    mount_page(&server, "/a", "<html>page a</html>".to_string()).await;
    mount_page(&server, "/style.css", "body {}".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path())
        .with_max_depth(2)
        .with_max_connection(1);
    let (mut spider, listener) = create_spider(config);

    let summary = spider.crawl().await.unwrap();

    assert_eq!(summary.total_saved(), 2);
    assert_eq!(
        listener.saved_urls(),
        vec![base_url.clone(), format!("{}/a", base_url)]
    );
    assert_eq!(listener.finished(), vec![2]);

    assert!(dir.path().join("0.txt").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("1.txt")).unwrap(),
        "<html>page a</html>"
    );
    assert!(!dir.path().join("2.txt").exists());

    assert_eq!(requested_paths(&server).await, vec!["/", "/a"]);
    assert_eq!(summary.stats.links_enqueued, 1);
    assert_eq!(summary.stats.links_rejected, 2);
}

#[tokio::test]
async fn test_depth_one_fetches_only_root() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{0}/a">A</a><a href="{0}/b">B</a>"#, base_url),
    )
    .await;
    mount_page(&server, "/a", "a".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path()).with_max_depth(1);
    let (mut spider, listener) = create_spider(config);

    let summary = spider.crawl().await.unwrap();

    assert_eq!(summary.total_saved(), 1);
    assert_eq!(summary.stats.pages_visited, 1);
    assert_eq!(summary.stats.links_enqueued, 0);
    assert_eq!(listener.saved_urls(), vec![base_url]);
    assert_eq!(requested_paths(&server).await, vec!["/"]);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    // a <-> b cycle, both linking back to the root
    mount_page(
        &server,
        "/",
        format!(r#"<a href="{0}/a">A</a><a href="{0}/b">B</a>"#, base_url),
    )
    .await;
    mount_page(
        &server,
        "/a",
        format!(r#"<a href="{0}">home</a><a href="{0}/b/">B</a>"#, base_url),
    )
    .await;
    mount_page(
        &server,
        "/b",
        format!(r#"<a href="{0}/a">A</a><a href="{0}/a">A again</a>"#, base_url),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path())
        .with_max_depth(5)
        .with_max_connection(4);
    let (mut spider, listener) = create_spider(config);

    let summary = spider.crawl().await.unwrap();

    let mut paths = requested_paths(&server).await;
    paths.sort();
    assert_eq!(paths, vec!["/", "/a", "/b"]);
    assert_eq!(summary.stats.pages_visited, 3);
    assert_eq!(summary.total_saved(), 3);
    assert_eq!(listener.finished(), vec![3]);
}

#[tokio::test]
async fn test_concurrency_bound() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let links: String = (1..=6)
        .map(|i| format!(r#"<a href="{}/p{}">p</a>"#, base_url, i))
        .collect();
    mount_page(&server, "/", links).await;
    for i in 1..=6 {
        mount_slow_page(&server, &format!("/p{}", i), Duration::from_millis(1000)).await;
    }

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path())
        .with_max_depth(2)
        .with_max_connection(2);
    let (mut spider, listener) = create_spider(config);

    let started = Instant::now();
    assert!(spider.start().await.unwrap());

    // Root answers at once; the slow pages hold both slots
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(requested_paths(&server).await.len(), 3);

    let summary = spider.wait().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert_eq!(summary.total_saved(), 7);
    assert_eq!(listener.finished(), vec![7]);
}

#[tokio::test]
async fn test_timeout_frees_slot_for_next_entry() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{0}/slow">S</a><a href="{0}/fast">F</a>"#, base_url),
    )
    .await;
    mount_slow_page(&server, "/slow", Duration::from_secs(10)).await;
    mount_page(&server, "/fast", "fast".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path())
        .with_max_connection(1)
        .with_request_timeout(Duration::from_millis(200));
    let (mut spider, listener) = create_spider(config);

    let started = Instant::now();
    let summary = spider.crawl().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.stats.timeouts, 1);
    assert!(!summary.aborted);
    assert_eq!(
        listener.saved_urls(),
        vec![base_url.clone(), format!("{}/fast", base_url)]
    );
    assert_eq!(listener.finished(), vec![2]);
}

#[tokio::test]
async fn test_abort_stops_saving_and_requesting() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="{}/p{}">p</a>"#, base_url, i))
        .collect();
    mount_page(&server, "/", links).await;
    for i in 1..=5 {
        mount_slow_page(&server, &format!("/p{}", i), Duration::from_secs(2)).await;
    }

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path()).with_max_connection(2);
    let (mut spider, listener) = create_spider(config);

    assert!(spider.start().await.unwrap());
    tokio::time::sleep(Duration::from_millis(300)).await;

    spider.abort();
    let summary = spider.wait().await.unwrap();

    assert!(summary.aborted);
    assert!(!spider.is_running());
    assert_eq!(summary.stats.aborted, 2);
    assert_eq!(listener.saved_urls(), vec![base_url.clone()]);
    assert_eq!(listener.finished(), vec![1]);

    // Nothing new goes out, nothing more is reported
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(requested_paths(&server).await.len(), 3);
    assert_eq!(listener.saved().len(), 1);
    assert_eq!(listener.finished(), vec![1]);
    assert!(!dir.path().join("1.txt").exists());

    // A second abort is harmless
    spider.abort();
    assert_eq!(listener.finished(), vec![1]);
}

#[tokio::test]
async fn test_non_ok_status_is_not_saved() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        format!(r#"<a href="{0}/missing">M</a><a href="{0}/ok">OK</a>"#, base_url),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "ok".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = CrawlConfig::new(&base_url, dir.path()).with_max_connection(1);
    let (mut spider, listener) = create_spider(config);

    let summary = spider.crawl().await.unwrap();

    assert_eq!(summary.stats.http_errors, 1);
    assert_eq!(summary.stats.pages_visited, 3);
    assert_eq!(summary.total_saved(), 2);
    assert_eq!(
        listener.saved_urls(),
        vec![base_url.clone(), format!("{}/ok", base_url)]
    );
    assert!(!dir.path().join("2.txt").exists());
}

#[tokio::test]
async fn test_root_failure_still_finishes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut spider, listener) = create_spider(CrawlConfig::new(&server.uri(), dir.path()));

    let summary = spider.crawl().await.unwrap();

    assert_eq!(summary.total_saved(), 0);
    assert_eq!(summary.stats.http_errors, 1);
    assert!(listener.saved().is_empty());
    assert_eq!(listener.finished(), vec![0]);
}

#[tokio::test]
async fn test_link_with_trailing_junk_is_truncated() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        format!("see {}/page extra-junk\n", base_url),
    )
    .await;
    mount_page(&server, "/page", "page".to_string()).await;

    let dir = TempDir::new().unwrap();
    let (mut spider, listener) = create_spider(CrawlConfig::new(&base_url, dir.path()));

    spider.crawl().await.unwrap();

    assert_eq!(
        listener.saved_urls(),
        vec![base_url.clone(), format!("{}/page", base_url)]
    );
}

#[tokio::test]
async fn test_gb18030_pages_are_decoded() {
    let server = MockServer::start().await;
    let (encoded, _, _) = encoding_rs::GB18030.encode("<html>新闻</html>");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(encoded.into_owned()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config =
        CrawlConfig::new(&server.uri(), dir.path()).with_page_encoding(PageEncoding::Gb18030);
    let (mut spider, _listener) = create_spider(config);

    spider.crawl().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("0.txt")).unwrap(),
        "<html>新闻</html>"
    );
}

#[tokio::test]
async fn test_empty_root_does_nothing() {
    let dir = TempDir::new().unwrap();
    let (mut spider, listener) = create_spider(CrawlConfig::new("   ", dir.path()));

    assert!(!spider.start().await.unwrap());
    assert!(spider.crawl().await.is_err());
    assert!(listener.saved().is_empty());
    assert!(listener.finished().is_empty());
}

#[tokio::test]
async fn test_save_directory_is_created() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "root".to_string()).await;

    let dir = TempDir::new().unwrap();
    let save_dir = dir.path().join("nested").join("pages");
    let (mut spider, _listener) = create_spider(CrawlConfig::new(&server.uri(), &save_dir));

    spider.crawl().await.unwrap();

    assert!(save_dir.join("0.txt").exists());
}
