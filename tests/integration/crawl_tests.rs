//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog (homepage, listing pages,
//! book pages and PDFs) and run the full crawl cycle end-to-end.

use shelf_sweep::config::Config;
use shelf_sweep::crawler::{Coordinator, CrawlOutcome, SiteMarkers};
use shelf_sweep::{Interrupt, Signal, SweepError};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server and the temp directory
fn create_test_config(dir: &TempDir, server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.homepage = format!("{}/", server.uri());
    config.site.page_url_template = format!("{}/page/{{page}}/", server.uri());
    config.paths.progress_file = file_in(dir, "Allitebook.ini");
    config.paths.blacklist_file = file_in(dir, "blacklist.txt");
    config.paths.download_root = file_in(dir, "allitebook");
    config.logging.log_file = file_in(dir, "web.log");
    config.logging.include_time = false;
    config
}

fn file_in(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).display().to_string()
}

fn markers_for(server: &MockServer) -> SiteMarkers {
    SiteMarkers {
        file_host: format!("{}/files", server.uri()),
        ..SiteMarkers::default()
    }
}

fn book_url(server: &MockServer, slug: &str) -> String {
    format!("{}/{}/", server.uri(), slug)
}

async fn mount_homepage(server: &MockServer, total_pages: u64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body><div class="pagination">
            <a href="{uri}/page/2/">2</a>
            <a href="{uri}/page/{total}/" title="Last Page &rarr;">{total}</a>
            </div></body></html>"#,
            uri = server.uri(),
            total = total_pages
        )))
        .mount(server)
        .await;
}

/// Mounts a listing page; `slugs` are in page order (newest first)
async fn mount_listing(server: &MockServer, page: u64, slugs: &[&str]) {
    let entries: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<article><header><h2 class="entry-title"><a href="{}" rel="bookmark">{}</a></h2></header></article>
                "#,
                book_url(server, slug),
                slug
            )
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/page/{}/", page)))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("<html><body>{}</body></html>", entries)),
        )
        .mount(server)
        .await;
}

/// Mounts a book page and its PDF
async fn mount_book(server: &MockServer, slug: &str, category: &str, pdf_name: &str) {
    mount_book_page(server, slug, category, pdf_name).await;

    Mock::given(method("GET"))
        .and(path(format!("/files/{}", pdf_name.replace(' ', "%20"))))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(format!("%PDF {}", slug).into_bytes()))
        .mount(server)
        .await;
}

/// Mounts only the book page; the PDF at `/files/{pdf_name}` is left to the caller
async fn mount_book_page(server: &MockServer, slug: &str, category: &str, pdf_name: &str) {
    let html = format!(
        r#"<html><body>
        <span>Category: <a href="http://www.allitebooks.com/{category}" rel="category">{category}</a></span>
        <span class="download-links"><a href="{uri}/files/{pdf_name}" target="_blank">Download PDF</a></span>
        <h3>Book Description:</h3>
        <p>About {slug}.</p>
        <div class="entry-footer"></div>
        </body></html>"#,
        category = category,
        uri = server.uri(),
        pdf_name = pdf_name,
        slug = slug
    );

    Mock::given(method("GET"))
        .and(path(format!("/{}/", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Two listing pages: page 2 holds the oldest books, page 1 the newest
async fn mount_catalog(server: &MockServer) {
    mount_homepage(server, 2).await;
    mount_listing(server, 2, &["book-2", "book-1"]).await;
    mount_listing(server, 1, &["book-4", "book-3"]).await;
    mount_book(server, "book-1", "programming/java/", "Java Basics.pdf").await;
    mount_book(server, "book-2", "networking/", "Networks.pdf").await;
    mount_book(server, "book-3", "programming/java/", "Java Advanced.pdf").await;
    mount_book(server, "book-4", "os/linux/", "Linux.pdf").await;
}

async fn run(config: Config, server: &MockServer) -> Result<CrawlOutcome, SweepError> {
    let mut coordinator =
        Coordinator::new(config, false, Interrupt::new())?.with_markers(markers_for(server));
    let pages = coordinator.prepare().await?;
    coordinator.crawl(pages).await
}

fn read_progress(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("Allitebook.ini")).unwrap()
}

fn artifact(dir: &TempDir, relative: &str) -> std::path::PathBuf {
    dir.path().join("allitebook").join(relative)
}

#[tokio::test]
async fn test_full_crawl_two_pages() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let outcome = run(create_test_config(&dir, &server), &server).await.unwrap();

    let stats = match outcome {
        CrawlOutcome::Completed(stats) => stats,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(stats.pages_crawled, 2);
    assert_eq!(stats.books_downloaded, 4);
    assert_eq!(stats.downloads_failed, 0);

    assert_eq!(
        fs::read(artifact(&dir, "programming/java/Java_Basics.pdf")).unwrap(),
        b"%PDF book-1"
    );
    assert_eq!(
        fs::read_to_string(artifact(&dir, "programming/java/Java_Basics.txt")).unwrap(),
        "About book-1."
    );
    assert!(artifact(&dir, "networking/general/Networks.pdf").exists());
    assert!(artifact(&dir, "networking/general/Networks.txt").exists());
    assert!(artifact(&dir, "programming/java/Java_Advanced.pdf").exists());
    assert!(artifact(&dir, "os/linux/Linux.pdf").exists());

    assert_eq!(
        read_progress(&dir),
        format!(
            "current_pages=1\nquery=\ntotal_pages=2\nurl={}\n",
            book_url(&server, "book-4")
        )
    );
}

#[tokio::test]
async fn test_books_processed_oldest_first() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    run(create_test_config(&dir, &server), &server).await.unwrap();

    let book_pages: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|path| path.starts_with("/book-"))
        .collect();
    assert_eq!(book_pages, vec!["/book-1/", "/book-2/", "/book-3/", "/book-4/"]);
}

#[tokio::test]
async fn test_resume_skips_processed_books() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 2).await;
    mount_listing(&server, 1, &["book-4", "book-3"]).await;
    mount_book(&server, "book-4", "os/linux/", "Linux.pdf").await;

    // Page 2 and book-3 were handled by the previous run
    Mock::given(method("GET"))
        .and(path("/page/2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/book-3/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    fs::write(
        dir.path().join("Allitebook.ini"),
        format!(
            "current_pages=1\nquery=\ntotal_pages=2\nurl={}\n",
            book_url(&server, "book-3")
        ),
    )
    .unwrap();

    let outcome = run(create_test_config(&dir, &server), &server).await.unwrap();

    match outcome {
        CrawlOutcome::Completed(stats) => {
            assert_eq!(stats.books_downloaded, 1);
            assert_eq!(stats.books_skipped_processed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(artifact(&dir, "os/linux/Linux.pdf").exists());
    assert!(!artifact(&dir, "programming/java/Java_Advanced.pdf").exists());
    assert!(read_progress(&dir).contains(&format!("url={}\n", book_url(&server, "book-4"))));
}

#[tokio::test]
async fn test_failed_download_is_logged_and_skipped() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 1).await;
    mount_listing(&server, 1, &["book-2", "book-1"]).await;
    mount_book(&server, "book-2", "networking/", "Networks.pdf").await;

    // book-1's page is fine but its PDF is gone
    Mock::given(method("GET"))
        .and(path("/files/Gone.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/book-1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<a href="http://www.allitebooks.com/os/" rel="category">OS</a>
            <a href="{}/files/Gone.pdf">PDF</a>
            <h3>Book Description:</h3><p>Missing.</p><div class="x">"#,
            server.uri()
        )))
        .mount(&server)
        .await;

    let outcome = run(create_test_config(&dir, &server), &server).await.unwrap();

    match outcome {
        CrawlOutcome::Completed(stats) => {
            assert_eq!(stats.books_downloaded, 1);
            assert_eq!(stats.downloads_failed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(!artifact(&dir, "os/general/Gone.pdf").exists());
    assert!(!artifact(&dir, "os/general/Gone.txt").exists());
    assert!(artifact(&dir, "networking/general/Networks.pdf").exists());

    let log = fs::read_to_string(dir.path().join("web.log")).unwrap();
    assert_eq!(
        log,
        format!("ERROR: 404, Not Found: {}/files/Gone.pdf\n", server.uri())
    );
    assert!(read_progress(&dir).contains(&format!("url={}\n", book_url(&server, "book-2"))));
}

#[tokio::test]
async fn test_download_timeout_is_logged_and_skipped() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 1).await;
    mount_listing(&server, 1, &["book-2", "book-1"]).await;
    mount_book(&server, "book-2", "networking/", "Networks.pdf").await;
    mount_book_page(&server, "book-1", "os/", "Slow.pdf").await;
    Mock::given(method("GET"))
        .and(path("/files/Slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF slow".to_vec())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&dir, &server);
    config.site.request_timeout_secs = Some(1);
    let outcome = run(config, &server).await.unwrap();

    match outcome {
        CrawlOutcome::Completed(stats) => {
            assert_eq!(stats.books_downloaded, 1);
            assert_eq!(stats.downloads_failed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert!(!artifact(&dir, "os/general/Slow.pdf").exists());
    assert!(!artifact(&dir, "os/general/Slow.txt").exists());
    assert!(artifact(&dir, "networking/general/Networks.pdf").exists());

    let log = fs::read_to_string(dir.path().join("web.log")).unwrap();
    assert_eq!(
        log,
        format!("ERROR: Request timeout: {}/files/Slow.pdf\n", server.uri())
    );
    assert!(read_progress(&dir).contains(&format!("url={}\n", book_url(&server, "book-2"))));
}

#[tokio::test]
async fn test_link_without_file_name_is_skipped() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 1).await;
    mount_listing(&server, 1, &["book-2", "book-1"]).await;
    mount_book(&server, "book-2", "networking/", "Networks.pdf").await;
    mount_book_page(&server, "book-1", "os/", "").await;

    let outcome = run(create_test_config(&dir, &server), &server).await.unwrap();

    match outcome {
        CrawlOutcome::Completed(stats) => {
            assert_eq!(stats.books_downloaded, 1);
            assert_eq!(stats.downloads_failed, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(artifact(&dir, "networking/general/Networks.pdf").exists());

    let log = fs::read_to_string(dir.path().join("web.log")).unwrap();
    assert!(log.starts_with("ERROR: invalid link: "));
    assert!(log.ends_with(&format!("{}/files/\n", server.uri())));
    assert_eq!(log.lines().count(), 1);
}

#[tokio::test]
async fn test_blacklisted_books_are_never_fetched() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 1).await;
    mount_listing(&server, 1, &["book-2", "book-1"]).await;
    mount_book(&server, "book-2", "networking/", "Networks.pdf").await;
    Mock::given(method("GET"))
        .and(path("/book-1/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    fs::write(
        dir.path().join("blacklist.txt"),
        format!("\n  {}  \n", book_url(&server, "book-1")),
    )
    .unwrap();

    let outcome = run(create_test_config(&dir, &server), &server).await.unwrap();

    match outcome {
        CrawlOutcome::Completed(stats) => {
            assert_eq!(stats.books_skipped_blacklisted, 1);
            assert_eq!(stats.books_downloaded, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_pending_signal_saves_progress_and_stops() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/page/2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let interrupt = Interrupt::new();
    let mut coordinator = Coordinator::new(create_test_config(&dir, &server), false, interrupt.clone())
        .unwrap()
        .with_markers(markers_for(&server));
    let pages = coordinator.prepare().await.unwrap();
    assert_eq!(pages, 2);

    interrupt.raise(Signal::Interrupt);
    let outcome = coordinator.crawl(pages).await.unwrap();

    assert!(matches!(outcome, CrawlOutcome::Interrupted(Signal::Interrupt)));
    assert_eq!(
        read_progress(&dir),
        "current_pages=0\nquery=\ntotal_pages=2\nurl=\n"
    );
}

#[tokio::test]
async fn test_signal_during_download_keeps_last_complete_book() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 1).await;
    mount_listing(&server, 1, &["book-2", "book-1"]).await;
    mount_book(&server, "book-1", "os/", "Fast.pdf").await;
    mount_book_page(&server, "book-2", "os/", "Slow.pdf").await;
    Mock::given(method("GET"))
        .and(path("/files/Slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF slow".to_vec())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let interrupt = Interrupt::new();
    let mut coordinator = Coordinator::new(create_test_config(&dir, &server), false, interrupt.clone())
        .unwrap()
        .with_markers(markers_for(&server));
    let pages = coordinator.prepare().await.unwrap();

    // Raise once the slow download is in flight
    let raise_during_download = async {
        loop {
            let requests = server.received_requests().await.unwrap();
            if requests.iter().any(|r| r.url.path() == "/files/Slow.pdf") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        interrupt.raise(Signal::Interrupt);
    };
    let (outcome, ()) = tokio::join!(coordinator.crawl(pages), raise_during_download);

    assert!(matches!(outcome.unwrap(), CrawlOutcome::Interrupted(Signal::Interrupt)));
    assert_eq!(
        read_progress(&dir),
        format!(
            "current_pages=0\nquery=\ntotal_pages=1\nurl={}\n",
            book_url(&server, "book-1")
        )
    );
    assert!(artifact(&dir, "os/general/Fast.pdf").exists());
    assert!(!artifact(&dir, "os/general/Slow.pdf").exists());
    assert!(!artifact(&dir, "os/general/Slow.txt").exists());
}

#[tokio::test]
async fn test_changed_layout_saves_progress_and_fails() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_homepage(&server, 2).await;
    mount_listing(&server, 2, &["book-2", "book-1"]).await;
    mount_book(&server, "book-1", "programming/java/", "Java Basics.pdf").await;
    mount_book(&server, "book-2", "networking/", "Networks.pdf").await;
    Mock::given(method("GET"))
        .and(path("/page/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>New look!</html>"))
        .mount(&server)
        .await;

    let result = run(create_test_config(&dir, &server), &server).await;

    match result {
        Err(SweepError::Extraction { url, .. }) => assert!(url.ends_with("/page/1/")),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    // Page 2 finished before the failure and is kept
    assert_eq!(
        read_progress(&dir),
        format!(
            "current_pages=2\nquery=\ntotal_pages=2\nurl={}\n",
            book_url(&server, "book-2")
        )
    );
    let log = fs::read_to_string(dir.path().join("web.log")).unwrap();
    assert!(log.starts_with("CRITICAL: Page structure changed at"));
}
