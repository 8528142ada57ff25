//! Integration tests for the crawler
//!
//! These tests use wiremock to serve directory listings and test the full
//! index cycle end-to-end against a real SQLite database file.

use cineindex::config::{load_config, Config};
use cineindex::crawler::{run_index, CrawlMode, FetchError, HttpFetcher, PageFetcher};
use cineindex::storage::{RunStatus, SqliteStore, StorageError};
use cineindex::IndexError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT_PAGE: &str = r#"<html><head><title>Index of /Movies</title></head><body>
<table>
<tr><th><img src="/icons/blank.gif" alt="[ICO]"></th><th>Name</th><th>Last modified</th><th>Size</th></tr>
<tr><td><img src="/icons/back.gif" alt="[PARENTDIR]"></td><td><a href="/">Parent Directory</a></td><td>&nbsp;</td><td>-</td></tr>
<tr><td><img src="/icons/folder.gif" alt="[DIR]"></td><td><a href="Drama/">Drama/</a></td><td>2024-01-03 10:00</td><td>-</td></tr>
<tr><td><img src="/icons/folder.gif" alt="[DIR]"></td><td><a href="TV/">TV/</a></td><td>2024-01-02 10:00</td><td>-</td></tr>
<tr><td><img src="/icons/folder.gif" alt="[DIR]"></td><td><a href="Extras/">Extras/</a></td><td>2024-01-01 10:00</td><td>-</td></tr>
<tr><td><img src="/icons/folder.gif" alt="[DIR]"></td><td><a href="Broken/">Broken/</a></td><td>2024-01-01 10:00</td><td>-</td></tr>
<tr><td><img src="/icons/movie.gif" alt="[VID]"></td><td><a href="b.mkv">b.mkv</a></td><td>2024-01-01 09:00</td><td>700M</td></tr>
<tr><td><img src="/icons/text.gif" alt="[TXT]"></td><td><a href="notes.txt">notes.txt</a></td><td>2024-01-01 09:00</td><td>1K</td></tr>
</table>
</body></html>"#;

const DRAMA_PAGE: &str = r#"<html><body>
<div id="fallback">
<table>
<tr><td class="fb-i"><img src="/_h5ai/public/images/fallback/folder-parent.png" alt="folder-parent"/></td><td class="fb-n"><a href="..">Parent Directory</a></td><td class="fb-d"></td><td class="fb-s"></td></tr>
<tr><td class="fb-i"><img src="/_h5ai/public/images/fallback/file.png" alt="file"/></td><td class="fb-n"><a href="/Movies/Drama/Heat%20(1995).mkv">Heat%20(1995).mkv</a></td><td class="fb-d">2024-01-15 08:00</td><td class="fb-s">1.4 GB</td></tr>
</table>
</div>
</body></html>"#;

const TV_PAGE: &str = r#"<html><body>
<table id="example" class="display">
<thead><tr><th></th><th>Name</th><th></th><th>Size</th><th>Date</th></tr></thead>
<tbody>
<tr><td><img src="back.png"></td><td><a href="../">Parent Directory</a></td><td></td><td></td><td></td></tr>
<tr><td><img src="folder.png"></td><td><a href="Season%201/">Season 1</a></td><td></td><td></td><td>2023-11-05 20:10</td></tr>
<tr><td><img src="video.png"></td><td><a href="pilot.mp4">pilot.mp4</a></td><td></td><td>350 MB</td><td>2023-11-04 19:00</td></tr>
</tbody>
</table>
</body></html>"#;

const EMPTY_PAGE: &str = "<html><body><table></table></body></html>";

/// Mounts a GET listing at `route`
async fn mount_page(server: &MockServer, route: &str, body: &str, expected_hits: Option<u64>) {
    let mock = Mock::given(method("GET")).and(path(route)).respond_with(
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html"),
    );

    match expected_hits {
        Some(hits) => mock.expect(hits).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Mounts the whole `/Movies/` tree
async fn mount_movies(server: &MockServer, drama_hits: Option<u64>) {
    mount_page(server, "/Movies/", ROOT_PAGE, None).await;
    mount_page(server, "/Movies/Drama/", DRAMA_PAGE, drama_hits).await;
    mount_page(server, "/Movies/TV/", TV_PAGE, None).await;
    mount_page(server, "/Movies/TV/Season%201/", EMPTY_PAGE, None).await;

    // Blocked: must never be requested
    Mock::given(method("GET"))
        .and(path("/Movies/Extras/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
        .expect(0)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Movies/Broken/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Writes a config file into `dir` and loads it
fn write_config(dir: &TempDir, roots: &str) -> Config {
    let db_path = dir.path().join("index.db");
    let content = format!(
        r#"
[crawler]
video-extensions = ["mkv", "mp4"]
blocked-dirs = ["extras"]
request-timeout-secs = 5
commit-interval = 2

[output]
database-path = "{}"

{}
"#,
        db_path.display(),
        roots
    );

    let config_path = dir.path().join("cineindex.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}

fn movies_root(server: &MockServer) -> String {
    format!("[[root]]\nurl = \"{}/Movies\"\ntag = \"MOVIES\"\n", server.uri())
}

fn open_db(config: &Config) -> SqliteStore {
    SqliteStore::new(Path::new(&config.output.database_path)).expect("Failed to open DB")
}

#[tokio::test]
async fn test_full_crawl_across_listing_formats() {
    let server = MockServer::start().await;
    mount_movies(&server, None).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &movies_root(&server));
    let root = format!("{}/Movies/", server.uri());

    let reports = run_index(&config, "hash-1", CrawlMode::Full)
        .await
        .expect("Crawl failed");

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.root, root);
    // Movies, Drama, TV, Season 1
    assert_eq!(report.processed_dirs, 4);
    assert_eq!(report.blocked_dirs, 1);
    assert_eq!(report.failed_dirs, 1);
    // b.mkv, Heat (1995).mkv, pilot.mp4; notes.txt is filtered
    assert_eq!(report.indexed_files, 3);

    let store = open_db(&config);
    assert_eq!(store.count_directories().unwrap(), 4);
    assert_eq!(store.count_media_files().unwrap(), 3);

    let top = store.media_in_path(&root, "/").unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].filename, "b.mkv");
    assert_eq!(top[0].size.as_deref(), Some("700M"));

    let drama = store.media_in_path(&root, "/Drama").unwrap();
    assert_eq!(drama.len(), 1);
    assert_eq!(drama[0].filename, "Heat (1995).mkv");
    assert_eq!(drama[0].size.as_deref(), Some("1.4 GB"));

    let tv = store.media_in_path(&root, "/TV").unwrap();
    assert_eq!(tv.len(), 1);
    assert_eq!(tv[0].filename, "pilot.mp4");
    assert_eq!(tv[0].modified.as_deref(), Some("2023-11-04 19:00"));

    let season = store
        .get_directory(&format!("{}TV/Season%201/", root))
        .unwrap()
        .expect("Season directory should be indexed");
    assert_eq!(season.parent, Some(format!("{}TV/", root)));

    let root_dir = store.get_directory(&root).unwrap().unwrap();
    assert_eq!(root_dir.modified.as_deref(), Some("2024-01-03 10:00"));
    assert!(store
        .get_directory(&format!("{}Extras/", root))
        .unwrap()
        .is_none());

    let runs = store.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].mode, "full");
    assert_eq!(runs[0].config_hash, "hash-1");
    assert_eq!(runs[0].dirs_processed, 4);
    assert_eq!(runs[0].dirs_skipped, 2);
    assert_eq!(runs[0].files_indexed, 3);
}

#[tokio::test]
async fn test_incremental_recrawl_skips_unchanged_tree() {
    let server = MockServer::start().await;
    // The unchanged root enqueues nothing, so Drama is fetched by the first run only
    mount_movies(&server, Some(1)).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &movies_root(&server));

    run_index(&config, "hash-1", CrawlMode::Full)
        .await
        .expect("Full crawl failed");

    let reports = run_index(&config, "hash-1", CrawlMode::Incremental)
        .await
        .expect("Incremental crawl failed");

    let report = &reports[0];
    assert_eq!(report.processed_dirs, 0);
    assert_eq!(report.unchanged_dirs, 1);
    assert_eq!(report.indexed_files, 0);

    let store = open_db(&config);
    assert_eq!(store.count_directories().unwrap(), 4);
    assert_eq!(store.count_media_files().unwrap(), 3);

    let runs = store.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].mode, "incremental");
    assert_eq!(runs[0].status, RunStatus::Completed);
}

#[tokio::test]
async fn test_full_recrawl_drops_removed_entries() {
    let server = MockServer::start().await;
    mount_movies(&server, None).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &movies_root(&server));

    run_index(&config, "hash-1", CrawlMode::Full)
        .await
        .expect("First crawl failed");

    // The root now lists only b.mkv
    server.reset().await;
    mount_page(
        &server,
        "/Movies/",
        r#"<table><tr><td></td><td><a href="b.mkv">b.mkv</a></td><td>2024-06-01</td><td>700M</td></tr></table>"#,
        None,
    )
    .await;

    let reports = run_index(&config, "hash-2", CrawlMode::Full)
        .await
        .expect("Second crawl failed");
    assert_eq!(reports[0].processed_dirs, 1);

    let store = open_db(&config);
    assert_eq!(store.count_directories().unwrap(), 1);
    assert_eq!(store.count_media_files().unwrap(), 1);
}

#[tokio::test]
async fn test_cookie_file_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Private/"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table><tr><td></td><td><a href="secret.mkv">secret.mkv</a></td></tr></table>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("cookies.txt"),
        "# Netscape HTTP Cookie File\n127.0.0.1\tFALSE\t/\tFALSE\t0\tsession\tabc123\n",
    )
    .unwrap();

    let roots = format!(
        "[[root]]\nurl = \"{}/Private/\"\ncookie = \"cookies.txt\"\n",
        server.uri()
    );
    let config = write_config(&dir, &roots);

    let reports = run_index(&config, "hash", CrawlMode::Full)
        .await
        .expect("Crawl failed");

    assert_eq!(reports[0].failed_dirs, 0);
    assert_eq!(reports[0].indexed_files, 1);
}

#[tokio::test]
async fn test_store_failure_marks_run_failed() {
    let server = MockServer::start().await;
    mount_movies(&server, None).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &movies_root(&server));

    // Create the schema, then make every media insert fail
    drop(open_db(&config));
    let conn = rusqlite::Connection::open(&config.output.database_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_media BEFORE INSERT ON media
         BEGIN SELECT RAISE(ABORT, 'media table is read-only'); END;",
    )
    .unwrap();
    drop(conn);

    let result = run_index(&config, "hash-1", CrawlMode::Full).await;
    assert!(
        matches!(result, Err(IndexError::Storage(StorageError::Sqlite(_)))),
        "Expected a storage error, got {:?}",
        result
    );

    let store = open_db(&config);
    let runs = store.recent_runs(1).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(runs[0].finished_at.is_some());

    // The root's directory row was rolled back with the failed media insert
    assert_eq!(store.count_directories().unwrap(), 0);
    assert_eq!(store.count_media_files().unwrap(), 0);
}

#[tokio::test]
async fn test_no_roots_crawls_nothing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    let reports = run_index(&config, "hash", CrawlMode::Incremental)
        .await
        .expect("Empty run failed");

    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_http_fetcher_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(EMPTY_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new("cineindex-test/1.0", Duration::from_secs(1));

    let missing = fetcher
        .fetch(&format!("{}/missing/", server.uri()), None)
        .await;
    assert_eq!(missing, Err(FetchError::Status { status: 404 }));

    let slow = fetcher.fetch(&format!("{}/slow/", server.uri()), None).await;
    assert_eq!(slow, Err(FetchError::Timeout));

    let ok = fetcher.fetch(&format!("{}/ok/", server.uri()), None).await;
    assert_eq!(ok.as_deref(), Ok(EMPTY_PAGE));
}
