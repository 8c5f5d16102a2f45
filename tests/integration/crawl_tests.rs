//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both contest sites and exercise
//! listing crawls and detail fetches end-to-end.

use gongmo::config::{Config, FetchConfig, PacingConfig, SourcesConfig};
use gongmo::crawler::CrawlSession;
use gongmo::record::{partition_entries, ListingEntry, Source, DEFAULT_CATEGORY};
use gongmo::storage::{ListingStore, SqliteListingStore};
use gongmo::{fetch_detail_a, fetch_detail_b};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing both sites at the mock server
fn create_test_config(base_url: &str) -> Config {
    Config {
        fetch: FetchConfig {
            timeout_secs: 1,
            connect_timeout_secs: 1,
            ..FetchConfig::default()
        },
        pacing: PacingConfig { min_interval_ms: 0 },
        sources: SourcesConfig {
            allforyoung_base: base_url.to_string(),
            wevity_base: base_url.to_string(),
        },
        ..Config::default()
    }
}

fn card(id: u32) -> String {
    format!(
        r#"<li>
             <a href="/posts/{id}">
               <img alt="공모전 {id}">
               <span data-slot="badge">D-{id}</span>
               <div data-slot="card-content"><span data-slot="badge">공모전</span></div>
               <div data-slot="card-footer">주최 {id}</div>
             </a>
           </li>"#
    )
}

fn listing_page(ids: &[u32]) -> String {
    let cards: Vec<_> = ids.iter().map(|id| card(*id)).collect();
    format!(
        r#"<html><body>
             <nav><a href="/posts/1">공지</a></nav>
             <ul>{}</ul>
           </body></html>"#,
        cards.join("\n")
    )
}

async fn mount_listing_page(server: &MockServer, page: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/posts/contest"))
        .and(query_param("page", page))
        .respond_with(template)
        .mount(server)
        .await;
}

fn ids(entries: &[ListingEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| match entry {
            ListingEntry::Record(record) => record.id.clone(),
            ListingEntry::Error(marker) => format!("error@{}", marker.page),
        })
        .collect()
}

#[tokio::test]
async fn test_listing_skips_navigation_links() {
    let mock_server = MockServer::start().await;
    mount_listing_page(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_string(listing_page(&[101, 102, 103])),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let mut session = CrawlSession::new(&config).expect("Failed to create session");
    let entries = session.crawl_listing_a(1, 1).await;

    assert_eq!(ids(&entries), vec!["101", "102", "103"]);
    for entry in &entries {
        let record = entry.as_record().unwrap();
        assert!(record.url.starts_with(&format!("{}/posts/", mock_server.uri())));
        assert_eq!(record.source, Source::AllForYoung);
        assert_eq!(record.category, "공모전");
    }
}

#[tokio::test]
async fn test_timeout_mid_crawl_yields_error_marker() {
    let mock_server = MockServer::start().await;
    mount_listing_page(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_string(listing_page(&[11, 12])),
    )
    .await;
    mount_listing_page(
        &mock_server,
        "2",
        ResponseTemplate::new(200)
            .set_body_string(listing_page(&[21]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_listing_page(
        &mock_server,
        "3",
        ResponseTemplate::new(200).set_body_string(listing_page(&[31, 32])),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let mut session = CrawlSession::new(&config).expect("Failed to create session");
    let entries = session.crawl_listing(Source::AllForYoung, 1, 3).await;

    assert_eq!(ids(&entries), vec!["11", "12", "error@2", "31", "32"]);
    match &entries[2] {
        ListingEntry::Error(marker) => assert!(marker.error.contains("timeout")),
        other => panic!("expected error marker, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pacing_interval_follows_slow_pages() {
    let mock_server = MockServer::start().await;
    for page in ["1", "2"] {
        mount_listing_page(
            &mock_server,
            page,
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&[1]))
                .set_delay(Duration::from_millis(300)),
        )
        .await;
    }

    let mut config = create_test_config(&mock_server.uri());
    config.pacing.min_interval_ms = 400;
    let mut session = CrawlSession::new(&config).expect("Failed to create session");

    let started = Instant::now();
    let entries = session.crawl_listing_a(1, 2).await;

    assert_eq!(entries.len(), 2);
    // 300ms page, full 400ms pause, 300ms page
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_listing_run_reports_clamped_pages() {
    let mock_server = MockServer::start().await;
    for page in ["1", "2"] {
        mount_listing_page(
            &mock_server,
            page,
            ResponseTemplate::new(200).set_body_string(listing_page(&[page.parse().unwrap()])),
        )
        .await;
    }

    let mut config = create_test_config(&mock_server.uri());
    config.listing.max_pages_cap = 2;
    let mut session = CrawlSession::new(&config).expect("Failed to create session");

    let run = session.crawl_listing_run(Source::AllForYoung, 0, 5).await;
    assert_eq!(run.pages, 2);
    assert_eq!(ids(&run.entries), vec!["1", "2"]);
}

#[tokio::test]
async fn test_server_error_yields_error_marker() {
    let mock_server = MockServer::start().await;
    mount_listing_page(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_string(listing_page(&[1001])),
    )
    .await;
    mount_listing_page(&mock_server, "2", ResponseTemplate::new(500)).await;

    let config = create_test_config(&mock_server.uri());
    let mut session = CrawlSession::new(&config).expect("Failed to create session");
    let entries = session.crawl_listing_a(1, 2).await;

    let (records, errors) = partition_entries(&entries);
    assert_eq!(records.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].page, 2);
    assert!(errors[0].error.contains("500"));
}

#[tokio::test]
async fn test_wevity_listing_crawl() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("gbn", "list"))
        .and(query_param("gp", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ul class="list">
                 <li class="top"><div class="tit">공모전명</div></li>
                 <li>
                   <div class="tit"><a href="?c=find&s=1&gbn=view&ix=500">광고 공모전 SPECIAL</a></div>
                   <div class="organ">광고협회</div>
                   <div class="day">D-3</div>
                 </li>
               </ul>"#,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let mut session = CrawlSession::new(&config).expect("Failed to create session");
    let entries = session.crawl_listing(Source::Wevity, 1, 1).await;

    assert_eq!(entries.len(), 1);
    let record = entries[0].as_record().unwrap();
    assert_eq!(record.id, "500");
    assert_eq!(record.title, "광고 공모전");
    assert_eq!(record.category, DEFAULT_CATEGORY);
    assert_eq!(record.source, Source::Wevity);
    assert_eq!(
        record.url,
        format!("{}/?c=find&s=1&gbn=view&ix=500", mock_server.uri())
    );
}

#[tokio::test]
async fn test_detail_non_success_is_absent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("ix", "500"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());

    let detail_a = fetch_detail_a(&config, "404").await.expect("session");
    assert!(detail_a.is_none());

    let detail_b = fetch_detail_b(&config, "500").await.expect("session");
    assert!(detail_b.is_none());
}

#[tokio::test]
async fn test_wevity_detail_category_from_label() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("gbn", "view"))
        .and(query_param("ix", "91234"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                 <div class="tit-area"><h6 class="tit">대학생 광고 공모전 IDEA</h6></div>
                 <ul>
                   <li><span>분야</span><div class="info">IT/기술</div></li>
                   <li><span>주최</span><div class="info">한국광고협회</div></li>
                 </ul>
                 <div class="comm-desc"><p>공모 요강</p><img src="/upload/a.jpg"><img src="https://cdn.example.com/b.jpg"></div>
                 <a href="?c=apply&ix=91234">참가 신청</a>
               </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let detail = fetch_detail_b(&config, "91234")
        .await
        .expect("session")
        .expect("detail record");

    assert_eq!(detail.id, "91234");
    assert_eq!(detail.title, "대학생 광고 공모전");
    assert_eq!(detail.category, "IT/기술");
    assert_eq!(detail.host, "한국광고협회");
    assert_eq!(detail.body, "공모 요강");
    // http images from hosts other than wevity are dropped
    assert_eq!(detail.images, vec!["https://cdn.example.com/b.jpg"]);
    assert_eq!(
        detail.apply_url,
        format!("{}/?c=apply&ix=91234", mock_server.uri())
    );
}

#[tokio::test]
async fn test_allforyoung_detail_fetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/78105"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><article>
                 <h1>청년 정책 공모전</h1>
                 <p>접수기간 2025.03.01 ~ 03.31</p>
                 <a href="/apply">지원하기</a>
               </article></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let mut session = CrawlSession::new(&config).expect("Failed to create session");
    let detail = session
        .fetch_detail(Source::AllForYoung, "78105")
        .await
        .expect("detail record");

    assert_eq!(detail.url, format!("{}/posts/78105", mock_server.uri()));
    assert_eq!(detail.title, "청년 정책 공모전");
    assert_eq!(detail.apply_period, "2025.03.01 ~ 03.31");
    assert_eq!(detail.apply_url, format!("{}/apply", mock_server.uri()));
}

#[tokio::test]
async fn test_repeated_crawls_keep_first_seen() {
    let mock_server = MockServer::start().await;
    mount_listing_page(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_string(listing_page(&[7, 8])),
    )
    .await;
    mount_listing_page(&mock_server, "2", ResponseTemplate::new(500)).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("gongmo.db");
    let mut store = SqliteListingStore::new(&db_path).expect("Failed to open store");

    let config = create_test_config(&mock_server.uri());
    let mut session = CrawlSession::new(&config).expect("Failed to create session");

    let entries = session.crawl_listing_a(1, 2).await;
    let (records, errors) = partition_entries(&entries);
    assert_eq!(errors.len(), 1);
    let records: Vec<_> = records.into_iter().cloned().collect();
    let first = store.upsert_listings(&records).unwrap();
    assert_eq!((first.inserted, first.updated), (2, 0));
    let first_seen = store
        .get_contest(Source::AllForYoung, "7")
        .unwrap()
        .unwrap()
        .first_seen_at;

    let entries = session.crawl_listing_a(1, 1).await;
    let (records, _) = partition_entries(&entries);
    let records: Vec<_> = records.into_iter().cloned().collect();
    let second = store.upsert_listings(&records).unwrap();
    assert_eq!((second.inserted, second.updated), (0, 2));

    let stored = store
        .get_contest(Source::AllForYoung, "7")
        .unwrap()
        .unwrap();
    assert_eq!(stored.first_seen_at, first_seen);
    assert_eq!(
        store.count_by_source().unwrap(),
        vec![(Source::AllForYoung, 2), (Source::Wevity, 0)]
    );
}
