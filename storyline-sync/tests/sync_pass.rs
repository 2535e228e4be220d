//! Full-pass integration tests: mock board API + file-backed store.

use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;
use tempfile::TempDir;

use storyline_api::{ApiClient, RetryPolicy};
use storyline_core::{
    ContentStore, LocalStore, NewRecord, RecordStatus, StoryId, SyncConfig,
};
use storyline_sync::{run_sync, RecordAction};

fn config_for(server: &MockServer) -> SyncConfig {
    SyncConfig::new("secret", server.base_url(), "press")
}

fn client_for(config: &SyncConfig) -> ApiClient {
    ApiClient::with_policy(config, RetryPolicy::without_backoff())
}

fn mock_board(server: &MockServer, ids: &[&str]) {
    let stubs: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "updatedAt": "2024-01-01T00:00:00Z"}))
        .collect();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/boards/press/stories");
        then.status(200).json_body(json!(stubs));
    });
}

fn mock_story(server: &MockServer, id: &str, body: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET).path(format!("/api/v1/stories/{id}"));
        then.status(200).json_body(body);
    });
}

fn simple_story(id: &str, updated_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Story {id}"),
        "specification": "# Heading\n\nBody text.",
        "updatedAt": updated_at,
        "card-kind": "unknown-kind",
        "attachments": []
    })
}

fn draft(story_id: &str) -> NewRecord {
    NewRecord {
        title: format!("Story {story_id}"),
        content: String::new(),
        story_id: StoryId::from(story_id),
        category: "uncategorized".to_string(),
    }
}

#[test]
fn empty_board_and_empty_store_reports_zeroes() {
    let server = MockServer::start();
    mock_board(&server, &[]);
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.seen, 0);
    assert_eq!(report.created(), 0);
    assert_eq!(report.updated(), 0);
    assert_eq!(report.deleted(), 0);
}

#[test]
fn new_story_is_created_and_linked() {
    let server = MockServer::start();
    mock_board(&server, &["42"]);
    mock_story(&server, "42", simple_story("42", "2024-01-01T00:00:00Z"));
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.seen, 1);
    assert_eq!(report.created(), 1);
    let records = store.linked_records().expect("scan");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.story_id, StoryId::from("42"));
    assert_eq!(record.title, "Story 42");
    assert!(record.content.contains("<h1>Heading</h1>"));
    assert_eq!(record.category, "uncategorized");
}

#[test]
fn second_run_with_unchanged_remote_is_idempotent() {
    let server = MockServer::start();
    mock_board(&server, &["42"]);
    mock_story(&server, "42", simple_story("42", "2024-01-01T00:00:00Z"));
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let config = config_for(&server);
    let client = client_for(&config);

    run_sync(&config, &client, &store, false).expect("first run");
    let second = run_sync(&config, &client, &store, false).expect("second run");

    assert_eq!(second.created(), 0);
    assert_eq!(second.updated(), 0);
    assert_eq!(second.deleted(), 0);
    assert_eq!(second.skipped(), 1);
}

#[test]
fn newer_remote_story_updates_in_place() {
    let server = MockServer::start();
    mock_board(&server, &["42"]);
    // Timestamp far in the future: strictly newer than any record write.
    mock_story(&server, "42", simple_story("42", "2999-01-01T00:00:00Z"));
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let config = config_for(&server);
    let client = client_for(&config);

    let first = run_sync(&config, &client, &store, false).expect("first run");
    assert_eq!(first.created(), 1);

    let second = run_sync(&config, &client, &store, false).expect("second run");
    assert_eq!(second.created(), 0);
    assert_eq!(second.updated(), 1);
    // Still exactly one record for the story.
    assert_eq!(store.linked_records().expect("scan").len(), 1);
}

#[test]
fn orphaned_record_is_trashed_and_reported() {
    let server = MockServer::start();
    mock_board(&server, &[]);
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let orphan = store.insert_record(draft("7")).expect("seed");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.deleted(), 1);
    assert!(report.to_string().contains("1 deleted"));
    let record = store.record(&orphan.id).expect("load");
    assert_eq!(record.status, RecordStatus::Trashed);
}

#[test]
fn trashed_orphan_is_not_deleted_twice() {
    let server = MockServer::start();
    mock_board(&server, &[]);
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    store.insert_record(draft("7")).expect("seed");
    let config = config_for(&server);
    let client = client_for(&config);

    let first = run_sync(&config, &client, &store, false).expect("first run");
    assert_eq!(first.deleted(), 1);

    // The trashed record is still indexed and still absent from the board,
    // but it is neither recreated nor trashed a second time.
    let second = run_sync(&config, &client, &store, false).expect("second run");
    assert_eq!(second.created(), 0);
    assert_eq!(second.deleted(), 0);
    assert_eq!(store.linked_records().expect("scan").len(), 1);
}

#[test]
fn orphans_survive_without_delete_capability() {
    let server = MockServer::start();
    mock_board(&server, &[]);
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::without_delete(tmp.path()).expect("open");
    let orphan = store.insert_record(draft("7")).expect("seed");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.deleted(), 0);
    assert_eq!(report.delete_skipped(), 1);
    let record = store.record(&orphan.id).expect("load");
    assert_eq!(record.status, RecordStatus::Published);
}

#[test]
fn identical_attachments_are_stored_once() {
    let server = MockServer::start();
    mock_board(&server, &["1", "2"]);
    let attachment = |url: &str| {
        json!([{
            "url": url,
            "filename": "cover.png",
            "sizeInBytes": 2048,
            "createdAt": "2024-01-01T00:00:00Z"
        }])
    };
    mock_story(
        &server,
        "1",
        json!({
            "id": "1", "title": "One", "specification": "",
            "updatedAt": "2024-01-01T00:00:00Z",
            "attachments": attachment("/attachments/one/cover.png")
        }),
    );
    mock_story(
        &server,
        "2",
        json!({
            "id": "2", "title": "Two", "specification": "",
            "updatedAt": "2024-01-01T00:00:00Z",
            "attachments": attachment("/attachments/two/cover.png")
        }),
    );
    let first_fetch = server.mock(|when, then| {
        when.method(GET).path("/attachments/one/cover.png");
        then.status(200).body("png-bytes");
    });
    let second_fetch = server.mock(|when, then| {
        when.method(GET).path("/attachments/two/cover.png");
        then.status(200).body("png-bytes");
    });

    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.created(), 2);
    first_fetch.assert_hits(1);
    second_fetch.assert_hits(0);

    let records = store.linked_records().expect("scan");
    let thumbnails: Vec<_> = records.iter().filter_map(|r| r.thumbnail.clone()).collect();
    assert_eq!(thumbnails.len(), 2);
    assert_eq!(thumbnails[0], thumbnails[1], "both records share one asset");
}

#[test]
fn shared_orphan_asset_survives_cleanup() {
    let server = MockServer::start();
    mock_board(&server, &["1"]);
    // Story 1 keeps its attachment; everything older than the records.
    mock_story(
        &server,
        "1",
        json!({
            "id": "1", "title": "One", "specification": "",
            "updatedAt": "2024-01-01T00:00:00Z",
            "attachments": [{
                "url": "/attachments/cover.png",
                "filename": "cover.png",
                "sizeInBytes": 2048,
                "createdAt": "2024-01-01T00:00:00Z"
            }]
        }),
    );

    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let survivor = store.insert_record(draft("1")).expect("seed");
    let orphan = store.insert_record(draft("9")).expect("seed");
    let asset = store
        .store_asset("cover.png", &storyline_sync::attach::content_hash("cover.png", 2048), b"x")
        .expect("asset");
    store
        .set_thumbnail(&survivor.id, Some(&asset.id))
        .expect("thumbnail");
    store
        .set_thumbnail(&orphan.id, Some(&asset.id))
        .expect("thumbnail");

    let config = config_for(&server);
    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.deleted(), 1);
    // The survivor still references the asset, so cleanup must keep it.
    assert!(store
        .find_asset(&storyline_sync::attach::content_hash("cover.png", 2048))
        .expect("lookup")
        .is_some());
    assert!(store.record(&orphan.id).expect("load").thumbnail.is_none());
    assert_eq!(
        store.record(&survivor.id).expect("load").thumbnail,
        Some(asset.id)
    );
}

#[test]
fn unreferenced_orphan_asset_is_deleted() {
    let server = MockServer::start();
    mock_board(&server, &[]);
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let orphan = store.insert_record(draft("9")).expect("seed");
    let asset = store.store_asset("cover.png", "solo-hash", b"x").expect("asset");
    store
        .set_thumbnail(&orphan.id, Some(&asset.id))
        .expect("thumbnail");

    let config = config_for(&server);
    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.deleted(), 1);
    assert!(store.find_asset("solo-hash").expect("lookup").is_none());
}

#[test]
fn per_story_failure_does_not_abort_the_run() {
    let server = MockServer::start();
    mock_board(&server, &["1", "2"]);
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/stories/1");
        then.status(500);
    });
    mock_story(&server, "2", simple_story("2", "2024-01-01T00:00:00Z"));

    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, false).expect("run");

    assert_eq!(report.seen, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1);
    let records = store.linked_records().expect("scan");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].story_id, StoryId::from("2"));
}

#[test]
fn category_allow_list_and_fallback() {
    let server = MockServer::start();
    mock_board(&server, &["1", "2"]);
    mock_story(
        &server,
        "1",
        json!({
            "id": "1", "title": "One", "specification": "",
            "updatedAt": "2024-01-01T00:00:00Z",
            "card-kind": "blog",
            "attachments": []
        }),
    );
    mock_story(
        &server,
        "2",
        json!({
            "id": "2", "title": "Two", "specification": "",
            "updatedAt": "2024-01-01T00:00:00Z",
            "card-kind": "unknown-kind",
            "attachments": []
        }),
    );

    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    store.create_category("blog", "Blog").expect("seed category");
    let config = config_for(&server);

    run_sync(&config, &client_for(&config), &store, false).expect("run");

    let records = store.linked_records().expect("scan");
    let by_story = |id: &str| {
        records
            .iter()
            .find(|r| r.story_id == StoryId::from(id))
            .expect("record")
    };
    assert_eq!(by_story("1").category, "blog");
    assert_eq!(by_story("2").category, "uncategorized");
}

#[test]
fn linked_set_matches_the_board_after_a_clean_pass() {
    let server = MockServer::start();
    mock_board(&server, &["1", "2"]);
    mock_story(&server, "1", simple_story("1", "2024-01-01T00:00:00Z"));
    mock_story(&server, "2", simple_story("2", "2024-01-01T00:00:00Z"));

    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    store.insert_record(draft("1")).expect("seed match");
    store.insert_record(draft("3")).expect("seed orphan");
    let config = config_for(&server);

    run_sync(&config, &client_for(&config), &store, false).expect("run");

    let mut live: Vec<String> = store
        .linked_records()
        .expect("scan")
        .into_iter()
        .filter(|r| r.status == RecordStatus::Published)
        .map(|r| r.story_id.to_string())
        .collect();
    live.sort();
    assert_eq!(live, vec!["1".to_string(), "2".to_string()]);
}

#[test]
fn dry_run_classifies_without_writing() {
    let server = MockServer::start();
    mock_board(&server, &["9"]);
    let tmp = TempDir::new().expect("tempdir");
    let store = LocalStore::open(tmp.path()).expect("open");
    let orphan = store.insert_record(draft("7")).expect("seed");
    let config = config_for(&server);

    let report = run_sync(&config, &client_for(&config), &store, true).expect("run");

    assert!(report.dry_run);
    assert_eq!(report.created(), 1);
    assert_eq!(report.deleted(), 1);
    assert!(report
        .actions
        .iter()
        .any(|a| matches!(a, RecordAction::WouldCreate { .. })));
    assert!(report
        .actions
        .iter()
        .any(|a| matches!(a, RecordAction::WouldDelete { .. })));
    assert!(report.to_string().starts_with("[dry-run]"));

    // Nothing was written: the orphan survives untouched and no record was
    // created for story 9.
    let records = store.linked_records().expect("scan");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, orphan.id);
    assert_eq!(records[0].status, RecordStatus::Published);
}
