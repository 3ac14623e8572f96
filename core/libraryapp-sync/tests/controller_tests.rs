use libraryapp_remote::{HttpRemote, RemoteConfig};
use libraryapp_sync::{
    ChannelSink, Operation, OperationState, StatusBoard, StoreHandle, SyncController, SyncError,
    SyncEvent,
};
use libraryapp_types::{
    Book, EntityKind, Library, LibraryDraft, LibraryId, LoanRecord, MutationKind,
    PendingMutation, ScreenId,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────

fn mock_controller(server: &MockServer) -> (SyncController, UnboundedReceiver<SyncEvent>) {
    let remote = HttpRemote::new(RemoteConfig::with_base_url(server.uri())).unwrap();
    let (sink, rx) = ChannelSink::new();
    (SyncController::with_sink(Arc::new(remote), Arc::new(sink)), rx)
}

fn library_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "address": "Main St",
        "openTime": "09:00",
        "closeTime": "18:00",
        "openDays": "Mon-Fri"
    })
}

fn library(id: &str, name: &str) -> Library {
    serde_json::from_value(library_json(id, name)).unwrap()
}

fn draft(name: &str) -> LibraryDraft {
    LibraryDraft::new(name, "Main St")
        .with_hours("09:00", "18:00")
        .with_days("Mon-Fri")
}

fn drain(rx: &mut UnboundedReceiver<SyncEvent>) -> Vec<(Operation, OperationState)> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push((event.operation, event.state));
    }
    events
}

fn load_op(kind: EntityKind) -> Operation {
    Operation::Load(kind)
}

fn library_op(target: &str, kind: MutationKind) -> Operation {
    Operation::Mutation(PendingMutation::new(EntityKind::Library, target, kind))
}

async fn seeded_libraries(records: Vec<Library>) -> StoreHandle<Library> {
    StoreHandle::with_records(ScreenId::new(), records)
}

async fn ids(store: &StoreHandle<Library>) -> Vec<String> {
    store
        .snapshot()
        .await
        .iter()
        .map(|l| l.id.to_string())
        .collect()
}

// ── Loads ───────────────────────────────────────────────────────

#[tokio::test]
async fn load_libraries_replaces_store_with_remote_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([library_json("1", "Central")])))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("stale", "Gone")]).await;

    let loaded = controller.load_libraries(&store).await.unwrap();

    assert_eq!(loaded, vec![library("1", "Central")]);
    assert_eq!(ids(&store).await, vec!["1"]);
    assert_eq!(store.get("1").await.unwrap().open_days, "Mon-Fri");
    assert_eq!(
        drain(&mut rx),
        vec![
            (load_op(EntityKind::Library), OperationState::Pending),
            (load_op(EntityKind::Library), OperationState::Succeeded),
        ]
    );
}

#[tokio::test]
async fn loading_twice_leaves_store_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            library_json("2", "North"),
            library_json("1", "Central")
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let store = StoreHandle::new(ScreenId::new());

    controller.load_libraries(&store).await.unwrap();
    let first = store.snapshot().await;
    controller.load_libraries(&store).await.unwrap();

    assert_eq!(store.snapshot().await, first);
    assert_eq!(ids(&store).await, vec!["2", "1"]);
}

#[tokio::test]
async fn failed_load_leaves_store_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    let err = controller.load_libraries(&store).await.unwrap_err();

    assert!(matches!(err, SyncError::Transport(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert_eq!(ids(&store).await, vec!["1"]);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].1, OperationState::Failed(err));
}

#[tokio::test]
async fn malformed_book_listing_keeps_previous_books() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/library/1/book"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "isbn": "978-1",
            "available": 2,
            "book": {"authors": [], "cover": {"largeUrl": "", "mediumUrl": "", "smallUrl": ""}}
        }])))
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let previous: Book = serde_json::from_value(json!({
        "isbn": "978-0",
        "title": "Dune",
        "authors": [{"name": "Frank Herbert"}],
        "cover": {"largeUrl": "", "mediumUrl": "", "smallUrl": ""},
        "available": 1
    }))
    .unwrap();
    let books = StoreHandle::with_records(ScreenId::new(), vec![previous.clone()]);

    let err = controller
        .load_books(&LibraryId::new("1"), &books)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Decode(_)), "got {err:?}");
    assert!(!err.is_retryable());
    assert_eq!(books.snapshot().await, vec![previous]);
}

#[tokio::test]
async fn load_books_flattens_catalog_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/library/1/book"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "isbn": "978-1",
            "available": 2,
            "book": {
                "title": "Dune",
                "authors": [{"name": "Frank Herbert"}],
                "cover": {"largeUrl": "l", "mediumUrl": "m", "smallUrl": "s"}
            }
        }])))
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let books: StoreHandle<Book> = StoreHandle::new(ScreenId::new());

    controller
        .load_books(&LibraryId::new("1"), &books)
        .await
        .unwrap();

    let dune = books.get("978-1").await.unwrap();
    assert_eq!(dune.title, "Dune");
    assert_eq!(dune.available, 2);
    assert_eq!(drain(&mut rx)[0].0, load_op(EntityKind::Book));
}

#[tokio::test]
async fn load_loans_queries_by_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/books/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "book": {"title": "Dune", "authors": [], "isbn": "978-1"},
            "libraryId": "1",
            "dueDate": "2026-11-01"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let loans: StoreHandle<LoanRecord> = StoreHandle::new(ScreenId::new());

    let loaded = controller.load_loans("  alice ", &loans).await.unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].library_id.as_str(), "1");
    assert_eq!(loans.snapshot().await.len(), 1);
}

#[tokio::test]
async fn identical_loans_are_all_kept() {
    let loan = json!({
        "book": {"title": "Dune", "authors": [], "isbn": "978-1"},
        "libraryId": "1",
        "dueDate": "2026-11-01"
    });
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/books/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([loan.clone(), loan])))
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let loans: StoreHandle<LoanRecord> = StoreHandle::new(ScreenId::new());

    let loaded = controller.load_loans("alice", &loans).await.unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loans.snapshot().await.len(), 2);
}

#[tokio::test]
async fn blank_username_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let loans: StoreHandle<LoanRecord> = StoreHandle::new(ScreenId::new());

    let err = controller.load_loans("   ", &loans).await.unwrap_err();

    assert!(matches!(err, SyncError::InvalidInput(_)), "got {err:?}");
    assert!(drain(&mut rx).is_empty());
}

// ── Mutations ───────────────────────────────────────────────────

#[tokio::test]
async fn create_library_inserts_server_record_then_reloads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(201).set_body_json(library_json("2", "North")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            library_json("1", "Central"),
            library_json("2", "North")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    let created = controller.create_library(&store, draft("North")).await.unwrap();

    assert_eq!(created.id.as_str(), "2");
    // Server order wins once the reload lands.
    assert_eq!(ids(&store).await, vec!["1", "2"]);
    assert_eq!(controller.gate().in_flight(), 0);
    assert_eq!(
        drain(&mut rx),
        vec![
            (library_op("North", MutationKind::Create), OperationState::Pending),
            (library_op("North", MutationKind::Create), OperationState::Succeeded),
            (load_op(EntityKind::Library), OperationState::Pending),
            (load_op(EntityKind::Library), OperationState::Succeeded),
        ]
    );
}

#[tokio::test]
async fn create_keeps_server_record_when_reload_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(201).set_body_json(library_json("2", "North")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    let created = controller.create_library(&store, draft("North")).await;

    assert!(created.is_ok());
    assert_eq!(ids(&store).await, vec!["2", "1"]);
    let events = drain(&mut rx);
    assert!(matches!(
        events.last(),
        Some((Operation::Load(EntityKind::Library), OperationState::Failed(SyncError::Transport(_))))
    ));
}

#[tokio::test]
async fn rejected_create_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/library"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "name is required"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    let err = controller.create_library(&store, draft("")).await.unwrap_err();

    assert_eq!(err, SyncError::Validation("name is required".into()));
    assert_eq!(ids(&store).await, vec!["1"]);
}

#[tokio::test]
async fn update_library_sends_full_record_and_reloads() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/library/1"))
        .and(body_json(library_json("1", "Central Library")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([library_json("1", "Central Library")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    controller
        .update_library(&store, &LibraryId::new("1"), draft("Central Library"))
        .await
        .unwrap();

    assert_eq!(store.get("1").await.unwrap().name, "Central Library");
    assert!(!controller.gate().is_pending(EntityKind::Library, "1"));
}

#[tokio::test]
async fn update_missing_library_is_not_found_and_skips_reload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/library/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    let err = controller
        .update_library(&store, &LibraryId::new("7"), draft("Ghost"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::NotFound(_)), "got {err:?}");
    assert_eq!(store.get("1").await.unwrap().name, "Central");
}

#[tokio::test]
async fn concurrent_update_on_same_library_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/library/1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([library_json("1", "First")])),
        )
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central")]).await;
    let id = LibraryId::new("1");

    let (first, second) = tokio::join!(
        controller.update_library(&store, &id, draft("First")),
        controller.update_library(&store, &id, draft("Second")),
    );

    assert!(first.is_ok());
    assert_eq!(
        second.unwrap_err(),
        SyncError::AlreadyPending(PendingMutation::new(
            EntityKind::Library,
            "1",
            MutationKind::Update
        ))
    );
    assert_eq!(store.get("1").await.unwrap().name, "First");

    // The rejected attempt publishes nothing.
    let mutation_events = drain(&mut rx)
        .into_iter()
        .filter(|(op, _)| matches!(op, Operation::Mutation(_)))
        .count();
    assert_eq!(mutation_events, 2);
}

#[tokio::test]
async fn updates_on_different_libraries_run_concurrently() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            library_json("1", "A"),
            library_json("2", "B")
        ])))
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central"), library("2", "North")]).await;

    let id1 = LibraryId::new("1");
    let id2 = LibraryId::new("2");
    let (a, b) = tokio::join!(
        controller.update_library(&store, &id1, draft("A")),
        controller.update_library(&store, &id2, draft("B")),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
}

#[tokio::test]
async fn delete_blocked_by_books_is_conflict_and_library_stays() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/library/9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("library has books"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([library_json("9", "Annex")])))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("9", "Annex")]).await;

    let err = controller
        .delete_library(&store, &LibraryId::new("9"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Conflict(_)), "got {err:?}");
    assert_eq!(ids(&store).await, vec!["9"]);
    assert_eq!(
        drain(&mut rx),
        vec![
            (library_op("9", MutationKind::Delete), OperationState::Pending),
            (library_op("9", MutationKind::Delete), OperationState::Failed(err)),
        ]
    );

    // The only GET is the explicit load below; a failed delete does not reload.
    controller.load_libraries(&store).await.unwrap();
    assert_eq!(ids(&store).await, vec!["9"]);
}

#[tokio::test]
async fn delete_removes_library_after_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/library/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([library_json("1", "Central")])))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _rx) = mock_controller(&server);
    let store = seeded_libraries(vec![library("1", "Central"), library("2", "North")]).await;

    controller
        .delete_library(&store, &LibraryId::new("2"))
        .await
        .unwrap();

    assert_eq!(ids(&store).await, vec!["1"]);
}

// ── Screen teardown ─────────────────────────────────────────────

#[tokio::test]
async fn result_for_closed_screen_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/library"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([library_json("1", "Central")]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store: StoreHandle<Library> = StoreHandle::new(ScreenId::new());

    let (result, ()) = tokio::join!(controller.load_libraries(&store), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.close().await;
    });

    assert_eq!(result.unwrap_err(), SyncError::ScopeClosed(store.screen()));
    assert!(store.snapshot().await.is_empty());
    assert_eq!(
        drain(&mut rx),
        vec![
            (load_op(EntityKind::Library), OperationState::Pending),
            (load_op(EntityKind::Library), OperationState::Idle),
        ]
    );
}

#[tokio::test]
async fn closed_screen_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let board = Arc::new(StatusBoard::new());
    let remote = HttpRemote::new(RemoteConfig::with_base_url(server.uri())).unwrap();
    let controller = SyncController::with_sink(Arc::new(remote), board.clone());
    let store = seeded_libraries(vec![library("1", "Central")]).await;
    store.close().await;

    let err = controller
        .delete_library(&store, &LibraryId::new("1"))
        .await
        .unwrap_err();

    assert_eq!(err, SyncError::ScopeClosed(store.screen()));
    assert_eq!(controller.gate().in_flight(), 0);
    assert_eq!(
        board.state(store.screen(), &library_op("1", MutationKind::Delete)),
        OperationState::Idle
    );
}

#[tokio::test]
async fn closed_screen_load_publishes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (controller, mut rx) = mock_controller(&server);
    let store: StoreHandle<Library> = StoreHandle::new(ScreenId::new());
    store.close().await;

    let err = controller.load_libraries(&store).await.unwrap_err();

    assert_eq!(err, SyncError::ScopeClosed(store.screen()));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn board_returns_to_idle_when_screen_closes_mid_flight() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/library/1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let board = Arc::new(StatusBoard::new());
    let remote = HttpRemote::new(RemoteConfig::with_base_url(server.uri())).unwrap();
    let controller = SyncController::with_sink(Arc::new(remote), board.clone());
    let store = seeded_libraries(vec![library("1", "Central")]).await;

    let id1 = LibraryId::new("1");
    let (result, ()) = tokio::join!(
        controller.update_library(&store, &id1, draft("Renamed")),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(
                board.state(store.screen(), &library_op("1", MutationKind::Update)),
                OperationState::Pending
            );
            store.close().await;
        }
    );

    assert_eq!(result.unwrap_err(), SyncError::ScopeClosed(store.screen()));
    assert_eq!(
        board.state(store.screen(), &library_op("1", MutationKind::Update)),
        OperationState::Idle
    );
}
