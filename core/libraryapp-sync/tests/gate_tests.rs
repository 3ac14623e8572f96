use libraryapp_sync::{PendingGate, SyncError};
use libraryapp_types::{EntityKind, MutationKind, PendingMutation};
use pretty_assertions::assert_eq;

fn update(target: &str) -> PendingMutation {
    PendingMutation::new(EntityKind::Library, target, MutationKind::Update)
}

#[test]
fn second_mutation_on_same_target_is_rejected() {
    let gate = PendingGate::new();
    let _held = gate.try_acquire(update("1")).unwrap();

    let err = gate.try_acquire(update("1")).unwrap_err();

    assert_eq!(err, SyncError::AlreadyPending(update("1")));
    assert!(!err.is_retryable());
    assert_eq!(gate.in_flight(), 1);
}

#[test]
fn gate_key_ignores_mutation_kind() {
    let gate = PendingGate::new();
    let _held = gate.try_acquire(update("1")).unwrap();

    let delete = PendingMutation::new(EntityKind::Library, "1", MutationKind::Delete);
    assert!(matches!(
        gate.try_acquire(delete),
        Err(SyncError::AlreadyPending(_))
    ));
}

#[test]
fn different_targets_run_concurrently() {
    let gate = PendingGate::new();
    let _a = gate.try_acquire(update("1")).unwrap();
    let _b = gate.try_acquire(update("2")).unwrap();
    let _c = gate
        .try_acquire(PendingMutation::new(EntityKind::Book, "1", MutationKind::Checkout))
        .unwrap();

    assert_eq!(gate.in_flight(), 3);
}

#[test]
fn dropping_guard_releases_target() {
    let gate = PendingGate::new();
    let guard = gate.try_acquire(update("1")).unwrap();
    assert!(gate.is_pending(EntityKind::Library, "1"));
    assert_eq!(guard.mutation(), &update("1"));

    drop(guard);

    assert!(!gate.is_pending(EntityKind::Library, "1"));
    assert!(gate.try_acquire(update("1")).is_ok());
}

#[test]
fn clones_share_in_flight_set() {
    let gate = PendingGate::new();
    let other = gate.clone();
    let _held = gate.try_acquire(update("7")).unwrap();

    assert!(other.is_pending(EntityKind::Library, "7"));
    assert!(other.try_acquire(update("7")).is_err());
}
