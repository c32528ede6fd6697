//! Uniqueness, exhaustion, and cancellation behavior of the racing
//! unique-sample picker under real thread contention.

use ahash::AHashSet;

use buildsmith_rs::{ItemDescriptor, PickError, Picker};

fn numeric_pool(size: usize) -> Vec<ItemDescriptor> {
    (0..size)
        .map(|i| ItemDescriptor::new(i.to_string(), format!("Item {i}"), 300 + i as u32))
        .collect()
}

/// Repeated picks on a fixed pool never repeat a canonical key until the
/// space is exhausted, and the next call fails.
#[test]
fn picks_are_unique_until_exhaustion() {
    // C(7, 6) = 7 possible builds.
    let picker = Picker::new(numeric_pool(7), 6);
    let mut keys = AHashSet::new();

    for round in 1..=7 {
        let selection = picker.pick_unique(4).expect("space not yet exhausted");
        assert!(
            keys.insert(selection.key.clone()),
            "duplicate key {} on round {round}",
            selection.key
        );
    }
    assert_eq!(keys.len(), 7);

    match picker.pick_unique(4) {
        Err(PickError::Exhausted { total: 7 }) => {}
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

/// Heavy worker contention must not double-register a build: the
/// registry grows by exactly one per successful call even with 64
/// workers racing on a 7-build space.
#[test]
fn many_workers_register_exactly_one_build_per_call() {
    let picker = Picker::new(numeric_pool(7), 6);

    for expected in 1..=7 {
        picker.pick_unique(64).expect("space not yet exhausted");
        assert_eq!(
            picker.issued(),
            expected,
            "cancellation let a loser insert into the registry"
        );
    }
    assert!(matches!(
        picker.pick_unique(64),
        Err(PickError::Exhausted { .. })
    ));
}

/// The registries of distinct pickers are independent: no process-global
/// state survives from one instance to another.
#[test]
fn pickers_do_not_share_state() {
    let first = Picker::new(numeric_pool(7), 6);
    for _ in 0..7 {
        first.pick_unique(2).expect("pick");
    }
    assert!(matches!(
        first.pick_unique(2),
        Err(PickError::Exhausted { .. })
    ));

    let second = Picker::new(numeric_pool(7), 6);
    second
        .pick_unique(2)
        .expect("a fresh picker starts with an empty registry");
}

/// Every pick draws items from the pool and keeps them distinct.
#[test]
fn selections_are_valid_builds() {
    let picker = Picker::new(numeric_pool(12), 6);
    for _ in 0..10 {
        let selection = picker.pick_unique(3).expect("pick");
        assert_eq!(selection.items.len(), 6);
        let distinct: AHashSet<_> = selection.items.iter().map(|item| &item.id).collect();
        assert_eq!(distinct.len(), 6);
    }
}

/// The retry budget turns the otherwise unbounded rejection sampler into
/// a terminating call, and malformed-id skips stay observable.
#[test]
fn attempt_budget_terminates_unreachable_searches() {
    let mut items = numeric_pool(6);
    items.push(ItemDescriptor::new("corrupted", "Corrupted Entry", 0));
    let picker = Picker::new(items, 6);

    // Only the all-numeric build can ever be canonicalized.
    picker.pick_unique(4).expect("the single clean build");

    let err = picker
        .pick_unique_with_budget(4, Some(1_000))
        .expect_err("no further clean build exists");
    assert!(matches!(err, PickError::AttemptBudgetExhausted { .. }));
    assert!(picker.malformed_skips() > 0);
}
