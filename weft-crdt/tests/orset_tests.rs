use weft_crdt::{ORSet, SetOp, ViewOptions};
use weft_types::Tag;

fn t(s: &str) -> Tag {
    Tag::new(s)
}

#[test]
fn new_set_is_empty() {
    let set: ORSet<i32> = ORSet::new();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
}

#[test]
fn add_and_contains() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    assert!(set.contains(&"x"));
    assert!(!set.contains(&"y"));
    assert_eq!(set.len(), 1);
}

#[test]
fn add_remove_then_re_add() {
    // Scenario: add("t1","x"), remove → absent; add("t2","x") → present.
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    set.remove(&"x");
    assert!(!set.contains(&"x"));
    assert_eq!(set.len(), 0);

    set.add(t("t2"), "x");
    assert!(set.contains(&"x"));
    assert_eq!(set.tags(&"x"), vec![t("t2")]);
}

#[test]
fn remove_before_add_is_blocked_by_tombstone() {
    // Scenario: the remove overtakes its add on the wire.
    let mut set = ORSet::new();
    set.apply(SetOp::Remove {
        value: "x",
        tags: vec![t("t1")],
    });
    set.apply(SetOp::Add {
        tag: t("t1"),
        value: "x",
    });
    assert!(!set.contains(&"x"));
}

#[test]
fn remove_kills_only_observed_tags() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    let op = set.remove(&"x");
    match &op {
        SetOp::Remove { tags, .. } => assert_eq!(tags, &vec![t("t1")]),
        SetOp::Add { .. } => panic!("remove built an add"),
    }
    // A concurrent add under a tag the remover never saw survives delivery
    // of that remove.
    let mut other = ORSet::new();
    other.add(t("t1"), "x");
    other.add(t("t2"), "x");
    other.apply(op);
    assert!(other.contains(&"x"));
    assert_eq!(other.tags(&"x"), vec![t("t2")]);
}

#[test]
fn remove_absent_value_is_an_empty_op() {
    let mut set: ORSet<&str> = ORSet::new();
    let op = set.remove(&"ghost");
    match op {
        SetOp::Remove { tags, .. } => assert!(tags.is_empty()),
        SetOp::Add { .. } => panic!("remove built an add"),
    }
    assert!(set.is_empty());
}

#[test]
fn remove_tags_leaves_other_tags_live() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    set.add(t("t2"), "x");
    set.remove_tags(&[t("t1")], &"x");
    assert!(set.contains(&"x"));
    assert_eq!(set.tags(&"x"), vec![t("t2")]);
}

#[test]
fn tags_returns_sorted_live_tags() {
    let mut set = ORSet::new();
    set.add(t("b"), "x");
    set.add(t("a"), "x");
    assert_eq!(set.tags(&"x"), vec![t("a"), t("b")]);
}

#[test]
fn tags_for_absent_value_is_empty() {
    let set: ORSet<&str> = ORSet::new();
    assert!(set.tags(&"nope").is_empty());
}

#[test]
fn tags_for_fully_removed_value_is_empty() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    set.remove(&"x");
    assert!(set.tags(&"x").is_empty());
}

#[test]
fn duplicate_add_delivery_is_idempotent() {
    let op = SetOp::Add {
        tag: t("t1"),
        value: "x",
    };
    let mut set = ORSet::new();
    set.apply(op.clone());
    set.apply(op);
    assert_eq!(set.tags(&"x"), vec![t("t1")]);
}

#[test]
fn duplicate_remove_delivery_is_idempotent() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    let op = set.remove(&"x");
    set.apply(op);
    assert!(!set.contains(&"x"));
    assert_eq!(set.tombstones().len(), 1);
}

#[test]
fn iteration_orders_by_smallest_live_tag() {
    let mut set = ORSet::new();
    set.add(t("3"), "c");
    set.add(t("1"), "a");
    set.add(t("2"), "b");
    assert_eq!(set.to_vec(), vec!["a", "b", "c"]);

    let pairs: Vec<_> = set.iter().map(|(v, tags)| (*v, tags.len())).collect();
    assert_eq!(pairs, vec![("a", 1), ("b", 1), ("c", 1)]);
}

#[test]
fn tombstones_track_removed_tags() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    assert!(set.tombstones().is_empty());
    set.remove(&"x");
    assert!(set.tombstones().contains(&t("t1")));
}

#[test]
fn gc_tombstones() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x");
    set.remove(&"x");
    set.gc_tombstones(|_| false);
    assert!(set.tombstones().is_empty());
}

#[test]
fn no_tombstones_mode_lets_late_adds_resurrect() {
    let mut set = ORSet::with_options(ViewOptions {
        no_tombstones: true,
    });
    set.apply(SetOp::Remove {
        value: "x",
        tags: vec![t("t1")],
    });
    // Nothing was remembered, so the "late" add lands.
    set.apply(SetOp::Add {
        tag: t("t1"),
        value: "x",
    });
    assert!(set.contains(&"x"));
    assert!(set.tombstones().is_empty());
}

#[test]
fn from_iterator_mints_tags() {
    let set: ORSet<i32> = vec![1, 2, 3].into_iter().collect();
    assert_eq!(set.len(), 3);
    assert!(set.contains(&1));
    assert!(set.contains(&2));
    assert!(set.contains(&3));
}

// ── Wire format ──────────────────────────────────────────────────

#[test]
fn add_op_wire_format() {
    let op = SetOp::Add {
        tag: t("t1"),
        value: "x",
    };
    let json = serde_json::to_value(&op).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "add", "tag": "t1", "value": "x"})
    );
}

#[test]
fn remove_op_wire_format() {
    let op: SetOp<&str> = SetOp::Remove {
        value: "x",
        tags: vec![t("t1"), t("t2")],
    };
    let json = serde_json::to_value(&op).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "remove", "value": "x", "tags": ["t1", "t2"]})
    );
}

#[test]
fn remove_op_accepts_singleton_tag() {
    let json = serde_json::json!({"type": "remove", "value": "x", "tags": "t1"});
    let op: SetOp<String> = serde_json::from_value(json).unwrap();
    match op {
        SetOp::Remove { tags, .. } => assert_eq!(tags, vec![t("t1")]),
        SetOp::Add { .. } => panic!("decoded as add"),
    }
}

#[test]
fn dump_load_roundtrip_behaves_identically() {
    let mut set = ORSet::new();
    set.add(t("t1"), "x".to_string());
    set.add(t("t2"), "y".to_string());
    set.remove(&"x".to_string());

    let json = serde_json::to_string(&set).unwrap();
    let mut loaded: ORSet<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, set);

    let stale = SetOp::Add {
        tag: t("t1"),
        value: "x".to_string(),
    };
    set.apply(stale.clone());
    loaded.apply(stale);
    assert_eq!(loaded, set);
    assert!(!loaded.contains(&"x".to_string()));
}
