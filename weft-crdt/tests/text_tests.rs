use pretty_assertions::assert_eq;
use weft_crdt::{Diff, Hunk, Text, TextOp};

#[test]
fn new_text_is_empty() {
    let text = Text::new();
    assert!(text.is_empty());
    assert_eq!(text.as_str(), "");
    assert_eq!(text.len(), 0);
}

#[test]
fn diff_then_update_reaches_target() {
    // Scenario: empty → "hello" → "help!".
    let mut text = Text::new();
    let d = text.diff("hello");
    text.update(&d);
    assert_eq!(text.as_str(), "hello");

    let d = text.diff("help!");
    text.update(&d);
    assert_eq!(text.as_str(), "help!");
}

#[test]
fn diff_of_identical_text_is_all_retain() {
    let mut text = Text::new();
    text.set("same");
    let d = text.diff("same");
    assert_eq!(d.hunks(), &[Hunk::Retain(4)]);
}

#[test]
fn diff_is_deterministic() {
    let mut text = Text::new();
    text.set("kitten");
    let d1 = text.diff("sitting");
    let d2 = text.diff("sitting");
    assert_eq!(d1, d2);
}

#[test]
fn diff_lengths_account_for_both_strings() {
    let mut text = Text::new();
    text.set("kitten");
    let d = text.diff("sitting");

    let mut consumed = 0;
    let mut produced = 0;
    for hunk in d.hunks() {
        match hunk {
            Hunk::Retain(n) => {
                consumed += n;
                produced += n;
            }
            Hunk::Delete(n) => consumed += n,
            Hunk::Insert(s) => produced += s.chars().count(),
        }
    }
    assert_eq!(consumed, "kitten".len());
    assert_eq!(produced, "sitting".len());
}

#[test]
fn set_returns_the_broadcast_op() {
    let mut text = Text::new();
    let op = text.set("abc");
    assert_eq!(text.as_str(), "abc");

    // The same op replayed on a fresh replica reproduces the state.
    let mut other = Text::new();
    other.apply(op);
    assert_eq!(other.as_str(), "abc");
}

#[test]
fn sequential_edits_replicate() {
    let mut author = Text::new();
    let mut reader = Text::new();
    for target in ["hello", "hello world", "help! world", ""] {
        let op = author.set(target);
        reader.apply(op);
        assert_eq!(reader.as_str(), author.as_str());
    }
}

#[test]
fn unicode_edits_count_scalar_values() {
    let mut text = Text::new();
    text.set("héllo ☃");
    assert_eq!(text.len(), 7);
    let op = text.set("héllo ☀");
    let mut other = Text::new();
    other.set("héllo ☃");
    other.apply(op);
    assert_eq!(other.as_str(), "héllo ☀");
}

// ── Clamped application ──────────────────────────────────────────

#[test]
fn oversized_retain_is_clamped() {
    let mut text = Text::new();
    text.set("ab");
    text.update(&Diff::new(vec![Hunk::Retain(10)]));
    assert_eq!(text.as_str(), "ab");
}

#[test]
fn oversized_delete_is_clamped() {
    let mut text = Text::new();
    text.set("ab");
    text.update(&Diff::new(vec![Hunk::Delete(10), Hunk::Insert("x".into())]));
    assert_eq!(text.as_str(), "x");
}

#[test]
fn short_diff_retains_the_tail() {
    // A diff that consumes less than the buffer leaves the rest untouched.
    let mut text = Text::new();
    text.set("abcdef");
    text.update(&Diff::new(vec![Hunk::Delete(1), Hunk::Insert("X".into())]));
    assert_eq!(text.as_str(), "Xbcdef");
}

#[test]
fn diff_against_diverged_state_applies_best_effort() {
    // Not a true CRDT: the diff was computed against "abc" but lands on "xy".
    let mut author = Text::new();
    author.set("abc");
    let op = author.set("abcd");

    let mut diverged = Text::new();
    diverged.set("xy");
    diverged.apply(op);
    // Three retains clamp to the two available characters, then "d" lands.
    assert_eq!(diverged.as_str(), "xyd");
}

#[test]
fn empty_diff_is_a_noop() {
    let mut text = Text::new();
    text.set("abc");
    text.update(&Diff::default());
    assert_eq!(text.as_str(), "abc");
}

// ── Wire format & dump/load ──────────────────────────────────────

#[test]
fn op_wire_format() {
    let op = TextOp {
        diff: Diff::new(vec![
            Hunk::Retain(3),
            Hunk::Delete(2),
            Hunk::Insert("p!".into()),
        ]),
    };
    let json = serde_json::to_value(&op).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"diff": [{"retain": 3}, {"delete": 2}, {"insert": "p!"}]})
    );
}

#[test]
fn op_roundtrips_through_json() {
    let op = TextOp {
        diff: Diff::new(vec![Hunk::Retain(1), Hunk::Insert("x".into())]),
    };
    let json = serde_json::to_string(&op).unwrap();
    let parsed: TextOp = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, op);
}

#[test]
fn dump_load_roundtrip_behaves_identically() {
    let mut text = Text::new();
    text.set("shared document");

    let json = serde_json::to_string(&text).unwrap();
    let mut loaded: Text = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, text);

    let op = text.set("shared document, edited");
    loaded.apply(op);
    assert_eq!(loaded, text);
}
