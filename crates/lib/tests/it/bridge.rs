use watchtree::{Matcher, Store, Value, store::event};

use crate::helpers::{counting, recording};

fn pair() -> (Store, Store) {
    let a = Store::from_json(r#"{"x": {"y": 1}}"#).unwrap();
    let b = Store::from_json(r#"{"z": {"y": 1}}"#).unwrap();
    (a, b)
}

#[test]
fn mirrors_in_both_directions() {
    let (a, b) = pair();
    a.bridge("x", &b, "z").detach();

    a.set("x.y", 2).unwrap();
    assert_eq!(b.get_int("z.y"), Some(2));

    b.set("z.y", 3).unwrap();
    assert_eq!(a.get_int("x.y"), Some(3));
}

#[test]
fn one_write_fires_exactly_one_change_per_store() {
    let (a, b) = pair();
    let (count_a, on_a) = counting();
    let (count_b, on_b) = counting();
    a.subscribe(event::CHANGE, "x.y", on_a).detach();
    b.subscribe(event::CHANGE, "z.y", on_b).detach();

    a.bridge("x", &b, "z").detach();

    a.set("x.y", 2).unwrap();
    assert_eq!(b.get_int("z.y"), Some(2));
    assert_eq!(count_a.get(), 1);
    assert_eq!(count_b.get(), 1);

    b.set("z.y", 3).unwrap();
    assert_eq!(a.get_int("x.y"), Some(3));
    assert_eq!(count_a.get(), 2);
    assert_eq!(count_b.get(), 2);
}

#[test]
fn mirrors_descendant_paths() {
    let (a, b) = pair();
    a.bridge("x", &b, "z").detach();

    a.set("x.nested.deep", "v").unwrap();
    assert_eq!(b.get_text("z.nested.deep"), Some("v".to_string()));
}

#[test]
fn mirrors_subtree_root_replacement() {
    let (a, b) = pair();
    a.bridge("x", &b, "z").detach();

    let replacement = Store::from_json(r#"{"y": 9, "w": 10}"#).unwrap().data();
    a.set("x", replacement.clone()).unwrap();
    assert_eq!(b.get("z"), Some(replacement));
}

#[test]
fn bridging_whole_store_to_a_subtree() {
    let a = Store::new();
    let b = Store::from_json(r#"{"mirror": {}}"#).unwrap();
    a.bridge("", &b, "mirror").detach();

    a.set("k", 1).unwrap();
    assert_eq!(b.get_int("mirror.k"), Some(1));
}

#[test]
fn writes_outside_the_bridged_subtree_stay_local() {
    let (a, b) = pair();
    a.bridge("x", &b, "z").detach();

    a.set("other", 5).unwrap();
    assert_eq!(b.get("other"), None);
    assert_eq!(b.get("z.other"), None);
}

#[test]
fn mirrored_writes_carry_the_initiator_token() {
    let (a, b) = pair();
    let (log, on_b) = recording();
    b.subscribe(event::CHANGE, Matcher::subtree("z"), on_b).detach();

    let handle = a.bridge("x", &b, "z");
    let token = handle.token().to_string();
    handle.detach();

    a.set("x.y", 2).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    let initiator = log[0]
        .extra
        .as_ref()
        .and_then(|extra| extra.get("initiator"))
        .and_then(Value::as_text)
        .map(str::to_string);
    assert_eq!(initiator, Some(token));
}

#[test]
fn cancel_tears_down_both_directions() {
    let (a, b) = pair();
    let handle = a.bridge("x", &b, "z");

    a.set("x.y", 2).unwrap();
    assert_eq!(b.get_int("z.y"), Some(2));

    handle.cancel();

    a.set("x.y", 5).unwrap();
    assert_eq!(b.get_int("z.y"), Some(2));
    b.set("z.y", 9).unwrap();
    assert_eq!(a.get_int("x.y"), Some(5));
}

#[test]
fn two_bridges_with_distinct_tokens_coexist() {
    let a = Store::from_json(r#"{"x": {"y": 1}, "p": {"q": 1}}"#).unwrap();
    let b = Store::from_json(r#"{"z": {"y": 1}}"#).unwrap();
    let c = Store::from_json(r#"{"r": {"q": 1}}"#).unwrap();

    let ab = a.bridge("x", &b, "z");
    let ac = a.bridge("p", &c, "r");
    assert_ne!(ab.token(), ac.token());
    ab.detach();
    ac.detach();

    a.set("x.y", 2).unwrap();
    a.set("p.q", 3).unwrap();
    assert_eq!(b.get_int("z.y"), Some(2));
    assert_eq!(c.get_int("r.q"), Some(3));
    assert_eq!(b.get("z.q"), None);
    assert_eq!(c.get("r.y"), None);
}

#[test]
fn equal_mirrored_value_does_not_echo() {
    // A value that is already equal on the peer side produces no "change"
    // there at all: the mirror write dispatches "set" only.
    let (a, b) = pair();
    let (count_b, on_b) = counting();
    b.subscribe(event::CHANGE, "z.y", on_b).detach();
    a.bridge("x", &b, "z").detach();

    // b already holds 1 at z.y
    a.set("x.y", 2).unwrap();
    assert_eq!(count_b.get(), 1);

    // Setting a to what b already has: a changes, b sees "set" only.
    b.set("z.y", 7).unwrap();
    a.set("x.y", 7).unwrap();
    assert_eq!(count_b.get(), 2);
    assert_eq!(b.get_int("z.y"), Some(7));
}
