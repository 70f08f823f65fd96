use std::{cell::RefCell, rc::Rc};

use watchtree::{
    ChangeEvent, Matcher, PathBuf, Store, Value,
    store::event,
};

use crate::helpers::{counting, recording, sample_store};

#[test]
fn set_then_get_round_trip() {
    let store = Store::new();
    store.set("a.b.c", 42).unwrap();
    assert_eq!(store.get("a.b.c"), Some(Value::Int(42)));
    assert_eq!(store.get_int("a.b.c"), Some(42));
    assert!(store.contains_path("a.b"));
    assert!(!store.contains_path("a.x"));
}

#[test]
fn typed_getters() {
    let store = sample_store();
    assert_eq!(store.get_int("editor.font"), Some(13));
    assert_eq!(store.get_text("editor.theme"), Some("dark".to_string()));
    assert_eq!(store.get_text("files.0"), Some("main.rs".to_string()));
    assert_eq!(store.get_bool("editor.font"), None);
}

#[test]
fn set_fires_set_then_change() {
    let store = sample_store();
    let order = Rc::new(RefCell::new(Vec::new()));

    let sink = order.clone();
    store
        .subscribe(event::SET, "editor.font", move |_| {
            sink.borrow_mut().push("set");
            Ok(())
        })
        .detach();
    let sink = order.clone();
    store
        .subscribe(event::CHANGE, "editor.font", move |_| {
            sink.borrow_mut().push("change");
            Ok(())
        })
        .detach();

    store.set("editor.font", 15).unwrap();
    assert_eq!(*order.borrow(), vec!["set", "change"]);
}

#[test]
fn equal_assignment_fires_set_only() {
    let store = sample_store();
    let (sets, on_set) = counting();
    let (changes, on_change) = counting();
    store.subscribe(event::SET, "editor.font", on_set).detach();
    store
        .subscribe(event::CHANGE, "editor.font", on_change)
        .detach();

    store.set("editor.font", 13).unwrap();
    assert_eq!(sets.get(), 1);
    assert_eq!(changes.get(), 0);

    store.set("editor.font", 14).unwrap();
    assert_eq!(sets.get(), 2);
    assert_eq!(changes.get(), 1);
}

#[test]
fn set_handler_observes_value_before_commit() {
    let store = Store::from_json(r#"{"a": 1}"#).unwrap();
    let observed = Rc::new(RefCell::new(Vec::new()));

    let sink = observed.clone();
    let reader = store.clone();
    store
        .subscribe(event::SET, "a", move |_| {
            sink.borrow_mut().push(("set", reader.get_int("a")));
            Ok(())
        })
        .detach();
    let sink = observed.clone();
    let reader = store.clone();
    store
        .subscribe(event::CHANGE, "a", move |_| {
            sink.borrow_mut().push(("change", reader.get_int("a")));
            Ok(())
        })
        .detach();

    store.set("a", 2).unwrap();
    assert_eq!(
        *observed.borrow(),
        vec![("set", Some(1)), ("change", Some(2))]
    );
}

#[test]
fn deep_reactivity() {
    let store = Store::from_json(r#"{"a": {"b": 1}}"#).unwrap();
    let (log, on_change) = recording();
    store
        .subscribe(event::CHANGE, Matcher::subtree(""), on_change)
        .detach();

    store.set("a.b", 2).unwrap();
    {
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].path.as_str(), "a.b");
        assert_eq!(log[0].old_value, Some(Value::Int(1)));
        assert_eq!(log[0].new_value, Value::Int(2));
    }

    // Replace the container wholesale, then write into the replacement.
    let replacement = Store::from_json(r#"{"b": 5, "c": 6}"#).unwrap().data();
    store.set("a", replacement).unwrap();
    store.set("a.c", 7).unwrap();
    {
        let log = log.borrow();
        let last = log.last().unwrap();
        assert_eq!(last.path.as_str(), "a.c");
        assert_eq!(last.old_value, Some(Value::Int(6)));
        assert_eq!(last.new_value, Value::Int(7));
    }
}

#[test]
fn root_replacement_uses_empty_path() {
    let store = sample_store();
    let (log, on_change) = recording();
    store
        .subscribe(event::CHANGE, Matcher::exact(""), on_change)
        .detach();

    store.set_data(Value::Int(1)).unwrap();
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].path.is_empty());
    assert_eq!(log[0].new_value, Value::Int(1));
    assert_eq!(store.data(), Value::Int(1));
}

#[test]
fn predicate_matcher_filters_paths() {
    let store = Store::new();
    let (count, on_change) = counting();
    store
        .subscribe(
            event::CHANGE,
            Matcher::predicate(|path| path.as_str().starts_with("a.")),
            on_change,
        )
        .detach();

    store.set("a.b", 1).unwrap();
    store.set("a.c", 2).unwrap();
    store.set("a.b.d", 3).unwrap();
    store.set("x", 4).unwrap();
    assert_eq!(count.get(), 3);
}

#[test]
fn subtree_matcher_covers_descendants_and_itself() {
    let store = Store::new();
    let (count, on_change) = counting();
    store
        .subscribe(event::CHANGE, Matcher::subtree("a"), on_change)
        .detach();

    store.set("a", 1).unwrap();
    store.set("a.b", 2).unwrap();
    store.set("ab", 3).unwrap(); // sibling with a shared name prefix
    store.set("x", 4).unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn exact_matcher_ignores_descendants() {
    let store = Store::new();
    let (count, on_change) = counting();
    store
        .subscribe(event::CHANGE, "a", on_change)
        .detach();

    store.set("a", 1).unwrap();
    store.set("a.b", 2).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn delete_is_silent() {
    let store = sample_store();
    let (sets, on_set) = counting();
    let (changes, on_change) = counting();
    store
        .subscribe(event::SET, Matcher::subtree(""), on_set)
        .detach();
    store
        .subscribe(event::CHANGE, Matcher::subtree(""), on_change)
        .detach();

    let removed = store.remove("editor.font");
    assert_eq!(removed, Some(Value::Int(13)));
    assert_eq!(store.get("editor.font"), None);
    assert_eq!(sets.get(), 0);
    assert_eq!(changes.get(), 0);
}

#[test]
fn subscription_cancel_stops_delivery() {
    let store = Store::new();
    let (count, on_change) = counting();
    let subscription = store.subscribe(event::CHANGE, "a", on_change);

    store.set("a", 1).unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(store.listener_count(event::CHANGE), 1);

    assert!(subscription.cancel());
    store.set("a", 2).unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(store.listener_count(event::CHANGE), 0);
}

#[test]
fn listeners_fire_in_registration_order() {
    let store = Store::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for label in ["first", "second", "third"] {
        let sink = order.clone();
        store
            .subscribe(event::CHANGE, "a", move |_| {
                sink.borrow_mut().push(label);
                Ok(())
            })
            .detach();
    }

    store.set("a", 1).unwrap();
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn handler_error_aborts_remaining_handlers() {
    let store = Store::new();
    store
        .subscribe(event::CHANGE, "a", |_| {
            Err(watchtree::Error::listener("boom"))
        })
        .detach();
    let (count, on_change) = counting();
    store.subscribe(event::CHANGE, "a", on_change).detach();

    let err = store.set("a", 1).unwrap_err();
    assert!(err.is_listener_error());
    assert_eq!(count.get(), 0);

    // "change" fires after the commit, so the write itself stuck.
    assert_eq!(store.get_int("a"), Some(1));
}

#[test]
fn set_handler_error_prevents_commit() {
    let store = Store::from_json(r#"{"a": 1}"#).unwrap();
    store
        .subscribe(event::SET, "a", |_| Err(watchtree::Error::listener("no")))
        .detach();

    let err = store.set("a", 2).unwrap_err();
    assert!(err.is_listener_error());

    // "set" fires before the commit, so the old value survives.
    assert_eq!(store.get_int("a"), Some(1));
}

#[test]
fn self_write_trips_dispatch_cycle_guard() {
    let store = Store::new();
    let writer = store.clone();
    store
        .subscribe(event::CHANGE, "a", move |ev| {
            let bump = ev.new_value.as_int().unwrap_or_default() + 1;
            writer.set("a", bump)?;
            Ok(())
        })
        .detach();

    let err = store.set("a", 1).unwrap_err();
    assert!(err.is_dispatch_cycle());
}

#[test]
fn listener_writing_elsewhere_is_fine() {
    let store = Store::new();
    let writer = store.clone();
    store
        .subscribe(event::CHANGE, "a", move |ev| {
            writer.set("mirror", ev.new_value.clone())?;
            Ok(())
        })
        .detach();

    store.set("a", 7).unwrap();
    assert_eq!(store.get_int("mirror"), Some(7));
}

#[test]
fn custom_events_via_emit() {
    let store = Store::new();
    let (log, handler) = recording();
    store.subscribe("selection", "editor", handler).detach();

    let payload = ChangeEvent::new(
        PathBuf::normalize("editor"),
        None,
        Value::from("line:12"),
    );
    store.emit("selection", &payload).unwrap();
    store.emit("other", &payload).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].new_value, "line:12");
}

#[test]
fn extra_metadata_reaches_listeners_and_is_not_stored() {
    let store = Store::new();
    let (log, on_change) = recording();
    store
        .subscribe(event::CHANGE, Matcher::subtree(""), on_change)
        .detach();

    let mut meta = watchtree::Map::new();
    meta.insert("origin".to_string(), Value::from("renderer"));
    store
        .set_with("a", 1, Some(Value::Map(meta)))
        .unwrap();

    let log = log.borrow();
    let extra = log[0].extra.as_ref().unwrap();
    assert_eq!(extra.get("origin").unwrap(), "renderer");

    // The metadata never lands in the tree.
    assert_eq!(store.get("a"), Some(Value::Int(1)));
}

#[test]
fn scope_composes_absolute_paths() {
    let store = sample_store();
    let left = store.at("panels.left");
    let (log, on_change) = recording();
    store
        .subscribe(event::CHANGE, Matcher::subtree("panels"), on_change)
        .detach();

    left.set("width", 340).unwrap();
    assert_eq!(store.get_int("panels.left.width"), Some(340));
    assert_eq!(left.get("width"), Some(Value::Int(340)));
    assert_eq!(log.borrow()[0].path.as_str(), "panels.left.width");

    // Nested scopes keep composing.
    let width = left.at("width");
    assert_eq!(width.path().as_str(), "panels.left.width");
    assert_eq!(width.value(), Some(Value::Int(340)));
}

#[test]
fn scope_subscribe_covers_its_subtree() {
    let store = sample_store();
    let (count, on_change) = counting();
    store.at("panels").subscribe(event::CHANGE, on_change).detach();

    store.set("panels.left.width", 1).unwrap();
    store.set("editor.font", 20).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn raw_list_mutations_bypass_events() {
    let store = sample_store();
    let (sets, on_set) = counting();
    let (changes, on_change) = counting();
    store
        .subscribe(event::SET, Matcher::subtree(""), on_set)
        .detach();
    store
        .subscribe(event::CHANGE, Matcher::subtree(""), on_change)
        .detach();

    let files = store.raw_list("files").unwrap();
    files.push("mod.rs").unwrap();
    assert_eq!(files.len().unwrap(), 3);
    assert_eq!(store.get_text("files.2"), Some("mod.rs".to_string()));

    assert_eq!(files.pop_front().unwrap(), Some(Value::from("main.rs")));
    files.push_front("new.rs").unwrap();
    assert_eq!(files.pop().unwrap(), Some(Value::from("mod.rs")));

    assert_eq!(sets.get(), 0);
    assert_eq!(changes.get(), 0);

    // Indexed writes through the store stay tracked.
    store.set("files.0", "tracked.rs").unwrap();
    assert_eq!(sets.get(), 1);
    assert_eq!(changes.get(), 1);
}

#[test]
fn raw_list_requires_a_list() {
    let store = sample_store();
    let err = store.raw_list("editor").unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn escaped_segments_round_trip_through_store() {
    let store = Store::new();
    let path = PathBuf::new().push("open").push_segment("main.rs");
    let (log, on_change) = recording();
    store
        .subscribe(event::CHANGE, Matcher::subtree("open"), on_change)
        .detach();

    store.set(&path, true).unwrap();
    assert_eq!(store.get_bool(&path), Some(true));
    // No nested "main" map was created.
    assert_eq!(store.get("open.main"), None);
    assert_eq!(log.borrow()[0].path, path);
}

#[test]
fn set_returns_previous_value() {
    let store = Store::new();
    assert_eq!(store.set("a", 1).unwrap(), None);
    assert_eq!(store.set("a", 2).unwrap(), Some(Value::Int(1)));
}
