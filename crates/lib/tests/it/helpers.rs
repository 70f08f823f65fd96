use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use watchtree::{ChangeEvent, Store};

/// Creates a store shaped like a small IDE workspace.
pub fn sample_store() -> Store {
    Store::from_json(
        r#"{
            "editor": {"font": 13, "theme": "dark"},
            "panels": {"left": {"width": 300}, "right": {"width": 240}},
            "files": ["main.rs", "lib.rs"]
        }"#,
    )
    .expect("sample store json is valid")
}

/// Returns a counter and a handler that increments it on every event.
pub fn counting() -> (
    Rc<Cell<usize>>,
    impl Fn(&ChangeEvent) -> watchtree::Result<()> + 'static,
) {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    (count, move |_: &ChangeEvent| {
        seen.set(seen.get() + 1);
        Ok(())
    })
}

/// Returns a log and a handler that records every event it receives.
pub fn recording() -> (
    Rc<RefCell<Vec<ChangeEvent>>>,
    impl Fn(&ChangeEvent) -> watchtree::Result<()> + 'static,
) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |ev: &ChangeEvent| {
        sink.borrow_mut().push(ev.clone());
        Ok(())
    })
}
