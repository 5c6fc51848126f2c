//! Port value store.
//!
//! One entry per mounted widget, holding every declared and reserved port.
//! Entries are created on mount and dropped whole on unmount, so the store
//! never outgrows the set of mounted widgets.

use serde_json::Value;
use std::collections::BTreeMap;

/// Port values of every mounted widget.
#[derive(Debug, Clone, Default)]
pub struct PortStore {
    widgets: BTreeMap<String, BTreeMap<String, Value>>,
}

impl PortStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entry for a widget. Replaces any previous entry.
    pub fn insert_widget(&mut self, widget_id: &str, ports: BTreeMap<String, Value>) {
        self.widgets.insert(widget_id.to_string(), ports);
    }

    /// Drop a widget's entry, returning its last values.
    pub fn remove_widget(&mut self, widget_id: &str) -> Option<BTreeMap<String, Value>> {
        self.widgets.remove(widget_id)
    }

    /// Read one port.
    #[must_use]
    pub fn get(&self, widget_id: &str, port_id: &str) -> Option<&Value> {
        self.widgets.get(widget_id)?.get(port_id)
    }

    /// Write one port of an existing entry. Returns `false` if the port does
    /// not exist.
    pub fn set(&mut self, widget_id: &str, port_id: &str, value: Value) -> bool {
        match self
            .widgets
            .get_mut(widget_id)
            .and_then(|ports| ports.get_mut(port_id))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// All port values of a widget.
    #[must_use]
    pub fn ports(&self, widget_id: &str) -> Option<&BTreeMap<String, Value>> {
        self.widgets.get(widget_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_only_touches_existing_ports() {
        let mut store = PortStore::new();
        store.insert_widget("w", BTreeMap::from([("p".to_string(), Value::Null)]));
        assert!(store.set("w", "p", json!(3)));
        assert!(!store.set("w", "q", json!(3)));
        assert!(!store.set("x", "p", json!(3)));
        assert_eq!(store.get("w", "p"), Some(&json!(3)));
    }

    #[test]
    fn remove_drops_whole_entry() {
        let mut store = PortStore::new();
        store.insert_widget("w", BTreeMap::from([("p".to_string(), json!(1))]));
        assert!(store.ports("w").is_some());
        let last = store.remove_widget("w").expect("entry");
        assert_eq!(last.get("p"), Some(&json!(1)));
        assert!(store.ports("w").is_none());
        assert!(store.get("w", "p").is_none());
    }
}
