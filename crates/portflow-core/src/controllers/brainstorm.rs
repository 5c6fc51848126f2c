//! Brainstorm: an ordered list of unique free-text ideas.

use super::ControllerError;
use crate::widget_config::BrainstormConfig;
use serde_json::Value;
use std::collections::BTreeMap;

/// Port carrying the idea list.
pub const ITEMS_PORT: &str = "items";

/// Ideas collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainstormState {
    items: Vec<String>,
    min_items: usize,
    max_items: usize,
}

impl BrainstormState {
    /// Empty list with the config's bounds.
    #[must_use]
    pub fn new(config: &BrainstormConfig) -> Self {
        Self {
            items: Vec::new(),
            min_items: config.min_items,
            max_items: config.max_items,
        }
    }

    /// Ideas in entry order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Append an idea.
    pub fn add(mut self, text: &str) -> Result<Self, ControllerError> {
        let text = self.accept(text, None)?;
        if self.items.len() >= self.max_items {
            return Err(ControllerError::Full {
                max: self.max_items,
            });
        }
        self.items.push(text);
        Ok(self)
    }

    /// Remove the idea at `index`.
    pub fn remove(mut self, index: usize) -> Result<Self, ControllerError> {
        self.check_index(index)?;
        self.items.remove(index);
        Ok(self)
    }

    /// Replace the idea at `index`.
    pub fn edit(mut self, index: usize, text: &str) -> Result<Self, ControllerError> {
        self.check_index(index)?;
        let text = self.accept(text, Some(index))?;
        if let Some(slot) = self.items.get_mut(index) {
            *slot = text;
        }
        Ok(self)
    }

    /// Check if enough ideas were collected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.items.len() >= self.min_items
    }

    pub(super) fn hydrate(mut self, ports: &BTreeMap<String, Value>) -> Self {
        if let Some(Value::Array(values)) = ports.get(ITEMS_PORT) {
            self.items = values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .take(self.max_items)
                .collect();
        }
        self
    }

    pub(super) fn emissions(&self) -> BTreeMap<&'static str, Value> {
        let items = self.items.iter().cloned().map(Value::String).collect();
        BTreeMap::from([(ITEMS_PORT, Value::Array(items))])
    }

    pub(super) fn summary(&self) -> String {
        match self.items.len() {
            0 => "No ideas yet".to_string(),
            1 => format!("1 idea: {}", self.items.join(", ")),
            n => format!("{} ideas: {}", n, self.items.join(", ")),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), ControllerError> {
        if index >= self.items.len() {
            return Err(ControllerError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    /// Trim and reject empty or duplicate text, ignoring the slot being edited.
    fn accept(&self, text: &str, editing: Option<usize>) -> Result<String, ControllerError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyText);
        }
        let duplicate = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| Some(i) != editing && item.eq_ignore_ascii_case(text));
        if duplicate {
            return Err(ControllerError::DuplicateItem(text.to_string()));
        }
        Ok(text.to_string())
    }
}
