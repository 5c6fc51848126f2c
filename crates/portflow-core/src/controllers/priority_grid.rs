//! Priority slider grid: one bounded slider per item, ranked by value.

use super::ControllerError;
use crate::widget_config::PriorityGridConfig;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// Port carrying `{item: value}`.
pub const PRIORITIES_PORT: &str = "priorities";
/// Port carrying item names, highest priority first.
pub const RANKING_PORT: &str = "ranking";

/// Slider values per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityGridState {
    items: Vec<String>,
    values: BTreeMap<String, i64>,
    touched: BTreeSet<String>,
    min: i64,
    max: i64,
}

impl PriorityGridState {
    /// Every item at the slider minimum.
    #[must_use]
    pub fn new(config: &PriorityGridConfig) -> Self {
        Self {
            items: config.items.clone(),
            values: config.items.iter().map(|i| (i.clone(), config.min)).collect(),
            touched: BTreeSet::new(),
            min: config.min,
            max: config.max,
        }
    }

    /// Value of one item.
    #[must_use]
    pub fn priority(&self, item: &str) -> Option<i64> {
        self.values.get(item).copied()
    }

    /// Set one item's slider.
    pub fn set_priority(mut self, item: &str, value: i64) -> Result<Self, ControllerError> {
        if !self.values.contains_key(item) {
            return Err(ControllerError::UnknownItem(item.to_string()));
        }
        if value < self.min || value > self.max {
            return Err(ControllerError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        self.values.insert(item.to_string(), value);
        self.touched.insert(item.to_string());
        Ok(self)
    }

    /// Items by descending value; ties keep display order.
    #[must_use]
    pub fn ranking(&self) -> Vec<&str> {
        let mut ranked: Vec<(usize, &str, i64)> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (i, item.as_str(), self.values.get(item).copied().unwrap_or(self.min)))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(_, item, _)| item).collect()
    }

    /// Check if every slider was set at least once.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| self.touched.contains(i))
    }

    pub(super) fn hydrate(mut self, ports: &BTreeMap<String, Value>) -> Self {
        if let Some(Value::Object(values)) = ports.get(PRIORITIES_PORT) {
            for (item, value) in values {
                if let Some(v) = value.as_i64() {
                    self = match self.clone().set_priority(item, v) {
                        Ok(next) => next,
                        Err(_) => self,
                    };
                }
            }
        }
        self
    }

    pub(super) fn emissions(&self) -> BTreeMap<&'static str, Value> {
        let priorities: Map<String, Value> = self
            .items
            .iter()
            .map(|i| (i.clone(), json!(self.values.get(i).copied().unwrap_or(self.min))))
            .collect();
        BTreeMap::from([
            (PRIORITIES_PORT, Value::Object(priorities)),
            (RANKING_PORT, json!(self.ranking())),
        ])
    }

    pub(super) fn summary(&self) -> String {
        match self.ranking().first() {
            Some(top) if !self.touched.is_empty() => format!(
                "Top priority: {} ({})",
                top,
                self.values.get(*top).copied().unwrap_or(self.min)
            ),
            _ => "No priorities set".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PriorityGridState {
        PriorityGridState::new(&PriorityGridConfig {
            items: vec!["cost".to_string(), "speed".to_string(), "risk".to_string()],
            min: 0,
            max: 10,
        })
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let s = state()
            .set_priority("risk", 7)
            .and_then(|s| s.set_priority("cost", 3))
            .and_then(|s| s.set_priority("speed", 3))
            .expect("set");
        assert_eq!(s.ranking(), vec!["risk", "cost", "speed"]);
        assert!(s.is_complete());
        assert_eq!(s.summary(), "Top priority: risk (7)");
    }

    #[test]
    fn rejects_unknown_and_out_of_range() {
        assert_eq!(
            state().set_priority("morale", 1),
            Err(ControllerError::UnknownItem("morale".to_string()))
        );
        assert!(matches!(
            state().set_priority("cost", 11),
            Err(ControllerError::OutOfRange { value: 11, .. })
        ));
    }

    #[test]
    fn hydrate_skips_invalid_values() {
        let ports = BTreeMap::from([(
            PRIORITIES_PORT.to_string(),
            json!({"cost": 9, "speed": 99, "ghost": 1}),
        )]);
        let s = state().hydrate(&ports);
        assert_eq!(s.priority("cost"), Some(9));
        assert_eq!(s.priority("speed"), Some(0));
        assert!(!s.is_complete());
        assert_eq!(s.emissions().get(RANKING_PORT), Some(&json!(["cost", "speed", "risk"])));
    }
}
