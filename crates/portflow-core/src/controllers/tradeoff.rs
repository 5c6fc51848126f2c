//! Tradeoff balance: a single 0..=100 slider between two labelled poles.

use super::ControllerError;
use crate::widget_config::TradeoffConfig;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Port carrying the balance.
pub const BALANCE_PORT: &str = "balance";
/// Port carrying the label the balance leans toward.
pub const LEANING_PORT: &str = "leaning";

const MIDPOINT: u8 = 50;
const MAX_BALANCE: u8 = 100;

/// Slider position and pole labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeoffState {
    balance: u8,
    left_label: String,
    right_label: String,
    moved: bool,
}

impl TradeoffState {
    /// Slider at the configured initial balance.
    #[must_use]
    pub fn new(config: &TradeoffConfig) -> Self {
        Self {
            balance: config.initial_balance.min(MAX_BALANCE),
            left_label: config.left_label.clone(),
            right_label: config.right_label.clone(),
            moved: false,
        }
    }

    /// Current balance; 0 is fully left, 100 fully right.
    #[must_use]
    pub fn balance(&self) -> u8 {
        self.balance
    }

    /// Move the slider to an absolute position.
    pub fn set(mut self, value: i64) -> Result<Self, ControllerError> {
        let balance = u8::try_from(value)
            .ok()
            .filter(|b| *b <= MAX_BALANCE)
            .ok_or(ControllerError::OutOfRange {
                value,
                min: 0,
                max: i64::from(MAX_BALANCE),
            })?;
        self.balance = balance;
        self.moved = true;
        Ok(self)
    }

    /// Move the slider by `delta`, clamped to the ends.
    #[must_use]
    pub fn nudge(mut self, delta: i64) -> Self {
        let next = i64::from(self.balance)
            .saturating_add(delta)
            .clamp(0, i64::from(MAX_BALANCE));
        self.balance = u8::try_from(next).unwrap_or(MAX_BALANCE);
        self.moved = true;
        self
    }

    /// Label of the side the balance leans toward, or `None` at the midpoint.
    #[must_use]
    pub fn leaning(&self) -> Option<&str> {
        match self.balance.cmp(&MIDPOINT) {
            std::cmp::Ordering::Less => Some(&self.left_label),
            std::cmp::Ordering::Greater => Some(&self.right_label),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Check if the slider was moved at least once.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.moved
    }

    pub(super) fn hydrate(mut self, ports: &BTreeMap<String, Value>) -> Self {
        if let Some(b) = ports
            .get(BALANCE_PORT)
            .and_then(Value::as_u64)
            .and_then(|b| u8::try_from(b).ok())
            .filter(|b| *b <= MAX_BALANCE)
        {
            self.moved = b != self.balance;
            self.balance = b;
        }
        self
    }

    pub(super) fn emissions(&self) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            (BALANCE_PORT, json!(self.balance)),
            (LEANING_PORT, self.leaning().map_or(Value::Null, |l| json!(l))),
        ])
    }

    pub(super) fn summary(&self) -> String {
        match self.leaning() {
            Some(label) => format!("Leans toward {} ({}/100)", label, self.balance),
            None => format!(
                "Balanced between {} and {}",
                self.left_label, self.right_label
            ),
        }
    }
}
