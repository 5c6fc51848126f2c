//! Summary card: named sections filled with text, then confirmed.

use super::ControllerError;
use crate::widget_config::SummaryConfig;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Port carrying `{section: text}`.
pub const SECTIONS_PORT: &str = "sections";
/// Port carrying the confirmation flag.
pub const CONFIRMED_PORT: &str = "confirmed";

/// Section contents and confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryState {
    title: String,
    sections: Vec<String>,
    content: BTreeMap<String, String>,
    confirmed: bool,
}

impl SummaryState {
    /// All sections empty, unconfirmed.
    #[must_use]
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            title: config.title.clone(),
            sections: config.sections.clone(),
            content: BTreeMap::new(),
            confirmed: false,
        }
    }

    /// Text of a section, if filled.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&str> {
        self.content.get(name).map(String::as_str)
    }

    /// Check if the card was confirmed.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Fill a section.
    pub fn fill(mut self, section: &str, text: &str) -> Result<Self, ControllerError> {
        if self.confirmed {
            return Err(ControllerError::Confirmed);
        }
        if !self.sections.iter().any(|s| s == section) {
            return Err(ControllerError::UnknownItem(section.to_string()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ControllerError::EmptyText);
        }
        self.content.insert(section.to_string(), text.to_string());
        Ok(self)
    }

    /// Sections without content, in display order.
    #[must_use]
    pub fn missing(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| !self.content.contains_key(*s))
            .cloned()
            .collect()
    }

    /// Lock the card. Fails while any section is empty.
    pub fn confirm(mut self) -> Result<Self, ControllerError> {
        if self.confirmed {
            return Err(ControllerError::Confirmed);
        }
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ControllerError::Incomplete(missing));
        }
        self.confirmed = true;
        Ok(self)
    }

    /// Check if the card was confirmed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.confirmed
    }

    pub(super) fn hydrate(mut self, ports: &BTreeMap<String, Value>) -> Self {
        if let Some(Value::Object(values)) = ports.get(SECTIONS_PORT) {
            for section in &self.sections {
                if let Some(text) = values.get(section).and_then(Value::as_str)
                    && !text.trim().is_empty()
                {
                    self.content.insert(section.clone(), text.trim().to_string());
                }
            }
        }
        if let Some(Value::Bool(confirmed)) = ports.get(CONFIRMED_PORT) {
            self.confirmed = *confirmed && self.missing().is_empty();
        }
        self
    }

    pub(super) fn emissions(&self) -> BTreeMap<&'static str, Value> {
        let sections: Map<String, Value> = self
            .content
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        BTreeMap::from([
            (SECTIONS_PORT, Value::Object(sections)),
            (CONFIRMED_PORT, json!(self.confirmed)),
        ])
    }

    pub(super) fn summary(&self) -> String {
        let filled = self.sections.len().saturating_sub(self.missing().len());
        let title = if self.title.is_empty() {
            "Summary"
        } else {
            self.title.as_str()
        };
        let status = if self.confirmed { "confirmed" } else { "draft" };
        format!(
            "{} ({}): {}/{} sections",
            title,
            status,
            filled,
            self.sections.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SummaryState {
        SummaryState::new(&SummaryConfig {
            title: "Decision".to_string(),
            sections: vec!["Choice".to_string(), "Risks".to_string()],
        })
    }

    #[test]
    fn confirm_requires_all_sections() {
        let s = state().fill("Choice", "Ship it").expect("fill");
        assert_eq!(
            s.clone().confirm(),
            Err(ControllerError::Incomplete(vec!["Risks".to_string()]))
        );
        let s = s.fill("Risks", "Scope creep").and_then(SummaryState::confirm).expect("confirm");
        assert!(s.is_confirmed());
        assert_eq!(s.summary(), "Decision (confirmed): 2/2 sections");
        assert_eq!(s.fill("Choice", "Wait"), Err(ControllerError::Confirmed));
    }

    #[test]
    fn confirm_checks_configured_sections() {
        let card = SummaryState::new(&SummaryConfig::default());
        assert!(card.confirm().is_ok());
        assert_eq!(
            state().confirm(),
            Err(ControllerError::Incomplete(vec![
                "Choice".to_string(),
                "Risks".to_string()
            ]))
        );
    }

    #[test]
    fn fill_rejects_unknown_section() {
        assert_eq!(
            state().fill("Budget", "x"),
            Err(ControllerError::UnknownItem("Budget".to_string()))
        );
        assert_eq!(state().fill("Choice", "  "), Err(ControllerError::EmptyText));
    }

    #[test]
    fn hydrate_ignores_confirmation_of_incomplete_card() {
        let ports = BTreeMap::from([
            (SECTIONS_PORT.to_string(), json!({"Choice": "A"})),
            (CONFIRMED_PORT.to_string(), json!(true)),
        ]);
        let s = state().hydrate(&ports);
        assert_eq!(s.section("Choice"), Some("A"));
        assert!(!s.is_confirmed());
    }
}
