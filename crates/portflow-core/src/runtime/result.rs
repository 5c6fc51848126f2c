//! Per-widget results handed to downstream analytics.

use crate::stage::Stage;
use crate::types::Score;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A direct port emission.
    Emit,
    /// An explicit confirmation.
    Confirm,
}

/// One recorded user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Runtime-wide ordering key.
    pub sequence: u64,
    /// Emission or confirmation.
    pub kind: InteractionKind,
    /// Port emitted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Value emitted; `null` for confirmations.
    #[serde(default)]
    pub value: Value,
}

/// Result metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Stage of the widget's definition.
    pub stage: Stage,
    /// Complexity of the widget's definition.
    pub complexity: Score,
    /// Number of recorded interactions.
    pub interaction_count: usize,
    /// `_completed.isCompleted`.
    pub completed: bool,
    /// `_error.hasError`.
    pub has_error: bool,
}

/// Snapshot of one widget's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetResult {
    /// Widget instance id.
    pub widget_id: String,
    /// Component type.
    pub component: String,
    /// Caller-supplied time of the snapshot, in milliseconds.
    pub timestamp: u64,
    /// One-line controller summary.
    pub summary: String,
    /// Non-reserved port values.
    pub data: BTreeMap<String, Value>,
    /// Interactions in order.
    pub interactions: Vec<Interaction>,
    /// Aggregates.
    pub metadata: ResultMetadata,
}
