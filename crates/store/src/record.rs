use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One recorded state transition in an active model's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateLogEntry {
    /// Seconds since the Unix epoch. Non-decreasing within one model's log.
    pub timestamp: i64,
    pub old_state: String,
    pub state: String,
    pub action: String,
    pub result: String,
}

/// A runtime binding between a node and the policy that claimed it.
///
/// Created and extended exclusively by the provisioning engine; this service
/// reads and deletes whole records, never mutates the log in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveModel {
    pub uuid: String,
    /// The bound node. One node holds at most one live binding at a time.
    pub node_uuid: String,
    /// Uuid of the policy that created this binding.
    pub root_policy: String,
    /// Model template label shown in listings.
    #[serde(default)]
    pub label: String,
    /// Append-only transition history.
    #[serde(default)]
    pub state_log: Vec<StateLogEntry>,
}

impl ActiveModel {
    /// Current state, derived from the newest log entry.
    pub fn state(&self) -> &str {
        self.state_log
            .last()
            .map(|entry| entry.state.as_str())
            .unwrap_or("unbound")
    }

    /// Flat attribute view used for listings and attribute filtering.
    pub fn summary(&self) -> Value {
        json!({
            "uuid": self.uuid,
            "label": self.label,
            "node_uuid": self.node_uuid,
            "root_policy": self.root_policy,
            "state": self.state(),
        })
    }

    /// Full record view, including the raw state log.
    pub fn detail(&self) -> Value {
        json!({
            "uuid": self.uuid,
            "label": self.label,
            "node_uuid": self.node_uuid,
            "root_policy": self.root_policy,
            "state": self.state(),
            "state_log": self.state_log,
        })
    }
}

/// A managed node, addressable by its assigned uuid or its hardware id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub uuid: String,
    /// Hardware-level identifier (e.g. SMBIOS UUID). Stored uppercased.
    pub hw_id: String,
}

/// A provisioning policy; owns active models via `root_policy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub uuid: String,
    #[serde(default)]
    pub label: String,
}

/// Seed document for loading a store at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub active_models: Vec<ActiveModel>,
}
