//! Component health reporting.

use serde::{Deserialize, Serialize};

/// Status of one wired component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded { detail: String },
    Unavailable { detail: String },
}

impl ComponentStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ComponentStatus::Healthy)
    }
}

/// One row of the health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    #[serde(flatten)]
    pub status: ComponentStatus,
}

/// The full health surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    /// Degraded overall when anything is not healthy.
    pub fn all_healthy(&self) -> bool {
        self.components.iter().all(|c| c.status.is_healthy())
    }
}
