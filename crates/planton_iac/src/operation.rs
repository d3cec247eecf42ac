//! Operations the engine can drive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A provisioning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Plan,
    Apply,
    Refresh,
    Destroy,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Plan => "plan",
            Operation::Apply => "apply",
            Operation::Refresh => "refresh",
            Operation::Destroy => "destroy",
        }
    }

    /// Parse an operation name or alias (`preview`, `update`, `delete`).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "init" => Some(Operation::Init),
            "plan" | "preview" => Some(Operation::Plan),
            "apply" | "update" | "up" => Some(Operation::Apply),
            "refresh" => Some(Operation::Refresh),
            "destroy" | "delete" => Some(Operation::Destroy),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Operation::Init,
            Operation::Plan,
            Operation::Apply,
            Operation::Refresh,
            Operation::Destroy,
        ]
    }

    /// Pulumi subcommand, or `None` for `init` (stack selection only).
    pub fn pulumi_command(&self) -> Option<&'static str> {
        match self {
            Operation::Init => None,
            Operation::Plan => Some("preview"),
            Operation::Apply => Some("up"),
            Operation::Refresh => Some("refresh"),
            Operation::Destroy => Some("destroy"),
        }
    }

    /// Operations that change infrastructure and prompt unless auto-approved.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Operation::Apply | Operation::Destroy)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
