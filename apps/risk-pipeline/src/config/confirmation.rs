//! Manual confirmation policy.

use serde::{Deserialize, Serialize};

/// Which actions require a human in the loop.
///
/// `emergency_actions_manual` is mandatory for a certifiable config: an
/// emergency stop must never auto-resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    /// Require manual confirmation for the first trades of a deployment.
    #[serde(default = "default_first_n_trades_manual")]
    pub first_n_trades_manual: bool,
    /// Require manual confirmation to clear an emergency stop.
    #[serde(default = "default_emergency_actions_manual")]
    pub emergency_actions_manual: bool,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            first_n_trades_manual: default_first_n_trades_manual(),
            emergency_actions_manual: default_emergency_actions_manual(),
        }
    }
}

const fn default_first_n_trades_manual() -> bool {
    true
}

const fn default_emergency_actions_manual() -> bool {
    true
}
