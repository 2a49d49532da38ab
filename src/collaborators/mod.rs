//! External collaborators reachable from request handlers.
//!
//! The bridge depends only on the narrow traits defined here. The in-process
//! implementations ([`ConsciousnessMatrix`], [`KeywordGovernor`]) let the
//! binary run standalone; richer implementations can be swapped in through
//! [`Collaborators`].

pub mod consciousness;
pub mod ethics;

use std::sync::Arc;

pub use consciousness::{ConsciousnessMatrix, ConsciousnessTracker};
pub use ethics::{Decision, EthicalDecision, EthicalGovernor, KeywordGovernor, Severity};

/// The set of collaborators shared by the router's handlers.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub consciousness: Arc<dyn ConsciousnessTracker>,
    pub ethics: Arc<dyn EthicalGovernor>,
}

impl Collaborators {
    pub fn new(
        consciousness: Arc<dyn ConsciousnessTracker>,
        ethics: Arc<dyn EthicalGovernor>,
    ) -> Self {
        Self {
            consciousness,
            ethics,
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::new(
            Arc::new(ConsciousnessMatrix::new()),
            Arc::new(KeywordGovernor::default()),
        )
    }
}
