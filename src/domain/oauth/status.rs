//! OAuth flow status state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle of one login handshake.
///
/// ```text
/// Idle ──initiate──► AwaitingCallback ──match──► Completed
///   │                  │   ▲                         │
///   │                  │   └──────── initiate ◄──────┤
///   └──────────────────┴──mismatch/error──► Failed ──┘
/// ```
///
/// `AwaitingCallback` survives the page reload: it is recovered from the
/// persisted state token. A new initiation from any state restarts the flow
/// (last initiation wins). A replayed or forged callback fails from any state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthFlowStatus {
    #[default]
    Idle,
    AwaitingCallback,
    Completed,
    Failed,
}

impl StateMachine for OAuthFlowStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OAuthFlowStatus::*;
        match self {
            Idle => vec![AwaitingCallback, Failed],
            AwaitingCallback => vec![AwaitingCallback, Completed, Failed],
            Completed => vec![AwaitingCallback, Failed],
            Failed => vec![AwaitingCallback, Failed],
        }
    }
}
