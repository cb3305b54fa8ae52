//! Lifecycle states of a reader session.

use std::fmt;

/// State of the session owned by the active transaction.
///
/// `Idle` is the only entry state and `Terminated` the only exit state.
/// Every failure and cancellation passes through `Finalizing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session has been requested yet.
    Idle,
    /// Polling for tags.
    Discovering,
    /// Connecting to the single discovered tag.
    Connecting,
    /// Asking the tag whether it can be read and written.
    QueryingCapability,
    /// Running the request's step sequence.
    Executing,
    /// Invalidating the session and reporting the outcome.
    Finalizing,
    /// The session is gone.
    Terminated,
}

impl SessionState {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// # Examples
    /// ```
    /// use tag_engine::domain::SessionState;
    ///
    /// assert!(SessionState::Discovering.can_transition_to(SessionState::Discovering));
    /// assert!(!SessionState::Executing.can_transition_to(SessionState::Connecting));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Discovering, Self::Discovering)
                | (Self::Discovering, Self::Connecting)
                | (Self::Connecting, Self::QueryingCapability)
                | (Self::QueryingCapability, Self::Executing)
                | (
                    Self::Idle
                        | Self::Discovering
                        | Self::Connecting
                        | Self::QueryingCapability
                        | Self::Executing,
                    Self::Finalizing
                )
                | (Self::Finalizing, Self::Terminated)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Connecting => "connecting",
            Self::QueryingCapability => "querying_capability",
            Self::Executing => "executing",
            Self::Finalizing => "finalizing",
            Self::Terminated => "terminated",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::{
        self, Connecting, Discovering, Executing, Finalizing, Idle, QueryingCapability, Terminated,
    };
    use rstest::rstest;

    #[rstest]
    #[case(Idle, Discovering)]
    #[case(Discovering, Discovering)]
    #[case(Discovering, Connecting)]
    #[case(Connecting, QueryingCapability)]
    #[case(QueryingCapability, Executing)]
    #[case(Idle, Finalizing)]
    #[case(Discovering, Finalizing)]
    #[case(Connecting, Finalizing)]
    #[case(QueryingCapability, Finalizing)]
    #[case(Executing, Finalizing)]
    #[case(Finalizing, Terminated)]
    fn legal_transitions_are_accepted(#[case] from: SessionState, #[case] to: SessionState) {
        assert!(from.can_transition_to(to));
    }

    #[rstest]
    #[case(Idle, Connecting)]
    #[case(Idle, Terminated)]
    #[case(Discovering, Executing)]
    #[case(Connecting, Discovering)]
    #[case(Executing, Executing)]
    #[case(Finalizing, Finalizing)]
    #[case(Terminated, Idle)]
    #[case(Terminated, Discovering)]
    fn illegal_transitions_are_rejected(#[case] from: SessionState, #[case] to: SessionState) {
        assert!(!from.can_transition_to(to));
    }
}
