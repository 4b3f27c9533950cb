use std::fmt;

/// Registry lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// No table exists; `initialize` has not run or `reset` completed
    #[default]
    Uninitialized,
    /// Table committed, awake hooks running
    Awakening,
    /// Every awake hook has returned, start hooks running
    Starting,
    /// Steady state, instances may be resolved
    Ready,
    /// Destroy hooks running
    Destroying,
}

impl LifecycleState {
    /// Check if startup has fully completed
    pub fn is_ready(&self) -> bool {
        matches!(self, LifecycleState::Ready)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Awakening => "awakening",
            LifecycleState::Starting => "starting",
            LifecycleState::Ready => "ready",
            LifecycleState::Destroying => "destroying",
        };
        write!(f, "{}", state)
    }
}
