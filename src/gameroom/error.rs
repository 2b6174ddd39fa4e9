/// Failures of a wait on the message exchange router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A second waiter tried to register for a type that already has one.
    /// Two concurrent waits were scheduled; the waiting task must stop.
    DuplicateWait(String),
    /// Nothing matching arrived before the deadline.
    TimedOut,
    /// The wait was withdrawn, e.g. because the client disconnected.
    Cancelled,
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateWait(kind) => write!(f, "duplicate wait for <{}>", kind),
            Self::TimedOut => write!(f, "wait timed out"),
            Self::Cancelled => write!(f, "wait cancelled"),
        }
    }
}

impl std::error::Error for RouterError {}

/// Client input that cannot be applied to the current table state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not receivable right now. Answered with `err`.
    Violation(String),
    /// Belongs to a round or call window that has already closed. Dropped.
    Stale { round: u32 },
}

impl ProtocolError {
    pub fn violation(reason: impl Into<String>) -> Self {
        Self::Violation(reason.into())
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Violation(reason) => write!(f, "{}", reason),
            Self::Stale { round } => write!(f, "stale message for round {}", round),
        }
    }
}

impl std::error::Error for ProtocolError {}
