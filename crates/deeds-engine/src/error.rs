use deeds_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by the round engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("need at least 2 members to assign deeds, found {found}")]
    InsufficientMembers { found: usize },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl EngineError {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::InsufficientMembers { .. } => "insufficient_members",
            EngineError::InvalidState(_) => "invalid_state",
            EngineError::NotAuthorized(_) => "not_authorized",
            EngineError::Conflict(_) => "conflict",
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::Store(_) => "internal",
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => EngineError::NotFound("record"),
            other => EngineError::Store(other),
        }
    }
}

/// Attach domain meaning to store results.
pub(crate) trait StoreResultExt<T> {
    /// `NotFound` becomes `EngineError::NotFound(what)`.
    fn or_not_found(self, what: &'static str) -> Result<T, EngineError>;

    /// Like [`or_not_found`](Self::or_not_found), and a lost compare-and-swap
    /// (`Conflict`) becomes `InvalidState(msg)`.
    fn or_lost_race(self, what: &'static str, msg: &str) -> Result<T, EngineError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn or_not_found(self, what: &'static str) -> Result<T, EngineError> {
        self.map_err(|e| match e {
            StoreError::NotFound => EngineError::NotFound(what),
            other => EngineError::Store(other),
        })
    }

    fn or_lost_race(self, what: &'static str, msg: &str) -> Result<T, EngineError> {
        self.map_err(|e| match e {
            StoreError::NotFound => EngineError::NotFound(what),
            StoreError::Conflict => EngineError::InvalidState(msg.to_string()),
            other => EngineError::Store(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(EngineError::NotFound("round").code(), "not_found");
        assert_eq!(
            EngineError::InsufficientMembers { found: 1 }.code(),
            "insufficient_members"
        );
        assert_eq!(EngineError::InvalidState("x".into()).code(), "invalid_state");
        assert_eq!(EngineError::NotAuthorized("x".into()).code(), "not_authorized");
        assert_eq!(EngineError::Conflict("x".into()).code(), "conflict");
        assert_eq!(EngineError::InvalidInput("x".into()).code(), "invalid_input");
        assert_eq!(
            EngineError::Store(StoreError::Backend("disk".into())).code(),
            "internal"
        );
    }

    #[test]
    fn store_errors_keep_context() {
        let r: Result<(), StoreError> = Err(StoreError::NotFound);
        assert!(matches!(r.or_not_found("group"), Err(EngineError::NotFound("group"))));

        let r: Result<(), StoreError> = Err(StoreError::Conflict);
        let err = r.or_lost_race("deed", "deed changed").unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(ref m) if m == "deed changed"));

        assert_eq!(
            EngineError::InsufficientMembers { found: 1 }.to_string(),
            "need at least 2 members to assign deeds, found 1"
        );
    }
}
