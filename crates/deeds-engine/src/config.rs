use std::str::FromStr;

/// How a giver's claim of completion is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// The claim completes the deed immediately.
    Direct,
    /// The claim is submitted and waits for the recipient to approve or reject.
    #[default]
    Verified,
}

/// Error type for parsing CompletionPolicy from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCompletionPolicyError(pub String);

impl std::fmt::Display for ParseCompletionPolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid completion policy: {} (expected 'direct' or 'verified')",
            self.0
        )
    }
}

impl std::error::Error for ParseCompletionPolicyError {}

impl FromStr for CompletionPolicy {
    type Err = ParseCompletionPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(CompletionPolicy::Direct),
            "verified" => Ok(CompletionPolicy::Verified),
            _ => Err(ParseCompletionPolicyError(s.to_string())),
        }
    }
}

impl CompletionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionPolicy::Direct => "direct",
            CompletionPolicy::Verified => "verified",
        }
    }
}

/// Engine behaviour knobs.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub completion_policy: CompletionPolicy,
    /// Let the group owner approve or reject deeds in addition to the recipient.
    pub owner_can_verify: bool,
}
