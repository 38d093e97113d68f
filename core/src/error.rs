//! Error taxonomy, §7. Distinguishes programmer bugs (fatal) from rule
//! refusals, stale targets, exhausted resources, generation failures, and
//! external failures — each propagates differently per §7's policy.

use std::sync::OnceLock;

/// The engine's error taxonomy. Variant names mirror §7's "by kind, not
/// type name" headings directly.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GameError {
    /// Invariant breach: out-of-bounds grid, invalid direction, missing
    /// race/kind lookup, negative counts. Never constructed for predicates
    /// that are documented as total (`in_bounds`, `scatter`, ...).
    #[error("invariant breach: {context}")]
    InvariantBreach { context: String },

    /// All generation retries exhausted for a profile.
    #[error("generation failed for profile {profile}: {reason}")]
    GenerationFailed {
        profile: &'static str,
        reason: String,
    },

    /// Action disallowed by game rules. Consumes no energy; always
    /// user-facing.
    #[error("{message}")]
    RuleRefusal { message: String },

    /// A previously-acquired target has died or moved since acquisition.
    #[error("target is no longer valid")]
    StaleTarget,

    /// A bounded resource (object stack, monster table, ...) is full.
    #[error("resource exhausted: {what}")]
    ResourceExhausted { what: &'static str },

    /// The perimeter (network, disk) reported a failure unrelated to game
    /// rules.
    #[error("external failure: {detail}")]
    ExternalFailure { detail: String },
}

pub type GameResult<T> = Result<T, GameError>;

static INVARIANT_DUMPED: OnceLock<()> = OnceLock::new();

/// Report an invariant breach per §7: fatal (panic) when debug assertions
/// are enabled, logged with at most one dump per session otherwise.
///
/// Always returns a [`GameError::InvariantBreach`] so call sites that must
/// keep running in release builds (instead of unwinding) can propagate it
/// as an ordinary error.
#[track_caller]
pub fn invariant_breach(context: impl Into<String>) -> GameError {
    let context = context.into();
    if cfg!(debug_assertions) {
        panic!("invariant breach: {context}");
    }
    if INVARIANT_DUMPED.set(()).is_ok() {
        log::error!("invariant breach (first of session, further breaches are logged only): {context}");
    } else {
        log::error!("invariant breach: {context}");
    }
    GameError::InvariantBreach { context }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_refusal_carries_message() {
        let err = GameError::RuleRefusal {
            message: "no target selected".into(),
        };
        assert_eq!(err.to_string(), "no target selected");
    }
}
