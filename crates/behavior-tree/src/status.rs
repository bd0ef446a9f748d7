//! Status returned by ticking a node.

/// The outcome of advancing a node by one control cycle.
///
/// # Cycle Semantics
///
/// A tick never blocks. Long-running work spreads itself over several cycles
/// by reporting [`Status::Executing`] until it is done:
/// - Composites fold their children's outcomes into one of these values
/// - Leaves report whatever their `execute` step produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    /// The node is not done yet; tick it again next cycle.
    Executing,

    /// The node completed.
    ///
    /// A finished node should be reset before it is expected to qualify
    /// from the start again.
    Finished,

    /// The node ended abnormally.
    ///
    /// No built-in node produces this on its own. It is reserved for
    /// caller-defined leaves and is propagated unchanged by composites.
    ErrorTransition,
}

impl Status {
    /// Returns `true` if this status is `Executing`.
    #[inline]
    pub fn is_executing(self) -> bool {
        matches!(self, Status::Executing)
    }

    /// Returns `true` if this status is `Finished`.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Finished)
    }

    /// Returns `true` if this status is `ErrorTransition`.
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Status::ErrorTransition)
    }

    /// Returns `true` for any status that ends the current activation.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_executing()
    }
}
