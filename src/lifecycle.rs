//! Endpoint hook outcome.
//!
//! Every endpoint may carry an `on_process` hook (see
//! [`Endpoint::on_process`](crate::Endpoint::on_process)). It runs after the
//! signal is extracted and before the branch handler, and answers with a
//! [`HookAction`].
//!
//! # Dispatch pipeline
//!
//! When a URL is proceeded, the router executes steps in this order:
//!
//! 1. **Resolve**: pick the endpoint and branch ([`resolve`](crate::resolve))
//! 2. **Extract**: build the [`Signal`](crate::Signal)
//! 3. **`on_process`**: endpoint hook; may halt with a result
//! 4. **Preprocessor / processor**: wrap the handler call ([`middleware`](crate::middleware))
//! 5. **Handler**: the branch or terminal handler itself

/// Result of an endpoint's `on_process` hook.
///
/// # Example
///
/// ```
/// use neuro_router::HookAction;
///
/// let action: HookAction<&str> = HookAction::halt("login required");
/// assert!(action.is_halt());
/// assert_eq!(action.into_result(), Some("login required"));
///
/// let action: HookAction<&str> = HookAction::Continue;
/// assert!(action.is_continue());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction<R> {
    /// Run the branch handler.
    Continue,

    /// Stop dispatch; `proceed` returns this value and no handler runs.
    Halt(R),
}

impl<R> HookAction<R> {
    /// Halt dispatch with `result`.
    pub fn halt(result: R) -> Self {
        Self::Halt(result)
    }

    /// Check if dispatch continues to the handler.
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if dispatch stops here.
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }

    /// The halt result, if any.
    pub fn into_result(self) -> Option<R> {
        match self {
            Self::Halt(result) => Some(result),
            Self::Continue => None,
        }
    }
}

impl<R> Default for HookAction<R> {
    fn default() -> Self {
        Self::Continue
    }
}

// ============================================================================
// Tests
// ============================================================================
