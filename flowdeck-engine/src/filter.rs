//! Filter predicates and the external-compiler seam.

use std::sync::Arc;

use thiserror::Error;

use crate::entity::Entity;

/// A compiled filter predicate.
///
/// The filter mini-language and its parser are external collaborators; the
/// engine consumes only the compiled function.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A filter expression the external compiler rejected.
///
/// The previously active predicate stays in effect when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter {expr:?}: {message}")]
pub struct FilterError {
    /// The rejected expression.
    pub expr: String,
    /// The compiler's diagnostic.
    pub message: String,
}

impl FilterError {
    /// Create a new filter error.
    pub fn new(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            message: message.into(),
        }
    }
}

/// Compiles filter expressions into predicates.
pub trait FilterCompiler<T: Entity> {
    /// Compile an expression, or report why it is invalid.
    fn compile(&self, expr: &str) -> Result<Predicate<T>, FilterError>;
}

/// The default predicate: accept every entity.
pub fn accept_all<T: Entity>() -> Predicate<T> {
    Arc::new(|_| true)
}
