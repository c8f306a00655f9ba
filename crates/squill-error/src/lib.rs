//! Error taxonomy for squill.
//!
//! Every construction-time and validation-time failure in the workspace is
//! raised as a [`SquillError`], carrying the span of the offending node. The
//! `#[error]` attributes double as the parameterized message catalog: each
//! error kind owns one localizable template.
//!
//! Rendering does not appear here — rendering a well-formed tree never
//! fails, and frame-discipline violations in the writer are programming
//! errors that panic rather than propagate.

use squill_types::{Span, TypeSpecError};
use thiserror::Error;

/// Stable error-kind tags for programmatic matching and cataloguing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Numeric or length parameters violate the bounds table.
    MalformedLiteral,
    /// Begin/end labels unequal, or end label without begin label.
    LabelMismatch,
    /// Two options that cannot co-occur were both supplied.
    MutuallyExclusive,
    /// Operand count inconsistent with the operator's declared arity.
    ArityMismatch,
    /// A LEAVE/ITERATE/handler/condition reference has no enclosing target.
    UnresolvedReference,
    /// ITERATE bound to a construct that is not a loop.
    InvalidIterateTarget,
    /// The same label or condition declared twice in one scope.
    DuplicateDeclaration,
    /// The external type-resolution service rejected a specification.
    TypeResolution,
}

/// Primary error type for squill operations.
///
/// Construction-time variants abort the single construction call and carry
/// the offending span; validation-time variants are accumulated per resolve
/// pass (see `squill-resolve`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SquillError {
    // === Construction-time ===
    /// A parameterized type specification violated the bounds table.
    #[error("{source} at {span}")]
    MalformedTypeSpec {
        #[source]
        source: TypeSpecError,
        span: Span,
    },

    /// A literal's value is malformed for its declared type.
    #[error("malformed {what} literal '{value}' at {span}")]
    MalformedLiteral {
        what: &'static str,
        value: String,
        span: Span,
    },

    /// Begin and end labels on a block or loop do not match.
    #[error("end label '{end}' does not match begin label '{begin}' at {span}")]
    LabelMismatch {
        begin: String,
        end: String,
        span: Span,
    },

    /// An end label was supplied without a begin label.
    #[error("end label '{end}' without a begin label at {span}")]
    EndLabelWithoutBegin { end: String, span: Span },

    /// Operand count does not satisfy the operator's declared arity.
    #[error("operator {op} expects {expected} operand(s), got {actual} at {span}")]
    ArityMismatch {
        op: &'static str,
        expected: String,
        actual: usize,
        span: Span,
    },

    /// Two mutually exclusive options were both supplied.
    #[error("{first} cannot be combined with {second} at {span}")]
    MutuallyExclusive {
        first: String,
        second: String,
        span: Span,
    },

    // === Validation-time ===
    /// A label reference could not be bound to any enclosing scope.
    #[error("no enclosing {construct} labeled '{label}' at {span}")]
    UnresolvedLabel {
        construct: &'static str,
        label: String,
        span: Span,
    },

    /// ITERATE resolved to a plain block rather than a loop.
    #[error("ITERATE target '{label}' is not a loop at {span}")]
    IterateTargetNotLoop { label: String, span: Span },

    /// A SIGNAL/RESIGNAL or handler named a condition that is not declared
    /// in any visible scope.
    #[error("condition '{name}' is not declared in any enclosing scope at {span}")]
    UnresolvedCondition { name: String, span: Span },

    /// The same label appears on two nested constructs in scope, or the same
    /// condition is declared twice in one block.
    #[error("duplicate declaration of '{name}' at {span}")]
    DuplicateDeclaration { name: String, span: Span },

    /// The external type-resolution service rejected a node.
    #[error("type resolution failed for '{what}' at {span}: {detail}")]
    TypeResolution {
        what: String,
        detail: String,
        span: Span,
    },
}

impl SquillError {
    /// The stable kind tag for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedTypeSpec { .. } | Self::MalformedLiteral { .. } => {
                ErrorKind::MalformedLiteral
            }
            Self::LabelMismatch { .. } | Self::EndLabelWithoutBegin { .. } => {
                ErrorKind::LabelMismatch
            }
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::MutuallyExclusive { .. } => ErrorKind::MutuallyExclusive,
            Self::UnresolvedLabel { .. } | Self::UnresolvedCondition { .. } => {
                ErrorKind::UnresolvedReference
            }
            Self::IterateTargetNotLoop { .. } => ErrorKind::InvalidIterateTarget,
            Self::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            Self::TypeResolution { .. } => ErrorKind::TypeResolution,
        }
    }

    /// The span of the offending node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::MalformedTypeSpec { span, .. }
            | Self::MalformedLiteral { span, .. }
            | Self::LabelMismatch { span, .. }
            | Self::EndLabelWithoutBegin { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::MutuallyExclusive { span, .. }
            | Self::UnresolvedLabel { span, .. }
            | Self::IterateTargetNotLoop { span, .. }
            | Self::UnresolvedCondition { span, .. }
            | Self::DuplicateDeclaration { span, .. }
            | Self::TypeResolution { span, .. } => *span,
        }
    }

    /// Whether this error is raised at node construction time (as opposed
    /// to during the validation pass).
    #[must_use]
    pub const fn is_construction_time(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedLiteral
                | ErrorKind::LabelMismatch
                | ErrorKind::MutuallyExclusive
                | ErrorKind::ArityMismatch
        )
    }

    /// Attach a span to a bounds-table violation.
    #[must_use]
    pub const fn type_spec(source: TypeSpecError, span: Span) -> Self {
        Self::MalformedTypeSpec { source, span }
    }

    /// Create a label-mismatch error.
    pub fn label_mismatch(begin: impl Into<String>, end: impl Into<String>, span: Span) -> Self {
        Self::LabelMismatch {
            begin: begin.into(),
            end: end.into(),
            span,
        }
    }

    /// Create an unresolved-label error.
    pub fn unresolved_label(
        construct: &'static str,
        label: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnresolvedLabel {
            construct,
            label: label.into(),
            span,
        }
    }
}

/// Result type alias using [`SquillError`].
pub type Result<T> = std::result::Result<T, SquillError>;
