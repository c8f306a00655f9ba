//! SQL syntax trees with canonical rendering and scripting-label
//! resolution.
//!
//! This facade re-exports the workspace crates:
//!
//! - [`types`] — spans, SQLSTATEs, and the bounds-checked type
//!   specifications.
//! - [`error`] — the span-carrying error taxonomy.
//! - [`ast`] — the node union, operator registry, structural equality, and
//!   traversal.
//! - [`render`] — the precedence-aware unparser and the dialect seam.
//! - [`resolve`] — LEAVE/ITERATE and condition binding over scripting
//!   trees.
//!
//! ```
//! use squill::ast::{Call, Ident, Literal, Node, ops};
//! use squill::render::to_sql;
//! use squill::types::Span;
//!
//! let sp = Span::ZERO;
//! let cmp = Call::binary(
//!     &ops::EQ,
//!     Node::Ident(Ident::simple("id", sp)),
//!     Node::Literal(Literal::integer(7, sp)),
//!     sp,
//! )
//! .unwrap();
//! assert_eq!(to_sql(&Node::Call(cmp)), "id = 7");
//! ```

pub use squill_ast as ast;
pub use squill_error as error;
pub use squill_render as render;
pub use squill_resolve as resolve;
pub use squill_types as types;

pub use squill_error::{Result, SquillError};
