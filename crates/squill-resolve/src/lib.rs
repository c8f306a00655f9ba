//! Label and condition resolution.
//!
//! A resolve pass walks a scripting tree with a stack of scope frames, one
//! per labeled (or unlabeled) block and loop. LEAVE and ITERATE bind
//! outward to the nearest enclosing frame with a matching label; ITERATE
//! additionally requires a loop. Condition declarations get block scope
//! regardless of their position in the body, and handler FOR lists and
//! SIGNAL/RESIGNAL values bind against them the same outward way.
//!
//! The pass never mutates the tree. Its output is a [`Resolution`]: bindings
//! keyed by the referencing node's span, plus every diagnostic found.
//! Callers that want fail-fast semantics use [`Resolution::into_result`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use squill_ast::{HandlerCondition, Ident, Label, Node, SignalValue};
use squill_error::{ErrorKind, SquillError};
use squill_types::{Span, SqlState, TypeSpec};
use tracing::{debug, trace};

// ─── Metrics ────────────────────────────────────────────────────────────

static RESOLVE_PASSES_TOTAL: AtomicU64 = AtomicU64::new(0);
static RESOLVE_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);
static UNRESOLVED_REFS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time view of the resolver counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveMetricsSnapshot {
    pub passes: u64,
    pub errors: u64,
    pub unresolved_refs: u64,
}

/// Read the process-wide resolver counters.
#[must_use]
pub fn metrics_snapshot() -> ResolveMetricsSnapshot {
    ResolveMetricsSnapshot {
        passes: RESOLVE_PASSES_TOTAL.load(Ordering::Relaxed),
        errors: RESOLVE_ERRORS_TOTAL.load(Ordering::Relaxed),
        unresolved_refs: UNRESOLVED_REFS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Zero the resolver counters (test support).
pub fn reset_metrics() {
    RESOLVE_PASSES_TOTAL.store(0, Ordering::Relaxed);
    RESOLVE_ERRORS_TOTAL.store(0, Ordering::Relaxed);
    UNRESOLVED_REFS_TOTAL.store(0, Ordering::Relaxed);
}

// ─── Output model ───────────────────────────────────────────────────────

/// What a LEAVE or ITERATE bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlTarget {
    Block { label: Label, span: Span },
    Loop { label: Label, span: Span },
}

impl ControlTarget {
    /// Span of the construct the reference bound to.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Block { span, .. } | Self::Loop { span, .. } => *span,
        }
    }
}

/// What a condition name bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionBinding {
    pub name: String,
    pub sqlstate: Option<SqlState>,
    /// Span of the DECLARE .. CONDITION.
    pub declared_at: Span,
}

/// One reported problem, serializable for structured logs.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub span: Span,
}

/// The result of one resolve pass over a tree.
///
/// Bindings are keyed by the referencing node's span, so every reference
/// must carry a distinct span. Trees synthesized with a shared placeholder
/// span (`Span::ZERO` everywhere) still resolve, but later lookups collide
/// on the shared key and return whichever binding was recorded last.
#[derive(Debug, Default)]
pub struct Resolution {
    targets: HashMap<Span, ControlTarget>,
    conditions: HashMap<Span, ConditionBinding>,
    handlers: HashMap<Span, Vec<Span>>,
    diagnostics: Vec<Diagnostic>,
    errors: Vec<SquillError>,
}

impl Resolution {
    /// The construct a LEAVE/ITERATE at `reference` bound to. Keyed by the
    /// reference's span, which therefore must be unique per reference.
    #[must_use]
    pub fn target_of(&self, reference: Span) -> Option<&ControlTarget> {
        self.targets.get(&reference)
    }

    /// The declaration a condition name at `reference` bound to. Keyed by
    /// the reference's span, which therefore must be unique per reference.
    #[must_use]
    pub fn condition_of(&self, reference: Span) -> Option<&ConditionBinding> {
        self.conditions.get(&reference)
    }

    /// Spans of the handler declarations attached to the scope whose
    /// construct spans `scope`.
    #[must_use]
    pub fn handlers_of(&self, scope: Span) -> &[Span] {
        self.handlers.get(&scope).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn errors(&self) -> &[SquillError] {
        &self.errors
    }

    /// Whether the pass found no problems.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail-fast view: the resolution itself, or the first error found.
    pub fn into_result(self) -> Result<Self, SquillError> {
        match self.errors.first() {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }
}

// ─── Type-resolution hook ───────────────────────────────────────────────

/// External service consulted for every type specification in the tree
/// (catalog lookups, product-specific limits). The default accepts all.
pub trait TypeResolver {
    fn resolve(&self, spec: &TypeSpec, span: Span) -> Result<(), SquillError>;
}

/// Accepts every specification.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllTypes;

impl TypeResolver for AcceptAllTypes {
    fn resolve(&self, _spec: &TypeSpec, _span: Span) -> Result<(), SquillError> {
        Ok(())
    }
}

// ─── The pass ───────────────────────────────────────────────────────────

/// Resolve `root` with no external type service.
#[must_use]
pub fn resolve(root: &Node) -> Resolution {
    resolve_with(root, &AcceptAllTypes)
}

/// Resolve `root`, consulting `types` for every type specification.
#[must_use]
pub fn resolve_with(root: &Node, types: &dyn TypeResolver) -> Resolution {
    RESOLVE_PASSES_TOTAL.fetch_add(1, Ordering::Relaxed);
    let mut pass = Pass {
        frames: Vec::new(),
        out: Resolution::default(),
        types,
    };
    pass.run(root);
    debug_assert!(pass.frames.is_empty());
    debug!(
        errors = pass.out.errors.len(),
        bindings = pass.out.targets.len(),
        "resolve pass complete"
    );
    pass.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Block,
    Loop,
}

struct Frame {
    kind: FrameKind,
    label: Option<Label>,
    span: Span,
    conditions: Vec<ConditionBinding>,
}

struct Pass<'t> {
    frames: Vec<Frame>,
    out: Resolution,
    types: &'t dyn TypeResolver,
}

impl Pass<'_> {
    fn run(&mut self, node: &Node) {
        match node {
            Node::Block(block) => {
                self.push_frame(FrameKind::Block, block.label.clone(), block.span);
                self.collect_conditions(&block.body);
                for stmt in &block.body {
                    self.run(stmt);
                }
                self.pop_frame();
            }
            Node::Loop(lp) => {
                self.push_frame(FrameKind::Loop, lp.label.clone(), lp.span);
                for child in node.children() {
                    self.run(child);
                }
                self.pop_frame();
            }
            Node::Leave(leave) => {
                self.bind_label(&leave.label, leave.span, true, "block or loop");
            }
            Node::Iterate(iterate) => {
                self.bind_label(&iterate.label, iterate.span, false, "loop");
            }
            Node::HandlerDecl(handler) => {
                if let Some(frame) = self.frames.last() {
                    self.out
                        .handlers
                        .entry(frame.span)
                        .or_default()
                        .push(handler.span);
                }
                for cond in &handler.conditions {
                    if let HandlerCondition::Named(name) = cond {
                        self.bind_condition(name);
                    }
                }
                self.run(&handler.body);
            }
            Node::Signal(signal) => {
                if let Some(SignalValue::Condition(name)) = &signal.value {
                    self.bind_condition(name);
                }
            }
            Node::TypeSpec(ts) => {
                if let Err(err) = self.types.resolve(&ts.spec, ts.span) {
                    self.report(err);
                }
            }
            // Declarations are registered when their block frame opens.
            Node::ConditionDecl(_) => {}
            _ => {
                for child in node.children() {
                    self.run(child);
                }
            }
        }
    }

    fn push_frame(&mut self, kind: FrameKind, label: Option<Label>, span: Span) {
        if let Some(label) = &label {
            trace!(label = %label, ?kind, "push scope");
            let shadowed = self
                .frames
                .iter()
                .any(|f| f.label.as_ref() == Some(label));
            if shadowed {
                self.report(SquillError::DuplicateDeclaration {
                    name: label.name.clone(),
                    span: label.span,
                });
            }
        }
        self.frames.push(Frame {
            kind,
            label,
            span,
            conditions: Vec::new(),
        });
    }

    fn pop_frame(&mut self) {
        let frame = self.frames.pop().unwrap_or_else(|| unreachable!());
        if let Some(label) = &frame.label {
            trace!(label = %label, "pop scope");
        }
    }

    /// Condition declarations anywhere in a block body are visible to the
    /// whole block, so they are gathered before the body is walked.
    fn collect_conditions(&mut self, body: &[Node]) {
        let mut seen: Vec<ConditionBinding> = Vec::new();
        for stmt in body {
            let Node::ConditionDecl(decl) = stmt else {
                continue;
            };
            let name = decl.name.name();
            if seen.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
                self.report(SquillError::DuplicateDeclaration {
                    name: name.to_owned(),
                    span: decl.span,
                });
                continue;
            }
            seen.push(ConditionBinding {
                name: name.to_owned(),
                sqlstate: decl.sqlstate,
                declared_at: decl.span,
            });
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.conditions = seen;
        }
    }

    fn bind_label(&mut self, label: &Label, reference: Span, allow_block: bool, wanted: &'static str) {
        let Some(index) = self
            .frames
            .iter()
            .rposition(|f| f.label.as_ref() == Some(label))
        else {
            UNRESOLVED_REFS_TOTAL.fetch_add(1, Ordering::Relaxed);
            self.report(SquillError::unresolved_label(
                wanted,
                label.name.clone(),
                reference,
            ));
            return;
        };
        let frame = &self.frames[index];
        let kind = frame.kind;
        let bound_label = frame.label.clone().unwrap_or_else(|| unreachable!());
        let target_span = frame.span;
        match kind {
            FrameKind::Loop => {
                self.out.targets.insert(
                    reference,
                    ControlTarget::Loop {
                        label: bound_label,
                        span: target_span,
                    },
                );
            }
            FrameKind::Block if allow_block => {
                self.out.targets.insert(
                    reference,
                    ControlTarget::Block {
                        label: bound_label,
                        span: target_span,
                    },
                );
            }
            FrameKind::Block => {
                self.report(SquillError::IterateTargetNotLoop {
                    label: label.name.clone(),
                    span: reference,
                });
            }
        }
    }

    fn bind_condition(&mut self, name: &Ident) {
        let wanted = name.name();
        for frame in self.frames.iter().rev() {
            if let Some(binding) = frame
                .conditions
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(wanted))
            {
                self.out.conditions.insert(name.span, binding.clone());
                return;
            }
        }
        UNRESOLVED_REFS_TOTAL.fetch_add(1, Ordering::Relaxed);
        self.report(SquillError::UnresolvedCondition {
            name: wanted.to_owned(),
            span: name.span,
        });
    }

    fn report(&mut self, err: SquillError) {
        RESOLVE_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
        self.out.diagnostics.push(Diagnostic {
            code: kind_code(err.kind()),
            message: err.to_string(),
            span: err.span(),
        });
        self.out.errors.push(err);
    }
}

const fn kind_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::MalformedLiteral => "malformed-literal",
        ErrorKind::LabelMismatch => "label-mismatch",
        ErrorKind::MutuallyExclusive => "mutually-exclusive",
        ErrorKind::ArityMismatch => "arity-mismatch",
        ErrorKind::UnresolvedReference => "unresolved-reference",
        ErrorKind::InvalidIterateTarget => "invalid-iterate-target",
        ErrorKind::DuplicateDeclaration => "duplicate-declaration",
        ErrorKind::TypeResolution => "type-resolution",
    }
}
