//! Depth-first traversal.
//!
//! [`walk`] drives a [`Visitor`] over a tree: `enter` before a node's
//! children, `leave` after. Returning [`Flow::Skip`] from `enter` prunes the
//! subtree; [`Flow::Stop`] aborts the walk. The resolver and other
//! whole-tree passes are built on this.

use crate::Node;

/// Controls traversal from [`Visitor::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Descend into children.
    Continue,
    /// Do not descend; `leave` is still called for this node.
    Skip,
    /// Abort the entire walk.
    Stop,
}

/// A depth-first tree visitor.
pub trait Visitor {
    fn enter(&mut self, node: &Node) -> Flow;

    fn leave(&mut self, _node: &Node) {}
}

/// Walk `node` depth-first. Returns `false` if the visitor stopped early.
pub fn walk<V: Visitor>(node: &Node, visitor: &mut V) -> bool {
    match visitor.enter(node) {
        Flow::Stop => return false,
        Flow::Skip => {
            visitor.leave(node);
            return true;
        }
        Flow::Continue => {}
    }
    for child in node.children() {
        if !walk(child, visitor) {
            return false;
        }
    }
    visitor.leave(node);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Block, Label, Leave, Literal, LoopHead, LoopStmt};
    use squill_types::Span;

    struct Counter {
        entered: usize,
        left: usize,
        skip_loops: bool,
    }

    impl Visitor for Counter {
        fn enter(&mut self, node: &Node) -> Flow {
            self.entered += 1;
            if self.skip_loops && matches!(node, Node::Loop(_)) {
                Flow::Skip
            } else {
                Flow::Continue
            }
        }

        fn leave(&mut self, _node: &Node) {
            self.left += 1;
        }
    }

    fn sample() -> Node {
        let sp = Span::ZERO;
        let leave = Node::Leave(Leave {
            label: Label::new("outer", sp),
            span: sp,
        });
        let inner = Node::from(LoopStmt::new(LoopHead::Plain, vec![leave], sp));
        Node::Block(Block::new(
            vec![inner, Node::Literal(Literal::integer(1, sp))],
            sp,
        ))
    }

    #[test]
    fn enter_and_leave_pair_up() {
        let mut counter = Counter {
            entered: 0,
            left: 0,
            skip_loops: false,
        };
        assert!(walk(&sample(), &mut counter));
        assert_eq!(counter.entered, 4);
        assert_eq!(counter.left, 4);
    }

    #[test]
    fn skip_prunes_subtree() {
        let mut counter = Counter {
            entered: 0,
            left: 0,
            skip_loops: true,
        };
        assert!(walk(&sample(), &mut counter));
        // The LEAVE under the loop is never entered.
        assert_eq!(counter.entered, 3);
        assert_eq!(counter.left, 3);
    }
}
