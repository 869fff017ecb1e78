//! Traversal state over a DOM tree for a single parse.
//!
//! The cursor keeps a stack of frames, one per entered element. Each frame
//! remembers which of the element's children have been consumed, so child
//! slots are read front-to-back in schema order. A cursor belongs to exactly
//! one parse operation.

use crate::dom::{Element, Node};
use crate::error::{Result, XmlError};

/// Default limit on element nesting during a parse.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Frame<'a> {
    element: &'a Element,
    /// Index into `element.children` of the first unconsumed node.
    next: usize,
}

/// A saved cursor position, used to undo a failed choice attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    depth: usize,
    next: usize,
}

/// Stack-based cursor over a borrowed DOM tree.
#[derive(Debug)]
pub struct DomCursor<'a> {
    stack: Vec<Frame<'a>>,
    max_depth: usize,
}

impl<'a> DomCursor<'a> {
    /// Create a cursor positioned on `root`.
    pub fn new(root: &'a Element) -> Self {
        Self::with_max_depth(root, DEFAULT_MAX_DEPTH)
    }

    /// Create a cursor with an explicit nesting limit.
    pub fn with_max_depth(root: &'a Element, max_depth: usize) -> Self {
        Self {
            stack: vec![Frame {
                element: root,
                next: 0,
            }],
            max_depth: max_depth.max(1),
        }
    }

    fn top(&self) -> &Frame<'a> {
        // The root frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame<'a> {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// The element currently being read.
    pub fn current(&self) -> &'a Element {
        self.top().element
    }

    /// Number of entered elements, the root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Attribute of the current element.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.current().attribute(name)
    }

    /// Text content of the current element.
    pub fn text(&self) -> String {
        self.current().text()
    }

    fn peek_index(&self) -> Option<(usize, &'a Element)> {
        let frame = self.top();
        frame
            .element
            .children
            .iter()
            .enumerate()
            .skip(frame.next)
            .find_map(|(index, node)| match node {
                Node::Element(element) => Some((index, element)),
                Node::Text(_) => None,
            })
    }

    /// The next unconsumed child element of the current element.
    pub fn peek_child(&self) -> Option<&'a Element> {
        self.peek_index().map(|(_, element)| element)
    }

    /// Mark the next child element as consumed.
    pub fn advance(&mut self) {
        if let Some((index, _)) = self.peek_index() {
            self.top_mut().next = index + 1;
        }
    }

    /// Descend into `child`, which becomes the current element.
    pub fn enter(&mut self, child: &'a Element) -> Result<()> {
        if self.stack.len() >= self.max_depth {
            return Err(XmlError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.stack.push(Frame {
            element: child,
            next: 0,
        });
        Ok(())
    }

    /// Return to the parent of the current element.
    pub fn leave(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Child elements of the current element that have not been consumed.
    pub fn remaining(&self) -> impl Iterator<Item = &'a Element> + '_ {
        let frame = self.top();
        frame
            .element
            .children
            .iter()
            .skip(frame.next)
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                Node::Text(_) => None,
            })
    }

    /// Save the current position.
    pub fn mark(&self) -> Mark {
        Mark {
            depth: self.stack.len(),
            next: self.top().next,
        }
    }

    /// Restore a position saved with [`DomCursor::mark`].
    pub fn rewind(&mut self, mark: Mark) {
        self.stack.truncate(mark.depth.max(1));
        self.top_mut().next = mark.next;
    }
}
