//! Defines the [`Workspace`], the explicit LIFO cell stack that
//! replaces call-stack recursion in term traversal.
//!
//! Measurement and printing schedule real cells and synthetic marker
//! cells here; every traversal records the depth on entry and
//! truncates back to it on exit, so concurrent nested traversals can
//! share one workspace.

use crate::cell::Cell;

/// A LIFO stack of cells used as traversal scratch space.
#[derive(Debug, Default, Clone)]
pub(crate) struct Workspace {
    cells: Vec<Cell>,
}

impl Workspace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Pops the most recent cell.  Traversals only pop what they
    /// pushed, so an empty pop is a traversal bug.
    #[inline]
    pub(crate) fn pop(&mut self) -> Cell {
        self.cells.pop().expect("workspace underflow")
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Discards everything above `depth`; used to restore the
    /// workspace on every traversal exit path.
    #[inline]
    pub(crate) fn truncate(&mut self, depth: usize) {
        self.cells.truncate(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut ws = Workspace::new();
        ws.push(Cell::End);
        ws.push(Cell::Comma);
        assert_eq!(ws.pop(), Cell::Comma);
        assert_eq!(ws.pop(), Cell::End);
        assert!(ws.is_empty());
    }

    #[test]
    fn truncate_restores_depth() {
        let mut ws = Workspace::new();
        ws.push(Cell::End);
        let depth = ws.len();
        ws.push(Cell::Comma);
        ws.push(Cell::Comma);
        ws.truncate(depth);
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.pop(), Cell::End);
    }

    #[test]
    #[should_panic(expected = "workspace underflow")]
    fn empty_pop_is_a_bug() {
        Workspace::new().pop();
    }
}
