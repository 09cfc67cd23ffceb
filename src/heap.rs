//! Defines [`Heap`], the append-growable arena of tagged cells, with
//! construction, dereferencing, workspace-driven measurement, the
//! root registry, and the raw diagnostic dumps.
//!
//! Cells are addressed by 1-based [`HeapRef`] offsets; cell index 0 is
//! reserved as null.  The heap owns the constant table, the traversal
//! workspace, and the per-rendering variable-name cache, so rendering
//! a term never needs auxiliary allocation beyond the output itself.

use crate::cell::{Cell, ConstRef, HeapRef};
use crate::consts::ConstTable;
use crate::error::HeapError;
use crate::stack::Workspace;
use core::fmt;
use indexmap::IndexSet;
use std::collections::HashMap;

/// A point-in-time snapshot of heap occupancy, mostly for tests and
/// status logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub heap_len: usize,
    pub const_len: usize,
    pub workspace_len: usize,
    pub roots_len: usize,
    pub max_roots_len: usize,
}

/// The tagged-cell heap.
#[derive(Debug, Default, Clone)]
pub struct Heap {
    pub(crate) cells: Vec<Cell>,
    pub(crate) consts: ConstTable,
    pub(crate) scratch: Workspace,
    /// Invented display names for unbound variables, keyed by the
    /// variable cell's own location; cleared at each public rendering
    /// entry point so naming restarts at `A`.
    names: HashMap<HeapRef, ConstRef>,
    roots: IndexSet<HeapRef>,
    max_roots: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a heap with cell capacity reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Heap {
            cells: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Handle of the first heap cell.
    pub fn first(&self) -> HeapRef {
        HeapRef::new(1)
    }

    /// Handle one past the last allocated cell; the next allocation
    /// lands here.
    pub fn top(&self) -> HeapRef {
        HeapRef::new(self.cells.len() + 1)
    }

    /// The interned constant table.
    pub fn consts(&self) -> &ConstTable {
        &self.consts
    }

    /// Reads the cell at `href`.
    ///
    /// # Panics
    /// Panics if `href` is null or out of bounds; use
    /// [`Self::try_cell`] for untrusted handles.
    #[inline]
    pub fn cell(&self, href: HeapRef) -> Cell {
        self.cells[href.index() - 1]
    }

    /// Reads the cell at `href`, failing on null or out-of-bounds
    /// handles.
    pub fn try_cell(&self, href: HeapRef) -> Result<Cell, HeapError> {
        let index = href.index();
        if index == 0 || index > self.cells.len() {
            return Err(HeapError::InvalidRef(href));
        }
        Ok(self.cells[index - 1])
    }

    /// Overwrites the cell at `href`.  Marker cells are traversal
    /// artifacts and cannot be stored.
    pub fn set_cell(&mut self, href: HeapRef, cell: Cell) -> Result<(), HeapError> {
        if cell.is_marker() {
            return Err(HeapError::MarkerCell);
        }
        let index = href.index();
        if index == 0 || index > self.cells.len() {
            return Err(HeapError::InvalidRef(href));
        }
        self.cells[index - 1] = cell;
        Ok(())
    }

    /// Binds the variable at `href` to `cell`.
    pub fn bind(&mut self, href: HeapRef, cell: Cell) -> Result<(), HeapError> {
        self.set_cell(href, cell)
    }

    /// Appends one cell and returns its handle.
    ///
    /// # Panics
    /// Asserts that `cell` is not a traversal marker.
    pub fn new_cell(&mut self, cell: Cell) -> HeapRef {
        assert!(!cell.is_marker(), "marker cells cannot be stored");
        let href = self.top();
        self.cells.push(cell);
        href
    }

    /// Allocates a fresh unbound variable: a `Ref` cell referencing
    /// its own location.
    pub fn new_ref(&mut self) -> HeapRef {
        let href = self.top();
        self.cells.push(Cell::Ref(href));
        href
    }

    /// Allocates a constant cell.
    pub fn new_con(&mut self, cref: ConstRef) -> HeapRef {
        self.new_cell(Cell::Con(cref))
    }

    /// Builds a compound structure for the functor `cref`: the header
    /// constant cell, the argument cells in order, and a `Str` cell
    /// referencing the header.  Returns the `Str` cell's handle.
    pub fn new_structure(&mut self, cref: ConstRef, args: &[Cell]) -> Result<HeapRef, HeapError> {
        let declared = self.consts.const_arity(cref) as usize;
        if declared == 0 {
            return Err(HeapError::ZeroArityStructure(cref));
        }
        if declared != args.len() {
            return Err(HeapError::ArityMismatch {
                declared,
                supplied: args.len(),
            });
        }
        if args.iter().any(Cell::is_marker) {
            return Err(HeapError::MarkerCell);
        }
        let header = self.top();
        self.cells.push(Cell::Con(cref));
        self.cells.extend_from_slice(args);
        Ok(self.new_cell(Cell::Str(header)))
    }

    /// Interns `(name, args.len())` and builds the structure in one
    /// step.
    pub fn new_term(&mut self, name: &str, args: &[Cell]) -> Result<HeapRef, HeapError> {
        let cref = self.consts.get_const(name, args.len() as u32);
        self.new_structure(cref, args)
    }

    /// Interns a constant; see [`ConstTable::get_const`].
    pub fn get_const(&mut self, name: &str, arity: u32) -> ConstRef {
        self.consts.get_const(name, arity)
    }

    /// Interns the invented display name for `ordinal`.
    pub fn get_const_ordinal(&mut self, ordinal: usize) -> ConstRef {
        self.consts.get_const_ordinal(ordinal)
    }

    /// Follows `Ref` chains to the representative cell: the first
    /// non-reference cell, or the self-referencing cell of an unbound
    /// variable.
    pub fn deref(&self, cell: Cell) -> Cell {
        let mut cell = cell;
        while let Cell::Ref(target) = cell {
            let next = self.cell(target);
            if next == Cell::Ref(target) {
                // unbound variable
                return next;
            }
            cell = next;
        }
        cell
    }

    /// Schedules a structure's arguments on the workspace: the end
    /// marker first, then arguments interleaved with separators in
    /// reverse order, so popping yields them left to right.  Returns
    /// the functor.
    pub(crate) fn push_args(&mut self, header: HeapRef) -> ConstRef {
        let Cell::Con(cref) = self.cell(header) else {
            unreachable!("structure header is always a constant cell");
        };
        let arity = self.consts.const_arity(cref) as usize;
        if arity > 0 {
            self.scratch.push(Cell::End);
            for i in 0..arity {
                if i > 0 {
                    self.scratch.push(Cell::Comma);
                }
                let arg = self.cell(header.offset(arity - i));
                self.scratch.push(arg);
            }
        }
        cref
    }

    /// Measures the rendered length of the term rooted at `cell`,
    /// capped at `maximum`.  Invented variable names restart at `A`.
    pub fn string_length(&mut self, cell: Cell, maximum: usize) -> usize {
        self.clear_names();
        self.string_length_inner(cell, maximum)
    }

    pub(crate) fn string_length_inner(&mut self, cell: Cell, maximum: usize) -> usize {
        let depth = self.scratch.len();
        self.scratch.push(cell);
        let mut len = 0;
        while self.scratch.len() != depth {
            let top = self.scratch.pop();
            let cell = self.deref(top);

            if len >= maximum {
                self.scratch.truncate(depth);
                return maximum;
            }

            match cell {
                Cell::Con(cref) => len += self.consts.const_length(cref),
                Cell::Str(href) => {
                    let cref = self.push_args(href);
                    len += self.consts.const_length(cref);
                    if self.consts.const_arity(cref) > 0 {
                        len += 1;
                    }
                }
                Cell::Ref(target) => {
                    let cref = self.ref_name(target);
                    len += self.consts.const_length(cref);
                }
                Cell::End => len += 1,
                Cell::Comma => len += 2,
                Cell::Int32(_)
                | Cell::Int64(_)
                | Cell::Int128(_)
                | Cell::Float(_)
                | Cell::Double(_) => len += cell.literal_text().len(),
                Cell::Array(_) => len += 3,
            }
        }
        len
    }

    /// The invented display name for the unbound variable at
    /// `target`, interning a fresh ordinal name on first sight.
    pub(crate) fn ref_name(&mut self, target: HeapRef) -> ConstRef {
        if let Some(&cref) = self.names.get(&target) {
            return cref;
        }
        let cref = self.consts.get_const_ordinal(self.names.len());
        self.names.insert(target, cref);
        cref
    }

    pub(crate) fn clear_names(&mut self) {
        self.names.clear();
    }

    /// Registers `href` as a live root; idempotent.
    pub fn add_root(&mut self, href: HeapRef) {
        self.roots.insert(href);
        if self.roots.len() > self.max_roots {
            self.max_roots = self.roots.len();
        }
    }

    /// Unregisters a root; unknown handles are ignored.
    pub fn remove_root(&mut self, href: HeapRef) {
        self.roots.shift_remove(&href);
    }

    pub fn num_roots(&self) -> usize {
        self.roots.len()
    }

    /// Dumps the root registry, one `[i]: HeapRef(n)` line per root
    /// in registration order.
    pub fn print_roots(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for (i, href) in self.roots.iter().enumerate() {
            writeln!(out, "[{}]: {:?}", i + 1, href)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            heap_len: self.cells.len(),
            const_len: self.consts.len(),
            workspace_len: self.scratch.len(),
            roots_len: self.roots.len(),
            max_roots_len: self.max_roots,
        }
    }

    /// Writes the one-line occupancy summary.
    pub fn print_status(&self, out: &mut impl fmt::Write) -> fmt::Result {
        write!(
            out,
            "Heap{{Size={},StackSize={},RootsSize={},MaxRootsSize={}}}",
            self.cells.len(),
            self.scratch.len(),
            self.roots.len(),
            self.max_roots
        )
    }

    /// Writes one cell in raw `TAG:value` form, without dereferencing.
    pub fn print_cell(&self, out: &mut impl fmt::Write, cell: Cell) -> fmt::Result {
        write!(out, "{}:", cell.tag_name())?;
        match cell {
            Cell::Ref(href) | Cell::Str(href) | Cell::Array(href) => {
                write!(out, "{}", href.index())
            }
            Cell::Con(cref) => self.consts.print_const(out, cref),
            Cell::Int32(_)
            | Cell::Int64(_)
            | Cell::Int128(_)
            | Cell::Float(_)
            | Cell::Double(_) => out.write_str(&cell.literal_text()),
            Cell::End | Cell::Comma => out.write_str("???"),
        }
    }

    /// Dumps the raw cells in `from..=to`, one `[i]: TAG:value` line
    /// each.  An empty range writes nothing.
    pub fn print_raw(&self, out: &mut impl fmt::Write, from: HeapRef, to: HeapRef) -> fmt::Result {
        for i in from.index()..=to.index() {
            write!(out, "[{i}]: ")?;
            self.print_cell(out, self.cell(HeapRef::new(i)))?;
            out.write_char('\n')?;
        }
        Ok(())
    }

    pub fn to_raw_string(&self, from: HeapRef, to: HeapRef) -> String {
        let mut out = String::new();
        self.print_raw(&mut out, from, to)
            .expect("formatting into a String cannot fail");
        out
    }

    /// Raw dump of the whole heap.
    pub fn to_raw_string_all(&self) -> String {
        self.to_raw_string(self.first(), HeapRef::new(self.cells.len()))
    }
}
