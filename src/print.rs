//! Width-aware term rendering: [`PrintConfig`], the mutable
//! [`PrintState`] threaded through a traversal, and the printing
//! entry points on [`Heap`].
//!
//! Printing walks the same workspace-scheduled token stream as
//! measurement.  Each token is accounted into the current column
//! before any pending line break is flushed, so a line may overrun
//! the end column by at most one token.  Structures additionally
//! pre-measure themselves (capped at the space left on the line) and
//! break before their functor when they cannot fit.

use crate::cell::{Cell, HeapRef};
use crate::heap::Heap;
use core::fmt;

/// Maximum structure nesting depth the indent table tracks.  Deeper
/// levels still print, but stop recording fresh indent columns.
pub const MAX_INDENT_DEPTH: usize = 100;

/// Layout parameters for term rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintConfig {
    /// Column every line starts at.
    pub start_column: usize,
    /// Column at which lines wrap.
    pub end_column: usize,
    /// Fallback indent step for nesting levels without a recorded
    /// open-parenthesis column.
    pub indent_width: usize,
}

impl PrintConfig {
    pub fn new(start_column: usize, end_column: usize, indent_width: usize) -> Self {
        PrintConfig {
            start_column,
            end_column,
            indent_width,
        }
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        PrintConfig::new(0, 78, 2)
    }
}

/// Mutable layout state carried through one rendering traversal:
/// the current column, the nesting depth, the per-depth indent
/// columns recorded at each open parenthesis, and a pending-newline
/// flag set when the column overruns the end column.
#[derive(Debug, Clone)]
pub struct PrintState {
    config: PrintConfig,
    need_newline: bool,
    column: usize,
    indent: usize,
    indent_table: [usize; MAX_INDENT_DEPTH],
}

impl PrintState {
    pub fn new(config: PrintConfig) -> Self {
        PrintState {
            config,
            need_newline: false,
            column: config.start_column,
            indent: 0,
            indent_table: [0; MAX_INDENT_DEPTH],
        }
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    #[inline]
    pub fn indent(&self) -> usize {
        self.indent
    }

    #[inline]
    pub fn need_newline(&self) -> bool {
        self.need_newline
    }

    /// Records the current column as the indent column of the current
    /// nesting level; called right after an open parenthesis.
    pub fn mark_column(&mut self) {
        if self.indent < MAX_INDENT_DEPTH {
            self.indent_table[self.indent] = self.column;
        }
    }

    /// Whether a token of `len` more characters would reach the end
    /// column.
    pub fn will_wrap(&self, len: usize) -> bool {
        self.column + len >= self.config.end_column
    }

    /// The space left on the current line; measurement caps are set
    /// to this so oversized sub-terms are never measured in full.
    pub fn will_wrap_on_length(&self) -> usize {
        self.config.end_column.saturating_sub(self.column)
    }

    /// Accounts `len` emitted characters; sets the pending-newline
    /// flag once the column overruns the end column.
    pub fn add_to_column(&mut self, len: usize) {
        self.column += len;
        if self.column > self.config.end_column {
            self.need_newline = true;
        }
    }

    pub fn reset_to_column(&mut self, col: usize) {
        self.need_newline = false;
        self.column = col;
    }

    /// Unconditionally breaks the line and re-indents.
    pub fn new_line(&mut self, out: &mut impl fmt::Write) -> fmt::Result {
        out.write_char('\n')?;
        self.reset_to_column(0);
        self.print_indent(out)
    }

    /// Breaks the line only if a previous [`Self::add_to_column`]
    /// overran the end column.
    pub fn flush_newline(&mut self, out: &mut impl fmt::Write) -> fmt::Result {
        if self.need_newline {
            self.new_line(out)?;
        }
        Ok(())
    }

    /// Emits indentation for the current nesting: spaces to the start
    /// column, then per level to its recorded open-parenthesis column
    /// (or one indent step past the previous level when unrecorded).
    pub fn print_indent(&mut self, out: &mut impl fmt::Write) -> fmt::Result {
        let mut col = self.column;
        while col < self.config.start_column {
            col += 1;
            out.write_char(' ')?;
        }
        for i in 0..self.indent.min(MAX_INDENT_DEPTH) {
            let p = if self.indent_table[i] != 0 {
                self.indent_table[i]
            } else {
                col + self.config.indent_width
            };
            for _ in col..p {
                out.write_char(' ')?;
            }
            col = p;
        }
        self.column = col;
        Ok(())
    }

    #[inline]
    pub fn increment_indent(&mut self) {
        self.indent += 1;
    }

    #[inline]
    pub fn decrement_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }
}

impl Heap {
    /// Renders the term at `href` into `out` using `config`.
    /// Invented variable names restart at `A` on every call.
    pub fn print(
        &mut self,
        out: &mut impl fmt::Write,
        href: HeapRef,
        config: PrintConfig,
    ) -> fmt::Result {
        self.clear_names();
        let mut state = PrintState::new(config);
        self.print_inner(out, href, &mut state)
    }

    /// Renders with the default layout.
    pub fn to_string(&mut self, href: HeapRef) -> String {
        self.to_string_with(href, PrintConfig::default())
    }

    /// Renders into a fresh string using `config`.
    pub fn to_string_with(&mut self, href: HeapRef, config: PrintConfig) -> String {
        let mut out = String::new();
        self.print(&mut out, href, config)
            .expect("formatting into a String cannot fail");
        out
    }

    fn print_inner(
        &mut self,
        out: &mut impl fmt::Write,
        href: HeapRef,
        state: &mut PrintState,
    ) -> fmt::Result {
        let depth = self.scratch.len();
        let cell = self.cell(href);
        self.scratch.push(cell);
        let result = self.print_loop(out, state, depth);
        // restore the workspace even when the writer failed mid-term
        self.scratch.truncate(depth);
        result
    }

    fn print_loop(
        &mut self,
        out: &mut impl fmt::Write,
        state: &mut PrintState,
        depth: usize,
    ) -> fmt::Result {
        while self.scratch.len() != depth {
            let top = self.scratch.pop();
            let cell = self.deref(top);

            match cell {
                Cell::Con(cref) => {
                    state.add_to_column(self.consts.const_length(cref));
                    state.flush_newline(out)?;
                    self.consts.print_const_no_arity(out, cref)?;
                }
                Cell::Str(href) => {
                    if state.indent() > 0 {
                        let remaining = state.will_wrap_on_length();
                        let len = self.string_length_inner(cell, remaining);
                        if state.will_wrap(len) {
                            log::trace!(
                                "wrapping structure at column {} (needs {len})",
                                state.column()
                            );
                            state.new_line(out)?;
                        }
                    }
                    let cref = self.push_args(href);
                    let arity = self.consts.const_arity(cref);
                    let open = usize::from(arity > 0);
                    state.add_to_column(self.consts.const_length(cref) + open);
                    state.flush_newline(out)?;
                    self.consts.print_const_no_arity(out, cref)?;
                    if arity > 0 {
                        out.write_char('(')?;
                        state.mark_column();
                        state.increment_indent();
                    }
                }
                Cell::Ref(target) => {
                    let cref = self.ref_name(target);
                    state.add_to_column(self.consts.const_length(cref));
                    state.flush_newline(out)?;
                    self.consts.print_const_no_arity(out, cref)?;
                }
                Cell::End => {
                    state.add_to_column(1);
                    state.flush_newline(out)?;
                    out.write_char(')')?;
                    state.decrement_indent();
                }
                Cell::Comma => {
                    state.add_to_column(2);
                    state.flush_newline(out)?;
                    out.write_str(", ")?;
                }
                Cell::Int32(_)
                | Cell::Int64(_)
                | Cell::Int128(_)
                | Cell::Float(_)
                | Cell::Double(_) => {
                    let text = cell.literal_text();
                    state.add_to_column(text.len());
                    state.flush_newline(out)?;
                    out.write_str(&text)?;
                }
                Cell::Array(_) => {
                    state.add_to_column(3);
                    state.flush_newline(out)?;
                    out.write_str("???")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Heap;

    #[test]
    fn default_config() {
        let config = PrintConfig::default();
        assert_eq!(config.start_column, 0);
        assert_eq!(config.end_column, 78);
        assert_eq!(config.indent_width, 2);
    }

    #[test]
    fn add_to_column_sets_pending_newline_past_end() {
        let mut state = PrintState::new(PrintConfig::new(0, 10, 2));
        state.add_to_column(10);
        assert!(!state.need_newline());
        state.add_to_column(1);
        assert!(state.need_newline());
        state.reset_to_column(0);
        assert!(!state.need_newline());
        assert_eq!(state.column(), 0);
    }

    #[test]
    fn will_wrap_on_length_caps_at_zero() {
        let mut state = PrintState::new(PrintConfig::new(0, 10, 2));
        state.add_to_column(15);
        assert_eq!(state.will_wrap_on_length(), 0);
        assert!(state.will_wrap(0));
    }

    #[test]
    fn print_indent_uses_marked_columns() {
        let mut state = PrintState::new(PrintConfig::new(0, 78, 2));
        state.add_to_column(5);
        state.mark_column();
        state.increment_indent();
        let mut out = String::new();
        state.new_line(&mut out).unwrap();
        assert_eq!(out, "\n     ");
        assert_eq!(state.column(), 5);
    }

    #[test]
    fn print_indent_falls_back_to_indent_width() {
        let mut state = PrintState::new(PrintConfig::new(1, 78, 3));
        state.increment_indent();
        let mut out = String::new();
        state.reset_to_column(0);
        state.print_indent(&mut out).unwrap();
        // one space to the start column, three for the unmarked level
        assert_eq!(out, "    ");
        assert_eq!(state.column(), 4);
    }

    #[test]
    fn flat_structure_rendering() {
        let mut heap = Heap::new();
        let a = heap.get_const("a", 0);
        let b = heap.get_const("b", 0);
        let c = heap.get_const("c", 0);
        let f = heap
            .new_term("f", &[Cell::Con(a), Cell::Con(b), Cell::Con(c)])
            .unwrap();
        assert_eq!(heap.to_string(f), "f(a, b, c)");
    }

    #[test]
    fn unbound_variables_get_stable_invented_names() {
        let mut heap = Heap::new();
        let x = heap.new_ref();
        let y = heap.new_ref();
        let f = heap
            .new_term("f", &[Cell::Ref(x), Cell::Ref(y), Cell::Ref(x)])
            .unwrap();
        assert_eq!(heap.to_string(f), "f(A, B, A)");
        // naming restarts on each rendering
        assert_eq!(heap.to_string(f), "f(A, B, A)");
    }

    #[test]
    fn numeric_literals_render_inline() {
        let mut heap = Heap::new();
        let f = heap
            .new_term("f", &[Cell::Int64(42), Cell::Double(2.0), Cell::Float(1.5)])
            .unwrap();
        assert_eq!(heap.to_string(f), "f(42, 2.0, 1.5)");
    }

    #[test]
    fn quoted_names_render_in_stored_form() {
        let mut heap = Heap::new();
        let q = heap.get_const("Foo Bar", 0);
        let f = heap.new_term("f", &[Cell::Con(q)]).unwrap();
        assert_eq!(heap.to_string(f), "f('Foo Bar')");
    }

    #[test]
    fn narrow_configs_wrap_deep_structures() {
        let mut heap = Heap::new();
        let x = heap.get_const("x", 0);
        let mut inner = Cell::Con(x);
        for i in (0..20).rev() {
            let href = heap.new_term(&format!("f{i}"), &[inner]).unwrap();
            inner = Cell::Str(href);
        }
        let Cell::Str(root) = inner else {
            panic!("expected a structure");
        };

        let narrow = heap.to_string_with(root, PrintConfig::new(0, 40, 2));
        let lines: Vec<&str> = narrow.lines().collect();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 60, "overlong line: {line:?}");
        }

        // wrapping only inserts breaks and indentation, never alters tokens
        let wide = heap.to_string_with(root, PrintConfig::new(0, 10_000, 2));
        let rejoined: String = lines.iter().map(|l| l.trim_start()).collect();
        assert_eq!(rejoined, wide);

        // rendering is deterministic
        assert_eq!(
            narrow,
            heap.to_string_with(root, PrintConfig::new(0, 40, 2))
        );
    }

    #[test]
    fn start_column_is_assumed_on_the_first_line() {
        let mut heap = Heap::new();
        let a = heap.get_const("a", 0);
        let f = heap.new_term("f", &[Cell::Con(a)]).unwrap();
        let out = heap.to_string_with(f, PrintConfig::new(4, 78, 2));
        // the first line inherits the start column without emitting it
        assert_eq!(out, "f(a)");
    }
}
