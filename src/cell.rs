//! Defines the opaque offset handles [`ConstRef`] and [`HeapRef`] and
//! the fixed-width tagged heap word [`Cell`].
//!
//! Handles are 1-based integer offsets into the constant table and the
//! heap; index 0 is reserved as null and never assigned to a real
//! entry.  Because every cross-structure reference is an offset rather
//! than an address, handles survive arena growth and relocation.

use core::fmt;

/// A 1-based offset into the constant table.  Index 0 is the null
/// handle.  Equality is index equality; the same `(name, arity)` pair
/// always interns to the same `ConstRef`.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstRef(u32);

impl ConstRef {
    /// The reserved null handle.
    pub const NULL: Self = ConstRef(0);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        ConstRef(index as u32)
    }

    /// Returns the raw 1-based index of this handle (0 for null).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is the reserved null handle.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ConstRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "ConstRef(NULL)")
        } else {
            write!(f, "ConstRef({})", self.0)
        }
    }
}

/// A 1-based offset into the heap's cell sequence.  Index 0 is the
/// null handle.  Handles remain valid as the heap grows.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeapRef(u32);

impl HeapRef {
    /// The reserved null handle.
    pub const NULL: Self = HeapRef(0);

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        HeapRef(index as u32)
    }

    /// Returns the raw 1-based index of this handle (0 for null).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is the reserved null handle.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the handle `n` cells past this one.
    #[inline]
    pub(crate) fn offset(self, n: usize) -> Self {
        HeapRef(self.0 + n as u32)
    }
}

impl fmt::Debug for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "HeapRef(NULL)")
        } else {
            write!(f, "HeapRef({})", self.0)
        }
    }
}

/// The fixed-width tagged heap word.
///
/// A `Ref` cell whose target equals its own storage location is an
/// unbound variable.  A `Str` cell points at the structure header: a
/// `Con` cell holding the functor, immediately followed in heap order
/// by the argument cells.  The numeric variants carry their value
/// inline; `Array` carries an auxiliary heap reference.
///
/// `End` and `Comma` exist only as traversal control markers scheduled
/// on the workspace and must never be stored in heap cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// A reference cell; self-reference means unbound.
    Ref(HeapRef),
    /// An interned constant.
    Con(ConstRef),
    /// A compound structure, pointing at its functor header cell.
    Str(HeapRef),
    /// A native 32-bit integer literal.
    Int32(i32),
    /// A native 64-bit integer literal.
    Int64(i64),
    /// A native single-precision float literal.
    Float(f32),
    /// A native double-precision float literal.
    Double(f64),
    /// A native 128-bit integer literal.
    Int128(i128),
    /// An auxiliary array reference.
    Array(HeapRef),
    /// End-of-structure marker; traversal only, never stored.
    End,
    /// Argument separator marker; traversal only, never stored.
    Comma,
}

impl Cell {
    /// Returns the tag name used in raw heap dumps.
    pub fn tag_name(&self) -> &'static str {
        match self {
            Cell::Ref(_) => "REF",
            Cell::Con(_) => "CON",
            Cell::Str(_) => "STR",
            Cell::Int32(_) => "INT32",
            Cell::Int64(_) => "INT64",
            Cell::Float(_) => "FLOAT",
            Cell::Double(_) => "DOUBLE",
            Cell::Int128(_) => "INT128",
            Cell::Array(_) => "ARRAY",
            Cell::End => "END",
            Cell::Comma => "COMMA",
        }
    }

    /// Returns `true` for the traversal-only marker variants.
    #[inline]
    pub fn is_marker(&self) -> bool {
        matches!(self, Cell::End | Cell::Comma)
    }

    /// Renders an inline literal the way the printer emits it.  Whole
    /// floats keep one fractional digit so they stay distinguishable
    /// from integers.  Cells without a printable payload render as
    /// `???`.
    pub(crate) fn literal_text(&self) -> String {
        match self {
            Cell::Int32(v) => format!("{v}"),
            Cell::Int64(v) => format!("{v}"),
            Cell::Int128(v) => format!("{v}"),
            Cell::Float(v) => {
                if v.fract() == 0.0 {
                    format!("{v:.1}")
                } else {
                    format!("{v}")
                }
            }
            Cell::Double(v) => {
                if v.fract() == 0.0 {
                    format!("{v:.1}")
                } else {
                    format!("{v}")
                }
            }
            _ => String::from("???"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_is_thirty_two_bytes() {
        // Int128 payload plus the discriminant, padded to 16-byte alignment.
        assert_eq!(core::mem::size_of::<Cell>(), 32);
    }

    #[test]
    fn handle_size_is_four_bytes() {
        assert_eq!(core::mem::size_of::<HeapRef>(), 4);
        assert_eq!(core::mem::size_of::<ConstRef>(), 4);
    }

    #[test]
    fn null_handles_format_as_null() {
        assert_eq!(format!("{:?}", ConstRef::NULL), "ConstRef(NULL)");
        assert_eq!(format!("{:?}", HeapRef::new(3)), "HeapRef(3)");
    }

    #[test]
    fn markers_are_recognised() {
        assert!(Cell::End.is_marker());
        assert!(Cell::Comma.is_marker());
        assert!(!Cell::Ref(HeapRef::new(1)).is_marker());
    }

    #[test]
    fn whole_floats_keep_a_fractional_digit() {
        assert_eq!(Cell::Double(2.0).literal_text(), "2.0");
        assert_eq!(Cell::Double(2.5).literal_text(), "2.5");
        assert_eq!(Cell::Int64(-7).literal_text(), "-7");
    }
}
