//! # Term Heap
//!
//! The term/heap subsystem of a Prolog-like runtime: a shared,
//! append-growable arena of fixed-width tagged cells addressed through
//! relocation-safe offsets, backed by a symbol-interning constant table
//! and rendered through a width-aware, indentation-tracking printer.
//!
//! The primary entry points are [`Heap`] (cell storage, dereferencing,
//! traversal, printing, and a minimal atom parser) and [`ConstTable`]
//! (interning of `(name, arity)` symbol pairs into an append-only table
//! backed by a relocation-safe string pool).  All cross-structure
//! references are 1-based integer offsets ([`HeapRef`], [`ConstRef`]);
//! index 0 is reserved as null, and handles remain valid across arena
//! growth because they are offsets, not addresses.
//!
//! Term traversal never recurses: measurement and printing walk an
//! explicit LIFO workspace with synthetic end-of-structure and
//! separator markers scheduled alongside real cells, so arbitrarily
//! deep terms cannot exhaust the native call stack.
//!
//! ## Example
//! ```rust
//! use term_heap::{Cell, Heap};
//!
//! let mut heap = Heap::new();
//!
//! // intern some constants and build the structure f(a, b, X)
//! let a = heap.get_const("a", 0);
//! let b = heap.get_const("b", 0);
//! let x = heap.new_ref(); // unbound variable
//! let f = heap
//!     .new_term("f", &[Cell::Con(a), Cell::Con(b), Cell::Ref(x)])
//!     .unwrap();
//!
//! assert_eq!(heap.to_string(f), "f(a, b, A)");
//! ```
//!
//! ## License
//!
//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

mod cell;
mod consts;
mod error;
mod heap;
mod parse;
mod pool;
mod print;
mod stack;

pub use cell::{Cell, ConstRef, HeapRef};
pub use consts::{ConstTable, MAX_CONST_LENGTH};
pub use error::HeapError;
pub use heap::{Heap, HeapStats};
pub use parse::{LocationTracker, PARSE_ERROR_NAME};
pub use pool::ConstString;
pub use print::{PrintConfig, PrintState, MAX_INDENT_DEPTH};
