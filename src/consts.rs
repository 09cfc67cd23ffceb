//! Defines the [`ConstTable`], which interns `(name, arity)` symbol
//! pairs into an append-only table backed by the relocation-safe
//! string pool.
//!
//! Interning is deterministic and idempotent: the same escaped name
//! and arity always yield the same [`ConstRef`], forever.  The table
//! also provides the bijective base-26 ordinal naming scheme used to
//! invent display names for unbound variables.

use crate::pool::{ConstString, PoolRef, StringPool};
use crate::ConstRef;
use core::fmt;
use indexmap::map::Entry;
use indexmap::IndexMap;
use smartstring::alias::String;

/// Maximum permitted constant name length in bytes.  Longer names are
/// a caller-contract violation and abort via assertion.
pub const MAX_CONST_LENGTH: usize = 256;

/// Characters that terminate unquoted tokens and force quoting.
const RESERVED: &[char] = &['[', ']', '(', ')', ',', '.', '\\', '\''];

#[inline]
pub(crate) fn is_reserved(ch: char) -> bool {
    RESERVED.contains(&ch)
}

/// The append-only symbol table.  Entries store relocation-safe pool
/// offsets; the lookup index keys on the escaped `(name, arity)` pair
/// and its insertion order defines the 1-based [`ConstRef`] indices.
#[derive(Debug, Default, Clone)]
pub struct ConstTable {
    pool: StringPool,
    index: IndexMap<(String, u32), PoolRef>,
}

/// Escapes a raw name per the quoting rule: quote if the first
/// character is an uppercase letter or any character is reserved;
/// inside quotes, `\` and `'` are backslash-escaped.
fn escape_name(name: &str) -> String {
    let first_upper = name
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_uppercase());
    if !first_upper && !name.chars().any(is_reserved) {
        return String::from(name);
    }
    let mut escaped = String::new();
    escaped.push('\'');
    for ch in name.chars() {
        if ch == '\\' || ch == '\'' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('\'');
    escaped
}

impl ConstTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Interns `(name, arity)`, escaping `name` per the quoting rule.
    /// Always returns the same handle for an equal pair.
    ///
    /// # Panics
    /// Asserts `name.len() < MAX_CONST_LENGTH`; violating the bound is
    /// a caller bug, not a recoverable error.
    pub fn get_const(&mut self, name: &str, arity: u32) -> ConstRef {
        assert!(
            name.len() < MAX_CONST_LENGTH,
            "constant name exceeds MAX_CONST_LENGTH"
        );
        self.lookup_or_insert(escape_name(name), arity)
    }

    /// Interns `(name, arity)` without escaping; used only for
    /// already-canonical synthetic names.
    pub fn get_const_no_escape(&mut self, name: &str, arity: u32) -> ConstRef {
        assert!(
            name.len() < MAX_CONST_LENGTH,
            "constant name exceeds MAX_CONST_LENGTH"
        );
        self.lookup_or_insert(String::from(name), arity)
    }

    /// Interns the display name for `ordinal` (see [`Self::const_name`]).
    pub fn get_const_ordinal(&mut self, ordinal: usize) -> ConstRef {
        let name = Self::const_name(ordinal);
        self.get_const_no_escape(&name, 0)
    }

    /// Looks up the escaped `(name, arity)` pair without inserting;
    /// returns [`ConstRef::NULL`] if absent.
    pub fn find_const(&self, name: &str, arity: u32) -> ConstRef {
        self.find_key(&escape_name(name), arity)
    }

    /// Looks up the raw `(name, arity)` pair without inserting.
    pub fn find_const_no_escape(&self, name: &str, arity: u32) -> ConstRef {
        self.find_key(name, arity)
    }

    fn find_key(&self, name: &str, arity: u32) -> ConstRef {
        match self.index.get_index_of(&(String::from(name), arity)) {
            Some(i) => ConstRef::new(i + 1),
            None => ConstRef::NULL,
        }
    }

    fn lookup_or_insert(&mut self, name: String, arity: u32) -> ConstRef {
        match self.index.entry((name, arity)) {
            Entry::Occupied(e) => ConstRef::new(e.index() + 1),
            Entry::Vacant(e) => {
                let index = e.index();
                let at = self.pool.add_record(e.key().0.as_str(), arity);
                e.insert(at);
                ConstRef::new(index + 1)
            }
        }
    }

    /// Deterministic bijective base-26 name for a non-negative
    /// ordinal: `A, B, … Z, AA, AB, …` with no duplicate outputs.
    pub fn const_name(ordinal: usize) -> String {
        if ordinal == 0 {
            return String::from("A");
        }
        let mut digits = [0u8; 16];
        let mut n = ordinal;
        let mut count = 0;
        while n > 0 {
            digits[count] = b'A' + (n % 26) as u8;
            n /= 26;
            count += 1;
        }
        digits[..count].reverse();
        if count > 1 {
            // bijective variant: the leading digit is never 'A' here,
            // so the decrement cannot underflow the alphabet
            digits[0] -= 1;
        }
        String::from(core::str::from_utf8(&digits[..count]).expect("ASCII digits"))
    }

    fn entry(&self, cref: ConstRef) -> PoolRef {
        let (_, at) = self
            .index
            .get_index(cref.index() - 1)
            .expect("invalid ConstRef");
        *at
    }

    /// Borrows the interned entry as a [`ConstString`] view.
    pub fn const_string(&self, cref: ConstRef) -> ConstString<'_> {
        self.pool.record(self.entry(cref))
    }

    /// The stored (escaped) name length of an entry.
    pub fn const_length(&self, cref: ConstRef) -> usize {
        self.pool.record_length(self.entry(cref))
    }

    /// The arity of an entry.
    pub fn const_arity(&self, cref: ConstRef) -> u32 {
        self.pool.record_arity(self.entry(cref))
    }

    /// Writes the entry in table-dump form, `name/arity`.
    pub fn print_const(&self, out: &mut impl fmt::Write, cref: ConstRef) -> fmt::Result {
        write!(out, "{}", self.const_string(cref))
    }

    /// Writes the bare stored name, without the arity suffix; this is
    /// the term-rendering form.
    pub fn print_const_no_arity(&self, out: &mut impl fmt::Write, cref: ConstRef) -> fmt::Result {
        out.write_str(self.const_string(cref).name())
    }

    /// Dumps the whole table, one `[i]: name/arity` line per entry.
    pub fn print(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for i in 1..=self.len() {
            writeln!(out, "[{}]: {}", i, self.const_string(ConstRef::new(i)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interning_is_idempotent() {
        let mut tab = ConstTable::new();
        let a = tab.get_const("foo", 2);
        let b = tab.get_const("foo", 2);
        assert_eq!(a, b);
        assert_eq!(tab.len(), 1);
    }

    #[test]
    fn arity_discriminates() {
        let mut tab = ConstTable::new();
        assert_ne!(tab.get_const("foo", 2), tab.get_const("foo", 3));
    }

    #[test]
    fn uppercase_names_are_quoted() {
        let mut tab = ConstTable::new();
        let cref = tab.get_const("Foo", 0);
        assert_eq!(tab.const_string(cref).name(), "'Foo'");
    }

    #[test]
    fn lowercase_names_stay_bare() {
        let mut tab = ConstTable::new();
        let cref = tab.get_const("foo", 0);
        assert_eq!(tab.const_string(cref).name(), "foo");
    }

    #[test]
    fn embedded_quote_is_escaped() {
        let mut tab = ConstTable::new();
        let cref = tab.get_const("don't", 0);
        assert_eq!(tab.const_string(cref).name(), "'don\\'t'");
    }

    #[test]
    fn escaped_and_raw_lookups_meet() {
        let mut tab = ConstTable::new();
        let a = tab.get_const("Foo", 0);
        let b = tab.get_const_no_escape("'Foo'", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn find_does_not_insert() {
        let mut tab = ConstTable::new();
        assert_eq!(tab.find_const("foo", 0), ConstRef::NULL);
        let cref = tab.get_const("foo", 0);
        assert_eq!(tab.find_const("foo", 0), cref);
        assert_eq!(tab.len(), 1);
    }

    #[test]
    fn ordinal_names_start_at_a() {
        assert_eq!(ConstTable::const_name(0), "A");
        assert_eq!(ConstTable::const_name(1), "B");
        assert_eq!(ConstTable::const_name(25), "Z");
        assert_eq!(ConstTable::const_name(26), "AA");
        assert_eq!(ConstTable::const_name(27), "AB");
        assert_eq!(ConstTable::const_name(51), "AZ");
        assert_eq!(ConstTable::const_name(52), "BA");
    }

    #[test]
    fn table_dump_format() {
        let mut tab = ConstTable::new();
        tab.get_const("foo", 2);
        tab.get_const("bar", 0);
        let mut out = std::string::String::new();
        tab.print(&mut out).unwrap();
        assert_eq!(out, "[1]: foo/2\n[2]: bar\n");
    }

    #[test]
    #[should_panic]
    fn oversized_name_is_a_contract_violation() {
        let mut tab = ConstTable::new();
        let long = "x".repeat(MAX_CONST_LENGTH);
        tab.get_const(&long, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

        #[test]
        fn prop_ordinal_names_are_injective(a in 0usize..100_000, b in 0usize..100_000) {
            if a != b {
                prop_assert_ne!(ConstTable::const_name(a), ConstTable::const_name(b));
            }
        }

        #[test]
        fn prop_ordinal_name_length_is_monotone(n in 0usize..100_000) {
            prop_assert!(
                ConstTable::const_name(n + 1).len() >= ConstTable::const_name(n).len()
            );
        }
    }
}
