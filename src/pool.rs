//! Defines the relocation-safe [`StringPool`] backing the constant
//! table, and [`ConstString`], the borrowed symbol view used for
//! printing and table dumps.
//!
//! Each interned symbol is stored as one physical record
//! `[len: u32][arity: u32][bytes…]` inside a single growable byte
//! vector.  Records are addressed by [`PoolRef`] relative offsets, so
//! they survive pool growth; conversion from an offset to physical
//! bytes happens only inside this module.

use core::fmt;

/// A relative byte offset of a record inside the pool.  Offset 0 is
/// reserved as null; the pool is seeded with a padding byte so no
/// record ever lives there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PoolRef(u32);

impl PoolRef {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A non-owning `(name, arity)` view into pooled storage.  Equality
/// and hashing use both fields: the same name with a different arity
/// is a distinct symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstString<'a> {
    name: &'a str,
    arity: u32,
}

impl<'a> ConstString<'a> {
    pub(crate) fn new(name: &'a str, arity: u32) -> Self {
        ConstString { name, arity }
    }

    /// The symbol's stored (escaped) name.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The stored name's length in bytes.
    #[inline]
    pub fn length(&self) -> usize {
        self.name.len()
    }

    /// The symbol's arity.
    #[inline]
    pub fn arity(&self) -> u32 {
        self.arity
    }
}

/// Formats as `name/arity`; the suffix is omitted for arity 0.  This
/// is the constant-table dump form, not the term-rendering form.
impl fmt::Display for ConstString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        if self.arity > 0 {
            write!(f, "/{}", self.arity)?;
        }
        Ok(())
    }
}

const RECORD_HEADER: usize = 8;

/// Append-only byte pool holding `[len][arity][bytes…]` symbol
/// records addressed by relative offsets.
#[derive(Debug, Clone)]
pub(crate) struct StringPool {
    bytes: Vec<u8>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    pub(crate) fn new() -> Self {
        // one padding byte keeps offset 0 free for the null handle
        StringPool { bytes: vec![0] }
    }

    /// Appends a `(name, arity)` record and returns its offset.
    pub(crate) fn add_record(&mut self, name: &str, arity: u32) -> PoolRef {
        let offset = self.bytes.len();
        self.bytes
            .extend_from_slice(&(name.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(&arity.to_le_bytes());
        self.bytes.extend_from_slice(name.as_bytes());
        PoolRef(offset as u32)
    }

    /// Borrows the record at `at` as a [`ConstString`] view.
    pub(crate) fn record(&self, at: PoolRef) -> ConstString<'_> {
        let off = at.index();
        let len = self.header_word(off) as usize;
        let arity = self.header_word(off + 4);
        let bytes = &self.bytes[off + RECORD_HEADER..off + RECORD_HEADER + len];
        let name = core::str::from_utf8(bytes).expect("pool records hold UTF-8");
        ConstString::new(name, arity)
    }

    /// Reads the stored name length without materialising the view.
    pub(crate) fn record_length(&self, at: PoolRef) -> usize {
        self.header_word(at.index()) as usize
    }

    /// Reads the stored arity without materialising the view.
    pub(crate) fn record_arity(&self, at: PoolRef) -> u32 {
        self.header_word(at.index() + 4)
    }

    #[inline]
    fn header_word(&self, off: usize) -> u32 {
        let bytes: [u8; 4] = self.bytes[off..off + 4]
            .try_into()
            .expect("pool record header");
        u32::from_le_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trip() {
        let mut pool = StringPool::new();
        let at = pool.add_record("foo", 2);
        let s = pool.record(at);
        assert_eq!(s.name(), "foo");
        assert_eq!(s.length(), 3);
        assert_eq!(s.arity(), 2);
    }

    #[test]
    fn offsets_survive_growth() {
        let mut pool = StringPool::new();
        let first = pool.add_record("first", 0);
        for i in 0..1000 {
            pool.add_record(&format!("filler{i}"), 1);
        }
        assert_eq!(pool.record(first).name(), "first");
        assert_eq!(pool.record_length(first), 5);
        assert_eq!(pool.record_arity(first), 0);
    }

    #[test]
    fn display_appends_arity_suffix() {
        assert_eq!(ConstString::new("foo", 3).to_string(), "foo/3");
        assert_eq!(ConstString::new("foo", 0).to_string(), "foo");
    }

    #[test]
    fn equality_discriminates_arity() {
        assert_ne!(ConstString::new("foo", 2), ConstString::new("foo", 3));
        assert_eq!(ConstString::new("foo", 2), ConstString::new("foo", 2));
    }
}
