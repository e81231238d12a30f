//! String interning for identifiers
//!
//! The interner is shared between the binder and package loader threads, so it
//! is backed by lasso's lock-free [`ThreadedRodeo`].

pub use lasso::Spur as Symbol;
use lasso::ThreadedRodeo;
use std::sync::Arc;

/// Spellings the binder gives special meaning to
#[derive(Copy, Clone, Debug)]
pub struct WellKnown {
    /// `_`, the blank identifier
    pub underscore: Symbol,
    /// `.`, the dot-import marker
    pub dot: Symbol,
}

/// Thread-safe string interner
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
    well_known: WellKnown,
}

impl Interner {
    /// Creates an interner with the well-known spellings pre-interned
    pub fn new() -> Self {
        let rodeo = ThreadedRodeo::new();
        let well_known = WellKnown {
            underscore: rodeo.get_or_intern_static("_"),
            dot: rodeo.get_or_intern_static("."),
        };
        Self {
            inner: Arc::new(rodeo),
            well_known,
        }
    }

    /// Interns `text`, returning the existing symbol when already present
    pub fn intern(&self, text: &str) -> Symbol {
        self.inner.get_or_intern(text)
    }

    /// Spelling of a symbol
    pub fn resolve(&self, sym: &Symbol) -> String {
        self.inner.resolve(sym).to_owned()
    }

    /// Pre-interned special spellings
    pub fn well_known(&self) -> WellKnown {
        self.well_known
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_symbols() {
        let interner = Interner::new();
        let other = interner.clone();
        let sym = interner.intern("fmt");
        assert_eq!(other.intern("fmt"), sym);
        assert_eq!(other.resolve(&sym), "fmt");
    }

    #[test]
    fn test_well_known_spellings() {
        let interner = Interner::new();
        let well_known = interner.well_known();
        assert_eq!(interner.intern("_"), well_known.underscore);
        assert_eq!(interner.intern("."), well_known.dot);
        assert_eq!(interner.resolve(&well_known.dot), ".");
    }

    #[test]
    fn test_interning_across_threads() {
        let interner = Interner::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let interner = interner.clone();
                std::thread::spawn(move || interner.intern("shared"))
            })
            .collect();
        let symbols: Vec<Symbol> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert!(symbols.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
