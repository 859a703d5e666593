//! Generic SQL dialect.

use super::{Dialect, ReservedWords, ANSI_RESERVED};

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Clone)]
pub struct GenericDialect {
    reserved: ReservedWords,
}

impl GenericDialect {
    /// Creates a new generic dialect with the ANSI reserved word table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reserved: ReservedWords::new(ANSI_RESERVED),
        }
    }

    /// Replaces the reserved word table.
    #[must_use]
    pub fn with_reserved_words(mut self, reserved: ReservedWords) -> Self {
        self.reserved = reserved;
        self
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn reserved_words(&self) -> &ReservedWords {
        &self.reserved
    }
}
