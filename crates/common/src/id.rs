//! ID generation utilities.

use std::sync::{LazyLock, Mutex, PoisonError};

use ulid::{Generator, Ulid};

/// Process-wide source so every `IdGenerator` hands out increasing IDs.
static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// IDs from one process are strictly increasing, even within a single
    /// millisecond, so the audit trail can break timestamp ties by ID.
    #[must_use]
    pub fn generate(&self) -> String {
        let next = GENERATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
            // Random part exhausted within one millisecond.
            .unwrap_or_else(|_| Ulid::new());
        next.to_string().to_lowercase()
    }
}
