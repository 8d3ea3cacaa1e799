//! Server-side record identifiers.

use uuid::Uuid;

/// Returns a fresh random (version 4) UUID in hyphenated form.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
