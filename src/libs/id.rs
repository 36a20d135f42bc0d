//! Entity identifier generation.
//!
//! Every row gets a ULID: 48 bits of millisecond timestamp followed by 80
//! random bits, rendered as a 26-character Crockford base32 string. Ids
//! generated later sort lexicographically after earlier ones, which keeps
//! insertion order recoverable without a separate sequence column.

use ulid::Ulid;

/// Generates a fresh entity id.
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Current moment as an RFC 3339 timestamp, the format used for all
/// `created_at` / `updated_at` columns.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
