// Public entities for the Hapetus API
// Request/response shapes live in the domain crate; this module holds the
// HTTP-only pieces.

pub mod common;
