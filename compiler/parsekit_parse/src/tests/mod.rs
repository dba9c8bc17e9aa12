//! End-to-end grammar tests.
//!
//! - `lease`: a DHCP lease grammar using a merged numeral table, multi-error
//!   recovery, multi-file input, streamed input and an `option`-keyword
//!   variant.
//! - `options`: a keyword/string grammar checking exact error rendering.

mod lease;

#[test]
fn init_tracing_is_idempotent() {
    crate::init_tracing();
    crate::init_tracing();
}
