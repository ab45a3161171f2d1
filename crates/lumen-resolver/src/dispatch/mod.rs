//! Pure intent-to-packet expansion, one module per intent kind (mirrors the
//! donor's `core-actions::dispatcher` decomposition). None of these
//! functions perform I/O; `crate::Resolver` drives them and enqueues the
//! results onto the transport.

pub mod broadcast;
pub mod light;
pub mod off;
