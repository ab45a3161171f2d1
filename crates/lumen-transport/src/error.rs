//! Transport-level errors (`spec.md` §7).

#[derive(Debug, thiserror::Error, Clone)]
pub enum TransportError {
    #[error("transport is closed or shutting down")]
    Closed,
    #[error("transport I/O error: {0}")]
    Io(String),
}
