use lumen_transport::TransportError;

#[derive(Debug, thiserror::Error, Clone)]
pub enum ResolveError {
    #[error("unknown entity identifier")]
    NotFound,
    #[error("entity has no associated fixture addresses")]
    NoAddresses,
    #[error(transparent)]
    Transport(#[from] TransportError),
}
