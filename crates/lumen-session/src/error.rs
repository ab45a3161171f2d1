use lumen_transport::TransportError;

#[derive(Debug, thiserror::Error, Clone)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}
