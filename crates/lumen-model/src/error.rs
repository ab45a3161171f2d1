//! Closed error kinds from `spec.md` §7, plus the pure status-code mapping
//! an out-of-scope HTTP collaborator would use. A plain match, not a trait
//! object: the set of kinds is closed and known at compile time.

use lumen_codec::DecodeError;
use lumen_inventory::UnknownState;
use lumen_resolver::ResolveError;
use lumen_session::SessionError;
use lumen_transport::TransportError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LumenError {
    #[error("unknown entity identifier")]
    NotFound,
    #[error("entity has no associated fixture addresses")]
    NoAddresses,
    #[error("requested state is not in the closed set")]
    BadState,
    #[error("numeric parameter out of documented bounds")]
    BadRange,
    #[error("transport is shutting down")]
    TransportClosed,
    #[error("transport write or open failed: {0}")]
    TransportIo(String),
    #[error("decoded frame failed its checksum")]
    DecodeBadChecksum,
    #[error("frame too short to decode")]
    DecodeTruncated,
}

impl From<ResolveError> for LumenError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => LumenError::NotFound,
            ResolveError::NoAddresses => LumenError::NoAddresses,
            ResolveError::Transport(t) => t.into(),
        }
    }
}

impl From<SessionError> for LumenError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Transport(t) => t.into(),
        }
    }
}

impl From<TransportError> for LumenError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => LumenError::TransportClosed,
            TransportError::Io(msg) => LumenError::TransportIo(msg),
        }
    }
}

impl From<UnknownState> for LumenError {
    fn from(_: UnknownState) -> Self {
        LumenError::BadState
    }
}

impl From<DecodeError> for LumenError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Truncated => LumenError::DecodeTruncated,
        }
    }
}

/// Maps a [`LumenError`] to the HTTP status code the (out-of-scope) request
/// surface returns, per `spec.md` §7.
pub fn status_code(err: &LumenError) -> u16 {
    match err {
        LumenError::NotFound => 404,
        LumenError::BadState | LumenError::BadRange => 400,
        LumenError::NoAddresses => 409,
        LumenError::TransportClosed | LumenError::TransportIo(_) => 502,
        LumenError::DecodeBadChecksum | LumenError::DecodeTruncated => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(status_code(&LumenError::NotFound), 404);
    }

    #[test]
    fn bad_state_and_bad_range_map_to_400() {
        assert_eq!(status_code(&LumenError::BadState), 400);
        assert_eq!(status_code(&LumenError::BadRange), 400);
    }

    #[test]
    fn transport_errors_map_to_502() {
        assert_eq!(status_code(&LumenError::TransportClosed), 502);
        assert_eq!(status_code(&LumenError::TransportIo("x".into())), 502);
    }
}
