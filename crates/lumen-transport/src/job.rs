use crate::error::TransportError;
use lumen_codec::Address;
use tokio::sync::oneshot;

/// A fully framed wire packet plus a completion notifier. Producers await
/// the notifier; the writer task fulfils it once the bytes have been
/// flushed (or the job has definitively failed).
pub struct WriteJob {
    pub addr: Address,
    pub packet: Vec<u8>,
    pub completion: oneshot::Sender<Result<(), TransportError>>,
}
