//! Outbound send port.

use mimic_types::error::DeliveryError;

/// The host's primitive for posting text into a channel.
///
/// `'static` because scheduled replies move a handle to the sink into a
/// detached task.
pub trait MessageSink: Send + Sync + 'static {
    fn send(
        &self,
        channel: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;
}
