//! Mock collaborators for testing
//!
//! Scripted stand-ins for the transport and the numeric-I/O framework, for
//! unit tests here and host-side tests in downstream crates.

#![cfg(any(test, feature = "std"))]

use heapless::{Deque, Vec};

use crate::channel::ChannelSpec;
use crate::command::CommandFrame;
use crate::error::RegistrationError;
use crate::framework::ChannelRegistrar;
use crate::registry::DeviceName;
use crate::transport::Transport;

const MAX_FRAMES: usize = 64;
const MAX_REPLIES: usize = 16;
const MAX_REGISTERED: usize = 8;

/// Scripted outcome of one [`MockTransport::send`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReply {
    /// Accept every byte.
    Accept,
    /// Report only this many bytes sent.
    Short(usize),
    /// Fail with [`MockBusError`].
    Fail,
}

/// Error produced by [`MockReply::Fail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Transport that records frames and replays scripted replies.
///
/// Calls with no queued reply are accepted in full. At most 64 frames are
/// recorded; later ones still count in [`calls`](Self::calls) and set
/// [`overflowed`](Self::overflowed).
#[derive(Default)]
pub struct MockTransport {
    replies: Deque<MockReply, MAX_REPLIES>,
    frames: Vec<CommandFrame, MAX_FRAMES>,
    calls: usize,
    overflowed: bool,
}

impl MockTransport {
    /// Create a transport that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next unscripted send. Returns the reply back when the queue is full.
    pub fn push_reply(&mut self, reply: MockReply) -> Result<(), MockReply> {
        self.replies.push_back(reply)
    }

    /// Every well-formed frame handed to the transport, including failed sends.
    pub fn frames(&self) -> &[CommandFrame] {
        &self.frames
    }

    /// Bytes of the `index`-th frame.
    pub fn sent_bytes(&self, index: usize) -> Option<&[u8; 3]> {
        self.frames.get(index).map(CommandFrame::bytes)
    }

    /// Number of send calls.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// `true` once a frame was dropped because the record was full.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl Transport for MockTransport {
    type Error = MockBusError;

    fn send(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        self.calls = self.calls.saturating_add(1);
        if let Ok(frame) = CommandFrame::try_from(bytes) {
            if self.frames.push(frame).is_err() {
                self.overflowed = true;
            }
        }
        match self.replies.pop_front().unwrap_or(MockReply::Accept) {
            MockReply::Accept => Ok(bytes.len()),
            MockReply::Short(sent) => Ok(sent),
            MockReply::Fail => Err(MockBusError),
        }
    }
}

/// Numeric-I/O framework stand-in.
#[derive(Default)]
pub struct MockRegistrar {
    registered: Vec<(DeviceName, usize), MAX_REGISTERED>,
    reject_next: Option<RegistrationError>,
}

impl MockRegistrar {
    /// Empty registrar that accepts every registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `register` call with `err`.
    pub fn reject_next(&mut self, err: RegistrationError) {
        self.reject_next = Some(err);
    }

    /// Names currently registered, in registration order.
    pub fn registered(&self) -> impl Iterator<Item = &str> + '_ {
        self.registered.iter().map(|(name, _)| name.as_str())
    }

    /// Whether `name` is currently registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.channel_count(name).is_some()
    }

    /// Number of channels published under `name`.
    pub fn channel_count(&self, name: &str) -> Option<usize> {
        self.registered
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, count)| *count)
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

impl ChannelRegistrar for MockRegistrar {
    fn register(
        &mut self,
        name: &str,
        channels: &'static [ChannelSpec],
    ) -> Result<(), RegistrationError> {
        if let Some(err) = self.reject_next.take() {
            return Err(err);
        }
        if self.is_registered(name) {
            return Err(RegistrationError::NameInUse);
        }
        let mut owned = DeviceName::new();
        owned
            .push_str(name)
            .map_err(|_| RegistrationError::Rejected)?;
        self.registered
            .push((owned, channels.len()))
            .map_err(|_| RegistrationError::Full)
    }

    fn unregister(&mut self, name: &str) {
        self.registered.retain(|(registered, _)| registered != name);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::channel::CHANNELS;

    #[test]
    fn test_transport_replays_script_in_order() {
        let mut transport = MockTransport::new();
        transport.push_reply(MockReply::Short(1)).unwrap();
        transport.push_reply(MockReply::Fail).unwrap();
        let bytes = [0x30, 0x00, 0x00];
        assert_eq!(transport.send(&bytes), Ok(1));
        assert_eq!(transport.send(&bytes), Err(MockBusError));
        assert_eq!(transport.send(&bytes), Ok(3));
        assert_eq!(transport.calls(), 3);
        assert_eq!(transport.frames().len(), 3);
    }

    #[test]
    fn test_transport_flags_frame_overflow() {
        let mut transport = MockTransport::new();
        let bytes = [0x30, 0x00, 0x00];
        for _ in 0..MAX_FRAMES {
            transport.send(&bytes).unwrap();
        }
        assert!(!transport.overflowed());

        transport.send(&bytes).unwrap();
        assert!(transport.overflowed());
        assert_eq!(transport.frames().len(), MAX_FRAMES);
        assert_eq!(transport.calls(), MAX_FRAMES + 1);
    }

    #[test]
    fn test_transport_skips_malformed_frames() {
        let mut transport = MockTransport::new();
        assert_eq!(transport.send(&[0x30]), Ok(1));
        assert_eq!(transport.calls(), 1);
        assert!(transport.frames().is_empty());
    }

    #[test]
    fn test_registrar_rejects_duplicate_names() {
        let mut registrar = MockRegistrar::new();
        registrar.register("DAC00", &CHANNELS).unwrap();
        assert_eq!(
            registrar.register("DAC00", &CHANNELS),
            Err(RegistrationError::NameInUse)
        );
        registrar.unregister("DAC00");
        assert!(registrar.is_empty());
    }

    #[test]
    fn test_registrar_reject_applies_once() {
        let mut registrar = MockRegistrar::new();
        registrar.reject_next(RegistrationError::Full);
        assert_eq!(
            registrar.register("DAC00", &CHANNELS),
            Err(RegistrationError::Full)
        );
        registrar.register("DAC00", &CHANNELS).unwrap();
        assert_eq!(registrar.registered().collect::<std::vec::Vec<_>>(), ["DAC00"]);
    }
}
