//! One attached LTC2607
//!
//! A [`DacDevice`] owns its transport outright; nothing else may talk to the
//! chip behind it. All operations are blocking and strictly sequential, so
//! the device needs no internal locking.

use crate::channel::{Channel, ChannelAttribute, ChannelSpec, CHANNELS};
use crate::command::{encode, RAW_MAX};
use crate::config::INIT_CHANNEL;
use crate::error::{Error, InvalidValue};
use crate::lifecycle::LifecycleState;
use crate::registry::DeviceName;
use crate::transport::{send_frame, Transport};

/// A named LTC2607 instance and its transport.
pub struct DacDevice<T> {
    name: DeviceName,
    transport: T,
    state: LifecycleState,
}

impl<T: Transport> DacDevice<T> {
    /// Wrap `transport` under `name`. No I/O happens until [`initialize`](Self::initialize).
    pub fn new(name: DeviceName, transport: T) -> Self {
        Self {
            name,
            transport,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Name assigned by the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Channel table exposed to the framework.
    pub fn channels(&self) -> &'static [ChannelSpec] {
        &CHANNELS
    }

    /// Enter `Attaching` and send the mandatory full-scale write to DAC A.
    ///
    /// Only valid from `Uninitialized`.
    pub fn initialize(&mut self) -> Result<(), Error<T::Error>> {
        if self.state != LifecycleState::Uninitialized {
            return Err(Error::InvalidState(self.state));
        }
        self.state = LifecycleState::Attaching;
        self.send_value(INIT_CHANNEL, RAW_MAX)
    }

    pub(crate) fn mark_attached(&mut self) {
        if self.state == LifecycleState::Attaching {
            self.state = LifecycleState::Attached;
        }
    }

    /// Drive `value` onto `logical_channel`.
    ///
    /// Succeeds only when the transport accepted the whole frame. Validation
    /// failures never reach the transport.
    pub fn write(&mut self, logical_channel: u32, value: i32) -> Result<(), Error<T::Error>> {
        if self.state != LifecycleState::Attached {
            return Err(Error::InvalidState(self.state));
        }
        let channel = Channel::from_index(logical_channel)?;
        self.send_value(channel, value)
    }

    /// Framework entry point: write `val` to `attribute` of `logical_channel`.
    ///
    /// Only [`ChannelAttribute::Raw`] is writable. `_val2` carries the
    /// fractional part for scaled attributes and is unused for raw codes.
    pub fn write_raw(
        &mut self,
        logical_channel: u32,
        val: i32,
        _val2: i32,
        attribute: ChannelAttribute,
    ) -> Result<(), Error<T::Error>> {
        match attribute {
            ChannelAttribute::Raw => self.write(logical_channel, val),
            ChannelAttribute::Scale | ChannelAttribute::Offset => {
                Err(InvalidValue::UnsupportedAttribute.into())
            }
        }
    }

    /// Move to `Detached`. The chip keeps driving its last code.
    pub fn detach(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::info!("{=str}: detached", self.name.as_str());
        self.state = LifecycleState::Detached;
    }

    /// Hand the transport back, consuming the device.
    pub fn release(self) -> T {
        self.transport
    }

    fn send_value(&mut self, channel: Channel, value: i32) -> Result<(), Error<T::Error>> {
        let frame = encode(channel.physical_address(), value)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("{=str}: send {=[u8]:x}", self.name.as_str(), &frame.bytes()[..]);
        send_frame(&mut self.transport, &frame)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::TransportFailure;
    use crate::mocks::{MockReply, MockTransport};
    use crate::registry::format_name;

    fn attached(transport: &mut MockTransport) -> DacDevice<&mut MockTransport> {
        let mut device = DacDevice::new(format_name(0).unwrap(), transport);
        device.initialize().unwrap();
        device.mark_attached();
        device
    }

    #[test]
    fn test_new_device_is_uninitialized() {
        let mut transport = MockTransport::new();
        let device = DacDevice::new(format_name(3).unwrap(), &mut transport);
        assert_eq!(device.name(), "DAC03");
        assert_eq!(device.state(), LifecycleState::Uninitialized);
        assert_eq!(device.channels().len(), 3);
        drop(device);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_initialize_sends_full_scale_to_dac_a() {
        let mut transport = MockTransport::new();
        let mut device = DacDevice::new(format_name(0).unwrap(), &mut transport);
        device.initialize().unwrap();
        assert_eq!(device.state(), LifecycleState::Attaching);
        drop(device);
        assert_eq!(transport.sent_bytes(0), Some(&[0x30, 0xFF, 0xFF]));
    }

    #[test]
    fn test_initialize_twice_is_rejected() {
        let mut transport = MockTransport::new();
        let mut device = attached(&mut transport);
        assert_eq!(
            device.initialize(),
            Err(Error::InvalidState(LifecycleState::Attached))
        );
    }

    #[test]
    fn test_write_each_channel() {
        let mut transport = MockTransport::new();
        let mut device = attached(&mut transport);
        device.write(0, 0x0102).unwrap();
        device.write(1, 0xABCD).unwrap();
        device.write(2, 0).unwrap();
        drop(device);
        assert_eq!(transport.calls(), 4);
        assert_eq!(transport.sent_bytes(1), Some(&[0x30, 0x01, 0x02]));
        assert_eq!(transport.sent_bytes(2), Some(&[0x31, 0xAB, 0xCD]));
        assert_eq!(transport.sent_bytes(3), Some(&[0x3F, 0x00, 0x00]));
    }

    #[test]
    fn test_out_of_range_write_never_reaches_transport() {
        let mut transport = MockTransport::new();
        let mut device = attached(&mut transport);
        assert_eq!(
            device.write(0, 70000),
            Err(Error::InvalidValue(InvalidValue::OutOfRange { value: 70000 }))
        );
        assert_eq!(
            device.write(5, 1),
            Err(Error::InvalidValue(InvalidValue::UnmappedChannel { channel: 5 }))
        );
        drop(device);
        // only the init frame
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_write_before_attach_is_rejected() {
        let mut transport = MockTransport::new();
        let mut device = DacDevice::new(format_name(0).unwrap(), &mut transport);
        assert_eq!(
            device.write(0, 1),
            Err(Error::InvalidState(LifecycleState::Uninitialized))
        );
        drop(device);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_write_after_detach_is_rejected() {
        let mut transport = MockTransport::new();
        let mut device = attached(&mut transport);
        device.detach();
        assert_eq!(
            device.write(1, 1),
            Err(Error::InvalidState(LifecycleState::Detached))
        );
    }

    #[test]
    fn test_detach_from_attaching_succeeds() {
        let mut transport = MockTransport::new();
        transport.push_reply(MockReply::Short(1)).unwrap();
        let mut device = DacDevice::new(format_name(0).unwrap(), &mut transport);
        assert!(device.initialize().is_err());
        assert_eq!(device.state(), LifecycleState::Attaching);
        device.detach();
        assert_eq!(device.state(), LifecycleState::Detached);
    }

    #[test]
    fn test_partial_write_is_reported() {
        let mut transport = MockTransport::new();
        let mut device = attached(&mut transport);
        device.transport.push_reply(MockReply::Short(2)).unwrap();
        assert_eq!(
            device.write(1, 5),
            Err(Error::Transport(TransportFailure::Partial { sent: 2, expected: 3 }))
        );
    }

    #[test]
    fn test_write_raw_only_accepts_raw() {
        let mut transport = MockTransport::new();
        let mut device = attached(&mut transport);
        device.write_raw(1, 0x4000, 0, ChannelAttribute::Raw).unwrap();
        assert_eq!(
            device.write_raw(1, 1, 0, ChannelAttribute::Scale),
            Err(Error::InvalidValue(InvalidValue::UnsupportedAttribute))
        );
        assert_eq!(
            device.write_raw(1, 1, 0, ChannelAttribute::Offset),
            Err(Error::InvalidValue(InvalidValue::UnsupportedAttribute))
        );
        drop(device);
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_release_returns_transport() {
        let device = DacDevice::new(format_name(0).unwrap(), MockTransport::new());
        let transport = device.release();
        assert_eq!(transport.calls(), 0);
    }
}
