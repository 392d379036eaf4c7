//! Transport abstraction
//!
//! The driver needs exactly one bus primitive: push N bytes to the chip in a
//! single blocking transaction and learn how many were taken. Timeouts and
//! retries belong to whoever implements [`Transport`].

use embedded_hal::i2c::I2c;

use crate::command::{CommandFrame, FRAME_LEN};
use crate::error::TransportFailure;

/// Synchronous, single-shot send primitive.
pub trait Transport {
    /// Error reported by the underlying bus.
    type Error: core::fmt::Debug;

    /// Send `bytes` in one transaction, returning how many were accepted.
    ///
    /// No partial-write continuation: a short count is final.
    fn send(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        (**self).send(bytes)
    }
}

/// Send one frame, classifying the outcome.
///
/// - call fails → [`TransportFailure::Hard`]
/// - call returns anything but [`FRAME_LEN`] → [`TransportFailure::Partial`]
pub fn send_frame<T: Transport + ?Sized>(
    transport: &mut T,
    frame: &CommandFrame,
) -> Result<(), TransportFailure<T::Error>> {
    let sent = transport.send(frame.bytes()).map_err(TransportFailure::Hard)?;
    if sent == FRAME_LEN {
        Ok(())
    } else {
        Err(TransportFailure::Partial {
            sent,
            expected: FRAME_LEN,
        })
    }
}

/// [`Transport`] over an `embedded-hal` I²C bus and a 7-bit slave address.
///
/// `embedded-hal` writes are all-or-nothing, so a successful write reports
/// the full length.
pub struct I2cTransport<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cTransport<I> {
    /// Bind `i2c` to the chip at `address`.
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// 7-bit slave address this transport talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> Transport for I2cTransport<I> {
    type Error = I::Error;

    fn send(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        self.i2c.write(self.address, bytes)?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::command::encode;
    use crate::mocks::{MockReply, MockTransport};

    #[test]
    fn test_send_frame_accepts_full_write() {
        let mut transport = MockTransport::new();
        let frame = encode(0x1, 0x1234).unwrap();
        assert_eq!(send_frame(&mut transport, &frame), Ok(()));
        assert_eq!(transport.frames(), &[frame]);
    }

    #[test]
    fn test_send_frame_flags_short_write() {
        let mut transport = MockTransport::new();
        transport.push_reply(MockReply::Short(2)).unwrap();
        let frame = encode(0x0, 0).unwrap();
        assert_eq!(
            send_frame(&mut transport, &frame),
            Err(TransportFailure::Partial { sent: 2, expected: 3 })
        );
    }

    #[test]
    fn test_send_frame_flags_bus_error() {
        let mut transport = MockTransport::new();
        transport.push_reply(MockReply::Fail).unwrap();
        let frame = encode(0x0, 0).unwrap();
        assert!(matches!(
            send_frame(&mut transport, &frame),
            Err(TransportFailure::Hard(_))
        ));
    }

    fn send_owned<T: Transport>(mut transport: T) -> Result<usize, T::Error> {
        transport.send(&[0x30, 0x00, 0x01])
    }

    #[test]
    fn test_borrowed_transport_forwards() {
        let mut transport = MockTransport::new();
        assert_eq!(send_owned(&mut transport), Ok(3));
        assert_eq!(transport.calls(), 1);
    }
}
