//! Numeric-I/O framework seam
//!
//! After the initialization write succeeds the driver publishes the device's
//! channel table to whatever framework exposes numeric channels to the rest
//! of the system. Requests then come back through
//! [`Ltc2607Driver::write_raw`](crate::Ltc2607Driver::write_raw).

use crate::channel::ChannelSpec;
use crate::error::RegistrationError;

/// Channel registration contract consumed by the lifecycle controller.
pub trait ChannelRegistrar {
    /// Publish `channels` under `name`.
    fn register(
        &mut self,
        name: &str,
        channels: &'static [ChannelSpec],
    ) -> Result<(), RegistrationError>;

    /// Withdraw everything registered under `name`. Unknown names are ignored.
    fn unregister(&mut self, name: &str);
}

impl<R: ChannelRegistrar + ?Sized> ChannelRegistrar for &mut R {
    fn register(
        &mut self,
        name: &str,
        channels: &'static [ChannelSpec],
    ) -> Result<(), RegistrationError> {
        (**self).register(name, channels)
    }

    fn unregister(&mut self, name: &str) {
        (**self).unregister(name);
    }
}
