//! Attach / detach lifecycle
//!
//! ```text
//! Uninitialized ──attach──▶ Attaching ──init write + register──▶ Attached ──detach──▶ Detached
//!                               │
//!                               └── failure: slot released, nothing registered
//! ```
//!
//! The host framework decides when [`Ltc2607Driver::attach`] and
//! [`Ltc2607Driver::detach`] run; the driver only relies on attach happening
//! before any write and detach being final. There is no re-attach: a chip
//! that comes back is a new device with a new name.
//!
//! # Failure ordering
//!
//! 1. No free slot → [`Error::AllocationFailure`]; no sequence number is drawn.
//! 2. Name drawn from the [`DeviceRegistry`]. From here on the number is spent.
//! 3. Init write (DAC A, full scale) fails → transport error; slot stays free.
//! 4. Framework rejects the channels → [`Error::Registration`]. The init
//!    write has already reached the chip at this point.

use core::fmt;

use crate::channel::ChannelAttribute;
use crate::device::DacDevice;
use crate::error::Error;
use crate::framework::ChannelRegistrar;
use crate::registry::{format_name, DeviceRegistry};
use crate::transport::Transport;

/// Lifecycle of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleState {
    /// Constructed, no I/O yet.
    Uninitialized,
    /// Init write in flight or failed; not registered.
    Attaching,
    /// Registered and accepting writes.
    Attached,
    /// Removed. Terminal.
    Detached,
}

impl LifecycleState {
    /// Lower-case state name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Attaching => "attaching",
            Self::Attached => "attached",
            Self::Detached => "detached",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to an attached device.
///
/// Carries the registry sequence number, so a handle kept past
/// [`Ltc2607Driver::detach`] never reaches a later device in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceHandle {
    slot: usize,
    sequence: u32,
}

impl DeviceHandle {
    /// Registry sequence number the device was named from.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

struct Slot<T> {
    sequence: u32,
    device: DacDevice<T>,
}

/// Lifecycle controller for up to `N` LTC2607 devices sharing one transport type.
pub struct Ltc2607Driver<'r, T, R, const N: usize> {
    registry: &'r DeviceRegistry,
    framework: R,
    slots: [Option<Slot<T>>; N],
}

impl<'r, T, R, const N: usize> Ltc2607Driver<'r, T, R, N>
where
    T: Transport,
    R: ChannelRegistrar,
{
    /// Controller naming devices from `registry` and publishing them to `framework`.
    pub fn new(registry: &'r DeviceRegistry, framework: R) -> Self {
        Self {
            registry,
            framework,
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Bind a newly discovered chip reachable through `transport`.
    // the error arms carry defmt log sites
    #[allow(clippy::question_mark)]
    pub fn attach(&mut self, transport: T) -> Result<DeviceHandle, Error<T::Error>> {
        let Some((slot, entry)) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.is_none())
        else {
            #[cfg(feature = "defmt")]
            defmt::warn!("ltc2607: no free device slot ({=usize} in use)", N);
            return Err(Error::AllocationFailure);
        };

        let sequence = self.registry.next_sequence();
        let name = format_name(sequence).map_err(|_| Error::AllocationFailure)?;
        let mut device = DacDevice::new(name, transport);

        #[cfg(feature = "defmt")]
        defmt::info!("{=str}: probe", device.name());

        if let Err(err) = device.initialize() {
            #[cfg(feature = "defmt")]
            defmt::error!("{=str}: init write failed: {=str}", device.name(), err.kind());
            return Err(err);
        }

        if let Err(err) = self.framework.register(device.name(), device.channels()) {
            #[cfg(feature = "defmt")]
            defmt::error!("{=str}: channel registration failed: {=str}", device.name(), err.as_str());
            return Err(Error::Registration(err));
        }

        device.mark_attached();
        #[cfg(feature = "defmt")]
        defmt::info!("{=str}: registered", device.name());

        *entry = Some(Slot { sequence, device });
        Ok(DeviceHandle { slot, sequence })
    }

    /// Unbind a device. Always succeeds; stale handles are ignored.
    ///
    /// The chip is left driving whatever it was last told.
    pub fn detach(&mut self, handle: DeviceHandle) {
        let Some(entry) = self.slots.get_mut(handle.slot) else {
            return;
        };
        if entry.as_ref().map(|slot| slot.sequence) != Some(handle.sequence) {
            return;
        }
        if let Some(mut slot) = entry.take() {
            self.framework.unregister(slot.device.name());
            slot.device.detach();
        }
    }

    /// Write a raw code to a logical channel of an attached device.
    pub fn write(
        &mut self,
        handle: DeviceHandle,
        logical_channel: u32,
        value: i32,
    ) -> Result<(), Error<T::Error>> {
        self.attached_mut(handle)?.write(logical_channel, value)
    }

    /// Framework write callback; see [`DacDevice::write_raw`].
    pub fn write_raw(
        &mut self,
        handle: DeviceHandle,
        logical_channel: u32,
        val: i32,
        val2: i32,
        attribute: ChannelAttribute,
    ) -> Result<(), Error<T::Error>> {
        self.attached_mut(handle)?
            .write_raw(logical_channel, val, val2, attribute)
    }

    /// The device behind `handle`, if it is still attached.
    pub fn device(&self, handle: DeviceHandle) -> Option<&DacDevice<T>> {
        self.slots
            .get(handle.slot)?
            .as_ref()
            .filter(|slot| slot.sequence == handle.sequence)
            .map(|slot| &slot.device)
    }

    /// State of the device behind `handle`. Handles that no longer resolve are `Detached`.
    pub fn state(&self, handle: DeviceHandle) -> LifecycleState {
        self.device(handle)
            .map_or(LifecycleState::Detached, DacDevice::state)
    }

    /// Handles and names of every attached device, in slot order.
    pub fn attached(&self) -> impl Iterator<Item = (DeviceHandle, &str)> + '_ {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| {
            entry.as_ref().map(|entry| {
                (
                    DeviceHandle {
                        slot,
                        sequence: entry.sequence,
                    },
                    entry.device.name(),
                )
            })
        })
    }

    /// Borrow the framework collaborator.
    pub fn framework(&self) -> &R {
        &self.framework
    }

    /// Maximum number of simultaneously attached devices.
    pub const fn capacity(&self) -> usize {
        N
    }

    fn attached_mut(&mut self, handle: DeviceHandle) -> Result<&mut DacDevice<T>, Error<T::Error>> {
        self.slots
            .get_mut(handle.slot)
            .and_then(Option::as_mut)
            .filter(|slot| slot.sequence == handle.sequence)
            .map(|slot| &mut slot.device)
            .ok_or(Error::InvalidState(LifecycleState::Detached))
    }
}
