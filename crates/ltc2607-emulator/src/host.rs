//! Simulated host: numeric-I/O framework and device discovery
//!
//! [`IioCore`] stands in for the kernel-side framework that publishes
//! channels; [`Host`] walks board entries, binds the driver to the ones whose
//! name appears in the driver's match tables and routes channel writes to
//! the right device.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ltc2607::config::{matches_compatible, matches_id};
use ltc2607::{
    ChannelAttribute, ChannelRegistrar, ChannelSpec, DeviceHandle, DeviceRegistry, Error,
    I2cTransport, LifecycleState, Ltc2607Driver, RegistrationError,
};

use crate::bus::{BusError, SimBus};

/// Default number of devices [`IioCore`] accepts.
pub const DEFAULT_IIO_CAPACITY: usize = 8;

struct IioState {
    devices: BTreeMap<String, &'static [ChannelSpec]>,
    capacity: usize,
    reject_next: Option<RegistrationError>,
}

/// Shared numeric-I/O framework. Clones refer to the same device table.
#[derive(Clone)]
pub struct IioCore {
    state: Arc<Mutex<IioState>>,
}

impl Default for IioCore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_IIO_CAPACITY)
    }
}

impl IioCore {
    /// Framework accepting [`DEFAULT_IIO_CAPACITY`] devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Framework accepting at most `capacity` devices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(IioState {
                devices: BTreeMap::new(),
                capacity,
                reject_next: None,
            })),
        }
    }

    /// Fail the next registration with `err`.
    pub fn reject_next(&self, err: RegistrationError) {
        self.lock().reject_next = Some(err);
    }

    /// Registered device names, sorted.
    pub fn devices(&self) -> Vec<String> {
        self.lock().devices.keys().cloned().collect()
    }

    /// Channel table published under `name`.
    pub fn channels(&self, name: &str) -> Option<&'static [ChannelSpec]> {
        self.lock().devices.get(name).copied()
    }

    /// Whether `name` is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().devices.contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, IioState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChannelRegistrar for IioCore {
    fn register(
        &mut self,
        name: &str,
        channels: &'static [ChannelSpec],
    ) -> Result<(), RegistrationError> {
        let mut state = self.lock();
        if let Some(err) = state.reject_next.take() {
            tracing::warn!(device = name, reason = err.as_str(), "iio registration refused");
            return Err(err);
        }
        if state.devices.contains_key(name) {
            return Err(RegistrationError::NameInUse);
        }
        if state.devices.len() >= state.capacity {
            return Err(RegistrationError::Full);
        }
        state.devices.insert(name.to_owned(), channels);
        tracing::info!(device = name, channels = channels.len(), "iio device registered");
        Ok(())
    }

    fn unregister(&mut self, name: &str) {
        if self.lock().devices.remove(name).is_some() {
            tracing::info!(device = name, "iio device unregistered");
        }
    }
}

/// One device node on the board: a match name and its bus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    /// Device-tree `compatible` string or bus device id.
    pub name: String,
    /// 7-bit I2C address.
    pub address: u8,
}

impl BoardEntry {
    /// Entry for `name` at `address`.
    pub fn new(name: impl Into<String>, address: u8) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// Whether the LTC2607 driver binds to this entry.
    pub fn matches(&self) -> bool {
        matches_compatible(&self.name) || matches_id(&self.name)
    }
}

type HostDriver<'r, const N: usize> = Ltc2607Driver<'r, I2cTransport<SimBus>, IioCore, N>;

/// Discovery loop and request router for up to `N` LTC2607 devices.
pub struct Host<'r, const N: usize> {
    bus: SimBus,
    driver: HostDriver<'r, N>,
    bound: BTreeMap<u8, DeviceHandle>,
}

impl<'r, const N: usize> Host<'r, N> {
    /// Host on `bus`, naming devices from `registry` and publishing them to `iio`.
    pub fn new(registry: &'r DeviceRegistry, bus: SimBus, iio: IioCore) -> Self {
        Self {
            bus,
            driver: Ltc2607Driver::new(registry, iio),
            bound: BTreeMap::new(),
        }
    }

    /// Bind the driver to `entry`.
    ///
    /// Returns `None` when the entry does not match the driver or its
    /// address is already bound.
    pub fn probe(&mut self, entry: &BoardEntry) -> Option<Result<DeviceHandle, Error<BusError>>> {
        if !entry.matches() || self.bound.contains_key(&entry.address) {
            return None;
        }
        let transport = I2cTransport::new(self.bus.clone(), entry.address);
        let result = self.driver.attach(transport);
        match &result {
            Ok(handle) => {
                tracing::info!(
                    address = entry.address,
                    device = self.name(*handle).unwrap_or_default(),
                    "ltc2607 attached"
                );
                self.bound.insert(entry.address, *handle);
            }
            Err(err) => {
                tracing::warn!(
                    address = entry.address,
                    error = %err,
                    bus = err.transport_error().map(tracing::field::display),
                    "ltc2607 probe failed"
                );
            }
        }
        Some(result)
    }

    /// Probe every entry. Returns how many devices ended up attached.
    pub fn probe_all(&mut self, entries: &[BoardEntry]) -> usize {
        entries
            .iter()
            .filter_map(|entry| self.probe(entry))
            .filter(Result::is_ok)
            .count()
    }

    /// Detach whatever is bound at `address`. Returns `false` if nothing was.
    pub fn remove(&mut self, address: u8) -> bool {
        let Some(handle) = self.bound.remove(&address) else {
            return false;
        };
        self.driver.detach(handle);
        tracing::info!(address, "ltc2607 detached");
        true
    }

    /// Detach every bound device.
    pub fn shutdown(&mut self) {
        for (_, handle) in std::mem::take(&mut self.bound) {
            self.driver.detach(handle);
        }
    }

    /// Framework write of `value` to `attribute` on the device at `address`.
    pub fn write_raw(
        &mut self,
        address: u8,
        channel: u32,
        value: i32,
        attribute: ChannelAttribute,
    ) -> Result<(), Error<BusError>> {
        let handle = self.handle(address)?;
        self.driver.write_raw(handle, channel, value, 0, attribute)
    }

    /// Raw code write to the device at `address`.
    pub fn write(&mut self, address: u8, channel: u32, value: i32) -> Result<(), Error<BusError>> {
        self.write_raw(address, channel, value, ChannelAttribute::Raw)
    }

    /// Name of the device behind `handle`.
    pub fn name(&self, handle: DeviceHandle) -> Option<&str> {
        self.driver.device(handle).map(|device| device.name())
    }

    /// Handle bound at `address`.
    pub fn handle(&self, address: u8) -> Result<DeviceHandle, Error<BusError>> {
        self.bound
            .get(&address)
            .copied()
            .ok_or(Error::InvalidState(LifecycleState::Detached))
    }

    /// Bound addresses and device names, by address.
    pub fn bound(&self) -> Vec<(u8, String)> {
        self.bound
            .iter()
            .filter_map(|(address, handle)| Some((*address, self.name(*handle)?.to_owned())))
            .collect()
    }

    /// The simulated bus.
    pub fn bus(&self) -> &SimBus {
        &self.bus
    }

    /// The framework the driver publishes to.
    pub fn iio(&self) -> &IioCore {
        self.driver.framework()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::chip::ChipOutputs;
    use ltc2607::config::{BOARD_ADDR_A, BOARD_ADDR_B};
    use ltc2607::{InvalidValue, TransportFailure};

    fn board() -> (SimBus, Vec<BoardEntry>) {
        let bus = SimBus::new();
        bus.add_chip(BOARD_ADDR_A);
        bus.add_chip(BOARD_ADDR_B);
        let entries = vec![
            BoardEntry::new("arrow,ltc2607", BOARD_ADDR_A),
            BoardEntry::new("ltc2607", BOARD_ADDR_B),
            BoardEntry::new("adi,ad5686", 0x0C),
        ];
        (bus, entries)
    }

    #[test]
    fn test_board_entry_matching() {
        assert!(BoardEntry::new("arrow,ltc2607", 0x72).matches());
        assert!(BoardEntry::new("ltc2607", 0x72).matches());
        assert!(!BoardEntry::new("adi,ad5686", 0x0C).matches());
    }

    #[test]
    fn test_probe_all_binds_matching_entries() {
        let registry = DeviceRegistry::new();
        let (bus, entries) = board();
        let mut host: Host<'_, 2> = Host::new(&registry, bus.clone(), IioCore::new());

        assert_eq!(host.probe_all(&entries), 2);
        assert_eq!(
            host.bound(),
            [(BOARD_ADDR_A, "DAC00".to_owned()), (BOARD_ADDR_B, "DAC01".to_owned())]
        );
        assert_eq!(host.iio().devices(), ["DAC00", "DAC01"]);
        assert_eq!(host.iio().channels("DAC01").map(<[_]>::len), Some(3));
        // init write left DAC A at full scale on both chips
        assert_eq!(bus.outputs(BOARD_ADDR_A), Some(ChipOutputs { a: 0xFFFF, b: 0 }));
        assert_eq!(bus.outputs(BOARD_ADDR_B), Some(ChipOutputs { a: 0xFFFF, b: 0 }));
    }

    #[test]
    fn test_writes_move_chip_outputs() {
        let registry = DeviceRegistry::new();
        let (bus, entries) = board();
        let mut host: Host<'_, 2> = Host::new(&registry, bus.clone(), IioCore::new());
        host.probe_all(&entries);

        host.write(BOARD_ADDR_B, 1, 0x2000).unwrap();
        host.write(BOARD_ADDR_A, 2, 0x0100).unwrap();
        assert_eq!(bus.outputs(BOARD_ADDR_A), Some(ChipOutputs { a: 0x0100, b: 0x0100 }));
        assert_eq!(bus.outputs(BOARD_ADDR_B), Some(ChipOutputs { a: 0xFFFF, b: 0x2000 }));

        assert_eq!(
            host.write_raw(BOARD_ADDR_A, 0, 1, ChannelAttribute::Scale),
            Err(Error::InvalidValue(InvalidValue::UnsupportedAttribute))
        );
    }

    #[test]
    fn test_absent_chip_fails_probe() {
        let registry = DeviceRegistry::new();
        let bus = SimBus::new();
        let mut host: Host<'_, 2> = Host::new(&registry, bus, IioCore::new());

        let result = host.probe(&BoardEntry::new("ltc2607", 0x72)).unwrap();
        assert_eq!(
            result,
            Err(Error::Transport(TransportFailure::Hard(BusError::Nack { address: 0x72 })))
        );
        let err = result.unwrap_err();
        assert_eq!(err.transport_error(), Some(&BusError::Nack { address: 0x72 }));
        assert_eq!(
            err.transport_error().map(ToString::to_string).as_deref(),
            Some("no acknowledge from 0x72")
        );
        assert!(host.iio().devices().is_empty());
        assert!(host.bound().is_empty());
    }

    #[test]
    fn test_full_framework_refuses_second_device() {
        let registry = DeviceRegistry::new();
        let (bus, entries) = board();
        let mut host: Host<'_, 2> = Host::new(&registry, bus, IioCore::with_capacity(1));

        assert_eq!(host.probe_all(&entries), 1);
        assert_eq!(
            host.probe(&entries[1]),
            Some(Err(Error::Registration(RegistrationError::Full)))
        );
    }

    #[test]
    fn test_remove_and_shutdown() {
        let registry = DeviceRegistry::new();
        let (bus, entries) = board();
        let mut host: Host<'_, 2> = Host::new(&registry, bus.clone(), IioCore::new());
        host.probe_all(&entries);

        assert!(host.remove(BOARD_ADDR_A));
        assert!(!host.remove(BOARD_ADDR_A));
        assert_eq!(
            host.write(BOARD_ADDR_A, 0, 1),
            Err(Error::InvalidState(LifecycleState::Detached))
        );
        assert_eq!(host.iio().devices(), ["DAC01"]);

        host.shutdown();
        assert!(host.iio().devices().is_empty());
        // chips keep their last codes after detach
        assert_eq!(bus.outputs(BOARD_ADDR_B).map(|o| o.a), Some(0xFFFF));
    }

    #[test]
    fn test_reprobe_after_remove_gets_new_name() {
        let registry = DeviceRegistry::new();
        let (bus, entries) = board();
        let mut host: Host<'_, 2> = Host::new(&registry, bus, IioCore::new());
        host.probe(&entries[0]).unwrap().unwrap();
        host.remove(BOARD_ADDR_A);

        let handle = host.probe(&entries[0]).unwrap().unwrap();
        assert_eq!(host.name(handle), Some("DAC01"));
    }
}
