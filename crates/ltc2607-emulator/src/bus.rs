//! Simulated I2C bus
//!
//! [`SimBus`] is a cheap-to-clone handle onto one shared bus. Every clone
//! sees the same chips, so one handle can go to each driver instance while
//! tests keep another to inspect outputs. Addresses with no chip, or with
//! NACK injection switched on, fail the transaction before any byte lands.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use ltc2607::CommandFrame;
use thiserror_no_std::Error;

use crate::chip::{ChipOutputs, Ltc2607Chip};

/// Bus-level failure seen by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// Nothing acknowledged the address.
    #[error("no acknowledge from {address:#04x}")]
    Nack {
        /// 7-bit target address.
        address: u8,
    },
    /// A write did not carry exactly one command frame.
    #[error("{len}-byte write to {address:#04x} is not a command frame")]
    Malformed {
        /// 7-bit target address.
        address: u8,
        /// Bytes in the rejected write.
        len: usize,
    },
    /// The LTC2607 has no readable registers.
    #[error("read from write-only device {address:#04x}")]
    ReadUnsupported {
        /// 7-bit target address.
        address: u8,
    },
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Nack { .. } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::ReadUnsupported { .. } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Self::Malformed { .. } => ErrorKind::Other,
        }
    }
}

#[derive(Default)]
struct BusState {
    chips: BTreeMap<u8, Ltc2607Chip>,
    nack: BTreeSet<u8>,
    transactions: u64,
}

/// Shared handle onto a simulated I2C bus.
#[derive(Clone, Default)]
pub struct SimBus {
    state: Arc<Mutex<BusState>>,
}

impl SimBus {
    /// Empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a powered-on chip at `address`. Returns `false` if the address is taken.
    pub fn add_chip(&self, address: u8) -> bool {
        let mut state = self.lock();
        if state.chips.contains_key(&address) {
            return false;
        }
        state.chips.insert(address, Ltc2607Chip::new());
        tracing::debug!(address, "chip added to bus");
        true
    }

    /// Pull the chip at `address` off the bus.
    pub fn remove_chip(&self, address: u8) -> Option<Ltc2607Chip> {
        self.lock().chips.remove(&address)
    }

    /// Snapshot of the chip at `address`.
    pub fn chip(&self, address: u8) -> Option<Ltc2607Chip> {
        self.lock().chips.get(&address).cloned()
    }

    /// Output codes of the chip at `address`.
    pub fn outputs(&self, address: u8) -> Option<ChipOutputs> {
        self.lock().chips.get(&address).map(Ltc2607Chip::outputs)
    }

    /// Make `address` NACK every transaction while `enabled`.
    pub fn set_nack(&self, address: u8, enabled: bool) {
        let mut state = self.lock();
        if enabled {
            state.nack.insert(address);
        } else {
            state.nack.remove(&address);
        }
    }

    /// Transactions attempted on the bus, successful or not.
    pub fn transactions(&self) -> u64 {
        self.lock().transactions
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        // chip state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorType for SimBus {
    type Error = BusError;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.transactions = state.transactions.saturating_add(1);

        if state.nack.contains(&address) {
            tracing::debug!(address, "injected nack");
            return Err(BusError::Nack { address });
        }
        let chip = state
            .chips
            .get_mut(&address)
            .ok_or(BusError::Nack { address })?;

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    let frame = CommandFrame::try_from(*bytes)
                        .map_err(|len| BusError::Malformed { address, len })?;
                    chip.apply(&frame);
                }
                Operation::Read(_) => return Err(BusError::ReadUnsupported { address }),
            }
        }
        Ok(())
    }
}
