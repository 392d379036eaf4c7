//! Host-side emulation for the LTC2607 driver
//!
//! Runs the `ltc2607` driver core against a register-level model of the chip
//! without hardware:
//!
//! - [`chip::Ltc2607Chip`]: input / output registers for DAC A and B
//! - [`bus::SimBus`]: a shared I2C bus implementing `embedded_hal::i2c::I2c`,
//!   with per-address NACK injection
//! - [`host::IioCore`] and [`host::Host`]: a numeric-I/O framework and the
//!   discovery loop that binds the driver to matching board entries
//!
//! Logging goes through `tracing`; call [`logging::init`] once from a binary
//! or test to see it.

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code

pub mod bus;
pub mod chip;
pub mod host;
pub mod logging;

pub use bus::{BusError, SimBus};
pub use chip::{ChipOutputs, Ltc2607Chip};
pub use host::{BoardEntry, Host, IioCore};
