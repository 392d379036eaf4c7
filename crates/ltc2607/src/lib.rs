//! Driver core for the Linear Technology LTC2607 dual 16-bit DAC
//!
//! The LTC2607 is a write-only I²C DAC with two outputs (A and B). This crate
//! owns everything that has real design content: naming device instances,
//! mapping logical channels to chip sub-addresses, encoding 3-byte command
//! frames, classifying transport failures and driving the attach / detach
//! lifecycle. The bus, the numeric-I/O framework and device discovery are
//! collaborators reached through narrow traits.
//!
//! # Layers
//!
//! ```text
//! Host framework (discovery, numeric-I/O channels)
//!         ↓  attach / detach / write_raw
//! Lifecycle controller (Ltc2607Driver)
//!         ↓
//! DacDevice ── ChannelMap ── CommandEncoder
//!         ↓
//! Transport (I2cTransport over embedded-hal, or a mock)
//! ```
//!
//! # Features
//!
//! - `std`: mock collaborators for host tests ([`mocks`])
//! - `defmt`: defmt derives and log sites for hardware builds
//!
//! # Example
//!
//! ```no_run
//! use ltc2607::{DeviceRegistry, I2cTransport, Ltc2607Driver, ChannelRegistrar};
//!
//! fn bring_up<I, R>(bus: I, framework: R) -> Result<(), ltc2607::Error<I::Error>>
//! where
//!     I: embedded_hal::i2c::I2c,
//!     R: ChannelRegistrar,
//! {
//!     static REGISTRY: DeviceRegistry = DeviceRegistry::new();
//!
//!     let mut driver: Ltc2607Driver<'_, _, _, 2> = Ltc2607Driver::new(&REGISTRY, framework);
//!     let dac = driver.attach(I2cTransport::new(bus, ltc2607::config::BOARD_ADDR_A))?;
//!     driver.write(dac, 1, 0x8000)?;
//!     driver.detach(dac);
//!     Ok(())
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_code)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)] // chip and register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod channel;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod framework;
pub mod lifecycle;
pub mod mocks;
pub mod registry;
pub mod transport;

pub use channel::{physical_address, Channel, ChannelAttribute, ChannelKind, ChannelSpec, CHANNELS};
pub use command::{encode, Command, CommandFrame, FRAME_LEN, RAW_MAX};
pub use device::DacDevice;
pub use error::{Error, InvalidValue, RegistrationError, TransportFailure};
pub use framework::ChannelRegistrar;
pub use lifecycle::{DeviceHandle, LifecycleState, Ltc2607Driver};
pub use registry::{DeviceName, DeviceRegistry};
pub use transport::{I2cTransport, Transport};
