//! Device naming
//!
//! Every attach that gets past slot allocation draws the next sequence number
//! and turns it into a human-readable name: `DAC00`, `DAC01`, … The field is
//! two digits wide but grows as needed (`DAC100`), so names never collide.
//!
//! The counter is an atomic fetch-add. Attaches running in parallel on
//! different buses share one registry by reference and still get unique,
//! gap-free numbers. A number drawn by an attach that later fails is not
//! handed out again.

use core::fmt::Write;
use core::sync::atomic::{AtomicU32, Ordering};

/// "DAC" + up to 10 decimal digits of a `u32`.
pub const NAME_CAPACITY: usize = 16;

/// Device name storage.
pub type DeviceName = heapless::String<NAME_CAPACITY>;

/// Prefix of every device name.
pub const NAME_PREFIX: &str = "DAC";

/// Shared sequence counter for device names.
pub struct DeviceRegistry {
    next: AtomicU32,
}

impl DeviceRegistry {
    /// Registry starting at `DAC00`.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Registry whose first name uses `sequence`.
    pub const fn starting_at(sequence: u32) -> Self {
        Self {
            next: AtomicU32::new(sequence),
        }
    }

    /// Draw the next sequence number. Each call returns a distinct value
    /// until the counter wraps after `u32::MAX` draws.
    pub fn next_sequence(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Draw the next sequence number and format it as a device name.
    pub fn next_name(&self) -> Result<DeviceName, core::fmt::Error> {
        format_name(self.next_sequence())
    }

    /// The sequence number the next draw will return.
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Format `sequence` as `DAC` followed by at least two digits.
pub fn format_name(sequence: u32) -> Result<DeviceName, core::fmt::Error> {
    let mut name = DeviceName::new();
    write!(name, "{NAME_PREFIX}{sequence:02}")?;
    Ok(name)
}
