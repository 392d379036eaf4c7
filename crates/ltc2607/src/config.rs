//! Driver constants and match tables
//!
//! Everything the host needs to bind this driver to a chip, plus the values
//! used by the attach sequence. There is no runtime configuration.

use crate::channel::Channel;

/// Driver name as registered with the host bus framework.
pub const DRIVER_NAME: &str = "ltc2607";

/// Device-tree compatible strings this driver binds to.
pub const OF_MATCH_TABLE: &[&str] = &["arrow,ltc2607"];

/// Bus device-id table (non device-tree matching).
pub const I2C_ID_TABLE: &[&str] = &["ltc2607"];

/// 7-bit address of the first LTC2607 on the reference dual-DAC board.
pub const BOARD_ADDR_A: u8 = 0x72;

/// 7-bit address of the second LTC2607 on the reference dual-DAC board.
pub const BOARD_ADDR_B: u8 = 0x73;

/// Channel hit by the mandatory write during attach.
pub const INIT_CHANNEL: Channel = Channel::DacA;

/// Number of logical channels exposed per device.
pub const CHANNEL_COUNT: usize = 3;

/// Whether a device-tree `compatible` entry selects this driver.
pub fn matches_compatible(compatible: &str) -> bool {
    OF_MATCH_TABLE.contains(&compatible)
}

/// Whether a bus device-id entry selects this driver.
pub fn matches_id(id: &str) -> bool {
    I2C_ID_TABLE.contains(&id)
}
