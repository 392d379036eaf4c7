//! LTC2607 command frames
//!
//! Every transaction is three bytes:
//!
//! ```text
//! byte 0   C3 C2 C1 C0 A3 A2 A1 A0   command nibble | sub-address nibble
//! byte 1   D15 .. D8                 code, high byte
//! byte 2   D7  .. D0                 code, low byte
//! ```
//!
//! The driver always sends [`Command::WriteAndUpdate`]: the code lands in the
//! input register and is transferred to the output in the same frame.

use crate::error::InvalidValue;

/// Bytes in one command frame.
pub const FRAME_LEN: usize = 3;

/// Largest raw code the DAC accepts.
pub const RAW_MAX: i32 = 0xFFFF;

/// Command nibble (upper four bits of byte 0).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Write the input register only.
    WriteInput = 0x0,
    /// Copy the input register to the DAC register.
    Update = 0x1,
    /// Write the input register and update the DAC output.
    WriteAndUpdate = 0x3,
    /// Do nothing.
    NoOp = 0xF,
}

impl Command {
    /// Decode a command nibble. Unassigned codes return `None`.
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x0 => Some(Self::WriteInput),
            0x1 => Some(Self::Update),
            0x3 => Some(Self::WriteAndUpdate),
            0xF => Some(Self::NoOp),
            _ => None,
        }
    }

    /// The raw nibble value.
    pub const fn nibble(self) -> u8 {
        self as u8
    }
}

/// A validated 3-byte command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame([u8; FRAME_LEN]);

impl CommandFrame {
    /// Build a frame from its parts.
    pub const fn new(command: Command, address: u8, code: u16) -> Result<Self, InvalidValue> {
        if address > 0x0F {
            return Err(InvalidValue::AddressOutOfRange { address });
        }
        let [high, low] = code.to_be_bytes();
        Ok(Self([(command.nibble() << 4) | address, high, low]))
    }

    /// The bytes as they go on the wire.
    pub const fn bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Command nibble, if it is an assigned one.
    pub const fn command(&self) -> Option<Command> {
        Command::from_nibble(self.0[0] >> 4)
    }

    /// Sub-address nibble.
    pub const fn address(&self) -> u8 {
        self.0[0] & 0x0F
    }

    /// 16-bit DAC code.
    pub const fn code(&self) -> u16 {
        u16::from_be_bytes([self.0[1], self.0[2]])
    }
}

impl TryFrom<&[u8]> for CommandFrame {
    type Error = usize;

    /// Accepts exactly [`FRAME_LEN`] bytes; any other length is returned as the error.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match *bytes {
            [b0, b1, b2] => Ok(Self([b0, b1, b2])),
            _ => Err(bytes.len()),
        }
    }
}

/// Encode a write-and-update of `value` to the output(s) at `physical_address`.
///
/// Fails with [`InvalidValue`] when `value` is outside `0..=65535` or the
/// sub-address does not fit in four bits. No side effects.
pub fn encode(physical_address: u8, value: i32) -> Result<CommandFrame, InvalidValue> {
    let code = u16::try_from(value).map_err(|_| InvalidValue::OutOfRange { value })?;
    CommandFrame::new(Command::WriteAndUpdate, physical_address, code)
}
