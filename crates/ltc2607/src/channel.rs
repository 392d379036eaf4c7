//! Logical channels and the chip sub-address map
//!
//! The host sees three output channels. Channels 0 and 1 are DAC A and DAC B;
//! channel 2 is the chip's "all DACs" selector, so a write to it moves both
//! outputs at once. It is a hardware alias, not a third output.
//!
//! | Logical | Sub-address | Meaning |
//! |---------|-------------|---------|
//! | 0       | `0x0`       | DAC A   |
//! | 1       | `0x1`       | DAC B   |
//! | 2       | `0xF`       | All DACs (broadcast) |

use core::ops::RangeInclusive;

use crate::command::RAW_MAX;
use crate::config::CHANNEL_COUNT;
use crate::error::InvalidValue;

/// Sub-address of DAC A.
pub const ADDR_DAC_A: u8 = 0x0;
/// Sub-address of DAC B.
pub const ADDR_DAC_B: u8 = 0x1;
/// Sub-address that selects every DAC on the chip.
pub const ADDR_ALL_DACS: u8 = 0xF;

/// One of the three logical output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Output A.
    DacA,
    /// Output B.
    DacB,
    /// Both outputs through the broadcast selector.
    All,
}

impl Channel {
    /// Every channel, in logical index order.
    pub const ALL: [Channel; 3] = [Channel::DacA, Channel::DacB, Channel::All];

    /// Resolve a logical index as handed over by the framework.
    pub const fn from_index(index: u32) -> Result<Self, InvalidValue> {
        match index {
            0 => Ok(Self::DacA),
            1 => Ok(Self::DacB),
            2 => Ok(Self::All),
            channel => Err(InvalidValue::UnmappedChannel { channel }),
        }
    }

    /// Logical index seen by the framework.
    pub const fn index(self) -> u32 {
        match self {
            Self::DacA => 0,
            Self::DacB => 1,
            Self::All => 2,
        }
    }

    /// 4-bit selector placed in the low nibble of the command byte.
    pub const fn physical_address(self) -> u8 {
        match self {
            Self::DacA => ADDR_DAC_A,
            Self::DacB => ADDR_DAC_B,
            Self::All => ADDR_ALL_DACS,
        }
    }

    /// `true` for the broadcast alias.
    pub const fn is_broadcast(self) -> bool {
        matches!(self, Self::All)
    }
}

/// Map a logical channel index to the chip sub-address.
pub const fn physical_address(logical_channel: u32) -> Result<u8, InvalidValue> {
    match Channel::from_index(logical_channel) {
        Ok(channel) => Ok(channel.physical_address()),
        Err(err) => Err(err),
    }
}

/// Measurement kind advertised to the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelKind {
    /// Voltage output.
    Voltage,
}

/// Channel attribute addressed by a framework write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelAttribute {
    /// Raw DAC code.
    Raw,
    /// Scale factor (not provided by this driver).
    Scale,
    /// Offset (not provided by this driver).
    Offset,
}

/// Static description of one output channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Logical channel.
    pub channel: Channel,
    /// What the channel carries.
    pub kind: ChannelKind,
    /// Always `true`: the LTC2607 has no readback path.
    pub output: bool,
    /// The only attribute the channel accepts.
    pub attribute: ChannelAttribute,
    /// Accepted raw codes.
    pub range: RangeInclusive<i32>,
}

impl ChannelSpec {
    const fn output(channel: Channel) -> Self {
        Self {
            channel,
            kind: ChannelKind::Voltage,
            output: true,
            attribute: ChannelAttribute::Raw,
            range: 0..=RAW_MAX,
        }
    }

    /// Whether a write to `attribute` is accepted by this channel.
    pub fn accepts(&self, attribute: ChannelAttribute) -> bool {
        self.attribute == attribute
    }
}

/// The channel table registered with the framework for every device.
pub static CHANNELS: [ChannelSpec; CHANNEL_COUNT] = [
    ChannelSpec::output(Channel::DacA),
    ChannelSpec::output(Channel::DacB),
    ChannelSpec::output(Channel::All),
];
