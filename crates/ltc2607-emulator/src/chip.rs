//! Register-level model of one LTC2607
//!
//! Each DAC has an input register and an output (DAC) register. A frame
//! either loads the input register, transfers input to output, or does both.
//! Only the output register drives the pin.
//!
//! Sub-address `0xF` selects both DACs; other unassigned sub-addresses and
//! unassigned command nibbles are accepted on the bus and ignored, as the
//! silicon does.

use ltc2607::channel::{ADDR_ALL_DACS, ADDR_DAC_A, ADDR_DAC_B};
use ltc2607::{Command, CommandFrame};

/// Code pair for DAC A and DAC B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChipOutputs {
    /// DAC A.
    pub a: u16,
    /// DAC B.
    pub b: u16,
}

impl ChipOutputs {
    fn set(&mut self, select: Select, code: u16) {
        if select.a {
            self.a = code;
        }
        if select.b {
            self.b = code;
        }
    }

    fn copy_from(&mut self, other: ChipOutputs, select: Select) {
        if select.a {
            self.a = other.a;
        }
        if select.b {
            self.b = other.b;
        }
    }
}

#[derive(Clone, Copy)]
struct Select {
    a: bool,
    b: bool,
}

impl Select {
    const fn from_address(address: u8) -> Self {
        match address {
            ADDR_DAC_A => Self { a: true, b: false },
            ADDR_DAC_B => Self { a: false, b: true },
            ADDR_ALL_DACS => Self { a: true, b: true },
            _ => Self { a: false, b: false },
        }
    }
}

/// Simulated LTC2607. Powers up at zero scale.
#[derive(Debug, Clone, Default)]
pub struct Ltc2607Chip {
    input: ChipOutputs,
    output: ChipOutputs,
    frames: u64,
}

impl Ltc2607Chip {
    /// Chip in its power-on state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute one command frame.
    pub fn apply(&mut self, frame: &CommandFrame) {
        self.frames = self.frames.saturating_add(1);
        let select = Select::from_address(frame.address());
        match frame.command() {
            Some(Command::WriteInput) => self.input.set(select, frame.code()),
            Some(Command::Update) => self.output.copy_from(self.input, select),
            Some(Command::WriteAndUpdate) => {
                self.input.set(select, frame.code());
                self.output.copy_from(self.input, select);
            }
            Some(Command::NoOp) | None => {}
        }
        tracing::trace!(
            command = frame.command().map_or("unassigned", command_name),
            address = frame.address(),
            code = frame.code(),
            a = self.output.a,
            b = self.output.b,
            "ltc2607 frame applied"
        );
    }

    /// Codes currently driving the pins.
    pub fn outputs(&self) -> ChipOutputs {
        self.output
    }

    /// Codes latched in the input registers.
    pub fn inputs(&self) -> ChipOutputs {
        self.input
    }

    /// Frames applied since power-on.
    pub fn frames_received(&self) -> u64 {
        self.frames
    }
}

fn command_name(command: Command) -> &'static str {
    match command {
        Command::WriteInput => "write-input",
        Command::Update => "update",
        Command::WriteAndUpdate => "write-and-update",
        Command::NoOp => "no-op",
    }
}
