//! Dual-DAC board bring-up against the simulated bus.
//!
//! Run with: RUST_LOG=debug cargo run -p ltc2607-emulator --example dual_device

#![allow(clippy::print_stdout)]

use ltc2607::config::{BOARD_ADDR_A, BOARD_ADDR_B};
use ltc2607::DeviceRegistry;
use ltc2607_emulator::{logging, BoardEntry, Host, IioCore, SimBus};

static REGISTRY: DeviceRegistry = DeviceRegistry::new();

fn main() {
    logging::init();

    let bus = SimBus::new();
    bus.add_chip(BOARD_ADDR_A);
    bus.add_chip(BOARD_ADDR_B);

    let mut host: Host<'_, 2> = Host::new(&REGISTRY, bus.clone(), IioCore::new());
    let attached = host.probe_all(&[
        BoardEntry::new("arrow,ltc2607", BOARD_ADDR_A),
        BoardEntry::new("arrow,ltc2607", BOARD_ADDR_B),
    ]);
    println!("attached {attached} device(s)");
    for (address, name) in host.bound() {
        println!("  {name} at {address:#04x}");
    }

    let writes: [(u8, u32, i32); 4] = [
        (BOARD_ADDR_A, 0, 0x4000),
        (BOARD_ADDR_A, 1, 0xC000),
        (BOARD_ADDR_B, 2, 0x8000),
        (BOARD_ADDR_B, 1, 70_000),
    ];
    for (address, channel, value) in writes {
        match host.write(address, channel, value) {
            Ok(()) => println!("{address:#04x} ch{channel} <- {value:#06x}"),
            Err(err) => println!("{address:#04x} ch{channel} <- {value}: {err}"),
        }
    }

    for address in [BOARD_ADDR_A, BOARD_ADDR_B] {
        if let Some(outputs) = bus.outputs(address) {
            println!("{address:#04x}: A={:#06x} B={:#06x}", outputs.a, outputs.b);
        }
    }

    host.shutdown();
}
