//! Logic core of a battery-powered IR fan remote: button conditioning, rolling-code command
//! encoding and single-in-flight transmission.
//!
//! The core is hardware-free and runs on the host with `--features host`. The `pico` module
//! adapts it to RP2040/RP2350 boards.
#![cfg_attr(not(test), no_std)]

pub mod button;
pub mod command;
pub mod encoder;
mod error;
pub mod ir_timing;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub mod pico;
pub mod remote;
pub mod sequencer;
mod shared_constants;
pub mod tick;
pub mod triggers;

// Re-export commonly used items
pub use button::{ButtonInputs, ButtonPoll, ButtonSetup, ButtonState, Buttons};
pub use command::{Command, CommandTable, FanCommand, FanCommandTable, MAX_COUNTER};
pub use encoder::{Encoder, Symbol, SymbolStream};
pub use error::{Error, Result};
pub use ir_timing::IrTiming;
pub use remote::{Activity, Remote};
pub use sequencer::{Sequencer, TransmitLink, TransmitState, Transmitter};
pub use shared_constants::*;
pub use tick::{Tick, TickRate, TickSource};
pub use triggers::Triggers;
