//! AMD AM9511A Arithmetic Processing Unit emulator.
//!
//! A command-driven stack coprocessor: the host pushes operand bytes,
//! issues a single command byte, and reads results and flags back. The
//! emulation is not cycle accurate — every command completes before
//! [`Am9511::command`] returns, so a host polling BUSY sees it already
//! clear — but the stack behaviour, flag computation, and error codes
//! match the chip.
//!
//! The whole host surface is five operations: `push`, `pop`, `status`,
//! `command`, and `reset`.

mod apu;
mod float;
mod stack;

pub mod command;
pub mod status;

pub use apu::Am9511;
pub use command::Class;
