//! Clock, stopwatch and button/menu core for the ATmega32U4 environmental
//! sensor board
//!
//! Everything outside `hal` and `bootloader` is plain `no_std` code that
//! also builds on the host, where the unit tests run.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt, asm_experimental_arch))]

pub mod application;
pub mod clock;
pub mod command;
pub mod config;
pub mod drivers;
pub mod logger;
pub mod menu;
pub mod os;
pub mod tick;

#[cfg(target_arch = "avr")]
pub mod bootloader;
#[cfg(target_arch = "avr")]
pub mod hal;

pub use application::{Application, Board};
pub use os::SharedState;
