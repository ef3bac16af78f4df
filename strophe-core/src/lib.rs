//! Hardware-agnostic core algorithms for the Strophe firmware
//!
//! This crate contains the pieces of the peripheral layer that are pure
//! logic and carry the real invariants:
//!
//! - Lock-free single-producer/single-consumer byte ring buffer
//! - Baud-rate divisor computation (mantissa/fraction split)
//! - Tick/time conversions and wrap-safe elapsed helpers
//!
//! Everything here runs unchanged on the host, which is where the test
//! suite lives.

#![cfg_attr(not(test), no_std)]

pub mod baud;
pub mod ring;
pub mod time;

pub use baud::BaudDivisor;
pub use ring::RingBuffer;
