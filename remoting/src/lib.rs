#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use remoting_core::*;

/// Derive [`Codec`](trait@Codec) and [`Composite`] for a struct with named fields.
pub use remoting_macros::Codec;
