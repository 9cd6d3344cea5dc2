#![deny(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod tracing_macros;

mod codec;
pub use codec::*;

pub mod composite;

mod context;
pub use context::*;

mod error;
pub use error::*;

mod event;
pub use event::*;

mod expect;

mod impls;
pub use impls::Reference;

mod memory;
pub use memory::*;

mod namespace;
pub use namespace::*;

mod reader;
pub use reader::*;

mod writer;
pub use writer::*;
