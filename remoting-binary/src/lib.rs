#![warn(missing_docs)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

mod error;
pub use error::*;

mod frame;

mod serialize;
pub use serialize::*;

mod parser;
pub use parser::*;
