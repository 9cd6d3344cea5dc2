#![warn(missing_docs)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

mod error;
mod escaping;
mod parser;
mod serializer;

pub use error::{XmlError, XmlErrorKind};
pub use parser::{XmlReader, from_str, from_str_with_options};
pub use serializer::{
    SerializeOptions, XmlWriter, to_string, to_string_pretty, to_string_with_options,
    to_writer_with_options,
};
