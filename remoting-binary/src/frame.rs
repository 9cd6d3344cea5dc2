//! Frame tags.

pub(crate) const STRUCT_BEGIN: u8 = 0x01;
pub(crate) const STRUCT_END: u8 = 0x02;
pub(crate) const SEQUENCE_BEGIN: u8 = 0x03;
pub(crate) const SEQUENCE_END: u8 = 0x04;
pub(crate) const ABSENT: u8 = 0x05;
pub(crate) const PRESENT: u8 = 0x06;
pub(crate) const NAMESPACE: u8 = 0x07;

pub(crate) const BOOL: u8 = 0x10;
pub(crate) const INT: u8 = 0x11;
pub(crate) const UINT: u8 = 0x12;
pub(crate) const FLOAT: u8 = 0x13;
pub(crate) const STRING: u8 = 0x14;
