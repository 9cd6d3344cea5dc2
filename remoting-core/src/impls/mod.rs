mod pointer;
mod reference;
mod scalar;
mod sequence;
mod string;

pub use reference::Reference;
