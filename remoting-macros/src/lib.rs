//! Proc-macros for `remoting`.
//!
//! Use them through the `remoting` crate, which re-exports [`macro@Codec`]
//! next to the trait of the same name.

use proc_macro::TokenStream;

mod derive_codec;

/// Derive `remoting::Codec` and `remoting::Composite` for a struct with named
/// fields.
///
/// Fields are written in declaration order, each through the codec of its own
/// type. Field attributes:
///
/// - `#[remoting(namespace = "urn:x")]` qualifies the field with a namespace
///   for the duration of its serialization
/// - `#[remoting(rename = "wireName")]` changes the name the field travels under
///
/// ```ignore
/// #[derive(remoting::Codec)]
/// struct Struct4 {
///     #[remoting(namespace = "urn:x")]
///     ptr: remoting::Reference<Struct4>,
///     value: String,
///     vec: Vec<Struct4>,
/// }
/// ```
#[proc_macro_derive(Codec, attributes(remoting))]
pub fn derive_codec(input: TokenStream) -> TokenStream {
    derive_codec::derive_codec(input)
}
