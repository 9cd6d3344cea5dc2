//! XML writer.

use std::borrow::Cow;
use std::io::Write;

use remoting_core::{
    Codec, DEFAULT_MAX_DEPTH, ScalarValue, SerializeError, WireContext, WireOptions, WireWriter,
};

use crate::error::{XmlError, XmlErrorKind};
use crate::escaping::{write_attribute, write_text};

/// Element name used for sequence elements, which travel without a name.
pub(crate) const ITEM: &str = "item";

/// Options for XML serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Whether to pretty-print with indentation (default: false)
    pub pretty: bool,
    /// Indentation string for pretty-printing (default: "  ")
    pub indent: Cow<'static, str>,
    /// Maximum nesting depth (default: [`DEFAULT_MAX_DEPTH`])
    pub max_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: Cow::Borrowed("  "),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SerializeOptions {
    /// Create new default options (compact output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing with default indentation.
    pub const fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Set a custom indentation string (implies pretty-printing).
    pub fn indent(mut self, indent: impl Into<Cow<'static, str>>) -> Self {
        self.indent = indent.into();
        self.pretty = true;
        self
    }

    /// Set the maximum nesting depth.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// An element that is still open.
#[derive(Debug)]
struct Scope {
    /// Default namespace in effect inside the element.
    namespace: Option<String>,
    has_children: bool,
}

/// [`WireWriter`] producing XML.
#[derive(Debug)]
pub struct XmlWriter<W> {
    out: W,
    context: WireContext,
    pretty: Option<Cow<'static, str>>,
    scopes: Vec<Scope>,
    started: bool,
    /// Presence markers not yet carried by an element.
    presence: usize,
}

impl<W: Write> XmlWriter<W> {
    /// Write compact XML into `out`.
    pub fn new(out: W) -> Self {
        Self::with_options(out, SerializeOptions::default())
    }

    /// Write XML into `out` with the given options.
    pub fn with_options(out: W, options: SerializeOptions) -> Self {
        Self {
            out,
            context: WireContext::with_options(WireOptions::default().max_depth(options.max_depth)),
            pretty: options.pretty.then_some(options.indent),
            scopes: Vec::new(),
            started: false,
            presence: 0,
        }
    }

    /// Give back the output.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write `<tag` plus a namespace declaration when the namespace changes.
    ///
    /// Returns the namespace the element is in.
    fn open_tag(&mut self, name: &str) -> Result<Option<String>, XmlError> {
        let name = tag(name)?;
        self.presence = 0;
        if let Some(parent) = self.scopes.last_mut() {
            parent.has_children = true;
        }
        self.newline(self.scopes.len())?;

        let namespace = self.context.namespace().map(str::to_owned);
        let inherited = self.scopes.last().and_then(|s| s.namespace.as_deref());

        self.out.write_all(b"<")?;
        self.out.write_all(name.as_bytes())?;
        if namespace.as_deref() != inherited {
            self.out.write_all(b" xmlns=\"")?;
            write_attribute(&mut self.out, namespace.as_deref().unwrap_or(""))?;
            self.out.write_all(b"\"")?;
        }
        Ok(namespace)
    }

    fn close_tag(&mut self, name: &str) -> Result<(), XmlError> {
        self.out.write_all(b"</")?;
        self.out.write_all(tag(name)?.as_bytes())?;
        self.out.write_all(b">")?;
        Ok(())
    }

    fn newline(&mut self, depth: usize) -> Result<(), XmlError> {
        if let Some(indent) = &self.pretty
            && self.started
        {
            self.out.write_all(b"\n")?;
            for _ in 0..depth {
                self.out.write_all(indent.as_bytes())?;
            }
        }
        self.started = true;
        Ok(())
    }

    fn begin_element(&mut self, name: &str) -> Result<(), XmlError> {
        let namespace = self.open_tag(name)?;
        self.out.write_all(b">")?;
        self.scopes.push(Scope {
            namespace,
            has_children: false,
        });
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), XmlError> {
        let scope = self.scopes.pop();
        if scope.is_some_and(|s| s.has_children) {
            self.newline(self.scopes.len())?;
        }
        self.close_tag(name)
    }
}

/// Element name for a wire name: `item` for the empty name, otherwise the
/// name itself, which must be an XML name without a prefix.
fn tag(name: &str) -> Result<&str, XmlError> {
    if name.is_empty() {
        return Ok(ITEM);
    }
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(name)
    } else {
        Err(XmlError::new(XmlErrorKind::InvalidName(name.to_string())))
    }
}

impl<W: Write> WireWriter for XmlWriter<W> {
    type Error = XmlError;

    fn context(&mut self) -> &mut WireContext {
        &mut self.context
    }

    fn begin_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        self.begin_element(name)
    }

    fn end_struct(&mut self, name: &str) -> Result<(), Self::Error> {
        self.end_element(name)
    }

    fn begin_sequence(&mut self, name: &str, _len: usize) -> Result<(), Self::Error> {
        self.begin_element(name)
    }

    fn end_sequence(&mut self, name: &str) -> Result<(), Self::Error> {
        self.end_element(name)
    }

    fn scalar(&mut self, name: &str, value: ScalarValue<'_>) -> Result<(), Self::Error> {
        self.open_tag(name)?;
        self.out.write_all(b">")?;
        match value {
            ScalarValue::Str(s) => write_text(&mut self.out, &s)?,
            other => write!(self.out, "{other}")?,
        }
        self.close_tag(name)
    }

    fn absent(&mut self, name: &str) -> Result<(), Self::Error> {
        let presence = self.presence;
        self.open_tag(name)?;
        if presence > 0 {
            write!(self.out, " present=\"{presence}\"")?;
        }
        self.out.write_all(b" nil=\"true\"/>")?;
        Ok(())
    }

    /// A present reference is its value's element. Only a reference holding an
    /// empty reference needs a marker, written by [`absent`](Self::absent).
    fn present(&mut self, _name: &str) -> Result<(), Self::Error> {
        self.presence += 1;
        Ok(())
    }
}

/// Serialize `value` as compact XML, with `name` as the root element.
pub fn to_string<T: Codec>(name: &str, value: &T) -> Result<String, SerializeError<XmlError>> {
    to_string_with_options(name, value, &SerializeOptions::default())
}

/// Serialize `value` as indented XML, with `name` as the root element.
pub fn to_string_pretty<T: Codec>(
    name: &str,
    value: &T,
) -> Result<String, SerializeError<XmlError>> {
    to_string_with_options(name, value, &SerializeOptions::default().pretty())
}

/// Serialize `value` as XML with custom options.
pub fn to_string_with_options<T: Codec>(
    name: &str,
    value: &T,
    options: &SerializeOptions,
) -> Result<String, SerializeError<XmlError>> {
    let bytes = to_writer_with_options(name, value, Vec::new(), options)?;
    String::from_utf8(bytes)
        .map_err(|_| SerializeError::Backend(XmlError::new(XmlErrorKind::InvalidUtf8)))
}

/// Serialize `value` as XML into `out`, and give `out` back.
pub fn to_writer_with_options<T: Codec, W: Write>(
    name: &str,
    value: &T,
    out: W,
    options: &SerializeOptions,
) -> Result<W, SerializeError<XmlError>> {
    let mut writer = XmlWriter::with_options(out, options.clone());
    remoting_core::serialize(name, value, &mut writer)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_text_elements() {
        assert_eq!(to_string("n", &-2i32).unwrap(), "<n>-2</n>");
        assert_eq!(to_string("b", &true).unwrap(), "<b>true</b>");
        assert_eq!(to_string("f", &1.5f64).unwrap(), "<f>1.5</f>");
        assert_eq!(to_string("s", &String::from("<&>")).unwrap(), "<s>&lt;&amp;&gt;</s>");
    }

    #[test]
    fn sequences_use_item_elements() {
        assert_eq!(
            to_string("v", &vec![1u8, 2]).unwrap(),
            "<v><item>1</item><item>2</item></v>"
        );
        assert_eq!(to_string("v", &Vec::<u8>::new()).unwrap(), "<v></v>");
    }

    #[test]
    fn references() {
        assert_eq!(to_string("r", &None::<u8>).unwrap(), r#"<r nil="true"/>"#);
        assert_eq!(to_string("r", &Some(3u8)).unwrap(), "<r>3</r>");
    }

    #[test]
    fn reference_holding_an_empty_reference_counts_presence() {
        assert_eq!(to_string("r", &Some(None::<u8>)).unwrap(), r#"<r present="1" nil="true"/>"#);
        assert_eq!(
            to_string("r", &Some(Some(None::<u8>))).unwrap(),
            r#"<r present="2" nil="true"/>"#
        );
        assert_eq!(to_string("r", &Some(Some(4u8))).unwrap(), "<r>4</r>");
        assert_eq!(
            to_string("v", &vec![Some(None::<u8>), Some(Some(1))]).unwrap(),
            r#"<v><item present="1" nil="true"/><item>1</item></v>"#
        );
    }

    #[test]
    fn names_must_be_xml_names() {
        for bad in ["a b", "<x>", "1st", "p:q"] {
            let err = to_string(bad, &1u8).unwrap_err();
            match err {
                SerializeError::Backend(err) => {
                    assert_eq!(err.kind(), &XmlErrorKind::InvalidName(bad.to_string()));
                }
                other => panic!("unexpected error {other}"),
            }
        }
        assert_eq!(to_string("_x-1.y", &1u8).unwrap(), "<_x-1.y>1</_x-1.y>");
    }

    #[test]
    fn pretty_printing_indents_nested_elements() {
        let out = to_string_with_options(
            "v",
            &vec![vec![1u8], vec![]],
            &SerializeOptions::new().indent("\t"),
        )
        .unwrap();
        assert_eq!(out, "<v>\n\t<item>\n\t\t<item>1</item>\n\t</item>\n\t<item></item>\n</v>");
    }
}
