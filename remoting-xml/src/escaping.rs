//! XML escaping.

use std::io::{self, Write};

/// Write `s` as character data.
///
/// Escapes `&` `<` `>` and carriage returns, which XML parsers would
/// otherwise fold into line feeds.
pub(crate) fn write_text(out: &mut dyn Write, s: &str) -> io::Result<()> {
    write_escaped(out, s, false)
}

/// Write `s` as an attribute value. Also escapes `"`.
pub(crate) fn write_attribute(out: &mut dyn Write, s: &str) -> io::Result<()> {
    write_escaped(out, s, true)
}

fn write_escaped(out: &mut dyn Write, s: &str, escape_quotes: bool) -> io::Result<()> {
    let bytes = s.as_bytes();
    let mut plain = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'\r' => b"&#xD;",
            b'"' if escape_quotes => b"&quot;",
            _ => continue,
        };
        out.write_all(&bytes[plain..i])?;
        out.write_all(replacement)?;
        plain = i + 1;
    }
    out.write_all(&bytes[plain..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> String {
        let mut buf = Vec::new();
        write_text(&mut buf, s).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn attribute(s: &str) -> String {
        let mut buf = Vec::new();
        write_attribute(&mut buf, s).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_escapes_markup() {
        assert_eq!(text("a & b < c > d"), "a &amp; b &lt; c &gt; d");
        assert_eq!(text("line\r\n"), "line&#xD;\n");
    }

    #[test]
    fn text_does_not_escape_quotes() {
        assert_eq!(text("a \"quoted\" b"), "a \"quoted\" b");
    }

    #[test]
    fn attribute_escapes_quotes() {
        assert_eq!(attribute("urn:\"x\"&y"), "urn:&quot;x&quot;&amp;y");
    }

    #[test]
    fn multibyte_text_is_untouched() {
        assert_eq!(text("héllo → wörld"), "héllo → wörld");
    }
}
