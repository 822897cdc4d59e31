//! Root-element parser shared by FetchXML documents and paging cookies
//!
//! Only the root start tag is modelled. Everything before it and everything
//! after it is kept as raw text, so rewriting root attributes leaves the
//! rest of the document byte-for-byte intact.

use crate::error::{Error, Result};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// Attribute with its value kept in escaped (on-the-wire) form
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawAttribute {
    name: String,
    raw: String,
}

/// A well-formed XML document split around its root start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RootElement {
    prefix: String,
    name: String,
    attributes: Vec<RawAttribute>,
    self_closing: bool,
    suffix: String,
}

impl RootElement {
    /// Parse and validate a whole document
    pub(crate) fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);

        let mut root: Option<RootElement> = None;
        let mut depth = 0usize;
        let mut closed = false;

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                Error::protocol(format!(
                    "XML error at position {}: {e}",
                    reader.error_position()
                ))
            })?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));

                    if root.is_none() {
                        let end = reader.buffer_position() as usize;
                        root = Some(Self::from_start_tag(input, before, end, e, is_empty)?);
                        if is_empty {
                            closed = true;
                        } else {
                            depth = 1;
                        }
                    } else if closed {
                        return Err(Error::protocol("document has more than one root element"));
                    } else if !is_empty {
                        depth += 1;
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        closed = true;
                    }
                }
                Event::Text(ref t) if depth == 0 => {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(Error::protocol("text outside of the root element"));
                    }
                }
                Event::CData(_) if depth == 0 => {
                    return Err(Error::protocol("CDATA outside of the root element"));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        match root {
            Some(root) if closed => Ok(root),
            Some(root) => Err(Error::protocol(format!(
                "root element <{}> is not closed",
                root.name
            ))),
            None => Err(Error::protocol("document has no root element")),
        }
    }

    /// `before` is the reader position ahead of the event, `end` the
    /// position just past its closing `>`.
    fn from_start_tag(
        input: &str,
        before: usize,
        end: usize,
        tag: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<Self> {
        let start = tag_start(input, before, end)
            .ok_or_else(|| Error::protocol("cannot locate the root start tag"))?;

        let name = std::str::from_utf8(tag.name().as_ref())
            .map_err(|e| Error::protocol(format!("root element name is not UTF-8: {e}")))?
            .to_string();

        let mut attributes = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(|e| Error::protocol(format!("bad attribute on <{name}>: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::protocol(format!("attribute name is not UTF-8: {e}")))?
                .to_string();
            let raw = std::str::from_utf8(&attr.value)
                .map_err(|e| Error::protocol(format!("attribute '{key}' is not UTF-8: {e}")))?;
            if raw.contains('<') {
                return Err(Error::protocol(format!(
                    "attribute '{key}' contains a raw '<'"
                )));
            }
            let value = unescape(raw)
                .map_err(|e| Error::protocol(format!("attribute '{key}' has a bad escape: {e}")))?;

            // Values are written back double-quoted
            let raw = if raw.contains('"') {
                escape(value.as_ref()).into_owned()
            } else {
                raw.to_string()
            };
            attributes.push(RawAttribute { name: key, raw });
        }

        Ok(Self {
            prefix: input[..start].to_string(),
            name,
            attributes,
            self_closing: is_empty,
            suffix: input[end..].to_string(),
        })
    }

    /// Unescaped value of a root attribute
    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| unescape(&a.raw).ok())
            .map(|v| v.into_owned())
    }

    /// Replace an attribute in place, or append it if absent
    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) {
        let raw = escape(value).into_owned();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.raw = raw,
            None => self.attributes.push(RawAttribute {
                name: name.to_string(),
                raw,
            }),
        }
    }
}

/// Offset of the `<` opening the tag read between `before` and `end`
fn tag_start(input: &str, before: usize, end: usize) -> Option<usize> {
    let head = input.get(..end).filter(|head| head.ends_with('>'))?;
    if head.get(..before)?.ends_with('<') {
        return Some(before - 1);
    }
    let offset = head.get(before..)?.find('<')?;
    Some(before + offset)
}

impl fmt::Display for RootElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}", self.prefix, self.name)?;
        for attr in &self.attributes {
            write!(f, " {}=\"{}\"", attr.name, attr.raw)?;
        }
        f.write_str(if self.self_closing { " />" } else { ">" })?;
        f.write_str(&self.suffix)
    }
}
