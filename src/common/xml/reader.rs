//! Parsing markup into an [`XmlElement`] tree.

use super::escape::{resolve_entity, unescape_with_char_refs};
use super::node::XmlElement;
use crate::common::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Prevent stack overflow on hostile input
const MAX_DEPTH: usize = 1000;

impl XmlElement {
    /// Parse a single-rooted XML fragment.
    ///
    /// Declarations, comments and processing instructions are skipped.
    /// Whitespace-only text between elements is dropped; text inside leaf
    /// elements is kept verbatim.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        if xml.trim().is_empty() {
            return Err(Error::Xml("Empty XML input".to_string()));
        }

        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::with_capacity(32);
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    if root.is_some() {
                        return Err(Error::Xml("Multiple root elements".to_string()));
                    }
                    if stack.len() >= MAX_DEPTH {
                        return Err(Error::Xml(format!(
                            "Maximum XML depth {} exceeded",
                            MAX_DEPTH
                        )));
                    }
                    stack.push(start_element(e)?);
                },
                Event::Empty(ref e) => {
                    let element = start_element(e)?;
                    close_element(element, &mut stack, &mut root)?;
                },
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("Unbalanced end tag".to_string()))?;
                    element.strip_layout_whitespace();
                    close_element(element, &mut stack, &mut root)?;
                },
                Event::Text(ref e) => {
                    let raw = std::str::from_utf8(e)?;
                    push_text(&mut stack, &unescape_with_char_refs(raw))?;
                },
                Event::CData(ref e) => {
                    let raw = std::str::from_utf8(e)?;
                    push_text(&mut stack, raw)?;
                },
                Event::GeneralRef(ref e) => {
                    let name = std::str::from_utf8(e)?;
                    let ch = resolve_entity(name).ok_or_else(|| {
                        Error::Xml(format!("Unknown entity reference '&{};'", name))
                    })?;
                    let mut buf = [0u8; 4];
                    push_text(&mut stack, ch.encode_utf8(&mut buf))?;
                },
                Event::Eof => break,
                _ => {}, // Skip declarations, comments, processing instructions
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Xml(format!("Unclosed element <{}>", open.name())));
        }
        root.ok_or_else(|| Error::Xml("No root element found".to_string()))
    }
}

fn start_element(e: &BytesStart) -> Result<XmlElement> {
    let qname = e.name();
    let name = std::str::from_utf8(qname.as_ref())?;
    let mut element = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        element.set_attr(key, unescape_with_char_refs(value));
    }
    Ok(element)
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.append(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::Xml("Multiple root elements".to_string())),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {},
        None => {
            return Err(Error::Xml(
                "Text content outside of the root element".to_string(),
            ));
        },
    }
    Ok(())
}
