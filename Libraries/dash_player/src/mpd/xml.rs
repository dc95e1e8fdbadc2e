//! Minimal XML document tree.
//!
//! Attributes and child elements are kept apart, so a `mimeType` attribute can never be
//! confused with a child element of the same name. Namespace prefixes are dropped.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::DashError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Parses a whole document and returns its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, DashError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            DashError::manifest(format!("XML error at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(ref e) => stack.push(element_from_start(e)?),
            Event::Empty(ref e) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DashError::manifest("closing tag without opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            // Text, comments, declarations and processing instructions carry nothing we use
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DashError::manifest(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| DashError::manifest("document has no root element"))
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement, DashError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = HashMap::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| DashError::manifest(format!("bad attribute on <{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DashError::manifest(format!("bad value for {}: {}", key, e)))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<(), DashError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(DashError::manifest(format!("second root element <{}>", element.name)));
    } else {
        *root = Some(element);
    }
    Ok(())
}
