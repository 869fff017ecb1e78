//! In-memory DOM tree read from and written to XML text with quick-xml.
//!
//! The tree is deliberately small: elements keep their attributes in
//! document order and their children as a list of element and text nodes.
//! Comments, processing instructions and the XML declaration are dropped
//! on read.

use std::fmt;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::cursor::DEFAULT_MAX_DEPTH;
use crate::error::{Result, XmlError};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute, builder style.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Add a child element, builder style.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_element(child);
        self
    }

    /// Add text content, builder style.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append a child element.
    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Append a text node.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Iterate over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// The first child element, if any.
    pub fn first_child_element(&self) -> Option<&Element> {
        self.child_elements().next()
    }

    /// The first child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Concatenated text content of this element (direct text children only).
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Move the attributes and children of `other` onto the end of this element.
    pub fn append(&mut self, other: Element) {
        for (name, value) in other.attributes {
            self.set_attribute(name, value);
        }
        self.children.extend(other.children);
    }

    /// Parse a single element (the document root) from XML text, see
    /// [`Document::parse`].
    pub fn parse(xml: &str) -> Result<Element> {
        Document::parse(xml).map(|doc| doc.root)
    }

    /// Serialize without indentation.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }

    /// Serialize with the given number of spaces per nesting level.
    pub fn to_xml_pretty(&self, indent: usize) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);
        write_element(&mut writer, self)?;
        into_string(writer.into_inner())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

/// A parsed XML document: exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Create a document around a root element.
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse XML text into a tree, nesting at most [`DEFAULT_MAX_DEPTH`]
    /// elements deep.
    pub fn parse(xml: &str) -> Result<Document> {
        Self::parse_with_depth(xml, DEFAULT_MAX_DEPTH)
    }

    /// Parse XML text into a tree, nesting at most `max_depth` elements
    /// deep with the root at depth 1.
    ///
    /// Text is kept verbatim. Whitespace-only text is dropped, since it only
    /// separates elements.
    pub fn parse_with_depth(xml: &str, max_depth: usize) -> Result<Document> {
        let max_depth = max_depth.max(1);
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                XmlError::Malformed(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;
            match event {
                Event::Start(_) | Event::Empty(_) if stack.len() >= max_depth => {
                    return Err(XmlError::DepthExceeded { limit: max_depth });
                }
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(text.into_owned());
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Malformed(format!("element <{}> is not closed", open.name)));
        }
        root.map(Document::new)
            .ok_or_else(|| XmlError::Malformed("document has no root element".to_string()))
    }

    /// Serialize without indentation.
    pub fn to_xml(&self) -> Result<String> {
        self.root.to_xml()
    }

    /// Serialize with indentation.
    pub fn to_xml_pretty(&self, indent: usize) -> Result<String> {
        self.root.to_xml_pretty(indent)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Malformed(format!(
            "second root element <{}>",
            element.name
        ))),
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
        }
    }
    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Malformed(e.to_string()))
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| XmlError::Malformed(e.to_string()))
}
