//! Marshal tuple: the fixed-order slot protocol of one XML element.
//!
//! A schema type lists its slots once, in schema order, in
//! [`Schema::describe`](crate::node::Schema::describe). The same list is run
//! by different [`Marshal`] implementations:
//!
//! - [`Consume`] pulls attributes and child elements out of a [`DomCursor`];
//! - [`Produce`] appends attributes and child elements to an [`Element`];
//! - [`LayoutRecorder`](crate::layout::LayoutRecorder) records the slot table.
//!
//! Attributes are looked up by name. Child elements are read front-to-back:
//! a single-element slot looks at the next unconsumed sibling only, a list
//! slot takes siblings while their tag matches, and an optional slot treats
//! a non-matching sibling as absent. A child that is still unconsumed when
//! the element is finished is an [`XmlError::OutOfOrder`] error if one of
//! the element's slots asked for its name, and unknown content otherwise.

use tracing::trace;

use crate::cursor::{DomCursor, Mark};
use crate::dom::Element;
use crate::error::{Result, XmlError};
use crate::node::{self, Schema};
use crate::primitive::{decode, encode, Value};
use crate::variant::Choice;

/// How many times a slot may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Required,
    Optional,
    List { min: usize },
}

/// The slot protocol shared by reading, writing and layout recording.
pub trait Marshal {
    /// Required attribute.
    fn attribute<T: Value>(&mut self, name: &'static str, field: &mut T) -> Result<()>;

    /// Optional attribute.
    fn optional_attribute<T: Value>(&mut self, name: &'static str, field: &mut Option<T>)
        -> Result<()>;

    /// Attribute with a fixed value. Used to tell the groups of a choice apart.
    fn constant(&mut self, name: &'static str, value: &'static str) -> Result<()>;

    /// The element's own text content.
    fn text<T: Value>(&mut self, field: &mut T) -> Result<()>;

    /// The element's own text content, absent when empty.
    fn optional_text<T: Value>(&mut self, field: &mut Option<T>) -> Result<()>;

    /// Required child element holding a single value as its text.
    fn value_element<T: Value>(&mut self, name: &'static str, field: &mut T) -> Result<()>;

    /// Optional child element holding a single value as its text.
    fn optional_value_element<T: Value>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()>;

    /// Repeated child element holding a single value as its text.
    fn value_elements<T: Value>(
        &mut self,
        name: &'static str,
        min: usize,
        field: &mut Vec<T>,
    ) -> Result<()>;

    /// The element carries no attributes, child elements or text.
    fn no_content(&mut self) -> Result<()>;

    /// Empty marker element such as `<readonly/>`.
    fn flag(&mut self, name: &'static str, field: &mut bool) -> Result<()>;

    /// Required child element.
    fn element<T: Schema>(&mut self, name: &'static str, field: &mut T) -> Result<()>;

    /// Optional child element.
    fn optional_element<T: Schema>(&mut self, name: &'static str, field: &mut Option<T>)
        -> Result<()>;

    /// Repeated child element with a minimum occurrence count.
    fn elements<T: Schema>(&mut self, name: &'static str, min: usize, field: &mut Vec<T>)
        -> Result<()>;

    /// Choice between alternative groups or elements.
    fn choice<T: Choice>(&mut self, field: &mut T) -> Result<()>;

    /// Repeated choice, e.g. a sequence of differently tagged entries.
    fn choices<T: Choice>(&mut self, min: usize, field: &mut Vec<T>) -> Result<()>;
}

// =============================================================================
// CONSUME
// =============================================================================

/// Saved reading position, see [`Consume::mark`].
#[derive(Debug, Clone, Copy)]
pub struct ConsumeMark {
    cursor: Mark,
    consumed: usize,
    requested: usize,
}

/// Reads slots from a DOM cursor.
#[derive(Debug)]
pub struct Consume<'a> {
    cursor: DomCursor<'a>,
    deny_unknown: bool,
    consumed: usize,
    /// Child names looked up by slots, tagged with the cursor depth.
    requested: Vec<(usize, &'static str)>,
}

impl<'a> Consume<'a> {
    /// Start reading at the cursor's current element.
    pub fn new(cursor: DomCursor<'a>, deny_unknown: bool) -> Self {
        Self {
            cursor,
            deny_unknown,
            consumed: 0,
            requested: Vec::new(),
        }
    }

    /// The underlying cursor.
    pub fn cursor(&self) -> &DomCursor<'a> {
        &self.cursor
    }

    /// Number of child elements consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Save the reading position.
    pub fn mark(&self) -> ConsumeMark {
        ConsumeMark {
            cursor: self.cursor.mark(),
            consumed: self.consumed,
            requested: self.requested.len(),
        }
    }

    /// Restore a saved reading position.
    pub fn rewind(&mut self, mark: ConsumeMark) {
        self.cursor.rewind(mark.cursor);
        self.consumed = mark.consumed;
        self.requested.truncate(mark.requested);
    }

    fn current_name(&self) -> String {
        self.cursor.current().name.clone()
    }

    fn next_named(&mut self, name: &'static str) -> Option<&'a Element> {
        let entry = (self.cursor.depth(), name);
        if self.requested.last() != Some(&entry) {
            self.requested.push(entry);
        }
        self.cursor.peek_child().filter(|child| child.name == name)
    }

    fn was_requested(&self, name: &str) -> bool {
        let depth = self.cursor.depth();
        self.requested
            .iter()
            .rev()
            .take_while(|(at, _)| *at == depth)
            .any(|(_, requested)| *requested == name)
    }

    fn require_child(&mut self, name: &'static str) -> Result<&'a Element> {
        self.next_named(name).ok_or_else(|| XmlError::MissingElement {
            parent: self.current_name(),
            element: name,
        })
    }

    fn check_min(&self, name: &'static str, min: usize, found: usize) -> Result<()> {
        if found < min {
            return Err(XmlError::Cardinality {
                parent: self.current_name(),
                element: name,
                min,
                found,
            });
        }
        Ok(())
    }

    /// Run `read` with `child` as the current element, then mark it consumed.
    fn with_child<R>(
        &mut self,
        child: &'a Element,
        read: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.cursor.enter(child)?;
        let result = read(self);
        self.cursor.leave();
        let depth = self.cursor.depth();
        while matches!(self.requested.last(), Some((at, _)) if *at > depth) {
            self.requested.pop();
        }
        let value = result?;
        self.cursor.advance();
        self.consumed += 1;
        Ok(value)
    }

    fn read_value_element<T: Value>(&mut self, child: &'a Element) -> Result<T> {
        self.with_child(child, |c| {
            let value = decode(&c.cursor.text())?;
            c.finish_element()?;
            Ok(value)
        })
    }

    fn read_element<T: Schema>(&mut self, child: &'a Element) -> Result<T> {
        let mut value = T::default();
        self.with_child(child, |c| node::parse(&mut value, c))?;
        Ok(value)
    }

    /// Check the current element for child elements no slot consumed.
    ///
    /// A leftover child that one of the element's slots asked for is out of
    /// order and always an error. Other leftovers are unknown content.
    pub fn finish_element(&self) -> Result<()> {
        let parent = self.cursor.current();
        for extra in self.cursor.remaining() {
            if self.was_requested(&extra.name) {
                return Err(XmlError::OutOfOrder {
                    parent: parent.name.clone(),
                    element: extra.name.clone(),
                });
            }
            if self.deny_unknown {
                return Err(XmlError::UnexpectedElement {
                    parent: parent.name.clone(),
                    element: extra.name.clone(),
                });
            }
            trace!(parent = %parent.name, element = %extra.name, "Skipping unknown element");
        }
        Ok(())
    }

    /// Try to read a group of slots from the current element. On failure the
    /// position is restored.
    pub fn try_group<T: Schema>(&mut self) -> Result<T> {
        let mark = self.mark();
        let mut value = T::default();
        match value.describe(self) {
            Ok(()) => Ok(value),
            Err(error) => {
                self.rewind(mark);
                Err(error)
            }
        }
    }

    /// Try to read the next child as a `tag` element. On failure the
    /// position is restored.
    pub fn try_element<T: Schema>(&mut self, tag: &'static str) -> Result<T> {
        let mark = self.mark();
        match self.require_child(tag).and_then(|child| self.read_element(child)) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.rewind(mark);
                Err(error)
            }
        }
    }

    /// Error for a choice none of whose alternatives matched here.
    pub fn exhausted(&self, choice: &'static str) -> XmlError {
        XmlError::VariantExhausted {
            choice,
            element: self.current_name(),
        }
    }
}

impl<'a> Marshal for Consume<'a> {
    fn attribute<T: Value>(&mut self, name: &'static str, field: &mut T) -> Result<()> {
        let text = self
            .cursor
            .attribute(name)
            .ok_or_else(|| XmlError::MissingAttribute {
                element: self.current_name(),
                attribute: name,
            })?;
        *field = decode(text)?;
        Ok(())
    }

    fn optional_attribute<T: Value>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()> {
        *field = match self.cursor.attribute(name) {
            Some(text) => Some(decode(text)?),
            None => None,
        };
        Ok(())
    }

    fn constant(&mut self, name: &'static str, value: &'static str) -> Result<()> {
        match self.cursor.attribute(name) {
            Some(found) if found == value => Ok(()),
            Some(found) => Err(XmlError::ConstantMismatch {
                element: self.current_name(),
                attribute: name,
                expected: value,
                found: found.to_string(),
            }),
            None => Err(XmlError::MissingAttribute {
                element: self.current_name(),
                attribute: name,
            }),
        }
    }

    fn text<T: Value>(&mut self, field: &mut T) -> Result<()> {
        *field = decode(&self.cursor.text())?;
        Ok(())
    }

    fn optional_text<T: Value>(&mut self, field: &mut Option<T>) -> Result<()> {
        let text = self.cursor.text();
        *field = if text.is_empty() {
            None
        } else {
            Some(decode(&text)?)
        };
        Ok(())
    }

    fn value_element<T: Value>(&mut self, name: &'static str, field: &mut T) -> Result<()> {
        let child = self.require_child(name)?;
        *field = self.read_value_element(child)?;
        Ok(())
    }

    fn optional_value_element<T: Value>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()> {
        *field = match self.next_named(name) {
            Some(child) => Some(self.read_value_element(child)?),
            None => None,
        };
        Ok(())
    }

    fn value_elements<T: Value>(
        &mut self,
        name: &'static str,
        min: usize,
        field: &mut Vec<T>,
    ) -> Result<()> {
        let mut values = Vec::new();
        while let Some(child) = self.next_named(name) {
            values.push(self.read_value_element(child)?);
        }
        self.check_min(name, min, values.len())?;
        *field = values;
        Ok(())
    }

    fn no_content(&mut self) -> Result<()> {
        let element = self.cursor.current();
        if let Some((attribute, _)) = element.attributes.first() {
            return Err(XmlError::UnexpectedAttribute {
                element: element.name.clone(),
                attribute: attribute.clone(),
            });
        }
        if let Some(child) = self.cursor.remaining().next() {
            return Err(XmlError::UnexpectedElement {
                parent: element.name.clone(),
                element: child.name.clone(),
            });
        }
        let text = self.cursor.text();
        if !text.trim().is_empty() {
            return Err(XmlError::InvalidValue {
                kind: "empty element",
                value: text,
            });
        }
        Ok(())
    }

    fn flag(&mut self, name: &'static str, field: &mut bool) -> Result<()> {
        *field = match self.next_named(name) {
            Some(child) => {
                self.with_child(child, |c| c.finish_element())?;
                true
            }
            None => false,
        };
        Ok(())
    }

    fn element<T: Schema>(&mut self, name: &'static str, field: &mut T) -> Result<()> {
        let child = self.require_child(name)?;
        *field = self.read_element(child)?;
        Ok(())
    }

    fn optional_element<T: Schema>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()> {
        *field = match self.next_named(name) {
            Some(child) => Some(self.read_element(child)?),
            None => None,
        };
        Ok(())
    }

    fn elements<T: Schema>(
        &mut self,
        name: &'static str,
        min: usize,
        field: &mut Vec<T>,
    ) -> Result<()> {
        let mut values = Vec::new();
        while let Some(child) = self.next_named(name) {
            values.push(self.read_element(child)?);
        }
        self.check_min(name, min, values.len())?;
        *field = values;
        Ok(())
    }

    fn choice<T: Choice>(&mut self, field: &mut T) -> Result<()> {
        *field = T::consume_choice(self)?;
        Ok(())
    }

    fn choices<T: Choice>(&mut self, min: usize, field: &mut Vec<T>) -> Result<()> {
        let alternatives = T::alternatives();
        let grouped = alternatives.iter().any(|alt| alt.tag.is_none());
        let mut values = Vec::new();

        while let Some(next) = self.cursor.peek_child() {
            if grouped {
                // Group alternatives cannot be told apart by tag; stop at the
                // first child none of them accepts.
                let before = self.consumed;
                match T::consume_choice(self) {
                    Ok(value) => values.push(value),
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(_) => break,
                }
                if self.consumed == before {
                    break;
                }
            } else if alternatives.iter().any(|alt| alt.tag == Some(next.name.as_str())) {
                values.push(T::consume_choice(self)?);
            } else {
                break;
            }
        }

        self.check_min(T::NAME, min, values.len())?;
        *field = values;
        Ok(())
    }
}

// =============================================================================
// PRODUCE
// =============================================================================

/// Writes slots into an element, in declaration order.
#[derive(Debug)]
pub struct Produce<'e> {
    element: &'e mut Element,
}

impl<'e> Produce<'e> {
    /// Write into `element`.
    pub fn new(element: &'e mut Element) -> Self {
        Self { element }
    }

    fn check_min(&self, name: &'static str, min: usize, found: usize) -> Result<()> {
        if found < min {
            return Err(XmlError::Cardinality {
                parent: self.element.name.clone(),
                element: name,
                min,
                found,
            });
        }
        Ok(())
    }

    fn push_value_element<T: Value>(&mut self, name: &'static str, value: &T) -> Result<()> {
        let text = encode(value)?;
        let mut child = Element::new(name);
        if !text.is_empty() {
            child.push_text(text);
        }
        self.element.push_element(child);
        Ok(())
    }

    fn push_element<T: Schema>(&mut self, name: &'static str, value: &T) -> Result<()> {
        let mut child = Element::new(name);
        node::generate(value, &mut child)?;
        self.element.push_element(child);
        Ok(())
    }

    /// Write a group of slots into the current element.
    pub fn group<T: Schema>(&mut self, value: &T) -> Result<()> {
        value.clone().describe(self)
    }

    /// Write `value` as a `tag` child element.
    pub fn tagged<T: Schema>(&mut self, tag: &'static str, value: &T) -> Result<()> {
        self.push_element(tag, value)
    }
}

impl<'e> Marshal for Produce<'e> {
    fn attribute<T: Value>(&mut self, name: &'static str, field: &mut T) -> Result<()> {
        let text = encode(field)?;
        self.element.set_attribute(name, text);
        Ok(())
    }

    fn optional_attribute<T: Value>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()> {
        if let Some(value) = field {
            self.attribute(name, value)?;
        }
        Ok(())
    }

    fn constant(&mut self, name: &'static str, value: &'static str) -> Result<()> {
        self.element.set_attribute(name, value);
        Ok(())
    }

    fn text<T: Value>(&mut self, field: &mut T) -> Result<()> {
        let text = encode(field)?;
        if !text.is_empty() {
            self.element.push_text(text);
        }
        Ok(())
    }

    fn optional_text<T: Value>(&mut self, field: &mut Option<T>) -> Result<()> {
        if let Some(value) = field {
            self.text(value)?;
        }
        Ok(())
    }

    fn value_element<T: Value>(&mut self, name: &'static str, field: &mut T) -> Result<()> {
        self.push_value_element(name, field)
    }

    fn optional_value_element<T: Value>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()> {
        if let Some(value) = field {
            self.push_value_element(name, value)?;
        }
        Ok(())
    }

    fn value_elements<T: Value>(
        &mut self,
        name: &'static str,
        min: usize,
        field: &mut Vec<T>,
    ) -> Result<()> {
        self.check_min(name, min, field.len())?;
        for value in field.iter() {
            self.push_value_element(name, value)?;
        }
        Ok(())
    }

    fn no_content(&mut self) -> Result<()> {
        Ok(())
    }

    fn flag(&mut self, name: &'static str, field: &mut bool) -> Result<()> {
        if *field {
            self.element.push_element(Element::new(name));
        }
        Ok(())
    }

    fn element<T: Schema>(&mut self, name: &'static str, field: &mut T) -> Result<()> {
        self.push_element(name, field)
    }

    fn optional_element<T: Schema>(
        &mut self,
        name: &'static str,
        field: &mut Option<T>,
    ) -> Result<()> {
        if let Some(value) = field {
            self.push_element(name, value)?;
        }
        Ok(())
    }

    fn elements<T: Schema>(
        &mut self,
        name: &'static str,
        min: usize,
        field: &mut Vec<T>,
    ) -> Result<()> {
        self.check_min(name, min, field.len())?;
        for value in field.iter() {
            self.push_element(name, value)?;
        }
        Ok(())
    }

    fn choice<T: Choice>(&mut self, field: &mut T) -> Result<()> {
        field.produce_choice(self)
    }

    fn choices<T: Choice>(&mut self, min: usize, field: &mut Vec<T>) -> Result<()> {
        self.check_min(T::NAME, min, field.len())?;
        for value in field.iter() {
            value.produce_choice(self)?;
        }
        Ok(())
    }
}
