//! Schema layout descriptors.
//!
//! Running a type's `describe` against a [`LayoutRecorder`] yields its
//! [`SchemaType`]: the element binding and the ordered slot table, with the
//! cardinality and value type of each slot. The CLI prints these tables and
//! tests use them to pin slot order.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::marshal::{Cardinality, Marshal};
use crate::node::{Schema, Tag};
use crate::primitive::Value;
use crate::variant::Choice;

/// What a slot maps to in the XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Attribute,
    /// Attribute with a fixed value.
    Constant(&'static str),
    /// The element's own text.
    Text,
    /// Child element holding a value as text.
    ValueElement,
    /// Empty marker child element.
    Flag,
    /// Child element with its own schema.
    Element,
    /// One of several alternatives.
    Choice,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Attribute => "attribute",
            SlotKind::Constant(_) => "constant",
            SlotKind::Text => "text",
            SlotKind::ValueElement => "value",
            SlotKind::Flag => "flag",
            SlotKind::Element => "element",
            SlotKind::Choice => "choice",
        }
    }
}

impl Serialize for Cardinality {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Required => f.write_str("1"),
            Cardinality::Optional => f.write_str("0..1"),
            Cardinality::List { min } => write!(f, "{}..*", min),
        }
    }
}

/// One entry of a slot table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSpec {
    pub kind: SlotKind,
    /// Attribute or element name. For choices, the choice type name.
    pub name: String,
    pub cardinality: Cardinality,
    /// Value or schema type of the slot. Choices list their alternatives.
    pub value_type: String,
}

/// Descriptor of one schema type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaType {
    /// Document tag, `None` for anonymous groups.
    pub tag: Option<&'static str>,
    pub type_name: String,
    pub slots: Vec<SlotSpec>,
}

impl SchemaType {
    /// Names of the slots in schema order.
    pub fn slot_names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.name.as_str()).collect()
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => writeln!(f, "<{}> ({})", tag, self.type_name)?,
            None => writeln!(f, "(anonymous) ({})", self.type_name)?,
        }
        for slot in &self.slots {
            let kind = match &slot.kind {
                SlotKind::Constant(value) => format!("constant={}", value),
                other => other.as_str().to_string(),
            };
            writeln!(
                f,
                "  {:<14} {:<20} {:<6} {}",
                kind, slot.name, slot.cardinality, slot.value_type
            )?;
        }
        Ok(())
    }
}

/// Strip module paths from a type name, keeping generic arguments.
///
/// `alloc::vec::Vec<crate::schema::devices::Disk>` becomes `Vec<Disk>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or(""));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or(""));
    out
}

fn type_name<T>() -> String {
    short_type_name(std::any::type_name::<T>())
}

/// Records the slot table of a schema type.
#[derive(Debug, Default)]
pub struct LayoutRecorder {
    slots: Vec<SlotSpec>,
}

impl LayoutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slots recorded so far.
    pub fn into_slots(self) -> Vec<SlotSpec> {
        self.slots
    }

    fn record(&mut self, kind: SlotKind, name: &str, cardinality: Cardinality, value_type: String) {
        self.slots.push(SlotSpec {
            kind,
            name: name.to_string(),
            cardinality,
            value_type,
        });
    }

    fn choice_type<T: Choice>() -> String {
        T::alternatives()
            .iter()
            .map(|alt| match alt.tag {
                Some(tag) => format!("<{}>", tag),
                None => short_type_name(alt.type_name),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Marshal for LayoutRecorder {
    fn attribute<T: Value>(&mut self, name: &'static str, _field: &mut T) -> Result<()> {
        self.record(SlotKind::Attribute, name, Cardinality::Required, T::KIND.to_string());
        Ok(())
    }

    fn optional_attribute<T: Value>(
        &mut self,
        name: &'static str,
        _field: &mut Option<T>,
    ) -> Result<()> {
        self.record(SlotKind::Attribute, name, Cardinality::Optional, T::KIND.to_string());
        Ok(())
    }

    fn constant(&mut self, name: &'static str, value: &'static str) -> Result<()> {
        self.record(
            SlotKind::Constant(value),
            name,
            Cardinality::Required,
            "string".to_string(),
        );
        Ok(())
    }

    fn text<T: Value>(&mut self, _field: &mut T) -> Result<()> {
        self.record(SlotKind::Text, "#text", Cardinality::Required, T::KIND.to_string());
        Ok(())
    }

    fn optional_text<T: Value>(&mut self, _field: &mut Option<T>) -> Result<()> {
        self.record(SlotKind::Text, "#text", Cardinality::Optional, T::KIND.to_string());
        Ok(())
    }

    fn value_element<T: Value>(&mut self, name: &'static str, _field: &mut T) -> Result<()> {
        self.record(SlotKind::ValueElement, name, Cardinality::Required, T::KIND.to_string());
        Ok(())
    }

    fn optional_value_element<T: Value>(
        &mut self,
        name: &'static str,
        _field: &mut Option<T>,
    ) -> Result<()> {
        self.record(SlotKind::ValueElement, name, Cardinality::Optional, T::KIND.to_string());
        Ok(())
    }

    fn value_elements<T: Value>(
        &mut self,
        name: &'static str,
        min: usize,
        _field: &mut Vec<T>,
    ) -> Result<()> {
        self.record(
            SlotKind::ValueElement,
            name,
            Cardinality::List { min },
            T::KIND.to_string(),
        );
        Ok(())
    }

    fn no_content(&mut self) -> Result<()> {
        Ok(())
    }

    fn flag(&mut self, name: &'static str, _field: &mut bool) -> Result<()> {
        self.record(SlotKind::Flag, name, Cardinality::Optional, "empty".to_string());
        Ok(())
    }

    fn element<T: Schema>(&mut self, name: &'static str, _field: &mut T) -> Result<()> {
        self.record(SlotKind::Element, name, Cardinality::Required, type_name::<T>());
        Ok(())
    }

    fn optional_element<T: Schema>(
        &mut self,
        name: &'static str,
        _field: &mut Option<T>,
    ) -> Result<()> {
        self.record(SlotKind::Element, name, Cardinality::Optional, type_name::<T>());
        Ok(())
    }

    fn elements<T: Schema>(
        &mut self,
        name: &'static str,
        min: usize,
        _field: &mut Vec<T>,
    ) -> Result<()> {
        self.record(SlotKind::Element, name, Cardinality::List { min }, type_name::<T>());
        Ok(())
    }

    fn choice<T: Choice>(&mut self, _field: &mut T) -> Result<()> {
        self.record(SlotKind::Choice, T::NAME, Cardinality::Required, Self::choice_type::<T>());
        Ok(())
    }

    fn choices<T: Choice>(&mut self, min: usize, _field: &mut Vec<T>) -> Result<()> {
        self.record(
            SlotKind::Choice,
            T::NAME,
            Cardinality::List { min },
            Self::choice_type::<T>(),
        );
        Ok(())
    }
}

/// Record the layout of `T`.
pub fn layout<T: Schema>() -> SchemaType {
    let mut recorder = LayoutRecorder::new();
    if let Err(error) = T::default().describe(&mut recorder) {
        // Recorder slots never fail, so the describe body itself bailed out.
        // The slots recorded up to that point are kept.
        warn!(type_name = %type_name::<T>(), error = %error, "Layout recording stopped early");
    }
    SchemaType {
        tag: T::TAG.name(),
        type_name: type_name::<T>(),
        slots: recorder.into_slots(),
    }
}
