//! # limiquantix VirtXML
//!
//! Schema-driven transcoder between libvirt XML documents and typed values.
//!
//! Each schema type lists its attributes and child elements once, in schema
//! order. The same description drives parsing, generation and layout
//! introspection:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Document Adapter             │
//! │   (load / save, root tag binding)       │
//! └─────────────────────┬───────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────┐
//! │         Schema Node (describe)          │
//! └─────────────────────┬───────────────────┘
//!                       │
//!         ┌─────────────┼─────────────┐
//!         ▼             ▼             ▼
//! ┌──────────────┐ ┌──────────┐ ┌──────────────┐
//! │   Consume    │ │ Produce  │ │LayoutRecorder│
//! │ (DomCursor)  │ │(Element) │ │ (SchemaType) │
//! └──────┬───────┘ └────┬─────┘ └──────────────┘
//!        │              │
//!        ▼              ▼
//! ┌─────────────────────────────────────────┐
//! │  Variant Encoder  /  Primitive Codec    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use limiquantix_virtxml::schema::domain::Cache;
//!
//! let xml = r#"<cache level="1" associativity="2" policy="writeback"><size unit="KiB">64</size><line unit="B">64</line></cache>"#;
//! let cache: Cache = limiquantix_virtxml::from_str(xml).unwrap();
//! assert_eq!(cache.level, 1);
//! assert_eq!(limiquantix_virtxml::to_string(&cache).unwrap(), xml);
//! ```

pub mod builder;
pub mod cursor;
pub mod document;
pub mod dom;
pub mod error;
pub mod layout;
pub mod marshal;
pub mod node;
pub mod primitive;
pub mod schema;
pub mod variant;

pub use builder::{ConsoleSpec, CpuSpec, DiskSpec, Firmware, NicSpec, VmSpec};
pub use cursor::{DomCursor, DEFAULT_MAX_DEPTH};
pub use document::{
    from_str, from_str_with, load, load_with, save, save_document, to_string, to_string_pretty,
    LoadOptions,
};
pub use dom::{Document, Element, Node};
pub use error::{Result, XmlError};
pub use layout::{layout, SchemaType, SlotKind, SlotSpec};
pub use marshal::{Cardinality, Consume, Marshal, Produce};
pub use node::{Empty, Schema, Tag};
pub use primitive::{decode, encode, UnixTime, Value};
pub use variant::{Alternative, Choice};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use regex::Regex;
    pub use serde;
}
