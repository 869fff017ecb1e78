//! Document adapter: top-level load and save entry points.
//!
//! A type with [`Tag::Strict`] is loaded from an element carrying exactly
//! that tag and saved as a new child element with that tag. An anonymous
//! type is an unnamed group: it is loaded from the attributes and children
//! of whatever element it is given, and saved directly into that element.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cursor::{DomCursor, DEFAULT_MAX_DEPTH};
use crate::dom::{Document, Element};
use crate::error::{Result, XmlError};
use crate::marshal::Consume;
use crate::node::{self, Schema, Tag};

/// Options for loading documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Maximum element nesting, the loaded element included.
    pub max_depth: usize,
    /// Fail on child elements no slot consumed instead of skipping them.
    pub deny_unknown: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            deny_unknown: false,
        }
    }
}

impl LoadOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_deny_unknown(mut self, deny_unknown: bool) -> Self {
        self.deny_unknown = deny_unknown;
        self
    }
}

/// Load a value from `root` with default options.
pub fn load<T: Schema>(root: &Element) -> Result<T> {
    load_with(root, &LoadOptions::default())
}

/// Load a value from `root`.
#[instrument(level = "debug", skip(root, options), fields(root = %root.name))]
pub fn load_with<T: Schema>(root: &Element, options: &LoadOptions) -> Result<T> {
    if let Tag::Strict(expected) = T::TAG {
        if root.name != expected {
            return Err(XmlError::SchemaMismatch {
                expected,
                found: root.name.clone(),
            });
        }
    }

    let cursor = DomCursor::with_max_depth(root, options.max_depth);
    let mut consume = Consume::new(cursor, options.deny_unknown);
    let mut value = T::default();
    let consumed = node::parse(&mut value, &mut consume)?;

    debug!(consumed, "Loaded document element");
    Ok(value)
}

/// Save `value` into `parent`.
///
/// Nothing is written to `parent` if any slot fails.
#[instrument(level = "debug", skip(value, parent), fields(parent = %parent.name))]
pub fn save<T: Schema>(value: &T, parent: &mut Element) -> Result<()> {
    match T::TAG {
        Tag::Strict(tag) => {
            let mut child = Element::new(tag);
            node::generate(value, &mut child)?;
            parent.push_element(child);
        }
        Tag::Anonymous => node::generate(value, parent)?,
    }
    debug!("Saved document element");
    Ok(())
}

/// Save `value` as the root of a new document.
pub fn save_document<T: Schema>(value: &T) -> Result<Document> {
    let tag = T::TAG
        .name()
        .ok_or(XmlError::AnonymousRoot(std::any::type_name::<T>()))?;
    let mut root = Element::new(tag);
    node::generate(value, &mut root)?;
    Ok(Document::new(root))
}

/// Parse XML text and load its root element with default options.
pub fn from_str<T: Schema>(xml: &str) -> Result<T> {
    from_str_with(xml, &LoadOptions::default())
}

/// Parse XML text and load its root element. The nesting limit applies to
/// both parsing and loading.
pub fn from_str_with<T: Schema>(xml: &str, options: &LoadOptions) -> Result<T> {
    let document = Document::parse_with_depth(xml, options.max_depth)?;
    load_with(&document.root, options)
}

/// Serialize `value` as a compact XML document.
pub fn to_string<T: Schema>(value: &T) -> Result<String> {
    save_document(value)?.to_xml()
}

/// Serialize `value` as an indented XML document.
pub fn to_string_pretty<T: Schema>(value: &T, indent: usize) -> Result<String> {
    save_document(value)?.to_xml_pretty(indent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::Marshal;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Topology {
        sockets: u32,
        cores: u32,
    }

    impl Schema for Topology {
        const TAG: Tag = Tag::Strict("topology");

        fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
            m.attribute("sockets", &mut self.sockets)?;
            m.attribute("cores", &mut self.cores)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Seclabel {
        model: String,
        label: Option<String>,
    }

    impl Schema for Seclabel {
        fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
            m.attribute("model", &mut self.model)?;
            m.optional_value_element("label", &mut self.label)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Chain {
        next: Option<Box<Chain>>,
    }

    impl Schema for Chain {
        const TAG: Tag = Tag::Strict("store");

        fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
            m.optional_element("store", &mut self.next)
        }
    }

    #[test]
    fn test_strict_load_checks_tag() {
        let topology: Topology = from_str("<topology sockets='2' cores='4'/>").unwrap();
        assert_eq!(topology, Topology { sockets: 2, cores: 4 });

        let err = from_str::<Topology>("<cpu sockets='2' cores='4'/>").unwrap_err();
        assert_eq!(
            err,
            XmlError::SchemaMismatch {
                expected: "topology",
                found: "cpu".to_string()
            }
        );
    }

    #[test]
    fn test_anonymous_load_reads_any_element() {
        let root = Element::parse("<seclabel model='selinux'><label>x</label></seclabel>").unwrap();
        let seclabel: Seclabel = load(&root).unwrap();
        assert_eq!(seclabel.model, "selinux");
        assert_eq!(seclabel.label.as_deref(), Some("x"));

        // No tag check for unnamed groups.
        let other = Element::parse("<label model='dac'/>").unwrap();
        assert_eq!(load::<Seclabel>(&other).unwrap().model, "dac");
    }

    #[test]
    fn test_save_strict_adds_child() {
        let mut parent = Element::new("cpu").with_attribute("mode", "custom");
        save(&Topology { sockets: 1, cores: 8 }, &mut parent).unwrap();
        assert_eq!(
            parent.to_xml().unwrap(),
            r#"<cpu mode="custom"><topology sockets="1" cores="8"/></cpu>"#
        );
    }

    #[test]
    fn test_save_anonymous_writes_into_parent() {
        let mut parent = Element::new("seclabel");
        let seclabel = Seclabel {
            model: "dac".to_string(),
            label: Some("+0:+0".to_string()),
        };
        save(&seclabel, &mut parent).unwrap();
        assert_eq!(
            parent.to_xml().unwrap(),
            r#"<seclabel model="dac"><label>+0:+0</label></seclabel>"#
        );
        assert_eq!(load::<Seclabel>(&parent).unwrap(), seclabel);
        assert_eq!(save_document(&seclabel), Err(XmlError::AnonymousRoot(std::any::type_name::<Seclabel>())));
    }

    #[test]
    fn test_round_trip_through_text() {
        let topology = Topology { sockets: 4, cores: 2 };
        let xml = to_string(&topology).unwrap();
        assert_eq!(xml, r#"<topology sockets="4" cores="2"/>"#);
        assert_eq!(from_str::<Topology>(&xml).unwrap(), topology);
    }

    #[test]
    fn test_depth_limit_bounds_recursion() {
        let xml = "<store><store><store><store/></store></store></store>";
        let chain: Chain = from_str(xml).unwrap();
        assert!(chain.next.as_ref().unwrap().next.is_some());

        let options = LoadOptions::default().with_max_depth(3);
        let err = from_str_with::<Chain>(xml, &options).unwrap_err();
        assert_eq!(err, XmlError::DepthExceeded { limit: 3 });
    }

    #[test]
    fn test_deny_unknown() {
        let xml = "<topology sockets='1' cores='1'><extra/></topology>";
        assert!(from_str::<Topology>(xml).is_ok());

        let options = LoadOptions::default().with_deny_unknown(true);
        assert_eq!(
            from_str_with::<Topology>(xml, &options),
            Err(XmlError::UnexpectedElement {
                parent: "topology".to_string(),
                element: "extra".to_string()
            })
        );
    }

    #[test]
    fn test_load_options_defaults_from_partial_input() {
        let options: LoadOptions = serde_json::from_str(r#"{"deny_unknown": true}"#).unwrap();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.deny_unknown);
    }
}
