//! Schema nodes: the bridge between a typed value and its marshal tuple.

use crate::dom::Element;
use crate::error::Result;
use crate::marshal::{Consume, Marshal, Produce};

/// The element name a schema type is bound to at document level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// The root element must carry this tag.
    Strict(&'static str),
    /// An unnamed group of attributes and children. It is read from and
    /// written into whatever element the caller supplies.
    Anonymous,
}

impl Tag {
    /// The fixed tag, if any.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Tag::Strict(name) => Some(*name),
            Tag::Anonymous => None,
        }
    }
}

/// A typed value with a declarative XML layout.
///
/// `describe` lists the value's slots in schema order. It is run against a
/// default value when parsing and against a copy of the value when
/// generating, so it must only read or assign the fields it names.
pub trait Schema: Default + Clone {
    /// Document-level tag binding.
    const TAG: Tag = Tag::Anonymous;

    /// Walk the slots of this type in schema order.
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()>;
}

impl<T: Schema> Schema for Box<T> {
    const TAG: Tag = T::TAG;

    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        (**self).describe(m)
    }
}

/// A bare element such as a chain terminator. Reading fails if the
/// element carries any attribute, child element or text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Empty;

impl Schema for Empty {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.no_content()
    }
}

/// Read the current element of `consume` into `dst`.
///
/// `dst` is assigned only when every slot was read successfully. Returns the
/// number of child elements consumed at any depth.
pub fn parse<T: Schema>(dst: &mut T, consume: &mut Consume<'_>) -> Result<usize> {
    let before = consume.consumed();
    let mut value = T::default();
    value.describe(consume)?;
    consume.finish_element()?;
    *dst = value;
    Ok(consume.consumed() - before)
}

/// Write `src` into `dst`.
///
/// Slots are produced into a scratch element first; `dst` only receives the
/// result when every slot succeeded.
pub fn generate<T: Schema>(src: &T, dst: &mut Element) -> Result<()> {
    let mut scratch = Element::new(dst.name.clone());
    let mut value = src.clone();
    value.describe(&mut Produce::new(&mut scratch))?;
    dst.append(scratch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::DomCursor;
    use crate::error::XmlError;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Mac {
        address: String,
    }

    impl Schema for Mac {
        const TAG: Tag = Tag::Strict("mac");

        fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
            m.attribute("address", &mut self.address)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Nic {
        kind: String,
        mac: Option<Mac>,
        model: String,
    }

    impl Schema for Nic {
        fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
            m.attribute("type", &mut self.kind)?;
            m.optional_element("mac", &mut self.mac)?;
            m.value_element("model", &mut self.model)?;
            Ok(())
        }
    }

    #[test]
    fn test_parse_leaves_destination_untouched_on_failure() {
        let root = Element::parse("<interface type='bridge'><mac address='x'/></interface>").unwrap();
        let mut consume = Consume::new(DomCursor::new(&root), false);

        let original = Nic {
            kind: "network".to_string(),
            mac: None,
            model: "e1000".to_string(),
        };
        let mut dst = original.clone();
        let err = parse(&mut dst, &mut consume).unwrap_err();

        assert!(matches!(err, XmlError::MissingElement { element: "model", .. }));
        assert_eq!(dst, original);
    }

    #[test]
    fn test_parse_counts_consumed_elements() {
        let root = Element::parse(
            "<interface type='bridge'><mac address='52:54:00:00:00:01'/><model>virtio</model></interface>",
        )
        .unwrap();
        let mut consume = Consume::new(DomCursor::new(&root), false);
        let mut nic = Nic::default();

        assert_eq!(parse(&mut nic, &mut consume).unwrap(), 2);
        assert_eq!(nic.model, "virtio");
        assert_eq!(nic.mac.unwrap().address, "52:54:00:00:00:01");
    }

    #[test]
    fn test_generate_appends_only_on_success() {
        use crate::schema::basic::{PPortNumber, PUniMacAddr};

        #[derive(Debug, Clone, Default)]
        struct Listener {
            port: PPortNumber,
            mac: PUniMacAddr,
        }

        impl Schema for Listener {
            fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
                m.constant("type", "tcp")?;
                m.attribute("port", &mut self.port)?;
                m.attribute("mac", &mut self.mac)
            }
        }

        let mut dst = Element::new("listener").with_attribute("keep", "yes");
        let invalid = Listener {
            port: PPortNumber::new(5900).unwrap(),
            mac: PUniMacAddr::default(),
        };
        let err = generate(&invalid, &mut dst).unwrap_err();
        assert!(matches!(err, XmlError::InvalidValue { kind: "PUniMacAddr", .. }));
        assert_eq!(dst.attributes.len(), 1);

        let valid = Listener {
            mac: PUniMacAddr::new("52:54:00:aa:bb:cc").unwrap(),
            ..invalid
        };
        generate(&valid, &mut dst).unwrap();
        assert_eq!(dst.attribute("keep"), Some("yes"));
        assert_eq!(dst.attribute("type"), Some("tcp"));
        assert_eq!(dst.attribute("port"), Some("5900"));
        assert_eq!(dst.attribute("mac"), Some("52:54:00:aa:bb:cc"));
    }

    #[test]
    fn test_box_delegates() {
        let mut dst = Element::new("mac");
        let boxed = Box::new(Mac {
            address: "52:54:00:00:00:02".to_string(),
        });
        generate(&boxed, &mut dst).unwrap();
        assert_eq!(dst.attribute("address"), Some("52:54:00:00:00:02"));
        assert_eq!(<Box<Mac> as Schema>::TAG, Tag::Strict("mac"));
    }
}
