//! The `<filter>` document (libvirt network filters).

use serde::Serialize;

use crate::error::Result;
use crate::marshal::Marshal;
use crate::node::{Schema, Tag};
use crate::schema::basic::PUuid;
use crate::{element_choice, pattern_value, ranged_value, value_choice, xml_enum};

pattern_value! {
    pub struct PFilterName = r"[a-zA-Z0-9_\.:-]+";
}

pattern_value! {
    /// User-defined chain: a protocol prefix and a short suffix.
    pub struct PCustomChain = r"(mac|stp|vlan|arp|rarp|ipv4|ipv6)-[a-zA-Z0-9_\.:-]{1,8}";
}

ranged_value! {
    pub struct PFilterPriority(i32) in -1000..=1000;
}

xml_enum! {
    pub enum EChain {
        Root = "root",
        Mac = "mac",
        Stp = "stp",
        Vlan = "vlan",
        Arp = "arp",
        Rarp = "rarp",
        Ipv4 = "ipv4",
        Ipv6 = "ipv6",
    }
}

value_choice! {
    pub enum FilterChain {
        Known(EChain),
        Custom(PCustomChain),
    }
}

xml_enum! {
    pub enum ERuleAction {
        Drop = "drop",
        Reject = "reject",
        Accept = "accept",
        Return = "return",
        Continue = "continue",
    }
}

xml_enum! {
    pub enum ERuleDirection {
        In = "in",
        Out = "out",
        Inout = "inout",
    }
}

xml_enum! {
    pub enum EStateMatch {
        False = "false",
        Zero = "0",
        True = "true",
        One = "1",
    }
}

/// A network filter definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    pub name: PFilterName,
    pub chain: Option<FilterChain>,
    pub priority: Option<PFilterPriority>,
    pub uuid: Option<PUuid>,
    pub entries: Vec<FilterEntry>,
}

impl Schema for Filter {
    const TAG: Tag = Tag::Strict("filter");

    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("name", &mut self.name)?;
        m.optional_attribute("chain", &mut self.chain)?;
        m.optional_attribute("priority", &mut self.priority)?;
        m.optional_value_element("uuid", &mut self.uuid)?;
        m.choices(0, &mut self.entries)?;
        Ok(())
    }
}

element_choice! {
    /// Filter body entries, kept in document order.
    pub enum FilterEntry {
        Rule(Rule) = "rule",
        Reference(FilterReference) = "filterref",
    }
}

/// Reference to another filter, with parameter bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterReference {
    pub filter: String,
    pub parameters: Vec<FilterParameter>,
}

impl FilterReference {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(FilterParameter {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

impl Schema for FilterReference {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("filter", &mut self.filter)?;
        m.elements("parameter", 0, &mut self.parameters)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterParameter {
    pub name: String,
    pub value: String,
}

impl Schema for FilterParameter {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("name", &mut self.name)?;
        m.attribute("value", &mut self.value)
    }
}

// =============================================================================
// RULES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rule {
    pub action: ERuleAction,
    pub direction: ERuleDirection,
    pub priority: Option<PFilterPriority>,
    pub statematch: Option<EStateMatch>,
    pub matches: Vec<RuleMatch>,
}

impl Schema for Rule {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("action", &mut self.action)?;
        m.attribute("direction", &mut self.direction)?;
        m.optional_attribute("priority", &mut self.priority)?;
        m.optional_attribute("statematch", &mut self.statematch)?;
        m.choices(0, &mut self.matches)?;
        Ok(())
    }
}

element_choice! {
    /// Protocol match of a rule.
    pub enum RuleMatch {
        Mac(MacMatch) = "mac",
        Arp(ArpMatch) = "arp",
        Ip(IpMatch) = "ip",
        Ipv6(IpMatch) = "ipv6",
        Tcp(PortMatch) = "tcp",
        Udp(PortMatch) = "udp",
        Icmp(IcmpMatch) = "icmp",
        All(AllMatch) = "all",
    }
}

/// Attribute values may be literals or `$VARIABLE` references, so they are
/// kept as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacMatch {
    pub srcmacaddr: Option<String>,
    pub dstmacaddr: Option<String>,
    pub protocolid: Option<String>,
}

impl Schema for MacMatch {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("srcmacaddr", &mut self.srcmacaddr)?;
        m.optional_attribute("dstmacaddr", &mut self.dstmacaddr)?;
        m.optional_attribute("protocolid", &mut self.protocolid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArpMatch {
    pub srcmacaddr: Option<String>,
    pub opcode: Option<String>,
    pub arpsrcmacaddr: Option<String>,
    pub arpsrcipaddr: Option<String>,
}

impl Schema for ArpMatch {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("srcmacaddr", &mut self.srcmacaddr)?;
        m.optional_attribute("opcode", &mut self.opcode)?;
        m.optional_attribute("arpsrcmacaddr", &mut self.arpsrcmacaddr)?;
        m.optional_attribute("arpsrcipaddr", &mut self.arpsrcipaddr)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IpMatch {
    pub srcipaddr: Option<String>,
    pub dstipaddr: Option<String>,
    pub protocol: Option<String>,
    pub srcportstart: Option<u16>,
    pub dstportstart: Option<u16>,
}

impl Schema for IpMatch {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("srcipaddr", &mut self.srcipaddr)?;
        m.optional_attribute("dstipaddr", &mut self.dstipaddr)?;
        m.optional_attribute("protocol", &mut self.protocol)?;
        m.optional_attribute("srcportstart", &mut self.srcportstart)?;
        m.optional_attribute("dstportstart", &mut self.dstportstart)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortMatch {
    pub srcipaddr: Option<String>,
    pub dstipaddr: Option<String>,
    pub srcportstart: Option<u16>,
    pub dstportstart: Option<u16>,
    pub dstportend: Option<u16>,
    pub state: Option<String>,
}

impl Schema for PortMatch {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("srcipaddr", &mut self.srcipaddr)?;
        m.optional_attribute("dstipaddr", &mut self.dstipaddr)?;
        m.optional_attribute("srcportstart", &mut self.srcportstart)?;
        m.optional_attribute("dstportstart", &mut self.dstportstart)?;
        m.optional_attribute("dstportend", &mut self.dstportend)?;
        m.optional_attribute("state", &mut self.state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IcmpMatch {
    pub srcipaddr: Option<String>,
    pub kind: Option<u8>,
    pub code: Option<u8>,
}

impl Schema for IcmpMatch {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("srcipaddr", &mut self.srcipaddr)?;
        m.optional_attribute("type", &mut self.kind)?;
        m.optional_attribute("code", &mut self.code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllMatch {
    pub srcipaddr: Option<String>,
    pub dstipaddr: Option<String>,
    pub state: Option<String>,
}

impl Schema for AllMatch {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("srcipaddr", &mut self.srcipaddr)?;
        m.optional_attribute("dstipaddr", &mut self.dstipaddr)?;
        m.optional_attribute("state", &mut self.state)
    }
}
