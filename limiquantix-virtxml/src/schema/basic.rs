//! Primitive types shared by the libvirt schemas.

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::marshal::Marshal;
use crate::node::Schema;
use crate::{pattern_value, ranged_value, value_choice, xml_enum};

// =============================================================================
// SCALARS
// =============================================================================

ranged_value! {
    /// TCP port. `-1` asks the hypervisor to pick one.
    pub struct PPortNumber(i32) in -1..=65535;
}

impl PPortNumber {
    /// The auto-assign sentinel.
    pub const AUTO: PPortNumber = PPortNumber(-1);

    pub fn is_auto(self) -> bool {
        self.0 == -1
    }
}

pattern_value! {
    /// Unicast MAC address (the multicast bit must be clear).
    pub struct PUniMacAddr = r"[0-9a-fA-F][02468aAcCeE](:[0-9a-fA-F]{2}){5}";
}

pattern_value! {
    /// UUID in dashed or plain hex form.
    pub struct PUuid = r"[a-fA-F0-9]{32}|[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}";
}

impl PUuid {
    /// A fresh random UUID.
    pub fn generate() -> Self {
        Self::from(Uuid::new_v4())
    }

    /// Parsed form, if the text is a valid UUID.
    pub fn to_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(self.as_str()).ok()
    }
}

impl From<Uuid> for PUuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

xml_enum! {
    pub enum EYesNo {
        Yes = "yes",
        No = "no",
    }
}

impl From<bool> for EYesNo {
    fn from(value: bool) -> Self {
        if value {
            EYesNo::Yes
        } else {
            EYesNo::No
        }
    }
}

xml_enum! {
    pub enum EOnOff {
        On = "on",
        Off = "off",
    }
}

xml_enum! {
    /// Unit of a scaled integer. KiB is libvirt's implied default.
    pub enum EUnit {
        KiB = "KiB",
        B = "B",
        Bytes = "bytes",
        KB = "KB",
        K = "K",
        MB = "MB",
        M = "M",
        MiB = "MiB",
        GB = "GB",
        G = "G",
        GiB = "GiB",
        TB = "TB",
        T = "T",
        TiB = "TiB",
    }
}

impl EUnit {
    /// Size of one unit in bytes.
    pub fn bytes(self) -> u64 {
        match self {
            EUnit::B | EUnit::Bytes => 1,
            EUnit::KB => 1_000,
            EUnit::K | EUnit::KiB => 1 << 10,
            EUnit::MB => 1_000_000,
            EUnit::M | EUnit::MiB => 1 << 20,
            EUnit::GB => 1_000_000_000,
            EUnit::G | EUnit::GiB => 1 << 30,
            EUnit::TB => 1_000_000_000_000,
            EUnit::T | EUnit::TiB => 1 << 40,
        }
    }
}

/// An integer with an optional `unit` attribute, e.g.
/// `<memory unit="MiB">4096</memory>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScaledInteger {
    pub unit: Option<EUnit>,
    pub value: u64,
}

impl ScaledInteger {
    pub fn new(value: u64, unit: EUnit) -> Self {
        Self {
            unit: Some(unit),
            value,
        }
    }

    pub fn mib(value: u64) -> Self {
        Self::new(value, EUnit::MiB)
    }

    /// Value in bytes, `None` on overflow.
    pub fn to_bytes(&self) -> Option<u64> {
        self.value.checked_mul(self.unit.unwrap_or_default().bytes())
    }
}

impl Schema for ScaledInteger {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("unit", &mut self.unit)?;
        m.text(&mut self.value)
    }
}

// =============================================================================
// HEX OR DECIMAL NUMBERS
// =============================================================================

pattern_value! {
    pub struct PHexUint = r"0x[0-9a-fA-F]{1,8}";
}

value_choice! {
    /// Unsigned integer written in hex (`0x1f`) or decimal.
    pub enum UInt {
        Hex(PHexUint),
        Decimal(u32),
    }
}

impl UInt {
    /// Hex form of `value`.
    pub fn hex(value: u32) -> Self {
        UInt::Hex(PHexUint(format!("0x{:x}", value)))
    }

    pub fn get(&self) -> Option<u32> {
        match self {
            UInt::Hex(hex) => parse_hex(hex.as_str()),
            UInt::Decimal(value) => Some(*value),
        }
    }
}

pattern_value! {
    pub struct PPciDomainHex = r"0x[0-9a-fA-F]{1,4}";
}

pattern_value! {
    pub struct PPciBusHex = r"0x[0-9a-fA-F]{1,2}";
}

pattern_value! {
    pub struct PPciSlotHex = r"0x[0-1]?[0-9a-fA-F]";
}

pattern_value! {
    pub struct PPciFunctionHex = r"0x[0-7]";
}

ranged_value! {
    pub struct PPciSlot(u8) in 0..=31;
}

ranged_value! {
    pub struct PPciFunction(u8) in 0..=7;
}

value_choice! {
    pub enum PciDomain {
        Hex(PPciDomainHex),
        Decimal(u16),
    }
}

value_choice! {
    pub enum PciBus {
        Hex(PPciBusHex),
        Decimal(u8),
    }
}

value_choice! {
    pub enum PciSlot {
        Hex(PPciSlotHex),
        Decimal(PPciSlot),
    }
}

value_choice! {
    pub enum PciFunction {
        Hex(PPciFunctionHex),
        Decimal(PPciFunction),
    }
}

impl PciDomain {
    pub fn hex(value: u16) -> Self {
        PciDomain::Hex(PPciDomainHex(format!("0x{:04x}", value)))
    }
}

impl PciBus {
    pub fn hex(value: u8) -> Self {
        PciBus::Hex(PPciBusHex(format!("0x{:02x}", value)))
    }
}

impl PciSlot {
    /// Hex form of a slot number, `None` above 31.
    pub fn hex(value: u8) -> Option<Self> {
        PPciSlot::new(value).map(|_| PciSlot::Hex(PPciSlotHex(format!("0x{:02x}", value))))
    }

    pub fn get(&self) -> Option<u8> {
        match self {
            PciSlot::Hex(hex) => parse_hex(hex.as_str()).and_then(|v| u8::try_from(v).ok()),
            PciSlot::Decimal(slot) => Some(slot.get()),
        }
    }
}

impl PciFunction {
    /// Hex form of a function number, `None` above 7.
    pub fn hex(value: u8) -> Option<Self> {
        PPciFunction::new(value).map(|_| PciFunction::Hex(PPciFunctionHex(format!("0x{:x}", value))))
    }
}

fn parse_hex(text: &str) -> Option<u32> {
    u32::from_str_radix(text.trim_start_matches("0x"), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XmlError;
    use crate::primitive::{decode, encode};

    #[test]
    fn test_port_number_bounds() {
        assert!(decode::<PPortNumber>("-2").is_err());
        assert!(decode::<PPortNumber>("-1").unwrap().is_auto());
        assert_eq!(decode::<PPortNumber>("65535").unwrap().get(), 65535);
        assert_eq!(
            decode::<PPortNumber>("65536"),
            Err(XmlError::InvalidValue {
                kind: "PPortNumber",
                value: "65536".to_string()
            })
        );
        assert_eq!(PPortNumber::AUTO.get(), -1);
    }

    #[test]
    fn test_mac_address() {
        assert!(decode::<PUniMacAddr>("52:54:00:aa:bb:cc").is_ok());
        assert!(decode::<PUniMacAddr>("FA:16:3E:AA:BB:CC").is_ok());
        // Multicast bit set.
        assert!(decode::<PUniMacAddr>("01:00:5e:00:00:01").is_err());
        assert!(decode::<PUniMacAddr>("52:54:00:aa:bb").is_err());
        assert!(decode::<PUniMacAddr>("52-54-00-aa-bb-cc").is_err());
        assert!(decode::<PUniMacAddr>("52:54:00:aa:bb:cc:dd").is_err());
        assert!(decode::<PUniMacAddr>("").is_err());
    }

    #[test]
    fn test_uuid() {
        assert!(decode::<PUuid>("c7a5fdbd-edaf-9455-926a-d65c16db1809").is_ok());
        assert!(decode::<PUuid>("c7a5fdbdedaf9455926ad65c16db1809").is_ok());
        assert!(decode::<PUuid>("c7a5fdbd-edaf-9455-926a").is_err());
        assert!(decode::<PUuid>("g7a5fdbd-edaf-9455-926a-d65c16db1809").is_err());

        let generated = PUuid::generate();
        assert!(encode(&generated).is_ok());
        assert_eq!(
            PUuid::from(generated.to_uuid().unwrap()),
            generated
        );
    }

    #[test]
    fn test_scaled_integer_bytes() {
        assert_eq!(ScaledInteger::mib(2).to_bytes(), Some(2 * 1024 * 1024));
        let implied = ScaledInteger {
            unit: None,
            value: 4,
        };
        assert_eq!(implied.to_bytes(), Some(4096));
        assert_eq!(ScaledInteger::new(u64::MAX, EUnit::KiB).to_bytes(), None);
    }

    #[test]
    fn test_pci_slot_prefers_hex() {
        let slot = decode::<PciSlot>("0x1f").unwrap();
        assert_eq!(slot.tag(), 0);
        assert_eq!(slot.get(), Some(31));

        let slot = decode::<PciSlot>("3").unwrap();
        assert_eq!(slot.tag(), 1);
        assert_eq!(slot.get(), Some(3));

        assert!(decode::<PciSlot>("32").is_err());
        assert!(decode::<PciSlot>("0x20").is_err());
        assert_eq!(encode(&PciSlot::hex(3).unwrap()).unwrap(), "0x03");
        assert!(PciSlot::hex(32).is_none());
    }

    #[test]
    fn test_pci_function_and_bus() {
        assert!(decode::<PciFunction>("0x7").is_ok());
        assert!(decode::<PciFunction>("0x8").is_err());
        assert!(decode::<PciFunction>("8").is_err());
        assert_eq!(encode(&PciBus::hex(0)).unwrap(), "0x00");
        assert_eq!(encode(&PciDomain::hex(0)).unwrap(), "0x0000");
        assert_eq!(decode::<PciBus>("255").unwrap(), PciBus::Decimal(255));
    }

    #[test]
    fn test_uint_forms() {
        assert_eq!(decode::<UInt>("0x1a").unwrap().get(), Some(26));
        assert_eq!(decode::<UInt>("26").unwrap().get(), Some(26));
        assert_eq!(encode(&UInt::hex(26)).unwrap(), "0x1a");
    }
}
