//! libvirt schema types built on the marshal engine.
//!
//! - [`domain`]: `<domain>` and its CPU, OS and tuning sections
//! - [`devices`]: disks, controllers, interfaces and other devices
//! - [`snapshot`]: `<domainsnapshot>`
//! - [`filter`]: network filters (`<filter>`)

pub mod basic;
pub mod devices;
pub mod domain;
pub mod filter;
pub mod snapshot;

use crate::layout::{layout, SchemaType};

/// Schema types whose layout can be looked up by name.
pub const TYPE_NAMES: &[&str] = &[
    "Domain",
    "Os",
    "Cpu",
    "Numa",
    "Cache",
    "CpuTune",
    "Clock",
    "PowerManagement",
    "Devices",
    "Disk",
    "BackingStore",
    "DeviceAddress",
    "Controller",
    "Interface",
    "CharDevice",
    "Input",
    "Graphics",
    "Video",
    "DomainSnapshot",
    "Filter",
    "Rule",
    "FilterReference",
];

/// Layout of the schema type called `name` (case-insensitive).
pub fn layout_of(name: &str) -> Option<SchemaType> {
    let descriptor = match name.to_ascii_lowercase().as_str() {
        "domain" => layout::<domain::Domain>(),
        "os" => layout::<domain::Os>(),
        "cpu" => layout::<domain::Cpu>(),
        "numa" => layout::<domain::Numa>(),
        "cache" => layout::<domain::Cache>(),
        "cputune" => layout::<domain::CpuTune>(),
        "clock" => layout::<domain::Clock>(),
        "powermanagement" => layout::<domain::PowerManagement>(),
        "devices" => layout::<devices::Devices>(),
        "disk" => layout::<devices::Disk>(),
        "backingstore" => layout::<devices::BackingStore>(),
        "deviceaddress" => layout::<devices::DeviceAddress>(),
        "controller" => layout::<devices::Controller>(),
        "interface" => layout::<devices::Interface>(),
        "chardevice" => layout::<devices::CharDevice>(),
        "input" => layout::<devices::Input>(),
        "graphics" => layout::<devices::Graphics>(),
        "video" => layout::<devices::Video>(),
        "domainsnapshot" => layout::<snapshot::DomainSnapshot>(),
        "filter" => layout::<filter::Filter>(),
        "rule" => layout::<filter::Rule>(),
        "filterreference" => layout::<filter::FilterReference>(),
        _ => return None,
    };
    Some(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_type_has_a_layout() {
        for name in TYPE_NAMES {
            let descriptor = layout_of(name).unwrap();
            assert_eq!(&descriptor.type_name, name);
        }
    }

    #[test]
    fn test_layout_lookup_ignores_case() {
        assert_eq!(layout_of("domainSnapshot").unwrap().tag, Some("domainsnapshot"));
        assert!(layout_of("cpu").unwrap().tag.is_none());
        assert!(layout_of("nope").is_none());
    }
}
