//! The `<domainsnapshot>` document.

use serde::Serialize;

use crate::error::Result;
use crate::marshal::Marshal;
use crate::node::{Schema, Tag};
use crate::primitive::UnixTime;
use crate::schema::devices::{DiskDriver, DiskSource, EDiskType};
use crate::schema::domain::Domain;
use crate::xml_enum;

xml_enum! {
    /// Domain state captured by the snapshot.
    pub enum ESnapshotState {
        Running = "running",
        Blocked = "blocked",
        Paused = "paused",
        Shutdown = "shutdown",
        Shutoff = "shutoff",
        Crashed = "crashed",
        Pmsuspended = "pmsuspended",
        DiskSnapshot = "disk-snapshot",
    }
}

xml_enum! {
    pub enum ESnapshotMode {
        No = "no",
        Internal = "internal",
        External = "external",
        Manual = "manual",
    }
}

/// A libvirt domain snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainSnapshot {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<ESnapshotState>,
    pub parent: Option<SnapshotParent>,
    pub creation_time: Option<UnixTime>,
    pub memory: Option<SnapshotMemory>,
    pub disks: Option<SnapshotDisks>,
    pub domain: Option<Domain>,
    pub active: Option<u8>,
}

impl DomainSnapshot {
    /// Whether the snapshot is the child of another one.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

impl Schema for DomainSnapshot {
    const TAG: Tag = Tag::Strict("domainsnapshot");

    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_value_element("name", &mut self.name)?;
        m.optional_value_element("description", &mut self.description)?;
        m.optional_value_element("state", &mut self.state)?;
        m.optional_element("parent", &mut self.parent)?;
        m.optional_value_element("creationTime", &mut self.creation_time)?;
        m.optional_element("memory", &mut self.memory)?;
        m.optional_element("disks", &mut self.disks)?;
        m.optional_element("domain", &mut self.domain)?;
        m.optional_value_element("active", &mut self.active)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotParent {
    pub name: String,
}

impl Schema for SnapshotParent {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.value_element("name", &mut self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotMemory {
    pub snapshot: ESnapshotMode,
    pub file: Option<String>,
}

impl Schema for SnapshotMemory {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("snapshot", &mut self.snapshot)?;
        m.optional_attribute("file", &mut self.file)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDisks {
    pub disks: Vec<SnapshotDisk>,
}

impl Schema for SnapshotDisks {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.elements("disk", 0, &mut self.disks)
    }
}

/// Per-disk snapshot settings, keyed by target device or source path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDisk {
    pub name: String,
    pub snapshot: Option<ESnapshotMode>,
    pub kind: Option<EDiskType>,
    pub driver: Option<DiskDriver>,
    pub source: Option<DiskSource>,
}

impl Schema for SnapshotDisk {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("name", &mut self.name)?;
        m.optional_attribute("snapshot", &mut self.snapshot)?;
        m.optional_attribute("type", &mut self.kind)?;
        m.optional_element("driver", &mut self.driver)?;
        m.optional_element("source", &mut self.source)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_str, to_string, to_string_pretty};
    use crate::error::XmlError;
    use crate::layout::layout;
    use crate::schema::devices::{EDiskFormat, FileSource};

    const SNAPSHOT: &str = r#"
<domainsnapshot>
  <name>before-upgrade</name>
  <description>Taken before the kernel upgrade</description>
  <state>running</state>
  <parent>
    <name>base</name>
  </parent>
  <creationTime>1700000000</creationTime>
  <memory snapshot='external' file='/var/lib/snapshots/web-01.mem'/>
  <disks>
    <disk name='vda' snapshot='external' type='file'>
      <driver type='qcow2'/>
      <source file='/var/lib/snapshots/web-01.vda.qcow2'/>
    </disk>
    <disk name='vdb' snapshot='no'/>
  </disks>
  <domain type='kvm'>
    <name>web-01</name>
    <memory unit='MiB'>2048</memory>
    <os>
      <type arch='x86_64' machine='q35'>hvm</type>
    </os>
  </domain>
  <active>1</active>
</domainsnapshot>
"#;

    #[test]
    fn test_snapshot_parse() {
        let snapshot: DomainSnapshot = from_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.name.as_deref(), Some("before-upgrade"));
        assert_eq!(snapshot.state, Some(ESnapshotState::Running));
        assert_eq!(snapshot.creation_time.unwrap().secs(), 1_700_000_000);
        assert_eq!(snapshot.active, Some(1));
        assert!(snapshot.has_parent());
        assert_eq!(snapshot.parent.as_ref().unwrap().name, "base");

        let memory = snapshot.memory.as_ref().unwrap();
        assert_eq!(memory.snapshot, ESnapshotMode::External);

        let disks = &snapshot.disks.as_ref().unwrap().disks;
        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].driver.as_ref().unwrap().format, Some(EDiskFormat::Qcow2));
        assert_eq!(
            disks[0].source,
            Some(DiskSource::File(FileSource {
                file: "/var/lib/snapshots/web-01.vda.qcow2".to_string()
            }))
        );
        assert_eq!(disks[1].snapshot, Some(ESnapshotMode::No));
        assert!(disks[1].source.is_none());

        assert_eq!(snapshot.domain.as_ref().unwrap().name, "web-01");
    }

    #[test]
    fn test_snapshot_dumpxml() {
        let xml = r#"<domainsnapshot>
  <name>pre-migration</name>
  <state>shutoff</state>
  <parent>
    <name>installed</name>
  </parent>
  <creationTime>1700000100</creationTime>
  <memory snapshot='no'/>
  <disks>
    <disk name='vda' snapshot='internal'/>
    <disk name='sda' snapshot='no'/>
  </disks>
  <domain type='kvm'>
    <name>db-01</name>
    <uuid>4dea22b3-1d52-d8f3-2516-782e98ab3fa0</uuid>
    <memory unit='KiB'>8388608</memory>
    <vcpu placement='static'>4</vcpu>
    <os>
      <type arch='x86_64' machine='pc-q35-8.2'>hvm</type>
      <boot dev='hd'/>
    </os>
    <on_crash>destroy</on_crash>
  </domain>
  <active>0</active>
</domainsnapshot>
"#;
        let snapshot: DomainSnapshot = from_str(xml).unwrap();
        assert_eq!(snapshot.state, Some(ESnapshotState::Shutoff));
        assert_eq!(snapshot.parent.as_ref().unwrap().name, "installed");
        assert_eq!(snapshot.creation_time.unwrap().secs(), 1_700_000_100);
        assert_eq!(snapshot.memory.as_ref().unwrap().snapshot, ESnapshotMode::No);
        assert_eq!(snapshot.disks.as_ref().unwrap().disks[0].snapshot, Some(ESnapshotMode::Internal));
        assert_eq!(snapshot.domain.as_ref().unwrap().name, "db-01");
        assert_eq!(snapshot.active, Some(0));

        let again: DomainSnapshot = from_str(&to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_snapshot_misordered_children_rejected() {
        // creationTime ahead of parent, active ahead of domain. The element
        // whose slot was passed over is reported.
        let err = from_str::<DomainSnapshot>(
            "<domainsnapshot><name>s</name><creationTime>1700000000</creationTime>\
             <parent><name>base</name></parent></domainsnapshot>",
        )
        .unwrap_err();
        assert_eq!(
            err,
            XmlError::OutOfOrder {
                parent: "domainsnapshot".to_string(),
                element: "parent".to_string()
            }
        );

        let err = from_str::<DomainSnapshot>(
            "<domainsnapshot><name>s</name><active>1</active>\
             <domain type='kvm'><name>v</name><memory>1</memory><os><type>hvm</type></os></domain>\
             </domainsnapshot>",
        )
        .unwrap_err();
        assert_eq!(
            err,
            XmlError::OutOfOrder {
                parent: "domainsnapshot".to_string(),
                element: "domain".to_string()
            }
        );
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot: DomainSnapshot = from_str(SNAPSHOT).unwrap();
        let compact = to_string(&snapshot).unwrap();
        assert_eq!(from_str::<DomainSnapshot>(&compact).unwrap(), snapshot);

        let pretty = to_string_pretty(&snapshot, 2).unwrap();
        assert_eq!(from_str::<DomainSnapshot>(&pretty).unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_rejects_bad_state() {
        let err = from_str::<DomainSnapshot>("<domainsnapshot><state>sleeping</state></domainsnapshot>")
            .unwrap_err();
        assert!(matches!(err, XmlError::InvalidValue { .. }));
    }

    #[test]
    fn test_snapshot_rejects_domain_root() {
        let err = from_str::<DomainSnapshot>("<domain type='kvm'/>").unwrap_err();
        assert_eq!(
            err,
            XmlError::SchemaMismatch {
                expected: "domainsnapshot",
                found: "domain".to_string()
            }
        );
    }

    #[test]
    fn test_snapshot_disk_requires_name() {
        let err = from_str::<DomainSnapshot>("<domainsnapshot><disks><disk snapshot='no'/></disks></domainsnapshot>")
            .unwrap_err();
        assert_eq!(
            err,
            XmlError::MissingAttribute {
                element: "disk".to_string(),
                attribute: "name"
            }
        );
    }

    #[test]
    fn test_snapshot_layout_order() {
        let descriptor = layout::<DomainSnapshot>();
        assert_eq!(descriptor.tag, Some("domainsnapshot"));
        assert_eq!(
            descriptor.slot_names(),
            vec![
                "name",
                "description",
                "state",
                "parent",
                "creationTime",
                "memory",
                "disks",
                "domain",
                "active"
            ]
        );
    }
}
