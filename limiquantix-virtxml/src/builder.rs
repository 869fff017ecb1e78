//! Typed domain builder.
//!
//! Turns a compact VM description ([`VmSpec`]) into a full [`Domain`] with
//! the hardware layout the node daemon uses for every guest: q35 machine,
//! PCIe root ports for hot-plug, virtio disks and NICs, a serial console,
//! VNC graphics and the guest agent channels.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{Result, XmlError};
use crate::node::Empty;
use crate::primitive::decode;
use crate::schema::basic::{EOnOff, EYesNo, PPortNumber, PUniMacAddr, PUuid, ScaledInteger, UInt};
use crate::schema::devices::{
    BackingFormat, BackingLayer, BackingStore, BootOrder, BridgeSource, CharDevice, CharSource,
    CharTarget, Controller, ControllerModel, ControllerTarget, Devices, Disk, DiskDriver,
    DiskSource, DiskTarget, EControllerType, ECharType, EDiskBus, EDiskCache, EDiskDevice,
    EDiskFormat, EDiskIo, EDiskType, EGraphicsType, EInterfaceType, EListenType, ESourceMode,
    EVideoModel, EVirtualPortType, FileSource, Graphics, GraphicsListen, Interface,
    InterfaceModel, InterfaceSource, MacAddress, NetworkRef, Video, VideoModel, VirtualPort,
    VirtualPortParameters,
};
use crate::schema::domain::{
    Boot, Clock, Cpu, CpuModel, Domain, EBootDevice, EClockOffset, ECpuCheck, ECpuMatch,
    ECpuMode, ECrashAction, EFallback, ELifecycleAction, ELoaderType, EOsType, EPlacement,
    ETickPolicy, ETimerName, EVirtType, Features, Loader, Nvram, Os, OsType, Timer, Topology,
    Vcpu,
};

const EMULATOR: &str = "/usr/bin/qemu-system-x86_64";
const OVMF_CODE: &str = "/usr/share/OVMF/OVMF_CODE.fd";
const NVRAM_DIR: &str = "/var/lib/libvirt/qemu/nvram";
const AGENT_SOCKET_DIR: &str = "/var/run/quantix-kvm/vms";

/// First PCIe root port index. Lower indices are left to libvirt.
const ROOT_PORT_BASE: u32 = 10;
const ROOT_PORT_COUNT: u32 = 4;

// =============================================================================
// SPECS
// =============================================================================

/// Firmware type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Firmware {
    #[default]
    Bios,
    Uefi,
}

/// CPU shape and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuSpec {
    pub sockets: u32,
    pub cores: u32,
    pub threads_per_core: u32,
    /// `host-passthrough` (default), `host-model`, `max`, or a named model
    /// such as `Skylake-Server`.
    pub model: Option<String>,
}

impl Default for CpuSpec {
    fn default() -> Self {
        Self {
            sockets: 1,
            cores: 1,
            threads_per_core: 1,
            model: None,
        }
    }
}

impl CpuSpec {
    /// Total vCPU count, or `None` if the topology overflows `u32`.
    pub fn total_vcpus(&self) -> Option<u32> {
        self.sockets
            .checked_mul(self.cores)?
            .checked_mul(self.threads_per_core)
    }
}

/// A file-backed disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskSpec {
    pub path: String,
    pub bus: EDiskBus,
    pub format: EDiskFormat,
    pub cache: EDiskCache,
    pub io: EDiskIo,
    pub readonly: bool,
    pub bootable: bool,
    /// Base image of a copy-on-write overlay.
    pub backing_file: Option<String>,
}

impl Default for DiskSpec {
    fn default() -> Self {
        Self {
            path: String::new(),
            bus: EDiskBus::Virtio,
            format: EDiskFormat::Qcow2,
            cache: EDiskCache::None,
            io: EDiskIo::Native,
            readonly: false,
            bootable: false,
            backing_file: None,
        }
    }
}

impl DiskSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// A network interface.
///
/// With `ovn_port_name` set the NIC is plugged into an OVS bridge with an
/// `openvswitch` virtualport. Otherwise it attaches to `bridge`, then
/// `network`, then the `default` network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NicSpec {
    pub mac_address: Option<String>,
    pub bridge: Option<String>,
    pub network: Option<String>,
    pub model: String,
    pub ovn_port_name: Option<String>,
    pub ovs_bridge: Option<String>,
}

impl Default for NicSpec {
    fn default() -> Self {
        Self {
            mac_address: None,
            bridge: None,
            network: None,
            model: "virtio".to_string(),
            ovn_port_name: None,
            ovs_bridge: None,
        }
    }
}

/// Remote console settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleSpec {
    pub vnc_enabled: bool,
    /// `None` lets the hypervisor pick a port.
    pub vnc_port: Option<u16>,
    pub vnc_password: Option<String>,
    pub vnc_listen: String,
    pub spice_enabled: bool,
    pub spice_port: Option<u16>,
}

impl Default for ConsoleSpec {
    fn default() -> Self {
        Self {
            vnc_enabled: true,
            vnc_port: None,
            vnc_password: None,
            vnc_listen: "0.0.0.0".to_string(),
            spice_enabled: false,
            spice_port: None,
        }
    }
}

/// Compact description of a virtual machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmSpec {
    pub id: PUuid,
    pub name: String,
    pub cpu: CpuSpec,
    pub memory_mib: u64,
    pub disks: Vec<DiskSpec>,
    pub nics: Vec<NicSpec>,
    pub console: ConsoleSpec,
    pub firmware: Firmware,
    /// BIOS boot order. UEFI guests boot from the disks marked bootable.
    pub boot_order: Vec<EBootDevice>,
}

impl VmSpec {
    /// New spec with a random UUID and default hardware.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PUuid::generate(),
            name: name.into(),
            cpu: CpuSpec::default(),
            memory_mib: 1024,
            disks: Vec::new(),
            nics: Vec::new(),
            console: ConsoleSpec::default(),
            firmware: Firmware::default(),
            boot_order: vec![EBootDevice::Hd, EBootDevice::Cdrom, EBootDevice::Network],
        }
    }

    pub fn with_id(mut self, id: PUuid) -> Self {
        self.id = id;
        self
    }

    /// Set the number of cores.
    pub fn with_cpu(mut self, cores: u32) -> Self {
        self.cpu.cores = cores;
        self
    }

    pub fn with_cpu_model(mut self, model: impl Into<String>) -> Self {
        self.cpu.model = Some(model.into());
        self
    }

    /// Set the memory size in MiB.
    pub fn with_memory(mut self, memory_mib: u64) -> Self {
        self.memory_mib = memory_mib;
        self
    }

    pub fn with_firmware(mut self, firmware: Firmware) -> Self {
        self.firmware = firmware;
        self
    }

    pub fn with_disk(mut self, disk: DiskSpec) -> Self {
        self.disks.push(disk);
        self
    }

    pub fn with_nic(mut self, nic: NicSpec) -> Self {
        self.nics.push(nic);
        self
    }

    pub fn with_console(mut self, console: ConsoleSpec) -> Self {
        self.console = console;
        self
    }

    /// Build the domain definition.
    #[instrument(level = "debug", skip(self), fields(name = %self.name))]
    pub fn build(&self) -> Result<Domain> {
        if self.name.is_empty() {
            return Err(invalid("name", &self.name));
        }
        if self.memory_mib == 0 {
            return Err(invalid("memory", "0"));
        }
        let vcpus = match self.cpu.total_vcpus() {
            Some(0) => return Err(invalid("vcpu", "0")),
            Some(vcpus) => vcpus,
            None => {
                let topology = format!(
                    "{}x{}x{}",
                    self.cpu.sockets, self.cpu.cores, self.cpu.threads_per_core
                );
                return Err(invalid("vcpu", &topology));
            }
        };

        let domain = Domain {
            kind: EVirtType::Kvm,
            name: self.name.clone(),
            uuid: Some(self.id.clone()),
            memory: ScaledInteger::mib(self.memory_mib),
            vcpu: Some(Vcpu {
                placement: Some(EPlacement::Static),
                count: vcpus,
                ..Default::default()
            }),
            os: self.os(),
            features: Some(Features {
                acpi: true,
                apic: true,
                ..Default::default()
            }),
            cpu: Some(self.cpu()),
            clock: Some(clock()),
            on_poweroff: Some(ELifecycleAction::Destroy),
            on_reboot: Some(ELifecycleAction::Restart),
            on_crash: Some(ECrashAction::Destroy),
            devices: Some(self.devices()?),
            ..Default::default()
        };

        debug!(
            vcpus,
            disks = self.disks.len(),
            nics = self.nics.len(),
            "Built domain definition"
        );
        Ok(domain)
    }

    fn os(&self) -> Os {
        let kind = OsType {
            arch: Some("x86_64".to_string()),
            machine: Some("q35".to_string()),
            kind: EOsType::Hvm,
        };
        match self.firmware {
            Firmware::Bios => Os {
                kind,
                boot: self.boot_order.iter().map(|&dev| Boot { dev }).collect(),
                ..Default::default()
            },
            Firmware::Uefi => Os {
                kind,
                loader: Some(Loader {
                    readonly: Some(EYesNo::Yes),
                    kind: Some(ELoaderType::Pflash),
                    path: OVMF_CODE.to_string(),
                }),
                nvram: Some(Nvram {
                    template: None,
                    path: format!("{}/{}_VARS.fd", NVRAM_DIR, self.name),
                }),
                ..Default::default()
            },
        }
    }

    fn cpu(&self) -> Cpu {
        let topology = Some(Topology {
            sockets: self.cpu.sockets,
            dies: None,
            cores: self.cpu.cores,
            threads: self.cpu.threads_per_core,
        });
        match self.cpu.model.as_deref().unwrap_or("host-passthrough") {
            "host-passthrough" => Cpu {
                mode: Some(ECpuMode::HostPassthrough),
                check: Some(ECpuCheck::None),
                migratable: Some(EOnOff::Off),
                topology,
                ..Default::default()
            },
            "host-model" => Cpu {
                mode: Some(ECpuMode::HostModel),
                check: Some(ECpuCheck::Partial),
                topology,
                ..Default::default()
            },
            "max" => Cpu {
                mode: Some(ECpuMode::Maximum),
                check: Some(ECpuCheck::Partial),
                migratable: Some(EOnOff::On),
                topology,
                ..Default::default()
            },
            name => Cpu {
                mode: Some(ECpuMode::Custom),
                matching: Some(ECpuMatch::Exact),
                check: Some(ECpuCheck::Partial),
                model: Some(CpuModel {
                    fallback: Some(EFallback::Allow),
                    name: name.to_string(),
                }),
                topology,
                ..Default::default()
            },
        }
    }

    fn devices(&self) -> Result<Devices> {
        let mut devices = Devices {
            emulator: Some(EMULATOR.to_string()),
            controllers: root_ports(),
            ..Default::default()
        };

        let mut boot = 0;
        for (index, spec) in self.disks.iter().enumerate() {
            let boot_order = match (self.firmware, spec.bootable) {
                (Firmware::Uefi, true) => {
                    boot += 1;
                    Some(BootOrder { order: boot })
                }
                _ => None,
            };
            devices.disks.push(disk(spec, index, boot_order));
        }

        for spec in &self.nics {
            devices.interfaces.push(interface(spec)?);
        }

        devices.serials.push(CharDevice {
            kind: ECharType::Pty,
            target: Some(CharTarget {
                port: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        });
        devices.consoles.push(CharDevice {
            kind: ECharType::Pty,
            target: Some(CharTarget {
                kind: Some("serial".to_string()),
                port: Some(0),
                name: None,
            }),
            ..Default::default()
        });

        devices.graphics = self.graphics();
        devices.videos.push(Video {
            model: VideoModel {
                kind: EVideoModel::Vga,
                vram: Some(16384),
                heads: Some(1),
                primary: Some(EYesNo::Yes),
            },
            address: None,
        });
        devices.channels = self.channels();

        Ok(devices)
    }

    fn graphics(&self) -> Vec<Graphics> {
        let console = &self.console;
        let mut graphics = Vec::new();
        if console.vnc_enabled {
            graphics.push(Graphics {
                kind: EGraphicsType::Vnc,
                port: Some(port(console.vnc_port)),
                autoport: Some(EYesNo::Yes),
                listen: Some(console.vnc_listen.clone()),
                passwd: console.vnc_password.clone(),
                listens: vec![GraphicsListen {
                    kind: EListenType::Address,
                    address: Some(console.vnc_listen.clone()),
                    network: None,
                }],
            });
        }
        if console.spice_enabled {
            graphics.push(Graphics {
                kind: EGraphicsType::Spice,
                port: Some(port(console.spice_port)),
                autoport: Some(EYesNo::Yes),
                ..Default::default()
            });
        }
        graphics
    }

    fn channels(&self) -> Vec<CharDevice> {
        let agent = CharDevice {
            kind: ECharType::Unix,
            source: Some(CharSource {
                mode: Some(ESourceMode::Bind),
                path: Some(format!("{}/{}.agent.sock", AGENT_SOCKET_DIR, self.id)),
                ..Default::default()
            }),
            target: Some(virtio_target("org.quantix.agent.0")),
            address: None,
        };
        let qemu_ga = CharDevice {
            kind: ECharType::Unix,
            target: Some(virtio_target("org.qemu.guest_agent.0")),
            ..Default::default()
        };
        vec![agent, qemu_ga]
    }
}

// =============================================================================
// DEVICE HELPERS
// =============================================================================

fn invalid(kind: &'static str, value: &str) -> XmlError {
    XmlError::InvalidValue {
        kind,
        value: value.to_string(),
    }
}

fn port(port: Option<u16>) -> PPortNumber {
    port.and_then(|p| PPortNumber::new(i32::from(p)))
        .unwrap_or(PPortNumber::AUTO)
}

/// Target device name for the disk at `index`: `vda`..`vdz`, `vdaa`, ...
fn device_name(prefix: &str, index: usize) -> String {
    let mut suffix = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        suffix.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    suffix.reverse();
    format!("{}{}", prefix, String::from_utf8_lossy(&suffix))
}

fn root_ports() -> Vec<Controller> {
    (ROOT_PORT_BASE..ROOT_PORT_BASE + ROOT_PORT_COUNT)
        .map(|index| Controller {
            kind: EControllerType::Pci,
            index,
            model: Some("pcie-root-port".to_string()),
            model_name: Some(ControllerModel {
                name: "pcie-root-port".to_string(),
            }),
            target: Some(ControllerTarget {
                chassis: Some(index),
                port: Some(UInt::hex(index + 0x10)),
            }),
            address: None,
        })
        .collect()
}

fn disk(spec: &DiskSpec, index: usize, boot: Option<BootOrder>) -> Disk {
    let backing_store = spec.backing_file.as_ref().map(|base| {
        BackingStore::Layer(Box::new(BackingLayer {
            kind: EDiskType::File,
            index: Some(1),
            format: Some(BackingFormat {
                format: EDiskFormat::Qcow2,
            }),
            source: Some(DiskSource::File(FileSource { file: base.clone() })),
            backing_store: Some(BackingStore::End(Empty)),
        }))
    });

    Disk {
        kind: EDiskType::File,
        device: Some(EDiskDevice::Disk),
        driver: Some(DiskDriver {
            name: Some("qemu".to_string()),
            format: Some(spec.format),
            cache: Some(spec.cache),
            io: Some(spec.io),
            discard: None,
        }),
        source: Some(DiskSource::File(FileSource {
            file: spec.path.clone(),
        })),
        backing_store,
        target: DiskTarget {
            dev: device_name(spec.bus.device_prefix(), index),
            bus: Some(spec.bus),
            tray: None,
        },
        readonly: spec.readonly,
        boot,
        ..Default::default()
    }
}

fn interface(spec: &NicSpec) -> Result<Interface> {
    let mac = spec
        .mac_address
        .as_deref()
        .map(|mac| decode::<PUniMacAddr>(mac).map(|address| MacAddress { address }))
        .transpose()?;
    let model = Some(InterfaceModel {
        kind: spec.model.clone(),
    });

    if let Some(port_name) = &spec.ovn_port_name {
        let bridge = spec.ovs_bridge.as_deref().unwrap_or("br-int");
        return Ok(Interface {
            kind: EInterfaceType::Bridge,
            mac,
            source: Some(InterfaceSource::Bridge(BridgeSource {
                bridge: bridge.to_string(),
            })),
            virtualport: Some(VirtualPort {
                kind: EVirtualPortType::Openvswitch,
                parameters: Some(VirtualPortParameters {
                    interfaceid: Some(port_name.clone()),
                    profileid: None,
                }),
            }),
            model,
            ..Default::default()
        });
    }

    let (kind, source) = match (&spec.bridge, &spec.network) {
        (Some(bridge), _) => (
            EInterfaceType::Bridge,
            InterfaceSource::Bridge(BridgeSource {
                bridge: bridge.clone(),
            }),
        ),
        (None, Some(network)) => (
            EInterfaceType::Network,
            InterfaceSource::Network(NetworkRef {
                network: network.clone(),
                portgroup: None,
            }),
        ),
        (None, None) => (
            EInterfaceType::Network,
            InterfaceSource::Network(NetworkRef {
                network: "default".to_string(),
                portgroup: None,
            }),
        ),
    };
    Ok(Interface {
        kind,
        mac,
        source: Some(source),
        model,
        ..Default::default()
    })
}

fn virtio_target(name: &str) -> CharTarget {
    CharTarget {
        kind: Some("virtio".to_string()),
        port: None,
        name: Some(name.to_string()),
    }
}

fn clock() -> Clock {
    Clock {
        offset: EClockOffset::Utc,
        timezone: None,
        timers: vec![
            Timer {
                name: ETimerName::Rtc,
                tickpolicy: Some(ETickPolicy::Catchup),
                present: None,
            },
            Timer {
                name: ETimerName::Pit,
                tickpolicy: Some(ETickPolicy::Delay),
                present: None,
            },
            Timer {
                name: ETimerName::Hpet,
                tickpolicy: None,
                present: Some(EYesNo::No),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_str, to_string};

    fn xml(spec: &VmSpec) -> String {
        to_string(&spec.build().unwrap()).unwrap()
    }

    #[test]
    fn test_basic_domain() {
        let spec = VmSpec::new("test-vm")
            .with_cpu(4)
            .with_memory(4096)
            .with_disk(DiskSpec::new("/var/lib/vms/test.qcow2"));
        let xml = xml(&spec);

        assert!(xml.contains("<name>test-vm</name>"));
        assert!(xml.contains(r#"<memory unit="MiB">4096</memory>"#));
        assert!(xml.contains(r#"<vcpu placement="static">4</vcpu>"#));
        assert!(xml.contains(r#"<source file="/var/lib/vms/test.qcow2"/>"#));
        assert!(xml.contains(r#"<target dev="vda" bus="virtio"/>"#));
        assert!(xml.contains(r#"<boot dev="hd"/>"#));
    }

    #[test]
    fn test_built_domain_round_trips() {
        let spec = VmSpec::new("round-trip")
            .with_firmware(Firmware::Uefi)
            .with_disk(DiskSpec {
                bootable: true,
                backing_file: Some("/var/lib/images/base.qcow2".to_string()),
                ..DiskSpec::new("/var/lib/vms/rt.qcow2")
            })
            .with_nic(NicSpec {
                mac_address: Some("52:54:00:12:34:56".to_string()),
                bridge: Some("virbr0".to_string()),
                ..Default::default()
            });
        let domain = spec.build().unwrap();
        let parsed: Domain = from_str(&to_string(&domain).unwrap()).unwrap();
        assert_eq!(parsed, domain);

        let disk = &parsed.devices.as_ref().unwrap().disks[0];
        assert_eq!(disk.backing_depth(), 1);
        assert_eq!(disk.boot, Some(BootOrder { order: 1 }));
    }

    #[test]
    fn test_uefi_firmware() {
        let spec = VmSpec::new("uefi-vm").with_firmware(Firmware::Uefi);
        let domain = spec.build().unwrap();
        assert!(domain.os.boot.is_empty());
        assert_eq!(domain.os.loader.as_ref().unwrap().path, OVMF_CODE);

        let xml = xml(&spec);
        assert!(xml.contains("OVMF_CODE.fd"));
        assert!(xml.contains("<nvram>/var/lib/libvirt/qemu/nvram/uefi-vm_VARS.fd</nvram>"));
    }

    #[test]
    fn test_cpu_host_passthrough_mode() {
        let xml = xml(&VmSpec::new("cpu-test-vm"));
        assert!(xml.contains(r#"mode="host-passthrough""#));
        assert!(xml.contains(r#"check="none""#));
        assert!(xml.contains(r#"migratable="off""#));
    }

    #[test]
    fn test_cpu_host_model_mode() {
        let xml = xml(&VmSpec::new("cpu-test-vm").with_cpu_model("host-model"));
        assert!(xml.contains(r#"mode="host-model""#));
        assert!(xml.contains(r#"check="partial""#));
    }

    #[test]
    fn test_cpu_max_mode() {
        let xml = xml(&VmSpec::new("cpu-test-vm").with_cpu_model("max"));
        assert!(xml.contains(r#"mode="maximum""#));
        assert!(xml.contains(r#"migratable="on""#));
    }

    #[test]
    fn test_cpu_custom_model() {
        let xml = xml(&VmSpec::new("cpu-test-vm").with_cpu_model("Skylake-Server"));
        assert!(xml.contains(r#"mode="custom""#));
        assert!(xml.contains(r#"match="exact""#));
        assert!(xml.contains(r#"<model fallback="allow">Skylake-Server</model>"#));
    }

    #[test]
    fn test_ovs_nic() {
        let spec = VmSpec::new("ovn-vm").with_nic(NicSpec {
            mac_address: Some("fa:16:3e:aa:bb:cc".to_string()),
            ovn_port_name: Some("lsp-port-123".to_string()),
            ovs_bridge: Some("br-int".to_string()),
            ..Default::default()
        });
        let xml = xml(&spec);

        assert!(xml.contains(r#"<interface type="bridge">"#));
        assert!(xml.contains(r#"<source bridge="br-int"/>"#));
        assert!(xml.contains(r#"<virtualport type="openvswitch">"#));
        assert!(xml.contains(r#"interfaceid="lsp-port-123""#));
        assert!(xml.contains(r#"address="fa:16:3e:aa:bb:cc""#));
        assert!(xml.contains(r#"<model type="virtio"/>"#));
    }

    #[test]
    fn test_standard_nic() {
        let spec = VmSpec::new("std-vm").with_nic(NicSpec {
            mac_address: Some("52:54:00:12:34:56".to_string()),
            bridge: Some("virbr0".to_string()),
            ..Default::default()
        });
        let xml = xml(&spec);

        assert!(xml.contains(r#"<source bridge="virbr0"/>"#));
        assert!(!xml.contains("virtualport"));
        assert!(xml.contains(r#"address="52:54:00:12:34:56""#));

        let fallback = VmSpec::new("net-vm").with_nic(NicSpec::default());
        assert!(xml_contains(&fallback, r#"<source network="default"/>"#));
    }

    fn xml_contains(spec: &VmSpec, needle: &str) -> bool {
        xml(spec).contains(needle)
    }

    #[test]
    fn test_multicast_mac_rejected() {
        let spec = VmSpec::new("bad-mac").with_nic(NicSpec {
            mac_address: Some("01:00:5e:00:00:01".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            spec.build(),
            Err(XmlError::InvalidValue { kind: "PUniMacAddr", .. })
        ));
    }

    #[test]
    fn test_invalid_spec_rejected() {
        assert!(VmSpec::new("").build().is_err());
        assert!(VmSpec::new("no-memory").with_memory(0).build().is_err());
        assert!(VmSpec::new("no-cpu").with_cpu(0).build().is_err());
    }

    #[test]
    fn test_vcpu_topology_overflow_rejected() {
        let cpu = CpuSpec {
            sockets: 65536,
            cores: 65536,
            ..Default::default()
        };
        assert_eq!(cpu.total_vcpus(), None);

        let mut spec = VmSpec::new("huge");
        spec.cpu = cpu;
        assert_eq!(
            spec.build(),
            Err(XmlError::InvalidValue {
                kind: "vcpu",
                value: "65536x65536x1".to_string()
            })
        );

        let largest = CpuSpec {
            sockets: 65535,
            cores: 65537,
            ..Default::default()
        };
        assert_eq!(largest.total_vcpus(), Some(u32::MAX));
    }

    #[test]
    fn test_vnc_auto_port() {
        let domain = VmSpec::new("vnc-vm").build().unwrap();
        let graphics = &domain.devices.as_ref().unwrap().graphics[0];
        assert!(graphics.port.unwrap().is_auto());

        let console = ConsoleSpec {
            vnc_port: Some(5901),
            ..Default::default()
        };
        let xml = xml(&VmSpec::new("vnc-vm").with_console(console));
        assert!(xml.contains(r#"<graphics type="vnc" port="5901" autoport="yes" listen="0.0.0.0">"#));
    }

    #[test]
    fn test_agent_channels_and_root_ports() {
        let spec = VmSpec::new("agent-vm");
        let domain = spec.build().unwrap();
        let devices = domain.devices.as_ref().unwrap();

        assert_eq!(devices.controllers.len(), 4);
        assert_eq!(devices.controllers[0].index, 10);
        assert_eq!(
            devices.controllers[3].target.as_ref().unwrap().port.as_ref().unwrap().get(),
            Some(0x1d)
        );

        assert_eq!(devices.channels.len(), 2);
        let path = devices.channels[0].source.as_ref().unwrap().path.as_deref().unwrap();
        assert!(path.ends_with(&format!("{}.agent.sock", spec.id)));
    }

    #[test]
    fn test_device_names() {
        assert_eq!(device_name("vd", 0), "vda");
        assert_eq!(device_name("vd", 25), "vdz");
        assert_eq!(device_name("vd", 26), "vdaa");
        assert_eq!(device_name("sd", 27), "sdab");
    }
}
