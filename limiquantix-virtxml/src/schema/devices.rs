//! The `<devices>` section of a domain.

use serde::Serialize;

use crate::error::Result;
use crate::marshal::Marshal;
use crate::node::{Empty, Schema, Tag};
use crate::schema::basic::{
    EOnOff, EYesNo, PPortNumber, PUniMacAddr, PciBus, PciDomain, PciFunction, PciSlot, UInt,
};
use crate::schema::filter::FilterReference;
use crate::{element_choice, xml_enum};

// =============================================================================
// ENUMERATIONS
// =============================================================================

xml_enum! {
    pub enum EDiskType {
        File = "file",
        Block = "block",
        Dir = "dir",
        Network = "network",
        Volume = "volume",
    }
}

xml_enum! {
    pub enum EDiskDevice {
        Disk = "disk",
        Cdrom = "cdrom",
        Floppy = "floppy",
        Lun = "lun",
    }
}

xml_enum! {
    pub enum EDiskFormat {
        Raw = "raw",
        Qcow2 = "qcow2",
        Qcow = "qcow",
        Vmdk = "vmdk",
        Vdi = "vdi",
        Vhd = "vhd",
        Iso = "iso",
    }
}

xml_enum! {
    pub enum EDiskCache {
        Default = "default",
        None = "none",
        Writethrough = "writethrough",
        Writeback = "writeback",
        Directsync = "directsync",
        Unsafe = "unsafe",
    }
}

xml_enum! {
    pub enum EDiskIo {
        Native = "native",
        Threads = "threads",
        IoUring = "io_uring",
    }
}

xml_enum! {
    pub enum EDiscard {
        Unmap = "unmap",
        Ignore = "ignore",
    }
}

xml_enum! {
    pub enum EDiskBus {
        Virtio = "virtio",
        Scsi = "scsi",
        Sata = "sata",
        Ide = "ide",
        Usb = "usb",
        Fdc = "fdc",
        Xen = "xen",
        Sd = "sd",
    }
}

impl EDiskBus {
    /// Target device name prefix, e.g. `vd` for `vda`.
    pub fn device_prefix(&self) -> &'static str {
        match self {
            EDiskBus::Virtio => "vd",
            EDiskBus::Scsi | EDiskBus::Sata | EDiskBus::Usb => "sd",
            EDiskBus::Ide => "hd",
            EDiskBus::Fdc => "fd",
            EDiskBus::Xen => "xvd",
            EDiskBus::Sd => "mmcblk",
        }
    }
}

xml_enum! {
    pub enum ETray {
        Open = "open",
        Closed = "closed",
    }
}

xml_enum! {
    pub enum ENetworkProtocol {
        Nbd = "nbd",
        Rbd = "rbd",
        Iscsi = "iscsi",
        Gluster = "gluster",
        Http = "http",
        Https = "https",
        Nfs = "nfs",
    }
}

xml_enum! {
    pub enum EControllerType {
        Pci = "pci",
        Ide = "ide",
        Scsi = "scsi",
        Sata = "sata",
        Usb = "usb",
        VirtioSerial = "virtio-serial",
        Fdc = "fdc",
        Ccid = "ccid",
    }
}

xml_enum! {
    pub enum EInterfaceType {
        Bridge = "bridge",
        Network = "network",
        Direct = "direct",
        User = "user",
        Ethernet = "ethernet",
        Vhostuser = "vhostuser",
    }
}

xml_enum! {
    pub enum EDirectMode {
        Vepa = "vepa",
        Bridge = "bridge",
        Private = "private",
        Passthrough = "passthrough",
    }
}

xml_enum! {
    pub enum EVirtualPortType {
        Openvswitch = "openvswitch",
        Midonet = "midonet",
        Vepa8021qbg = "802.1Qbg",
        Vepa8021qbh = "802.1Qbh",
    }
}

xml_enum! {
    pub enum ECharType {
        Pty = "pty",
        Unix = "unix",
        File = "file",
        Tcp = "tcp",
        Udp = "udp",
        Null = "null",
        Vc = "vc",
        Stdio = "stdio",
        Spicevmc = "spicevmc",
    }
}

xml_enum! {
    pub enum ESourceMode {
        Bind = "bind",
        Connect = "connect",
    }
}

xml_enum! {
    pub enum EInputType {
        Mouse = "mouse",
        Tablet = "tablet",
        Keyboard = "keyboard",
        Passthrough = "passthrough",
        Evdev = "evdev",
    }
}

xml_enum! {
    pub enum EInputBus {
        Ps2 = "ps2",
        Usb = "usb",
        Virtio = "virtio",
        Xen = "xen",
        None = "none",
    }
}

xml_enum! {
    pub enum EGraphicsType {
        Vnc = "vnc",
        Spice = "spice",
        Sdl = "sdl",
        Rdp = "rdp",
        Desktop = "desktop",
        EglHeadless = "egl-headless",
    }
}

xml_enum! {
    pub enum EListenType {
        Address = "address",
        Network = "network",
        Socket = "socket",
        None = "none",
    }
}

xml_enum! {
    pub enum EVideoModel {
        Vga = "vga",
        Cirrus = "cirrus",
        Vmvga = "vmvga",
        Qxl = "qxl",
        Virtio = "virtio",
        Bochs = "bochs",
        Ramfb = "ramfb",
        None = "none",
    }
}

xml_enum! {
    pub enum EMemBalloonModel {
        Virtio = "virtio",
        Xen = "xen",
        None = "none",
    }
}

// =============================================================================
// DEVICES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Devices {
    pub emulator: Option<String>,
    pub disks: Vec<Disk>,
    pub controllers: Vec<Controller>,
    pub interfaces: Vec<Interface>,
    pub serials: Vec<CharDevice>,
    pub consoles: Vec<CharDevice>,
    pub channels: Vec<CharDevice>,
    pub inputs: Vec<Input>,
    pub graphics: Vec<Graphics>,
    pub videos: Vec<Video>,
    pub memballoon: Option<MemBalloon>,
}

impl Schema for Devices {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_value_element("emulator", &mut self.emulator)?;
        m.elements("disk", 0, &mut self.disks)?;
        m.elements("controller", 0, &mut self.controllers)?;
        m.elements("interface", 0, &mut self.interfaces)?;
        m.elements("serial", 0, &mut self.serials)?;
        m.elements("console", 0, &mut self.consoles)?;
        m.elements("channel", 0, &mut self.channels)?;
        m.elements("input", 0, &mut self.inputs)?;
        m.elements("graphics", 0, &mut self.graphics)?;
        m.elements("video", 0, &mut self.videos)?;
        m.optional_element("memballoon", &mut self.memballoon)?;
        Ok(())
    }
}

// =============================================================================
// DISKS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Disk {
    pub kind: EDiskType,
    pub device: Option<EDiskDevice>,
    pub driver: Option<DiskDriver>,
    pub source: Option<DiskSource>,
    pub backing_store: Option<BackingStore>,
    pub target: DiskTarget,
    pub readonly: bool,
    pub shareable: bool,
    pub serial: Option<String>,
    pub boot: Option<BootOrder>,
    pub address: Option<DeviceAddress>,
}

impl Disk {
    /// Number of layers in the backing chain, the top image excluded.
    pub fn backing_depth(&self) -> usize {
        let mut depth = 0;
        let mut next = self.backing_store.as_ref();
        while let Some(BackingStore::Layer(layer)) = next {
            depth += 1;
            next = layer.backing_store.as_ref();
        }
        depth
    }
}

impl Schema for Disk {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("device", &mut self.device)?;
        m.optional_element("driver", &mut self.driver)?;
        m.optional_element("source", &mut self.source)?;
        m.optional_element("backingStore", &mut self.backing_store)?;
        m.element("target", &mut self.target)?;
        m.flag("readonly", &mut self.readonly)?;
        m.flag("shareable", &mut self.shareable)?;
        m.optional_value_element("serial", &mut self.serial)?;
        m.optional_element("boot", &mut self.boot)?;
        m.optional_element("address", &mut self.address)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiskDriver {
    pub name: Option<String>,
    pub format: Option<EDiskFormat>,
    pub cache: Option<EDiskCache>,
    pub io: Option<EDiskIo>,
    pub discard: Option<EDiscard>,
}

impl Schema for DiskDriver {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("name", &mut self.name)?;
        m.optional_attribute("type", &mut self.format)?;
        m.optional_attribute("cache", &mut self.cache)?;
        m.optional_attribute("io", &mut self.io)?;
        m.optional_attribute("discard", &mut self.discard)?;
        Ok(())
    }
}

element_choice! {
    /// Attributes of `<source>`, which depend on the disk type.
    pub enum DiskSource {
        File(FileSource),
        Block(BlockSource),
        Dir(DirSource),
        Network(NetworkSource),
        Volume(VolumeSource),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileSource {
    pub file: String,
}

impl Schema for FileSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("file", &mut self.file)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockSource {
    pub dev: String,
}

impl Schema for BlockSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("dev", &mut self.dev)
    }
}

/// Host directory exposed as a virtual FAT disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirSource {
    pub dir: String,
}

impl Schema for DirSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("dir", &mut self.dir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSource {
    pub protocol: ENetworkProtocol,
    pub name: Option<String>,
    pub hosts: Vec<SourceHost>,
}

impl Schema for NetworkSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("protocol", &mut self.protocol)?;
        m.optional_attribute("name", &mut self.name)?;
        m.elements("host", 0, &mut self.hosts)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceHost {
    pub name: String,
    pub port: Option<PPortNumber>,
}

impl Schema for SourceHost {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("name", &mut self.name)?;
        m.optional_attribute("port", &mut self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolumeSource {
    pub pool: String,
    pub volume: String,
}

impl Schema for VolumeSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("pool", &mut self.pool)?;
        m.attribute("volume", &mut self.volume)
    }
}

element_choice! {
    /// One link of a backing chain: another image, or the end of the chain
    /// (`<backingStore/>`).
    pub enum BackingStore {
        Layer(Box<BackingLayer>),
        End(Empty),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackingLayer {
    pub kind: EDiskType,
    pub index: Option<u32>,
    pub format: Option<BackingFormat>,
    pub source: Option<DiskSource>,
    pub backing_store: Option<BackingStore>,
}

impl Schema for BackingLayer {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("index", &mut self.index)?;
        m.optional_element("format", &mut self.format)?;
        m.optional_element("source", &mut self.source)?;
        m.optional_element("backingStore", &mut self.backing_store)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackingFormat {
    pub format: EDiskFormat,
}

impl Schema for BackingFormat {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.format)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiskTarget {
    pub dev: String,
    pub bus: Option<EDiskBus>,
    pub tray: Option<ETray>,
}

impl Schema for DiskTarget {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("dev", &mut self.dev)?;
        m.optional_attribute("bus", &mut self.bus)?;
        m.optional_attribute("tray", &mut self.tray)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BootOrder {
    pub order: u32,
}

impl Schema for BootOrder {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("order", &mut self.order)
    }
}

// =============================================================================
// ADDRESSES
// =============================================================================

element_choice! {
    /// Guest-side device address, discriminated by its `type` attribute.
    pub enum DeviceAddress {
        Pci(PciAddress),
        Drive(DriveAddress),
        VirtioSerial(VirtioSerialAddress),
        Usb(UsbAddress),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PciAddress {
    pub domain: Option<PciDomain>,
    pub bus: PciBus,
    pub slot: PciSlot,
    pub function: Option<PciFunction>,
    pub multifunction: Option<EOnOff>,
}

impl Schema for PciAddress {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.constant("type", "pci")?;
        m.optional_attribute("domain", &mut self.domain)?;
        m.attribute("bus", &mut self.bus)?;
        m.attribute("slot", &mut self.slot)?;
        m.optional_attribute("function", &mut self.function)?;
        m.optional_attribute("multifunction", &mut self.multifunction)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriveAddress {
    pub controller: Option<u32>,
    pub bus: Option<u32>,
    pub target: Option<u32>,
    pub unit: Option<u32>,
}

impl Schema for DriveAddress {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.constant("type", "drive")?;
        m.optional_attribute("controller", &mut self.controller)?;
        m.optional_attribute("bus", &mut self.bus)?;
        m.optional_attribute("target", &mut self.target)?;
        m.optional_attribute("unit", &mut self.unit)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VirtioSerialAddress {
    pub controller: Option<u32>,
    pub bus: Option<u32>,
    pub port: Option<u32>,
}

impl Schema for VirtioSerialAddress {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.constant("type", "virtio-serial")?;
        m.optional_attribute("controller", &mut self.controller)?;
        m.optional_attribute("bus", &mut self.bus)?;
        m.optional_attribute("port", &mut self.port)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsbAddress {
    pub bus: u32,
    pub port: String,
}

impl Schema for UsbAddress {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.constant("type", "usb")?;
        m.attribute("bus", &mut self.bus)?;
        m.attribute("port", &mut self.port)
    }
}

// =============================================================================
// CONTROLLERS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Controller {
    pub kind: EControllerType,
    pub index: u32,
    pub model: Option<String>,
    pub model_name: Option<ControllerModel>,
    pub target: Option<ControllerTarget>,
    pub address: Option<DeviceAddress>,
}

impl Schema for Controller {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.attribute("index", &mut self.index)?;
        m.optional_attribute("model", &mut self.model)?;
        m.optional_element("model", &mut self.model_name)?;
        m.optional_element("target", &mut self.target)?;
        m.optional_element("address", &mut self.address)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerModel {
    pub name: String,
}

impl Schema for ControllerModel {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("name", &mut self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerTarget {
    pub chassis: Option<u32>,
    pub port: Option<UInt>,
}

impl Schema for ControllerTarget {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("chassis", &mut self.chassis)?;
        m.optional_attribute("port", &mut self.port)
    }
}

// =============================================================================
// INTERFACES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Interface {
    pub kind: EInterfaceType,
    pub mac: Option<MacAddress>,
    pub source: Option<InterfaceSource>,
    pub virtualport: Option<VirtualPort>,
    pub target: Option<InterfaceTarget>,
    pub model: Option<InterfaceModel>,
    pub filterref: Option<FilterReference>,
    pub address: Option<DeviceAddress>,
}

impl Schema for Interface {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_element("mac", &mut self.mac)?;
        m.optional_element("source", &mut self.source)?;
        m.optional_element("virtualport", &mut self.virtualport)?;
        m.optional_element("target", &mut self.target)?;
        m.optional_element("model", &mut self.model)?;
        m.optional_element("filterref", &mut self.filterref)?;
        m.optional_element("address", &mut self.address)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MacAddress {
    pub address: PUniMacAddr,
}

impl Schema for MacAddress {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("address", &mut self.address)
    }
}

element_choice! {
    pub enum InterfaceSource {
        Bridge(BridgeSource),
        Network(NetworkRef),
        Direct(DirectSource),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BridgeSource {
    pub bridge: String,
}

impl Schema for BridgeSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("bridge", &mut self.bridge)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkRef {
    pub network: String,
    pub portgroup: Option<String>,
}

impl Schema for NetworkRef {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("network", &mut self.network)?;
        m.optional_attribute("portgroup", &mut self.portgroup)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectSource {
    pub dev: String,
    pub mode: Option<EDirectMode>,
}

impl Schema for DirectSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("dev", &mut self.dev)?;
        m.optional_attribute("mode", &mut self.mode)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VirtualPort {
    pub kind: EVirtualPortType,
    pub parameters: Option<VirtualPortParameters>,
}

impl Schema for VirtualPort {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_element("parameters", &mut self.parameters)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VirtualPortParameters {
    pub interfaceid: Option<String>,
    pub profileid: Option<String>,
}

impl Schema for VirtualPortParameters {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("interfaceid", &mut self.interfaceid)?;
        m.optional_attribute("profileid", &mut self.profileid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceTarget {
    pub dev: String,
}

impl Schema for InterfaceTarget {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("dev", &mut self.dev)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceModel {
    pub kind: String,
}

impl Schema for InterfaceModel {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)
    }
}

// =============================================================================
// CHARACTER DEVICES
// =============================================================================

/// `<serial>`, `<console>` or `<channel>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CharDevice {
    pub kind: ECharType,
    pub source: Option<CharSource>,
    pub target: Option<CharTarget>,
    pub address: Option<DeviceAddress>,
}

impl Schema for CharDevice {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_element("source", &mut self.source)?;
        m.optional_element("target", &mut self.target)?;
        m.optional_element("address", &mut self.address)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CharSource {
    pub mode: Option<ESourceMode>,
    pub path: Option<String>,
    pub host: Option<String>,
    pub service: Option<String>,
}

impl Schema for CharSource {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("mode", &mut self.mode)?;
        m.optional_attribute("path", &mut self.path)?;
        m.optional_attribute("host", &mut self.host)?;
        m.optional_attribute("service", &mut self.service)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CharTarget {
    pub kind: Option<String>,
    pub port: Option<u32>,
    pub name: Option<String>,
}

impl Schema for CharTarget {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("type", &mut self.kind)?;
        m.optional_attribute("port", &mut self.port)?;
        m.optional_attribute("name", &mut self.name)?;
        Ok(())
    }
}

// =============================================================================
// INPUT, GRAPHICS AND VIDEO
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Input {
    pub kind: EInputType,
    pub bus: Option<EInputBus>,
    pub address: Option<DeviceAddress>,
}

impl Schema for Input {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("bus", &mut self.bus)?;
        m.optional_element("address", &mut self.address)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graphics {
    pub kind: EGraphicsType,
    pub port: Option<PPortNumber>,
    pub autoport: Option<EYesNo>,
    pub listen: Option<String>,
    pub passwd: Option<String>,
    pub listens: Vec<GraphicsListen>,
}

impl Schema for Graphics {
    const TAG: Tag = Tag::Strict("graphics");

    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("port", &mut self.port)?;
        m.optional_attribute("autoport", &mut self.autoport)?;
        m.optional_attribute("listen", &mut self.listen)?;
        m.optional_attribute("passwd", &mut self.passwd)?;
        m.elements("listen", 0, &mut self.listens)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphicsListen {
    pub kind: EListenType,
    pub address: Option<String>,
    pub network: Option<String>,
}

impl Schema for GraphicsListen {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("address", &mut self.address)?;
        m.optional_attribute("network", &mut self.network)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Video {
    pub model: VideoModel,
    pub address: Option<DeviceAddress>,
}

impl Schema for Video {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.element("model", &mut self.model)?;
        m.optional_element("address", &mut self.address)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoModel {
    pub kind: EVideoModel,
    pub vram: Option<u32>,
    pub heads: Option<u32>,
    pub primary: Option<EYesNo>,
}

impl Schema for VideoModel {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("vram", &mut self.vram)?;
        m.optional_attribute("heads", &mut self.heads)?;
        m.optional_attribute("primary", &mut self.primary)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemBalloon {
    pub model: EMemBalloonModel,
    pub stats: Option<MemBalloonStats>,
    pub address: Option<DeviceAddress>,
}

impl Schema for MemBalloon {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("model", &mut self.model)?;
        m.optional_element("stats", &mut self.stats)?;
        m.optional_element("address", &mut self.address)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemBalloonStats {
    pub period: u32,
}

impl Schema for MemBalloonStats {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("period", &mut self.period)
    }
}
