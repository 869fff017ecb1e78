//! The `<domain>` document.

use serde::Serialize;

use crate::error::Result;
use crate::marshal::Marshal;
use crate::node::{Schema, Tag};
use crate::schema::basic::{EOnOff, EUnit, EYesNo, PUuid, ScaledInteger};
use crate::schema::devices::Devices;
use crate::{ranged_value, value_choice, xml_enum};

// =============================================================================
// ENUMERATIONS
// =============================================================================

xml_enum! {
    pub enum EVirtType {
        Kvm = "kvm",
        Qemu = "qemu",
        Kqemu = "kqemu",
        Xen = "xen",
        Lxc = "lxc",
        Vmware = "vmware",
        Hyperv = "hyperv",
    }
}

xml_enum! {
    pub enum EPlacement {
        Static = "static",
        Auto = "auto",
    }
}

xml_enum! {
    pub enum EOsType {
        Hvm = "hvm",
        Linux = "linux",
        Xen = "xen",
        Exe = "exe",
    }
}

xml_enum! {
    pub enum ELoaderType {
        Rom = "rom",
        Pflash = "pflash",
    }
}

xml_enum! {
    pub enum EBootDevice {
        Hd = "hd",
        Cdrom = "cdrom",
        Network = "network",
        Fd = "fd",
    }
}

xml_enum! {
    pub enum ECpuMode {
        Custom = "custom",
        HostModel = "host-model",
        HostPassthrough = "host-passthrough",
        Maximum = "maximum",
    }
}

xml_enum! {
    pub enum ECpuMatch {
        Minimum = "minimum",
        Exact = "exact",
        Strict = "strict",
    }
}

xml_enum! {
    pub enum ECpuCheck {
        None = "none",
        Partial = "partial",
        Full = "full",
    }
}

xml_enum! {
    pub enum EFallback {
        Allow = "allow",
        Forbid = "forbid",
    }
}

xml_enum! {
    pub enum EFeaturePolicy {
        Force = "force",
        Require = "require",
        Optional = "optional",
        Disable = "disable",
        Forbid = "forbid",
    }
}

xml_enum! {
    pub enum EMemAccess {
        Shared = "shared",
        Private = "private",
    }
}

xml_enum! {
    pub enum ECacheAssociativity {
        None = "none",
        Direct = "direct",
        Full = "full",
    }
}

xml_enum! {
    pub enum ECachePolicy {
        None = "none",
        Writeback = "writeback",
        Writethrough = "writethrough",
    }
}

xml_enum! {
    pub enum EClockOffset {
        Utc = "utc",
        Localtime = "localtime",
        Timezone = "timezone",
        Variable = "variable",
    }
}

xml_enum! {
    pub enum ETimerName {
        Platform = "platform",
        Pit = "pit",
        Rtc = "rtc",
        Hpet = "hpet",
        Tsc = "tsc",
        Kvmclock = "kvmclock",
        Hypervclock = "hypervclock",
        Armvtimer = "armvtimer",
    }
}

xml_enum! {
    pub enum ETickPolicy {
        Delay = "delay",
        Catchup = "catchup",
        Merge = "merge",
        Discard = "discard",
    }
}

xml_enum! {
    pub enum ELifecycleAction {
        Destroy = "destroy",
        Restart = "restart",
        Preserve = "preserve",
        RenameRestart = "rename-restart",
    }
}

xml_enum! {
    pub enum ECrashAction {
        Destroy = "destroy",
        Restart = "restart",
        Preserve = "preserve",
        RenameRestart = "rename-restart",
        CoredumpDestroy = "coredump-destroy",
        CoredumpRestart = "coredump-restart",
    }
}

ranged_value! {
    /// CFS period in microseconds.
    pub struct PCpuperiod(u64) in 1000..=1000000;
}

ranged_value! {
    /// CFS quota in microseconds, `-1` for unlimited.
    pub struct PCpuquota(i64) in -1..=18446744073709551;
}

value_choice! {
    /// Cache associativity: a named kind or a number of ways.
    pub enum CacheAssociativity {
        Named(ECacheAssociativity),
        Ways(u32),
    }
}

// =============================================================================
// DOMAIN
// =============================================================================

/// A libvirt domain definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Domain {
    pub kind: EVirtType,
    pub id: Option<i32>,
    pub name: String,
    pub uuid: Option<PUuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub memory: ScaledInteger,
    pub current_memory: Option<ScaledInteger>,
    pub vcpu: Option<Vcpu>,
    pub cputune: Option<CpuTune>,
    pub os: Os,
    pub features: Option<Features>,
    pub cpu: Option<Cpu>,
    pub clock: Option<Clock>,
    pub on_poweroff: Option<ELifecycleAction>,
    pub on_reboot: Option<ELifecycleAction>,
    pub on_crash: Option<ECrashAction>,
    pub pm: Option<PowerManagement>,
    pub devices: Option<Devices>,
}

impl Schema for Domain {
    const TAG: Tag = Tag::Strict("domain");

    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("type", &mut self.kind)?;
        m.optional_attribute("id", &mut self.id)?;
        m.value_element("name", &mut self.name)?;
        m.optional_value_element("uuid", &mut self.uuid)?;
        m.optional_value_element("title", &mut self.title)?;
        m.optional_value_element("description", &mut self.description)?;
        m.element("memory", &mut self.memory)?;
        m.optional_element("currentMemory", &mut self.current_memory)?;
        m.optional_element("vcpu", &mut self.vcpu)?;
        m.optional_element("cputune", &mut self.cputune)?;
        m.element("os", &mut self.os)?;
        m.optional_element("features", &mut self.features)?;
        m.optional_element("cpu", &mut self.cpu)?;
        m.optional_element("clock", &mut self.clock)?;
        m.optional_value_element("on_poweroff", &mut self.on_poweroff)?;
        m.optional_value_element("on_reboot", &mut self.on_reboot)?;
        m.optional_value_element("on_crash", &mut self.on_crash)?;
        m.optional_element("pm", &mut self.pm)?;
        m.optional_element("devices", &mut self.devices)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vcpu {
    pub placement: Option<EPlacement>,
    pub cpuset: Option<String>,
    pub current: Option<u32>,
    pub count: u32,
}

impl Schema for Vcpu {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("placement", &mut self.placement)?;
        m.optional_attribute("cpuset", &mut self.cpuset)?;
        m.optional_attribute("current", &mut self.current)?;
        m.text(&mut self.count)
    }
}

// =============================================================================
// OS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Os {
    pub kind: OsType,
    pub loader: Option<Loader>,
    pub nvram: Option<Nvram>,
    pub kernel: Option<String>,
    pub initrd: Option<String>,
    pub cmdline: Option<String>,
    pub boot: Vec<Boot>,
    pub bootmenu: Option<BootMenu>,
}

impl Schema for Os {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.element("type", &mut self.kind)?;
        m.optional_element("loader", &mut self.loader)?;
        m.optional_element("nvram", &mut self.nvram)?;
        m.optional_value_element("kernel", &mut self.kernel)?;
        m.optional_value_element("initrd", &mut self.initrd)?;
        m.optional_value_element("cmdline", &mut self.cmdline)?;
        m.elements("boot", 0, &mut self.boot)?;
        m.optional_element("bootmenu", &mut self.bootmenu)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OsType {
    pub arch: Option<String>,
    pub machine: Option<String>,
    pub kind: EOsType,
}

impl Schema for OsType {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("arch", &mut self.arch)?;
        m.optional_attribute("machine", &mut self.machine)?;
        m.text(&mut self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Loader {
    pub readonly: Option<EYesNo>,
    pub kind: Option<ELoaderType>,
    pub path: String,
}

impl Schema for Loader {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("readonly", &mut self.readonly)?;
        m.optional_attribute("type", &mut self.kind)?;
        m.text(&mut self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Nvram {
    pub template: Option<String>,
    pub path: String,
}

impl Schema for Nvram {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("template", &mut self.template)?;
        m.text(&mut self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Boot {
    pub dev: EBootDevice,
}

impl Schema for Boot {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("dev", &mut self.dev)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BootMenu {
    pub enable: EYesNo,
    pub timeout: Option<u32>,
}

impl Schema for BootMenu {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("enable", &mut self.enable)?;
        m.optional_attribute("timeout", &mut self.timeout)
    }
}

// =============================================================================
// FEATURES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Features {
    pub acpi: bool,
    pub apic: bool,
    pub pae: bool,
    pub hyperv: Option<Hyperv>,
    pub vmport: Option<FeatureState>,
    pub smm: Option<FeatureState>,
}

impl Schema for Features {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.flag("acpi", &mut self.acpi)?;
        m.flag("apic", &mut self.apic)?;
        m.flag("pae", &mut self.pae)?;
        m.optional_element("hyperv", &mut self.hyperv)?;
        m.optional_element("vmport", &mut self.vmport)?;
        m.optional_element("smm", &mut self.smm)?;
        Ok(())
    }
}

/// `<feature state="on|off"/>`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureState {
    pub state: EOnOff,
}

impl FeatureState {
    pub fn on() -> Self {
        Self { state: EOnOff::On }
    }
}

impl Schema for FeatureState {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("state", &mut self.state)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Spinlocks {
    pub state: EOnOff,
    pub retries: Option<u32>,
}

impl Schema for Spinlocks {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("state", &mut self.state)?;
        m.optional_attribute("retries", &mut self.retries)
    }
}

/// Hyper-V enlightenments for Windows guests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hyperv {
    pub relaxed: Option<FeatureState>,
    pub vapic: Option<FeatureState>,
    pub spinlocks: Option<Spinlocks>,
    pub vpindex: Option<FeatureState>,
    pub runtime: Option<FeatureState>,
    pub synic: Option<FeatureState>,
    pub stimer: Option<FeatureState>,
    pub reset: Option<FeatureState>,
    pub frequencies: Option<FeatureState>,
    pub reftime: Option<FeatureState>,
    pub tlbflush: Option<FeatureState>,
    pub ipi: Option<FeatureState>,
}

impl Schema for Hyperv {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_element("relaxed", &mut self.relaxed)?;
        m.optional_element("vapic", &mut self.vapic)?;
        m.optional_element("spinlocks", &mut self.spinlocks)?;
        m.optional_element("vpindex", &mut self.vpindex)?;
        m.optional_element("runtime", &mut self.runtime)?;
        m.optional_element("synic", &mut self.synic)?;
        m.optional_element("stimer", &mut self.stimer)?;
        m.optional_element("reset", &mut self.reset)?;
        m.optional_element("frequencies", &mut self.frequencies)?;
        m.optional_element("reftime", &mut self.reftime)?;
        m.optional_element("tlbflush", &mut self.tlbflush)?;
        m.optional_element("ipi", &mut self.ipi)?;
        Ok(())
    }
}

// =============================================================================
// CPU
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cpu {
    pub mode: Option<ECpuMode>,
    pub matching: Option<ECpuMatch>,
    pub check: Option<ECpuCheck>,
    pub migratable: Option<EOnOff>,
    pub model: Option<CpuModel>,
    pub vendor: Option<String>,
    pub topology: Option<Topology>,
    pub features: Vec<CpuFeature>,
    pub numa: Option<Numa>,
}

impl Schema for Cpu {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("mode", &mut self.mode)?;
        m.optional_attribute("match", &mut self.matching)?;
        m.optional_attribute("check", &mut self.check)?;
        m.optional_attribute("migratable", &mut self.migratable)?;
        m.optional_element("model", &mut self.model)?;
        m.optional_value_element("vendor", &mut self.vendor)?;
        m.optional_element("topology", &mut self.topology)?;
        m.elements("feature", 0, &mut self.features)?;
        m.optional_element("numa", &mut self.numa)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuModel {
    pub fallback: Option<EFallback>,
    pub name: String,
}

impl Schema for CpuModel {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("fallback", &mut self.fallback)?;
        m.text(&mut self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Topology {
    pub sockets: u32,
    pub dies: Option<u32>,
    pub cores: u32,
    pub threads: u32,
}

impl Topology {
    /// Product of the topology levels, or `None` on `u32` overflow.
    pub fn total_vcpus(&self) -> Option<u32> {
        self.sockets
            .checked_mul(self.dies.unwrap_or(1))?
            .checked_mul(self.cores)?
            .checked_mul(self.threads)
    }
}

impl Schema for Topology {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("sockets", &mut self.sockets)?;
        m.optional_attribute("dies", &mut self.dies)?;
        m.attribute("cores", &mut self.cores)?;
        m.attribute("threads", &mut self.threads)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuFeature {
    pub policy: Option<EFeaturePolicy>,
    pub name: String,
}

impl Schema for CpuFeature {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("policy", &mut self.policy)?;
        m.attribute("name", &mut self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Numa {
    pub cells: Vec<NumaCell>,
}

impl Schema for Numa {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.elements("cell", 1, &mut self.cells)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumaCell {
    pub id: Option<u32>,
    pub cpus: Option<String>,
    pub memory: u64,
    pub unit: Option<EUnit>,
    pub mem_access: Option<EMemAccess>,
    pub discard: Option<EYesNo>,
    pub distances: Option<Distances>,
    pub caches: Vec<Cache>,
}

impl Schema for NumaCell {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_attribute("id", &mut self.id)?;
        m.optional_attribute("cpus", &mut self.cpus)?;
        m.attribute("memory", &mut self.memory)?;
        m.optional_attribute("unit", &mut self.unit)?;
        m.optional_attribute("memAccess", &mut self.mem_access)?;
        m.optional_attribute("discard", &mut self.discard)?;
        m.optional_element("distances", &mut self.distances)?;
        m.elements("cache", 0, &mut self.caches)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distances {
    pub siblings: Vec<Sibling>,
}

impl Schema for Distances {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.elements("sibling", 1, &mut self.siblings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sibling {
    pub id: u32,
    pub value: u32,
}

impl Schema for Sibling {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("id", &mut self.id)?;
        m.attribute("value", &mut self.value)
    }
}

/// Memory-side cache of a NUMA cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cache {
    pub level: u32,
    pub associativity: CacheAssociativity,
    pub policy: ECachePolicy,
    pub size: ScaledInteger,
    pub line: ScaledInteger,
}

impl Schema for Cache {
    const TAG: Tag = Tag::Strict("cache");

    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("level", &mut self.level)?;
        m.attribute("associativity", &mut self.associativity)?;
        m.attribute("policy", &mut self.policy)?;
        m.element("size", &mut self.size)?;
        m.element("line", &mut self.line)?;
        Ok(())
    }
}

// =============================================================================
// CPU TUNING
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuTune {
    pub shares: Option<u64>,
    pub period: Option<PCpuperiod>,
    pub quota: Option<PCpuquota>,
    pub emulator_period: Option<PCpuperiod>,
    pub emulator_quota: Option<PCpuquota>,
    pub vcpupins: Vec<VcpuPin>,
    pub emulatorpin: Option<EmulatorPin>,
}

impl Schema for CpuTune {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_value_element("shares", &mut self.shares)?;
        m.optional_value_element("period", &mut self.period)?;
        m.optional_value_element("quota", &mut self.quota)?;
        m.optional_value_element("emulator_period", &mut self.emulator_period)?;
        m.optional_value_element("emulator_quota", &mut self.emulator_quota)?;
        m.elements("vcpupin", 0, &mut self.vcpupins)?;
        m.optional_element("emulatorpin", &mut self.emulatorpin)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VcpuPin {
    pub vcpu: u32,
    pub cpuset: String,
}

impl Schema for VcpuPin {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("vcpu", &mut self.vcpu)?;
        m.attribute("cpuset", &mut self.cpuset)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmulatorPin {
    pub cpuset: String,
}

impl Schema for EmulatorPin {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("cpuset", &mut self.cpuset)
    }
}

// =============================================================================
// CLOCK
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clock {
    pub offset: EClockOffset,
    pub timezone: Option<String>,
    pub timers: Vec<Timer>,
}

impl Schema for Clock {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("offset", &mut self.offset)?;
        m.optional_attribute("timezone", &mut self.timezone)?;
        m.elements("timer", 0, &mut self.timers)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timer {
    pub name: ETimerName,
    pub tickpolicy: Option<ETickPolicy>,
    pub present: Option<EYesNo>,
}

impl Schema for Timer {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("name", &mut self.name)?;
        m.optional_attribute("tickpolicy", &mut self.tickpolicy)?;
        m.optional_attribute("present", &mut self.present)
    }
}

// =============================================================================
// POWER MANAGEMENT
// =============================================================================

/// Guest suspend capabilities advertised to the firmware.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerManagement {
    pub suspend_to_mem: Option<SuspendState>,
    pub suspend_to_disk: Option<SuspendState>,
}

impl Schema for PowerManagement {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.optional_element("suspend-to-mem", &mut self.suspend_to_mem)?;
        m.optional_element("suspend-to-disk", &mut self.suspend_to_disk)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuspendState {
    pub enabled: EYesNo,
}

impl Schema for SuspendState {
    fn describe<M: Marshal>(&mut self, m: &mut M) -> Result<()> {
        m.attribute("enabled", &mut self.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_str, from_str_with, to_string, to_string_pretty, LoadOptions};
    use crate::error::XmlError;
    use crate::layout::layout;
    use crate::primitive::decode;

    const CACHE: &str = r#"<cache level="1" associativity="2" policy="writeback"><size unit="KiB">64</size><line unit="B">64</line></cache>"#;

    const DOMAIN: &str = r#"
<domain type='kvm' id='3'>
  <name>web-01</name>
  <uuid>c7a5fdbd-edaf-9455-926a-d65c16db1809</uuid>
  <description>Frontend</description>
  <memory unit='MiB'>4096</memory>
  <currentMemory unit='MiB'>2048</currentMemory>
  <vcpu placement='static' current='2'>4</vcpu>
  <cputune>
    <shares>2048</shares>
    <period>1000000</period>
    <quota>-1</quota>
    <vcpupin vcpu='0' cpuset='1'/>
  </cputune>
  <os>
    <type arch='x86_64' machine='q35'>hvm</type>
    <loader readonly='yes' type='pflash'>/usr/share/OVMF/OVMF_CODE.fd</loader>
    <nvram>/var/lib/libvirt/qemu/nvram/web-01_VARS.fd</nvram>
    <boot dev='hd'/>
    <boot dev='cdrom'/>
    <bootmenu enable='yes' timeout='3000'/>
  </os>
  <features>
    <acpi/>
    <apic/>
    <hyperv>
      <relaxed state='on'/>
      <spinlocks state='on' retries='8191'/>
    </hyperv>
  </features>
  <cpu mode='custom' match='exact' check='partial'>
    <model fallback='allow'>Skylake-Server</model>
    <topology sockets='1' cores='2' threads='2'/>
    <feature policy='require' name='vmx'/>
    <numa>
      <cell id='0' cpus='0-3' memory='4194304' unit='KiB'>
        <cache level='1' associativity='direct' policy='writeback'>
          <size unit='KiB'>10</size>
          <line unit='B'>8</line>
        </cache>
      </cell>
    </numa>
  </cpu>
  <clock offset='utc'>
    <timer name='rtc' tickpolicy='catchup'/>
    <timer name='hpet' present='no'/>
  </clock>
  <on_poweroff>destroy</on_poweroff>
  <on_reboot>restart</on_reboot>
  <on_crash>coredump-restart</on_crash>
</domain>
"#;

    /// Inactive definition as printed by `virsh dumpxml`.
    const DUMPXML: &str = r#"<domain type='kvm'>
  <name>db-01</name>
  <uuid>4dea22b3-1d52-d8f3-2516-782e98ab3fa0</uuid>
  <memory unit='KiB'>8388608</memory>
  <currentMemory unit='KiB'>8388608</currentMemory>
  <vcpu placement='static'>4</vcpu>
  <cputune>
    <shares>4096</shares>
    <period>100000</period>
    <quota>200000</quota>
    <vcpupin vcpu='0' cpuset='2'/>
    <vcpupin vcpu='1' cpuset='3'/>
    <emulatorpin cpuset='0-1'/>
  </cputune>
  <os>
    <type arch='x86_64' machine='pc-q35-8.2'>hvm</type>
    <boot dev='hd'/>
  </os>
  <features>
    <acpi/>
    <apic/>
    <vmport state='off'/>
  </features>
  <cpu mode='host-passthrough' check='none' migratable='on'/>
  <clock offset='utc'>
    <timer name='rtc' tickpolicy='catchup'/>
    <timer name='pit' tickpolicy='delay'/>
    <timer name='hpet' present='no'/>
  </clock>
  <on_poweroff>destroy</on_poweroff>
  <on_reboot>restart</on_reboot>
  <on_crash>destroy</on_crash>
  <pm>
    <suspend-to-mem enabled='no'/>
    <suspend-to-disk enabled='no'/>
  </pm>
  <devices>
    <emulator>/usr/bin/qemu-system-x86_64</emulator>
    <disk type='file' device='disk'>
      <driver name='qemu' type='qcow2' discard='unmap'/>
      <source file='/var/lib/libvirt/images/db-01.qcow2'/>
      <target dev='vda' bus='virtio'/>
      <address type='pci' domain='0x0000' bus='0x04' slot='0x00' function='0x0'/>
    </disk>
    <disk type='file' device='cdrom'>
      <driver name='qemu' type='raw'/>
      <target dev='sda' bus='sata'/>
      <readonly/>
      <address type='drive' controller='0' bus='0' target='0' unit='0'/>
    </disk>
    <controller type='usb' index='0' model='qemu-xhci' ports='15'>
      <address type='pci' domain='0x0000' bus='0x02' slot='0x00' function='0x0'/>
    </controller>
    <controller type='pci' index='0' model='pcie-root'/>
    <controller type='pci' index='1' model='pcie-root-port'>
      <model name='pcie-root-port'/>
      <target chassis='1' port='0x10'/>
      <address type='pci' domain='0x0000' bus='0x00' slot='0x02' function='0x0' multifunction='on'/>
    </controller>
    <controller type='sata' index='0'>
      <address type='pci' domain='0x0000' bus='0x00' slot='0x1f' function='0x2'/>
    </controller>
    <controller type='virtio-serial' index='0'>
      <address type='pci' domain='0x0000' bus='0x03' slot='0x00' function='0x0'/>
    </controller>
    <interface type='network'>
      <mac address='52:54:00:6b:3c:58'/>
      <source network='default'/>
      <model type='virtio'/>
      <address type='pci' domain='0x0000' bus='0x01' slot='0x00' function='0x0'/>
    </interface>
    <serial type='pty'>
      <target type='isa-serial' port='0'>
        <model name='isa-serial'/>
      </target>
    </serial>
    <console type='pty'>
      <target type='serial' port='0'/>
    </console>
    <channel type='unix'>
      <target type='virtio' name='org.qemu.guest_agent.0'/>
      <address type='virtio-serial' controller='0' bus='0' port='1'/>
    </channel>
    <input type='tablet' bus='usb'>
      <address type='usb' bus='0' port='1'/>
    </input>
    <input type='mouse' bus='ps2'/>
    <input type='keyboard' bus='ps2'/>
    <graphics type='vnc' port='-1' autoport='yes'>
      <listen type='address'/>
    </graphics>
    <video>
      <model type='virtio' heads='1' primary='yes'/>
      <address type='pci' domain='0x0000' bus='0x00' slot='0x01' function='0x0'/>
    </video>
    <memballoon model='virtio'>
      <address type='pci' domain='0x0000' bus='0x05' slot='0x00' function='0x0'/>
    </memballoon>
    <rng model='virtio'>
      <backend model='random'>/dev/urandom</backend>
      <address type='pci' domain='0x0000' bus='0x06' slot='0x00' function='0x0'/>
    </rng>
  </devices>
</domain>
"#;

    #[test]
    fn test_cache_scenario() {
        let cache: Cache = from_str(CACHE).unwrap();
        assert_eq!(cache.level, 1);
        assert_eq!(cache.associativity, CacheAssociativity::Ways(2));
        assert_eq!(cache.associativity.tag(), 1);
        assert_eq!(cache.policy, ECachePolicy::Writeback);
        assert_eq!(cache.size, ScaledInteger::new(64, EUnit::KiB));
        assert_eq!(cache.line, ScaledInteger::new(64, EUnit::B));

        assert_eq!(to_string(&cache).unwrap(), CACHE);
    }

    #[test]
    fn test_cache_named_associativity_wins() {
        let cache: Cache = from_str(
            r#"<cache level="3" associativity="full" policy="none"><size>1</size><line>64</line></cache>"#,
        )
        .unwrap();
        assert_eq!(
            cache.associativity,
            CacheAssociativity::Named(ECacheAssociativity::Full)
        );
        assert_eq!(cache.size.unit, None);
    }

    #[test]
    fn test_cache_missing_line_fails() {
        let err = from_str::<Cache>(
            r#"<cache level="1" associativity="2" policy="writeback"><size unit="KiB">64</size></cache>"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            XmlError::MissingElement {
                parent: "cache".to_string(),
                element: "line"
            }
        );
    }

    #[test]
    fn test_domain_parse() {
        let domain: Domain = from_str(DOMAIN).unwrap();
        assert_eq!(domain.kind, EVirtType::Kvm);
        assert_eq!(domain.id, Some(3));
        assert_eq!(domain.name, "web-01");
        assert_eq!(domain.memory, ScaledInteger::mib(4096));
        assert_eq!(domain.vcpu.as_ref().unwrap().count, 4);
        assert_eq!(domain.os.kind.kind, EOsType::Hvm);
        assert_eq!(domain.os.boot.len(), 2);
        assert_eq!(domain.os.loader.as_ref().unwrap().kind, Some(ELoaderType::Pflash));

        let features = domain.features.as_ref().unwrap();
        assert!(features.acpi && features.apic && !features.pae);
        let hyperv = features.hyperv.as_ref().unwrap();
        assert_eq!(hyperv.spinlocks.as_ref().unwrap().retries, Some(8191));
        assert!(hyperv.vapic.is_none());

        let cpu = domain.cpu.as_ref().unwrap();
        assert_eq!(cpu.topology.as_ref().unwrap().total_vcpus(), Some(4));
        let cell = &cpu.numa.as_ref().unwrap().cells[0];
        assert_eq!(
            cell.caches[0].associativity,
            CacheAssociativity::Named(ECacheAssociativity::Direct)
        );

        let cputune = domain.cputune.as_ref().unwrap();
        assert_eq!(cputune.period.unwrap().get(), 1_000_000);
        assert_eq!(cputune.quota.unwrap().get(), -1);
        assert_eq!(domain.on_crash, Some(ECrashAction::CoredumpRestart));
        assert!(domain.devices.is_none());
    }

    #[test]
    fn test_topology_total_overflow() {
        let topology: Topology =
            from_str("<topology sockets='65536' dies='1' cores='65536' threads='1'/>").unwrap();
        assert_eq!(topology.total_vcpus(), None);

        let topology: Topology =
            from_str("<topology sockets='2' dies='2' cores='8' threads='2'/>").unwrap();
        assert_eq!(topology.total_vcpus(), Some(64));
    }

    #[test]
    fn test_dumpxml_definition() {
        let domain: Domain = from_str(DUMPXML).unwrap();
        assert_eq!(domain.name, "db-01");
        assert_eq!(domain.vcpu.as_ref().unwrap().count, 4);

        let cputune = domain.cputune.as_ref().unwrap();
        assert_eq!(cputune.shares, Some(4096));
        assert_eq!(cputune.quota.unwrap().get(), 200_000);
        assert_eq!(cputune.vcpupins.len(), 2);
        assert_eq!(cputune.emulatorpin.as_ref().unwrap().cpuset, "0-1");

        assert_eq!(domain.os.boot.len(), 1);
        let features = domain.features.as_ref().unwrap();
        assert_eq!(features.vmport.as_ref().unwrap().state, EOnOff::Off);
        assert_eq!(domain.cpu.as_ref().unwrap().mode, Some(ECpuMode::HostPassthrough));
        assert_eq!(domain.clock.as_ref().unwrap().timers.len(), 3);
        let pm = domain.pm.as_ref().unwrap();
        assert_eq!(pm.suspend_to_disk.as_ref().unwrap().enabled, EYesNo::No);

        let devices = domain.devices.as_ref().unwrap();
        assert_eq!(devices.disks.len(), 2);
        assert!(devices.disks[1].readonly);
        assert_eq!(devices.controllers.len(), 5);
        assert_eq!(devices.interfaces.len(), 1);
        assert_eq!(devices.serials.len(), 1);
        assert_eq!(devices.consoles.len(), 1);
        assert_eq!(devices.channels.len(), 1);
        assert_eq!(devices.inputs.len(), 3);
        assert_eq!(devices.graphics.len(), 1);
        assert_eq!(devices.videos.len(), 1);
        assert!(devices.memballoon.is_some());
    }

    #[test]
    fn test_dumpxml_round_trip() {
        let domain: Domain = from_str(DUMPXML).unwrap();
        let again: Domain = from_str(&to_string(&domain).unwrap()).unwrap();
        assert_eq!(again, domain);
    }

    #[test]
    fn test_misplaced_cputune_is_an_error() {
        let xml = "<domain type='kvm'><name>v</name><memory unit='KiB'>1024</memory><vcpu>2</vcpu>\
                   <os><type>hvm</type></os><cputune><shares>2048</shares></cputune></domain>";
        assert_eq!(
            from_str::<Domain>(xml),
            Err(XmlError::OutOfOrder {
                parent: "domain".to_string(),
                element: "cputune".to_string()
            })
        );

        let xml = "<domain type='kvm'><name>v</name><memory unit='KiB'>1024</memory><vcpu>2</vcpu>\
                   <cputune><shares>2048</shares></cputune><os><type>hvm</type></os></domain>";
        let domain: Domain = from_str(xml).unwrap();
        assert_eq!(domain.cputune.unwrap().shares, Some(2048));
    }

    #[test]
    fn test_domain_round_trip() {
        let domain: Domain = from_str(DOMAIN).unwrap();
        let xml = to_string(&domain).unwrap();
        let again: Domain = from_str(&xml).unwrap();
        assert_eq!(again, domain);
        assert_eq!(to_string(&again).unwrap(), xml);
    }

    #[test]
    fn test_padded_description_round_trip() {
        let xml = "<domain type='kvm'><name>v</name><description>  padded  </description>\
                   <memory>1024</memory><os><type> hvm </type></os></domain>";
        let domain: Domain = from_str(xml).unwrap();
        assert_eq!(domain.description.as_deref(), Some("  padded  "));
        assert_eq!(domain.os.kind.kind, EOsType::Hvm);

        let compact: Domain = from_str(&to_string(&domain).unwrap()).unwrap();
        assert_eq!(compact, domain);
        let pretty: Domain = from_str(&to_string_pretty(&domain, 2).unwrap()).unwrap();
        assert_eq!(pretty, domain);
    }

    #[test]
    fn test_domain_requires_os() {
        let err = from_str::<Domain>(
            "<domain type='kvm'><name>x</name><memory>1024</memory></domain>",
        )
        .unwrap_err();
        assert_eq!(
            err,
            XmlError::MissingElement {
                parent: "domain".to_string(),
                element: "os"
            }
        );
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let err = from_str::<Domain>(
            "<domain type='kvm'><name>x</name><uuid>not-a-uuid</uuid><memory>1</memory><os><type>hvm</type></os></domain>",
        )
        .unwrap_err();
        assert!(matches!(err, XmlError::InvalidValue { kind: "PUuid", .. }));
    }

    #[test]
    fn test_cpu_period_bounds() {
        assert!(decode::<PCpuperiod>("999").is_err());
        assert_eq!(decode::<PCpuperiod>("1000").unwrap().get(), 1000);
        assert_eq!(decode::<PCpuperiod>("1000000").unwrap().get(), 1_000_000);
        assert!(decode::<PCpuperiod>("1000001").is_err());
    }

    #[test]
    fn test_cpu_quota_bounds() {
        assert!(decode::<PCpuquota>("-2").is_err());
        assert!(decode::<PCpuquota>("-1").is_ok());
        assert!(decode::<PCpuquota>("18446744073709551").is_ok());
        assert!(decode::<PCpuquota>("18446744073709552").is_err());
    }

    #[test]
    fn test_cputune_out_of_range_period_fails_load() {
        let err = from_str::<CpuTune>("<cputune><period>500</period></cputune>").unwrap_err();
        assert_eq!(
            err,
            XmlError::InvalidValue {
                kind: "PCpuperiod",
                value: "500".to_string()
            }
        );
    }

    #[test]
    fn test_numa_requires_a_cell() {
        let options = LoadOptions::default();
        let err = from_str_with::<Numa>("<numa/>", &options).unwrap_err();
        assert!(matches!(err, XmlError::Cardinality { element: "cell", min: 1, found: 0, .. }));
    }

    #[test]
    fn test_domain_layout_order() {
        let layout = layout::<Domain>();
        assert_eq!(layout.tag, Some("domain"));
        assert_eq!(
            layout.slot_names(),
            vec![
                "type",
                "id",
                "name",
                "uuid",
                "title",
                "description",
                "memory",
                "currentMemory",
                "vcpu",
                "cputune",
                "os",
                "features",
                "cpu",
                "clock",
                "on_poweroff",
                "on_reboot",
                "on_crash",
                "pm",
                "devices",
            ]
        );
    }
}
