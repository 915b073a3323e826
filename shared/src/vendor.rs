//! # Vendor-Domain Records
//!
//! Owned, layout-independent views of what a vendor GNSS stack reports.
//! Bindings (legacy struct HAL, service RPC generations, test doubles)
//! convert their native payloads into these types before handing them to a
//! callback sink, so the translator only has to understand one shape.
//!
//! Enumerated fields are kept as raw `i32` values: a vendor may send an
//! enumerator this crate has never heard of, and the translator decides
//! what that means.

use alloc::vec::Vec;

/// Vendor session status values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum StatusValue {
    None = 0,
    SessionBegin = 1,
    SessionEnd = 2,
    EngineOn = 3,
    EngineOff = 4,
}

impl TryFrom<i32> for StatusValue {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::SessionBegin),
            2 => Ok(Self::SessionEnd),
            3 => Ok(Self::EngineOn),
            4 => Ok(Self::EngineOff),
            _ => Err(()),
        }
    }
}

/// Vendor network-assistance server types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum AGnssType {
    Supl = 1,
    C2k = 2,
}

impl TryFrom<i32> for AGnssType {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Supl),
            2 => Ok(Self::C2k),
            _ => Err(()),
        }
    }
}

/// Vendor network-assistance data connection states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum AGnssStatusValue {
    RequestDataConn = 1,
    ReleaseDataConn = 2,
    DataConnected = 3,
    DataConnDone = 4,
    DataConnFailed = 5,
}

impl TryFrom<i32> for AGnssStatusValue {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::RequestDataConn),
            2 => Ok(Self::ReleaseDataConn),
            3 => Ok(Self::DataConnected),
            4 => Ok(Self::DataConnDone),
            5 => Ok(Self::DataConnFailed),
            _ => Err(()),
        }
    }
}

/// Vendor network-initiated request types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum NiType {
    Voice = 1,
    UmtsSupl = 2,
    UmtsCtrlPlane = 3,
    EmergencySupl = 4,
}

impl TryFrom<i32> for NiType {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Voice),
            2 => Ok(Self::UmtsSupl),
            3 => Ok(Self::UmtsCtrlPlane),
            4 => Ok(Self::EmergencySupl),
            _ => Err(()),
        }
    }
}

/// Vendor user response types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum UserResponse {
    Accept = 1,
    Deny = 2,
    NoResponse = 3,
}

impl TryFrom<i32> for UserResponse {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Accept),
            2 => Ok(Self::Deny),
            3 => Ok(Self::NoResponse),
            _ => Err(()),
        }
    }
}

/// Vendor string encodings for NI requestor ids and texts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum NiEncoding {
    None = 0,
    SuplGsmDefault = 1,
    SuplUtf8 = 2,
    SuplUcs2 = 3,
    Unknown = -1,
}

impl TryFrom<i32> for NiEncoding {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::SuplGsmDefault),
            2 => Ok(Self::SuplUtf8),
            3 => Ok(Self::SuplUcs2),
            -1 => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

/// Vendor reference location kinds
pub const REF_LOCATION_GSM_CELLID: i32 = 1;
pub const REF_LOCATION_UMTS_CELLID: i32 = 2;

/// APN IP type passed along with a data connection open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ApnIpType {
    Invalid = 0,
    Ipv4 = 1,
    Ipv6 = 2,
    Ipv4v6 = 3,
}

/// Constellation a satellite belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Constellation {
    #[default]
    Gps,
    Sbas,
    Glonass,
    Qzss,
    Beidou,
    Galileo,
    Unknown,
}

// Location flags as reported by the vendor. The low five bits share their
// meaning with the public flags; anything above is vendor-only.
pub const LOCATION_HAS_LAT_LONG: u16 = 0x0001;
pub const LOCATION_HAS_ALTITUDE: u16 = 0x0002;
pub const LOCATION_HAS_SPEED: u16 = 0x0004;
pub const LOCATION_HAS_BEARING: u16 = 0x0008;
pub const LOCATION_HAS_HORIZONTAL_ACCURACY: u16 = 0x0010;
pub const LOCATION_HAS_VERTICAL_ACCURACY: u16 = 0x0020;
pub const LOCATION_HAS_SPEED_ACCURACY: u16 = 0x0040;
pub const LOCATION_HAS_BEARING_ACCURACY: u16 = 0x0080;

// Per-satellite flags
pub const SV_HAS_EPHEMERIS: u8 = 0x01;
pub const SV_HAS_ALMANAC: u8 = 0x02;
pub const SV_USED_IN_FIX: u8 = 0x04;

/// A position fix as reported by the vendor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VendorLocation {
    pub flags: u16,
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
    pub altitude_meters: f64,
    pub speed_meters_per_sec: f32,
    pub bearing_degrees: f32,
    pub horizontal_accuracy_meters: f32,
    pub vertical_accuracy_meters: f32,
    /// Milliseconds since the epoch
    pub timestamp: i64,
}

/// One satellite as reported by the vendor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VendorSvInfo {
    pub svid: i32,
    pub constellation: Constellation,
    pub cn0_dbhz: f32,
    pub elevation_degrees: f32,
    pub azimuth_degrees: f32,
    /// Combination of `SV_*` flags
    pub flags: u8,
}

/// Bit masks indexed by `prn - 1`, as the legacy HAL reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SvMasks {
    pub ephemeris: u32,
    pub almanac: u32,
    pub used_in_fix: u32,
}

/// Satellite visibility snapshot as reported by the vendor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VendorSvStatus {
    pub svs: Vec<VendorSvInfo>,
    /// Explicit masks; derived from the per-satellite flags when absent
    pub masks: Option<SvMasks>,
}

/// Network-assistance status as reported by the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VendorAGnssStatus {
    pub agnss_type: i32,
    pub status: i32,
    /// IPv4 address in network byte order, 0 when unknown
    pub ipv4_addr: u32,
}

/// A network-initiated notification as reported by the vendor.
///
/// Strings are raw bytes in the encoding named by the matching
/// `*_encoding` field; they are not necessarily UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorNiNotification {
    pub notification_id: i32,
    pub ni_type: i32,
    pub notify_flags: u32,
    pub timeout_sec: i32,
    pub default_response: i32,
    pub requestor_id: Vec<u8>,
    pub text: Vec<u8>,
    pub requestor_id_encoding: i32,
    pub text_encoding: i32,
    pub extras: Vec<u8>,
}

/// A cell-id reference location in vendor form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VendorRefLocation {
    pub kind: i32,
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u16,
    pub cid: u32,
}

/// Positioning parameters for `set_position_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionMode {
    pub mode: u32,
    pub recurrence: u32,
    pub min_interval_ms: u32,
    pub preferred_accuracy_m: u32,
    pub preferred_time_ms: u32,
}
