//! # Stable Public ABI
//!
//! `#[repr(C)]` mirrors of the records and enumerations exposed by
//! `ubuntu/hardware/gps.h` and `ubuntu/hardware/booster.h`. Layouts and
//! numeric values are frozen: consumers compiled against older headers keep
//! working, so nothing here may be reordered or renumbered.
//!
//! ## Record Sizes
//!
//! Every record that crosses the boundary by pointer starts with a `size`
//! field holding `size_of` the record, the way the public header expects.

use core::ffi::{c_char, c_int, c_void};

/// Maximum number of satellites in a [`UHardwareGpsSvStatus`] list
pub const U_HARDWARE_GPS_MAX_SVS: usize = 32;

/// Capacity of short NI strings (requestor id), terminating NUL included
pub const U_HARDWARE_GPS_NI_SHORT_STRING_MAXLEN: usize = 256;

/// Capacity of long NI strings (text, extras), terminating NUL included
pub const U_HARDWARE_GPS_NI_LONG_STRING_MAXLEN: usize = 2048;

// Location flags
pub const U_HARDWARE_GPS_LOCATION_HAS_LAT_LONG: u16 = 0x0001;
pub const U_HARDWARE_GPS_LOCATION_HAS_ALTITUDE: u16 = 0x0002;
pub const U_HARDWARE_GPS_LOCATION_HAS_SPEED: u16 = 0x0004;
pub const U_HARDWARE_GPS_LOCATION_HAS_BEARING: u16 = 0x0008;
pub const U_HARDWARE_GPS_LOCATION_HAS_ACCURACY: u16 = 0x0010;

/// All location flags the stable API defines
pub const U_HARDWARE_GPS_LOCATION_FLAGS_MASK: u16 = U_HARDWARE_GPS_LOCATION_HAS_LAT_LONG
    | U_HARDWARE_GPS_LOCATION_HAS_ALTITUDE
    | U_HARDWARE_GPS_LOCATION_HAS_SPEED
    | U_HARDWARE_GPS_LOCATION_HAS_BEARING
    | U_HARDWARE_GPS_LOCATION_HAS_ACCURACY;

// Status values
pub const U_HARDWARE_GPS_STATUS_NONE: u16 = 0;
pub const U_HARDWARE_GPS_STATUS_SESSION_BEGIN: u16 = 1;
pub const U_HARDWARE_GPS_STATUS_SESSION_END: u16 = 2;
pub const U_HARDWARE_GPS_STATUS_ENGINE_ON: u16 = 3;
pub const U_HARDWARE_GPS_STATUS_ENGINE_OFF: u16 = 4;

// AGPS types
pub const U_HARDWARE_GPS_AGPS_TYPE_SUPL: u16 = 1;
pub const U_HARDWARE_GPS_AGPS_TYPE_C2K: u16 = 2;

// AGPS status values
pub const U_HARDWARE_GPS_REQUEST_AGPS_DATA_CONN: u16 = 1;
pub const U_HARDWARE_GPS_RELEASE_AGPS_DATA_CONN: u16 = 2;
pub const U_HARDWARE_GPS_AGPS_DATA_CONNECTED: u16 = 3;
pub const U_HARDWARE_GPS_AGPS_DATA_CONN_DONE: u16 = 4;
pub const U_HARDWARE_GPS_AGPS_DATA_CONN_FAILED: u16 = 5;

// Reference location kinds
pub const U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_GSM_CELLID: u16 = 1;
pub const U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_UMTS_CELLID: u16 = 2;
pub const U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_MAC: u16 = 3;

// NI types
pub const U_HARDWARE_GPS_NI_TYPE_VOICE: u32 = 1;
pub const U_HARDWARE_GPS_NI_TYPE_UMTS_SUPL: u32 = 2;
pub const U_HARDWARE_GPS_NI_TYPE_UMTS_CTRL_PLANE: u32 = 3;
pub const U_HARDWARE_GPS_NI_TYPE_EMERGENCY_SUPL: u32 = 4;

// NI user responses
pub const U_HARDWARE_GPS_NI_RESPONSE_ACCEPT: c_int = 1;
pub const U_HARDWARE_GPS_NI_RESPONSE_DENY: c_int = 2;
pub const U_HARDWARE_GPS_NI_RESPONSE_NORESP: c_int = 3;

// NI encodings
pub const U_HARDWARE_GPS_ENC_NONE: c_int = 0;
pub const U_HARDWARE_GPS_ENC_SUPL_GSM_DEFAULT: c_int = 1;
pub const U_HARDWARE_GPS_ENC_SUPL_UTF8: c_int = 2;
pub const U_HARDWARE_GPS_ENC_SUPL_UCS2: c_int = 3;
pub const U_HARDWARE_GPS_ENC_UNKNOWN: c_int = -1;

/// Booster scenario: user is interacting with the device
pub const U_HARDWARE_BOOSTER_SCENARIO_USER_INTERACTION: u32 = 0;

/// A position fix
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UHardwareGpsLocation {
    pub size: usize,
    /// Combination of `U_HARDWARE_GPS_LOCATION_HAS_*`
    pub flags: u16,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above the WGS 84 ellipsoid
    pub altitude: f64,
    /// Meters per second
    pub speed: f32,
    /// Degrees
    pub bearing: f32,
    /// Horizontal accuracy in meters
    pub accuracy: f32,
    /// Milliseconds since the epoch
    pub timestamp: i64,
}

impl Default for UHardwareGpsLocation {
    fn default() -> Self {
        Self {
            size: core::mem::size_of::<Self>(),
            flags: 0,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            speed: 0.0,
            bearing: 0.0,
            accuracy: 0.0,
            timestamp: 0,
        }
    }
}

/// Information about one satellite
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UHardwareGpsSvInfo {
    pub size: usize,
    pub prn: c_int,
    pub snr: f32,
    pub elevation: f32,
    pub azimuth: f32,
}

impl Default for UHardwareGpsSvInfo {
    fn default() -> Self {
        Self {
            size: core::mem::size_of::<Self>(),
            prn: 0,
            snr: 0.0,
            elevation: 0.0,
            azimuth: 0.0,
        }
    }
}

/// Satellite visibility snapshot
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UHardwareGpsSvStatus {
    pub size: usize,
    /// Number of valid entries at the front of `sv_list`
    pub num_svs: c_int,
    pub sv_list: [UHardwareGpsSvInfo; U_HARDWARE_GPS_MAX_SVS],
    /// Bit `prn - 1` set when ephemeris data is available for that satellite
    pub ephemeris_mask: u32,
    /// Bit `prn - 1` set when almanac data is available for that satellite
    pub almanac_mask: u32,
    /// Bit `prn - 1` set when the satellite was used in the last fix
    pub used_in_fix_mask: u32,
}

impl Default for UHardwareGpsSvStatus {
    fn default() -> Self {
        Self {
            size: core::mem::size_of::<Self>(),
            num_svs: 0,
            sv_list: [UHardwareGpsSvInfo::default(); U_HARDWARE_GPS_MAX_SVS],
            ephemeris_mask: 0,
            almanac_mask: 0,
            used_in_fix_mask: 0,
        }
    }
}

/// Network-assistance (AGPS) data connection status
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UHardwareGpsAGpsStatus {
    pub size: usize,
    pub type_: u16,
    pub status: u16,
    /// IPv4 address in network byte order, 0 when unknown
    pub ipaddr: u32,
}

impl Default for UHardwareGpsAGpsStatus {
    fn default() -> Self {
        Self {
            size: core::mem::size_of::<Self>(),
            type_: U_HARDWARE_GPS_AGPS_TYPE_SUPL,
            status: U_HARDWARE_GPS_AGPS_DATA_CONN_FAILED,
            ipaddr: 0,
        }
    }
}

/// Network-initiated user notification
#[repr(C)]
#[derive(Clone, Copy)]
pub struct UHardwareGpsNiNotification {
    pub size: usize,
    pub notification_id: c_int,
    pub ni_type: u32,
    pub notify_flags: u32,
    /// Seconds the user has to respond
    pub timeout: c_int,
    pub default_response: c_int,
    pub requestor_id: [c_char; U_HARDWARE_GPS_NI_SHORT_STRING_MAXLEN],
    pub text: [c_char; U_HARDWARE_GPS_NI_LONG_STRING_MAXLEN],
    pub requestor_id_encoding: c_int,
    pub text_encoding: c_int,
    pub extras: [c_char; U_HARDWARE_GPS_NI_LONG_STRING_MAXLEN],
}

impl Default for UHardwareGpsNiNotification {
    fn default() -> Self {
        Self {
            size: core::mem::size_of::<Self>(),
            notification_id: 0,
            ni_type: U_HARDWARE_GPS_NI_TYPE_VOICE,
            notify_flags: 0,
            timeout: 0,
            default_response: U_HARDWARE_GPS_NI_RESPONSE_NORESP,
            requestor_id: [0; U_HARDWARE_GPS_NI_SHORT_STRING_MAXLEN],
            text: [0; U_HARDWARE_GPS_NI_LONG_STRING_MAXLEN],
            requestor_id_encoding: U_HARDWARE_GPS_ENC_UNKNOWN,
            text_encoding: U_HARDWARE_GPS_ENC_UNKNOWN,
            extras: [0; U_HARDWARE_GPS_NI_LONG_STRING_MAXLEN],
        }
    }
}

impl core::fmt::Debug for UHardwareGpsNiNotification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UHardwareGpsNiNotification")
            .field("notification_id", &self.notification_id)
            .field("ni_type", &self.ni_type)
            .field("notify_flags", &self.notify_flags)
            .field("timeout", &self.timeout)
            .field("default_response", &self.default_response)
            .field("requestor_id_encoding", &self.requestor_id_encoding)
            .field("text_encoding", &self.text_encoding)
            .finish_non_exhaustive()
    }
}

/// Cell identity used as an AGPS reference location
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UHardwareGpsAGpsRefLocationCellID {
    pub type_: u16,
    /// Mobile country code
    pub mcc: u16,
    /// Mobile network code
    pub mnc: u16,
    /// Location area code
    pub lac: u16,
    /// Cell id
    pub cid: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UHardwareGpsAGpsRefLocationMac {
    pub mac: [u8; 6],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union UHardwareGpsAGpsRefLocationPayload {
    pub cell_id: UHardwareGpsAGpsRefLocationCellID,
    pub mac: UHardwareGpsAGpsRefLocationMac,
}

/// Tagged reference location; `type_` selects the payload variant
#[repr(C)]
#[derive(Clone, Copy)]
pub struct UHardwareGpsAGpsRefLocation {
    pub type_: u16,
    pub u: UHardwareGpsAGpsRefLocationPayload,
}

impl UHardwareGpsAGpsRefLocation {
    /// Build a cell-id reference location of the given kind
    pub fn cell_id(kind: u16, cell: UHardwareGpsAGpsRefLocationCellID) -> Self {
        Self {
            type_: kind,
            u: UHardwareGpsAGpsRefLocationPayload {
                cell_id: UHardwareGpsAGpsRefLocationCellID { type_: kind, ..cell },
            },
        }
    }

    /// Build a MAC-address reference location
    pub fn mac(mac: [u8; 6]) -> Self {
        Self {
            type_: U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_MAC,
            u: UHardwareGpsAGpsRefLocationPayload {
                mac: UHardwareGpsAGpsRefLocationMac { mac },
            },
        }
    }

    /// Whether the tag names one of the cell-id variants
    pub fn is_cell_id(&self) -> bool {
        matches!(
            self.type_,
            U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_GSM_CELLID
                | U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_UMTS_CELLID
        )
    }

    /// The cell-id payload, if the tag selects it
    pub fn as_cell_id(&self) -> Option<UHardwareGpsAGpsRefLocationCellID> {
        if self.is_cell_id() {
            // SAFETY: the tag says the cell-id member is the active one
            Some(unsafe { self.u.cell_id })
        } else {
            None
        }
    }
}

pub type UHardwareGpsLocationCallback =
    Option<unsafe extern "C" fn(location: *mut UHardwareGpsLocation, context: *mut c_void)>;
pub type UHardwareGpsStatusCallback =
    Option<unsafe extern "C" fn(status: u16, context: *mut c_void)>;
pub type UHardwareGpsSvStatusCallback =
    Option<unsafe extern "C" fn(sv_info: *mut UHardwareGpsSvStatus, context: *mut c_void)>;
pub type UHardwareGpsNmeaCallback = Option<
    unsafe extern "C" fn(timestamp: i64, nmea: *const c_char, length: c_int, context: *mut c_void),
>;
pub type UHardwareGpsSetCapabilities =
    Option<unsafe extern "C" fn(capabilities: u32, context: *mut c_void)>;
pub type UHardwareGpsRequestUtcTime = Option<unsafe extern "C" fn(context: *mut c_void)>;
pub type UHardwareGpsXtraDownloadRequest = Option<unsafe extern "C" fn(context: *mut c_void)>;
pub type UHardwareGpsAGpsStatusCallback =
    Option<unsafe extern "C" fn(status: *mut UHardwareGpsAGpsStatus, context: *mut c_void)>;
pub type UHardwareGpsNiNotifyCallback = Option<
    unsafe extern "C" fn(notification: *mut UHardwareGpsNiNotification, context: *mut c_void),
>;
pub type UHardwareGpsAGpsRilRequestSetId =
    Option<unsafe extern "C" fn(flags: u32, context: *mut c_void)>;
pub type UHardwareGpsAGpsRilRequestRefLoc =
    Option<unsafe extern "C" fn(flags: u32, context: *mut c_void)>;

/// Callback table and context handed to `u_hardware_gps_new`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct UHardwareGpsParams {
    pub location_cb: UHardwareGpsLocationCallback,
    pub status_cb: UHardwareGpsStatusCallback,
    pub sv_status_cb: UHardwareGpsSvStatusCallback,
    pub nmea_cb: UHardwareGpsNmeaCallback,
    pub set_capabilities_cb: UHardwareGpsSetCapabilities,
    pub request_utc_time_cb: UHardwareGpsRequestUtcTime,
    pub xtra_download_request_cb: UHardwareGpsXtraDownloadRequest,
    pub agps_status_cb: UHardwareGpsAGpsStatusCallback,
    pub gps_ni_notify_cb: UHardwareGpsNiNotifyCallback,
    pub request_setid_cb: UHardwareGpsAGpsRilRequestSetId,
    pub request_refloc_cb: UHardwareGpsAGpsRilRequestRefLoc,
    /// Opaque caller pointer passed back with every callback
    pub context: *mut c_void,
}

impl Default for UHardwareGpsParams {
    fn default() -> Self {
        Self {
            location_cb: None,
            status_cb: None,
            sv_status_cb: None,
            nmea_cb: None,
            set_capabilities_cb: None,
            request_utc_time_cb: None,
            xtra_download_request_cb: None,
            agps_status_cb: None,
            gps_ni_notify_cb: None,
            request_setid_cb: None,
            request_refloc_cb: None,
            context: core::ptr::null_mut(),
        }
    }
}
