//! # Vendor → Public Translation
//!
//! Pure functions turning vendor-domain values into the stable public
//! representation (and, for the few commands that carry enumerations, the
//! other way round). No I/O, no allocation on the vendor → public path: the
//! results are plain stack values handed to exactly one callback.
//!
//! ## Unrecognised Enumerators
//!
//! Every mapping is total. A vendor value outside the known set maps to a
//! fixed default:
//!
//! | Domain            | Default                      |
//! |-------------------|------------------------------|
//! | status            | `U_HARDWARE_GPS_STATUS_NONE` |
//! | assistance type   | SUPL                         |
//! | assistance status | data connection failed       |
//! | NI type           | voice                        |
//! | user response     | no response                  |
//! | encoding          | unknown                      |
//!
//! ## Fixed-Size Destinations
//!
//! Satellite lists and NI strings land in fixed arrays. Anything that does
//! not fit is rejected with [`TranslateError::CapacityExceeded`], never
//! truncated or written past the end.

use core::ffi::{c_char, c_int};
use core::fmt;

use crate::abi::*;
use crate::vendor::*;

/// Destination field named in a [`TranslateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    SvList,
    RequestorId,
    Text,
    Extras,
}

/// Errors that can occur while translating a vendor record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TranslateError {
    /// Source holds more elements than the fixed destination can take
    CapacityExceeded {
        field: Field,
        len: usize,
        capacity: usize,
    },
    /// Reference location tag is not one of the cell-id kinds
    UnsupportedRefLocation(u16),
    /// Public enumerator has no vendor counterpart
    UnknownEnumerator(i32),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::CapacityExceeded { field, len, capacity } => write!(
                f,
                "{:?} holds {} elements, destination capacity is {}",
                field, len, capacity
            ),
            TranslateError::UnsupportedRefLocation(kind) => {
                write!(f, "reference location kind {} is not a cell id", kind)
            }
            TranslateError::UnknownEnumerator(value) => {
                write!(f, "enumerator {} has no vendor counterpart", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TranslateError {}

/// Result type alias for translation
pub type TranslateResult<T> = Result<T, TranslateError>;

pub fn status(raw: i32) -> u16 {
    match StatusValue::try_from(raw) {
        Ok(StatusValue::None) => U_HARDWARE_GPS_STATUS_NONE,
        Ok(StatusValue::SessionBegin) => U_HARDWARE_GPS_STATUS_SESSION_BEGIN,
        Ok(StatusValue::SessionEnd) => U_HARDWARE_GPS_STATUS_SESSION_END,
        Ok(StatusValue::EngineOn) => U_HARDWARE_GPS_STATUS_ENGINE_ON,
        Ok(StatusValue::EngineOff) => U_HARDWARE_GPS_STATUS_ENGINE_OFF,
        Err(()) => U_HARDWARE_GPS_STATUS_NONE,
    }
}

pub fn agnss_type(raw: i32) -> u16 {
    match AGnssType::try_from(raw) {
        Ok(AGnssType::Supl) => U_HARDWARE_GPS_AGPS_TYPE_SUPL,
        Ok(AGnssType::C2k) => U_HARDWARE_GPS_AGPS_TYPE_C2K,
        Err(()) => U_HARDWARE_GPS_AGPS_TYPE_SUPL,
    }
}

pub fn agnss_status_value(raw: i32) -> u16 {
    match AGnssStatusValue::try_from(raw) {
        Ok(AGnssStatusValue::RequestDataConn) => U_HARDWARE_GPS_REQUEST_AGPS_DATA_CONN,
        Ok(AGnssStatusValue::ReleaseDataConn) => U_HARDWARE_GPS_RELEASE_AGPS_DATA_CONN,
        Ok(AGnssStatusValue::DataConnected) => U_HARDWARE_GPS_AGPS_DATA_CONNECTED,
        Ok(AGnssStatusValue::DataConnDone) => U_HARDWARE_GPS_AGPS_DATA_CONN_DONE,
        Ok(AGnssStatusValue::DataConnFailed) | Err(()) => U_HARDWARE_GPS_AGPS_DATA_CONN_FAILED,
    }
}

pub fn ni_type(raw: i32) -> u32 {
    match NiType::try_from(raw) {
        Ok(NiType::Voice) | Err(()) => U_HARDWARE_GPS_NI_TYPE_VOICE,
        Ok(NiType::UmtsSupl) => U_HARDWARE_GPS_NI_TYPE_UMTS_SUPL,
        Ok(NiType::UmtsCtrlPlane) => U_HARDWARE_GPS_NI_TYPE_UMTS_CTRL_PLANE,
        Ok(NiType::EmergencySupl) => U_HARDWARE_GPS_NI_TYPE_EMERGENCY_SUPL,
    }
}

// An unknown response never reads as consent
pub fn user_response(raw: i32) -> c_int {
    match UserResponse::try_from(raw) {
        Ok(UserResponse::Accept) => U_HARDWARE_GPS_NI_RESPONSE_ACCEPT,
        Ok(UserResponse::Deny) => U_HARDWARE_GPS_NI_RESPONSE_DENY,
        Ok(UserResponse::NoResponse) | Err(()) => U_HARDWARE_GPS_NI_RESPONSE_NORESP,
    }
}

// Vendor and public encodings share their numbering, unknown stays -1
pub fn ni_encoding(raw: i32) -> c_int {
    match NiEncoding::try_from(raw) {
        Ok(NiEncoding::None) => U_HARDWARE_GPS_ENC_NONE,
        Ok(NiEncoding::SuplGsmDefault) => U_HARDWARE_GPS_ENC_SUPL_GSM_DEFAULT,
        Ok(NiEncoding::SuplUtf8) => U_HARDWARE_GPS_ENC_SUPL_UTF8,
        Ok(NiEncoding::SuplUcs2) => U_HARDWARE_GPS_ENC_SUPL_UCS2,
        Ok(NiEncoding::Unknown) | Err(()) => U_HARDWARE_GPS_ENC_UNKNOWN,
    }
}

pub fn location(fix: &VendorLocation) -> UHardwareGpsLocation {
    UHardwareGpsLocation {
        flags: fix.flags & U_HARDWARE_GPS_LOCATION_FLAGS_MASK,
        latitude: fix.latitude_degrees,
        longitude: fix.longitude_degrees,
        altitude: fix.altitude_meters,
        speed: fix.speed_meters_per_sec,
        bearing: fix.bearing_degrees,
        accuracy: fix.horizontal_accuracy_meters,
        timestamp: fix.timestamp,
        ..UHardwareGpsLocation::default()
    }
}

/// Masks derived from per-satellite flags; only GPS svids 1..=32 have a bit
fn derived_masks(svs: &[VendorSvInfo]) -> SvMasks {
    let mut masks = SvMasks::default();
    for sv in svs {
        if sv.constellation != Constellation::Gps || !(1..=32).contains(&sv.svid) {
            continue;
        }
        let bit = 1u32 << (sv.svid - 1);
        if sv.flags & SV_HAS_EPHEMERIS != 0 {
            masks.ephemeris |= bit;
        }
        if sv.flags & SV_HAS_ALMANAC != 0 {
            masks.almanac |= bit;
        }
        if sv.flags & SV_USED_IN_FIX != 0 {
            masks.used_in_fix |= bit;
        }
    }
    masks
}

pub fn sv_status(status: &VendorSvStatus) -> TranslateResult<UHardwareGpsSvStatus> {
    let overflow = || TranslateError::CapacityExceeded {
        field: Field::SvList,
        len: status.svs.len(),
        capacity: U_HARDWARE_GPS_MAX_SVS,
    };

    let mut list: heapless::Vec<UHardwareGpsSvInfo, U_HARDWARE_GPS_MAX_SVS> = heapless::Vec::new();
    for sv in &status.svs {
        list.push(UHardwareGpsSvInfo {
            prn: sv.svid,
            snr: sv.cn0_dbhz,
            elevation: sv.elevation_degrees,
            azimuth: sv.azimuth_degrees,
            ..UHardwareGpsSvInfo::default()
        })
        .map_err(|_| overflow())?;
    }

    let masks = status.masks.unwrap_or_else(|| derived_masks(&status.svs));
    let mut out = UHardwareGpsSvStatus {
        num_svs: list.len() as c_int,
        ephemeris_mask: masks.ephemeris,
        almanac_mask: masks.almanac,
        used_in_fix_mask: masks.used_in_fix,
        ..UHardwareGpsSvStatus::default()
    };
    out.sv_list[..list.len()].copy_from_slice(&list);
    Ok(out)
}

pub fn agnss_status(status: &VendorAGnssStatus) -> UHardwareGpsAGpsStatus {
    UHardwareGpsAGpsStatus {
        type_: agnss_type(status.agnss_type),
        status: agnss_status_value(status.status),
        ipaddr: status.ipv4_addr,
        ..UHardwareGpsAGpsStatus::default()
    }
}

/// Copy `src` up to its first NUL into `dst`, always NUL-terminated
fn copy_c_string(dst: &mut [c_char], src: &[u8], field: Field) -> TranslateResult<()> {
    let len = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    if len >= dst.len() {
        return Err(TranslateError::CapacityExceeded {
            field,
            len,
            capacity: dst.len() - 1,
        });
    }
    for (d, s) in dst.iter_mut().zip(&src[..len]) {
        *d = *s as c_char;
    }
    dst[len] = 0;
    Ok(())
}

pub fn ni_notification(
    notification: &VendorNiNotification,
) -> TranslateResult<UHardwareGpsNiNotification> {
    let mut out = UHardwareGpsNiNotification {
        notification_id: notification.notification_id,
        ni_type: ni_type(notification.ni_type),
        notify_flags: notification.notify_flags,
        timeout: notification.timeout_sec,
        default_response: user_response(notification.default_response),
        requestor_id_encoding: ni_encoding(notification.requestor_id_encoding),
        text_encoding: ni_encoding(notification.text_encoding),
        ..UHardwareGpsNiNotification::default()
    };
    copy_c_string(&mut out.requestor_id, &notification.requestor_id, Field::RequestorId)?;
    copy_c_string(&mut out.text, &notification.text, Field::Text)?;
    copy_c_string(&mut out.extras, &notification.extras, Field::Extras)?;
    Ok(out)
}

/// Public AGPS server type to its vendor enumerator
pub fn agps_type_to_vendor(public: u16) -> TranslateResult<AGnssType> {
    match public {
        U_HARDWARE_GPS_AGPS_TYPE_SUPL => Ok(AGnssType::Supl),
        U_HARDWARE_GPS_AGPS_TYPE_C2K => Ok(AGnssType::C2k),
        other => Err(TranslateError::UnknownEnumerator(other as i32)),
    }
}

/// Public NI user response to its vendor enumerator
pub fn user_response_to_vendor(public: c_int) -> TranslateResult<UserResponse> {
    match public {
        U_HARDWARE_GPS_NI_RESPONSE_ACCEPT => Ok(UserResponse::Accept),
        U_HARDWARE_GPS_NI_RESPONSE_DENY => Ok(UserResponse::Deny),
        U_HARDWARE_GPS_NI_RESPONSE_NORESP => Ok(UserResponse::NoResponse),
        other => Err(TranslateError::UnknownEnumerator(other)),
    }
}

/// Public reference location to vendor form; only cell-id kinds convert
pub fn ref_location_to_vendor(
    location: &UHardwareGpsAGpsRefLocation,
) -> TranslateResult<VendorRefLocation> {
    let cell = location
        .as_cell_id()
        .ok_or(TranslateError::UnsupportedRefLocation(location.type_))?;
    let kind = match location.type_ {
        U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_GSM_CELLID => REF_LOCATION_GSM_CELLID,
        _ => REF_LOCATION_UMTS_CELLID,
    };
    Ok(VendorRefLocation {
        kind,
        mcc: cell.mcc,
        mnc: cell.mnc,
        lac: cell.lac,
        cid: cell.cid,
    })
}
