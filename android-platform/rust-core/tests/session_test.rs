//! Session construction, negotiation and command routing against the
//! scripted vendor.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::*;
use shared::abi::*;
use shared::vendor::{
    Constellation, PositionMode, VendorAGnssStatus, VendorLocation, VendorNiNotification,
    VendorSvInfo, VendorSvStatus, LOCATION_HAS_LAT_LONG, LOCATION_HAS_VERTICAL_ACCURACY,
    SV_USED_IN_FIX,
};
use ubuntu_hardware::{Extension, GnssGeneration, GpsSession, Registry, SessionState, ShimError};

fn open(
    registry: &Arc<Registry>,
    recorder: &Recorder,
    provider: &ScriptedProvider,
) -> Result<GpsSession, ShimError> {
    GpsSession::with_registry(
        registry,
        recorder.params(),
        provider,
        instant(50),
        Box::new(CountingWakeLock::default()),
    )
}

fn cell(kind: u16) -> UHardwareGpsAGpsRefLocation {
    UHardwareGpsAGpsRefLocation::cell_id(
        kind,
        UHardwareGpsAGpsRefLocationCellID {
            type_: kind,
            mcc: 262,
            mnc: 1,
            lac: 42,
            cid: 0x1234,
        },
    )
}

#[test]
fn test_adopts_newest_generation() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_1);

    let session = open(&registry, &recorder, &provider).unwrap();
    assert_eq!(session.generation(), GnssGeneration::V1_1);
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(mock.log.count("set_callback_1_1"), 1);
    assert!(!mock.log.calls().contains(&"set_callback".to_string()));
}

#[test]
fn test_falls_back_to_older_generation() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);

    let session = open(&registry, &recorder, &provider).unwrap();
    assert_eq!(session.generation(), GnssGeneration::V1_0);
    assert_eq!(mock.log.calls(), vec!["set_callback".to_string()]);
}

#[test]
fn test_position_mode_uses_v1_1_call_when_adopted() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_1);
    let session = open(&registry, &recorder, &provider).unwrap();

    let mode = PositionMode {
        min_interval_ms: 1000,
        ..PositionMode::default()
    };
    session.set_position_mode(&mode).unwrap();
    assert_eq!(mock.log.count("set_position_mode_1_1 1000 low_power=false"), 1);
    assert_eq!(mock.log.count("set_position_mode 1000"), 0);
}

#[test]
fn test_position_mode_on_v1_0() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();

    let mode = PositionMode {
        min_interval_ms: 500,
        ..PositionMode::default()
    };
    session.set_position_mode(&mode).unwrap();
    assert_eq!(mock.log.count("set_position_mode 500"), 1);
}

#[test]
fn test_retries_until_service_appears() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock, GnssGeneration::V1_1).unavailable_for(3);

    let session = open(&registry, &recorder, &provider).unwrap();
    assert_eq!(provider.passes(), 4);
    assert_eq!(session.generation(), GnssGeneration::V1_1);
}

#[test]
fn test_gives_up_after_fifty_attempts() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::never(mock.clone());

    let err = open(&registry, &recorder, &provider).unwrap_err();
    assert_eq!(err, ShimError::ServiceUnavailable { attempts: 50 });
    assert_eq!(provider.passes(), 50);
    assert!(mock.log.calls().is_empty());
    assert!(registry.is_vacant());
}

#[test]
fn test_rejected_top_level_callback_is_not_adopted() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script {
        accept_callback: false,
        ..Script::bare()
    });
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);

    let err = open(&registry, &recorder, &provider).unwrap_err();
    assert!(matches!(err, ShimError::ServiceUnavailable { .. }));
    assert_eq!(mock.log.count("set_callback"), 50);
    assert!(registry.is_vacant());
}

#[test]
fn test_single_instance() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock, GnssGeneration::V1_0);

    let first = open(&registry, &recorder, &provider).unwrap();
    assert_eq!(
        open(&registry, &recorder, &provider).unwrap_err(),
        ShimError::AlreadyExists
    );

    drop(first);
    assert!(registry.is_vacant());
    assert!(open(&registry, &recorder, &provider).is_ok());
}

#[test]
fn test_extensions_are_independent() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script {
        agnss: true,
        ..Script::bare()
    });
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();

    assert_eq!(session.extensions().supported(), vec![Extension::AGnss]);
    assert_eq!(
        session.inject_vendor_data(b"xtra"),
        Err(ShimError::ExtensionUnsupported(Extension::Xtra))
    );
    assert_eq!(
        session.respond_to_notification(1, U_HARDWARE_GPS_NI_RESPONSE_ACCEPT),
        Err(ShimError::ExtensionUnsupported(Extension::Ni))
    );
    assert_eq!(
        session.debug_state(),
        Err(ShimError::ExtensionUnsupported(Extension::Debug))
    );

    session
        .set_server_for_type(U_HARDWARE_GPS_AGPS_TYPE_SUPL, "supl.example.com", 7275)
        .unwrap();
    assert_eq!(mock.log.count("set_server Supl supl.example.com:7275"), 1);
}

/// The command served by `extension`
fn exercise(session: &GpsSession, extension: Extension) -> Result<(), ShimError> {
    let size = std::mem::size_of::<UHardwareGpsAGpsRefLocation>();
    match extension {
        Extension::Xtra => session.inject_vendor_data(b"xtra"),
        Extension::AGnss => {
            session.set_server_for_type(U_HARDWARE_GPS_AGPS_TYPE_SUPL, "supl.example.com", 7275)
        }
        Extension::AGnssRil => session.set_reference_location(
            &cell(U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_GSM_CELLID),
            size,
        ),
        Extension::Ni => session.respond_to_notification(1, U_HARDWARE_GPS_NI_RESPONSE_ACCEPT),
        Extension::Debug => session.debug_state().map(|_| ()),
    }
}

#[test]
fn test_each_extension_can_be_missing_alone() {
    let all = [
        Extension::Xtra,
        Extension::AGnss,
        Extension::AGnssRil,
        Extension::Ni,
        Extension::Debug,
    ];
    for missing in all {
        let script = Script {
            xtra: missing != Extension::Xtra,
            agnss: missing != Extension::AGnss,
            agnss_ril: missing != Extension::AGnssRil,
            ni: missing != Extension::Ni,
            debug: missing != Extension::Debug,
            ..Script::bare()
        };
        let registry = Arc::new(Registry::new());
        let recorder = Recorder::default();
        let mock = MockGnss::new(script);
        let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
        let session = open(&registry, &recorder, &provider).unwrap();

        let supported = session.extensions().supported();
        assert_eq!(supported.len(), 4, "without {:?}", missing);
        assert!(!supported.contains(&missing));

        for extension in all {
            let result = exercise(&session, extension);
            if extension == missing {
                assert_eq!(result, Err(ShimError::ExtensionUnsupported(missing)));
            } else {
                assert_eq!(result, Ok(()), "{:?} without {:?}", extension, missing);
            }
        }
        assert_eq!(mock.log.count("inject_xtra_data"), usize::from(missing != Extension::Xtra));
        assert_eq!(mock.log.count("set_server"), usize::from(missing != Extension::AGnss));
        assert_eq!(mock.log.count("set_ref_location"), usize::from(missing != Extension::AGnssRil));
        assert_eq!(mock.log.count("respond"), usize::from(missing != Extension::Ni));
    }
}

#[test]
fn test_extension_with_rejected_callback_is_dropped() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script {
        accept_extension_callbacks: false,
        ..Script::full()
    });
    let provider = ScriptedProvider::new(mock, GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();

    // Debug has no callback to reject
    assert_eq!(session.extensions().supported(), vec![Extension::Debug]);
    assert_eq!(session.debug_state().unwrap(), "engine: idle");
}

#[test]
fn test_reference_location_validated_before_vendor() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::full());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_1);
    let session = open(&registry, &recorder, &provider).unwrap();
    let size = std::mem::size_of::<UHardwareGpsAGpsRefLocation>();

    let gsm = cell(U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_GSM_CELLID);
    assert!(matches!(
        session.set_reference_location(&gsm, size - 1),
        Err(ShimError::InvalidArgument(_))
    ));
    let mac = UHardwareGpsAGpsRefLocation::mac([0, 1, 2, 3, 4, 5]);
    assert!(matches!(
        session.set_reference_location(&mac, size),
        Err(ShimError::InvalidArgument(_))
    ));
    assert_eq!(mock.log.count("set_ref_location"), 0);

    let umts = cell(U_HARDWARE_GPS_AGPS_REF_LOCATION_TYPE_UMTS_CELLID);
    session.set_reference_location(&gsm, size).unwrap();
    session.set_reference_location(&umts, size).unwrap();
    assert_eq!(mock.log.count("set_ref_location 1 262 1 42 4660"), 1);
    assert_eq!(mock.log.count("set_ref_location 2 262 1 42 4660"), 1);
}

#[test]
fn test_commands_reach_vendor() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::full());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();
    mock.log.clear();

    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Started);
    session.inject_time(1_700_000_000_000, 5_000, 10).unwrap();
    session.delete_aiding_data(0xFFFF).unwrap();
    session.inject_vendor_data(&[0u8; 16]).unwrap();
    session.notify_connection_open(Some("internet")).unwrap();
    session.notify_connection_closed().unwrap();
    session
        .respond_to_notification(3, U_HARDWARE_GPS_NI_RESPONSE_DENY)
        .unwrap();
    session.stop().unwrap();
    assert_eq!(session.state(), SessionState::Stopped);

    assert_eq!(
        mock.log.calls(),
        vec![
            "start",
            "inject_time 1700000000000 5000 10",
            "delete_aiding_data 0xffff",
            "inject_xtra_data 16",
            "data_conn_open internet Ipv4",
            "data_conn_closed",
            "respond 3 Deny",
            "stop",
        ]
    );
}

#[test]
fn test_vendor_failures_are_reported() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::full());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();

    assert!(matches!(
        session.inject_location(48.1, 11.5, 20.0),
        Err(ShimError::VendorCallFailure { call: "inject_location", .. })
    ));
    assert!(matches!(
        session.notify_connection_unavailable(),
        Err(ShimError::VendorCallFailure { call: "data_conn_failed", .. })
    ));
}

#[test]
fn test_invalid_arguments_rejected_without_vendor_call() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::full());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();
    mock.log.clear();

    assert!(matches!(
        session.set_server_for_type(9, "supl.example.com", 7275),
        Err(ShimError::InvalidArgument(_))
    ));
    assert!(matches!(
        session.notify_connection_open(None),
        Err(ShimError::InvalidArgument(_))
    ));
    assert!(matches!(
        session.respond_to_notification(1, 17),
        Err(ShimError::InvalidArgument(_))
    ));
    assert!(mock.log.calls().is_empty());
}

#[test]
fn test_vendor_events_reach_caller() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::full());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_1);
    let _session = open(&registry, &recorder, &provider).unwrap();

    let gnss = mock.callback();
    gnss.location(&VendorLocation {
        flags: LOCATION_HAS_LAT_LONG | LOCATION_HAS_VERTICAL_ACCURACY,
        latitude_degrees: 52.52,
        longitude_degrees: 13.40,
        ..VendorLocation::default()
    });
    gnss.status(2);
    gnss.sv_status(&VendorSvStatus {
        svs: vec![VendorSvInfo {
            svid: 3,
            constellation: Constellation::Gps,
            flags: SV_USED_IN_FIX,
            ..VendorSvInfo::default()
        }],
        masks: None,
    });
    gnss.nmea(77, b"$GPGGA,1");
    gnss.capabilities(0x21);
    gnss.request_utc_time();
    mock.xtra_callback().download_request();
    mock.agnss_callback().status_ipv4(&VendorAGnssStatus {
        agnss_type: 2,
        status: 3,
        ipv4_addr: 0x0100_007F,
    });
    mock.agnss_callback().status_ipv6(1, 3, [0; 16]);
    mock.ni_callback().notify(&VendorNiNotification {
        notification_id: 9,
        text: b"locate?".to_vec(),
        ..VendorNiNotification::default()
    });
    mock.ril_callback().request_set_id(1);
    mock.ril_callback().request_ref_location(2);

    assert_eq!(
        recorder.events(),
        vec![
            Event::Location {
                latitude: 52.52,
                longitude: 13.40,
                flags: U_HARDWARE_GPS_LOCATION_HAS_LAT_LONG,
            },
            Event::Status(U_HARDWARE_GPS_STATUS_SESSION_END),
            Event::SvStatus {
                num_svs: 1,
                used_in_fix_mask: 1 << 2,
            },
            Event::Nmea {
                timestamp: 77,
                sentence: "$GPGGA,1".to_string(),
                length: 8,
            },
            Event::Capabilities(0x21),
            Event::UtcTimeRequest,
            Event::XtraDownloadRequest,
            Event::AGpsStatus {
                type_: U_HARDWARE_GPS_AGPS_TYPE_C2K,
                status: U_HARDWARE_GPS_AGPS_DATA_CONNECTED,
                ipaddr: 0x0100_007F,
            },
            Event::NiNotify {
                id: 9,
                text: "locate?".to_string(),
            },
            Event::SetIdRequest(1),
            Event::RefLocRequest(2),
        ]
    );
}

#[test]
fn test_wake_lock_follows_vendor() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let wake_lock = CountingWakeLock::default();
    let _session = GpsSession::with_registry(
        &registry,
        recorder.params(),
        &provider,
        instant(1),
        Box::new(wake_lock.clone()),
    )
    .unwrap();

    mock.callback().acquire_wakelock();
    mock.callback().release_wakelock();
    mock.callback().acquire_wakelock();
    assert_eq!(wake_lock.acquired.load(Ordering::SeqCst), 2);
    assert_eq!(wake_lock.released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_events_after_destroy_are_dropped() {
    let registry = Arc::new(Registry::new());
    let recorder = Recorder::default();
    let mock = MockGnss::new(Script::bare());
    let provider = ScriptedProvider::new(mock.clone(), GnssGeneration::V1_0);
    let session = open(&registry, &recorder, &provider).unwrap();
    let gnss = mock.callback();

    drop(session);
    assert_eq!(mock.log.calls().last().map(String::as_str), Some("cleanup"));

    gnss.status(1);
    gnss.capabilities(1);
    assert!(recorder.events().is_empty());
}
