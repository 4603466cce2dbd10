//! Driver scenarios for the 236 variant over a mock link: session
//! handshake, per-phase readings, energy banks, the reverse-energy
//! override and not-for-us silence.

use mercury_rs::{
    AccessLevel, EnergyRegister, Mercury236Client, MockLink, SessionState,
};

const ADDRESS: u8 = 0x80;

/// Builds a response burst: 1-byte address plus payload.
fn response(address: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![address];
    frame.extend_from_slice(payload);
    frame
}

#[tokio::test]
async fn test_session_handshake_tracks_state() {
    let mock = MockLink::new();
    mock.queue_response(&response(ADDRESS, &[0x00])); // connect check ack
    mock.queue_response(&response(ADDRESS, &[0x00])); // open ack
    mock.queue_response(&response(ADDRESS, &[0x00])); // close ack

    let mut meter = Mercury236Client::new(mock.clone());
    assert_eq!(meter.session(), SessionState::Closed);

    assert!(meter.check_connect(ADDRESS).await.unwrap());
    assert_eq!(meter.session(), SessionState::Closed);

    let state = meter
        .open_channel(ADDRESS, AccessLevel::User, None)
        .await
        .unwrap();
    assert_eq!(state, SessionState::Open(AccessLevel::User));
    assert_eq!(meter.session(), state);

    assert_eq!(
        meter.close_channel(ADDRESS).await.unwrap(),
        SessionState::Closed
    );

    let tx = mock.written();
    assert_eq!(tx[0], [0x80, 0x00, 0x60, 0x70]);
    // Open channel carries the level byte and the factory password as
    // six digit bytes.
    assert_eq!(
        tx[1],
        [0x80, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x16, 0x47]
    );
    assert_eq!(tx[2], [0x80, 0x02, 0xE1, 0xB1]);
}

#[tokio::test]
async fn test_open_channel_with_admin_default_password() {
    let mock = MockLink::new();
    mock.queue_response(&response(ADDRESS, &[0x00]));

    let mut meter = Mercury236Client::new(mock.clone());
    let state = meter
        .open_channel(ADDRESS, AccessLevel::Admin, None)
        .await
        .unwrap();
    assert_eq!(state, SessionState::Open(AccessLevel::Admin));
    assert_eq!(
        mock.written()[0],
        [0x80, 0x01, 0x02, 0x02, 0x02, 0x02, 0x02, 0x02, 0x02, 0xD1, 0xC1]
    );
}

#[tokio::test]
async fn test_silent_open_leaves_session_closed() {
    let mock = MockLink::new();
    // A different meter answers; the reply is not ours.
    mock.queue_response(&response(0x81, &[0x00]));

    let mut meter = Mercury236Client::new(mock);
    let state = meter
        .open_channel(ADDRESS, AccessLevel::User, None)
        .await
        .unwrap();
    assert_eq!(state, SessionState::Closed);
    assert_eq!(meter.session(), SessionState::Closed);
}

#[tokio::test]
async fn test_read_vap_decodes_all_three_register_sets() {
    let mock = MockLink::new();
    // Voltage: 230.00, 231.23, 229.50 V.
    mock.queue_response(&response(
        ADDRESS,
        &[0x00, 0xD8, 0x59, 0x00, 0x53, 0x5A, 0x00, 0xA6, 0x59],
    ));
    // Power: Psum 150.00, phases 50.00 / 49.00 / 51.00 W; the first byte
    // of each field holds direction flags.
    mock.queue_response(&response(
        ADDRESS,
        &[0x40, 0x98, 0x3A, 0x40, 0x88, 0x13, 0x40, 0x24, 0x13, 0x40, 0xEC, 0x13],
    ));
    // Current: 0.65, 0.70, 0.68 A.
    mock.queue_response(&response(
        ADDRESS,
        &[0x00, 0x8A, 0x02, 0x00, 0xBC, 0x02, 0x00, 0xA8, 0x02],
    ));

    let mut meter = Mercury236Client::new(mock);
    let vap = meter.read_vap(ADDRESS).await.unwrap().unwrap();

    assert_eq!(vap["V_F1"], 230.0);
    assert_eq!(vap["V_F2"], 231.23);
    assert_eq!(vap["V_F3"], 229.5);
    assert_eq!(vap["Psum"], 150.0);
    assert_eq!(vap["P_F1"], 50.0);
    assert_eq!(vap["P_F2"], 49.0);
    assert_eq!(vap["P_F3"], 51.0);
    assert_eq!(vap["A_F1"], 0.65);
    assert_eq!(vap["A_F2"], 0.7);
    assert_eq!(vap["A_F3"], 0.68);
    assert_eq!(vap.len(), 10);
}

#[tokio::test]
async fn test_read_freq_reorders_and_scales() {
    let mock = MockLink::new();
    mock.queue_response(&response(ADDRESS, &[0x00, 0x88, 0x13]));

    let mut meter = Mercury236Client::new(mock.clone());
    assert_eq!(meter.read_freq(ADDRESS).await.unwrap(), Some(50.0));
    assert_eq!(mock.written()[0], [0x80, 0x08, 0x16, 0x40, 0xA7, 0xB6]);
}

#[tokio::test]
async fn test_read_energy_since_reset_forces_reverse_to_zero() {
    let mock = MockLink::new();
    // A+ 1234.567, A- nonzero on the wire, R+ 55.555, R- zero.
    mock.queue_response(&response(
        ADDRESS,
        &[
            0x12, 0x00, 0x87, 0xD6, // A+
            0x11, 0x22, 0x33, 0x44, // A- (decodes nonzero, must be blanked)
            0x00, 0x00, 0x03, 0xD9, // R+
            0x00, 0x00, 0x00, 0x00, // R-
        ],
    ));

    let mut meter = Mercury236Client::new(mock.clone());
    let energy = meter
        .read_energy(ADDRESS, EnergyRegister::SinceReset, 2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(energy["A+_T2"], 1234.567);
    assert_eq!(energy["A-_T2"], 0.0);
    assert_eq!(energy["R+_T2"], 55.555);
    assert_eq!(energy["R-_T2"], 0.0);
    assert_eq!(energy.len(), 4);

    assert_eq!(mock.written()[0], [0x80, 0x05, 0x00, 0x02, 0xB8, 0x24]);
}

#[tokio::test]
async fn test_read_energy_per_phase_labels() {
    let mock = MockLink::new();
    // Phases: 400.001, 300.000, 0 kWh; tariff 0 uses the "sum" suffix.
    mock.queue_response(&response(
        ADDRESS,
        &[
            0x06, 0x00, 0x81, 0x1A, 0x04, 0x00, 0xE0, 0x93, 0x00, 0x00, 0x00, 0x00,
        ],
    ));

    let mut meter = Mercury236Client::new(mock);
    let energy = meter
        .read_energy(ADDRESS, EnergyRegister::PerPhase, 0)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(energy["A+_F1sum"], 400.001);
    assert_eq!(energy["A+_F2sum"], 300.0);
    assert_eq!(energy["A+_F3sum"], 0.0);
    assert_eq!(energy.len(), 3);
}

#[tokio::test]
async fn test_tariff_merge_covers_all_suffixes() {
    let mock = MockLink::new();
    for _ in 0..4 {
        mock.queue_response(&response(ADDRESS, &[0x00; 16]));
    }

    let mut meter = Mercury236Client::new(mock);
    let merged = meter
        .read_energy_totals_by_tariff(ADDRESS)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(merged.len(), 16);
    for tariff in 1..=4 {
        for label in ["A+", "A-", "R+", "R-"] {
            assert_eq!(merged[&format!("{label}_T{tariff}")], 0.0);
        }
    }
}

#[tokio::test]
async fn test_silent_tariff_makes_aggregation_none() {
    let mock = MockLink::new();
    mock.queue_response(&response(ADDRESS, &[0x00; 16]));
    // Second tariff answered by another meter.
    mock.queue_response(&response(0x81, &[0x00; 16]));

    let mut meter = Mercury236Client::new(mock);
    assert!(meter
        .read_energy_totals_by_tariff(ADDRESS)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_mismatched_address_yields_none_without_error() {
    let mock = MockLink::new();
    mock.queue_response(&response(0x2D, &[0x00, 0x88, 0x13]));

    let mut meter = Mercury236Client::new(mock);
    assert!(meter.read_freq(ADDRESS).await.unwrap().is_none());
}
