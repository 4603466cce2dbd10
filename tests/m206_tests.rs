//! Driver scenarios for the 206 variant over a mock link: decoding,
//! request framing, not-for-us silence and error propagation.

use mercury_rs::{Mercury206Client, MercuryError, MockLink};

const SERIAL: u32 = 10925856;

/// Builds a response burst: 4-byte big-endian address plus payload.
fn response(address: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = address.to_be_bytes().to_vec();
    frame.extend_from_slice(payload);
    frame
}

#[tokio::test]
async fn test_read_vap_decodes_bcd_registers() {
    let mock = MockLink::new();
    // Command echo, then V=230.5 (2305/10), A=1.5 (150/100), P=345 W.
    mock.queue_response(&response(
        SERIAL,
        &[0x63, 0x23, 0x05, 0x01, 0x50, 0x00, 0x03, 0x45],
    ));

    let mut meter = Mercury206Client::new(mock.clone());
    let reading = meter.read_vap(SERIAL).await.unwrap().unwrap();
    assert_eq!(reading.voltage, 230.5);
    assert_eq!(reading.amperage, 1.5);
    assert_eq!(reading.power, 345.0);

    let tx = mock.written();
    assert_eq!(tx.len(), 1);
    assert_eq!(tx[0], [0x00, 0xA6, 0xB7, 0x20, 0x63, 0xEF, 0x47]);
}

#[tokio::test]
async fn test_read_freq_decodes_bcd_register() {
    let mock = MockLink::new();
    mock.queue_response(&response(SERIAL, &[0x81, 0x50, 0x02]));

    let mut meter = Mercury206Client::new(mock.clone());
    assert_eq!(meter.read_freq(SERIAL).await.unwrap(), Some(50.02));
    assert_eq!(
        mock.written()[0],
        [0x00, 0xA6, 0xB7, 0x20, 0x81, 0x6F, 0x0E]
    );
}

#[tokio::test]
async fn test_response_for_other_meter_yields_none() {
    let mock = MockLink::new();
    mock.queue_response(&response(
        11111111,
        &[0x63, 0x23, 0x05, 0x01, 0x50, 0x00, 0x03, 0x45],
    ));

    let mut meter = Mercury206Client::new(mock);
    assert!(meter.read_vap(SERIAL).await.unwrap().is_none());
}

#[tokio::test]
async fn test_truncated_payload_is_a_frame_error() {
    let mock = MockLink::new();
    mock.queue_response(&response(SERIAL, &[0x63, 0x23, 0x05]));

    let mut meter = Mercury206Client::new(mock);
    assert!(matches!(
        meter.read_vap(SERIAL).await,
        Err(MercuryError::Frame(_))
    ));
}

#[tokio::test]
async fn test_hex_nibble_in_bcd_register_is_a_format_error() {
    let mock = MockLink::new();
    mock.queue_response(&response(
        SERIAL,
        &[0x63, 0xAB, 0x05, 0x01, 0x50, 0x00, 0x03, 0x45],
    ));

    let mut meter = Mercury206Client::new(mock);
    assert!(matches!(
        meter.read_vap(SERIAL).await,
        Err(MercuryError::Format { base: 10, .. })
    ));
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let mock = MockLink::new();
    mock.fail_next("gateway dropped the connection");

    let mut meter = Mercury206Client::new(mock);
    assert!(matches!(
        meter.read_energy(SERIAL).await,
        Err(MercuryError::Transport(_))
    ));
}
