//! # Meter Link Transports
//!
//! `MeterLink` is the byte-stream seam between the protocol drivers and
//! the outside world: one write, then a blocking read that returns as soon
//! as any bytes have arrived. Implementations cover the RS485-to-TCP
//! gateway (`TcpLink`) and a directly attached RS485 adapter
//! (`SerialLink`); [`crate::mercury::link_mock::MockLink`] backs the
//! hardware-free tests.
//!
//! The read contract is deliberately burst-based: the gateway forwards the
//! bus traffic as it arrives, so the first chunk is assumed to hold the
//! whole response. Drivers compensate with per-command minimum-length
//! checks before decoding.

use crate::constants::{READ_BUFFER_SIZE, READ_POLL_TIMEOUT};
use crate::error::MercuryError;
use crate::mercury::frame::{FrameCodec, MeterAddress};
use crate::util::hex::pretty_hex;
use log::{debug, trace};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_serial::SerialPortBuilderExt;

/// Bidirectional byte stream carrying Mercury frames.
#[async_trait::async_trait]
pub trait MeterLink: Send {
    /// Writes one request frame to the bus.
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<(), MercuryError>;

    /// Blocks until at least one chunk of data arrives, re-arming `poll`
    /// between attempts, then returns whatever has accumulated.
    async fn read_burst(&mut self, poll: Duration) -> Result<Vec<u8>, MercuryError>;
}

async fn read_burst_from<R>(reader: &mut R, poll: Duration) -> Result<Vec<u8>, MercuryError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match timeout(poll, reader.read(&mut buf)).await {
            // Poll expired with nothing on the wire; re-arm and keep waiting.
            Err(_) => continue,
            Ok(Ok(0)) => {
                return Err(MercuryError::Transport("connection closed by peer".into()))
            }
            Ok(Ok(n)) => {
                buf.truncate(n);
                return Ok(buf);
            }
            Ok(Err(e)) => return Err(MercuryError::Transport(e.to_string())),
        }
    }
}

/// Link to a meter bus behind an RS485-to-TCP gateway.
pub struct TcpLink {
    stream: TcpStream,
}

impl TcpLink {
    /// Connects to a gateway, e.g. "192.168.1.50:50".
    pub async fn connect(addr: &str) -> Result<Self, MercuryError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| MercuryError::Transport(e.to_string()))?;
        debug!("connected to gateway {addr}");
        Ok(TcpLink { stream })
    }
}

#[async_trait::async_trait]
impl MeterLink for TcpLink {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<(), MercuryError> {
        self.stream
            .write_all(bytes)
            .await
            .map_err(|e| MercuryError::Transport(e.to_string()))?;
        self.stream
            .flush()
            .await
            .map_err(|e| MercuryError::Transport(e.to_string()))
    }

    async fn read_burst(&mut self, poll: Duration) -> Result<Vec<u8>, MercuryError> {
        read_burst_from(&mut self.stream, poll).await
    }
}

/// Link to a directly attached RS485 adapter.
pub struct SerialLink {
    port: tokio_serial::SerialStream,
}

impl SerialLink {
    /// Opens the adapter 8N1 at the given baud rate.
    pub fn open(path: &str, baudrate: u32) -> Result<Self, MercuryError> {
        let port = tokio_serial::new(path, baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .open_native_async()
            .map_err(|e| MercuryError::Transport(e.to_string()))?;
        debug!("opened serial adapter {path} at {baudrate} baud");
        Ok(SerialLink { port })
    }
}

#[async_trait::async_trait]
impl MeterLink for SerialLink {
    async fn write_frame(&mut self, bytes: &[u8]) -> Result<(), MercuryError> {
        self.port
            .write_all(bytes)
            .await
            .map_err(|e| MercuryError::Transport(e.to_string()))?;
        self.port
            .flush()
            .await
            .map_err(|e| MercuryError::Transport(e.to_string()))
    }

    async fn read_burst(&mut self, poll: Duration) -> Result<Vec<u8>, MercuryError> {
        read_burst_from(&mut self.port, poll).await
    }
}

/// Runs one request/response cycle: pack, write, wait for a burst, split,
/// and compare the echoed address against the one requested.
///
/// A response addressed to another meter on the bus is not ours: it is
/// dropped and the call yields `None` rather than an error.
pub(crate) async fn exchange<L: MeterLink>(
    link: &mut L,
    codec: &FrameCodec,
    address: &MeterAddress,
    command: u8,
    params: &[u8],
    password: Option<&str>,
) -> Result<Option<Vec<u8>>, MercuryError> {
    let request = codec.pack(address, command, params, password, true)?;
    trace!("tx {}", pretty_hex(&request));
    link.write_frame(&request).await?;

    let raw = link.read_burst(READ_POLL_TIMEOUT).await?;
    trace!("rx {}", pretty_hex(&raw));

    let (expected, _) = codec.unpack(&request)?;
    let (echoed, payload) = codec.unpack(&raw)?;
    if echoed != expected {
        debug!("response from meter {echoed:#x} while talking to {expected:#x}, dropped");
        return Ok(None);
    }
    Ok(Some(payload))
}
