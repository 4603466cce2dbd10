use anyhow::Context;
use clap::{Parser, ValueEnum};
use mercury_rs::constants::DEFAULT_GATEWAY_PORT;
use mercury_rs::{
    derive_bus_address, AccessLevel, Mercury206Client, Mercury236Client, MeterLink, Report,
    SerialLink, SessionState, TcpLink,
};

#[derive(Parser)]
#[command(name = "mercury-cli")]
#[command(about = "Mercury energy meter data receiver")]
struct Cli {
    /// Protocol variant spoken by the meter
    #[arg(long, value_enum, default_value_t = Proto::M206)]
    proto: Proto,

    /// Meter serial number
    #[arg(long)]
    serial: u32,

    /// RS485-to-TCP gateway host
    #[arg(long)]
    host: Option<String>,

    /// RS485-to-TCP gateway port
    #[arg(long, default_value_t = DEFAULT_GATEWAY_PORT)]
    port: u16,

    /// Local RS485 serial device, as an alternative to --host
    #[arg(long, conflicts_with = "host")]
    device: Option<String>,

    /// Baud rate for --device
    #[arg(long, default_value_t = 9600)]
    baudrate: u32,

    /// Access level for the 236 session
    #[arg(long, value_enum, default_value_t = UserArg::User)]
    user: UserArg,

    /// Session password; defaults to the level's factory password
    #[arg(long)]
    password: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Proto {
    M206,
    M236,
}

#[derive(Clone, Copy, ValueEnum)]
enum UserArg {
    User,
    Admin,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let report = if let Some(host) = &cli.host {
        let addr = format!("{host}:{}", cli.port);
        let link = TcpLink::connect(&addr)
            .await
            .with_context(|| format!("connecting to the RS485 gateway at {addr}"))?;
        acquire(link, &cli).await?
    } else if let Some(device) = &cli.device {
        let link = SerialLink::open(device, cli.baudrate)
            .with_context(|| format!("opening the serial adapter {device}"))?;
        acquire(link, &cli).await?
    } else {
        anyhow::bail!("either --host or --device is required");
    };

    match cli.format {
        Format::Json => println!("{}", report.to_json()?),
        Format::Text => print!("{}", report.to_text()),
    }
    Ok(())
}

async fn acquire<L: MeterLink>(link: L, cli: &Cli) -> anyhow::Result<Report> {
    match cli.proto {
        Proto::M206 => acquire_m206(link, cli.serial).await,
        Proto::M236 => acquire_m236(link, cli).await,
    }
}

/// 206 meters are addressed by their serial number; every read stands on
/// its own.
async fn acquire_m206<L: MeterLink>(link: L, serial: u32) -> anyhow::Result<Report> {
    let mut meter = Mercury206Client::new(link);
    let mut report = Report::new();

    let vap = meter
        .read_vap(serial)
        .await?
        .context("meter did not answer the voltage/amperage/power read")?;
    report.set("info", "V", vap.voltage);
    report.set("info", "A", vap.amperage);
    report.set("info", "P", vap.power);

    let freq = meter
        .read_freq(serial)
        .await?
        .context("meter did not answer the frequency read")?;
    report.set("info", "freq", freq);

    let energy = meter
        .read_energy(serial)
        .await?
        .context("meter did not answer the energy read")?;
    report.insert_section("energy", energy);

    Ok(report)
}

/// 236 meters are addressed by a bus byte derived from the serial number,
/// and all metered reads happen inside an authenticated channel.
async fn acquire_m236<L: MeterLink>(link: L, cli: &Cli) -> anyhow::Result<Report> {
    let address = derive_bus_address(cli.serial);
    let level = match cli.user {
        UserArg::User => AccessLevel::User,
        UserArg::Admin => AccessLevel::Admin,
    };

    let mut meter = Mercury236Client::new(link);
    let mut report = Report::new();

    if !meter.check_connect(address).await? {
        anyhow::bail!("meter at bus address {address} did not answer the connect check");
    }
    let session = meter
        .open_channel(address, level, cli.password.as_deref())
        .await?;
    if session == SessionState::Closed {
        anyhow::bail!("meter at bus address {address} did not acknowledge the channel open");
    }

    let energy = meter
        .read_energy_totals(address)
        .await?
        .context("meter did not answer the energy totals read")?;
    report.insert_section("energy_phases_AR", energy);

    let energy = meter
        .read_energy_totals_by_tariff(address)
        .await?
        .context("meter did not answer the per-tariff energy read")?;
    report.insert_section("energy_tarif_AR", energy);

    let energy = meter
        .read_energy_phase_totals(address)
        .await?
        .context("meter did not answer the per-phase energy read")?;
    report.insert_section("energy_phases", energy);

    let energy = meter
        .read_energy_phases_by_tariff(address)
        .await?
        .context("meter did not answer the per-phase per-tariff energy read")?;
    report.insert_section("energy_tarif", energy);

    let mut info = meter
        .read_vap(address)
        .await?
        .context("meter did not answer the voltage/power/current read")?;
    let freq = meter
        .read_freq(address)
        .await?
        .context("meter did not answer the frequency read")?;
    info.insert("freq".to_string(), freq);
    report.insert_section("info", info);

    meter.close_channel(address).await?;
    Ok(report)
}
