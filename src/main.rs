//! Zentinel SOAP request encoder binary.
//!
//! Run with: `zentinel-soap-encode --wsdl service.wsdl --method GetUser --params params.json`
//!
//! Writes the SOAP envelope to stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zentinel_soap_encoder::wsdl::parse_definitions;
use zentinel_soap_encoder::{EncoderConfig, SoapCall, SoapRequestEncoder, Value};

/// Encode a SOAP 1.1 request envelope from JSON params.
///
/// The target namespace comes from `--namespace` when given, otherwise it is
/// resolved from the WSDL definitions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// WSDL document used to resolve the target namespace
    #[arg(short, long)]
    wsdl: Option<PathBuf>,

    /// Target namespace, bypassing WSDL resolution
    #[arg(short, long)]
    namespace: Option<String>,

    /// Method element name inside the Body
    #[arg(short, long)]
    method: String,

    /// Body params as JSON ("-" reads stdin)
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Header params as JSON
    #[arg(long)]
    header_params: Option<PathBuf>,

    /// Header element name (overrides the config file)
    #[arg(long)]
    header_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Config file: {}", args.config.display());

    // Load configuration
    let mut config: EncoderConfig = if args.config.exists() {
        let content = std::fs::read_to_string(&args.config)
            .context("Failed to read config file")?;
        serde_yaml::from_str(&content).context("Failed to parse config file")?
    } else {
        info!("Config file not found, using defaults");
        EncoderConfig::default()
    };

    if let Some(name) = args.header_name {
        config.header.name = name;
    }

    info!(
        prefix = %config.envelope.prefix,
        custom_attributes = config.envelope.attributes.is_some(),
        header_name = %config.header.name,
        "Configuration loaded"
    );

    let mut encoder = SoapRequestEncoder::new(config);

    if let Some(ref path) = args.wsdl {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read WSDL file {}", path.display()))?;
        let definitions = parse_definitions(&content).context("Failed to parse WSDL")?;
        encoder = encoder.with_definitions(definitions);
    }

    if let Some(namespace) = args.namespace {
        encoder = encoder.with_namespace(namespace);
    }

    let params = match args.params {
        Some(ref path) => read_json(path).context("Failed to load body params")?,
        None => Value::Null,
    };

    let mut call = SoapCall::new(args.method, params);
    if let Some(ref path) = args.header_params {
        call = call.with_header(read_json(path).context("Failed to load header params")?);
    }

    let stdout = std::io::stdout();
    encoder
        .write_call(&call, stdout.lock())
        .context("Failed to encode SOAP request")?;
    println!();

    Ok(())
}

/// Read a JSON document from a file, or stdin for `-`.
fn read_json(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    let json: serde_json::Value = serde_json::from_str(&content).context("Invalid JSON")?;
    Ok(Value::from(json))
}
