//! MXQ CLI - Inspect reduced-precision encodings and Q8 block quantization.

use clap::{Parser, Subcommand};
use microscale::TypeId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod common;
mod config;
mod inspect;
mod q8;
mod roundtrip;

#[derive(Parser)]
#[command(name = "mxq")]
#[command(about = "CLI tool for inspecting microscale float codecs and Q8 quantization")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List element types with their size and alignment
    Types {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode individual values and show their bit patterns
    Scalar {
        /// Element type (f32, e8m23, e5m10, e8m7, e4m3)
        #[arg(short = 't', long = "type")]
        type_id: TypeId,

        /// Values to encode
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f32>,
    },

    /// Quantize a vector with Q8 and print every element's round trip
    Q8 {
        /// Path to config JSON (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// JSON file holding an array of values
        #[arg(short, long)]
        input: Option<String>,

        /// Generate a template config instead of quantizing
        #[arg(long)]
        generate_config: bool,

        /// Values to quantize (length must be a multiple of the block size)
        #[arg(allow_negative_numbers = true)]
        values: Vec<f32>,
    },

    /// Quantize and dequantize through the type dispatch and report the error
    Roundtrip {
        /// Element type
        #[arg(short = 't', long = "type")]
        type_id: TypeId,

        /// Matrix rows (requires --cols)
        #[arg(long, requires = "cols")]
        rows: Option<usize>,

        /// Matrix columns (requires --rows)
        #[arg(long, requires = "rows")]
        cols: Option<usize>,

        /// Path to config JSON (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// JSON file holding an array of values
        #[arg(short, long)]
        input: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Generate a template config instead of running
        #[arg(long)]
        generate_config: bool,

        /// Values to round trip
        #[arg(allow_negative_numbers = true)]
        values: Vec<f32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Types { json } => inspect::run_types(json)?,
        Commands::Scalar { type_id, values } => inspect::run_scalar(type_id, &values)?,
        Commands::Q8 {
            config,
            input,
            generate_config,
            values,
        } => {
            if generate_config {
                crate::config::generate_config_template("q8")?;
            } else {
                q8::run(config.as_deref(), input.as_deref(), &values)?;
            }
        }
        Commands::Roundtrip {
            type_id,
            rows,
            cols,
            config,
            input,
            json,
            generate_config,
            values,
        } => {
            if generate_config {
                crate::config::generate_config_template("roundtrip --type e4m3")?;
            } else {
                let shape = rows.zip(cols);
                roundtrip::run(
                    type_id,
                    shape,
                    config.as_deref(),
                    input.as_deref(),
                    &values,
                    json,
                )?;
            }
        }
    }

    Ok(())
}
