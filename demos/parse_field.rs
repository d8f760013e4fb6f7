//! Parse address fields from the command line and print them as JSON.
//!
//! ```text
//! cargo run --example parse_field -- '"Last, First" <a@b>, Team: c@d;'
//! ```

use clap::Parser;

use addressparser::config::{self, Config};

#[derive(Parser)]
#[command(name = "parse_field", version, about = "Parse email address header fields")]
struct Cli {
    /// Address field values to parse
    #[arg(value_name = "FIELD", required = true)]
    fields: Vec<String>,

    /// Flatten groups into their member mailboxes
    #[arg(long)]
    flatten: bool,

    /// Ignore configured limits and parse anything
    #[arg(long)]
    unbounded: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    for field in &cli.fields {
        let json = if cli.flatten {
            serde_json::to_string_pretty(&addressparser::parse_mailboxes(field))?
        } else {
            serde_json::to_string_pretty(&parse_field(field, &config, cli.unbounded)?)?
        };
        println!("{json}");
    }
    Ok(())
}

fn parse_field(
    field: &str,
    config: &Config,
    unbounded: bool,
) -> anyhow::Result<Vec<addressparser::AddressEntry>> {
    if unbounded {
        return Ok(addressparser::parse(field));
    }
    Ok(addressparser::parse_with(field, &config.limits.to_options())?)
}

/// Set up tracing with stderr output.
fn setup_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
