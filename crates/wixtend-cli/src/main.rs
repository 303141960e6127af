use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wixtend::VendorProfile;

const USAGE: &str = "Usage: wixtend [--upgrade-code <UUID>] <input.xml> <output.xml>";

#[derive(Debug, Parser)]
#[command(
    name = "wixtend",
    version,
    about = "Apply vendor customizations to a generated WiX installer definition"
)]
struct Args {
    /// Installer definition to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Where to write the customized definition
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
    /// Pin the product upgrade code instead of minting a random one
    #[arg(long, value_name = "UUID")]
    upgrade_code: Option<Uuid>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            debug!("invalid arguments: {}", err.kind());
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if fs::symlink_metadata(&args.input).is_err() {
        eprintln!(
            "Error: specified input file does not exist, path: [{}]",
            args.input.display()
        );
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

#[instrument(skip_all, fields(input = %args.input.display()))]
fn run(args: &Args) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input file {}", args.input.display()))?;
    let mut doc = wixtend::from_xml_str(&source)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let profile = args
        .upgrade_code
        .map_or_else(VendorProfile::default, VendorProfile::with_upgrade_code);
    let report = wixtend::extend(&mut doc, &profile)
        .context("input does not have the expected installer layout")?;
    info!(
        upgrade_code = %report.upgrade_code,
        components = report.components_after,
        help_link = report.help_link_updated,
        "installer definition extended"
    );

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let outcome = wixtend::write_ext_files(&cwd).with_context(|| {
        format!("failed to write vendor files under {}", cwd.display())
    })?;
    debug!(?outcome, "vendor files");

    let xml = wixtend::to_xml_string(&doc);
    fs::write(&args.output, xml)
        .with_context(|| format!("failed to write output file {}", args.output.display()))?;

    println!("Output XML written, path: [{}]", args.output.display());
    Ok(())
}
