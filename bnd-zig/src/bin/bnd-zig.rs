//! CLI entry point for bnd-zig.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use bnd_zig::config::GenOptions;

/// bnd-zig — generate Zig bindings from a C API declaration list.
#[derive(Parser, Debug)]
#[command(name = "bnd-zig", version, about)]
struct Cli {
    /// Path to the bnd-zig.toml configuration file.
    #[arg(default_value = "bnd-zig.toml")]
    config: PathBuf,

    /// Output file path (overrides config; single-module configs only).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translate a single JSON declaration list instead of a config.
    #[arg(long, conflicts_with = "config")]
    input: Option<PathBuf>,

    /// With --input: emit the `init_with` helper and per-struct `init`.
    #[arg(long, requires = "input")]
    init_helper: bool,

    /// With --input: emit wrapper placeholders after extern functions.
    #[arg(long, requires = "input")]
    wrappers: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bnd_zig=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.input {
        Some(input) => {
            let output = cli
                .output
                .unwrap_or_else(|| input.with_extension("zig"));
            let options = GenOptions {
                init_helper: cli.init_helper,
                wrappers: cli.wrappers,
                ..GenOptions::default()
            };
            bnd_zig::generate_file(&input, &output, &options)?;
        }
        None => {
            bnd_zig::run(&cli.config, cli.output.as_deref())?;
        }
    }
    Ok(())
}
