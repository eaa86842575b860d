use clap::{Parser, Subcommand};
use std::path::PathBuf;
use bkflash_cli::commands::{decode, dump, locate, parse_u32, recover};
use bkflash_cli::telemetry;

#[derive(Parser)]
#[command(name = "bkflash")]
#[command(about = "BK72xx bootloader recovery from raw interleaved flash dumps", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the RBL header, rebuild the bootloader and recover its partition table.
    /// Falls back to a raw memory dump when no header is found.
    Recover {
        /// Raw flash dump (32:2 interleaved)
        flash: PathBuf,

        /// Logical capture of the resident bootloader (defaults to the decoded flash)
        #[arg(long, short)]
        memory: Option<PathBuf>,

        /// Address the memory capture is loaded at
        #[arg(long, default_value = "0", value_parser = parse_u32)]
        base: u32,

        /// Write the reconstructed image here
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Largest accepted raw size
        #[arg(long, value_parser = parse_u32)]
        size_ceiling: Option<u32>,

        /// Partition record slots to scan back from the image end
        #[arg(long)]
        attempts: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Hex dump the reconstructed image
        #[arg(long)]
        dump: bool,
    },
    /// Strip the interleave from a whole dump
    Decode {
        flash: PathBuf,

        #[arg(long, short)]
        output: PathBuf,
    },
    /// Search for the RBL header only
    Locate {
        flash: PathBuf,
    },
    /// Hex dump a range of any file
    Dump {
        path: PathBuf,

        #[arg(long, default_value = "0", value_parser = parse_u32)]
        offset: u32,

        #[arg(long, value_parser = parse_u32)]
        length: Option<u32>,

        #[arg(long, default_value_t = 16)]
        width: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose);
    tracing::info!("BK72xx Bootloader Dump");

    match cli.command {
        Commands::Recover {
            flash,
            memory,
            base,
            output,
            size_ceiling,
            attempts,
            json,
            dump,
        } => recover::run(&recover::RecoverOptions {
            flash,
            memory,
            base,
            output,
            size_ceiling,
            attempts,
            json,
            dump,
        }),
        Commands::Decode { flash, output } => decode::run(&flash, &output).map(|_| ()),
        Commands::Locate { flash } => locate::run(&flash),
        Commands::Dump {
            path,
            offset,
            length,
            width,
        } => dump::run(&path, offset, length, width),
    }
}
