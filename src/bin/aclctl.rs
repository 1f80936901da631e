use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ipgate::acl::{Acl, HostAcl, Members, NetAcl};
use ipgate::codec;
use ipgate::config::load_config;
use ipgate::error::CodecError;
use ipgate::observability::logging;

#[derive(Parser)]
#[command(name = "aclctl")]
#[command(about = "Inspect and maintain ipgate ACL files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an address is permitted by a flat ACL file
    Check {
        file: PathBuf,
        addr: IpAddr,
        /// Treat the file as a list of CIDR networks
        #[arg(short, long)]
        networks: bool,
    },
    /// Validate a flat ACL file and print it sorted
    Normalize {
        file: PathBuf,
        #[arg(short, long)]
        networks: bool,
        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        write: bool,
    },
    /// Print a flat ACL file in quoted wire form
    ToWire {
        file: PathBuf,
        #[arg(short, long)]
        networks: bool,
    },
    /// Print a quoted wire-form ACL as a flat file
    FromWire {
        wire: String,
        #[arg(short, long)]
        networks: bool,
    },
    /// Evaluate an address against a TOML policy document
    Policy { config: PathBuf, addr: IpAddr },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    logging::init("aclctl=info,ipgate=info")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, addr, networks } => {
            let permitted = if networks {
                check::<NetAcl>(&file, &addr)?
            } else {
                check::<HostAcl>(&file, &addr)?
            };
            println!("{addr}: {}", if permitted { "permitted" } else { "denied" });
            return Ok(if permitted { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Commands::Normalize { file, networks, write } => {
            if networks {
                normalize::<NetAcl>(&file, write)?;
            } else {
                normalize::<HostAcl>(&file, write)?;
            }
        }
        Commands::ToWire { file, networks } => {
            let wire = if networks {
                codec::encode_wire(&codec::load_file::<NetAcl>(&file)?)
            } else {
                codec::encode_wire(&codec::load_file::<HostAcl>(&file)?)
            };
            println!("{wire}");
        }
        Commands::FromWire { wire, networks } => {
            let flat = if networks {
                from_wire::<NetAcl>(&wire)?
            } else {
                from_wire::<HostAcl>(&wire)?
            };
            if !flat.is_empty() {
                println!("{flat}");
            }
        }
        Commands::Policy { config, addr } => {
            let config = load_config(&config)?;
            let mode = config.policy.mode;
            let permitted = config.into_acl().permitted(&addr);
            let report = serde_json::json!({
                "address": addr.to_string(),
                "mode": mode,
                "permitted": permitted,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(if permitted { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn check<A: Acl + Members + Default>(file: &Path, addr: &IpAddr) -> Result<bool, CodecError> {
    let acl: A = codec::load_file(file)?;
    Ok(acl.permitted(addr))
}

fn normalize<A: Members + Default>(file: &Path, write: bool) -> Result<(), CodecError> {
    let acl: A = codec::load_file(file)?;
    if write {
        codec::dump_file(&acl, file)?;
        tracing::info!(path = %file.display(), "ACL file normalized");
    } else {
        let flat = codec::encode_lines(&acl);
        if !flat.is_empty() {
            println!("{flat}");
        }
    }
    Ok(())
}

fn from_wire<A: Members + Default>(wire: &str) -> Result<String, CodecError> {
    let acl = A::default();
    codec::decode_wire(&acl, wire.trim())?;
    Ok(codec::encode_lines(&acl))
}
