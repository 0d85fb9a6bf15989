//! shader_sign - maintain replacement shaders on disk
//!
//! Usage:
//!   shader_sign sign <files..>    # Recompute the DXBC checksum of each file in place
//!   shader_sign check <files..>   # Report whether each file is signed, and its fingerprint

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shader_injector::{fingerprint, logger, signature, InjectorError, LogConfig};
use tracing::error;

#[derive(Parser)]
#[command(name = "shader_sign")]
#[command(about = "Sign and verify DXBC shader containers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute the checksum of each container in place
    Sign {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Verify the checksum of each container
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct Report {
    signed: bool,
    fingerprint: u32,
    len: usize,
}

fn sign_file(path: &Path) -> Result<(), InjectorError> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    signature::sign_in_place(&mut buf)?;

    file.seek(SeekFrom::Start(0))?;
    file.write_all(&buf)?;
    Ok(())
}

fn check_file(path: &Path) -> Result<Report, InjectorError> {
    let buf = std::fs::read(path)?;

    Ok(Report {
        signed: signature::is_signed(&buf)?,
        fingerprint: fingerprint(&buf),
        len: buf.len(),
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logger::init(&LogConfig::default()) {
        eprintln!("{err}");
    }

    let mut failed = false;
    match cli.command {
        Commands::Sign { files } => {
            for path in files {
                match sign_file(&path) {
                    Ok(()) => println!("{}: signed", path.display()),
                    Err(err) => {
                        error!("{}: {err}", path.display());
                        failed = true;
                    }
                }
            }
        }
        Commands::Check { files } => {
            for path in files {
                match check_file(&path) {
                    Ok(report) => {
                        let state = if report.signed { "signed" } else { "unsigned" };
                        println!(
                            "{}: {state}, {} bytes, fingerprint {}",
                            path.display(),
                            report.len,
                            report.fingerprint
                        );
                        failed |= !report.signed;
                    }
                    Err(err) => {
                        error!("{}: {err}", path.display());
                        failed = true;
                    }
                }
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
