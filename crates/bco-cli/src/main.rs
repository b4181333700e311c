// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `bco`: build, inspect and probe track collision files.
//!
//! # Usage
//! ```text
//! bco export track.obj -o track.bco --remap track.remap
//! bco info track.bco
//! bco height track.bco --x 120 --z -40
//! bco pick track.obj --origin 0,500,0 --direction 0.2,-1,0.1
//! bco verify track.bco
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.

#![deny(rust_2018_idioms)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod obj;

use std::path::PathBuf;

use anyhow::Result;
use bco_geom::Vec3;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bco", author, version, about = "Track collision index tool")]
struct Cli {
    /// Log at debug level (per-material resolution, excluded faces).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an OBJ mesh into a BCO file
    Export(ExportArgs),
    /// Print the header and section table of a BCO file
    Info {
        /// BCO file to inspect
        file: PathBuf,
        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Probe the ground height at (x, z)
    Height {
        /// BCO file, or an OBJ mesh indexed in memory
        file: PathBuf,
        /// World X
        #[arg(long, allow_negative_numbers = true)]
        x: f32,
        /// World Z
        #[arg(long, allow_negative_numbers = true)]
        z: f32,
        /// Start height; the topmost surface when omitted
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f32>,
        /// Look both up and down from --y and report the nearer surface
        #[arg(long, requires = "y")]
        closest: bool,
    },
    /// Cast a ray against every triangle
    Pick {
        /// BCO file, or an OBJ mesh indexed in memory
        file: PathBuf,
        /// Ray origin as X,Y,Z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        origin: Vec3,
        /// Ray direction as X,Y,Z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        direction: Vec3,
    },
    /// Decode, validate and re-encode a BCO file, checking the bytes match
    Verify {
        /// BCO file to check
        file: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Source mesh (Wavefront OBJ)
    mesh: PathBuf,
    /// Output BCO file
    #[arg(short, long)]
    out: PathBuf,
    /// Material remap table
    #[arg(long)]
    remap: Option<PathBuf>,
    /// Export settings (JSON); flags below override its fields
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Top-level cell size
    #[arg(long)]
    cell_size: Option<i32>,
    /// Quadtree levels below the top-level cells
    #[arg(long)]
    max_depth: Option<u32>,
    /// Split cells holding more triangles than this
    #[arg(long)]
    max_tri_count: Option<usize>,
    /// Swap Y and Z (Z-up source)
    #[arg(long)]
    flip_yz: bool,
}

fn parse_vec3(text: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected X,Y,Z, got `{text}`"));
    };
    let num = |s: &str| s.parse::<f32>().map_err(|e| format!("`{s}`: {e}"));
    Ok(Vec3::new(num(x)?, num(y)?, num(z)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Export(args) => commands::export(&args),
        Command::Info { file, json } => commands::info(&file, json),
        Command::Height {
            file,
            x,
            z,
            y,
            closest,
        } => commands::height(&file, x, z, y, closest),
        Command::Pick {
            file,
            origin,
            direction,
        } => commands::pick(&file, origin, direction),
        Command::Verify { file } => commands::verify(&file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn vec3_argument_parses_three_components() {
        assert_eq!(parse_vec3("1, -2.5,3"), Ok(Vec3::new(1.0, -2.5, 3.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,up").is_err());
    }
}
