//! CLI binary for GPX Densify
//!
//! `gpx-densify INPUT OUTPUT` reads a GPX file, fills every time gap longer
//! than one second with interpolated points and writes the result.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use env_logger::Env;
use gpx_densify::{densify_file, DensifyReport, InterpolationOptions};
use std::path::PathBuf;

fn build_command() -> Command {
    Command::new("gpx-densify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fill time gaps in GPX tracks with linearly interpolated points, one per second.")
        .arg(
            Arg::new("input")
                .help("Source GPX file")
                .required(true)
                .index(1)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .help("Destination GPX file (parent directories are created)")
                .required(true)
                .index(2)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-elevation")
                .long("no-elevation")
                .help("Do not interpolate elevation for synthetic points")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging and print a run summary")
                .action(ArgAction::SetTrue),
        )
}

fn print_summary(report: &DensifyReport) {
    println!("Tracks: {}", report.tracks);
    println!(
        "Segments: {} ({} too short to interpolate)",
        report.segments, report.passthrough_segments
    );
    println!(
        "Points: {} -> {} ({} gaps filled, {} pairs without usable time)",
        report.original_points,
        report.output_points(),
        report.filled_gaps,
        report.skipped_pairs
    );
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_flag("debug");
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let input = matches
        .get_one::<PathBuf>("input")
        .context("missing input path")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("missing output path")?;

    let options = InterpolationOptions {
        interpolate_elevation: !matches.get_flag("no-elevation"),
    };

    if debug {
        println!("Input: {}", input.display());
        println!("Output: {}", output.display());
    }

    let report = densify_file(input, output, &options)
        .with_context(|| format!("Failed to densify {}", input.display()))?;

    if report.is_unchanged() {
        eprintln!("Warning: No <trkseg> found or no changes made.");
    }
    if debug {
        print_summary(&report);
    }

    println!("Interpolated GPX saved to: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition() {
        build_command().debug_assert();
    }

    #[test]
    fn test_requires_exactly_two_paths() {
        assert!(build_command()
            .try_get_matches_from(["gpx-densify", "in.gpx"])
            .is_err());
        assert!(build_command()
            .try_get_matches_from(["gpx-densify", "a.gpx", "b.gpx", "c.gpx"])
            .is_err());

        let matches = build_command()
            .try_get_matches_from(["gpx-densify", "a.gpx", "b.gpx", "--no-elevation"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("output"),
            Some(&PathBuf::from("b.gpx"))
        );
        assert!(matches.get_flag("no-elevation"));
        assert!(!matches.get_flag("debug"));
    }
}
