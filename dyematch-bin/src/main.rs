//! Match an image's dominant colors, or a single color, against a dye catalog.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use clap::Parser;
use colored::Colorize;
use dyematch::{accessibility, color, pipeline, sample, Catalog, DyeEntry, ExtractionRequest, Match};
use palette::Srgb;
use std::{fs, path::Path, process::ExitCode, time::Instant};
use thiserror::Error;

/// Record the running time of a function and print the elapsed time
macro_rules! time {
	($name: literal, $verbose: expr, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		if $verbose {
			println!("{} took {}ms", $name, start.elapsed().as_millis());
		}
		result
	}};
}

/// Error cases for a CLI run
#[derive(Debug, Error)]
enum CliError {
	/// Failed to read or decode the image file
	#[error("failed to load the image: {0}")]
	Image(#[from] image::ImageError),
	/// Failed to read the catalog file
	#[error("failed to read the catalog file: {0}")]
	CatalogRead(#[from] std::io::Error),
	/// The catalog file failed parsing or validation
	#[error("invalid catalog: {0}")]
	Catalog(#[from] dyematch::CatalogError),
	/// A color argument was not valid hex
	#[error("invalid color argument: {0}")]
	Color(#[from] dyematch::ParseError),
	/// A matching mode was requested without a catalog
	#[error("--catalog is required unless --analyze is used")]
	MissingCatalog,
}

fn main() -> ExitCode {
	let options = Options::parse();

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = run(&options) {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Dispatch to the mode selected on the command line
fn run(options: &Options) -> Result<(), CliError> {
	if !options.analyze.is_empty() {
		return run_analyze(options);
	}

	let catalog = load_catalog(options)?;

	if let Some(hex) = &options.color {
		run_single(hex, &catalog, options)
	} else if let Some(image) = &options.image {
		run_palette(image, &catalog, options)
	} else {
		// clap requires one of image, --color, or --analyze
		Ok(())
	}
}

/// Read and validate the dye catalog file
fn load_catalog(options: &Options) -> Result<Catalog, CliError> {
	let path = options.catalog.as_ref().ok_or(CliError::MissingCatalog)?;
	let json = fs::read_to_string(path)?;
	Ok(Catalog::from_json_str(&json)?)
}

/// Build the catalog filter predicate from the CLI filter options
fn entry_filter(options: &Options) -> impl Fn(&DyeEntry) -> bool + '_ {
	move |entry| {
		!options
			.exclude_categories
			.iter()
			.any(|category| category.eq_ignore_ascii_case(&entry.category))
			&& options.max_cost.map_or(true, |max| entry.cost <= max)
	}
}

/// Extract the image's palette and print the closest dye per cluster
fn run_palette(path: &Path, catalog: &Catalog, options: &Options) -> Result<(), CliError> {
	let img = time!("Image loading", options.verbose, image::open(path))?;
	let rgba = img.into_rgba8();

	let pixels = time!(
		"Pixel sampling",
		options.verbose,
		sample::sample_rgba(rgba.as_raw(), options.max_pixels)
	);
	if options.verbose {
		println!("Kept {} visible pixels", pixels.len());
	}
	if pixels.is_empty() {
		println!("no visible pixels in the image");
		return Ok(());
	}

	let mut request = ExtractionRequest::palette(pixels, options.k);
	request.metric = options.metric.into();
	request.trials = options.trials;
	request.seed = options.seed;

	let result = time!(
		"Palette matching",
		options.verbose,
		pipeline::run(&request, catalog, entry_filter(options))
	);

	if result.matches.is_empty() {
		println!("no matches found");
	}
	for found in &result.matches {
		print_match(found, options);
	}

	Ok(())
}

/// Rank the dyes closest to a single color
fn run_single(hex: &str, catalog: &Catalog, options: &Options) -> Result<(), CliError> {
	let mut request = ExtractionRequest::single(color::parse_hex(hex)?);
	request.metric = options.metric.into();
	request.max_distance = options.max_distance;
	request.max_results = options.max_results;

	let result = time!(
		"Matching",
		options.verbose,
		pipeline::run(&request, catalog, entry_filter(options))
	);

	if result.matches.is_empty() {
		println!("no matches found");
	}
	for found in &result.matches {
		print_match(found, options);
	}

	Ok(())
}

/// Print the accessibility report for the selected colors
fn run_analyze(options: &Options) -> Result<(), CliError> {
	let colors = options
		.analyze
		.iter()
		.map(|hex| color::parse_hex(hex))
		.collect::<Result<Vec<_>, _>>()?;

	let analysis = time!(
		"Analysis",
		options.verbose,
		accessibility::analyze_set(&colors, options.metric.into())
	);

	for report in &analysis.per_color {
		println!("{}", render_color(report.color, options));
		println!(
			"  on white {:.2} ({})  on black {:.2} ({})",
			report.contrast_on_white, report.wcag_on_white, report.contrast_on_black, report.wcag_on_black
		);
		for (vision, simulated) in report.simulated {
			println!("  {vision:<14} {}", render_color(simulated, options));
		}
		for warning in &report.warnings {
			println!("  warning: {warning}");
		}
	}

	for pair in &analysis.pairs {
		println!(
			"{} vs {}",
			render_color(pair.a, options),
			render_color(pair.b, options)
		);
		println!(
			"  contrast {:.2} ({})  distinguishability {} ({})",
			pair.contrast, pair.wcag, pair.distinguishability, pair.severity
		);
		for (vision, score) in pair.simulated {
			println!("  {vision:<14} {score:>3}");
		}
		for warning in &pair.warnings {
			println!("  warning: {warning}");
		}
	}

	Ok(())
}

/// Print one match line
fn print_match(found: &Match, options: &Options) {
	let source = render_color(found.source, options);
	let matched = render_color(found.entry.color, options);
	let dominance = found
		.dominance
		.map_or_else(String::new, |share| format!(" {share:>3}%"));

	println!(
		"{source}{dominance} -> {matched} {} [{}] distance {:.2}",
		found.entry.name, found.entry.id, found.distance
	);
}

/// Render a color in the selected output format
fn render_color(color: Srgb<u8>, options: &Options) -> String {
	match options.output {
		FormatOutput::Hex => format!("#{color:X}"),
		FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
		FormatOutput::Swatch => format!(
			"{} #{color:X}",
			"  ".on_truecolor(color.red, color.green, color.blue)
		),
	}
}
