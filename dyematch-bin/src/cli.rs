//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use dyematch::DistanceMetric;
use std::path::PathBuf;

/// Supported output formats for printed colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// True color background swatch followed by the hexcode
	Swatch,
}

/// Distance metrics selectable from the command line
#[derive(Copy, Clone, ValueEnum)]
pub enum MetricOption {
	/// Euclidean distance between 8-bit sRGB channels
	EuclideanRgb,
	/// Delta E 1976 in the CIELAB color space
	DeltaELab,
	/// Euclidean distance in the Oklab color space
	Oklab,
}

impl From<MetricOption> for DistanceMetric {
	fn from(option: MetricOption) -> Self {
		match option {
			MetricOption::EuclideanRgb => DistanceMetric::EuclideanRgb,
			MetricOption::DeltaELab => DistanceMetric::DeltaELab,
			MetricOption::Oklab => DistanceMetric::Oklab,
		}
	}
}

/// Match an image's dominant colors, or a single color, against a dye catalog.
///
/// Palette mode extracts the image's dominant colors by k-means clustering and
/// prints the closest dye for each. Single mode ranks the dyes closest to one
/// color. The analyze mode reports contrast and color vision deficiency
/// problems for a small set of colors.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image (palette mode)
	#[arg(required_unless_present_any = ["color", "analyze"])]
	pub image: Option<PathBuf>,

	/// A hex color to match directly instead of an image (single mode)
	#[arg(short, long, conflicts_with = "image")]
	pub color: Option<String>,

	/// Hex colors to run the accessibility report on, comma separated
	#[arg(
		short,
		long,
		value_delimiter = ',',
		num_args = 2..=5,
		conflicts_with_all = ["image", "color"]
	)]
	pub analyze: Vec<String>,

	/// The path to the dye catalog JSON file
	#[arg(long, required_unless_present = "analyze")]
	pub catalog: Option<PathBuf>,

	/// The (maximum) number of palette colors to extract
	#[arg(short, default_value_t = 5)]
	pub k: u8,

	/// The color distance metric for clustering, matching, and ranking
	#[arg(short, long, default_value = "oklab")]
	pub metric: MetricOption,

	/// Drop matches farther than this distance, in the metric's units
	#[arg(short = 'd', long)]
	pub max_distance: Option<f32>,

	/// The maximum number of matches to print in single-color mode
	#[arg(short = 'r', long, default_value_t = 5)]
	pub max_results: usize,

	/// Exclude catalog entries in this category (repeatable)
	#[arg(long = "exclude-category")]
	pub exclude_categories: Vec<String>,

	/// Exclude catalog entries costing more than this
	#[arg(long)]
	pub max_cost: Option<u32>,

	/// The number of clustering trials to run, keeping the best
	///
	/// k-means can get stuck in a local minimum, so a few extra trials can
	/// give better palettes at the cost of running time.
	#[arg(short = 'n', long, default_value_t = 1)]
	pub trials: u32,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// The maximum number of pixels sampled from the image
	///
	/// Larger images are decimated with a uniform stride down to this budget.
	/// Raising it improves accuracy and increases running time.
	#[arg(short = 'p', long, default_value_t = dyematch::sample::DEFAULT_SAMPLE_BUDGET)]
	pub max_pixels: usize,

	/// The format to print colors in
	#[arg(short, long, default_value = "swatch")]
	pub output: FormatOutput,

	/// Print additional information, such as per-step timings
	#[arg(long)]
	pub verbose: bool,
}
