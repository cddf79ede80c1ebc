//! Wires sampling, clustering, and matching into one request/response call.
//!
//! [`run`] is a pure function of its request, catalog, and filter: it never
//! mutates the catalog, never retries, and produces identical results for
//! identical input. Deciding *when* to run is entirely the caller's concern.

use crate::catalog::{Catalog, DyeEntry};
use crate::kmeans::{self, Cluster, ClusterConfig};
use crate::matcher::{self, Match};
use crate::metric::DistanceMetric;
use palette::Srgb;

/// What an extraction request operates on
#[derive(Debug, Clone)]
pub enum ExtractionInput {
	/// Sampled pixels to reduce to a palette before matching
	Palette {
		/// Visible pixels, already alpha-filtered and stride-sampled
		pixels: Vec<Srgb<u8>>,
		/// Number of palette colors to extract
		k: u8,
	},
	/// A single color to match directly
	Single(Srgb<u8>),
}

/// Parameters for one pipeline run
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
	/// Input pixels or color
	pub input: ExtractionInput,
	/// Distance metric used for clustering, matching, and ranking
	pub metric: DistanceMetric,
	/// Drop single-mode matches farther than this, in the metric's units
	pub max_distance: Option<f32>,
	/// Keep at most this many matches in single mode
	pub max_results: usize,
	/// Number of clustering trials in palette mode
	pub trials: u32,
	/// Seed for clustering initialization
	pub seed: u64,
}

impl ExtractionRequest {
	/// A palette-mode request with default parameters
	#[must_use]
	pub fn palette(pixels: Vec<Srgb<u8>>, k: u8) -> Self {
		Self {
			input: ExtractionInput::Palette { pixels, k },
			metric: DistanceMetric::default(),
			max_distance: None,
			max_results: 5,
			trials: 1,
			seed: 0,
		}
	}

	/// A single-color request with default parameters
	#[must_use]
	pub fn single(color: Srgb<u8>) -> Self {
		Self {
			input: ExtractionInput::Single(color),
			metric: DistanceMetric::default(),
			max_distance: None,
			max_results: 5,
			trials: 1,
			seed: 0,
		}
	}
}

/// Matches produced by one pipeline run
#[derive(Debug, Clone)]
pub struct ExtractionResult<'a> {
	/// Palette mode: the extracted clusters, most dominant first.
	/// Empty in single mode.
	pub clusters: Vec<Cluster>,
	/// Palette mode: the closest dye per cluster, ordered by dominance
	/// descending. Single mode: in-range dyes ordered by ascending distance.
	pub matches: Vec<Match<'a>>,
}

/// Run one extraction request against a catalog.
///
/// An empty catalog, a fully rejecting filter, or input with no visible
/// pixels all yield an empty result rather than an error, so callers can
/// present "no matches found" without exception handling.
pub fn run<'a, F>(
	request: &ExtractionRequest,
	catalog: &'a Catalog,
	filter: F,
) -> ExtractionResult<'a>
where
	F: Fn(&DyeEntry) -> bool,
{
	match &request.input {
		ExtractionInput::Single(color) => {
			let max_distance = request.max_distance.unwrap_or(f32::INFINITY);
			let matches = matcher::find_within(
				*color,
				catalog,
				max_distance,
				request.max_results,
				request.metric,
				&filter,
			);

			ExtractionResult { clusters: Vec::new(), matches }
		},
		ExtractionInput::Palette { pixels, k } => {
			let mut config = ClusterConfig::new(*k, request.metric);
			config.trials = request.trials;
			config.seed = request.seed;

			let clusters = kmeans::extract_palette(pixels, &config, request.metric);

			let matches = clusters
				.iter()
				.filter_map(|cluster| {
					matcher::find_closest(cluster.centroid, catalog, request.metric, &filter)
						.map(|found| Match { dominance: Some(cluster.dominance), ..found })
				})
				.collect();

			ExtractionResult { clusters, matches }
		},
	}
}
