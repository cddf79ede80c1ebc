//! Palette extraction by k-means clustering in the active metric's working space.

use crate::metric::{self, DistanceMetric};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Largest number of clusters a palette request may ask for
pub const MAX_CLUSTERS: u8 = 5;

/// Default iteration cap for a single clustering trial
pub const DEFAULT_MAX_ITER: u32 = 20;

/// Default convergence threshold as a fraction of the metric's white-black
/// distance, so the knob means the same thing in every working space
const DEFAULT_CONVERGENCE_FACTOR: f32 = 0.01;

/// Parameters for one palette extraction
#[derive(Debug, Clone, Copy)]
pub struct ClusterConfig {
	/// Number of clusters to aim for, clamped to `1..=MAX_CLUSTERS`
	pub k: u8,
	/// Number of seeded trials to run, keeping the lowest-variance result
	pub trials: u32,
	/// Total centroid movement below which a trial has converged, in
	/// working-space units
	pub convergence: f32,
	/// Iteration cap per trial
	pub max_iter: u32,
	/// Seed for the initial centroid selection
	pub seed: u64,
}

impl ClusterConfig {
	/// A config with defaults scaled to the given metric's working space
	#[must_use]
	pub fn new(k: u8, metric: DistanceMetric) -> Self {
		Self {
			k,
			trials: 1,
			convergence: metric.max_distance() * DEFAULT_CONVERGENCE_FACTOR,
			max_iter: DEFAULT_MAX_ITER,
			seed: 0,
		}
	}
}

/// A cluster of similar pixels produced by palette extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
	/// Average color of the cluster's member pixels
	pub centroid: Srgb<u8>,
	/// Number of sampled pixels assigned to this cluster
	pub count: u32,
	/// Share of all sampled pixels in this cluster, `0..=100`
	pub dominance: u8,
}

/// Deduplicated working-space colors with the number of source pixels for each
#[derive(Debug, Clone)]
struct ColorCounts {
	/// Unique colors projected into the metric's working space
	colors: Vec<[f32; 3]>,
	/// The number of duplicate source pixels for each color
	counts: Vec<u32>,
}

impl ColorCounts {
	/// Deduplicate pixels and project them into the metric's working space.
	///
	/// Projecting into Lab or Oklab is expensive; memoizing by packed sRGB
	/// value nearly halves the time and groups identical pixels, which also
	/// speeds up k-means.
	fn project(pixels: &[Srgb<u8>], metric: DistanceMetric) -> Self {
		let mut data = Self { colors: Vec::new(), counts: Vec::new() };

		// Packed sRGB -> data index
		let mut memo: HashMap<u32, u32> = HashMap::new();

		for srgb in pixels {
			let key = srgb.into_u32::<palette::rgb::channels::Rgba>();
			let index = *memo.entry(key).or_insert_with(|| {
				// data.len() < u32::MAX because there are only (2^8)^3 possible sRGB colors
				#[allow(clippy::cast_possible_truncation)]
				let index = data.colors.len() as u32;

				data.colors.push(metric.project(*srgb));
				data.counts.push(0);
				index
			});

			data.counts[index as usize] += 1;
		}

		data
	}

	/// Iterate over each unique color and its pixel count
	fn pairs(&self) -> impl Iterator<Item = ([f32; 3], u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}

	/// Number of unique colors
	fn num_colors(&self) -> u32 {
		// bounded by the number of possible sRGB colors
		#[allow(clippy::cast_possible_truncation)]
		{
			self.colors.len() as u32
		}
	}
}

/// Bookkeeping for each k-means data point
struct PointData {
	/// Center assignment for this data point
	assignment: Vec<u8>,
	/// Weight of each data point used to randomly select starting centroids in k-means++
	weight: Vec<f32>,
}

impl PointData {
	/// Create a [`PointData`] with the given number of data points
	fn new(n: u32) -> Self {
		let n = n as usize;
		Self {
			assignment: vec![0; n],
			weight: vec![f32::INFINITY; n],
		}
	}

	/// Reset data for the next k-means trial
	fn reset(&mut self) {
		// assignments are corrected every iteration
		self.weight.fill(f32::INFINITY);
	}
}

/// Data for each center/centroid
struct CenterData {
	/// The centroid point in working space
	centroid: Vec<[f32; 3]>,
	/// Vector sum for all data points in this center
	sum: Vec<[f64; 3]>,
	/// Number of points in this center
	count: Vec<u32>,
}

impl CenterData {
	/// Create a [`CenterData`] with the given number of centers
	fn new(k: u8) -> Self {
		let k = usize::from(k);
		Self {
			centroid: Vec::new(),
			sum: vec![[0.0; 3]; k],
			count: vec![0; k],
		}
	}

	/// Reset data for the next k-means trial
	fn reset(&mut self) {
		self.centroid.clear();
		self.sum.fill([0.0; 3]);
		self.count.fill(0);
	}
}

/// Holds all the state reused across k-means trials
struct KmeansState {
	/// Data for each center
	centers: CenterData,
	/// Data for each point
	points: PointData,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with `k` centers and `n` data points
	fn new(k: u8, n: u32) -> Self {
		Self {
			centers: CenterData::new(k),
			points: PointData::new(n),
		}
	}
}

/// Result of a single k-means trial
struct KmeansTrial {
	/// Variance achieved by these centroids; lower indicates a better fit
	variance: f64,
	/// Final centroids with at least one member, in working space
	centroids: Vec<[f32; 3]>,
	/// Number of pixels in each surviving centroid
	counts: Vec<u32>,
}

impl KmeansTrial {
	/// An empty trial, representing that k-means could not run
	const fn empty() -> Self {
		Self {
			variance: 0.0,
			centroids: Vec::new(),
			counts: Vec::new(),
		}
	}
}

/// Choose the starting centroids using the k-means++ algorithm
fn kmeans_plus_plus(
	k: u8,
	rng: &mut impl Rng,
	colors: &[[f32; 3]],
	centroids: &mut Vec<[f32; 3]>,
	weights: &mut [f32],
) {
	use rand::{
		distributions::{WeightedError::*, WeightedIndex},
		prelude::Distribution,
	};

	// Pick any random first centroid
	centroids.push(colors[rng.gen_range(0..colors.len())]);

	// Pick each next centroid with a weighted probability based off the squared distance to its closest centroid
	for i in 1..usize::from(k) {
		let centroid = centroids[i - 1];
		for (weight, &color) in weights.iter_mut().zip(colors) {
			*weight = f32::min(*weight, metric::squared_distance(color, centroid));
		}

		match WeightedIndex::new(&*weights) {
			Ok(sampler) => centroids.push(colors[sampler.sample(rng)]),
			Err(AllWeightsZero) => return, // all points exactly match a centroid
			Err(InvalidWeight | NoItem | TooMany) => {
				unreachable!("distances are >= 0 and colors.len() is in 1..=2.pow(24)")
			},
		}
	}
}

/// Initializes the center sums and counts based off the initial assignment
fn compute_initial_sums(data: &ColorCounts, centers: &mut CenterData, assignment: &[u8]) {
	for ((color, n), &center) in data.pairs().zip(assignment) {
		let i = usize::from(center);
		let nf = f64::from(n);
		let sum = &mut centers.sum[i];
		sum[0] += nf * f64::from(color[0]);
		sum[1] += nf * f64::from(color[1]);
		sum[2] += nf * f64::from(color[2]);
		centers.count[i] += n;
	}
}

/// For each data point, move it to its nearest center, updating the center
/// sums and counts incrementally
fn update_assignments(data: &ColorCounts, centers: &mut CenterData, points: &mut PointData) {
	for ((color, n), center) in data.pairs().zip(&mut points.assignment) {
		let mut min_dist = f32::INFINITY;
		let mut min_center = *center;
		// ties keep the lowest center index
		for (i, &centroid) in centers.centroid.iter().enumerate() {
			let dist = metric::squared_distance(color, centroid);
			if dist < min_dist {
				min_dist = dist;
				// i < centroid.len() <= MAX_CLUSTERS
				#[allow(clippy::cast_possible_truncation)]
				{
					min_center = i as u8;
				}
			}
		}

		// Move this point to its new center
		if min_center != *center {
			let nf = f64::from(n);
			let c0 = nf * f64::from(color[0]);
			let c1 = nf * f64::from(color[1]);
			let c2 = nf * f64::from(color[2]);

			let old_sum = &mut centers.sum[usize::from(*center)];
			old_sum[0] -= c0;
			old_sum[1] -= c1;
			old_sum[2] -= c2;
			centers.count[usize::from(*center)] -= n;

			let new_sum = &mut centers.sum[usize::from(min_center)];
			new_sum[0] += c0;
			new_sum[1] += c1;
			new_sum[2] += c2;
			centers.count[usize::from(min_center)] += n;

			*center = min_center;
		}
	}
}

/// The unique color farthest from its nearest centroid, used to re-seed a
/// center that lost all of its members
fn farthest_point(data: &ColorCounts, centroids: &[[f32; 3]]) -> [f32; 3] {
	let mut farthest = centroids[0];
	let mut max_dist = f32::NEG_INFINITY;
	for color in &data.colors {
		let dist = centroids
			.iter()
			.map(|&centroid| metric::squared_distance(*color, centroid))
			.fold(f32::INFINITY, f32::min);

		if dist > max_dist {
			max_dist = dist;
			farthest = *color;
		}
	}

	farthest
}

/// For each center, recompute its centroid as the mean of its members and
/// return the total distance moved by all centroids.
///
/// A center with no members is re-seeded from the point farthest from every
/// centroid, keeping the iteration fully deterministic.
fn update_centroids(data: &ColorCounts, centers: &mut CenterData) -> f32 {
	let mut total_delta = 0.0;
	for i in 0..centers.centroid.len() {
		let new_centroid = if centers.count[i] == 0 {
			farthest_point(data, &centers.centroid)
		} else {
			let n = f64::from(centers.count[i]);
			let sum = centers.sum[i];
			// Sums need the greater precision, but the average fits back in an f32
			#[allow(clippy::cast_possible_truncation)]
			{
				[(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
			}
		};

		total_delta += metric::squared_distance(centers.centroid[i], new_centroid).sqrt();
		centers.centroid[i] = new_centroid;
	}

	total_delta
}

/// Run a single trial of k-means
fn kmeans(
	data: &ColorCounts,
	KmeansState { centers, points }: &mut KmeansState,
	k: u8,
	config: &ClusterConfig,
	seed: u64,
) -> KmeansTrial {
	let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed);
	kmeans_plus_plus(k, &mut rng, &data.colors, &mut centers.centroid, &mut points.weight);
	compute_initial_sums(data, centers, &points.assignment);

	let mut iterations = 0;
	let mut total_delta = f32::INFINITY;
	while iterations < config.max_iter && total_delta > config.convergence {
		update_assignments(data, centers, points);
		total_delta = update_centroids(data, centers);
		iterations += 1;
	}

	let variance = data
		.pairs()
		.zip(&points.assignment)
		.map(|((color, n), &center)| {
			let centroid = centers.centroid[usize::from(center)];
			f64::from(n) * f64::from(metric::squared_distance(color, centroid))
		})
		.sum();

	let centroids = centers
		.centroid
		.iter()
		.zip(&centers.count)
		.filter_map(|(&color, &count)| if count == 0 { None } else { Some(color) })
		.collect();

	let counts = centers.count.iter().copied().filter(|&n| n > 0).collect();

	centers.reset();
	points.reset();

	KmeansTrial { variance, centroids, counts }
}

/// Integer dominance percentages summing to exactly 100.
///
/// Uses largest-remainder rounding: floor every share, then hand out the
/// leftover points in order of descending fractional part.
fn dominance_shares(counts: &[u32]) -> Vec<u8> {
	let total: u64 = counts.iter().copied().map(u64::from).sum();

	let mut shares: Vec<(usize, u64, u64)> = counts
		.iter()
		.enumerate()
		.map(|(i, &n)| {
			let scaled = u64::from(n) * 100;
			(i, scaled / total, scaled % total)
		})
		.collect();

	let assigned: u64 = shares.iter().map(|&(_, floor, _)| floor).sum();
	let mut leftover = 100 - assigned;

	shares.sort_by(|&(i, _, rem_i), &(j, _, rem_j)| rem_j.cmp(&rem_i).then(i.cmp(&j)));
	for share in &mut shares {
		if leftover == 0 {
			break;
		}
		share.1 += 1;
		leftover -= 1;
	}
	shares.sort_by_key(|&(i, ..)| i);

	// each share is <= 100
	#[allow(clippy::cast_possible_truncation)]
	shares.into_iter().map(|(_, dominance, _)| dominance as u8).collect()
}

/// Extract up to `config.k` representative clusters from the given pixels.
///
/// Clusters are sorted by dominance descending, and their dominances sum to
/// exactly 100. When the input has fewer distinct colors than `k`, fewer
/// clusters are returned; duplicate centroids are never fabricated. An empty
/// pixel slice, or `trials` of zero, yields no clusters. Identical input and
/// config always produce identical output.
#[must_use]
pub fn extract_palette(
	pixels: &[Srgb<u8>],
	config: &ClusterConfig,
	metric: DistanceMetric,
) -> Vec<Cluster> {
	if pixels.is_empty() || config.trials == 0 {
		return Vec::new();
	}

	let k = config.k.clamp(1, MAX_CLUSTERS);
	let data = ColorCounts::project(pixels, metric);
	let mut state = KmeansState::new(k, data.num_colors());

	let best = (0..config.trials)
		.map(|trial| kmeans(&data, &mut state, k, config, config.seed ^ u64::from(trial)))
		.min_by(|x, y| f64::total_cmp(&x.variance, &y.variance))
		.unwrap_or_else(KmeansTrial::empty);

	let mut clusters: Vec<([f32; 3], u32)> =
		best.centroids.into_iter().zip(best.counts).collect();
	clusters.sort_by_key(|&(_, count)| std::cmp::Reverse(count));

	let counts: Vec<u32> = clusters.iter().map(|&(_, count)| count).collect();
	let shares = dominance_shares(&counts);

	clusters
		.into_iter()
		.zip(shares)
		.map(|((centroid, count), dominance)| Cluster {
			centroid: metric.restore(centroid),
			count,
			dominance,
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Pixels repeated per color, most common first
	fn weighted_pixels(colors: &[(Srgb<u8>, usize)]) -> Vec<Srgb<u8>> {
		let mut pixels = Vec::new();
		for &(color, n) in colors {
			pixels.extend(std::iter::repeat(color).take(n));
		}
		pixels
	}

	#[test]
	fn solid_image_yields_one_full_cluster() {
		let red = Srgb::new(255, 0, 0);
		let pixels = weighted_pixels(&[(red, 100)]);
		let config = ClusterConfig::new(3, DistanceMetric::EuclideanRgb);

		let clusters = extract_palette(&pixels, &config, DistanceMetric::EuclideanRgb);

		assert_eq!(
			clusters,
			vec![Cluster { centroid: red, count: 100, dominance: 100 }]
		);
	}

	#[test]
	fn separable_colors_recover_exact_centroids_and_shares() {
		let red = Srgb::new(255, 0, 0);
		let green = Srgb::new(0, 255, 0);
		let blue = Srgb::new(0, 0, 255);
		let pixels = weighted_pixels(&[(red, 50), (green, 30), (blue, 21)]);
		let config = ClusterConfig::new(3, DistanceMetric::EuclideanRgb);

		let clusters = extract_palette(&pixels, &config, DistanceMetric::EuclideanRgb);

		assert_eq!(
			clusters,
			vec![
				Cluster { centroid: red, count: 50, dominance: 49 },
				Cluster { centroid: green, count: 30, dominance: 30 },
				Cluster { centroid: blue, count: 21, dominance: 21 },
			]
		);
	}

	#[test]
	fn dominances_always_sum_to_one_hundred() {
		let pixels = weighted_pixels(&[
			(Srgb::new(250, 10, 10), 37),
			(Srgb::new(10, 250, 10), 23),
			(Srgb::new(10, 10, 250), 19),
			(Srgb::new(240, 240, 10), 11),
			(Srgb::new(10, 240, 240), 7),
		]);

		for metric in [DistanceMetric::EuclideanRgb, DistanceMetric::Oklab] {
			let config = ClusterConfig::new(5, metric);
			let clusters = extract_palette(&pixels, &config, metric);

			assert!(!clusters.is_empty());
			let total: u32 = clusters.iter().map(|c| u32::from(c.dominance)).sum();
			assert_eq!(total, 100);
		}
	}

	#[test]
	fn fewer_distinct_colors_than_k_yields_fewer_clusters() {
		let white = Srgb::new(255, 255, 255);
		let black = Srgb::new(0, 0, 0);
		let pixels = weighted_pixels(&[(white, 60), (black, 40)]);
		let config = ClusterConfig::new(5, DistanceMetric::EuclideanRgb);

		let clusters = extract_palette(&pixels, &config, DistanceMetric::EuclideanRgb);

		assert_eq!(
			clusters,
			vec![
				Cluster { centroid: white, count: 60, dominance: 60 },
				Cluster { centroid: black, count: 40, dominance: 40 },
			]
		);
	}

	#[test]
	fn extraction_is_deterministic() {
		let pixels = weighted_pixels(&[
			(Srgb::new(200, 30, 40), 41),
			(Srgb::new(190, 35, 45), 33),
			(Srgb::new(20, 80, 200), 29),
			(Srgb::new(240, 240, 230), 13),
			(Srgb::new(5, 5, 5), 7),
		]);
		let mut config = ClusterConfig::new(4, DistanceMetric::Oklab);
		config.trials = 3;
		config.seed = 42;

		let first = extract_palette(&pixels, &config, DistanceMetric::Oklab);
		let second = extract_palette(&pixels, &config, DistanceMetric::Oklab);

		assert!(!first.is_empty());
		assert_eq!(first, second);
	}

	#[test]
	fn clusters_are_sorted_by_dominance_descending() {
		let pixels = weighted_pixels(&[
			(Srgb::new(255, 0, 0), 10),
			(Srgb::new(0, 255, 0), 60),
			(Srgb::new(0, 0, 255), 30),
		]);
		let config = ClusterConfig::new(3, DistanceMetric::EuclideanRgb);

		let clusters = extract_palette(&pixels, &config, DistanceMetric::EuclideanRgb);

		for window in clusters.windows(2) {
			assert!(window[0].dominance >= window[1].dominance);
		}
		assert_eq!(clusters[0].centroid, Srgb::new(0, 255, 0));
	}

	#[test]
	fn empty_input_yields_no_clusters() {
		let config = ClusterConfig::new(3, DistanceMetric::Oklab);
		assert!(extract_palette(&[], &config, DistanceMetric::Oklab).is_empty());
	}

	#[test]
	fn dominance_shares_reconcile_rounding() {
		assert_eq!(dominance_shares(&[50, 30, 21]), vec![49, 30, 21]);
		assert_eq!(dominance_shares(&[1, 1, 1]), vec![34, 33, 33]);
		assert_eq!(dominance_shares(&[100]), vec![100]);

		let shares = dominance_shares(&[17, 13, 11, 7, 3]);
		assert_eq!(shares.iter().copied().map(u32::from).sum::<u32>(), 100);
	}
}
