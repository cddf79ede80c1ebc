//! Nearest-dye lookup against a catalog under a selectable distance metric.
//!
//! The matcher applies whatever filter predicate the caller hands it and owns
//! no filter policy of its own. Distance ties always keep the earliest
//! catalog entry, so results are deterministic.

use crate::catalog::{Catalog, DyeEntry};
use crate::metric::{self, DistanceMetric};
use palette::Srgb;

/// A dye matched to a source color
#[derive(Debug, Clone)]
pub struct Match<'a> {
	/// The color that was looked up
	pub source: Srgb<u8>,
	/// The matched catalog entry
	pub entry: &'a DyeEntry,
	/// Distance from the source color to the entry under the request's metric
	pub distance: f32,
	/// Share of sampled pixels behind the source color, in palette mode
	pub dominance: Option<u8>,
}

/// Find the catalog entry closest to `color`, honoring the caller's filter.
///
/// Returns `None` only when the catalog is empty or the filter rejects every
/// entry.
pub fn find_closest<'a, F>(
	color: Srgb<u8>,
	catalog: &'a Catalog,
	metric: DistanceMetric,
	filter: F,
) -> Option<Match<'a>>
where
	F: Fn(&DyeEntry) -> bool,
{
	let target = metric.project(color);

	let mut best: Option<(&DyeEntry, f32)> = None;
	for entry in catalog.entries() {
		if !filter(entry) {
			continue;
		}

		let squared = metric::squared_distance(target, metric.project(entry.color));
		match best {
			// a strict improvement is required, so ties keep the earliest entry
			Some((_, min)) if squared >= min => {},
			_ => best = Some((entry, squared)),
		}
	}

	best.map(|(entry, squared)| Match {
		source: color,
		entry,
		distance: squared.sqrt(),
		dominance: None,
	})
}

/// Find every catalog entry within `max_distance` of `color`, closest first,
/// truncated to `limit`.
pub fn find_within<'a, F>(
	color: Srgb<u8>,
	catalog: &'a Catalog,
	max_distance: f32,
	limit: usize,
	metric: DistanceMetric,
	filter: F,
) -> Vec<Match<'a>>
where
	F: Fn(&DyeEntry) -> bool,
{
	let target = metric.project(color);

	let mut matches: Vec<Match<'a>> = catalog
		.entries()
		.iter()
		.filter(|entry| filter(entry))
		.filter_map(|entry| {
			let distance = metric::squared_distance(target, metric.project(entry.color)).sqrt();
			(distance <= max_distance).then(|| Match {
				source: color,
				entry,
				distance,
				dominance: None,
			})
		})
		.collect();

	// the sort is stable, so equal distances keep catalog order
	matches.sort_by(|x, y| f32::total_cmp(&x.distance, &y.distance));
	matches.truncate(limit);
	matches
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::Catalog;
	use approx::assert_relative_eq;

	fn catalog(entries: &[(&str, &str)]) -> Catalog {
		let entries = entries
			.iter()
			.map(|&(id, hex)| DyeEntry {
				id: id.to_owned(),
				name: id.to_owned(),
				color: crate::color::parse_hex(hex).expect("valid hex"),
				cost: 0,
				category: String::new(),
			})
			.collect();
		Catalog::from_entries(entries).expect("unique ids")
	}

	#[test]
	fn near_white_matches_the_white_entry() {
		let catalog = catalog(&[("white", "#FFFFFF"), ("black", "#000000")]);
		let color = crate::color::parse_hex("#F8F8F8").expect("valid hex");

		let matched = find_closest(color, &catalog, DistanceMetric::EuclideanRgb, |_| true)
			.expect("non-empty catalog");

		assert_eq!(matched.entry.id, "white");
		// seven steps on each of the three channels
		assert_relative_eq!(matched.distance, 147.0_f32.sqrt(), epsilon = 1e-3);
	}

	#[test]
	fn empty_catalog_matches_nothing() {
		let catalog = Catalog::default();
		let color = Srgb::new(1, 2, 3);

		assert!(find_closest(color, &catalog, DistanceMetric::Oklab, |_| true).is_none());
		assert!(find_within(color, &catalog, f32::INFINITY, 10, DistanceMetric::Oklab, |_| true)
			.is_empty());
	}

	#[test]
	fn filter_predicate_excludes_entries() {
		let catalog = catalog(&[("white", "#FFFFFF"), ("black", "#000000")]);
		let color = crate::color::parse_hex("#F8F8F8").expect("valid hex");

		let matched =
			find_closest(color, &catalog, DistanceMetric::EuclideanRgb, |e| e.id != "white")
				.expect("black still allowed");
		assert_eq!(matched.entry.id, "black");

		assert!(
			find_closest(color, &catalog, DistanceMetric::EuclideanRgb, |_| false).is_none()
		);
	}

	#[test]
	fn within_results_are_sorted_bounded_and_truncated() {
		let catalog = catalog(&[
			("far", "#FFFFFF"),
			("mid", "#0A0A0A"),
			("exact", "#000000"),
			("near", "#010101"),
		]);
		let black = Srgb::new(0, 0, 0);

		let matches =
			find_within(black, &catalog, 20.0, 10, DistanceMetric::EuclideanRgb, |_| true);
		let ids: Vec<&str> = matches.iter().map(|m| m.entry.id.as_str()).collect();
		assert_eq!(ids, ["exact", "near", "mid"]);

		for window in matches.windows(2) {
			assert!(window[0].distance <= window[1].distance);
		}
		assert!(matches.iter().all(|m| m.distance <= 20.0));

		let truncated =
			find_within(black, &catalog, 20.0, 2, DistanceMetric::EuclideanRgb, |_| true);
		assert_eq!(truncated.len(), 2);
	}

	#[test]
	fn distance_ties_keep_catalog_order() {
		// equidistant from gray on opposite sides
		let catalog = catalog(&[("darker", "#7E7E7E"), ("lighter", "#828282")]);
		let gray = Srgb::new(128, 128, 128);

		let matched = find_closest(gray, &catalog, DistanceMetric::EuclideanRgb, |_| true)
			.expect("non-empty catalog");
		assert_eq!(matched.entry.id, "darker");
	}
}
