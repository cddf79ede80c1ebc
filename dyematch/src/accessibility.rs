//! Pairwise accessibility analysis for a small set of selected colors.
//!
//! Reports WCAG contrast, normalized distinguishability, and how both hold up
//! under simulated color vision deficiencies. The caller bounds the set size
//! (the UI selection cap is five); this module analyzes whatever it is given.

use crate::color::{self, WcagLevel};
use crate::metric::DistanceMetric;
use crate::vision::{self, VisionType};
use palette::Srgb;

/// Distinguishability score below which a pair is hard to tell apart
const DISTINCT_FLOOR: u8 = 20;

/// RGB distance below which a simulated color counts as unchanged
const SHIFT_FLOOR: f32 = 30.0;

/// Severity buckets for presenting a distinguishability score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	/// Score of at least 60
	Good,
	/// Score of at least 40
	Ok,
	/// Score of at least 20
	Caution,
	/// Score below 20
	Critical,
}

impl Severity {
	/// Bucket a distinguishability score
	#[must_use]
	pub fn from_score(score: u8) -> Self {
		if score >= 60 {
			Severity::Good
		} else if score >= 40 {
			Severity::Ok
		} else if score >= DISTINCT_FLOOR {
			Severity::Caution
		} else {
			Severity::Critical
		}
	}
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Severity::Good => "good",
			Severity::Ok => "ok",
			Severity::Caution => "caution",
			Severity::Critical => "critical",
		})
	}
}

/// Warnings attached to a single color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWarning {
	/// Deuteranopia and protanopia render this color identically
	RedGreenConfusable,
	/// The color barely shifts under tritanopia simulation
	BlueYellowDifficulty,
	/// The color barely shifts when reduced to luminance
	MonochromeDifficulty,
}

impl std::fmt::Display for ColorWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ColorWarning::RedGreenConfusable => "red-green confusable",
			ColorWarning::BlueYellowDifficulty => "blue-yellow difficulty",
			ColorWarning::MonochromeDifficulty => "total colorblindness difficulty",
		})
	}
}

/// Warnings attached to a pair of colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairWarning {
	/// Distinct under normal vision but not under this vision type
	Indistinct(VisionType),
	/// Loses at least half of its separation under this vision type
	SharpLoss(VisionType),
}

impl std::fmt::Display for PairWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PairWarning::Indistinct(vision) => {
				write!(f, "hard to tell apart under {vision}")
			},
			PairWarning::SharpLoss(vision) => {
				write!(f, "loses most separation under {vision}")
			},
		}
	}
}

/// Contrast, simulation, and warning data for one color
#[derive(Debug, Clone)]
pub struct ColorAnalysis {
	/// The analyzed color
	pub color: Srgb<u8>,
	/// Contrast ratio against pure white
	pub contrast_on_white: f32,
	/// WCAG level against pure white
	pub wcag_on_white: WcagLevel,
	/// Contrast ratio against pure black
	pub contrast_on_black: f32,
	/// WCAG level against pure black
	pub wcag_on_black: WcagLevel,
	/// Simulated appearance per vision type, in [`VisionType::ALL`] order
	pub simulated: [(VisionType, Srgb<u8>); 4],
	/// Heuristic warnings for this color alone
	pub warnings: Vec<ColorWarning>,
}

/// Contrast and distinguishability data for one unordered pair
#[derive(Debug, Clone)]
pub struct PairAnalysis {
	/// First color of the pair, in selection order
	pub a: Srgb<u8>,
	/// Second color of the pair, in selection order
	pub b: Srgb<u8>,
	/// WCAG contrast ratio between the two
	pub contrast: f32,
	/// WCAG level for the contrast ratio
	pub wcag: WcagLevel,
	/// Normalized `0..=100` distance under normal vision
	pub distinguishability: u8,
	/// Severity bucket for the normal-vision score
	pub severity: Severity,
	/// Distinguishability with both colors simulated, in [`VisionType::ALL`] order
	pub simulated: [(VisionType, u8); 4],
	/// Warnings for vision types under which this pair degrades
	pub warnings: Vec<PairWarning>,
}

/// Full report for a selected color set
#[derive(Debug, Clone)]
pub struct SetAnalysis {
	/// One entry per input color, in input order
	pub per_color: Vec<ColorAnalysis>,
	/// One entry per unordered pair of input colors
	pub pairs: Vec<PairAnalysis>,
}

/// Normalized `0..=100` score for how far apart two colors sit under the
/// metric. Saturated CIELAB pairs can exceed the white-black normalizer, so
/// the score saturates at 100.
fn distinguishability(a: Srgb<u8>, b: Srgb<u8>, metric: DistanceMetric) -> u8 {
	let score = metric.distance(a, b) / metric.max_distance() * 100.0;
	// clamped to 0..=100 above
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	{
		score.round().clamp(0.0, 100.0) as u8
	}
}

/// Analyze one color in isolation
fn analyze_color(color: Srgb<u8>) -> ColorAnalysis {
	let white = Srgb::new(255, 255, 255);
	let black = Srgb::new(0, 0, 0);
	let contrast_on_white = color::contrast_ratio(color, white);
	let contrast_on_black = color::contrast_ratio(color, black);

	let deutan = vision::simulate(color, VisionType::Deuteranopia);
	let protan = vision::simulate(color, VisionType::Protanopia);
	let tritan = vision::simulate(color, VisionType::Tritanopia);
	let gray = vision::simulate(color, VisionType::Achromatopsia);

	// shift thresholds are on the 8-bit RGB scale, independent of the request metric
	let rgb = DistanceMetric::EuclideanRgb;
	let mut warnings = Vec::new();
	if deutan == protan {
		warnings.push(ColorWarning::RedGreenConfusable);
	}
	if rgb.distance(color, tritan) < SHIFT_FLOOR {
		warnings.push(ColorWarning::BlueYellowDifficulty);
	}
	if rgb.distance(color, gray) < SHIFT_FLOOR {
		warnings.push(ColorWarning::MonochromeDifficulty);
	}

	ColorAnalysis {
		color,
		contrast_on_white,
		wcag_on_white: WcagLevel::from_ratio(contrast_on_white),
		contrast_on_black,
		wcag_on_black: WcagLevel::from_ratio(contrast_on_black),
		simulated: [
			(VisionType::Deuteranopia, deutan),
			(VisionType::Protanopia, protan),
			(VisionType::Tritanopia, tritan),
			(VisionType::Achromatopsia, gray),
		],
		warnings,
	}
}

/// Analyze one unordered pair of colors
fn analyze_pair(a: Srgb<u8>, b: Srgb<u8>, metric: DistanceMetric) -> PairAnalysis {
	let contrast = color::contrast_ratio(a, b);
	let normal = distinguishability(a, b, metric);

	let simulated = VisionType::ALL.map(|v| {
		let score = distinguishability(vision::simulate(a, v), vision::simulate(b, v), metric);
		(v, score)
	});

	let mut warnings = Vec::new();
	for &(v, score) in &simulated {
		if normal >= DISTINCT_FLOOR && score < DISTINCT_FLOOR {
			warnings.push(PairWarning::Indistinct(v));
		} else if normal >= 2 * DISTINCT_FLOOR && score <= normal / 2 {
			warnings.push(PairWarning::SharpLoss(v));
		}
	}

	PairAnalysis {
		a,
		b,
		contrast,
		wcag: WcagLevel::from_ratio(contrast),
		distinguishability: normal,
		severity: Severity::from_score(normal),
		simulated,
		warnings,
	}
}

/// Analyze every color and every unordered pair in the given set.
///
/// Each unordered pair appears exactly once, in selection order. A set of one
/// color produces no pairs.
#[must_use]
pub fn analyze_set(colors: &[Srgb<u8>], metric: DistanceMetric) -> SetAnalysis {
	let per_color = colors.iter().map(|&color| analyze_color(color)).collect();

	let mut pairs = Vec::new();
	for i in 0..colors.len() {
		for j in (i + 1)..colors.len() {
			pairs.push(analyze_pair(colors[i], colors[j], metric));
		}
	}

	SetAnalysis { per_color, pairs }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn white_black_pair_has_maximum_contrast() {
		let white = Srgb::new(255, 255, 255);
		let black = Srgb::new(0, 0, 0);

		let analysis = analyze_set(&[white, black], DistanceMetric::EuclideanRgb);
		let pair = &analysis.pairs[0];

		assert!((pair.contrast - 21.0).abs() <= 0.01);
		assert_eq!(pair.wcag, WcagLevel::Aaa);
		assert_eq!(pair.distinguishability, 100);
		assert_eq!(pair.severity, Severity::Good);
	}

	#[test]
	fn red_green_pair_degrades_under_red_green_deficiency() {
		let red = Srgb::new(255, 0, 0);
		let green = Srgb::new(0, 255, 0);

		let analysis = analyze_set(&[red, green], DistanceMetric::EuclideanRgb);
		let pair = &analysis.pairs[0];

		assert!(pair.distinguishability >= 60);
		assert!(
			pair.warnings.iter().any(|warning| matches!(
				warning,
				PairWarning::Indistinct(VisionType::Deuteranopia)
					| PairWarning::SharpLoss(VisionType::Deuteranopia)
			)),
			"no deuteranopia warning in {:?}",
			pair.warnings
		);
	}

	#[test]
	fn gray_carries_single_color_warnings() {
		let analysis = analyze_set(&[Srgb::new(128, 128, 128)], DistanceMetric::EuclideanRgb);
		let report = &analysis.per_color[0];

		assert!(report.warnings.contains(&ColorWarning::RedGreenConfusable));
		assert!(report.warnings.contains(&ColorWarning::MonochromeDifficulty));
		assert!(analysis.pairs.is_empty());
	}

	#[test]
	fn pure_blue_sits_on_the_tritan_confusion_surface() {
		let analysis = analyze_set(&[Srgb::new(0, 0, 255)], DistanceMetric::EuclideanRgb);
		let report = &analysis.per_color[0];

		assert!(report.warnings.contains(&ColorWarning::BlueYellowDifficulty));
		assert_eq!(report.wcag_on_white, WcagLevel::Aaa);
		assert_eq!(report.wcag_on_black, WcagLevel::Fail);
	}

	#[test]
	fn every_unordered_pair_appears_exactly_once() {
		let colors = [
			Srgb::new(255, 0, 0),
			Srgb::new(0, 255, 0),
			Srgb::new(0, 0, 255),
			Srgb::new(255, 255, 0),
		];

		let analysis = analyze_set(&colors, DistanceMetric::Oklab);
		assert_eq!(analysis.per_color.len(), 4);
		assert_eq!(analysis.pairs.len(), 6);

		for pair in &analysis.pairs {
			assert_ne!(pair.a, pair.b);
		}
	}

	#[test]
	fn severity_bucket_boundaries() {
		assert_eq!(Severity::from_score(60), Severity::Good);
		assert_eq!(Severity::from_score(59), Severity::Ok);
		assert_eq!(Severity::from_score(40), Severity::Ok);
		assert_eq!(Severity::from_score(39), Severity::Caution);
		assert_eq!(Severity::from_score(20), Severity::Caution);
		assert_eq!(Severity::from_score(19), Severity::Critical);
	}
}
