//! Selectable color distance metrics.
//!
//! A metric is a working color space plus Euclidean distance within it, so
//! every metric is symmetric and non-negative by construction. The working
//! representation is a plain `[f32; 3]` vector, which lets the clusterer
//! accumulate and average centroids without caring which space is active.

use crate::color;
use palette::{Lab, Oklab, Srgb};

/// A color distance metric and the working color space it measures in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
	/// Euclidean distance between 8-bit sRGB channels
	EuclideanRgb,
	/// Delta E 1976, Euclidean distance in CIELAB
	DeltaELab,
	/// Euclidean distance in the Oklab color space
	#[default]
	Oklab,
}

impl DistanceMetric {
	/// Convert a color into this metric's working-space vector
	#[must_use]
	pub fn project(self, color: Srgb<u8>) -> [f32; 3] {
		match self {
			DistanceMetric::EuclideanRgb => {
				[f32::from(color.red), f32::from(color.green), f32::from(color.blue)]
			},
			DistanceMetric::DeltaELab => {
				let lab = color::to_lab(color);
				[lab.l, lab.a, lab.b]
			},
			DistanceMetric::Oklab => {
				let oklab = color::to_oklab(color);
				[oklab.l, oklab.a, oklab.b]
			},
		}
	}

	/// Convert a working-space vector back into an sRGB color, clamping
	/// out-of-gamut values
	#[must_use]
	pub fn restore(self, v: [f32; 3]) -> Srgb<u8> {
		match self {
			DistanceMetric::EuclideanRgb => {
				Srgb::new(channel(v[0]), channel(v[1]), channel(v[2]))
			},
			DistanceMetric::DeltaELab => color::from_lab(Lab::new(v[0], v[1], v[2])),
			DistanceMetric::Oklab => color::from_oklab(Oklab::new(v[0], v[1], v[2])),
		}
	}

	/// Distance between two colors under this metric
	#[must_use]
	pub fn distance(self, a: Srgb<u8>, b: Srgb<u8>) -> f32 {
		squared_distance(self.project(a), self.project(b)).sqrt()
	}

	/// Distance between pure white and pure black, used as the normalizing
	/// constant for distinguishability scores
	#[must_use]
	pub fn max_distance(self) -> f32 {
		self.distance(Srgb::new(255, 255, 255), Srgb::new(0, 0, 0))
	}
}

/// Round a working-space channel back to an 8-bit sRGB channel
fn channel(value: f32) -> u8 {
	// rounded and clamped to 0..=255, so the cast is lossless
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	{
		value.round().clamp(0.0, 255.0) as u8
	}
}

/// Squared Euclidean distance between two working-space vectors
#[must_use]
pub fn squared_distance(x: [f32; 3], y: [f32; 3]) -> f32 {
	let d0 = x[0] - y[0];
	let d1 = x[1] - y[1];
	let d2 = x[2] - y[2];
	d0 * d0 + d1 * d1 + d2 * d2
}
