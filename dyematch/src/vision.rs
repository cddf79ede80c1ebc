//! Color vision deficiency simulation.
//!
//! Dichromacy is simulated by projecting the cone response onto the missing
//! cone's confusion surface: linear sRGB is mapped into LMS space, the
//! affected component is reconstructed from the remaining two, and the result
//! is mapped back and clamped. The coefficients are the Viénot/Brettel (1999)
//! approximation and live in `const` tables so a different published model
//! can be substituted without touching the algorithm. Achromatopsia reduces
//! the color to its relative luminance.

use crate::color;
use palette::{LinSrgb, Srgb};

/// A category of color vision deficiency to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionType {
	/// Missing medium-wavelength (green) cones
	Deuteranopia,
	/// Missing long-wavelength (red) cones
	Protanopia,
	/// Missing short-wavelength (blue) cones
	Tritanopia,
	/// No color perception, luminance only
	Achromatopsia,
}

impl VisionType {
	/// Every simulated vision type, in presentation order
	pub const ALL: [VisionType; 4] = [
		VisionType::Deuteranopia,
		VisionType::Protanopia,
		VisionType::Tritanopia,
		VisionType::Achromatopsia,
	];
}

impl std::fmt::Display for VisionType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.pad(match self {
			VisionType::Deuteranopia => "deuteranopia",
			VisionType::Protanopia => "protanopia",
			VisionType::Tritanopia => "tritanopia",
			VisionType::Achromatopsia => "achromatopsia",
		})
	}
}

/// Linear sRGB to LMS cone response
const RGB_TO_LMS: [[f32; 3]; 3] = [
	[17.8824, 43.5161, 4.11935],
	[3.45565, 27.1554, 3.86714],
	[0.0299566, 0.184309, 1.46709],
];

/// LMS cone response back to linear sRGB
const LMS_TO_RGB: [[f32; 3]; 3] = [
	[0.0809444479, -0.130504409, 0.116721066],
	[-0.0102485335, 0.0540193266, -0.113614708],
	[-0.000365296938, -0.00412161469, 0.693511405],
];

/// Confusion-line projection for missing M cones
const DEUTERANOPIA: [[f32; 3]; 3] = [
	[1.0, 0.0, 0.0],
	[0.494207, 0.0, 1.24827],
	[0.0, 0.0, 1.0],
];

/// Confusion-line projection for missing L cones
const PROTANOPIA: [[f32; 3]; 3] = [
	[0.0, 2.02344, -2.52581],
	[0.0, 1.0, 0.0],
	[0.0, 0.0, 1.0],
];

/// Confusion-line projection for missing S cones
const TRITANOPIA: [[f32; 3]; 3] = [
	[1.0, 0.0, 0.0],
	[0.0, 1.0, 0.0],
	[-0.395913, 0.801109, 0.0],
];

/// Multiply a column vector by a 3x3 matrix
fn apply(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
	[
		m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
		m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
		m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
	]
}

/// Project a linear color through a dichromat confusion matrix
fn project_dichromat(linear: LinSrgb, projection: &[[f32; 3]; 3]) -> LinSrgb {
	let lms = apply(&RGB_TO_LMS, [linear.red, linear.green, linear.blue]);
	let [r, g, b] = apply(&LMS_TO_RGB, apply(projection, lms));
	LinSrgb::new(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// Simulate how a color appears to the given vision type
#[must_use]
pub fn simulate(color: Srgb<u8>, vision: VisionType) -> Srgb<u8> {
	let linear: LinSrgb = color.into_format::<f32>().into_linear();

	let simulated = match vision {
		VisionType::Deuteranopia => project_dichromat(linear, &DEUTERANOPIA),
		VisionType::Protanopia => project_dichromat(linear, &PROTANOPIA),
		VisionType::Tritanopia => project_dichromat(linear, &TRITANOPIA),
		VisionType::Achromatopsia => {
			let y = color::relative_luminance(color);
			LinSrgb::new(y, y, y)
		},
	};

	Srgb::<u8>::from_linear(simulated)
}
