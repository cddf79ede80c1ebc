//! Color space conversions, hex parsing, and WCAG contrast arithmetic.
//!
//! All conversions go through [`palette`] and clamp out-of-gamut results
//! instead of rejecting them. Only malformed hex input is an error.

use palette::{FromColor, Hsv, Lab, LinSrgb, Oklab, Srgb};
use thiserror::Error;

/// Error cases for parsing a hex color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// The string was empty
	#[error("empty color string")]
	Empty,
	/// The string had a length other than 3 or 6 hex digits
	#[error("expected 3 or 6 hex digits, found {0}")]
	Length(usize),
	/// The string contained a character that is not a hex digit
	#[error("invalid hex digit {0:?}")]
	Digit(char),
}

/// Parse a hex color like `#RRGGBB` or `#RGB`, with or without the leading `#`.
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>, ParseError> {
	/// Value of a single hex digit
	fn nibble(digit: u8) -> Option<u8> {
		match digit {
			b'0'..=b'9' => Some(digit - b'0'),
			b'a'..=b'f' => Some(digit - b'a' + 10),
			b'A'..=b'F' => Some(digit - b'A' + 10),
			_ => None,
		}
	}

	let hex = hex.trim();
	if hex.is_empty() {
		return Err(ParseError::Empty);
	}

	let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
	let digit = |i: usize| nibble(bytes[i]).ok_or(ParseError::Digit(char::from(bytes[i])));

	match bytes.len() {
		3 => {
			let (r, g, b) = (digit(0)?, digit(1)?, digit(2)?);
			Ok(Srgb::new(r * 17, g * 17, b * 17))
		},
		6 => {
			let (r, g, b) = (
				digit(0)? << 4 | digit(1)?,
				digit(2)? << 4 | digit(3)?,
				digit(4)? << 4 | digit(5)?,
			);
			Ok(Srgb::new(r, g, b))
		},
		n => Err(ParseError::Length(n)),
	}
}

/// Convert an sRGB color to CIELAB (D65)
#[must_use]
pub fn to_lab(color: Srgb<u8>) -> Lab {
	Lab::from_color(color.into_format())
}

/// Convert a CIELAB color back to sRGB, clamping out-of-gamut values
#[must_use]
pub fn from_lab(lab: Lab) -> Srgb<u8> {
	let srgb: Srgb<f32> = Srgb::from_color(lab);
	srgb.into_format()
}

/// Convert an sRGB color to Oklab
#[must_use]
pub fn to_oklab(color: Srgb<u8>) -> Oklab {
	Oklab::from_color(color.into_format())
}

/// Convert an Oklab color back to sRGB, clamping out-of-gamut values
#[must_use]
pub fn from_oklab(oklab: Oklab) -> Srgb<u8> {
	let srgb: Srgb<f32> = Srgb::from_color(oklab);
	srgb.into_format()
}

/// Convert an sRGB color to HSV
#[must_use]
pub fn to_hsv(color: Srgb<u8>) -> Hsv {
	Hsv::from_color(color.into_format())
}

/// Convert an HSV color back to sRGB, clamping out-of-range values
#[must_use]
pub fn from_hsv(hsv: Hsv) -> Srgb<u8> {
	let srgb: Srgb<f32> = Srgb::from_color(hsv);
	srgb.into_format()
}

/// WCAG relative luminance of an sRGB color, in `0.0..=1.0`
#[must_use]
pub fn relative_luminance(color: Srgb<u8>) -> f32 {
	let linear: LinSrgb = color.into_format::<f32>().into_linear();
	0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

/// WCAG contrast ratio between two colors, in `1.0..=21.0`
#[must_use]
pub fn contrast_ratio(a: Srgb<u8>, b: Srgb<u8>) -> f32 {
	let (la, lb) = (relative_luminance(a), relative_luminance(b));
	let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
	(lighter + 0.05) / (darker + 0.05)
}

/// WCAG conformance level for a contrast ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WcagLevel {
	/// Contrast ratio of at least 7
	Aaa,
	/// Contrast ratio of at least 4.5
	Aa,
	/// Contrast ratio below 4.5
	Fail,
}

impl WcagLevel {
	/// Bucket a contrast ratio into its WCAG conformance level
	#[must_use]
	pub fn from_ratio(ratio: f32) -> Self {
		if ratio >= 7.0 {
			WcagLevel::Aaa
		} else if ratio >= 4.5 {
			WcagLevel::Aa
		} else {
			WcagLevel::Fail
		}
	}
}

impl std::fmt::Display for WcagLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			WcagLevel::Aaa => "AAA",
			WcagLevel::Aa => "AA",
			WcagLevel::Fail => "Fail",
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_colors() -> Vec<Srgb<u8>> {
		let range = (0..=u8::MAX).step_by(17);
		let mut colors = Vec::new();

		for r in range.clone() {
			for g in range.clone() {
				for b in range.clone() {
					colors.push(Srgb::new(r, g, b));
				}
			}
		}

		colors
	}

	fn assert_channels_eq(x: Srgb<u8>, y: Srgb<u8>, eps: u8) {
		assert!(x.red.abs_diff(y.red) <= eps, "{x:?} != {y:?}");
		assert!(x.green.abs_diff(y.green) <= eps, "{x:?} != {y:?}");
		assert!(x.blue.abs_diff(y.blue) <= eps, "{x:?} != {y:?}");
	}

	#[test]
	fn parse_hex_six_digits() {
		assert_eq!(parse_hex("#1A2B3C"), Ok(Srgb::new(26, 43, 60)));
		assert_eq!(parse_hex("ff8800"), Ok(Srgb::new(255, 136, 0)));
	}

	#[test]
	fn parse_hex_three_digits() {
		assert_eq!(parse_hex("#FFF"), Ok(Srgb::new(255, 255, 255)));
		assert_eq!(parse_hex("#a0c"), Ok(Srgb::new(170, 0, 204)));
	}

	#[test]
	fn parse_hex_rejects_malformed_input() {
		assert_eq!(parse_hex(""), Err(ParseError::Empty));
		assert_eq!(parse_hex("   "), Err(ParseError::Empty));
		assert_eq!(parse_hex("#12"), Err(ParseError::Length(2)));
		assert_eq!(parse_hex("#1234567"), Err(ParseError::Length(7)));
		assert_eq!(parse_hex("#GGHHII"), Err(ParseError::Digit('G')));
	}

	#[test]
	fn lab_round_trip_is_stable() {
		for color in test_colors() {
			assert_channels_eq(from_lab(to_lab(color)), color, 1);
		}
	}

	#[test]
	fn oklab_round_trip_is_stable() {
		for color in test_colors() {
			assert_channels_eq(from_oklab(to_oklab(color)), color, 1);
		}
	}

	#[test]
	fn hsv_round_trip_is_stable() {
		for color in test_colors() {
			assert_channels_eq(from_hsv(to_hsv(color)), color, 1);
		}
	}

	#[test]
	fn hsv_hue_of_primaries() {
		let red = to_hsv(Srgb::new(255, 0, 0));
		assert!(red.hue.into_positive_degrees().abs() <= 0.01);

		let green = to_hsv(Srgb::new(0, 255, 0));
		assert!((green.hue.into_positive_degrees() - 120.0).abs() <= 0.01);
	}

	#[test]
	fn contrast_ratio_extremes() {
		let white = Srgb::new(255, 255, 255);
		let black = Srgb::new(0, 0, 0);
		let gray = Srgb::new(128, 128, 128);

		assert!((contrast_ratio(white, black) - 21.0).abs() <= 0.01);
		assert!((contrast_ratio(gray, gray) - 1.0).abs() <= f32::EPSILON);
	}

	#[test]
	fn contrast_ratio_is_symmetric() {
		let a = Srgb::new(200, 40, 90);
		let b = Srgb::new(12, 240, 3);
		assert!((contrast_ratio(a, b) - contrast_ratio(b, a)).abs() <= f32::EPSILON);
	}

	#[test]
	fn wcag_level_boundaries() {
		assert_eq!(WcagLevel::from_ratio(7.0), WcagLevel::Aaa);
		assert_eq!(WcagLevel::from_ratio(6.99), WcagLevel::Aa);
		assert_eq!(WcagLevel::from_ratio(4.5), WcagLevel::Aa);
		assert_eq!(WcagLevel::from_ratio(4.49), WcagLevel::Fail);
	}
}
