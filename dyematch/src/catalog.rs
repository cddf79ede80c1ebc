//! The dye catalog: fixed reference colors with acquisition metadata.
//!
//! A catalog is loaded and validated once at startup, then shared read-only
//! across every matching request. Entry order is meaningful: it breaks
//! distance ties during matching.

use crate::color;
use palette::Srgb;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Error cases for loading and validating a dye catalog
#[derive(Debug, Error)]
pub enum CatalogError {
	/// The catalog JSON could not be parsed
	#[error("malformed catalog JSON: {0}")]
	Json(#[from] serde_json::Error),
	/// Two entries share the same id
	#[error("duplicate dye id {0:?}")]
	DuplicateId(String),
}

/// One dye: a fixed reference color with a name and acquisition metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DyeEntry {
	/// Stable identifier, unique within a catalog
	pub id: String,
	/// Display name
	pub name: String,
	/// The dye's reference color, written as a hex string in JSON
	#[serde(deserialize_with = "hex_color")]
	pub color: Srgb<u8>,
	/// Acquisition cost in the game's currency
	#[serde(default)]
	pub cost: u32,
	/// Grouping used by caller-side filter predicates
	#[serde(default)]
	pub category: String,
}

/// Deserialize an sRGB color from a hex string like `"#RRGGBB"`
fn hex_color<'de, D>(deserializer: D) -> Result<Srgb<u8>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let hex = String::deserialize(deserializer)?;
	color::parse_hex(&hex).map_err(serde::de::Error::custom)
}

/// An immutable, validated list of dye entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	/// Entries in insertion order
	entries: Vec<DyeEntry>,
}

impl Catalog {
	/// Validate entries into a catalog, rejecting duplicate ids
	pub fn from_entries(entries: Vec<DyeEntry>) -> Result<Self, CatalogError> {
		let mut seen = HashSet::new();
		for entry in &entries {
			if !seen.insert(entry.id.as_str()) {
				return Err(CatalogError::DuplicateId(entry.id.clone()));
			}
		}

		Ok(Self { entries })
	}

	/// Load and validate a catalog from a JSON array of entries
	pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
		Self::from_entries(serde_json::from_str(json)?)
	}

	/// All entries in insertion order
	#[must_use]
	pub fn entries(&self) -> &[DyeEntry] {
		&self.entries
	}

	/// Number of entries
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the catalog holds no entries
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn loads_a_json_catalog() {
		let catalog = Catalog::from_json_str(
			r#"[
				{"id": "rose", "name": "Rose Red", "color": "#C03040", "cost": 120, "category": "reds"},
				{"id": "moss", "name": "Moss Green", "color": "#4A6B2A"}
			]"#,
		)
		.expect("valid catalog");

		assert_eq!(catalog.len(), 2);
		assert_eq!(catalog.entries()[0].color, Srgb::new(192, 48, 64));
		assert_eq!(catalog.entries()[0].cost, 120);

		// cost and category are optional
		assert_eq!(catalog.entries()[1].cost, 0);
		assert_eq!(catalog.entries()[1].category, "");
	}

	#[test]
	fn rejects_duplicate_ids() {
		let result = Catalog::from_json_str(
			r#"[
				{"id": "rose", "name": "Rose Red", "color": "#C03040"},
				{"id": "rose", "name": "Other Rose", "color": "#D04050"}
			]"#,
		);

		assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "rose"));
	}

	#[test]
	fn rejects_malformed_colors() {
		let result = Catalog::from_json_str(r#"[{"id": "x", "name": "X", "color": "#12345"}]"#);
		assert!(matches!(result, Err(CatalogError::Json(_))));
	}
}
