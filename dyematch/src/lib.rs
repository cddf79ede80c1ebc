//! Extract a color palette from an image and match it against a dye catalog.
//!
//! The pipeline is: sample visible pixels from a decoded bitmap, reduce them
//! to a handful of representative clusters with k-means, then map every
//! cluster to its nearest dye in a fixed catalog under a selectable distance
//! metric. A single color can also be matched directly, and a small set of
//! selected colors can be checked for contrast and color vision deficiency
//! problems.
//!
//! # Examples
//!
//! ## Match a single color against a catalog.
//!
//! ```
//! use dyematch::{color, Catalog, ExtractionRequest};
//!
//! let catalog = Catalog::from_json_str(
//!     r#"[
//!         {"id": "snow", "name": "Snow White", "color": "#FFFFFF", "cost": 30, "category": "whites"},
//!         {"id": "soot", "name": "Soot Black", "color": "#000000", "cost": 30, "category": "blacks"}
//!     ]"#,
//! )
//! .unwrap();
//!
//! let request = ExtractionRequest::single(color::parse_hex("#F8F8F8").unwrap());
//! let result = dyematch::run(&request, &catalog, |_| true);
//!
//! assert_eq!(result.matches[0].entry.id, "snow");
//! ```
//!
//! ## Extract a palette from pixels and match every cluster.
//!
//! ```
//! use dyematch::{sample, Catalog, ExtractionRequest};
//!
//! let catalog = Catalog::from_json_str(
//!     r#"[{"id": "rose", "name": "Rose", "color": "#C03040", "cost": 120, "category": "reds"}]"#,
//! )
//! .unwrap();
//!
//! // a tiny solid-red RGBA bitmap
//! let rgba = [200u8, 40, 60, 255].repeat(16);
//! let pixels = sample::sample_rgba(&rgba, sample::DEFAULT_SAMPLE_BUDGET);
//!
//! let request = ExtractionRequest::palette(pixels, 3);
//! let result = dyematch::run(&request, &catalog, |_| true);
//!
//! assert_eq!(result.matches[0].entry.id, "rose");
//! assert_eq!(result.matches[0].dominance, Some(100));
//! ```
//!
//! The catalog is read-only and shared by reference, every knob is part of
//! the request, and identical requests always produce identical results, so
//! concurrent callers need no synchronization beyond the shared `&Catalog`.

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
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

pub mod accessibility;
pub mod catalog;
pub mod color;
pub mod kmeans;
pub mod matcher;
pub mod metric;
pub mod pipeline;
pub mod sample;
pub mod vision;

pub use catalog::{Catalog, CatalogError, DyeEntry};
pub use color::{ParseError, WcagLevel};
pub use kmeans::{Cluster, ClusterConfig};
pub use matcher::Match;
pub use metric::DistanceMetric;
pub use pipeline::{run, ExtractionInput, ExtractionRequest, ExtractionResult};
pub use vision::VisionType;
