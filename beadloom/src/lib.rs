//! Convert a raster image into a fuse-bead pattern.
//!
//! Each cell of a fixed-size grid is assigned the closest color from a
//! branded bead color catalog, and the per-color bead counts are tallied
//! into a bill of materials.
//!
//! # Examples
//!
//! ## Generate a pattern with 10px cells from the default catalog.
//!
//! ```no_run
//! let catalog = beadloom::ColorCatalog::from_path("color_data.json").unwrap();
//! let image = image::open("some image").unwrap().into_rgb8();
//!
//! let request = beadloom::PatternRequest {
//! 	brand: "MARD".to_owned(),
//! 	base_tables: vec!["A".to_owned(), "B".to_owned()],
//! 	advanced_tables: Vec::new(),
//! 	cell_size: 10,
//! 	merge_threshold: 0.0,
//! };
//!
//! let pattern = beadloom::generate_pattern(&catalog, &image, &request).unwrap();
//! for stat in &pattern.stats.per_color {
//! 	println!("{}: {} beads", stat.brand_code, stat.count);
//! }
//! ```
//!
//! ## Reuse a built palette across runs with different merge thresholds.
//!
//! ```no_run
//! let catalog = beadloom::ColorCatalog::from_path("color_data.json").unwrap();
//! let tables = vec!["A".to_owned()];
//! let built = beadloom::build_palette(&catalog, "COCO", &tables, &[]);
//!
//! let loose = beadloom::merge_palette(built.clone(), 25.0);
//! let exact = beadloom::merge_palette(built, 0.0);
//! assert!(loose.len() <= exact.len());
//! ```
//!
//! # Arguments
//!
//! ## Cell size
//!
//! The side length in pixels of the square image block mapped to one
//! bead. Any remainder strip at the right or bottom edge narrower than
//! one cell is dropped, so a pattern always covers exactly
//! `floor(width / cell_size)` by `floor(height / cell_size)` cells.
//!
//! ## Merge threshold
//!
//! The maximum Euclidean RGB distance at which two catalog colors are
//! treated as interchangeable and collapsed into one representative.
//! `0.0` disables merging and leaves the palette untouched. Channel
//! values are in `0..=255`, so distances range up to about `441.67`;
//! thresholds above `50` or so collapse most craft palettes down to a
//! handful of colors.

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

use image::RgbImage;
use thiserror::Error;

mod catalog;
mod palette;
mod pattern;

pub use catalog::{AdvancedTable, CatalogColor, CatalogError, ColorCatalog};
pub use palette::{build_palette, distance, merge_palette, nearest_entry, ColorEntry, TableSource, NO_MATCH_CODE};
pub use pattern::{ColorStat, GridCell, Pattern, PatternStats};

/// Three-channel sRGB color with integer components in `0..=255`
pub type Rgb8 = [u8; 3];

/// One quantization request: which catalog colors to use and how to grid the image
#[derive(Debug, Clone)]
pub struct PatternRequest {
	/// Brand whose product codes label the output colors
	pub brand: String,
	/// Selected base color tables, in selection order; must be non-empty
	pub base_tables: Vec<String>,
	/// Selected advanced color tables, in selection order; may be empty
	pub advanced_tables: Vec<String>,
	/// Side length in pixels of one grid cell
	pub cell_size: u32,
	/// Maximum color distance at which palette entries are merged; `0.0` disables merging
	pub merge_threshold: f64,
}

/// Validation failures reported before any quantization work is done
#[derive(Debug, Error)]
pub enum PatternError {
	/// The request selected no base color tables
	#[error("no base color table selected")]
	NoBaseTables,
	/// The selected brand and tables produced no usable colors
	#[error("no usable colors for brand {brand:?} with the selected tables")]
	EmptyPalette {
		/// The requested brand
		brand: String,
	},
	/// The image does not contain even a single full cell
	#[error("cell size {cell_size} leaves no full cell in a {width}x{height} image")]
	DegenerateGrid {
		/// Image width in pixels
		width: u32,
		/// Image height in pixels
		height: u32,
		/// Requested cell size
		cell_size: u32,
	},
}

/// Runs one full quantization: build the palette, merge it, grid the image,
/// match every cell, and tally the per-color statistics.
///
/// All validation happens up front; on error no partial result exists.
/// The remainder strip narrower than one cell at the right/bottom image
/// edge is dropped.
///
/// # Errors
///
/// Returns [`PatternError::NoBaseTables`] for an empty base-table
/// selection, [`PatternError::EmptyPalette`] if the brand and tables
/// yield no usable colors, and [`PatternError::DegenerateGrid`] if the
/// image is smaller than one cell.
pub fn generate_pattern(
	catalog: &ColorCatalog,
	image: &RgbImage,
	request: &PatternRequest,
) -> Result<Pattern, PatternError> {
	if request.base_tables.is_empty() {
		return Err(PatternError::NoBaseTables);
	}

	let built = build_palette(catalog, &request.brand, &request.base_tables, &request.advanced_tables);
	if built.is_empty() {
		return Err(PatternError::EmptyPalette {
			brand: request.brand.clone(),
		});
	}

	let merged = merge_palette(built, request.merge_threshold);
	pattern::generate(image, &merged, request.cell_size)
}
