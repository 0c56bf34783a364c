//! Typed, read-only access to the bead color catalog.
//!
//! The catalog is a JSON document mapping color table identifiers to
//! catalog entries. Base tables hold plain entry lists; advanced tables
//! (pearl, glow, transparent, ...) additionally carry a display name.
//! Each entry stores one sRGB color and, per brand, that brand's product
//! code for it. A brand may not stock a color, in which case its code is
//! absent or a `"-"` placeholder; [`CatalogColor::brand_code`] resolves
//! both cases to `None` so no placeholder check leaks elsewhere.

use crate::Rgb8;
use serde::Deserialize;
use std::{collections::BTreeMap, fs::File, io::BufReader, io::Read, path::Path};
use thiserror::Error;

/// Brand codes representing "this brand does not stock this color"
const PLACEHOLDER_CODE: &str = "-";

/// Failed to load or parse a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Failed to read the catalog file
	#[error("failed to read the catalog file: {0}")]
	Io(#[from] std::io::Error),
	/// The catalog file is not valid catalog JSON
	#[error("failed to parse the catalog: {0}")]
	Parse(#[from] serde_json::Error),
}

/// One catalog entry: a physical bead color and its per-brand product codes
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogColor {
	/// Catalog identifier, unique within its table
	pub id: u32,
	/// Hex rendition of the color, e.g. `"#1F2937"`
	pub hex: String,
	/// The color itself
	pub rgb: Rgb8,
	/// Brand identifier to that brand's product code
	#[serde(default)]
	pub brands: BTreeMap<String, String>,
}

impl CatalogColor {
	/// Look up the product code of the given brand for this color.
	///
	/// Returns `None` if the brand does not stock this color, i.e. the
	/// code is missing, blank after trimming, or the `"-"` placeholder.
	#[must_use]
	pub fn brand_code(&self, brand: &str) -> Option<&str> {
		let code = self.brands.get(brand)?.trim();
		if code.is_empty() || code == PLACEHOLDER_CODE {
			None
		} else {
			Some(code)
		}
	}
}

/// An advanced color table: special-material beads with a display name
#[derive(Debug, Clone, Deserialize)]
pub struct AdvancedTable {
	/// Human-readable table name, e.g. `"P(pearl)"`
	pub name: String,
	/// The table's catalog entries
	#[serde(default)]
	pub colors: Vec<CatalogColor>,
}

/// The full bead color catalog, loaded once and read-only thereafter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorCatalog {
	/// Base color tables by table identifier
	#[serde(default)]
	pub base_tables: BTreeMap<String, Vec<CatalogColor>>,
	/// Advanced color tables by table identifier
	#[serde(default)]
	pub advanced_tables: BTreeMap<String, AdvancedTable>,
}

impl ColorCatalog {
	/// Parse a catalog from a JSON reader.
	///
	/// # Errors
	///
	/// Returns [`CatalogError::Parse`] if the document is not catalog JSON.
	pub fn from_reader(reader: impl Read) -> Result<Self, CatalogError> {
		Ok(serde_json::from_reader(reader)?)
	}

	/// Load a catalog from a JSON file.
	///
	/// # Errors
	///
	/// Returns [`CatalogError::Io`] if the file cannot be read and
	/// [`CatalogError::Parse`] if it is not catalog JSON.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
		Self::from_reader(BufReader::new(File::open(path)?))
	}

	/// Look up a base table by identifier
	#[must_use]
	pub fn base_table(&self, table: &str) -> Option<&[CatalogColor]> {
		self.base_tables.get(table).map(Vec::as_slice)
	}

	/// Look up an advanced table by identifier
	#[must_use]
	pub fn advanced_table(&self, table: &str) -> Option<&AdvancedTable> {
		self.advanced_tables.get(table)
	}

	/// All base table identifiers in the catalog
	pub fn base_table_ids(&self) -> impl Iterator<Item = &str> {
		self.base_tables.keys().map(String::as_str)
	}
}
