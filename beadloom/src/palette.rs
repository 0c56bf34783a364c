//! Working palette construction, merging, and nearest-color matching.
//!
//! A working palette is built fresh from the catalog for every request:
//! the selected tables are filtered down to the entries the selected
//! brand actually stocks. The palette can then optionally be merged,
//! collapsing colors closer than a threshold into one representative so
//! a pattern needs fewer distinct beads.

use crate::{
	catalog::{CatalogColor, ColorCatalog},
	Rgb8,
};
use serde::Serialize;

/// Brand code carried by the sentinel entry matched against an empty palette
pub const NO_MATCH_CODE: &str = "N/A";

/// Which catalog table a palette entry came from.
///
/// Provenance only; matching and statistics never consult it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TableSource {
	/// A base color table
	Base(
		/// Table identifier
		String,
	),
	/// An advanced color table
	Advanced {
		/// Table identifier
		id: String,
		/// Display name of the table
		name: String,
	},
	/// Not a catalog color; only the no-match sentinel carries this
	Unmatched,
}

/// One working palette member: a bead color the selected brand stocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorEntry {
	/// Catalog identifier within the source table
	pub id: u32,
	/// The bead color
	pub rgb: Rgb8,
	/// The selected brand's product code; the user-facing label and statistics key
	pub brand_code: String,
	/// The table this entry came from
	pub source: TableSource,
}

/// Euclidean distance between two colors in RGB space.
///
/// Symmetric, non-negative, and zero exactly for channel-identical
/// colors; ranges up to `sqrt(3) * 255 ≈ 441.67`.
#[must_use]
pub fn distance(a: Rgb8, b: Rgb8) -> f64 {
	f64::from(distance_squared(a, b)).sqrt()
}

/// Squared color distance; preserves the ordering of [`distance`]
pub(crate) fn distance_squared(a: Rgb8, b: Rgb8) -> u32 {
	let dr = i32::from(a[0]) - i32::from(b[0]);
	let dg = i32::from(a[1]) - i32::from(b[1]);
	let db = i32::from(a[2]) - i32::from(b[2]);
	#[allow(clippy::cast_sign_loss)]
	{
		(dr * dr + dg * dg + db * db) as u32
	}
}

/// Convert a catalog entry to a palette entry if `brand` stocks it
fn to_entry(color: &CatalogColor, brand: &str, source: &TableSource) -> Option<ColorEntry> {
	color.brand_code(brand).map(|code| ColorEntry {
		id: color.id,
		rgb: color.rgb,
		brand_code: code.to_owned(),
		source: source.clone(),
	})
}

/// Builds the working palette for a brand from the selected tables.
///
/// Output order is stable: base tables first, in selection order, then
/// advanced tables in selection order, each table keeping its catalog
/// order. Entries whose brand code is absent or a placeholder are
/// excluded. Table identifiers not present in the catalog are skipped.
/// Entry uniqueness is not guaranteed; the same color may appear in
/// several tables.
///
/// An empty result means the brand/table combination has no usable
/// colors; callers decide how to surface that.
#[must_use]
pub fn build_palette(
	catalog: &ColorCatalog,
	brand: &str,
	base_tables: &[String],
	advanced_tables: &[String],
) -> Vec<ColorEntry> {
	let mut palette = Vec::new();

	for table in base_tables {
		let Some(colors) = catalog.base_table(table) else {
			continue;
		};
		let source = TableSource::Base(table.clone());
		palette.extend(colors.iter().filter_map(|color| to_entry(color, brand, &source)));
	}

	for table in advanced_tables {
		let Some(advanced) = catalog.advanced_table(table) else {
			continue;
		};
		let source = TableSource::Advanced {
			id: table.clone(),
			name: advanced.name.clone(),
		};
		palette.extend(advanced.colors.iter().filter_map(|color| to_entry(color, brand, &source)));
	}

	palette
}

/// Sum of the three channels; a cheap 1-D proxy that places similar colors
/// near each other before the merge sweep
fn channel_sum(rgb: Rgb8) -> u16 {
	u16::from(rgb[0]) + u16::from(rgb[1]) + u16::from(rgb[2])
}

/// Component-wise integer-floored mean color of a group of entries
fn group_mean(group: &[&ColorEntry]) -> Rgb8 {
	let mut sums = [0_u32; 3];
	for entry in group {
		for (sum, &channel) in sums.iter_mut().zip(&entry.rgb) {
			*sum += u32::from(channel);
		}
	}

	// group.len() >= 1, so the division is safe; the mean of u8 values fits u8
	#[allow(clippy::cast_possible_truncation)]
	sums.map(|sum| (sum / group.len() as u32) as u8)
}

/// Collapses palette entries within `threshold` of each other into one
/// representative each.
///
/// A threshold of `0.0` is a no-op that returns the palette unchanged.
/// Otherwise the entries are sorted ascending by channel sum and swept
/// left to right: each not-yet-used entry anchors a group collecting
/// every later unused entry within `threshold` of the anchor. A
/// singleton group keeps its anchor; a larger group is represented by
/// the member closest to the group's floored mean color, first member
/// winning ties. Non-representative members are dropped entirely.
///
/// The clustering is greedy and order-dependent by contract, not a
/// minimal partition; output order is sweep order. The result is never
/// larger than the input.
#[must_use]
pub fn merge_palette(palette: Vec<ColorEntry>, threshold: f64) -> Vec<ColorEntry> {
	if threshold <= 0.0 || palette.is_empty() {
		return palette;
	}

	let mut sorted = palette;
	sorted.sort_by_key(|entry| channel_sum(entry.rgb));

	let mut used = vec![false; sorted.len()];
	let mut merged = Vec::new();

	for i in 0..sorted.len() {
		if used[i] {
			continue;
		}
		used[i] = true;

		let mut group = vec![&sorted[i]];
		for j in (i + 1)..sorted.len() {
			if !used[j] && distance(sorted[i].rgb, sorted[j].rgb) <= threshold {
				used[j] = true;
				group.push(&sorted[j]);
			}
		}

		let representative = if group.len() == 1 {
			group[0]
		} else {
			let mean = group_mean(&group);
			let mut best = group[0];
			let mut min = distance_squared(mean, best.rgb);
			for &entry in &group[1..] {
				let d = distance_squared(mean, entry.rgb);
				if d < min {
					min = d;
					best = entry;
				}
			}
			best
		};

		merged.push(representative.clone());
	}

	merged
}

/// Finds the palette entry closest to `rgb`.
///
/// Linear scan; the first entry in palette order achieving the minimal
/// distance wins ties. Against an empty palette this returns a sentinel
/// entry carrying `rgb` itself and the [`NO_MATCH_CODE`] code, so a
/// misconfigured run still aggregates cleanly.
#[must_use]
pub fn nearest_entry(palette: &[ColorEntry], rgb: Rgb8) -> ColorEntry {
	let mut min = u32::MAX;
	let mut nearest = None;

	for entry in palette {
		let d = distance_squared(rgb, entry.rgb);
		if d < min {
			min = d;
			nearest = Some(entry);
		}
	}

	nearest.cloned().unwrap_or_else(|| ColorEntry {
		id: 0,
		rgb,
		brand_code: NO_MATCH_CODE.to_owned(),
		source: TableSource::Unmatched,
	})
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	fn entry(code: &str, rgb: Rgb8) -> ColorEntry {
		ColorEntry {
			id: 0,
			rgb,
			brand_code: code.to_owned(),
			source: TableSource::Base("A".to_owned()),
		}
	}

	#[test]
	fn distance_is_a_metric_on_identical_and_swapped_colors() {
		let colors = [[0, 0, 0], [255, 255, 255], [12, 200, 3], [128, 128, 127]];
		for a in colors {
			assert_abs_diff_eq!(distance(a, a), 0.0);
			for b in colors {
				assert_abs_diff_eq!(distance(a, b), distance(b, a));
			}
		}

		// 3-4-5 triangle in the red/green plane
		assert_abs_diff_eq!(distance([0, 0, 0], [3, 4, 0]), 5.0);
	}

	#[test]
	fn zero_threshold_merge_is_the_identity() {
		let palette = vec![
			entry("C", [200, 200, 200]),
			entry("A", [0, 0, 0]),
			entry("B", [10, 0, 0]),
		];

		assert_eq!(merge_palette(palette.clone(), 0.0), palette);
	}

	#[test]
	fn merge_never_grows_the_palette() {
		let palette: Vec<ColorEntry> = (0_u8..=250)
			.step_by(10)
			.map(|v| entry(&format!("C{v}"), [v, v / 2, v]))
			.collect();

		let mut previous = palette.len();
		for threshold in [1.0, 5.0, 20.0, 80.0, 500.0] {
			let merged = merge_palette(palette.clone(), threshold);
			assert!(merged.len() <= palette.len());
			// wider thresholds only merge more
			assert!(merged.len() <= previous);
			previous = merged.len();
		}

		// beyond the metric's maximum, everything collapses to one entry
		assert_eq!(merge_palette(palette, 442.0).len(), 1);
	}

	#[test]
	fn near_black_pair_merges_into_the_entry_closest_to_the_group_mean() {
		let palette = vec![
			entry("BLACK", [0, 0, 0]),
			entry("DARK", [10, 0, 0]),
			entry("GREY", [200, 200, 200]),
		];

		let merged = merge_palette(palette, 15.0);
		assert_eq!(merged.len(), 2);

		// the group mean [5, 0, 0] is equidistant to both members; the
		// first in sweep order represents the group
		assert_eq!(merged[0].brand_code, "BLACK");
		assert_eq!(merged[1].brand_code, "GREY");
	}

	#[test]
	fn nearest_entry_agrees_with_exhaustive_search() {
		let palette: Vec<ColorEntry> = [[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255], [90, 130, 40]]
			.into_iter()
			.enumerate()
			.map(|(i, rgb)| entry(&format!("C{i}"), rgb))
			.collect();

		for r in (0_u8..=255).step_by(51) {
			for g in (0_u8..=255).step_by(51) {
				for b in (0_u8..=255).step_by(51) {
					let query = [r, g, b];
					let matched = nearest_entry(&palette, query);
					for other in &palette {
						assert!(distance(query, matched.rgb) <= distance(query, other.rgb));
					}
				}
			}
		}
	}

	#[test]
	fn equidistant_matches_keep_the_first_palette_entry() {
		let palette = vec![entry("FIRST", [0, 0, 0]), entry("SECOND", [20, 0, 0])];

		for _ in 0..10 {
			assert_eq!(nearest_entry(&palette, [10, 0, 0]).brand_code, "FIRST");
		}
	}

	#[test]
	fn near_black_mean_matches_the_black_bead() {
		let palette = vec![entry("A", [0, 0, 0]), entry("B", [255, 255, 255])];
		assert_eq!(nearest_entry(&palette, [10, 10, 10]).brand_code, "A");
	}

	#[test]
	fn empty_palette_yields_the_sentinel() {
		let matched = nearest_entry(&[], [12, 34, 56]);
		assert_eq!(matched.brand_code, NO_MATCH_CODE);
		assert_eq!(matched.rgb, [12, 34, 56]);
		assert_eq!(matched.source, TableSource::Unmatched);
	}

	/// Catalog used by the builder tests below
	fn builder_catalog() -> ColorCatalog {
		serde_json::from_str(
			r##"{
				"base_tables": {
					"A": [
						{"id": 1, "hex": "#000000", "rgb": [0, 0, 0], "brands": {"MARD": "A1", "COCO": "-"}},
						{"id": 2, "hex": "#FF0000", "rgb": [255, 0, 0], "brands": {"MARD": "A2"}}
					],
					"B": [
						{"id": 1, "hex": "#00FF00", "rgb": [0, 255, 0], "brands": {"MARD": "B1", "COCO": "21"}}
					]
				},
				"advanced_tables": {
					"T": {
						"name": "T(transparent)",
						"colors": [
							{"id": 1, "hex": "#0000FF", "rgb": [0, 0, 255], "brands": {"MARD": "T1"}}
						]
					}
				}
			}"##,
		)
		.unwrap()
	}

	#[test]
	fn palette_order_follows_the_table_selection() {
		let catalog = builder_catalog();
		let palette = build_palette(
			&catalog,
			"MARD",
			&["B".to_owned(), "A".to_owned()],
			&["T".to_owned()],
		);

		let codes: Vec<&str> = palette.iter().map(|e| e.brand_code.as_str()).collect();
		assert_eq!(codes, ["B1", "A1", "A2", "T1"]);
		assert_eq!(
			palette[3].source,
			TableSource::Advanced {
				id: "T".to_owned(),
				name: "T(transparent)".to_owned(),
			}
		);
	}

	#[test]
	fn placeholder_codes_and_unknown_tables_are_excluded() {
		let catalog = builder_catalog();
		let palette = build_palette(&catalog, "COCO", &["A".to_owned(), "Z".to_owned(), "B".to_owned()], &[]);

		// COCO stocks nothing in A (placeholder / absent) and Z does not exist
		let codes: Vec<&str> = palette.iter().map(|e| e.brand_code.as_str()).collect();
		assert_eq!(codes, ["21"]);
	}
}
