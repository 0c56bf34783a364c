//! End-to-end run: catalog JSON in, pattern and bill of materials out.

use beadloom::{generate_pattern, ColorCatalog, PatternRequest};
use image::{Rgb, RgbImage};

/// A small catalog in the on-disk schema: two base tables and one
/// advanced table, with near-duplicate reds split across tables
const CATALOG_JSON: &str = r##"{
	"base_tables": {
		"A": [
			{"id": 1, "hex": "#000000", "rgb": [0, 0, 0], "brands": {"MARD": "A1", "COCO": "01"}},
			{"id": 2, "hex": "#FFFFFF", "rgb": [255, 255, 255], "brands": {"MARD": "A2", "COCO": "-"}},
			{"id": 3, "hex": "#E61717", "rgb": [230, 23, 23], "brands": {"MARD": "A3"}}
		],
		"B": [
			{"id": 1, "hex": "#E11D1D", "rgb": [225, 29, 29], "brands": {"MARD": "B1", "COCO": "02"}}
		]
	},
	"advanced_tables": {
		"P": {
			"name": "P(pearl)",
			"colors": [
				{"id": 1, "hex": "#1D4ED8", "rgb": [29, 78, 216], "brands": {"MARD": "P1"}}
			]
		}
	}
}"##;

/// 20x10 image: left half red, right half near-black, so a 5px grid
/// gives two cell columns of each
fn test_image() -> RgbImage {
	RgbImage::from_fn(20, 10, |x, _| {
		if x < 10 {
			Rgb([228, 25, 25])
		} else {
			Rgb([5, 5, 5])
		}
	})
}

fn request() -> PatternRequest {
	PatternRequest {
		brand: "MARD".to_owned(),
		base_tables: vec!["A".to_owned(), "B".to_owned()],
		advanced_tables: vec!["P".to_owned()],
		cell_size: 5,
		merge_threshold: 0.0,
	}
}

#[test]
fn full_run_produces_a_consistent_bill_of_materials() {
	let catalog = ColorCatalog::from_reader(CATALOG_JSON.as_bytes()).unwrap();
	let pattern = generate_pattern(&catalog, &test_image(), &request()).unwrap();

	assert_eq!((pattern.cols, pattern.rows), (4, 2));
	assert_eq!(pattern.cells.len(), 8);

	let stats = &pattern.stats;
	assert_eq!(stats.total_cells, 8);
	assert_eq!(stats.per_color.iter().map(|s| s.count).sum::<u32>(), 8);

	// the red half matches the closest red (A3 at distance ~3), the dark
	// half matches black; counts tie at 4 and keep first-matched order
	assert_eq!(stats.distinct_colors, 2);
	assert_eq!(stats.per_color[0].brand_code, "A3");
	assert_eq!(stats.per_color[1].brand_code, "A1");
}

#[test]
fn merging_collapses_the_near_duplicate_reds() {
	let catalog = ColorCatalog::from_reader(CATALOG_JSON.as_bytes()).unwrap();

	let mut merged = request();
	merged.merge_threshold = 10.0;
	let pattern = generate_pattern(&catalog, &test_image(), &merged).unwrap();

	// A3 [230,23,23] and B1 [225,29,29] are ~8.8 apart and collapse into
	// one representative; every red cell now matches that single entry
	let red_cells: Vec<_> = pattern.cells.iter().filter(|c| c.mean_rgb == [228, 25, 25]).collect();
	assert_eq!(red_cells.len(), 4);
	let code = &red_cells[0].color.brand_code;
	assert!(red_cells.iter().all(|c| &c.color.brand_code == code));
}

#[test]
fn pattern_serializes_for_export() {
	let catalog = ColorCatalog::from_reader(CATALOG_JSON.as_bytes()).unwrap();
	let pattern = generate_pattern(&catalog, &test_image(), &request()).unwrap();

	let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&pattern).unwrap()).unwrap();
	assert_eq!(json["cols"], 4);
	assert_eq!(json["rows"], 2);
	assert_eq!(json["cells"].as_array().unwrap().len(), 8);
	assert_eq!(json["stats"]["total_cells"], 8);
	assert_eq!(json["stats"]["per_color"][0]["brand_code"], "A3");
}
