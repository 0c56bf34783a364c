//! Grid quantization and per-color bead statistics.
//!
//! The image is partitioned into `cell_size` by `cell_size` blocks, each
//! block reduced to its mean color, and each mean matched to the nearest
//! palette entry. A remainder strip narrower than one cell at the right
//! or bottom edge is dropped. The matched grid is then tallied into a
//! bill of materials keyed by brand code.

use crate::{
	palette::{nearest_entry, ColorEntry},
	PatternError, Rgb8,
};
use image::RgbImage;
#[cfg(feature = "threads")]
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// One grid cell with its mean color and matched bead color
#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
	/// Zero-based row index
	pub row: u32,
	/// Zero-based column index
	pub col: u32,
	/// Integer-floored per-channel mean of the cell's source pixels
	pub mean_rgb: Rgb8,
	/// The palette entry matched to `mean_rgb`
	pub color: ColorEntry,
}

/// Bead usage of one color over a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorStat {
	/// The brand's product code; the statistics key
	pub brand_code: String,
	/// Representative color, taken from the first matched entry with this code
	pub rgb: Rgb8,
	/// Number of cells matched to this code
	pub count: u32,
}

/// Aggregate statistics over one quantization run
#[derive(Debug, Clone, Serialize)]
pub struct PatternStats {
	/// Total number of cells, i.e. beads, in the pattern
	pub total_cells: u32,
	/// Number of distinct brand codes used
	pub distinct_colors: usize,
	/// Per-color usage, sorted descending by count; ties keep first-matched order
	pub per_color: Vec<ColorStat>,
}

/// A quantized bead pattern with its usage statistics
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
	/// Number of grid columns
	pub cols: u32,
	/// Number of grid rows
	pub rows: u32,
	/// Side length in pixels of one cell in the source image
	pub cell_size: u32,
	/// All cells in row-major order
	pub cells: Vec<GridCell>,
	/// Per-color usage statistics
	pub stats: PatternStats,
}

impl Pattern {
	/// The cell at the given zero-based row and column
	#[must_use]
	pub fn cell(&self, row: u32, col: u32) -> &GridCell {
		&self.cells[(row * self.cols + col) as usize]
	}
}

/// Integer-floored per-channel mean color of one cell's pixel block
fn cell_mean(image: &RgbImage, row: u32, col: u32, cell_size: u32) -> Rgb8 {
	let mut sums = [0_u64; 3];

	for y in (row * cell_size)..((row + 1) * cell_size) {
		for x in (col * cell_size)..((col + 1) * cell_size) {
			for (sum, &channel) in sums.iter_mut().zip(&image.get_pixel(x, y).0) {
				*sum += u64::from(channel);
			}
		}
	}

	let pixels = u64::from(cell_size) * u64::from(cell_size);
	// a mean of u8 values fits u8
	#[allow(clippy::cast_possible_truncation)]
	sums.map(|sum| (sum / pixels) as u8)
}

/// Quantize and match the cell at the given row-major index
fn matched_cell(image: &RgbImage, palette: &[ColorEntry], cols: u32, cell_size: u32, index: u32) -> GridCell {
	let row = index / cols;
	let col = index % cols;
	let mean_rgb = cell_mean(image, row, col, cell_size);

	GridCell {
		row,
		col,
		mean_rgb,
		color: nearest_entry(palette, mean_rgb),
	}
}

/// Quantize and match all cells in parallel
#[cfg(feature = "threads")]
fn matched_cells(image: &RgbImage, palette: &[ColorEntry], cols: u32, rows: u32, cell_size: u32) -> Vec<GridCell> {
	(0..rows * cols)
		.into_par_iter()
		.map(|index| matched_cell(image, palette, cols, cell_size, index))
		.collect()
}

/// Quantize and match all cells on a single thread
#[cfg(not(feature = "threads"))]
fn matched_cells(image: &RgbImage, palette: &[ColorEntry], cols: u32, rows: u32, cell_size: u32) -> Vec<GridCell> {
	(0..rows * cols)
		.map(|index| matched_cell(image, palette, cols, cell_size, index))
		.collect()
}

/// Tally matched cells into per-color statistics.
///
/// Cells are grouped by brand code alone, so distinct colors sharing a
/// code become one statistic carrying the first-matched entry's RGB.
/// That keying is part of the contract; counts are what the user buys
/// beads by.
fn aggregate(cells: &[GridCell], total_cells: u32) -> PatternStats {
	let mut index_by_code: HashMap<&str, usize> = HashMap::new();
	let mut per_color: Vec<ColorStat> = Vec::new();

	for cell in cells {
		if let Some(&i) = index_by_code.get(cell.color.brand_code.as_str()) {
			per_color[i].count += 1;
		} else {
			index_by_code.insert(cell.color.brand_code.as_str(), per_color.len());
			per_color.push(ColorStat {
				brand_code: cell.color.brand_code.clone(),
				rgb: cell.color.rgb,
				count: 1,
			});
		}
	}

	// stable sort keeps first-matched order among equal counts
	per_color.sort_by_key(|stat| std::cmp::Reverse(stat.count));

	PatternStats {
		total_cells,
		distinct_colors: per_color.len(),
		per_color,
	}
}

/// Quantize `image` against the (already merged) palette
pub(crate) fn generate(image: &RgbImage, palette: &[ColorEntry], cell_size: u32) -> Result<Pattern, PatternError> {
	let (width, height) = image.dimensions();
	let (cols, rows) = if cell_size == 0 {
		(0, 0)
	} else {
		(width / cell_size, height / cell_size)
	};

	if cols == 0 || rows == 0 {
		return Err(PatternError::DegenerateGrid {
			width,
			height,
			cell_size,
		});
	}

	let cells = matched_cells(image, palette, cols, rows, cell_size);
	let stats = aggregate(&cells, cols * rows);

	Ok(Pattern {
		cols,
		rows,
		cell_size,
		cells,
		stats,
	})
}
