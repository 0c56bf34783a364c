//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
    fmt::{Debug, Display},
    num::ParseFloatError,
    ops::RangeBounds,
    path::PathBuf,
    str::FromStr,
};

/// Supported output formats for the generated pattern
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
    /// Bead totals and the per-color bill of materials
    Summary,
    /// The pattern as true color blocks, followed by the summary
    Grid,
    /// The full pattern and statistics as JSON
    Json,
}

/// Generate a fuse-bead pattern and a bill of materials from an image.
///
/// The image is divided into square cells, each cell is matched against the
/// bead colors the selected brand stocks in the selected catalog tables,
/// and the per-color bead counts are tallied.
#[derive(Parser)]
#[command(version)]
pub struct Options {
    /// The path to the input image
    pub image: PathBuf,

    /// The path to the bead color catalog JSON file
    #[arg(short, long, default_value = "color_data.json")]
    pub catalog: PathBuf,

    /// The bead brand whose product codes label the output
    #[arg(short, long, default_value = "MARD")]
    pub brand: String,

    /// A comma separated list of base color tables to draw beads from
    ///
    /// When omitted, every base table in the catalog is used.
    #[arg(short = 't', long, value_delimiter = ',')]
    pub base_tables: Vec<String>,

    /// A comma separated list of advanced color tables (pearl, glow, ...) to draw beads from
    #[arg(short = 'a', long, value_delimiter = ',')]
    pub advanced_tables: Vec<String>,

    /// The side length in pixels of one grid cell, i.e. one bead
    #[arg(short = 's', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub cell_size: u32,

    /// The color distance below which similar bead colors are merged into one
    ///
    /// Distances are Euclidean over RGB with channels in [0, 255], so useful
    /// values are roughly 0 to 50. A threshold of 0 disables merging.
    #[arg(short = 'm', long, default_value_t = 0.0, value_parser = parse_valid_threshold)]
    pub merge_threshold: f64,

    /// The maximum image dimension, in pixels, before a thumbnail is created
    ///
    /// Larger images are downscaled until width and height both fit, which
    /// bounds the work per run and matches how far a physical bead board
    /// resolves detail anyway.
    #[arg(short = 'p', long, default_value_t = 800)]
    pub max_size: u32,

    /// The format to print the pattern in
    #[arg(short, long, default_value = "summary")]
    pub output: FormatOutput,

    /// The number of threads to use, or 0 for one per core
    #[cfg(feature = "threads")]
    #[arg(long, default_value_t = 0)]
    pub threads: u8,

    /// Print additional information, such as the elapsed time of each step
    #[arg(long)]
    pub verbose: bool,
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
    T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
    let value: T = s.parse().map_err(|e| format!("{e}"))?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {range:?}"))
    }
}

/// Parse the merge threshold and ensure it is >= `0.0`
fn parse_valid_threshold(s: &str) -> Result<f64, String> {
    parse_float_in_range(s, 0.0..)
}
