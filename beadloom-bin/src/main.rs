//! Generate a fuse-bead pattern and a per-color bead count from an image.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(clippy::doc_markdown, clippy::module_name_repetitions, clippy::missing_panics_doc)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    fmt::{self, Display},
    process::ExitCode,
    time::Instant,
};

use beadloom::{CatalogError, ColorCatalog, Pattern, PatternError, PatternRequest};
use clap::Parser;
use colored::Colorize;
use image::{DynamicImage, GenericImageView};

/// Record the running time of a function and print the elapsed time
macro_rules! time {
    ($name: literal, $verbose: expr, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        if $verbose {
            println!("{} took {}ms", $name, start.elapsed().as_millis());
        }
        result
    }};
}

/// Error cases for a pattern generation run
#[derive(Debug)]
enum AppError {
    /// Failed to read or decode the image file
    ImageLoad(image::ImageError),
    /// Failed to read or parse the bead color catalog
    Catalog(CatalogError),
    /// The request could not produce a pattern
    Pattern(PatternError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
            AppError::Catalog(e) => write!(f, "Failed to load the color catalog: {e}"),
            AppError::Pattern(e) => write!(f, "Cannot generate a pattern: {e}"),
        }
    }
}

fn main() -> ExitCode {
    let options = Options::parse();

    let result = run_generate_and_print_pattern(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Builds a thread pool and then runs `generate_and_print_pattern`
#[cfg(feature = "threads")]
fn run_generate_and_print_pattern(options: &Options) -> Result<(), AppError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()
        .expect("initialized thread pool");

    pool.install(|| generate_and_print_pattern(options))
}

/// Runs `generate_and_print_pattern` on a single thread
#[cfg(not(feature = "threads"))]
fn run_generate_and_print_pattern(options: &Options) -> Result<(), AppError> {
    generate_and_print_pattern(options)
}

/// Load the catalog and image, generate the pattern, and print the result
fn generate_and_print_pattern(options: &Options) -> Result<(), AppError> {
    // Input
    let catalog = time!(
        "Catalog loading",
        options.verbose,
        ColorCatalog::from_path(&options.catalog).map_err(AppError::Catalog)
    )?;
    let img = time!(
        "Image loading",
        options.verbose,
        image::open(&options.image).map_err(AppError::ImageLoad)
    )?;
    let img = generate_thumbnail(img, options.max_size, options.verbose);
    let image = img.into_rgb8();

    // Processing
    let request = build_request(&catalog, options);
    let pattern = time!(
        "Pattern generation",
        options.verbose,
        beadloom::generate_pattern(&catalog, &image, &request).map_err(AppError::Pattern)
    )?;

    // Output
    print_pattern(&pattern, options);

    Ok(())
}

/// Create a thumbnail if either image dimension exceeds `max_size` pixels
fn generate_thumbnail(image: DynamicImage, max_size: u32, verbose: bool) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width.max(height) <= max_size {
        if verbose {
            println!("Skipping image thumbnail since both dimensions fit max size");
        }

        image
    } else {
        if verbose {
            println!("Creating a thumbnail bounded by {max_size}x{max_size}");
        }

        time!("Image thumbnail", verbose, image.thumbnail(max_size, max_size))
    }
}

/// Turn the parsed options into an engine request, defaulting an empty
/// base-table selection to every base table in the catalog
fn build_request(catalog: &ColorCatalog, options: &Options) -> PatternRequest {
    let base_tables = if options.base_tables.is_empty() {
        catalog.base_table_ids().map(ToOwned::to_owned).collect()
    } else {
        options.base_tables.clone()
    };

    PatternRequest {
        brand: options.brand.clone(),
        base_tables,
        advanced_tables: options.advanced_tables.clone(),
        cell_size: options.cell_size,
        merge_threshold: options.merge_threshold,
    }
}

/// Print the pattern in the requested output format
fn print_pattern(pattern: &Pattern, options: &Options) {
    match options.output {
        FormatOutput::Summary => print_summary(pattern),
        FormatOutput::Grid => {
            print_grid(pattern);
            println!();
            print_summary(pattern);
        }
        FormatOutput::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(pattern).expect("serializable pattern")
            );
        }
    }
}

/// Print the pattern itself, one true color block per bead
fn print_grid(pattern: &Pattern) {
    for row in 0..pattern.rows {
        let line = (0..pattern.cols)
            .map(|col| {
                let [r, g, b] = pattern.cell(row, col).color.rgb;
                "  ".on_truecolor(r, g, b).to_string()
            })
            .collect::<Vec<_>>()
            .join("");
        println!("{line}");
    }
}

/// Print the bead totals and the per-color bill of materials
fn print_summary(pattern: &Pattern) {
    let stats = &pattern.stats;
    println!(
        "{} beads over {}x{} cells, {} colors",
        stats.total_cells, pattern.cols, pattern.rows, stats.distinct_colors
    );

    for stat in &stats.per_color {
        let [r, g, b] = stat.rgb;
        println!("{} {:<10} {:>6}", "  ".on_truecolor(r, g, b), stat.brand_code, stat.count);
    }
}
