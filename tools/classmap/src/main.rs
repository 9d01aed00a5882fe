//! Diagnostic class-map renderer — writes a colour-coded PNG of a classified
//! grid, one distinct colour per class code present. Stands in for dropping
//! the classified layer on a map when eyeballing a result.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

use lulc_core::{class_histogram, ClassGrid};

/// Categorical palette; codes are ranked and colours cycle past 12 classes.
const PALETTE: [[u8; 3]; 12] = [
    [31, 119, 180],  // blue
    [255, 127, 14],  // orange
    [44, 160, 44],   // green
    [214, 39, 40],   // red
    [148, 103, 189], // purple
    [140, 86, 75],   // brown
    [227, 119, 194], // pink
    [127, 127, 127], // gray
    [188, 189, 34],  // olive
    [23, 190, 207],  // cyan
    [210, 180, 140], // tan
    [70, 130, 180],  // steel blue
];

#[derive(Parser, Debug)]
#[command(
    name = "classmap",
    about = "Render a classified LULC grid as a colour-coded PNG"
)]
struct Args {
    /// Classified grid JSON (serialised ClassGrid or nested rows of codes).
    #[arg(short, long)]
    grid: PathBuf,

    /// Output PNG path.
    #[arg(short, long, default_value = "data/classmap.png")]
    output: PathBuf,
}

/// Accepted JSON shapes: a serialised `ClassGrid`, or nested rows of codes.
#[derive(Deserialize)]
#[serde(untagged)]
enum GridFile {
    Flat {
        data: Vec<i32>,
        width: usize,
        height: usize,
    },
    Rows(Vec<Vec<i32>>),
}

fn load_grid(path: &Path) -> Result<ClassGrid> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let parsed: GridFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse grid JSON {}", path.display()))?;
    let grid = match parsed {
        GridFile::Flat {
            data,
            width,
            height,
        } => ClassGrid::from_parts(data, width, height)?,
        GridFile::Rows(rows) => ClassGrid::from_rows(rows)?,
    };
    Ok(grid)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let grid = load_grid(&args.grid)?;
    if grid.cells() == 0 {
        bail!("Grid {} is empty, nothing to render", args.grid.display());
    }

    // Rank the codes actually present so colours are stable for a given grid.
    let mut codes: Vec<i32> = class_histogram(&grid).into_keys().collect();
    codes.sort_unstable();
    println!(
        "Rendering {}x{} grid, {} classes present",
        grid.width,
        grid.height,
        codes.len()
    );

    let mut img = image::RgbImage::new(grid.width as u32, grid.height as u32);
    for r in 0..grid.height {
        for c in 0..grid.width {
            let code = grid.get(r, c);
            let rank = codes.binary_search(&code).unwrap_or(0);
            let [rv, gv, bv] = PALETTE[rank % PALETTE.len()];
            img.put_pixel(c as u32, r as u32, image::Rgb([rv, gv, bv]));
        }
    }

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory {}", dir.display()))?;
    }
    img.save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());

    Ok(())
}
