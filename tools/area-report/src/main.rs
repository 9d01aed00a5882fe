//! Batch area reporter: reads a classified LULC grid, tabulates per-class
//! pixel counts and square-kilometre areas, and writes a CSV table plus a
//! bar-chart PNG.
//!
//! Grid input is either JSON (a serialised `ClassGrid` or nested rows of
//! codes) or a single-band integer TIFF. All configuration is validated
//! before the grid is read; an export failure leaves earlier outputs intact.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::prelude::*;
use serde::Deserialize;
use tiff::decoder::DecodingResult;

use lulc_core::{aggregate_areas, validate_resolution, AreaRecord, ClassGrid, ClassSpec};

/// Bar fill, matching the sky-blue the reference figures use.
const BAR_FILL: RGBColor = RGBColor(135, 206, 235);

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "area-report",
    about = "Tabulate per-class LULC areas from a classified grid (CSV table + bar chart)"
)]
struct Args {
    /// Classified grid file: .json (ClassGrid or nested rows) or .tif/.tiff.
    #[arg(short, long)]
    grid: PathBuf,

    /// Comma-separated class codes to report on, in output order.
    #[arg(short, long)]
    classes: String,

    /// Declared number of classes; must match the class list length.
    #[arg(short = 'n', long)]
    num_classes: usize,

    /// Pixel resolution in metres (square pixels).
    #[arg(short, long)]
    resolution: f64,

    /// Output CSV path.
    #[arg(long, default_value = "data/areas.csv")]
    csv: PathBuf,

    /// Output chart PNG path.
    #[arg(long, default_value = "data/areas_chart.png")]
    chart: PathBuf,
}

// ── Grid loading ──────────────────────────────────────────────────────────────

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

fn parse_json_grid(text: &str) -> Result<ClassGrid> {
    let parsed: GridFile = serde_json::from_str(text).context("Failed to parse grid JSON")?;
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

fn load_tiff_grid(path: &Path) -> Result<ClassGrid> {
    let file =
        fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut decoder = tiff::decoder::Decoder::new(file)
        .with_context(|| format!("Not a valid TIFF: {}", path.display()))?;
    let (width, height) = decoder
        .dimensions()
        .with_context(|| format!("TIFF dimensions error: {}", path.display()))?;

    let data: Vec<i32> = match decoder
        .read_image()
        .with_context(|| format!("TIFF read error: {}", path.display()))?
    {
        DecodingResult::U8(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(i32::from).collect(),
        DecodingResult::I32(v) => v,
        _ => bail!(
            "Unsupported pixel type in {} (expected integer class codes)",
            path.display()
        ),
    };

    Ok(ClassGrid::from_parts(data, width as usize, height as usize)?)
}

fn load_grid(path: &Path) -> Result<ClassGrid> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            parse_json_grid(&text).with_context(|| format!("Bad grid file: {}", path.display()))
        }
        "tif" | "tiff" => load_tiff_grid(path),
        other => bail!(
            "Unsupported grid format {:?} (expected .json, .tif or .tiff)",
            other
        ),
    }
}

// ── CSV export ────────────────────────────────────────────────────────────────

/// The area column is fixed to 4 decimal places so a zero count reads "0.0000".
fn csv_fields(rec: &AreaRecord) -> [String; 3] {
    [
        rec.class.to_string(),
        rec.pixel_count.to_string(),
        format!("{:.4}", rec.area_km2),
    ]
}

fn write_csv(records: &[AreaRecord], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    wtr.write_record(["Class", "Pixel_Count", "Area_km2"])?;
    for rec in records {
        wtr.write_record(csv_fields(rec))?;
    }
    wtr.flush()?;
    Ok(())
}

// ── Chart export ──────────────────────────────────────────────────────────────

/// Render one bar per record, in record order: x = class code, y = area km².
fn render_chart(
    records: &[AreaRecord],
    path: &Path,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_top = records.iter().map(|r| r.area_km2).fold(0.0f64, f64::max);
    // Headroom above the tallest bar; all-zero records still get a visible axis.
    let y_top = if y_top > 0.0 { y_top * 1.1 } else { 1.0 };
    let n = records.len() as i32;

    let mut chart = ChartBuilder::on(&root)
        .caption("LULC Class Area Distribution", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("LULC Class")
        .y_desc("Area (km²)")
        .x_labels(records.len().max(1))
        .x_label_formatter(&|seg: &SegmentValue<i32>| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => records
                .get(*i as usize)
                .map(|r| r.class.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    chart.draw_series(records.iter().enumerate().map(|(i, rec)| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), rec.area_km2),
            ],
            BAR_FILL.filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;

    root.present()?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create output directory {}", dir.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration checks come first; nothing is read or written until the
    // class list and resolution are known to be valid.
    let spec = ClassSpec::parse_with_declared_count(&args.classes, args.num_classes)?;
    validate_resolution(args.resolution)?;

    eprintln!("[area-report] Loading grid {}", args.grid.display());
    let grid = load_grid(&args.grid)?;
    eprintln!(
        "[area-report] {}x{} cells, {} classes requested",
        grid.width,
        grid.height,
        spec.len()
    );

    eprintln!("[area-report] Calculating area statistics by class...");
    let records = aggregate_areas(&grid, &spec, args.resolution)?;

    ensure_parent(&args.csv)?;
    write_csv(&records, &args.csv)?;
    eprintln!("[area-report] Area stats saved to {}", args.csv.display());

    if records.is_empty() {
        eprintln!("  [warn] No classes requested, skipping chart");
    } else {
        ensure_parent(&args.chart)?;
        render_chart(&records, &args.chart)
            .map_err(|e| anyhow!("Chart rendering failed for {}: {e}", args.chart.display()))?;
        eprintln!("[area-report] Area chart saved to {}", args.chart.display());
    }

    Ok(())
}
