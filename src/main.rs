use anyhow::{Context, Result};
use clap::Parser;
use shredsim::{
    cut_to_shreds, debug::save_image_with_graph, drawing::GraphDrawingConfig, AnalysisConfig,
    DocSize, Offset, ShredConfig,
};
use tracing::info;

/// Cuts a scanned document into shreds and reports the ground-truth layout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Document image, dark ink on light paper.
    doc: String,
    /// Shred footprint mask image.
    mask: String,
    /// Offset to the right neighbor's base point, as ROW,COL.
    #[arg(long, value_parser = parse_offset, default_value = "0,110")]
    right: Offset,
    /// Offset to the bottom neighbor's base point, as ROW,COL.
    #[arg(long, value_parser = parse_offset, default_value = "110,0")]
    bottom: Offset,
    /// Where to save the rendered shred layout.
    #[arg(long, default_value = "output_with_shreds.png")]
    output: String,
}

fn parse_offset(raw: &str) -> Result<Offset, String> {
    let (row, col) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {raw:?}"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row: {e}"))?;
    let col = col.trim().parse().map_err(|e| format!("bad col: {e}"))?;
    Ok(Offset::new(row, col))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let raw = image::open(&args.doc).context("Failed to open document image")?;
    // Scans come as dark ink on light paper; the cut expects white
    // foreground on black background.
    let mut doc = raw.to_luma8();
    image::imageops::invert(&mut doc);

    let mask = image::open(&args.mask)
        .context("Failed to open shred mask")?
        .to_luma8();

    let config = ShredConfig::new(mask, args.right, args.bottom);
    let graph = cut_to_shreds(DocSize::from(&doc), &config)?;
    let good = graph.good_nodes(&doc, &config, &AnalysisConfig::default());
    info!(
        "{}: {} shreds, {} adjacencies, {} with usable content",
        args.doc,
        graph.node_count(),
        graph.edge_count(),
        good.len()
    );
    println!(
        "{} shreds, {} adjacencies, {} with usable content",
        graph.node_count(),
        graph.edge_count(),
        good.len()
    );

    save_image_with_graph(
        &image::DynamicImage::ImageLuma8(doc),
        &graph,
        &args.output,
        &GraphDrawingConfig::default(),
    )?;

    Ok(())
}
