//! Command-line converter: RimWorld savegame + rendered map image → UVTT
//! module document.

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tilesight::export;
use tilesight::graph::compute_obstacle_graph;
use tilesight::grid::ObstacleGrid;
use tilesight::savegame::parse_savegame;

#[derive(Parser)]
#[command(name = "tilesight")]
#[command(about = "Converts a RimWorld savegame into a Universal VTT module")]
struct Cli {
    /// Path to the savegame XML (.rws)
    savegame: PathBuf,

    /// Path to the rendered map image embedded into the module
    image: PathBuf,

    /// Output path for the UVTT document (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so the document can stream to stdout.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let xml = fs::read_to_string(&cli.savegame)
        .with_context(|| format!("failed to read savegame {}", cli.savegame.display()))?;
    let map = parse_savegame(&xml)?;
    info!(
        map_id = map.map_id,
        width = map.size.x,
        height = map.size.y,
        "parsed savegame"
    );

    let mut grid = ObstacleGrid::new(map.size);
    for placement in &map.placements {
        grid.place(placement.position, placement.kind)?;
    }
    let segments = compute_obstacle_graph(&mut grid);
    info!(segments = segments.len(), "computed obstacle graph");

    let image = export::load_image(&cli.image)?;
    let document = export::build_document(&map, &segments, &image);

    match cli.output {
        Some(path) => {
            let file = fs::File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export::write_document(BufWriter::new(file), &document)?;
        }
        None => {
            export::write_document(std::io::stdout().lock(), &document)?;
        }
    }
    Ok(())
}
