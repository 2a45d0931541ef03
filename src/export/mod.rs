//! Universal VTT document assembly.
//!
//! All coordinate flipping lives here: the tracer's endpoint math is
//! flip-agnostic, and this module converts its tile coordinates into the
//! image space of the exported module (origin translation, corner-to-center
//! shift, Y inversion against the image height).

use std::io::Write;
use std::path::Path;

use base64::Engine as _;
use serde::Serialize;

use crate::error::ExportError;
use crate::graph::ObstacleSegment;
use crate::grid::ObstacleKind;
use crate::math::{FracVec, TileCoord, TilePos};
use crate::savegame::MapData;

/// Pixel density of the exported map grid.
const PIXELS_PER_GRID: u32 = 64;

/// Document revision understood by the target tabletops.
const FORMAT_VERSION: f64 = 0.2;

/// A Universal VTT module document, ready for serialization.
#[derive(Debug, Serialize)]
pub struct UvttDocument {
    format: f64,
    resolution: Resolution,
    line_of_sight: Vec<[MapPoint; 2]>,
    portals: Vec<Portal>,
    environment: Environment,
    lights: Vec<Light>,
    image: String,
}

#[derive(Debug, Serialize)]
struct Resolution {
    map_origin: MapPoint,
    map_size: MapPoint,
    pixels_per_grid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct MapPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct Portal {
    position: MapPoint,
    bounds: [MapPoint; 2],
    rotation: f64,
    closed: bool,
    freestanding: bool,
}

#[derive(Debug, Serialize)]
struct Environment {
    baked_lighting: bool,
    ambient_light: String,
}

#[derive(Debug, Serialize)]
struct Light {
    position: MapPoint,
    range: f64,
    intensity: f64,
    color: String,
    shadows: bool,
}

/// Assembles the document from the computed graph and the raw image bytes.
///
/// Wall segments become line-of-sight blockers, door segments become
/// portals; window segments carry no export representation. The image is
/// embedded verbatim as base64.
#[must_use]
pub fn build_document(map: &MapData, segments: &[ObstacleSegment], image: &[u8]) -> UvttDocument {
    let line_of_sight = segments
        .iter()
        .filter(|segment| segment.kind == ObstacleKind::Wall)
        .map(|segment| project_ends(segment, map))
        .collect();

    let portals = segments
        .iter()
        .filter(|segment| segment.kind == ObstacleKind::Door)
        .map(|segment| {
            let bounds = project_ends(segment, map);
            Portal {
                position: midpoint(bounds[0], bounds[1]),
                bounds,
                rotation: 1.0,
                closed: true,
                freestanding: false,
            }
        })
        .collect();

    let lights = map
        .lights
        .iter()
        .map(|light| Light {
            position: project_light(light.position, map),
            range: light.range,
            intensity: 1.0,
            color: "00000000".to_owned(),
            shadows: true,
        })
        .collect();

    UvttDocument {
        format: FORMAT_VERSION,
        resolution: Resolution {
            map_origin: MapPoint { x: 0.0, y: 0.0 },
            map_size: MapPoint {
                x: f64::from(map.image_size.x),
                y: f64::from(map.image_size.y),
            },
            pixels_per_grid: PIXELS_PER_GRID,
        },
        line_of_sight,
        portals,
        environment: Environment {
            baked_lighting: false,
            ambient_light: "00000000".to_owned(),
        },
        lights,
        image: base64::engine::general_purpose::STANDARD.encode(image),
    }
}

/// Serializes the document as JSON.
///
/// # Errors
///
/// Returns [`ExportError`] when serialization or the underlying writer
/// fails.
pub fn write_document<W: Write>(writer: W, document: &UvttDocument) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, document)?;
    Ok(())
}

/// Reads the map image to embed.
///
/// # Errors
///
/// Returns [`ExportError::Image`] when the file cannot be read.
pub fn load_image(path: &Path) -> Result<Vec<u8>, ExportError> {
    std::fs::read(path).map_err(ExportError::Image)
}

fn project_ends(segment: &ObstacleSegment, map: &MapData) -> [MapPoint; 2] {
    [
        project(segment.ends[0], map),
        project(segment.ends[1], map),
    ]
}

/// Maps a tile position into image space: translate by the image origin,
/// shift from tile-corner to tile-center convention, flip Y.
fn project(end: TilePos, map: &MapData) -> MapPoint {
    let shifted = end - TilePos::center(map.image_origin)
        + TilePos::new(TileCoord::new(0, 0), FracVec::new(0.5, 0.5));
    let (x, y) = shifted.to_map();
    MapPoint {
        x,
        y: f64::from(map.image_size.y) - y,
    }
}

fn project_light(position: TileCoord, map: &MapData) -> MapPoint {
    let x = position.x - map.image_origin.x;
    let y = map.image_size.y - (position.y - map.image_origin.y) - 1;
    MapPoint {
        x: f64::from(x) + 0.5,
        y: f64::from(y) + 0.5,
    }
}

fn midpoint(a: MapPoint, b: MapPoint) -> MapPoint {
    MapPoint {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}
