//! RimWorld savegame parsing.
//!
//! Walks the document with an event reader; each structural element gets
//! its own parse function and unknown subtrees are skipped wholesale. Only
//! the first map of the savegame is converted.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::error::SavegameError;
use crate::grid::{Direction, ObstacleKind};
use crate::math::{TileCoord, TileVec};

use super::{LightSource, MapData, Placement};

/// Radius assigned to every parsed wall light, in tiles.
const WALL_LIGHT_RANGE: f64 = 5.0;

type Result<T> = std::result::Result<T, SavegameError>;

/// Parses the first map of a savegame document.
///
/// # Errors
///
/// Returns [`SavegameError`] when the document is not well-formed XML, when
/// a required element (`game`, `maps`, `li`, `mapInfo/size`) is missing or
/// malformed, or when a wall light carries an unknown rotation.
pub fn parse_savegame(xml: &str) -> Result<MapData> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    enter_document_root(&mut reader)?;
    find_child(&mut reader, b"game", "savegame")?;
    find_child(&mut reader, b"maps", "game")?;
    find_child(&mut reader, b"li", "maps")?;
    parse_map(&mut reader)
}

fn parse_map(reader: &mut Reader<&[u8]>) -> Result<MapData> {
    let mut map_id = None;
    let mut size = None;
    let mut image_rect = None;
    let mut things = ParsedThings::default();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.name().as_ref() {
                b"uniqueID" => {
                    map_id = read_text(reader, &e)?.trim().parse().ok();
                }
                b"mapInfo" => {
                    size = Some(parse_map_info(reader)?);
                }
                b"components" => {
                    image_rect = parse_components(reader)?;
                }
                b"things" => {
                    things = parse_things(reader)?;
                }
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) => break,
            Event::Eof => {
                return Err(SavegameError::Xml("unexpected end of document".to_owned()))
            }
            _ => {}
        }
    }

    let Some(size) = size else {
        return Err(SavegameError::MissingElement {
            element: "mapInfo/size",
            context: "map",
        });
    };
    let (image_origin, image_size) =
        image_rect.unwrap_or((TileCoord::new(0, 0), size));

    info!(
        walls = things.walls,
        doors = things.doors,
        windows = things.windows,
        terrain = things.terrain,
        lights = things.lights.len(),
        "classified savegame things"
    );
    debug!(
        origin = ?(image_origin.x, image_origin.y),
        size = ?(image_size.x, image_size.y),
        "image area"
    );

    Ok(MapData {
        map_id,
        size,
        image_origin,
        image_size,
        placements: things.placements,
        lights: things.lights,
    })
}

fn parse_map_info(reader: &mut Reader<&[u8]>) -> Result<TileVec> {
    let mut size = None;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                if e.name().as_ref() == b"size" {
                    let text = read_text(reader, &e)?;
                    let (x, z) = parse_triplet(&text, "map size")?;
                    size = Some(TileVec::new(x, z));
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(SavegameError::Xml("unexpected end of document".to_owned()))
            }
            _ => {}
        }
    }
    size.ok_or(SavegameError::MissingElement {
        element: "size",
        context: "mapInfo",
    })
}

/// Reads the rendered-image rectangle from the progress-renderer component,
/// if the map carries one.
fn parse_components(reader: &mut Reader<&[u8]>) -> Result<Option<(TileCoord, TileVec)>> {
    let mut rect = None;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                if e.name().as_ref() == b"li"
                    && class_attribute(&e).as_deref()
                        == Some("ProgressRenderer.MapComponent_RenderManager")
                {
                    rect = Some(parse_render_manager(reader)?);
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(SavegameError::Xml("unexpected end of document".to_owned()))
            }
            _ => {}
        }
    }
    Ok(rect)
}

fn parse_render_manager(reader: &mut Reader<&[u8]>) -> Result<(TileCoord, TileVec)> {
    let mut start_x = None;
    let mut start_z = None;
    let mut end_x = None;
    let mut end_z = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let target = match e.name().as_ref() {
                    b"rsTargetStartX" => Some(&mut start_x),
                    b"rsTargetStartZ" => Some(&mut start_z),
                    b"rsTargetEndX" => Some(&mut end_x),
                    b"rsTargetEndZ" => Some(&mut end_z),
                    _ => None,
                };
                if let Some(slot) = target {
                    let text = read_text(reader, &e)?;
                    let value = text.trim().parse::<i32>().map_err(|_| {
                        SavegameError::Malformed {
                            what: "render target coordinate",
                            text: text.to_string(),
                        }
                    })?;
                    *slot = Some(value);
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(SavegameError::Xml("unexpected end of document".to_owned()))
            }
            _ => {}
        }
    }

    let (Some(sx), Some(sz), Some(ex), Some(ez)) = (start_x, start_z, end_x, end_z) else {
        return Err(SavegameError::MissingElement {
            element: "rsTarget bounds",
            context: "render manager component",
        });
    };
    Ok((TileCoord::new(sx, sz), TileVec::new(ex - sx, ez - sz)))
}

#[derive(Debug, Default)]
struct ParsedThings {
    placements: Vec<Placement>,
    lights: Vec<LightSource>,
    walls: u32,
    doors: u32,
    windows: u32,
    terrain: u32,
}

fn parse_things(reader: &mut Reader<&[u8]>) -> Result<ParsedThings> {
    let mut parsed = ParsedThings::default();
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                if e.name().as_ref() == b"thing" {
                    let class = class_attribute(&e);
                    let thing = parse_thing(reader)?;
                    if let Some(class) = class {
                        classify_thing(&class, &thing, &mut parsed)?;
                    }
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Event::Empty(e) => {
                if e.name().as_ref() == b"thing" {
                    if let Some(class) = class_attribute(&e) {
                        classify_thing(&class, &Thing::default(), &mut parsed)?;
                    }
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(SavegameError::Xml("unexpected end of document".to_owned()))
            }
            _ => {}
        }
    }
    Ok(parsed)
}

#[derive(Debug, Default)]
struct Thing {
    def: Option<String>,
    pos: Option<String>,
    rot: Option<String>,
}

fn parse_thing(reader: &mut Reader<&[u8]>) -> Result<Thing> {
    let mut thing = Thing::default();
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => match e.name().as_ref() {
                b"def" => thing.def = Some(read_text(reader, &e)?.into_owned()),
                b"pos" => thing.pos = Some(read_text(reader, &e)?.into_owned()),
                b"rot" => thing.rot = Some(read_text(reader, &e)?.into_owned()),
                _ => skip_element(reader, &e)?,
            },
            Event::End(_) => break,
            Event::Eof => {
                return Err(SavegameError::Xml("unexpected end of document".to_owned()))
            }
            _ => {}
        }
    }
    Ok(thing)
}

fn classify_thing(class: &str, thing: &Thing, parsed: &mut ParsedThings) -> Result<()> {
    let position = match thing.pos.as_deref() {
        Some(text) => {
            let (x, z) = parse_triplet(text, "thing position")?;
            TileCoord::new(x, z)
        }
        None => TileCoord::new(0, 0),
    };

    match class {
        "Building" | "Building_Door" | "DubsBadHygiene.Building_StallDoor" => {
            match thing.def.as_deref() {
                Some("Wall") => {
                    parsed.walls += 1;
                    parsed.placements.push(Placement {
                        position,
                        kind: ObstacleKind::Wall,
                    });
                }
                Some("Door" | "ToiletStallDoor") => {
                    parsed.doors += 1;
                    parsed.placements.push(Placement {
                        position,
                        kind: ObstacleKind::Door,
                    });
                }
                Some("ED_Embrasure") => {
                    parsed.windows += 1;
                    parsed.placements.push(Placement {
                        position,
                        kind: ObstacleKind::Window,
                    });
                }
                _ => {}
            }
        }
        "Mineable" => {
            parsed.terrain += 1;
            parsed.placements.push(Placement {
                position,
                kind: ObstacleKind::Wall,
            });
        }
        "MURWallLight.WallLight" => {
            let rot = match thing.rot.as_deref() {
                Some(text) => text.trim().parse::<i64>().map_err(|_| {
                    SavegameError::Malformed {
                        what: "wall-light rotation",
                        text: text.to_owned(),
                    }
                })?,
                None => 0,
            };
            let facing = rotation_facing(rot)?;
            parsed.lights.push(LightSource {
                position: position + facing.tile_offset(),
                range: WALL_LIGHT_RANGE,
            });
        }
        _ => {}
    }
    Ok(())
}

/// Maps a savegame rotation value to the direction the fixture faces.
fn rotation_facing(rot: i64) -> Result<Direction> {
    match rot {
        0 => Ok(Direction::South),
        1 => Ok(Direction::East),
        2 => Ok(Direction::North),
        3 => Ok(Direction::West),
        _ => Err(SavegameError::UnknownRotation(rot)),
    }
}

/// Parses a `(x, y, z)` coordinate triplet, keeping the first and third
/// components (the middle one is the vertical axis, which the grid ignores).
fn parse_triplet(text: &str, what: &'static str) -> Result<(i32, i32)> {
    let malformed = || SavegameError::Malformed {
        what,
        text: text.to_owned(),
    };
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(malformed)?;
    let mut parts = inner.split(',').map(str::trim);
    let x = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(malformed)?;
    parts.next().ok_or_else(malformed)?;
    let z = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok((x, z))
}

/// Advances the reader to the start of the named child, skipping over any
/// other subtrees at the current level.
fn find_child(reader: &mut Reader<&[u8]>, name: &[u8], context: &'static str) -> Result<()> {
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                if e.name().as_ref() == name {
                    return Ok(());
                }
                skip_element(reader, &e)?;
            }
            Event::End(_) | Event::Eof => {
                return Err(SavegameError::MissingElement {
                    element: element_label(name),
                    context,
                });
            }
            _ => {}
        }
    }
}

/// Consumes events up to and including the root element's start tag.
fn enter_document_root(reader: &mut Reader<&[u8]>) -> Result<()> {
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(_) => return Ok(()),
            Event::Eof => {
                return Err(SavegameError::MissingElement {
                    element: "root element",
                    context: "document",
                });
            }
            _ => {}
        }
    }
}

fn skip_element(reader: &mut Reader<&[u8]>, e: &BytesStart) -> Result<()> {
    reader.read_to_end(e.name()).map_err(xml_err)?;
    Ok(())
}

fn read_text<'a>(reader: &mut Reader<&'a [u8]>, e: &BytesStart) -> Result<Cow<'a, str>> {
    reader.read_text(e.name()).map_err(xml_err)
}

fn class_attribute(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"Class")
        .and_then(|attr| String::from_utf8(attr.value.to_vec()).ok())
}

fn element_label(name: &[u8]) -> &'static str {
    match name {
        b"game" => "game",
        b"maps" => "maps",
        b"li" => "li",
        _ => "element",
    }
}

fn xml_err(err: quick_xml::Error) -> SavegameError {
    SavegameError::Xml(err.to_string())
}
