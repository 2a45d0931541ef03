//! Run tracing, the second phase of the graph computation.

use tracing::debug;

use crate::grid::{Direction, NodeId, ObstacleGrid, ObstacleKind};
use crate::math::{TileCoord, TilePos};

use super::segment::ObstacleSegment;

/// Why a directional walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkStop {
    /// No further edge in the walk direction.
    DeadEnd,
    /// The next node differs in kind or its return edge was already
    /// consumed; the walk stops on the near side and leaves it alone.
    TransitionOrProcessed,
    /// The next node is a junction; the walk stops on the junction itself
    /// so it is never passed through.
    Junction,
}

/// Terminal node of one directional walk, tagged with its stop reason.
#[derive(Debug, Clone, Copy)]
struct WalkEnd {
    node: NodeId,
    stop: WalkStop,
}

/// Converts the resolved adjacency into the minimal segment set.
///
/// Visits nodes in placement order; every still-untraced axis direction
/// seeds one bidirectional run. Each walk consumes at least one direction
/// bit per step, so the loop terminates with every mask full.
pub(crate) fn trace_segments(grid: &mut ObstacleGrid) -> Vec<ObstacleSegment> {
    let mut segments = Vec::new();
    let order = grid.order().to_vec();

    for &seed in &order {
        if !grid.data(seed).has_untraced_directions() {
            continue;
        }
        for direction in Direction::AXES {
            if grid.data(seed).was_traced(direction) {
                continue;
            }
            trace_run(grid, seed, direction, &mut segments);
        }
    }

    debug!(segments = segments.len(), "graph trace complete");
    segments
}

/// Traces the bidirectional run through `seed` along `direction`, emitting
/// its main segment and any junction spurs.
fn trace_run(
    grid: &mut ObstacleGrid,
    seed: NodeId,
    direction: Direction,
    segments: &mut Vec<ObstacleSegment>,
) {
    let kind = grid.data(seed).kind();
    let directions = [direction, direction.inverse()];

    let outward = walk(grid, seed, directions[0]);
    let backward = if grid.data(seed).cross_neighbor_count() > 2 {
        // A junction seed is its own second endpoint; walking on would let
        // the run pass through the junction.
        WalkEnd {
            node: seed,
            stop: WalkStop::Junction,
        }
    } else {
        walk(grid, seed, directions[1])
    };
    let ends = [outward, backward];

    let mut positions = [TilePos::center(TileCoord::new(0, 0)); 2];
    for (i, end) in ends.iter().enumerate() {
        let node = grid.data(end.node);
        let approach = directions[i];
        let junction = node.cross_neighbor_count() > 2;

        positions[i] = if end.stop == WalkStop::Junction
            || (end.stop == WalkStop::TransitionOrProcessed && junction)
        {
            // The run stops on a junction tile: the main segment ends at
            // its center and a spur carries the line on to the tile edge.
            // A single-tile run can land both ends on one junction node;
            // the spur is emitted once per physical junction edge.
            if ends[0].node != ends[1].node || i == 0 {
                segments.push(spur(node.position(), approach, kind));
            }
            TilePos::center(node.position())
        } else {
            // Dead ends and transition stops extend to the tile edge ahead,
            // so the terminal tile is covered out to where the next
            // structure (or open floor) begins.
            TilePos::new(node.position(), approach.frac_offset())
        };
    }

    segments.push(ObstacleSegment {
        ends: positions,
        kind,
    });
}

/// Walks from `start` along `direction`, consuming both sides of every
/// crossed edge, until a stop condition fires.
fn walk(grid: &mut ObstacleGrid, start: NodeId, direction: Direction) -> WalkEnd {
    let kind = grid.data(start).kind();
    let inverse = direction.inverse();
    let mut current = start;

    loop {
        if !grid.data(current).has_neighbor(direction) {
            grid.data_mut(current).mark_traced(direction);
            return WalkEnd {
                node: current,
                stop: WalkStop::DeadEnd,
            };
        }
        grid.data_mut(current).mark_traced(direction);

        let Some(next) = grid.neighbor_of(current, direction) else {
            // The mask promised a neighbor; resolution guarantees one.
            return WalkEnd {
                node: current,
                stop: WalkStop::DeadEnd,
            };
        };
        let next_node = grid.data(next);
        if next_node.kind() != kind || next_node.was_traced(inverse) {
            return WalkEnd {
                node: current,
                stop: WalkStop::TransitionOrProcessed,
            };
        }
        if next_node.cross_neighbor_count() > 2 {
            grid.data_mut(next).mark_traced(inverse);
            return WalkEnd {
                node: next,
                stop: WalkStop::Junction,
            };
        }

        grid.data_mut(next).mark_traced(inverse);
        current = next;
    }
}

fn spur(position: TileCoord, direction: Direction, kind: ObstacleKind) -> ObstacleSegment {
    ObstacleSegment {
        ends: [
            TilePos::center(position),
            TilePos::new(position, direction.frac_offset()),
        ],
        kind,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::compute_obstacle_graph;
    use super::*;
    use crate::math::TileVec;

    fn wall_grid(tiles: &[(i32, i32)]) -> ObstacleGrid {
        let mut grid = ObstacleGrid::new(TileVec::new(16, 16));
        for &(x, y) in tiles {
            grid.place(TileCoord::new(x, y), ObstacleKind::Wall).unwrap();
        }
        grid
    }

    /// Endpoint pair in map coordinates, smaller end first.
    fn span(segment: &ObstacleSegment) -> ((f64, f64), (f64, f64)) {
        let a = segment.ends[0].to_map();
        let b = segment.ends[1].to_map();
        if (a.1, a.0) <= (b.1, b.0) {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn spans(segments: &[ObstacleSegment]) -> Vec<((f64, f64), (f64, f64))> {
        let mut all: Vec<_> = segments.iter().map(span).collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        all
    }

    fn assert_full_coverage(grid: &ObstacleGrid) {
        for (_, node) in grid.iter() {
            assert!(
                !node.has_untraced_directions(),
                "node at {:?} left with untraced directions",
                node.position()
            );
        }
    }

    #[test]
    fn five_tile_strip_spans_edge_to_edge() {
        let mut grid = wall_grid(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let segments = compute_obstacle_graph(&mut grid);

        assert_eq!(segments.len(), 1, "expected a single segment");
        assert_eq!(segments[0].kind, ObstacleKind::Wall);
        assert_eq!(span(&segments[0]), ((-0.5, 0.0), (4.5, 0.0)));
        assert_full_coverage(&grid);
    }

    #[test]
    fn three_tile_run_dead_ends_at_far_edges() {
        let mut grid = wall_grid(&[(2, 3), (3, 3), (4, 3)]);
        let segments = compute_obstacle_graph(&mut grid);

        assert_eq!(spans(&segments), vec![((1.5, 3.0), (4.5, 3.0))]);
    }

    #[test]
    fn pillar_produces_no_segments() {
        let mut grid = wall_grid(&[(5, 5)]);
        let segments = compute_obstacle_graph(&mut grid);
        assert!(segments.is_empty(), "got {segments:?}");
        assert_full_coverage(&grid);
    }

    #[test]
    fn vertical_strip_spans_edge_to_edge() {
        let mut grid = wall_grid(&[(7, 2), (7, 3), (7, 4)]);
        let segments = compute_obstacle_graph(&mut grid);
        assert_eq!(spans(&segments), vec![((7.0, 1.5), (7.0, 4.5))]);
    }

    #[test]
    fn t_junction_emits_one_spur_per_branch() {
        // Horizontal arm through (2, 2) with a southward branch.
        let mut grid = wall_grid(&[(0, 2), (1, 2), (2, 2), (3, 2), (4, 2), (2, 3), (2, 4)]);
        let segments = compute_obstacle_graph(&mut grid);

        let junction = grid.node_at(TileCoord::new(2, 2)).unwrap();
        assert_eq!(grid.node(junction).unwrap().cross_neighbor_count(), 3);

        let center = (2.0, 2.0);
        let (spurs, branches): (Vec<_>, Vec<_>) = segments
            .iter()
            .map(span)
            .partition(|(a, b)| (b.0 - a.0).abs() + (b.1 - a.1).abs() == 0.5);

        assert_eq!(branches.len(), 3, "one segment per branch: {branches:?}");
        assert_eq!(spurs.len(), 3, "one spur per branch: {spurs:?}");
        for spur in &spurs {
            assert!(
                *spur == (center, (2.5, 2.0))
                    || *spur == ((1.5, 2.0), center)
                    || *spur == ((2.0, 1.5), center),
                "unexpected spur {spur:?}"
            );
        }
        // No two spurs share an edge.
        let mut unique = spurs.clone();
        unique.sort_by(|a, b| a.partial_cmp(b).unwrap());
        unique.dedup();
        assert_eq!(unique.len(), spurs.len());

        let mut expected_branches = vec![
            ((-0.5, 2.0), center),
            (center, (4.5, 2.0)),
            (center, (2.0, 4.5)),
        ];
        expected_branches.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut got = branches.clone();
        got.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(got, expected_branches);
        assert_full_coverage(&grid);
    }

    #[test]
    fn x_junction_emits_four_spurs() {
        let mut grid = wall_grid(&[
            (2, 0),
            (2, 1),
            (0, 2),
            (1, 2),
            (2, 2),
            (3, 2),
            (4, 2),
            (2, 3),
            (2, 4),
        ]);
        let segments = compute_obstacle_graph(&mut grid);

        let spur_count = segments
            .iter()
            .map(span)
            .filter(|(a, b)| (b.0 - a.0).abs() + (b.1 - a.1).abs() == 0.5)
            .count();
        assert_eq!(spur_count, 4, "one spur per crossing branch");
        assert_eq!(segments.len(), 8, "four branches plus four spurs");
        assert_full_coverage(&grid);
    }

    #[test]
    fn thick_wall_traces_one_line_per_layer_and_no_seam() {
        let mut tiles = Vec::new();
        for x in 0..10 {
            tiles.push((x, 0));
            tiles.push((x, 1));
        }
        let mut grid = wall_grid(&tiles);
        let segments = compute_obstacle_graph(&mut grid);

        let mut expected = vec![
            ((-0.5, 0.0), (9.5, 0.0)),
            ((0.0, -0.5), (0.0, 1.5)),
            ((9.0, -0.5), (9.0, 1.5)),
            ((-0.5, 1.0), (9.5, 1.0)),
        ];
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(spans(&segments), expected);
        assert_full_coverage(&grid);
    }

    #[test]
    fn parallel_walls_with_a_gap_trace_independently() {
        let mut tiles = Vec::new();
        for x in 0..6 {
            tiles.push((x, 0));
            tiles.push((x, 2));
        }
        let mut grid = wall_grid(&tiles);
        let segments = compute_obstacle_graph(&mut grid);

        assert_eq!(
            spans(&segments),
            vec![((-0.5, 0.0), (5.5, 0.0)), ((-0.5, 2.0), (5.5, 2.0))]
        );
    }

    #[test]
    fn square_room_traces_four_overlapping_walls() {
        let mut tiles = Vec::new();
        for i in 0..5 {
            tiles.push((i, 0));
            tiles.push((i, 4));
            tiles.push((0, i));
            tiles.push((4, i));
        }
        tiles.sort_unstable();
        tiles.dedup();
        let mut grid = wall_grid(&tiles);
        let segments = compute_obstacle_graph(&mut grid);

        assert_eq!(
            spans(&segments),
            vec![
                ((-0.5, 0.0), (4.5, 0.0)),
                ((-0.5, 4.0), (4.5, 4.0)),
                ((0.0, -0.5), (0.0, 4.5)),
                ((4.0, -0.5), (4.0, 4.5)),
            ]
        );
        assert_full_coverage(&grid);
    }

    #[test]
    fn door_between_walls_splits_the_run() {
        let mut grid = ObstacleGrid::new(TileVec::new(16, 16));
        for x in 0..3 {
            grid.place(TileCoord::new(x, 0), ObstacleKind::Wall).unwrap();
        }
        grid.place(TileCoord::new(3, 0), ObstacleKind::Door).unwrap();
        for x in 4..7 {
            grid.place(TileCoord::new(x, 0), ObstacleKind::Wall).unwrap();
        }
        let segments = compute_obstacle_graph(&mut grid);

        // A single-tile door has no same-kind neighbor: it is a pillar and
        // contributes no geometry. The wall runs stop at the shared edges.
        let walls: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == ObstacleKind::Wall)
            .cloned()
            .collect();
        let doors: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == ObstacleKind::Door)
            .collect();
        assert!(doors.is_empty(), "unexpected door geometry: {doors:?}");
        assert_eq!(
            spans(&walls),
            vec![((-0.5, 0.0), (2.5, 0.0)), ((3.5, 0.0), (6.5, 0.0))]
        );
        assert_full_coverage(&grid);
    }

    #[test]
    fn two_tile_door_emits_one_door_segment() {
        let mut grid = ObstacleGrid::new(TileVec::new(16, 16));
        grid.place(TileCoord::new(2, 0), ObstacleKind::Wall).unwrap();
        grid.place(TileCoord::new(3, 0), ObstacleKind::Door).unwrap();
        grid.place(TileCoord::new(4, 0), ObstacleKind::Door).unwrap();
        grid.place(TileCoord::new(5, 0), ObstacleKind::Wall).unwrap();
        let segments = compute_obstacle_graph(&mut grid);

        let doors: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == ObstacleKind::Door)
            .cloned()
            .collect();
        assert_eq!(spans(&doors), vec![((2.5, 0.0), (4.5, 0.0))]);
    }

    #[test]
    fn window_and_wall_strips_stay_separate() {
        let mut grid = ObstacleGrid::new(TileVec::new(16, 16));
        for x in 0..4 {
            grid.place(TileCoord::new(x, 0), ObstacleKind::Wall).unwrap();
            grid.place(TileCoord::new(x, 1), ObstacleKind::Window)
                .unwrap();
        }
        let segments = compute_obstacle_graph(&mut grid);

        assert_eq!(segments.len(), 2);
        let window: Vec<_> = segments
            .iter()
            .filter(|s| s.kind == ObstacleKind::Window)
            .cloned()
            .collect();
        assert_eq!(spans(&window), vec![((-0.5, 1.0), (3.5, 1.0))]);
    }

    #[test]
    fn recomputing_reproduces_the_same_segments() {
        let tiles = [(0, 2), (1, 2), (2, 2), (3, 2), (4, 2), (2, 3), (2, 4)];
        let mut grid = wall_grid(&tiles);
        let first = compute_obstacle_graph(&mut grid);
        // Resolution rebuilds the masks from scratch, so a second run over
        // the same grid reproduces the graph.
        let second = compute_obstacle_graph(&mut grid);
        assert_eq!(spans(&first), spans(&second));

        let mut other = wall_grid(&tiles);
        let replayed = compute_obstacle_graph(&mut other);
        assert_eq!(first, replayed);
    }
}
