//! §4.2.1 tunnel algorithm: carve a corridor between two points with a
//! biased random walk, piercing outer walls it crosses and marking them
//! solid so later passes don't reopen them. Grounded in `gen-cave.c`'s
//! `tunnel` step of the classic/moria profiles.

use dungeon_core::constants::TUNNEL_STEP_CAP;
use dungeon_core::geometry::Point;
use dungeon_core::rng::GameRng;
use dungeon_core::types::{Chunk, SquareInfo};
use dungeon_core::constants::Feature;

/// How room centres are linked into a spanning structure before tunnelling,
/// §4.2.5 supplement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomLinkOrder {
    /// Each room links to its nearest not-yet-linked neighbour (a greedy
    /// minimum-spanning approximation) — produces tight, natural-looking
    /// dungeons.
    Nearest,
    /// Rooms are linked in a randomly shuffled order — produces sprawling,
    /// less predictable corridors (used by labyrinth-adjacent profiles
    /// that still call into the common room pipeline).
    Scrambled,
}

/// Connects every room centre in `centres` with at least one tunnel,
/// forming a connected graph. `link_order` picks the edge strategy;
/// both produce a spanning tree over the centres plus the caller's later
/// `connect::ensure_connectedness` pass mopping up any leftover pockets.
pub fn connect_rooms(chunk: &mut Chunk, centres: &[Point], link_order: RoomLinkOrder, rng: &mut GameRng) {
    if centres.len() < 2 {
        return;
    }

    let order: Vec<usize> = match link_order {
        RoomLinkOrder::Nearest => nearest_order(centres),
        RoomLinkOrder::Scrambled => rng.choose_distinct(centres.len(), centres.len()),
    };

    for pair in order.windows(2) {
        tunnel(chunk, centres[pair[0]], centres[pair[1]], rng);
    }
}

/// Greedy nearest-neighbour chain starting from the first room: at each
/// step append the not-yet-visited room closest to the last one added.
fn nearest_order(centres: &[Point]) -> Vec<usize> {
    let mut visited = vec![false; centres.len()];
    let mut order = vec![0];
    visited[0] = true;

    while order.len() < centres.len() {
        let last = centres[*order.last().unwrap()];
        let next = (0..centres.len())
            .filter(|&i| !visited[i])
            .min_by_key(|&i| centres[i].chebyshev(last))
            .unwrap();
        visited[next] = true;
        order.push(next);
    }

    order
}

/// Public entry point for [`super::connect::ensure_connectedness`]'s
/// region-merging pass, which needs the same biased walk but operates on
/// representative grids rather than room centres.
pub fn tunnel_between(chunk: &mut Chunk, from: Point, to: Point, rng: &mut GameRng) {
    tunnel(chunk, from, to, rng);
}

/// §4.2.1: biased random walk from `from` toward `to`, re-aiming with
/// probability `tun.chg` every step and taking a fully random step with
/// probability `tun.rnd`. Piercing an outer wall marks it
/// [`SquareInfo::WALL_SOLID`] once passed so later tunnels don't widen the
/// same breach. Hard-capped at [`TUNNEL_STEP_CAP`] steps.
fn tunnel(chunk: &mut Chunk, from: Point, to: Point, rng: &mut GameRng) {
    const CHANCE_TO_RANDOM_STEP: f64 = 0.10;
    const CHANCE_TO_REAIM: f64 = 0.25;

    let mut pos = from;
    let mut heading = step_toward(pos, to);

    for _ in 0..TUNNEL_STEP_CAP {
        if pos == to {
            break;
        }

        if rng.gen_bool(CHANCE_TO_REAIM) {
            heading = step_toward(pos, to);
        }

        let delta = if rng.gen_bool(CHANCE_TO_RANDOM_STEP) {
            random_unit_step(rng)
        } else {
            heading
        };

        let next = pos.offset(delta.0, delta.1);
        if !chunk.in_bounds(next) {
            break;
        }

        pierce(chunk, next);
        pos = next;
    }
}

fn step_toward(from: Point, to: Point) -> (i32, i32) {
    (
        (to.x - from.x).signum(),
        (to.y - from.y).signum(),
    )
}

fn random_unit_step(rng: &mut GameRng) -> (i32, i32) {
    const STEPS: [(i32, i32); 8] = [
        (1, 0), (-1, 0), (0, 1), (0, -1),
        (1, 1), (1, -1), (-1, 1), (-1, -1),
    ];
    STEPS[rng.gen_range(STEPS.len() as u32) as usize]
}

/// Carves one grid of the tunnel. Granite becomes floor; an already-placed
/// permanent outer wall is pierced to floor and marked
/// [`SquareInfo::WALL_SOLID`] so it reads as a deliberate doorway rather
/// than an unintended breach; floor and other passable terrain are left
/// untouched (the tunnel simply passes through).
fn pierce(chunk: &mut Chunk, p: Point) {
    let square = chunk.square(p);
    let was_outer_wall = square.info.contains(SquareInfo::WALL_OUTER) || square.feat == Some(Feature::Perm);

    match square.feat {
        Some(Feature::Granite) | Some(Feature::Magma) | Some(Feature::Quartz) => {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
        Some(Feature::Perm) if was_outer_wall => {
            chunk.square_mut(p).feat = Some(Feature::Floor);
            chunk.square_mut(p).info |= SquareInfo::WALL_SOLID;
            chunk.square_mut(p).info.remove(SquareInfo::WALL_OUTER);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::geometry::WorldPos;
    use dungeon_core::types::DungeonProfile;

    fn granite_chunk(w: i32, h: i32) -> Chunk {
        let mut chunk = Chunk::new(WorldPos::new(0, 0, 1), h, w, DungeonProfile::Classic);
        let points: Vec<Point> = chunk.iter_points().collect();
        for p in points {
            chunk.square_mut(p).feat = Some(Feature::Granite);
        }
        chunk
    }

    #[test]
    fn tunnel_carves_floor_between_endpoints() {
        let mut chunk = granite_chunk(30, 30);
        let mut rng = GameRng::new(3);
        let from = Point::new(2, 2);
        let to = Point::new(25, 25);
        tunnel(&mut chunk, from, to, &mut rng);
        let carved = chunk
            .iter_points()
            .filter(|&p| chunk.square(p).feat == Some(Feature::Floor))
            .count();
        assert!(carved > 0);
    }

    #[test]
    fn connect_rooms_links_every_centre() {
        let mut chunk = granite_chunk(40, 40);
        let centres = vec![Point::new(5, 5), Point::new(30, 5), Point::new(30, 30), Point::new(5, 30)];
        let mut rng = GameRng::new(11);
        connect_rooms(&mut chunk, &centres, RoomLinkOrder::Nearest, &mut rng);
        let floor_count = chunk
            .iter_points()
            .filter(|&p| chunk.square(p).feat == Some(Feature::Floor))
            .count();
        assert!(floor_count > 0);
    }
}
