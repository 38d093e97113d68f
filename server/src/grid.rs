//! §4.1 "Grid/Chunk Model". Allocate, access, and free the per-level grid;
//! enforce occupancy and bounds.

use dungeon_core::constants::Feature;
use dungeon_core::error::{invariant_breach, GameResult};
use dungeon_core::geometry::Point;
use dungeon_core::rng::GameRng;
use dungeon_core::types::{ActorRef, Chunk, PlayerId};

/// `free(chunk)`, §4.1: releases squares, traps, object piles, monster
/// groups. Dropping the `Chunk` value does this automatically in Rust;
/// kept as an explicit function so call sites read the same as the spec
/// and so a future non-trivial teardown (e.g. notifying watchers) has a
/// single place to live.
pub fn free(chunk: Chunk) {
    drop(chunk);
}

/// `square(chunk, grid) -> square`, §4.1. Out-of-bounds is a programmer
/// bug; returns a [`GameResult`] rather than panicking directly so release
/// builds can log-and-continue per §7.
pub fn square(chunk: &Chunk, grid: Point) -> GameResult<&dungeon_core::types::Square> {
    if !chunk.in_bounds(grid) {
        return Err(invariant_breach(format!(
            "square() out of bounds: {grid:?} in a {}x{} chunk",
            chunk.width, chunk.height
        )));
    }
    Ok(chunk.square(grid))
}

pub fn actor_at(chunk: &Chunk, grid: Point) -> GameResult<Option<ActorRef>> {
    Ok(square(chunk, grid)?.mon)
}

pub fn monster_at(chunk: &Chunk, grid: Point) -> GameResult<Option<usize>> {
    Ok(match actor_at(chunk, grid)? {
        Some(ActorRef::Monster(idx)) => Some(idx),
        _ => None,
    })
}

pub fn player_at(chunk: &Chunk, grid: Point) -> GameResult<Option<PlayerId>> {
    Ok(match actor_at(chunk, grid)? {
        Some(ActorRef::Player(id)) => Some(id),
        _ => None,
    })
}

/// `set_feat(grid, feat)`, §4.1: replaces terrain and updates `feat_count`.
/// Per-observer redraw is the visibility layer's job (it watches
/// `feat_count`/chunk version via the scheduler's end-of-tick pass rather
/// than being invoked inline here).
pub fn set_feat(chunk: &mut Chunk, grid: Point, feat: Feature) -> GameResult<()> {
    if !chunk.in_bounds(grid) {
        return Err(invariant_breach(format!(
            "set_feat() out of bounds: {grid:?}"
        )));
    }
    let old = chunk.square(grid).feat;
    if let Some(old_feat) = old {
        if let Some(count) = chunk.feat_count.get_mut(&old_feat) {
            *count = count.saturating_sub(1);
        }
    }
    chunk.square_mut(grid).feat = Some(feat);
    *chunk.feat_count.entry(feat).or_insert(0) += 1;
    Ok(())
}

/// Scatter search predicate: §4.1 "optionally a caller predicate".
pub type ScatterPredicate<'a> = dyn Fn(&Chunk, Point) -> bool + 'a;

/// `scatter(origin, distance, need_los, pred) -> grid?`, §4.1. Picks a
/// uniform-random in-bounds grid within Chebyshev distance `d` (exact
/// distance for `d > 1` per the spec's "Chebyshev for d<=1, exact for
/// d>1" wording — here read as "within" for d<=1, matching the boundary
/// test `scatter(origin, d=0)` returning `origin` iff it satisfies the
/// predicate), optionally requiring LOS from `origin` and a predicate.
pub fn scatter(
    chunk: &Chunk,
    rng: &mut GameRng,
    origin: Point,
    distance: i32,
    need_los: bool,
    pred: Option<&ScatterPredicate>,
) -> Option<Point> {
    if distance == 0 {
        return satisfies(chunk, origin, origin, need_los, pred).then_some(origin);
    }

    let candidates: Vec<Point> = chunk
        .iter_points()
        .filter(|&p| p.chebyshev(origin) <= distance)
        .filter(|&p| satisfies(chunk, origin, p, need_los, pred))
        .collect();

    if candidates.is_empty() {
        return None;
    }
    let idx = rng.gen_range(candidates.len() as u32) as usize;
    Some(candidates[idx])
}

/// Vectorised `scatter`: returns up to `n` distinct feasible grids, chosen
/// by Fisher-Yates over the feasible set (§4.1).
pub fn scatter_many(
    chunk: &Chunk,
    rng: &mut GameRng,
    origin: Point,
    distance: i32,
    need_los: bool,
    pred: Option<&ScatterPredicate>,
    n: usize,
) -> Vec<Point> {
    let candidates: Vec<Point> = chunk
        .iter_points()
        .filter(|&p| p.chebyshev(origin) <= distance)
        .filter(|&p| satisfies(chunk, origin, p, need_los, pred))
        .collect();
    let picks = rng.choose_distinct(candidates.len(), n);
    picks.into_iter().map(|i| candidates[i]).collect()
}

fn satisfies(
    chunk: &Chunk,
    origin: Point,
    candidate: Point,
    need_los: bool,
    pred: Option<&ScatterPredicate>,
) -> bool {
    if need_los && !crate::visibility::has_los(chunk, origin, candidate) {
        return false;
    }
    pred.map(|p| p(chunk, candidate)).unwrap_or(true)
}

/// `next_grid(src, dir) -> grid`, §4.1: re-exported from `core` since the
/// keypad table and total-ness live with the rest of the geometry helpers.
pub use dungeon_core::geometry::next_grid;

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::types::DungeonProfile;

    fn test_chunk() -> Chunk {
        let mut chunk = Chunk::new(dungeon_core::geometry::WorldPos::new(0, 0, 1), 10, 10, DungeonProfile::Classic);
        let points: Vec<_> = chunk.iter_points().collect();
        for p in points {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
        chunk
    }

    #[test]
    fn set_feat_round_trips_and_updates_histogram() {
        let mut chunk = test_chunk();
        let p = Point::new(3, 3);
        set_feat(&mut chunk, p, Feature::Granite).unwrap();
        assert_eq!(chunk.square(p).feat, Some(Feature::Granite));
        assert_eq!(*chunk.feat_count.get(&Feature::Granite).unwrap(), 1);
    }

    #[test]
    fn scatter_zero_distance_returns_origin_iff_predicate_holds() {
        let chunk = test_chunk();
        let mut rng = GameRng::new(1);
        let origin = Point::new(5, 5);
        let always_true: &ScatterPredicate = &|_, _| true;
        assert_eq!(
            scatter(&chunk, &mut rng, origin, 0, false, Some(always_true)),
            Some(origin)
        );
        let always_false: &ScatterPredicate = &|_, _| false;
        assert_eq!(
            scatter(&chunk, &mut rng, origin, 0, false, Some(always_false)),
            None
        );
    }

    #[test]
    fn square_out_of_bounds_is_an_error() {
        let chunk = test_chunk();
        assert!(square(&chunk, Point::new(-1, 0)).is_err());
    }
}
