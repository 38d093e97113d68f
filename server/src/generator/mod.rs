//! §4.2 "Level Generator". Produces a fully populated chunk satisfying all
//! level invariants from `(world-pos, depth, seed)`.

pub mod connect;
pub mod profiles;
pub mod rooms;
pub mod tunnel;

use dungeon_core::constants::{Feature, ROOM_ATTEMPT_CAP};
use dungeon_core::error::{GameError, GameResult};
use dungeon_core::geometry::{Point, WorldPos};
use dungeon_core::rng::GameRng;
use dungeon_core::types::{Chunk, DungeonProfile, JoinGrids, Square};

pub use tunnel::RoomLinkOrder;

/// Parameters a profile hands to the common pipeline, §4.2 "Common
/// pipeline".
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub wpos: WorldPos,
    pub depth: i32,
    pub height: i32,
    pub width: i32,
    pub profile: DungeonProfile,
    pub room_target: i32,
    pub link_order: RoomLinkOrder,
    /// The world's persistent seed, §4.2.3's `seed_wild` term in the
    /// town/wilderness seed formula. Constant for the life of a `World`,
    /// unlike `depth`, which varies per request.
    pub seed_wild: u32,
}

/// Folds a world position's two grid axes into the single `world_index`
/// term §4.2.3's seed formula expects.
pub fn world_index(wpos: WorldPos) -> u32 {
    (wpos.grid_x as u32).wrapping_mul(4096).wrapping_add(wpos.grid_y as u32)
}

/// `generate(profile, request, rng) -> Result<Chunk, GameError>` — the
/// top-level dispatcher named in §4.2 "Profiles and selection". Each
/// strategy is an independent procedure; selecting which one to call for
/// a given `(world-pos, depth)` is a perimeter policy, not the core's.
pub fn generate(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    match request.profile {
        DungeonProfile::Classic | DungeonProfile::Modified | DungeonProfile::Moria => {
            profiles::classic_family(request, rng)
        }
        DungeonProfile::Labyrinth => profiles::labyrinth(request, rng),
        DungeonProfile::Cavern => profiles::cavern(request, rng),
        DungeonProfile::HardCentre => profiles::hard_centre(request, rng),
        DungeonProfile::Lair => profiles::lair(request, rng),
        DungeonProfile::Gauntlet => profiles::gauntlet(request, rng),
        DungeonProfile::Town => profiles::town(request, rng),
        DungeonProfile::MangTown => profiles::mang_town(request, rng),
        DungeonProfile::Arena => profiles::arena(request, rng),
    }
}

/// §4.2 common pipeline step 1: allocate the chunk, fill with granite, and
/// draw the permanent wall border (chunk invariant 2).
pub fn allocate_and_wall(request: &GenerationRequest) -> Chunk {
    let mut chunk = Chunk::new(request.wpos, request.height, request.width, request.profile);
    let points: Vec<_> = chunk.iter_points().collect();
    for p in points {
        *chunk.square_mut(p) = Square::wall(Feature::Granite);
    }
    *chunk.feat_count.entry(Feature::Granite).or_insert(0) = (request.height * request.width) as u32;
    wall_border(&mut chunk);
    chunk
}

fn wall_border(chunk: &mut Chunk) {
    for x in 0..chunk.width {
        set_perm(chunk, Point::new(x, 0));
        set_perm(chunk, Point::new(x, chunk.height - 1));
    }
    for y in 0..chunk.height {
        set_perm(chunk, Point::new(0, y));
        set_perm(chunk, Point::new(chunk.width - 1, y));
    }
}

fn set_perm(chunk: &mut Chunk, p: Point) {
    let old = chunk.square(p).feat;
    if let Some(f) = old {
        if let Some(c) = chunk.feat_count.get_mut(&f) {
            *c = c.saturating_sub(1);
        }
    }
    chunk.square_mut(p).feat = Some(Feature::Perm);
    *chunk.feat_count.entry(Feature::Perm).or_insert(0) += 1;
}

/// §4.2 common pipeline steps 2-3: partition into blocks, attempt room
/// builds, and connect them with tunnels. Returns the grid chosen as the
/// centre of each successfully placed room, used by the caller to place
/// stairs and stock monsters.
pub fn place_and_connect_rooms(
    chunk: &mut Chunk,
    request: &GenerationRequest,
    rng: &mut GameRng,
) -> GameResult<Vec<Point>> {
    let mut centres = Vec::new();
    let mut attempts = 0;

    while centres.len() < request.room_target as usize && attempts < ROOM_ATTEMPT_CAP {
        attempts += 1;
        if let Some(centre) = rooms::try_place_room(chunk, rng) {
            centres.push(centre);
        }
    }

    if centres.is_empty() {
        return Err(GameError::GenerationFailed {
            profile: profile_name(request.profile),
            reason: "no room could be placed".into(),
        });
    }

    tunnel::connect_rooms(chunk, &centres, request.link_order, rng);
    connect::ensure_connectedness(chunk, rng);

    Ok(centres)
}

/// §4.2 common pipeline step 6: place stairs near walls, minimum
/// separation ~1/4 of the smaller side (§8 scenario 5).
pub fn place_stairs(
    chunk: &mut Chunk,
    rng: &mut GameRng,
    up_count: usize,
    down_count: usize,
) -> JoinGrids {
    let min_sep = (chunk.width.min(chunk.height) / 4).max(1);
    let mut placed: Vec<Point> = Vec::new();
    let mut join = JoinGrids::default();

    for (count, feat, target) in [
        (up_count, Feature::Less, &mut join.up),
        (down_count, Feature::More, &mut join.down),
    ] {
        let mut walls_required = 3;
        let mut placed_for_feat = 0;
        while placed_for_feat < count && walls_required >= 0 {
            if let Some(grid) = find_stair_spot(chunk, rng, walls_required, &placed, min_sep) {
                crate::grid::set_feat(chunk, grid, feat).ok();
                placed.push(grid);
                target.push(grid);
                placed_for_feat += 1;
            } else {
                walls_required -= 1;
            }
        }
    }

    join
}

fn find_stair_spot(
    chunk: &Chunk,
    rng: &mut GameRng,
    walls_required: i32,
    placed: &[Point],
    min_sep: i32,
) -> Option<Point> {
    let candidates: Vec<Point> = chunk
        .iter_points()
        .filter(|&p| chunk.in_bounds_fully(p))
        .filter(|&p| chunk.square(p).feat == Some(Feature::Floor))
        .filter(|&p| chunk.square(p).mon.is_none())
        .filter(|&p| count_adjacent_walls(chunk, p) == walls_required)
        .filter(|&p| placed.iter().all(|&q| p.chebyshev(q) >= min_sep))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(candidates.len() as u32) as usize])
}

fn count_adjacent_walls(chunk: &Chunk, p: Point) -> i32 {
    let mut count = 0;
    for &dir in &dungeon_core::constants::EIGHT_DIRECTIONS {
        let n = dungeon_core::geometry::next_grid(p, dir);
        if !chunk.in_bounds(n) || !chunk.square(n).is_passable() {
            count += 1;
        }
    }
    count
}

pub fn profile_name(profile: DungeonProfile) -> &'static str {
    match profile {
        DungeonProfile::Classic => "classic",
        DungeonProfile::Modified => "modified",
        DungeonProfile::Moria => "moria",
        DungeonProfile::Labyrinth => "labyrinth",
        DungeonProfile::Cavern => "cavern",
        DungeonProfile::HardCentre => "hard-centre",
        DungeonProfile::Lair => "lair",
        DungeonProfile::Gauntlet => "gauntlet",
        DungeonProfile::Town => "town",
        DungeonProfile::MangTown => "mang-town",
        DungeonProfile::Arena => "arena",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_wall_produces_a_permanent_border() {
        let request = GenerationRequest {
            wpos: WorldPos::new(0, 0, 1),
            depth: 1,
            height: 20,
            width: 20,
            profile: DungeonProfile::Classic,
            room_target: 6,
            link_order: RoomLinkOrder::Nearest,
            seed_wild: 1000,
        };
        let chunk = allocate_and_wall(&request);
        for x in 0..chunk.width {
            assert_eq!(chunk.square(Point::new(x, 0)).feat, Some(Feature::Perm));
            assert_eq!(
                chunk.square(Point::new(x, chunk.height - 1)).feat,
                Some(Feature::Perm)
            );
        }
        for y in 0..chunk.height {
            assert_eq!(chunk.square(Point::new(0, y)).feat, Some(Feature::Perm));
            assert_eq!(
                chunk.square(Point::new(chunk.width - 1, y)).feat,
                Some(Feature::Perm)
            );
        }
    }
}
