//! §4.7 "Visibility & Line of Sight" (plus §4.7.5 telepathy/infravision).

use std::collections::HashMap;

use dungeon_core::catalog::RaceCatalog;
use dungeon_core::constants::MAX_SIGHT;
use dungeon_core::geometry::{bresenham_line, Point};
use dungeon_core::types::player::{KnownTerrain, RedrawFlags, UpdateFlags};
pub use dungeon_core::types::Perception;
use dungeon_core::types::{Chunk, Player};

/// `has_los(a, b)`, §4.7: a standard symmetric Bresenham walk, rejecting if
/// any intermediate cell is LOS-opaque. Used by monster AI, targeting, and
/// `scatter`.
pub fn has_los(chunk: &Chunk, a: Point, b: Point) -> bool {
    if !chunk.in_bounds(a) || !chunk.in_bounds(b) {
        return false;
    }
    let path = bresenham_line(a, b);
    for &p in &path {
        if p == a || p == b {
            continue;
        }
        if !chunk.in_bounds(p) || chunk.square(p).blocks_los() {
            return false;
        }
    }
    true
}

/// Light contribution at a square: self light radius at the player's own
/// grid, plus `SQUARE_GLOW`, plus adjacent permanent light. Infravision
/// (§4.7.5) extends visibility of warm-blooded monsters into unlit
/// squares within `infravision_radius`, modelled here as a boolean light
/// override scoped to monster perception rather than terrain lighting.
fn square_is_lit(chunk: &Chunk, grid: Point, light_radius: i32, origin: Point) -> bool {
    if chunk.square(grid).info.contains(dungeon_core::types::SquareInfo::GLOW) {
        return true;
    }
    grid.chebyshev(origin) <= light_radius
}

/// View update, §4.7: floodfill from the player's grid out to
/// [`MAX_SIGHT`], obeying wall opacity and lighting. Returns the set of
/// grids now in view; the caller diffs this against `known_terrain` to
/// build light-spot deltas.
pub fn compute_view(chunk: &Chunk, origin: Point, light_radius: i32) -> Vec<Point> {
    let mut visible = Vec::new();
    for p in chunk.iter_points() {
        let dist = p.chebyshev(origin);
        if dist > MAX_SIGHT {
            continue;
        }
        if !square_is_lit(chunk, p, light_radius, origin) {
            continue;
        }
        if has_los(chunk, origin, p) {
            visible.push(p);
        }
    }
    visible
}

/// Applies a freshly computed view to a player's per-chunk knowledge,
/// §4.7 "Per-player knowledge", marking each visible grid seen/currently
/// visible and clearing `currently_visible` on everything else. `NO_MAP`
/// grids are excluded from the seen-ever bit while still being
/// currently-visible, per §4.7 "specials".
pub fn apply_view(
    chunk: &Chunk,
    known: &mut HashMap<Point, KnownTerrain>,
    visible: &[Point],
) {
    for entry in known.values_mut() {
        entry.currently_visible = false;
    }
    for &grid in visible {
        let no_map = chunk
            .square(grid)
            .info
            .contains(dungeon_core::types::SquareInfo::NO_MAP);
        let entry = known.entry(grid).or_insert(KnownTerrain {
            seen: false,
            currently_visible: false,
            has_light_memory: false,
        });
        entry.currently_visible = true;
        if !no_map {
            entry.seen = true;
            entry.has_light_memory = true;
        }
    }
}

/// §4.7.5 telepathy: a player with an active ESP flag senses all monsters
/// within `radius` regardless of LOS or light. Entries produced this way
/// are [`Perception::Telepathy`] and never upgrade to `Visible` unless LOS
/// and light also hold (the caller must check both before overwriting).
pub fn telepathic_monsters(
    chunk: &Chunk,
    origin: Point,
    radius: i32,
) -> Vec<(usize, Perception)> {
    chunk
        .monsters
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_alive())
        .filter(|(_, m)| m.grid.chebyshev(origin) <= radius)
        .map(|(i, _)| (i, Perception::Telepathy))
        .collect()
}

/// §4.7 "Redraw flags". Player-level flags set by mutations and drained
/// at end-of-tick into protocol messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedrawDelta {
    pub redraw: RedrawFlags,
}

/// §4.7.5 "monster shadow table" rebuild: classifies every live monster
/// slot the player could possibly perceive, preferring telepathy (ignores
/// LOS and light) over ordinary sight, and extending sight into unlit
/// squares for warm-blooded monsters within the race's infravision radius.
/// `telepathy_radius <= 0` means the player currently has no ESP source.
fn rebuild_monster_perception(
    chunk: &Chunk,
    origin: Point,
    light_radius: i32,
    races: &dyn RaceCatalog,
    own_race: u32,
    telepathy_radius: i32,
) -> HashMap<usize, Perception> {
    let mut seen = HashMap::new();

    if telepathy_radius > 0 {
        for (idx, perception) in telepathic_monsters(chunk, origin, telepathy_radius) {
            seen.insert(idx, perception);
        }
    }

    let infravision_radius = races.infravision_radius(own_race);
    for (idx, monster) in chunk.monsters.iter().enumerate() {
        if seen.contains_key(&idx) || !monster.is_alive() {
            continue;
        }
        if !has_los(chunk, origin, monster.grid) {
            continue;
        }
        let lit = square_is_lit(chunk, monster.grid, light_radius, origin);
        let warm_in_range = monster
            .race
            .as_ref()
            .is_some_and(|r| races.is_warm_blooded(r.0) && monster.grid.chebyshev(origin) <= infravision_radius);
        if lit || warm_in_range {
            seen.insert(idx, Perception::Visible);
        }
    }

    seen
}

/// Runs a player's upkeep processor: update flags first
/// (inventory/bonus/spells, then view/distance/monsters), in the fixed
/// order §4.7 mandates, recomputing the view when `VIEW` fires and the
/// monster shadow table when `MONSTERS` fires. `telepathy_radius` is
/// whatever ESP source (race/item) currently grants the player sight
/// beyond LOS; `0` when none is active.
pub fn process_upkeep(player: &mut Player, chunk: &Chunk, races: &dyn RaceCatalog, telepathy_radius: i32) {
    let fired = player.upkeep.drain_update_order();
    for flag in fired {
        match flag {
            UpdateFlags::VIEW => {
                let light_radius = player.state.light_radius;
                let visible = compute_view(chunk, player.grid, light_radius);
                apply_view(chunk, &mut player.known_terrain, &visible);
                player.upkeep.redraw |= RedrawFlags::MAP;
            }
            UpdateFlags::MONSTERS | UpdateFlags::DISTANCE => {
                player.known_monsters = rebuild_monster_perception(
                    chunk,
                    player.grid,
                    player.state.light_radius,
                    races,
                    player.race,
                    telepathy_radius,
                );
                player.upkeep.redraw |= RedrawFlags::MAP;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::catalog::StaticCatalog;
    use dungeon_core::constants::Feature;
    use dungeon_core::types::actor::RaceId;
    use dungeon_core::types::{DungeonProfile, PlayerId};

    fn open_chunk(size: i32) -> Chunk {
        let mut chunk = Chunk::new(dungeon_core::geometry::WorldPos::new(0, 0, 1), size, size, DungeonProfile::Classic);
        for p in chunk.iter_points() {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
        chunk
    }

    #[test]
    fn los_is_blocked_by_an_intervening_wall() {
        let mut chunk = open_chunk(10);
        chunk.square_mut(Point::new(5, 5)).feat = Some(Feature::Granite);
        assert!(!has_los(&chunk, Point::new(0, 5), Point::new(9, 5)));
    }

    #[test]
    fn los_is_clear_on_an_open_floor() {
        let chunk = open_chunk(10);
        assert!(has_los(&chunk, Point::new(0, 0), Point::new(9, 9)));
    }

    #[test]
    fn view_update_applied_twice_is_idempotent() {
        let chunk = open_chunk(15);
        let origin = Point::new(7, 7);
        let mut known = HashMap::new();
        let visible = compute_view(&chunk, origin, 3);
        apply_view(&chunk, &mut known, &visible);
        let once = known.clone();
        apply_view(&chunk, &mut known, &visible);
        assert_eq!(once, known);
    }

    #[test]
    fn telepathy_senses_monsters_outside_los() {
        let mut chunk = open_chunk(15);
        chunk.square_mut(Point::new(5, 5)).feat = Some(Feature::Granite);
        let mut monster = dungeon_core::types::Monster::default();
        monster.race = Some(RaceId(1));
        monster.hp = 5;
        monster.maxhp = 5;
        monster.grid = Point::new(9, 5);
        chunk.monsters.push(monster);

        let catalog = StaticCatalog::default();
        let mut player = Player::new(PlayerId(1), "Hero", dungeon_core::geometry::WorldPos::new(0, 0, 1), Point::new(0, 5));
        player.upkeep.update = dungeon_core::types::player::UpdateFlags::MONSTERS;

        process_upkeep(&mut player, &chunk, &catalog, 20);

        assert_eq!(player.known_monsters.get(&1), Some(&Perception::Telepathy));
    }

    #[test]
    fn infravision_reveals_warm_blooded_monsters_in_the_dark() {
        let mut chunk = open_chunk(15);
        let mut monster = dungeon_core::types::Monster::default();
        monster.race = Some(RaceId(7));
        monster.hp = 5;
        monster.maxhp = 5;
        monster.grid = Point::new(3, 0);
        chunk.monsters.push(monster);

        let mut catalog = StaticCatalog::default();
        catalog.race_warm_blooded.insert(7, true);
        catalog.race_infravision.insert(0, 5);

        let mut player = Player::new(PlayerId(1), "Hero", dungeon_core::geometry::WorldPos::new(0, 0, 1), Point::new(0, 0));
        player.state.light_radius = 0;
        player.upkeep.update = dungeon_core::types::player::UpdateFlags::MONSTERS;

        process_upkeep(&mut player, &chunk, &catalog, 0);

        assert_eq!(player.known_monsters.get(&1), Some(&Perception::Visible));
    }
}
