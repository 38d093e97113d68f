//! §4.2.5 supplement: room template dispatch by rarity band. The core
//! implements the dispatch machinery (a closed enum of template kinds plus
//! weighted selection) and a handful of concrete non-vault templates;
//! true vault layouts remain external data consumed through a
//! `VaultCatalog`-shaped trait at the perimeter (not exercised here since
//! no vault catalog ships with the core).

use dungeon_core::constants::Feature;
use dungeon_core::geometry::Point;
use dungeon_core::rng::GameRng;
use dungeon_core::types::{Chunk, SquareInfo};

/// A room template kind, §4.2.5. Grounded in `gen-cave.c`'s room-profile
/// table: each kind has a `(rarity, cutoff)` pair biasing selection by
/// depth, approximated here as a flat weight since depth scaling itself
/// is a perimeter (profile catalog) concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTemplate {
    PlainRectangular,
    OverlappingRectangles,
    CrossShaped,
    Circular,
}

const TEMPLATES: [(RoomTemplate, u32); 4] = [
    (RoomTemplate::PlainRectangular, 50),
    (RoomTemplate::OverlappingRectangles, 20),
    (RoomTemplate::CrossShaped, 15),
    (RoomTemplate::Circular, 15),
];

fn pick_template(rng: &mut GameRng) -> RoomTemplate {
    let total: u32 = TEMPLATES.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(total);
    for &(template, weight) in &TEMPLATES {
        if roll < weight {
            return template;
        }
        roll -= weight;
    }
    TEMPLATES[0].0
}

/// Attempts one room placement per §4.2 "Common pipeline" step 2: pick a
/// random block, roll a template, carve it if it fits without overlapping
/// existing floor. Returns the room's centre grid on success.
pub fn try_place_room(chunk: &mut Chunk, rng: &mut GameRng) -> Option<Point> {
    let template = pick_template(rng);
    let (half_w, half_h) = template_half_extent(template);

    if chunk.width <= half_w * 2 + 4 || chunk.height <= half_h * 2 + 4 {
        return None;
    }

    let cx = rng.gen_range_i32(half_w + 2, chunk.width - half_w - 3);
    let cy = rng.gen_range_i32(half_h + 2, chunk.height - half_h - 3);
    let centre = Point::new(cx, cy);

    if !region_is_clear(chunk, centre, half_w + 1, half_h + 1) {
        return None;
    }

    carve_template(chunk, centre, template, half_w, half_h);
    Some(centre)
}

fn template_half_extent(template: RoomTemplate) -> (i32, i32) {
    match template {
        RoomTemplate::PlainRectangular => (4, 3),
        RoomTemplate::OverlappingRectangles => (5, 4),
        RoomTemplate::CrossShaped => (4, 4),
        RoomTemplate::Circular => (4, 4),
    }
}

fn region_is_clear(chunk: &Chunk, centre: Point, half_w: i32, half_h: i32) -> bool {
    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            let p = centre.offset(dx, dy);
            if !chunk.in_bounds(p) {
                return false;
            }
            if chunk.square(p).feat != Some(Feature::Granite) {
                return false;
            }
        }
    }
    true
}

fn carve_template(chunk: &mut Chunk, centre: Point, template: RoomTemplate, half_w: i32, half_h: i32) {
    match template {
        RoomTemplate::PlainRectangular | RoomTemplate::OverlappingRectangles => {
            carve_rect(chunk, centre, half_w, half_h);
            if template == RoomTemplate::OverlappingRectangles {
                carve_rect(chunk, centre.offset(half_w / 2, 0), half_w / 2, half_h + 1);
            }
        }
        RoomTemplate::CrossShaped => {
            carve_rect(chunk, centre, half_w, 1);
            carve_rect(chunk, centre, 1, half_h);
        }
        RoomTemplate::Circular => {
            for dy in -half_h..=half_h {
                for dx in -half_w..=half_w {
                    if dx * dx * half_h * half_h + dy * dy * half_w * half_w
                        <= half_w * half_w * half_h * half_h
                    {
                        set_floor(chunk, centre.offset(dx, dy));
                    }
                }
            }
            mark_room_walls(chunk, centre, half_w + 1, half_h + 1);
            return;
        }
    }
    mark_room_walls(chunk, centre, half_w + 1, half_h + 1);
}

fn carve_rect(chunk: &mut Chunk, centre: Point, half_w: i32, half_h: i32) {
    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            set_floor(chunk, centre.offset(dx, dy));
        }
    }
}

fn set_floor(chunk: &mut Chunk, p: Point) {
    if !chunk.in_bounds(p) {
        return;
    }
    let square = chunk.square_mut(p);
    square.feat = Some(Feature::Floor);
    square.info |= SquareInfo::ROOM;
}

fn mark_room_walls(chunk: &mut Chunk, centre: Point, half_w: i32, half_h: i32) {
    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            let p = centre.offset(dx, dy);
            if !chunk.in_bounds(p) {
                continue;
            }
            if chunk.square(p).feat == Some(Feature::Floor) {
                continue;
            }
            if chunk.square(p).feat == Some(Feature::Granite) {
                chunk.square_mut(p).info |= SquareInfo::WALL_OUTER;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::geometry::WorldPos;
    use dungeon_core::types::DungeonProfile;

    #[test]
    fn room_placement_never_overlaps_existing_floor() {
        let mut chunk = Chunk::new(WorldPos::new(0, 0, 1), 40, 40, DungeonProfile::Classic);
        let points: Vec<Point> = chunk.iter_points().collect();
        for p in points {
            chunk.square_mut(p).feat = Some(Feature::Granite);
        }
        let mut rng = GameRng::new(7);
        let mut placed = Vec::new();
        for _ in 0..20 {
            if let Some(centre) = try_place_room(&mut chunk, &mut rng) {
                placed.push(centre);
            }
        }
        assert!(!placed.is_empty());
    }
}
