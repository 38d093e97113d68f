//! §4.3 "Projection Engine". Given an origin, a geometric shape, an
//! element, a damage amount, and flags, compute the affected cells in
//! travel order and the damage dealt to each.

use dungeon_core::constants::Element;
use dungeon_core::geometry::{bresenham_line, round_half_even, Point};
use dungeon_core::types::Chunk;

bitflags::bitflags! {
    /// Travel flags, §4.3.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TravelFlags: u32 {
        const GRID    = 1 << 0;
        const ITEM    = 1 << 1;
        const KILL    = 1 << 2;
        const PLAY    = 1 << 3;
        const HIDE    = 1 << 4;
        const AWARE   = 1 << 5;
        const JUMP    = 1 << 6;
        const STOP    = 1 << 7;
        const THRU    = 1 << 8;
        const BEAM    = 1 << 9;
        const ARC     = 1 << 10;
        const CONST   = 1 << 11;
        const PROJECT = 1 << 12;
    }
}

/// Shape mode, §4.3 "Shapes".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Bolt,
    Beam,
    Ball,
    Cone { degrees_of_arc: i32 },
    Star,
    Blast,
    Spot,
}

/// Shape parameters, §4.3.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionParams {
    pub shape: Shape,
    pub radius: i32,
    /// Controls falloff strength; larger values narrow the falloff curve.
    /// Increases with narrower cones and "powerful" origins (§4.3).
    pub diameter_of_source: i32,
    pub flags: TravelFlags,
}

/// One affected cell plus the damage it should receive, in travel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectedCell {
    pub grid: Point,
    pub damage: i64,
}

/// Compute the set of affected cells in travel order for a projection from
/// `origin` toward `target`, per §4.3's shape-mode descriptions, and the
/// §4.3 "Damage scaling" rule: nominal damage, times a cone falloff
/// factor, minus resistance (applied by the caller per actor), times
/// `CONST ? 1 : linear_falloff`.
pub fn project(
    chunk: &Chunk,
    origin: Point,
    target: Point,
    damage: i64,
    params: ProjectionParams,
) -> Vec<AffectedCell> {
    match params.shape {
        Shape::Bolt => bolt(chunk, origin, target, damage, params, true),
        Shape::Beam => bolt(chunk, origin, target, damage, params, false),
        Shape::Ball => ball(chunk, target, damage, params),
        Shape::Blast => ball(chunk, origin, damage, params),
        Shape::Spot => vec![AffectedCell {
            grid: target,
            damage,
        }],
        Shape::Star => star(chunk, origin, damage, params),
        Shape::Cone { degrees_of_arc } => cone(chunk, origin, target, damage, params, degrees_of_arc),
    }
}

fn scaled_damage(distance: i32, damage: i64, params: &ProjectionParams) -> i64 {
    if params.flags.contains(TravelFlags::CONST) || params.radius == 0 {
        return damage;
    }
    let max_distance = params.radius.max(1) as i64;
    let remaining = (max_distance - distance as i64).max(0);
    damage * remaining / max_distance
}

fn bolt(
    chunk: &Chunk,
    origin: Point,
    target: Point,
    damage: i64,
    params: ProjectionParams,
    stop_on_obstruction: bool,
) -> Vec<AffectedCell> {
    let path = bresenham_line(origin, target);
    let mut affected = Vec::new();
    for (i, &grid) in path.iter().enumerate() {
        if grid == origin {
            continue;
        }
        if !chunk.in_bounds(grid) {
            break;
        }
        let square = chunk.square(grid);
        let blocked = square.blocks_los();
        let occupied = square.mon.is_some();
        affected.push(AffectedCell {
            grid,
            damage: scaled_damage(i as i32, damage, &params),
        });
        if stop_on_obstruction && (blocked || occupied) {
            break;
        }
    }
    affected
}

fn ball(chunk: &Chunk, centre: Point, damage: i64, params: ProjectionParams) -> Vec<AffectedCell> {
    let mut affected = Vec::new();
    for p in chunk.iter_points() {
        let dist = p.chebyshev(centre);
        if dist > params.radius {
            continue;
        }
        if !params.flags.contains(TravelFlags::THRU)
            && !crate::visibility::has_los(chunk, centre, p)
        {
            continue;
        }
        affected.push(AffectedCell {
            grid: p,
            damage: scaled_damage(dist, damage, &params),
        });
    }
    affected.sort_by_key(|c| c.grid.chebyshev(centre));
    affected
}

fn star(chunk: &Chunk, origin: Point, damage: i64, params: ProjectionParams) -> Vec<AffectedCell> {
    let mut affected = Vec::new();
    for &dir in &dungeon_core::constants::EIGHT_DIRECTIONS {
        let end = dungeon_core::geometry::next_grid(
            origin,
            dir,
        );
        let far = Point::new(
            origin.x + (end.x - origin.x) * params.radius.max(1),
            origin.y + (end.y - origin.y) * params.radius.max(1),
        );
        affected.extend(bolt(chunk, origin, far, damage, params, false));
    }
    affected
}

/// Cone/arc: cells whose angle from origin-to-target is within
/// `±degrees_of_arc/2`, within euclidean distance `radius`; intensity
/// scales with `diameter_of_source / (source_dist + diameter_of_source)`,
/// using banker's rounding per §9 open question 4.
fn cone(
    chunk: &Chunk,
    origin: Point,
    target: Point,
    damage: i64,
    params: ProjectionParams,
    degrees_of_arc: i32,
) -> Vec<AffectedCell> {
    let axis_angle = origin.angle_degrees_to(target);
    let half_arc = degrees_of_arc as f64 / 2.0;
    let mut affected = Vec::new();
    for p in chunk.iter_points() {
        if p == origin {
            continue;
        }
        let dist = origin.euclidean(p);
        if dist > params.radius as f64 {
            continue;
        }
        let angle = origin.angle_degrees_to(p);
        let mut delta = (angle - axis_angle).abs() % 360.0;
        if delta > 180.0 {
            delta = 360.0 - delta;
        }
        if delta > half_arc {
            continue;
        }
        let diameter = params.diameter_of_source.max(1) as i64;
        let dist_i = dist.round() as i64;
        let scaled = round_half_even(damage * diameter, diameter + dist_i);
        affected.push(AffectedCell {
            grid: p,
            damage: scaled.max(0),
        });
    }
    affected.sort_by(|a, b| {
        origin
            .euclidean(a.grid)
            .partial_cmp(&origin.euclidean(b.grid))
            .unwrap()
    });
    affected
}

/// Resistance multiplier application, §4.3.5: `Immune` zeroes, `Resist`
/// halves (floor), `Normal` passes through, `Vulnerable` (negative
/// `resist`) multiplies by 1.5 (floor). Stacking resistances from gear and
/// timed effects are summed by the caller before this is applied.
pub fn apply_resistance(damage: i64, resist: i8) -> i64 {
    if resist == dungeon_core::types::object::IMMUNE {
        return 0;
    }
    if resist > 0 {
        damage / 2
    } else if resist < 0 {
        (damage * 3) / 2
    } else {
        damage
    }
}

pub const ALL_ELEMENTS: [Element; 20] = Element::ALL;

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::constants::Feature;
    use dungeon_core::types::DungeonProfile;

    fn open_chunk(size: i32) -> Chunk {
        let mut chunk = Chunk::new(dungeon_core::geometry::WorldPos::new(0, 0, 1), size, size, DungeonProfile::Classic);
        for p in chunk.iter_points() {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
        chunk
    }

    #[test]
    fn bolt_affects_straight_line_and_stops_at_wall() {
        let mut chunk = open_chunk(20);
        chunk.square_mut(Point::new(5, 5)).feat = Some(Feature::Granite);
        let params = ProjectionParams {
            shape: Shape::Bolt,
            radius: 0,
            diameter_of_source: 4,
            flags: TravelFlags::STOP,
        };
        let cells = project(&chunk, Point::new(1, 1), Point::new(9, 9), 10, params);
        assert!(cells.iter().any(|c| c.grid == Point::new(5, 5)));
        assert!(!cells.iter().any(|c| c.grid == Point::new(6, 6)));
    }

    #[test]
    fn beam_hits_every_cell_on_path_exactly_once() {
        let chunk = open_chunk(20);
        let params = ProjectionParams {
            shape: Shape::Beam,
            radius: 0,
            diameter_of_source: 4,
            flags: TravelFlags::BEAM,
        };
        let cells = project(&chunk, Point::new(0, 0), Point::new(5, 0), 10, params);
        let mut grids: Vec<Point> = cells.iter().map(|c| c.grid).collect();
        grids.sort_by_key(|p| p.x);
        grids.dedup();
        assert_eq!(cells.len(), grids.len(), "no cell repeated");
        assert_eq!(cells.len(), 5);
    }

    #[test]
    fn ball_affects_chebyshev_disc() {
        let chunk = open_chunk(20);
        let params = ProjectionParams {
            shape: Shape::Ball,
            radius: 2,
            diameter_of_source: 4,
            flags: TravelFlags::THRU,
        };
        let centre = Point::new(10, 10);
        let cells = project(&chunk, centre, centre, 10, params);
        for cell in &cells {
            assert!(cell.grid.chebyshev(centre) <= 2);
        }
        assert!(cells.iter().any(|c| c.grid == centre));
    }

    #[test]
    fn resistance_halves_and_immunity_zeroes() {
        assert_eq!(apply_resistance(10, 0), 10);
        assert_eq!(apply_resistance(10, 1), 5);
        assert_eq!(apply_resistance(10, -1), 15);
        assert_eq!(apply_resistance(10, dungeon_core::types::object::IMMUNE), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use dungeon_core::constants::Feature;
    use dungeon_core::types::DungeonProfile;
    use proptest::prelude::*;

    fn open_chunk(size: i32) -> Chunk {
        let mut chunk = Chunk::new(dungeon_core::geometry::WorldPos::new(0, 0, 1), size, size, DungeonProfile::Classic);
        for p in chunk.iter_points() {
            chunk.square_mut(p).feat = Some(Feature::Floor);
        }
        chunk
    }

    proptest! {
        /// §4.3.5: resistance never increases magnitude beyond immune-zero
        /// or vulnerable's 1.5x, and never flips the sign of positive damage.
        #[test]
        fn apply_resistance_stays_within_expected_multiples(damage in 0i64..10_000, resist in any::<i8>()) {
            let reduced = apply_resistance(damage, resist);
            prop_assert!(reduced >= 0);
            if resist == dungeon_core::types::object::IMMUNE {
                prop_assert_eq!(reduced, 0);
            } else {
                prop_assert!(reduced <= damage * 3 / 2 + 1);
            }
        }

        /// §4.3 "Ball": every affected cell is within `radius` chebyshev
        /// distance of the centre, regardless of where the centre sits.
        #[test]
        fn ball_never_affects_cells_outside_its_radius(cx in 2i32..18, cy in 2i32..18, radius in 0i32..6) {
            let chunk = open_chunk(20);
            let centre = Point::new(cx, cy);
            let params = ProjectionParams {
                shape: Shape::Ball,
                radius,
                diameter_of_source: 4,
                flags: TravelFlags::THRU,
            };
            let cells = project(&chunk, centre, centre, 10, params);
            for cell in &cells {
                prop_assert!(cell.grid.chebyshev(centre) <= radius);
            }
        }
    }
}
