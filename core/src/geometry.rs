//! Shared geometry: world positions, grid points, distance metrics, and the
//! small helpers the projection engine and generator both need.

use serde::{Deserialize, Serialize};

/// `(grid_x, grid_y, depth)`, §3 "World position". `depth == 0` is the
/// surface; `depth > 0` is a dungeon level under that surface tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub grid_x: i32,
    pub grid_y: i32,
    pub depth: i32,
}

impl WorldPos {
    pub fn new(grid_x: i32, grid_y: i32, depth: i32) -> Self {
        Self {
            grid_x,
            grid_y,
            depth,
        }
    }

    pub fn is_surface(self) -> bool {
        self.depth == 0
    }
}

/// A point within a single chunk's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn chebyshev(self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn manhattan(self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance, used by cone/arc angle-and-radius tests (§4.3,
    /// §8 "cone" invariant).
    pub fn euclidean(self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in degrees, `0` pointing along `+x`, increasing clockwise
    /// (`y` grows downward, matching the grid's row convention).
    pub fn angle_degrees_to(self, other: Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        dy.atan2(dx).to_degrees()
    }

    pub fn offset(self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Move one step from `src` along `dir` using the fixed keypad table,
/// §4.1 `next_grid`. `dir == 5` is a no-op. Total: any `u8` direction not in
/// `1..=9` is also treated as a no-op rather than panicking, since this
/// function is documented as total in §4.1.
pub fn next_grid(src: Point, dir: u8) -> Point {
    if !(1..=9).contains(&dir) {
        return src;
    }
    let dx = crate::constants::KEYPAD_DX[dir as usize];
    let dy = crate::constants::KEYPAD_DY[dir as usize];
    src.offset(dx, dy)
}

/// Generates ring offsets (all grid offsets at exactly, or within, a given
/// Chebyshev distance), replacing the teacher's precomputed
/// `dist_offsets_*` tables per §9 open question 3.
pub fn ring_offsets(max_dist: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::new();
    for dy in -max_dist..=max_dist {
        for dx in -max_dist..=max_dist {
            if dx.abs().max(dy.abs()) <= max_dist {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Banker's rounding (round-half-to-even) for a `numerator / denominator`
/// division, used for cone damage scaling (§9 open question 4).
pub fn round_half_even(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    let twice = remainder * 2;
    if twice < denominator {
        quotient
    } else if twice > denominator {
        quotient + 1
    } else if quotient % 2 == 0 {
        quotient
    } else {
        quotient + 1
    }
}

/// Bresenham line walk from `a` to `b`, inclusive of both endpoints, in
/// travel order. Used by line of sight (§4.7) and bolt/beam projection
/// (§4.3).
pub fn bresenham_line(a: Point, b: Point) -> Vec<Point> {
    let mut points = Vec::new();
    let (mut x0, mut y0) = (a.x, a.y);
    let (x1, y1) = (b.x, b.y);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        points.push(Point::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_grid_round_trips_for_all_eight_directions() {
        let origin = Point::new(10, 10);
        for &dir in &crate::constants::EIGHT_DIRECTIONS {
            let moved = next_grid(origin, dir);
            let back = next_grid(moved, crate::constants::opposite_direction(dir));
            assert_eq!(back, origin, "direction {dir} did not round-trip");
        }
    }

    #[test]
    fn next_grid_dir_five_is_identity() {
        let origin = Point::new(3, 4);
        assert_eq!(next_grid(origin, 5), origin);
    }

    #[test]
    fn next_grid_is_total_for_out_of_range_directions() {
        let origin = Point::new(0, 0);
        assert_eq!(next_grid(origin, 0), origin);
        assert_eq!(next_grid(origin, 200), origin);
    }

    #[test]
    fn bresenham_line_endpoints_included() {
        let line = bresenham_line(Point::new(0, 0), Point::new(3, 0));
        assert_eq!(line.first(), Some(&Point::new(0, 0)));
        assert_eq!(line.last(), Some(&Point::new(3, 0)));
        assert_eq!(line.len(), 4);
    }

    #[test]
    fn round_half_even_matches_bankers_rounding() {
        assert_eq!(round_half_even(5, 2), 2); // 2.5 -> 2 (even)
        assert_eq!(round_half_even(7, 2), 4); // 3.5 -> 4 (even)
        assert_eq!(round_half_even(4, 2), 2); // exact
    }

    #[test]
    fn ring_offsets_matches_chebyshev_ball() {
        let offsets = ring_offsets(2);
        for (dx, dy) in &offsets {
            assert!(dx.abs().max(dy.abs()) <= 2);
        }
        assert_eq!(offsets.len(), 25);
    }
}
