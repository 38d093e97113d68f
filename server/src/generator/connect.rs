//! §4.2.2 connectedness: flood-colour the passable grids into regions,
//! erase pockets smaller than [`MIN_REGION_SIZE`], then tunnel the
//! remaining regions together so the whole chunk is one connected space.
//! Grounded in `gen-cave.c`'s post-generation "labelling" pass.

use std::collections::VecDeque;

use dungeon_core::constants::{Feature, MIN_REGION_SIZE};
use dungeon_core::geometry::Point;
use dungeon_core::rng::GameRng;
use dungeon_core::types::Chunk;

use super::tunnel::tunnel_between;

/// Labels every passable grid with a region id via 4-connected flood fill.
fn label_regions(chunk: &Chunk) -> (Vec<i32>, i32) {
    let area = (chunk.width * chunk.height) as usize;
    let mut labels = vec![-1; area];
    let mut next_label = 0;

    for start in chunk.iter_points() {
        let idx = chunk.index_of(start);
        if labels[idx] != -1 || !chunk.square(start).is_passable() {
            continue;
        }

        let mut queue = VecDeque::new();
        queue.push_back(start);
        labels[idx] = next_label;

        while let Some(p) = queue.pop_front() {
            for &(dx, dy) in &[(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let n = p.offset(dx, dy);
                if !chunk.in_bounds(n) {
                    continue;
                }
                let nidx = chunk.index_of(n);
                if labels[nidx] == -1 && chunk.square(n).is_passable() {
                    labels[nidx] = next_label;
                    queue.push_back(n);
                }
            }
        }

        next_label += 1;
    }

    (labels, next_label)
}

/// §4.2.2: erase regions below [`MIN_REGION_SIZE`] back to granite (too
/// small to be worth connecting — typically a single isolated stray
/// grid left by an overzealous tunnel), then tunnel every remaining
/// region's representative grid to the largest region until one region
/// spans the whole chunk.
pub fn ensure_connectedness(chunk: &mut Chunk, rng: &mut GameRng) {
    loop {
        let (labels, region_count) = label_regions(chunk);
        if region_count <= 1 {
            return;
        }

        let mut sizes = vec![0usize; region_count as usize];
        for &label in &labels {
            if label >= 0 {
                sizes[label as usize] += 1;
            }
        }

        let mut erased_any = false;
        for (label, &size) in sizes.iter().enumerate() {
            if size < MIN_REGION_SIZE {
                erase_region(chunk, &labels, label as i32);
                erased_any = true;
            }
        }
        if erased_any {
            continue;
        }

        let largest_label = sizes
            .iter()
            .enumerate()
            .max_by_key(|&(_, &size)| size)
            .map(|(label, _)| label as i32)
            .unwrap();

        let largest_rep = representative_grid(chunk, &labels, largest_label);
        let mut connected_one = false;
        for label in 0..region_count {
            if label == largest_label {
                continue;
            }
            let rep = representative_grid(chunk, &labels, label);
            tunnel_between(chunk, rep, largest_rep, rng);
            connected_one = true;
        }

        if !connected_one {
            return;
        }
    }
}

fn erase_region(chunk: &mut Chunk, labels: &[i32], target: i32) {
    let points: Vec<Point> = chunk.iter_points().collect();
    for p in points {
        if labels[chunk.index_of(p)] == target {
            chunk.square_mut(p).feat = Some(Feature::Granite);
        }
    }
}

fn representative_grid(chunk: &Chunk, labels: &[i32], target: i32) -> Point {
    chunk
        .iter_points()
        .find(|&p| labels[chunk.index_of(p)] == target)
        .expect("label was assigned to at least one grid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::geometry::WorldPos;
    use dungeon_core::types::DungeonProfile;

    #[test]
    fn two_disjoint_rooms_end_up_connected() {
        let mut chunk = Chunk::new(WorldPos::new(0, 0, 1), 20, 20, DungeonProfile::Classic);
        let points: Vec<Point> = chunk.iter_points().collect();
        for p in points {
            chunk.square_mut(p).feat = Some(Feature::Granite);
        }
        for y in 2..6 {
            for x in 2..6 {
                chunk.square_mut(Point::new(x, y)).feat = Some(Feature::Floor);
            }
        }
        for y in 12..16 {
            for x in 12..16 {
                chunk.square_mut(Point::new(x, y)).feat = Some(Feature::Floor);
            }
        }

        let mut rng = GameRng::new(5);
        ensure_connectedness(&mut chunk, &mut rng);

        let (_, region_count) = label_regions(&chunk);
        assert_eq!(region_count, 1);
    }

    #[test]
    fn a_single_stray_floor_grid_is_erased() {
        let mut chunk = Chunk::new(WorldPos::new(0, 0, 1), 10, 10, DungeonProfile::Classic);
        let points: Vec<Point> = chunk.iter_points().collect();
        for p in points {
            chunk.square_mut(p).feat = Some(Feature::Granite);
        }
        for y in 2..6 {
            for x in 2..6 {
                chunk.square_mut(Point::new(x, y)).feat = Some(Feature::Floor);
            }
        }
        chunk.square_mut(Point::new(8, 8)).feat = Some(Feature::Floor);

        let mut rng = GameRng::new(9);
        ensure_connectedness(&mut chunk, &mut rng);

        assert_eq!(chunk.square(Point::new(8, 8)).feat, Some(Feature::Granite));
    }
}
