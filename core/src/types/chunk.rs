//! §3 "Chunk (level)". The unit of allocation.

use std::collections::HashMap;

use crate::constants::Feature;
use crate::geometry::{Point, WorldPos};
use crate::types::actor::{Monster, MonsterGroup};
use crate::types::object::Object;
use crate::types::square::Square;

/// Which generator strategy produced a chunk, §3 "profile" / §4.2
/// "Profiles and selection".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DungeonProfile {
    Classic,
    Modified,
    Moria,
    Labyrinth,
    Cavern,
    HardCentre,
    Lair,
    Gauntlet,
    Town,
    MangTown,
    Arena,
}

/// Canonical stair/rally grids, §3 "join".
#[derive(Debug, Clone, Default)]
pub struct JoinGrids {
    pub up: Vec<Point>,
    pub down: Vec<Point>,
    pub rand: Vec<Point>,
}

/// The unit of allocation, §3 "Chunk (level)".
#[derive(Debug, Clone)]
pub struct Chunk {
    pub wpos: WorldPos,
    pub height: i32,
    pub width: i32,
    pub squares: Vec<Square>,
    pub monsters: Vec<Monster>,
    pub mon_max: usize,
    pub mon_cnt: usize,
    pub monster_groups: Vec<MonsterGroup>,
    pub objects: Vec<Object>,
    pub feat_count: HashMap<Feature, u32>,
    pub join: JoinGrids,
    pub decoy: Option<Point>,
    pub profile: DungeonProfile,
    pub light_level: bool,
    pub good_item: bool,
    pub obj_rating: i32,
    /// Whether the chunk stays resident after its last player leaves
    /// (§GLOSSARY "Static level"; towns are pinned, dynamic towns are not).
    pub pinned: bool,
}

impl Chunk {
    /// `new(height, width)`, §4.1. Zero-initialised; the caller (generator)
    /// is responsible for walling the border (invariant 2).
    pub fn new(wpos: WorldPos, height: i32, width: i32, profile: DungeonProfile) -> Self {
        let area = (height * width).max(0) as usize;
        Self {
            wpos,
            height,
            width,
            squares: vec![Square::default(); area],
            monsters: vec![Monster::default()], // slot 0 reserved, §3 invariant
            mon_max: 1,
            mon_cnt: 0,
            monster_groups: Vec::new(),
            objects: Vec::new(),
            feat_count: HashMap::new(),
            join: JoinGrids::default(),
            decoy: None,
            profile,
            light_level: false,
            good_item: false,
            obj_rating: 0,
            pinned: false,
        }
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// `in_bounds_fully`, §4.1: a grid one step from any border is
    /// guaranteed to have all eight neighbours in-bounds too.
    pub fn in_bounds_fully(&self, p: Point) -> bool {
        p.x > 0 && p.y > 0 && p.x < self.width - 1 && p.y < self.height - 1
    }

    pub fn index_of(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// `square(chunk, grid)`, §4.1. Out-of-bounds is a programmer bug per
    /// §4.1 "Failure semantics"; callers that might legitimately be
    /// out-of-bounds must check `in_bounds` first.
    pub fn square(&self, p: Point) -> &Square {
        debug_assert!(self.in_bounds(p), "square() called out of bounds: {p:?}");
        &self.squares[self.index_of(p)]
    }

    pub fn square_mut(&mut self, p: Point) -> &mut Square {
        debug_assert!(
            self.in_bounds(p),
            "square_mut() called out of bounds: {p:?}"
        );
        let idx = self.index_of(p);
        &mut self.squares[idx]
    }

    pub fn iter_points(&self) -> impl Iterator<Item = Point> + '_ {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }
}
