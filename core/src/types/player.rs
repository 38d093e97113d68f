//! §3 "Player". Owns identity, stats, derived state, and per-player
//! knowledge of its current chunk.

use std::collections::HashMap;

use crate::geometry::{Point, WorldPos};
use crate::types::object::ObjectHandle;
use crate::types::status::StatusTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

bitflags::bitflags! {
    /// Dirty flags that must be reprocessed before the redraw flags below
    /// are meaningful, §3 "upkeep". Order matters: §4.7 "the upkeep
    /// processor is idempotent and ordered: inventory/bonus/spells before
    /// view/distance/monsters".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UpdateFlags: u32 {
        const INVEN    = 1 << 0;
        const BONUS    = 1 << 1;
        const SPELLS   = 1 << 2;
        const VIEW     = 1 << 3;
        const DISTANCE = 1 << 4;
        const MONSTERS = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Per-player client redraw flags, drained at end-of-tick (§4.7).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RedrawFlags: u32 {
        const HP      = 1 << 0;
        const MANA    = 1 << 1;
        const SPEED   = 1 << 2;
        const ARMOR   = 1 << 3;
        const PLUSSES = 1 << 4;
        const MAP     = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Upkeep {
    pub update: UpdateFlags,
    pub redraw: RedrawFlags,
}

impl Upkeep {
    /// The fixed processing order §4.7 mandates: update flags first
    /// (inventory/bonus/spells, then view/distance/monsters), THEN redraw.
    /// Returns the update flags in the order they must be handled and
    /// clears them — idempotent, since calling it again with nothing newly
    /// set returns an empty vector.
    pub fn drain_update_order(&mut self) -> Vec<UpdateFlags> {
        const ORDER: [UpdateFlags; 6] = [
            UpdateFlags::INVEN,
            UpdateFlags::BONUS,
            UpdateFlags::SPELLS,
            UpdateFlags::VIEW,
            UpdateFlags::DISTANCE,
            UpdateFlags::MONSTERS,
        ];
        let mut fired = Vec::new();
        for flag in ORDER {
            if self.update.contains(flag) {
                fired.push(flag);
                self.update.remove(flag);
            }
        }
        fired
    }
}

/// Derived bonuses, §4.8. All fields are pure functions of base stats,
/// race, class, gear, and timed effects — no RNG, recomputed wholesale by
/// `calc_bonuses` (in the `engine` crate) rather than mutated incrementally.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerState {
    pub stats: [i32; 6],
    pub to_hit: i32,
    pub to_dam: i32,
    pub to_ac: i32,
    pub speed: i32,
    pub blows_per_round_x100: i32,
    pub shots_per_round_x100: i32,
    pub might: i32,
    pub skill_device: i32,
    pub skill_save: i32,
    pub skill_stealth: i32,
    pub skill_search: i32,
    pub skill_digging: i32,
    pub skill_disarm_phys: i32,
    pub skill_disarm_magic: i32,
    pub light_radius: i32,
    pub max_hp: i32,
    pub max_mana: i32,
    pub heavy_wield: bool,
    pub heavy_shoot: bool,
    pub bless_wield: bool,
    pub armor_cumber: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub race: u32,
    pub class: u32,
    pub level: u32,
    pub base_stats: [i32; 6],
    pub chp: i32,
    pub mhp: i32,
    pub csp: i32,
    pub msp: i32,
    pub energy: i32,
    pub speed: i32,
    pub timed: StatusTable,
    pub state: PlayerState,
    pub upkeep: Upkeep,
    pub gear: Vec<ObjectHandle>,
    pub body: [Option<ObjectHandle>; crate::constants::WEAR_SLOT_COUNT],
    pub grid: Point,
    pub wpos: WorldPos,
    pub dam_red: i32,
    pub is_dead: bool,
    pub died_from: Option<String>,
    pub known_terrain: HashMap<Point, KnownTerrain>,
    /// §4.7 "monster shadow table": how this player currently perceives
    /// each monster slot in their chunk, rebuilt each tick rather than
    /// incrementally patched.
    pub known_monsters: HashMap<usize, Perception>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTerrain {
    pub seen: bool,
    pub currently_visible: bool,
    pub has_light_memory: bool,
}

/// How a player currently perceives a given monster slot, §4.7 "monster
/// shadow table".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perception {
    Visible,
    Telepathy,
    Camouflaged,
    Invisible,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, wpos: WorldPos, grid: Point) -> Self {
        Self {
            id,
            name: name.into(),
            race: 0,
            class: 0,
            level: 1,
            base_stats: [10; 6],
            chp: 1,
            mhp: 1,
            csp: 0,
            msp: 0,
            energy: 0,
            speed: crate::constants::SPEED_BASE,
            timed: StatusTable::default(),
            state: PlayerState::default(),
            upkeep: Upkeep::default(),
            gear: Vec::new(),
            body: [None; crate::constants::WEAR_SLOT_COUNT],
            grid,
            wpos,
            dam_red: 0,
            is_dead: false,
            died_from: None,
            known_terrain: HashMap::new(),
            known_monsters: HashMap::new(),
        }
    }
}
