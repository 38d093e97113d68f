//! Monster table and the actor-occupant identity, §3 "Actor", "Monster".

use std::collections::HashMap;

use crate::geometry::Point;
use crate::types::player::PlayerId;
use crate::types::status::StatusTable;

/// Identifies whatever occupies a square: a monster slot or a player.
/// Replaces the original's sign-encoded `square.mon` (`>0` monster slot,
/// `<0` negated player id) with a real sum type, per Design Notes §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRef {
    Monster(usize),
    Player(PlayerId),
}

/// Immutable species record a monster points to. The engine treats the
/// catalog of races as external data (§6); this is the shape the core
/// expects to receive per monster.
#[derive(Debug, Clone)]
pub struct RaceId(pub u32);

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MonsterFlags: u32 {
        const AWAKE       = 1 << 0;
        const VISIBLE     = 1 << 1;
        const CAMOUFLAGED = 1 << 2;
        const HELD        = 1 << 3;
        const NEVER_MOVE  = 1 << 4;
        const DECOY       = 1 << 5;
    }
}

/// §3 "Monster". `race.is_none()` means the slot is free, satisfying the
/// invariant `monsters[i].race != null ⇔ monster slot i is live`.
#[derive(Debug, Clone)]
pub struct Monster {
    pub race: Option<RaceId>,
    pub grid: Point,
    pub hp: i32,
    pub maxhp: i32,
    pub energy: i32,
    pub speed: i32,
    pub timed: StatusTable,
    pub midx: usize,
    pub master: Option<PlayerId>,
    pub flags: MonsterFlags,
    pub group: Option<usize>,
    pub base_xp: u64,
}

impl Default for Monster {
    fn default() -> Self {
        Self {
            race: None,
            grid: Point::default(),
            hp: 0,
            maxhp: 0,
            energy: 0,
            speed: crate::constants::SPEED_BASE,
            timed: StatusTable::default(),
            midx: 0,
            master: None,
            flags: MonsterFlags::empty(),
            group: None,
            base_xp: 0,
        }
    }
}

impl Monster {
    pub fn is_live(&self) -> bool {
        self.race.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.is_live() && self.hp > 0
    }
}

/// Per-group bookkeeping for pack AI, §3 "monster_groups".
#[derive(Debug, Clone, Default)]
pub struct MonsterGroup {
    pub members: Vec<usize>,
    pub leader: Option<usize>,
    pub hostile_to: HashMap<PlayerId, bool>,
}
