//! Engine constants. Ported in spirit from the teacher's `core::constants`
//! (tick rate, map bounds, flag tables) but re-scoped to the values this
//! spec actually names: the tick clock (§4.6), energy thresholds (§4.6),
//! sight/LOS bounds (§4.7), and the terrain feature codes (§6).

/// Ticks per (real) second of simulation. Same role as the teacher's
/// `core::constants::TICKS`.
pub const TICKS_PER_SECOND: u32 = 20;

/// Microseconds per tick, derived the same way the teacher derives `TICK`.
pub const TICK_MICROS: i64 = 1_000_000 / TICKS_PER_SECOND as i64;

/// One normal action's energy cost. §4.6, §GLOSSARY "Energy".
pub const ENERGY_NORMAL: i32 = 100;
/// A half-turn action's energy cost.
pub const ENERGY_HALF_TURN: i32 = 50;
/// Energy required before an actor may act at all.
pub const ENERGY_THRESHOLD: i32 = 100;

/// Base speed value; `speed_energy` is indexed by offset from this.
pub const SPEED_BASE: i32 = 110;
/// Speed is clamped to this inclusive range (§4.6).
pub const SPEED_MIN: i32 = 0;
pub const SPEED_MAX: i32 = 199;

/// Maximum sight distance used by the view-update floodfill (§4.7).
pub const MAX_SIGHT: i32 = 20;

/// Maximum projection range, used as the default "no fixed limit" radius
/// for breaths and line-of-sight projections (mirrors `z_info->max_range`
/// in `original_source/src/server/effect-handler-attack.c`).
pub const MAX_RANGE: i32 = 20;

/// Minimum breath cone width in degrees (`handler_breath`,
/// `original_source/src/server/effect-handler-attack.c`).
pub const MIN_BREATH_ARC_DEGREES: i32 = 20;

/// Starting diameter-of-source for cone/breath falloff (`handler_breath`).
pub const BASE_DIAMETER_OF_SOURCE: i32 = 4;

/// Hard cap on tunnel random-walk steps per §4.2.1.
pub const TUNNEL_STEP_CAP: u32 = 2000;
/// Hard cap on room placement attempts per level, §4.2.1.
pub const ROOM_ATTEMPT_CAP: u32 = 500;
/// Hard cap on store-placement attempts for town profiles, §4.2.1.
pub const STORE_ATTEMPT_CAP: u32 = 100;

/// Minimum size, in cells, a connected region must have to survive the
/// connectedness pass (§4.2.2); smaller regions are erased to solid wall.
pub const MIN_REGION_SIZE: usize = 9;

/// Monster-confusion random-direction chance, `CONF_RANDOM_CHANCE` in
/// `original_source` — expressed as "percent chance of keeping aim".
pub const MONSTER_CONFUSED_ACCURACY_DIVISOR: i32 = 100;

/// Terrain feature codes (§6 "Terrain feature codes", §3 "Square.feat").
/// A closed, stable enum: the generator and projection engine refer to
/// these by name, never by raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Floor,
    Granite,
    Perm,
    PermStatic,
    PermClear,
    Magma,
    Quartz,
    Rubble,
    PassRubble,
    Lava,
    Water,
    Sand,
    Less,
    More,
    DoorClosed,
    DoorOpen,
    DoorBroken,
    DoorSecret,
    Drawbridge,
    Fountain,
    FountainDried,
    Street,
    LooseDirt,
    Grass,
    Tree,
    StoreEntry(u8),
    HomeClosed,
    PermHouse,
    PermArena,
}

impl Feature {
    /// Whether an actor can walk onto this terrain.
    pub fn is_passable(self) -> bool {
        !matches!(
            self,
            Feature::Granite
                | Feature::Perm
                | Feature::PermStatic
                | Feature::PermClear
                | Feature::Magma
                | Feature::Quartz
                | Feature::DoorClosed
                | Feature::DoorSecret
                | Feature::PermHouse
        )
    }

    /// Whether this terrain blocks line of sight.
    pub fn blocks_los(self) -> bool {
        matches!(
            self,
            Feature::Granite
                | Feature::Perm
                | Feature::PermStatic
                | Feature::Magma
                | Feature::Quartz
                | Feature::DoorClosed
                | Feature::DoorSecret
                | Feature::PermHouse
                | Feature::Tree
        )
    }

    /// Whether this terrain is permanently indestructible rock.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            Feature::Perm | Feature::PermStatic | Feature::PermClear | Feature::PermHouse | Feature::PermArena
        )
    }

    pub fn is_stairs(self) -> bool {
        matches!(self, Feature::Less | Feature::More)
    }
}

/// Fixed 0..9 keypad-direction table, §4.1 `next_grid`. `5` is the no-op
/// direction. Indexed `0..=9`; index 0 is unused (kept to match the keypad
/// layout directly, as the teacher keys its `DX_*` direction constants from
/// 1).
pub const KEYPAD_DX: [i32; 10] = [0, -1, 0, 1, -1, 0, 1, -1, 0, 1];
pub const KEYPAD_DY: [i32; 10] = [0, 1, 1, 1, 0, 0, 0, -1, -1, -1];

/// The eight cardinal/diagonal keypad directions, excluding 5 (no-op).
/// Used by `STAR` shapes and by monster-confusion's uniform random choice.
pub const EIGHT_DIRECTIONS: [u8; 8] = [1, 2, 3, 4, 6, 7, 8, 9];

/// Returns the opposite keypad direction, used by the `next_grid`
/// round-trip property test (§8).
pub fn opposite_direction(dir: u8) -> u8 {
    match dir {
        1 => 9,
        2 => 8,
        3 => 7,
        4 => 6,
        6 => 4,
        7 => 3,
        8 => 2,
        9 => 1,
        other => other,
    }
}

/// Projection elements (§4.3 "a `projection type`"). Not exhaustive of
/// every meta-projection named in spec.md; the ones used by damage
/// resolution and resistance tables are modeled precisely, the purely
/// cosmetic/meta ones (`Alter`, `MonHeal`, `MonPoly`) are modeled as
/// non-elemental tags carried through the same `Element` type for dispatch
/// uniformity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Fire,
    Cold,
    Acid,
    Poison,
    Dark,
    Light,
    Disintegration,
    Time,
    Gravity,
    Plasma,
    Nexus,
    Chaos,
    Inertia,
    Sound,
    Shards,
    Force,
    Water,
    Lava,
    Ice,
    Missile,
    Meta,
}

impl Element {
    pub const ALL: [Element; 20] = [
        Element::Fire,
        Element::Cold,
        Element::Acid,
        Element::Poison,
        Element::Dark,
        Element::Light,
        Element::Disintegration,
        Element::Time,
        Element::Gravity,
        Element::Plasma,
        Element::Nexus,
        Element::Chaos,
        Element::Inertia,
        Element::Sound,
        Element::Shards,
        Element::Force,
        Element::Water,
        Element::Lava,
        Element::Ice,
        Element::Missile,
    ];
}

/// Wear/equipment slots, trimmed from the teacher's `WN_*` table to the
/// subset player-state derivation (§4.8) actually reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WearSlot {
    Head,
    Neck,
    Body,
    Arms,
    Belt,
    Legs,
    Feet,
    Shield,
    Weapon,
    Cloak,
    LeftRing,
    RightRing,
}

pub const WEAR_SLOT_COUNT: usize = 12;
pub const ALL_WEAR_SLOTS: [WearSlot; WEAR_SLOT_COUNT] = [
    WearSlot::Head,
    WearSlot::Neck,
    WearSlot::Body,
    WearSlot::Arms,
    WearSlot::Belt,
    WearSlot::Legs,
    WearSlot::Feet,
    WearSlot::Shield,
    WearSlot::Weapon,
    WearSlot::Cloak,
    WearSlot::LeftRing,
    WearSlot::RightRing,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_round_trip_cardinal_and_diagonal() {
        for &dir in &EIGHT_DIRECTIONS {
            assert_eq!(opposite_direction(opposite_direction(dir)), dir);
        }
    }

    #[test]
    fn five_is_a_no_op() {
        assert_eq!(KEYPAD_DX[5], 0);
        assert_eq!(KEYPAD_DY[5], 0);
    }
}
