//! Per-cell record, §3 "Square".

use bitflags::bitflags;

use crate::constants::Feature;
use crate::types::actor::ActorRef;
use crate::types::object::ObjectHandle;

bitflags! {
    /// Square info bits, §3. Named identically to the spec's bullet list so
    /// grep for a flag in the spec finds it here unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SquareInfo: u32 {
        const VIEW          = 1 << 0;
        const SEEN          = 1 << 1;
        const GLOW          = 1 << 2;
        const ROOM          = 1 << 3;
        const VAULT         = 1 << 4;
        const WALL_OUTER    = 1 << 5;
        const WALL_INNER    = 1 << 6;
        const WALL_SOLID    = 1 << 7;
        const NO_STAIRS     = 1 << 8;
        const NO_TELEPORT   = 1 << 9;
        const LIMITED_TELE  = 1 << 10;
        const NO_MAP        = 1 << 11;
        const MON_RESTRICT  = 1 << 12;
        const CUSTOM_WALL   = 1 << 13;
        const STAIRS        = 1 << 14;
        const NOTRASH       = 1 << 15;
        const CLOSE_PLAYER  = 1 << 16;
    }
}

/// Per-cell record, §3 "Square". `mon` is `None` (empty), `Some(Monster(i))`
/// (`i > 0` slot index), or `Some(Player(id))` (negated-player-id in the
/// original C layout, represented here as a proper enum instead of sign
/// abuse per the Design Notes' "replace null semantics with option types").
#[derive(Debug, Clone, Default)]
pub struct Square {
    pub feat: Option<Feature>,
    pub info: SquareInfo,
    pub mon: Option<ActorRef>,
    pub obj: Option<ObjectHandle>,
    pub trap: Option<u32>,
}

impl Square {
    pub fn wall(feat: Feature) -> Self {
        Self {
            feat: Some(feat),
            ..Default::default()
        }
    }

    pub fn is_empty_of_actors(&self) -> bool {
        self.mon.is_none()
    }

    pub fn is_passable(&self) -> bool {
        self.feat.map(Feature::is_passable).unwrap_or(false)
    }

    pub fn blocks_los(&self) -> bool {
        self.feat.map(Feature::blocks_los).unwrap_or(true)
    }
}
