//! §6 "Data files consumed". The core never parses a file format itself;
//! the perimeter hands it typed catalogs instead. `StaticCatalog` is an
//! in-memory test double exercising the traits without any file I/O.

use std::collections::HashMap;

use crate::constants::Feature;
use crate::types::chunk::DungeonProfile;

/// Per-terrain-feature static properties the generator and projection
/// engine need (passability/LOS is already on `Feature` itself; this trait
/// covers everything that genuinely comes from a data file, like display
/// and digging difficulty).
pub trait TerrainCatalog {
    fn dig_difficulty(&self, feat: Feature) -> i32;
    fn name(&self, feat: Feature) -> &str;
}

/// Per-race static properties (§4.5, §4.7.5 infravision/ESP).
pub trait RaceCatalog {
    fn base_hp_dice(&self, race: u32) -> (i32, i32);
    fn base_speed(&self, race: u32) -> i32;
    fn base_xp(&self, race: u32) -> u64;
    fn infravision_radius(&self, race: u32) -> i32;
    fn is_warm_blooded(&self, race: u32) -> bool;
}

/// Profile-level generation parameters that are tuned rather than derived
/// (room count targets, size bounds) — §4.2 "Profiles and selection".
pub trait DungeonProfileCatalog {
    fn min_depth(&self, profile: DungeonProfile) -> i32;
    fn max_depth(&self, profile: DungeonProfile) -> i32;
    fn room_target(&self, profile: DungeonProfile, depth: i32) -> i32;
}

/// An in-memory catalog for tests: fixed answers, no file I/O.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub dig_difficulty: HashMap<Feature, i32>,
    pub terrain_names: HashMap<Feature, String>,
    pub race_hp_dice: HashMap<u32, (i32, i32)>,
    pub race_speed: HashMap<u32, i32>,
    pub race_xp: HashMap<u32, u64>,
    pub race_infravision: HashMap<u32, i32>,
    pub race_warm_blooded: HashMap<u32, bool>,
    pub profile_min_depth: HashMap<DungeonProfile, i32>,
    pub profile_max_depth: HashMap<DungeonProfile, i32>,
}

impl TerrainCatalog for StaticCatalog {
    fn dig_difficulty(&self, feat: Feature) -> i32 {
        self.dig_difficulty.get(&feat).copied().unwrap_or(0)
    }

    fn name(&self, feat: Feature) -> &str {
        self.terrain_names
            .get(&feat)
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

impl RaceCatalog for StaticCatalog {
    fn base_hp_dice(&self, race: u32) -> (i32, i32) {
        self.race_hp_dice.get(&race).copied().unwrap_or((1, 1))
    }

    fn base_speed(&self, race: u32) -> i32 {
        self.race_speed
            .get(&race)
            .copied()
            .unwrap_or(crate::constants::SPEED_BASE)
    }

    fn base_xp(&self, race: u32) -> u64 {
        self.race_xp.get(&race).copied().unwrap_or(0)
    }

    fn infravision_radius(&self, race: u32) -> i32 {
        self.race_infravision.get(&race).copied().unwrap_or(0)
    }

    fn is_warm_blooded(&self, race: u32) -> bool {
        self.race_warm_blooded.get(&race).copied().unwrap_or(false)
    }
}

impl DungeonProfileCatalog for StaticCatalog {
    fn min_depth(&self, profile: DungeonProfile) -> i32 {
        self.profile_min_depth.get(&profile).copied().unwrap_or(0)
    }

    fn max_depth(&self, profile: DungeonProfile) -> i32 {
        self.profile_max_depth
            .get(&profile)
            .copied()
            .unwrap_or(127)
    }

    fn room_target(&self, _profile: DungeonProfile, depth: i32) -> i32 {
        (depth / 5).clamp(4, 40)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_catalog_falls_back_to_defaults() {
        let catalog = StaticCatalog::default();
        assert_eq!(catalog.dig_difficulty(Feature::Granite), 0);
        assert_eq!(catalog.base_speed(0), crate::constants::SPEED_BASE);
        assert!(!catalog.is_warm_blooded(0));
    }
}
