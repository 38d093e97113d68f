//! §6 "Configuration". One field per named option, loaded from the
//! environment via `dotenvy` (matching the teacher server's existing
//! dependency on it), with typed defaults so a missing `.env` still boots.

use serde::{Deserialize, Serialize};

/// Wilderness/dungeon access policy, §6 `diving_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DivingMode {
    WildernessAndDungeons = 0,
    DungeonsOnly = 1,
    NoWildernessExits = 2,
    FullIronman = 3,
}

/// Stair connectivity policy, §6 `limit_stairs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LimitStairs {
    Normal = 0,
    OnePerLevel = 1,
    Disconnect = 2,
}

/// The full typed option table, §6. Each field's doc comment names the §4
/// component it affects, per §6's closing sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// §4.2.3 town/wilderness generation: which chunks exist at all.
    pub diving_mode: DivingMode,
    /// §4.6 level transition protocol: how stairs connect chunks.
    pub limit_stairs: LimitStairs,
    /// §4.5 actor resolution: gate item pickup/equip by `level_req`.
    pub level_req: bool,
    /// §4.6 scheduler: turns before a retired character's effects lapse.
    pub retire_timer: u32,
    /// §4.5 actor resolution death handling: artifact preservation policy, 0..3.
    pub preserve_artifacts: u8,
    /// §4.6 level transition: disable ghost-mode traversal entirely.
    pub no_ghost: bool,
    /// §4.2.3: allow more than one generated town per world.
    pub more_towns: bool,
    /// §4.2 generator stocking: suppress artifact placement.
    pub no_artifacts: bool,
    /// §4.2 generator: compute and report level feelings (`light_level`/`obj_rating`).
    pub level_feelings: bool,
    /// §4.6 entity lifecycle: percent chance per tick a static level unsticks.
    pub level_unstatic_chance: u8,
    /// §4.2 generator stocking: scale gold drops to vanilla tables instead of scaled ones.
    pub gold_drop_vanilla: bool,
    /// §4.5 actor resolution: monster AI remembers player tactics across encounters.
    pub ai_learn: bool,
    /// §4.2/§4.6: raise depth-scaled difficulty knobs.
    pub challenging_levels: bool,
    /// §4.2 generator: disable wide corridors/openings (singleplayer-style layouts).
    pub turn_based: bool,
    /// §4.5 actor resolution: forbid new characters from dropping items.
    pub newbies_cannot_drop: bool,
    /// §4.5 actor resolution: disable theft between players.
    pub no_steal: bool,
    /// §4.2 generator stocking: base monster count per level.
    pub base_monsters: u32,
    /// §4.2 generator stocking: extra monsters added per level.
    pub extra_monsters: u32,
    /// §4.6 level transition: allow ghosts to dive below their max depth.
    pub ghost_diving: bool,
    /// §4.2 town generator: house floor area in squares.
    pub house_floor_size: u32,
    /// §4.6 scheduler: scales the tick rate relative to wall-clock time.
    pub constant_time_factor: u32,
    /// §4.5 actor resolution: classic (vs. modern) experience-on-kill scaling.
    pub classic_exp_factor: bool,
    /// §4.7.5 visibility: cap ESP/telepathy radius regardless of gear bonus.
    pub limited_esp: bool,
    /// §4.2 town generator: restrict which stores are generated, 0..3.
    pub limited_stores: u8,
    /// §4.6: refuse new connections once the instance is marked closed.
    pub instance_closed: bool,
    /// §4.5 actor resolution: whether player-vs-player damage is ever applied.
    pub pvp_hostility: bool,
    /// §4.6 scheduler: relax per-tick connection-liveness checks.
    pub lazy_connections: bool,
    /// §4.6 level transition: parties share level-feeling knowledge.
    pub party_sharelevel: bool,
    /// §4.5 actor resolution: cap recharge-failure backfire damage.
    pub safe_recharge: bool,
    /// §4.2 town generator: double the gold value of store purchases.
    pub double_purse: bool,
    /// perimeter account policy: accounts are not in the core's scope, kept for completeness.
    pub max_account_chars: u32,
    /// §4.6 scheduler: whether a fainting player is disconnected.
    pub disconnect_fainting: bool,
    /// §4.6 scheduler: idle-quit timeout in ticks.
    pub quit_timeout: u32,
    /// §4.2 town generator: MAngband-style town layout extras.
    pub mang_meta: bool,
    /// perimeter character-dump rendering option, out of the core's scope; kept for completeness.
    pub chardump_color: bool,
    /// perimeter character-dump rendering option, out of the core's scope; kept for completeness.
    pub chardump_label: bool,
    /// perimeter client preference loading, out of the core's scope; kept for completeness.
    pub load_pref_file: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            diving_mode: DivingMode::WildernessAndDungeons,
            limit_stairs: LimitStairs::Normal,
            level_req: true,
            retire_timer: 0,
            preserve_artifacts: 1,
            no_ghost: false,
            more_towns: false,
            no_artifacts: false,
            level_feelings: true,
            level_unstatic_chance: 0,
            gold_drop_vanilla: false,
            ai_learn: false,
            challenging_levels: false,
            turn_based: false,
            newbies_cannot_drop: false,
            no_steal: false,
            base_monsters: 4,
            extra_monsters: 0,
            ghost_diving: false,
            house_floor_size: 16,
            constant_time_factor: 1,
            classic_exp_factor: false,
            limited_esp: false,
            limited_stores: 0,
            instance_closed: false,
            pvp_hostility: false,
            lazy_connections: false,
            party_sharelevel: false,
            safe_recharge: false,
            double_purse: false,
            max_account_chars: 6,
            disconnect_fainting: false,
            quit_timeout: 0,
            mang_meta: false,
            chardump_color: true,
            chardump_label: true,
            load_pref_file: true,
        }
    }
}

impl Default for DivingMode {
    fn default() -> Self {
        DivingMode::WildernessAndDungeons
    }
}

impl Default for LimitStairs {
    fn default() -> Self {
        LimitStairs::Normal
    }
}

impl EngineConfig {
    /// Load from process environment (via `.env`, matching the teacher's
    /// `dotenvy` use), falling back to [`EngineConfig::default`] for any
    /// variable that is absent or fails to parse.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = EngineConfig::default();

        if let Ok(raw) = std::env::var("ENGINE_BASE_MONSTERS") {
            if let Ok(value) = raw.parse() {
                config.base_monsters = value;
            }
        }
        if let Ok(raw) = std::env::var("ENGINE_EXTRA_MONSTERS") {
            if let Ok(value) = raw.parse() {
                config.extra_monsters = value;
            }
        }
        if let Ok(raw) = std::env::var("ENGINE_MORE_TOWNS") {
            config.more_towns = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        if let Ok(raw) = std::env::var("ENGINE_NO_ARTIFACTS") {
            config.no_artifacts = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        if let Ok(raw) = std::env::var("ENGINE_CHALLENGING_LEVELS") {
            config.challenging_levels = raw == "1" || raw.eq_ignore_ascii_case("true");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let config = EngineConfig::default();
        assert_eq!(config.diving_mode, DivingMode::WildernessAndDungeons);
        assert!(!config.instance_closed);
    }
}
