//! §4.8 "Player State Derivation". Recomputes bonuses/maxima from gear,
//! race, class, level, and timed effects. All outputs are deterministic
//! pure functions of the inputs; no RNG (§4.8 closing sentence).

use dungeon_core::catalog::RaceCatalog;
use dungeon_core::types::player::{PlayerState, RedrawFlags, UpdateFlags};
use dungeon_core::types::{ModifierVector, Player, TimedEffect};

pub use crate::visibility::RedrawDelta;

/// §4.8 step 3: per-timed-effect stat/skill deltas. A small static table;
/// effects absent from it contribute nothing.
fn timed_effect_deltas(effect: TimedEffect) -> ModifierVector {
    let mut delta = ModifierVector::default();
    match effect {
        TimedEffect::Bless => {
            delta.str_ = 0;
        }
        TimedEffect::Haste => delta.speed = 10,
        TimedEffect::Slow => delta.speed = -10,
        TimedEffect::Confusion | TimedEffect::Stun => delta.dex = -2,
        _ => {}
    }
    delta
}

/// §4.8 step 2: union an equipped item's modifiers in.
fn accumulate_modifier(base: &mut [i32; 6], modifier: &ModifierVector) {
    base[0] += modifier.str_ as i32;
    base[1] += modifier.int as i32;
    base[2] += modifier.wis as i32;
    base[3] += modifier.dex as i32;
    base[4] += modifier.con as i32;
    // base_stats has 6 slots per dungeon_core::types::player::Player; the 6th is a
    // reserved/charisma-equivalent slot the distilled spec does not name
    // individually, left untouched by gear modifiers.
}

/// §4.8 "Procedure". Recomputes `player.state` from `base_stats`, gear
/// modifiers, timed effects, and race baselines. Idempotent: calling it
/// twice in a row with no intervening mutation produces the same `state`
/// (§8 "Player state derivation is idempotent").
pub fn calc_bonuses(player: &mut Player, races: &dyn RaceCatalog, gear_modifiers: &[ModifierVector]) {
    let mut stats = player.base_stats;
    let mut timed_speed_delta = 0i32;

    for modifier in gear_modifiers {
        accumulate_modifier(&mut stats, modifier);
    }

    for effect in [
        TimedEffect::Haste,
        TimedEffect::Slow,
        TimedEffect::Confusion,
        TimedEffect::Stun,
        TimedEffect::Bless,
    ] {
        if player.timed.is_active(effect) {
            let delta = timed_effect_deltas(effect);
            accumulate_modifier(&mut stats, &delta);
            timed_speed_delta += delta.speed as i32;
        }
    }

    for v in stats.iter_mut() {
        *v = (*v).clamp(1, 30);
    }

    let str_bonus = (stats[0] - 10) / 2;
    let dex_bonus = (stats[3] - 10) / 2;

    let mut state = PlayerState {
        stats,
        to_hit: str_bonus + dex_bonus,
        to_dam: str_bonus,
        to_ac: dex_bonus,
        speed: (dungeon_core::constants::SPEED_BASE + gear_speed_sum(gear_modifiers) + timed_speed_delta)
            .clamp(dungeon_core::constants::SPEED_MIN, dungeon_core::constants::SPEED_MAX),
        blows_per_round_x100: blows_per_round(stats[0], stats[3], gear_modifiers),
        shots_per_round_x100: 100,
        might: 1 + gear_modifiers.iter().map(|m| m.might as i32).sum::<i32>(),
        skill_device: stats[1],
        skill_save: stats[2],
        skill_stealth: 0,
        skill_search: 0,
        skill_digging: stats[0],
        skill_disarm_phys: stats[3],
        skill_disarm_magic: stats[1],
        light_radius: light_radius(gear_modifiers),
        max_hp: max_hp(player.level, races.base_hp_dice(player.race).0, stats[4]),
        max_mana: max_mana(player.level, stats[1].max(stats[2])),
        heavy_wield: is_heavy_wield(gear_modifiers, stats[0]),
        heavy_shoot: is_heavy_shoot(gear_modifiers, stats[0]),
        bless_wield: player.timed.is_active(TimedEffect::Bless),
        armor_cumber: is_armor_cumber(gear_modifiers, player.level),
    };

    if state.blows_per_round_x100 < 100 {
        state.blows_per_round_x100 = 100;
    }

    player.mhp = state.max_hp;
    player.msp = state.max_mana;
    player.speed = state.speed;

    let changed = player.state.to_hit != state.to_hit
        || player.state.to_dam != state.to_dam
        || player.state.max_hp != state.max_hp
        || player.state.max_mana != state.max_mana;

    player.state = state;

    if changed {
        player.upkeep.update |= UpdateFlags::BONUS;
        player.upkeep.redraw |= RedrawFlags::PLUSSES | RedrawFlags::HP | RedrawFlags::MANA;
    }
}

fn gear_speed_sum(gear_modifiers: &[ModifierVector]) -> i32 {
    gear_modifiers.iter().map(|m| m.speed as i32).sum()
}

fn blows_per_round(str_score: i32, dex_score: i32, gear_modifiers: &[ModifierVector]) -> i32 {
    let base = 100 + (str_score + dex_score - 20) * 5;
    let extra: i32 = gear_modifiers.iter().map(|m| m.blows as i32 * 100).sum();
    (base + extra).max(100)
}

fn light_radius(gear_modifiers: &[ModifierVector]) -> i32 {
    gear_modifiers.iter().map(|m| m.light as i32).sum::<i32>().max(0)
}

/// §4.8 "heavy-wield": the wielded weapon's weight exceeds what `str_score`
/// can carry one-handed, tenth-pounds per strength point.
fn is_heavy_wield(gear_modifiers: &[ModifierVector], str_score: i32) -> bool {
    let limit = str_score * 10;
    gear_modifiers
        .iter()
        .filter(|m| m.is_weapon)
        .any(|m| m.weight > limit)
}

/// §4.8 "heavy-shoot": same test against the equipped launcher.
fn is_heavy_shoot(gear_modifiers: &[ModifierVector], str_score: i32) -> bool {
    let limit = str_score * 10;
    gear_modifiers
        .iter()
        .filter(|m| m.is_shooter)
        .any(|m| m.weight > limit)
}

/// §4.8 "armor-cumber": total non-weapon, non-shooter gear weight exceeds a
/// threshold that grows with level, penalising mages in heavy armor.
fn is_armor_cumber(gear_modifiers: &[ModifierVector], level: u32) -> bool {
    let limit = 200 + level as i32 * 10;
    let armor_weight: i32 = gear_modifiers
        .iter()
        .filter(|m| !m.is_weapon && !m.is_shooter)
        .map(|m| m.weight)
        .sum();
    armor_weight > limit
}

/// §4.8 step 5: `player_hp[level-1] + bonus_per_level * level / 100`.
fn max_hp(level: u32, hp_die: i32, con_score: i32) -> i32 {
    let con_bonus = (con_score - 10) / 2;
    let base = hp_die.max(1) * level.max(1) as i32;
    base + con_bonus * level as i32 / 2
}

/// §4.8 step 6: `1 + avg_spell_stat_bonus * effective_levels / 100`.
fn max_mana(level: u32, spell_stat: i32) -> i32 {
    let stat_bonus = (spell_stat - 10).max(0);
    1 + stat_bonus * level.max(1) as i32 / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::catalog::StaticCatalog;
    use dungeon_core::geometry::{Point, WorldPos};
    use dungeon_core::types::PlayerId;

    #[test]
    fn calc_bonuses_is_idempotent() {
        let mut player = Player::new(PlayerId(1), "Hero", WorldPos::new(0, 0, 1), Point::default());
        player.level = 5;
        player.base_stats = [16, 10, 10, 14, 12, 10];
        let catalog = StaticCatalog::default();
        let gear = vec![ModifierVector::default()];

        calc_bonuses(&mut player, &catalog, &gear);
        let first = player.state;
        calc_bonuses(&mut player, &catalog, &gear);
        let second = player.state;

        assert_eq!(first.to_hit, second.to_hit);
        assert_eq!(first.max_hp, second.max_hp);
        assert_eq!(first.max_mana, second.max_mana);
    }

    #[test]
    fn overweight_weapon_triggers_heavy_wield() {
        let mut player = Player::new(PlayerId(1), "Hero", WorldPos::new(0, 0, 1), Point::default());
        player.base_stats = [10, 10, 10, 10, 10, 10];
        let catalog = StaticCatalog::default();
        let light_weapon = vec![ModifierVector {
            is_weapon: true,
            weight: 50,
            ..ModifierVector::default()
        }];
        calc_bonuses(&mut player, &catalog, &light_weapon);
        assert!(!player.state.heavy_wield);

        let heavy_weapon = vec![ModifierVector {
            is_weapon: true,
            weight: 500,
            ..ModifierVector::default()
        }];
        calc_bonuses(&mut player, &catalog, &heavy_weapon);
        assert!(player.state.heavy_wield);
        assert!(!player.state.heavy_shoot);
    }

    #[test]
    fn haste_increases_speed() {
        let mut player = Player::new(PlayerId(1), "Hero", WorldPos::new(0, 0, 1), Point::default());
        player.base_stats = [10; 6];
        let catalog = StaticCatalog::default();
        calc_bonuses(&mut player, &catalog, &[]);
        let normal_speed = player.state.speed;
        player.timed.set(TimedEffect::Haste, 10);
        calc_bonuses(&mut player, &catalog, &[]);
        assert!(player.state.speed >= normal_speed);
    }
}
