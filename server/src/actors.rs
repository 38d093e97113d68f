//! §4.5 "Actor Resolution". Apply damage, status, death, drops, and
//! experience to actors.

use dungeon_core::error::GameResult;
use dungeon_core::types::object::ObjectOrigin;
use dungeon_core::types::player::RedrawFlags;
use dungeon_core::types::{ActorRef, Chunk, ModifierVector, Object, Player};

/// Outcome of [`take_hit`]: whether the player died, for callers that must
/// branch on it (death scheduling, message grade).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub died: bool,
    pub damage_taken: i32,
}

/// `take_hit(dmg, killer, flavor)`, §4.5: apply damage reduction (flat plus
/// a non-physical cap), subtract from `chp`, mark dead on `chp <= 0`, set
/// `PR_HP`. `dmg <= 0` is a no-op: no message, no death (§8 boundary
/// behaviour).
pub fn take_hit(player: &mut Player, dmg: i32, killer: impl Into<String>, physical: bool) -> HitOutcome {
    if dmg <= 0 {
        return HitOutcome {
            died: false,
            damage_taken: 0,
        };
    }

    let reduced = apply_damage_reduction(dmg, player.dam_red, physical);
    player.chp -= reduced;
    player.upkeep.redraw |= RedrawFlags::HP;

    if player.chp <= 0 && !player.is_dead {
        player.is_dead = true;
        player.died_from = Some(killer.into());
    }

    HitOutcome {
        died: player.is_dead,
        damage_taken: reduced,
    }
}

/// §4.5 "Apply damage reduction (flat plus a non-physical cap)": physical
/// damage is reduced by the flat `dam_red` only; non-physical damage is
/// additionally capped so `dam_red` never removes more than half.
fn apply_damage_reduction(dmg: i32, dam_red: i32, physical: bool) -> i32 {
    let reduced = (dmg - dam_red).max(0);
    if physical {
        reduced
    } else {
        reduced.max(dmg / 2)
    }
}

/// Grade label for a `PR_HP` message, §4.5 "post per-graded messages".
pub fn hp_message_grade(chp: i32, mhp: i32) -> &'static str {
    if chp <= 0 {
        "Death."
    } else if mhp > 0 && chp * 100 / mhp <= 10 {
        "ARGH!"
    } else if mhp > 0 && chp * 100 / mhp <= 30 {
        "Ouch!"
    } else {
        ""
    }
}

/// Outcome of [`mon_take_hit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterHitOutcome {
    pub died: bool,
    pub fear: bool,
    pub xp_awarded: u64,
}

/// `mon_take_hit(mon, dmg, &fear, death_msg)`, §4.5: subtract from `hp`;
/// on death, free the slot and award xp to `killer_level`; otherwise maybe
/// set fear from a fraction of `hp/maxhp`.
pub fn mon_take_hit(
    chunk: &mut Chunk,
    slot: usize,
    dmg: i32,
    killer_level: u32,
    rng: &mut dungeon_core::rng::GameRng,
) -> GameResult<MonsterHitOutcome> {
    if dmg <= 0 {
        return Ok(MonsterHitOutcome {
            died: false,
            fear: false,
            xp_awarded: 0,
        });
    }

    let (died, fear, xp_awarded) = {
        let monster = chunk
            .monsters
            .get_mut(slot)
            .ok_or_else(|| dungeon_core::error::invariant_breach(format!("mon_take_hit: no slot {slot}")))?;
        monster.hp -= dmg;

        if monster.hp <= 0 {
            let xp = experience_for_kill(killer_level, monster_level(monster), monster.base_xp);
            let grid = monster.grid;
            let base_xp = monster.base_xp;
            monster.race = None;
            monster.flags = dungeon_core::types::actor::MonsterFlags::empty();
            drop(monster);
            if chunk.in_bounds(grid) {
                if chunk.square(grid).mon == Some(ActorRef::Monster(slot)) {
                    chunk.square_mut(grid).mon = None;
                }
                roll_loot_drop(chunk, grid, base_xp, rng);
            }
            chunk.mon_cnt = chunk.mon_cnt.saturating_sub(1);
            (true, false, xp)
        } else {
            let ratio = (monster.hp as f64 / monster.maxhp.max(1) as f64).clamp(0.0, 1.0);
            let fear_chance = (1.0 - ratio) * 0.5;
            let fear = rng.gen_bool(fear_chance);
            if fear {
                monster.timed.set(dungeon_core::types::TimedEffect::Fear, 10);
            }
            (false, fear, 0)
        }
    };

    Ok(MonsterHitOutcome {
        died,
        fear,
        xp_awarded,
    })
}

/// §3 "destroyed by death (drops loot, awards xp)" / §8 step 1 "roll loot
/// drop". No per-race drop table exists in this core (that lives in the
/// item catalog, a perimeter concern); a flat 30% chance stands in,
/// producing an unidentified placeholder object linked onto the square's
/// floor pile. `level_req` scales with the monster's base xp as a coarse
/// proxy for how dangerous a monster it fell from.
fn roll_loot_drop(chunk: &mut Chunk, grid: dungeon_core::geometry::Point, monster_base_xp: u64, rng: &mut dungeon_core::rng::GameRng) {
    if !rng.gen_bool(0.3) {
        return;
    }
    let existing = chunk.square(grid).obj;
    let object = Object {
        kind: 0,
        tval: 0,
        sval: 0,
        number: 1,
        artifact: None,
        ego: None,
        to_h: 0,
        to_d: 0,
        to_a: 0,
        modifiers: ModifierVector::default(),
        elements: [dungeon_core::types::object::ElementInfo::default(); 20],
        timeout: 0,
        pval: 0,
        note: None,
        owner: None,
        origin: ObjectOrigin::MonsterDrop,
        level_req: (monster_base_xp / 10).min(127) as i32,
        next: existing,
    };
    chunk.objects.push(object);
    let handle = dungeon_core::types::ObjectHandle(chunk.objects.len() - 1);
    chunk.square_mut(grid).obj = Some(handle);
}

fn monster_level(monster: &dungeon_core::types::Monster) -> u32 {
    // Depth the monster was native to isn't tracked on the monster record
    // itself (it lives on the race); approximate from max hp for the pure
    // xp formula's "far-below-level" discouragement, matching how
    // `points::calculate_points_tot` weighs hp as a level proxy.
    (monster.maxhp.max(1) as u32).min(127)
}

/// §4.5.5 supplement: experience-on-kill, discouraging farming far-below-
/// level monsters. Grounded in `points::calculate_points_tot`'s pure
/// attribute-to-point scaling: the award shrinks as the level gap grows.
pub fn experience_for_kill(killer_level: u32, monster_level: u32, monster_base_xp: u64) -> u64 {
    let killer_level = killer_level.max(1);
    let level_gap = killer_level.saturating_sub(monster_level);
    if level_gap == 0 {
        return monster_base_xp;
    }
    let penalty = (level_gap as u64 * 5).min(90);
    monster_base_xp * (100 - penalty) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::geometry::WorldPos;
    use dungeon_core::types::actor::RaceId;
    use dungeon_core::types::{DungeonProfile, Monster};

    fn test_player() -> Player {
        Player::new(dungeon_core::types::PlayerId(1), "Hero", WorldPos::new(0, 0, 1), Default::default())
    }

    #[test]
    fn zero_damage_is_a_no_op() {
        let mut player = test_player();
        player.chp = 100;
        let outcome = take_hit(&mut player, 0, "nothing", true);
        assert!(!outcome.died);
        assert_eq!(player.chp, 100);
    }

    #[test]
    fn damage_reduction_caps_non_physical_at_half() {
        let mut player = test_player();
        player.chp = 100;
        player.dam_red = 10;
        let outcome = take_hit(&mut player, 50, "fire", false);
        assert_eq!(outcome.damage_taken, 40);
        assert_eq!(player.chp, 60);
    }

    #[test]
    fn lethal_damage_marks_dead() {
        let mut player = test_player();
        player.chp = 10;
        let outcome = take_hit(&mut player, 50, "a dragon", true);
        assert!(outcome.died);
        assert!(player.is_dead);
        assert_eq!(player.died_from.as_deref(), Some("a dragon"));
    }

    #[test]
    fn experience_shrinks_with_level_gap() {
        let even = experience_for_kill(10, 10, 100);
        let gapped = experience_for_kill(10, 1, 100);
        assert_eq!(even, 100);
        assert!(gapped < even);
    }

    #[test]
    fn mon_take_hit_frees_slot_on_death() {
        let mut chunk = Chunk::new(WorldPos::new(0, 0, 1), 10, 10, DungeonProfile::Classic);
        let monster = Monster {
            race: Some(RaceId(1)),
            hp: 5,
            maxhp: 10,
            base_xp: 50,
            grid: dungeon_core::geometry::Point::new(2, 2),
            ..Default::default()
        };
        chunk.monsters.push(monster);
        let slot = chunk.monsters.len() - 1;
        chunk.square_mut(dungeon_core::geometry::Point::new(2, 2)).mon = Some(ActorRef::Monster(slot));
        chunk.mon_cnt = 1;

        let mut rng = dungeon_core::rng::GameRng::new(1);
        let outcome = mon_take_hit(&mut chunk, slot, 10, 5, &mut rng).unwrap();
        assert!(outcome.died);
        assert_eq!(outcome.xp_awarded, 50);
        assert!(chunk.monsters[slot].race.is_none());
        assert_eq!(chunk.mon_cnt, 0);
    }

    #[test]
    fn a_killing_blow_can_drop_loot() {
        let mut chunk = Chunk::new(WorldPos::new(0, 0, 1), 10, 10, DungeonProfile::Classic);
        let monster = Monster {
            race: Some(RaceId(1)),
            hp: 5,
            maxhp: 10,
            base_xp: 500,
            grid: dungeon_core::geometry::Point::new(2, 2),
            ..Default::default()
        };
        chunk.monsters.push(monster);
        let slot = chunk.monsters.len() - 1;
        chunk.square_mut(dungeon_core::geometry::Point::new(2, 2)).mon = Some(ActorRef::Monster(slot));
        chunk.mon_cnt = 1;

        let mut dropped = false;
        for seed in 0..50u64 {
            let mut chunk = chunk.clone();
            let mut rng = dungeon_core::rng::GameRng::new(seed);
            mon_take_hit(&mut chunk, slot, 10, 5, &mut rng).unwrap();
            if chunk.square(dungeon_core::geometry::Point::new(2, 2)).obj.is_some() {
                dropped = true;
                assert_eq!(chunk.objects.last().unwrap().origin, ObjectOrigin::MonsterDrop);
                break;
            }
        }
        assert!(dropped, "expected at least one of 50 kills to drop loot");
    }
}
