//! §4.6 "Scheduler and Turn Order". Energy-based tick loop, turn order,
//! and the level transition protocol.

use dungeon_core::constants::{
    ENERGY_NORMAL, ENERGY_THRESHOLD, SPEED_BASE, SPEED_MAX, SPEED_MIN,
};
use dungeon_core::error::GameResult;
use dungeon_core::geometry::WorldPos;
use dungeon_core::types::PlayerId;

use crate::world::World;

/// `speed_energy[]`, §4.6: energy gained per tick for a given speed,
/// keyed by integer speed offset from [`SPEED_BASE`]. A coarse
/// approximation of the classic Angband speed table: each +10 speed
/// roughly doubles the energy rate.
pub fn speed_energy(speed: i32) -> i32 {
    let speed = speed.clamp(SPEED_MIN, SPEED_MAX);
    let offset = speed - SPEED_BASE;
    let rate = 2f64.powf(offset as f64 / 10.0);
    ((ENERGY_NORMAL as f64) * rate).round().max(1.0) as i32
}

/// A pending per-player command, queued in arrival order and pulled off
/// when the player next has sufficient energy (§4.6 "Ordering
/// guarantees").
#[derive(Debug, Clone)]
pub struct QueuedCommand {
    pub player: PlayerId,
    pub energy_cost: i32,
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: std::collections::VecDeque<QueuedCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: QueuedCommand) {
        self.pending.push_back(command);
    }

    pub fn pop_for(&mut self, player: PlayerId) -> Option<QueuedCommand> {
        let idx = self.pending.iter().position(|c| c.player == player)?;
        self.pending.remove(idx)
    }
}

/// One energy-accumulation and action pass over every live actor in a
/// chunk, §4.6 step 1-2: players by id, then monsters by slot (enforced by
/// the caller passing a chunk's monsters in slot order and the world's
/// players via `ids_ascending`).
pub fn accumulate_energy(world: &mut World, wpos: WorldPos) -> GameResult<()> {
    let ids = world.players.ids_ascending();
    for id in ids {
        if let Some(player) = world.players.get_mut(id) {
            if player.wpos == wpos {
                player.energy += speed_energy(player.speed);
            }
        }
    }

    world.chunks.with_mut(wpos, |chunk| {
        for monster in chunk.monsters.iter_mut() {
            if monster.is_alive() {
                monster.energy += speed_energy(monster.speed);
            }
        }
    });

    Ok(())
}

/// §4.6 step 2: actors at or above [`ENERGY_THRESHOLD`] are ready to act.
/// Returns player ids in ascending order, then monster slots in ascending
/// order, matching the "players before monsters in the same tick pass"
/// tie-break.
pub fn ready_actors(world: &World, wpos: WorldPos) -> (Vec<PlayerId>, Vec<usize>) {
    let mut ready_players: Vec<PlayerId> = world
        .players
        .ids_ascending()
        .into_iter()
        .filter(|id| {
            world
                .players
                .get(*id)
                .map(|p| p.wpos == wpos && p.energy >= ENERGY_THRESHOLD)
                .unwrap_or(false)
        })
        .collect();
    ready_players.sort();

    let ready_monsters = world
        .chunks
        .get(wpos)
        .map(|chunk| {
            chunk
                .monsters
                .iter()
                .enumerate()
                .filter(|(_, m)| m.is_alive() && m.energy >= ENERGY_THRESHOLD)
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default();

    (ready_players, ready_monsters)
}

/// Spends `cost` energy for a player's action. Actions that are impossible
/// consume no energy (§4.6 "Cancellation") — callers should simply not
/// call this when refusing an action.
pub fn spend_energy(world: &mut World, player: PlayerId, cost: i32) {
    if let Some(p) = world.players.get_mut(player) {
        p.energy -= cost;
    }
}

pub fn spend_monster_energy(world: &mut World, wpos: WorldPos, slot: usize, cost: i32) {
    world.chunks.with_mut(wpos, |chunk| {
        if let Some(m) = chunk.monsters.get_mut(slot) {
            m.energy -= cost;
        }
    });
}

/// Per-tick passes run once all ready actors have acted, §4.6 step 3:
/// timed-condition decrement and per-player regen staggered by their own
/// energy. Object recharge/corpse decay/light fuel/shimmer animation are
/// per-chunk passes a richer implementation would add alongside this;
/// only the actor-facing ones named by §4.5's status-effect contract are
/// implemented here.
pub fn end_of_tick_passes(world: &mut World, wpos: WorldPos) {
    world.chunks.with_mut(wpos, |chunk| {
        for monster in chunk.monsters.iter_mut() {
            if monster.is_alive() {
                monster.timed.decrement_all();
            }
        }
    });

    let ids = world.players.ids_ascending();
    for id in ids {
        if let Some(player) = world.players.get_mut(id) {
            if player.wpos == wpos {
                player.timed.decrement_all();
                regen_player(player);
            }
        }
    }

    world.tick += 1;
}

/// §4.6 step 3's per-player regen: gains scale with the player's own
/// energy rate (`speed_energy`) relative to [`ENERGY_NORMAL`], so a hasted
/// character both acts and heals faster than a normal-speed one, and a
/// slowed character heals slower — "staggered by their own energy".
/// A dead player's `chp` is left untouched.
fn regen_player(player: &mut dungeon_core::types::Player) {
    if player.is_dead {
        return;
    }
    let rate = speed_energy(player.speed) as f64 / ENERGY_NORMAL as f64;
    if player.chp > 0 && player.chp < player.mhp {
        let gain = ((player.mhp as f64 / 100.0) * rate).ceil().max(1.0) as i32;
        player.chp = (player.chp + gain).min(player.mhp);
        player.upkeep.redraw |= dungeon_core::types::player::RedrawFlags::HP;
    }
    if player.csp < player.msp {
        let gain = ((player.msp as f64 / 100.0) * rate).ceil().max(1.0) as i32;
        player.csp = (player.csp + gain).min(player.msp);
        player.upkeep.redraw |= dungeon_core::types::player::RedrawFlags::MANA;
    }
}

/// §4.6 "Level transition protocol". Moves a player from their current
/// chunk to `target`, generating it first if it isn't loaded. The caller
/// supplies a `generate` closure since chunk generation needs the full
/// generator module's profile dispatch, which the scheduler does not
/// itself own.
pub fn transition_player<F>(
    world: &mut World,
    player: PlayerId,
    target: WorldPos,
    join_grid: dungeon_core::geometry::Point,
    mut generate: F,
) -> GameResult<()>
where
    F: FnMut(&mut World, WorldPos) -> GameResult<()>,
{
    if !world.chunks.contains(target) {
        generate(world, target)?;
    }

    let old_wpos = world
        .players
        .get(player)
        .map(|p| p.wpos)
        .ok_or_else(|| dungeon_core::error::invariant_breach("transition_player: unknown player"))?;

    if let Some(chunk) = world.chunks.get_mut(old_wpos) {
        if let Some(p) = world.players.get(player) {
            if chunk.in_bounds(p.grid) {
                chunk.square_mut(p.grid).mon = None;
            }
        }
    }

    if let Some(p) = world.players.get_mut(player) {
        p.wpos = target;
        p.grid = join_grid;
        p.known_terrain.clear();
        p.upkeep.update |= dungeon_core::types::player::UpdateFlags::VIEW;
    }

    if let Some(chunk) = world.chunks.get_mut(target) {
        chunk.square_mut(join_grid).mon = Some(dungeon_core::types::ActorRef::Player(player));
    }

    maybe_unstatic(world, old_wpos);

    Ok(())
}

/// §3 "Entity lifecycle": frees a chunk that is not pinned and has no
/// remaining players.
fn maybe_unstatic(world: &mut World, wpos: WorldPos) {
    let pinned = world.chunks.with(wpos, |c| c.pinned).unwrap_or(true);
    if pinned {
        return;
    }
    let has_players = world.players.iter().any(|p| p.wpos == wpos);
    if !has_players {
        world.chunks.free(wpos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_energy_is_monotone_increasing() {
        assert!(speed_energy(SPEED_BASE + 10) > speed_energy(SPEED_BASE));
        assert!(speed_energy(SPEED_BASE) > speed_energy(SPEED_BASE - 10));
    }

    #[test]
    fn regen_player_heals_hp_and_mana_without_overflowing_max() {
        let mut player = dungeon_core::types::Player::new(
            PlayerId(1),
            "Hero",
            WorldPos::new(0, 0, 1),
            dungeon_core::geometry::Point::default(),
        );
        player.chp = 1;
        player.mhp = 100;
        player.csp = 1;
        player.msp = 100;
        regen_player(&mut player);
        assert!(player.chp > 1);
        assert!(player.csp > 1);

        player.chp = player.mhp;
        player.csp = player.msp;
        regen_player(&mut player);
        assert_eq!(player.chp, player.mhp);
        assert_eq!(player.csp, player.msp);
    }

    #[test]
    fn regen_player_does_not_revive_the_dead() {
        let mut player = dungeon_core::types::Player::new(
            PlayerId(1),
            "Hero",
            WorldPos::new(0, 0, 1),
            dungeon_core::geometry::Point::default(),
        );
        player.chp = -5;
        player.mhp = 100;
        player.is_dead = true;
        regen_player(&mut player);
        assert_eq!(player.chp, -5);
    }

    #[test]
    fn command_queue_is_fifo_per_player() {
        let mut queue = CommandQueue::default();
        let p1 = PlayerId(1);
        queue.push(QueuedCommand {
            player: p1,
            energy_cost: 100,
        });
        queue.push(QueuedCommand {
            player: p1,
            energy_cost: 50,
        });
        let first = queue.pop_for(p1).unwrap();
        assert_eq!(first.energy_cost, 100);
        let second = queue.pop_for(p1).unwrap();
        assert_eq!(second.energy_cost, 50);
        assert!(queue.pop_for(p1).is_none());
    }
}
