//! The top-level simulation context, §9 "gather these into an immutable
//! `World` context passed to every operation". Owns every chunk, every
//! player, the PRNG, and the catalogs the perimeter supplies; threaded
//! explicitly through the scheduler rather than reached via a global
//! singleton (Design Notes §9, SPEC_FULL §3).

use std::collections::HashMap;

use dungeon_core::catalog::{DungeonProfileCatalog, RaceCatalog, TerrainCatalog};
use dungeon_core::geometry::WorldPos;
use dungeon_core::rng::GameRng;
use dungeon_core::types::{Chunk, Player, PlayerId};

use crate::config::EngineConfig;

/// Owns every generated chunk, keyed by world position. Per SPEC_FULL §3,
/// this is a plain `HashMap` behind a small facade rather than a process
/// singleton; the facade keeps the teacher's `with`/`with_mut` closure
/// style without its `OnceLock` mechanism.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: HashMap<WorldPos, Chunk>,
}

impl ChunkStore {
    pub fn get(&self, wpos: WorldPos) -> Option<&Chunk> {
        self.chunks.get(&wpos)
    }

    pub fn get_mut(&mut self, wpos: WorldPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&wpos)
    }

    pub fn insert(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.wpos, chunk);
    }

    /// Frees a chunk per §3 entity lifecycle: "freed when no player remains
    /// and it is not pinned". Callers are responsible for checking both
    /// conditions before calling this.
    pub fn free(&mut self, wpos: WorldPos) -> Option<Chunk> {
        self.chunks.remove(&wpos)
    }

    pub fn contains(&self, wpos: WorldPos) -> bool {
        self.chunks.contains_key(&wpos)
    }

    /// Every resident chunk's position, used by the tick loop to iterate
    /// without holding a borrow of the map itself.
    pub fn positions(&self) -> Vec<WorldPos> {
        self.chunks.keys().copied().collect()
    }

    pub fn with<F, R>(&self, wpos: WorldPos, f: F) -> Option<R>
    where
        F: FnOnce(&Chunk) -> R,
    {
        self.chunks.get(&wpos).map(f)
    }

    pub fn with_mut<F, R>(&mut self, wpos: WorldPos, f: F) -> Option<R>
    where
        F: FnOnce(&mut Chunk) -> R,
    {
        self.chunks.get_mut(&wpos).map(f)
    }
}

/// Players persist across chunk loads, §3 "Entity lifecycle": held in a
/// `PlayerId`-keyed table independent of any single chunk.
#[derive(Debug, Default)]
pub struct PlayerTable {
    players: HashMap<PlayerId, Player>,
}

impl PlayerTable {
    pub fn insert(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Players ordered by id, matching §4.6 "players by id, then monsters
    /// by slot" scheduler ordering.
    pub fn ids_ascending(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// The immutable-shape context passed to every engine operation: chunks,
/// players, PRNG, config, and catalogs. Mutability is scoped by the
/// scheduler holding `&mut World` for the duration of a tick (§5).
pub struct World {
    pub chunks: ChunkStore,
    pub players: PlayerTable,
    pub rng: GameRng,
    pub config: EngineConfig,
    pub tick: u64,
    pub terrain: Box<dyn TerrainCatalog + Send + Sync>,
    pub races: Box<dyn RaceCatalog + Send + Sync>,
    pub profiles: Box<dyn DungeonProfileCatalog + Send + Sync>,
    /// The world's persistent seed, §4.2.3's `seed_wild`: fixed for the
    /// life of the world, threaded into every [`crate::generator::GenerationRequest`]
    /// so town/wilderness layouts reproduce across restarts.
    pub seed_wild: u32,
}

impl World {
    pub fn new(
        seed: u64,
        config: EngineConfig,
        terrain: Box<dyn TerrainCatalog + Send + Sync>,
        races: Box<dyn RaceCatalog + Send + Sync>,
        profiles: Box<dyn DungeonProfileCatalog + Send + Sync>,
    ) -> Self {
        Self {
            chunks: ChunkStore::default(),
            players: PlayerTable::default(),
            rng: GameRng::new(seed),
            config,
            tick: 0,
            terrain,
            races,
            profiles,
            seed_wild: seed as u32,
        }
    }
}
