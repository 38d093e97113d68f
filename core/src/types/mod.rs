//! The data model proper, §3. Pure data plus the invariant-preserving
//! constructors; the operations that act on this data (generation,
//! projection, scheduling, visibility) live in the `engine` crate.

pub mod actor;
pub mod chunk;
pub mod effect;
pub mod object;
pub mod player;
pub mod square;
pub mod status;

pub use actor::{ActorRef, Monster, MonsterGroup};
pub use chunk::{Chunk, DungeonProfile, JoinGrids};
pub use effect::{Effect, EffectKind, EffectOrigin};
pub use object::{ModifierVector, Object, ObjectHandle};
pub use player::{Perception, Player, PlayerId, PlayerState, Upkeep};
pub use square::{Square, SquareInfo};
pub use status::{StatusGrade, StatusTable, TimedEffect};
