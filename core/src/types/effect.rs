//! §4.4 "Effect dispatcher". An `Effect` is the dispatcher's input: one
//! step of an effect list attached to an item, spell, or trap.

use crate::geometry::Point;
use crate::types::player::PlayerId;

/// Who is accountable for an effect's outcome — drives XP attribution,
/// friendly-fire rules, and message phrasing (§4.5.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOrigin {
    Player(PlayerId),
    Monster(usize),
    Trap,
    /// Device failure, cursed item backfire, or other no-attributable-actor
    /// source (§4.4 "Non-goals" explicitly excludes identification bookkeeping
    /// but this case still needs somewhere to land).
    Environment,
}

/// The effect family, matching the canonical list in §4.4. Kept flat
/// (one dispatcher match arm per variant) rather than as a string code,
/// since the engine crate owns a fixed, closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    BoltElement,
    BeamElement,
    BallElement,
    ConeElement,
    StarElement,
    Heal,
    Damage,
    CureCondition,
    InflictCondition,
    Teleport,
    TeleportLevel,
    Summon,
    Haste,
    Slow,
    Mapping,
    DetectMonsters,
    Recall,
    StatGain,
    StatDrain,
    /// Self-centred ball, §4.4 `BLAST`/`BLAST_OBVIOUS`.
    Blast,
    LightArea,
    DarkenArea,
    /// §4.4 `EARTHQUAKE(radius, targeted?)`: dedicated grid loop, not the
    /// generic projection path.
    Earthquake,
    /// §4.4 `DESTRUCTION(radius)`.
    Destruction,
    /// §4.4 `WIPE_AREA(radius)`.
    WipeArea,
    /// §4.4 `DETONATE`.
    Detonate,
    /// §4.4 `TAP_UNLIFE(amount)`.
    TapUnlife,
    /// §4.4 `SWARM(n)`.
    Swarm,
    /// §4.4 `STAR_BALL`.
    StarBall,
    /// §4.4 `LASH(range)`.
    Lash,
    /// §4.4 `SPOT`/`STRIKE`.
    Strike,
    /// §4.4 `WONDER(die)`.
    Wonder,
    /// §4.4 `MELEE_BLOWS(dmg, element)`.
    MeleeBlows,
    /// §4.4 `SWEEP`.
    Sweep,
    /// §4.4 `PROJECT_LOS(element, dmg, boosted?)`.
    ProjectLos,
    /// §4.4 `MON_HEAL_HP`.
    MonHealHp,
    /// §4.4 `MON_HEAL_KIN`.
    MonHealKin,
}

/// Sentinel for `Effect::subtype` meaning "pick a uniform random element",
/// §4.4 breath contract: "a randomly-elemental variant for missile-typed
/// breaths picks a uniform element".
pub const RANDOM_ELEMENT_SUBTYPE: i32 = -1;

/// One effect-list entry, §4.4 "Contract". `damage_dice`/`damage_sides`
/// follow the XdY dice-expression convention used throughout the
/// original; the dispatcher rolls them against the caller's RNG rather
/// than baking a rolled value in here, so the same `Effect` is replayable.
#[derive(Debug, Clone)]
pub struct Effect {
    pub kind: EffectKind,
    pub subtype: i32,
    pub radius: i32,
    pub other: i32,
    pub damage_dice: i32,
    pub damage_sides: i32,
    pub damage_bonus: i32,
    pub origin: EffectOrigin,
    pub aim: Option<Point>,
    pub direction: Option<u8>,
}

impl Effect {
    pub fn new(kind: EffectKind, origin: EffectOrigin) -> Self {
        Self {
            kind,
            subtype: 0,
            radius: 0,
            other: 0,
            damage_dice: 0,
            damage_sides: 0,
            damage_bonus: 0,
            origin,
            aim: None,
            direction: None,
        }
    }

    /// Average damage of the dice expression, rounded down — used for
    /// balance checks and tests rather than a live roll.
    pub fn average_damage(&self) -> i32 {
        if self.damage_sides <= 0 {
            return self.damage_bonus;
        }
        self.damage_dice * (self.damage_sides + 1) / 2 + self.damage_bonus
    }

    /// Rolls the dice expression against `rng`, per §4.4's damage model.
    /// This is what the dispatcher actually calls; [`Effect::average_damage`]
    /// stays around for balance checks that want a deterministic figure.
    pub fn roll_damage(&self, rng: &mut crate::rng::GameRng) -> i32 {
        rng.roll_dice(self.damage_dice, self.damage_sides) + self.damage_bonus
    }
}
