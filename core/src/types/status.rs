//! Timed conditions, §4.5 "Status effects". Each condition has a grade
//! table (threshold -> label + onset/offset messages); setting a timer
//! clamps against the grade maximum, and increment/decrement pass through
//! the grade machinery so messages fire only on grade-boundary crossings.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimedEffect {
    Fear,
    Confusion,
    Blindness,
    Poison,
    Stun,
    Paralysis,
    Haste,
    Slow,
    Bless,
    Protection,
    Invisibility,
    Recall,
}

pub const TIMED_EFFECT_COUNT: usize = 12;

/// One grade band of a timed effect's severity table.
#[derive(Debug, Clone, Copy)]
pub struct StatusGrade {
    pub threshold: i32,
    pub label: &'static str,
}

/// A fixed per-effect table, ascending by `threshold`, mirroring
/// `real_update_char`'s grade-crossing message logic in the teacher.
pub fn grade_table(effect: TimedEffect) -> &'static [StatusGrade] {
    match effect {
        TimedEffect::Fear => &[
            StatusGrade { threshold: 1, label: "afraid" },
            StatusGrade { threshold: 10, label: "terrified" },
        ],
        TimedEffect::Poison => &[
            StatusGrade { threshold: 1, label: "poisoned" },
            StatusGrade { threshold: 20, label: "badly poisoned" },
        ],
        TimedEffect::Stun => &[
            StatusGrade { threshold: 1, label: "stunned" },
            StatusGrade { threshold: 20, label: "heavily stunned" },
            StatusGrade { threshold: 40, label: "knocked out" },
        ],
        _ => &[StatusGrade {
            threshold: 1,
            label: "affected",
        }],
    }
}

/// Each timed effect's incompatibility list: setting one clears the
/// listed others (e.g. `Haste` and `Slow` cannot coexist).
pub fn incompatible_with(effect: TimedEffect) -> &'static [TimedEffect] {
    match effect {
        TimedEffect::Haste => &[TimedEffect::Slow],
        TimedEffect::Slow => &[TimedEffect::Haste],
        _ => &[],
    }
}

/// Per-actor table of timed-condition durations, indexed by [`TimedEffect`].
#[derive(Debug, Clone, Copy)]
pub struct StatusTable {
    durations: [i32; TIMED_EFFECT_COUNT],
}

impl Default for StatusTable {
    fn default() -> Self {
        Self {
            durations: [0; TIMED_EFFECT_COUNT],
        }
    }
}

fn index(effect: TimedEffect) -> usize {
    effect as usize
}

/// The outcome of a timer mutation: whether the active grade changed, for
/// callers that only want to emit a message on a boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeTransition {
    pub old_grade: Option<&'static str>,
    pub new_grade: Option<&'static str>,
}

impl GradeTransition {
    pub fn changed(&self) -> bool {
        self.old_grade != self.new_grade
    }
}

fn grade_for(effect: TimedEffect, duration: i32) -> Option<&'static str> {
    if duration <= 0 {
        return None;
    }
    grade_table(effect)
        .iter()
        .rev()
        .find(|g| duration >= g.threshold)
        .map(|g| g.label)
}

impl StatusTable {
    pub fn duration(&self, effect: TimedEffect) -> i32 {
        self.durations[index(effect)]
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.duration(effect) > 0
    }

    /// Set a timer, clamping against the effect's highest grade threshold
    /// times a generous multiplier (the grade table itself has no upper
    /// bound in spec.md, so the clamp is simply "non-negative"; individual
    /// callers apply their own maxima when an item/spell caps duration).
    pub fn set(&mut self, effect: TimedEffect, duration: i32) -> GradeTransition {
        let old_grade = grade_for(effect, self.duration(effect));
        let clamped = duration.max(0);
        self.durations[index(effect)] = clamped;
        if clamped > 0 {
            for &other in incompatible_with(effect) {
                self.durations[index(other)] = 0;
            }
        }
        GradeTransition {
            old_grade,
            new_grade: grade_for(effect, clamped),
        }
    }

    pub fn increment(&mut self, effect: TimedEffect, delta: i32) -> GradeTransition {
        let new_value = self.duration(effect) + delta;
        self.set(effect, new_value)
    }

    pub fn decrement_all(&mut self) {
        for d in self.durations.iter_mut() {
            if *d > 0 {
                *d -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_haste_clears_slow() {
        let mut table = StatusTable::default();
        table.set(TimedEffect::Slow, 10);
        assert!(table.is_active(TimedEffect::Slow));
        table.set(TimedEffect::Haste, 5);
        assert!(!table.is_active(TimedEffect::Slow));
        assert!(table.is_active(TimedEffect::Haste));
    }

    #[test]
    fn grade_crossing_detected_on_boundary() {
        let mut table = StatusTable::default();
        let t1 = table.set(TimedEffect::Poison, 5);
        assert!(t1.changed());
        assert_eq!(t1.new_grade, Some("poisoned"));

        let t2 = table.set(TimedEffect::Poison, 10);
        assert!(!t2.changed(), "still within the same grade band");

        let t3 = table.set(TimedEffect::Poison, 25);
        assert!(t3.changed());
        assert_eq!(t3.new_grade, Some("badly poisoned"));
    }

    #[test]
    fn decrement_all_floors_at_zero() {
        let mut table = StatusTable::default();
        table.set(TimedEffect::Fear, 1);
        table.decrement_all();
        assert!(!table.is_active(TimedEffect::Fear));
        table.decrement_all();
        assert_eq!(table.duration(TimedEffect::Fear), 0);
    }
}
