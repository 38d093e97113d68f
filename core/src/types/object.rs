//! §3 "Object". Objects have identity; artifacts are globally unique.

use crate::constants::Element;
use crate::types::player::PlayerId;

/// An index into a chunk's object arena. Floor piles are acyclic singly
/// linked lists of these, rooted at `Square.obj` (§3 invariant 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementInfo {
    /// Positive: resistance (halves damage). Negative: vulnerability
    /// (1.5x damage). `i8::MAX` sentinel: immune. See SPEC_FULL §4.3.5.
    pub resist: i8,
}

pub const IMMUNE: i8 = i8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierVector {
    pub str_: i8,
    pub int: i8,
    pub wis: i8,
    pub dex: i8,
    pub con: i8,
    pub speed: i8,
    pub blows: i8,
    pub shots: i8,
    pub might: i8,
    pub light: i8,
    /// Item weight in tenth-pounds, §4.8 "heavy-wield/heavy-shoot/armor-
    /// cumber flags". Carried here rather than on [`Object`] directly so
    /// `calc_bonuses` keeps reasoning about one flat per-item contribution
    /// list, matching every other field in this vector.
    pub weight: i32,
    pub is_weapon: bool,
    pub is_shooter: bool,
}

#[derive(Debug, Clone)]
pub struct Object {
    pub kind: u32,
    pub tval: u16,
    pub sval: u16,
    pub number: u16,
    pub artifact: Option<u32>,
    pub ego: Option<u32>,
    pub to_h: i16,
    pub to_d: i16,
    pub to_a: i16,
    pub modifiers: ModifierVector,
    pub elements: [ElementInfo; 20],
    pub timeout: i32,
    pub pval: i32,
    pub note: Option<String>,
    pub owner: Option<PlayerId>,
    pub origin: ObjectOrigin,
    pub level_req: i32,
    /// Next object in this square's floor pile, §3 invariant 6.
    pub next: Option<ObjectHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOrigin {
    FloorDrop,
    MonsterDrop,
    Crafted,
    PlayerSplit,
}

impl Object {
    pub fn element(&self, element: Element) -> ElementInfo {
        self.elements[element_index(element)]
    }

    pub fn element_mut(&mut self, element: Element) -> &mut ElementInfo {
        &mut self.elements[element_index(element)]
    }
}

fn element_index(element: Element) -> usize {
    Element::ALL
        .iter()
        .position(|&e| e == element)
        .unwrap_or(0)
}
