//! §6 "Protocol boundary". The core never formats wire bytes; it calls a
//! `ProtocolSink` by signature. The binary wires a [`NullSink`]; a real
//! network layer is out of scope (§1 non-goals).

use dungeon_core::types::PlayerId;

use crate::visibility::RedrawDelta;

/// One `Send_*` event named in spec.md §6, plus redraw-flag delivery.
pub trait ProtocolSink {
    fn send_item(&mut self, player: PlayerId, slot: usize);
    fn send_floor(&mut self, player: PlayerId, x: i32, y: i32);
    fn send_fullmap(&mut self, player: PlayerId);
    fn send_index(&mut self, player: PlayerId, index: u32);
    fn send_count(&mut self, player: PlayerId, what: &str, count: u32);
    fn send_autoinscription(&mut self, player: PlayerId, slot: usize, text: &str);
    fn send_skills(&mut self, player: PlayerId);
    fn send_weight(&mut self, player: PlayerId, weight: u32);
    fn send_message(&mut self, player: PlayerId, message: &str);
    fn send_redraw(&mut self, player: PlayerId, delta: RedrawDelta);
}

/// Logs every event via `log::debug!` and drops it. Used by the binary in
/// the absence of a real network layer.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProtocolSink for NullSink {
    fn send_item(&mut self, player: PlayerId, slot: usize) {
        log::debug!("send_item({player:?}, slot={slot})");
    }

    fn send_floor(&mut self, player: PlayerId, x: i32, y: i32) {
        log::debug!("send_floor({player:?}, {x}, {y})");
    }

    fn send_fullmap(&mut self, player: PlayerId) {
        log::debug!("send_fullmap({player:?})");
    }

    fn send_index(&mut self, player: PlayerId, index: u32) {
        log::debug!("send_index({player:?}, {index})");
    }

    fn send_count(&mut self, player: PlayerId, what: &str, count: u32) {
        log::debug!("send_count({player:?}, {what}, {count})");
    }

    fn send_autoinscription(&mut self, player: PlayerId, slot: usize, text: &str) {
        log::debug!("send_autoinscription({player:?}, slot={slot}, {text:?})");
    }

    fn send_skills(&mut self, player: PlayerId) {
        log::debug!("send_skills({player:?})");
    }

    fn send_weight(&mut self, player: PlayerId, weight: u32) {
        log::debug!("send_weight({player:?}, {weight})");
    }

    fn send_message(&mut self, player: PlayerId, message: &str) {
        log::debug!("send_message({player:?}, {message:?})");
    }

    fn send_redraw(&mut self, player: PlayerId, delta: RedrawDelta) {
        log::debug!("send_redraw({player:?}, {delta:?})");
    }
}
