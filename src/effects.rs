//! Side effects the simulation fires and forgets.

use crate::assets::CharacterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Flap(CharacterId),
    Crash,
    LevelUp(u32),
}

/// Sink for effects. Implementations must not block and must swallow their
/// own failures; the caller never learns whether an effect played.
pub trait Effects {
    fn emit(&mut self, effect: Effect);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Effects for Silent {
    fn emit(&mut self, _effect: Effect) {}
}

/// Keeps every emitted effect, in order.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub emitted: Vec<Effect>,
}

impl Effects for Recorder {
    fn emit(&mut self, effect: Effect) {
        self.emitted.push(effect);
    }
}
