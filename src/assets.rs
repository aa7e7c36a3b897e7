//! Character roster with sprite art and flap voices.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::render::Rgb;

// ── Characters ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CharacterId {
    Nidha,
    Aami,
}

impl CharacterId {
    pub const ALL: [CharacterId; 2] = [CharacterId::Nidha, CharacterId::Aami];

    pub fn next(self) -> CharacterId {
        match self {
            CharacterId::Nidha => CharacterId::Aami,
            CharacterId::Aami => CharacterId::Nidha,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CharacterId::Nidha => "nidha",
            CharacterId::Aami => "aami",
        }
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Sprites ─────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const NIDHA_ART: [&str; 8] = [
    "..OOOO..",
    ".OYYYEO.",
    "OYYYEPO.",
    "OWWYYYBB",
    "OWWWYYBB",
    "OYYYYYO.",
    ".OYYYO..",
    "..OOO...",
];

#[rustfmt::skip]
const AAMI_ART: [&str; 8] = [
    "..OOOO..",
    ".ORRREO.",
    "ORRREPO.",
    "OHHRRRBB",
    "OHHHRRBB",
    "ORRRRRO.",
    ".ORRRO..",
    "..OOO...",
];

fn glyph_color(ch: char) -> Option<Option<Rgb>> {
    let c = match ch {
        '.' => return Some(None),
        'O' => Rgb(60, 40, 20),
        'Y' => Rgb(245, 200, 66),
        'W' => Rgb(215, 165, 35),
        'R' => Rgb(230, 90, 110),
        'H' => Rgb(250, 150, 170),
        'E' => Rgb(255, 255, 255),
        'P' => Rgb(20, 20, 20),
        'B' => Rgb(225, 75, 35),
        _ => return None,
    };
    Some(Some(c))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteError {
    Empty,
    RaggedRow { row: usize, expected: usize, found: usize },
    UnknownGlyph { row: usize, col: usize, glyph: char },
}

impl fmt::Display for SpriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpriteError::Empty => f.write_str("sprite has no pixels"),
            SpriteError::RaggedRow { row, expected, found } => {
                write!(f, "row {row} is {found} wide, expected {expected}")
            }
            SpriteError::UnknownGlyph { row, col, glyph } => {
                write!(f, "unknown glyph {glyph:?} at {row}:{col}")
            }
        }
    }
}

impl std::error::Error for SpriteError {}

/// Pixel art, `None` pixels are transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub w: usize,
    pub h: usize,
    px: Vec<Option<Rgb>>,
}

impl Sprite {
    pub fn decode(rows: &[&str]) -> Result<Sprite, SpriteError> {
        let w = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if w == 0 {
            return Err(SpriteError::Empty);
        }
        let mut px = Vec::with_capacity(w * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != w {
                return Err(SpriteError::RaggedRow { row, expected: w, found });
            }
            for (col, glyph) in line.chars().enumerate() {
                let c = glyph_color(glyph).ok_or(SpriteError::UnknownGlyph { row, col, glyph })?;
                px.push(c);
            }
        }
        Ok(Sprite { w, h: rows.len(), px })
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.w && y < self.h {
            self.px[y * self.w + x]
        } else {
            None
        }
    }
}

/// A sprite slot. Not ready means the renderer draws a placeholder.
#[derive(Debug, Clone, Default)]
pub struct SpriteHandle {
    sprite: Option<Sprite>,
}

impl SpriteHandle {
    pub fn load(character: CharacterId, rows: &[&str]) -> Self {
        match Sprite::decode(rows) {
            Ok(sprite) => Self { sprite: Some(sprite) },
            Err(err) => {
                tracing::warn!(%character, %err, "sprite unavailable, using placeholder");
                Self { sprite: None }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.sprite.is_some()
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }
}

// ── Sounds ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
}

/// A one-shot pitch sweep with a linear fade-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub seconds: f32,
    pub gain: f32,
}

pub const CRASH_VOICE: Voice = Voice {
    waveform: Waveform::Saw,
    start_hz: 400.0,
    end_hz: 80.0,
    seconds: 0.5,
    gain: 0.15,
};

fn flap_voice(character: CharacterId) -> Voice {
    match character {
        CharacterId::Nidha => Voice {
            waveform: Waveform::Sine,
            start_hz: 660.0,
            end_hz: 990.0,
            seconds: 0.12,
            gain: 0.25,
        },
        CharacterId::Aami => Voice {
            waveform: Waveform::Square,
            start_hz: 520.0,
            end_hz: 780.0,
            seconds: 0.10,
            gain: 0.12,
        },
    }
}

// ── Book ────────────────────────────────────────────────────────────────────

struct Entry {
    sprite: SpriteHandle,
    voice: Voice,
}

impl Entry {
    fn load(id: CharacterId, art: &[&str]) -> Self {
        Self {
            sprite: SpriteHandle::load(id, art),
            voice: flap_voice(id),
        }
    }
}

/// Everything each character needs, loaded once at startup.
pub struct AssetBook {
    nidha: Entry,
    aami: Entry,
}

impl AssetBook {
    pub fn load() -> Self {
        Self {
            nidha: Entry::load(CharacterId::Nidha, &NIDHA_ART),
            aami: Entry::load(CharacterId::Aami, &AAMI_ART),
        }
    }

    fn entry(&self, id: CharacterId) -> &Entry {
        match id {
            CharacterId::Nidha => &self.nidha,
            CharacterId::Aami => &self.aami,
        }
    }

    pub fn sprite(&self, id: CharacterId) -> &SpriteHandle {
        &self.entry(id).sprite
    }

    pub fn flap_voice(&self, id: CharacterId) -> Voice {
        self.entry(id).voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sprites_are_ready() {
        let book = AssetBook::load();
        for id in CharacterId::ALL {
            let handle = book.sprite(id);
            assert!(handle.is_ready(), "{id} sprite should decode");
            let sprite = handle.sprite().unwrap();
            assert_eq!((sprite.w, sprite.h), (8, 8));
        }
    }

    #[test]
    fn transparent_and_opaque_pixels() {
        let s = Sprite::decode(&[".Y", "P."]).unwrap();
        assert_eq!(s.get(0, 0), None);
        assert_eq!(s.get(1, 0), Some(Rgb(245, 200, 66)));
        assert_eq!(s.get(0, 1), Some(Rgb(20, 20, 20)));
        assert_eq!(s.get(5, 5), None);
    }

    #[test]
    fn ragged_art_is_rejected() {
        let err = Sprite::decode(&["YY", "Y"]).unwrap_err();
        assert_eq!(
            err,
            SpriteError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn bad_art_leaves_handle_not_ready() {
        let handle = SpriteHandle::load(CharacterId::Aami, &["YZ"]);
        assert!(!handle.is_ready());
        assert!(!SpriteHandle::load(CharacterId::Aami, &[]).is_ready());
    }

    #[test]
    fn characters_cycle() {
        assert_eq!(CharacterId::Nidha.next(), CharacterId::Aami);
        assert_eq!(CharacterId::Aami.next().next(), CharacterId::Aami);
    }

    #[test]
    fn voices_differ_per_character() {
        let book = AssetBook::load();
        assert_ne!(
            book.flap_voice(CharacterId::Nidha),
            book.flap_voice(CharacterId::Aami)
        );
    }
}
