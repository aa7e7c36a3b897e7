//! The player body: gravity, flap impulse and boundary clamping.

use crate::collision::Rect;
use crate::config::Tuning;

/// Raised when the body touches the floor. Always ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundCollision;

/// The player sprite: fixed x, vertical motion under constant per-tick gravity.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBody {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub velocity: f64,
    pub gravity: f64,
    pub jump: f64,
    // Squash & stretch, presentation only
    pub scale_x: f64,
    pub scale_y: f64,
    start_y: f64,
    squash: (f64, f64),
    recovery: f64,
}

impl PlayerBody {
    pub fn new(t: &Tuning) -> Self {
        Self {
            x: t.player_x,
            y: t.player_start_y,
            w: t.player_w,
            h: t.player_h,
            velocity: 0.0,
            gravity: t.gravity,
            jump: t.jump,
            scale_x: 1.0,
            scale_y: 1.0,
            start_y: t.player_start_y,
            squash: t.squash,
            recovery: t.squash_recovery,
        }
    }

    pub fn reset(&mut self) {
        self.y = self.start_y;
        self.velocity = 0.0;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }

    /// One fixed tick. `floor` is the current viewport height.
    pub fn integrate(&mut self, floor: f64) -> Option<GroundCollision> {
        self.velocity += self.gravity;
        self.y += self.velocity;

        self.scale_x += (1.0 - self.scale_x) * self.recovery;
        self.scale_y += (1.0 - self.scale_y) * self.recovery;

        if self.y + self.h > floor {
            self.y = floor - self.h;
            return Some(GroundCollision);
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.velocity = 0.0;
        }
        None
    }

    /// Overwrites velocity with the upward impulse; never stacks.
    pub fn flap(&mut self) {
        self.velocity = -self.jump;
        self.scale_x = self.squash.0;
        self.scale_y = self.squash.1;
    }

    /// Sprite rotation in radians, nose-down when falling.
    pub fn tilt(&self) -> f64 {
        (self.velocity * 0.1).clamp(-0.5, 0.5)
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            left: self.x,
            top: self.y,
            right: self.x + self.w,
            bottom: self.y + self.h,
        }
    }
}
