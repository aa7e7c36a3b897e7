//! A Flappy Bird style arcade game for the terminal.
//!
//! The simulation core ([`game`], [`physics`], [`obstacles`], [`collision`],
//! [`scoring`]) is free of terminal and audio concerns and is driven one tick
//! per frame by [`app`].

pub mod app;
pub mod assets;
pub mod collision;
pub mod config;
pub mod effects;
pub mod game;
pub mod highscore;
pub mod input;
pub mod obstacles;
pub mod physics;
pub mod render;
pub mod scoring;
pub mod sound;

pub use collision::Viewport;
pub use config::{Settings, Tuning};
pub use game::{Crash, Game, Phase, RunState, TickOutcome};
