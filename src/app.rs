//! Terminal session and the frame loop that drives the game.

use anyhow::{Context, Result};
use crossterm::{cursor, event, execute, terminal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Stdout, stdout};
use std::time::{Duration, Instant};

use crate::assets::{AssetBook, CharacterId};
use crate::config::{Paths, load_settings, save_settings_atomic};
use crate::game::{Game, TickOutcome};
use crate::highscore::{JsonFileStore, ScoreStore};
use crate::input::{Command, InputEvent, collect_input_nonblocking};
use crate::render::Renderer;
use crate::sound::Speaker;

/// Command-line overrides on top of the settings file.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub character: Option<CharacterId>,
    pub fps: Option<u32>,
    pub mute: bool,
    pub seed: Option<u64>,
}

/// Raw mode + alternate screen for as long as it lives.
struct TerminalSession {
    out: Stdout,
    active: bool,
}

impl TerminalSession {
    fn begin() -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
            event::EnableMouseCapture,
        )?;
        Ok(Self { out, active: true })
    }

    fn end(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.out,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

fn pixel_size(cols: u16, rows: u16) -> (usize, usize) {
    (cols as usize, rows as usize * 2)
}

pub fn run(paths: &Paths, opts: Options) -> Result<()> {
    let mut settings = load_settings(&paths.settings_path);
    if let Some(character) = opts.character {
        settings.character = character;
    }
    if let Some(fps) = opts.fps {
        settings.fps = fps;
    }
    if opts.mute {
        settings.sound = false;
    }
    settings
        .tuning
        .validate()
        .context("invalid tuning in settings file")?;

    let rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let store = JsonFileStore::new(&paths.highscore_path);
    tracing::info!(path = %store.path().display(), "high score store");
    let mut game = Game::new(settings.tuning.clone(), store, settings.character, rng);

    let book = AssetBook::load();
    let mut speaker = Speaker::open(&book, settings.sound);
    let frame_dur = Duration::from_secs_f64(1.0 / f64::from(settings.fps_clamped()));
    tracing::info!(
        fps = settings.fps_clamped(),
        audible = speaker.is_audible(),
        character = %game.character(),
        "starting"
    );

    let mut session = TerminalSession::begin()?;
    let (cols, rows) = terminal::size()?;
    let (pw, ph) = pixel_size(cols, rows);
    let mut renderer = Renderer::new(pw, ph);

    frame_loop(&mut game, &mut renderer, &mut speaker, &book, &mut session, frame_dur)?;

    session.end()?;
    settings.character = game.character();
    save_settings_atomic(&paths.settings_path, &settings)?;
    tracing::info!(best = game.high_score().best(), "bye");
    Ok(())
}

/// One iteration per display frame: input, at most one tick, draw, pace.
/// A tick is only issued while the run is live, so once a run ends or the
/// player goes home no further tick can touch the state.
fn frame_loop<S: ScoreStore>(
    game: &mut Game<S>,
    renderer: &mut Renderer,
    speaker: &mut Speaker,
    book: &AssetBook,
    session: &mut TerminalSession,
    frame_dur: Duration,
) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        for ev in collect_input_nonblocking()? {
            match ev {
                InputEvent::Command(Command::Quit) => return Ok(()),
                InputEvent::Command(Command::Activate) => {
                    game.activate(speaker);
                }
                InputEvent::Command(Command::Restart) => {
                    game.restart(speaker);
                }
                InputEvent::Command(Command::Home) => {
                    game.home();
                }
                InputEvent::Command(Command::NextCharacter) => {
                    game.cycle_character();
                }
                InputEvent::Resize { cols, rows } => {
                    let (pw, ph) = pixel_size(cols, rows);
                    renderer.resize(pw, ph);
                    tracing::debug!(pw, ph, "resized");
                }
            }
        }

        if game.is_running() {
            // Dimensions are read fresh each tick
            let viewport = renderer.viewport(game.tuning().world_height);
            if let TickOutcome::Ended(crash) = game.tick(viewport, speaker) {
                tracing::debug!(?crash, "loop stopped");
            }
        }

        renderer.draw(game, book.sprite(game.character()));
        renderer.present(&mut session.out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_blocks_double_the_rows() {
        assert_eq!(pixel_size(80, 24), (80, 48));
    }
}
