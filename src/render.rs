//! Half-block pixel renderer for the terminal.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::assets::SpriteHandle;
use crate::collision::Viewport;
use crate::game::{Game, Phase};
use crate::highscore::ScoreStore;
use crate::physics::PlayerBody;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

/// CSS-style hsl, hue in degrees (wraps), saturation and lightness in 0..=1.
pub fn hsl(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb(to_u8(r), to_u8(g), to_u8(b))
}

/// Pipes drift around the color wheel as the score climbs.
pub fn pipe_hue(score: u32) -> f64 {
    90.0 + f64::from((score % 72) * 5)
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const PLACEHOLDER: Rgb = Rgb(255, 215, 0);
const GOLD: Rgb = Rgb(245, 200, 66);
const PANEL_EDGE: Rgb = Rgb(210, 185, 110);
const PANEL: Rgb = Rgb(220, 195, 120);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// Pipe rim, world units
const CAP_H: f64 = 20.0;
const CAP_OVERHANG: f64 = 2.0;
const PLACEHOLDER_RADIUS: f64 = 15.0;

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, c: Rgb) {
        let r = r.max(1.0);
        let reach = r.ceil() as i32;
        let (ix, iy) = (cx.floor() as i32, cy.floor() as i32);
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let fx = (ix + dx) as f64 + 0.5 - cx;
                let fy = (iy + dy) as f64 + 0.5 - cy;
                if fx * fx + fy * fy <= r * r {
                    self.set(ix + dx, iy + dy, c);
                }
            }
        }
    }

    fn dim_all(&mut self) {
        for p in &mut self.px {
            *p = p.dim();
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(term_color(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(term_color(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap font ────────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
const LETTERS: [[u8; 15]; 26] = [
    [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // A
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0], // B
    [0,1,1, 1,0,0, 1,0,0, 1,0,0, 0,1,1], // C
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,1,0], // D
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1], // E
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0], // F
    [0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1], // G
    [1,0,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // H
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 1,1,1], // I
    [0,0,1, 0,0,1, 0,0,1, 1,0,1, 0,1,0], // J
    [1,0,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // K
    [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1], // L
    [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1], // M
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,0,1], // N
    [0,1,0, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // O
    [1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0], // P
    [0,1,0, 1,0,1, 1,0,1, 1,1,0, 0,1,1], // Q
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // R
    [0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0], // S
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0], // T
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // U
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // V
    [1,0,1, 1,0,1, 1,1,1, 1,1,1, 1,0,1], // W
    [1,0,1, 1,0,1, 0,1,0, 1,0,1, 1,0,1], // X
    [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0], // Y
    [1,1,1, 0,0,1, 0,1,0, 1,0,0, 1,1,1], // Z
];

fn glyph(ch: char) -> Option<&'static [u8; 15]> {
    match ch {
        '0'..='9' => Some(&DIGITS[ch as usize - '0' as usize]),
        'A'..='Z' => Some(&LETTERS[ch as usize - 'A' as usize]),
        'a'..='z' => Some(&LETTERS[ch as usize - 'a' as usize]),
        _ => None,
    }
}

fn draw_glyph(buf: &mut PixelBuf, x: i32, y: i32, glyph: &[u8; 15], fg: Rgb) {
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Centered on `cx`; 3px glyphs with 1px spacing. Unknown characters
/// leave a blank cell.
fn draw_text(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, fg: Rgb) {
    let n = text.chars().count() as i32;
    let start_x = cx - (n * 4 - 1) / 2;
    for (i, ch) in text.chars().enumerate() {
        if let Some(g) = glyph(ch) {
            draw_glyph(buf, start_x + i as i32 * 4, y, g, fg);
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    draw_text(buf, cx, y, &n.to_string(), fg);
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// The world-unit playfield for a pixel buffer: fixed height, width from
/// the aspect ratio.
pub fn viewport_for(pw: usize, ph: usize, world_height: f64) -> Viewport {
    if ph == 0 {
        return Viewport {
            width: 0.0,
            height: world_height,
        };
    }
    Viewport {
        width: pw as f64 * world_height / ph as f64,
        height: world_height,
    }
}

/// Draws a read-only snapshot of the game. Keeps only its own parallax offset.
pub struct Renderer {
    buf: PixelBuf,
    drift: f64,
}

impl Renderer {
    pub fn new(pw: usize, ph: usize) -> Self {
        Self {
            buf: PixelBuf::new(pw, ph),
            drift: 0.0,
        }
    }

    pub fn buf(&self) -> &PixelBuf {
        &self.buf
    }

    pub fn resize(&mut self, pw: usize, ph: usize) {
        self.buf.resize(pw, ph);
    }

    pub fn viewport(&self, world_height: f64) -> Viewport {
        viewport_for(self.buf.w, self.buf.h, world_height)
    }

    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        self.buf.render(out)
    }

    pub fn draw<S: ScoreStore>(&mut self, game: &Game<S>, sprite: &SpriteHandle) {
        let k = self.buf.h as f64 / game.tuning().world_height;
        self.drift += match game.phase() {
            Phase::Running => game.scroll_speed() * k,
            Phase::Idle => 0.5,
            Phase::Over => 0.0,
        };

        self.draw_sky();
        self.draw_hills(k);
        self.draw_pipes(game, k);
        draw_player(&mut self.buf, game.body(), sprite, k);

        let cx = self.buf.w as i32 / 2;
        let run = game.run();
        match game.phase() {
            Phase::Idle => self.draw_title(game),
            Phase::Running => {
                draw_number(&mut self.buf, cx, 4, run.score, WHITE);
                if run.banner_ticks > 0 {
                    let y = self.buf.h as i32 / 3;
                    draw_text(&mut self.buf, cx, y, &format!("LEVEL {}", run.level), GOLD);
                }
            }
            Phase::Over => self.draw_game_over(game),
        }
    }

    fn draw_sky(&mut self) {
        let h = self.buf.h;
        for y in 0..h {
            let t = (y * 256 / h.max(1)) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in 0..self.buf.w {
                self.buf.set(x as i32, y as i32, c);
            }
        }
    }

    fn draw_hills(&mut self, k: f64) {
        let base = self.buf.h as i32;
        let s = k * 3.0;
        // Far hills
        for x in 0..self.buf.w as i32 {
            let fx = (x as f64 + self.drift * 0.2) * 0.04;
            let h = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * s;
            let top = base - h as i32 - (10.0 * s) as i32;
            for y in top..base {
                self.buf.set(x, y, HILL_FAR);
            }
        }
        // Near hills
        for x in 0..self.buf.w as i32 {
            let fx = (x as f64 + self.drift * 0.4) * 0.06;
            let h = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * s;
            let top = base - h as i32 - (6.0 * s) as i32;
            for y in top..base {
                self.buf.set(x, y, HILL_NEAR);
            }
        }
    }

    fn draw_pipes<S: ScoreStore>(&mut self, game: &Game<S>, k: f64) {
        let field = game.field();
        let hue = pipe_hue(game.run().score);
        let edge = hsl(hue, 0.55, 0.35);
        let center = hsl(hue, 0.65, 0.50);
        let rim = hsl(hue, 0.65, 0.45);
        let border = hsl(hue, 0.70, 0.20);
        let height = game.tuning().world_height;

        let px = |v: f64| (v * k).round() as i32;
        let cap_h = px(CAP_H).max(1);
        let overhang = px(CAP_OVERHANG).max(1);

        for o in field.iter() {
            let top = o.top_segment(field.pipe_w());
            let bottom = o.bottom_segment(field.pipe_w(), field.gap(), height);
            let (x0, x1) = (px(top.left), px(top.right));
            let w = (x1 - x0).max(1);

            // Bodies, shaded dark-light-dark across the width
            for dx in 0..w {
                let t = ((dx as f64 + 0.5) / w as f64 * 2.0 - 1.0).abs();
                let c = Rgb::lerp(center, edge, (t * 256.0) as u16);
                for y in 0..px(top.bottom) {
                    self.buf.set(x0 + dx, y, c);
                }
                for y in px(bottom.top)..px(bottom.bottom) {
                    self.buf.set(x0 + dx, y, c);
                }
            }

            // Rims just outside the gap
            let gap_top = px(top.bottom);
            let gap_bot = px(bottom.top);
            let rim_w = w + overhang * 2;
            self.buf.fill_rect(x0 - overhang, gap_top - cap_h, rim_w, cap_h, rim);
            self.buf.fill_rect(x0 - overhang, gap_bot, rim_w, cap_h, rim);
            for dx in 0..rim_w {
                self.buf.set(x0 - overhang + dx, gap_top - 1, border);
                self.buf.set(x0 - overhang + dx, gap_bot, border);
            }
        }
    }

    fn draw_title<S: ScoreStore>(&mut self, game: &Game<S>) {
        let cx = self.buf.w as i32 / 2;
        let y = self.buf.h as i32 / 4;
        draw_text(&mut self.buf, cx, y, "WHY AM I FLYING", GOLD);
        draw_text(&mut self.buf, cx, y + 10, "SPACE TO FLAP", WHITE);
        let pick = format!("C {}", game.character().name());
        draw_text(&mut self.buf, cx, y + 17, &pick, WHITE);
        let best = game.high_score().best();
        if best > 0 {
            draw_text(&mut self.buf, cx, y + 24, &format!("BEST {best}"), GOLD);
        }
    }

    fn draw_game_over<S: ScoreStore>(&mut self, game: &Game<S>) {
        self.buf.dim_all();

        let cx = self.buf.w as i32 / 2;
        let cy = self.buf.h as i32 / 2;
        let panel_w = 44;
        let panel_h = 30;
        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;
        self.buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        self.buf.fill_rect(px, py, panel_w, panel_h, PANEL_EDGE);
        self.buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL);

        let run = game.run();
        draw_text(&mut self.buf, cx, py + 3, &format!("SCORE {}", run.score), WHITE);
        let best = if run.new_best {
            format!("BEST {} NEW", game.high_score().best())
        } else {
            format!("BEST {}", game.high_score().best())
        };
        draw_text(&mut self.buf, cx, py + 10, &best, GOLD);
        draw_text(&mut self.buf, cx, py + 17, "R RESTART", WHITE);
        draw_text(&mut self.buf, cx, py + 23, "H HOME", WHITE);
    }
}

/// Sprite scaled into the body's squashed box and rotated by its tilt, or a
/// filled circle while the sprite is not ready.
fn draw_player(buf: &mut PixelBuf, body: &PlayerBody, sprite: &SpriteHandle, k: f64) {
    let cx = (body.x + body.w / 2.0) * k;
    let cy = (body.y + body.h / 2.0) * k;

    let Some(sprite) = sprite.sprite() else {
        buf.fill_circle(cx, cy, PLACEHOLDER_RADIUS * k, PLACEHOLDER);
        return;
    };

    let w = (body.w * body.scale_x * k).max(1.0);
    let h = (body.h * body.scale_y * k).max(1.0);
    let (sin, cos) = body.tilt().sin_cos();
    let reach = (w.max(h) * 0.75).ceil() as i32;
    let (ix, iy) = (cx.floor() as i32, cy.floor() as i32);
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let fx = (ix + dx) as f64 + 0.5 - cx;
            let fy = (iy + dy) as f64 + 0.5 - cy;
            // Undo the rotation to find the source texel
            let ux = fx * cos + fy * sin;
            let uy = -fx * sin + fy * cos;
            let sx = (ux / w + 0.5) * sprite.w as f64;
            let sy = (uy / h + 0.5) * sprite.h as f64;
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            if let Some(c) = sprite.get(sx as usize, sy as usize) {
                buf.set(ix + dx, iy + dy, c);
            }
        }
    }
}
