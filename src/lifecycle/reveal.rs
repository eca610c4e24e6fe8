//! Companion text and counter reveal for the celebration overlay
//!
//! Nothing here is simulated. The timeline is a pure function of elapsed
//! time; the scramble effect is a per-character countdown advanced once per
//! scheduler tick.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::easing;
use crate::settings::{CounterConfig, OverlayConfig};

/// Glyphs shown while a character is scrambling
pub const SCRAMBLE_GLYPHS: &str = "!<>-_\\/[]{}—=+*^?#________";

/// Random glyphs shown before a character settles
pub const SCRAMBLE_ITERATIONS: u8 = 10;

/// Ticks between consecutive characters starting to scramble
pub const SCRAMBLE_STAGGER_TICKS: u32 = 2;

/// Transform/opacity of one text block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockState {
    pub opacity: f32,
    /// Vertical offset in CSS pixels (positive = below rest position)
    pub offset_y: f32,
    pub scale: f32,
}

impl BlockState {
    const HIDDEN: BlockState = BlockState {
        opacity: 0.0,
        offset_y: 0.0,
        scale: 1.0,
    };
}

/// Sampled reveal state for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealFrame {
    pub icon_scale: f32,
    /// Degrees
    pub icon_rotation: f32,
    pub message: BlockState,
    pub sub_message: BlockState,
}

/// Icon pop-in, then headline, then sub-headline, overlapping slightly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTimeline {
    pub icon_ms: f32,
    pub message_start_ms: f32,
    pub message_ms: f32,
    pub sub_start_ms: f32,
    pub sub_ms: f32,
    /// Icon pulse half-period after it lands
    pub pulse_ms: f32,
}

impl Default for RevealTimeline {
    fn default() -> Self {
        Self {
            icon_ms: 800.0,
            message_start_ms: 500.0,
            message_ms: 1000.0,
            sub_start_ms: 1000.0,
            sub_ms: 800.0,
            pulse_ms: 500.0,
        }
    }
}

impl RevealTimeline {
    /// Total time until every block has settled (pulse excluded)
    pub fn duration_ms(&self) -> f32 {
        (self.message_start_ms + self.message_ms)
            .max(self.sub_start_ms + self.sub_ms)
            .max(self.icon_ms)
    }

    pub fn sample(&self, elapsed_ms: f32) -> RevealFrame {
        let elapsed = elapsed_ms.max(0.0);

        let (icon_scale, icon_rotation) = if elapsed < self.icon_ms {
            let k = easing::back_out(1.7, elapsed / self.icon_ms);
            (k, -180.0 * (1.0 - k))
        } else {
            // Yoyo pulse between 1.0 and 1.1
            let phase = (elapsed - self.icon_ms) / self.pulse_ms;
            let leg = phase.fract();
            let t = if (phase as u32) % 2 == 0 { leg } else { 1.0 - leg };
            (1.0 + 0.1 * easing::sine_in_out(t), 0.0)
        };

        let message = if elapsed < self.message_start_ms {
            BlockState::HIDDEN
        } else {
            let k = easing::elastic_out(1.0, 0.5, (elapsed - self.message_start_ms) / self.message_ms);
            BlockState {
                opacity: k.clamp(0.0, 1.0),
                offset_y: 100.0 * (1.0 - k),
                scale: 0.5 + 0.5 * k,
            }
        };

        let sub_message = if elapsed < self.sub_start_ms {
            BlockState::HIDDEN
        } else {
            let k = easing::power_out(3, (elapsed - self.sub_start_ms) / self.sub_ms);
            BlockState {
                opacity: k,
                offset_y: 50.0 * (1.0 - k),
                scale: 1.0,
            }
        };

        RevealFrame {
            icon_scale,
            icon_rotation,
            message,
            sub_message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrambleChar {
    original: char,
    shown: char,
    start_tick: u32,
    remaining: u8,
}

/// Matrix-style reveal: each character flips through random glyphs, then
/// settles on its original.
#[derive(Debug, Clone)]
pub struct ScrambleText {
    chars: Vec<ScrambleChar>,
    tick: u32,
    glyphs: Vec<char>,
    rng: Pcg32,
}

impl ScrambleText {
    pub fn new(text: &str, seed: u64) -> Self {
        let chars = text
            .chars()
            .enumerate()
            .map(|(i, c)| ScrambleChar {
                original: c,
                shown: c,
                start_tick: i as u32 * SCRAMBLE_STAGGER_TICKS,
                // Whitespace never scrambles
                remaining: if c.is_whitespace() { 0 } else { SCRAMBLE_ITERATIONS },
            })
            .collect();
        Self {
            chars,
            tick: 0,
            glyphs: SCRAMBLE_GLYPHS.chars().collect(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Advance every character by one tick
    pub fn advance(&mut self) {
        for c in self.chars.iter_mut() {
            if c.remaining == 0 || self.tick < c.start_tick {
                continue;
            }
            c.remaining -= 1;
            c.shown = if c.remaining == 0 {
                c.original
            } else {
                self.glyphs[self.rng.random_range(0..self.glyphs.len())]
            };
        }
        self.tick += 1;
    }

    pub fn is_settled(&self) -> bool {
        self.chars.iter().all(|c| c.remaining == 0)
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.shown).collect()
    }

    pub fn original(&self) -> String {
        self.chars.iter().map(|c| c.original).collect()
    }
}

/// Eased numeric counter
#[derive(Debug, Clone, PartialEq)]
pub struct CountUp {
    config: CounterConfig,
}

impl CountUp {
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }

    pub fn value_at(&self, elapsed_ms: f64) -> f64 {
        let c = &self.config;
        if c.duration_ms <= 0.0 {
            return c.end;
        }
        let t = (elapsed_ms / c.duration_ms) as f32;
        c.start + (c.end - c.start) * easing::power_out(2, t) as f64
    }

    pub fn is_done(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.config.duration_ms
    }

    pub fn text_at(&self, elapsed_ms: f64) -> String {
        format!(
            "{}{}{}",
            self.config.prefix,
            format_number(self.value_at(elapsed_ms), self.config.decimals, &self.config.separator),
            self.config.suffix
        )
    }
}

/// Fixed decimals with a thousands separator on the integer part
pub fn format_number(value: f64, decimals: usize, separator: &str) -> String {
    let fixed = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Everything the overlay reveals next to the confetti
#[derive(Debug, Clone)]
pub struct Reveal {
    timeline: RevealTimeline,
    headline: ScrambleText,
    sub_message: String,
    counter: Option<CountUp>,
    started_at: f64,
    frozen_at: Option<f64>,
}

impl Reveal {
    pub fn new(config: &OverlayConfig, started_at: f64, seed: u64) -> Self {
        Self {
            timeline: RevealTimeline::default(),
            headline: ScrambleText::new(&config.message, seed),
            sub_message: config.sub_message.clone(),
            counter: config.counter.clone().map(CountUp::new),
            started_at,
            frozen_at: None,
        }
    }

    /// One scheduler tick
    pub fn advance(&mut self) {
        if self.frozen_at.is_none() {
            self.headline.advance();
        }
    }

    /// Stop animating; later samples hold the state at `now`
    pub fn freeze(&mut self, now: f64) {
        self.frozen_at.get_or_insert(now);
    }

    fn elapsed(&self, now: f64) -> f64 {
        (self.frozen_at.unwrap_or(now) - self.started_at).max(0.0)
    }

    pub fn frame(&self, now: f64) -> RevealFrame {
        self.timeline.sample(self.elapsed(now) as f32)
    }

    pub fn headline(&self) -> String {
        self.headline.text()
    }

    pub fn sub_message(&self) -> &str {
        &self.sub_message
    }

    pub fn counter_text(&self, now: f64) -> Option<String> {
        let elapsed = self.elapsed(now);
        self.counter.as_ref().map(|c| c.text_at(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_hidden_then_settled() {
        let tl = RevealTimeline::default();
        let start = tl.sample(0.0);
        assert_eq!(start.message.opacity, 0.0);
        assert_eq!(start.sub_message.opacity, 0.0);
        assert!(start.icon_scale.abs() < 1e-5);

        let end = tl.sample(tl.duration_ms());
        assert!((end.message.opacity - 1.0).abs() < 1e-5);
        assert!(end.message.offset_y.abs() < 1e-3);
        assert!((end.sub_message.opacity - 1.0).abs() < 1e-5);
        assert!(end.icon_rotation.abs() < 1e-5);
    }

    #[test]
    fn test_icon_pulse_bounded() {
        let tl = RevealTimeline::default();
        for i in 0..200 {
            let f = tl.sample(tl.icon_ms + i as f32 * 17.0);
            assert!(f.icon_scale >= 1.0 - 1e-5 && f.icon_scale <= 1.1 + 1e-5);
        }
    }

    #[test]
    fn test_scramble_settles_on_original() {
        let mut s = ScrambleText::new("Hi there", 4);
        assert_eq!(s.text(), "Hi there");
        s.advance();
        // First character is scrambling
        assert_ne!(s.text().chars().next(), Some('H'));

        let mut ticks = 0;
        while !s.is_settled() {
            s.advance();
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(s.text(), "Hi there");
        // Last character starts at 7 * stagger and needs all iterations
        assert_eq!(ticks + 1, 7 * SCRAMBLE_STAGGER_TICKS + SCRAMBLE_ITERATIONS as u32);
    }

    #[test]
    fn test_scramble_keeps_spaces() {
        let mut s = ScrambleText::new("a b", 1);
        for _ in 0..5 {
            s.advance();
            assert_eq!(s.text().chars().nth(1), Some(' '));
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.0, 0, ","), "1,234,567");
        assert_eq!(format_number(999.0, 0, ","), "999");
        assert_eq!(format_number(-1234.5, 2, " "), "-1 234.50");
        assert_eq!(format_number(0.0, 1, ","), "0.0");
    }

    #[test]
    fn test_count_up_reaches_end() {
        let counter = CountUp::new(CounterConfig {
            end: 2500.0,
            duration_ms: 1000.0,
            suffix: "+".to_string(),
            ..CounterConfig::default()
        });
        assert_eq!(counter.text_at(0.0), "0+");
        assert!(counter.value_at(500.0) > 1250.0);
        assert_eq!(counter.text_at(1000.0), "2,500+");
        assert!(counter.is_done(1200.0));
    }

    #[test]
    fn test_reveal_freeze_holds_frame() {
        let config = OverlayConfig::default();
        let mut reveal = Reveal::new(&config, 100.0, 3);
        reveal.freeze(400.0);
        assert_eq!(reveal.frame(400.0), reveal.frame(5000.0));
        let before = reveal.headline();
        reveal.advance();
        assert_eq!(reveal.headline(), before);
    }
}
