//! Synthesized effects played through the default audio device.

use fundsp::prelude::{AudioUnit, saw, sine, square};
use rodio::{OutputStream, OutputStreamHandle, Sink, buffer::SamplesBuffer};
use std::collections::HashMap;

use crate::assets::{AssetBook, CRASH_VOICE, CharacterId, Voice, Waveform};
use crate::effects::{Effect, Effects};

pub const SAMPLE_RATE: u32 = 44_100;

const LEVEL_VOICE: Voice = Voice {
    waveform: Waveform::Sine,
    start_hz: 880.0,
    end_hz: 1320.0,
    seconds: 0.25,
    gain: 0.2,
};

/// Renders a pitch sweep into mono samples.
pub fn synthesize(voice: &Voice) -> Vec<f32> {
    let mut osc: Box<dyn AudioUnit> = match voice.waveform {
        Waveform::Sine => Box::new(sine::<f32>()),
        Waveform::Saw => Box::new(saw()),
        Waveform::Square => Box::new(square()),
    };
    osc.set_sample_rate(f64::from(SAMPLE_RATE));

    let n = (voice.seconds * SAMPLE_RATE as f32) as usize;
    let mut out = [0.0f32];
    (0..n)
        .map(|i| {
            let p = i as f32 / n as f32;
            let hz = voice.start_hz + (voice.end_hz - voice.start_hz) * p;
            osc.tick(&[hz], &mut out);
            out[0] * voice.gain * (1.0 - p)
        })
        .collect()
}

/// Plays effects on the default output device. Every sound gets its own
/// detached sink, so overlapping flaps never queue behind each other.
pub struct Speaker {
    // Dropping the stream silences everything
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
    flaps: HashMap<CharacterId, Vec<f32>>,
    crash: Vec<f32>,
    level: Vec<f32>,
}

impl Speaker {
    pub fn open(book: &AssetBook, enabled: bool) -> Self {
        let (stream, handle) = if enabled {
            match OutputStream::try_default() {
                Ok((stream, handle)) => (Some(stream), Some(handle)),
                Err(err) => {
                    tracing::warn!(%err, "no audio output, playing silently");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        let flaps = CharacterId::ALL
            .iter()
            .map(|&id| (id, synthesize(&book.flap_voice(id))))
            .collect();

        Self {
            _stream: stream,
            handle,
            flaps,
            crash: synthesize(&CRASH_VOICE),
            level: synthesize(&LEVEL_VOICE),
        }
    }

    pub fn is_audible(&self) -> bool {
        self.handle.is_some()
    }

    fn play(&self, samples: &[f32]) {
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
                sink.detach();
            }
            Err(err) => tracing::debug!(%err, "dropped sound"),
        }
    }
}

impl Effects for Speaker {
    fn emit(&mut self, effect: Effect) {
        match effect {
            Effect::Flap(id) => {
                if let Some(samples) = self.flaps.get(&id) {
                    self.play(samples);
                }
            }
            Effect::Crash => self.play(&self.crash),
            Effect::LevelUp(_) => self.play(&self.level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_length_follows_duration() {
        assert_eq!(synthesize(&CRASH_VOICE).len(), 22_050);
    }

    #[test]
    fn sweep_stays_under_gain_and_fades() {
        let samples = synthesize(&CRASH_VOICE);
        let limit = CRASH_VOICE.gain * 1.25;
        assert!(samples.iter().all(|s| s.abs() <= limit));
        let tail = &samples[samples.len() - 100..];
        assert!(tail.iter().all(|s| s.abs() < 0.01));
    }

    #[test]
    fn muted_speaker_swallows_everything() {
        let book = AssetBook::load();
        let mut speaker = Speaker::open(&book, false);
        assert!(!speaker.is_audible());
        speaker.emit(Effect::Flap(CharacterId::Aami));
        speaker.emit(Effect::Crash);
        speaker.emit(Effect::LevelUp(3));
        assert_eq!(speaker.flaps.len(), 2);
    }
}
