//! Sound cues, synthesized with fundsp and played through rodio.
//!
//! A missing output device is not an error: [`Audio::open`] logs it and
//! hands back a silent player.

use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::config::AudioConfig;

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Gesture closed while playing.
    Flap,
    /// Run ended.
    Crash,
}

#[derive(Debug, Clone, Copy)]
enum Waveform {
    Sine,
    Saw,
}

/// Linear pitch sweep from `from` to `to` Hz over `sweep` seconds, with the
/// gain falling linearly to zero over `length` seconds.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    wave: Waveform,
    from: f32,
    to: f32,
    sweep: f32,
    length: f32,
}

impl Cue {
    fn sweep(self) -> Sweep {
        match self {
            Cue::Flap => Sweep {
                wave: Waveform::Sine,
                from: 300.0,
                to: 700.0,
                sweep: 0.08,
                length: 0.12,
            },
            Cue::Crash => Sweep {
                wave: Waveform::Saw,
                from: 400.0,
                to: 80.0,
                sweep: 0.4,
                length: 0.5,
            },
        }
    }
}

/// Mono samples for `cue` at [`SAMPLE_RATE`], peak gain `volume`.
fn render(cue: Cue, volume: f32) -> Vec<f32> {
    let sweep = cue.sweep();
    let freq = shared(sweep.from);
    let mut osc: Box<dyn AudioUnit> = match sweep.wave {
        Waveform::Sine => Box::new(var(&freq) >> sine::<f32>()),
        Waveform::Saw => Box::new(var(&freq) >> saw()),
    };
    osc.set_sample_rate(SAMPLE_RATE as f64);

    let n = (sweep.length * SAMPLE_RATE as f32).round() as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            freq.set_value(lerp(sweep.from, sweep.to, (t / sweep.sweep).min(1.0)));
            let gain = volume * (1.0 - t / sweep.length);
            osc.get_mono() * gain
        })
        .collect()
}

pub struct Audio {
    stream: Option<OutputStream>,
    volume: f32,
}

impl Audio {
    pub fn open(config: &AudioConfig) -> Self {
        if !config.enabled {
            info!("audio disabled");
            return Self::silent();
        }
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                stream.log_on_drop(false);
                info!(volume = config.volume, "audio output opened");
                Self {
                    stream: Some(stream),
                    volume: config.volume,
                }
            }
            Err(e) => {
                warn!(error = %e, "no audio output, running silent");
                Self::silent()
            }
        }
    }

    pub fn silent() -> Self {
        Self {
            stream: None,
            volume: 0.0,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.stream.is_none()
    }

    /// Fire and forget.
    pub fn play(&self, cue: Cue) {
        let Some(stream) = &self.stream else { return };
        debug!(?cue, "play cue");
        let sink = Sink::connect_new(stream.mixer());
        let samples = render(cue, self.volume);
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
        sink.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_lengths() {
        assert_eq!(render(Cue::Crash, 0.15).len(), 22_050);
        assert_eq!(render(Cue::Flap, 0.15).len(), 5_292);
    }

    #[test]
    fn samples_stay_within_volume() {
        for cue in [Cue::Flap, Cue::Crash] {
            let samples = render(cue, 0.15);
            // Band-limited waveforms ring slightly past full scale.
            let peak = 0.15 * 1.2;
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= peak));
            assert!(samples.iter().any(|s| s.abs() > 0.01), "{cue:?} silent");
        }
    }

    #[test]
    fn fades_out() {
        let samples = render(Cue::Crash, 0.15);
        let tail = &samples[samples.len() - 100..];
        assert!(tail.iter().all(|s| s.abs() < 0.001));
    }

    #[test]
    fn disabled_is_silent_and_play_is_a_no_op() {
        let audio = Audio::open(&AudioConfig {
            enabled: false,
            volume: 0.5,
        });
        assert!(audio.is_silent());
        audio.play(Cue::Crash);
    }
}
