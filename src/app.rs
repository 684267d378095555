//! Wiring: start the perception thread for the chosen backend, run the
//! render loop on the calling thread, then tear both down.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, trace, warn};

use crate::assets::AssetSet;
use crate::audio::{Audio, Cue};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::game::{FrameInput, GamePhase, PhaseMachine};
use crate::gesture::sim::{self, HeadlessPreview, KeyboardHand, SimInput, SyntheticCamera};
use crate::gesture::{GestureSignal, PerceptionLoop, PerceptionStats, PinchClassifier};
use crate::render::{Surface, TerminalGuard, TerminalSurface};

/// Where gestures come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Keyboard-driven stand-in hand, no camera.
    #[default]
    Sim,
    /// Real camera and landmark model (needs the `webcam` feature).
    Webcam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Start,
    Pinch,
}

fn key_action(key: KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyAction::Start),
        KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::Pinch),
        _ => None,
    }
}

/// Run the game until the player quits or perception stops.
pub fn run(config: &Config, backend: Backend) -> Result<()> {
    let signal = Arc::new(GestureSignal::new());
    let assets = AssetSet::load(config);
    let audio = Audio::open(&config.audio);
    let (sim_tx, perception) = spawn_perception(config, backend, Arc::clone(&signal))?;
    info!(?backend, "game started");

    let outcome = TerminalGuard::enter().and_then(|mut guard| {
        let result = present(config, &signal, sim_tx.as_ref(), &assets, &audio);
        guard.leave().map_err(Error::Terminal)?;
        result
    });

    signal.request_stop();
    drop(sim_tx);
    match perception.join() {
        Ok(stats) => info!(?stats, "perception joined"),
        Err(_) => warn!("perception thread panicked"),
    }
    outcome
}

type Perception = (Option<Sender<SimInput>>, JoinHandle<PerceptionStats>);

fn spawn_perception(
    config: &Config,
    backend: Backend,
    signal: Arc<GestureSignal>,
) -> Result<Perception> {
    let classifier = PinchClassifier::new(config.gesture.pinch_threshold_px);
    match backend {
        Backend::Sim => {
            let (tx, rx) = sim::channel();
            let handle = PerceptionLoop::new(
                SyntheticCamera::new(&config.sim),
                KeyboardHand::new(rx, &config.sim),
                HeadlessPreview,
                classifier,
                signal,
            )
            .spawn()?;
            Ok((Some(tx), handle))
        }
        #[cfg(feature = "webcam")]
        Backend::Webcam => {
            use crate::gesture::webcam::{OnnxHandDetector, OpenCvCamera, OpenCvPreview};

            let camera = OpenCvCamera::open(config.webcam.device_index)?;
            let detector = OnnxHandDetector::load(&config.webcam)?;
            let preview = OpenCvPreview::new();
            let perception = PerceptionLoop::new(camera, detector, preview, classifier, signal);
            Ok((None, perception.spawn()?))
        }
        #[cfg(not(feature = "webcam"))]
        Backend::Webcam => Err(Error::InvalidConfig(
            "the webcam backend needs a build with `--features webcam`".into(),
        )),
    }
}

/// Everything the render loop touches between frames.
struct Frames<'a, R = StdRng> {
    machine: PhaseMachine<R>,
    signal: &'a GestureSignal,
    assets: &'a AssetSet,
    audio: &'a Audio,
}

impl<R: Rng> Frames<'_, R> {
    /// One frame: step, sound cues, draw, present. Returns `false` without
    /// drawing once the signal has stopped.
    fn render<S>(&mut self, surface: &mut S, input: FrameInput, now: Instant) -> Result<bool>
    where
        S: Surface + ?Sized,
    {
        // Both loops end on the same flag, whichever side lowered it.
        if !self.signal.is_running() {
            return Ok(false);
        }

        let closed = self.signal.currently_closed();
        let events = self.machine.step(input, closed, now);
        if let Some(phase) = events.entered {
            let score = self.machine.simulation().displayed_score();
            info!(?phase, score, "entered phase");
        }
        if events.jumped_edge {
            self.audio.play(Cue::Flap);
        }
        if events.entered == Some(GamePhase::GameOver) {
            self.audio.play(Cue::Crash);
        }

        self.machine.draw(surface, self.assets, closed);
        surface.present()?;
        Ok(true)
    }

    /// Render at `frame_dur` intervals until the signal stops. `poll` reads
    /// the input for each frame and may adjust the surface (on resize).
    fn run<S, P>(&mut self, surface: &mut S, frame_dur: Duration, mut poll: P) -> Result<()>
    where
        S: Surface,
        P: FnMut(&mut S) -> Result<FrameInput>,
    {
        loop {
            let frame_start = Instant::now();
            let input = poll(surface)?;
            if !self.render(surface, input, frame_start)? {
                return Ok(());
            }

            let elapsed = frame_start.elapsed();
            trace!(?elapsed, "frame");
            if elapsed < frame_dur {
                std::thread::sleep(frame_dur - elapsed);
            }
        }
    }
}

/// Drain pending terminal events into this frame's input.
fn poll_terminal(
    surface: &mut TerminalSurface,
    signal: &GestureSignal,
    sim_tx: Option<&Sender<SimInput>>,
) -> Result<FrameInput> {
    let mut input = FrameInput::default();
    while event::poll(Duration::ZERO).map_err(Error::Terminal)? {
        match event::read().map_err(Error::Terminal)? {
            Event::Key(key) => match key_action(key) {
                Some(KeyAction::Quit) => {
                    if signal.request_stop() {
                        info!("quit from keyboard");
                    }
                }
                Some(KeyAction::Start) => input.start_pressed = true,
                Some(KeyAction::Pinch) => {
                    if let Some(tx) = sim_tx {
                        // Receiver only goes away once perception has stopped.
                        let _ = tx.send(SimInput::Pinch);
                    }
                }
                None => {}
            },
            Event::Resize(cols, rows) => surface.resize(cols, rows),
            _ => {}
        }
    }
    Ok(input)
}

fn present(
    config: &Config,
    signal: &GestureSignal,
    sim_tx: Option<&Sender<SimInput>>,
    assets: &AssetSet,
    audio: &Audio,
) -> Result<()> {
    let mut surface = TerminalSurface::stdout(config.screen.width, config.screen.height)?;
    let mut frames = Frames {
        machine: PhaseMachine::new(config, StdRng::from_os_rng(), Instant::now()),
        signal,
        assets,
        audio,
    };
    let poll = |surface: &mut TerminalSurface| poll_terminal(surface, signal, sim_tx);
    frames.run(&mut surface, config.tick_duration(), poll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DrawOp, RecordingSurface};

    const START: FrameInput = FrameInput {
        start_pressed: true,
    };

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn action(code: KeyCode) -> Option<KeyAction> {
        key_action(press(code))
    }

    fn frames<'a>(signal: &'a GestureSignal, assets: &'a AssetSet, audio: &'a Audio) -> Frames<'a> {
        Frames {
            machine: PhaseMachine::new(
                &Config::default(),
                StdRng::seed_from_u64(5),
                Instant::now(),
            ),
            signal,
            assets,
            audio,
        }
    }

    fn presents(surface: &RecordingSurface) -> usize {
        surface.ops.iter().filter(|op| **op == DrawOp::Present).count()
    }

    #[test]
    fn key_bindings() {
        assert_eq!(action(KeyCode::Char('q')), Some(KeyAction::Quit));
        assert_eq!(action(KeyCode::Esc), Some(KeyAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_action(ctrl_c), Some(KeyAction::Quit));
        assert_eq!(action(KeyCode::Char('c')), None);
        assert_eq!(action(KeyCode::Char(' ')), Some(KeyAction::Start));
        assert_eq!(action(KeyCode::Up), Some(KeyAction::Pinch));
        assert_eq!(action(KeyCode::Char('k')), Some(KeyAction::Pinch));
        assert_eq!(action(KeyCode::Char('x')), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;
        assert_eq!(key_action(key), None);
    }

    #[test]
    fn each_frame_steps_draws_then_presents() {
        let (signal, assets, audio) = (GestureSignal::new(), AssetSet::fallback(), Audio::silent());
        let mut frames = frames(&signal, &assets, &audio);
        let mut surface = RecordingSurface::default();
        let t0 = Instant::now();

        assert!(frames.render(&mut surface, START, t0).unwrap());
        assert_eq!(frames.machine.phase(), GamePhase::Countdown);
        let background = Config::default().colors.background;
        assert_eq!(surface.ops.first(), Some(&DrawOp::Clear(background)));
        assert_eq!(surface.ops.last(), Some(&DrawOp::Present));

        let later = t0 + Duration::from_secs(3);
        let idle = FrameInput::default();
        assert!(frames.render(&mut surface, idle, later).unwrap());
        assert_eq!(frames.machine.phase(), GamePhase::Playing);
        assert_eq!(frames.machine.simulation().score(), 1);
        assert_eq!(presents(&surface), 2);
        let ops = &surface.ops;
        let clears = ops.iter().filter(|op| matches!(op, DrawOp::Clear(_)));
        assert_eq!(clears.count(), 2);
    }

    #[test]
    fn stopped_signal_skips_the_frame() {
        let (signal, assets, audio) = (GestureSignal::new(), AssetSet::fallback(), Audio::silent());
        signal.request_stop();
        let mut frames = frames(&signal, &assets, &audio);
        let mut surface = RecordingSurface::default();

        assert!(!frames.render(&mut surface, START, Instant::now()).unwrap());
        assert!(surface.ops.is_empty());
        assert_eq!(frames.machine.phase(), GamePhase::Intro);
    }

    #[test]
    fn loop_ends_when_quit_lowers_the_flag() {
        let (signal, assets, audio) = (GestureSignal::new(), AssetSet::fallback(), Audio::silent());
        let mut frames = frames(&signal, &assets, &audio);
        let mut surface = RecordingSurface::default();

        let mut polls = 0;
        frames
            .run(&mut surface, Duration::from_millis(1), |_| {
                polls += 1;
                if polls == 3 {
                    signal.request_stop();
                }
                Ok(FrameInput::default())
            })
            .unwrap();

        assert_eq!(polls, 3);
        assert_eq!(presents(&surface), 2);
    }

    #[test]
    fn loop_ends_when_another_thread_stops_the_signal() {
        let signal = Arc::new(GestureSignal::new());
        let (assets, audio) = (AssetSet::fallback(), Audio::silent());
        let mut frames = frames(&signal, &assets, &audio);
        let mut surface = RecordingSurface::default();

        let stopper = {
            let signal = Arc::clone(&signal);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                signal.request_stop();
            })
        };

        let mut polls = 0;
        frames
            .run(&mut surface, Duration::from_millis(1), |_| {
                polls += 1;
                Ok(FrameInput::default())
            })
            .unwrap();
        stopper.join().unwrap();

        // Every poll but the last produced exactly one presented frame.
        assert!(polls > 1);
        assert_eq!(presents(&surface), polls - 1);
    }

    #[test]
    fn sim_perception_stops_on_request() {
        let signal = Arc::new(GestureSignal::new());
        let mut config = Config::default();
        config.sim.frame_interval_ms = 1;
        let (tx, handle) = spawn_perception(&config, Backend::Sim, Arc::clone(&signal)).unwrap();
        assert!(tx.is_some());
        std::thread::sleep(Duration::from_millis(20));
        assert!(signal.request_stop());
        let stats = handle.join().unwrap();
        assert!(stats.frames > 0);
        assert!(!stats.quit_from_preview);
    }

    #[cfg(not(feature = "webcam"))]
    #[test]
    fn webcam_backend_needs_feature() {
        let signal = Arc::new(GestureSignal::new());
        let err = spawn_perception(&Config::default(), Backend::Webcam, signal).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
