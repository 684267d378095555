//! Simulation backend: no camera, no model.
//!
//! [`SyntheticCamera`] produces blank frames at a webcam-like rate and
//! [`KeyboardHand`] reports a hand whose thumb and index tips touch while the
//! flap key is held. Key presses arrive as [`SimInput`] over a channel from
//! the render thread, which owns the terminal. Everything downstream (the
//! classifier, the signal, the render loop) runs exactly as with hardware.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use super::{CameraSource, Frame, Hand, Landmark, LandmarkDetector, PreviewWindow};
use super::{HAND_LANDMARKS, INDEX_TIP, THUMB_TIP};
use crate::config::SimConfig;

/// Raw input forwarded from the game window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// Flap key pressed (or auto-repeated while held).
    Pinch,
}

pub fn channel() -> (Sender<SimInput>, Receiver<SimInput>) {
    mpsc::channel()
}

// ── Camera ──────────────────────────────────────────────────────────────────

pub struct SyntheticCamera {
    width: u32,
    height: u32,
    interval: Duration,
    next_at: Option<Instant>,
}

impl SyntheticCamera {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            width: config.frame_width,
            height: config.frame_height,
            interval: Duration::from_millis(config.frame_interval_ms),
            next_at: None,
        }
    }
}

impl CameraSource for SyntheticCamera {
    fn next_frame(&mut self) -> Option<Frame> {
        let now = Instant::now();
        let due = self.next_at.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        self.next_at = Some(due.max(now) + self.interval);
        Some(Frame::blank(self.width, self.height))
    }
}

// ── Detector ────────────────────────────────────────────────────────────────

/// Thumb/index tip positions for the relaxed and pinched poses.
const OPEN_THUMB: Landmark = Landmark::new(0.40, 0.55);
const OPEN_INDEX: Landmark = Landmark::new(0.55, 0.35);
const PINCH_POINT: Landmark = Landmark::new(0.48, 0.45);

pub struct KeyboardHand {
    rx: Receiver<SimInput>,
    hold: Duration,
    pinched_until: Option<Instant>,
    connected: bool,
}

impl KeyboardHand {
    pub fn new(rx: Receiver<SimInput>, config: &SimConfig) -> Self {
        Self {
            rx,
            hold: Duration::from_millis(config.pinch_hold_ms),
            pinched_until: None,
            connected: true,
        }
    }

    fn drain(&mut self, now: Instant) {
        while self.connected {
            match self.rx.try_recv() {
                Ok(SimInput::Pinch) => self.pinched_until = Some(now + self.hold),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.connected = false,
            }
        }
    }

    pub fn is_pinched(&mut self, now: Instant) -> bool {
        self.drain(now);
        self.pinched_until.is_some_and(|until| now < until)
    }

    fn hand(pinched: bool) -> Hand {
        let mut landmarks = [Landmark::new(0.5, 0.6); HAND_LANDMARKS];
        if pinched {
            landmarks[THUMB_TIP] = PINCH_POINT;
            landmarks[INDEX_TIP] = PINCH_POINT;
        } else {
            landmarks[THUMB_TIP] = OPEN_THUMB;
            landmarks[INDEX_TIP] = OPEN_INDEX;
        }
        Hand { landmarks }
    }
}

impl LandmarkDetector for KeyboardHand {
    fn detect(&mut self, _frame: &Frame) -> Vec<Hand> {
        let pinched = self.is_pinched(Instant::now());
        vec![Self::hand(pinched)]
    }
}

// ── Preview ─────────────────────────────────────────────────────────────────

/// No window; quitting is left to the render thread.
#[derive(Debug, Default)]
pub struct HeadlessPreview;

impl PreviewWindow for HeadlessPreview {
    fn show(&mut self, _frame: &Frame, _hands: &[Hand]) {}

    fn quit_requested(&mut self) -> bool {
        false
    }
}
