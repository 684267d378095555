//! Hand tracking side of the game.
//!
//! The perception thread pulls frames from a [`CameraSource`], hands them to a
//! [`LandmarkDetector`], classifies the first hand with [`PinchClassifier`] and
//! publishes the result into a shared [`GestureSignal`]. The render loop only
//! ever reads the latest value back out.
//!
//! Backends:
//!
//! * [`sim`] (always available): synthetic camera frames and a hand that
//!   pinches while the flap key is held.
//! * `webcam` (feature `webcam`): OpenCV capture/preview and an ONNX hand
//!   landmark model.

pub mod classifier;
pub mod perception;
pub mod signal;
pub mod sim;
#[cfg(feature = "webcam")]
pub mod webcam;

pub use classifier::PinchClassifier;
pub use perception::{PerceptionLoop, PerceptionStats};
pub use signal::GestureSignal;

/// Number of landmarks in one tracked hand.
pub const HAND_LANDMARKS: usize = 21;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// One tracked hand point, normalized to the frame: `(0, 0)` is the top-left
/// corner and `(1, 1)` the bottom-right.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position on the frame's pixel grid.
    pub fn to_pixel(self, width: u32, height: u32) -> (i64, i64) {
        (
            (self.x * width as f32) as i64,
            (self.y * height as f32) as i64,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub landmarks: [Landmark; HAND_LANDMARKS],
}

impl Hand {
    pub fn thumb_tip(&self) -> Landmark {
        self.landmarks[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.landmarks[INDEX_TIP]
    }
}

/// A captured camera image, packed BGR with 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    /// BGR triple at `(x, y)`.
    pub fn bgr(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

/// Source of camera frames.
pub trait CameraSource: Send {
    /// Next frame, or `None` when the device had nothing to give. A `None`
    /// is never fatal; the caller simply asks again.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Release the device. Called once when perception stops.
    fn release(&mut self) {}
}

/// Opaque hand landmark model. An empty result means no hand was found.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Vec<Hand>;
}

/// Debug view owned by the perception thread. It doubles as the quit signal
/// for that thread (the ESC key on the camera window).
pub trait PreviewWindow: Send {
    fn show(&mut self, frame: &Frame, hands: &[Hand]);

    fn quit_requested(&mut self) -> bool;

    fn close(&mut self) {}
}

#[cfg(test)]
pub(crate) fn hand_with_tips(thumb: Landmark, index: Landmark) -> Hand {
    let mut landmarks = [Landmark::new(0.5, 0.5); HAND_LANDMARKS];
    landmarks[THUMB_TIP] = thumb;
    landmarks[INDEX_TIP] = index;
    Hand { landmarks }
}
