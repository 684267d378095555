//! Hardware backend (feature `webcam`).
//!
//! * [`OpenCvCamera`] reads the default (or configured) camera and mirrors
//!   each frame so the preview behaves like a mirror.
//! * [`OnnxHandDetector`] runs a MediaPipe-style hand landmark model exported
//!   to ONNX: 224×224 RGB NHWC input in [0, 1], 21×3 landmark coordinates in
//!   input pixels plus a hand presence score.
//! * [`OpenCvPreview`] shows the camera with the detected landmarks; ESC on
//!   that window stops the game.

use anyhow::{Context, bail};
use ndarray::Array4;
use opencv::core::{self, Mat, Point, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use tracing::{debug, info, warn};

use super::{CameraSource, Frame, HAND_LANDMARKS, Hand, Landmark, LandmarkDetector, PreviewWindow};
use crate::config::WebcamConfig;
use crate::error::{Error, Result};

const PREVIEW_WINDOW: &str = "Hand Detection - Press ESC to Quit";
const ESC: i32 = 27;

const INPUT_NAME: &str = "input_1";
const LANDMARKS_OUTPUT: &str = "Identity";
const PRESENCE_OUTPUT: &str = "Identity_1";

// ── Camera ──────────────────────────────────────────────────────────────────

pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    raw: Mat,
    mirrored: Mat,
}

impl OpenCvCamera {
    pub fn open(device_index: i32) -> Result<Self> {
        let capture = videoio::VideoCapture::new(device_index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::Camera(opencv::Error::new(
                core::StsError,
                format!("camera {device_index} could not be opened"),
            )));
        }
        info!(device_index, "camera opened");
        Ok(Self {
            capture,
            raw: Mat::default(),
            mirrored: Mat::default(),
        })
    }

    fn grab(&mut self) -> opencv::Result<Option<Frame>> {
        if !self.capture.read(&mut self.raw)? || self.raw.empty() {
            return Ok(None);
        }
        core::flip(&self.raw, &mut self.mirrored, 1)?;
        Ok(Some(Frame {
            width: self.mirrored.cols() as u32,
            height: self.mirrored.rows() as u32,
            pixels: self.mirrored.data_bytes()?.to_vec(),
        }))
    }
}

impl CameraSource for OpenCvCamera {
    fn next_frame(&mut self) -> Option<Frame> {
        self.grab().unwrap_or_else(|e| {
            debug!(error = %e, "camera read failed");
            None
        })
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!(error = %e, "failed to release camera");
        }
    }
}

// ── Detector ────────────────────────────────────────────────────────────────

pub struct OnnxHandDetector {
    session: Session,
    input_size: u32,
    presence_threshold: f32,
}

impl OnnxHandDetector {
    pub fn load(config: &WebcamConfig) -> Result<Self> {
        let session = match open_session(config) {
            Ok(session) => session,
            Err(e) => return Err(Error::Model(format!("{}: {e:#}", config.model.display()))),
        };
        info!(model = %config.model.display(), "hand landmark model loaded");
        Ok(Self {
            session,
            input_size: config.input_size,
            presence_threshold: config.presence_threshold,
        })
    }

    /// Nearest-neighbour resize of the BGR frame into an RGB NHWC tensor.
    fn preprocess(&self, frame: &Frame) -> Array4<f32> {
        let size = self.input_size as usize;
        let mut input = Array4::<f32>::zeros((1, size, size, 3));
        for y in 0..size {
            let sy = (y * frame.height as usize / size) as u32;
            for x in 0..size {
                let sx = (x * frame.width as usize / size) as u32;
                let [b, g, r] = frame.bgr(sx, sy);
                input[[0, y, x, 0]] = r as f32 / 255.0;
                input[[0, y, x, 1]] = g as f32 / 255.0;
                input[[0, y, x, 2]] = b as f32 / 255.0;
            }
        }
        input
    }

    fn infer(&mut self, frame: &Frame) -> anyhow::Result<Option<Hand>> {
        let input_tensor = Tensor::from_array(self.preprocess(frame))?;
        let outputs = self
            .session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .context("Inference failed")?;

        let presence: ndarray::ArrayViewD<f32> = outputs[PRESENCE_OUTPUT]
            .try_extract_array()
            .context("Failed to extract presence score")?;
        let score = presence.iter().next().copied().unwrap_or(0.0);
        if score < self.presence_threshold {
            return Ok(None);
        }

        let coords: ndarray::ArrayViewD<f32> = outputs[LANDMARKS_OUTPUT]
            .try_extract_array()
            .context("Failed to extract landmarks")?;
        let flat: Vec<f32> = coords.iter().copied().collect();
        let expected = HAND_LANDMARKS * 3;
        if flat.len() < expected {
            bail!("expected {expected} landmark values, got {}", flat.len());
        }

        let size = self.input_size as f32;
        let mut landmarks = [Landmark::default(); HAND_LANDMARKS];
        for (i, landmark) in landmarks.iter_mut().enumerate() {
            *landmark = Landmark::new(flat[i * 3] / size, flat[i * 3 + 1] / size);
        }
        Ok(Some(Hand { landmarks }))
    }
}

fn open_session(config: &WebcamConfig) -> anyhow::Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .commit_from_file(&config.model)
        .context("Failed to load ONNX model")?;
    Ok(session)
}

impl LandmarkDetector for OnnxHandDetector {
    fn detect(&mut self, frame: &Frame) -> Vec<Hand> {
        match self.infer(frame) {
            Ok(hand) => hand.into_iter().collect(),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "hand landmark inference failed");
                Vec::new()
            }
        }
    }
}

// ── Preview ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct OpenCvPreview {
    quit: bool,
}

impl OpenCvPreview {
    pub fn new() -> Self {
        Self::default()
    }

    fn render(&mut self, frame: &Frame, hands: &[Hand]) -> opencv::Result<()> {
        let flat = Mat::from_slice(&frame.pixels)?;
        let mut canvas = flat.reshape(3, frame.height as i32)?.try_clone()?;
        for hand in hands.iter().take(1) {
            for landmark in &hand.landmarks {
                let (x, y) = landmark.to_pixel(frame.width, frame.height);
                imgproc::circle(
                    &mut canvas,
                    Point::new(x as i32, y as i32),
                    4,
                    Scalar::new(0.0, 255.0, 0.0, 0.0),
                    imgproc::FILLED,
                    imgproc::LINE_8,
                    0,
                )?;
            }
        }
        highgui::imshow(PREVIEW_WINDOW, &canvas)?;
        if highgui::wait_key(1)? & 0xFF == ESC {
            self.quit = true;
        }
        Ok(())
    }
}

impl PreviewWindow for OpenCvPreview {
    fn show(&mut self, frame: &Frame, hands: &[Hand]) {
        if let Err(e) = self.render(frame, hands) {
            debug!(error = %e, "preview update failed");
        }
    }

    fn quit_requested(&mut self) -> bool {
        self.quit
    }

    fn close(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!(error = %e, "failed to close preview window");
        }
    }
}
