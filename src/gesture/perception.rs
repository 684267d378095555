//! The perception thread: camera → landmark detector → pinch classifier →
//! [`GestureSignal`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, trace};

use super::{CameraSource, GestureSignal, LandmarkDetector, PinchClassifier, PreviewWindow};
use crate::error::{Error, Result};

/// Pause after the camera comes back empty, so a dead device doesn't spin a
/// core. Misses are retried forever.
const MISS_BACKOFF: Duration = Duration::from_millis(5);

/// Counters for one perception run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerceptionStats {
    pub frames: u64,
    pub camera_misses: u64,
    pub hand_frames: u64,
    pub pinch_frames: u64,
    /// The preview window asked to quit (as opposed to a stop request from
    /// the render side).
    pub quit_from_preview: bool,
}

pub struct PerceptionLoop<C, D, P> {
    camera: C,
    detector: D,
    preview: P,
    classifier: PinchClassifier,
    signal: Arc<GestureSignal>,
}

impl<C, D, P> PerceptionLoop<C, D, P>
where
    C: CameraSource + 'static,
    D: LandmarkDetector + 'static,
    P: PreviewWindow + 'static,
{
    pub fn new(
        camera: C,
        detector: D,
        preview: P,
        classifier: PinchClassifier,
        signal: Arc<GestureSignal>,
    ) -> Self {
        Self {
            camera,
            detector,
            preview,
            classifier,
            signal,
        }
    }

    /// Run on a dedicated thread.
    pub fn spawn(self) -> Result<JoinHandle<PerceptionStats>> {
        thread::Builder::new()
            .name("perception".into())
            .spawn(move || self.run())
            .map_err(|source| Error::Spawn {
                name: "perception",
                source,
            })
    }

    /// Loop until the signal is stopped or the preview asks to quit, then
    /// release the camera and the preview.
    pub fn run(mut self) -> PerceptionStats {
        info!(
            threshold_px = self.classifier.threshold_px(),
            "perception started"
        );
        let mut stats = PerceptionStats::default();

        while self.signal.is_running() {
            let Some(frame) = self.camera.next_frame() else {
                stats.camera_misses += 1;
                trace!(misses = stats.camera_misses, "camera returned no frame");
                thread::sleep(MISS_BACKOFF);
                continue;
            };
            stats.frames += 1;

            let hands = self.detector.detect(&frame);
            let closed = self.classifier.classify(&hands, frame.width, frame.height);
            self.signal.publish(closed);

            if !hands.is_empty() {
                stats.hand_frames += 1;
            }
            if closed {
                stats.pinch_frames += 1;
            }
            trace!(hands = hands.len(), closed, "frame classified");

            self.preview.show(&frame, &hands);
            if self.preview.quit_requested() {
                debug!("quit requested from preview window");
                stats.quit_from_preview = true;
                self.signal.request_stop();
                break;
            }
        }

        self.camera.release();
        self.preview.close();
        info!(
            frames = stats.frames,
            camera_misses = stats.camera_misses,
            hand_frames = stats.hand_frames,
            pinch_frames = stats.pinch_frames,
            "perception stopped"
        );
        stats
    }
}
