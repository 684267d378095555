//! # flappy_pinch
//!
//! Flappy Bird in the terminal, flapped by pinching thumb and index finger
//! in front of a camera.
//!
//! Two threads share one [`gesture::GestureSignal`]: the perception thread
//! publishes whether the hand is pinched, the render thread reads the latest
//! value once per frame and feeds it to the [`game::PhaseMachine`].
//!
//! ## Phases
//!
//! | Phase | Leaves on | To |
//! |---|---|---|
//! | Intro | `Space` | Countdown |
//! | Countdown | 3 seconds | Playing |
//! | Playing | pipe hit or off screen | Game over |
//! | Game over | `Space` | Playing (no countdown) |
//!
//! While playing, the bird's velocity is set to the jump strength on every
//! frame the pinch is held.
//!
//! ## Feature flags
//!
//! * (default) **Simulation mode**: `Up` / `k` stand in for a pinch.
//! * `webcam`: OpenCV capture and an ONNX hand landmark model.
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | `Space` / `Enter` | Start / restart |
//! | `Up` / `k` | Pinch (simulation mode) |
//! | `q` / `Esc` / `Ctrl-C` | Quit |

pub mod app;
pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod gesture;
pub mod logging;
pub mod render;

pub use app::{Backend, run};
pub use config::Config;
pub use error::{Error, Result};
