//! # disobey2026tetris
//!
//! Tetris for the Disobey 2026 badge.
//!
//! The game itself is hardware independent and builds for any target:
//! - **[`engine`]**: court, pieces, collision, line clears, scoring, lost state
//! - **[`render`]**: draws a frame on any `embedded-graphics` [`DrawTarget`]
//! - **[`game_loop`]**: per-frame input → redraw → gravity driver
//! - **[`input`]**: logical controls polled from `embedded-hal` input pins
//! - **[`music`]**: Korobeiniki and a non-blocking tone sequencer
//!
//! With the `badge` feature the crate also brings up the badge hardware
//! (display, buttons, backlight, LEDs, vibration motor) and builds the
//! `tetris` firmware binary.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let mut game = GameEngine::new(GameConfig::default(), ChaCha8Rng::seed_from_u64(seed));
//! let scene = Scene::new(display.bounding_box().size);
//! let mut game_loop = GameLoop::new(buttons, clock);
//! loop {
//!     game_loop.step(&mut game, &scene, &mut display)?;
//! }
//! ```
//!
//! [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod bag;
pub mod court;
pub mod engine;
pub mod game_loop;
pub mod input;
pub mod music;
pub mod piece;
pub mod render;
pub mod timing;

#[cfg(feature = "badge")]
mod badge;

#[cfg(feature = "badge")]
pub use badge::*;
pub use court::{COURT_HEIGHT, COURT_WIDTH, Court};
pub use engine::{ActivePiece, Direction, DropOutcome, GameConfig, GameEngine};
pub use game_loop::{FrameReport, GameLoop};
pub use input::{Action, InputSnapshot, InputSource};
pub use piece::{PieceKind, Rotation};
pub use render::Scene;
pub use timing::{Clock, SpeedCurve, TickDuration, TickInstant};
