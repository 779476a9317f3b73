//! One frame of the game: sample input, redraw, run gravity.

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use rand_core::RngCore;

use crate::{
    engine::{DropOutcome, GameEngine},
    input::{InputSource, InputSnapshot},
    render::Scene,
    timing::{Clock, FrameClock},
};

/// What happened during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    pub input: InputSnapshot,
    /// Whether the input moved, rotated, restarted or ended the game.
    pub input_applied: bool,
    pub drop: Option<DropOutcome>,
}

/// Drives a [`GameEngine`] from an input source and a clock.
pub struct GameLoop<I, C> {
    input: I,
    clock: C,
    frame_clock: FrameClock,
}

impl<I: InputSource, C: Clock> GameLoop<I, C> {
    pub fn new(input: I, mut clock: C) -> Self {
        let frame_clock = FrameClock::new(&mut clock);
        Self {
            input,
            clock,
            frame_clock,
        }
    }

    /// Run one frame: apply this frame's button presses, draw, then feed
    /// the elapsed time to the drop timer. A game that was lost by this
    /// frame's drop is drawn again so the notification shows immediately.
    pub fn step<R, D>(
        &mut self,
        game: &mut GameEngine<R>,
        scene: &Scene,
        target: &mut D,
    ) -> Result<FrameReport, D::Error>
    where
        R: RngCore,
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        let input = self.input.poll();
        let input_applied = game.handle_input(input);

        scene.draw(target, game)?;

        let elapsed = self.frame_clock.lap(&mut self.clock);
        let drop = game.tick(elapsed);
        if matches!(drop, Some(DropOutcome::Lost { .. })) {
            scene.draw(target, game)?;
        }

        Ok(FrameReport {
            input,
            input_applied,
            drop,
        })
    }
}
