//! The six buttons the game reads: D-pad, A and B.
//!
//! All of them are wired active low with the internal pull-up enabled.

use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    ButtonResources,
    input::{
        Button,
        ButtonPanel,
    },
};

pub struct Buttons {
    pub up: Input<'static>,
    pub down: Input<'static>,
    pub left: Input<'static>,
    pub right: Input<'static>,
    pub a: Input<'static>,
    pub b: Input<'static>,
}

impl From<ButtonResources<'static>> for Buttons {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            up: Input::new(res.up, pull_up),
            down: Input::new(res.down, pull_up),
            left: Input::new(res.left, pull_up),
            right: Input::new(res.right, pull_up),
            a: Input::new(res.a, pull_up),
            b: Input::new(res.b, pull_up),
        }
    }
}

impl Buttons {
    /// Map the buttons to game controls: left/right move, A or B rotates,
    /// up or down forfeits the game.
    pub fn into_panel(self) -> ButtonPanel<Input<'static>> {
        ButtonPanel {
            left: Button::active_low(self.left),
            right: Button::active_low(self.right),
            rotate: [Button::active_low(self.a), Button::active_low(self.b)],
            forfeit: [Button::active_low(self.up), Button::active_low(self.down)],
        }
    }
}
