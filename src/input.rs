//! Logical game controls and button polling.

use embedded_hal::digital::InputPin;

/// A control the player can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    /// Give up the current game.
    Forfeit,
}

/// Buttons pressed since the previous poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub rotate: bool,
    pub forfeit: bool,
}

impl InputSnapshot {
    pub const NONE: Self = Self {
        left: false,
        right: false,
        rotate: false,
        forfeit: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// The pressed actions in the order they are applied: forfeit first,
    /// then left, right, rotate.
    pub fn actions(self) -> impl Iterator<Item = Action> {
        [
            (self.forfeit, Action::Forfeit),
            (self.left, Action::MoveLeft),
            (self.right, Action::MoveRight),
            (self.rotate, Action::Rotate),
        ]
        .into_iter()
        .filter_map(|(pressed, action)| pressed.then_some(action))
    }
}

/// Source of button presses, sampled once per frame.
pub trait InputSource {
    fn poll(&mut self) -> InputSnapshot;
}

/// Electrical level that means "pressed".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

/// One physical button with rising-edge detection.
pub struct Button<P> {
    pin: P,
    polarity: Polarity,
    was_down: bool,
}

impl<P: InputPin> Button<P> {
    pub const fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            was_down: false,
        }
    }

    pub const fn active_low(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveLow)
    }

    /// Whether the button is held right now. A pin read error counts as
    /// released.
    pub fn is_down(&mut self) -> bool {
        let level = match self.polarity {
            Polarity::ActiveLow => self.pin.is_low(),
            Polarity::ActiveHigh => self.pin.is_high(),
        };
        level.unwrap_or(false)
    }

    /// `true` only on the poll where the button goes from released to held.
    pub fn just_pressed(&mut self) -> bool {
        let down = self.is_down();
        let pressed = down && !self.was_down;
        self.was_down = down;
        pressed
    }
}

/// The game's buttons, mapped onto logical controls.
///
/// `rotate` and `forfeit` each accept two buttons; either one triggers the
/// action.
pub struct ButtonPanel<P> {
    pub left: Button<P>,
    pub right: Button<P>,
    pub rotate: [Button<P>; 2],
    pub forfeit: [Button<P>; 2],
}

impl<P: InputPin> InputSource for ButtonPanel<P> {
    fn poll(&mut self) -> InputSnapshot {
        // Poll every button so edge state stays current even when a sibling
        // fires.
        let rotate = self.rotate.iter_mut().fold(false, |any, b| b.just_pressed() | any);
        let forfeit = self.forfeit.iter_mut().fold(false, |any, b| b.just_pressed() | any);
        InputSnapshot {
            left: self.left.just_pressed(),
            right: self.right.just_pressed(),
            rotate,
            forfeit,
        }
    }
}
