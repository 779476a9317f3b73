//! Vibration motor, buzzed when pieces lock and rows clear.

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::{
    Level,
    Output,
    OutputConfig,
};

use crate::VibrationResources;

pub struct Vibration {
    pin: Output<'static>,
}

impl From<VibrationResources<'static>> for Vibration {
    fn from(res: VibrationResources<'static>) -> Self {
        Self {
            pin: Output::new(res.motor, Level::Low, OutputConfig::default()),
        }
    }
}

impl Vibration {
    /// Buzz for `duration`, then stop.
    pub async fn pulse(&mut self, duration: Duration) {
        self.pin.set_high();
        Timer::after(duration).await;
        self.pin.set_low();
    }

    /// `count` pulses of `duration` separated by equal pauses.
    pub async fn pulses(&mut self, count: u8, duration: Duration) {
        for i in 0..count {
            if i > 0 {
                Timer::after(duration).await;
            }
            self.pulse(duration).await;
        }
    }
}
