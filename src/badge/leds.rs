//! WS2812 LED bars, used as a music visualiser and for game event flashes.
//!
//! The badge has 10 RGB LEDs arranged in a strip.

extern crate alloc;

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::Level,
    rmt::{
        PulseCode,
        Tx,
    },
};
use palette::Srgb;

use crate::music::ToneOutput;

/// Number of WS2812 LEDs on the badge.
/// There are two led bars with 5 leds each. Left and right. Indexing is counter clockwise starting from the bottom right.
/// Index 0 is bottom right. Index 4 is top right. Index 5 is top left. Index 9 is bottom left.
pub const LED_COUNT: usize = 10;

/// Number of LEDs per bar (left or right).
pub const BAR_COUNT: usize = 5;

/// WS2812 LED strip driver.
///
/// Maintains an in-memory framebuffer that is flushed to hardware
/// with [`update`](Leds::update).
pub struct Leds<'a> {
    channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
    framebuffer: [Srgb<u8>; LED_COUNT],
}

impl<'a> Leds<'a> {
    pub const fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [Srgb::new(0, 0, 0); LED_COUNT],
        }
    }

    /// Flush the framebuffer to the physical LEDs.
    pub async fn update(&mut self) {
        let Some(channel) = self.channel.take() else {
            error!("RMT channel lost during previous transmission");
            return;
        };

        let pulses = self
            .framebuffer
            .iter()
            .flat_map(|color| {
                let c: palette::rgb::Rgb<palette::encoding::Srgb, u8> = color.into_format::<u8>();
                // WS2812 expects GRB byte order
                [
                    Self::byte_to_pulses(c.green),
                    Self::byte_to_pulses(c.red),
                    Self::byte_to_pulses(c.blue),
                ]
                .into_iter()
                .flatten()
            })
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(e) => {
                error!("RMT transmit failed: {}", e);
                return;
            }
        };

        self.channel = Some(match transaction.wait() {
            Ok(ch) => ch,
            Err((err, ch)) => {
                error!("RMT transaction failed: {}", err);
                ch
            }
        });

        // WS2812 reset time
        Timer::after(Duration::from_micros(50)).await;
    }

    /// Fill all LEDs with one colour.
    pub fn fill(&mut self, color: Srgb<u8>) {
        self.framebuffer.fill(color);
    }

    /// Turn all LEDs off.
    pub fn clear(&mut self) {
        self.fill(Srgb::new(0, 0, 0));
    }

    /// Set the right LED bar (5 LEDs).
    ///
    /// Colors are ordered bottom-to-top: index 0 is the bottom LED,
    /// index 4 is the top LED. This matches the visual ordering of
    /// [`set_left_bar`], so passing the same array to both produces
    /// a symmetrical display.
    fn set_right_bar(&mut self, colors: &[Srgb<u8>; BAR_COUNT]) {
        // Right bar: hardware indices 0 (bottom) .. 4 (top) — already bottom-to-top.
        self.framebuffer[..BAR_COUNT].copy_from_slice(colors);
    }

    /// Set the left LED bar (5 LEDs).
    ///
    /// Colors are ordered bottom-to-top: index 0 is the bottom LED,
    /// index 4 is the top LED. Hardware indices 5–9 run top-to-bottom,
    /// so the slice is reversed internally.
    fn set_left_bar(&mut self, colors: &[Srgb<u8>; BAR_COUNT]) {
        // Left bar: hardware index 5 = top, 9 = bottom.
        // Reverse so that colors[0] = bottom, colors[4] = top.
        for i in 0..BAR_COUNT {
            self.framebuffer[BAR_COUNT + i] = colors[BAR_COUNT - 1 - i];
        }
    }

    /// Set both LED bars to the same colors.
    ///
    /// Convenience wrapper — equivalent to calling [`set_left_bar`] and
    /// [`set_right_bar`] with the same array.
    pub fn set_both_bars(&mut self, colors: &[Srgb<u8>; BAR_COUNT]) {
        self.set_right_bar(colors);
        self.set_left_bar(colors);
    }

    /// Light both bars up to `level` LEDs (0 to [`BAR_COUNT`]), green at the
    /// bottom shading to red at the top.
    pub fn set_level(&mut self, level: usize) {
        let mut bar = [Srgb::new(0u8, 0, 0); BAR_COUNT];
        for (i, led) in bar.iter_mut().enumerate().take(level.min(BAR_COUNT)) {
            let step = (i * 30 / (BAR_COUNT - 1)) as u8;
            *led = Srgb::new(step, 30 - step, 4);
        }
        self.set_both_bars(&bar);
    }

    // ── Internal helpers ────────────────────────────────────────────────

    /// WS2812 bit timing at 40 MHz RMT clock.
    const fn bit_to_pulse(bit: bool) -> PulseCode {
        if bit {
            // '1': 0.8 µs high (32 ticks), 0.45 µs low (18 ticks)
            PulseCode::new(Level::High, 32, Level::Low, 18)
        } else {
            // '0': 0.4 µs high (16 ticks), 0.85 µs low (34 ticks)
            PulseCode::new(Level::High, 16, Level::Low, 34)
        }
    }

    fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
        let mut pulses = [PulseCode::default(); 8];
        for (i, pulse) in pulses.iter_mut().enumerate() {
            *pulse = Self::bit_to_pulse((byte >> (7 - i)) & 1 != 0);
        }
        pulses
    }
}

/// Lowest and highest pitch the visualiser distinguishes, in Hz.
const VISUAL_RANGE: (u16, u16) = (400, 900);

/// Bar height for a pitch: at least one LED for any audible note.
fn tone_level(frequency: u16) -> usize {
    let (low, high) = VISUAL_RANGE;
    let clamped = frequency.clamp(low, high);
    1 + usize::from(clamped - low) * (BAR_COUNT - 1) / usize::from(high - low)
}

/// The bars follow the melody: each note lights a column as high as its
/// pitch, rests go dark. Call [`Leds::update`] to show the change.
impl ToneOutput for Leds<'_> {
    fn start_tone(&mut self, frequency: u16) {
        self.set_level(tone_level(frequency));
    }

    fn stop_tone(&mut self) {
        self.clear();
    }
}
