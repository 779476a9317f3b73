//! Tetris on the Disobey 2026 badge.
//!
//! Controls:
//! - Left/Right: move piece
//! - A or B: rotate clockwise
//! - Up or Down: give up the current game
//!
//! After "Game Over !" any move or rotate starts a new game. The LED bars
//! dance to Korobeiniki and flash on line clears; the motor buzzes when a
//! piece locks.

#![no_std]
#![no_main]

use defmt::{
    error,
    info,
};
#[allow(clippy::wildcard_imports)]
use disobey2026tetris::*;
use disobey2026tetris::music::{
    KOROBEINIKI,
    MelodyPlayer,
};
use embassy_executor::Spawner;
use embassy_futures::select::{
    Either,
    select,
};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Channel,
};
use embassy_time::{
    Duration,
    Instant,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use palette::Srgb;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::SeedableRng,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

/// ~30 fps.
const FRAME: Duration = Duration::from_millis(33);
/// How often the music visualiser advances.
const MUSIC_TICK: Duration = Duration::from_millis(10);

// ── Events ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, defmt::Format)]
enum LedEvent {
    RowsCleared(u8),
    GameOver,
}

static LED_CHANNEL: Channel<CriticalSectionRawMutex, LedEvent, 4> = Channel::new();

#[derive(Clone, Copy, defmt::Format)]
enum VibraEvent {
    Locked(u8),
    GameOver,
}

static VIBRA_CHANNEL: Channel<CriticalSectionRawMutex, VibraEvent, 4> = Channel::new();

/// Forward what happened this frame to the LED and vibration tasks. Full
/// channels drop the event rather than stall the game.
fn announce(report: &FrameReport, lost_this_frame: bool) {
    if let Some(DropOutcome::Locked { rows } | DropOutcome::Lost { rows }) = report.drop {
        VIBRA_CHANNEL.try_send(VibraEvent::Locked(rows)).ok();
        if rows > 0 {
            LED_CHANNEL.try_send(LedEvent::RowsCleared(rows)).ok();
        }
    }
    if lost_this_frame {
        LED_CHANNEL.try_send(LedEvent::GameOver).ok();
        VIBRA_CHANNEL.try_send(VibraEvent::GameOver).ok();
    }
}

// ── Tasks ───────────────────────────────────────────────────────────────────

#[embassy_executor::task]
async fn game_task(
    display: &'static mut Display<'static>,
    backlight: &'static mut Backlight,
    buttons: Buttons,
    seed: u64,
) {
    let mut game = GameEngine::new(GameConfig::default(), ChaCha8Rng::seed_from_u64(seed));
    let scene = Scene::new(SCREEN_SIZE);
    let mut game_loop = GameLoop::new(buttons.into_panel(), BadgeClock);
    info!("Tetris game started");

    let mut first_frame = true;
    loop {
        let frame_start = Instant::now();
        let was_lost = game.is_lost();

        match game_loop.step(&mut game, &scene, &mut *display) {
            Ok(report) => {
                if report.input.forfeit {
                    info!("forfeit");
                }
                announce(&report, game.is_lost() && !was_lost);
            }
            Err(_) => error!("display write failed, skipping frame"),
        }

        if first_frame {
            backlight.on();
            first_frame = false;
        }

        Timer::at(frame_start + FRAME).await;
    }
}

#[embassy_executor::task]
async fn led_task(leds: &'static mut Leds<'static>) {
    info!("Tetris LED task started");
    let mut player = MelodyPlayer::new(KOROBEINIKI, true);
    player.start(leds);
    let mut last = Instant::now();

    loop {
        match select(LED_CHANNEL.receive(), Timer::after(MUSIC_TICK)).await {
            Either::First(LedEvent::RowsCleared(rows)) => {
                let color = match rows {
                    4 => Srgb::new(40u8, 40, 40),
                    3 => Srgb::new(0, 30, 30),
                    2 => Srgb::new(0, 20, 0),
                    _ => Srgb::new(0, 0, 15),
                };
                for level in (0..=5u16).rev() {
                    leds.fill(Srgb::new(
                        (u16::from(color.red) * level / 5) as u8,
                        (u16::from(color.green) * level / 5) as u8,
                        (u16::from(color.blue) * level / 5) as u8,
                    ));
                    leds.update().await;
                    Timer::after(Duration::from_millis(30)).await;
                }
            }
            Either::First(LedEvent::GameOver) => {
                for _ in 0..4 {
                    leds.fill(Srgb::new(20, 0, 0));
                    leds.update().await;
                    Timer::after(Duration::from_millis(250)).await;
                    leds.clear();
                    leds.update().await;
                    Timer::after(Duration::from_millis(250)).await;
                }
                player.start(leds);
                last = Instant::now();
            }
            Either::Second(()) => {
                let now = Instant::now();
                let elapsed = TickDuration::from_ticks((now - last).as_millis() as u32);
                last = now;
                player.advance(elapsed, leds);
                leds.update().await;
            }
        }
    }
}

#[embassy_executor::task]
async fn vibra_task(vibra: &'static mut Vibration) {
    info!("Tetris vibration task started");
    loop {
        match VIBRA_CHANNEL.receive().await {
            VibraEvent::Locked(4) => vibra.pulses(2, Duration::from_millis(60)).await,
            VibraEvent::Locked(0) => vibra.pulse(Duration::from_millis(20)).await,
            VibraEvent::Locked(_) => vibra.pulse(Duration::from_millis(40)).await,
            VibraEvent::GameOver => vibra.pulse(Duration::from_millis(300)).await,
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = disobey2026tetris::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let seed = hardware_seed();
    info!("piece seed {=u64:x}", seed);

    let display = mk_static!(Display<'static>, resources.display.into());
    let backlight = mk_static!(Backlight, resources.backlight.into());
    let leds = mk_static!(Leds<'static>, resources.leds.into());
    let vibra = mk_static!(Vibration, resources.vibra.into());
    let buttons: Buttons = resources.buttons.into();

    spawner.must_spawn(led_task(leds));
    spawner.must_spawn(vibra_task(vibra));
    spawner.must_spawn(game_task(display, backlight, buttons, seed));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
