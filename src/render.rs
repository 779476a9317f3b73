//! Drawing the game with `embedded-graphics`.
//!
//! Works on any [`DrawTarget`] whose colour type converts from [`Rgb888`]
//! (the badge's `Rgb565` ST7789 included).

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text, renderer::TextRenderer},
};
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use rand_core::RngCore;

use crate::{
    bag::random_below,
    court::Court,
    engine::{ActivePiece, GameEngine},
    piece::{PieceKind, Rotation},
};

pub const BACKGROUND_COLOR: Rgb888 = Rgb888::new(13, 17, 23);
pub const TEXT_COLOR: Rgb888 = Rgb888::WHITE;
pub const COURT_COLOR: Rgb888 = Rgb888::new(0, 255, 0);
pub const GRID_COLOR: Rgb888 = Rgb888::new(30, 40, 50);
pub const STAR_COLORS: [Rgb888; 3] = [
    Rgb888::new(0, 120, 255),
    Rgb888::new(100, 255, 100),
    Rgb888::WHITE,
];

/// Seed for the starfield, so it looks the same every boot.
pub const BACKGROUND_SEED: u64 = 42;
pub const STAR_COUNT: usize = 30;
/// Pixel spacing of the background grid.
pub const GRID_SPACING: usize = 10;

/// Court position on screen, in cells.
pub const COURT_OFFSET: Point = Point::new(8, 2);
/// Next-piece preview position on screen, in cells.
pub const PREVIEW_OFFSET: Point = Point::new(1, 6);

/// Screen geometry: the court takes 3/5 of the width and 3/4 of the height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub screen: Size,
    pub cell: Size,
}

impl Layout {
    pub const fn for_screen(screen: Size) -> Self {
        Self {
            screen,
            cell: Size::new(
                screen.width * 3 / 5 / Court::WIDTH as u32,
                screen.height * 3 / 4 / Court::HEIGHT as u32,
            ),
        }
    }

    /// Pixel rectangle of screen cell `(x, y)`.
    pub fn cell_rect(&self, x: i32, y: i32) -> Rectangle {
        Rectangle::new(
            Point::new(x * self.cell.width as i32, y * self.cell.height as i32),
            self.cell,
        )
    }

    /// Pixel rectangle of the court, border included.
    pub fn court_rect(&self) -> Rectangle {
        let top_left = self.cell_rect(COURT_OFFSET.x, COURT_OFFSET.y).top_left;
        Rectangle::new(
            top_left,
            Size::new(
                self.cell.width * Court::WIDTH as u32 + 1,
                self.cell.height * Court::HEIGHT as u32 + 1,
            ),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Star {
    position: Point,
    size: u32,
    color: Rgb888,
}

/// Everything needed to draw a frame: layout plus the fixed starfield.
pub struct Scene {
    layout: Layout,
    stars: [Star; STAR_COUNT],
}

impl Scene {
    pub fn new(screen: Size) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(BACKGROUND_SEED);
        let stars = core::array::from_fn(|_| {
            let x = random_below(&mut rng, screen.width.max(1));
            let y = random_below(&mut rng, screen.height.max(1));
            let color = STAR_COLORS[random_below(&mut rng, STAR_COLORS.len() as u32) as usize];
            let size = 1 + random_below(&mut rng, 2);
            Star {
                position: Point::new(x as i32, y as i32),
                size,
                color,
            }
        });
        Self {
            layout: Layout::for_screen(screen),
            stars,
        }
    }

    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Redraw the whole screen.
    pub fn draw<D, R>(&self, target: &mut D, game: &GameEngine<R>) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
        R: RngCore,
    {
        self.draw_background(target)?;
        self.draw_court(target, game)?;
        self.draw_next(target, game.next_piece())?;
        self.draw_stats(target, game.score(), game.rows())?;
        if let Some(message) = game.notification() {
            self.draw_notification(target, message)?;
        }
        Ok(())
    }

    fn draw_background<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        target.clear(BACKGROUND_COLOR.into())?;

        let Size { width, height } = self.layout.screen;
        let grid = PrimitiveStyle::with_stroke(GRID_COLOR.into(), 1);
        for x in (0..width as i32).step_by(GRID_SPACING) {
            Line::new(Point::new(x, 0), Point::new(x, height as i32))
                .into_styled(grid)
                .draw(target)?;
        }
        for y in (0..height as i32).step_by(GRID_SPACING) {
            Line::new(Point::new(0, y), Point::new(width as i32, y))
                .into_styled(grid)
                .draw(target)?;
        }

        for star in &self.stars {
            Rectangle::new(star.position, Size::new(star.size, star.size))
                .into_styled(PrimitiveStyle::with_fill(star.color.into()))
                .draw(target)?;
        }
        Ok(())
    }

    fn draw_court<D, R>(&self, target: &mut D, game: &GameEngine<R>) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
        R: RngCore,
    {
        if game.is_playing() {
            let piece = game.current();
            self.draw_piece(
                target,
                piece,
                piece.x + COURT_OFFSET.x,
                piece.y + COURT_OFFSET.y,
                piece.rotation,
            )?;
        }

        for (x, y, kind) in game.court().occupied_cells() {
            self.draw_block(target, x + COURT_OFFSET.x, y + COURT_OFFSET.y, kind.color())?;
        }

        let court = self.layout.court_rect();
        let top_left = court.top_left;
        let Some(bottom_right) = court.bottom_right() else {
            return Ok(());
        };
        let top_right = Point::new(bottom_right.x, top_left.y);
        let bottom_left = Point::new(top_left.x, bottom_right.y);
        let border = PrimitiveStyle::with_stroke(COURT_COLOR.into(), 1);
        for (from, to) in [
            (top_left, bottom_left),
            (bottom_left, bottom_right),
            (bottom_right, top_right),
            (top_right, top_left),
        ] {
            Line::new(from, to).into_styled(border).draw(target)?;
        }
        Ok(())
    }

    fn draw_next<D>(&self, target: &mut D, next: &ActivePiece) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        let rotation = match next.kind {
            PieceKind::Z | PieceKind::I | PieceKind::S | PieceKind::T => Rotation::Right,
            _ => Rotation::Up,
        };
        self.draw_piece(target, next, PREVIEW_OFFSET.x, PREVIEW_OFFSET.y, rotation)
    }

    fn draw_stats<D>(&self, target: &mut D, score: u32, rows: u32) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        let x = self.layout.cell.width as i32 / 2;
        let y = self.layout.cell.height as i32 / 2;

        let mut buf = [0u8; 10];
        let big = MonoTextStyle::new(&FONT_10X20, TEXT_COLOR.into());
        Text::with_baseline(format_u32(score, &mut buf), Point::new(x, y), big, Baseline::Top)
            .draw(target)?;

        let small = MonoTextStyle::new(&FONT_6X10, TEXT_COLOR.into());
        let rows_y = y + FONT_10X20.character_size.height as i32 + 2;
        Text::with_baseline(format_u32(rows, &mut buf), Point::new(x, rows_y), small, Baseline::Top)
            .draw(target)?;
        Ok(())
    }

    fn draw_notification<D>(&self, target: &mut D, message: &str) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        let style = MonoTextStyle::new(&FONT_10X20, TEXT_COLOR.into());
        let text_size = style
            .measure_string(message, Point::zero(), Baseline::Top)
            .bounding_box
            .size;
        let position = Point::new(
            (self.layout.screen.width as i32 - text_size.width as i32) / 2,
            (self.layout.screen.height as i32 - text_size.height as i32) / 2,
        );

        Rectangle::new(position, text_size)
            .offset(4)
            .into_styled(PrimitiveStyle::with_fill(BACKGROUND_COLOR.into()))
            .draw(target)?;
        Text::with_baseline(message, position, style, Baseline::Top).draw(target)?;
        Ok(())
    }

    fn draw_piece<D>(
        &self,
        target: &mut D,
        piece: &ActivePiece,
        x: i32,
        y: i32,
        rotation: Rotation,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        let placed = ActivePiece {
            x,
            y,
            rotation,
            ..*piece
        };
        let mut result = Ok(());
        placed.for_each_cell(|cx, cy| {
            if result.is_ok() {
                result = self.draw_block(target, cx, cy, placed.color);
            }
        });
        result
    }

    fn draw_block<D>(&self, target: &mut D, x: i32, y: i32, color: Rgb888) -> Result<(), D::Error>
    where
        D: DrawTarget,
        D::Color: From<Rgb888>,
    {
        self.layout
            .cell_rect(x, y)
            .into_styled(PrimitiveStyle::with_fill(color.into()))
            .draw(target)
    }
}

/// Decimal digits of `n` without an allocator.
fn format_u32(mut n: u32, buf: &mut [u8; 10]) -> &str {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    core::str::from_utf8(&buf[i..]).unwrap_or_default()
}
