//! The seven tetromino definitions and the bit-packed shape walker.
//!
//! Every rotation of a piece is a 16-bit mask over a 4×4 block. Bit 15 is
//! row 0 / column 0 (top left) and bit 0 is row 3 / column 3, e.g. the
//! upright J piece is `0x44C0`:
//!
//! ```text
//! 0100 = 0x4000
//! 0100 = 0x0400
//! 1100 = 0x00C0
//! 0000 = 0x0000
//! ```

use embedded_graphics::pixelcolor::Rgb888;

/// Orientation of a piece; cycles clockwise Up → Right → Down → Left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Rotation {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Rotation {
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// The next orientation clockwise.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Immutable definition of a tetromino.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceType {
    /// Width and height of the bounding box, 2..=4.
    pub size: i32,
    /// One 4×4 occupancy mask per [`Rotation`].
    pub blocks: [u16; 4],
    pub color: Rgb888,
}

impl PieceType {
    pub const fn mask(&self, rotation: Rotation) -> u16 {
        self.blocks[rotation.index()]
    }
}

pub const I_PIECE: PieceType = PieceType {
    size: 4,
    blocks: [0x0F00, 0x2222, 0x00F0, 0x4444],
    color: Rgb888::new(0, 255, 255),
};
pub const J_PIECE: PieceType = PieceType {
    size: 3,
    blocks: [0x44C0, 0x8E00, 0x6440, 0x0E20],
    color: Rgb888::new(0, 0, 255),
};
pub const L_PIECE: PieceType = PieceType {
    size: 3,
    blocks: [0x4460, 0x0E80, 0xC440, 0x2E00],
    color: Rgb888::new(255, 165, 0),
};
pub const O_PIECE: PieceType = PieceType {
    size: 2,
    blocks: [0xCC00, 0xCC00, 0xCC00, 0xCC00],
    color: Rgb888::new(255, 255, 0),
};
pub const S_PIECE: PieceType = PieceType {
    size: 3,
    blocks: [0x06C0, 0x8C40, 0x6C00, 0x4620],
    color: Rgb888::new(0, 255, 0),
};
pub const T_PIECE: PieceType = PieceType {
    size: 3,
    blocks: [0x0E40, 0x4C40, 0x4E00, 0x4640],
    color: Rgb888::new(128, 0, 128),
};
pub const Z_PIECE: PieceType = PieceType {
    size: 3,
    blocks: [0x0C60, 0x4C80, 0xC600, 0x2640],
    color: Rgb888::new(255, 0, 0),
};

/// Handle to one of the seven [`PieceType`]s. This is what the court stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    pub const fn piece_type(self) -> &'static PieceType {
        match self {
            Self::I => &I_PIECE,
            Self::J => &J_PIECE,
            Self::L => &L_PIECE,
            Self::O => &O_PIECE,
            Self::S => &S_PIECE,
            Self::T => &T_PIECE,
            Self::Z => &Z_PIECE,
        }
    }

    pub const fn size(self) -> i32 {
        self.piece_type().size
    }

    pub const fn color(self) -> Rgb888 {
        self.piece_type().color
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Call `visit(x + col, y + row)` for every set bit of the piece's mask,
/// scanning rows top to bottom and columns left to right.
///
/// All piece geometry (collision, locking, drawing) goes through here.
pub fn for_each_occupied_cell(
    kind: PieceKind,
    x: i32,
    y: i32,
    rotation: Rotation,
    mut visit: impl FnMut(i32, i32),
) {
    let blocks = kind.piece_type().mask(rotation);
    let mut bit: u16 = 0x8000;
    let mut row = 0;
    let mut col = 0;
    while bit > 0 {
        if blocks & bit != 0 {
            visit(x + col, y + row);
        }
        bit >>= 1;
        col += 1;
        if col == 4 {
            col = 0;
            row += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(kind: PieceKind, rotation: Rotation) -> std::vec::Vec<(i32, i32)> {
        let mut out = std::vec::Vec::new();
        for_each_occupied_cell(kind, 0, 0, rotation, |x, y| out.push((x, y)));
        out
    }

    #[test]
    fn every_rotation_visits_its_population() {
        for kind in PieceKind::ALL {
            for rotation in Rotation::ALL {
                let mask = kind.piece_type().mask(rotation);
                let visited = cells(kind, rotation);
                assert_eq!(visited.len(), mask.count_ones() as usize);
                assert_eq!(visited.len(), 4, "{kind:?} {rotation:?}");
            }
        }
    }

    #[test]
    fn cells_stay_inside_bounding_box() {
        for kind in PieceKind::ALL {
            for rotation in Rotation::ALL {
                for (x, y) in cells(kind, rotation) {
                    assert!((0..4).contains(&x) && (0..4).contains(&y));
                }
            }
        }
        // Upright pieces fit their declared size.
        for kind in PieceKind::ALL {
            for (x, y) in cells(kind, Rotation::Up) {
                assert!(x < kind.size() && y < kind.size(), "{kind:?}");
            }
        }
    }

    #[test]
    fn j_piece_bit_order_is_msb_first() {
        assert_eq!(cells(PieceKind::J, Rotation::Up), [(1, 0), (1, 1), (0, 2), (1, 2)]);
        assert_eq!(cells(PieceKind::I, Rotation::Right), [(2, 0), (2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn visitor_offsets_by_origin() {
        let mut out = std::vec::Vec::new();
        for_each_occupied_cell(PieceKind::O, 5, -1, Rotation::Left, |x, y| out.push((x, y)));
        assert_eq!(out, [(5, -1), (6, -1), (5, 0), (6, 0)]);
    }

    #[test]
    fn rotation_cycles_clockwise() {
        assert_eq!(Rotation::Up.next(), Rotation::Right);
        assert_eq!(Rotation::Right.next(), Rotation::Down);
        assert_eq!(Rotation::Down.next(), Rotation::Left);
        assert_eq!(Rotation::Left.next(), Rotation::Up);
    }
}
