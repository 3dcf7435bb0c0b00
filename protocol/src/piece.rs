//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, side: Side) -> char {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'r' => PieceKind::Rook,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some((kind, side))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 白方（先手）
    White,
    /// 黑方（后手）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// 握手阶段使用的阵营代码
    pub fn code(&self) -> &'static str {
        match self {
            Side::White => crate::constants::CODE_WHITE,
            Side::Black => crate::constants::CODE_BLACK,
        }
    }

    /// 从阵营代码解析
    pub fn from_code(code: &str) -> Option<Side> {
        match code {
            crate::constants::CODE_WHITE => Some(Side::White),
            crate::constants::CODE_BLACK => Some(Side::Black),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    /// 创建新棋子
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.side)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceKind::from_fen_char(c).map(|(kind, side)| Piece { kind, side })
    }

    /// 棋盘上显示的符号
    pub fn symbol(&self) -> char {
        match (self.kind, self.side) {
            (PieceKind::King, Side::White) => '♔',
            (PieceKind::Queen, Side::White) => '♕',
            (PieceKind::Rook, Side::White) => '♖',
            (PieceKind::Bishop, Side::White) => '♗',
            (PieceKind::Knight, Side::White) => '♘',
            (PieceKind::Pawn, Side::White) => '♙',
            (PieceKind::King, Side::Black) => '♚',
            (PieceKind::Queen, Side::Black) => '♛',
            (PieceKind::Rook, Side::Black) => '♜',
            (PieceKind::Bishop, Side::Black) => '♝',
            (PieceKind::Knight, Side::Black) => '♞',
            (PieceKind::Pawn, Side::Black) => '♟',
        }
    }
}

/// 升变目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Promotion {
    Queen,
    Knight,
    Rook,
    Bishop,
}

impl Promotion {
    /// 升变后的棋子类型
    pub fn kind(&self) -> PieceKind {
        match self {
            Promotion::Queen => PieceKind::Queen,
            Promotion::Knight => PieceKind::Knight,
            Promotion::Rook => PieceKind::Rook,
            Promotion::Bishop => PieceKind::Bishop,
        }
    }

    /// 走法串中的升变字母
    pub fn letter(&self) -> char {
        match self {
            Promotion::Queen => 'Q',
            Promotion::Knight => 'N',
            Promotion::Rook => 'R',
            Promotion::Bishop => 'B',
        }
    }

    /// 从升变字母解析（只接受 Q/N/R/B）
    pub fn from_letter(c: char) -> Option<Promotion> {
        match c {
            'Q' => Some(Promotion::Queen),
            'N' => Some(Promotion::Knight),
            'R' => Some(Promotion::Rook),
            'B' => Some(Promotion::Bishop),
            _ => None,
        }
    }
}

/// 棋盘格子
///
/// 既可表示显示坐标（相对本地玩家），也可表示棋盘内部的规范坐标，
/// 具体含义由使用它的接口决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSquare")]
pub struct Square {
    /// 行 (0-7)
    row: u8,
    /// 列 (0-7)
    col: u8,
}

#[derive(Deserialize)]
struct RawSquare {
    row: u8,
    col: u8,
}

impl TryFrom<RawSquare> for Square {
    type Error = String;

    fn try_from(raw: RawSquare) -> Result<Self, Self::Error> {
        Square::new(raw.row, raw.col)
            .ok_or_else(|| format!("Square ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl Square {
    /// 创建新格子
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 用已知在棋盘内的坐标创建格子，越界时 panic
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        assert!(
            (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE,
            "square out of range"
        );
        Self { row, col }
    }

    pub const fn row(&self) -> u8 {
        self.row
    }

    pub const fn col(&self) -> u8 {
        self.col
    }

    /// 获取偏移后的格子
    pub fn offset(&self, drow: i8, dcol: i8) -> Option<Square> {
        let row = self.row as i8 + drow;
        let col = self.col as i8 + dcol;
        if row < 0 || col < 0 {
            return None;
        }
        Square::new(row as u8, col as u8)
    }

    /// 所有格子，按行优先
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Square::new_unchecked(row, col)))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
