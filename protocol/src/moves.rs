//! 走法与落子
//!
//! 客户端不做规则校验，合法性由服务端保证；这里只负责把一步
//! 已知合法的走法连同其附带效果（吃过路兵、王车易位、升变）写到棋盘上。
//! 每条走法消息只能落子一次，重复落子不是幂等的。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ChessError;
use crate::piece::{Piece, PieceKind, Promotion, Side, Square};

/// 走法（显示坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始格子
    pub from: Square,
    /// 目标格子
    pub to: Square,
    /// 升变目标（如果有）
    pub promotion: Option<Promotion>,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建升变走法
    pub fn with_promotion(from: Square, to: Square, promotion: Promotion) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, " ={}", promotion.letter())?;
        }
        Ok(())
    }
}

/// 落子器
pub struct MoveApplier;

impl MoveApplier {
    /// 将走法应用到棋盘（不检查规则）
    pub fn apply(board: &mut Board, mv: &Move) -> Result<(), ChessError> {
        let from = board.canonical(mv.from);
        let to = board.canonical(mv.to);

        let piece = board
            .get_canonical(from)
            .ok_or(ChessError::NullPieceMove { square: mv.from })?;

        // 吃过路兵：被吃的兵在目标格后方一行，必须在覆盖目标格之前移除
        if piece.kind == PieceKind::Pawn && board.en_passant() == Some(to) {
            if let Some(captured) = to.offset(Self::backward(piece.side), 0) {
                board.set_canonical(captured, None);
            }
        }

        board.set_en_passant(None);

        if piece.kind == PieceKind::Pawn && from.col() == to.col() && from.row().abs_diff(to.row()) == 2 {
            let middle = Square::new_unchecked((from.row() + to.row()) / 2, from.col());
            board.set_en_passant(Some(middle));
        }

        if piece.kind == PieceKind::King {
            Self::relocate_castling_rook(board, from, to);
        }

        let placed = match mv.promotion {
            Some(promotion) => Piece::new(promotion.kind(), piece.side),
            None => piece,
        };

        board.set_canonical(to, Some(placed));
        board.set_canonical(from, None);
        Ok(())
    }

    /// 王横移两格时同步移动对应的车
    fn relocate_castling_rook(board: &mut Board, from: Square, to: Square) {
        let (rook_from, rook_to) = match to.col() as i8 - from.col() as i8 {
            2 => (7, 5),
            -2 => (0, 3),
            _ => return,
        };

        let rook_from = Square::new_unchecked(from.row(), rook_from);
        let rook_to = Square::new_unchecked(from.row(), rook_to);
        let rook = board.get_canonical(rook_from);
        board.set_canonical(rook_from, None);
        board.set_canonical(rook_to, rook);
    }

    /// 规范坐标下指向己方后方的行增量（白方向第 0 行前进）
    fn backward(side: Side) -> i8 {
        match side {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}
