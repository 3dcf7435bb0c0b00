//! 棋盘状态
//!
//! 棋盘内部始终以规范方向存储：第 0 行是第 8 横线，白方底线在第 6、7 行。
//! 对外的 `get` / `set` / `clear` 接收显示坐标（相对本地玩家），
//! 由 [`Board::canonical`] 统一完成行翻转。

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::piece::{Piece, Side, Square};

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 8x8 棋盘，规范方向
    grid: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
    /// 本地视角：白方视角时显示坐标与规范坐标一致
    perspective: Side,
    /// 过路兵目标格（规范坐标），只对下一步有效
    en_passant: Option<Square>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty(perspective: Side) -> Self {
        Self {
            grid: [[None; BOARD_SIZE]; BOARD_SIZE],
            perspective,
            en_passant: None,
        }
    }

    /// 由规范方向的 8 行创建棋盘
    pub(crate) fn from_ranks(grid: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE], perspective: Side) -> Self {
        Self {
            grid,
            perspective,
            en_passant: None,
        }
    }

    /// 本地视角
    pub fn perspective(&self) -> Side {
        self.perspective
    }

    /// 显示坐标转换为规范坐标（行翻转是对合的，反向转换同样适用）
    pub fn canonical(&self, square: Square) -> Square {
        match self.perspective {
            Side::White => square,
            Side::Black => Square::new_unchecked(7 - square.row(), square.col()),
        }
    }

    /// 获取指定显示坐标的棋子
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.get_canonical(self.canonical(square))
    }

    /// 在指定显示坐标放置棋子
    pub fn set(&mut self, square: Square, piece: Piece) {
        let square = self.canonical(square);
        self.set_canonical(square, Some(piece));
    }

    /// 清空指定显示坐标
    pub fn clear(&mut self, square: Square) {
        let square = self.canonical(square);
        self.set_canonical(square, None);
    }

    pub(crate) fn get_canonical(&self, square: Square) -> Option<Piece> {
        self.grid[square.row() as usize][square.col() as usize]
    }

    pub(crate) fn set_canonical(&mut self, square: Square, piece: Option<Piece>) {
        self.grid[square.row() as usize][square.col() as usize] = piece;
    }

    /// 过路兵目标格（规范坐标）
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub(crate) fn set_en_passant(&mut self, square: Option<Square>) {
        self.en_passant = square;
    }

    /// 按显示坐标遍历所有棋子（行优先，从本地玩家视角的最上方开始）
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|piece| (sq, piece)))
    }

    /// 规范方向的第 `row` 行
    pub(crate) fn rank(&self, row: usize) -> &[Option<Piece>; BOARD_SIZE] {
        &self.grid[row]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceKind;

    #[test]
    fn test_white_perspective_is_identity() {
        let mut board = Board::empty(Side::White);
        let sq = Square::new_unchecked(6, 4);
        board.set(sq, Piece::new(PieceKind::Pawn, Side::White));

        assert_eq!(board.canonical(sq), sq);
        assert_eq!(
            board.get_canonical(sq),
            Some(Piece::new(PieceKind::Pawn, Side::White))
        );
    }

    #[test]
    fn test_black_perspective_flips_rows() {
        let mut board = Board::empty(Side::Black);
        let display = Square::new_unchecked(1, 3);
        board.set(display, Piece::new(PieceKind::Pawn, Side::Black));

        assert_eq!(board.canonical(display), Square::new_unchecked(6, 3));
        assert_eq!(board.get(display), Some(Piece::new(PieceKind::Pawn, Side::Black)));
        assert_eq!(
            board.get_canonical(Square::new_unchecked(6, 3)),
            Some(Piece::new(PieceKind::Pawn, Side::Black))
        );
        assert_eq!(board.get_canonical(display), None);

        board.clear(display);
        assert_eq!(board.get(display), None);
    }

    #[test]
    fn test_canonical_is_involution() {
        let board = Board::empty(Side::Black);
        for sq in Square::all() {
            assert_eq!(board.canonical(board.canonical(sq)), sq);
        }
    }

    #[test]
    fn test_pieces_iteration() {
        let mut board = Board::empty(Side::White);
        board.set(Square::new_unchecked(0, 4), Piece::new(PieceKind::King, Side::Black));
        board.set(Square::new_unchecked(7, 4), Piece::new(PieceKind::King, Side::White));

        let pieces: Vec<_> = board.pieces().collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].0, Square::new_unchecked(0, 4));
        assert_eq!(pieces[1].1, Piece::new(PieceKind::King, Side::White));
    }
}
