//! 布局串解析和生成
//!
//! 布局串即 FEN 的棋盘部分：从第 8 横线到第 1 横线逐行描述，
//! 字母表示棋子（白方大写），数字表示连续空格，`/` 分隔各行，
//! 空格（或串尾）结束棋盘部分，其后的走子方、易位权等字段被忽略。
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::error::ChessError;
use crate::piece::{Piece, Side};

/// 标准初始局面
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 布局串处理
pub struct Fen;

impl Fen {
    /// 解析布局串为棋盘
    pub fn parse_placement(placement: &str, perspective: Side) -> Result<Board, ChessError> {
        let mut grid = [[None; BOARD_SIZE]; BOARD_SIZE];
        let mut ranks = 0usize;
        let mut rank: Vec<Option<Piece>> = Vec::with_capacity(BOARD_SIZE);

        let mut chars = placement.chars();
        loop {
            let c = chars.next();
            match c {
                Some(d @ '0'..='9') => {
                    let empty = d.to_digit(10).unwrap_or(0) as usize;
                    rank.extend(std::iter::repeat(None).take(empty));
                }
                Some('/') | Some(' ') | None => {
                    Self::close_rank(&mut grid, &mut ranks, &mut rank)?;
                    if c != Some('/') {
                        break;
                    }
                }
                Some(other) => match Piece::from_fen_char(other) {
                    Some(piece) => rank.push(Some(piece)),
                    None => return Err(ChessError::UnrecognizedToken(other)),
                },
            }
        }

        if ranks != BOARD_SIZE {
            return Err(ChessError::MalformedPlacement {
                reason: format!("Expected {} ranks, got {}", BOARD_SIZE, ranks),
            });
        }

        Ok(Board::from_ranks(grid, perspective))
    }

    /// 结束当前行：长度必须恰好为 8
    fn close_rank(
        grid: &mut [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
        ranks: &mut usize,
        rank: &mut Vec<Option<Piece>>,
    ) -> Result<(), ChessError> {
        if rank.len() != BOARD_SIZE {
            return Err(ChessError::MalformedPlacement {
                reason: format!("Rank {} has {} squares, expected {}", *ranks + 1, rank.len(), BOARD_SIZE),
            });
        }
        if *ranks >= BOARD_SIZE {
            return Err(ChessError::MalformedPlacement {
                reason: format!("More than {} ranks", BOARD_SIZE),
            });
        }

        for (col, cell) in rank.drain(..).enumerate() {
            grid[*ranks][col] = cell;
        }
        *ranks += 1;
        Ok(())
    }

    /// 将棋盘转换为布局串（与视角无关，总是从第 8 横线开始）
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_SIZE);

        for row in 0..BOARD_SIZE {
            let mut text = String::new();
            let mut empty_count = 0;

            for cell in board.rank(row) {
                if let Some(piece) = cell {
                    if empty_count > 0 {
                        text.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    text.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                text.push_str(&empty_count.to_string());
            }

            rows.push(text);
        }

        rows.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceKind, Square};

    const BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// 标准初始局面中第 `rank` 横线（1-8）、第 `col` 列的棋子
    fn expected_start(rank: u8, col: u8) -> Option<Piece> {
        match rank {
            1 => Some(Piece::new(BACK_RANK[col as usize], Side::White)),
            2 => Some(Piece::new(PieceKind::Pawn, Side::White)),
            7 => Some(Piece::new(PieceKind::Pawn, Side::Black)),
            8 => Some(Piece::new(BACK_RANK[col as usize], Side::Black)),
            _ => None,
        }
    }

    #[test]
    fn test_start_placement_both_perspectives() {
        for perspective in [Side::White, Side::Black] {
            let board = Fen::parse_placement(START_PLACEMENT, perspective).unwrap();
            for sq in Square::all() {
                let rank = match perspective {
                    Side::White => 8 - sq.row(),
                    Side::Black => sq.row() + 1,
                };
                assert_eq!(
                    board.get(sq),
                    expected_start(rank, sq.col()),
                    "perspective {:?}, square {}",
                    perspective,
                    sq
                );
            }
            assert_eq!(board.en_passant(), None);
        }
    }

    #[test]
    fn test_placement_roundtrip() {
        let placement = "8/pp2bp2/2k5/3p4/P4pQ1/1K6/RP1r4/2r5";
        let board = Fen::parse_placement(placement, Side::Black).unwrap();
        assert_eq!(Fen::board_to_string(&board), placement);
    }

    #[test]
    fn test_placement_without_terminator() {
        let board = Fen::parse_placement("4k3/8/8/8/8/8/8/4K3", Side::White).unwrap();
        assert_eq!(
            board.get(Square::new_unchecked(7, 4)),
            Some(Piece::new(PieceKind::King, Side::White))
        );
    }

    #[test]
    fn test_malformed_placement() {
        // 行长度不对
        assert!(matches!(
            Fen::parse_placement("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w", Side::White),
            Err(ChessError::MalformedPlacement { .. })
        ));
        // 行数不对
        assert!(matches!(
            Fen::parse_placement("8/8/8 w", Side::White),
            Err(ChessError::MalformedPlacement { .. })
        ));
        assert!(matches!(
            Fen::parse_placement("8/8/8/8/8/8/8/8/8 w", Side::White),
            Err(ChessError::MalformedPlacement { .. })
        ));
        // 数字溢出本行
        assert!(matches!(
            Fen::parse_placement("9/8/8/8/8/8/8/8", Side::White),
            Err(ChessError::MalformedPlacement { .. })
        ));
    }

    #[test]
    fn test_unrecognized_token() {
        assert_eq!(
            Fen::parse_placement("rnbqkbnr/ppxppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w", Side::White),
            Err(ChessError::UnrecognizedToken('x'))
        );
    }
}
