//! 代数记谱编解码
//!
//! 格子用 `文件字母 + 横线数字` 表示，例如 `e4`。
//! 走法串为 `起点 + 终点`，升变时追加 `=Q` / `=N` / `=R` / `=B`；
//! 服务端发来的走法与确认可能带 `+`（将军）或 `#`（将死）后缀。
//!
//! 所有接口都接收显示坐标，因此需要知道本地视角。

use crate::error::ChessError;
use crate::message::Annotation;
use crate::moves::Move;
use crate::piece::{Promotion, Side, Square};

/// 走法编解码
pub struct MoveCodec;

impl MoveCodec {
    /// 格子转换为代数坐标
    pub fn encode_square(square: Square, perspective: Side) -> String {
        let file = (b'a' + square.col()) as char;
        let rank = match perspective {
            Side::White => 8 - square.row(),
            Side::Black => square.row() + 1,
        };
        format!("{}{}", file, rank)
    }

    /// 代数坐标转换为格子
    pub fn decode_square(text: &str, perspective: Side) -> Result<Square, ChessError> {
        let bad = || ChessError::BadCoordinate(text.to_string());

        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return Err(bad());
        }

        let col = bytes[0] as i16 - b'a' as i16;
        let rank = bytes[1] as i16 - b'0' as i16;
        let row = match perspective {
            Side::White => 8 - rank,
            Side::Black => rank - 1,
        };

        if !(0..8).contains(&row) || !(0..8).contains(&col) {
            return Err(bad());
        }
        Ok(Square::new_unchecked(row as u8, col as u8))
    }

    /// 走法转换为走法串（不带将军标记）
    pub fn encode_move(mv: &Move, perspective: Side) -> String {
        let mut token = Self::encode_square(mv.from, perspective);
        token.push_str(&Self::encode_square(mv.to, perspective));
        if let Some(promotion) = mv.promotion {
            token.push('=');
            token.push(promotion.letter());
        }
        token
    }

    /// 解析走法串，返回走法和可能存在的将军标记
    pub fn decode_move(token: &str, perspective: Side) -> Result<(Move, Option<Annotation>), ChessError> {
        let (body, annotation) = Annotation::strip(token);

        if body.len() < 4 || !body.is_ascii() {
            return Err(ChessError::MalformedMove(token.to_string()));
        }

        let from = Self::decode_square(&body[0..2], perspective)?;
        let to = Self::decode_square(&body[2..4], perspective)?;

        let promotion = match &body[4..] {
            "" => None,
            suffix => {
                let mut chars = suffix.chars();
                match (chars.next(), chars.next().and_then(Promotion::from_letter), chars.next()) {
                    (Some('='), Some(promotion), None) => Some(promotion),
                    _ => return Err(ChessError::MalformedMove(token.to_string())),
                }
            }
        };

        Ok((Move { from, to, promotion }, annotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_roundtrip_all_squares() {
        for perspective in [Side::White, Side::Black] {
            for sq in Square::all() {
                let text = MoveCodec::encode_square(sq, perspective);
                assert_eq!(MoveCodec::decode_square(&text, perspective), Ok(sq));
            }
        }
    }

    #[test]
    fn test_square_encoding() {
        // 白方视角：左上角是 a8，右下角是 h1
        assert_eq!(MoveCodec::encode_square(Square::new_unchecked(0, 0), Side::White), "a8");
        assert_eq!(MoveCodec::encode_square(Square::new_unchecked(7, 7), Side::White), "h1");
        // 黑方视角只翻转行
        assert_eq!(MoveCodec::encode_square(Square::new_unchecked(0, 0), Side::Black), "a1");
        assert_eq!(MoveCodec::encode_square(Square::new_unchecked(7, 7), Side::Black), "h8");
    }

    #[test]
    fn test_bad_coordinates() {
        for text in ["i1", "a0", "a9", "", "e", "e44", "E4", "4e"] {
            assert!(
                matches!(
                    MoveCodec::decode_square(text, Side::White),
                    Err(ChessError::BadCoordinate(_))
                ),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_decode_plain_move() {
        let (mv, annotation) = MoveCodec::decode_move("e2e4", Side::White).unwrap();
        assert_eq!(mv.from, Square::new_unchecked(6, 4));
        assert_eq!(mv.to, Square::new_unchecked(4, 4));
        assert_eq!(mv.promotion, None);
        assert_eq!(annotation, None);
    }

    #[test]
    fn test_decode_annotated_promotion() {
        let (mv, annotation) = MoveCodec::decode_move("e7e8=Q+", Side::White).unwrap();
        assert_eq!(mv.to, Square::new_unchecked(0, 4));
        assert_eq!(mv.promotion, Some(Promotion::Queen));
        assert_eq!(annotation, Some(Annotation::Check));

        let (mv, annotation) = MoveCodec::decode_move("b2b1=N#", Side::Black).unwrap();
        assert_eq!(mv.to, Square::new_unchecked(0, 1));
        assert_eq!(mv.promotion, Some(Promotion::Knight));
        assert_eq!(annotation, Some(Annotation::Mate));
    }

    #[test]
    fn test_encode_move_roundtrip() {
        for perspective in [Side::White, Side::Black] {
            for token in ["e2e4", "g1f3", "a7a8=R", "h2h1=B"] {
                let (mv, _) = MoveCodec::decode_move(token, perspective).unwrap();
                assert_eq!(MoveCodec::encode_move(&mv, perspective), token);
            }
        }
    }

    #[test]
    fn test_malformed_moves() {
        assert!(matches!(
            MoveCodec::decode_move("e2e", Side::White),
            Err(ChessError::MalformedMove(_))
        ));
        assert!(matches!(
            MoveCodec::decode_move("+", Side::White),
            Err(ChessError::MalformedMove(_))
        ));
        assert!(matches!(
            MoveCodec::decode_move("e7e8=K", Side::White),
            Err(ChessError::MalformedMove(_))
        ));
        assert!(matches!(
            MoveCodec::decode_move("e7e8Q", Side::White),
            Err(ChessError::MalformedMove(_))
        ));
        assert!(matches!(
            MoveCodec::decode_move("e2x4", Side::White),
            Err(ChessError::BadCoordinate(_))
        ));
    }
}
