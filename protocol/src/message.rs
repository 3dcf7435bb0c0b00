//! 消息类型定义
//!
//! 协议是纯文本的，每条消息一帧。对局阶段服务端消息按固定前缀区分，
//! 不匹配任何前缀的消息一律按走法解析。

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ProtocolError, Result};
use crate::moves::Move;
use crate::notation::MoveCodec;
use crate::piece::{Side, Square};

/// 走法或确认后的将军标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    /// `+`
    Check,
    /// `#`
    Mate,
}

impl Annotation {
    /// 去掉末尾的 `+` / `#`，返回剩余部分和标记
    pub fn strip(text: &str) -> (&str, Option<Annotation>) {
        if let Some(rest) = text.strip_suffix('+') {
            (rest, Some(Annotation::Check))
        } else if let Some(rest) = text.strip_suffix('#') {
            (rest, Some(Annotation::Mate))
        } else {
            (text, None)
        }
    }
}

/// 游戏结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// 白方胜
    WhiteWins,
    /// 黑方胜
    BlackWins,
    /// 和棋
    Draw,
}

impl GameResult {
    /// 从结果串解析
    pub fn parse(text: &str) -> Result<Self> {
        match text {
            RESULT_WHITE_WINS => Ok(GameResult::WhiteWins),
            RESULT_BLACK_WINS => Ok(GameResult::BlackWins),
            RESULT_DRAW => Ok(GameResult::Draw),
            other => Err(ProtocolError::UnknownResult(other.to_string())),
        }
    }

    /// 结果串
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => RESULT_WHITE_WINS,
            GameResult::BlackWins => RESULT_BLACK_WINS,
            GameResult::Draw => RESULT_DRAW,
        }
    }

    /// 胜方（和棋为 None）
    pub fn winner(&self) -> Option<Side> {
        match self {
            GameResult::WhiteWins => Some(Side::White),
            GameResult::BlackWins => Some(Side::Black),
            GameResult::Draw => None,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 握手阶段服务端的第一条消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOffer {
    /// 任选一方
    Either,
    /// 只能执该方
    Forced(Side),
    /// 其他任何消息：只能观战
    Observe,
}

impl HandshakeOffer {
    pub fn parse(text: &str) -> Self {
        if text == OFFER_EITHER {
            return HandshakeOffer::Either;
        }
        match Side::from_code(text) {
            Some(side) => HandshakeOffer::Forced(side),
            None => HandshakeOffer::Observe,
        }
    }
}

/// 握手阶段服务端的最后一条消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    Accepted,
    Rejected,
}

impl HandshakeOutcome {
    pub fn parse(text: &str) -> Result<Self> {
        match text {
            HANDSHAKE_OK => Ok(HandshakeOutcome::Accepted),
            HANDSHAKE_FAIL => Ok(HandshakeOutcome::Rejected),
            other => Err(ProtocolError::UnexpectedMessage(other.to_string())),
        }
    }
}

/// 客户端发送给服务端的对局消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// 查询某格棋子的合法落点
    QueryLegal { origin: Square },
    /// 走棋
    MakeMove(Move),
}

impl ClientMessage {
    /// 编码为文本
    pub fn encode(&self, perspective: Side) -> String {
        match self {
            ClientMessage::QueryLegal { origin } => format!(
                "{} {}",
                QUERY_LEGAL_PREFIX,
                MoveCodec::encode_square(*origin, perspective)
            ),
            ClientMessage::MakeMove(mv) => MoveCodec::encode_move(mv, perspective),
        }
    }
}

/// 服务端发送给客户端的对局消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// 本方走法被接受
    Confirm(Option<Annotation>),
    /// 本方走法被拒绝（正常的乐观并发反馈，不是错误）
    Reject,
    /// 合法落点应答
    LegalMoves {
        origin: Square,
        destinations: Vec<Square>,
    },
    /// 对局结束
    GameOver(GameResult),
    /// 对手（或观战时任一方）的走法
    Move {
        mv: Move,
        annotation: Option<Annotation>,
    },
}

impl ServerMessage {
    /// 从文本解析
    pub fn parse(text: &str, perspective: Side) -> Result<Self> {
        let mut words = text.split_whitespace();
        let head = words.next().unwrap_or_default();

        if let Some(suffix) = head.strip_prefix(CONFIRM_PREFIX) {
            return match (Annotation::strip(suffix), words.next()) {
                (("", annotation), None) => Ok(ServerMessage::Confirm(annotation)),
                _ => Err(ProtocolError::UnexpectedMessage(text.to_string())),
            };
        }

        if head == REJECT {
            return Ok(ServerMessage::Reject);
        }

        if head == LEGAL_MOVES_PREFIX {
            let origin = words
                .next()
                .ok_or_else(|| ProtocolError::UnexpectedMessage(text.to_string()))?;
            let origin = MoveCodec::decode_square(origin, perspective)?;
            let destinations = words
                .map(|dest| MoveCodec::decode_square(dest, perspective))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(ServerMessage::LegalMoves {
                origin,
                destinations,
            });
        }

        if head == END_PREFIX {
            let result = words.collect::<Vec<_>>().join(" ");
            return Ok(ServerMessage::GameOver(GameResult::parse(&result)?));
        }

        let (mv, annotation) = MoveCodec::decode_move(text.trim(), perspective)?;
        Ok(ServerMessage::Move { mv, annotation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChessError;
    use crate::piece::Promotion;

    fn sq(text: &str) -> Square {
        MoveCodec::decode_square(text, Side::White).unwrap()
    }

    #[test]
    fn test_parse_confirm() {
        assert_eq!(
            ServerMessage::parse("confirm", Side::White).unwrap(),
            ServerMessage::Confirm(None)
        );
        assert_eq!(
            ServerMessage::parse("confirm+", Side::White).unwrap(),
            ServerMessage::Confirm(Some(Annotation::Check))
        );
        assert_eq!(
            ServerMessage::parse("confirm#", Side::Black).unwrap(),
            ServerMessage::Confirm(Some(Annotation::Mate))
        );
        assert!(matches!(
            ServerMessage::parse("confirmed", Side::White),
            Err(ProtocolError::UnexpectedMessage(_))
        ));
    }

    #[test]
    fn test_parse_reject() {
        assert_eq!(
            ServerMessage::parse("reject", Side::White).unwrap(),
            ServerMessage::Reject
        );
    }

    #[test]
    fn test_parse_legal_moves() {
        let msg = ServerMessage::parse("legal-moves e2 e3 e4", Side::White).unwrap();
        assert_eq!(
            msg,
            ServerMessage::LegalMoves {
                origin: sq("e2"),
                destinations: vec![sq("e3"), sq("e4")],
            }
        );

        // 没有落点也是合法应答
        let msg = ServerMessage::parse("legal-moves a1", Side::White).unwrap();
        assert_eq!(
            msg,
            ServerMessage::LegalMoves {
                origin: sq("a1"),
                destinations: vec![],
            }
        );

        assert!(ServerMessage::parse("legal-moves", Side::White).is_err());
    }

    #[test]
    fn test_parse_game_over() {
        assert_eq!(
            ServerMessage::parse("end 1-0", Side::White).unwrap(),
            ServerMessage::GameOver(GameResult::WhiteWins)
        );
        assert_eq!(
            ServerMessage::parse("end 0-1", Side::White).unwrap(),
            ServerMessage::GameOver(GameResult::BlackWins)
        );
        assert_eq!(
            ServerMessage::parse("end 1/2-1/2", Side::White).unwrap(),
            ServerMessage::GameOver(GameResult::Draw)
        );
        assert!(matches!(
            ServerMessage::parse("end 2-0", Side::White),
            Err(ProtocolError::UnknownResult(_))
        ));
    }

    #[test]
    fn test_parse_move_fallback() {
        // "e7e5" 以 'e' 开头，但不会被误认为 end
        let msg = ServerMessage::parse("e7e5", Side::White).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Move {
                mv: Move::new(sq("e7"), sq("e5")),
                annotation: None,
            }
        );

        let msg = ServerMessage::parse("a2a1=Q#", Side::White).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Move {
                mv: Move::with_promotion(sq("a2"), sq("a1"), Promotion::Queen),
                annotation: Some(Annotation::Mate),
            }
        );

        assert!(matches!(
            ServerMessage::parse("hello", Side::White),
            Err(ProtocolError::Chess(ChessError::BadCoordinate(_)))
        ));
    }

    #[test]
    fn test_encode_client_messages() {
        let query = ClientMessage::QueryLegal { origin: sq("g1") };
        assert_eq!(query.encode(Side::White), "query-legal g1");

        let mv = ClientMessage::MakeMove(Move::with_promotion(sq("b7"), sq("b8"), Promotion::Rook));
        assert_eq!(mv.encode(Side::White), "b7b8=R");

        // 黑方视角下同一显示坐标对应不同的代数坐标
        let origin = MoveCodec::decode_square("e7", Side::Black).unwrap();
        let query = ClientMessage::QueryLegal { origin };
        assert_eq!(query.encode(Side::Black), "query-legal e7");
    }

    #[test]
    fn test_handshake_tokens() {
        assert_eq!(HandshakeOffer::parse("either"), HandshakeOffer::Either);
        assert_eq!(HandshakeOffer::parse("white"), HandshakeOffer::Forced(Side::White));
        assert_eq!(HandshakeOffer::parse("black"), HandshakeOffer::Forced(Side::Black));
        assert_eq!(HandshakeOffer::parse("full"), HandshakeOffer::Observe);

        assert_eq!(HandshakeOutcome::parse("ok").unwrap(), HandshakeOutcome::Accepted);
        assert_eq!(HandshakeOutcome::parse("fail").unwrap(), HandshakeOutcome::Rejected);
        assert!(HandshakeOutcome::parse("maybe").is_err());
    }
}
