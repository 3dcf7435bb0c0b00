//! 国际象棋联机客户端共享协议库
//!
//! 包含:
//! - 棋子、棋盘、格子等核心数据结构（含视角翻转）
//! - 布局串（FEN 棋盘部分）解析
//! - 代数记谱编解码 (MoveCodec)
//! - 走法落子（王车易位、吃过路兵、升变）
//! - 文本消息定义 (ClientMessage, ServerMessage)
//! - 传输层抽象与三字节长度前缀分帧 (Framer)

mod board;
mod constants;
mod error;
mod fen;
mod message;
mod moves;
mod notation;
mod piece;
mod transport;

pub use board::Board;
pub use constants::*;
pub use error::{ChessError, ErrorKind, ProtocolError, Result};
pub use fen::{Fen, START_PLACEMENT};
pub use message::{
    Annotation, ClientMessage, GameResult, HandshakeOffer, HandshakeOutcome, ServerMessage,
};
pub use moves::{Move, MoveApplier};
pub use notation::MoveCodec;
pub use piece::{Piece, PieceKind, Promotion, Side, Square};
pub use transport::{
    Connection, Connector, Framer, NetworkConfig, Readiness, TcpConnection, TcpConnector,
};
