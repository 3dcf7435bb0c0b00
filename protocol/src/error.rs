//! 错误类型定义

use thiserror::Error;

use crate::piece::Square;

/// 棋盘与记谱解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 布局串某一行不是 8 格，或总行数不是 8
    #[error("Malformed placement: {reason}")]
    MalformedPlacement { reason: String },

    /// 布局串中出现无法识别的字符
    #[error("Unrecognized token in placement: {0:?}")]
    UnrecognizedToken(char),

    /// 代数坐标越界或格式错误
    #[error("Bad coordinate: {0:?}")]
    BadCoordinate(String),

    /// 走法串格式错误
    #[error("Malformed move token: {0:?}")]
    MalformedMove(String),

    /// 起点没有棋子
    #[error("Null-piece move from {square}")]
    NullPieceMove { square: Square },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 帧头不是三位十进制数字
    #[error("Invalid frame header: {0:?}")]
    InvalidHeader(String),

    /// 消息体不是合法文本
    #[error("Invalid frame payload: not valid UTF-8")]
    InvalidPayload,

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 当前状态下不应出现的消息
    #[error("Unexpected message: {0:?}")]
    UnexpectedMessage(String),

    /// 无法识别的对局结果
    #[error("Unknown game result: {0:?}")]
    UnknownResult(String),

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭（读写返回 0 字节）
    #[error("Connection closed")]
    ConnectionClosed,

    /// 服务端拒绝握手
    #[error("Handshake rejected")]
    HandshakeRejected,

    /// 本地画面输出失败（与网络无关）
    #[error("Render error: {0}")]
    Render(#[source] std::io::Error),

    /// 解析错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),
}

/// 错误分类（均为致命错误，会结束本次会话）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 布局串或走法串格式错误
    Parse,
    /// 帧头非法、消息形状不认识
    Protocol,
    /// 对端关闭、IO 失败
    Connection,
    /// 握手失败
    Handshake,
    /// 本地渲染失败
    Render,
}

impl ProtocolError {
    /// 获取错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::Chess(_) => ErrorKind::Parse,
            ProtocolError::InvalidHeader(_)
            | ProtocolError::InvalidPayload
            | ProtocolError::FrameTooLarge { .. }
            | ProtocolError::UnexpectedMessage(_)
            | ProtocolError::UnknownResult(_) => ErrorKind::Protocol,
            ProtocolError::Io(_)
            | ProtocolError::ConnectionTimeout
            | ProtocolError::ConnectionClosed => ErrorKind::Connection,
            ProtocolError::HandshakeRejected => ErrorKind::Handshake,
            ProtocolError::Render(_) => ErrorKind::Render,
        }
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
