//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 8;

/// 帧头长度：三位十进制 ASCII 数字
pub const HEADER_LEN: usize = 3;

/// 单帧消息体最大字节数（三位十进制所能表示的上限）
pub const MAX_PAYLOAD_LEN: usize = 999;

/// 默认服务端地址
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// 默认服务端端口
pub const DEFAULT_PORT: u16 = 40000;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

// === 握手阶段 ===

/// 服务端：任选一方
pub const OFFER_EITHER: &str = "either";
/// 服务端：必须执白 / 客户端：选择执白
pub const CODE_WHITE: &str = "white";
/// 服务端：必须执黑 / 客户端：选择执黑
pub const CODE_BLACK: &str = "black";
/// 客户端：以观战者身份加入
pub const CODE_OBSERVER: &str = "observer";
/// 握手成功
pub const HANDSHAKE_OK: &str = "ok";
/// 握手失败
pub const HANDSHAKE_FAIL: &str = "fail";

// === 对局阶段 ===

/// 走法确认前缀（可带 `+` / `#` 后缀）
pub const CONFIRM_PREFIX: &str = "confirm";
/// 走法被拒绝
pub const REJECT: &str = "reject";
/// 合法落点应答前缀
pub const LEGAL_MOVES_PREFIX: &str = "legal-moves";
/// 对局结束前缀
pub const END_PREFIX: &str = "end";
/// 查询合法落点前缀
pub const QUERY_LEGAL_PREFIX: &str = "query-legal";

// === 对局结果 ===

/// 白方胜
pub const RESULT_WHITE_WINS: &str = "1-0";
/// 黑方胜
pub const RESULT_BLACK_WINS: &str = "0-1";
/// 和棋
pub const RESULT_DRAW: &str = "1/2-1/2";
