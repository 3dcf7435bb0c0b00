//! 国际象棋网络客户端
//!
//! 与服务端握手后，在单线程循环中同步棋盘：本地走法乐观落子，
//! 等待服务端确认或拒绝；对手走法直接应用。

pub mod board;
pub mod game;
pub mod logging;
pub mod network;
pub mod session;
pub mod settings;

#[cfg(test)]
mod testing;

pub use game::{LoopConfig, SyncLoop, TickOutcome};
pub use session::{negotiate, Role, Session, SessionNegotiator};
pub use settings::ClientSettings;
