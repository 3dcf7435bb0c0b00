//! 会话与握手
//!
//! 握手状态机：`AwaitingOffer → RoleChosen → AwaitingResult → {Active | Failed}`。
//! 状态机本身不做 IO，[`negotiate`] 负责在连接上驱动它。

use chess_protocol::{
    Board, Connection, Fen, GameResult, HandshakeOffer, HandshakeOutcome, ProtocolError, Result,
    Side, CODE_OBSERVER,
};
use rand::Rng;

/// 本地参与者的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 执某一方
    Player(Side),
    /// 观战
    Observer,
}

impl Role {
    /// 执棋方（观战为 None）
    pub fn side(&self) -> Option<Side> {
        match self {
            Role::Player(side) => Some(*side),
            Role::Observer => None,
        }
    }

    /// 棋盘视角：观战者使用白方视角
    pub fn perspective(&self) -> Side {
        self.side().unwrap_or(Side::White)
    }

    /// 握手应答代码
    pub fn code(&self) -> &'static str {
        match self {
            Role::Player(side) => side.code(),
            Role::Observer => CODE_OBSERVER,
        }
    }

    pub fn is_observer(&self) -> bool {
        matches!(self, Role::Observer)
    }
}

/// 会话状态（握手完成时创建，连接结束时销毁）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 本地身份
    pub role: Role,
    /// 是否轮到本地走棋
    pub my_turn: bool,
    /// 本方是否被将军
    pub in_check: bool,
    /// 对方是否被将军
    pub opponent_in_check: bool,
    /// 对局是否进行中
    pub in_progress: bool,
    /// 对局结果
    pub result: Option<GameResult>,
}

impl Session {
    /// 握手成功后创建会话：白方先走
    pub fn new(role: Role) -> Self {
        Self {
            role,
            my_turn: role == Role::Player(Side::White),
            in_check: false,
            opponent_in_check: false,
            in_progress: true,
            result: None,
        }
    }
}

/// 握手状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    /// 等待服务端提供身份选项
    AwaitingOffer,
    /// 已应答身份，等待初始布局
    RoleChosen { role: Role },
    /// 已收到布局，等待握手结果
    AwaitingResult { role: Role, board: Board },
    /// 握手成功
    Active,
    /// 握手失败
    Failed,
}

/// 状态机每处理一条消息后的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeStep {
    /// 需要回复服务端
    Reply(String),
    /// 继续等待下一条消息
    Continue,
    /// 握手完成
    Complete { session: Session, board: Board },
}

/// 握手状态机
pub struct SessionNegotiator {
    state: HandshakeState,
    /// 服务端允许任选时希望执的一方（None 为随机）
    preferred_side: Option<Side>,
}

impl SessionNegotiator {
    pub fn new(preferred_side: Option<Side>) -> Self {
        Self {
            state: HandshakeState::AwaitingOffer,
            preferred_side,
        }
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// 处理服务端的一条握手消息
    pub fn on_message(&mut self, text: &str) -> Result<HandshakeStep> {
        let state = std::mem::replace(&mut self.state, HandshakeState::Failed);

        match state {
            HandshakeState::AwaitingOffer => {
                let role = match HandshakeOffer::parse(text) {
                    HandshakeOffer::Either => Role::Player(self.choose_side()),
                    HandshakeOffer::Forced(side) => Role::Player(side),
                    HandshakeOffer::Observe => Role::Observer,
                };
                tracing::debug!("Handshake offer {:?}, replying as {:?}", text, role);
                self.state = HandshakeState::RoleChosen { role };
                Ok(HandshakeStep::Reply(role.code().to_string()))
            }
            HandshakeState::RoleChosen { role } => {
                let board = Fen::parse_placement(text, role.perspective())?;
                self.state = HandshakeState::AwaitingResult { role, board };
                Ok(HandshakeStep::Continue)
            }
            HandshakeState::AwaitingResult { role, board } => match HandshakeOutcome::parse(text)? {
                HandshakeOutcome::Accepted => {
                    self.state = HandshakeState::Active;
                    Ok(HandshakeStep::Complete {
                        session: Session::new(role),
                        board,
                    })
                }
                HandshakeOutcome::Rejected => Err(ProtocolError::HandshakeRejected),
            },
            HandshakeState::Active | HandshakeState::Failed => {
                self.state = state;
                Err(ProtocolError::UnexpectedMessage(text.to_string()))
            }
        }
    }

    fn choose_side(&self) -> Side {
        self.preferred_side.unwrap_or_else(|| {
            if rand::thread_rng().gen_bool(0.5) {
                Side::White
            } else {
                Side::Black
            }
        })
    }
}

/// 在连接上完成握手
pub async fn negotiate<C: Connection>(
    conn: &mut C,
    preferred_side: Option<Side>,
) -> Result<(Session, Board)> {
    let mut negotiator = SessionNegotiator::new(preferred_side);

    loop {
        let msg = conn.recv().await?;
        match negotiator.on_message(&msg)? {
            HandshakeStep::Reply(reply) => conn.send(&reply).await?,
            HandshakeStep::Continue => {}
            HandshakeStep::Complete { session, board } => {
                tracing::info!("Handshake complete, playing as {:?}", session.role);
                return Ok((session, board));
            }
        }
    }
}
