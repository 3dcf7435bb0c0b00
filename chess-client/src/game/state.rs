//! 对局同步状态
//!
//! [`GameSync`] 把棋盘、会话、待确认走法、合法落点缓存和发送队列
//! 放在同一个上下文对象里，只由同步循环持有和修改。
//!
//! 本地走法采用乐观落子：松手即写入棋盘并发送，服务端确认后丢弃快照，
//! 拒绝时用快照回滚。

use std::collections::VecDeque;

use chess_protocol::{
    Annotation, Board, ClientMessage, Move, MoveApplier, PieceKind, Promotion, ProtocolError,
    Result, ServerMessage, Square,
};

use crate::board::Frame;
use crate::session::Session;

/// 已发送但尚未确认的本地走法
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    /// 落子前的棋盘
    pub snapshot: Board,
    /// 已发送的走法
    pub mv: Move,
}

/// 服务端给出的合法落点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibleMoves {
    pub origin: Square,
    pub destinations: Vec<Square>,
}

/// 正在拖动的棋子
#[derive(Debug, Clone, PartialEq, Eq)]
struct Drag {
    origin: Square,
    snapshot: Board,
}

/// 等待选择升变的走法（尚未落子，也未发送）
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingPromotion {
    from: Square,
    to: Square,
    snapshot: Board,
}

/// 处理一条服务端消息后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// 对局继续
    Continue,
    /// 对局结束
    GameOver,
}

/// 对局同步上下文
#[derive(Debug)]
pub struct GameSync {
    board: Board,
    session: Session,
    pending: Option<PendingMove>,
    possible_moves: Option<PossibleMoves>,
    drag: Option<Drag>,
    promotion: Option<PendingPromotion>,
    outbound: VecDeque<String>,
    query_legal_moves: bool,
}

impl GameSync {
    /// 握手完成后创建
    pub fn new(board: Board, session: Session, query_legal_moves: bool) -> Self {
        Self {
            board,
            session,
            pending: None,
            possible_moves: None,
            drag: None,
            promotion: None,
            outbound: VecDeque::new(),
            query_legal_moves,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    pub fn possible_moves(&self) -> Option<&PossibleMoves> {
        self.possible_moves.as_ref()
    }

    /// 正在拖动的棋子起点
    pub fn dragging(&self) -> Option<Square> {
        self.drag.as_ref().map(|drag| drag.origin)
    }

    /// 等待升变选择的目标格
    pub fn promotion_square(&self) -> Option<Square> {
        self.promotion.as_ref().map(|promotion| promotion.to)
    }

    /// 待发送的消息数
    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    /// 取出下一条待发送的消息
    pub fn next_outbound(&mut self) -> Option<String> {
        self.outbound.pop_front()
    }

    /// 渲染视图
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            board: &self.board,
            session: &self.session,
            dragging: self.dragging(),
            promotion: self.promotion_square(),
            possible_moves: self.possible_moves.as_ref(),
            awaiting_confirmation: self.pending.is_some(),
        }
    }

    fn enqueue(&mut self, msg: ClientMessage) {
        let text = msg.encode(self.board.perspective());
        tracing::debug!("Queued {:?}", text);
        self.outbound.push_back(text);
    }

    /// 当前是否允许拿起棋子
    pub fn can_move(&self) -> bool {
        self.session.in_progress
            && self.session.my_turn
            && self.pending.is_none()
            && self.promotion.is_none()
    }

    // ========================================================================
    // 本地输入
    // ========================================================================

    /// 拿起棋子，返回是否成功拿起
    pub fn pick_up(&mut self, square: Option<Square>) -> bool {
        let Some(origin) = square else {
            return false;
        };
        if !self.can_move() {
            return false;
        }

        let owned = match (self.board.get(origin), self.session.role.side()) {
            (Some(piece), Some(side)) => piece.side == side,
            _ => false,
        };
        if !owned {
            return false;
        }

        self.drag = Some(Drag {
            origin,
            snapshot: self.board.clone(),
        });
        self.possible_moves = None;
        if self.query_legal_moves {
            self.enqueue(ClientMessage::QueryLegal { origin });
        }
        true
    }

    /// 放下棋子
    pub fn drop_at(&mut self, square: Option<Square>) -> Result<()> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };

        // 拖出棋盘或放回原处：棋子回到起点，不发送任何消息
        let to = match square {
            Some(to) if to != drag.origin => to,
            _ => return Ok(()),
        };

        let possible_moves = self.possible_moves.take();
        if let Some(moves) = possible_moves.filter(|moves| moves.origin == drag.origin) {
            if !moves.destinations.contains(&to) {
                tracing::debug!("Drop on {} is not a legal destination, returning piece", to);
                return Ok(());
            }
        }

        // 本方兵总是朝显示坐标第 0 行前进
        let is_pawn = self
            .board
            .get(drag.origin)
            .map_or(false, |piece| piece.kind == PieceKind::Pawn);
        if is_pawn && to.row() == 0 {
            self.promotion = Some(PendingPromotion {
                from: drag.origin,
                to,
                snapshot: drag.snapshot,
            });
            return Ok(());
        }

        self.commit(Move::new(drag.origin, to), drag.snapshot)
    }

    /// 选择升变棋子
    pub fn promote(&mut self, promotion: Promotion) -> Result<()> {
        let Some(pending) = self.promotion.take() else {
            return Ok(());
        };
        self.commit(
            Move::with_promotion(pending.from, pending.to, promotion),
            pending.snapshot,
        )
    }

    /// 乐观落子：写入棋盘、记录快照、发送走法、交出走棋权
    fn commit(&mut self, mv: Move, snapshot: Board) -> Result<()> {
        MoveApplier::apply(&mut self.board, &mv)?;
        self.pending = Some(PendingMove { snapshot, mv });
        self.enqueue(ClientMessage::MakeMove(mv));
        self.session.my_turn = false;
        Ok(())
    }

    // ========================================================================
    // 服务端消息
    // ========================================================================

    /// 解析并处理一条服务端消息
    pub fn handle_server_text(&mut self, text: &str) -> Result<Dispatch> {
        let msg = ServerMessage::parse(text, self.board.perspective())?;
        tracing::debug!("Received {:?}", msg);
        self.handle_server_message(msg, text)
    }

    fn handle_server_message(&mut self, msg: ServerMessage, text: &str) -> Result<Dispatch> {
        match msg {
            ServerMessage::Confirm(annotation) => {
                if self.pending.take().is_none() {
                    return Err(ProtocolError::UnexpectedMessage(text.to_string()));
                }
                self.session.opponent_in_check = annotation.is_some();
            }
            ServerMessage::Reject => {
                let Some(pending) = self.pending.take() else {
                    return Err(ProtocolError::UnexpectedMessage(text.to_string()));
                };
                tracing::info!("Move {} rejected, rolling back", pending.mv);
                self.board = pending.snapshot;
                self.possible_moves = None;
                self.session.my_turn = true;
            }
            ServerMessage::LegalMoves {
                origin,
                destinations,
            } => {
                if self.dragging() == Some(origin) {
                    self.possible_moves = Some(PossibleMoves {
                        origin,
                        destinations,
                    });
                } else {
                    tracing::warn!("Ignoring stale legal moves for {}", origin);
                }
            }
            ServerMessage::GameOver(result) => {
                tracing::info!("Game over: {}", result);
                self.session.result = Some(result);
                self.session.in_progress = false;
                self.pending = None;
                self.drag = None;
                self.promotion = None;
                return Ok(Dispatch::GameOver);
            }
            ServerMessage::Move { mv, annotation } => {
                MoveApplier::apply(&mut self.board, &mv)?;
                self.session.in_check = annotation.is_some();
                if !self.session.role.is_observer() {
                    self.session.my_turn = true;
                }
                if annotation == Some(Annotation::Mate) {
                    tracing::info!("Checkmate announced after {}", mv);
                }
            }
        }
        Ok(Dispatch::Continue)
    }
}
