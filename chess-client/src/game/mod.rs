//! 游戏逻辑模块
//!
//! [`SyncLoop`] 是客户端的主循环，单线程驱动输入、渲染和网络：
//!
//! 1. 取出输入事件并换算为格子
//! 2. 渲染当前帧
//! 3. 一次有超时的就绪轮询，至多收或发一条消息（接收优先）
//!
//! 对局结束后停止网络轮询，但继续渲染并处理输入，直到用户退出。

mod input;
mod state;

pub use input::*;
pub use state::*;

use std::time::Duration;

use chess_protocol::{Board, Connection, GameResult, ProtocolError, Result};
use tokio::time::MissedTickBehavior;

use crate::board::{BoardGeometry, Renderer};
use crate::network::{NetworkConnection, PollEvent};
use crate::session::Session;

/// 一帧之后循环的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 对局进行中
    Continue,
    /// 对局已结束，等待用户退出
    Finished(GameResult),
    /// 用户退出
    Quit,
}

/// 同步循环配置
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub geometry: BoardGeometry,
    pub poll_timeout: Duration,
    pub frame_period: Duration,
    pub query_legal_moves: bool,
}

/// 客户端主循环
pub struct SyncLoop<C, I, R> {
    game: GameSync,
    network: NetworkConnection<C>,
    input: I,
    renderer: R,
    geometry: BoardGeometry,
    frame_period: Duration,
}

impl<C, I, R> SyncLoop<C, I, R>
where
    C: Connection,
    I: InputSource,
    R: Renderer,
{
    /// 握手完成后创建
    pub fn new(
        conn: C,
        session: Session,
        board: Board,
        input: I,
        renderer: R,
        config: LoopConfig,
    ) -> Self {
        Self {
            game: GameSync::new(board, session, config.query_legal_moves),
            network: NetworkConnection::new(conn, config.poll_timeout),
            input,
            renderer,
            geometry: config.geometry,
            frame_period: config.frame_period,
        }
    }

    pub fn game(&self) -> &GameSync {
        &self.game
    }

    pub fn network(&self) -> &NetworkConnection<C> {
        &self.network
    }

    /// 执行一帧
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        for event in self.input.poll_events() {
            if self.handle_input(event)? {
                self.network.disconnect().await?;
                return Ok(TickOutcome::Quit);
            }
        }
        while let Some(msg) = self.game.next_outbound() {
            self.network.queue_send(msg);
        }

        self.render()?;

        if let Some(result) = self.game.session().result {
            return Ok(TickOutcome::Finished(result));
        }

        if let PollEvent::Received(text) = self.network.poll().await? {
            if self.game.handle_server_text(&text)? == Dispatch::GameOver {
                if let Some(result) = self.game.session().result {
                    self.render()?;
                    return Ok(TickOutcome::Finished(result));
                }
            }
        }

        Ok(TickOutcome::Continue)
    }

    fn render(&mut self) -> Result<()> {
        self.renderer
            .render(&self.game.frame())
            .map_err(ProtocolError::Render)
    }

    /// 处理一个输入事件，返回是否退出
    fn handle_input(&mut self, event: InputEvent) -> Result<bool> {
        match event {
            InputEvent::PickUp { x, y } => {
                self.game.pick_up(self.geometry.square_at(x, y));
            }
            InputEvent::Drop { x, y } => {
                self.game.drop_at(self.geometry.square_at(x, y))?;
            }
            InputEvent::Promote(promotion) => {
                self.game.promote(promotion)?;
            }
            InputEvent::Quit => return Ok(true),
        }
        Ok(false)
    }

    /// 按帧率运行，直到用户退出；返回对局结果（未结束为 None）
    pub async fn run(&mut self) -> Result<Option<GameResult>> {
        let mut interval = tokio::time::interval(self.frame_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut announced = false;

        loop {
            interval.tick().await;
            match self.tick().await? {
                TickOutcome::Continue => {}
                TickOutcome::Finished(result) => {
                    if !announced {
                        tracing::info!("Game finished ({}), waiting for quit", result);
                        announced = true;
                    }
                }
                TickOutcome::Quit => {
                    tracing::info!("Quit requested");
                    return Ok(self.game.session().result);
                }
            }
        }
    }
}
