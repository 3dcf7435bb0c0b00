//! 网络连接管理
//!
//! 包装 protocol 库的 [`Connection`]，维护发送队列，
//! 每次轮询最多处理一条消息：有可读消息时优先接收，否则发送队首消息。

use std::collections::VecDeque;
use std::time::Duration;

use chess_protocol::{Connection, Result};

/// 一次轮询的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// 超时，没有收发
    Idle,
    /// 收到一条消息
    Received(String),
    /// 发出一条消息
    Sent,
}

/// 网络连接包装器
pub struct NetworkConnection<C> {
    /// 内部连接
    inner: C,
    /// 发送队列
    send_queue: VecDeque<String>,
    /// 就绪轮询超时
    poll_timeout: Duration,
    closed: bool,
}

impl<C: Connection> NetworkConnection<C> {
    pub fn new(inner: C, poll_timeout: Duration) -> Self {
        if let Some(addr) = inner.peer_addr() {
            tracing::info!("Connected to server: {}", addr);
        }
        Self {
            inner,
            send_queue: VecDeque::new(),
            poll_timeout,
            closed: false,
        }
    }

    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// 发送消息（加入发送队列）
    pub fn queue_send(&mut self, msg: String) {
        self.send_queue.push_back(msg);
    }

    /// 队列中待发送的消息数
    pub fn pending_sends(&self) -> usize {
        self.send_queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 做一次有超时的就绪轮询，并最多处理一条消息
    pub async fn poll(&mut self) -> Result<PollEvent> {
        if self.closed {
            return Ok(PollEvent::Idle);
        }

        let want_write = !self.send_queue.is_empty();
        let ready = self.inner.ready(want_write, self.poll_timeout).await?;

        if ready.readable {
            let msg = self.inner.recv().await?;
            return Ok(PollEvent::Received(msg));
        }

        if ready.writable {
            if let Some(msg) = self.send_queue.pop_front() {
                self.inner.send(&msg).await?;
                tracing::debug!("Sent {:?}", msg);
                return Ok(PollEvent::Sent);
            }
        }

        Ok(PollEvent::Idle)
    }

    /// 断开连接，丢弃未发送的消息
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.send_queue.is_empty() {
            tracing::debug!("Dropping {} unsent messages", self.send_queue.len());
            self.send_queue.clear();
        }
        self.inner.close().await
    }
}
