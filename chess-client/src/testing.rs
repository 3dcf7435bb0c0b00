//! 测试辅助：脚本化连接与日志收集

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chess_protocol::{Connection, ProtocolError, Readiness, Result};

/// 按脚本依次返回服务端消息，并记录客户端发送的消息
#[derive(Debug, Default)]
pub struct ScriptedConnection {
    pub inbound: VecDeque<String>,
    pub sent: Vec<String>,
    pub closed: bool,
}

impl ScriptedConnection {
    pub fn new(inbound: &[&str]) -> Self {
        Self {
            inbound: inbound.iter().map(|msg| msg.to_string()).collect(),
            sent: Vec::new(),
            closed: false,
        }
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn ready(&mut self, want_write: bool, _wait: Duration) -> Result<Readiness> {
        Ok(Readiness {
            readable: !self.inbound.is_empty(),
            writable: want_write && !self.closed,
        })
    }

    async fn recv(&mut self) -> Result<String> {
        self.inbound.pop_front().ok_or(ProtocolError::ConnectionClosed)
    }

    async fn send(&mut self, msg: &str) -> Result<()> {
        if self.closed {
            return Err(ProtocolError::ConnectionClosed);
        }
        self.sent.push(msg.to_string());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn peer_addr(&self) -> Option<String> {
        Some("scripted".to_string())
    }
}

/// 收集日志输出的共享缓冲区
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 在作用域内运行 `f`，返回其间输出的全部日志
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.contents())
}
