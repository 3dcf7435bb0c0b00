//! 传输层抽象
//!
//! 提供 Connector/Connection traits 使上层同步循环与具体传输实现解耦，
//! 同步循环只通过 [`Connection::ready`] 做一次有超时的就绪轮询，
//! 确认可读/可写之后才真正读写，因此不会无限期阻塞。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Interest};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{ProtocolError, Result};
use crate::{CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, HEADER_LEN, MAX_PAYLOAD_LEN};

/// 单次读取的块大小（一帧最多 HEADER_LEN + MAX_PAYLOAD_LEN 字节）
const READ_CHUNK: usize = 1024;

/// 网络配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl NetworkConfig {
    /// `host:port` 形式的地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// 一次就绪轮询的结果
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    pub readable: bool,
    pub writable: bool,
}

impl Readiness {
    /// 超时，未就绪
    pub const IDLE: Readiness = Readiness {
        readable: false,
        writable: false,
    };
}

/// 连接抽象 trait（核心抽象，用于同步循环）
#[async_trait]
pub trait Connection: Send {
    /// 等待就绪，最多等待 `wait`；`want_write` 为 false 时只关心可读。
    /// 报告可读时，随后的 `recv` 必须能立即返回
    async fn ready(&mut self, want_write: bool, wait: Duration) -> Result<Readiness>;

    /// 接收一条消息
    async fn recv(&mut self) -> Result<String>;

    /// 发送一条消息
    async fn send(&mut self, msg: &str) -> Result<()>;

    /// 关闭连接
    async fn close(&mut self) -> Result<()>;

    /// 获取远端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 连接器 trait（客户端使用）
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Connection;

    /// 建立连接
    async fn connect(&self, addr: &str) -> Result<Self::Conn>;
}

// ============================================================================
// TCP 实现
// ============================================================================

/// TCP 连接器
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(&self, addr: &str) -> Result<Self::Conn> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)?
            .map_err(ProtocolError::Io)?;

        TcpConnection::from_stream(stream)
    }
}

/// TCP 连接
pub struct TcpConnection {
    framer: Framer<TcpStream>,
    peer_addr: Option<String>,
    /// 已读到对端关闭
    eof: bool,
}

impl TcpConnection {
    /// 从 TcpStream 创建
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());

        Ok(Self {
            framer: Framer::new(stream),
            peer_addr,
            eof: false,
        })
    }
}

#[async_trait]
impl Connection for TcpConnection {
    /// `readable` 表示缓冲区里已有一整帧（或帧头非法、对端已关闭），
    /// 此时 [`Connection::recv`] 不会等待网络
    async fn ready(&mut self, want_write: bool, wait: Duration) -> Result<Readiness> {
        if self.eof || self.framer.has_frame() {
            return Ok(Readiness {
                readable: true,
                writable: false,
            });
        }

        let interest = if want_write {
            Interest::READABLE | Interest::WRITABLE
        } else {
            Interest::READABLE
        };

        let ready = match timeout(wait, self.framer.get_ref().ready(interest)).await {
            Ok(ready) => ready?,
            Err(_) => return Ok(Readiness::IDLE),
        };

        if ready.is_readable() || ready.is_read_closed() {
            // 读到 WouldBlock 为止，tokio 据此清除可读状态
            self.eof = self.framer.read_available()?;
        }

        Ok(Readiness {
            readable: self.eof || self.framer.has_frame(),
            writable: want_write && ready.is_writable(),
        })
    }

    async fn recv(&mut self) -> Result<String> {
        self.framer.read_frame().await
    }

    async fn send(&mut self, msg: &str) -> Result<()> {
        self.framer.write_frame(msg).await
    }

    async fn close(&mut self) -> Result<()> {
        tracing::debug!("Closing connection to {:?}", self.peer_addr);
        self.framer.get_mut().shutdown().await?;
        Ok(())
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer_addr.clone()
    }
}

// ============================================================================
// 帧编解码
// ============================================================================

/// 帧编解码器
///
/// 每帧 = 三位十进制 ASCII 长度（不足补零）+ 对应字节数的文本消息体。
/// 读到的字节先进入接收缓冲区，凑满一整帧才解码。
pub struct Framer<S> {
    stream: S,
    buf: Vec<u8>,
}

impl<S> Framer<S> {
    /// 创建新的帧编解码器
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// 已接收但尚未解码的字节
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// 缓冲区中是否有可立即返回的结果（完整的帧，或非法帧头）
    pub fn has_frame(&self) -> bool {
        if self.buf.len() < HEADER_LEN {
            return false;
        }
        match Self::payload_len(&self.buf[..HEADER_LEN]) {
            Some(length) => self.buf.len() >= HEADER_LEN + length,
            None => true,
        }
    }

    fn payload_len(header: &[u8]) -> Option<usize> {
        if !header.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(
            header
                .iter()
                .fold(0usize, |acc, digit| acc * 10 + (digit - b'0') as usize),
        )
    }

    /// 从缓冲区解码一帧；帧头非法时不消费任何字节
    fn decode_buffered(&mut self) -> Result<Option<String>> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let length = Self::payload_len(&self.buf[..HEADER_LEN]).ok_or_else(|| {
            ProtocolError::InvalidHeader(String::from_utf8_lossy(&self.buf[..HEADER_LEN]).into_owned())
        })?;
        if self.buf.len() < HEADER_LEN + length {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buf.drain(..HEADER_LEN + length).skip(HEADER_LEN).collect();
        let text = String::from_utf8(frame).map_err(|_| ProtocolError::InvalidPayload)?;
        tracing::trace!("Read frame of {} bytes", length);
        Ok(Some(text.trim_end().to_string()))
    }
}

impl Framer<TcpStream> {
    /// 不等待地读入套接字上现有的全部字节，返回对端是否已关闭
    fn read_available(&mut self) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => return Ok(true),
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<S: AsyncRead + Unpin + Send> Framer<S> {
    /// 读取并解码一帧消息（去掉末尾空白）
    pub async fn read_frame(&mut self) -> Result<String> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(text) = self.decode_buffered()? {
                return Ok(text);
            }
            // 短读时继续读；读到 0 字节说明对端已关闭
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(ProtocolError::ConnectionClosed);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

impl<S: AsyncWrite + Unpin + Send> Framer<S> {
    /// 编码并写入一帧消息
    pub async fn write_frame(&mut self, msg: &str) -> Result<()> {
        let payload = msg.trim().as_bytes();

        // 检查大小
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::FrameTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        let mut frame = format!("{:03}", payload.len()).into_bytes();
        frame.extend_from_slice(payload);

        // 短写时继续写；写入 0 字节说明对端已关闭
        let mut written = 0;
        while written < frame.len() {
            let n = self.stream.write(&frame[written..]).await?;
            if n == 0 {
                return Err(ProtocolError::ConnectionClosed);
            }
            written += n;
        }
        self.stream.flush().await?;
        tracing::trace!("Wrote frame of {} bytes", payload.len());

        Ok(())
    }
}
