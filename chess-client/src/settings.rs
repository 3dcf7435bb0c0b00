//! 客户端设置模块
//!
//! 设置以 JSON 形式保存在系统配置目录下，命令行参数可覆盖其中的字段。

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_protocol::{NetworkConfig, Side, DEFAULT_HOST, DEFAULT_PORT};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::board::BoardGeometry;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// tracing 过滤指令中使用的级别名
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 客户端设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    // === 网络设置 ===
    /// 服务端地址
    pub host: String,
    /// 服务端端口
    pub port: u16,
    /// 服务端允许任选时希望执的一方（None 为随机）
    pub preferred_side: Option<Side>,

    // === 对局设置 ===
    /// 拿起棋子时是否向服务端查询合法落点
    pub query_legal_moves: bool,

    // === 循环设置 ===
    /// 每帧就绪轮询的超时（毫秒）
    pub poll_timeout_ms: u64,
    /// 帧率
    pub frame_rate: u32,

    // === 显示设置 ===
    /// 棋盘宽度（像素）
    pub board_width: f32,
    /// 棋盘高度（像素）
    pub board_height: f32,

    // === 高级设置 ===
    /// 日志级别
    pub log_level: LogLevel,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            preferred_side: None,
            query_legal_moves: true,
            poll_timeout_ms: 5,
            frame_rate: 60,
            board_width: 800.0,
            board_height: 800.0,
            log_level: LogLevel::default(),
        }
    }
}

impl ClientSettings {
    /// 获取设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("chess-client");
            path.push("settings.json");
            path
        })
    }

    /// 从默认位置加载设置
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("Config directory unavailable, using default settings");
                Self::default()
            }
        }
    }

    /// 从指定文件加载设置，文件不存在或格式无效时使用默认设置
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("Settings file {:?} not found, using default settings", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Invalid settings file {:?}: {}, using default settings", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Cannot read settings file {:?}: {}, using default settings", path, e);
                Self::default()
            }
        }
    }

    /// 保存设置到默认位置
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::settings_path().ok_or_else(|| anyhow::anyhow!("Config directory unavailable"))?;
        self.save_to(&path)
    }

    /// 保存设置到指定文件
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create config directory {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("Cannot serialize settings")?;
        std::fs::write(path, content).with_context(|| format!("Cannot write settings file {:?}", path))?;

        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// 网络配置
    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// 棋盘几何
    pub fn geometry(&self) -> BoardGeometry {
        BoardGeometry::new(self.board_width, self.board_height)
    }

    /// 就绪轮询超时
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// 每帧间隔
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }
}
