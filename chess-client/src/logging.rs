//! 日志初始化
//!
//! 先按命令行（或默认）级别安装订阅器，读取设置文件之后再切换到设置中的级别，
//! 读取设置时产生的日志因此不会丢失。

use anyhow::Result;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::settings::LogLevel;

/// 运行时切换日志级别的句柄
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    pub fn set_level(&self, level: LogLevel) -> Result<()> {
        self.filter.reload(log_filter(level)?)?;
        Ok(())
    }
}

/// 环境变量 `RUST_LOG` 加上本项目两个 crate 的默认级别
pub fn log_filter(level: LogLevel) -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive(format!("chess_client={}", level.as_str()).parse()?)
        .add_directive(format!("chess_protocol={}", level.as_str()).parse()?))
}

/// 可重新加载的过滤层
pub fn filter_layer(level: LogLevel) -> Result<(reload::Layer<EnvFilter, Registry>, LogHandle)> {
    let (layer, filter) = reload::Layer::new(log_filter(level)?);
    Ok((layer, LogHandle { filter }))
}

/// 安装全局订阅器（日志写到 stderr，stdout 留给棋盘）
pub fn init(level: LogLevel) -> Result<LogHandle> {
    let (filter, handle) = filter_layer(level)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ClientSettings;
    use crate::testing::LogBuffer;

    #[test]
    fn test_settings_fallback_logged_before_level_switch() {
        let dir = std::env::temp_dir().join(format!("chess-client-log-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let logs = LogBuffer::default();
        let (filter, handle) = filter_layer(LogLevel::Warn).unwrap();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(ClientSettings::load_from(&path), ClientSettings::default());
            handle.set_level(LogLevel::Error).unwrap();
            ClientSettings::load_from(&path);
        });

        assert_eq!(logs.contents().matches("Invalid settings file").count(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
