use anyhow::{Context, Result};
use chess_client::board::TextRenderer;
use chess_client::game::TerminalInput;
use chess_client::settings::LogLevel;
use chess_client::{logging, negotiate, ClientSettings, LoopConfig, SyncLoop};
use chess_protocol::{Connector, ProtocolError, Side, TcpConnector};
use clap::Parser;
use tracing::{error, info};

/// 国际象棋网络客户端
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// 服务端地址
    #[arg(long)]
    host: Option<String>,

    /// 服务端端口
    #[arg(long)]
    port: Option<u16>,

    /// 服务端允许任选时希望执的一方（white / black）
    #[arg(long, value_parser = parse_side)]
    side: Option<Side>,

    /// 拿起棋子时不查询合法落点
    #[arg(long)]
    no_query: bool,

    /// 日志级别（error / warn / info / debug / trace）
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// 把合并后的设置写回设置文件
    #[arg(long)]
    save_settings: bool,
}

fn parse_side(text: &str) -> std::result::Result<Side, String> {
    Side::from_code(text).ok_or_else(|| format!("expected white or black, got {}", text))
}

impl Args {
    /// 命令行参数覆盖设置文件
    fn apply(self, settings: &mut ClientSettings) {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if self.side.is_some() {
            settings.preferred_side = self.side;
        }
        if self.no_query {
            settings.query_legal_moves = false;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let save_settings = args.save_settings;

    // 先安装日志再读设置文件，设置文件里的级别随后生效；命令行级别优先
    let log = logging::init(args.log_level.unwrap_or_default())?;
    let mut settings = ClientSettings::load();
    args.apply(&mut settings);
    log.set_level(settings.log_level)?;

    if save_settings {
        settings.save()?;
    }

    if let Err(e) = run(settings).await {
        match e.downcast_ref::<ProtocolError>() {
            Some(protocol_error) => error!("{:?} error: {:#}", protocol_error.kind(), e),
            None => error!("{:#}", e),
        }
        return Err(e);
    }
    Ok(())
}

async fn run(settings: ClientSettings) -> Result<()> {
    let addr = settings.network().addr();
    info!("Connecting to {}", addr);

    let mut conn = TcpConnector
        .connect(&addr)
        .await
        .with_context(|| format!("Cannot connect to {}", addr))?;

    let (session, board) = negotiate(&mut conn, settings.preferred_side)
        .await
        .context("Handshake failed")?;

    let geometry = settings.geometry();
    let input = TerminalInput::spawn(board.perspective(), geometry);
    let renderer = TextRenderer::new(std::io::stdout());
    let config = LoopConfig {
        geometry,
        poll_timeout: settings.poll_timeout(),
        frame_period: settings.frame_period(),
        query_legal_moves: settings.query_legal_moves,
    };

    let mut sync = SyncLoop::new(conn, session, board, input, renderer, config);
    match sync.run().await.context("Connection to server failed")? {
        Some(result) => info!("Final result: {}", result),
        None => info!("Left before the game ended"),
    }
    Ok(())
}
