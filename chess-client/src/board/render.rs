//! 渲染接口与文本渲染器

use std::fmt::Write as _;
use std::io;

use chess_protocol::{Board, MoveCodec, Square, BOARD_SIZE};

use crate::game::PossibleMoves;
use crate::session::{Role, Session};

/// 每帧交给渲染器的只读视图
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub board: &'a Board,
    pub session: &'a Session,
    /// 正在拖动的棋子起点
    pub dragging: Option<Square>,
    /// 等待选择升变的目标格
    pub promotion: Option<Square>,
    /// 服务端给出的合法落点
    pub possible_moves: Option<&'a PossibleMoves>,
    /// 是否有已发送但未确认的走法
    pub awaiting_confirmation: bool,
}

/// 渲染器
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> io::Result<()>;
}

/// 不输出任何内容的渲染器
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// 文本渲染器：画面变化时才输出
pub struct TextRenderer<W> {
    out: W,
    last: Option<String>,
}

impl<W: io::Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// 将一帧画成文本
    pub fn draw(frame: &Frame<'_>) -> String {
        let perspective = frame.board.perspective();
        let mut text = String::new();

        text.push_str("\n    a b c d e f g h\n");
        for row in 0..BOARD_SIZE as u8 {
            let rank = MoveCodec::encode_square(Square::new_unchecked(row, 0), perspective);
            let _ = write!(text, " {} ", &rank[1..]);

            for col in 0..BOARD_SIZE as u8 {
                let sq = Square::new_unchecked(row, col);
                let marker = if frame.dragging == Some(sq) {
                    '['
                } else if frame
                    .possible_moves
                    .map_or(false, |moves| moves.destinations.contains(&sq))
                {
                    '*'
                } else {
                    ' '
                };
                let cell = frame.board.get(sq).map_or('.', |piece| piece.symbol());
                text.push(marker);
                text.push(cell);
            }
            text.push('\n');
        }

        let _ = writeln!(text, "\n  {}", Self::status_line(frame));
        text
    }

    fn status_line(frame: &Frame<'_>) -> String {
        let session = frame.session;

        if let Some(result) = session.result {
            return format!("Game over: {}", result);
        }
        if frame.promotion.is_some() {
            return "Choose promotion: q / r / b / n".to_string();
        }

        let mut status = match session.role {
            Role::Observer => "Observing".to_string(),
            Role::Player(_) if frame.awaiting_confirmation => "Waiting for confirmation".to_string(),
            Role::Player(_) if session.my_turn => "Your move".to_string(),
            Role::Player(_) => "Opponent's move".to_string(),
        };
        if session.in_check {
            status.push_str(" (check)");
        }
        if session.opponent_in_check {
            status.push_str(" (opponent in check)");
        }
        status
    }
}

impl<W: io::Write> Renderer for TextRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let text = Self::draw(frame);
        if self.last.as_deref() == Some(text.as_str()) {
            return Ok(());
        }

        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        self.last = Some(text);
        Ok(())
    }
}
