//! 输入处理
//!
//! 输入源只产生屏幕坐标上的拿起/放下事件，格子换算由同步循环完成。
//! 终端输入在独立线程中逐行读取标准输入，把代数记号换算为格子中心坐标。

use std::io::BufRead;

use chess_protocol::{MoveCodec, Promotion, Side};
use tokio::sync::mpsc;

use crate::board::BoardGeometry;

/// 输入事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// 在屏幕坐标处按下
    PickUp { x: f32, y: f32 },
    /// 在屏幕坐标处松开
    Drop { x: f32, y: f32 },
    /// 选择升变棋子
    Promote(Promotion),
    /// 退出
    Quit,
}

/// 输入源：每帧取出自上一帧以来的全部事件，不阻塞
pub trait InputSource {
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// 按帧预先编排好的输入（测试与回放用）
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// 终端输入
pub struct TerminalInput {
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl TerminalInput {
    /// 启动读取标准输入的线程
    ///
    /// 线程不会被 join：标准输入关闭时发送 Quit 后退出，
    /// 进程结束时随之终止。
    pub fn spawn(perspective: Side, geometry: BoardGeometry) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if !forward_line(&line, perspective, &geometry, &tx) {
                    return;
                }
            }
            let _ = tx.send(InputEvent::Quit);
        });

        Self { rx }
    }
}

/// 解析一行命令并转发事件；接收端已关闭时返回 false
fn forward_line(
    line: &str,
    perspective: Side,
    geometry: &BoardGeometry,
    tx: &mpsc::UnboundedSender<InputEvent>,
) -> bool {
    match parse_command(line, perspective, geometry) {
        Ok(events) => events.into_iter().all(|event| tx.send(event).is_ok()),
        Err(e) => {
            tracing::warn!("Ignoring terminal command: {}", e);
            true
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// 解析一行终端命令
///
/// 支持 `pick e2`、`drop e4`、`move e2e4`（= pick + drop）、`promote q`、`quit`。
/// `drop off` 表示拖出棋盘。
pub fn parse_command(
    line: &str,
    perspective: Side,
    geometry: &BoardGeometry,
) -> Result<Vec<InputEvent>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };
    let arg = words.next();

    let point = |text: &str| -> Result<(f32, f32), String> {
        let square = MoveCodec::decode_square(text, perspective).map_err(|e| e.to_string())?;
        Ok(geometry.center_of(square))
    };

    match (command, arg) {
        ("quit" | "q", None) => Ok(vec![InputEvent::Quit]),
        ("pick", Some(square)) => {
            let (x, y) = point(square)?;
            Ok(vec![InputEvent::PickUp { x, y }])
        }
        ("drop", Some("off")) => Ok(vec![InputEvent::Drop {
            x: geometry.width + 1.0,
            y: geometry.height + 1.0,
        }]),
        ("drop", Some(square)) => {
            let (x, y) = point(square)?;
            Ok(vec![InputEvent::Drop { x, y }])
        }
        ("move", Some(token)) if token.len() == 4 && token.is_ascii() => {
            let (from_x, from_y) = point(&token[..2])?;
            let (to_x, to_y) = point(&token[2..])?;
            Ok(vec![
                InputEvent::PickUp {
                    x: from_x,
                    y: from_y,
                },
                InputEvent::Drop { x: to_x, y: to_y },
            ])
        }
        ("promote", Some(letter)) => {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Promotion::from_letter(c.to_ascii_uppercase())
                    .map(|promotion| vec![InputEvent::Promote(promotion)])
                    .ok_or_else(|| format!("Unknown promotion piece: {}", letter)),
                _ => Err(format!("Unknown promotion piece: {}", letter)),
            }
        }
        _ => Err(format!("Unknown command: {}", line.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use chess_protocol::Square;

    fn square_of(event: &InputEvent, geometry: &BoardGeometry) -> Option<Square> {
        match *event {
            InputEvent::PickUp { x, y } | InputEvent::Drop { x, y } => geometry.square_at(x, y),
            _ => None,
        }
    }

    #[test]
    fn test_move_command() {
        let geometry = BoardGeometry::default();
        let events = parse_command("move e2e4", Side::White, &geometry).unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], InputEvent::PickUp { .. }));
        assert_eq!(square_of(&events[0], &geometry), Some(Square::new_unchecked(6, 4)));
        assert_eq!(square_of(&events[1], &geometry), Some(Square::new_unchecked(4, 4)));
    }

    #[test]
    fn test_black_perspective_flips_rows() {
        let geometry = BoardGeometry::new(400.0, 400.0);
        let events = parse_command("pick e7", Side::Black, &geometry).unwrap();
        assert_eq!(square_of(&events[0], &geometry), Some(Square::new_unchecked(6, 4)));
    }

    #[test]
    fn test_drop_off_board() {
        let geometry = BoardGeometry::default();
        let events = parse_command("drop off", Side::White, &geometry).unwrap();
        assert_eq!(square_of(&events[0], &geometry), None);
    }

    #[test]
    fn test_promote_and_quit() {
        let geometry = BoardGeometry::default();
        assert_eq!(
            parse_command("promote n", Side::White, &geometry).unwrap(),
            vec![InputEvent::Promote(Promotion::Knight)]
        );
        assert_eq!(
            parse_command("quit", Side::White, &geometry).unwrap(),
            vec![InputEvent::Quit]
        );
        assert!(parse_command("", Side::White, &geometry).unwrap().is_empty());
    }

    #[test]
    fn test_bad_commands() {
        let geometry = BoardGeometry::default();
        assert!(parse_command("promote k", Side::White, &geometry).is_err());
        assert!(parse_command("pick z9", Side::White, &geometry).is_err());
        assert!(parse_command("move e2", Side::White, &geometry).is_err());
        assert!(parse_command("castle", Side::White, &geometry).is_err());
    }

    #[test]
    fn test_bad_terminal_command_is_logged() {
        let geometry = BoardGeometry::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (forwarded, logs) =
            capture_logs(|| forward_line("castle", Side::White, &geometry, &tx));
        assert!(forwarded);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Unknown command: castle"));
        assert!(rx.try_recv().is_err());

        assert!(forward_line("move e2e4", Side::White, &geometry, &tx));
        assert!(matches!(rx.try_recv(), Ok(InputEvent::PickUp { .. })));
        assert!(matches!(rx.try_recv(), Ok(InputEvent::Drop { .. })));

        drop(rx);
        assert!(!forward_line("quit", Side::White, &geometry, &tx));
    }

    #[test]
    fn test_scripted_input() {
        let mut input = ScriptedInput::new(vec![vec![InputEvent::Quit]]);
        assert_eq!(input.poll_events(), vec![InputEvent::Quit]);
        assert!(input.poll_events().is_empty());
    }
}
