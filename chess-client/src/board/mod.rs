//! 棋盘显示边界
//!
//! 像素渲染不在本仓库内，这里只定义渲染接口、屏幕与格子的换算，
//! 以及一个把棋盘画到终端的文本渲染器。

mod render;

pub use render::*;

use chess_protocol::{Square, BOARD_SIZE};

/// 棋盘几何：棋盘占据屏幕左上角 `width × height` 的区域
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGeometry {
    /// 棋盘宽度
    pub width: f32,
    /// 棋盘高度
    pub height: f32,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self::new(800.0, 800.0)
    }
}

impl BoardGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 单个格子的大小 (宽, 高)
    pub fn cell_size(&self) -> (f32, f32) {
        (self.width / BOARD_SIZE as f32, self.height / BOARD_SIZE as f32)
    }

    /// 将屏幕坐标转换为显示坐标，棋盘外返回 None
    pub fn square_at(&self, x: f32, y: f32) -> Option<Square> {
        let (cell_w, cell_h) = self.cell_size();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / cell_w).floor();
        let row = (y / cell_h).floor();
        if row >= BOARD_SIZE as f32 || col >= BOARD_SIZE as f32 {
            return None;
        }
        Square::new(row as u8, col as u8)
    }

    /// 格子中心的屏幕坐标
    pub fn center_of(&self, square: Square) -> (f32, f32) {
        let (cell_w, cell_h) = self.cell_size();
        (
            (square.col() as f32 + 0.5) * cell_w,
            (square.row() as f32 + 0.5) * cell_h,
        )
    }
}
