//! 网络模块

mod connection;

pub use connection::*;
