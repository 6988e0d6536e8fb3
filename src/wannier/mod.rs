//! # Wannier 能量窗口模块
//!
//! 根据 EIGENVAL 能带能量计算 wannier90 的 disentanglement 窗口。
//!
//! ## 依赖关系
//! - 被 `commands/wannier.rs` 使用
//! - 使用 `models/bands.rs`

pub mod window;

pub use window::{check_band_range, DisentanglementWindow, DEFAULT_MARGIN};
