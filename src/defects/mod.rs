//! # 缺陷计算模块
//!
//! ## 子模块
//! - `vline`: sxdefectalign2d 平面平均势能曲线的读取与绘图
//!
//! ## 依赖关系
//! - 被 `commands/defect/` 使用

pub mod vline;

pub use vline::{generate_vline_plot, parse_vline_file};
