//! # 几何分析模块
//!
//! 周期性边界条件下的近邻搜索与格点环境分类。
//!
//! ## 子模块
//! - `neighbors`: 近邻搜索、过近原子对
//! - `sites`: 按局部环境划分等价格点
//!
//! ## 依赖关系
//! - 被 `commands/analyze/neighbors.rs`, `commands/defect/vacancy.rs` 使用
//! - 使用 `models/structure.rs`

pub mod neighbors;
pub mod sites;

pub use neighbors::{find_close_pairs, ClosePair};
pub use sites::{classify_sites, SiteClass};
