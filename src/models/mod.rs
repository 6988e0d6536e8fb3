//! # 数据模型模块
//!
//! 定义晶体结构、能带本征值和 OUTCAR 计算过程的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `commands/` 使用
//! - 子模块: structure, calculation, bands, elements

pub mod bands;
pub mod calculation;
pub mod elements;
pub mod structure;

pub use bands::{Eigenval, KPoint, Spin};
pub use calculation::{IonicStep, RunParameters, VibrationMode};
pub use structure::{Atom, CenterOfMass, Crystal, Lattice};
