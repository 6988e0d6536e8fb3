//! # analyze 子命令 CLI 定义
//!
//! 结构分析统一入口，包含多个子命令：
//! - `com`: 质量加权质心
//! - `neighbors`: 过近原子对检查
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze/` 相应模块

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// analyze 主命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub command: AnalyzeCommands,
}

/// analyze 子命令
#[derive(Subcommand, Debug)]
pub enum AnalyzeCommands {
    /// Print the mass-weighted centre of mass
    Com(ComArgs),

    /// Report atom pairs closer than a threshold (periodic images included)
    Neighbors(NeighborsArgs),
}

/// com 子命令参数
#[derive(Args, Debug)]
pub struct ComArgs {
    /// Structure file (POSCAR, CONTCAR, CIF or XYZ)
    #[arg(default_value = "POSCAR")]
    pub input: PathBuf,
}

/// neighbors 子命令参数
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Structure file (POSCAR, CONTCAR, CIF or XYZ)
    #[arg(default_value = "POSCAR")]
    pub input: PathBuf,

    /// Distance threshold (Å)
    #[arg(short, long, default_value_t = 0.8)]
    pub threshold: f64,
}
