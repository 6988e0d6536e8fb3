//! # grad 子命令 CLI 定义
//!
//! 逐离子步汇总 OUTCAR 中的能量、受力与耗时。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/grad.rs`

use clap::Args;
use std::path::PathBuf;

/// grad 子命令参数
#[derive(Args, Debug)]
pub struct GradArgs {
    /// OUTCAR of the running or finished relaxation
    #[arg(default_value = "OUTCAR")]
    pub outcar: PathBuf,

    /// POSCAR providing selective-dynamics flags (default: POSCAR next to the OUTCAR)
    #[arg(short, long)]
    pub poscar: Option<PathBuf>,

    /// Also write the ionic steps to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print run parameters and the relaxed-atom count before the table
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
