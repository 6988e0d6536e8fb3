//! # eigwin 子命令 CLI 定义
//!
//! 两种查询模式，二选一：
//! - `-e BAND`: 单条能带的能量范围
//! - `-n E1 E2`: 每个 k 点落在能量窗口内的能带数
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/eigwin.rs`

use crate::models::Spin;
use clap::{ArgGroup, Args};
use std::path::PathBuf;

/// eigwin 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("mode").required(true).args(["band", "window"])))]
pub struct EigwinArgs {
    /// EIGENVAL file
    #[arg(short, long, default_value = "EIGENVAL")]
    pub file: PathBuf,

    /// Band index (1-based) whose energy range over all k-points is printed
    #[arg(short = 'e', long)]
    pub band: Option<usize>,

    /// Energy window E1 E2 in eV; counts bands inside it for every k-point
    #[arg(
        short = 'n',
        long,
        num_args = 2,
        value_names = ["E1", "E2"],
        allow_negative_numbers = true
    )]
    pub window: Option<Vec<f64>>,

    /// Spin channel, required for spin-polarized runs
    #[arg(short, long, value_enum)]
    pub spin: Option<Spin>,

    /// Write the per-k-point band counts to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
