//! # wannier 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/wannier.rs`

use crate::models::Spin;
use crate::wannier::DEFAULT_MARGIN;
use clap::Args;
use std::path::PathBuf;

/// wannier 子命令参数
#[derive(Args, Debug)]
pub struct WannierArgs {
    /// wannier90 input file to update
    #[arg(short, long, default_value = "wannier90.win")]
    pub file: PathBuf,

    /// EIGENVAL file providing band energies
    #[arg(long, default_value = "EIGENVAL")]
    pub eigenval: PathBuf,

    /// Spin channel, required for spin-polarized runs
    #[arg(short, long, value_enum)]
    pub spin: Option<Spin>,

    /// First and last band (1-based) described by the MLWFs; must span num_wann bands
    #[arg(short = 'w', long, num_args = 2, value_names = ["NW1", "NW2"], required = true)]
    pub mlwf: Vec<usize>,

    /// First and last band (1-based) passed to wannier90; must span num_bands bands
    #[arg(short = 'b', long, num_args = 2, value_names = ["NB1", "NB2"], required = true)]
    pub bands: Vec<usize>,

    /// Energy margin added around band edges (eV)
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    pub margin: f64,

    /// Print the windows without rewriting the input file
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
