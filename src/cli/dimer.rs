//! # dimer 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/dimer.rs`

use clap::Args;
use std::path::PathBuf;

/// dimer 子命令参数
#[derive(Args, Debug)]
pub struct DimerArgs {
    /// Structure before the frequency run, with the slab atoms not frozen
    #[arg(long, default_value = "POSCAR_relax")]
    pub relaxed: PathBuf,

    /// OUTCAR of the frequency run (IBRION=5, NWRITE=3)
    #[arg(long, default_value = "OUTCAR")]
    pub outcar: PathBuf,

    /// Output POSCAR with the dimer axis block
    #[arg(short, long, default_value = "POSCAR_dimer")]
    pub output: PathBuf,

    /// Do not print the workflow guide
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}
