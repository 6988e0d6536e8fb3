//! # defect 子命令 CLI 定义
//!
//! 缺陷工具统一入口，包含多个子命令：
//! - `vacancy`: 生成不等价空位结构
//! - `sxalign`: 迭代运行 sxdefectalign2d 并绘制势能曲线
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/defect/` 相应模块

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Defect 主命令
// ─────────────────────────────────────────────────────────────

/// defect 主命令参数
#[derive(Args, Debug)]
pub struct DefectArgs {
    #[command(subcommand)]
    pub command: DefectCommands,
}

/// defect 子命令
#[derive(Subcommand, Debug)]
pub enum DefectCommands {
    /// Generate one vacancy structure per inequivalent site of an element
    Vacancy(VacancyArgs),

    /// Run sxdefectalign2d over a range of shifts and plot the potential lines
    Sxalign(SxalignArgs),
}

// ─────────────────────────────────────────────────────────────
// 空位生成
// ─────────────────────────────────────────────────────────────

/// vacancy 子命令参数
#[derive(Args, Debug)]
pub struct VacancyArgs {
    /// Host supercell (CIF or POSCAR)
    #[arg(default_value = "SUPERCELL_333.cif")]
    pub input: PathBuf,

    /// Element to remove
    #[arg(short, long, default_value = "O")]
    pub element: String,

    /// Distance tolerance (Å) when comparing site environments
    #[arg(long, default_value_t = 0.1)]
    pub symprec: f64,

    /// Radius (Å) of the environment compared between sites
    #[arg(long, default_value_t = 6.0)]
    pub radius: f64,

    /// Output directory (default: <element>_vacancies)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// sxdefectalign2d
// ─────────────────────────────────────────────────────────────

/// sxalign 子命令参数
#[derive(Args, Debug)]
pub struct SxalignArgs {
    /// Plane-wave cutoff in Ry
    #[arg(long, env = "VASPUTIL_ECUT", default_value_t = 36.75)]
    pub ecut: f64,

    /// LOCPOT of the defective cell
    #[arg(long, default_value = "./LOCPOT")]
    pub vdef: PathBuf,

    /// LOCPOT of the pristine reference cell
    #[arg(long, env = "VASPUTIL_VREF")]
    pub vref: PathBuf,

    /// Shift range START STOP STEP (STOP excluded)
    #[arg(
        long,
        num_args = 3,
        value_names = ["START", "STOP", "STEP"],
        default_values_t = [6.0, 9.0, 1.0],
        allow_negative_numbers = true
    )]
    pub shifts: Vec<f64>,

    /// Directory for plots and copies of vline-eV.dat
    #[arg(long, default_value = "figs")]
    pub figs: PathBuf,

    /// sxdefectalign2d executable
    #[arg(long, env = "VASPUTIL_SXDEFECTALIGN2D", default_value = "sxdefectalign2d")]
    pub program: String,

    /// Extra arguments passed to sxdefectalign2d
    #[arg(long, allow_hyphen_values = true, num_args = 1..)]
    pub extra: Vec<String>,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 700)]
    pub height: u32,
}
