//! # convert 子命令 CLI 定义
//!
//! 批量转换结构文件格式 (XYZ/CIF/POSCAR -> POSCAR/XYZ/CIF)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 支持的输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// VASP POSCAR format
    Poscar,
    /// XYZ format (cell kept in the comment line)
    Xyz,
    /// Crystallographic Information File (P1)
    Cif,
}

impl OutputFormat {
    /// 输出文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Poscar => "POSCAR",
            OutputFormat::Xyz => "xyz",
            OutputFormat::Cif => "cif",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Poscar => write!(f, "poscar"),
            OutputFormat::Xyz => write!(f, "xyz"),
            OutputFormat::Cif => write!(f, "cif"),
        }
    }
}

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file or directory containing structure files
    #[arg(short, long, default_value = ".")]
    pub input: PathBuf,

    /// Output directory for converted files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Target output format
    #[arg(short, long, value_enum, default_value = "poscar")]
    pub target: OutputFormat,

    /// Glob patterns for input files, comma-separated (e.g. "*.xyz,*.cif")
    #[arg(short, long, default_value = "*.xyz")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Cell for XYZ input as 9 comma-separated numbers "ax,ay,az,bx,by,bz,cx,cy,cz" (Å)
    #[arg(long = "box", value_name = "CELL", allow_hyphen_values = true)]
    pub cell: Option<String>,

    /// Move the geometric centre of the atoms to the centre of the cell
    #[arg(long, default_value_t = false)]
    pub center: bool,

    /// Write POSCAR coordinates as Direct (fractional) instead of Cartesian
    #[arg(long, default_value_t = false)]
    pub direct: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
