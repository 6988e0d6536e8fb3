//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `grad`: OUTCAR 弛豫过程监视
//! - `eigwin`: EIGENVAL 能带窗口查询
//! - `wannier`: wannier90 disentanglement 窗口生成
//! - `convert`: 结构格式转换
//! - `defect`: 缺陷工具（嵌套子命令）
//!   - `vacancy`: 生成不等价空位
//!   - `sxalign`: sxdefectalign2d 迭代对齐
//! - `analyze`: 结构分析（嵌套子命令）
//!   - `com`: 质心
//!   - `neighbors`: 过近原子对检查
//! - `dimer`: 改进二聚体方法输入生成
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: grad, eigwin, wannier, convert, defect, analyze, dimer

pub mod analyze;
pub mod convert;
pub mod defect;
pub mod dimer;
pub mod eigwin;
pub mod grad;
pub mod wannier;

use clap::{Parser, Subcommand};

/// vasputil - VASP 工作流辅助工具箱
#[derive(Parser)]
#[command(name = "vasputil")]
#[command(version)]
#[command(about = "A toolkit for everyday VASP workflows", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Monitor a relaxation: energy, forces and timing per ionic step from OUTCAR
    Grad(grad::GradArgs),

    /// Query band energies and band counts in an energy window from EIGENVAL
    Eigwin(eigwin::EigwinArgs),

    /// Write wannier90 disentanglement windows computed from EIGENVAL
    Wannier(wannier::WannierArgs),

    /// Convert structure files between formats (XYZ, CIF, POSCAR)
    Convert(convert::ConvertArgs),

    /// Point-defect tools
    Defect(defect::DefectArgs),

    /// Analyze a structure
    Analyze(analyze::AnalyzeArgs),

    /// Prepare a POSCAR with the dimer axis for the improved dimer method
    Dimer(dimer::DimerArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_nested_subcommands_parse() {
        let cli = Cli::try_parse_from(["vasputil", "analyze", "neighbors", "CONTCAR", "-t", "1.2"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => match args.command {
                analyze::AnalyzeCommands::Neighbors(n) => {
                    assert_eq!(n.threshold, 1.2);
                    assert_eq!(n.input.to_str(), Some("CONTCAR"));
                }
                _ => panic!("expected neighbors"),
            },
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_eigwin_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["vasputil", "eigwin", "-e", "3", "-n", "-1", "1"]).is_err());
        assert!(Cli::try_parse_from(["vasputil", "eigwin"]).is_err());
        assert!(Cli::try_parse_from(["vasputil", "eigwin", "-n", "-1.5", "2"]).is_ok());
    }
}
