//! # vasputil - VASP 工作流辅助工具箱
//!
//! 将日常 VASP 计算中零散的辅助脚本用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `grad`    - OUTCAR 弛豫过程监视
//! - `eigwin`  - EIGENVAL 能带能量范围与窗口内能带数
//! - `wannier` - wannier90 disentanglement 窗口生成
//! - `convert` - 结构格式转换 (XYZ, CIF, POSCAR)
//! - `defect`  - 缺陷工具
//!   - `vacancy` - 不等价空位结构生成
//!   - `sxalign` - sxdefectalign2d 迭代对齐与绘图
//! - `analyze` - 结构分析
//!   - `com`       - 质心
//!   - `neighbors` - 过近原子对检查
//! - `dimer`   - 改进二聚体方法输入生成
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (格式解析器)
//!   │     ├── models/    (数据模型)
//!   │     ├── geometry/  (近邻与格点分类)
//!   │     ├── wannier/   (能量窗口)
//!   │     ├── defects/   (势能曲线)
//!   │     └── batch/     (批量处理)
//!   ├── utils/      (输出与进度条)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod defects;
mod error;
mod geometry;
mod models;
mod parsers;
mod utils;
mod wannier;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
