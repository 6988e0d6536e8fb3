//! # convert 命令实现
//!
//! 批量转换结构文件格式。
//!
//! ## 功能
//! - 读取 XYZ / CIF / POSCAR
//! - 转换为 POSCAR, XYZ, CIF 格式
//! - XYZ 输入的盒子：`--box` > 注释行中的方括号 > 100 Å 立方盒
//! - 写 POSCAR 前按元素稳定排序，默认笛卡尔坐标
//! - 支持并行处理
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/`, `parsers/`, `models/`
//! - 使用 `utils/output.rs`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::convert::{ConvertArgs, OutputFormat};
use crate::commands::ensure_dir;
use crate::error::{Result, VasputilError};
use crate::models::Crystal;
use crate::parsers;
use crate::parsers::cif::to_cif_string;
use crate::parsers::poscar::{to_poscar_string, CoordinateMode};
use crate::parsers::xyz::{self, to_xyz_string, BoxSource};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 单个文件的转换选项
struct ConvertOptions {
    output_dir: PathBuf,
    target: OutputFormat,
    cell: Option<[[f64; 3]; 3]>,
    center: bool,
    mode: CoordinateMode,
    overwrite: bool,
}

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header(&format!("Converting to {} format", args.target));

    if !args.input.exists() {
        return Err(VasputilError::DirectoryNotFound {
            path: args.input.display().to_string(),
        });
    }

    let cell = match &args.cell {
        Some(text) => Some(xyz::parse_box(text).ok_or_else(|| {
            VasputilError::InvalidArgument(format!(
                "--box expects 9 comma-separated numbers, got '{}'",
                text
            ))
        })?),
        None => None,
    };

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    ensure_dir(&args.output)?;

    let options = ConvertOptions {
        output_dir: args.output.clone(),
        target: args.target,
        cell,
        center: args.center,
        mode: if args.direct {
            CoordinateMode::Direct
        } else {
            CoordinateMode::Cartesian
        },
        overwrite: args.overwrite,
    };

    if files.len() == 1 {
        return convert_single(&files[0], &options);
    }

    output::print_info(&format!("Found {} files to convert", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, "Converting", |file| {
        match convert_file(file, &options) {
            Ok(Some(out)) => ProcessResult::Success(out.display().to_string()),
            Ok(None) => ProcessResult::Skipped(file.display().to_string()),
            Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
        }
    });

    result.report(10);
    Ok(())
}

fn convert_single(file: &Path, options: &ConvertOptions) -> Result<()> {
    match convert_file(file, options)? {
        Some(out) => output::print_conversion(&file.display().to_string(), &out.display().to_string()),
        None => output::print_skip(&format!(
            "{} (output exists, use --overwrite)",
            output_path(file, options).display()
        )),
    }
    Ok(())
}

fn output_path(input: &Path, options: &ConvertOptions) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure");
    options
        .output_dir
        .join(format!("{}.{}", stem, options.target.extension()))
}

/// 转换单个文件；输出已存在且不覆盖时返回 None
fn convert_file(input: &Path, options: &ConvertOptions) -> Result<Option<PathBuf>> {
    let out = output_path(input, options);
    if out.exists() && !options.overwrite {
        return Ok(None);
    }

    let mut crystal = read_structure(input, options.cell)?;
    if options.center {
        crystal.center_in_cell();
    }

    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("structure");

    let content = render(&mut crystal, file_name, options);
    fs::write(&out, content).map_err(|e| VasputilError::FileWriteError {
        path: out.display().to_string(),
        source: e,
    })?;

    Ok(Some(out))
}

fn read_structure(input: &Path, cell: Option<[[f64; 3]; 3]>) -> Result<Crystal> {
    let is_xyz = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("xyz"))
        .unwrap_or(false);
    let crystal = if is_xyz {
        let parsed = xyz::parse_xyz_file(input, cell)?;
        if parsed.malformed_box && parsed.box_source == BoxSource::Default {
            output::print_warning(&format!(
                "{}: malformed cell in comment line, using a {} Å cube",
                input.display(),
                xyz::DEFAULT_BOX_EDGE
            ));
        }
        parsed.crystal
    } else {
        parsers::parse_structure_file(input)?
    };

    crystal.require_species(&input.display().to_string())?;
    Ok(crystal)
}

fn render(crystal: &mut Crystal, file_name: &str, options: &ConvertOptions) -> String {
    match options.target {
        OutputFormat::Poscar => {
            crystal.sort_by_element();
            crystal.name = format!("Input file generated from {}", file_name);
            to_poscar_string(crystal, options.mode)
        }
        OutputFormat::Xyz => to_xyz_string(crystal),
        OutputFormat::Cif => to_cif_string(crystal),
    }
}
