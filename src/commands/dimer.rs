//! # dimer 命令实现
//!
//! 为 VASP 改进二聚体方法 (IBRION=44) 生成 POSCAR：
//! 写出弛豫前结构，并在末尾追加最大虚频模式的位移作为二聚体轴。
//!
//! ## 依赖关系
//! - 使用 `cli/dimer.rs` 定义的参数
//! - 使用 `parsers/poscar.rs`, `parsers/outcar.rs`

use crate::cli::dimer::DimerArgs;
use crate::commands::{read_text, write_text};
use crate::error::{Result, VasputilError};
use crate::models::{Crystal, VibrationMode};
use crate::parsers::outcar::parse_vibration_modes;
use crate::parsers::poscar::{parse_poscar_file, to_poscar_string, CoordinateMode};
use crate::utils::output;

const WORKFLOW_GUIDE: &str = "\
Improved Dimer Method - general calculation steps:
1) Run a CI-NEB calculation with 5-10 images to find the structure closest to the TS.
2) Run a frequency calculation on the selected structure:
   - Fix all slab atoms
   - Use a 1x1x1 k-mesh
   - Use vasp_gam
   Settings:
   NSW    = 1
   IBRION = 5
   POTIM  = 0.015
   EDIFF  = 1E-7
   NFREE  = 2
   NWRITE = 3   # must be 3
3) Copy the POSCAR with the slab atoms not frozen to POSCAR_relax and run
   `vasputil dimer`.
4) Use POSCAR_dimer for the IDM calculation:
   Use the original KPOINTS.
   NSW    = 500
   IBRION = 44   # dimer method as optimization engine
   POTIM  = 0.05";

/// 执行 dimer 命令
pub fn execute(args: DimerArgs) -> Result<()> {
    if !args.quiet {
        output::print_header("Improved Dimer Method");
        println!("{}\n", WORKFLOW_GUIDE);
    }

    if !args.relaxed.is_file() {
        return Err(VasputilError::MissingInput {
            path: args.relaxed.display().to_string(),
            purpose: "it should be the slab structure from before the frequency calculation, \
                      with the slab atoms not fixed"
                .to_string(),
        });
    }
    if !args.outcar.is_file() {
        return Err(VasputilError::MissingInput {
            path: args.outcar.display().to_string(),
            purpose: "the OUTCAR of the frequency calculation is needed".to_string(),
        });
    }

    let crystal = parse_poscar_file(&args.relaxed)?;
    crystal.require_species(&args.relaxed.display().to_string())?;
    let outcar_path = args.outcar.display().to_string();
    let modes = parse_vibration_modes(&read_text(&args.outcar)?, &outcar_path)?;
    let mode = pick_dimer_mode(&modes, &outcar_path)?;

    output::print_info(&format!(
        "Dimer axis from mode {} (f/i = {:.4} cm-1)",
        mode.index, mode.wavenumber
    ));

    let content = dimer_poscar(&crystal, mode, &outcar_path)?;
    write_text(&args.output, &content)?;

    output::print_done(&format!(
        "Output written to '{}'. Rename it to POSCAR before running the dimer job.",
        args.output.display()
    ));
    Ok(())
}

/// 最大波数的虚频模式
fn pick_dimer_mode<'a>(modes: &'a [VibrationMode], path: &str) -> Result<&'a VibrationMode> {
    modes
        .iter()
        .filter(|m| m.imaginary)
        .max_by(|a, b| a.wavenumber.total_cmp(&b.wavenumber))
        .ok_or_else(|| VasputilError::NoImaginaryMode {
            path: path.to_string(),
        })
}

/// POSCAR 正文 + `! Dimer Axis Block`
///
/// 写出时原子按元素分组，位移行按相同顺序排列。
fn dimer_poscar(crystal: &Crystal, mode: &VibrationMode, path: &str) -> Result<String> {
    let natoms = crystal.atoms.len();
    if mode.displacements.len() < natoms {
        return Err(VasputilError::parse(
            "outcar",
            path,
            format!(
                "Mode {} has {} displacement rows, structure has {} atoms",
                mode.index,
                mode.displacements.len(),
                natoms
            ),
        ));
    }

    let mut content = to_poscar_string(crystal, CoordinateMode::Cartesian);
    content.push_str("  ! Dimer Axis Block\n");

    for (element, _) in crystal.species() {
        for (i, _) in crystal
            .atoms
            .iter()
            .enumerate()
            .filter(|(_, a)| a.element == element)
        {
            let d = mode.displacements[i];
            content.push_str(&format!("  {:12.6}  {:12.6}  {:12.6}\n", d[0], d[1], d[2]));
        }
    }

    Ok(content)
}
