//! # 质心计算
//!
//! 按标准原子质量加权，坐标不做周期性回折。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 的 ComArgs
//! - 使用 `models/structure.rs`, `models/elements.rs`

use crate::cli::analyze::ComArgs;
use crate::commands::require_file;
use crate::error::Result;
use crate::models::CenterOfMass;
use crate::parsers;
use crate::utils::output;

/// 执行 com 命令
pub fn execute(args: ComArgs) -> Result<()> {
    require_file(&args.input)?;
    let crystal = parsers::parse_structure_file(&args.input)?;
    crystal.require_species(&args.input.display().to_string())?;
    let com = crystal.center_of_mass()?;

    output::print_info(&format!(
        "{}: {} atoms, total mass {:.4} amu",
        crystal.formula(),
        crystal.atoms.len(),
        com.total_mass
    ));
    println!("{}", format_fractional(&com));
    println!("{}", format_cartesian(&com));
    Ok(())
}

fn format_fractional(com: &CenterOfMass) -> String {
    let f = com.fractional;
    format!(
        "Center of mass (fractional): [{:.8}, {:.8}, {:.8}]",
        f[0], f[1], f[2]
    )
}

fn format_cartesian(com: &CenterOfMass) -> String {
    let c = com.cartesian;
    format!(
        "Center of mass (Cartesian, Å): [{:.6}, {:.6}, {:.6}]",
        c[0], c[1], c[2]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Crystal, Lattice};

    #[test]
    fn test_format_center_of_mass() {
        let crystal = Crystal::new(
            "H2",
            Lattice::cubic(10.0),
            vec![Atom::new("H", [0.2, 0.5, 0.5]), Atom::new("H", [0.4, 0.5, 0.5])],
        );
        let com = crystal.center_of_mass().unwrap();
        assert_eq!(
            format_fractional(&com),
            "Center of mass (fractional): [0.30000000, 0.50000000, 0.50000000]"
        );
        assert!(format_cartesian(&com).contains("[3.000000, 5.000000, 5.000000]"));
    }

    #[test]
    fn test_vasp4_species_reported() {
        let dir = std::env::temp_dir().join("vasputil_com_vasp4");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("POSCAR");
        std::fs::write(
            &input,
            "h2\n1.0\n10 0 0\n0 10 0\n0 0 10\n2\nDirect\n0.2 0.5 0.5\n0.4 0.5 0.5\n",
        )
        .unwrap();

        assert!(matches!(
            execute(ComArgs { input }),
            Err(crate::error::VasputilError::UnknownSpecies { .. })
        ));
    }
}
