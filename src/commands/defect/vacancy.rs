//! # 空位生成
//!
//! 将目标元素的格点按局部环境分为等价类，每类移除代表格点，
//! 输出一个 POSCAR（分数坐标）。
//!
//! ## 依赖关系
//! - 使用 `cli/defect.rs` 的 VacancyArgs
//! - 使用 `geometry/sites.rs`, `parsers/`
//! - 使用 `tabled` 打印等价类表格

use crate::cli::defect::VacancyArgs;
use crate::commands::{ensure_dir, require_file, write_text};
use crate::error::{Result, VasputilError};
use crate::geometry::{classify_sites, SiteClass};
use crate::models::Crystal;
use crate::parsers;
use crate::parsers::poscar::{to_poscar_string, CoordinateMode};
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct ClassRow {
    #[tabled(rename = "Class")]
    class: usize,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Multiplicity")]
    multiplicity: usize,
    #[tabled(rename = "File")]
    file: String,
}

/// 执行 vacancy 命令
pub fn execute(args: VacancyArgs) -> Result<()> {
    if args.radius <= 0.0 || args.symprec < 0.0 {
        return Err(VasputilError::InvalidArgument(format!(
            "--radius must be positive and --symprec non-negative (got {} and {})",
            args.radius, args.symprec
        )));
    }

    require_file(&args.input)?;
    output::print_info(&format!("Reading structure from: {}", args.input.display()));
    let crystal = parsers::parse_structure_file(&args.input)?;
    crystal.require_species(&args.input.display().to_string())?;
    output::print_info(&format!(
        "Structure loaded: {} atoms, {} unique elements ({})",
        crystal.atoms.len(),
        crystal.species().len(),
        crystal.formula()
    ));

    let element = args.element.as_str();
    if !crystal.atoms.iter().any(|a| a.element == element) {
        return Err(VasputilError::ElementNotPresent {
            element: element.to_string(),
            path: args.input.display().to_string(),
        });
    }

    let classes = classify_sites(&crystal, element, args.radius, args.symprec);
    output::print_info(&format!(
        "Found {} inequivalent {} vacancy configuration(s)",
        classes.len(),
        element
    ));

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_vacancies", element)));
    ensure_dir(&output_dir)?;

    let rows = write_vacancies(&crystal, element, &classes, &output_dir)?;

    output::print_header(&format!("{} vacancy classes", element));
    println!("{}", Table::new(&rows));

    output::print_done(&format!(
        "Vacancy structures written to '{}'",
        output_dir.display()
    ));
    Ok(())
}

fn write_vacancies(
    crystal: &Crystal,
    element: &str,
    classes: &[SiteClass],
    output_dir: &Path,
) -> Result<Vec<ClassRow>> {
    let mut rows = Vec::with_capacity(classes.len());

    for (i, class) in classes.iter().enumerate() {
        let mut defect = crystal.without_atom(class.representative);
        defect.name = format!(
            "{} with {} vacancy at site {}",
            crystal.formula(),
            element,
            class.representative + 1
        );

        let path = output_dir.join(format!("{}vac_{}.vasp", element, i));
        write_text(&path, &to_poscar_string(&defect, CoordinateMode::Direct))?;

        rows.push(ClassRow {
            class: i,
            site: format!("{}{}", element, class.representative + 1),
            multiplicity: class.multiplicity(),
            file: path.display().to_string(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};
    use crate::parsers::poscar::parse_poscar_content;
    use std::fs;

    fn perovskite() -> Crystal {
        // SrTiO3 立方钙钛矿，三个 O 等价
        Crystal::new(
            "SrTiO3",
            Lattice::cubic(3.905),
            vec![
                Atom::new("Sr", [0.0, 0.0, 0.0]),
                Atom::new("Ti", [0.5, 0.5, 0.5]),
                Atom::new("O", [0.5, 0.5, 0.0]),
                Atom::new("O", [0.5, 0.0, 0.5]),
                Atom::new("O", [0.0, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_vacancy_files() {
        let crystal = perovskite();
        let classes = classify_sites(&crystal, "O", 5.0, 0.1);
        assert_eq!(classes.len(), 1);

        let dir = std::env::temp_dir().join("vasputil_vacancy_files");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let rows = write_vacancies(&crystal, "O", &classes, &dir).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].multiplicity, 3);
        assert_eq!(rows[0].site, "O3");

        let text = fs::read_to_string(dir.join("Ovac_0.vasp")).unwrap();
        assert!(text.contains("Direct"));
        let defect = parse_poscar_content(&text, "Ovac_0").unwrap();
        assert_eq!(defect.atoms.len(), 4);
        assert_eq!(defect.species().last(), Some(&("O".to_string(), 2)));
    }

    #[test]
    fn test_vasp4_input_is_rejected() {
        let dir = std::env::temp_dir().join("vasputil_vacancy_vasp4");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("POSCAR");
        fs::write(&input, "vasp4\n1.0\n3.905 0.0 0.0\n0.0 3.905 0.0\n0.0 0.0 3.905\n1 1 3\nDirect\n0.0 0.0 0.0\n0.5 0.5 0.5\n0.5 0.5 0.0\n0.5 0.0 0.5\n0.0 0.5 0.5\n").unwrap();

        let args = VacancyArgs {
            input,
            element: "X3".to_string(),
            symprec: 0.1,
            radius: 6.0,
            output: Some(dir.join("out")),
        };
        assert!(matches!(
            execute(args),
            Err(VasputilError::UnknownSpecies { .. })
        ));
        assert!(!dir.join("out").exists());
    }

    #[test]
    fn test_missing_element_is_error() {
        let dir = std::env::temp_dir().join("vasputil_vacancy_missing");
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("POSCAR");
        fs::write(&input, to_poscar_string(&perovskite(), CoordinateMode::Direct)).unwrap();

        let args = VacancyArgs {
            input,
            element: "N".to_string(),
            symprec: 0.1,
            radius: 6.0,
            output: Some(dir.join("out")),
        };
        assert!(matches!(
            execute(args),
            Err(VasputilError::ElementNotPresent { .. })
        ));
    }
}
