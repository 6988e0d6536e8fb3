//! # 过近原子对检查
//!
//! 在周期性边界条件下列出距离小于阈值的原子对（含周期像），
//! 用于发现构建结构时重叠的原子。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 的 NeighborsArgs
//! - 使用 `geometry/neighbors.rs`

use crate::cli::analyze::NeighborsArgs;
use crate::commands::require_file;
use crate::error::{Result, VasputilError};
use crate::geometry::{find_close_pairs, ClosePair};
use crate::models::Crystal;
use crate::parsers;
use crate::utils::output;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct PairRow {
    #[tabled(rename = "Atom i")]
    atom_i: String,
    #[tabled(rename = "Atom j")]
    atom_j: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Distance (Å)")]
    distance: String,
}

/// 执行 neighbors 命令
pub fn execute(args: NeighborsArgs) -> Result<()> {
    if args.threshold <= 0.0 {
        return Err(VasputilError::InvalidArgument(format!(
            "Threshold must be positive, got {}",
            args.threshold
        )));
    }

    require_file(&args.input)?;
    let crystal = parsers::parse_structure_file(&args.input)?;
    let pairs = find_close_pairs(&crystal, args.threshold);

    if pairs.is_empty() {
        println!("No atom pairs closer than threshold found.");
        return Ok(());
    }

    output::print_warning(&format!(
        "Found {} suspiciously close atom pair(s) (< {} Å):",
        pairs.len(),
        args.threshold
    ));
    println!("{}", Table::new(pair_rows(&crystal, &pairs)));
    Ok(())
}

fn pair_rows(crystal: &Crystal, pairs: &[ClosePair]) -> Vec<PairRow> {
    let label = |i: usize| format!("{} ({})", i + 1, crystal.atoms[i].element);
    pairs
        .iter()
        .map(|p| PairRow {
            atom_i: label(p.i),
            atom_j: label(p.j),
            image: format!("{} {} {}", p.image[0], p.image[1], p.image[2]),
            distance: format!("{:.3}", p.distance),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    #[test]
    fn test_pair_rows_are_one_based() {
        let crystal = Crystal::new(
            "overlap",
            Lattice::cubic(5.0),
            vec![
                Atom::new("Mo", [0.5, 0.5, 0.5]),
                Atom::new("Se", [0.5, 0.5, 0.6]),
            ],
        );
        let pairs = find_close_pairs(&crystal, 0.8);
        let rows = pair_rows(&crystal, &pairs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].atom_i, "1 (Mo)");
        assert_eq!(rows[0].atom_j, "2 (Se)");
        assert_eq!(rows[0].distance, "0.500");
        assert_eq!(rows[0].image, "0 0 0");
    }
}
