//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示，POSCAR / XYZ / CIF 解析后都落到这里，
//! 再由各写出函数转换为目标格式。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`geometry/` 和 `commands/` 使用
//! - 使用 `models/elements.rs` 查询原子质量

use crate::error::{Result, VasputilError};
use crate::models::elements;
use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let cos_gamma = gamma.to_radians().cos();
        let sin_gamma = gamma.to_radians().sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 立方盒子
    pub fn cubic(a: f64) -> Self {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积（带符号的行列式）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        dot(a, cross(b, c))
    }

    /// 晶格矩阵的逆，奇异时返回 None
    pub fn inverse(&self) -> Option<[[f64; 3]; 3]> {
        let m = self.matrix;
        let det = self.volume();
        if det.abs() < 1e-10 {
            return None;
        }

        Some([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ])
    }

    /// 分数坐标转笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标；晶格奇异时原样返回
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> [f64; 3] {
        match self.inverse() {
            // r_frac = r_cart · M⁻¹
            Some(inv) => [
                cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
                cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
                cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
            ],
            None => cart,
        }
    }

    /// 三组相对晶面间距 (Å)，用于确定周期像的搜索范围
    pub fn heights(&self) -> [f64; 3] {
        let [a, b, c] = self.matrix;
        let vol = self.volume().abs();
        [
            vol / norm(cross(b, c)),
            vol / norm(cross(c, a)),
            vol / norm(cross(a, b)),
        ]
    }
}

/// 原子信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],

    /// 可选：原子标签（CIF 中的 site label）
    pub label: Option<String>,

    /// 可选：Selective dynamics 标记，true 表示该方向可弛豫
    pub selective: Option<[bool; 3]>,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
            label: None,
            selective: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_selective(mut self, flags: [bool; 3]) -> Self {
        self.selective = Some(flags);
        self
    }
}

/// 质心（分数坐标与笛卡尔坐标）
#[derive(Debug, Clone, Copy)]
pub struct CenterOfMass {
    pub fractional: [f64; 3],
    pub cartesian: [f64; 3],
    pub total_mass: f64,
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称（POSCAR 注释行）
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,

    /// 来源文件格式
    pub source_format: Option<String>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            source_format: None,
        }
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        self.species()
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 元素及其原子数，按首次出现的顺序
    pub fn species(&self) -> Vec<(String, usize)> {
        let mut species: Vec<(String, usize)> = Vec::new();
        for atom in &self.atoms {
            match species.iter_mut().find(|(el, _)| *el == atom.element) {
                Some((_, count)) => *count += 1,
                None => species.push((atom.element.clone(), 1)),
            }
        }
        species
    }

    /// 按元素符号稳定排序
    pub fn sort_by_element(&mut self) {
        self.atoms.sort_by(|a, b| a.element.cmp(&b.element));
    }

    /// 确认每个原子的元素符号都是真实元素
    ///
    /// VASP 4 格式的 POSCAR 没有元素行，解析时使用 `X1`, `X2` 等占位符，
    /// 这样的结构不能写出或计算质量。
    pub fn require_species(&self, path: &str) -> Result<()> {
        match self
            .atoms
            .iter()
            .find(|a| elements::atomic_mass(&a.element).is_err())
        {
            Some(atom) => Err(VasputilError::UnknownSpecies {
                symbol: atom.element.clone(),
                path: path.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// 是否有任何原子带 Selective dynamics 标记
    pub fn has_selective_dynamics(&self) -> bool {
        self.atoms.iter().any(|a| a.selective.is_some())
    }

    /// 原子 `index` (0 起) 是否参与弛豫：任一方向为 T，或未设置约束
    pub fn is_relaxed(&self, index: usize) -> bool {
        self.atoms
            .get(index)
            .and_then(|a| a.selective)
            .map(|flags| flags.iter().any(|&f| f))
            .unwrap_or(true)
    }

    /// 所有原子的笛卡尔坐标
    pub fn cartesian_positions(&self) -> Vec<[f64; 3]> {
        self.atoms
            .iter()
            .map(|a| self.lattice.frac_to_cart(a.position))
            .collect()
    }

    /// 移除一个原子（0 起索引），返回新结构
    pub fn without_atom(&self, index: usize) -> Crystal {
        let mut crystal = self.clone();
        if index < crystal.atoms.len() {
            crystal.atoms.remove(index);
        }
        crystal
    }

    /// 将原子几何中心平移到盒子中心
    pub fn center_in_cell(&mut self) {
        if self.atoms.is_empty() {
            return;
        }
        let n = self.atoms.len() as f64;
        let mut center = [0.0; 3];
        for atom in &self.atoms {
            for k in 0..3 {
                center[k] += atom.position[k] / n;
            }
        }
        for atom in &mut self.atoms {
            for k in 0..3 {
                atom.position[k] += 0.5 - center[k];
            }
        }
    }

    /// 质量加权质心；坐标不做周期性回折
    pub fn center_of_mass(&self) -> Result<CenterOfMass> {
        let mut total_mass = 0.0;
        let mut weighted = [0.0; 3];

        for atom in &self.atoms {
            let mass = elements::atomic_mass(&atom.element)?;
            total_mass += mass;
            for k in 0..3 {
                weighted[k] += mass * atom.position[k];
            }
        }

        let fractional = if total_mass > 0.0 {
            [
                weighted[0] / total_mass,
                weighted[1] / total_mass,
                weighted[2] / total_mass,
            ]
        } else {
            [0.0; 3]
        };

        Ok(CenterOfMass {
            fractional,
            cartesian: self.lattice.frac_to_cart(fractional),
            total_mass,
        })
    }
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
        assert!((lattice.volume() - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_hexagonal() {
        let lattice = Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0);
        let (a, b, c, _, _, gamma) = lattice.parameters();

        assert!((a - 3.0).abs() < 0.01);
        assert!((b - 3.0).abs() < 0.01);
        assert!((c - 5.0).abs() < 0.01);
        assert!((gamma - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_frac_cart_conversion() {
        let lattice = Lattice::from_parameters(3.0, 4.0, 5.0, 80.0, 95.0, 110.0);
        let frac = [0.1, 0.7, 0.35];
        let back = lattice.cart_to_frac(lattice.frac_to_cart(frac));
        for k in 0..3 {
            assert!((back[k] - frac[k]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_heights_orthorhombic() {
        let lattice = Lattice::from_vectors([[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]]);
        let h = lattice.heights();
        assert!((h[0] - 2.0).abs() < 1e-10);
        assert!((h[1] - 3.0).abs() < 1e-10);
        assert!((h[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_species_and_sort() {
        let atoms = vec![
            Atom::new("O", [0.0, 0.0, 0.0]),
            Atom::new("H", [0.1, 0.0, 0.0]),
            Atom::new("O", [0.2, 0.0, 0.0]),
            Atom::new("C", [0.3, 0.0, 0.0]),
        ];
        let mut crystal = Crystal::new("mix", Lattice::cubic(10.0), atoms);
        assert_eq!(
            crystal.species(),
            vec![("O".to_string(), 2), ("H".to_string(), 1), ("C".to_string(), 1)]
        );
        assert_eq!(crystal.formula(), "O2HC");

        crystal.sort_by_element();
        let order: Vec<&str> = crystal.atoms.iter().map(|a| a.element.as_str()).collect();
        assert_eq!(order, vec!["C", "H", "O", "O"]);
        // 稳定排序保留同种元素的原始顺序
        assert!((crystal.atoms[2].position[0] - 0.0).abs() < 1e-12);
        assert!((crystal.atoms[3].position[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_is_relaxed() {
        let atoms = vec![
            Atom::new("Fe", [0.0, 0.0, 0.0]).with_selective([false, false, false]),
            Atom::new("Fe", [0.5, 0.5, 0.5]).with_selective([false, false, true]),
            Atom::new("Fe", [0.5, 0.0, 0.0]),
        ];
        let crystal = Crystal::new("Fe", Lattice::cubic(2.87), atoms);
        assert!(!crystal.is_relaxed(0));
        assert!(crystal.is_relaxed(1));
        assert!(crystal.is_relaxed(2));
        assert!(crystal.has_selective_dynamics());
    }

    #[test]
    fn test_center_of_mass_water_like() {
        let atoms = vec![
            Atom::new("O", [0.5, 0.5, 0.5]),
            Atom::new("H", [0.6, 0.5, 0.5]),
            Atom::new("H", [0.4, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("H2O", Lattice::cubic(10.0), atoms);
        let com = crystal.center_of_mass().unwrap();

        assert!((com.fractional[0] - 0.5).abs() < 1e-10);
        assert!((com.cartesian[1] - 5.0).abs() < 1e-10);
        assert!(com.total_mass > 18.0 && com.total_mass < 18.1);
    }

    #[test]
    fn test_center_of_mass_unknown_element() {
        let crystal = Crystal::new("X", Lattice::cubic(5.0), vec![Atom::new("Xx", [0.0; 3])]);
        assert!(crystal.center_of_mass().is_err());
    }

    #[test]
    fn test_require_species() {
        let crystal = Crystal::new(
            "SrTiO3",
            Lattice::cubic(3.905),
            vec![Atom::new("Sr", [0.0; 3]), Atom::new("X2", [0.5; 3])],
        );
        match crystal.require_species("POSCAR") {
            Err(VasputilError::UnknownSpecies { symbol, path }) => {
                assert_eq!(symbol, "X2");
                assert_eq!(path, "POSCAR");
            }
            other => panic!("placeholder species accepted: {:?}", other),
        }

        let real = Crystal::new("Sr", Lattice::cubic(3.905), vec![Atom::new("Sr", [0.0; 3])]);
        assert!(real.require_species("POSCAR").is_ok());
    }

    #[test]
    fn test_center_in_cell() {
        let atoms = vec![
            Atom::new("H", [0.0, 0.0, 0.0]),
            Atom::new("H", [0.1, 0.0, 0.0]),
        ];
        let mut crystal = Crystal::new("H2", Lattice::cubic(10.0), atoms);
        crystal.center_in_cell();
        assert!((crystal.atoms[0].position[0] - 0.45).abs() < 1e-12);
        assert!((crystal.atoms[1].position[0] - 0.55).abs() < 1e-12);
        assert!((crystal.atoms[0].position[2] - 0.5).abs() < 1e-12);
    }
}
