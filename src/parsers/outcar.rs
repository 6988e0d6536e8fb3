//! # VASP OUTCAR 解析器
//!
//! 两类信息：
//! - 弛豫过程：逐行扫描，在每个 `LOOP+` 处汇总出一个离子步
//!   （能量、电子步数、受力、体积、磁矩、耗时）
//! - 振动模式：`Eigenvectors after division by SQRT(mass)` 之后的 Γ 点本征矢
//!
//! ## 依赖关系
//! - 被 `commands/grad.rs`, `commands/dimer.rs` 使用
//! - 使用 `models/calculation.rs`

use crate::error::{Result, VasputilError};
use crate::models::{IonicStep, RunParameters, VibrationMode};
use regex::Regex;
use std::sync::OnceLock;

/// 振动本征矢块的起始标记（需要 NWRITE=3）
pub const EIGENVECTOR_MARKER: &str = "Eigenvectors after division by SQRT(mass)";

struct Patterns {
    nions: Regex,
    nelm: Regex,
    ediff: Regex,
    loop_time: Regex,
    loop_plus_time: Regex,
}

fn patterns() -> &'static Patterns {
    static INSTANCE: OnceLock<Patterns> = OnceLock::new();
    INSTANCE.get_or_init(|| Patterns {
        nions: Regex::new(r"NIONS\s*=\s*(\d+)").unwrap(),
        nelm: Regex::new(r"^\s*NELM\s*=\s*(\d+)").unwrap(),
        ediff: Regex::new(r"^\s*EDIFF\s*=\s*([-+0-9.eEdD]+)").unwrap(),
        loop_time: Regex::new(r"LOOP:.*?(\d*\.?\d+)\s*$").unwrap(),
        loop_plus_time: Regex::new(r"LOOP\+:.*?(\d*\.?\d+)\s*$").unwrap(),
    })
}

/// 监视器输出的事件
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// 完成一个离子步
    Step(IonicStep),
    /// `LOOP+` 之前没有读到能量，无法汇总该离子步
    Unreadable { step: usize },
}

/// OUTCAR 弛豫过程的流式监视器
///
/// 逐行调用 [`RelaxationMonitor::feed_line`]，每遇到 `LOOP+` 产出一个事件。
#[derive(Debug)]
pub struct RelaxationMonitor {
    /// 参与受力统计的原子（0 起），None 表示全部原子
    relaxed: Option<Vec<usize>>,

    pub params: RunParameters,
    pub spin_polarized: bool,

    step: usize,
    scf_steps: usize,
    scf_minutes: f64,
    energy: Option<f64>,
    min_energy: Option<f64>,
    avg_force: f64,
    max_force: f64,
    volume: f64,
    magnetization: f64,

    /// 正在读取的受力块：(是否还需跳过虚线, 已读取的受力)
    force_block: Option<(bool, Vec<[f64; 3]>)>,
}

impl RelaxationMonitor {
    /// `relaxed` 为可弛豫原子下标（0 起）；None 或空列表时统计全部原子
    pub fn new(relaxed: Option<Vec<usize>>) -> Self {
        RelaxationMonitor {
            relaxed: relaxed.filter(|r| !r.is_empty()),
            params: RunParameters::default(),
            spin_polarized: false,
            step: 1,
            scf_steps: 0,
            scf_minutes: 0.0,
            energy: None,
            min_energy: None,
            avg_force: 0.0,
            max_force: 0.0,
            volume: 0.0,
            magnetization: 0.0,
            force_block: None,
        }
    }

    /// 输入一行 OUTCAR
    pub fn feed_line(&mut self, line: &str) -> Option<MonitorEvent> {
        if self.force_block.is_some() {
            self.feed_force_line(line);
            return None;
        }

        let p = patterns();

        if line.contains("NIONS") {
            if let Some(n) = capture_parse(&p.nions, line) {
                self.params.nions = Some(n);
            }
        }

        if self.params.nelm.is_none() && line.contains("NELM") {
            self.params.nelm = capture_parse(&p.nelm, line);
        }

        if line.contains("  EDIFF  ") {
            if let Some(caps) = p.ediff.captures(line) {
                self.params.ediff = caps[1].replace(['d', 'D'], "e").parse().ok();
            }
        }

        if line.contains("Iteration") {
            self.scf_steps += 1;
        }

        if line.contains("TOTAL-FORCE") {
            self.force_block = Some((true, Vec::new()));
            return None;
        }

        if line.contains("number of electron") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() > 5 && parts[0] != "NELECT" {
                if let Ok(m) = parts[5].parse() {
                    self.spin_polarized = true;
                    self.magnetization = m;
                }
            }
        }

        if line.contains("LOOP:") {
            if let Some(seconds) = capture_parse::<f64>(&p.loop_time, line) {
                self.scf_minutes += seconds / 60.0;
            }
        }

        if line.contains("volume of cell") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if let Some(v) = parts.get(4).and_then(|s| s.parse().ok()) {
                self.volume = v;
            }
        }

        if line.contains("energy  without entropy") {
            if let Some(e) = line.split_whitespace().last().and_then(|s| s.parse().ok()) {
                self.energy = Some(e);
            }
        }

        if line.contains("LOOP+") {
            let ionic_minutes = capture_parse::<f64>(&p.loop_plus_time, line).map(|s| s / 60.0);
            return Some(self.close_step(ionic_minutes));
        }

        None
    }

    fn feed_force_line(&mut self, line: &str) {
        let nions = self.params.nions;
        let (skip_dash, forces) = match self.force_block.as_mut() {
            Some(block) => block,
            None => return,
        };

        if *skip_dash {
            *skip_dash = false;
            return;
        }

        let values: Vec<f64> = line
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        let complete = if values.len() >= 6 {
            forces.push([values[3], values[4], values[5]]);
            nions.map(|n| forces.len() >= n).unwrap_or(false)
        } else {
            // 块末尾的虚线或意外内容
            true
        };

        if complete {
            if let Some((_, forces)) = self.force_block.take() {
                self.summarize_forces(&forces);
            }
        }
    }

    fn summarize_forces(&mut self, forces: &[[f64; 3]]) {
        let magnitudes: Vec<f64> = match &self.relaxed {
            Some(indices) => indices
                .iter()
                .filter_map(|&i| forces.get(i))
                .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
                .collect(),
            None => forces
                .iter()
                .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
                .collect(),
        };

        if magnitudes.is_empty() {
            return;
        }
        self.avg_force = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;
        self.max_force = magnitudes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    }

    fn close_step(&mut self, ionic_minutes: Option<f64>) -> MonitorEvent {
        let event = match self.energy.take() {
            Some(energy) => {
                // dE 相对于此前的最低能量
                let delta_e = match self.min_energy {
                    Some(min) => energy - min,
                    None => 0.0,
                };
                if self.min_energy.map(|min| energy < min).unwrap_or(true) {
                    self.min_energy = Some(energy);
                }

                let step = IonicStep {
                    step: self.step,
                    energy,
                    delta_e,
                    scf_steps: self.scf_steps,
                    avg_force: self.avg_force,
                    max_force: self.max_force,
                    volume: self.volume,
                    magnetization: self.spin_polarized.then_some(self.magnetization),
                    scf_minutes: self.scf_minutes,
                    ionic_minutes,
                };
                self.step += 1;
                MonitorEvent::Step(step)
            }
            None => MonitorEvent::Unreadable { step: self.step },
        };

        self.scf_steps = 0;
        self.scf_minutes = 0.0;
        event
    }
}

fn capture_parse<T: std::str::FromStr>(re: &Regex, line: &str) -> Option<T> {
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

/// 解析最后一个本征矢块中的所有振动模式
pub fn parse_vibration_modes(content: &str, path: &str) -> Result<Vec<VibrationMode>> {
    let start = content
        .rfind(EIGENVECTOR_MARKER)
        .ok_or_else(|| VasputilError::MarkerNotFound {
            marker: EIGENVECTOR_MARKER.to_string(),
            path: path.to_string(),
            hint: ". Verify that NWRITE is set to 3 and rerun.".to_string(),
        })?;

    let mut modes: Vec<VibrationMode> = Vec::new();
    for line in content[start..].lines().skip(1) {
        let is_header = line.contains("f/i=") || line.contains("f  =") || line.contains("f =");
        if is_header && line.contains("cm-1") {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let index = tokens.first().and_then(|s| s.parse().ok()).unwrap_or(modes.len() + 1);
            let wavenumber = tokens
                .iter()
                .position(|&t| t == "cm-1")
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| tokens[i].parse().ok())
                .ok_or_else(|| {
                    VasputilError::parse("outcar", path, format!("Cannot read wavenumber from '{}'", line.trim()))
                })?;
            modes.push(VibrationMode {
                index,
                imaginary: line.contains("f/i"),
                wavenumber,
                displacements: Vec::new(),
            });
            continue;
        }

        if let Some(mode) = modes.last_mut() {
            let values: Vec<f64> = line
                .split_whitespace()
                .map(|s| s.parse::<f64>())
                .collect::<std::result::Result<_, _>>()
                .unwrap_or_default();
            if values.len() == 6 {
                mode.displacements.push([values[3], values[4], values[5]]);
            }
        }
    }

    Ok(modes)
}
