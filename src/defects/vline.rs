//! # sxdefectalign2d 势能曲线
//!
//! `vline-eV.dat` 为空白分隔的列：`z Vmod Vdft Vsr [...]`，
//! `#` 开头的行为注释。读取后用 `plotters` 绘制三条曲线。
//!
//! ## 依赖关系
//! - 被 `commands/defect/sxalign.rs` 调用
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, VasputilError};

use plotters::prelude::*;
use std::fs;
use std::path::Path;

/// 平面平均势能曲线
#[derive(Debug, Clone, Default)]
pub struct VlineData {
    /// z (bohr)
    pub z: Vec<f64>,
    /// 模型电荷势 (eV)
    pub v_model: Vec<f64>,
    /// DFT 势差 (eV)
    pub v_dft: Vec<f64>,
    /// 短程势 (eV)
    pub v_short_range: Vec<f64>,
}

impl VlineData {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    fn y_range(&self) -> (f64, f64) {
        let all = self
            .v_model
            .iter()
            .chain(self.v_dft.iter())
            .chain(self.v_short_range.iter());
        let (lo, hi) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        let pad = ((hi - lo) * 0.05).max(1e-3);
        (lo - pad, hi + pad)
    }
}

/// 读取 vline-eV.dat
pub fn parse_vline_file(path: &Path) -> Result<VlineData> {
    let content = fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_vline_content(&content, &path.display().to_string())
}

/// 从字符串内容解析
pub fn parse_vline_content(content: &str, path: &str) -> Result<VlineData> {
    let mut data = VlineData::default();

    for (no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let values: Vec<f64> = line
            .split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| VasputilError::parse("vline", path, format!("Non-numeric value at line {}", no + 1)))?;
        if values.len() < 4 {
            return Err(VasputilError::parse(
                "vline",
                path,
                format!("Expected at least 4 columns at line {}, found {}", no + 1, values.len()),
            ));
        }

        data.z.push(values[0]);
        data.v_model.push(values[1]);
        data.v_dft.push(values[2]);
        data.v_short_range.push(values[3]);
    }

    if data.is_empty() {
        return Err(VasputilError::EmptyFile {
            path: path.to_string(),
        });
    }
    Ok(data)
}

/// 生成 PNG 图表
pub fn generate_vline_plot(data: &VlineData, output_path: &Path, title: &str, width: u32, height: u32) -> Result<()> {
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
    draw_vline_chart(&root, data, title)?;
    root.present()
        .map_err(|e| VasputilError::Other(e.to_string()))?;
    Ok(())
}

fn draw_vline_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &VlineData,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| VasputilError::Other(format!("{:?}", e)))?;

    let x_min = data.z.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut x_max = data.z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    let (y_min, y_max) = data.y_range();

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| VasputilError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("z [bohr]")
        .y_desc("Potential [eV]")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| VasputilError::Other(format!("{:?}", e)))?;

    let series: [(&str, &Vec<f64>, RGBColor); 3] = [
        ("Vmod", &data.v_model, BLACK),
        ("Vdft", &data.v_dft, RED),
        ("Vsr", &data.v_short_range, GREEN),
    ];

    for (label, values, color) in series {
        chart
            .draw_series(LineSeries::new(
                data.z.iter().cloned().zip(values.iter().cloned()),
                color.stroke_width(2),
            ))
            .map_err(|e| VasputilError::Other(format!("{:?}", e)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| VasputilError::Other(format!("{:?}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VLINE: &str = "# z Vmod Vdft Vsr\n0.0 0.10 0.20 0.10\n\n1.0 0.15 0.30 0.15 9.9\n2.0 0.20 0.25 0.05\n";

    #[test]
    fn test_parse_vline() {
        let data = parse_vline_content(VLINE, "vline-eV.dat").unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.z, vec![0.0, 1.0, 2.0]);
        assert_eq!(data.v_dft[1], 0.30);
        assert_eq!(data.v_short_range[2], 0.05);
    }

    #[test]
    fn test_too_few_columns() {
        assert!(parse_vline_content("0.0 1.0 2.0\n", "vline-eV.dat").is_err());
    }

    #[test]
    fn test_empty_data() {
        assert!(matches!(
            parse_vline_content("# only a comment\n", "vline-eV.dat"),
            Err(VasputilError::EmptyFile { .. })
        ));
    }

    #[test]
    fn test_y_range_padding() {
        let data = parse_vline_content(VLINE, "vline-eV.dat").unwrap();
        let (lo, hi) = data.y_range();
        assert!(lo < 0.05 && hi > 0.30);
    }
}
