//! Misclassification breakdown of a saved classification run: which
//! (label, inferred) pairs the model got wrong, as a table and an SVG pie chart.

use crate::intent;
use crate::model::RecordOutput;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

pub const CLASSIFICATION_SCORE: &str = "classification_accuracy_score";

#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub total: usize,
    pub wrong: usize,
    /// (description, count), most frequent first, ties by description.
    pub slices: Vec<(String, usize)>,
}

impl Breakdown {
    pub fn wrong_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.wrong as f64 / self.total as f64
        }
    }
}

pub fn read_records(path: &Path) -> anyhow::Result<Vec<RecordOutput>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            serde_json::from_str(l)
                .map_err(|e| anyhow::anyhow!("{}:{}: invalid record: {}", path.display(), i + 1, e))
        })
        .collect()
}

fn describe(row: &RecordOutput) -> String {
    format!(
        "label : {} - infered : {}",
        row.target_output,
        intent::first_tag(&row.model_output).unwrap_or("none")
    )
}

pub fn breakdown(rows: &[RecordOutput]) -> Breakdown {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut wrong = 0;
    for row in rows {
        if row.score(CLASSIFICATION_SCORE) == Some(0.0) {
            wrong += 1;
            *counts.entry(describe(row)).or_default() += 1;
        }
    }
    let mut slices: Vec<(String, usize)> = counts.into_iter().collect();
    slices.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Breakdown {
        total: rows.len(),
        wrong,
        slices,
    }
}

pub fn render_table(b: &Breakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "wrong: {}/{} ({:.1}%)",
        b.wrong,
        b.total,
        b.wrong_ratio() * 100.0
    );
    for (desc, count) in &b.slices {
        let share = *count as f64 / b.wrong.max(1) as f64 * 100.0;
        let _ = writeln!(out, "  {:>5}  {:>5.1}%  {}", count, share, desc);
    }
    out
}

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Pie chart of the wrong-answer slices with a legend. Starts at 140 degrees, counter-clockwise.
pub fn render_svg(b: &Breakdown) -> String {
    const CX: f64 = 220.0;
    const CY: f64 = 220.0;
    const R: f64 = 180.0;
    const START_DEG: f64 = 140.0;

    let legend_height = 30 + 22 * b.slices.len();
    let height = legend_height.max(440);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="900" height="{height}" viewBox="0 0 900 {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"  <title>wrong {}/{} ({:.1}%)</title>"#,
        b.wrong,
        b.total,
        b.wrong_ratio() * 100.0
    );

    let point = |deg: f64| {
        let rad = deg.to_radians();
        (CX + R * rad.cos(), CY - R * rad.sin())
    };

    let mut angle = START_DEG;
    for (i, (desc, count)) in b.slices.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let share = *count as f64 / b.wrong.max(1) as f64;
        let sweep = share * 360.0;
        if b.slices.len() == 1 {
            let _ = writeln!(
                svg,
                r#"  <circle cx="{CX}" cy="{CY}" r="{R}" fill="{color}"><title>{}</title></circle>"#,
                xml_escape(desc)
            );
        } else {
            let (x0, y0) = point(angle);
            let (x1, y1) = point(angle + sweep);
            let large_arc = if sweep > 180.0 { 1 } else { 0 };
            let _ = writeln!(
                svg,
                r#"  <path d="M {CX} {CY} L {x0:.2} {y0:.2} A {R} {R} 0 {large_arc} 0 {x1:.2} {y1:.2} Z" fill="{color}"><title>{}</title></path>"#,
                xml_escape(desc)
            );
        }
        let (lx, ly) = {
            let mid = (angle + sweep / 2.0).to_radians();
            (CX + R * 0.6 * mid.cos(), CY - R * 0.6 * mid.sin())
        };
        let _ = writeln!(
            svg,
            r#"  <text x="{lx:.2}" y="{ly:.2}" font-size="12" text-anchor="middle">{:.1}%</text>"#,
            share * 100.0
        );
        let legend_y = 30 + 22 * i;
        let _ = writeln!(
            svg,
            r#"  <rect x="460" y="{}" width="14" height="14" fill="{color}"/>"#,
            legend_y - 11
        );
        let _ = writeln!(
            svg,
            r#"  <text x="482" y="{legend_y}" font-size="13">{} ({})</text>"#,
            xml_escape(desc),
            count
        );
        angle += sweep;
    }
    svg.push_str("</svg>\n");
    svg
}
