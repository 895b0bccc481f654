use anyhow::{Context, Result, anyhow};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::debug;

/// 10x4 inches at 150 DPI.
pub const CHART_SIZE: (u32, u32) = (1500, 600);

/// Where the label of an empty bar sits, in data units above the axis.
const ZERO_LABEL_OFFSET: f64 = 0.1;

const BAR_COLOR: RGBColor = RGBColor(0x2b, 0x6c, 0xb0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Ggplot,
    Classic,
    Default,
    /// No grid, white background. Used when no named style is available.
    Plain,
}

pub struct StyleColors {
    pub background: RGBColor,
    pub text: RGBColor,
    pub axis: RGBColor,
    pub grid: Option<RGBColor>,
}

impl Style {
    /// Named styles this renderer knows about.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "ggplot" => Some(Style::Ggplot),
            "classic" => Some(Style::Classic),
            "default" => Some(Style::Default),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Style::Ggplot => "ggplot",
            Style::Classic => "classic",
            Style::Default => "default",
            Style::Plain => "plain",
        }
    }

    pub fn colors(self) -> StyleColors {
        match self {
            Style::Ggplot => StyleColors {
                background: RGBColor(0xe5, 0xe5, 0xe5),
                text: RGBColor(0x55, 0x55, 0x55),
                axis: RGBColor(0xe5, 0xe5, 0xe5),
                grid: Some(WHITE),
            },
            Style::Classic => StyleColors {
                background: WHITE,
                text: BLACK,
                axis: BLACK,
                grid: None,
            },
            Style::Default => StyleColors {
                background: WHITE,
                text: RGBColor(0x24, 0x29, 0x2f),
                axis: RGBColor(0x24, 0x29, 0x2f),
                grid: Some(RGBColor(0xdd, 0xdd, 0xdd)),
            },
            Style::Plain => StyleColors {
                background: WHITE,
                text: BLACK,
                axis: BLACK,
                grid: None,
            },
        }
    }
}

/// First known style in `preferred`, else [`Style::Plain`].
pub fn select_style<S: AsRef<str>>(preferred: &[S]) -> Style {
    preferred
        .iter()
        .find_map(|name| {
            let style = Style::named(name.as_ref());
            if style.is_none() {
                debug!(style = name.as_ref(), "chart style not available, skipping");
            }
            style
        })
        .unwrap_or(Style::Plain)
}

/// A labelled vertical bar chart.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

fn y_upper(values: &[u64]) -> f64 {
    let max = values.iter().copied().max().unwrap_or(0) as f64;
    (max * 1.15).max(1.0)
}

fn label_y(value: u64) -> f64 {
    if value == 0 {
        ZERO_LABEL_OFFSET
    } else {
        value as f64
    }
}

/// Rasterizes `chart` to a PNG at `output_path`, creating parent directories.
pub async fn render(chart: BarChart, style: Style, output_path: &Path) -> Result<()> {
    if chart.labels.len() != chart.values.len() {
        return Err(anyhow!(
            "Bar labels and values must have the same length: {} vs {}",
            chart.labels.len(),
            chart.values.len()
        ));
    }
    if chart.values.is_empty() {
        return Err(anyhow!("Cannot draw a bar chart without bars"));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let path = output_path.to_path_buf();
    let handle = tokio::task::spawn_blocking(move || draw(&chart, style, &path));

    handle
        .await
        .context("Chart rendering task failed to complete")?
        .context("Failed to draw bar chart")
}

fn draw(chart: &BarChart, style: Style, path: &Path) -> Result<()> {
    let colors = style.colors();
    let bars = chart.values.len() as i32;
    let y_max = y_upper(&chart.values);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&colors.background)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(
            &chart.title,
            ("sans-serif", 30).into_font().color(&colors.text),
        )
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(70)
        .build_cartesian_2d((0..bars).into_segmented(), 0f64..y_max)?;

    let x_fmt = |x: &SegmentValue<i32>| match x {
        SegmentValue::CenterOf(i) => chart.labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    let y_fmt = |y: &f64| {
        if y.fract() == 0.0 {
            format!("{y:.0}")
        } else {
            String::new()
        }
    };

    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .x_labels(chart.labels.len())
        .y_labels(8)
        .axis_style(ShapeStyle::from(&colors.axis).stroke_width(1))
        .label_style(("sans-serif", 16).into_font().color(&colors.text))
        .axis_desc_style(("sans-serif", 20).into_font().color(&colors.text))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt);
    match colors.grid {
        Some(grid) => {
            mesh.light_line_style(ShapeStyle::from(&grid).stroke_width(1))
                .bold_line_style(ShapeStyle::from(&grid).stroke_width(1));
        }
        None => {
            mesh.disable_mesh();
        }
    }
    mesh.draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(BAR_COLOR.filled())
            .margin(12)
            .data(
                chart
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as i32, *v as f64)),
            ),
    )?;

    let label_style = ("sans-serif", 14)
        .into_font()
        .color(&colors.text)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    ctx.draw_series(chart.values.iter().enumerate().map(|(i, v)| {
        Text::new(
            v.to_string(),
            (SegmentValue::CenterOf(i as i32), label_y(*v)),
            label_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}
