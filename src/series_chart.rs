use std::{io, path::Path};

use ndarray::Array1;
use plotters::{
    prelude::{
        ChartBuilder, DrawingAreaErrorKind, IntoDrawingArea, LabelAreaPosition, LineSeries,
        PathElement, SVGBackend,
    },
    style::{Color, IntoFont, Palette100, PaletteColor, BLACK, WHITE},
};

use crate::{
    config::{AngleUnit, Scale},
    engine::SynthesisResult,
    helper::decibels_or_else,
    methods::MethodMetadata,
};

pub type ChartError = DrawingAreaErrorKind<io::Error>;

pub struct SeriesChart {
    label: String,
    x: Array1<f64>,
    y: Array1<f64>,
    border_x: f64,
    border_y: f64,
}

impl SeriesChart {
    pub fn new(label: impl Into<String>, x: Array1<f64>, y: Array1<f64>) -> SeriesChart {
        SeriesChart {
            label: label.into(),
            x,
            y,
            border_x: 0.1,
            border_y: 0.1,
        }
    }

    /// (left, right, bottom, top) padded by a fraction of the data range. None for an empty
    /// series.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let min_x = self.x.iter().copied().min_by(|x, y| x.total_cmp(y))?;
        let min_y = self.y.iter().copied().min_by(|x, y| x.total_cmp(y))?;
        let max_x = self.x.iter().copied().max_by(|x, y| x.total_cmp(y))?;
        let max_y = self.y.iter().copied().max_by(|x, y| x.total_cmp(y))?;

        let dist_x = (max_x - min_x).clamp(1e-6, f64::MAX);
        let dist_y = (max_y - min_y).clamp(1e-6, f64::MAX);

        let bottom_x = (min_x - dist_x * self.border_x / 2.).max(f64::MIN);
        let bottom_y = (min_y - dist_y * self.border_y / 2.).max(f64::MIN);
        let top_x = (max_x + dist_x * self.border_x / 2.).min(f64::MAX);
        let top_y = (max_y + dist_y * self.border_y / 2.).min(f64::MAX);

        Some((bottom_x, top_x, bottom_y, top_y))
    }
}

/// Several series drawn on shared axes.
pub struct ChartSet {
    pub caption: String,
    pub x_desc: String,
    pub y_desc: String,
    pub series: Vec<SeriesChart>,
}

impl ChartSet {
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.series
            .iter()
            .filter_map(SeriesChart::bounds)
            .reduce(|acc, next| {
                (
                    acc.0.min(next.0),
                    acc.1.max(next.1),
                    acc.2.min(next.2),
                    acc.3.max(next.3),
                )
            })
    }

    pub fn render_svg(&self, path: impl AsRef<Path>, size: (u32, u32)) -> Result<(), ChartError> {
        let root = SVGBackend::new(path.as_ref(), size).into_drawing_area();
        root.fill(&WHITE)?;

        let (bottom_x, top_x, bottom_y, top_y) = match self.bounds() {
            Some(bounds) => bounds,
            None => return root.present(),
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.caption, ("sans-serif", 28).into_font())
            .margin(12)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(bottom_x..top_x, bottom_y..top_y)?;

        chart
            .configure_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .draw()?;

        for (i, series) in self.series.iter().enumerate() {
            let color = PaletteColor::<Palette100>::pick(i).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    series.x.iter().copied().zip(series.y.iter().copied()),
                    &color,
                ))?
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()
    }
}

/// The synthesized pattern against θ, plus the target pattern for Fourier runs.
pub fn pattern_chart(result: &SynthesisResult, unit: AngleUnit, scale: Scale) -> ChartSet {
    let angles = result.angles(unit);
    let mut series = vec![SeriesChart::new(
        "synthesized",
        angles.clone(),
        result.pattern(scale),
    )];

    if let MethodMetadata::Fourier {
        desired_pattern, ..
    } = result.metadata()
    {
        let desired = Array1::from(desired_pattern.clone());
        let peak = desired.fold(0., |max: f64, &x| max.max(x));
        let floor = result.array_factor().floor_db();
        let y = match scale {
            Scale::Db => desired.mapv(|x| decibels_or_else(x / peak, floor).max(floor)),
            Scale::Linear => desired,
        };
        series.push(SeriesChart::new("desired", angles, y));
    }

    let (x_desc, y_desc) = match (unit, scale) {
        (AngleUnit::Degrees, Scale::Db) => ("θ (deg)", "|AF| (dB)"),
        (AngleUnit::Degrees, Scale::Linear) => ("θ (deg)", "|AF|"),
        (AngleUnit::Radians, Scale::Db) => ("θ (rad)", "|AF| (dB)"),
        (AngleUnit::Radians, Scale::Linear) => ("θ (rad)", "|AF|"),
    };

    ChartSet {
        caption: format!(
            "{} array factor, N = {}",
            result.method(),
            result.parameters().element_count()
        ),
        x_desc: x_desc.to_owned(),
        y_desc: y_desc.to_owned(),
        series,
    }
}
