use std::ops::Range;

use itertools::Itertools;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::dataset::Dataset;
use crate::error::RenderError;
use crate::reg_lin::LinearFit;

pub const CAPTION: &str = "Relationship between Shoe Size and Height";
pub const X_DESC: &str = "Shoe Size";
pub const Y_DESC: &str = "Height";

/// 10x6 inches at 100 dpi.
pub const FIGURE_SIZE: (u32, u32) = (1000, 600);

pub(crate) fn chart_error<E>(err: DrawingAreaErrorKind<E>) -> RenderError
where
    E: std::error::Error + Send + Sync,
{
    RenderError::Chart(err.to_string())
}

/// Scatter of the observations with the fitted line drawn through the predictions.
pub fn plot_regression<DB>(
    dataset: &Dataset,
    fit: &LinearFit,
    drawing_area: &DrawingArea<DB, Shift>,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    drawing_area.fill(&WHITE).map_err(chart_error)?;

    let predicted = fit.predict_all(dataset);

    let x_range = find_max_min(dataset.x().iter().cloned())
        .map(padded_range)
        .ok_or_else(|| RenderError::Chart("nothing to plot".to_string()))?;

    let y_range = find_max_min(dataset.y().iter().chain(predicted.iter()).cloned())
        .map(padded_range)
        .ok_or_else(|| RenderError::Chart("nothing to plot".to_string()))?;

    let line = dataset
        .x()
        .iter()
        .cloned()
        .zip(predicted.iter().cloned())
        .sorted_by(|a, b| a.0.total_cmp(&b.0));

    let mut chart_builder = ChartBuilder::on(drawing_area);

    let mut chart_context = chart_builder
        .caption(CAPTION, ("sans-serif", 24))
        .set_all_label_area_size(60)
        .margin(30)
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_error)?;

    chart_context
        .configure_mesh()
        .x_labels(10)
        .x_desc(X_DESC)
        .y_labels(10)
        .y_desc(Y_DESC)
        .draw()
        .map_err(chart_error)?;

    chart_context
        .draw_series(
            dataset
                .points()
                .map(|point| Circle::new(point, 4, BLUE.filled())),
        )
        .map_err(chart_error)?
        .label("Data")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, BLUE.filled()));

    chart_context
        .draw_series(LineSeries::new(line, RED.stroke_width(2)))
        .map_err(chart_error)?
        .label(format!("Regression Line: {}", fit.equation()))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart_context
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(chart_error)?;

    Ok(())
}

/// Draws the regression chart into an in-memory svg document.
pub fn render_svg(dataset: &Dataset, fit: &LinearFit) -> Result<String, RenderError> {
    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area();
        plot_regression(dataset, fit, &root)?;
        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// Widens `[min, max]` by 5% on each side, or by 1 when the extent is a single value.
pub fn padded_range(min_max: MinMax<f64>) -> Range<f64> {
    let span = min_max.max - min_max.min;
    let pad = if span > 0. { span * 0.05 } else { 1. };

    (min_max.min - pad)..(min_max.max + pad)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MinMax<T> {
    pub min: T,
    pub max: T,
}

pub fn find_max_min<T: std::cmp::PartialOrd + Copy>(
    mut data: impl Iterator<Item = T>,
) -> Option<MinMax<T>> {
    let init = data.next()?;
    let mut min_max = MinMax {
        min: init,
        max: init,
    };

    for x in data {
        min_max = MinMax {
            min: if x < min_max.min { x } else { min_max.min },
            max: if x > min_max.max { x } else { min_max.max },
        };
    }

    Some(min_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_of_unordered_values() {
        assert_eq!(
            find_max_min([3., -1., 7.5, 2.].into_iter()),
            Some(MinMax { min: -1., max: 7.5 })
        );
        assert_eq!(find_max_min(std::iter::empty::<f64>()), None);
    }

    #[test]
    fn padding() {
        assert_eq!(padded_range(MinMax { min: 0., max: 100. }), -5.0..105.0);
        assert_eq!(padded_range(MinMax { min: 170., max: 170. }), 169.0..171.0);
    }

    #[test]
    fn svg_has_labels_and_legend() {
        let dataset = Dataset::from_pairs([
            (36., 160.),
            (38., 165.),
            (40., 170.),
            (42., 175.),
            (44., 180.),
        ]);
        let fit = LinearFit::fit(&dataset).unwrap();

        let svg = render_svg(&dataset, &fit).unwrap();

        assert!(svg.contains(CAPTION));
        assert!(svg.contains(X_DESC));
        assert!(svg.contains(Y_DESC));
        assert!(svg.contains("Regression Line: y = 70.00 + 2.50x"));
        assert!(svg.matches("<circle").count() >= dataset.len());
    }

    #[test]
    fn flat_data_still_renders() {
        let dataset = Dataset::from_pairs([(38., 170.), (42., 170.)]);
        let fit = LinearFit::fit(&dataset).unwrap();

        let svg = render_svg(&dataset, &fit).unwrap();

        assert!(svg.contains("y = 170.00 + 0.00x"));
    }
}
