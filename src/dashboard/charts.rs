//! Chart data for the dashboard.
//!
//! [to_chart_series] maps category totals onto the `{label, value, color_index}`
//! points a charting collaborator draws. The remaining functions build ECharts
//! option documents with charming:
//! - **Spendings by Category**: horizontal bar chart of category totals
//! - **Distribution**: pie chart colored by the palette
//! - **Daily Spendings**: bar chart of daily totals
//!
//! Each chart is rendered to its ECharts configuration with `to_string()`.

use std::num::NonZeroUsize;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Color, JsFunction, Orient, Tooltip,
        Trigger,
    },
    series::{Pie, bar::Bar},
};

use crate::{
    Error,
    dashboard::{
        Dashboard,
        aggregation::{CategoryTotal, DailyTotal},
    },
    money::Money,
    month::{YearMonth, format_day_label},
};

/// The colors used for chart slices, in order.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4F46E5", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#6366F1", "#14B8A6",
];

/// A non-empty list of colors that chart points cycle through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPalette(Vec<String>);

impl ChartPalette {
    /// Create a palette from a list of CSS colors.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyPalette] if `colors` is empty.
    pub fn new(colors: Vec<String>) -> Result<Self, Error> {
        if colors.is_empty() {
            Err(Error::EmptyPalette)
        } else {
            Ok(Self(colors))
        }
    }

    /// The colors in order.
    pub fn colors(&self) -> &[String] {
        &self.0
    }

    /// The number of colors.
    pub fn size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.0.len()).unwrap_or(NonZeroUsize::MIN)
    }

    /// The color for `color_index`.
    pub fn color(&self, color_index: usize) -> &str {
        &self.0[color_index % self.0.len()]
    }
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self(DEFAULT_PALETTE.map(str::to_owned).to_vec())
    }
}

/// One labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    /// The category label.
    pub label: String,
    /// The category total.
    pub value: Money,
    /// Index into the palette: the point's position modulo the palette size.
    pub color_index: usize,
}

/// Map category totals onto chart points, keeping their order.
pub fn to_chart_series(
    category_totals: &[CategoryTotal],
    palette_size: NonZeroUsize,
) -> Vec<ChartPoint> {
    category_totals
        .iter()
        .enumerate()
        .map(|(position, total)| ChartPoint {
            label: total.name.clone(),
            value: total.total,
            color_index: position % palette_size.get(),
        })
        .collect()
}

/// A dashboard chart with its element ID and ECharts configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardChart {
    /// The element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration
    pub options: String,
}

/// Build every dashboard chart for `month`.
pub fn dashboard_charts(
    dashboard: &Dashboard,
    month: YearMonth,
    palette: &ChartPalette,
) -> Vec<DashboardChart> {
    let series = to_chart_series(&dashboard.category_totals, palette.size());

    vec![
        DashboardChart {
            id: "category-chart",
            options: category_bar_chart(&series, month).to_string(),
        },
        DashboardChart {
            id: "distribution-chart",
            options: distribution_chart(&series, palette, month).to_string(),
        },
        DashboardChart {
            id: "daily-chart",
            options: daily_spendings_chart(&dashboard.daily_totals, month).to_string(),
        },
    ]
}

/// A horizontal bar per category, largest at the top.
pub fn category_bar_chart(series: &[ChartPoint], month: YearMonth) -> Chart {
    let labels: Vec<String> = series.iter().map(|point| point.label.clone()).collect();
    let values: Vec<f64> = series.iter().map(|point| point.value.as_f64()).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Spendings by Category")
                .subtext(month.to_string()),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .y_axis(Axis::new().type_(AxisType::Category).data(labels))
        .series(Bar::new().name("Spendings").data(values))
}

/// A pie chart of each category's share of the month.
pub fn distribution_chart(
    series: &[ChartPoint],
    palette: &ChartPalette,
    month: YearMonth,
) -> Chart {
    let data: Vec<(f64, &str)> = series
        .iter()
        .map(|point| (point.value.as_f64(), point.label.as_str()))
        .collect();

    // ECharts cycles through the chart colors by data index, which matches
    // each point's color index.
    let colors: Vec<Color> = palette
        .colors()
        .iter()
        .map(|color| Color::from(color.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Distribution").subtext(month.to_string()))
        .color(colors)
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().orient(Orient::Vertical).right("2%").top("middle"))
        .series(Pie::new().name("Distribution").radius("60%").data(data))
}

/// A bar per day with spendings.
pub fn daily_spendings_chart(daily_totals: &[DailyTotal], month: YearMonth) -> Chart {
    let labels: Vec<String> = daily_totals
        .iter()
        .map(|daily_total| format_day_label(daily_total.date))
        .collect();
    let values: Vec<f64> = daily_totals
        .iter()
        .map(|daily_total| daily_total.total.as_f64())
        .collect();

    Chart::new()
        .title(Title::new().text("Daily Spendings").subtext(month.to_string()))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Spendings").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
