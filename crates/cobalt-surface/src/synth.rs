//! Deterministic surface synthesis
//!
//! A request sweeps parameter `name` when it carries both `{name}_lower`
//! and `{name}_upper` (percent deviations). The number of distinct swept
//! names picks the plot: one is 1D, two is 2D, anything else is 3D.
//! Clients send every bounded metric and leave unswept ones at zero
//! width, so axes are chosen from the pairs with `lower != upper` first
//! and zero-width pairs only fill the remaining slots. Within each group
//! names are sorted, so the result does not depend on the key order of
//! the stored request.
//!
//! Axis values are absolute when the request also carries a numeric base
//! value `{name}`, otherwise they are the percent deviation itself.

use crate::entry::{PlotType, SurfaceResult};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const LOWER_SUFFIX: &str = "_lower";
const UPPER_SUFFIX: &str = "_upper";

/// Samples in a 1D sweep
pub const ONE_D_SAMPLES: usize = 10;
/// Grid shape of a 2D sweep
pub const TWO_D_GRID: [usize; 2] = [4, 3];
/// Grid shape of a 3D sweep
pub const THREE_D_GRID: [usize; 3] = [3, 2, 2];

/// Notched rating scale, best first
pub const RATING_SCALE: [&str; 17] = [
    "AAA", "AA+", "AA", "AA-", "A+", "A", "A-", "BBB+", "BBB", "BBB-", "BB+", "BB", "BB-", "B+",
    "B", "B-", "CCC",
];

const DEFAULT_ANCHOR: &str = "BBB";
const PERCENT_PER_NOTCH: f64 = 5.0;
const FILLER_BOUNDS: (f64, f64) = (-10.0, 10.0);

/// One parameter swept between two percent bounds
#[derive(Debug, Clone, PartialEq)]
pub struct SweptParam {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub base: Option<f64>,
}

impl SweptParam {
    /// Percent deviation at fraction `t` of the way from lower to upper
    #[inline]
    #[must_use]
    pub fn percent_at(&self, t: f64) -> f64 {
        self.lower * (1.0 - t) + self.upper * t
    }

    /// Axis value at fraction `t`
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        let pct = self.percent_at(t);
        round4(self.base.map_or(pct, |base| base * (1.0 + pct / 100.0)))
    }

    /// Check whether the bounds span a non-empty range
    #[inline]
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_flat(&self) -> bool {
        self.lower == self.upper
    }

    /// +1 when a higher value improves credit quality, -1 for leverage
    /// ratios where higher is worse
    #[must_use]
    pub fn polarity(&self) -> f64 {
        let name = self.name.to_ascii_lowercase();
        if name.starts_with("debtto") || name.starts_with("netdebtto") {
            -1.0
        } else {
            1.0
        }
    }

    fn filler(index: usize) -> Self {
        Self {
            name: format!("axis_{index}"),
            lower: FILLER_BOUNDS.0,
            upper: FILLER_BOUNDS.1,
            base: None,
        }
    }
}

/// Distinct parameters with both bounds present
///
/// Parameters with a non-empty range come first, then flat ones, each
/// group sorted by name.
#[must_use]
pub fn swept_params(request: &Map<String, Value>) -> Vec<SweptParam> {
    let names: BTreeSet<&str> = request
        .keys()
        .filter_map(|key| key.strip_suffix(LOWER_SUFFIX))
        .filter(|name| request.contains_key(&format!("{name}{UPPER_SUFFIX}")))
        .collect();

    let mut params: Vec<SweptParam> = names
        .into_iter()
        .map(|name| SweptParam {
            name: name.to_string(),
            lower: number(request.get(&format!("{name}{LOWER_SUFFIX}"))).unwrap_or(0.0),
            upper: number(request.get(&format!("{name}{UPPER_SUFFIX}"))).unwrap_or(0.0),
            base: number(request.get(name)),
        })
        .collect();
    params.sort_by_key(SweptParam::is_flat);
    params
}

/// Plot type implied by the number of swept parameters
#[inline]
#[must_use]
pub fn plot_type_for(swept: usize) -> PlotType {
    match swept {
        1 => PlotType::OneD,
        2 => PlotType::TwoD,
        _ => PlotType::ThreeD,
    }
}

/// Build the surface for `request`
///
/// Pure function of the request contents.
#[must_use]
pub fn synthesize(request: &Map<String, Value>) -> SurfaceResult {
    let mut params = swept_params(request);
    let plot_type = plot_type_for(params.len());
    params.truncate(plot_type.axes());
    while params.len() < plot_type.axes() {
        params.push(SweptParam::filler(params.len() + 1));
    }

    let anchor = request
        .get("creditRating")
        .and_then(Value::as_str)
        .and_then(|label| RATING_SCALE.iter().position(|r| *r == label))
        .or_else(|| RATING_SCALE.iter().position(|r| *r == DEFAULT_ANCHOR))
        .unwrap_or(RATING_SCALE.len() / 2);

    let grid: Vec<usize> = match plot_type {
        PlotType::OneD => vec![ONE_D_SAMPLES],
        PlotType::TwoD => TWO_D_GRID.to_vec(),
        PlotType::ThreeD => THREE_D_GRID.to_vec(),
    };

    let mut timeseries = IndexMap::new();
    for (index, cell) in grid_cells(&grid).into_iter().enumerate() {
        let fractions: Vec<f64> = cell
            .iter()
            .zip(&grid)
            .map(|(&i, &steps)| fraction(i, steps))
            .collect();

        let mut sample: Vec<Value> = params
            .iter()
            .zip(&fractions)
            .map(|(param, &t)| Value::from(param.value_at(t)))
            .collect();
        sample.push(Value::from(rating_label(anchor, &params, &fractions)));
        timeseries.insert(index.to_string(), sample);
    }

    let names: Vec<String> = params.into_iter().map(|p| p.name).collect();
    let (param_name, param_names) = match plot_type {
        PlotType::OneD => (names.into_iter().next(), None),
        _ => (None, Some(names)),
    };

    SurfaceResult {
        plot_type,
        param_name,
        param_names,
        timeseries,
    }
}

/// Label for one sample: anchor shifted by the mean signed deviation
fn rating_label(anchor: usize, params: &[SweptParam], fractions: &[f64]) -> &'static str {
    let score: f64 = params
        .iter()
        .zip(fractions)
        .map(|(p, &t)| p.polarity() * p.percent_at(t))
        .sum::<f64>()
        / params.len().max(1) as f64;

    #[allow(clippy::cast_possible_truncation)]
    let notches = (score / PERCENT_PER_NOTCH).round() as i64;
    let last = RATING_SCALE.len() as i64 - 1;
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    let index = (anchor as i64).saturating_sub(notches).clamp(0, last) as usize;
    RATING_SCALE[index]
}

/// Row-major enumeration of every cell of `grid`
fn grid_cells(grid: &[usize]) -> Vec<Vec<usize>> {
    grid.iter().fold(vec![Vec::new()], |cells, &steps| {
        cells
            .into_iter()
            .flat_map(|prefix| {
                (0..steps).map(move |i| {
                    let mut cell = prefix.clone();
                    cell.push(i);
                    cell
                })
            })
            .collect()
    })
}

fn fraction(i: usize, steps: usize) -> f64 {
    if steps <= 1 {
        0.0
    } else {
        i as f64 / (steps - 1) as f64
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn round4(v: f64) -> f64 {
    let scaled = v * 10_000.0;
    let rounded = if scaled.is_finite() { scaled.round() / 10_000.0 } else { v };
    rounded.clamp(f64::MIN, f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn unpaired_bounds_are_ignored() {
        let req = request(json!({"roce_lower": -5, "revenue_upper": 5, "fcfToDebt_lower": 1, "fcfToDebt_upper": 2}));
        let names: Vec<String> = swept_params(&req).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["fcfToDebt"]);
    }

    #[test]
    fn one_pair_is_1d_with_ten_samples() {
        let result = synthesize(&request(json!({"roce": 18.3, "roce_lower": -10, "roce_upper": 10})));
        assert_eq!(result.plot_type, PlotType::OneD);
        assert_eq!(result.param_name.as_deref(), Some("roce"));
        assert!(result.param_names.is_none());
        assert_eq!(result.sample_count(), ONE_D_SAMPLES);

        let first = &result.timeseries["0"];
        let last = &result.timeseries["9"];
        assert_eq!(first[0], json!(16.47));
        assert_eq!(last[0], json!(20.13));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn two_pairs_is_2d_grid() {
        let result = synthesize(&request(json!({
            "revenue_lower": -20, "revenue_upper": 20,
            "roce_lower": -5, "roce_upper": 5
        })));
        assert_eq!(result.plot_type, PlotType::TwoD);
        assert_eq!(result.axis_names(), ["revenue", "roce"]);
        assert_eq!(result.sample_count(), 12);
        assert!(result.timeseries.values().all(|s| s.len() == 3));
    }

    #[test]
    fn zero_or_many_pairs_is_3d() {
        let none = synthesize(&Map::new());
        assert_eq!(none.plot_type, PlotType::ThreeD);
        assert_eq!(none.axis_names(), ["axis_1", "axis_2", "axis_3"]);
        assert!(none.sample_count() <= 12);

        let four = synthesize(&request(json!({
            "a_lower": 0, "a_upper": 1, "b_lower": 0, "b_upper": 1,
            "c_lower": 0, "c_upper": 1, "d_lower": 0, "d_upper": 1
        })));
        assert_eq!(four.plot_type, PlotType::ThreeD);
        assert_eq!(four.axis_names(), ["a", "b", "c"]);
        assert!(four.timeseries.values().all(|s| s.len() == 4));
    }

    #[test]
    fn flat_pairs_yield_axes_to_the_swept_one() {
        let result = synthesize(&request(json!({
            "debtToEbitda_lower": 0, "debtToEbitda_upper": 0,
            "ebitdaMargin_lower": 0, "ebitdaMargin_upper": 0,
            "ebitdaToInterest_lower": 0, "ebitdaToInterest_upper": 0,
            "fcfToDebt_lower": 0, "fcfToDebt_upper": 0,
            "netDebtToEbitda_lower": 0, "netDebtToEbitda_upper": 0,
            "revenue_lower": 0, "revenue_upper": 0,
            "roce_lower": -20, "roce_upper": 20,
            "totalAssets_lower": 0, "totalAssets_upper": 0
        })));
        assert_eq!(result.plot_type, PlotType::ThreeD);
        assert_eq!(result.axis_names()[0], "roce");

        let distinct: BTreeSet<String> = result
            .timeseries
            .values()
            .map(|sample| Value::from(sample.clone()).to_string())
            .collect();
        assert!(distinct.len() > 1);
        let labels: BTreeSet<&str> = result.labels().into_iter().collect();
        assert!(labels.len() > 1);
    }

    #[test]
    fn swept_pairs_sort_ahead_of_flat_ones() {
        let req = request(json!({"a_lower": 0, "a_upper": 0, "z_lower": -1, "z_upper": 1}));
        let names: Vec<String> = swept_params(&req).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["z", "a"]);
    }

    #[test]
    fn extreme_bounds_stay_numeric() {
        let result = synthesize(&request(json!({"roce_lower": -1e308, "roce_upper": 1e308})));
        assert!(result.timeseries.values().all(|s| s[0].is_number()));
        assert_eq!(result.timeseries["0"][0], json!(-1e308));
        assert_eq!(result.timeseries["9"][0], json!(1e308));
        assert!(result.labels().iter().all(|l| RATING_SCALE.contains(l)));
    }

    #[test]
    fn labels_come_from_scale() {
        let result = synthesize(&request(json!({"roce_lower": -50, "roce_upper": 50})));
        assert!(result.labels().iter().all(|l| RATING_SCALE.contains(l)));
        // Improving roce moves the label up the scale.
        let first = RATING_SCALE.iter().position(|r| *r == result.labels()[0]).unwrap();
        let last = RATING_SCALE.iter().position(|r| *r == result.labels()[9]).unwrap();
        assert!(last < first);
    }

    #[test]
    fn leverage_ratios_have_inverse_polarity() {
        let result = synthesize(&request(json!({"debtToEbitda_lower": -50, "debtToEbitda_upper": 50})));
        let first = RATING_SCALE.iter().position(|r| *r == result.labels()[0]).unwrap();
        let last = RATING_SCALE.iter().position(|r| *r == result.labels()[9]).unwrap();
        assert!(last > first);
    }

    #[test]
    fn anchor_follows_request_rating() {
        let flat = json!({"roce_lower": 0, "roce_upper": 0, "creditRating": "BB+"});
        let result = synthesize(&request(flat));
        assert!(result.labels().iter().all(|l| *l == "BB+"));
    }

    #[test]
    fn string_bounds_are_parsed() {
        let params = swept_params(&request(json!({"roce_lower": "-2.5", "roce_upper": "x"})));
        assert_eq!(params[0].lower, -2.5);
        assert_eq!(params[0].upper, 0.0);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let req = request(json!({"revenue": 45_200_000, "revenue_lower": -15, "revenue_upper": 15}));
        assert_eq!(synthesize(&req), synthesize(&req));
    }

    #[test]
    fn grid_cells_row_major() {
        assert_eq!(
            grid_cells(&[2, 2]),
            vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]
        );
    }
}
