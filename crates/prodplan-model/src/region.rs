//! Feasible-region scenes for two-product plans.
//!
//! A scene is a renderer-neutral description: one boundary line per
//! constraint, vertical feasible segments that together cover the feasible
//! polygon, and the optimal point. It is rebuilt from its inputs every time.

use prodplan_solver::Solution;
use tracing::warn;

use crate::input::{ConstraintSet, ProductSet};
use crate::Error;

/// Number of samples along each axis.
pub const DEFAULT_RESOLUTION: usize = 400;

/// Sample bound used when every constraint limit is zero or negative.
pub const FALLBACK_SAMPLE_BOUND: f64 = 1.0;

pub const SCENE_TITLE: &str = "Feasible Region and Optimal Solution";
pub const OPTIMAL_LABEL: &str = "Optimal solution";

/// Slack allowed when testing a point against a constraint row
const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// How the feasible range of each sampled column is found.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStrategy {
    /// Intersect the half-planes along each column. Exact per column.
    #[default]
    Analytic,
    /// Test every sampled `x2` in the column. Boundaries snap to the grid.
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub resolution: usize,
    pub strategy: FillStrategy,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            strategy: FillStrategy::default(),
        }
    }
}

/// A sampling bound and whether it had to fall back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBound {
    pub value: f64,
    pub degenerate: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind {
    /// `x2 = (limit - a * x1) / b`
    Sloped,
    /// `x1 = limit / a`, the constraint has no `x2` term
    Vertical { x: f64 },
    /// Both coefficients are zero, there is nothing to draw
    Degenerate,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLine {
    pub label: String,
    pub kind: LineKind,
    pub points: Vec<[f64; 2]>,
}

/// Feasible `x2` range at one sampled `x1`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeasibleSegment {
    pub x: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneWarning {
    /// No constraint limit was positive; sampling used `fallback` instead.
    DegenerateSamplingBound { fallback: f64 },
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleRegionScene {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub sample_bound: f64,
    pub constraint_lines: Vec<BoundaryLine>,
    pub feasible_segments: Vec<FeasibleSegment>,
    pub optimal_point: LabeledPoint,
    pub warnings: Vec<SceneWarning>,
}

impl FeasibleRegionScene {
    /// Segment endpoints as plain points, lower end first.
    pub fn feasible_points(&self) -> Vec<[f64; 2]> {
        self.feasible_segments
            .iter()
            .flat_map(|s| [[s.x, s.y_min], [s.x, s.y_max]])
            .collect()
    }

    /// Closed outline of the sampled region: the lower edge left to right, then
    /// the upper edge right to left. Empty when nothing is feasible.
    pub fn outline(&self) -> Vec<[f64; 2]> {
        let lower = self.feasible_segments.iter().map(|s| [s.x, s.y_min]);
        let upper = self.feasible_segments.iter().rev().map(|s| [s.x, s.y_max]);
        lower.chain(upper).collect()
    }
}

/// Twice the largest constraint limit, or [`FALLBACK_SAMPLE_BOUND`] when that
/// is not positive. Limits near `f64::MAX` clamp instead of overflowing.
pub fn default_sample_bound(constraints: &ConstraintSet) -> SampleBound {
    let max_limit = constraints.max_limit();
    if max_limit > 0.0 {
        SampleBound {
            value: (2.0 * max_limit).min(f64::MAX),
            degenerate: false,
        }
    } else {
        SampleBound {
            value: FALLBACK_SAMPLE_BOUND,
            degenerate: true,
        }
    }
}

/// Build a scene with the default options.
pub fn build_scene(
    constraints: &ConstraintSet,
    solution: &Solution,
    axis_labels: (String, String),
    sample_bound: f64,
) -> Result<FeasibleRegionScene, Error> {
    build_scene_with(constraints, solution, axis_labels, sample_bound, &SceneOptions::default())
}

/// Build a scene labelled with the product names and sampled up to the
/// default bound.
pub fn build_product_scene(
    products: &ProductSet,
    constraints: &ConstraintSet,
    solution: &Solution,
    options: &SceneOptions,
) -> Result<FeasibleRegionScene, Error> {
    if products.len() != 2 {
        return Err(Error::NotTwoDimensional(products.len()));
    }
    let names = products.names();
    let bound = default_sample_bound(constraints);

    let mut scene = build_scene_with(
        constraints,
        solution,
        (names[0].clone(), names[1].clone()),
        bound.value,
        options,
    )?;

    if bound.degenerate {
        warn!(fallback = bound.value, "no positive constraint limit, using fallback sample bound");
        scene.warnings.push(SceneWarning::DegenerateSamplingBound { fallback: bound.value });
    }

    Ok(scene)
}

pub fn build_scene_with(
    constraints: &ConstraintSet,
    solution: &Solution,
    axis_labels: (String, String),
    sample_bound: f64,
    options: &SceneOptions,
) -> Result<FeasibleRegionScene, Error> {
    if !solution.is_optimal() {
        return Err(Error::NotOptimal(solution.status));
    }
    if solution.values.len() != 2 {
        return Err(Error::NotTwoDimensional(solution.values.len()));
    }
    if let Some(c) = constraints.iter().find(|c| c.coefficients.len() != 2) {
        return Err(Error::NotTwoDimensional(c.coefficients.len()));
    }
    if !sample_bound.is_finite() || sample_bound <= 0.0 {
        return Err(Error::InvalidSampleBound(sample_bound));
    }

    let rows: Vec<Row> = constraints
        .iter()
        .map(|c| Row {
            a: c.coefficients[0],
            b: c.coefficients[1],
            limit: c.limit,
        })
        .collect();
    let samples = linspace(sample_bound, options.resolution);

    let constraint_lines = constraints
        .iter()
        .zip(&rows)
        .enumerate()
        .map(|(j, (c, row))| boundary_line(c.label(j), row, &samples))
        .collect();

    let feasible_segments = feasible_segments(&rows, &samples, sample_bound, options.strategy);

    let (x_label, y_label) = axis_labels;

    Ok(FeasibleRegionScene {
        title: SCENE_TITLE.to_string(),
        x_label,
        y_label,
        sample_bound,
        constraint_lines,
        feasible_segments,
        optimal_point: LabeledPoint {
            label: OPTIMAL_LABEL.to_string(),
            x: solution.values[0],
            y: solution.values[1],
        },
        warnings: Vec::new(),
    })
}

/// `a * x1 + b * x2 <= limit`
#[derive(Debug, Clone, Copy)]
struct Row {
    a: f64,
    b: f64,
    limit: f64,
}

impl Row {
    fn holds(&self, x: f64, y: f64) -> bool {
        self.a * x + self.b * y <= self.limit + FEASIBILITY_TOLERANCE
    }
}

fn is_feasible(rows: &[Row], x: f64, y: f64) -> bool {
    x >= 0.0 && y >= 0.0 && rows.iter().all(|row| row.holds(x, y))
}

fn linspace(bound: f64, resolution: usize) -> Vec<f64> {
    let n = resolution.max(2);
    let step = bound / (n - 1) as f64;
    (0..n).map(|k| if k == n - 1 { bound } else { k as f64 * step }).collect()
}

fn boundary_line(label: String, row: &Row, samples: &[f64]) -> BoundaryLine {
    let (kind, points) = if row.b != 0.0 {
        let points = samples.iter().map(|&x| [x, (row.limit - row.a * x) / row.b]).collect();
        (LineKind::Sloped, points)
    } else if row.a != 0.0 {
        let x = row.limit / row.a;
        (LineKind::Vertical { x }, samples.iter().map(|&y| [x, y]).collect())
    } else {
        (LineKind::Degenerate, Vec::new())
    };

    BoundaryLine { label, kind, points }
}

/// One segment per sampled `x1` column that has any feasible `x2`.
#[cfg(not(feature = "parallel"))]
fn feasible_segments(rows: &[Row], samples: &[f64], bound: f64, strategy: FillStrategy) -> Vec<FeasibleSegment> {
    samples
        .iter()
        .filter_map(|&x| column_segment(rows, x, samples, bound, strategy))
        .collect()
}

/// Columns are independent, so they are computed on the rayon pool.
#[cfg(feature = "parallel")]
fn feasible_segments(rows: &[Row], samples: &[f64], bound: f64, strategy: FillStrategy) -> Vec<FeasibleSegment> {
    use rayon::prelude::*;

    samples
        .par_iter()
        .filter_map(|&x| column_segment(rows, x, samples, bound, strategy))
        .collect()
}

fn column_segment(rows: &[Row], x: f64, samples: &[f64], bound: f64, strategy: FillStrategy) -> Option<FeasibleSegment> {
    match strategy {
        FillStrategy::Analytic => analytic_segment(rows, x, bound),
        FillStrategy::Grid => grid_segment(rows, x, samples),
    }
}

fn analytic_segment(rows: &[Row], x: f64, bound: f64) -> Option<FeasibleSegment> {
    let mut y_min: f64 = 0.0;
    let mut y_max = bound;

    for row in rows {
        let rest = row.limit - row.a * x;
        if row.b > 0.0 {
            y_max = y_max.min(rest / row.b);
        } else if row.b < 0.0 {
            y_min = y_min.max(rest / row.b);
        } else if rest < -FEASIBILITY_TOLERANCE {
            return None;
        }
    }

    if y_min > y_max + FEASIBILITY_TOLERANCE {
        return None;
    }
    Some(FeasibleSegment {
        x,
        y_min,
        y_max: y_max.max(y_min),
    })
}

fn grid_segment(rows: &[Row], x: f64, samples: &[f64]) -> Option<FeasibleSegment> {
    let mut feasible = samples.iter().copied().filter(|&y| is_feasible(rows, x, y));
    let first = feasible.next()?;
    let last = feasible.last().unwrap_or(first);
    Some(FeasibleSegment {
        x,
        y_min: first,
        y_max: last,
    })
}

#[cfg(test)]
mod tests {
    use prodplan_solver::SolutionStatus;

    use super::*;
    use crate::input::{Constraint, Product};
    use crate::optimize::solve;

    fn scenario_a() -> (ProductSet, ConstraintSet) {
        let products = ProductSet::new(vec![Product::new("P1", 3.0), Product::new("P2", 5.0)]).unwrap();
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0, 0.0], 4.0),
            Constraint::new(vec![0.0, 2.0], 12.0),
            Constraint::new(vec![3.0, 2.0], 18.0),
        ])
        .unwrap();
        (products, constraints)
    }

    fn labels() -> (String, String) {
        ("P1".to_string(), "P2".to_string())
    }

    #[test]
    fn test_scene_for_scenario_a() {
        let (products, constraints) = scenario_a();
        let solution = solve(&products, &constraints).unwrap();

        let scene = build_product_scene(&products, &constraints, &solution, &SceneOptions::default()).unwrap();

        assert_eq!(scene.title, SCENE_TITLE);
        assert_eq!(scene.x_label, "P1");
        assert_eq!(scene.y_label, "P2");
        assert_eq!(scene.sample_bound, 36.0);
        assert!(scene.warnings.is_empty());
        assert_eq!(scene.constraint_lines.len(), 3);
        assert_eq!(scene.optimal_point.label, OPTIMAL_LABEL);
        assert!((scene.optimal_point.x - 2.0).abs() < 1e-6);
        assert!((scene.optimal_point.y - 6.0).abs() < 1e-6);

        // Every column lies within x1 <= 4 and respects every constraint
        assert!(!scene.feasible_segments.is_empty());
        for s in &scene.feasible_segments {
            assert!(s.x <= 4.0 + 1e-9, "x = {}", s.x);
            assert_eq!(s.y_min, 0.0);
            assert!(s.y_max <= 6.0 + 1e-9);
            assert!(3.0 * s.x + 2.0 * s.y_max <= 18.0 + 1e-6);
        }
    }

    #[test]
    fn test_vertical_line() {
        let (products, constraints) = scenario_a();
        let solution = solve(&products, &constraints).unwrap();

        let scene = build_scene(&constraints, &solution, labels(), 10.0).unwrap();

        let vertical = &scene.constraint_lines[0];
        assert_eq!(vertical.label, "Constraint 1");
        assert_eq!(vertical.kind, LineKind::Vertical { x: 4.0 });
        assert_eq!(vertical.points.len(), DEFAULT_RESOLUTION);
        assert!(vertical.points.iter().all(|p| p[0] == 4.0 && p[1].is_finite()));

        let horizontal = &scene.constraint_lines[1];
        assert_eq!(horizontal.kind, LineKind::Sloped);
        assert!(horizontal.points.iter().all(|p| (p[1] - 6.0).abs() < 1e-12));

        assert!(
            scene
                .constraint_lines
                .iter()
                .flat_map(|line| &line.points)
                .all(|p| p[0].is_finite() && p[1].is_finite())
        );
    }

    #[test]
    fn test_degenerate_sampling_bound() {
        let products = ProductSet::new(vec![Product::new("P1", 1.0), Product::new("P2", 1.0)]).unwrap();
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0, 1.0], 0.0),
            Constraint::new(vec![1.0, -1.0], 0.0),
        ])
        .unwrap();

        let bound = default_sample_bound(&constraints);
        assert_eq!(
            bound,
            SampleBound {
                value: FALLBACK_SAMPLE_BOUND,
                degenerate: true
            }
        );

        let solution = solve(&products, &constraints).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);

        let scene = build_product_scene(&products, &constraints, &solution, &SceneOptions::default()).unwrap();

        assert_eq!(scene.sample_bound, FALLBACK_SAMPLE_BOUND);
        assert_eq!(
            scene.warnings,
            vec![SceneWarning::DegenerateSamplingBound {
                fallback: FALLBACK_SAMPLE_BOUND
            }]
        );
        // Only the origin is feasible
        assert_eq!(scene.feasible_segments.len(), 1);
        assert_eq!(scene.feasible_segments[0], FeasibleSegment { x: 0.0, y_min: 0.0, y_max: 0.0 });
    }

    #[test]
    fn test_negative_limits_use_fallback() {
        let constraints = ConstraintSet::new(vec![Constraint::new(vec![-1.0, -1.0], -2.0)]).unwrap();
        assert!(default_sample_bound(&constraints).degenerate);
    }

    #[test]
    fn test_not_optimal_builds_nothing() {
        let (_, constraints) = scenario_a();

        for solution in [Solution::infeasible(), Solution::unbounded(), Solution::error("boom")] {
            let err = build_scene(&constraints, &solution, labels(), 10.0).unwrap_err();
            assert_eq!(err, Error::NotOptimal(solution.status));
        }
    }

    #[test]
    fn test_requires_two_products() {
        let products = ProductSet::new(vec![
            Product::new("A", 1.0),
            Product::new("B", 1.0),
            Product::new("C", 1.0),
        ])
        .unwrap();
        let constraints = ConstraintSet::new(vec![Constraint::new(vec![1.0, 1.0, 1.0], 3.0)]).unwrap();
        let solution = solve(&products, &constraints).unwrap();

        let err = build_product_scene(&products, &constraints, &solution, &SceneOptions::default()).unwrap_err();
        assert_eq!(err, Error::NotTwoDimensional(3));

        let err = build_scene(&constraints, &solution, labels(), 10.0).unwrap_err();
        assert_eq!(err, Error::NotTwoDimensional(3));
    }

    #[test]
    fn test_invalid_sample_bound() {
        let (products, constraints) = scenario_a();
        let solution = solve(&products, &constraints).unwrap();

        for bound in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = build_scene(&constraints, &solution, labels(), bound).unwrap_err();
            assert!(matches!(err, Error::InvalidSampleBound(_)), "{err:?}");
        }
    }

    #[test]
    fn test_non_negativity_trims_region() {
        // x2 >= x1 - 1 written as x1 - x2 <= 1; without the x2 >= 0 bound the
        // columns near x1 = 0 would extend below the axis
        let products = ProductSet::new(vec![Product::new("P1", 1.0), Product::new("P2", 1.0)]).unwrap();
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0, -1.0], 1.0),
            Constraint::new(vec![1.0, 1.0], 5.0),
        ])
        .unwrap();
        let solution = solve(&products, &constraints).unwrap();

        for strategy in [FillStrategy::Analytic, FillStrategy::Grid] {
            let options = SceneOptions { resolution: 101, strategy };
            let scene = build_scene_with(&constraints, &solution, labels(), 10.0, &options).unwrap();
            assert!(scene.feasible_segments.iter().all(|s| s.y_min >= 0.0 && s.x >= 0.0));
            assert!(scene.feasible_segments.iter().all(|s| s.x <= 3.0 + 1e-9));
        }
    }

    #[test]
    fn test_grid_matches_analytic_within_a_step() {
        let (products, constraints) = scenario_a();
        let solution = solve(&products, &constraints).unwrap();
        let step = 36.0 / (DEFAULT_RESOLUTION - 1) as f64;

        let analytic = build_scene(&constraints, &solution, labels(), 36.0).unwrap();
        let grid = build_scene_with(
            &constraints,
            &solution,
            labels(),
            36.0,
            &SceneOptions {
                strategy: FillStrategy::Grid,
                ..SceneOptions::default()
            },
        )
        .unwrap();

        assert_eq!(analytic.feasible_segments.len(), grid.feasible_segments.len());
        for (a, g) in analytic.feasible_segments.iter().zip(&grid.feasible_segments) {
            assert_eq!(a.x, g.x);
            assert_eq!(a.y_min, g.y_min);
            assert!(a.y_max >= g.y_max - 1e-9);
            assert!(a.y_max - g.y_max <= step + 1e-9, "column {}: {} vs {}", a.x, a.y_max, g.y_max);
        }
    }

    #[test]
    fn test_huge_limits_clamp_sample_bound() {
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0, 0.0], f64::MAX),
            Constraint::new(vec![0.0, 1.0], 4.0),
        ])
        .unwrap();

        let bound = default_sample_bound(&constraints);

        assert_eq!(
            bound,
            SampleBound {
                value: f64::MAX,
                degenerate: false
            }
        );

        let constraints = ConstraintSet::new(vec![Constraint::new(vec![1.0, 1.0], f64::MAX / 4.0)]).unwrap();
        assert_eq!(default_sample_bound(&constraints).value, f64::MAX / 2.0);
    }

    #[test]
    fn test_degenerate_row_has_no_line() {
        let (products, _) = scenario_a();
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![0.0, 0.0], 1.0),
            Constraint::new(vec![1.0, 1.0], 4.0),
        ])
        .unwrap();
        let solution = solve(&products, &constraints).unwrap();

        let scene = build_scene(&constraints, &solution, labels(), 8.0).unwrap();

        assert_eq!(scene.constraint_lines[0].kind, LineKind::Degenerate);
        assert!(scene.constraint_lines[0].points.is_empty());
        assert!(!scene.feasible_segments.is_empty());
    }

    #[test]
    fn test_outline_and_points() {
        let (products, constraints) = scenario_a();
        let solution = solve(&products, &constraints).unwrap();
        let options = SceneOptions {
            resolution: 5,
            ..SceneOptions::default()
        };

        // Samples 0, 2, 4, 6, 8; columns 6 and 8 violate x1 <= 4
        let scene = build_scene_with(&constraints, &solution, labels(), 8.0, &options).unwrap();

        assert_eq!(scene.feasible_segments.len(), 3);
        assert_eq!(scene.feasible_points().len(), 6);
        assert_eq!(
            scene.outline(),
            vec![[0.0, 0.0], [2.0, 0.0], [4.0, 0.0], [4.0, 3.0], [2.0, 6.0], [0.0, 6.0]]
        );
    }

    #[test]
    fn test_resolution_is_at_least_two() {
        assert_eq!(linspace(3.0, 0), vec![0.0, 3.0]);
        assert_eq!(linspace(3.0, 4), vec![0.0, 1.0, 2.0, 3.0]);
    }
}
