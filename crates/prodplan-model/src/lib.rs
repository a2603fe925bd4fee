//! Production plan optimization.
//!
//! Turns products and resource constraints into a profit-maximizing linear
//! program, solves it, and for two products describes the feasible region as
//! a renderer-neutral scene.

pub mod builder;
pub mod error;
pub mod input;
pub mod optimize;
pub mod region;
pub mod report;

pub use builder::{build_problem, check_shape};
pub use error::Error;
pub use input::{Constraint, ConstraintSet, Product, ProductSet};
pub use optimize::{solve, solve_with, SolutionExt};
pub use region::{
    build_product_scene, build_scene, build_scene_with, default_sample_bound, BoundaryLine, FeasibleRegionScene,
    FeasibleSegment, FillStrategy, LabeledPoint, LineKind, SampleBound, SceneOptions, SceneWarning,
};
pub use report::{format_currency, status_message, Report};

pub use prodplan_solver::{Solution, SolutionStatus};
