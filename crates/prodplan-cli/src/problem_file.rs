//! JSON problem files.
//!
//! ```json
//! {
//!   "products": [{"name": "P1", "unit_profit": 3}, {"name": "P2", "unit_profit": 5}],
//!   "constraints": [{"name": "labour", "coefficients": [1, 0], "limit": 4}]
//! }
//! ```

use std::path::{Path, PathBuf};

use prodplan_model::{check_shape, ConstraintSet, ProductSet};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid problem file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid problem: {0}")]
    Model(#[from] prodplan_model::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProblemFile {
    pub products: ProductSet,
    pub constraints: ConstraintSet,
}

impl ProblemFile {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Parse and shape-check a problem.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let file: ProblemFile = serde_json::from_str(source)?;
        check_shape(&file.products, &file.constraints)?;
        Ok(file)
    }
}
