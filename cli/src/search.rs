use clap::Args;
use eyre::Result;
use pitchline::{series, Boundary, Format, Reducer, Reduction, SearchConfig};
use tracing::warn;

use crate::io;

/// Input and search options shared by every subcommand.
#[derive(Args, Debug)]
pub struct SearchOpts {
    /// Target number of output samples
    #[clap(long, env = "PITCHLINE_MAX_ELEMS", default_value_t = 500)]
    pub max_elems: usize,

    /// JSON record field holding the samples
    #[clap(long, env = "PITCHLINE_FIELD", default_value = "pitches")]
    pub field: String,

    /// Input format (auto, json, csv)
    #[clap(long, default_value = "auto")]
    pub format: String,

    /// Accepted size error, in percent of the reduced length
    #[clap(long, default_value_t = 10.0)]
    pub tolerance: f64,

    /// Refinement rounds after the initial guess
    #[clap(long, default_value_t = 5)]
    pub max_iterations: usize,

    /// Upper bound on the initial epsilon guess
    #[clap(long, default_value_t = 10_000.0)]
    pub epsilon_cap: f64,

    /// Segment boundary handling (exact, legacy)
    #[clap(long, default_value = "exact")]
    pub boundary: String,

    /// Fixed deviation threshold; skips the search
    #[clap(long)]
    pub epsilon: Option<f64>,

    /// Input files [default: stdin]
    pub files: Vec<String>,
}

impl SearchOpts {
    pub fn sources(&self) -> Vec<String> {
        if self.files.is_empty() {
            vec!["stdin".to_string()]
        } else {
            self.files.clone()
        }
    }

    pub fn reducer(&self) -> Result<Reducer> {
        let boundary: Boundary = self.boundary.parse()?;
        Ok(Reducer::new(SearchConfig {
            max_iterations: self.max_iterations,
            tolerance_percent: self.tolerance,
            epsilon_cap: self.epsilon_cap,
            boundary,
        }))
    }

    pub fn input_format(&self) -> Result<Option<Format>> {
        match self.format.as_str() {
            "auto" => Ok(None),
            other => Ok(Some(other.parse()?)),
        }
    }

    pub async fn load(&self, source: &str) -> Result<Vec<f64>> {
        let mut input = io::open(source).await?;
        series::decode_samples(&mut input, self.input_format()?, &self.field)
            .await
            .map_err(|e| eyre::eyre!("decoding {}: {}", source, e))
    }

    pub fn run(&self, reducer: &Reducer, samples: &[f64]) -> Result<Reduction> {
        let reduction = match self.epsilon {
            Some(epsilon) => reducer.reduce_with_epsilon(samples, epsilon)?,
            None => reducer.reduce(samples, self.max_elems)?,
        };
        if self.epsilon.is_none() && !reduction.converged() {
            warn!(
                max_elems = self.max_elems,
                reduced = reduction.values.len(),
                epsilon = reduction.epsilon,
                iterations = reduction.iterations,
                "search did not reach the target size"
            );
        }
        Ok(reduction)
    }
}
