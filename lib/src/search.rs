//! Threshold search that steers the simplifier towards a target size.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Point;
use crate::simplify::{simplify_indices, Boundary};
use crate::{Error, Result};

// An InitialEpsilon picks the threshold the search starts from, given the
// input length and the requested output size.
pub trait InitialEpsilon: Send + Sync {
    fn initial(&self, samples: usize, target: usize) -> f64;
}

impl<F> InitialEpsilon for F
where
    F: Fn(usize, usize) -> f64 + Send + Sync,
{
    fn initial(&self, samples: usize, target: usize) -> f64 {
        self(samples, target)
    }
}

/// Assumes the output size falls off as a power of epsilon:
/// `10^(sqrt(samples / target) - 1)`, capped at `cap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawGuess {
    pub cap: f64,
}

impl Default for PowerLawGuess {
    fn default() -> Self {
        Self { cap: 10_000.0 }
    }
}

impl InitialEpsilon for PowerLawGuess {
    fn initial(&self, samples: usize, target: usize) -> f64 {
        let zeros = (samples as f64 / target as f64).sqrt();
        10f64.powf(zeros - 1.0).min(self.cap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Refinement rounds after the initial guess.
    pub max_iterations: usize,
    /// Accepted relative error, in percent of the reduced length.
    pub tolerance_percent: f64,
    /// Upper bound on the default initial guess.
    pub epsilon_cap: f64,
    pub boundary: Boundary,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            tolerance_percent: 10.0,
            epsilon_cap: PowerLawGuess::default().cap,
            boundary: Boundary::Exact,
        }
    }
}

/// One simplification run inside the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Iteration {
    /// 0 for the initial guess, then one per refinement.
    pub round: usize,
    pub epsilon: f64,
    pub lower: f64,
    pub upper: f64,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Output size landed within tolerance of the target.
    Converged,
    /// Iteration budget ran out; the last reduction is returned as is.
    Exhausted,
    /// Target was not smaller than the input, so nothing was removed.
    Passthrough,
    /// A caller-chosen epsilon was applied once, without searching.
    Fixed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Status::Converged => "converged",
            Status::Exhausted => "exhausted",
            Status::Passthrough => "passthrough",
            Status::Fixed => "fixed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reduction {
    pub values: Vec<f64>,
    /// Input positions of `values`.
    pub indices: Vec<usize>,
    pub epsilon: f64,
    pub iterations: usize,
    pub status: Status,
}

impl Reduction {
    pub fn converged(&self) -> bool {
        matches!(self.status, Status::Converged | Status::Passthrough)
    }

    fn passthrough(samples: &[f64]) -> Self {
        Self {
            values: samples.to_vec(),
            indices: (0..samples.len()).collect(),
            epsilon: 0.0,
            iterations: 0,
            status: Status::Passthrough,
        }
    }
}

type Observer = Box<dyn Fn(&Iteration) + Send + Sync>;

pub struct Reducer {
    config: SearchConfig,
    initial: Box<dyn InitialEpsilon>,
    observer: Option<Observer>,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reducer")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Reducer {
    pub fn new(config: SearchConfig) -> Self {
        let initial = Box::new(PowerLawGuess {
            cap: config.epsilon_cap,
        });
        Self {
            config,
            initial,
            observer: None,
        }
    }

    /// Replace the initial guess strategy.
    pub fn initial_epsilon(mut self, strategy: impl InitialEpsilon + 'static) -> Self {
        self.initial = Box::new(strategy);
        self
    }

    /// Call `f` after every simplification run of the search.
    pub fn observe(mut self, f: impl Fn(&Iteration) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Reduce `samples` to roughly `target` values.
    ///
    /// The search bisects epsilon inside `[0, sqrt(samples.len())]`, starting
    /// from the configured initial guess, and stops as soon as
    /// `|len - target| / len` drops under the tolerance. When the budget runs
    /// out the last reduction is returned with [`Status::Exhausted`].
    pub fn reduce(&self, samples: &[f64], target: usize) -> Result<Reduction> {
        validate(samples)?;
        if target == 0 {
            return Err(Error::invalid("target size must be positive"));
        }
        let tolerance = self.config.tolerance_percent;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(Error::invalid(format!(
                "tolerance must be a positive percentage, got {tolerance}"
            )));
        }
        if target >= samples.len() {
            debug!(samples = samples.len(), target, "target not below input size, passing through");
            return Ok(Reduction::passthrough(samples));
        }

        let points = to_points(samples);
        let n = samples.len();

        let mut epsilon = self.initial.initial(n, target);
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::invalid(format!(
                "initial epsilon must be a non-negative number, got {epsilon}"
            )));
        }
        let mut lower = 0.0;
        let mut upper = (n as f64).sqrt();

        let mut kept = simplify_indices(&points, epsilon, self.config.boundary)?;
        self.record(Iteration {
            round: 0,
            epsilon,
            lower,
            upper,
            len: kept.len(),
        });

        let mut iterations = 0;
        while !self.settled(kept.len(), target) && iterations < self.config.max_iterations {
            match kept.len().cmp(&target) {
                Ordering::Greater => {
                    lower = epsilon;
                    epsilon = (epsilon + upper) / 2.0;
                }
                Ordering::Less => {
                    upper = epsilon;
                    epsilon = (epsilon + lower) / 2.0;
                }
                Ordering::Equal => break,
            }
            iterations += 1;

            kept = simplify_indices(&points, epsilon, self.config.boundary)?;
            self.record(Iteration {
                round: iterations,
                epsilon,
                lower,
                upper,
                len: kept.len(),
            });
        }

        let status = if self.settled(kept.len(), target) {
            Status::Converged
        } else {
            debug!(wanted = target, len = kept.len(), epsilon, "search exhausted");
            Status::Exhausted
        };

        Ok(Reduction {
            values: kept.iter().map(|&i| samples[i]).collect(),
            indices: kept,
            epsilon,
            iterations,
            status,
        })
    }

    /// Simplify once at a fixed `epsilon`, skipping the search.
    pub fn reduce_with_epsilon(&self, samples: &[f64], epsilon: f64) -> Result<Reduction> {
        validate(samples)?;
        if samples.len() < 2 {
            return Ok(Reduction::passthrough(samples));
        }

        let kept = simplify_indices(&to_points(samples), epsilon, self.config.boundary)?;
        debug!(epsilon, len = kept.len(), "simplified with fixed epsilon");

        Ok(Reduction {
            values: kept.iter().map(|&i| samples[i]).collect(),
            indices: kept,
            epsilon,
            iterations: 0,
            status: Status::Fixed,
        })
    }

    // Relative error is measured against the reduced length, not the target.
    fn settled(&self, len: usize, target: usize) -> bool {
        if len == target {
            return true;
        }
        let err = (len as f64 - target as f64).abs() / len as f64 * 100.0;
        err < self.config.tolerance_percent
    }

    fn record(&self, it: Iteration) {
        debug!(
            round = it.round,
            epsilon = it.epsilon,
            lower = it.lower,
            upper = it.upper,
            len = it.len,
            "simplified"
        );
        if let Some(observer) = &self.observer {
            observer(&it);
        }
    }
}

/// Reduce `samples` to roughly `target` values with the default search settings.
pub fn reduce(samples: &[f64], target: usize) -> Result<Reduction> {
    Reducer::default().reduce(samples, target)
}

fn validate(samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        return Err(Error::invalid("sample sequence is empty"));
    }
    if let Some(i) = samples.iter().position(|v| !v.is_finite()) {
        return Err(Error::invalid(format!(
            "sample {i} is not a finite number: {}",
            samples[i]
        )));
    }
    let (lo, hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !(hi - lo).is_finite() {
        return Err(Error::invalid(format!("sample range [{lo}, {hi}] overflows")));
    }
    Ok(())
}

fn to_points(samples: &[f64]) -> Vec<Point> {
    samples.iter().copied().enumerate().map(Point::from).collect()
}
