use std::io::Write;

use serde::Serialize;
use tabwriter::TabWriter;

use crate::{Reduction, Status};

/// Before/after figures for one reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub samples: usize,
    pub reduced: usize,
    pub diff: usize,
    /// Share of samples kept, in percent.
    pub percent: f64,
    pub average: f64,
    pub average_reduced: f64,
    pub epsilon: f64,
    pub iterations: usize,
    pub status: Status,
}

impl Summary {
    pub fn new(samples: &[f64], reduction: &Reduction) -> Self {
        let reduced = reduction.values.len();
        let percent = if samples.is_empty() {
            0.0
        } else {
            reduced as f64 * 100.0 / samples.len() as f64
        };
        Self {
            samples: samples.len(),
            reduced,
            diff: samples.len().saturating_sub(reduced),
            percent,
            average: mean(samples),
            average_reduced: mean(&reduction.values),
            epsilon: reduction.epsilon,
            iterations: reduction.iterations,
            status: reduction.status,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn report_text(s: &Summary, w: &mut dyn Write) -> eyre::Result<()> {
    let mut tw = TabWriter::new(w);

    write!(
        tw,
        "Samples\t[total, reduced, diff, kept]\t{}, {}, {}, {:.2}%\n\
         Average\t[original, reduced]\t{:.4}, {:.4}\n\
         Search\t[epsilon, iterations, status]\t{:.6}, {}, {}\n",
        s.samples,
        s.reduced,
        s.diff,
        s.percent,
        s.average,
        s.average_reduced,
        s.epsilon,
        s.iterations,
        s.status,
    )?;

    tw.flush()?;
    Ok(())
}

pub fn report_json(s: &Summary, w: &mut dyn Write) -> eyre::Result<()> {
    serde_json::to_writer(&mut *w, s)?;
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Summary {
        let samples = [1.0, 2.0, 3.0, 4.0, 10.0];
        let reduction = Reduction {
            values: vec![1.0, 4.0, 10.0],
            indices: vec![0, 3, 4],
            epsilon: 0.5,
            iterations: 3,
            status: Status::Exhausted,
        };
        Summary::new(&samples, &reduction)
    }

    #[test]
    fn summary_figures() {
        let s = summary();
        assert_eq!(s.samples, 5);
        assert_eq!(s.reduced, 3);
        assert_eq!(s.diff, 2);
        assert_eq!(s.percent, 60.0);
        assert_eq!(s.average, 4.0);
        assert_eq!(s.average_reduced, 5.0);
        assert_eq!(s.status, Status::Exhausted);
    }

    #[test]
    fn text_report() {
        let mut buf = Vec::new();
        report_text(&summary(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Samples"));
        assert!(lines[0].ends_with("5, 3, 2, 60.00%"));
        assert!(lines[1].ends_with("4.0000, 5.0000"));
        assert!(lines[2].ends_with("0.500000, 3, exhausted"));
        // Columns line up.
        let col = lines[0].find('[').unwrap();
        assert!(lines.iter().all(|l| l.find('[') == Some(col)));
    }

    #[test]
    fn json_report() {
        let mut buf = Vec::new();
        report_json(&summary(), &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["samples"], 5);
        assert_eq!(v["reduced"], 3);
        assert_eq!(v["percent"], 60.0);
        assert_eq!(v["status"], "exhausted");
    }
}
