// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Request profiling metrics.
//!
//! [`RequestMetrics`] separates the time spent marshalling inputs from the
//! time spent inside the backend, which is what tells a caller whether a
//! slow request is their data or the computation.

use std::time::Duration;

/// Timing and volume figures for one submitted request.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RequestMetrics {
    /// Total wall-clock time of `submit`.
    pub total_duration: Duration,
    /// Time spent converting bound inputs into buffers.
    pub marshal_duration: Duration,
    /// Time spent inside the backend call.
    pub backend_duration: Duration,
    /// Number of bound inputs.
    pub num_inputs: usize,
    /// Number of outputs returned to the caller.
    pub num_outputs: usize,
    /// Elements across all input buffers.
    pub input_elements: usize,
    /// Elements across all returned output buffers.
    pub output_elements: usize,
    /// Inputs whose element kind was converted to the declared kind.
    pub coerced_inputs: usize,
}

impl RequestMetrics {
    /// Creates an empty metrics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one marshalled input.
    pub fn record_input(&mut self, elements: usize, coerced: bool) {
        self.num_inputs += 1;
        self.input_elements += elements;
        if coerced {
            self.coerced_inputs += 1;
        }
    }

    /// Records one returned output.
    pub fn record_output(&mut self, elements: usize) {
        self.num_outputs += 1;
        self.output_elements += elements;
    }

    /// Finalises metrics with the phase durations.
    pub fn finalise(&mut self, marshal: Duration, backend: Duration, total: Duration) {
        self.marshal_duration = marshal;
        self.backend_duration = backend;
        self.total_duration = total;
    }

    /// Share of the total time spent in the backend, in percent.
    pub fn backend_share(&self) -> f64 {
        let total = self.total_duration.as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        self.backend_duration.as_secs_f64() / total * 100.0
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "Request: {:.3}ms total, {:.3}ms marshal, {:.3}ms backend ({:.0}%), \
             {} inputs ({} elements, {} coerced), {} outputs ({} elements)",
            self.total_duration.as_secs_f64() * 1000.0,
            self.marshal_duration.as_secs_f64() * 1000.0,
            self.backend_duration.as_secs_f64() * 1000.0,
            self.backend_share(),
            self.num_inputs,
            self.input_elements,
            self.coerced_inputs,
            self.num_outputs,
            self.output_elements,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let m = RequestMetrics::new();
        assert_eq!(m.backend_share(), 0.0);
        assert_eq!(m.num_inputs, 0);
    }

    #[test]
    fn test_record_and_finalise() {
        let mut m = RequestMetrics::new();
        m.record_input(2, false);
        m.record_input(3, true);
        m.record_output(4);
        m.finalise(
            Duration::from_millis(2),
            Duration::from_millis(6),
            Duration::from_millis(10),
        );

        assert_eq!(m.num_inputs, 2);
        assert_eq!(m.input_elements, 5);
        assert_eq!(m.coerced_inputs, 1);
        assert_eq!(m.output_elements, 4);
        assert!((m.backend_share() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_summary_format() {
        let mut m = RequestMetrics::new();
        m.record_input(1, true);
        m.record_output(1);
        m.finalise(Duration::ZERO, Duration::ZERO, Duration::from_millis(1));

        let s = m.summary();
        assert!(s.contains("Request:"));
        assert!(s.contains("1 inputs (1 elements, 1 coerced)"));
        assert!(s.contains("1 outputs"));
    }
}
