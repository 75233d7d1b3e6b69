//! Evaluation counters and latency statistics for the dashboard.

use crate::types::Verdict;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by all request handlers
pub struct DashboardMetrics {
    /// Completed evaluations
    pub evaluations: AtomicU64,
    /// Evaluations with a fraud verdict
    pub fraud_verdicts: AtomicU64,
    /// Evaluations aborted by a model failure
    pub failures: AtomicU64,
    /// Submissions rejected before evaluation
    pub rejected_inputs: AtomicU64,
    /// Evaluation times (in microseconds)
    evaluation_times: RwLock<Vec<u64>>,
    /// Fraud probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl DashboardMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            evaluations: AtomicU64::new(0),
            fraud_verdicts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            rejected_inputs: AtomicU64::new(0),
            evaluation_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a completed evaluation
    pub fn record_evaluation(&self, elapsed: Duration, fraud_probability: f64, verdict: Verdict) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        if verdict == Verdict::Fraud {
            self.fraud_verdicts.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.evaluation_times.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (fraud_probability.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record an evaluation aborted by the model layer
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected submission
    pub fn record_rejected(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get evaluation time statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let times = match self.evaluation_times.read() {
            Ok(times) => times,
            Err(_) => return LatencyStats::default(),
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Get fraud probability distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            fraud_verdicts: self.fraud_verdicts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            latency: self.get_latency_stats(),
            score_distribution: self.get_score_distribution(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let fraud_rate = if snapshot.evaluations > 0 {
            (snapshot.fraud_verdicts as f64 / snapshot.evaluations as f64) * 100.0
        } else {
            0.0
        };
        let latency = &snapshot.latency;

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUD DASHBOARD - METRICS SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Evaluations: {:>8}  │  Fraud verdicts: {:>8} ({:>5.1}%) ║",
            snapshot.evaluations, snapshot.fraud_verdicts, fraud_rate
        );
        info!(
            "║ Failures:    {:>8}  │  Rejected inputs: {:>8}         ║",
            snapshot.failures, snapshot.rejected_inputs
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Evaluation Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            latency.mean_us, latency.p50_us, latency.p95_us, latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        let total: u64 = snapshot.score_distribution.iter().sum();
        for (i, &count) in snapshot.score_distribution.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluation time statistics
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable view served at `/api/metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub evaluations: u64,
    pub fraud_verdicts: u64,
    pub failures: u64,
    pub rejected_inputs: u64,
    pub latency: LatencyStats,
    pub score_distribution: [u64; 10],
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = DashboardMetrics::new();

        metrics.record_evaluation(Duration::from_micros(100), 0.05, Verdict::Legitimate);
        metrics.record_evaluation(Duration::from_micros(300), 0.95, Verdict::Fraud);
        metrics.record_evaluation(Duration::from_micros(200), 1.0, Verdict::Fraud);
        metrics.record_failure();
        metrics.record_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.evaluations, 3);
        assert_eq!(snapshot.fraud_verdicts, 2);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.rejected_inputs, 1);
        assert_eq!(snapshot.score_distribution[0], 1);
        assert_eq!(snapshot.score_distribution[9], 2);
    }

    #[test]
    fn test_latency_stats() {
        let metrics = DashboardMetrics::new();
        assert_eq!(metrics.get_latency_stats(), LatencyStats::default());

        for us in [100, 200, 300, 400] {
            metrics.record_evaluation(Duration::from_micros(us), 0.1, Verdict::Legitimate);
        }

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.p50_us, 300);
        assert_eq!(stats.max_us, 400);
    }
}
