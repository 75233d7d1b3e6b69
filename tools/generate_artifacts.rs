//! Demo Artifact Generator
//!
//! Writes a model artifact and a matching explainer artifact for the dashboard.
//! Scaler statistics and the explainer background are computed from a synthetic
//! sample of legitimate and suspicious transactions; the estimator weights are
//! fixed demo values, not a trained model.
//!
//! Usage: `generate-artifacts [out_dir] [samples] [fraud_rate] [seed]`

use fraud_dashboard::models::explainer::LinearExplainer;
use fraud_dashboard::models::logistic::{LogisticPipeline, LogisticRegression};
use fraud_dashboard::preprocessor::{Preprocessor, StandardScaler};
use fraud_dashboard::types::{NumericField, TransactionRecord, TransactionType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::info;

/// Demo weights, in `cat__type_*` (sorted) then `num__*` order
const COEFFICIENTS: [f64; 10] = [
    -1.2, // CASH_IN
    1.1,  // CASH_OUT
    -1.5, // DEPOSIT
    -2.0, // PAYMENT
    1.6,  // TRANSFER
    2.4,  // amount
    1.8,  // oldbalanceOrg
    -2.6, // newbalanceOrig
    -0.4, // oldbalanceDest
    0.3,  // newbalanceDest
];
const INTERCEPT: f64 = -4.0;

/// Defaults used for the bundled `models/*.json`
const DEFAULT_SAMPLES: usize = 5_000;
const DEFAULT_FRAUD_RATE: f64 = 0.1;
const DEFAULT_SEED: u64 = 42;

/// Synthetic transaction generator
struct TransactionGenerator {
    rng: StdRng,
}

impl TransactionGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Everyday transaction: modest amount, balances move consistently
    fn generate_legitimate(&mut self) -> TransactionRecord {
        let tx_type = TransactionType::ALL[self.rng.gen_range(0..TransactionType::ALL.len())];
        let amount: f64 = self.rng.gen_range(10.0..2_000.0);
        let old_orig: f64 = self.rng.gen_range(0.0..20_000.0);
        let old_dest: f64 = self.rng.gen_range(0.0..50_000.0);

        let (new_orig, new_dest) = match tx_type {
            TransactionType::Deposit | TransactionType::CashIn => (old_orig + amount, old_dest),
            _ => ((old_orig - amount).max(0.0), old_dest + amount),
        };

        TransactionRecord::new(tx_type, amount)
            .with_sender_balances(old_orig, new_orig)
            .with_receiver_balances(old_dest, new_dest)
    }

    /// Account drain: large transfer or cash-out emptying the sender
    fn generate_suspicious(&mut self) -> TransactionRecord {
        let tx_type = if self.rng.gen_bool(0.5) {
            TransactionType::Transfer
        } else {
            TransactionType::CashOut
        };
        let amount: f64 = self.rng.gen_range(5_000.0..200_000.0);

        TransactionRecord::new(tx_type, amount)
            .with_sender_balances(amount, 0.0)
            .with_receiver_balances(0.0, 0.0)
    }
}

/// Generate the synthetic sample and fit both artifacts on it
fn build_artifacts(
    samples: usize,
    fraud_rate: f64,
    seed: u64,
) -> anyhow::Result<(LogisticPipeline, LinearExplainer)> {
    let mut generator = TransactionGenerator::new(seed);
    let mut suspicious_count = 0;
    let sample: Vec<TransactionRecord> = (0..samples.max(1))
        .map(|_| {
            if generator.rng.gen_bool(fraud_rate.clamp(0.0, 1.0)) {
                suspicious_count += 1;
                generator.generate_suspicious()
            } else {
                generator.generate_legitimate()
            }
        })
        .collect();

    info!(
        "Generated {} transactions ({} suspicious)",
        sample.len(),
        suspicious_count
    );

    // Fit the scaler on the numeric columns
    let columns: Vec<Vec<f64>> = NumericField::ALL
        .iter()
        .map(|field| sample.iter().map(|r| r.numeric(*field)).collect())
        .collect();
    let prep = Preprocessor::new().with_scaler(StandardScaler::fit(&columns));

    // Background mean of the transformed features
    let mut background_mean = vec![0.0; prep.feature_count()];
    for record in &sample {
        for (mean, x) in background_mean.iter_mut().zip(prep.transform(record)?) {
            *mean += x / sample.len() as f64;
        }
    }

    let model = LogisticPipeline::new(
        prep,
        LogisticRegression {
            coefficients: COEFFICIENTS.to_vec(),
            intercept: INTERCEPT,
        },
    );
    model.validate()?;

    let explainer = LinearExplainer::new(COEFFICIENTS.to_vec(), INTERCEPT, background_mean);
    explainer.validate()?;

    Ok((model, explainer))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Artifact written");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_artifacts=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(|s| s.as_str()).unwrap_or("models");
    let samples: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SAMPLES);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_FRAUD_RATE);
    let seed: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED);

    info!(
        out_dir = %out_dir,
        samples = samples,
        fraud_rate = fraud_rate,
        seed = seed,
        "Configuration loaded"
    );

    let (model, explainer) = build_artifacts(samples, fraud_rate, seed)?;

    let out_dir = Path::new(out_dir);
    std::fs::create_dir_all(out_dir)?;
    write_json(&out_dir.join("model.json"), &model)?;
    write_json(&out_dir.join("explainer.json"), &explainer)?;

    info!(
        expected_value = explainer.expected_value(),
        "Completed! Artifacts written to {}",
        out_dir.display()
    );

    Ok(())
}
