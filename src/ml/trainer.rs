// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fits the logistic-regression classifier with Adam on mini-
// batches of TF-IDF rows.
//
//   - Fitting uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InnerBackend (NdArray)
//     for the validation pass and for persisting
//   - Batch order is reshuffled each epoch from one seeded RNG
//   - max_iter caps the number of epochs; fitting stops early
//     once the epoch mean loss moves by less than `tol`
//
// Reference: Kingma & Ba (2015) Adam

use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::batcher::FeatureBatcher;
use crate::error::{Result, SentimentError};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::inferencer::predict_probabilities;
use crate::ml::model::{SentimentClassifier, SentimentClassifierConfig};
use crate::ml::vectorizer::SparseVector;

pub type TrainBackend = Autodiff<NdArray>;
pub type InnerBackend = NdArray;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Cap on passes over the training set
    pub max_iter:      usize,
    pub learning_rate: f64,
    pub batch_size:    usize,

    /// Adam weight-decay penalty; 0 disables it
    pub l2: f64,

    /// Stop once |loss(epoch) - loss(epoch - 1)| < tol
    pub tol:  f64,
    pub seed: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iter:      200,
            learning_rate: 0.05,
            batch_size:    256,
            l2:            1e-4,
            tol:           1e-4,
            seed:          42,
        }
    }
}

/// Borrowed view of vectorised rows and their labels.
#[derive(Debug, Clone, Copy)]
pub struct LabelledRows<'a> {
    pub rows:   &'a [SparseVector],
    pub labels: &'a [u8],
}

impl<'a> LabelledRows<'a> {
    pub fn new(rows: &'a [SparseVector], labels: &'a [u8]) -> Self {
        Self { rows, labels }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct FitOutcome {
    pub model:      SentimentClassifier<InnerBackend>,
    pub epochs_run: usize,
    pub converged:  bool,
    pub final_loss: f64,
}

/// Mean cross-entropy and accuracy of `probs` against `labels`.
fn score_probabilities(probs: &[[f32; 2]], labels: &[u8]) -> (f64, f64) {
    if probs.is_empty() {
        return (f64::NAN, 0.0);
    }
    let mut loss    = 0.0f64;
    let mut correct = 0usize;
    for (p, &y) in probs.iter().zip(labels) {
        loss += -(p[y as usize].max(1e-12) as f64).ln();
        let pred = u8::from(p[1] > p[0]);
        if pred == y {
            correct += 1;
        }
    }
    (loss / probs.len() as f64, correct as f64 / probs.len() as f64)
}

pub fn run_training(
    cfg:        &FitConfig,
    n_features: usize,
    train:      LabelledRows<'_>,
    val:        LabelledRows<'_>,
    log:        &MetricsLogger,
) -> Result<FitOutcome> {
    if train.is_empty() {
        return Err(SentimentError::Training("training partition is empty".into()));
    }
    if train.rows.len() != train.labels.len() || val.rows.len() != val.labels.len() {
        return Err(SentimentError::Training("rows and labels are misaligned".into()));
    }
    let batch_size = cfg.batch_size.max(1);
    let device     = NdArrayDevice::default();

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: SentimentClassifier<TrainBackend> =
        SentimentClassifierConfig::new(n_features).init(&device);

    let weight_decay = (cfg.l2 > 0.0).then(|| WeightDecayConfig::new(cfg.l2 as f32));
    let mut optim    = AdamConfig::new().with_weight_decay(weight_decay).init();

    let train_batcher = FeatureBatcher::<TrainBackend>::new(device.clone(), n_features);
    let val_batcher   = FeatureBatcher::<InnerBackend>::new(device.clone(), n_features);

    let mut order: Vec<usize> = (0..train.len()).collect();
    let mut rng   = StdRng::seed_from_u64(cfg.seed);

    let mut prev_loss     = f64::INFINITY;
    let mut best_val_loss = f64::INFINITY;
    let mut epochs_run    = 0usize;
    let mut converged     = false;

    tracing::info!(
        "Fitting classifier: {} rows, {} features, batch {}, lr {}, max_iter {}",
        train.len(), n_features, batch_size, cfg.learning_rate, cfg.max_iter,
    );

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.max_iter {
        order.shuffle(&mut rng);
        let mut loss_sum = 0.0f64;

        for chunk in order.chunks(batch_size) {
            let rows: Vec<&SparseVector> = chunk.iter().map(|&i| &train.rows[i]).collect();
            let labels: Vec<u8>          = chunk.iter().map(|&i| train.labels[i]).collect();
            let batch = train_batcher.batch(&rows, &labels);

            let loss = model.loss(batch.features, batch.targets);
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val * chunk.len() as f64;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let train_loss = loss_sum / train.len() as f64;
        if !train_loss.is_finite() {
            return Err(SentimentError::Training(format!(
                "training loss diverged at epoch {epoch}"
            )));
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let probs = predict_probabilities(&model.valid(), &val_batcher, val.rows, batch_size)?;
        let (val_loss, val_accuracy) = score_probabilities(&probs, val.labels);

        let metrics = EpochMetrics::new(epoch, train_loss, val_loss, val_accuracy);
        if metrics.is_improvement(best_val_loss) {
            best_val_loss = val_loss;
        }
        log.log(&metrics)?;
        tracing::debug!(
            "Epoch {:>3}/{} | train_loss={:.6} | val_loss={:.6} | val_acc={:.2}%",
            epoch, cfg.max_iter, train_loss, val_loss, val_accuracy * 100.0,
        );

        epochs_run = epoch;
        let delta  = (prev_loss - train_loss).abs();
        prev_loss  = train_loss;
        if delta < cfg.tol {
            converged = true;
            break;
        }
    }

    if converged {
        tracing::info!("Converged after {} epochs (loss {:.6})", epochs_run, prev_loss);
    } else {
        tracing::warn!(
            "Stopped at max_iter={} without converging (loss {:.6})",
            cfg.max_iter, prev_loss,
        );
    }
    tracing::debug!("Best validation loss: {:.6}", best_val_loss);

    Ok(FitOutcome {
        model: model.valid(),
        epochs_run,
        converged,
        final_loss: prev_loss,
    })
}
