// ============================================================
// Layer 4 — Feature Batcher
// ============================================================
// Stacks sparse TF-IDF rows (and their labels) into the dense
// tensors the classifier consumes.
//
//   Input:  N sparse rows of dimension F, N labels in {0, 1}
//   Output: features [N, F] (f32), targets [N] (Int)
//
// Each row is scattered into a zeroed slice of one flat buffer,
// then the buffer becomes a single [N, F] tensor.
//
// B is the burn Backend, so the same batcher feeds the autodiff
// training backend and the plain inference backend.

use burn::prelude::*;

use crate::ml::vectorizer::SparseVector;

/// A batch ready for the classifier forward pass.
#[derive(Debug, Clone)]
pub struct FeatureBatch<B: Backend> {
    /// shape: [batch_size, n_features]
    pub features: Tensor<B, 2>,

    /// shape: [batch_size], class index per row
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct FeatureBatcher<B: Backend> {
    device:     B::Device,
    n_features: usize,
}

impl<B: Backend> FeatureBatcher<B> {
    pub fn new(device: B::Device, n_features: usize) -> Self {
        Self { device, n_features }
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Densify `rows` into a [rows.len(), n_features] tensor.
    pub fn features(&self, rows: &[&SparseVector]) -> Tensor<B, 2> {
        let mut flat = vec![0.0f32; rows.len() * self.n_features];
        // chunks_mut panics on a zero chunk size
        if self.n_features > 0 {
            for (row, out) in rows.iter().zip(flat.chunks_mut(self.n_features)) {
                row.write_dense(out);
            }
        }
        Tensor::<B, 2>::from_data(
            TensorData::new(flat, [rows.len(), self.n_features]),
            &self.device,
        )
    }

    pub fn batch(&self, rows: &[&SparseVector], labels: &[u8]) -> FeatureBatch<B> {
        let targets: Vec<i32> = labels.iter().map(|&l| l as i32).collect();
        FeatureBatch {
            features: self.features(rows),
            targets:  Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn sparse(dim: usize, entries: &[(u32, f32)]) -> SparseVector {
        SparseVector {
            dim,
            indices: entries.iter().map(|e| e.0).collect(),
            values:  entries.iter().map(|e| e.1).collect(),
        }
    }

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = FeatureBatcher::<TestBackend>::new(Default::default(), 3);
        let a = sparse(3, &[(0, 0.6), (2, 0.8)]);
        let b = sparse(3, &[(1, 1.0)]);
        let batch = batcher.batch(&[&a, &b], &[1, 0]);

        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let values: Vec<f32> = batch.features.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.6, 0.0, 0.8, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_rows_stay_zero() {
        let batcher = FeatureBatcher::<TestBackend>::new(Default::default(), 4);
        let empty = SparseVector { dim: 4, ..Default::default() };
        let values: Vec<f32> = batcher
            .features(&[&empty])
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert_eq!(values, vec![0.0; 4]);
    }
}
