use burn::{
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
};

/// Number of output classes: 0 = negative, 1 = positive
pub const NUM_CLASSES: usize = 2;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct SentimentClassifierConfig {
    /// Length of the TF-IDF feature vector
    pub n_features: usize,
}

impl SentimentClassifierConfig {
    /// Zero-initialised weights: fitting starts from the same point every run.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentimentClassifier<B> {
        let linear = LinearConfig::new(self.n_features, NUM_CLASSES)
            .with_initializer(Initializer::Zeros)
            .init(device);
        SentimentClassifier { linear }
    }
}

/// Multinomial logistic regression over two classes: a single
/// linear layer whose softmax gives the class probabilities.
#[derive(Module, Debug)]
pub struct SentimentClassifier<B: Backend> {
    pub linear: Linear<B>,
}

impl<B: Backend> SentimentClassifier<B> {
    /// features: [batch, n_features] → logits: [batch, 2]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(features)
    }

    /// features: [batch, n_features] → probabilities: [batch, 2]
    pub fn probabilities(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(features), 1)
    }

    /// Mean cross-entropy over the batch
    pub fn loss(&self, features: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let logits = self.forward(features);
        let ce = burn::nn::loss::CrossEntropyLossConfig::new().init(&logits.device());
        ce.forward(logits, targets)
    }

    /// Input width the weights were built for
    pub fn n_features(&self) -> usize {
        self.linear.weight.dims()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_zero_init_gives_even_probabilities() {
        let device = Default::default();
        let model: SentimentClassifier<TestBackend> = SentimentClassifierConfig::new(4).init(&device);
        let x = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![0.5f32, 0.0, 0.1, 0.9], [1, 4]),
            &device,
        );
        let probs: Vec<f32> = model.probabilities(x).into_data().to_vec::<f32>().unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_weight_shape_tracks_feature_count() {
        let device = Default::default();
        let model: SentimentClassifier<TestBackend> = SentimentClassifierConfig::new(7).init(&device);
        assert_eq!(model.n_features(), 7);
        assert_eq!(model.linear.weight.dims(), [7, NUM_CLASSES]);
    }
}
