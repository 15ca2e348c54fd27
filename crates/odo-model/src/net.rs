//! The step-length regression network.
//!
//! Architecture, fixed by the trained checkpoint: LSTM over the window
//! (hidden 64), a 32-unit ReLU layer on the final hidden state, and a
//! single linear output unit. Input shape `[1, window, 11]`.
//!
//! Checkpoint layout: LSTM weights under the `lstm` prefix (candle's
//! `weight_ih_l0` / `weight_hh_l0` / biases), dense layers under `fc1` and
//! `fc2`.

use std::path::Path;

use candle_core::{bail, DType, Device, Tensor};
use candle_nn::{linear, lstm, Linear, Module, RNN, VarBuilder, VarMap};

use odo_core::{Error, FeatureVector, Result, StepLengthEstimator};

/// Network hyperparameters; must match the checkpoint being loaded.
#[derive(Debug, Clone)]
pub struct StepLengthNetConfig {
    /// Features per sample
    pub feature_dim: usize,
    /// Samples per observation window
    pub window_size: usize,
    /// LSTM hidden width
    pub lstm_hidden: usize,
    /// Dense layer width
    pub dense_hidden: usize,
}

impl Default for StepLengthNetConfig {
    fn default() -> Self {
        Self {
            feature_dim: FeatureVector::DIM,
            window_size: 50,
            lstm_hidden: 64,
            dense_hidden: 32,
        }
    }
}

/// LSTM-based step-length regressor.
pub struct StepLengthNet {
    lstm: candle_nn::LSTM,
    fc1: Linear,
    fc2: Linear,
    device: Device,
    config: StepLengthNetConfig,
}

impl StepLengthNet {
    /// Build the network over the given variable store.
    pub fn new(config: StepLengthNetConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let lstm = lstm(
            config.feature_dim,
            config.lstm_hidden,
            candle_nn::LSTMConfig::default(),
            vb.pp("lstm"),
        )?;
        let fc1 = linear(config.lstm_hidden, config.dense_hidden, vb.pp("fc1"))?;
        let fc2 = linear(config.dense_hidden, 1, vb.pp("fc2"))?;

        Ok(Self {
            lstm,
            fc1,
            fc2,
            device: vb.device().clone(),
            config,
        })
    }

    /// Load weights from a safetensors checkpoint.
    pub fn load<P: AsRef<Path>>(path: P, config: StepLengthNetConfig) -> Result<Self> {
        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[path.as_ref()], DType::F32, &device)
                .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.as_ref().display())))?
        };
        Self::new(config, vb).map_err(|e| Error::ModelLoad(e.to_string()))
    }

    /// Build with random weights; used in tests.
    pub fn new_random(config: StepLengthNetConfig) -> Result<Self> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        Self::new(config, vb).map_err(|e| Error::ModelLoad(e.to_string()))
    }

    /// Forward pass: `[batch, window, features]` → `[batch, 1]`.
    pub fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
        let states = self.lstm.seq(input)?;
        let Some(last) = states.last() else {
            bail!("empty input sequence");
        };
        let x = self.fc1.forward(last.h())?.relu()?;
        self.fc2.forward(&x)
    }

    pub fn config(&self) -> &StepLengthNetConfig {
        &self.config
    }

    fn window_to_tensor(&self, window: &[FeatureVector]) -> candle_core::Result<Tensor> {
        let mut flat = Vec::with_capacity(window.len() * self.config.feature_dim);
        for fv in window {
            flat.extend_from_slice(fv.as_slice());
        }
        Tensor::from_vec(flat, (1, window.len(), self.config.feature_dim), &self.device)
    }
}

impl StepLengthEstimator for StepLengthNet {
    fn estimate(&self, window: &[FeatureVector]) -> Result<f64> {
        if window.len() != self.config.window_size {
            return Err(Error::InsufficientData {
                required: self.config.window_size,
                available: window.len(),
            });
        }

        let input = self
            .window_to_tensor(window)
            .map_err(|e| Error::Estimation(e.to_string()))?;
        let output = self
            .forward(&input)
            .map_err(|e| Error::Estimation(e.to_string()))?;
        let value = output
            .flatten_all()
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::Estimation(e.to_string()))?;

        match value.first() {
            Some(length) => Ok(*length as f64),
            None => Err(Error::Estimation("model produced no output".into())),
        }
    }
}
