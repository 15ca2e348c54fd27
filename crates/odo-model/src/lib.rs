//! # Odo-Model
//!
//! Step-length regression network for the odo PDR engine.
//!
//! The network mirrors the architecture the training pipeline produces —
//! an LSTM over the observation window followed by two dense layers — and
//! consumes its weights from a safetensors checkpoint converted offline
//! from the trained model. No training or fitting happens in this crate.

pub mod net;

pub use net::{StepLengthNet, StepLengthNetConfig};
