use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Func, VarBuilder};
use candle_transformers::models::resnet;

use crate::error::{Error, Result};
use crate::pipeline::INPUT_SIZE;

/// A binary image classifier producing one logit per input image.
///
/// Implementations are shared across concurrent requests behind an `Arc`, so
/// `forward` must not mutate any state.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Device input tensors must live on.
    fn device(&self) -> &Device;

    /// Maps a `(1, 3, 224, 224)` batch to raw logits of shape `(1, 1)`.
    fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor>;
}

/// ResNet-18 backbone with its 1000-way ImageNet head replaced by a single
/// output unit. Batch norm always runs on its running statistics.
pub struct ResNetClassifier {
    model: Func<'static>,
    device: Device,
}

impl std::fmt::Debug for ResNetClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResNetClassifier")
            .field("model", &"<resnet18>")
            .field("device", &self.device)
            .finish()
    }
}

impl ResNetClassifier {
    /// Loads torchvision-named ResNet-18 weights from a `.safetensors` file or
    /// a PyTorch `state_dict` pickle (any other extension), then checks that
    /// the network yields exactly one logit.
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |message: String| Error::ModelLoad {
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(load_error("checkpoint file not found".to_string()));
        }

        let is_safetensors = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("safetensors"));
        let vb = if is_safetensors {
            let data = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
            VarBuilder::from_buffered_safetensors(data, DType::F32, device)
        } else {
            VarBuilder::from_pth(path, DType::F32, device)
        };
        let vb = vb.map_err(|e| load_error(e.to_string()))?;

        let classifier = Self::from_var_builder(vb, device).map_err(|e| load_error(e.to_string()))?;
        classifier.check_output().map_err(|e| load_error(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Checkpoint tensors loaded");
        Ok(classifier)
    }

    /// Builds the network from any parameter source. Missing tensors or
    /// shape mismatches fail here.
    pub fn from_var_builder(vb: VarBuilder<'static>, device: &Device) -> candle_core::Result<Self> {
        let model = resnet::resnet18(1, vb)?;
        Ok(Self {
            model,
            device: device.clone(),
        })
    }

    fn check_output(&self) -> Result<()> {
        let size = INPUT_SIZE as usize;
        let probe = Tensor::zeros((1, 3, size, size), DType::F32, &self.device)?;
        let output = self.forward(&probe)?;
        if output.elem_count() != 1 {
            return Err(Error::InvalidOutput(format!(
                "expected a single logit, got output of shape {:?}",
                output.dims()
            )));
        }
        Ok(())
    }
}

impl Classifier for ResNetClassifier {
    fn name(&self) -> &str {
        "resnet18"
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
        self.model.forward(input)
    }
}
