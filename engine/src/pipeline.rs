//! Image pipeline: decode an upload, turn it into the network's input tensor,
//! run the classifier and threshold its output into a [`Label`].
//!
//! Every stage is a pure function of its input, so the same bytes always
//! produce the same label for a given set of weights.

use candle_core::{DType, Device, Tensor};
use image::{imageops::FilterType, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Classifier;

/// Side length of the square input the network expects.
pub const INPUT_SIZE: u32 = 224;

/// Per-channel (R, G, B) normalization constants of the ImageNet-pretrained backbone.
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Normal,
    Pneumonia,
}

impl Label {
    /// Rounds a sigmoid probability to a class. Exactly 0.5 rounds half to
    /// even, i.e. to `Normal`.
    pub fn from_probability(probability: f32) -> Self {
        if probability > 0.5 {
            Label::Pneumonia
        } else {
            Label::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "Normal",
            Label::Pneumonia => "Pneumonia",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Label,
    pub probability: f32,
}

/// Decodes any supported image format into an RGB grid. The format is sniffed
/// from the content; grayscale, alpha and palette images are converted.
/// Images with a zero-length side are rejected.
pub fn decode(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }
    Ok(image.to_rgb8())
}

/// Resizes straight to 224x224 (no aspect-ratio preservation), scales to
/// [0, 1] and normalizes each channel, yielding a `(1, 3, 224, 224)` f32 batch.
pub fn preprocess(image: &RgbImage, device: &Device) -> Result<Tensor> {
    let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let size = INPUT_SIZE as usize;

    let data = Tensor::from_vec(resized.into_raw(), (size, size, 3), device)?.permute((2, 0, 1))?;
    let mean = Tensor::new(&MEAN, device)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&STD, device)?.reshape((3, 1, 1))?;

    let normalized = (data.to_dtype(DType::F32)? / 255.)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)?;
    Ok(normalized.unsqueeze(0)?)
}

/// Runs one forward pass and thresholds the sigmoid of the single logit.
pub fn classify(classifier: &dyn Classifier, input: &Tensor) -> Result<Classification> {
    let logits = classifier.forward(input)?;
    let probabilities = candle_nn::ops::sigmoid(&logits)?
        .flatten_all()?
        .to_dtype(DType::F32)?
        .to_vec1::<f32>()?;

    let probability = match probabilities.as_slice() {
        [p] => *p,
        other => {
            return Err(Error::InvalidOutput(format!(
                "expected a single logit, got {} values",
                other.len()
            )));
        }
    };
    if !probability.is_finite() {
        return Err(Error::InvalidOutput(format!("non-finite probability {probability}")));
    }

    Ok(Classification {
        label: Label::from_probability(probability),
        probability,
    })
}

/// Full decode → preprocess → classify pass over raw upload bytes.
pub fn predict(classifier: &dyn Classifier, bytes: &[u8]) -> Result<Classification> {
    let image = decode(bytes)?;
    let input = preprocess(&image, classifier.device())?;
    classify(classifier, &input)
}
