use ndarray::{Array3, Array4};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tch::{CModule, Device, Kind, Tensor};

use super::{DiagnosticModel, FeatureGradients, InferenceError};

/// TorchScript export of the classifier.
///
/// Besides `forward`, the module must expose `features` (input to last conv
/// feature maps) and `classify` (feature maps to logits) so class scores can be
/// differentiated with respect to the feature maps.
pub struct TorchModel {
    module: Mutex<CModule>,
    device: Device,
}

impl TorchModel {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let mut module =
            CModule::load_on_device(path, device).map_err(|e| InferenceError::ModelLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        module.set_eval();
        Ok(Self {
            module: Mutex::new(module),
            device,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, CModule>, InferenceError> {
        self.module
            .lock()
            .map_err(|_| InferenceError::Model("model mutex poisoned".to_string()))
    }

    fn to_tensor(&self, input: &Array4<f32>) -> Result<Tensor, InferenceError> {
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input.as_slice().ok_or_else(|| {
            InferenceError::Preprocessing("input tensor is not contiguous".to_string())
        })?;
        Ok(Tensor::from_slice(data)
            .view(shape.as_slice())
            .to_device(self.device))
    }
}

fn to_vec(tensor: &Tensor) -> Vec<f32> {
    let flat = tensor.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
    let num_elements = flat.size()[0] as usize;
    let mut output = vec![0.0f32; num_elements];
    flat.copy_data(&mut output, num_elements);
    output
}

/// Drops the batch dimension of a `(1, C, H, W)` tensor.
fn to_feature_array(tensor: &Tensor) -> Result<Array3<f32>, InferenceError> {
    let size = tensor.size();
    let &[1, channels, height, width] = size.as_slice() else {
        return Err(InferenceError::Model(format!(
            "expected feature maps shaped (1, C, H, W), got {:?}",
            size
        )));
    };
    Array3::from_shape_vec(
        (channels as usize, height as usize, width as usize),
        to_vec(tensor),
    )
    .map_err(|e| InferenceError::Model(e.to_string()))
}

impl DiagnosticModel for TorchModel {
    fn logits(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let tensor = self.to_tensor(input)?;
        let module = self.lock()?;
        let output = tch::no_grad(|| module.forward_ts(&[tensor]))?;
        Ok(to_vec(&output))
    }

    fn feature_gradients(
        &self,
        input: &Array4<f32>,
        class_index: usize,
    ) -> Result<FeatureGradients, InferenceError> {
        let tensor = self.to_tensor(input)?;
        let module = self.lock()?;

        let features = tch::no_grad(|| module.method_ts("features", &[tensor]))?
            .detach()
            .set_requires_grad(true);
        let logits = module.method_ts("classify", &[&features])?;
        let score = logits.select(1, class_index as i64).sum(Kind::Float);
        score.backward();

        let gradients = features.grad();
        Ok(FeatureGradients {
            activations: to_feature_array(&features.detach())?,
            gradients: to_feature_array(&gradients)?,
        })
    }

    fn device(&self) -> String {
        format!("{:?}", self.device)
    }
}
