use std::collections::HashMap;
use std::path::Path;

use super::{ClassifierError, Prediction};

/// Index → class name table, inverted from a `class_indices.json` of the
/// form `{"Apple___Black_rot": 1, ...}`.
#[derive(Debug, Clone)]
pub struct ClassLabels {
    by_index: Vec<String>,
}

impl ClassLabels {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::Labels(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let indices: HashMap<String, usize> =
            serde_json::from_str(raw).map_err(|e| ClassifierError::Labels(e.to_string()))?;
        Self::from_indices(indices)
    }

    pub fn from_indices(indices: HashMap<String, usize>) -> Result<Self, ClassifierError> {
        if indices.is_empty() {
            return Err(ClassifierError::Labels("no classes".into()));
        }
        let mut by_index = vec![None; indices.len()];
        for (name, index) in indices {
            let slot = by_index.get_mut(index).ok_or_else(|| {
                ClassifierError::Labels(format!("index {index} of {name:?} is out of range"))
            })?;
            if let Some(existing) = slot.replace(name) {
                return Err(ClassifierError::Labels(format!(
                    "index {index} assigned twice (first to {existing:?})"
                )));
            }
        }
        let by_index = by_index
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ClassifierError::Labels("class indices are not contiguous".into()))?;
        Ok(Self { by_index })
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.by_index.get(index).map(String::as_str)
    }

    /// Picks the most probable class; confidence is its probability × 100.
    pub fn top(&self, probabilities: &[f32]) -> Result<Prediction, ClassifierError> {
        let (index, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| ClassifierError::MalformedOutput("no finite probabilities".into()))?;

        let class_name = self
            .name(index)
            .ok_or(ClassifierError::UnknownClass(index))?
            .to_string();

        Ok(Prediction {
            class_name,
            confidence: f64::from(probability) * 100.0,
        })
    }
}
