//! Staging: the set of tensors one compute phase touched.

use strata_ir::Tensor;

/// Tensors in dependency order: every tensor appears after the tensors it reads.
#[derive(Debug, Clone, Default)]
pub struct StageMap {
    stages: Vec<Tensor>,
}

impl StageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `outputs` and everything they transitively read.
    pub fn create(outputs: &[Tensor]) -> Self {
        fn visit(tensor: &Tensor, map: &mut StageMap) {
            if map.contains(tensor) {
                return;
            }
            for input in tensor.inputs() {
                visit(&input, map);
            }
            map.stages.push(tensor.clone());
        }

        let mut map = Self::new();
        for output in outputs {
            visit(output, &mut map);
        }
        map
    }

    /// Add `tensor` unless already staged; returns whether it was added.
    pub fn insert_lazily(&mut self, tensor: &Tensor) -> bool {
        if self.contains(tensor) {
            return false;
        }
        self.stages.push(tensor.clone());
        true
    }

    pub fn contains(&self, tensor: &Tensor) -> bool {
        self.stages.iter().any(|t| t == tensor)
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.stages.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tensor> {
        self.stages.iter()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Tensor> {
        self.stages.iter().filter(|t| t.is_placeholder())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
