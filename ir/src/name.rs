use std::collections::HashMap;

/// Unique-name source scoped to one compilation pass.
///
/// Names are `<prefix>_<n>` with `n` counting from zero per prefix.
///
/// # Examples
///
/// ```rust
/// # use strata_ir::NameAllocator;
/// let mut names = NameAllocator::new();
/// assert_eq!(names.fresh("Add_out"), "Add_out_0");
/// assert_eq!(names.fresh("Add_out"), "Add_out_1");
/// assert_eq!(names.fresh("argmin_out"), "argmin_out_0");
/// ```
#[derive(Debug, Default, Clone)]
pub struct NameAllocator {
    counters: HashMap<String, usize>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_default();
        let name = format!("{prefix}_{counter}");
        *counter += 1;
        name
    }
}
