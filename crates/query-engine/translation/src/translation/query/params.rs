//! Bind parameter names for translated filters.

use std::collections::BTreeSet;

/// Hands out bind parameter names that are unique within one request.
///
/// Names are `:p1`, `:p2`, ... A name is skipped when it, or a name derived
/// from it (`:p1_1`, `:p1_2`, ...), is already reserved by a template.
#[derive(Debug, Clone, Default)]
pub struct ParamNames {
    next: u32,
    reserved: BTreeSet<String>,
}

impl ParamNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never hand out any of `names`.
    pub fn reserving<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        ParamNames {
            next: 0,
            reserved: names.into_iter().map(str::to_string).collect(),
        }
    }

    /// A fresh base name. Translators needing several parameters derive
    /// them with [`derived`].
    pub fn next_base(&mut self) -> String {
        loop {
            self.next += 1;
            let candidate = format!(":p{}", self.next);
            if !self.is_reserved(&candidate) {
                return candidate;
            }
        }
    }

    fn is_reserved(&self, candidate: &str) -> bool {
        let prefix = format!("{candidate}_");
        self.reserved
            .iter()
            .any(|name| name == candidate || name.starts_with(&prefix))
    }
}

/// The `index`th name derived from `base`, counting from 1.
pub fn derived(base: &str, index: usize) -> String {
    format!("{base}_{index}")
}
