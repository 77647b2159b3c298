use rustc_hash::FxHashSet;

/// Names whose grid varies from sample to sample and therefore need an
/// interpolation before cross-sample aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdaptiveSet {
    names: FxHashSet<String>,
}

impl AdaptiveSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine a feature capability's declared adaptive features with the
    /// model-level adaptive flag
    pub fn from_parts<S: Into<String>>(
        model_name: &str,
        adaptive_model: bool,
        adaptive_features: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut names: FxHashSet<String> = adaptive_features.into_iter().map(Into::into).collect();
        if adaptive_model {
            names.insert(model_name.to_string());
        }
        Self { names }
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AdaptiveSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
