//! Sensitive request classification.

/// Marks requests whose path or query contains a configured marker as
/// sensitive.
#[derive(Clone, Debug)]
pub struct SensitivityClassifier {
    markers: Vec<String>,
}

impl SensitivityClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// `target` is the request path with its query string, if any.
    pub fn is_sensitive(&self, target: &str) -> bool {
        self.markers.iter().any(|m| target.contains(m.as_str()))
    }
}

impl Default for SensitivityClassifier {
    fn default() -> Self {
        Self::new(["auth"])
    }
}
