use serde::Deserialize;

/// Decoded result of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisVerdict {
    ChangelogSuggestion { text: String },
    SecretLeak(SecretLeakVerdict),
    IssueCreation(IssueDraft),
    Unparseable { raw: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretLeakVerdict {
    pub leak: bool,
    #[serde(default)]
    pub commit: Option<String>,
    pub response: String,
}

impl SecretLeakVerdict {
    /// The commit a leak comment should name: the model's override when it
    /// gave a non-empty one, the scanned commit otherwise.
    pub fn attributed_commit<'a>(&'a self, scanned: &'a str) -> &'a str {
        self.commit
            .as_deref()
            .map(str::trim)
            .filter(|sha| !sha.is_empty())
            .unwrap_or(scanned)
    }
}

/// Issue payload proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
}
