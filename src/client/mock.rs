//! Mock data used when the model server cannot be used

use super::ModelInfo;

/// Why a mock reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReason {
    /// The server could not be reached or answered with an error
    Unreachable,
    /// Anything else went wrong, e.g. an unreadable reply
    Failure,
}

/// Two-entry catalog shown while offline
///
/// # Examples
///
/// ```
/// use docchat::client::mock_catalog;
///
/// let models = mock_catalog();
/// assert_eq!(models[0].name, "mistral");
/// assert_eq!(models[1].name, "llama3.2");
/// ```
pub fn mock_catalog() -> Vec<ModelInfo> {
    let now = chrono::Utc::now().to_rfc3339();
    vec![
        ModelInfo {
            name: "mistral".to_string(),
            modified_at: now.clone(),
            size: 4_113_301_824,
        },
        ModelInfo {
            name: "llama3.2".to_string(),
            modified_at: now,
            size: 2_019_393_189,
        },
    ]
}

/// Synthetic reply echoing the prompt
pub fn mock_response(reason: MockReason, prompt: &str) -> String {
    let cause = match reason {
        MockReason::Unreachable => "Ollama is not accessible",
        MockReason::Failure => "an error occurred",
    };
    format!(
        "This is a mock response because {}. Your message was: \"{}\"",
        cause, prompt
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_catalog_sizes_and_timestamps() {
        let models = mock_catalog();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].size, 4_113_301_824);
        assert_eq!(models[1].size, 2_019_393_189);
        assert!(chrono::DateTime::parse_from_rfc3339(&models[0].modified_at).is_ok());
    }

    #[test]
    fn test_mock_response_texts() {
        assert_eq!(
            mock_response(MockReason::Failure, "hi"),
            "This is a mock response because an error occurred. Your message was: \"hi\""
        );
        assert!(mock_response(MockReason::Unreachable, "hi").contains("Ollama is not accessible"));
    }
}
