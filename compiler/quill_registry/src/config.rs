//! Registry-wide configuration.

use quill_lexer::LexerConfig;

/// Settings fixed at registry build time and shared by every expression
/// the registry parses.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    pub lexer: LexerConfig,
    /// Apply a registered converter when the root type differs from the
    /// requested output type.
    pub convert_result_to_output_type_automatically: bool,
    /// Reject sources longer than this many bytes before tokenizing.
    pub max_input_length: Option<usize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lexer: LexerConfig::default(),
            convert_result_to_output_type_automatically: true,
            max_input_length: None,
        }
    }
}

impl Configuration {
    #[must_use]
    pub fn with_lexer(mut self, lexer: LexerConfig) -> Self {
        self.lexer = lexer;
        self
    }

    #[must_use]
    pub fn with_automatic_conversion(mut self, enabled: bool) -> Self {
        self.convert_result_to_output_type_automatically = enabled;
        self
    }

    #[must_use]
    pub fn with_max_input_length(mut self, limit: Option<usize>) -> Self {
        self.max_input_length = limit;
        self
    }

    /// Problems that make this configuration unusable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = self.lexer.validate();
        if self.max_input_length == Some(0) {
            problems.push("maximum input length must be at least 1".to_string());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Configuration::default();
        assert!(config.convert_result_to_output_type_automatically);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = Configuration::default().with_max_input_length(Some(0));
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_lexer_problems_surface() {
        let lexer = LexerConfig::default().with_decimal_point('_');
        let config = Configuration::default().with_lexer(lexer);
        assert!(!config.validate().is_empty());
    }
}
