//! Tokenizer options.

/// Characters that always form single-character tokens.
pub const PUNCTUATION: [char; 5] = ['(', ')', '[', ']', ','];

/// How number and string literals are spelled.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexerConfig {
    /// Fractional separator in number literals.
    pub decimal_point: char,
    /// Character skipped between digits (`1_000`); `None` disables grouping.
    pub integer_digit_separator: Option<char>,
    /// Letters that introduce a scientific exponent.
    pub scientific_notation_exponents: Vec<char>,
    /// When false, `1.5` is not a number and lexes as a symbol.
    pub allow_non_integer_numbers: bool,
    /// When false, exponent suffixes are not recognized.
    pub allow_scientific_notation: bool,
    /// Delimiter of string literals; doubled to escape.
    pub string_delimiter: char,
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig {
            decimal_point: '.',
            integer_digit_separator: Some('_'),
            scientific_notation_exponents: vec!['e', 'E'],
            allow_non_integer_numbers: true,
            allow_scientific_notation: true,
            string_delimiter: '\'',
        }
    }
}

impl LexerConfig {
    #[must_use]
    pub fn with_decimal_point(mut self, c: char) -> Self {
        self.decimal_point = c;
        self
    }

    #[must_use]
    pub fn with_digit_separator(mut self, c: Option<char>) -> Self {
        self.integer_digit_separator = c;
        self
    }

    #[must_use]
    pub fn with_exponents(mut self, letters: impl IntoIterator<Item = char>) -> Self {
        self.scientific_notation_exponents = letters.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_non_integer_numbers(mut self, allow: bool) -> Self {
        self.allow_non_integer_numbers = allow;
        self
    }

    #[must_use]
    pub fn with_scientific_notation(mut self, allow: bool) -> Self {
        self.allow_scientific_notation = allow;
        self
    }

    #[must_use]
    pub fn with_string_delimiter(mut self, c: char) -> Self {
        self.string_delimiter = c;
        self
    }

    /// Whether `c` introduces an exponent under this configuration.
    pub fn is_exponent(&self, c: char) -> bool {
        self.allow_scientific_notation && self.scientific_notation_exponents.contains(&c)
    }

    /// Check the options for combinations the tokenizer cannot honor.
    ///
    /// Returns one message per problem; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let structural = |c: char| c.is_whitespace() || c.is_control() || PUNCTUATION.contains(&c);

        let dp = self.decimal_point;
        if dp.is_ascii_digit() || dp.is_alphabetic() || structural(dp) || dp == '_' {
            problems.push(format!("decimal point `{}` cannot be used", dp.escape_debug()));
        }

        if let Some(sep) = self.integer_digit_separator {
            if sep.is_ascii_digit() || sep.is_alphabetic() || structural(sep) {
                problems.push(format!(
                    "digit separator `{}` cannot be used",
                    sep.escape_debug()
                ));
            }
            if sep == dp {
                problems.push(format!(
                    "digit separator and decimal point are both `{}`",
                    sep.escape_debug()
                ));
            }
        }

        if self.allow_scientific_notation && self.scientific_notation_exponents.is_empty() {
            problems.push("scientific notation is enabled but no exponent letters are set".into());
        }
        for &e in &self.scientific_notation_exponents {
            if !e.is_alphabetic() {
                problems.push(format!(
                    "exponent marker `{}` must be a letter",
                    e.escape_debug()
                ));
            }
        }

        let delim = self.string_delimiter;
        if delim.is_alphanumeric() || delim == '_' || structural(delim) {
            problems.push(format!(
                "string delimiter `{}` cannot be used",
                delim.escape_debug()
            ));
        }
        if delim == dp || Some(delim) == self.integer_digit_separator {
            problems.push(format!(
                "string delimiter `{}` collides with number syntax",
                delim.escape_debug()
            ));
        }

        problems
    }
}
