//! Target-script detection
//!
//! A conversion counts as successful only when the output carries at least one
//! character from the target script's Unicode block. This module owns that
//! check plus the whole-document extraction used when no structural candidate
//! yields converted text.

use regex::Regex;

/// Punctuation, quotes and spacing that may sit between target-script words
/// in rendered output.
const EXTENDED_PUNCTUATION: &str = r#"\s.,!?“”‘’…()'\-"#;

/// A Unicode block treated as "converted" output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetScript {
    /// Human-readable script name
    pub name: &'static str,
    /// First code point of the block (inclusive)
    pub first: char,
    /// Last code point of the block (inclusive)
    pub last: char,
}

/// Sinhala block, U+0D80..=U+0DFF
pub const SINHALA: TargetScript = TargetScript {
    name: "Sinhala",
    first: '\u{0D80}',
    last: '\u{0DFF}',
};

impl Default for TargetScript {
    fn default() -> Self {
        SINHALA
    }
}

impl TargetScript {
    /// Whether `c` falls inside the block
    pub fn is_script_char(&self, c: char) -> bool {
        (self.first..=self.last).contains(&c)
    }

    /// Whether `text` contains at least one character of the block
    pub fn contains(&self, text: &str) -> bool {
        text.chars().any(|c| self.is_script_char(c))
    }

    /// Number of characters of the block in `text`
    pub fn count(&self, text: &str) -> usize {
        text.chars().filter(|c| self.is_script_char(*c)).count()
    }

    /// Character class for use inside a JavaScript regex literal
    pub fn js_class(&self) -> String {
        format!("[\\u{:04X}-\\u{:04X}]", self.first as u32, self.last as u32)
    }

    /// Rust regex source for the extended class: block plus punctuation and spacing
    fn extended_pattern(&self) -> String {
        format!(
            r"[\x{{{:04X}}}-\x{{{:04X}}}{}]+",
            self.first as u32, self.last as u32, EXTENDED_PUNCTUATION
        )
    }
}

/// Pulls target-script runs out of arbitrary page text
#[derive(Debug, Clone)]
pub struct ScriptExtractor {
    script: TargetScript,
    runs: Regex,
}

impl ScriptExtractor {
    pub fn new(script: TargetScript) -> Self {
        let runs = Regex::new(&script.extended_pattern())
            .expect("script pattern is a fixed character class");
        Self { script, runs }
    }

    pub fn script(&self) -> TargetScript {
        self.script
    }

    /// Join every maximal run of the extended class with a single space.
    ///
    /// Runs made only of spacing or punctuation are kept, so the caller still
    /// has to check the result with [`TargetScript::contains`].
    ///
    /// ```
    /// use translit_harness::script::{ScriptExtractor, SINHALA};
    ///
    /// let extractor = ScriptExtractor::new(SINHALA);
    /// let joined = extractor.extract("Output:මම ගෙදර!Footer");
    /// assert_eq!(joined, "මම ගෙදර!");
    /// ```
    pub fn extract(&self, text: &str) -> String {
        self.runs
            .find_iter(text)
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ScriptExtractor {
    fn default() -> Self {
        Self::new(SINHALA)
    }
}
