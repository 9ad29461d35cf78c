//! Element locators and the prioritized chains built from them
//!
//! A [`Locator`] describes where an element might be; resolving it is the
//! page driver's job. The probe walks two ordered chains: [`input_strategies`]
//! for the text-entry control and [`output_candidates`] for the element
//! holding converted text. Order is priority; the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::{TargetConfig, Timeouts};
use crate::script::TargetScript;

/// Description of how to find one element on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// First element whose `placeholder` matches the case-insensitive pattern
    Placeholder { pattern: String },
    /// First form control whose accessible label matches the case-insensitive pattern
    Label { pattern: String },
    /// The `nth` (zero-based) element matching a CSS selector
    Css { selector: String, nth: usize },
    /// First element matching a CSS selector whose rendered text matches a regex
    CssWithText { selector: String, text_pattern: String },
    /// Innermost element whose text contains the phrase, case-insensitive
    Text { phrase: String },
}

impl Locator {
    pub fn placeholder(pattern: impl Into<String>) -> Self {
        Self::Placeholder {
            pattern: pattern.into(),
        }
    }

    pub fn label(pattern: impl Into<String>) -> Self {
        Self::Label {
            pattern: pattern.into(),
        }
    }

    pub fn css(selector: impl Into<String>, nth: usize) -> Self {
        Self::Css {
            selector: selector.into(),
            nth,
        }
    }

    pub fn css_with_text(selector: impl Into<String>, text_pattern: impl Into<String>) -> Self {
        Self::CssWithText {
            selector: selector.into(),
            text_pattern: text_pattern.into(),
        }
    }

    pub fn text(phrase: impl Into<String>) -> Self {
        Self::Text {
            phrase: phrase.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Placeholder { pattern } => write!(f, "placeholder=/{}/i", pattern),
            Locator::Label { pattern } => write!(f, "label=/{}/i", pattern),
            Locator::Css { selector, nth } => write!(f, "{} >> nth={}", selector, nth),
            Locator::CssWithText {
                selector,
                text_pattern,
            } => write!(f, "{} >> has-text=/{}/", selector, text_pattern),
            Locator::Text { phrase } => write!(f, "text~={:?}", phrase),
        }
    }
}

/// Which input strategy located the text-entry control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Placeholder,
    Label,
    FirstTextarea,
}

/// One attempt at finding the input control, with its own bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStrategy {
    pub kind: InputKind,
    pub locator: Locator,
    pub wait: Duration,
}

/// Input control strategies in priority order
pub fn input_strategies(target: &TargetConfig, timeouts: &Timeouts) -> Vec<InputStrategy> {
    vec![
        InputStrategy {
            kind: InputKind::Placeholder,
            locator: Locator::placeholder(&target.source_language),
            wait: timeouts.input_placeholder,
        },
        InputStrategy {
            kind: InputKind::Label,
            locator: Locator::label(&target.source_language),
            wait: timeouts.input_label,
        },
        InputStrategy {
            kind: InputKind::FirstTextarea,
            locator: Locator::css("textarea", 0),
            wait: timeouts.input_fallback,
        },
    ]
}

/// Which output candidate produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// Second multi-line text control
    SecondTextarea,
    /// Control labelled with the target language
    TargetLabel,
    /// Control whose placeholder names the target language
    TargetPlaceholder,
    /// Second editable free-text region
    SecondEditable,
    /// First block or inline element showing target-script text
    ScriptText,
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateKind::SecondTextarea => "second textarea",
            CandidateKind::TargetLabel => "target-language label",
            CandidateKind::TargetPlaceholder => "target-language placeholder",
            CandidateKind::SecondEditable => "second contenteditable",
            CandidateKind::ScriptText => "script text element",
        };
        f.write_str(name)
    }
}

/// A place where converted output might be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub locator: Locator,
}

/// Output candidates in priority order
pub fn output_candidates(target: &TargetConfig, script: &TargetScript) -> Vec<Candidate> {
    vec![
        Candidate {
            kind: CandidateKind::SecondTextarea,
            locator: Locator::css("textarea", 1),
        },
        Candidate {
            kind: CandidateKind::TargetLabel,
            locator: Locator::label(&target.target_language),
        },
        Candidate {
            kind: CandidateKind::TargetPlaceholder,
            locator: Locator::placeholder(&target.target_language),
        },
        Candidate {
            kind: CandidateKind::SecondEditable,
            locator: Locator::css(r#"div[contenteditable="true"]"#, 1),
        },
        Candidate {
            kind: CandidateKind::ScriptText,
            locator: Locator::css_with_text("div, p, span", script.js_class()),
        },
    ]
}

/// The mode-switch control
pub fn mode_switch(target: &TargetConfig) -> Locator {
    Locator::text(&target.switch_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SINHALA;

    fn target() -> TargetConfig {
        TargetConfig {
            url: "https://www.swifttranslator.com/".into(),
            source_language: "singlish".into(),
            target_language: "sinhala".into(),
            switch_label: "Switch Typing Language".into(),
        }
    }

    #[test]
    fn test_input_strategy_order_and_waits() {
        let strategies = input_strategies(&target(), &Timeouts::default());
        let kinds: Vec<_> = strategies.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![InputKind::Placeholder, InputKind::Label, InputKind::FirstTextarea]
        );
        let waits: Vec<_> = strategies.iter().map(|s| s.wait.as_secs()).collect();
        assert_eq!(waits, vec![10, 10, 15]);
        assert_eq!(strategies[0].locator, Locator::placeholder("singlish"));
    }

    #[test]
    fn test_output_candidate_order() {
        let candidates = output_candidates(&target(), &SINHALA);
        let kinds: Vec<_> = candidates.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CandidateKind::SecondTextarea,
                CandidateKind::TargetLabel,
                CandidateKind::TargetPlaceholder,
                CandidateKind::SecondEditable,
                CandidateKind::ScriptText,
            ]
        );
        assert_eq!(candidates[0].locator, Locator::css("textarea", 1));
        assert_eq!(
            candidates[4].locator,
            Locator::css_with_text("div, p, span", "[\\u0D80-\\u0DFF]")
        );
    }

    #[test]
    fn test_locator_serializes_for_page_scripts() {
        let json = serde_json::to_value(Locator::css("textarea", 1)).unwrap();
        assert_eq!(json["kind"], "css");
        assert_eq!(json["selector"], "textarea");
        assert_eq!(json["nth"], 1);
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::placeholder("singlish").to_string(), "placeholder=/singlish/i");
        assert_eq!(Locator::css("textarea", 0).to_string(), "textarea >> nth=0");
        assert_eq!(
            mode_switch(&target()).to_string(),
            "text~=\"Switch Typing Language\""
        );
    }
}
