// Message templates — named sequences of subject/body pairs per stage.
//
// A sequence is picked when a lead is enrolled (based on the signal that
// surfaced it) and every later follow-up renders from the same sequence.
// Placeholders are `{first_name}` and `{company_name}`, plus any extra
// fields a sequence asks for (`{google_review_count}`). Values go in
// verbatim in a single scan, so braces inside a value are never expanded.
// A placeholder with no value is reported as missing and the message must
// not be sent. `%unsubscribe_url%` is left for the provider to fill in.

mod sequences;

use regex_lite::Regex;
use std::sync::OnceLock;

use crate::store::models::Stage;

/// A subject/body pair with placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub subject: &'static str,
    pub body: &'static str,
}

/// The three templates that make up one sequence.
#[derive(Debug)]
pub struct SequenceTemplates {
    pub initial: Template,
    pub followup_1: Template,
    pub followup_2: Template,
}

/// The named sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    /// Default cadence for leads with no particular signal
    Core,
    /// Lead is currently running video ads
    RunningAds,
    /// Lead is hiring front-desk or clinical staff
    Hiring,
    /// Lead has a large number of public reviews
    HighReviews,
}

impl Sequence {
    pub const ALL: [Sequence; 4] = [
        Sequence::Core,
        Sequence::RunningAds,
        Sequence::Hiring,
        Sequence::HighReviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sequence::Core => "core",
            Sequence::RunningAds => "running_ads",
            Sequence::Hiring => "hiring",
            Sequence::HighReviews => "high_reviews",
        }
    }

    /// Look up a sequence by name, falling back to core for unknown names.
    pub fn from_name(name: &str) -> Self {
        Sequence::ALL
            .into_iter()
            .find(|s| s.as_str() == name)
            .unwrap_or(Sequence::Core)
    }

    /// Resolve the sequence stored on a record (None means core).
    pub fn for_record(name: Option<&str>) -> Self {
        name.map(Sequence::from_name).unwrap_or(Sequence::Core)
    }

    pub fn templates(&self) -> &'static SequenceTemplates {
        match self {
            Sequence::Core => &sequences::CORE,
            Sequence::RunningAds => &sequences::RUNNING_ADS,
            Sequence::Hiring => &sequences::HIRING,
            Sequence::HighReviews => &sequences::HIGH_REVIEWS,
        }
    }

    pub fn template(&self, stage: Stage) -> &'static Template {
        let templates = self.templates();
        match stage {
            Stage::Initial => &templates.initial,
            Stage::Followup1 => &templates.followup_1,
            Stage::Followup2 => &templates.followup_2,
        }
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// String-keyed lookup. Unknown sequences fall back to core, unknown stages
/// to the sequence's initial template.
pub fn lookup(sequence: &str, stage: &str) -> &'static Template {
    let stage = Stage::from_name(stage).unwrap_or(Stage::Initial);
    Sequence::from_name(sequence).template(stage)
}

/// A template with its placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
    /// Placeholders the template uses that had no value, in order of first
    /// appearance. Those are left in the text as-is.
    pub missing: Vec<String>,
}

impl RenderedMessage {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Fill `{first_name}` and `{company_name}` in subject and body.
pub fn render(template: &Template, first_name: &str, company_name: &str) -> RenderedMessage {
    render_with(
        template,
        &[("first_name", first_name), ("company_name", company_name)],
    )
}

/// Fill every `{name}` that has an entry in `values`.
pub fn render_with<V: AsRef<str>>(template: &Template, values: &[(&str, V)]) -> RenderedMessage {
    let mut missing: Vec<String> = Vec::new();
    let mut fill = |text: &str| {
        placeholder_pattern()
            .replace_all(text, |caps: &regex_lite::Captures<'_>| {
                let name = &caps[1];
                match values.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => value.as_ref().to_string(),
                    None => {
                        if !missing.iter().any(|m| m == name) {
                            missing.push(name.to_string());
                        }
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    };
    let subject = fill(template.subject);
    let body = fill(template.body);
    RenderedMessage {
        subject,
        body,
        missing,
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}
