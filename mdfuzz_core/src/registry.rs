//! The fixed table of renderer configurations the harness can exercise.
//!
//! The index of an entry is its selector: the first byte of a fuzz input.
//! Saved crash inputs only replay correctly while that mapping holds, so new
//! entries go at the end and existing ones are never reordered or removed.

use crate::payload::PayloadKind;
use crate::target::{Feature, OutputFormat, Profile};

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestCase {
    /// Stable identifier, used in reports and seed file names.
    pub name: &'static str,
    pub profile: Profile,
    /// The payload type decoded from the input for this configuration.
    pub payload: PayloadKind,
}

impl TestCase {
    const fn text(name: &'static str, profile: Profile) -> Self {
        Self {
            name,
            profile,
            payload: PayloadKind::Text,
        }
    }
}

const ALL_FEATURES: Profile = Profile::with(&Feature::ALL);

pub static REGISTRY: [TestCase; 21] = [
    TestCase::text("xhtml", Profile::plain(OutputFormat::Xhtml)),
    TestCase::text("html5", Profile::plain(OutputFormat::Html5)),
    TestCase::text("tables", Profile::with(&[Feature::Tables])),
    TestCase::text("footnotes", Profile::with(&[Feature::Footnotes])),
    TestCase::text("strikethrough", Profile::with(&[Feature::Strikethrough])),
    TestCase::text("tasklists", Profile::with(&[Feature::Tasklists])),
    TestCase::text("smart_punctuation", Profile::with(&[Feature::SmartPunctuation])),
    TestCase::text("heading_attributes", Profile::with(&[Feature::HeadingAttributes])),
    TestCase::text("yaml_metadata", Profile::with(&[Feature::YamlMetadata])),
    TestCase::text("pluses_metadata", Profile::with(&[Feature::PlusesMetadata])),
    TestCase::text("old_footnotes", Profile::with(&[Feature::OldFootnotes])),
    TestCase::text("math", Profile::with(&[Feature::Math])),
    TestCase::text("gfm", Profile::with(&[Feature::Gfm])),
    TestCase::text("definition_list", Profile::with(&[Feature::DefinitionList])),
    TestCase::text("superscript", Profile::with(&[Feature::Superscript])),
    TestCase::text("subscript", Profile::with(&[Feature::Subscript])),
    TestCase::text("wikilinks", Profile::with(&[Feature::Wikilinks])),
    TestCase::text("all_features", ALL_FEATURES),
    TestCase {
        name: "ordered_list_start",
        profile: ALL_FEATURES,
        payload: PayloadKind::Integer,
    },
    TestCase {
        name: "raw_bytes",
        profile: ALL_FEATURES,
        payload: PayloadKind::Bytes,
    },
    TestCase {
        name: "float_literal",
        profile: ALL_FEATURES,
        payload: PayloadKind::Float,
    },
];

/// Looks up the entry for a selector byte. `None` means the iteration is a
/// no-op.
pub fn get(selector: u8) -> Option<&'static TestCase> {
    REGISTRY.get(usize::from(selector))
}

pub fn find(name: &str) -> Option<&'static TestCase> {
    REGISTRY.iter().find(|case| case.name == name)
}

/// The selector byte that reaches the named entry.
pub fn selector_of(name: &str) -> Option<u8> {
    REGISTRY
        .iter()
        .position(|case| case.name == name)
        .and_then(|idx| u8::try_from(idx).ok())
}
