//! Starting corpus: one well-formed input per registry entry.

use crate::payload::PayloadKind;
use crate::registry::{REGISTRY, TestCase};
use crate::target::Feature;

const COMMON: &str = "# Title\n\nSome *emphasis*, **strong** and `code`.\n\n\
- item\n- [link](https://example.com)\n\n> quote\n\n---\n\nline  \nbreak\n";

/// A ready-to-run fuzz input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    /// File name stem: zero-padded selector plus the case name.
    pub name: String,
    pub data: Vec<u8>,
}

fn feature_sample(feature: Feature) -> &'static str {
    match feature {
        Feature::Tables => "| a | b |\n|:--|--:|\n| 1 | 2 |\n",
        Feature::Footnotes => "Text[^note].\n\n[^note]: The note.\n",
        Feature::Strikethrough => "~~gone~~ and ~kept~\n",
        Feature::Tasklists => "- [ ] todo\n- [x] done\n",
        Feature::SmartPunctuation => "\"Quoted\" -- 'single' --- dots...\n",
        Feature::HeadingAttributes => "# Heading {#id .class key=value}\n",
        Feature::YamlMetadata => "---\ntitle: Doc\n---\n\nBody\n",
        Feature::PlusesMetadata => "+++\ntitle = \"Doc\"\n+++\n\nBody\n",
        Feature::OldFootnotes => "Text[^1].\n\n[^1]: Old style\n    continued.\n",
        Feature::Math => "Inline $x^2$ and\n\n$$\n\\sum_i i\n$$\n",
        Feature::Gfm => "> [!NOTE]\n> Useful information.\n",
        Feature::DefinitionList => "Term\n: Definition\n",
        Feature::Superscript => "x^2^\n",
        Feature::Subscript => "H~2~O\n",
        Feature::Wikilinks => "[[Main Page]] and [[target|label]]\n",
    }
}

fn text_sample(case: &TestCase) -> String {
    match case.profile.features {
        [] => COMMON.to_string(),
        [feature] => format!("{}\n{COMMON}", feature_sample(*feature)),
        all => all
            .iter()
            .map(|feature| feature_sample(*feature))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Builds the input that reaches `case` through `selector` with a typical
/// payload.
pub fn seed_for(selector: u8, case: &TestCase) -> Seed {
    let mut data = vec![selector];
    match case.payload {
        PayloadKind::Text | PayloadKind::Bytes => {
            data.extend_from_slice(text_sample(case).as_bytes())
        }
        // Decoded as a full-range big-endian i64: this is 3.
        PayloadKind::Integer => data.extend_from_slice(&(3u64 ^ (1 << 63)).to_be_bytes()),
        PayloadKind::Float => data.extend_from_slice(&1.5f64.to_le_bytes()),
    }
    Seed {
        name: format!("{selector:03}-{}", case.name),
        data,
    }
}

/// One seed per registry entry, in selector order.
pub fn seed_corpus() -> Vec<Seed> {
    REGISTRY
        .iter()
        .enumerate()
        .filter_map(|(idx, case)| {
            let selector = u8::try_from(idx).ok()?;
            Some(seed_for(selector, case))
        })
        .collect()
}
