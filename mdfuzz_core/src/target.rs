use crate::payload::Payload;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// An optional extension of the markdown renderer that a registry entry can
/// switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Tables,
    Footnotes,
    Strikethrough,
    Tasklists,
    SmartPunctuation,
    HeadingAttributes,
    YamlMetadata,
    PlusesMetadata,
    OldFootnotes,
    Math,
    Gfm,
    DefinitionList,
    Superscript,
    Subscript,
    Wikilinks,
}

impl Feature {
    /// Every supported extension, in declaration order.
    pub const ALL: [Feature; 15] = [
        Feature::Tables,
        Feature::Footnotes,
        Feature::Strikethrough,
        Feature::Tasklists,
        Feature::SmartPunctuation,
        Feature::HeadingAttributes,
        Feature::YamlMetadata,
        Feature::PlusesMetadata,
        Feature::OldFootnotes,
        Feature::Math,
        Feature::Gfm,
        Feature::DefinitionList,
        Feature::Superscript,
        Feature::Subscript,
        Feature::Wikilinks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Tables => "tables",
            Feature::Footnotes => "footnotes",
            Feature::Strikethrough => "strikethrough",
            Feature::Tasklists => "tasklists",
            Feature::SmartPunctuation => "smart_punctuation",
            Feature::HeadingAttributes => "heading_attributes",
            Feature::YamlMetadata => "yaml_metadata",
            Feature::PlusesMetadata => "pluses_metadata",
            Feature::OldFootnotes => "old_footnotes",
            Feature::Math => "math",
            Feature::Gfm => "gfm",
            Feature::DefinitionList => "definition_list",
            Feature::Superscript => "superscript",
            Feature::Subscript => "subscript",
            Feature::Wikilinks => "wikilinks",
        }
    }

    fn option(&self) -> Options {
        match self {
            Feature::Tables => Options::ENABLE_TABLES,
            Feature::Footnotes => Options::ENABLE_FOOTNOTES,
            Feature::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Feature::Tasklists => Options::ENABLE_TASKLISTS,
            Feature::SmartPunctuation => Options::ENABLE_SMART_PUNCTUATION,
            Feature::HeadingAttributes => Options::ENABLE_HEADING_ATTRIBUTES,
            Feature::YamlMetadata => Options::ENABLE_YAML_STYLE_METADATA_BLOCKS,
            Feature::PlusesMetadata => Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS,
            Feature::OldFootnotes => Options::ENABLE_OLD_FOOTNOTES,
            Feature::Math => Options::ENABLE_MATH,
            Feature::Gfm => Options::ENABLE_GFM,
            Feature::DefinitionList => Options::ENABLE_DEFINITION_LIST,
            Feature::Superscript => Options::ENABLE_SUPERSCRIPT,
            Feature::Subscript => Options::ENABLE_SUBSCRIPT,
            Feature::Wikilinks => Options::ENABLE_WIKILINKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Self-closing void elements (`<br />`), the renderer's native output.
    Xhtml,
    /// Bare void elements (`<br>`).
    Html5,
}

/// A renderer configuration: which extensions are on and how the HTML is
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub features: &'static [Feature],
    pub format: OutputFormat,
}

impl Profile {
    pub const fn plain(format: OutputFormat) -> Self {
        Self {
            features: &[],
            format,
        }
    }

    pub const fn with(features: &'static [Feature]) -> Self {
        Self {
            features,
            format: OutputFormat::Xhtml,
        }
    }

    pub fn options(&self) -> Options {
        self.features
            .iter()
            .fold(Options::empty(), |acc, feature| acc | feature.option())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.format {
            OutputFormat::Xhtml => "xhtml",
            OutputFormat::Html5 => "html5",
        };
        if self.features.is_empty() {
            return write!(f, "{format}, no extensions");
        }
        if self.features.len() == Feature::ALL.len() {
            return write!(f, "{format}, all extensions");
        }
        let names: Vec<&str> = self.features.iter().map(Feature::name).collect();
        write!(f, "{format}, {}", names.join("+"))
    }
}

/// Errors a renderer can report instead of producing output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer does not handle this input under this configuration.
    /// This is a documented limitation, not a defect.
    #[error("unsupported input: {reason}")]
    Unsupported { reason: String },

    /// Any other failure inside the renderer.
    #[error("render failed: {message}")]
    Failed { message: String },
}

impl RenderError {
    pub fn is_expected_limitation(&self) -> bool {
        matches!(self, RenderError::Unsupported { .. })
    }
}

/// The call contract between the dispatcher and the library under test.
pub trait Renderer {
    /// Renders `payload` with the given profile. The returned text is never
    /// inspected by the harness.
    fn render(&self, payload: &Payload, profile: Profile) -> Result<String, RenderError>;
}

/// `pulldown-cmark` behind the [`Renderer`] contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub const fn new() -> Self {
        MarkdownRenderer
    }

    fn source(payload: &Payload) -> Result<Cow<'_, str>, RenderError> {
        match payload {
            Payload::Text(text) => Ok(Cow::Borrowed(text)),
            Payload::Integer(start) => Ok(Cow::Owned(format!("{start}. item\n"))),
            Payload::Float(value) if value.is_finite() => Ok(Cow::Owned(format!("{value}\n"))),
            Payload::Float(value) => Err(RenderError::Unsupported {
                reason: format!("non-finite number {value}"),
            }),
            Payload::Bytes(raw) => std::str::from_utf8(raw).map(Cow::Borrowed).map_err(|e| {
                RenderError::Unsupported {
                    reason: format!("source is not UTF-8: {e}"),
                }
            }),
        }
    }
}

/// Stands in for raw HTML while void tags are rewritten. The renderer escapes
/// `<` everywhere outside tags it emits itself, so this cannot occur in the
/// generated markup.
const RAW_HTML_SLOT: &str = "<\u{1}>";

fn slot_for(raw: &str) -> CowStr<'static> {
    // The writer tracks whether the last write ended a line, so the slot
    // keeps the raw text's trailing newline.
    if raw.ends_with('\n') {
        CowStr::Borrowed("<\u{1}>\n")
    } else {
        CowStr::Borrowed(RAW_HTML_SLOT)
    }
}

/// Drops the self-closing slash from the void elements the renderer emits.
/// Raw HTML from the source is copied back byte-for-byte.
fn to_html5(parser: Parser<'_>, capacity: usize) -> String {
    let mut raw_html = Vec::new();
    // Image alt text is escaped on output, so raw HTML there stays in place.
    let mut image_depth = 0usize;
    let events = parser.map(|event| match event {
        Event::Start(Tag::Image { .. }) => {
            image_depth += 1;
            event
        }
        Event::End(TagEnd::Image) => {
            image_depth = image_depth.saturating_sub(1);
            event
        }
        Event::Html(_) | Event::InlineHtml(_) if image_depth > 0 => event,
        Event::Html(raw) => {
            let slot = slot_for(&raw);
            raw_html.push(raw);
            Event::Html(slot)
        }
        Event::InlineHtml(raw) => {
            let slot = slot_for(&raw);
            raw_html.push(raw);
            Event::InlineHtml(slot)
        }
        other => other,
    });
    let mut xhtml = String::with_capacity(capacity);
    html::push_html(&mut xhtml, events);
    let generated = xhtml.replace(" />", ">");

    let mut out = String::with_capacity(generated.len());
    let mut pieces = generated.split(RAW_HTML_SLOT);
    out.push_str(pieces.next().unwrap_or_default());
    for (raw, piece) in raw_html.iter().zip(pieces) {
        let raw: &str = raw;
        // A trailing newline already sits at the start of `piece`.
        out.push_str(raw.strip_suffix('\n').unwrap_or(raw));
        out.push_str(piece);
    }
    out
}

impl Renderer for MarkdownRenderer {
    fn render(&self, payload: &Payload, profile: Profile) -> Result<String, RenderError> {
        let source = Self::source(payload)?;
        let parser = Parser::new_ext(&source, profile.options());
        let capacity = source.len() * 3 / 2;
        Ok(match profile.format {
            OutputFormat::Xhtml => {
                let mut out = String::with_capacity(capacity);
                html::push_html(&mut out, parser);
                out
            }
            OutputFormat::Html5 => to_html5(parser, capacity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_text(text: &str, profile: Profile) -> String {
        MarkdownRenderer
            .render(&Payload::Text(text.to_string()), profile)
            .expect("text payloads always render")
    }

    #[test]
    fn plain_profile_renders_commonmark() {
        let html = render_text("# Title\n[text](url)", Profile::plain(OutputFormat::Xhtml));
        assert!(html.contains("<h1>Title</h1>"), "unexpected html: {html}");
        assert!(html.contains("<a href=\"url\">text</a>"), "unexpected html: {html}");
    }

    #[test]
    fn output_format_controls_void_elements() {
        let xhtml = render_text("a\n\n---\n", Profile::plain(OutputFormat::Xhtml));
        let html5 = render_text("a\n\n---\n", Profile::plain(OutputFormat::Html5));
        assert!(xhtml.contains("<hr />"), "unexpected xhtml: {xhtml}");
        assert!(html5.contains("<hr>"), "unexpected html5: {html5}");
        assert!(!html5.contains("/>"));
    }

    #[test]
    fn html5_keeps_raw_html_byte_for_byte() {
        let inline = "x <span title=\"a/>b\">y</span> z\n";
        let html5 = render_text(inline, Profile::plain(OutputFormat::Html5));
        assert_eq!(html5, "<p>x <span title=\"a/>b\">y</span> z</p>\n");

        let block = "<div><br/><img src=\"i\" /></div>\n\n---\n";
        let html5 = render_text(block, Profile::plain(OutputFormat::Html5));
        assert_eq!(html5, "<div><br/><img src=\"i\" /></div>\n<hr>\n");

        let alt = "![<b>](i.png) <i>z</i>\n";
        let html5 = render_text(alt, Profile::plain(OutputFormat::Html5));
        assert_eq!(html5, "<p><img src=\"i.png\" alt=\"&lt;b&gt;\"> <i>z</i></p>\n");
    }

    #[test]
    fn html5_matches_xhtml_apart_from_void_tags() {
        let source = "line  \nbreak\n\n![alt](img.png)\n";
        let xhtml = render_text(source, Profile::plain(OutputFormat::Xhtml));
        let html5 = render_text(source, Profile::plain(OutputFormat::Html5));
        assert!(xhtml.contains("<br />"), "unexpected xhtml: {xhtml}");
        assert_eq!(html5, xhtml.replace(" />", ">"));
    }

    #[test]
    fn single_feature_profile_enables_only_that_extension() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let with = render_text(table, Profile::with(&[Feature::Tables]));
        let without = render_text(table, Profile::with(&[Feature::Strikethrough]));
        assert!(with.contains("<table>"), "tables profile should render a table");
        assert!(!without.contains("<table>"), "other profiles must not");
    }

    #[test]
    fn all_features_option_set_covers_every_feature() {
        let profile = Profile::with(&Feature::ALL);
        for feature in Feature::ALL {
            assert!(
                profile.options().contains(feature.option()),
                "{} missing from the full profile",
                feature.name()
            );
        }
    }

    #[test]
    fn integer_payload_becomes_ordered_list_start() {
        let html = MarkdownRenderer
            .render(&Payload::Integer(7), Profile::plain(OutputFormat::Xhtml))
            .expect("integer renders");
        assert!(html.contains("<ol start=\"7\">"), "unexpected html: {html}");
    }

    #[test]
    fn non_utf8_bytes_are_an_expected_limitation() {
        let err = MarkdownRenderer
            .render(&Payload::Bytes(vec![0xFF, 0xFE]), Profile::with(&Feature::ALL))
            .expect_err("invalid UTF-8 must be rejected");
        assert!(err.is_expected_limitation(), "got {err:?}");
    }

    #[test]
    fn non_finite_float_is_an_expected_limitation() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = MarkdownRenderer
                .render(&Payload::Float(value), Profile::with(&Feature::ALL))
                .expect_err("non-finite floats must be rejected");
            assert!(err.is_expected_limitation());
        }
        assert!(
            MarkdownRenderer
                .render(&Payload::Float(2.5), Profile::with(&Feature::ALL))
                .is_ok()
        );
    }

    #[test]
    fn failed_is_not_an_expected_limitation() {
        let err = RenderError::Failed {
            message: "boom".to_string(),
        };
        assert!(!err.is_expected_limitation());
        assert_eq!(err.to_string(), "render failed: boom");
    }

    #[test]
    fn profile_display_names_features() {
        assert_eq!(Profile::plain(OutputFormat::Html5).to_string(), "html5, no extensions");
        assert_eq!(
            Profile::with(&[Feature::Math, Feature::Gfm]).to_string(),
            "xhtml, math+gfm"
        );
        assert_eq!(Profile::with(&Feature::ALL).to_string(), "xhtml, all extensions");
    }
}
