use ego_tree::NodeRef;
use scraper::{Html, Node};

use super::latex;

/// Delimiter inserted between extracted content segments. The synthesis
/// layer splits on the same constant when it rebuilds per-segment markup,
/// so the two must never diverge.
pub const CONTENT_SEGMENT_DELIMITER: &str = "; ";

/// Custom rich-text tags whose designated text attribute is voiced in place
/// of the tag itself.
const TEXT_ATTRIBUTE_TAGS: [&str; 2] = [
    "oppia-noninteractive-link",
    "oppia-noninteractive-skillreview",
];

/// Custom rich-text tag carrying a LaTeX formula payload.
const MATH_TAG: &str = "oppia-noninteractive-math";

/// Converts rich lesson markup into a flat, speech-ready plain-text string.
///
/// The markup is parsed as an HTML fragment; custom rich-text tags are
/// rewritten to their spoken equivalent (or silenced), and the text of all
/// remaining leaf nodes is collected in document order, trimmed per segment,
/// and joined with `CONTENT_SEGMENT_DELIMITER`.
///
/// Malformed markup never fails: unparseable fragments and undecodable
/// attribute payloads simply contribute no text.
pub fn normalize(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut segments: Vec<String> = Vec::new();
    collect_segments(fragment.tree.root(), &mut segments);
    segments.join(CONTENT_SEGMENT_DELIMITER)
}

fn collect_segments(node: NodeRef<'_, Node>, segments: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                segments.push(trimmed.to_string());
            }
        }
        Node::Element(element) => {
            let name = element.name();

            if TEXT_ATTRIBUTE_TAGS.contains(&name) {
                if let Some(spoken) = decode_text_attribute(element.attr("text-with-value")) {
                    let trimmed = spoken.trim();
                    if !trimmed.is_empty() {
                        segments.push(trimmed.to_string());
                    }
                }
                // The attribute text replaces whatever the tag contains.
                return;
            }

            if name == MATH_TAG {
                if let Some(spoken) = decode_math_attribute(element.attr("math_content-with-value"))
                {
                    let trimmed = spoken.trim();
                    if !trimmed.is_empty() {
                        segments.push(trimmed.to_string());
                    }
                }
                return;
            }

            // Every other element, including the silent custom tags
            // (image, video, tabs, collapsible), is treated as a generic
            // container: attributes are never voiced, nested text still is.
            for child in node.children() {
                collect_segments(child, segments);
            }
        }
        _ => {
            for child in node.children() {
                collect_segments(child, segments);
            }
        }
    }
}

/// Decodes a `text-with-value` attribute, which carries a JSON-encoded
/// string that may additionally be HTML-entity-escaped in stored content.
fn decode_text_attribute(raw: Option<&str>) -> Option<String> {
    let unescaped = unescape_entities(raw?);
    serde_json::from_str::<String>(&unescaped).ok()
}

/// Decodes a `math_content-with-value` attribute into the plain-language
/// rendering of its `raw_latex` field.
fn decode_math_attribute(raw: Option<&str>) -> Option<String> {
    let unescaped = unescape_entities(raw?);
    let payload: serde_json::Value = serde_json::from_str(&unescaped).ok()?;
    let raw_latex = payload.get("raw_latex")?.as_str()?;
    Some(latex::latex_to_text(raw_latex))
}

/// Resolves the HTML entities that appear in stored attribute payloads.
/// The fragment parser already unescapes one level; stored content may carry
/// a second (`&amp;quot;` style) level.
fn unescape_entities(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_plain_paragraphs_joined_with_delimiter() {
        let markup = "<p>Hello world</p>\n\n<p><em>Italics text</em></p>";
        assert_eq!(normalize(markup), "Hello world; Italics text");
    }

    #[test]
    fn test_normalize_strips_surrounding_whitespace_per_segment() {
        let markup = "<p>  First  </p><p>\n Second \n</p>";
        assert_eq!(normalize(markup), "First; Second");
    }

    #[test]
    fn test_normalize_link_tag_voices_text_attribute() {
        let markup = concat!(
            "<p><oppia-noninteractive-link ",
            "text-with-value=\"&quot;Oppia official website URL&quot;\" ",
            "url-with-value=\"&quot;https://www.oppia.org&quot;\">",
            "</oppia-noninteractive-link></p>"
        );
        assert_eq!(normalize(markup), "Oppia official website URL");
    }

    #[test]
    fn test_normalize_skillreview_tag_voices_text_attribute() {
        let markup = concat!(
            "<p>Review <oppia-noninteractive-skillreview ",
            "text-with-value=\"&quot;fractions&quot;\" ",
            "skill_id-with-value=\"&quot;skill1&quot;\">",
            "</oppia-noninteractive-skillreview> again</p>"
        );
        assert_eq!(normalize(markup), "Review; fractions; again");
    }

    #[test]
    fn test_normalize_math_tag_renders_latex() {
        let markup = concat!(
            "<p>Compute <oppia-noninteractive-math ",
            "math_content-with-value=\"",
            "{&quot;raw_latex&quot;: &quot;\\\\frac{2}{3}&quot;, ",
            "&quot;svg_filename&quot;: &quot;math.svg&quot;}\">",
            "</oppia-noninteractive-math></p>"
        );
        assert_eq!(normalize(markup), "Compute; 2/3");
    }

    #[test]
    fn test_normalize_image_attributes_are_never_voiced() {
        let markup = concat!(
            "<p>Before</p>",
            "<oppia-noninteractive-image ",
            "alt-with-value=\"&quot;a diagram&quot;\" ",
            "filepath-with-value=\"&quot;img.svg&quot;\">",
            "</oppia-noninteractive-image>",
            "<p>After</p>"
        );
        assert_eq!(normalize(markup), "Before; After");
    }

    #[test]
    fn test_normalize_double_escaped_attribute_payload() {
        let markup = concat!(
            "<p><oppia-noninteractive-link ",
            "text-with-value=\"&amp;quot;Nested escape&amp;quot;\">",
            "</oppia-noninteractive-link></p>"
        );
        assert_eq!(normalize(markup), "Nested escape");
    }

    #[test]
    fn test_normalize_malformed_attribute_degrades_to_empty() {
        let markup = concat!(
            "<p>Kept</p>",
            "<oppia-noninteractive-link text-with-value=\"not json\">",
            "</oppia-noninteractive-link>"
        );
        assert_eq!(normalize(markup), "Kept");
    }

    #[test]
    fn test_normalize_missing_attribute_degrades_to_empty() {
        let markup = "<oppia-noninteractive-math></oppia-noninteractive-math><p>Tail</p>";
        assert_eq!(normalize(markup), "Tail");
    }

    #[test]
    fn test_normalize_malformed_markup_does_not_panic() {
        let markup = "<p>Unclosed <em>nested <p></oppia-broken>";
        assert_eq!(normalize(markup), "Unclosed; nested");
    }

    #[test]
    fn test_normalize_empty_markup() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n  "), "");
    }

    #[test]
    fn test_normalize_is_idempotent_over_rewrapped_output() {
        let markup = concat!(
            "<p>Hello world</p><p><em>Italics text</em></p>",
            "<p><oppia-noninteractive-link ",
            "text-with-value=\"&quot;A link label&quot;\">",
            "</oppia-noninteractive-link></p>"
        );
        let once = normalize(markup);
        let rewrapped = format!("<p>{}</p>", once);
        assert_eq!(normalize(&rewrapped), once);
    }
}
