use std::collections::HashMap;

use linkify::{LinkFinder, LinkKind};
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html};

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options
}

/// Convert Markdown to the HTML stored alongside a note.
///
/// Headings get generated `id`s (explicit `{#id}` attributes win), bare
/// URLs in prose become links, and absolute `http(s)` links open in a new
/// tab. Pure and total: any input yields some output.
pub fn to_display_markup(source: &str) -> String {
    let events: Vec<Event<'_>> = Parser::new_ext(source, parser_options()).collect();
    let events = assign_heading_ids(events);
    let events = autolink_bare_urls(merge_adjacent_text(events));
    let events = target_blank_external_links(events);

    let mut html_output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

/// Lowercase letters and digits, with each run of anything else collapsed
/// to a single `-` between words.
fn anchor_name(text: &str) -> String {
    let mut anchor = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !anchor.is_empty() {
                anchor.push('-');
            }
            pending_dash = false;
            anchor.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    anchor
}

fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    // Reserve explicit ids first so generated ones never collide with them.
    for event in &events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            seen.entry(id.to_string()).or_insert(0);
        }
    }

    let mut i = 0;
    while i < events.len() {
        let needs_id = matches!(&events[i], Event::Start(Tag::Heading { id: None, .. }));
        if !needs_id {
            i += 1;
            continue;
        }

        let mut text = String::new();
        let mut j = i + 1;
        while j < events.len() {
            match &events[j] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            j += 1;
        }

        let base = anchor_name(&text);
        if !base.is_empty() {
            let unique = unique_anchor(&mut seen, base);
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(unique));
            }
        }
        i = j;
    }
    events
}

/// `base`, or `base-N` with the smallest N not yet taken.
fn unique_anchor(seen: &mut HashMap<String, usize>, base: String) -> String {
    if !seen.contains_key(&base) {
        seen.insert(base.clone(), 0);
        return base;
    }
    loop {
        let n = match seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => 1,
        };
        let candidate = format!("{base}-{n}");
        if !seen.contains_key(&candidate) {
            seen.insert(candidate.clone(), 0);
            return candidate;
        }
    }
}

/// The parser splits prose at entities and smart punctuation; rejoin it so
/// a URL is seen whole.
fn merge_adjacent_text(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut merged: Vec<Event<'_>> = Vec::with_capacity(events.len());
    for event in events {
        if let Event::Text(next) = &event
            && let Some(Event::Text(prev)) = merged.last_mut()
        {
            let mut joined = prev.to_string();
            joined.push_str(next);
            *prev = CowStr::from(joined);
            continue;
        }
        merged.push(event);
    }
    merged
}

/// Wrap scheme-qualified URLs found in plain text in autolinks. Text inside
/// links, images and code blocks is left as it is.
fn autolink_bare_urls(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);

    let mut out = Vec::with_capacity(events.len());
    let mut shielded = 0usize;
    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                shielded += 1;
            }
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                shielded = shielded.saturating_sub(1);
            }
            Event::Text(text) if shielded == 0 => {
                if let Some(linked) = link_spans(&finder, text) {
                    out.extend(linked);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn link_spans<'a>(finder: &LinkFinder, text: &str) -> Option<Vec<Event<'a>>> {
    let spans: Vec<_> = finder.spans(text).collect();
    if spans.iter().all(|span| span.kind().is_none()) {
        return None;
    }

    let mut events = Vec::with_capacity(spans.len() * 3);
    for span in spans {
        let piece = span.as_str().to_string();
        if span.kind().is_none() {
            events.push(Event::Text(CowStr::from(piece)));
            continue;
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(piece.clone()),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(CowStr::from(piece)));
        events.push(Event::End(TagEnd::Link));
    }
    Some(events)
}

fn is_external(dest: &str) -> bool {
    let lower = dest.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

fn target_blank_external_links(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut rewritten_links: Vec<bool> = Vec::new();
    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if is_external(&dest_url) => {
                rewritten_links.push(true);
                let mut open = format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"",
                    html_escape::encode_double_quoted_attribute(&dest_url)
                );
                if !title.is_empty() {
                    open.push_str(&format!(
                        " title=\"{}\"",
                        html_escape::encode_double_quoted_attribute(&title)
                    ));
                }
                open.push('>');
                Event::InlineHtml(CowStr::from(open))
            }
            Event::Start(tag @ Tag::Link { .. }) => {
                rewritten_links.push(false);
                Event::Start(tag)
            }
            Event::End(TagEnd::Link) => {
                if rewritten_links.pop().unwrap_or(false) {
                    Event::InlineHtml(CowStr::Borrowed("</a>"))
                } else {
                    Event::End(TagEnd::Link)
                }
            }
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = to_display_markup("**bold** and *italic*");
        assert_eq!(html, "<p><strong>bold</strong> and <em>italic</em></p>\n");
    }

    #[test]
    fn headings_get_anchor_ids() {
        let html = to_display_markup("# Hello, World!\n\n## Second  part");
        assert!(html.contains("<h1 id=\"hello-world\">Hello, World!</h1>"));
        assert!(html.contains("<h2 id=\"second-part\">Second  part</h2>"));
    }

    #[test]
    fn duplicate_headings_get_numbered_ids() {
        let html = to_display_markup("# Notes\n\n# Notes\n\n# Notes");
        assert!(html.contains("<h1 id=\"notes\">"));
        assert!(html.contains("<h1 id=\"notes-1\">"));
        assert!(html.contains("<h1 id=\"notes-2\">"));
    }

    #[test]
    fn explicit_heading_id_is_kept() {
        let html = to_display_markup("# Intro {#start}\n\n# Start");
        assert!(html.contains("<h1 id=\"start\">Intro</h1>"));
        assert!(html.contains("<h1 id=\"start-1\">Start</h1>"));
    }

    #[test]
    fn inline_code_counts_toward_heading_id() {
        let html = to_display_markup("## Using `cargo test`");
        assert!(html.contains("id=\"using-cargo-test\""));
    }

    #[test]
    fn external_links_open_in_new_tab() {
        let html = to_display_markup("See [docs](https://example.com/a?b=1&c=2 \"The docs\").");
        assert!(html.contains(
            "<a href=\"https://example.com/a?b=1&amp;c=2\" target=\"_blank\" rel=\"noopener noreferrer\" title=\"The docs\">docs</a>"
        ));
    }

    #[test]
    fn bare_urls_become_external_links() {
        let html = to_display_markup("Visit https://example.com today.");
        assert_eq!(
            html,
            "<p>Visit <a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">https://example.com</a> today.</p>\n"
        );
    }

    #[test]
    fn bare_url_with_query_is_linked_whole() {
        let html = to_display_markup("See http://example.com/a?b=1&c=2 for more");
        assert!(html.contains("<a href=\"http://example.com/a?b=1&amp;c=2\" target=\"_blank\""));
        assert!(html.contains(">http://example.com/a?b=1&amp;c=2</a> for more"));
    }

    #[test]
    fn urls_in_code_and_links_are_not_autolinked() {
        let html = to_display_markup(
            "`https://a.test`\n\n```\nhttps://b.test\n```\n\n[https://c.test](https://c.test)",
        );
        assert!(html.contains("<code>https://a.test</code>"));
        assert!(html.contains("<code>https://b.test\n</code>"));
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn relative_links_are_left_alone() {
        let html = to_display_markup("[top](#intro) and [file](./other.md)");
        assert!(html.contains("<a href=\"#intro\">top</a>"));
        assert!(html.contains("<a href=\"./other.md\">file</a>"));
        assert!(!html.contains("_blank"));
    }

    #[test]
    fn common_extensions_are_enabled() {
        let html = to_display_markup("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn heading_without_blank_line_before() {
        let html = to_display_markup("some text\n# Title\nmore text");
        assert!(html.contains("<p>some text</p>"));
        assert!(html.contains("<h1 id=\"title\">Title</h1>"));
    }

    #[test]
    fn output_is_deterministic() {
        let source = "# A\n\n# A\n\n[x](http://x.test) text *y*\n\n| h |\n|---|\n| c |";
        assert_eq!(to_display_markup(source), to_display_markup(source));
    }

    #[test]
    fn malformed_input_still_renders() {
        for source in ["", "[unclosed](", "```\nno end", "<div>raw", "# ", "****", "|\n|-"] {
            let _ = to_display_markup(source);
        }
        assert_eq!(to_display_markup(""), "");
    }

    #[test]
    fn anchor_name_collapses_punctuation() {
        assert_eq!(anchor_name("  What's new? (v2)  "), "what-s-new-v2");
        assert_eq!(anchor_name("!!!"), "");
    }
}
