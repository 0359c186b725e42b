use std::collections::{HashMap, HashSet};

/// Render question text (markdown or plain) to sanitized HTML.
#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

/// Keep formatting tags only. Scripts, handlers and inline images are dropped;
/// question images are rendered from `image_path` instead.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "br", "em", "strong", "b", "i", "del", "code", "pre", "blockquote", "ul", "ol",
        "li", "a", "table", "thead", "tbody", "tr", "th", "td", "sub", "sup",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

/// Plain option text with surrounding whitespace collapsed for one-line labels.
#[must_use]
pub fn option_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_inline_code_and_emphasis() {
        let html = markdown_to_html("What does `Box<T>` **own**?");
        assert!(html.contains("<code>Box&lt;T&gt;</code>"), "{html}");
        assert!(html.contains("<strong>own</strong>"), "{html}");
    }

    #[test]
    fn strips_scripts_and_images() {
        let html = markdown_to_html("Hi <script>alert(1)</script> ![x](http://evil/x.png)");
        assert!(!html.contains("script"), "{html}");
        assert!(!html.contains("<img"), "{html}");
    }

    #[test]
    fn plain_text_becomes_a_paragraph() {
        assert_eq!(markdown_to_html("Pick one").trim_end(), "<p>Pick one</p>");
    }

    #[test]
    fn option_label_collapses_whitespace() {
        assert_eq!(option_label("  move \n semantics "), "move semantics");
    }
}
