//! HTML element writers shared by the renderer and the autolinker.

use std::fmt::Write;

use crate::state::escape_html;

/// Write an opening `<a>` tag.
///
/// With `new_tab`, absolute `http(s)` links get `target="_blank"`; the output
/// sanitizer adds `rel="noopener noreferrer"` to every link.
pub(crate) fn write_link_start(href: &str, title: &str, new_tab: bool, out: &mut String) {
    write!(out, r#"<a href="{}""#, escape_html(href)).unwrap();
    if !title.is_empty() {
        write!(out, r#" title="{}""#, escape_html(title)).unwrap();
    }
    if new_tab && is_external(href) {
        out.push_str(r#" target="_blank""#);
    }
    out.push('>');
}

/// Write an `<img>` tag.
pub(crate) fn write_image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

/// Write a disabled task list checkbox.
pub(crate) fn write_task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked disabled> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled> "#);
    }
}

fn is_external(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_link() {
        let mut out = String::new();
        write_link_start("page.html", "", false, &mut out);
        assert_eq!(out, r#"<a href="page.html">"#);
    }

    #[test]
    fn test_link_with_title() {
        let mut out = String::new();
        write_link_start("https://example.com", "Say \"hi\"", false, &mut out);
        assert_eq!(
            out,
            r#"<a href="https://example.com" title="Say &quot;hi&quot;">"#
        );
    }

    #[test]
    fn test_link_new_tab_only_for_external() {
        let mut out = String::new();
        write_link_start("HTTPS://example.com", "", true, &mut out);
        assert_eq!(out, r#"<a href="HTTPS://example.com" target="_blank">"#);

        let mut out = String::new();
        write_link_start("#section", "", true, &mut out);
        assert_eq!(out, r##"<a href="#section">"##);
    }

    #[test]
    fn test_link_href_escaped() {
        let mut out = String::new();
        write_link_start(r#"x" onclick="alert(1)"#, "", false, &mut out);
        assert_eq!(out, r#"<a href="x&quot; onclick=&quot;alert(1)">"#);
    }

    #[test]
    fn test_image() {
        let mut out = String::new();
        write_image("image.png", "Alt text", "", &mut out);
        assert_eq!(out, r#"<img src="image.png" alt="Alt text">"#);
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        write_image("image.png", "Alt text", "Image title", &mut out);
        assert_eq!(
            out,
            r#"<img src="image.png" title="Image title" alt="Alt text">"#
        );
    }

    #[test]
    fn test_task_list_marker() {
        let mut out = String::new();
        write_task_list_marker(false, &mut out);
        write_task_list_marker(true, &mut out);
        assert_eq!(
            out,
            r#"<input type="checkbox" disabled> <input type="checkbox" checked disabled> "#
        );
    }
}
