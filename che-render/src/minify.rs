//! Whitespace minification for rendered pages.

/// Trim every line and drop blank ones. Lines inside `<pre>` blocks are
/// kept verbatim.
pub fn minify_html(html: &str) -> String {
    let mut out = Vec::new();
    let mut in_pre = false;

    for line in html.lines() {
        let opens = line.contains("<pre");
        let closes = line.contains("</pre>");

        if in_pre {
            out.push(line);
            in_pre = !closes;
            continue;
        }

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed);
        }
        in_pre = opens && !closes;
    }

    out.join("\n")
}
