use pulldown_cmark::{html, Options, Parser};

use super::{FormatError, Loaded, Loader, PageBody, Writer};

/// Markdown page files
pub struct MarkdownPage {
    options: Options,
}

impl MarkdownPage {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }

    fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        html_output
    }
}

impl Default for MarkdownPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader for MarkdownPage {
    fn read(&self, raw: &[u8]) -> Result<Loaded, FormatError> {
        let source = std::str::from_utf8(raw)?.to_string();
        let html = self.to_html(&source);
        Ok(Loaded::Page(PageBody { source, html }))
    }
}

impl Writer for MarkdownPage {
    fn write(&self, value: &Loaded) -> Result<Vec<u8>, FormatError> {
        let page = value.as_page().ok_or(FormatError::WrongKind {
            expected: "page",
            found: value.kind(),
        })?;
        Ok(page.source.clone().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_to_html() {
        let loaded = MarkdownPage::new().read(b"# Hi").unwrap();
        let page = loaded.as_page().unwrap();
        assert_eq!(page.source, "# Hi");
        assert_eq!(page.html.trim(), "<h1>Hi</h1>");
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        assert!(matches!(
            MarkdownPage::new().read(&[0xff, 0xfe]),
            Err(FormatError::Utf8(_))
        ));
    }

    #[test]
    fn test_writer_emits_source() {
        let page = MarkdownPage::new();
        let loaded = page.read(b"Some *text*\n").unwrap();
        assert_eq!(page.write(&loaded).unwrap(), b"Some *text*\n");
    }
}
