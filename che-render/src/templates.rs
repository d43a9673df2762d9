//! Askama template definitions.

use askama::Template;

/// One link in the site navigation
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub url: String,
    pub title: String,
    pub current: bool,
}

/// Template for a single content page
#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} | {{ site_title }}</title>
</head>
<body class="{{ template_class }}">
{% if !nav.is_empty() %}
  <nav>
    <ul>
{% for item in nav %}
      <li{% if item.current %} class="current"{% endif %}><a href="{{ item.url }}">{{ item.title }}</a></li>
{% endfor %}
    </ul>
  </nav>
{% endif %}
  <main>
{{ content|safe }}
  </main>
</body>
</html>
"#
)]
pub struct PageTemplate {
    pub title: String,
    pub site_title: String,
    pub template_class: String,
    pub content: String,
    pub nav: Vec<NavItem>,
}
