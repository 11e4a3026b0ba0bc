use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::Result;
use crate::preview::normalize::parse_link;
use crate::preview::previewers::LinkPreviewer;
use crate::preview::sanitize::sanitize;
use crate::preview::template::{Template, TemplateVars};
use crate::preview::types::{ContentNeedPolicy, HelperDescriptor, PreviewRequest};

static DESCRIPTOR: HelperDescriptor = HelperDescriptor {
    key: "pagetitle",
    friendly_name: "Page title and description",
    version: "1.0.0",
    priority: -1,
    links_regex: Some(r"(?i)^https?://"),
    needs_content: ContentNeedPolicy::Always,
    should_cache_preview: true,
    template: None,
    ..HelperDescriptor::DEFAULT
};

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("Failed to parse meta selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to parse title selector"));

/// Fallback for any web page: shows its title and description.
pub struct PageTitlePreviewer;

#[derive(Debug, Default, PartialEq)]
struct PageSummary {
    title: Option<String>,
    description: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn summarize(html: &str) -> PageSummary {
    let document = Html::parse_document(html);

    let mut summary = PageSummary::default();

    for element in document.select(&META_SELECTOR) {
        let meta_prop = element.attr("property").unwrap_or_default();
        let meta_key = element.attr("name").unwrap_or(meta_prop);
        let meta_value = element.attr("content").unwrap_or_default();

        // OG/twitter titles are preferred over <title>
        if summary.title.is_none()
            && ["og:title", "twitter:title"]
                .into_iter()
                .any(|name| name == meta_key)
        {
            summary.title = non_blank(meta_value);
        }

        if summary.description.is_none()
            && ["description", "Description", "og:description", "twitter:description"]
                .into_iter()
                .any(|name| name == meta_key)
        {
            summary.description = non_blank(meta_value);
        }
    }

    if summary.title.is_none() {
        summary.title = document
            .select(&TITLE_SELECTOR)
            .next()
            .and_then(|title| non_blank(&title.text().collect::<String>()));
    }

    summary
}

fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(content_type) => {
            let content_type = content_type.to_ascii_lowercase();
            content_type.contains("html")
        }
    }
}

impl LinkPreviewer for PageTitlePreviewer {
    fn descriptor(&self) -> &'static HelperDescriptor {
        &DESCRIPTOR
    }

    fn preview_contents(&self, request: &PreviewRequest<'_>, template: &Template) -> Result<String> {
        let Some(content) = request.content else {
            return Ok(String::new());
        };
        if !is_html(request.content_type) {
            log::debug!("skipping {} with content type {:?}", request.url, request.content_type);
            return Ok(String::new());
        }
        let Some(url) = parse_link(request.url) else {
            return Ok(String::new());
        };

        let summary = summarize(&String::from_utf8_lossy(content));
        let Some(title) = summary.title else {
            return Ok(String::new());
        };

        let vars = TemplateVars::new()
            .set("url", sanitize(url.as_str()))
            .set("title", sanitize(&title))
            .set("description", sanitize(summary.description.as_deref().unwrap_or_default()));

        Ok(template.render(&vars))
    }
}
