use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::preview::normalize::parse_link;
use crate::preview::previewers::LinkPreviewer;
use crate::preview::sanitize::sanitize;
use crate::preview::template::{Template, TemplateVars};
use crate::preview::types::{ContentNeedPolicy, HelperDescriptor, PreviewRequest};

static DESCRIPTOR: HelperDescriptor = HelperDescriptor {
    key: "image",
    friendly_name: "Image",
    version: "1.0.0",
    priority: 1,
    links_regex: Some(
        r"(?i)^https?://(?:i\.imgur\.com/|pbs\.twimg\.com/media/|[^?#]*\.(?:png|jpe?g|gif|webp|avif|bmp)(?:[?#]|$))",
    ),
    needs_content: ContentNeedPolicy::Conditional,
    should_cache_preview: false,
    template: Some(
        r#"<div style="margin-top: 7px;"><a href="{$url}"><img src="{$url}" alt="" style="max-width: 100%; max-height: 480px;" /></a></div>"#,
    ),
    ..HelperDescriptor::DEFAULT
};

static IMAGE_EXT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(?:png|jpe?g|gif|webp|avif|bmp)$").expect("Failed to compile image extension regex")
});

/// Inlines direct image links. Links with an image file extension are shown
/// as they are; extensionless links from image hosts wait for the page's
/// content type.
pub struct ImagePreviewer;

impl ImagePreviewer {
    fn has_image_extension(url: &Url) -> bool {
        IMAGE_EXT_REGEX.is_match(url.path())
    }
}

fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

impl LinkPreviewer for ImagePreviewer {
    fn descriptor(&self) -> &'static HelperDescriptor {
        &DESCRIPTOR
    }

    fn needs_content(&self, url: &str) -> bool {
        match parse_link(url) {
            Some(url) => !Self::has_image_extension(&url),
            None => true,
        }
    }

    fn preview_contents(&self, request: &PreviewRequest<'_>, template: &Template) -> Result<String> {
        let Some(url) = parse_link(request.url) else {
            return Ok(String::new());
        };

        let confirmed = Self::has_image_extension(&url)
            || request.content_type.map(is_image_content_type).unwrap_or(false);
        if !confirmed {
            log::debug!("{} is not an image (content type {:?})", request.url, request.content_type);
            return Ok(String::new());
        }

        // the serialized url percent-encodes quotes and angle brackets
        let vars = TemplateVars::new().set("url", sanitize(url.as_str()));
        Ok(template.render(&vars))
    }
}
