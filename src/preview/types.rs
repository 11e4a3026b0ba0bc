use serde::{Deserialize, Serialize};

/// Whether the host has to download a link's page before a previewer can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentNeedPolicy {
    /// The page body and content type are always required.
    Always,
    /// The link alone is enough.
    Never,
    /// The link alone is enough, and when this is the highest-priority
    /// previewer among those not needing content, previewers that would need
    /// a download are not considered at all.
    NeverAndFinal,
    /// Decided per link; see `LinkPreviewer::needs_content`.
    Conditional,
}

/// Static, per-type facts about a previewer. Written once, never mutated.
#[derive(Debug)]
pub struct HelperDescriptor {
    /// Stable identifier, also the suffix of the helper's template name.
    pub key: &'static str,
    pub friendly_name: &'static str,
    /// Bump whenever the template or the variables fed to it change, so
    /// hosts can expire previews they cached.
    pub version: &'static str,
    /// Greater wins. May be negative.
    pub priority: i32,
    /// Preferred: tested against the normalized link.
    pub norm_links_regex: Option<&'static str>,
    /// Fallback when `norm_links_regex` is unset: tested against the raw link.
    pub links_regex: Option<&'static str>,
    /// Built-in template body. `None` means the shared default template.
    pub template: Option<&'static str>,
    pub needs_content: ContentNeedPolicy,
    pub should_cache_preview: bool,
}

impl HelperDescriptor {
    /// Descriptor with neutral defaults, for use in struct update syntax.
    pub const DEFAULT: HelperDescriptor = HelperDescriptor {
        key: "",
        friendly_name: "",
        version: "1.0.0",
        priority: 0,
        norm_links_regex: None,
        links_regex: None,
        template: None,
        needs_content: ContentNeedPolicy::Always,
        should_cache_preview: true,
    };
}

/// One preview request. Content is only present when the host fetched it.
#[derive(Debug, Clone, Copy)]
pub struct PreviewRequest<'a> {
    pub url: &'a str,
    pub content: Option<&'a [u8]>,
    pub content_type: Option<&'a str>,
}

impl<'a> PreviewRequest<'a> {
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            content: None,
            content_type: None,
        }
    }

    pub fn with_content(mut self, content: Option<&'a [u8]>, content_type: Option<&'a str>) -> Self {
        self.content = content;
        self.content_type = content_type;
        self
    }
}

/// Serializable summary of a registered helper, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HelperInfo {
    pub key: String,
    pub friendly_name: String,
    pub version: String,
    pub priority: i32,
    pub needs_content: ContentNeedPolicy,
    pub should_cache_preview: bool,
    pub template_name: String,
}
