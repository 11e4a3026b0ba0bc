pub mod image;
pub mod page_title;
pub mod youtube;

use std::sync::Arc;

use crate::error::Result;
use crate::preview::template::Template;
use crate::preview::types::{ContentNeedPolicy, HelperDescriptor, PreviewRequest};

pub use image::ImagePreviewer;
pub use page_title::PageTitlePreviewer;
pub use youtube::YouTubeVideoPreviewer;

/// A strategy that renders previews for one class of links.
///
/// Implementations are stateless: everything they know about themselves is
/// in their [`HelperDescriptor`]. Matching, support re-checks and template
/// lookup are done by the registry entry wrapping them.
pub trait LinkPreviewer: Send + Sync {
    fn descriptor(&self) -> &'static HelperDescriptor;

    /// Whether the page behind `url` must be fetched before previewing it.
    fn needs_content(&self, _url: &str) -> bool {
        match self.descriptor().needs_content {
            ContentNeedPolicy::Never | ContentNeedPolicy::NeverAndFinal => false,
            ContentNeedPolicy::Always | ContentNeedPolicy::Conditional => true,
        }
    }

    /// Builds the preview HTML for a link already known to be supported.
    ///
    /// Every request-derived value must go through `sanitize` on its way
    /// into `template`. An empty string means there was nothing to show.
    fn preview_contents(&self, request: &PreviewRequest<'_>, template: &Template) -> Result<String>;
}

/// Every previewer shipped with the crate, in registration order.
pub fn builtin_previewers() -> Vec<Arc<dyn LinkPreviewer>> {
    vec![
        Arc::new(YouTubeVideoPreviewer) as Arc<dyn LinkPreviewer>,
        Arc::new(ImagePreviewer),
        Arc::new(PageTitlePreviewer),
    ]
}

pub fn builtin_keys() -> Vec<&'static str> {
    builtin_previewers()
        .iter()
        .map(|previewer| previewer.descriptor().key)
        .collect()
}
