pub mod normalize;
pub mod previewers;
pub mod registry;
pub mod sanitize;
pub mod template;
pub mod types;

pub use previewers::LinkPreviewer;
pub use registry::{Helper, HelperRegistry, Resolution, ResolutionReport};
pub use sanitize::{sanitize, SafeText};
pub use template::{TemplateSet, TemplateSource, TemplateVars};
pub use types::{ContentNeedPolicy, HelperDescriptor, HelperInfo, PreviewRequest};
