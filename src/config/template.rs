//! `template` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `template` section - where templates live and how they are classified.
///
/// # Example
/// ```json
/// "template": { "path": "template", "partials": "partials", "layout": "base.html" }
/// ```
///
/// Unknown keys are ignored, so older configs carrying `base_template` load.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
pub struct TemplateConfig {
    /// Template root directory.
    #[serde(default = "defaults::template::path")]
    #[educe(Default = defaults::template::path())]
    pub path: PathBuf,

    /// Partials directory, relative to the template root. A path that
    /// already starts with the template path is taken from the site root.
    #[serde(default = "defaults::template::partials")]
    #[educe(Default = defaults::template::partials())]
    pub partials: PathBuf,

    /// File name of the base layout.
    #[serde(default = "defaults::template::layout")]
    #[educe(Default = defaults::template::layout())]
    pub layout: String,
}
