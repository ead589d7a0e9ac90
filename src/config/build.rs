//! `build` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `build` section - pipeline tuning.
///
/// # Example
/// ```json
/// "build": { "workers": 4, "minify": false }
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Worker threads per plugin pool.
    #[serde(default = "defaults::build::workers")]
    #[educe(Default = defaults::build::workers())]
    pub workers: usize,

    /// Register the post-generate minifier.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,
}
