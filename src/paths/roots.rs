use crate::paths::canonical::CanonicalPath;
use crate::paths::error::AccessError;
use crate::shared::ids::BundleId;
use serde::Serialize;

/// The trusted root directories, read once from configuration and passed
/// down explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roots {
    pub project_root: CanonicalPath,
    pub core_root: CanonicalPath,
    pub bundles_root: CanonicalPath,
    pub output_root: CanonicalPath,
}

impl Roots {
    pub fn new(
        project_root: &str,
        core_root: &str,
        bundles_root: &str,
        output_root: &str,
    ) -> Result<Self, AccessError> {
        Ok(Self {
            project_root: CanonicalPath::parse(project_root)?,
            core_root: CanonicalPath::parse(core_root)?,
            bundles_root: CanonicalPath::parse(bundles_root)?,
            output_root: CanonicalPath::parse(output_root)?,
        })
    }

    /// `<bundles_root>/<bundle>`, or the bundles root itself when no bundle
    /// is selected.
    pub fn bundle_root(&self, bundle: Option<&BundleId>) -> Result<CanonicalPath, AccessError> {
        match bundle {
            Some(bundle) => self.bundles_root.join_segment(bundle.as_str()),
            None => Ok(self.bundles_root.clone()),
        }
    }
}
