//! Tag operations

use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Names of all tags
    #[instrument(skip(self))]
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;
        let names: Vec<String> = tags.iter().flatten().map(str::to_string).collect();
        debug!(count = names.len(), "listed all tags");
        Ok(names)
    }

    /// Whether the repository has at least one tag
    pub fn has_tags(&self) -> Result<bool> {
        Ok(!self.tag_names()?.is_empty())
    }

    /// Commit a tag points to, `None` when the tag does not exist
    pub fn tag_commit(&self, name: &str) -> Result<Option<String>> {
        let tag_ref = format!("refs/tags/{}", name);

        match self.repo.find_reference(&tag_ref) {
            Ok(reference) => Ok(Some(reference.peel_to_commit()?.id().to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
