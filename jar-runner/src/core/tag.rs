//! Deterministic process tags
//!
//! A tag is embedded into the launch command as a bare `-D<tag>` flag. Because
//! it only depends on the artifact path, a later run can recompute it and find
//! processes left behind by an earlier, possibly crashed, run.

use sha1::{Digest, Sha1};
use std::fmt;
use std::path::Path;

pub const TAG_PREFIX: &str = "process-key";

/// Identifier of every process launched for one artifact path
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// Derive the tag for an absolute artifact path.
    pub fn for_path(path: &Path) -> Self {
        let digest = Sha1::digest(path.to_string_lossy().as_bytes());
        Self(format!("{TAG_PREFIX}_{}", hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare system-property flag carried on the command line
    pub fn flag(&self) -> String {
        format!("-D{}", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_same_path_same_tag() {
        let path = PathBuf::from("/tmp/app.jar");
        assert_eq!(Tag::for_path(&path), Tag::for_path(&path));
        assert_eq!(Tag::for_path(&path), Tag::for_path(Path::new("/tmp/app.jar")));
    }

    #[test]
    fn test_different_paths_different_tags() {
        let a = Tag::for_path(Path::new("/tmp/app.jar"));
        let b = Tag::for_path(Path::new("/tmp/app2.jar"));
        let c = Tag::for_path(Path::new("/var/tmp/app.jar"));

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_tag_is_stable_across_runs() {
        // Pinned: if the hashing scheme changes, leftovers of older runs are no longer found.
        let tag = Tag::for_path(Path::new("/tmp/app.jar"));
        assert_eq!(
            tag.as_str(),
            "process-key_4a8e0de81562804859c59eb8132d596b51c73c75"
        );
    }

    #[test]
    fn test_flag_format() {
        let tag = Tag::for_path(Path::new("/tmp/app.jar"));
        assert_eq!(tag.flag(), format!("-D{tag}"));
        assert!(tag.flag().starts_with("-Dprocess-key_"));
    }
}
