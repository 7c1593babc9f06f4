//! Mapping between logical part paths and cache file paths.
//!
//! Nothing here touches the filesystem. A logical path such as
//! `word/document.xml` maps to the same relative path under each tier root;
//! the reverse mapping strips the cache root and the tier segment again.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CacheError;

/// Directory under the storage root that holds everything this crate writes.
pub const VIEWER_DIR_NAME: &str = "ooxml-viewer";

/// Directory under [`VIEWER_DIR_NAME`] that holds one cache root per document.
pub const CACHE_DIR_NAME: &str = "cache";

/// One of the three cache subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Current contents, as last written or opened.
    Normal,
    /// Contents at the most recent accepted baseline.
    Prev,
    /// Contents the current file is diffed against.
    Compare,
}

impl Tier {
    /// All tiers, in the order multi-tier operations touch them.
    pub const ALL: [Tier; 3] = [Tier::Normal, Tier::Prev, Tier::Compare];

    /// Name of the tier directory under the cache root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Tier::Normal => "normal",
            Tier::Prev => "prev",
            Tier::Compare => "compare",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Tier {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.dir_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CacheError::UnknownTier(s.to_string()))
    }
}

/// How cache paths are compared against each other.
///
/// Casing is only folded for comparison; paths are always built and stored
/// with the casing the caller supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCase {
    /// Compare paths ignoring case (Windows and macOS default volumes).
    #[default]
    Insensitive,
    /// Compare paths byte for byte.
    Sensitive,
}

impl PathCase {
    /// Returns the comparison key for a single path segment.
    pub fn fold(self, segment: &str) -> String {
        match self {
            PathCase::Insensitive => segment.to_lowercase(),
            PathCase::Sensitive => segment.to_string(),
        }
    }
}

/// A cache file path resolved back to its tier and logical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachedPath {
    pub tier: Tier,
    pub logical_path: String,
}

/// Path arithmetic for the cache of one document.
#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
    case: PathCase,
}

impl CachePaths {
    /// Creates the mapper for `<storage_root>/ooxml-viewer/cache/<file_name>`.
    ///
    /// `document` may be a bare file name or a full path to the package; only
    /// its final component is used.
    pub fn new(storage_root: impl AsRef<Path>, document: &str) -> Result<Self, CacheError> {
        let file_name = Path::new(document)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CacheError::InvalidDocumentName(document.to_string()))?;

        let root = storage_root
            .as_ref()
            .join(VIEWER_DIR_NAME)
            .join(CACHE_DIR_NAME)
            .join(file_name);

        Ok(Self {
            root,
            case: PathCase::default(),
        })
    }

    /// Sets how paths are compared.
    pub fn with_case(mut self, case: PathCase) -> Self {
        self.case = case;
        self
    }

    /// Returns the comparison mode.
    pub fn case(&self) -> PathCase {
        self.case
    }

    /// Returns the cache root of this document.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the root directory of one tier.
    pub fn tier_root(&self, tier: Tier) -> PathBuf {
        self.root.join(tier.dir_name())
    }

    /// Maps a logical path into the given tier.
    pub fn tier_path(&self, tier: Tier, logical_path: &str) -> PathBuf {
        let mut path = self.tier_root(tier);
        for segment in logical_segments(logical_path) {
            path.push(segment);
        }
        path
    }

    pub fn normal(&self, logical_path: &str) -> PathBuf {
        self.tier_path(Tier::Normal, logical_path)
    }

    pub fn prev(&self, logical_path: &str) -> PathBuf {
        self.tier_path(Tier::Prev, logical_path)
    }

    pub fn compare(&self, logical_path: &str) -> PathBuf {
        self.tier_path(Tier::Compare, logical_path)
    }

    /// Resolves a cache file path to its tier and logical path.
    ///
    /// Returns `None` for paths outside the cache root, for tier roots
    /// themselves, and for paths that leave their tier through `..`.
    pub fn classify(&self, path: impl AsRef<Path>) -> Option<CachedPath> {
        let (tier, rest) = self.split(path.as_ref())?;
        if rest.is_empty() {
            return None;
        }
        Some(CachedPath {
            tier,
            logical_path: rest.join("/"),
        })
    }

    /// Returns the tier a path lies in, including the tier root directory itself.
    pub fn tier_of(&self, path: impl AsRef<Path>) -> Option<Tier> {
        self.split(path.as_ref()).map(|(tier, _)| tier)
    }

    /// Returns the logical path of a cache file, or the input unchanged when
    /// it does not point into the cache.
    pub fn logical_path(&self, path: impl AsRef<Path>) -> String {
        let path = path.as_ref();
        match self.classify(path) {
            Some(cached) => cached.logical_path,
            None => path.to_string_lossy().into_owned(),
        }
    }

    /// Returns whether a path addresses a file in any tier of this cache.
    pub fn belongs(&self, path: impl AsRef<Path>) -> bool {
        self.classify(path).is_some()
    }

    /// Returns whether a path addresses a file in the `normal` tier.
    pub fn is_normal(&self, path: impl AsRef<Path>) -> bool {
        matches!(
            self.classify(path),
            Some(CachedPath {
                tier: Tier::Normal,
                ..
            })
        )
    }

    /// Returns the key two paths must share to be considered equal.
    ///
    /// Every path comparison in this crate goes through this key.
    pub fn comparison_key(&self, path: impl AsRef<Path>) -> String {
        path.as_ref()
            .components()
            .map(|component| self.case.fold(&component.as_os_str().to_string_lossy()))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Compares two paths the way every classification in this module does.
    pub fn same_path(&self, a: impl AsRef<Path>, b: impl AsRef<Path>) -> bool {
        self.comparison_key(a) == self.comparison_key(b)
    }

    fn split(&self, path: &Path) -> Option<(Tier, Vec<String>)> {
        let mut components = path.components();

        for expected in self.root.components() {
            if !self.same_path(components.next()?, expected) {
                return None;
            }
        }

        let tier_component = components.next()?;
        let tier = Tier::ALL
            .into_iter()
            .find(|tier| self.same_path(tier_component, tier.dir_name()))?;

        let mut rest = Vec::new();
        for component in components {
            match component {
                Component::Normal(segment) => rest.push(segment.to_string_lossy().into_owned()),
                _ => return None,
            }
        }

        Some((tier, rest))
    }
}

/// Checks that a logical path can be used as a cache key.
///
/// Only canonical paths are accepted: relative, `/`-separated, no empty, `.`
/// or `..` segments and no backslashes. For such a path the reverse mapping
/// of any tier path gives back exactly the input, so two distinct keys never
/// share a cache file.
pub fn validate_logical_path(logical_path: &str) -> Result<(), CacheError> {
    let invalid = |reason: &str| -> Result<(), CacheError> {
        Err(CacheError::invalid_path(logical_path, reason))
    };

    if logical_path.is_empty() {
        return invalid("path is empty");
    }
    if logical_path.starts_with('/') {
        return invalid("path is absolute");
    }
    if logical_path.contains('\\') {
        return invalid("path contains '\\', use '/' as the separator");
    }

    for (index, segment) in logical_path.split('/').enumerate() {
        match segment {
            "" => return invalid("path has an empty segment"),
            "." => return invalid("path has a '.' segment"),
            ".." => return invalid("path leaves the cache through '..'"),
            _ if index == 0 && segment.ends_with(':') => {
                return invalid("path has a drive prefix");
            }
            _ => {}
        }
    }

    Ok(())
}

fn logical_segments(logical_path: &str) -> impl Iterator<Item = &str> {
    logical_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn paths() -> CachePaths {
        CachePaths::new("/storage", "report.docx").unwrap()
    }

    #[test]
    fn test_root_layout() {
        let paths = paths();
        assert_eq!(
            paths.root(),
            Path::new("/storage/ooxml-viewer/cache/report.docx")
        );
        assert_eq!(
            paths.normal("doc/document.xml"),
            PathBuf::from("/storage/ooxml-viewer/cache/report.docx/normal/doc/document.xml")
        );
        assert_eq!(
            paths.prev("doc/document.xml"),
            PathBuf::from("/storage/ooxml-viewer/cache/report.docx/prev/doc/document.xml")
        );
        assert_eq!(
            paths.compare("doc/document.xml"),
            PathBuf::from("/storage/ooxml-viewer/cache/report.docx/compare/doc/document.xml")
        );
    }

    #[test]
    fn test_document_name_uses_final_component() {
        let paths = CachePaths::new("/storage", "/home/user/docs/report.docx").unwrap();
        assert_eq!(
            paths.root(),
            Path::new("/storage/ooxml-viewer/cache/report.docx")
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::parent("..")]
    #[case::root("/")]
    fn test_invalid_document_name(#[case] document: &str) {
        let err = CachePaths::new("/storage", document).unwrap_err();
        assert!(matches!(err, CacheError::InvalidDocumentName(_)));
    }

    #[rstest]
    #[case::simple("doc/document.xml")]
    #[case::top_level("[Content_Types].xml")]
    #[case::nested("word/_rels/document.xml.rels")]
    #[case::mixed_case("Word/Media/Image1.PNG")]
    fn test_round_trip(#[case] logical: &str) {
        let paths = paths();
        for tier in Tier::ALL {
            let cache_path = paths.tier_path(tier, logical);
            assert_eq!(paths.logical_path(&cache_path), logical);
            assert_eq!(
                paths.classify(&cache_path),
                Some(CachedPath {
                    tier,
                    logical_path: logical.to_string(),
                })
            );
        }
    }

    #[test]
    fn test_logical_path_falls_back_to_input() {
        let paths = paths();
        assert_eq!(paths.logical_path("notincache"), "notincache");
        assert_eq!(
            paths.logical_path("/elsewhere/normal/doc/document.xml"),
            "/elsewhere/normal/doc/document.xml"
        );
    }

    #[rstest]
    #[case::normal("/storage/ooxml-viewer/cache/report.docx/normal/doc/document.xml", Some(Tier::Normal))]
    #[case::prev("/storage/ooxml-viewer/cache/report.docx/prev/doc/document.xml", Some(Tier::Prev))]
    #[case::compare("/storage/ooxml-viewer/cache/report.docx/compare/doc/document.xml", Some(Tier::Compare))]
    #[case::upper_case("/STORAGE/OOXML-VIEWER/CACHE/REPORT.DOCX/NORMAL/doc/document.xml", Some(Tier::Normal))]
    #[case::unknown_tier("/storage/ooxml-viewer/cache/report.docx/other/doc/document.xml", None)]
    #[case::other_document("/storage/ooxml-viewer/cache/other.docx/normal/doc/document.xml", None)]
    #[case::tier_root("/storage/ooxml-viewer/cache/report.docx/normal", None)]
    #[case::cache_root("/storage/ooxml-viewer/cache/report.docx", None)]
    #[case::escapes_tier("/storage/ooxml-viewer/cache/report.docx/normal/../prev/x.xml", None)]
    #[case::relative("not in cache", None)]
    fn test_classification(#[case] path: &str, #[case] expected: Option<Tier>) {
        let paths = paths();
        assert_eq!(paths.classify(path).map(|cached| cached.tier), expected);
        assert_eq!(paths.belongs(path), expected.is_some());
        assert_eq!(paths.is_normal(path), expected == Some(Tier::Normal));
    }

    #[test]
    fn test_classification_preserves_input_casing() {
        let paths = paths();
        let cached = paths
            .classify("/Storage/ooxml-viewer/cache/Report.docx/Prev/Word/Document.xml")
            .unwrap();
        assert_eq!(cached.tier, Tier::Prev);
        assert_eq!(cached.logical_path, "Word/Document.xml");
    }

    #[test]
    fn test_case_sensitive_comparison() {
        let paths = paths().with_case(PathCase::Sensitive);
        assert!(paths.belongs("/storage/ooxml-viewer/cache/report.docx/normal/a.xml"));
        assert!(!paths.belongs("/storage/ooxml-viewer/cache/report.docx/NORMAL/a.xml"));
        assert!(!paths.belongs("/Storage/ooxml-viewer/cache/report.docx/normal/a.xml"));
    }

    #[test]
    fn test_tier_of_includes_tier_root() {
        let paths = paths();
        assert_eq!(
            paths.tier_of("/storage/ooxml-viewer/cache/report.docx/compare"),
            Some(Tier::Compare)
        );
        assert_eq!(paths.tier_of("/storage/ooxml-viewer/cache/report.docx"), None);
    }

    #[test]
    fn test_same_path() {
        let paths = paths();
        assert!(paths.same_path("/A/b/C.xml", "/a/B/c.xml"));
        assert!(paths.same_path("/a//b/./c.xml", "/a/b/c.xml"));
        assert!(!paths.same_path("/a/b/c.xml", "/a/b/d.xml"));

        let sensitive = paths.with_case(PathCase::Sensitive);
        assert!(!sensitive.same_path("/A/b/C.xml", "/a/B/c.xml"));
    }

    #[test]
    fn test_classification_agrees_with_same_path() {
        let paths = paths();
        let upper = "/STORAGE/OOXML-VIEWER/CACHE/REPORT.DOCX/NORMAL/doc/document.xml";
        assert!(paths.same_path(upper, paths.normal("doc/document.xml")));
        assert!(paths.is_normal(upper));

        let sensitive = paths.with_case(PathCase::Sensitive);
        assert!(!sensitive.same_path(upper, sensitive.normal("doc/document.xml")));
        assert!(!sensitive.is_normal(upper));
    }

    #[test]
    fn test_logical_segments_are_normalized_when_mapping() {
        let paths = paths();
        assert_eq!(
            paths.normal("./doc//document.xml"),
            paths.normal("doc/document.xml")
        );
    }

    #[rstest]
    #[case::valid("doc/document.xml", true)]
    #[case::content_types("[Content_Types].xml", true)]
    #[case::empty("", false)]
    #[case::only_slashes("//", false)]
    #[case::absolute("/doc/document.xml", false)]
    #[case::backslash_absolute("\\doc\\document.xml", false)]
    #[case::drive("C:/doc/document.xml", false)]
    #[case::parent("doc/../../etc/passwd", false)]
    #[case::backslash("a\\b.xml", false)]
    #[case::current_dir("./doc.xml", false)]
    #[case::inner_current_dir("doc/./x.xml", false)]
    #[case::double_slash("doc//x.xml", false)]
    #[case::trailing_slash("doc/x.xml/", false)]
    fn test_validate_logical_path(#[case] logical: &str, #[case] valid: bool) {
        let result = validate_logical_path(logical);
        assert_eq!(result.is_ok(), valid, "unexpected result for {logical:?}");
        if let Err(err) = result {
            assert!(matches!(err, CacheError::InvalidPath { .. }));
        }
    }

    #[rstest]
    #[case("doc/document.xml")]
    #[case("[Content_Types].xml")]
    #[case("customXml/item1.xml")]
    #[case("word/media/image 1.png")]
    fn test_accepted_paths_round_trip(#[case] logical: &str) {
        let paths = paths();
        validate_logical_path(logical).unwrap();
        for tier in Tier::ALL {
            assert_eq!(paths.logical_path(paths.tier_path(tier, logical)), logical);
        }
    }

    #[rstest]
    #[case("normal", Tier::Normal)]
    #[case("PREV", Tier::Prev)]
    #[case("Compare", Tier::Compare)]
    fn test_tier_from_str(#[case] input: &str, #[case] expected: Tier) {
        assert_eq!(input.parse::<Tier>().unwrap(), expected);
    }

    #[test]
    fn test_tier_from_str_unknown() {
        assert!(matches!(
            "original".parse::<Tier>(),
            Err(CacheError::UnknownTier(_))
        ));
    }
}
