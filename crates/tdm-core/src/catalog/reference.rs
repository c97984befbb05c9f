//! Collection references: `playlist:<id>`, `album:<id>`, or a catalog URL.

use url::Url;

use super::{CatalogError, CollectionKind};

/// A parsed reference to one playlist or album.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub kind: CollectionKind,
    pub id: String,
}

fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl CollectionRef {
    pub fn new(kind: CollectionKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Parses a user-supplied reference.
    ///
    /// - `playlist:37i9dQZF1DXcBWIGoYBM5M`, `album:4m2880jivSbbyEGAKfITCa`
    /// - URIs with a scheme prefix, e.g. `spotify:album:4m2880jivSbbyEGAKfITCa`
    /// - `https://open.example.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc`
    ///   (last path segment is the id, the one before it the kind)
    pub fn parse(input: &str) -> Result<Self, CatalogError> {
        let input = input.trim();
        let invalid = || CatalogError::InvalidReference(input.to_string());

        if input.starts_with("http://") || input.starts_with("https://") {
            let url = Url::parse(input).map_err(|_| invalid())?;
            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();
            let [.., kind, id] = segments.as_slice() else {
                return Err(invalid());
            };
            let kind = CollectionKind::from_str(kind).ok_or_else(invalid)?;
            if !valid_id(id) {
                return Err(invalid());
            }
            return Ok(Self::new(kind, *id));
        }

        let parts: Vec<&str> = input.split(':').collect();
        let [.., kind, id] = parts.as_slice() else {
            return Err(invalid());
        };
        let kind = CollectionKind::from_str(kind).ok_or_else(invalid)?;
        if !valid_id(id) {
            return Err(invalid());
        }
        Ok(Self::new(kind, *id))
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_prefixed_ids() {
        assert_eq!(
            CollectionRef::parse("playlist:37i9dQZF1DXcBWIGoYBM5M").unwrap(),
            CollectionRef::new(CollectionKind::Playlist, "37i9dQZF1DXcBWIGoYBM5M")
        );
        assert_eq!(
            CollectionRef::parse("spotify:album:4m2880jivSbbyEGAKfITCa").unwrap(),
            CollectionRef::new(CollectionKind::Album, "4m2880jivSbbyEGAKfITCa")
        );
    }

    #[test]
    fn parses_catalog_urls_and_drops_query() {
        assert_eq!(
            CollectionRef::parse("https://open.example.com/playlist/abc123?si=xyz").unwrap(),
            CollectionRef::new(CollectionKind::Playlist, "abc123")
        );
        assert_eq!(
            CollectionRef::parse("https://open.example.com/intl-pt/album/Zz9_-/").unwrap(),
            CollectionRef::new(CollectionKind::Album, "Zz9_-")
        );
    }

    #[test]
    fn rejects_unknown_kinds_and_bad_ids() {
        for bad in [
            "",
            "abc123",
            "track:abc",
            "playlist:",
            "playlist:../../etc/passwd",
            "https://open.example.com/",
            "https://open.example.com/artist/abc",
        ] {
            assert!(
                matches!(CollectionRef::parse(bad), Err(CatalogError::InvalidReference(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_roundtrips() {
        let r = CollectionRef::new(CollectionKind::Album, "xyz");
        assert_eq!(CollectionRef::parse(&r.to_string()).unwrap(), r);
    }
}
