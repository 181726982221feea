use std::sync::Arc;

use super::geo_type::GeoType;

/// Stable key for a geography.
/// Keeps the GEOID text (with leading zeros) without repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeoId {
    ty: GeoType,
    id: Arc<str>, // e.g., "06075" for a county, "06075010100" for a tract
}

impl GeoId {
    /// Build a `GeoId`, restoring leading zeros lost when a numeric id column
    /// was parsed as an integer.
    pub fn new(ty: GeoType, id: &str) -> Self {
        let id = id.trim();
        let id: Arc<str> = if id.len() < ty.id_len() && id.bytes().all(|b| b.is_ascii_digit()) {
            Arc::from(format!("{:0>width$}", id, width = ty.id_len()))
        } else {
            Arc::from(id)
        };

        Self { ty, id }
    }

    #[inline] pub fn ty(&self) -> GeoType { self.ty }

    #[inline] pub fn id(&self) -> &str { &self.id }

    /// Returns the `GeoId` of the enclosing geography at `parent_ty`
    /// by truncating this id to the parent's prefix length in characters.
    pub fn to_parent(&self, parent_ty: GeoType) -> GeoId {
        // If the id is shorter than expected, just take the full id.
        let prefix = match self.id.char_indices().nth(parent_ty.id_len()) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        };
        GeoId { ty: parent_ty, id: Arc::from(prefix) }
    }

    /// True if this geography lies inside `parent` (or is `parent`).
    pub fn is_within(&self, parent: &GeoId) -> bool {
        self.to_parent(parent.ty) == *parent
    }
}

impl std::fmt::Display for GeoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.ty, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_numeric_ids() {
        assert_eq!(GeoId::new(GeoType::County, "6075").id(), "06075");
        assert_eq!(GeoId::new(GeoType::Tract, "6075010100").id(), "06075010100");
        assert_eq!(GeoId::new(GeoType::County, "06075").id(), "06075");
    }

    #[test]
    fn leaves_non_numeric_ids_alone() {
        assert_eq!(GeoId::new(GeoType::County, "abc").id(), "abc");
    }

    #[test]
    fn parent_prefix() {
        let tract = GeoId::new(GeoType::Tract, "06075010100");
        assert_eq!(tract.to_parent(GeoType::County), GeoId::new(GeoType::County, "06075"));
        assert_eq!(tract.to_parent(GeoType::State), GeoId::new(GeoType::State, "06"));
        assert!(tract.is_within(&GeoId::new(GeoType::County, "06075")));
        assert!(!tract.is_within(&GeoId::new(GeoType::County, "06001")));
    }

    #[test]
    fn parent_of_non_ascii_id_splits_on_characters() {
        let tract = GeoId::new(GeoType::Tract, "ñandú-0001");
        assert_eq!(tract.to_parent(GeoType::State).id(), "ña");
        assert_eq!(tract.to_parent(GeoType::County).id(), "ñandú");
        assert!(tract.is_within(&GeoId::new(GeoType::County, "ñandú")));

        let short = GeoId::new(GeoType::County, "é");
        assert_eq!(short.to_parent(GeoType::State).id(), "é");
    }
}
