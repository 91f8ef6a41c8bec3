//! Identity hashing: raw external identifiers to namespaced UUIDs.
//!
//! Both functions produce RFC 4122 version-3 (MD5, name-based) UUIDs under
//! the nil namespace, so results match any other v3 implementation byte for
//! byte. The alternate namespace hashes the MD5 digest of the raw identifier
//! instead of its bytes, which keeps it disjoint from the legacy namespace
//! for the same input string.

use md5::{Digest, Md5};
use uuid::Uuid;

/// Legacy UUID for a taxonomy / master-data identifier (e.g. a TME id).
///
/// Callers filter empty identifiers before hashing.
pub fn to_legacy_uuid(raw: &str) -> Uuid {
    Uuid::new_v3(&Uuid::nil(), raw.as_bytes())
}

/// Alternate UUID for a newer-pipeline identifier (e.g. a Factset id).
pub fn to_alternate_uuid(raw: &str) -> Uuid {
    let digest = Md5::digest(raw.as_bytes());
    Uuid::new_v3(&Uuid::nil(), digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values computed independently with Python's `uuid` module.

    #[test]
    fn legacy_uuid_golden_values() {
        assert_eq!(
            to_legacy_uuid("TNK-123").to_string(),
            "757236eb-6b57-311d-bf31-7a0d8723701d"
        );
        assert_eq!(
            to_legacy_uuid("000BJG-E").to_string(),
            "fc6ee108-c3c6-33b7-8fc6-825aa125bf3e"
        );
    }

    #[test]
    fn alternate_uuid_golden_values() {
        assert_eq!(
            to_alternate_uuid("TNK-123").to_string(),
            "dff0a002-1ec2-3b4a-af6a-ec2980489996"
        );
        assert_eq!(
            to_alternate_uuid("000BJG-E").to_string(),
            "0fae8d12-471e-375d-adc1-a1d4d7522520"
        );
    }

    #[test]
    fn hashing_is_deterministic() {
        let id = "NDZhYmRjOWYtMDhiYy00NmE3LWI4NWEtNjBlMWI2ZjI3MTYx-T04=";
        assert_eq!(to_legacy_uuid(id), to_legacy_uuid(id));
        assert_eq!(to_alternate_uuid(id), to_alternate_uuid(id));
    }

    #[test]
    fn namespaces_do_not_collide() {
        for id in ["TNK-123", "000BJG-E", "x"] {
            assert_ne!(to_legacy_uuid(id), to_alternate_uuid(id), "collision for {id}");
        }
    }

    #[test]
    fn version_three_rfc4122() {
        let u = to_alternate_uuid("000BJG-E");
        assert_eq!(u.get_version_num(), 3);
        assert_eq!(u.get_variant(), uuid::Variant::RFC4122);
    }
}
