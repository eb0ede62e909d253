//! # Domain Entities

use super::errors::SideEffectError;
use bytes::Bytes;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sha2::{Digest, Sha256};
use shared_types::ScriptHash;
use std::fmt;
use std::str::FromStr;

macro_rules! digest_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay,
            DeserializeFromStr,
        )]
        pub struct $name([u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl FromStr for $name {
            type Err = SideEffectError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s, &mut bytes)
                    .map_err(|e| SideEffectError::InvalidAddress(format!("{s}: {e}")))?;
                Ok(Self(bytes))
            }
        }
    };
}

digest_id!(
    /// Container the relay stores artifacts in.
    ContainerId
);

digest_id!(
    /// Object within a container; derived from the payload.
    ObjectId
);

impl ObjectId {
    /// Content address of `payload`.
    pub fn for_payload(payload: &[u8]) -> Self {
        Self(Sha256::digest(payload).into())
    }
}

/// Address of a stored object, written as `<container>/<object>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, SerializeDisplay, DeserializeFromStr)]
pub struct StoredArtifact {
    /// Container holding the object.
    pub container: ContainerId,
    /// The object.
    pub object: ObjectId,
}

impl fmt::Display for StoredArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.object)
    }
}

impl FromStr for StoredArtifact {
    type Err = SideEffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (container, object) = s
            .split_once('/')
            .ok_or_else(|| SideEffectError::InvalidAddress(s.to_string()))?;
        Ok(Self {
            container: container.parse()?,
            object: object.parse()?,
        })
    }
}

/// Metadata stored alongside an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Target container.
    pub container: ContainerId,
    /// Account that owns the object.
    pub owner: ScriptHash,
    /// Free-form key/value attributes.
    pub attributes: Vec<(String, String)>,
}

impl ObjectHeader {
    /// Attribute naming the item an object was stored for.
    pub const FILE_NAME: &'static str = "FileName";

    /// Header for an item's artifact.
    pub fn for_item(container: ContainerId, owner: ScriptHash, item_name: &str) -> Self {
        Self {
            container,
            owner,
            attributes: vec![(Self::FILE_NAME.to_string(), item_name.to_string())],
        }
    }

    /// Value of attribute `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Bytes fetched for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// Where they came from.
    pub url: String,
    /// `Content-Type` reported by the origin.
    pub content_type: Option<String>,
    /// Body.
    pub payload: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_address_form() {
        let artifact = StoredArtifact {
            container: ContainerId::new([0xAB; 32]),
            object: ObjectId::for_payload(b"nyan"),
        };
        let text = artifact.to_string();
        assert_eq!(text.split('/').count(), 2);
        assert!(text.starts_with(&"ab".repeat(32)));
        assert_eq!(text.parse::<StoredArtifact>().unwrap(), artifact);
    }

    #[test]
    fn test_bad_address() {
        assert!("no-slash".parse::<StoredArtifact>().is_err());
        assert!("zz/zz".parse::<StoredArtifact>().is_err());
    }

    #[test]
    fn test_object_id_is_content_derived() {
        assert_eq!(ObjectId::for_payload(b"a"), ObjectId::for_payload(b"a"));
        assert_ne!(ObjectId::for_payload(b"a"), ObjectId::for_payload(b"b"));
    }

    #[test]
    fn test_header_file_name() {
        let header = ObjectHeader::for_item(ContainerId::default(), ScriptHash::default(), "nyancat.gif");
        assert_eq!(header.attribute(ObjectHeader::FILE_NAME), Some("nyancat.gif"));
        assert_eq!(header.attribute("Missing"), None);
    }
}
