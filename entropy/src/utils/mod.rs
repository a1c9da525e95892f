// Utilities Module
pub mod file;
pub mod serialization;

/// Declares a 32-byte identifier newtype.
///
/// Values render as lowercase hex through `Display`, `FromStr`, and
/// human-readable serde formats, and as raw bytes in binary formats.
macro_rules! bytes32_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name(#[serde(with = "crate::utils::serialization")] [u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Consume into the raw bytes.
            pub fn to_bytes(self) -> [u8; 32] {
                self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl From<::blake3::Hash> for $name {
            fn from(hash: ::blake3::Hash) -> Self {
                Self(*hash.as_bytes())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&::hex::encode(self.0))
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = crate::types::error::EntropyError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                crate::utils::serialization::decode_hex32(s)
                    .map(Self)
                    .map_err(crate::types::error::EntropyError::Serialization)
            }
        }
    };
}

pub(crate) use bytes32_type;
