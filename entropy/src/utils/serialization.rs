//! Serde helpers for fixed 32-byte values.
//!
//! Human-readable formats (JSON, TOML) carry the value as a lowercase hex
//! string; binary formats such as bincode carry the raw array. Use with
//! `#[serde(with = "crate::utils::serialization")]`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Serialize a 32-byte array.
pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(bytes))
    } else {
        bytes.serialize(serializer)
    }
}

/// Deserialize a 32-byte array.
pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
where
    D: Deserializer<'de>,
{
    if deserializer.is_human_readable() {
        let encoded = String::deserialize(deserializer)?;
        decode_hex32(&encoded).map_err(de::Error::custom)
    } else {
        <[u8; 32]>::deserialize(deserializer)
    }
}

/// Decode a hex string that must hold exactly 32 bytes.
pub fn decode_hex32(encoded: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(encoded.trim()).map_err(|e| format!("invalid hex: {}", e))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| format!("expected 32 bytes, got {}", bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        value: [u8; 32],
    }

    #[test]
    fn test_json_uses_hex() {
        let wrapper = Wrapper { value: [0xab; 32] };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(json, format!("{{\"value\":\"{}\"}}", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), wrapper);
    }

    #[test]
    fn test_bincode_uses_raw_bytes() {
        let wrapper = Wrapper { value: [7; 32] };
        let encoded = bincode::serialize(&wrapper).unwrap();
        assert_eq!(encoded.len(), 32);
        assert_eq!(bincode::deserialize::<Wrapper>(&encoded).unwrap(), wrapper);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert!(decode_hex32("abcd").is_err());
        assert!(decode_hex32(&"zz".repeat(32)).is_err());
        assert_eq!(decode_hex32(&"01".repeat(32)).unwrap(), [1; 32]);
    }
}
