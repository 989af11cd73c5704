//! JSON body encoding.

use crate::error::ProtocolResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a value as a JSON body.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> ProtocolResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decodes a JSON body.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> ProtocolResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use gardonyi_model::Page;

    #[test]
    fn decode_rejects_garbage() {
        let result: ProtocolResult<Page> = decode_json(b"not json");
        assert!(matches!(result, Err(ProtocolError::Json(_))));
    }

    #[test]
    fn decode_list() {
        let pages: Vec<Page> =
            decode_json(br#"[{"id":1,"title":"a","content":null},{"id":2}]"#).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].title, None);
    }
}
