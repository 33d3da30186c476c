//! Recovery of message boundaries from the simulator's inbound stream.
//!
//! The simulator may write several JSON objects back-to-back with no
//! delimiter (`{...}{...}`). [`recover`] repairs such a chunk by inserting a
//! comma at every `}{` boundary and wrapping the result in `[` `]` before
//! parsing.
//!
//! This is best-effort framing recovery, not a stream parser. It assumes no
//! object contains the literal substring `}{` inside a string value, and that
//! each received chunk ends on a complete object boundary. A chunk that fails
//! to parse is discarded whole; nothing is buffered across calls.

use serde_json::Value;

use crate::gsp::protocol::SimulatorMessage;

/// Split a raw chunk into its constituent JSON objects.
///
/// Returns every object in arrival order, or the parse error for the whole
/// chunk (in which case zero objects are recovered).
pub fn recover(chunk: &str) -> Result<Vec<Value>, serde_json::Error> {
    let list = format!("[{}]", chunk.replace("}{", "},{"));
    serde_json::from_str(&list)
}

/// Decode a chunk into simulator messages, dropping objects that don't match
/// the expected shape.
pub fn decode(chunk: &str) -> Result<Vec<SimulatorMessage>, serde_json::Error> {
    let values = recover(chunk)?;
    Ok(values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_concatenated_objects() {
        let values = recover(r#"{"a":1}{"b":2}"#).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["a"], 1);
        assert_eq!(values[1]["b"], 2);
    }

    #[test]
    fn single_object() {
        let values = recover(r#"{"a":1}"#).unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn three_objects_no_delimiters() {
        let values = recover(r#"{"a":1}{"b":2}{"c":3}"#).unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn unbalanced_braces_is_an_error() {
        assert!(recover(r#"{"a":1}{"b":"#).is_err());
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        assert!(recover("").unwrap().is_empty());
    }

    #[test]
    fn decode_extracts_club_selection() {
        let msgs = decode(
            r#"{"Code":200,"Message":"ack"}{"Code":201,"Player":{"Handed":"RH","Club":4}}"#,
        )
        .unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].club(), None);
        assert_eq!(msgs[1].club(), Some(4));
    }

    #[test]
    fn decode_tolerates_unexpected_fields() {
        let msgs = decode(r#"{"Weather":"windy","Hole":9}"#).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].club(), None);
    }
}
