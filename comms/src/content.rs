use serde_json::Value;

/// Loosely typed event content, keyed by field name
pub type Content = serde_json::Map<String, Value>;

pub const ROOM_MEMBER: &str = "m.room.member";
pub const ROOM_NAME: &str = "m.room.name";
pub const ROOM_CANONICAL_ALIAS: &str = "m.room.canonical_alias";
pub const ROOM_ALIAS: &str = "m.room.alias";
pub const ROOM_ALIASES: &str = "m.room.aliases";
pub const ROOM_TOPIC: &str = "m.room.topic";

/// Returns the string stored under `key`, or `None` when the field is missing or not a string
pub fn string_field<'a>(content: &'a Content, key: &str) -> Option<&'a str> {
    content.get(key).and_then(Value::as_str)
}

/// Same as [string_field] but also treats an empty string as missing
pub fn non_empty_string_field<'a>(content: &'a Content, key: &str) -> Option<&'a str> {
    string_field(content, key).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn content_of(value: Value) -> Content {
        match value {
            Value::Object(map) => map,
            _ => panic!("test content must be an object"),
        }
    }

    #[test]
    fn test_string_field_reads_strings() {
        let content = content_of(json!({ "name": "Rust" }));

        assert_eq!(string_field(&content, "name"), Some("Rust"));
    }

    #[test]
    fn test_string_field_treats_other_types_as_missing() {
        let content = content_of(json!({ "name": 42, "topic": null }));

        assert_eq!(string_field(&content, "name"), None);
        assert_eq!(string_field(&content, "topic"), None);
        assert_eq!(string_field(&content, "missing"), None);
    }

    #[test]
    fn test_non_empty_string_field_skips_empty_strings() {
        let content = content_of(json!({ "alias": "" }));

        assert_eq!(string_field(&content, "alias"), Some(""));
        assert_eq!(non_empty_string_field(&content, "alias"), None);
    }
}
