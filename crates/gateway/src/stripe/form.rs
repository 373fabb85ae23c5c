//! Form bodies in the bracketed-key style the gateway API expects.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn optional(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Adds `metadata[key]=value` for every entry.
    pub fn metadata(mut self, metadata: &BTreeMap<String, String>) -> Self {
        for (key, value) in metadata {
            self.pairs
                .push((format!("metadata[{}]", key), value.clone()));
        }
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Search query matching objects tagged with `key = value`.
pub(crate) fn metadata_query(key: &str, value: &str) -> String {
    format!("metadata['{}']:'{}'", key, value.replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_keys_are_bracketed() {
        let mut metadata = BTreeMap::new();
        metadata.insert("order_number".to_string(), "ORD-100001".to_string());
        metadata.insert("mode".to_string(), "mixed".to_string());

        let form = Form::new()
            .field("amount", 2500)
            .optional("customer", None::<String>)
            .metadata(&metadata);

        assert_eq!(
            form.pairs(),
            &[
                ("amount".to_string(), "2500".to_string()),
                ("metadata[mode]".to_string(), "mixed".to_string()),
                ("metadata[order_number]".to_string(), "ORD-100001".to_string()),
            ]
        );
    }

    #[test]
    fn test_metadata_query_escapes_quotes() {
        assert_eq!(
            metadata_query("order_number", "ORD-100001"),
            "metadata['order_number']:'ORD-100001'"
        );
        assert_eq!(metadata_query("k", "o'brien"), "metadata['k']:'o\\'brien'");
    }
}
