//! Struct tag parsing.
//!
//! Tag grammar: `name,opt,key:value,...`. The first segment is the external
//! name; the rest are options. Option keys are trimmed and lower-cased, values
//! are trimmed. Malformed input never fails; it degrades to an empty name and
//! whatever options could be read.

use std::collections::BTreeMap;

/// External name `-` excludes a field from mapping.
pub const SKIP_NAME: &str = "-";

/// Parsed struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTag {
    name: String,
    opts: BTreeMap<String, String>,
}

impl StructTag {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',');
        let name = parts.next().unwrap_or_default().trim().to_string();
        let mut opts = BTreeMap::new();

        for opt in parts {
            let opt = opt.trim();
            if opt.is_empty() {
                continue;
            }
            match opt.split_once(':') {
                Some((k, v)) => {
                    opts.insert(k.trim().to_lowercase(), v.trim().to_string());
                }
                None => {
                    opts.insert(opt.to_lowercase(), String::new());
                }
            }
        }

        Self { name, opts }
    }

    /// External name, empty when the tag does not set one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_skip(&self) -> bool {
        self.name == SKIP_NAME
    }

    /// Option value, empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.opts.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.opts.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.opts.contains_key(key)
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.opts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
