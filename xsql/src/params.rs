// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Translation of caller arguments into native query parameters

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::value::Value;

static PARAM_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name pattern is valid")
});

/// Caller-side argument: optional name, 1-based ordinal, typed value
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub ordinal: usize,
    pub value: Value,
}

impl NamedValue {
    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ordinal: 0,
            value: value.into(),
        }
    }

    pub fn positional(ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: String::new(),
            ordinal,
            value: value.into(),
        }
    }
}

/// Native parameter set, keyed by `$`-prefixed name in argument order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    entries: Vec<(String, Value)>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    fn insert(&mut self, name: String, value: Value) -> Result<()> {
        if self.get(&name).is_some() {
            return Err(Error::InvalidParameter(format!(
                "duplicate parameter {}",
                name
            )));
        }
        self.entries.push((name, value));
        Ok(())
    }
}

/// Convert caller arguments into the native parameter mapping.
///
/// Names gain a leading `$` when missing. Unnamed arguments become
/// `$p{ordinal}`; an unnamed argument without an ordinal is rejected, as is
/// any name that is not an identifier.
pub fn to_query_params(args: &[NamedValue]) -> Result<QueryParameters> {
    let mut params = QueryParameters::new();
    for arg in args {
        let name = if arg.name.is_empty() {
            if arg.ordinal == 0 {
                return Err(Error::InvalidParameter(
                    "unnamed argument without ordinal".to_string(),
                ));
            }
            format!("$p{}", arg.ordinal)
        } else if arg.name.starts_with('$') {
            arg.name.clone()
        } else {
            format!("${}", arg.name)
        };
        if !PARAM_NAME_RE.is_match(&name) {
            return Err(Error::InvalidParameter(format!(
                "parameter name {:?} is not an identifier",
                name
            )));
        }
        params.insert(name, arg.value.clone())?;
    }
    Ok(params)
}
