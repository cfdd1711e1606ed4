//! The top-level structure of a YARRRML document.
//!
//! This module only reads the document-wide sections
//! (`prefixes`, `base`, `sources`) and splits `mappings` into named entries;
//! each mapping is normalized later by [`crate::model`].

use crate::error::{ConvertError, Result};
use crate::logger::Logger;
use crate::prefix::PrefixMap;
use crate::source::Source;
use yaml_rust::yaml::Hash;
use yaml_rust::{Yaml, YamlLoader};

/// Keys under which mappings can be declared.
pub const MAPPINGS_KEYS: &[&str] = &["mappings", "mapping", "m"];

/// A YARRRML document, whose mappings are not normalized yet.
#[derive(Clone, Debug)]
pub struct Document {
    /// Default prefixes, overridden by the `prefixes` section
    pub prefixes: PrefixMap,
    /// The `base` section, if any
    pub base: Option<String>,
    /// Named sources declared in the `sources` section
    pub sources: Vec<Source>,
    /// Mappings, in document order
    pub mappings: Vec<RawMapping>,
}

/// A named mapping, as found in the document.
#[derive(Clone, Debug)]
pub struct RawMapping {
    /// The key of the mapping
    pub name: String,
    /// The YAML value associated to the key
    pub body: Yaml,
}

impl Document {
    /// Read the document-wide sections of `text`.
    ///
    /// Recoverable problems (unknown keys, invalid named sources...)
    /// are recorded in `logger`;
    /// an `Err` means that nothing can be converted.
    pub fn parse(text: &str, logger: &mut Logger) -> Result<Self> {
        let docs = YamlLoader::load_from_str(text)?;
        if docs.len() > 1 {
            logger.warn(format!(
                "input contains {} YAML documents, only the first one is used",
                docs.len()
            ));
        }
        let root = match docs.into_iter().next() {
            None | Some(Yaml::Null) => return Err(ConvertError::EmptyDocument),
            Some(Yaml::Hash(root)) => root,
            Some(_) => return Err(ConvertError::RootNotMapping),
        };

        let mut prefixes = PrefixMap::new();
        let mut base = None;
        let mut sources = vec![];
        let mut mappings = None;
        for (key, value) in &root {
            let Some(key) = scalar(key) else {
                logger.warn(format!("ignoring non-scalar key {key:?}"));
                continue;
            };
            match key.as_str() {
                "prefixes" => read_prefixes(value, &mut prefixes, logger),
                "base" => {
                    let iri = scalar(value)
                        .ok_or_else(|| ConvertError::invalid("base", "expected an IRI"))?;
                    base = Some(iri);
                }
                "sources" => sources = read_sources(value, logger),
                k if MAPPINGS_KEYS.contains(&k) => mappings = Some(read_mappings(value, logger)?),
                "authors" | "targets" | "functions" => {
                    logger.warn(format!("section '{key}' is not supported and was ignored"))
                }
                _ => logger.warn(format!("unknown section '{key}' was ignored")),
            }
        }
        let mappings = match mappings {
            Some(m) if !m.is_empty() => m,
            _ => return Err(ConvertError::NoMappings),
        };
        Ok(Document {
            prefixes,
            base,
            sources,
            mappings,
        })
    }

    /// The names of all mappings, in document order.
    pub fn mapping_names(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|m| m.name.as_str())
    }
}

fn read_prefixes(yaml: &Yaml, prefixes: &mut PrefixMap, logger: &mut Logger) {
    let Yaml::Hash(hash) = yaml else {
        logger.error("'prefixes' must be a mapping from prefixes to namespaces");
        return;
    };
    for (prefix, ns) in hash {
        match (scalar(prefix), scalar(ns)) {
            (Some(prefix), Some(ns)) => prefixes.insert(prefix, ns),
            _ => logger.error(format!("invalid prefix declaration {prefix:?}: {ns:?}")),
        }
    }
}

fn read_sources(yaml: &Yaml, logger: &mut Logger) -> Vec<Source> {
    let Yaml::Hash(hash) = yaml else {
        logger.error("'sources' must be a mapping from names to sources");
        return vec![];
    };
    let mut sources = vec![];
    for (name, def) in hash {
        let Some(name) = scalar(name) else {
            logger.error(format!("invalid source name {name:?}"));
            continue;
        };
        match Source::from_yaml(Some(&name), def, logger) {
            Ok(source) => sources.push(source),
            Err(err) => logger.error(format!("source '{name}': {err}")),
        }
    }
    sources
}

fn read_mappings(yaml: &Yaml, logger: &mut Logger) -> Result<Vec<RawMapping>> {
    let Yaml::Hash(hash) = yaml else {
        return Err(ConvertError::invalid(
            "mappings",
            "expected a mapping from names to mappings",
        ));
    };
    let mut mappings = vec![];
    for (name, body) in hash {
        match scalar(name) {
            Some(name) => mappings.push(RawMapping {
                name,
                body: body.clone(),
            }),
            None => logger.error(format!("invalid mapping name {name:?}")),
        }
    }
    Ok(mappings)
}

/// Render a YAML scalar as a string.
///
/// Numbers and booleans are accepted where YARRRML expects text.
pub(crate) fn scalar(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The value of the first of `keys` present in `hash`.
pub(crate) fn get<'a>(hash: &'a Hash, keys: &[&str]) -> Option<&'a Yaml> {
    keys.iter()
        .find_map(|k| hash.get(&Yaml::String(k.to_string())))
}

/// View a value as a list: arrays are returned as is,
/// null values as an empty list, any other value as a singleton.
pub(crate) fn list(yaml: &Yaml) -> Vec<&Yaml> {
    match yaml {
        Yaml::Array(items) => items.iter().collect(),
        Yaml::Null | Yaml::BadValue => vec![],
        other => vec![other],
    }
}

/// Warn about the keys of `hash` that are not in `known`.
pub(crate) fn check_keys(hash: &Hash, known: &[&str], context: &str, logger: &mut Logger) {
    for key in hash.keys() {
        match scalar(key) {
            Some(k) if known.contains(&k.as_str()) => {}
            Some(k) => logger.warn(format!("{context}: unknown key '{k}' was ignored")),
            None => logger.warn(format!("{context}: non-scalar key {key:?} was ignored")),
        }
    }
}
