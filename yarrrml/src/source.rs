//! Data sources of YARRRML mappings.
//!
//! A source is written either in short form
//! (`['data/persons.json~jsonpath', '$.persons[*]']`)
//! or in long form (a mapping with `access`, `referenceFormulation`, `iterator`...).
//! Mappings may also refer to sources declared in the document-wide `sources` section.

use crate::document::{check_keys, get, scalar};
use crate::error::{ConvertError, Result};
use crate::logger::Logger;
use crate::vocab::ql;
use sophia_api::ns::NsTerm;
use yaml_rust::Yaml;

const LONG_FORM_KEYS: &[&str] = &[
    "access",
    "referenceFormulation",
    "iterator",
    "delimiter",
    "encoding",
    "query",
];

/// How references to the data are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceFormulation {
    /// JSON documents, queried with JSONPath
    JsonPath,
    /// CSV files, where references are column names
    Csv,
    /// XML documents, queried with XPath
    XPath,
}

impl ReferenceFormulation {
    /// Recognize a formulation, either by its YARRRML name (`jsonpath`)
    /// or by its RML name (`ql:JSONPath` or the full IRI).
    pub fn from_name(name: &str) -> Option<Self> {
        let local = name
            .strip_prefix(ql::PREFIX.as_str())
            .or_else(|| name.strip_prefix("ql:"))
            .unwrap_or(name);
        match local.to_ascii_lowercase().as_str() {
            "jsonpath" => Some(Self::JsonPath),
            "csv" => Some(Self::Csv),
            "xpath" => Some(Self::XPath),
            _ => None,
        }
    }

    /// Guess the formulation from the extension of `access`.
    pub fn guess(access: &str) -> Option<Self> {
        let path = access.split(['?', '#']).next().unwrap_or(access);
        let (_, ext) = path.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::JsonPath),
            "csv" => Some(Self::Csv),
            "xml" => Some(Self::XPath),
            _ => None,
        }
    }

    /// Whether sources with this formulation need an iterator.
    pub fn requires_iterator(self) -> bool {
        !matches!(self, Self::Csv)
    }

    /// The RML term for this formulation.
    pub fn term(self) -> NsTerm<'static> {
        match self {
            Self::JsonPath => ql::JSONPath,
            Self::Csv => ql::CSV,
            Self::XPath => ql::XPath,
        }
    }
}

/// A logical source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    /// The name of the source, if it was declared in the `sources` section
    pub name: Option<String>,
    /// Location of the data (path or URL)
    pub access: String,
    /// How references are interpreted
    pub formulation: ReferenceFormulation,
    /// Expression selecting the iterated records
    pub iterator: Option<String>,
    /// Field delimiter (CSV only)
    pub delimiter: Option<String>,
    /// Character encoding
    pub encoding: Option<String>,
}

impl Source {
    /// Read a source definition, in short or long form.
    pub fn from_yaml(name: Option<&str>, yaml: &Yaml, logger: &mut Logger) -> Result<Self> {
        let source = match yaml {
            Yaml::Array(items) => {
                let (access, iterator) = match &items[..] {
                    [access] => (access, None),
                    [access, iterator] => (access, Some(iterator)),
                    _ => {
                        return Err(ConvertError::invalid(
                            "source",
                            "short form must be [access~formulation, iterator]",
                        ))
                    }
                };
                let access = scalar(access)
                    .ok_or_else(|| ConvertError::invalid("source", "access must be a string"))?;
                let (access, formulation) = split_access(&access)?;
                let iterator = match iterator {
                    None => None,
                    Some(it) => Some(scalar(it).ok_or_else(|| {
                        ConvertError::invalid("iterator", "expected a string")
                    })?),
                };
                Source {
                    name: name.map(str::to_string),
                    access,
                    formulation,
                    iterator,
                    delimiter: None,
                    encoding: None,
                }
            }
            Yaml::Hash(hash) => {
                check_keys(hash, LONG_FORM_KEYS, "source", logger);
                let access = get(hash, &["access"])
                    .and_then(scalar)
                    .ok_or_else(|| ConvertError::invalid("access", "expected a string"))?;
                let (access, formulation) = match get(hash, &["referenceFormulation"]) {
                    Some(f) => {
                        let f = scalar(f).unwrap_or_default();
                        let formulation = ReferenceFormulation::from_name(&f)
                            .ok_or(ConvertError::UnknownFormulation(f))?;
                        (access, formulation)
                    }
                    None => split_access(&access)?,
                };
                if get(hash, &["query"]).is_some() {
                    logger.warn("source: 'query' is not supported and was ignored");
                }
                Source {
                    name: name.map(str::to_string),
                    access,
                    formulation,
                    iterator: get(hash, &["iterator"]).and_then(scalar),
                    delimiter: get(hash, &["delimiter"]).and_then(scalar),
                    encoding: get(hash, &["encoding"]).and_then(scalar),
                }
            }
            _ => {
                return Err(ConvertError::invalid(
                    "source",
                    "expected a list or a mapping",
                ))
            }
        };
        if source.formulation.requires_iterator() && source.iterator.is_none() {
            logger.warn(format!(
                "source '{}' has no iterator, the whole document is one record",
                source.access
            ));
        }
        Ok(source)
    }

    /// Read the `sources` of a mapping,
    /// looking up named sources in `declared`.
    pub fn list_from_yaml(
        yaml: &Yaml,
        declared: &[Source],
        logger: &mut Logger,
    ) -> Result<Vec<Self>> {
        let entries: Vec<&Yaml> = match yaml {
            // a single source in short form, e.g. ['a.csv~csv']
            Yaml::Array(items) if is_short_form(items, declared) => vec![yaml],
            Yaml::Array(items) => items.iter().collect(),
            Yaml::Null | Yaml::BadValue => vec![],
            other => vec![other],
        };
        entries
            .into_iter()
            .map(|entry| match entry {
                Yaml::String(text) => match declared
                    .iter()
                    .find(|s| s.name.as_deref() == Some(text.as_str()))
                {
                    Some(source) => Ok(source.clone()),
                    None if looks_like_access(text) => {
                        Source::from_yaml(None, &Yaml::Array(vec![entry.clone()]), logger)
                    }
                    None => Err(ConvertError::UnknownSource(text.clone())),
                },
                other => Source::from_yaml(None, other, logger),
            })
            .collect()
    }
}

/// Whether `items` is one source in short form, `[access]` or `[access, iterator]`.
///
/// A second item that is itself a source (declared, or an access)
/// makes `items` a list of two sources.
fn is_short_form(items: &[Yaml], declared: &[Source]) -> bool {
    let is_declared = |name: &str| declared.iter().any(|s| s.name.as_deref() == Some(name));
    match items {
        [Yaml::String(access)] => !is_declared(access.as_str()) && looks_like_access(access),
        [Yaml::String(access), Yaml::String(iterator)] => {
            !is_declared(access.as_str())
                && looks_like_access(access)
                && !is_declared(iterator.as_str())
                && !looks_like_access(iterator)
        }
        _ => false,
    }
}

/// Whether `text` has a `~formulation` suffix or a known extension.
fn looks_like_access(text: &str) -> bool {
    match text.rsplit_once('~') {
        Some((_, suffix)) if !suffix.contains('/') => true,
        _ => ReferenceFormulation::guess(text).is_some(),
    }
}

/// Split `access~formulation`, guessing the formulation when there is no suffix.
fn split_access(text: &str) -> Result<(String, ReferenceFormulation)> {
    if let Some((access, suffix)) = text.rsplit_once('~') {
        if !suffix.contains('/') {
            let formulation = ReferenceFormulation::from_name(suffix)
                .ok_or_else(|| ConvertError::UnknownFormulation(suffix.to_string()))?;
            return Ok((access.to_string(), formulation));
        }
    }
    let formulation = ReferenceFormulation::guess(text)
        .ok_or_else(|| ConvertError::UnguessableFormulation(text.to_string()))?;
    Ok((text.to_string(), formulation))
}
