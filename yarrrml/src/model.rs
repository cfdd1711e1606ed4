//! Normalized YARRRML mappings.
//!
//! YARRRML offers many shortcuts for the same construct
//! (`s`/`subject`/`subjects`, `[p, o]` vs. long form, `~iri` suffixes...).
//! This module reduces a YAML mapping to a single, explicit representation,
//! close to the RML rules that will eventually be generated.

use crate::document::{check_keys, get, list, scalar};
use crate::error::{ConvertError, Result};
use crate::logger::Logger;
use crate::prefix::{PrefixMap, RDF_TYPE};
use crate::source::Source;
use crate::template::Template;
use crate::vocab::rr;
use oxiri::Iri;
use sophia_api::ns::NsTerm;
use std::borrow::Cow;
use yaml_rust::yaml::Hash;
use yaml_rust::Yaml;

const MAPPING_KEYS: &[&str] = &[
    "sources",
    "source",
    "subjects",
    "subject",
    "s",
    "predicateobjects",
    "predicateobject",
    "po",
    "graphs",
    "graph",
    "g",
];
const SOURCES_KEYS: &[&str] = &["sources", "source"];
const SUBJECTS_KEYS: &[&str] = &["subjects", "subject", "s"];
const PO_KEYS: &[&str] = &["predicateobjects", "predicateobject", "po"];
const GRAPHS_KEYS: &[&str] = &["graphs", "graph", "g"];
const PREDICATES_KEYS: &[&str] = &["predicates", "predicate", "p"];
const OBJECTS_KEYS: &[&str] = &["objects", "object", "o"];
const FUNCTION_KEYS: &[&str] = &["function", "fn", "f"];
const PARAMETERS_KEYS: &[&str] = &["parameters", "pms"];
const JOIN_STR1: &[&str] = &["str1", "idlab-fn:str1", "http://example.com/idlab/function/str1"];
const JOIN_STR2: &[&str] = &["str2", "idlab-fn:str2", "http://example.com/idlab/function/str2"];
const JOIN_EQUAL: &[&str] = &[
    "equal",
    "idlab-fn:equal",
    "http://example.com/idlab/function/equal",
];

/// The kind of RDF term produced by a [`TermMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermType {
    /// IRIs
    Iri,
    /// Blank nodes
    BlankNode,
    /// Literals
    Literal,
}

impl TermType {
    /// The R2RML term for this term type.
    pub fn term(self) -> NsTerm<'static> {
        match self {
            TermType::Iri => rr::IRI,
            TermType::BlankNode => rr::BlankNode,
            TermType::Literal => rr::Literal,
        }
    }
}

/// How the lexical value of a term is obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Always the same value (IRIs are absolute)
    Constant(String),
    /// The value of a single reference in the data
    Reference(String),
    /// An R2RML template (`http://ex.org/{id}`)
    Template(String),
}

/// Describes how to produce one term of the generated triples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermMap {
    /// The value; `None` only for blank nodes
    pub value: Option<Value>,
    /// The kind of term
    pub term_type: TermType,
    /// The datatype of literals
    pub datatype: Option<Value>,
    /// The language tag of literals
    pub language: Option<Value>,
}

impl TermMap {
    /// A term map with no datatype nor language.
    pub fn new(value: Value, term_type: TermType) -> Self {
        TermMap {
            value: Some(value),
            term_type,
            datatype: None,
            language: None,
        }
    }

    /// A term map generating a fresh blank node for each record.
    pub fn blank_node() -> Self {
        TermMap {
            value: None,
            term_type: TermType::BlankNode,
            datatype: None,
            language: None,
        }
    }

    /// Whether this term map always produces the given IRI.
    pub fn is_constant_iri(&self, iri: &str) -> bool {
        self.term_type == TermType::Iri
            && matches!(&self.value, Some(Value::Constant(c)) if c == iri)
    }
}

/// An equality condition between a reference of the child mapping
/// and a reference of the parent mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    /// Reference in the mapping containing the join
    pub child: String,
    /// Reference in the referred mapping
    pub parent: String,
}

/// A parameter passed to a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    /// IRI of the parameter
    pub parameter: String,
    /// Value of the parameter
    pub value: TermMap,
}

/// Describes how to produce the objects of the generated triples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectMap {
    /// Objects are computed from the current record
    Term(TermMap),
    /// Objects are the subjects of another mapping
    Join {
        /// Name of the referred mapping
        mapping: String,
        /// Conditions (all of them must hold)
        conditions: Vec<Join>,
    },
    /// Objects are the result of a function
    Function {
        /// IRI of the function
        function: String,
        /// Parameters of the function
        parameters: Vec<Parameter>,
        /// Term type, datatype and language of the result
        output: TermMap,
    },
}

/// A group of predicates and objects, combined pairwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredicateObjectMap {
    /// Predicates
    pub predicates: Vec<TermMap>,
    /// Objects
    pub objects: Vec<ObjectMap>,
    /// Graphs where the triples are generated, in addition to those of the mapping
    pub graphs: Vec<TermMap>,
}

/// A normalized mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    /// The name of the mapping in the document
    pub name: String,
    /// Sources (at least one)
    pub sources: Vec<Source>,
    /// Subjects (at least one)
    pub subjects: Vec<TermMap>,
    /// Predicate-object maps
    pub predicate_objects: Vec<PredicateObjectMap>,
    /// Graphs where all triples of this mapping are generated
    pub graphs: Vec<TermMap>,
}

/// Document-wide information needed to normalize mappings.
pub struct Context<'a> {
    prefixes: &'a PrefixMap,
    sources: &'a [Source],
    mappings: Vec<&'a str>,
    base: Option<Iri<String>>,
}

impl<'a> Context<'a> {
    /// Build a context.
    ///
    /// `base` is used to resolve relative constant IRIs;
    /// if it is `None` or invalid, those IRIs are errors.
    pub fn new<I>(
        prefixes: &'a PrefixMap,
        sources: &'a [Source],
        mappings: I,
        base: Option<&str>,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Context {
            prefixes,
            sources,
            mappings: mappings.into_iter().collect(),
            base: base.and_then(|b| Iri::parse(b.to_string()).ok()),
        }
    }

    /// Normalize a mapping.
    ///
    /// Invalid predicate-object entries are reported to `logger` and skipped;
    /// an `Err` means that the mapping as a whole can not be converted.
    pub fn mapping(&self, name: &str, yaml: &Yaml, logger: &mut Logger) -> Result<Mapping> {
        let Yaml::Hash(hash) = yaml else {
            return Err(ConvertError::invalid(name, "a mapping must be a YAML mapping"));
        };
        check_keys(hash, MAPPING_KEYS, &format!("mapping '{name}'"), logger);

        let sources = match get(hash, SOURCES_KEYS) {
            Some(yaml) => Source::list_from_yaml(yaml, self.sources, logger)?,
            None => vec![],
        };
        if sources.is_empty() {
            return Err(ConvertError::MissingSources(name.to_string()));
        }

        let mut subjects = match get(hash, SUBJECTS_KEYS) {
            Some(yaml) => list(yaml)
                .into_iter()
                .map(|s| self.subject(s))
                .collect::<Result<Vec<_>>>()?,
            None => vec![],
        };
        if subjects.is_empty() {
            subjects.push(TermMap::blank_node());
        }

        let graphs = match get(hash, GRAPHS_KEYS) {
            Some(yaml) => self.graphs(yaml)?,
            None => vec![],
        };

        let mut predicate_objects = vec![];
        if let Some(yaml) = get(hash, PO_KEYS) {
            for (i, po) in list(yaml).into_iter().enumerate() {
                match self.predicate_object(po, logger) {
                    Ok(po) => predicate_objects.push(po),
                    Err(err) => logger.error(format!(
                        "mapping '{name}', predicateobject #{}: {err}",
                        i + 1
                    )),
                }
            }
        }

        Ok(Mapping {
            name: name.to_string(),
            sources,
            subjects,
            predicate_objects,
            graphs,
        })
    }

    fn subject(&self, yaml: &Yaml) -> Result<TermMap> {
        let text = scalar(yaml)
            .ok_or_else(|| ConvertError::invalid("subjects", "expected a string"))?;
        let (text, suffix) = split_suffix(&text);
        let term_type = match suffix {
            None | Some("iri") => TermType::Iri,
            Some("blanknode") => TermType::BlankNode,
            Some(other) => {
                return Err(ConvertError::invalid(
                    "subjects",
                    format!("subjects can not have the suffix '~{other}'"),
                ))
            }
        };
        Ok(TermMap::new(self.value(text, term_type)?, term_type))
    }

    fn graphs(&self, yaml: &Yaml) -> Result<Vec<TermMap>> {
        list(yaml)
            .into_iter()
            .map(|g| {
                let text = scalar(g)
                    .ok_or_else(|| ConvertError::invalid("graphs", "expected a string"))?;
                match split_suffix(&text) {
                    (text, None | Some("iri")) => {
                        Ok(TermMap::new(self.value(text, TermType::Iri)?, TermType::Iri))
                    }
                    (_, Some(other)) => Err(ConvertError::invalid(
                        "graphs",
                        format!("graphs can not have the suffix '~{other}'"),
                    )),
                }
            })
            .collect()
    }

    fn predicate_object(&self, yaml: &Yaml, logger: &mut Logger) -> Result<PredicateObjectMap> {
        let po = match yaml {
            Yaml::Array(items) => {
                let (predicates, objects, extra) = match &items[..] {
                    [p, o] => (p, o, None),
                    [p, o, extra] => (p, o, Some(extra)),
                    _ => {
                        return Err(ConvertError::invalid(
                            "predicateobjects",
                            "short form must be [predicate, object] or [predicate, object, datatype]",
                        ))
                    }
                };
                let predicates = self.predicates(predicates)?;
                let is_type = predicates.iter().any(|p| p.is_constant_iri(RDF_TYPE));
                let objects = match (objects, extra) {
                    (Yaml::Array(objects), None) => objects
                        .iter()
                        .map(|o| self.object(o, is_type))
                        .collect::<Result<Vec<_>>>()?,
                    (object, extra) => {
                        let text = scalar(object).ok_or_else(|| {
                            ConvertError::invalid("predicateobjects", "object must be a string")
                        })?;
                        let extra = match extra {
                            Some(e) => Some(scalar(e).ok_or_else(|| {
                                ConvertError::invalid(
                                    "predicateobjects",
                                    "datatype must be a string",
                                )
                            })?),
                            None => None,
                        };
                        vec![ObjectMap::Term(self.object_term(
                            &text,
                            None,
                            extra.as_deref(),
                            is_type,
                        )?)]
                    }
                };
                PredicateObjectMap {
                    predicates,
                    objects,
                    graphs: vec![],
                }
            }
            Yaml::Hash(hash) => {
                check_keys(
                    hash,
                    &[PREDICATES_KEYS, OBJECTS_KEYS, GRAPHS_KEYS].concat(),
                    "predicateobjects",
                    logger,
                );
                let predicates = get(hash, PREDICATES_KEYS).ok_or_else(|| {
                    ConvertError::invalid("predicateobjects", "missing predicates")
                })?;
                let predicates = self.predicates(predicates)?;
                let is_type = predicates.iter().any(|p| p.is_constant_iri(RDF_TYPE));
                let objects = get(hash, OBJECTS_KEYS)
                    .ok_or_else(|| ConvertError::invalid("predicateobjects", "missing objects"))?;
                let objects = list(objects)
                    .into_iter()
                    .map(|o| self.object(o, is_type))
                    .collect::<Result<Vec<_>>>()?;
                let graphs = match get(hash, GRAPHS_KEYS) {
                    Some(g) => self.graphs(g)?,
                    None => vec![],
                };
                PredicateObjectMap {
                    predicates,
                    objects,
                    graphs,
                }
            }
            _ => {
                return Err(ConvertError::invalid(
                    "predicateobjects",
                    "expected a list or a mapping",
                ))
            }
        };
        if po.predicates.is_empty() || po.objects.is_empty() {
            return Err(ConvertError::invalid(
                "predicateobjects",
                "at least one predicate and one object are required",
            ));
        }
        Ok(po)
    }

    fn predicates(&self, yaml: &Yaml) -> Result<Vec<TermMap>> {
        list(yaml)
            .into_iter()
            .map(|p| {
                let text = scalar(p)
                    .ok_or_else(|| ConvertError::invalid("predicates", "expected a string"))?;
                let text = self.prefixes.expand_predicate(&text);
                Ok(TermMap::new(self.value(&text, TermType::Iri)?, TermType::Iri))
            })
            .collect()
    }

    fn object(&self, yaml: &Yaml, is_type: bool) -> Result<ObjectMap> {
        match yaml {
            Yaml::Hash(hash) => self.object_from_hash(hash, is_type),
            Yaml::Array(items) => match &items[..] {
                [value, extra] => {
                    let (value, extra) = scalar(value).zip(scalar(extra)).ok_or_else(|| {
                        ConvertError::invalid("objects", "expected [value, datatype]")
                    })?;
                    Ok(ObjectMap::Term(self.object_term(
                        &value,
                        None,
                        Some(&extra),
                        is_type,
                    )?))
                }
                _ => Err(ConvertError::invalid("objects", "expected [value, datatype]")),
            },
            other => {
                let text = scalar(other)
                    .ok_or_else(|| ConvertError::invalid("objects", "expected a string"))?;
                Ok(ObjectMap::Term(self.object_term(&text, None, None, is_type)?))
            }
        }
    }

    fn object_from_hash(&self, hash: &Hash, is_type: bool) -> Result<ObjectMap> {
        if let Some(mapping) = get(hash, &["mapping"]) {
            return self.join(mapping, get(hash, &["condition"]));
        }
        if let Some(function) = get(hash, FUNCTION_KEYS) {
            return self.function(function, get(hash, PARAMETERS_KEYS), hash, is_type);
        }
        let value = get(hash, &["value", "v"])
            .and_then(scalar)
            .ok_or_else(|| ConvertError::invalid("objects", "missing 'value'"))?;
        let annotated = get(hash, &["datatype", "language"]).is_some();
        let mut term = self.object_term(&value, explicit_type(hash)?, None, is_type && !annotated)?;
        self.datatype_and_language(hash, &mut term)?;
        Ok(ObjectMap::Term(term))
    }

    /// Build the term map of an object from its text,
    /// where `extra` is either a datatype or a language (`en~lang`).
    fn object_term(
        &self,
        text: &str,
        explicit: Option<TermType>,
        extra: Option<&str>,
        is_type: bool,
    ) -> Result<TermMap> {
        let (text, suffix) = split_suffix(text);
        let term_type = match (explicit, suffix) {
            (Some(t), _) => t,
            (None, Some("iri")) => TermType::Iri,
            (None, Some("blanknode")) => TermType::BlankNode,
            (None, Some("literal")) => TermType::Literal,
            (None, Some(other)) => {
                return Err(ConvertError::invalid(
                    "objects",
                    format!("objects can not have the suffix '~{other}'"),
                ))
            }
            (None, None) if is_type && extra.is_none() => TermType::Iri,
            (None, None) => TermType::Literal,
        };
        let mut term = TermMap::new(self.value(text, term_type)?, term_type);
        if let Some(extra) = extra {
            match split_suffix(extra) {
                (lang, Some("lang")) => term.language = Some(self.value(lang, TermType::Literal)?),
                (datatype, None) => term.datatype = Some(self.value(datatype, TermType::Iri)?),
                (_, Some(other)) => {
                    return Err(ConvertError::invalid(
                        "objects",
                        format!("unexpected suffix '~{other}' for a datatype or language"),
                    ))
                }
            }
            check_literal(&term)?;
        }
        Ok(term)
    }

    fn datatype_and_language(&self, hash: &Hash, term: &mut TermMap) -> Result<()> {
        if let Some(datatype) = get(hash, &["datatype"]).and_then(scalar) {
            term.datatype = Some(self.value(&datatype, TermType::Iri)?);
        }
        if let Some(language) = get(hash, &["language"]).and_then(scalar) {
            term.language = Some(self.value(&language, TermType::Literal)?);
        }
        check_literal(term)
    }

    fn join(&self, mapping: &Yaml, condition: Option<&Yaml>) -> Result<ObjectMap> {
        let mapping = scalar(mapping)
            .ok_or_else(|| ConvertError::invalid("mapping", "expected a mapping name"))?;
        if !self.mappings.contains(&mapping.as_str()) {
            return Err(ConvertError::UnknownMapping(mapping));
        }
        let conditions = match condition {
            Some(c) => list(c)
                .into_iter()
                .map(|c| self.join_condition(c))
                .collect::<Result<Vec<_>>>()?,
            None => vec![],
        };
        Ok(ObjectMap::Join {
            mapping,
            conditions,
        })
    }

    fn join_condition(&self, yaml: &Yaml) -> Result<Join> {
        let Yaml::Hash(hash) = yaml else {
            return Err(ConvertError::invalid("condition", "expected a mapping"));
        };
        let function = get(hash, FUNCTION_KEYS)
            .and_then(scalar)
            .ok_or_else(|| ConvertError::invalid("condition", "missing 'function'"))?;
        if !JOIN_EQUAL.contains(&function.as_str()) {
            return Err(ConvertError::UnsupportedJoinFunction(function));
        }
        let mut child = None;
        let mut parent = None;
        for param in get(hash, PARAMETERS_KEYS).map(list).unwrap_or_default() {
            let (name, value) = parameter_pair(param)?;
            let reference = Template::parse(&value)?
                .as_reference()
                .map(str::to_string)
                .ok_or(ConvertError::InvalidJoinParameter(value))?;
            if JOIN_STR1.contains(&name.as_str()) {
                child = Some(reference);
            } else if JOIN_STR2.contains(&name.as_str()) {
                parent = Some(reference);
            } else {
                return Err(ConvertError::invalid(
                    "parameters",
                    format!("unknown join parameter '{name}'"),
                ));
            }
        }
        match (child, parent) {
            (Some(child), Some(parent)) => Ok(Join { child, parent }),
            _ => Err(ConvertError::invalid(
                "condition",
                "both str1 and str2 parameters are required",
            )),
        }
    }

    fn function(
        &self,
        function: &Yaml,
        parameters: Option<&Yaml>,
        hash: &Hash,
        is_type: bool,
    ) -> Result<ObjectMap> {
        let function = scalar(function).ok_or_else(|| {
            ConvertError::Unsupported("function names must be strings".to_string())
        })?;
        let function = self.resolve(&self.prefixes.expand(&function))?;
        let parameters = parameters
            .map(list)
            .unwrap_or_default()
            .into_iter()
            .map(|param| {
                let (name, value) = parameter_pair(param)?;
                Ok(Parameter {
                    parameter: self.resolve(&self.prefixes.expand(&name))?,
                    value: self.object_term(&value, None, None, false)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let term_type = match explicit_type(hash)? {
            Some(t) => t,
            None if is_type => TermType::Iri,
            None => TermType::Literal,
        };
        let mut output = TermMap {
            value: None,
            term_type,
            datatype: None,
            language: None,
        };
        self.datatype_and_language(hash, &mut output)?;
        Ok(ObjectMap::Function {
            function,
            parameters,
            output,
        })
    }

    /// Translate a YARRRML value into a [`Value`].
    ///
    /// Prefixes are expanded for IRIs only,
    /// and constant IRIs are made absolute.
    fn value(&self, text: &str, term_type: TermType) -> Result<Value> {
        let text = match term_type {
            TermType::Iri => self.prefixes.expand(text),
            _ => Cow::Borrowed(text),
        };
        let template = Template::parse(&text)?;
        if let Some(reference) = template.as_reference() {
            return Ok(Value::Reference(reference.to_string()));
        }
        match (template.as_constant(), term_type) {
            (Some(iri), TermType::Iri) => Ok(Value::Constant(self.resolve(&iri)?)),
            (Some(txt), TermType::Literal) => Ok(Value::Constant(txt)),
            _ => Ok(Value::Template(template.to_rml_template())),
        }
    }

    fn resolve(&self, iri: &str) -> Result<String> {
        if Iri::parse(iri).is_ok() {
            return Ok(iri.to_string());
        }
        self.base
            .as_ref()
            .and_then(|base| base.resolve(iri).ok())
            .map(Iri::into_inner)
            .ok_or_else(|| ConvertError::InvalidIri(iri.to_string()))
    }
}

/// Split a YARRRML suffix (`~iri`, `~literal`, `~blanknode`, `~lang`) from `text`.
///
/// Any other `~` is considered part of the text.
pub fn split_suffix(text: &str) -> (&str, Option<&str>) {
    match text.rsplit_once('~') {
        Some((value, suffix)) if matches!(suffix, "iri" | "literal" | "blanknode" | "lang") => {
            (value, Some(suffix))
        }
        _ => (text, None),
    }
}

fn explicit_type(hash: &Hash) -> Result<Option<TermType>> {
    match get(hash, &["type"]).and_then(scalar).as_deref() {
        None => Ok(None),
        Some("iri") => Ok(Some(TermType::Iri)),
        Some("literal") => Ok(Some(TermType::Literal)),
        Some("blanknode") => Ok(Some(TermType::BlankNode)),
        Some(other) => Err(ConvertError::invalid(
            "type",
            format!("expected iri, literal or blanknode, got '{other}'"),
        )),
    }
}

fn check_literal(term: &TermMap) -> Result<()> {
    if term.term_type != TermType::Literal && (term.datatype.is_some() || term.language.is_some()) {
        return Err(ConvertError::invalid(
            "objects",
            "only literals can have a datatype or a language",
        ));
    }
    if term.datatype.is_some() && term.language.is_some() {
        return Err(ConvertError::invalid(
            "objects",
            "a literal can not have both a datatype and a language",
        ));
    }
    Ok(())
}

/// Read a function parameter, written `[name, value]` or `{parameter: name, value: value}`.
fn parameter_pair(yaml: &Yaml) -> Result<(String, String)> {
    let (name, value) = match yaml {
        Yaml::Array(items) if items.len() >= 2 => (Some(&items[0]), Some(&items[1])),
        Yaml::Hash(hash) => (get(hash, &["parameter", "p"]), get(hash, &["value", "v"])),
        _ => {
            return Err(ConvertError::invalid(
                "parameters",
                "expected [parameter, value]",
            ))
        }
    };
    if matches!(value, Some(Yaml::Hash(_))) {
        return Err(ConvertError::Unsupported(
            "nested function values".to_string(),
        ));
    }
    name.and_then(scalar)
        .zip(value.and_then(scalar))
        .ok_or_else(|| {
            ConvertError::invalid("parameters", "parameter name and value must be strings")
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::ReferenceFormulation;
    use yaml_rust::YamlLoader;

    fn normalize(txt: &str, logger: &mut Logger) -> Result<Mapping> {
        let yaml = YamlLoader::load_from_str(txt).unwrap().remove(0);
        let mut prefixes = PrefixMap::new();
        prefixes.insert("ex", "http://example.com/");
        let ctx = Context::new(
            &prefixes,
            &[],
            ["person", "project"],
            Some("http://base.example.org/"),
        );
        ctx.mapping("person", &yaml, logger)
    }

    #[test]
    fn short_forms() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize(
            r#"
sources: ['persons.json~jsonpath', '$.persons[*]']
s: ex:person/$(id)
po:
  - [a, foaf:Person]
  - [foaf:name, $(name)]
  - [foaf:age, $(age), xsd:integer]
  - [rdfs:label, $(label), en~lang]
  - [foaf:homepage, $(page)~iri]
"#,
            &mut logger,
        )?;
        assert!(logger.is_empty(), "{:?}", logger.get_all());
        assert_eq!(m.sources.len(), 1);
        assert_eq!(m.sources[0].formulation, ReferenceFormulation::JsonPath);
        assert_eq!(
            m.subjects,
            vec![TermMap::new(
                Value::Template("http://example.com/person/{id}".into()),
                TermType::Iri
            )]
        );
        let pos = &m.predicate_objects;
        assert_eq!(pos.len(), 5);
        assert!(pos[0].predicates[0].is_constant_iri(RDF_TYPE));
        assert_eq!(
            pos[0].objects[0],
            ObjectMap::Term(TermMap::new(
                Value::Constant("http://xmlns.com/foaf/0.1/Person".into()),
                TermType::Iri
            ))
        );
        assert_eq!(
            pos[1].objects[0],
            ObjectMap::Term(TermMap::new(
                Value::Reference("name".into()),
                TermType::Literal
            ))
        );
        let ObjectMap::Term(age) = &pos[2].objects[0] else {
            panic!("expected a term map")
        };
        assert_eq!(
            age.datatype,
            Some(Value::Constant(
                "http://www.w3.org/2001/XMLSchema#integer".into()
            ))
        );
        let ObjectMap::Term(label) = &pos[3].objects[0] else {
            panic!("expected a term map")
        };
        assert_eq!(label.language, Some(Value::Constant("en".into())));
        let ObjectMap::Term(page) = &pos[4].objects[0] else {
            panic!("expected a term map")
        };
        assert_eq!(page.term_type, TermType::Iri);
        assert_eq!(page.value, Some(Value::Reference("page".into())));
        Ok(())
    }

    #[test]
    fn long_form() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize(
            r#"
sources: ['persons.csv~csv']
subjects: [ex:$(id), ex:other/$(id)]
predicateobjects:
  - predicates: [foaf:name, rdfs:label]
    objects:
      - value: $(name)
        language: $(lang)
      - [$(nick), xsd:string]
    graphs: ex:names
"#,
            &mut logger,
        )?;
        assert!(logger.is_empty(), "{:?}", logger.get_all());
        assert_eq!(m.subjects.len(), 2);
        let po = &m.predicate_objects[0];
        assert_eq!(po.predicates.len(), 2);
        assert_eq!(po.objects.len(), 2);
        let ObjectMap::Term(name) = &po.objects[0] else {
            panic!("expected a term map")
        };
        assert_eq!(name.language, Some(Value::Reference("lang".into())));
        assert_eq!(
            po.graphs,
            vec![TermMap::new(
                Value::Constant("http://example.com/names".into()),
                TermType::Iri
            )]
        );
        Ok(())
    }

    #[test]
    fn missing_subject_is_a_blank_node() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize("sources: ['a.csv~csv']\npo: [[ex:p, $(x)]]\n", &mut logger)?;
        assert_eq!(m.subjects, vec![TermMap::blank_node()]);
        Ok(())
    }

    #[test]
    fn relative_constant_iris_are_resolved() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize("sources: ['a.csv~csv']\ns: alice\n", &mut logger)?;
        assert_eq!(
            m.subjects[0].value,
            Some(Value::Constant("http://base.example.org/alice".into()))
        );
        Ok(())
    }

    #[test]
    fn joins() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize(
            r#"
sources: ['a.csv~csv']
s: ex:$(id)
po:
  - p: ex:worksOn
    o:
      mapping: project
      condition:
        function: equal
        parameters:
          - [str1, $(project_id)]
          - [str2, $(id)]
"#,
            &mut logger,
        )?;
        assert_eq!(
            m.predicate_objects[0].objects[0],
            ObjectMap::Join {
                mapping: "project".into(),
                conditions: vec![Join {
                    child: "project_id".into(),
                    parent: "id".into()
                }]
            }
        );
        Ok(())
    }

    #[test]
    fn functions() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize(
            r#"
sources: ['a.csv~csv']
s: ex:$(id)
po:
  - p: ex:upperName
    o:
      function: grel:toUpperCase
      parameters:
        - [grel:valueParameter, $(name)]
"#,
            &mut logger,
        )?;
        let ObjectMap::Function {
            function,
            parameters,
            output,
        } = &m.predicate_objects[0].objects[0]
        else {
            panic!("expected a function")
        };
        assert_eq!(
            function,
            "http://users.ugent.be/~bjdmeest/function/grel.ttl#toUpperCase"
        );
        assert_eq!(
            parameters[0].parameter,
            "http://users.ugent.be/~bjdmeest/function/grel.ttl#valueParameter"
        );
        assert_eq!(parameters[0].value.value, Some(Value::Reference("name".into())));
        assert_eq!(output.term_type, TermType::Literal);
        Ok(())
    }

    #[test]
    fn invalid_predicate_objects_are_skipped() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize(
            r#"
sources: ['a.csv~csv']
s: ex:$(id)
po:
  - [ex:p, $(unclosed]
  - [ex:q, $(ok)]
  - p: ex:r
    o:
      mapping: nowhere
"#,
            &mut logger,
        )?;
        assert_eq!(m.predicate_objects.len(), 1);
        assert_eq!(logger.get_all().len(), 2);
        assert!(logger.has_errors());
        Ok(())
    }

    #[test]
    fn mapping_errors() {
        let mut logger = Logger::new();
        assert!(matches!(
            normalize("s: ex:$(id)\n", &mut logger),
            Err(ConvertError::MissingSources(_))
        ));
        assert!(matches!(
            normalize("sources: ['a.csv~csv']\ns: $(id)~literal\n", &mut logger),
            Err(ConvertError::InvalidValue { .. })
        ));
        assert!(matches!(
            normalize("- not a mapping\n", &mut logger),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn explicit_blank_node_subject() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize("sources: ['a.csv~csv']\ns: $(id)~blanknode\n", &mut logger)?;
        assert_eq!(
            m.subjects,
            vec![TermMap::new(
                Value::Reference("id".into()),
                TermType::BlankNode
            )]
        );
        Ok(())
    }

    #[test]
    fn blank_node_graphs_are_rejected() {
        let mut logger = Logger::new();
        assert!(matches!(
            normalize("sources: ['a.csv~csv']\ng: $(g)~blanknode\n", &mut logger),
            Err(ConvertError::InvalidValue { key, .. }) if key == "graphs"
        ));
    }

    #[test]
    fn nested_functions_are_unsupported() -> Result<()> {
        let mut logger = Logger::new();
        let m = normalize(
            r#"
sources: ['a.csv~csv']
s: ex:$(id)
po:
  - p: ex:p
    o:
      function: grel:toUpperCase
      parameters:
        - parameter: grel:valueParameter
          value:
            function: grel:string_trim
            parameters: [[grel:valueParameter, $(name)]]
"#,
            &mut logger,
        )?;
        assert!(m.predicate_objects.is_empty());
        let errors: Vec<_> = logger.get(crate::logger::Level::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("nested function"));
        Ok(())
    }

    #[test]
    fn unsupported_join_function() {
        let mut logger = Logger::new();
        normalize(
            r#"
sources: ['a.csv~csv']
po:
  - p: ex:p
    o:
      mapping: project
      condition:
        function: notEqual
        parameters: [[str1, $(a)], [str2, $(b)]]
"#,
            &mut logger,
        )
        .unwrap();
        assert!(logger.get_all()[0].message.contains("notEqual"));
    }

    #[test_case::test_case("$(x)~iri", "$(x)", Some("iri"))]
    #[test_case::test_case("en~lang", "en", Some("lang"))]
    #[test_case::test_case("http://host/~user", "http://host/~user", None)]
    #[test_case::test_case("plain", "plain", None)]
    fn suffixes(txt: &str, value: &str, suffix: Option<&str>) {
        assert_eq!(split_suffix(txt), (value, suffix));
    }
}
