//! Prefix handling for YARRRML documents.
//!
//! YARRRML uses prefixed names (`foaf:name`) wherever an IRI is expected.
//! A set of well-known prefixes is always available,
//! and can be overridden by the `prefixes` section of a document.

use std::borrow::Cow;

/// Prefixes available in every document.
pub static DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("rr", "http://www.w3.org/ns/r2rml#"),
    ("rml", "http://semweb.mmlab.be/ns/rml#"),
    ("ql", "http://semweb.mmlab.be/ns/ql#"),
    ("fnml", "http://semweb.mmlab.be/ns/fnml#"),
    ("fno", "https://w3id.org/function/ontology#"),
    ("grel", "http://users.ugent.be/~bjdmeest/function/grel.ttl#"),
    ("idlab-fn", "http://example.com/idlab/function/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("schema", "http://schema.org/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("void", "http://rdfs.org/ns/void#"),
    ("d2rq", "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#"),
];

/// The IRI `rdf:type`, which the YARRRML shortcut `a` stands for.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// An ordered association of prefixes to namespaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixMap {
    pairs: Vec<(String, String)>,
}

impl PrefixMap {
    /// A prefix map containing only the [`DEFAULT_PREFIXES`].
    pub fn new() -> Self {
        let pairs = DEFAULT_PREFIXES
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect();
        PrefixMap { pairs }
    }

    /// A prefix map with no prefix at all.
    pub fn empty() -> Self {
        PrefixMap { pairs: vec![] }
    }

    /// Declare `prefix`, replacing any previous declaration.
    pub fn insert<P: Into<String>, N: Into<String>>(&mut self, prefix: P, namespace: N) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.pairs.iter_mut().find(|(p, _)| *p == prefix) {
            Some(pair) => pair.1 = namespace,
            None => self.pairs.push((prefix, namespace)),
        }
    }

    /// The namespace associated to `prefix`, if any.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Iterate over the `(prefix, namespace)` pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Expand `text` if it starts with a declared prefix.
    ///
    /// Anything else (absolute IRIs, relative IRIs, plain text)
    /// is returned unchanged.
    /// The prefix must appear before any `$(` reference.
    pub fn expand<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let head = text.split("$(").next().unwrap_or_default();
        let Some(colon) = head.find(':') else {
            return Cow::Borrowed(text);
        };
        let (prefix, local) = (&text[..colon], &text[colon + 1..]);
        if local.starts_with("//") {
            return Cow::Borrowed(text);
        }
        match self.get(prefix) {
            Some(ns) => Cow::Owned(format!("{ns}{local}")),
            None => Cow::Borrowed(text),
        }
    }

    /// Expand a predicate, where `a` stands for `rdf:type`.
    pub fn expand_predicate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text == "a" {
            Cow::Borrowed(RDF_TYPE)
        } else {
            self.expand(text)
        }
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self::new()
    }
}
