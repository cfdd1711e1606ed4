//! Generation of RML rules from normalized mappings.

use crate::converter::Quad;
use crate::logger::Logger;
use crate::model::{
    Join, Mapping, ObjectMap, Parameter, PredicateObjectMap, TermMap, TermType, Value,
};
use crate::source::Source;
use crate::vocab::{fnml, fno, rdf, rdfs, rml, rr, void};
use mownstr::MownStr;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sophia_api::ns::NsTerm;
use sophia_api::term::{IriRef, SimpleTerm, Term};
use std::collections::HashMap;

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Builds the RML quads for a set of mappings.
///
/// Triples maps must be [declared](Generator::declare) for all mappings
/// before any of them is [generated](Generator::mapping),
/// so that joins can refer to mappings appearing later in the document.
pub(crate) struct Generator<'a> {
    base: &'a str,
    counters: HashMap<&'static str, usize>,
    triples_maps: HashMap<String, Vec<SimpleTerm<'static>>>,
    rules: SimpleTerm<'static>,
    quads: Vec<Quad>,
}

impl<'a> Generator<'a> {
    /// `base` is the namespace of all generated nodes.
    pub fn new(base: &'a str) -> Self {
        let mut generator = Generator {
            base,
            counters: HashMap::new(),
            triples_maps: HashMap::new(),
            rules: iri(format!("{base}rules_000")),
            quads: vec![],
        };
        let rules = generator.rules.clone();
        generator.add(&rules, rdf::type_, void::Dataset);
        generator
    }

    /// Allocate the triples maps of `mapping`,
    /// one per combination of source and subject.
    pub fn declare(&mut self, mapping: &Mapping) {
        let name = percent_encode(&mapping.name);
        let count = mapping.sources.len() * mapping.subjects.len();
        let maps = (0..count)
            .map(|i| iri(format!("{}map_{name}_{i:03}", self.base)))
            .collect();
        self.triples_maps.insert(mapping.name.clone(), maps);
    }

    /// Generate the rules of a declared mapping.
    ///
    /// Predicate-object maps that can not be generated are reported to `logger`.
    pub fn mapping(&mut self, mapping: &Mapping, logger: &mut Logger) {
        let Some(maps) = self.triples_maps.get(&mapping.name).cloned() else {
            logger.error(format!("mapping '{}' was not declared", mapping.name));
            return;
        };
        let predicate_objects: Vec<&PredicateObjectMap> = mapping
            .predicate_objects
            .iter()
            .enumerate()
            .filter(|(i, po)| match self.check_joins(po) {
                Ok(()) => true,
                Err(target) => {
                    logger.error(format!(
                        "mapping '{}', predicateobject #{}: unknown mapping '{target}' referenced in a join",
                        mapping.name,
                        i + 1
                    ));
                    false
                }
            })
            .map(|(_, po)| po)
            .collect();
        let combinations = mapping
            .sources
            .iter()
            .flat_map(|source| mapping.subjects.iter().map(move |subject| (source, subject)));
        for (map, (source, subject)) in maps.into_iter().zip(combinations) {
            let rules = self.rules.clone();
            self.add(&rules, void::exampleResource, map.clone());
            self.add(&map, rdf::type_, rr::TriplesMap);
            self.add(&map, rdfs::label, literal(&mapping.name));

            let ls = self.logical_source(source);
            self.add(&map, rml::logicalSource, ls.clone());

            let sm = self.subject_map(subject, &mapping.graphs);
            self.add(&map, rr::subjectMap, sm);

            for po in &predicate_objects {
                let pom = self.predicate_object_map(po, &ls);
                self.add(&map, rr::predicateObjectMap, pom);
            }
        }
    }

    /// Consume this generator, returning the generated quads.
    pub fn into_quads(self) -> Vec<Quad> {
        log::debug!(
            "generated {} quads for {} mappings",
            self.quads.len(),
            self.triples_maps.len()
        );
        self.quads
    }

    fn logical_source(&mut self, source: &Source) -> SimpleTerm<'static> {
        let ls = self.node("source");
        self.add(&ls, rdf::type_, rml::LogicalSource);
        if let Some(name) = &source.name {
            self.add(&ls, rdfs::label, literal(name));
        }
        self.add(&ls, rml::source, literal(&source.access));
        self.add(&ls, rml::referenceFormulation, source.formulation.term());
        if let Some(iterator) = &source.iterator {
            self.add(&ls, rml::iterator, literal(iterator));
        }
        if let Some(delimiter) = &source.delimiter {
            self.add(&ls, rml::delimiter, literal(delimiter));
        }
        if let Some(encoding) = &source.encoding {
            self.add(&ls, rml::encoding, literal(encoding));
        }
        ls
    }

    fn subject_map(&mut self, subject: &TermMap, graphs: &[TermMap]) -> SimpleTerm<'static> {
        let sm = self.node("s");
        self.add(&sm, rdf::type_, rr::SubjectMap);
        self.value(&sm, subject);
        if subject.term_type == TermType::BlankNode {
            self.add(&sm, rr::termType, rr::BlankNode);
        }
        for graph in graphs {
            let gm = self.graph_map(graph);
            self.add(&sm, rr::graphMap, gm);
        }
        sm
    }

    /// Return the name of the first mapping referred to by `po`
    /// that has no triples map.
    fn check_joins(&self, po: &PredicateObjectMap) -> Result<(), String> {
        for object in &po.objects {
            if let ObjectMap::Join { mapping, .. } = object {
                if !self.triples_maps.contains_key(mapping) {
                    return Err(mapping.clone());
                }
            }
        }
        Ok(())
    }

    fn predicate_object_map(
        &mut self,
        po: &PredicateObjectMap,
        ls: &SimpleTerm<'static>,
    ) -> SimpleTerm<'static> {
        let pom = self.node("pom");
        self.add(&pom, rdf::type_, rr::PredicateObjectMap);
        for predicate in &po.predicates {
            let pm = self.node("pm");
            self.add(&pm, rdf::type_, rr::PredicateMap);
            self.value(&pm, predicate);
            self.add(&pom, rr::predicateMap, pm);
        }
        for object in &po.objects {
            match object {
                ObjectMap::Term(term) => {
                    let om = self.object_map(term);
                    self.add(&pom, rr::objectMap, om);
                }
                ObjectMap::Join {
                    mapping,
                    conditions,
                } => {
                    let parents = self.triples_maps.get(mapping).cloned().unwrap_or_default();
                    for parent in parents {
                        let om = self.ref_object_map(parent, conditions);
                        self.add(&pom, rr::objectMap, om);
                    }
                }
                ObjectMap::Function {
                    function,
                    parameters,
                    output,
                } => {
                    let om = self.function_map(function, parameters, output, ls);
                    self.add(&pom, rr::objectMap, om);
                }
            }
        }
        for graph in &po.graphs {
            let gm = self.graph_map(graph);
            self.add(&pom, rr::graphMap, gm);
        }
        pom
    }

    fn object_map(&mut self, term: &TermMap) -> SimpleTerm<'static> {
        let om = self.node("om");
        self.add(&om, rdf::type_, rr::ObjectMap);
        self.value(&om, term);
        self.term_type_and_annotations(&om, term);
        om
    }

    fn term_type_and_annotations(&mut self, om: &SimpleTerm<'static>, term: &TermMap) {
        self.add(om, rr::termType, term.term_type.term());
        match &term.datatype {
            Some(Value::Constant(dt)) => self.add(om, rr::datatype, iri(dt.clone())),
            Some(dynamic) => {
                let dtm = self.node("dtm");
                self.add(&dtm, rdf::type_, rml::DatatypeMap);
                self.dynamic_value(&dtm, dynamic);
                self.add(om, rml::datatypeMap, dtm);
            }
            None => {}
        }
        match &term.language {
            Some(Value::Constant(lang)) => self.add(om, rr::language, literal(lang)),
            Some(dynamic) => {
                let lm = self.node("lm");
                self.add(&lm, rdf::type_, rml::LanguageMap);
                self.dynamic_value(&lm, dynamic);
                self.add(om, rml::languageMap, lm);
            }
            None => {}
        }
    }

    fn ref_object_map(
        &mut self,
        parent: SimpleTerm<'static>,
        conditions: &[Join],
    ) -> SimpleTerm<'static> {
        let om = self.node("om");
        self.add(&om, rdf::type_, rr::RefObjectMap);
        self.add(&om, rr::parentTriplesMap, parent);
        for condition in conditions {
            let jc = self.node("jc");
            self.add(&jc, rdf::type_, rr::Join);
            self.add(&jc, rr::child, literal(&condition.child));
            self.add(&jc, rr::parent, literal(&condition.parent));
            self.add(&om, rr::joinCondition, jc);
        }
        om
    }

    fn function_map(
        &mut self,
        function: &str,
        parameters: &[Parameter],
        output: &TermMap,
        ls: &SimpleTerm<'static>,
    ) -> SimpleTerm<'static> {
        let om = self.node("om");
        self.add(&om, rdf::type_, rr::ObjectMap);
        let fun = self.node("fn");
        self.add(&om, fnml::functionValue, fun.clone());
        self.term_type_and_annotations(&om, output);

        self.add(&fun, rml::logicalSource, ls.clone());
        let pomexec = self.node("pomexec");
        self.add(&fun, rr::predicateObjectMap, pomexec.clone());
        self.add(&pomexec, rdf::type_, rr::PredicateObjectMap);
        let pmexec = self.node("pmexec");
        self.add(&pomexec, rr::predicateMap, pmexec.clone());
        self.add(&pmexec, rdf::type_, rr::PredicateMap);
        self.add(&pmexec, rr::constant, fno::executes);
        let omexec = self.node("omexec");
        self.add(&pomexec, rr::objectMap, omexec.clone());
        self.add(&omexec, rdf::type_, rr::ObjectMap);
        self.add(&omexec, rr::constant, iri(function.to_string()));
        self.add(&omexec, rr::termType, rr::IRI);

        for param in parameters {
            let pom = self.node("pom");
            self.add(&fun, rr::predicateObjectMap, pom.clone());
            self.add(&pom, rdf::type_, rr::PredicateObjectMap);
            let pm = self.node("pm");
            self.add(&pom, rr::predicateMap, pm.clone());
            self.add(&pm, rdf::type_, rr::PredicateMap);
            self.add(&pm, rr::constant, iri(param.parameter.clone()));
            let pom_om = self.object_map(&param.value);
            self.add(&pom, rr::objectMap, pom_om);
        }
        om
    }

    fn graph_map(&mut self, graph: &TermMap) -> SimpleTerm<'static> {
        let gm = self.node("gm");
        self.add(&gm, rdf::type_, rr::GraphMap);
        self.value(&gm, graph);
        gm
    }

    /// Describe how `term` gets its value, on node `map`.
    fn value(&mut self, map: &SimpleTerm<'static>, term: &TermMap) {
        match &term.value {
            Some(Value::Constant(c)) if term.term_type == TermType::Iri => {
                self.add(map, rr::constant, iri(c.clone()))
            }
            Some(value) => self.dynamic_value(map, value),
            None => {}
        }
    }

    fn dynamic_value(&mut self, map: &SimpleTerm<'static>, value: &Value) {
        match value {
            Value::Constant(c) => self.add(map, rr::constant, literal(c)),
            Value::Reference(r) => self.add(map, rml::reference, literal(r)),
            Value::Template(t) => self.add(map, rr::template, literal(t)),
        }
    }

    /// A fresh node of the given kind.
    fn node(&mut self, kind: &'static str) -> SimpleTerm<'static> {
        let counter = self.counters.entry(kind).or_insert(0);
        let n = *counter;
        *counter += 1;
        iri(format!("{}{kind}_{n:03}", self.base))
    }

    fn add<O: Into<Object>>(&mut self, s: &SimpleTerm<'static>, p: NsTerm<'static>, o: O) {
        let o = match o.into() {
            Object::Ns(ns) => ns.into_term(),
            Object::Term(t) => t,
        };
        self.quads.push(([s.clone(), p.into_term(), o], None));
    }
}

/// The objects accepted by [`Generator::add`].
enum Object {
    Ns(NsTerm<'static>),
    Term(SimpleTerm<'static>),
}

impl From<NsTerm<'static>> for Object {
    fn from(value: NsTerm<'static>) -> Self {
        Object::Ns(value)
    }
}

impl From<SimpleTerm<'static>> for Object {
    fn from(value: SimpleTerm<'static>) -> Self {
        Object::Term(value)
    }
}

fn iri(txt: String) -> SimpleTerm<'static> {
    SimpleTerm::Iri(IriRef::new_unchecked(MownStr::from(txt)))
}

fn literal(txt: &str) -> SimpleTerm<'static> {
    SimpleTerm::LiteralDatatype(
        MownStr::from(txt.to_string()),
        IriRef::new_unchecked(MownStr::from(XSD_STRING)),
    )
}

/// Everything but IRI unreserved characters.
const MAPPING_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn percent_encode(txt: &str) -> String {
    utf8_percent_encode(txt, MAPPING_NAME).to_string()
}
