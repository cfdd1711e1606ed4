//! Namespaces of the vocabularies used in generated RML rules.
//!
//! `rdf`, `rdfs` and `xsd` are re-exported from [`sophia_api::ns`].

pub use sophia_api::ns::{rdf, rdfs, xsd};

/// The [R2RML](https://www.w3.org/TR/r2rml/) vocabulary
pub mod rr {
    use sophia_api::namespace;
    namespace!(
        "http://www.w3.org/ns/r2rml#",
        // classes
        TriplesMap,
        SubjectMap,
        PredicateMap,
        ObjectMap,
        PredicateObjectMap,
        RefObjectMap,
        GraphMap,
        Join,
        IRI,
        BlankNode,
        Literal,
        // properties
        subjectMap,
        predicateMap,
        objectMap,
        predicateObjectMap,
        graphMap,
        constant,
        template,
        termType,
        datatype,
        language,
        parentTriplesMap,
        joinCondition,
        child,
        parent;
    );
}

/// The [RML](https://rml.io/specs/rml/) vocabulary
pub mod rml {
    use sophia_api::namespace;
    namespace!(
        "http://semweb.mmlab.be/ns/rml#",
        LogicalSource,
        LanguageMap,
        DatatypeMap,
        logicalSource,
        source,
        iterator,
        referenceFormulation,
        reference,
        languageMap,
        datatypeMap,
        delimiter,
        encoding;
    );
}

/// Reference formulations used by RML
pub mod ql {
    use sophia_api::namespace;
    namespace!(
        "http://semweb.mmlab.be/ns/ql#",
        JSONPath,
        CSV,
        XPath;
    );
}

/// Function term maps
pub mod fnml {
    use sophia_api::namespace;
    namespace!(
        "http://semweb.mmlab.be/ns/fnml#",
        functionValue;
    );
}

/// The [Function Ontology](https://fno.io/)
pub mod fno {
    use sophia_api::namespace;
    namespace!(
        "https://w3id.org/function/ontology#",
        executes;
    );
}

/// The [VoID](https://www.w3.org/TR/void/) vocabulary
pub mod void {
    use sophia_api::namespace;
    namespace!(
        "http://rdfs.org/ns/void#",
        Dataset,
        exampleResource;
    );
}
