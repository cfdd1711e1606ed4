//! This crate compiles [YARRRML] mapping documents
//! into the equivalent [RML] rules, expressed as RDF.
//!
//! YARRRML is a human-friendly, YAML-based syntax
//! for describing how heterogeneous data (JSON, CSV, XML...)
//! should be turned into RDF.
//! RML is the RDF vocabulary that mapping processors actually execute.
//!
//! [YARRRML]: https://rml.io/yarrrml/spec/
//! [RML]: https://rml.io/specs/rml/
//!
//! # Getting Started
//!
//! ```
//! use yarrrml::Converter;
//! use yarrrml::serializer::{serialize, Format};
//!
//! let mapping = r#"
//! prefixes:
//!   ex: http://example.com/
//! mappings:
//!   person:
//!     sources:
//!       - ['data/persons.json~jsonpath', '$.persons[*]']
//!     s: ex:$(id)
//!     po:
//!       - [a, foaf:Person]
//!       - [foaf:name, $(name)]
//! "#;
//! let mut converter = Converter::new();
//! let quads = converter.convert(mapping);
//! assert!(!converter.logger().has_errors());
//!
//! let nt = serialize(&quads, Format::NTriples, converter.prefixes()).unwrap();
//! assert!(nt.contains(r#""data/persons.json""#));
//! ```
#![warn(missing_docs)]

pub mod base;
pub mod converter;
pub mod document;
pub mod error;
mod generator;
pub mod logger;
pub mod model;
pub mod prefix;
pub mod serializer;
pub mod source;
pub mod template;
pub mod vocab;

pub use converter::{Converter, Quad};
pub use error::{ConvertError, Result};
pub use logger::{Entry, Level, Logger};
