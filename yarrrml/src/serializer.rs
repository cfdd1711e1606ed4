//! Serialization of the generated rules.
//!
//! Rules can be written in [N-Triples](Format::NTriples),
//! [N-Quads](Format::NQuads) or [Turtle](Format::Turtle).
//! All generated quads are in the default graph,
//! so N-Triples and N-Quads outputs are identical.

use crate::converter::Quad;
use crate::prefix::PrefixMap;
use sophia_api::prefix::{Prefix, PrefixMapPair};
use sophia_api::serializer::{QuadSerializer, Stringifier, TripleSerializer};
use sophia_api::term::SimpleTerm;
use sophia_iri::Iri;
use sophia_turtle::serializer::nq::NqSerializer;
use sophia_turtle::serializer::nt::NtSerializer;
use sophia_turtle::serializer::turtle::{TurtleConfig, TurtleSerializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An output format for RML rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    #[default]
    NTriples,
    /// [N-Quads](https://www.w3.org/TR/n-quads/)
    NQuads,
    /// [Turtle](https://www.w3.org/TR/turtle/), with prefixes
    Turtle,
}

impl Format {
    /// All supported formats.
    pub const ALL: [Format; 3] = [Format::NTriples, Format::NQuads, Format::Turtle];

    /// The short name of this format, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Format::NTriples => "ntriples",
            Format::NQuads => "nquads",
            Format::Turtle => "turtle",
        }
    }

    /// The media type of this format.
    pub fn media_type(self) -> &'static str {
        match self {
            Format::NTriples => "application/n-triples",
            Format::NQuads => "application/n-quads",
            Format::Turtle => "text/turtle",
        }
    }

    /// Recognize a media type, ignoring its parameters (e.g. `charset`).
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        Format::ALL
            .into_iter()
            .find(|f| f.media_type().eq_ignore_ascii_case(essence))
    }

    /// Choose a format from the value of an HTTP `Accept` header.
    ///
    /// The recognized media type with the highest quality value wins;
    /// on ties, the first one listed. Media types with `q=0` are never chosen.
    pub fn from_accept(accept: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Format)> = accept
            .split(',')
            .filter_map(|range| {
                let format = Format::from_media_type(range)?;
                let q = quality(range)?;
                (q > 0.0).then_some((q, format))
            })
            .collect();
        // stable, so ties keep their order
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, format)| *format)
    }
}

/// The quality value of a media range, `None` if it is malformed.
fn quality(range: &str) -> Option<f32> {
    for param in range.split(';').skip(1) {
        if let Some((name, value)) = param.split_once('=') {
            if name.trim().eq_ignore_ascii_case("q") {
                return value.trim().parse().ok();
            }
        }
    }
    Some(1.0)
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when parsing an unknown [`Format`] name.
#[derive(Debug, Error)]
#[error("unknown format '{0}', expected one of ntriples, nt, nquads, nq, turtle, ttl")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ntriples" | "nt" | "n-triples" => Ok(Format::NTriples),
            "nquads" | "nq" | "n-quads" => Ok(Format::NQuads),
            "turtle" | "ttl" => Ok(Format::Turtle),
            other => Format::from_media_type(other).ok_or_else(|| UnknownFormat(s.to_string())),
        }
    }
}

/// Raised when the rules can not be serialized.
#[derive(Debug, Error)]
#[error("failed to serialize as {format}: {message}")]
pub struct SerializeError {
    /// The requested format
    pub format: Format,
    /// Description of the underlying error
    pub message: String,
}

/// Serialize `quads` in the given `format`.
///
/// `prefixes` are only used by [Turtle](Format::Turtle);
/// prefixes that are not valid in Turtle are skipped.
pub fn serialize(
    quads: &[Quad],
    format: Format,
    prefixes: &PrefixMap,
) -> Result<String, SerializeError> {
    let err = |e: &dyn fmt::Display| SerializeError {
        format,
        message: e.to_string(),
    };
    match format {
        Format::NTriples => {
            let mut stringifier = NtSerializer::new_stringifier();
            stringifier
                .serialize_graph(&triples(quads))
                .map_err(|e| err(&e))?;
            Ok(stringifier.to_string())
        }
        Format::NQuads => {
            let mut stringifier = NqSerializer::new_stringifier();
            stringifier
                .serialize_dataset(&quads.to_vec())
                .map_err(|e| err(&e))?;
            Ok(stringifier.to_string())
        }
        Format::Turtle => {
            let config = TurtleConfig::new()
                .with_pretty(true)
                .with_own_prefix_map(prefix_pairs(prefixes));
            let mut stringifier = TurtleSerializer::new_stringifier_with_config(config);
            stringifier
                .serialize_graph(&triples(quads))
                .map_err(|e| err(&e))?;
            Ok(stringifier.to_string())
        }
    }
}

fn triples(quads: &[Quad]) -> Vec<[SimpleTerm<'static>; 3]> {
    quads.iter().map(|(triple, _)| triple.clone()).collect()
}

fn prefix_pairs(prefixes: &PrefixMap) -> Vec<PrefixMapPair> {
    prefixes
        .iter()
        .filter_map(|(prefix, ns)| {
            let prefix = Prefix::new(Box::<str>::from(prefix)).ok()?;
            let ns = Iri::new(Box::<str>::from(ns)).ok()?;
            Some((prefix, ns))
        })
        .collect()
}
