//! The entry point of this crate: [`Converter`].

use crate::base::{check_base, normalize_base, InvalidBase, DEFAULT_BASE};
use crate::document::Document;
use crate::generator::Generator;
use crate::logger::Logger;
use crate::model::Context;
use crate::prefix::PrefixMap;
use sophia_api::quad::Spog;
use sophia_api::term::SimpleTerm;

/// The type of quads produced by [`Converter::convert`].
pub type Quad = Spog<SimpleTerm<'static>>;

/// Converts YARRRML documents into RML rules.
///
/// A converter keeps the [log](Logger) and [prefixes](PrefixMap)
/// of the last converted document.
#[derive(Clone, Debug)]
pub struct Converter {
    base: String,
    logger: Logger,
    prefixes: PrefixMap,
}

impl Converter {
    /// A converter generating rules in the [default namespace](DEFAULT_BASE).
    pub fn new() -> Self {
        Converter {
            base: DEFAULT_BASE.to_string(),
            logger: Logger::new(),
            prefixes: PrefixMap::new(),
        }
    }

    /// A converter generating rules in the namespace `base`.
    ///
    /// A `/` is appended to `base` unless it ends with `/` or `#`.
    pub fn with_base(base: &str) -> Result<Self, InvalidBase> {
        Ok(Converter {
            base: normalize_base(base)?,
            ..Self::new()
        })
    }

    /// The namespace of the generated rules.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Convert `text` into RML quads.
    ///
    /// This never fails: problems are recorded in [`logger`](Converter::logger),
    /// which is reset by each call.
    /// A mapping containing errors is skipped (or partially converted),
    /// but the other mappings are still converted.
    pub fn convert(&mut self, text: &str) -> Vec<Quad> {
        self.logger.clear();
        self.prefixes = PrefixMap::new();
        let doc = match Document::parse(text, &mut self.logger) {
            Ok(doc) => doc,
            Err(err) => {
                self.logger.error(err.to_string());
                return vec![];
            }
        };
        self.prefixes = doc.prefixes.clone();

        // relative IRIs are resolved against the document base as written
        let resolution_base = match doc.base.as_deref().map(check_base) {
            Some(Ok(base)) => base,
            Some(Err(err)) => {
                self.logger.warn(format!("{err}, using <{}> instead", self.base));
                self.base.clone()
            }
            None => self.base.clone(),
        };
        let ctx = Context::new(
            &doc.prefixes,
            &doc.sources,
            doc.mapping_names(),
            Some(resolution_base.as_str()),
        );

        let mut mappings = Vec::with_capacity(doc.mappings.len());
        for raw in &doc.mappings {
            match ctx.mapping(&raw.name, &raw.body, &mut self.logger) {
                Ok(mapping) => mappings.push(mapping),
                Err(err) => self.logger.error(format!("mapping '{}': {err}", raw.name)),
            }
        }

        let mut generator = Generator::new(&self.base);
        for mapping in &mappings {
            generator.declare(mapping);
        }
        for mapping in &mappings {
            generator.mapping(mapping, &mut self.logger);
        }
        let quads = generator.into_quads();
        log::info!(
            "converted {}/{} mappings into {} quads ({} log entries)",
            mappings.len(),
            doc.mappings.len(),
            quads.len(),
            self.logger.get_all().len()
        );
        quads
    }

    /// The log of the last conversion.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The prefixes of the last converted document.
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
