//! Read a YARRRML document from the standard input,
//! and write the equivalent RML rules in the format specified in the first argument.
//!
//! Recognized formats are:
//! - [`ntriples`](https://www.w3.org/TR/n-triples/) (alias `nt`, default)
//! - [`turtle`](https://www.w3.org/TR/turtle/) (alias `ttl`)
//! - [`nquads`](https://www.w3.org/TR/n-quads/) (alias `nq`)
//!
//! The base IRI of the generated rules can be set with the `YARRRML_BASE`
//! environment variable.
//! Log entries are written to the standard error.

use std::io::{read_to_string, stdin};

use yarrrml::serializer::{serialize, Format};
use yarrrml::Converter;

fn main() {
    let format: Format = match std::env::args().nth(1).unwrap_or_default().as_str() {
        "" => Format::default(),
        name => match name.parse() {
            Ok(format) => format,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(-1);
            }
        },
    };
    let mut converter = match std::env::var("YARRRML_BASE") {
        Ok(base) => Converter::with_base(&base).unwrap_or_else(|err| {
            eprintln!("{err}");
            std::process::exit(-1);
        }),
        Err(_) => Converter::new(),
    };
    let input = read_to_string(stdin()).unwrap_or_else(|err| {
        eprintln!("{err}");
        std::process::exit(1);
    });

    let quads = converter.convert(&input);
    for entry in converter.logger().get_all() {
        eprintln!("{entry}");
    }
    if converter.logger().has_errors() {
        std::process::exit(1);
    }
    match serialize(&quads, format, converter.prefixes()) {
        Ok(txt) => print!("{txt}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
