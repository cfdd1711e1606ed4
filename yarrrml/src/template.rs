//! Value templates, as written in YARRRML (`http://ex.org/$(id)`).
//!
//! A template is a sequence of literal text and references to the data.
//! It is translated either into a constant, a single reference,
//! or an [R2RML template](https://www.w3.org/TR/r2rml/#from-template)
//! where references are written `{ref}`.

use thiserror::Error;

/// This error is raised when a YARRRML template can not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `$(` is never closed
    #[error("unclosed reference in template '{0}'")]
    Unclosed(String),
    /// `$()`
    #[error("empty reference in template '{0}'")]
    EmptyReference(String),
}

/// A part of a [`Template`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim
    Literal(String),
    /// A reference to the data (JSONPath, column name, XPath...)
    Reference(String),
}

/// A parsed YARRRML template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template(Vec<Segment>);

impl Template {
    /// Parse a YARRRML template.
    ///
    /// References may contain balanced parentheses,
    /// and `\$(` stands for a literal `$(`.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = vec![];
        let mut literal = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if starts_reference(&chars) => {
                    literal.push(chars.next().unwrap_or('$'));
                    literal.push(chars.next().unwrap_or('('));
                }
                '$' if chars.peek() == Some(&'(') => {
                    chars.next();
                    let mut depth = 1;
                    let mut reference = String::new();
                    loop {
                        match chars.next() {
                            None => return Err(TemplateError::Unclosed(text.to_string())),
                            Some('(') => {
                                depth += 1;
                                reference.push('(');
                            }
                            Some(')') => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                                reference.push(')');
                            }
                            Some(c) => reference.push(c),
                        }
                    }
                    if reference.is_empty() {
                        return Err(TemplateError::EmptyReference(text.to_string()));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Reference(reference));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Template(segments))
    }

    /// The segments of this template.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// The references used in this template.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|s| match s {
            Segment::Reference(r) => Some(r.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// If this template contains no reference, return its text.
    pub fn as_constant(&self) -> Option<String> {
        let mut txt = String::new();
        for s in &self.0 {
            match s {
                Segment::Literal(l) => txt.push_str(l),
                Segment::Reference(_) => return None,
            }
        }
        Some(txt)
    }

    /// If this template is made of exactly one reference, return it.
    pub fn as_reference(&self) -> Option<&str> {
        match &self.0[..] {
            [Segment::Reference(r)] => Some(r),
            _ => None,
        }
    }

    /// Render this template with the R2RML template syntax.
    pub fn to_rml_template(&self) -> String {
        let mut txt = String::new();
        for s in &self.0 {
            match s {
                Segment::Literal(l) => {
                    for c in l.chars() {
                        if matches!(c, '{' | '}' | '\\') {
                            txt.push('\\');
                        }
                        txt.push(c);
                    }
                }
                Segment::Reference(r) => {
                    txt.push('{');
                    txt.push_str(r);
                    txt.push('}');
                }
            }
        }
        txt
    }
}

fn starts_reference(chars: &std::iter::Peekable<std::str::Chars>) -> bool {
    let mut ahead = chars.clone();
    ahead.next() == Some('$') && ahead.next() == Some('(')
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("http://ex.org/a", Some("http://ex.org/a"), None; "constant")]
    #[test_case("$(id)", None, Some("id"); "reference")]
    #[test_case("$(a(b))", None, Some("a(b)"); "nested parentheses")]
    #[test_case("ex:$(id)", None, None; "template")]
    #[test_case("", Some(""), None; "empty")]
    #[test_case(r"\$(id)", Some("$(id)"), None; "escaped")]
    fn classification(txt: &str, constant: Option<&str>, reference: Option<&str>) {
        let t = Template::parse(txt).unwrap();
        assert_eq!(t.as_constant().as_deref(), constant);
        assert_eq!(t.as_reference(), reference);
    }

    #[test_case("http://ex.org/$(id)", "http://ex.org/{id}")]
    #[test_case("$(first) $(last)", "{first} {last}")]
    #[test_case("{literal}$(x)", r"\{literal\}{x}")]
    #[test_case(r"a\b$(x)", r"a\\b{x}")]
    #[test_case("$($.items[?(@.a)])", "{$.items[?(@.a)]}")]
    fn rml_template(txt: &str, expected: &str) {
        assert_eq!(Template::parse(txt).unwrap().to_rml_template(), expected);
    }

    #[test]
    fn references_are_listed_in_order() {
        let t = Template::parse("$(a)-$(b)/$(a)").unwrap();
        assert_eq!(t.references().collect::<Vec<_>>(), vec!["a", "b", "a"]);
    }

    #[test_case("http://ex.org/$(id"; "unclosed")]
    #[test_case("$(a(b)"; "unbalanced")]
    fn unclosed(txt: &str) {
        assert!(matches!(
            Template::parse(txt),
            Err(TemplateError::Unclosed(_))
        ));
    }

    #[test]
    fn empty_reference() {
        assert_eq!(
            Template::parse("x$()"),
            Err(TemplateError::EmptyReference("x$()".into()))
        );
    }
}
