//! Minimal selector matching: comma lists of `tag`, `#id` and `.class`
//! compounds. Combinators are not supported.

use crate::error::DomError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

#[derive(Clone, Copy)]
enum Part {
    Tag,
    Id,
    Class,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for raw in input.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(invalid("empty selector"));
            }

            let mut compound = Compound::default();
            let mut part = Part::Tag;
            let mut ident = String::new();

            for ch in raw.chars().chain(std::iter::once('\0')) {
                match ch {
                    '#' | '.' | '\0' => {
                        match part {
                            Part::Tag if !ident.is_empty() => {
                                compound.tag = Some(ident.to_ascii_lowercase())
                            }
                            Part::Tag => {}
                            _ if ident.is_empty() => return Err(invalid("missing name")),
                            Part::Id if compound.id.is_some() => {
                                return Err(invalid("more than one id"))
                            }
                            Part::Id => compound.id = Some(ident.clone()),
                            Part::Class => compound.classes.push(ident.clone()),
                        }
                        ident.clear();
                        part = if ch == '#' { Part::Id } else { Part::Class };
                    }
                    c if c.is_alphanumeric() || c == '-' || c == '_' => ident.push(c),
                    c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                        return Err(invalid("combinators are not supported"))
                    }
                    _ => return Err(invalid("unexpected character")),
                }
            }

            alternatives.push(compound);
        }

        Ok(Self { alternatives })
    }

    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        self.alternatives.iter().any(|compound| {
            compound
                .tag
                .as_deref()
                .is_none_or(|t| t.eq_ignore_ascii_case(tag))
                && compound.id.as_deref().is_none_or(|i| Some(i) == id)
                && compound.classes.iter().all(|c| classes.contains(c))
        })
    }
}
