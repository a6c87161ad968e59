//! Simple query string syntax: whitespace-separated terms, `"quoted
//! phrases"`, a `+` (required) or `-` (excluded) prefix, and `|` between
//! alternatives. Unprefixed clauses follow the default operator.

use tck_core::predicate::BooleanOperator;

///
/// Occur
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

///
/// Clause
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Clause<T> {
    pub occur: Occur,
    pub operand: T,
}

///
/// QueryString
///
/// A document matches when any alternative matches.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryString<T> {
    pub alternatives: Vec<Vec<Clause<T>>>,
}

impl QueryString<String> {
    #[must_use]
    pub fn parse(query: &str, default_operator: BooleanOperator) -> Self {
        let default = match default_operator {
            BooleanOperator::Or => Occur::Should,
            BooleanOperator::And => Occur::Must,
        };
        let mut alternatives = vec![Vec::new()];
        let mut chars = query.chars().peekable();

        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }
            if c == '|' {
                chars.next();
                alternatives.push(Vec::new());
                continue;
            }

            let occur = match c {
                '+' => Occur::Must,
                '-' => Occur::MustNot,
                _ => default,
            };
            if matches!(c, '+' | '-') {
                chars.next();
            }

            let mut operand = String::new();
            if chars.peek() == Some(&'"') {
                chars.next();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    operand.push(c);
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '|' {
                        break;
                    }
                    operand.push(c);
                    chars.next();
                }
            }

            if !operand.trim().is_empty()
                && let Some(current) = alternatives.last_mut()
            {
                current.push(Clause { occur, operand });
            }
        }
        alternatives.retain(|alternative| !alternative.is_empty());

        Self { alternatives }
    }
}

impl<T> QueryString<T> {
    /// Transform every operand, dropping clauses `f` rejects.
    pub fn try_map<U>(self, mut f: impl FnMut(T) -> Option<U>) -> QueryString<U> {
        let alternatives = self
            .alternatives
            .into_iter()
            .map(|clauses| {
                clauses
                    .into_iter()
                    .filter_map(|Clause { occur, operand }| {
                        f(operand).map(|operand| Clause { occur, operand })
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|clauses| !clauses.is_empty())
            .collect();

        QueryString { alternatives }
    }

    pub fn matches(&self, mut operand_matches: impl FnMut(&T) -> bool) -> bool {
        self.alternatives.iter().any(|clauses| {
            let mut has_must = false;
            let mut has_should = false;
            let mut any_should = false;

            for clause in clauses {
                let matched = operand_matches(&clause.operand);
                match clause.occur {
                    Occur::Must if !matched => return false,
                    Occur::MustNot if matched => return false,
                    Occur::Must => has_must = true,
                    Occur::Should => {
                        has_should = true;
                        any_should |= matched;
                    }
                    Occur::MustNot => {}
                }
            }

            has_must || !has_should || any_should
        })
    }
}

///
/// TESTS
///
