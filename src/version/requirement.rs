//! Version requirements (`Gem::Requirement`).
//!
//! A requirement is a comma separated list of `operator version` pairs, all of
//! which must hold. A bare version means `=`. The pessimistic operator `~>` admits
//! versions from the given one up to, but excluding, its [`GemVersion::bump`].

use super::GemVersion;
use crate::core::ImportError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a single constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `~>`
    Pessimistic,
}

impl Operator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Pessimistic => "~>",
        }
    }

    fn satisfied(self, version: &GemVersion, bound: &GemVersion) -> bool {
        match self {
            Self::Eq => version == bound,
            Self::Ne => version != bound,
            Self::Gt => version > bound,
            Self::Lt => version < bound,
            Self::Ge => version >= bound,
            Self::Le => version <= bound,
            Self::Pessimistic => version >= bound && version.release() < bound.bump(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of version constraints that must all hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    constraints: Vec<(Operator, GemVersion)>,
}

impl Requirement {
    /// The requirement every version satisfies, `>= 0`.
    #[must_use]
    pub fn default_requirement() -> Self {
        Self {
            constraints: vec![(Operator::Ge, GemVersion::from_segments(vec![super::Segment::Number(0)]))],
        }
    }

    /// Parses a comma separated requirement such as `"~> 1.2, >= 1.2.3"`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidRequirement`] if any part has an unknown
    /// operator or an invalid version.
    pub fn parse(input: &str) -> Result<Self, ImportError> {
        let parts = input.split(',').map(str::trim).collect::<Vec<_>>();
        if parts.iter().all(|p| p.is_empty()) {
            return Err(ImportError::InvalidRequirement {
                requirement: input.to_string(),
                reason: "requirement is empty".to_string(),
            });
        }

        let mut constraints = Vec::with_capacity(parts.len());
        for part in parts {
            constraints.push(parse_constraint(part).map_err(|reason| {
                ImportError::InvalidRequirement {
                    requirement: input.to_string(),
                    reason,
                }
            })?);
        }
        Ok(Self {
            constraints,
        })
    }

    /// Parses several requirement strings (as given to `add_dependency`) into one.
    ///
    /// An empty list yields [`Requirement::default_requirement`].
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::InvalidRequirement`] if any of them is invalid.
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Self, ImportError> {
        if inputs.is_empty() {
            return Ok(Self::default_requirement());
        }
        let mut constraints = Vec::new();
        for input in inputs {
            constraints.extend(Self::parse(input.as_ref())?.constraints);
        }
        Ok(Self {
            constraints,
        })
    }

    /// Whether `version` satisfies every constraint.
    pub fn is_satisfied_by(&self, version: &GemVersion) -> bool {
        self.constraints.iter().all(|(op, bound)| op.satisfied(version, bound))
    }

    /// Whether this requirement admits any version at all (`>= 0`).
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default_requirement()
    }

    /// The individual constraints.
    pub fn constraints(&self) -> &[(Operator, GemVersion)] {
        &self.constraints
    }
}

fn parse_constraint(part: &str) -> Result<(Operator, GemVersion), String> {
    const OPERATORS: [(&str, Operator); 7] = [
        ("~>", Operator::Pessimistic),
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        ("!=", Operator::Ne),
        ("=", Operator::Eq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ];

    if part.is_empty() {
        return Err("empty constraint".to_string());
    }

    let (op, rest) = OPERATORS
        .iter()
        .find_map(|(text, op)| part.strip_prefix(text).map(|rest| (*op, rest)))
        .unwrap_or((Operator::Eq, part));

    let version = GemVersion::parse(rest).map_err(|e| e.to_string())?;
    Ok((op, version))
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (op, version) in &self.constraints {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{op} {version}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Requirement {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> GemVersion {
        GemVersion::parse(s).unwrap()
    }

    #[test]
    fn test_bare_version_means_equal() {
        let req = Requirement::parse("2").unwrap();
        assert_eq!(req.to_string(), "= 2");
        assert!(req.is_satisfied_by(&v("2.0")));
        assert!(!req.is_satisfied_by(&v("2.1")));
    }

    #[test]
    fn test_pessimistic_operator() {
        let req = Requirement::parse("~> 1.2").unwrap();
        assert!(req.is_satisfied_by(&v("1.2")));
        assert!(req.is_satisfied_by(&v("1.9")));
        assert!(!req.is_satisfied_by(&v("2.0")));
        assert!(!req.is_satisfied_by(&v("1.1")));

        let req = Requirement::parse("~> 1.2.3").unwrap();
        assert!(req.is_satisfied_by(&v("1.2.9")));
        assert!(!req.is_satisfied_by(&v("1.3.0")));
        assert!(!req.is_satisfied_by(&v("1.3.0.pre")));
    }

    #[test]
    fn test_compound_requirement() {
        let req = Requirement::parse(">= 1.0, < 2").unwrap();
        assert!(req.is_satisfied_by(&v("1.5")));
        assert!(!req.is_satisfied_by(&v("2.0")));
        assert_eq!(req.to_string(), ">= 1.0, < 2");
    }

    #[test]
    fn test_parse_all_and_default() {
        let req = Requirement::parse_all(&["~> 1.4", ">= 1.4.2"]).unwrap();
        assert!(req.is_satisfied_by(&v("1.4.2")));
        assert!(!req.is_satisfied_by(&v("1.4.1")));

        let empty: [&str; 0] = [];
        let req = Requirement::parse_all(&empty).unwrap();
        assert!(req.is_unconstrained());
        assert_eq!(req.to_string(), ">= 0");
    }

    #[test]
    fn test_invalid_requirements() {
        assert!(Requirement::parse("").is_err());
        assert!(Requirement::parse(">= ").is_err());
        assert!(Requirement::parse("=> 1.0").is_err());
        assert!(Requirement::parse("latest").is_err());
    }
}
