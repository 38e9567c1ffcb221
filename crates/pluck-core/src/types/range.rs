//! npm-style version ranges.
//!
//! A [`VersionReq`] is a disjunction (`||`) of comparator sets. Every
//! shorthand (x-ranges, `~`, `^`, hyphen ranges) is desugared at parse time
//! into primitive comparators, so matching only ever deals with
//! `=`, `<`, `<=`, `>` and `>=` against full versions.

use std::fmt;

use super::version::{parse_numeric, split_version, Version, VersionError};

/// Version requirement (`^1.0.0`, `~2.3`, `>=1.0.0 <2.0.0 || 3.x`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReq {
    /// Alternatives; an empty inner set matches every release
    pub sets: Vec<Vec<Comparator>>,
}

/// Primitive comparator against a full version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

/// Comparison operator for primitive comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,     // =1.0.0
    Greater,   // >1.0.0
    GreaterEq, // >=1.0.0
    Less,      // <1.0.0
    LessEq,    // <=1.0.0
}

/// Operator as written, before desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawOp {
    Primitive(Op),
    Tilde,
    Caret,
}

/// Partial version; `None` components are wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    prerelease: Option<String>,
}

impl Partial {
    fn parse(input: &str) -> Result<Self, VersionError> {
        let input = input.strip_prefix('=').unwrap_or(input);
        let input = input
            .strip_prefix('v')
            .or_else(|| input.strip_prefix('V'))
            .unwrap_or(input);

        let (core, prerelease, _build) = split_version(input)?;
        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(VersionError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut numbers = [None; 3];
        for (slot, part) in numbers.iter_mut().zip(parts.iter()) {
            *slot = match *part {
                "x" | "X" | "*" => None,
                number => Some(parse_numeric(number)?),
            };
        }

        // Anything after the first wildcard is a wildcard too ("1.x.3" == "1.x").
        if let Some(first_wild) = numbers.iter().position(Option::is_none) {
            for slot in numbers.iter_mut().skip(first_wild) {
                *slot = None;
            }
        }

        let [major, minor, patch] = numbers;
        Ok(Self {
            major,
            minor,
            patch,
            // A pre-release only means something on a fully specified version.
            prerelease: if patch.is_some() { prerelease } else { None },
        })
    }

    /// Fill wildcards with zero
    fn floor(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            prerelease: self.prerelease.clone(),
            build: None,
        }
    }
}

fn cmp(op: Op, version: Version) -> Comparator {
    Comparator { op, version }
}

/// `<M.m.p-0`, the exclusive upper bound that also shuts out pre-releases
fn below(major: u64, minor: u64, patch: u64) -> Comparator {
    cmp(Op::Less, Version::with_prerelease(major, minor, patch, "0"))
}

/// A comparator no version satisfies
fn nothing() -> Vec<Comparator> {
    vec![below(0, 0, 0)]
}

impl VersionReq {
    /// Parse an npm range expression
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let sets = input
            .split("||")
            .map(|set| {
                parse_set(set.trim()).map_err(|_| VersionError::InvalidRange {
                    input: input.trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sets })
    }

    /// Check if a version matches this requirement
    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set_matches(set, version))
    }
}

impl Comparator {
    /// Check if a version matches this comparator
    pub fn matches(&self, version: &Version) -> bool {
        let ordering = version.precedence_cmp(&self.version);
        match self.op {
            Op::Exact => ordering.is_eq(),
            Op::Greater => ordering.is_gt(),
            Op::GreaterEq => ordering.is_ge(),
            Op::Less => ordering.is_lt(),
            Op::LessEq => ordering.is_le(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Exact => "",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
        };
        write!(f, "{}{}", op, self.version)
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .sets
            .iter()
            .map(|set| {
                if set.is_empty() {
                    "*".to_string()
                } else {
                    set.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" ")
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" || "))
    }
}

/// Pre-release versions only match a set that names a pre-release on the same triple.
fn set_matches(set: &[Comparator], version: &Version) -> bool {
    if !set.iter().all(|comparator| comparator.matches(version)) {
        return false;
    }
    if !version.is_prerelease() {
        return true;
    }
    set.iter().any(|comparator| {
        comparator.version.is_prerelease() && comparator.version.triple() == version.triple()
    })
}

fn parse_set(input: &str) -> Result<Vec<Comparator>, VersionError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if let Some((from, to)) = input.split_once(" - ") {
        return hyphen(&Partial::parse(from.trim())?, &Partial::parse(to.trim())?);
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in input.split_whitespace() {
        if is_operator(token) {
            // ">= 1.2.3": the version follows in the next token
            pending_op = Some(token);
            continue;
        }
        let joined;
        let token = match pending_op.take() {
            Some(op) => {
                joined = format!("{}{}", op, token);
                joined.as_str()
            }
            None => token,
        };
        comparators.extend(parse_comparator(token)?);
    }

    if let Some(op) = pending_op {
        return Err(VersionError::InvalidRange {
            input: op.to_string(),
        });
    }

    Ok(comparators)
}

fn is_operator(token: &str) -> bool {
    matches!(token, "<" | "<=" | ">" | ">=" | "=" | "~" | "~>" | "^")
}

fn split_operator(token: &str) -> (RawOp, &str) {
    const PREFIXES: [(&str, RawOp); 8] = [
        (">=", RawOp::Primitive(Op::GreaterEq)),
        ("<=", RawOp::Primitive(Op::LessEq)),
        (">", RawOp::Primitive(Op::Greater)),
        ("<", RawOp::Primitive(Op::Less)),
        ("=", RawOp::Primitive(Op::Exact)),
        ("~>", RawOp::Tilde),
        ("~", RawOp::Tilde),
        ("^", RawOp::Caret),
    ];

    for (prefix, op) in PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (RawOp::Primitive(Op::Exact), token)
}

fn parse_comparator(token: &str) -> Result<Vec<Comparator>, VersionError> {
    let (op, rest) = split_operator(token);
    let partial = Partial::parse(rest)?;

    match op {
        RawOp::Tilde => tilde(&partial),
        RawOp::Caret => caret(&partial),
        RawOp::Primitive(op) => primitive(op, &partial),
    }
}

/// Next component up; a component at `u64::MAX` has no successor
fn next(component: u64) -> Result<u64, VersionError> {
    component
        .checked_add(1)
        .ok_or_else(|| VersionError::InvalidRange {
            input: component.to_string(),
        })
}

fn tilde(p: &Partial) -> Result<Vec<Comparator>, VersionError> {
    Ok(match (p.major, p.minor, p.patch) {
        (None, _, _) => Vec::new(),
        (Some(major), None, _) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(next(major)?, 0, 0),
        ],
        (Some(major), Some(minor), _) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(major, next(minor)?, 0),
        ],
    })
}

fn caret(p: &Partial) -> Result<Vec<Comparator>, VersionError> {
    Ok(match (p.major, p.minor, p.patch) {
        (None, _, _) => Vec::new(),
        (Some(major), None, _) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(next(major)?, 0, 0),
        ],
        (Some(0), Some(minor), None) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(0, next(minor)?, 0),
        ],
        (Some(0), Some(0), Some(patch)) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(0, 0, next(patch)?),
        ],
        (Some(0), Some(minor), Some(_)) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(0, next(minor)?, 0),
        ],
        (Some(major), Some(_), _) => vec![
            cmp(Op::GreaterEq, p.floor()),
            below(next(major)?, 0, 0),
        ],
    })
}

fn primitive(op: Op, p: &Partial) -> Result<Vec<Comparator>, VersionError> {
    let Some(major) = p.major else {
        return Ok(match op {
            Op::Greater | Op::Less => nothing(),
            _ => Vec::new(),
        });
    };

    Ok(match (op, p.minor, p.patch) {
        (_, Some(_), Some(_)) => vec![cmp(op, p.floor())],
        (Op::Exact, None, _) => vec![cmp(Op::GreaterEq, p.floor()), below(next(major)?, 0, 0)],
        (Op::Exact, Some(minor), None) => {
            vec![cmp(Op::GreaterEq, p.floor()), below(major, next(minor)?, 0)]
        }
        (Op::Greater, None, _) => vec![cmp(Op::GreaterEq, Version::new(next(major)?, 0, 0))],
        (Op::Greater, Some(minor), None) => {
            vec![cmp(Op::GreaterEq, Version::new(major, next(minor)?, 0))]
        }
        (Op::GreaterEq, _, _) => vec![cmp(Op::GreaterEq, p.floor())],
        (Op::Less, minor, _) => vec![below(major, minor.unwrap_or(0), 0)],
        (Op::LessEq, None, _) => vec![below(next(major)?, 0, 0)],
        (Op::LessEq, Some(minor), None) => vec![below(major, next(minor)?, 0)],
    })
}

fn hyphen(from: &Partial, to: &Partial) -> Result<Vec<Comparator>, VersionError> {
    let mut comparators = Vec::new();

    if from.major.is_some() {
        comparators.push(cmp(Op::GreaterEq, from.floor()));
    }

    match (to.major, to.minor, to.patch) {
        (None, _, _) => {}
        (Some(major), None, _) => comparators.push(below(next(major)?, 0, 0)),
        (Some(major), Some(minor), None) => comparators.push(below(major, next(minor)?, 0)),
        (Some(_), Some(_), Some(_)) => comparators.push(cmp(Op::LessEq, to.floor())),
    }

    Ok(comparators)
}
