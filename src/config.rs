//! Parser configuration: which grammar to compile.

use std::fmt;
use std::str::FromStr;

/// Language variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Scalars only
    Basic,
    /// Adds array types, array literals and element access
    #[default]
    Arrays,
}

/// What a single parse produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Entry {
    #[default]
    Program,
    Statement,
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub dialect: Dialect,
    pub entry: Entry,
}

impl Config {
    pub fn new(dialect: Dialect, entry: Entry) -> Self {
        Config { dialect, entry }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Dialect::Basic),
            "arrays" => Ok(Dialect::Arrays),
            _ => Err(format!("unknown dialect '{s}'")),
        }
    }
}

impl FromStr for Entry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "program" => Ok(Entry::Program),
            "statement" => Ok(Entry::Statement),
            "expression" => Ok(Entry::Expression),
            _ => Err(format!("unknown entry point '{s}'")),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Basic => "basic",
            Dialect::Arrays => "arrays",
        })
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entry::Program => "program",
            Entry::Statement => "statement",
            Entry::Expression => "expression",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dialect, Dialect::Arrays);
        assert_eq!(config.entry, Entry::Program);
    }

    #[test]
    fn test_parse_names() {
        for dialect in [Dialect::Basic, Dialect::Arrays] {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
        for entry in [Entry::Program, Entry::Statement, Entry::Expression] {
            assert_eq!(entry.to_string().parse::<Entry>(), Ok(entry));
        }
        assert!("matrix".parse::<Dialect>().is_err());
    }
}
