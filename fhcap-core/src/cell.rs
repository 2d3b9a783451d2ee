use anyhow::anyhow;
use std::{fmt, str};

/// The identifier of one radio cell feeding a fronthaul link.
///
/// Cell numbering comes from the capture layer; this crate never invents
/// cell identifiers, it only groups and aggregates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
    /// Create a cell identifier from its raw number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw cell number.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl str::FromStr for CellId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|error| anyhow!("{error}"))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print() {
        assert_eq!(format!("{}", CellId::new(7)), "7")
    }

    #[test]
    fn parse() {
        assert_eq!("7".parse::<CellId>().unwrap(), CellId::new(7));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("cell_7".parse::<CellId>().is_err());
    }
}
