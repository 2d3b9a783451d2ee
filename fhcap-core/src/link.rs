use crate::cell::CellId;
use anyhow::anyhow;
use std::{fmt, str};

/// The identifier of one shared fronthaul link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(u64);

impl LinkId {
    /// Create a link identifier from its raw number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw link number.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl str::FromStr for LinkId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|error| anyhow!("{error}"))
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The set of cells sharing one fronthaul link.
///
/// Produced by [`TopologyInference`](crate::topology::TopologyInference) or
/// supplied directly from a known deployment. Every cell belongs to exactly
/// one link; this type holds one side of that mapping and makes no claim
/// about the others.
///
/// # Example
///
/// ```
/// use fhcap_core::{CellId, LinkGroup, LinkId};
///
/// let group = LinkGroup::new(
///     LinkId::new(1),
///     vec![CellId::new(2), CellId::new(3), CellId::new(10)],
/// );
/// assert_eq!(group.cells().len(), 3);
/// assert!(group.contains(CellId::new(10)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    link: LinkId,
    cells: Vec<CellId>,
}

impl LinkGroup {
    /// Pair a link with the cells it carries.
    pub fn new(link: LinkId, cells: Vec<CellId>) -> Self {
        Self { link, cells }
    }

    /// The link these cells share.
    pub fn link(&self) -> LinkId {
        self.link
    }

    /// The cells carried by this link.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Returns `true` if `cell` belongs to this link.
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }
}

impl fmt::Display for LinkGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link {}: cells", self.link)?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i == 0 {
                write!(f, " {cell}")?;
            } else {
                write!(f, ", {cell}")?;
            }
        }
        Ok(())
    }
}
