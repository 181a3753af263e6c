use std::fmt;
use std::str::FromStr;

/// Structural-variant classification of an alignment band (SyRI tags).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BandType {
    Syn,
    SynAl,
    Inv,
    InvAl,
    Trans,
    TransAl,
    InvTr,
    InvTrAl,
    Dup,
    DupAl,
    InvDp,
    InvDpAl,
    Other(String),
}

impl BandType {
    /// Types that get a ribbon at all.
    pub const DRAWN: [BandType; 5] = [
        BandType::Syn,
        BandType::Inv,
        BandType::Trans,
        BandType::InvTr,
        BandType::Dup,
    ];

    /// Primitive types with their own filter toggle. Composites follow
    /// their constituents.
    pub const TOGGLEABLE: [BandType; 4] = [
        BandType::Syn,
        BandType::Inv,
        BandType::Trans,
        BandType::Dup,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            BandType::Syn => "SYN",
            BandType::SynAl => "SYNAL",
            BandType::Inv => "INV",
            BandType::InvAl => "INVAL",
            BandType::Trans => "TRANS",
            BandType::TransAl => "TRANSAL",
            BandType::InvTr => "INVTR",
            BandType::InvTrAl => "INVTRAL",
            BandType::Dup => "DUP",
            BandType::DupAl => "DUPAL",
            BandType::InvDp => "INVDP",
            BandType::InvDpAl => "INVDPAL",
            BandType::Other(tag) => tag,
        }
    }

    pub fn is_drawn(&self) -> bool {
        Self::DRAWN.contains(self)
    }

    /// Translocation-like types whose adjacent fragments get collapsed.
    pub fn is_mergeable(&self) -> bool {
        matches!(self, BandType::Trans | BandType::InvTr)
    }

    /// Drawn types that are never merged but block merges across them.
    pub fn is_normal(&self) -> bool {
        matches!(self, BandType::Syn | BandType::Inv | BandType::Dup)
    }

    /// Query orientation is reversed: the ribbon is drawn crossed.
    pub fn is_inverted(&self) -> bool {
        matches!(
            self,
            BandType::Inv | BandType::InvDpAl | BandType::InvTr | BandType::InvTrAl
        )
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, BandType::InvTr | BandType::InvDp)
    }

    /// Primitive types that must all be enabled for a composite type to show.
    pub fn constituents(&self) -> Vec<BandType> {
        match self {
            BandType::InvTr => vec![BandType::Inv, BandType::Trans],
            BandType::InvDp => vec![BandType::Inv, BandType::Dup],
            other => vec![other.clone()],
        }
    }
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BandType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SYN" => BandType::Syn,
            "SYNAL" => BandType::SynAl,
            "INV" => BandType::Inv,
            "INVAL" => BandType::InvAl,
            "TRANS" => BandType::Trans,
            "TRANSAL" => BandType::TransAl,
            "INVTR" => BandType::InvTr,
            "INVTRAL" => BandType::InvTrAl,
            "DUP" => BandType::Dup,
            "DUPAL" => BandType::DupAl,
            "INVDP" => BandType::InvDp,
            "INVDPAL" => BandType::InvDpAl,
            other => BandType::Other(other.to_string()),
        })
    }
}

/// One chromosome of one genome. Ordinals are 1-based and shared between the
/// reference and query tables of a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    pub genome: String,
    pub ordinal: u32,
    pub name: String,
    pub length: u64,
}

/// Ordered chromosome-length table of a genome.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeTable {
    genome: String,
    chromosomes: Vec<Chromosome>,
}

impl ChromosomeTable {
    /// Builds a table from `(name, length)` rows; ordinals follow row order.
    pub fn new<S, I>(genome: &str, rows: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, u64)>,
    {
        let chromosomes = rows
            .into_iter()
            .enumerate()
            .map(|(i, (name, length))| Chromosome {
                genome: genome.to_string(),
                ordinal: i as u32 + 1,
                name: name.into(),
                length,
            })
            .collect();
        ChromosomeTable {
            genome: genome.to_string(),
            chromosomes,
        }
    }

    pub fn genome(&self) -> &str {
        &self.genome
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn get(&self, ordinal: u32) -> Option<&Chromosome> {
        if ordinal == 0 {
            return None;
        }
        self.chromosomes.get(ordinal as usize - 1)
    }

    /// First-match lookup of a chromosome name.
    pub fn ordinal_of(&self, name: &str) -> Option<u32> {
        self.chromosomes
            .iter()
            .position(|c| c.name == name)
            .map(|i| i as u32 + 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chromosome> {
        self.chromosomes.iter()
    }
}

/// A parsed alignment record: one reference interval paired with one query
/// interval. Query coordinates may run in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntenyRecord {
    pub ref_chr: String,
    pub ref_start: i64,
    pub ref_end: i64,
    pub query_chr: String,
    pub query_start: i64,
    pub query_end: i64,
    pub band_type: BandType,
}

impl SyntenyRecord {
    pub fn new(
        ref_chr: &str,
        ref_start: i64,
        ref_end: i64,
        query_chr: &str,
        query_start: i64,
        query_end: i64,
        band_type: BandType,
    ) -> Self {
        SyntenyRecord {
            ref_chr: ref_chr.to_string(),
            ref_start,
            ref_end,
            query_chr: query_chr.to_string(),
            query_start,
            query_end,
            band_type,
        }
    }

    pub fn length(&self) -> i64 {
        self.ref_end - self.ref_start
    }
}

/// Records of one adjacent genome pair of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRecords {
    pub ref_genome: String,
    pub query_genome: String,
    pub records: Vec<SyntenyRecord>,
}

/// Stable handle of a rendered band inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BandId(pub u32);

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "band-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackRole {
    Ref,
    Query,
}

impl TrackRole {
    pub fn suffix(self) -> &'static str {
        match self {
            TrackRole::Ref => "_ref",
            TrackRole::Query => "_query",
        }
    }
}

/// Strips the `_ref` / `_query` element suffix from a track id.
pub fn chromosome_base_name(element_id: &str) -> &str {
    element_id
        .strip_suffix(TrackRole::Ref.suffix())
        .or_else(|| element_id.strip_suffix(TrackRole::Query.suffix()))
        .unwrap_or(element_id)
}
