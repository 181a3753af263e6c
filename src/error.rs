use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynError {
    #[error("chromosome-scope edit resolved to an empty base name (from '{0}')")]
    EmptyChromosomeName(String),
    #[error("unknown genome '{0}'")]
    UnknownGenome(String),
    #[error("unknown band handle {0}")]
    UnknownBand(u32),
    #[error("invalid color '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("invalid scale {0}: bp-per-pixel must be finite and positive")]
    InvalidScale(f64),
    #[error("a chain needs at least two genomes, got {0}")]
    EmptyChain(usize),
    #[error("{genomes} genomes form {expected} pairs but {got} record sets were given")]
    GenomeCountMismatch {
        genomes: usize,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, SynError>;
