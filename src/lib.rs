//! Layout, merge, filter, color and selection engine for synteny ribbon plots
//! across a chain of genomes.
//!
//! The host parses alignment records and chromosome tables, hands them to a
//! [`Session`], and draws the path data and attributes it produces.

pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod heatmap;
pub mod layout;
pub mod merge;
pub mod model;
pub mod path;
pub mod registry;
pub mod render;
pub mod selection;
pub mod session;

pub use color::{ColorMode, DisplayMode, DisplaySetting, DisplayStore, ResolvedStyle, Rgb, Scope};
pub use config::{LayoutConfig, LayoutMode, MergeConfig, SessionConfig};
pub use error::{Result, SynError};
pub use filter::{ChromosomeRef, FilterState, VisibilityFilter};
pub use layout::{ChainLayout, ChromosomeLayoutEngine, ChromosomeTrack, PairLayout, TrackPosition};
pub use merge::BandMerger;
pub use model::{BandId, BandType, Chromosome, ChromosomeTable, PairRecords, SyntenyRecord, TrackRole};
pub use registry::BandRegistry;
pub use render::{BandMeta, BandRenderer, Paint, RenderedBand, RenderedTrack, Ribbon};
pub use selection::{Envelope, SelectionManager};
pub use session::{Affected, Command, Session};
