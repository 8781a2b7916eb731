//! Functionality for reading sequencing depth tables and drawing genome
//! coverage maps.
//!
//! A [`DepthTable`] is created from the output of `samtools depth`: one
//! tab-separated row per position, holding the sequence name, the 1-based
//! position, and the read depth. From the table, per-sequence coverage
//! statistics and the maximal runs of covered positions are derived, laid
//! out to pixel geometry, and serialized as an SVG coverage map.
//!
//! Here is an example which loads a depth table and renders it with the
//! default options:
//!
//! ```no_run
//! use covmap::prelude::*;
//! let table = DepthTable::from_depth_file("sample_depth.tsv")
//!                 .expect("could not read depth table");
//! let options = RenderOptions::default();
//! let commands = render_coverage_map(&table, &options)
//!                 .expect("cannot lay out coverage map");
//! let svg = render_svg(&commands, 800.0, 600.0);
//! ```
//!
//! The same pipeline is available on the command line with:
//!
//! ```bash
//! cargo run --features=cli -- --out map.svg sample_depth.tsv
//! ```
//!
//! The intermediate [`DrawCommand`](crate::draw::DrawCommand) list decouples
//! geometry from serialization, so the layout of a figure can be inspected
//! and tested without writing any SVG.

pub mod covmap;
pub mod draw;
pub mod file;
pub mod layout;
pub mod svg;

pub use covmap::{
    CovMapError, CoverageSegment, Depth, DepthRecord, DepthTable, Position, SequenceStats,
};
pub use layout::{render_coverage_map, CanvasLayout, RenderOptions};
pub use svg::render_svg;

pub mod prelude {
    pub use crate::covmap::{
        CovMapError, CoverageSegment, Depth, DepthRecord, DepthTable, Position, SequenceStats,
    };
    pub use crate::draw::{DrawCommand, Point, Rect};
    pub use crate::file::{InputFile, OutputFile};
    pub use crate::layout::{render_coverage_map, CanvasLayout, RenderOptions};
    pub use crate::svg::render_svg;
}
