use csv::ReaderBuilder;
use genomap::{GenomeMap, GenomeMapError};
use indexmap::map::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use super::file::{FileError, InputFile};

/// The integer type for genomic positions.
pub type Position = u64;

/// The integer type for per-position read depths.
pub type Depth = u32;

#[derive(Error, Debug)]
pub enum CovMapError {
    #[error("Depth table parsing error: {0}")]
    DepthParsingError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    #[error("File reading error: {0}")]
    FileError(#[from] FileError),
    #[error("Missing field on line {0}")]
    MissingField(usize),
    #[error("Failed to parse a column of the depth table: {0}")]
    ParseError(String),
    #[error("Depth table not sorted by position within sequence '{0}'")]
    DepthNotSorted(String),
    #[error("Depth table contains no sequences")]
    NoSequences,
    #[error("Sequence '{0}' has no positions")]
    NoPositions(String),
    #[error("All sequence lengths are zero")]
    ZeroMaxLength,
    #[error("Internal Error: {0}")]
    InternalError(String),
    #[error("GenomeMap Error: error updating GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),
}

/// One row of a depth table: a sequence name, a 1-based position, and the
/// number of reads covering that position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepthRecord {
    pub seqname: String,
    pub pos: Position,
    pub depth: Depth,
}

/// Coverage summary for a single sequence.
///
/// `covered_positions` counts positions whose depth strictly exceeds the
/// minimum-depth cutoff; `percent_covered` is on a 0–100 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceStats {
    pub total_positions: usize,
    pub covered_positions: usize,
    pub uncovered_positions: usize,
    pub percent_covered: f64,
}

impl SequenceStats {
    /// Format the covered percentage to one decimal place, e.g. `75.0%`.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent_covered)
    }
}

/// A maximal run of consecutive covered positions on one sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoverageSegment {
    pub seqname: String,
    pub start: Position,
    pub end: Position,
}

impl CoverageSegment {
    /// The width of the segment in basepairs. An isolated covered position
    /// has a span of zero.
    pub fn span(&self) -> Position {
        self.end - self.start
    }
}

/// Storage for a single sequence's depth rows, column-oriented.
///
/// Positions are 1-based and strictly increasing; `positions` and `depths`
/// always have the same length.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SequenceDepths {
    pub positions: Vec<Position>,
    pub depths: Vec<Depth>,
}

impl SequenceDepths {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            depths: Vec::new(),
        }
    }

    /// The number of positions with a depth row for this sequence.
    ///
    /// For `samtools depth -a` input this equals the sequence length in
    /// basepairs, since every position is emitted.
    pub fn total_positions(&self) -> usize {
        self.positions.len()
    }

    /// Count the positions whose depth strictly exceeds `min_depth`.
    pub fn covered_positions(&self, min_depth: Depth) -> usize {
        self.depths.iter().filter(|&&d| d > min_depth).count()
    }

    /// Group the covered positions into maximal runs of consecutive
    /// integers, returned as `(start, end)` pairs in position order.
    ///
    /// Two covered positions belong to the same run iff they differ by
    /// exactly one; any larger gap starts a new run. Single linear pass.
    pub fn covered_runs(&self, min_depth: Depth) -> Vec<(Position, Position)> {
        let mut runs: Vec<(Position, Position)> = Vec::new();
        for (&pos, &depth) in self.positions.iter().zip(self.depths.iter()) {
            if depth <= min_depth {
                continue;
            }
            match runs.last_mut() {
                Some((_, end)) if pos == *end + 1 => *end = pos,
                _ => runs.push((pos, pos)),
            }
        }
        runs
    }
}

/// A parsed depth table, grouped by sequence in first-appearance order.
pub struct DepthTable {
    pub map: GenomeMap<SequenceDepths>,
}

impl DepthTable {
    /// Read a `DepthTable` from a `samtools depth`-formatted file.
    ///
    /// This method also supports reading directly from a gzip-compressed
    /// file. The expected format is three tab-separated columns with no
    /// header:
    ///
    /// ```text
    /// chr1    1       5
    /// chr1    2       0
    /// chr1    3       6
    /// chr2    1       2
    /// ```
    ///
    /// Lines starting with `#` are skipped. Positions must be strictly
    /// increasing within each sequence; an out-of-order row aborts the
    /// read with [`CovMapError::DepthNotSorted`].
    pub fn from_depth_file(filepath: &str) -> Result<DepthTable, CovMapError> {
        let input_file = InputFile::new(filepath);
        let buf_reader = input_file.reader()?;

        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(buf_reader);

        let mut table = DepthTable {
            map: GenomeMap::new(),
        };

        for (i, result) in rdr.records().enumerate() {
            let line = i + 1;
            let record = result.map_err(CovMapError::DepthParsingError)?;

            // skip comment lines
            if record.get(0).map_or(false, |s| s.starts_with('#')) {
                continue;
            }

            let seqname = record.get(0).ok_or(CovMapError::MissingField(line))?.to_string();

            let pos_str = record.get(1).ok_or(CovMapError::MissingField(line))?;
            let pos: Position = pos_str.parse().map_err(|_| {
                CovMapError::ParseError(format!(
                    "Failed to parse position from string '{}' on line {}",
                    pos_str, line
                ))
            })?;

            let depth_str = record.get(2).ok_or(CovMapError::MissingField(line))?;
            let depth: Depth = depth_str.parse().map_err(|_| {
                CovMapError::ParseError(format!(
                    "Failed to parse depth from string '{}' on line {}",
                    depth_str, line
                ))
            })?;

            table.push(DepthRecord { seqname, pos, depth })?;
        }

        debug!("read depth table with {} sequences", table.len());
        Ok(table)
    }

    /// Build a `DepthTable` from in-memory records, with the same ordering
    /// validation as [`DepthTable::from_depth_file`].
    pub fn from_records<I>(records: I) -> Result<DepthTable, CovMapError>
    where
        I: IntoIterator<Item = DepthRecord>,
    {
        let mut table = DepthTable {
            map: GenomeMap::new(),
        };
        for record in records {
            table.push(record)?;
        }
        Ok(table)
    }

    /// Append one record, creating the sequence entry on first appearance.
    fn push(&mut self, record: DepthRecord) -> Result<(), CovMapError> {
        if let Some(seq) = self.map.get_mut(&record.seqname) {
            // positions must be strictly increasing within a sequence
            if seq.positions.last().map_or(false, |&last| record.pos <= last) {
                return Err(CovMapError::DepthNotSorted(record.seqname));
            }
            seq.positions.push(record.pos);
            seq.depths.push(record.depth);
        } else {
            let mut seq = SequenceDepths::new();
            seq.positions.push(record.pos);
            seq.depths.push(record.depth);
            self.map.insert(&record.seqname, seq)?;
        }
        Ok(())
    }

    /// Return the number of sequences in the depth table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Return if the depth table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over sequence name and [`SequenceDepths`] tuples, in the
    /// order sequences first appear in the input.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SequenceDepths)> {
        self.map.iter()
    }

    /// The length of each sequence, keyed by name in first-appearance
    /// order. Length is the number of depth rows (see
    /// [`SequenceDepths::total_positions`]).
    pub fn seqlens(&self) -> IndexMap<String, Position> {
        self.map
            .iter()
            .map(|(name, seq)| (name.clone(), seq.total_positions() as Position))
            .collect()
    }

    /// Compute per-sequence coverage statistics at the given depth cutoff.
    ///
    /// Key order preserves first appearance, which downstream layout uses
    /// as the row order of the figure.
    pub fn stats(&self, min_depth: Depth) -> Result<IndexMap<String, SequenceStats>, CovMapError> {
        let mut stats = IndexMap::new();
        for (name, seq) in self.map.iter() {
            let total = seq.total_positions();
            if total == 0 {
                return Err(CovMapError::NoPositions(name.clone()));
            }
            let covered = seq.covered_positions(min_depth);
            let percent = 100.0 * covered as f64 / total as f64;
            stats.insert(
                name.clone(),
                SequenceStats {
                    total_positions: total,
                    covered_positions: covered,
                    uncovered_positions: total - covered,
                    percent_covered: percent,
                },
            );
        }
        Ok(stats)
    }

    /// Extract the covered segments of every sequence, in row order then
    /// position order.
    pub fn segments(&self, min_depth: Depth) -> Vec<CoverageSegment> {
        let mut segments = Vec::new();
        for (name, seq) in self.map.iter() {
            for (start, end) in seq.covered_runs(min_depth) {
                segments.push(CoverageSegment {
                    seqname: name.clone(),
                    start,
                    end,
                });
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn chr1_records() -> Vec<DepthRecord> {
        [(1, 5), (2, 0), (3, 6), (4, 7)]
            .iter()
            .map(|&(pos, depth)| DepthRecord {
                seqname: "chr1".to_string(),
                pos,
                depth,
            })
            .collect()
    }

    #[test]
    fn test_stats_counts_and_percent() {
        let table = DepthTable::from_records(chr1_records()).unwrap();
        let stats = table.stats(0).unwrap();
        let chr1 = &stats["chr1"];
        assert_eq!(chr1.total_positions, 4);
        assert_eq!(chr1.covered_positions, 3);
        assert_eq!(chr1.uncovered_positions, 1);
        assert!((chr1.percent_covered - 75.0).abs() < 1e-10);
        assert_eq!(chr1.percent_label(), "75.0%");
        assert_eq!(
            chr1.covered_positions + chr1.uncovered_positions,
            chr1.total_positions
        );
    }

    #[test]
    fn test_segment_extraction() {
        let table = DepthTable::from_records(chr1_records()).unwrap();
        let segments = table.segments(0);
        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start, segments[0].end), (1, 1));
        assert_eq!((segments[1].start, segments[1].end), (3, 4));
        assert_eq!(segments[0].span(), 0);
        assert_eq!(segments[1].span(), 1);
        // non-adjacent: a gap of at least one position separates segments
        assert!(segments[0].end + 1 < segments[1].start);
    }

    #[test]
    fn test_extraction_idempotent() {
        let table = DepthTable::from_records(chr1_records()).unwrap();
        assert_eq!(table.segments(0), table.segments(0));
    }

    #[test]
    fn test_all_covered_single_segment() {
        let records = (1..=10).map(|pos| DepthRecord {
            seqname: "chr1".to_string(),
            pos,
            depth: 3,
        });
        let table = DepthTable::from_records(records).unwrap();
        let segments = table.segments(0);
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start, segments[0].end), (1, 10));
    }

    #[test]
    fn test_no_covered_positions() {
        let records = (1..=5).map(|pos| DepthRecord {
            seqname: "chr1".to_string(),
            pos,
            depth: 0,
        });
        let table = DepthTable::from_records(records).unwrap();
        assert!(table.segments(0).is_empty());
        let stats = table.stats(0).unwrap();
        assert_eq!(stats["chr1"].covered_positions, 0);
        assert!((stats["chr1"].percent_covered - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_min_depth_cutoff_is_strict() {
        // depth == min_depth does not count as covered
        let records = vec![
            DepthRecord {
                seqname: "chr1".to_string(),
                pos: 1,
                depth: 2,
            },
            DepthRecord {
                seqname: "chr1".to_string(),
                pos: 2,
                depth: 3,
            },
        ];
        let table = DepthTable::from_records(records).unwrap();
        let stats = table.stats(2).unwrap();
        assert_eq!(stats["chr1"].covered_positions, 1);
    }

    #[test]
    fn test_segments_union_matches_covered_set() {
        let depths = [0, 4, 4, 0, 7, 0, 1, 1, 1, 0];
        let records = depths.iter().enumerate().map(|(i, &depth)| DepthRecord {
            seqname: "chr1".to_string(),
            pos: (i + 1) as Position,
            depth,
        });
        let table = DepthTable::from_records(records).unwrap();
        let segments = table.segments(0);

        let mut from_segments: Vec<Position> = Vec::new();
        for seg in &segments {
            from_segments.extend(seg.start..=seg.end);
        }
        let covered: Vec<Position> = depths
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .map(|(i, _)| (i + 1) as Position)
            .collect();
        assert_eq!(from_segments, covered);
    }

    #[test]
    fn test_unsorted_input_rejected() {
        let records = vec![
            DepthRecord {
                seqname: "chr1".to_string(),
                pos: 5,
                depth: 1,
            },
            DepthRecord {
                seqname: "chr1".to_string(),
                pos: 4,
                depth: 1,
            },
        ];
        let result = DepthTable::from_records(records);
        assert!(matches!(result, Err(CovMapError::DepthNotSorted(_))));
    }

    #[test]
    fn test_from_depth_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("depth.tsv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# a comment").unwrap();
        writeln!(file, "chr1\t1\t5").unwrap();
        writeln!(file, "chr1\t2\t0").unwrap();
        writeln!(file, "chr2\t1\t3").unwrap();
        drop(file);

        let table = DepthTable::from_depth_file(path.to_str().unwrap()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());

        let seqlens = table.seqlens();
        let names: Vec<&String> = seqlens.keys().collect();
        assert_eq!(names, ["chr1", "chr2"]);
        assert_eq!(seqlens["chr1"], 2);
        assert_eq!(seqlens["chr2"], 1);

        dir.close().unwrap();
    }

    #[test]
    fn test_from_gzipped_depth_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempdir().unwrap();
        let path = dir.path().join("depth.tsv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        writeln!(encoder, "chr1\t1\t5").unwrap();
        writeln!(encoder, "chr1\t2\t8").unwrap();
        encoder.finish().unwrap();

        let table = DepthTable::from_depth_file(path.to_str().unwrap()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.seqlens()["chr1"], 2);

        dir.close().unwrap();
    }

    #[test]
    fn test_bad_depth_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("depth.tsv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chr1\t1\tnot-a-number").unwrap();
        drop(file);

        let result = DepthTable::from_depth_file(path.to_str().unwrap());
        match result {
            Err(CovMapError::ParseError(msg)) => assert!(msg.contains("line 1")),
            other => panic!("expected ParseError, got {:?}", other.map(|_| ())),
        }
        dir.close().unwrap();
    }
}
