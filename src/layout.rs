//! The layout engine: maps sequence lengths, coverage segments, and a
//! target canvas size into exact pixel geometry, emitted as a buffered
//! list of [`DrawCommand`]s.

use indexmap::map::IndexMap;

use super::covmap::{CovMapError, Depth, DepthTable, Position};
use super::draw::{DrawCommand, Point, Rect};

/// Fixed inset keeping strokes from clipping the canvas edge.
const MARGIN: f64 = 5.0;
/// Horizontal gap between the longest sequence's end and the row labels.
const LABEL_X_OFFSET: f64 = 15.0;
/// Height of an axis tick stroke.
const TICK_HEIGHT: f64 = 3.0;
const TICK_LABEL_X_OFFSET: f64 = 6.0;
const TICK_LABEL_Y_OFFSET: f64 = 13.0;
/// The bounding box overhangs the nominal canvas width.
const BOX_X_OVERHANG: f64 = 10.0;
const MAIN_COLOR: &str = "black";

/// Rendering configuration, with defaults matching the CLI defaults.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Inclusive lower bound: a position counts as covered iff its depth
    /// strictly exceeds this.
    pub min_depth: Depth,
    /// Segments with a basepair span less than or equal to this are not
    /// drawn.
    pub min_segment_length: Position,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Fill color for covered segment bars (CSS name or hex).
    pub segment_color: String,
    /// Spacing of axis tick marks in basepairs.
    pub tick_interval: Position,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            min_depth: 0,
            min_segment_length: 0,
            canvas_width: 800,
            canvas_height: 600,
            segment_color: "black".to_string(),
            tick_interval: 500_000,
        }
    }
}

/// Scale factors and dimensions for one figure, computed once and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLayout {
    pub width: f64,
    pub height: f64,
    pub num_sequences: usize,
    pub max_seq_length: Position,
    /// Vertical extent of one sequence row in pixels.
    pub row_height: f64,
    /// Pixels per basepair.
    pub x_scale: f64,
    pub font_size: f64,
    pub tick_interval: Position,
}

impl CanvasLayout {
    /// Compute the layout for the given sequence lengths and canvas size.
    pub fn new(
        seqlens: &IndexMap<String, Position>,
        width: f64,
        height: f64,
        tick_interval: Position,
    ) -> Result<CanvasLayout, CovMapError> {
        let num_sequences = seqlens.len();
        if num_sequences == 0 {
            return Err(CovMapError::NoSequences);
        }
        let max_seq_length = seqlens.values().copied().max().unwrap_or(0);
        if max_seq_length == 0 {
            return Err(CovMapError::ZeroMaxLength);
        }
        let row_height = height / num_sequences as f64;
        Ok(CanvasLayout {
            width,
            height,
            num_sequences,
            max_seq_length,
            row_height,
            x_scale: width / max_seq_length as f64,
            font_size: (row_height * 0.9).floor(),
            tick_interval,
        })
    }

    /// The filled bar for a covered segment on the 0-based `row`.
    pub fn segment_rect(&self, row: usize, start: Position, end: Position) -> Rect {
        Rect::new(
            start as f64 * self.x_scale + MARGIN,
            row as f64 * self.row_height + MARGIN,
            (end - start) as f64 * self.x_scale,
            self.row_height * 0.5,
        )
    }

    /// The stroked outline spanning the full extent of the sequence on
    /// `row`.
    pub fn border_rect(&self, row: usize, seq_length: Position) -> Rect {
        Rect::new(
            MARGIN,
            row as f64 * self.row_height + MARGIN,
            seq_length as f64 * self.x_scale,
            self.row_height * 0.5,
        )
    }

    /// Anchor point of the stats label to the right of `row`.
    pub fn label_anchor(&self, row: usize) -> Point {
        Point::new(
            self.max_seq_length as f64 * self.x_scale + LABEL_X_OFFSET,
            (row + 1) as f64 * self.row_height - 0.2 * self.row_height + MARGIN,
        )
    }

    /// The y coordinate of the axis row below the last sequence row.
    fn axis_y(&self) -> f64 {
        self.num_sequences as f64 * self.row_height
    }
}

/// Format a tick position in megabases: shortest form for fractional
/// values (`0.5`), one forced decimal for whole megabases (`1.0`).
pub fn format_megabases(pos: Position) -> String {
    let mb = pos as f64 / 1_000_000.0;
    if mb.fract() == 0.0 {
        format!("{:.1}", mb)
    } else {
        format!("{}", mb)
    }
}

/// Lay out the whole coverage map as a list of drawing primitives:
/// covered-segment bars, per-sequence outlines and stats labels, the
/// bounding box, and megabase tick marks.
///
/// Geometry only; serialization is the caller's concern (see
/// [`render_svg`](crate::svg::render_svg)).
pub fn render_coverage_map(
    table: &DepthTable,
    options: &RenderOptions,
) -> Result<Vec<DrawCommand>, CovMapError> {
    let seqlens = table.seqlens();
    let stats = table.stats(options.min_depth)?;
    let segments = table.segments(options.min_depth);
    let layout = CanvasLayout::new(
        &seqlens,
        options.canvas_width as f64,
        options.canvas_height as f64,
        options.tick_interval,
    )?;

    // one row per sequence, in first-appearance order
    let rows: IndexMap<&str, usize> = seqlens
        .keys()
        .enumerate()
        .map(|(row, name)| (name.as_str(), row))
        .collect();

    let mut commands = Vec::with_capacity(segments.len() + 6 * seqlens.len());

    // covered segment bars
    for segment in &segments {
        if segment.span() <= options.min_segment_length {
            continue;
        }
        let row = *rows.get(segment.seqname.as_str()).ok_or_else(|| {
            CovMapError::InternalError(format!("no row for sequence '{}'", segment.seqname))
        })?;
        commands.push(DrawCommand::FillRect {
            rect: layout.segment_rect(row, segment.start, segment.end),
            color: options.segment_color.clone(),
        });
    }

    // sequence outlines and stats labels
    for (row, (name, seq_length)) in seqlens.iter().enumerate() {
        commands.push(DrawCommand::StrokeRect {
            rect: layout.border_rect(row, *seq_length),
            color: MAIN_COLOR.to_string(),
        });
        let stat = stats.get(name).ok_or_else(|| {
            CovMapError::InternalError(format!("no stats for sequence '{}'", name))
        })?;
        commands.push(DrawCommand::Text {
            position: layout.label_anchor(row),
            text: format!("{}: {}", name, stat.percent_label()),
            color: MAIN_COLOR.to_string(),
            font_size: layout.font_size,
        });
    }

    // bounding box around the whole figure
    let box_right = layout.width + BOX_X_OVERHANG;
    let box_bottom = layout.axis_y();
    let corners = [
        (Point::new(0.0, 0.0), Point::new(box_right, 0.0)),
        (Point::new(box_right, 0.0), Point::new(box_right, box_bottom)),
        (Point::new(box_right, box_bottom), Point::new(0.0, box_bottom)),
        (Point::new(0.0, box_bottom), Point::new(0.0, 0.0)),
    ];
    for (from, to) in corners {
        commands.push(DrawCommand::Line {
            from,
            to,
            color: MAIN_COLOR.to_string(),
        });
    }

    // megabase tick marks along the axis row
    let axis_y = layout.axis_y();
    let mut tick = layout.tick_interval;
    while tick < layout.max_seq_length {
        let x = tick as f64 * layout.x_scale;
        commands.push(DrawCommand::Line {
            from: Point::new(x, axis_y),
            to: Point::new(x, axis_y - TICK_HEIGHT),
            color: MAIN_COLOR.to_string(),
        });
        commands.push(DrawCommand::Text {
            position: Point::new(x - TICK_LABEL_X_OFFSET, axis_y + TICK_LABEL_Y_OFFSET),
            text: format_megabases(tick),
            color: MAIN_COLOR.to_string(),
            font_size: layout.font_size,
        });
        tick += layout.tick_interval;
    }

    Ok(commands)
}
