use clap::Parser;
use covmap::prelude::*;
use log::info;
use std::io::Write;

const INFO: &str = "\
covmap: draw covered regions of a genome

Reads a samtools depth output file (plaintext or gzip-compressed) and
draws a to-scale SVG map of the covered segments of each sequence,
with per-sequence coverage percentages and megabase tick marks.
";

#[derive(Parser)]
#[clap(name = "covmap", version)]
#[clap(about = INFO)]
struct Cli {
    /// samtools depth output file
    #[arg(value_name = "DEPTH-FILE", required = true)]
    depth: String,

    /// set threshold for min depth cutoff
    #[arg(long, value_name = "INT", default_value_t = 0)]
    mindepth: Depth,

    /// save SVG output as specified file
    #[arg(long, value_name = "FILE", default_value = "map.svg")]
    out: String,

    /// specify width and height of SVG in pixels
    #[arg(long, value_name = "WIDExHIGH", default_value = "800x600")]
    size: String,

    /// specify minimum length of segment in bp to display
    #[arg(long, value_name = "LEN", default_value_t = 0)]
    minlen: Position,

    /// specify colour of covered regions (name or HEX)
    #[arg(long, value_name = "COLOUR", default_value = "black")]
    colour: String,

    /// spacing of axis tick marks in bp
    #[arg(long, value_name = "BP", default_value_t = 500_000)]
    tick_interval: Position,
}

/// Parse a `WIDTHxHEIGHT` canvas size, e.g. `800x600`.
fn parse_size(size: &str) -> Result<(u32, u32), CovMapError> {
    let err = || CovMapError::ParseError(format!("Failed to parse canvas size '{}'", size));
    let (width_str, height_str) = size.split_once('x').ok_or_else(err)?;
    let width: u32 = width_str.parse().map_err(|_| err())?;
    let height: u32 = height_str.parse().map_err(|_| err())?;
    Ok((width, height))
}

fn run() -> Result<(), CovMapError> {
    let cli = Cli::parse();
    let (width, height) = parse_size(&cli.size)?;

    let table = DepthTable::from_depth_file(&cli.depth)?;
    let options = RenderOptions {
        min_depth: cli.mindepth,
        min_segment_length: cli.minlen,
        canvas_width: width,
        canvas_height: height,
        segment_color: cli.colour,
        tick_interval: cli.tick_interval,
    };
    let commands = render_coverage_map(&table, &options)?;

    info!("drawing SVG to {} ...", cli.out);
    let svg = render_svg(&commands, width as f64, height as f64);
    let output = OutputFile::new(&cli.out);
    let mut writer = output.writer()?;
    writer.write_all(svg.as_bytes())?;
    writer.flush()?;
    info!("done");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
