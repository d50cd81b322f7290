// main.rs      gifcut command
//
// Copyright (c) 2026  gifcut developers
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifcut::block::{DisposalMethod, Frame};
use gifcut::Document;
use std::error::Error;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &'static str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        ("split", Some(matches)) => split(&mut out, matches)?,
        ("join", Some(matches)) => join(&mut out, matches)?,
        ("animate", Some(matches)) => animate(&mut out, matches)?,
        ("resize", Some(matches)) => resize(&mut out, matches)?,
        ("cat", Some(matches)) => cat(matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    let output = Arg::with_name("output")
        .short("o")
        .long("output")
        .takes_value(true)
        .required(true)
        .help("output file");
    let delay = Arg::with_name("delay")
        .short("d")
        .long("delay")
        .takes_value(true)
        .default_value("10")
        .help("frame delay (centiseconds)");
    let once = Arg::with_name("once")
        .long("once")
        .help("play animation once instead of looping");
    App::new("gifcut")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF animation utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF frame table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("split")
                .about("Split frames into separate GIFs")
                .arg(Arg::with_name("file").required(true).help("input file"))
                .arg(
                    Arg::with_name("prefix")
                        .short("p")
                        .long("prefix")
                        .takes_value(true)
                        .default_value("frame")
                        .help("output file prefix"),
                ),
        )
        .subcommand(
            SubCommand::with_name("join")
                .about("Join GIFs into an animation")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                )
                .arg(output.clone())
                .arg(delay.clone())
                .arg(once.clone()),
        )
        .subcommand(
            SubCommand::with_name("animate")
                .about("Set animation timing")
                .arg(Arg::with_name("file").required(true).help("input file"))
                .arg(output.clone())
                .arg(delay)
                .arg(once),
        )
        .subcommand(
            SubCommand::with_name("resize")
                .about("Resize all frames")
                .arg(Arg::with_name("file").required(true).help("input file"))
                .arg(output)
                .arg(
                    Arg::with_name("size")
                        .short("s")
                        .long("size")
                        .takes_value(true)
                        .required_unless("ratio")
                        .help("new size (WxH)"),
                )
                .arg(
                    Arg::with_name("ratio")
                        .short("r")
                        .long("ratio")
                        .takes_value(true)
                        .conflicts_with("size")
                        .help("new size (percent)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("cat")
                .about("Write GIF with content type header to stdout")
                .arg(Arg::with_name("file").required(true).help("input file")),
        )
}

/// Get the output path
fn output_path<'a>(matches: &'a ArgMatches) -> &'a OsStr {
    matches.value_of_os("output").unwrap_or_default()
}

/// Get animation arguments: delay and looping
fn animation(matches: &ArgMatches) -> Result<(u16, bool), Box<dyn Error>> {
    let delay = matches.value_of("delay").unwrap_or("10").parse()?;
    let looping = !matches.is_present("once");
    Ok((delay, looping))
}

/// Report a written file
fn report(
    out: &mut StandardStream,
    path: &Path,
    doc: &Document,
) -> Result<(), Box<dyn Error>> {
    let mut green = ColorSpec::new();
    green.set_fg(Some(Color::Green)).set_intense(true);
    out.set_color(&green)?;
    let (width, height) = doc.size();
    writeln!(
        out,
        "{}: {}x{}, frames: {}",
        path.display(),
        width,
        height,
        doc.frame_count()
    )?;
    Ok(())
}

/// Handle split subcommand
fn split(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let path = matches.value_of_os("file").unwrap_or_default();
    let prefix = matches.value_of("prefix").unwrap_or("frame");
    let doc = Document::open(path)?;
    let digits = doc.frame_count().to_string().len().max(3);
    for (n, slice) in doc.slices().enumerate() {
        let name = format!("{}{:0w$}.gif", prefix, n, w = digits);
        let path = Path::new(&name);
        slice.save(path)?;
        report(out, path, &slice)?;
    }
    Ok(())
}

/// Handle join subcommand
fn join(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let mut paths = match matches.values_of_os("files") {
        Some(paths) => paths,
        None => return Ok(()),
    };
    let (delay, looping) = animation(matches)?;
    let mut doc = match paths.next() {
        Some(path) => Document::open(path)?,
        None => return Ok(()),
    };
    for path in paths {
        doc.add_image(&Document::open(path)?, 0, 0);
    }
    doc.set_animation(delay, false, looping);
    let path = Path::new(output_path(matches));
    doc.save(path)?;
    report(out, path, &doc)
}

/// Handle animate subcommand
fn animate(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let path = matches.value_of_os("file").unwrap_or_default();
    let (delay, looping) = animation(matches)?;
    let mut doc = Document::open(path)?;
    doc.set_animation(delay, false, looping);
    let path = Path::new(output_path(matches));
    doc.save(path)?;
    report(out, path, &doc)
}

/// Handle resize subcommand
fn resize(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let path = matches.value_of_os("file").unwrap_or_default();
    let mut doc = Document::open(path)?;
    if let Some(ratio) = matches.value_of("ratio") {
        doc.resize_ratio(ratio.parse()?)?;
    } else {
        let size = matches.value_of("size").unwrap_or_default();
        let (width, height) = parse_size(size)?;
        doc.resize(width, height)?;
    }
    let path = Path::new(output_path(matches));
    doc.save(path)?;
    report(out, path, &doc)
}

/// Parse a size argument (WxH)
fn parse_size(size: &str) -> Result<(u16, u16), Box<dyn Error>> {
    match size.split_once('x') {
        Some((w, h)) => Ok((w.trim().parse()?, h.trim().parse()?)),
        None => Err(format!("invalid size: {}", size).into()),
    }
}

/// Handle cat subcommand
fn cat(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = matches.value_of_os("file").unwrap_or_default();
    let doc = Document::open(path)?;
    let stdout = io::stdout();
    doc.display(stdout.lock())?;
    Ok(())
}

/// Text styles for the frame table
struct Styles {
    title: ColorSpec,
    plain: ColorSpec,
    strong: ColorSpec,
    warn: ColorSpec,
}

impl Default for Styles {
    fn default() -> Self {
        let mut title = ColorSpec::new();
        title.set_fg(Some(Color::Yellow)).set_intense(true);
        let mut plain = ColorSpec::new();
        plain.set_fg(Some(Color::White));
        let mut strong = ColorSpec::new();
        strong
            .set_fg(Some(Color::White))
            .set_bold(true)
            .set_intense(true);
        let mut warn = ColorSpec::new();
        warn.set_fg(Some(Color::Red)).set_intense(true);
        Styles {
            title,
            plain,
            strong,
            warn,
        }
    }
}

/// Table cell; highlighted when it differs from the usual value
struct Cell {
    text: String,
    highlight: bool,
}

impl Cell {
    fn new<T: ToString>(text: T, highlight: bool) -> Self {
        Cell {
            text: text.to_string(),
            highlight,
        }
    }
}

/// Frame table column headings
const COLUMNS: [&str; 7] =
    ["#", "delay", "disp", "size", "pos", "colors", "trn"];

/// Make one table row for a frame
fn frame_row(n: usize, frame: &Frame, doc: &Document) -> Vec<Cell> {
    let desc = &frame.image_desc;
    let gc = &frame.graphic_control_ext;
    let delay = gc.delay_time_cs();
    let disposal = match gc.disposal_method() {
        DisposalMethod::NoAction => "none".to_string(),
        DisposalMethod::Keep => "keep".to_string(),
        DisposalMethod::Background => "bg".to_string(),
        DisposalMethod::Previous => "prev".to_string(),
        DisposalMethod::Reserved(v) => format!("?{}", v),
    };
    let full = (desc.width(), desc.height()) == doc.size();
    let origin = desc.left() == 0 && desc.top() == 0;
    let colors = match &frame.local_color_table {
        Some(tbl) => Cell::new(tbl.len(), true),
        None => Cell::new(format!("{}g", doc.global_color_table.len()), false),
    };
    let number = if desc.interlaced() {
        format!("{}i", n)
    } else {
        n.to_string()
    };
    let transparent = match gc.transparent_color() {
        Some(t) => Cell::new(t, true),
        None => Cell::new("-", false),
    };
    let disposed = gc.disposal_method() != DisposalMethod::NoAction;
    vec![
        Cell::new(number, true),
        Cell::new(format!("{}.{:02}", delay / 100, delay % 100), delay > 0),
        Cell::new(disposal, disposed),
        Cell::new(format!("{}x{}", desc.width(), desc.height()), !full),
        Cell::new(format!("{},{}", desc.left(), desc.top()), !origin),
        colors,
        transparent,
    ]
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let styles = Styles::default();
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            let doc = Document::open(path)?;
            out.set_color(&styles.title)?;
            writeln!(out, "{}", Path::new(path).display())?;
            show_summary(out, &styles, &doc)?;
            show_frames(out, &styles, &doc)?;
        }
    }
    Ok(())
}

/// Show document summary and comments
fn show_summary(
    out: &mut StandardStream,
    styles: &Styles,
    doc: &Document,
) -> Result<(), Box<dyn Error>> {
    if let Err(e) = doc.header.validate() {
        out.set_color(&styles.warn)?;
        writeln!(out, "  bad header: {}", e)?;
    }
    let (width, height) = doc.size();
    let flags: String = gifcut::bits(doc.screen_desc.flags())
        .iter()
        .map(|b| if *b { '1' } else { '0' })
        .collect();
    let repeat = match doc.loop_count() {
        Some(0) => "forever".to_string(),
        Some(c) => c.to_string(),
        None => "no".to_string(),
    };
    out.set_color(&styles.strong)?;
    writeln!(
        out,
        "  {} | {}x{} [{}] | {} frames | repeat: {}",
        String::from_utf8_lossy(doc.header.signature()),
        width,
        height,
        flags,
        doc.frame_count(),
        repeat,
    )?;
    out.set_color(&styles.plain)?;
    let text = doc.comments.iter().flat_map(|c| c.comments());
    for line in text.flat_map(|c| {
        String::from_utf8_lossy(c)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    }) {
        writeln!(out, "  # {}", line)?;
    }
    Ok(())
}

/// Show frame table, with columns sized to fit
fn show_frames(
    out: &mut StandardStream,
    styles: &Styles,
    doc: &Document,
) -> Result<(), Box<dyn Error>> {
    let rows: Vec<Vec<Cell>> = doc
        .frames()
        .iter()
        .enumerate()
        .map(|(n, f)| frame_row(n, f, doc))
        .collect();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.text.chars().count());
        }
    }
    out.set_color(&styles.title)?;
    for (col, w) in COLUMNS.iter().zip(&widths) {
        write!(out, " {:>w$}", col, w = w)?;
    }
    writeln!(out)?;
    for row in rows {
        for (cell, w) in row.iter().zip(&widths) {
            let style = if cell.highlight {
                &styles.strong
            } else {
                &styles.plain
            };
            out.set_color(style)?;
            write!(out, " {:>w$}", cell.text, w = w)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
