use clap::Parser;
use doc_engine::document_model::{CommentMarkers, LineMatcher, PlainMatcher, RegexMatcher};
use doc_engine::{Document, LineEnding, RcLoader};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Load a text file, transform it and write it back out.
#[derive(Parser, Debug)]
#[command(name = "doc-engine", version, about)]
struct Cli {
    /// File to open; a missing file starts empty
    file: PathBuf,

    /// Read settings from this rc file instead of .docenginerc
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tab width, overriding the rc file
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    tab_width: Option<u8>,

    /// Line ending to write with
    #[arg(long, value_parser = ["unix", "dos", "mac"])]
    eol: Option<String>,

    /// Reflow lines wider than this many columns
    #[arg(long, value_name = "COLUMN")]
    wrap: Option<usize>,

    /// Indent every line by this many levels
    #[arg(long, value_name = "LEVELS", conflicts_with = "unindent")]
    indent: Option<u8>,

    /// Unindent every line by this many levels
    #[arg(long, value_name = "LEVELS")]
    unindent: Option<u8>,

    /// Comment every line with this marker
    #[arg(long, value_name = "MARKER", conflicts_with = "uncomment")]
    comment: Option<String>,

    /// Remove this comment marker from every line
    #[arg(long, value_name = "MARKER")]
    uncomment: Option<String>,

    /// Print every match of this pattern
    #[arg(long)]
    search: Option<String>,

    /// Treat the search pattern as a regular expression
    #[arg(long, requires = "search")]
    regex: bool,

    /// Case-insensitive search
    #[arg(short = 'i', long, requires = "search")]
    ignore_case: bool,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn transforms(&self) -> bool {
        self.eol.is_some()
            || self.wrap.is_some()
            || self.indent.is_some()
            || self.unindent.is_some()
            || self.comment.is_some()
            || self.uncomment.is_some()
    }
}

/// Run `apply` with the whole document selected.
fn for_all_lines(
    doc: &mut Document,
    apply: impl FnOnce(&mut Document) -> Result<(), doc_engine::EditError>,
) -> Result<(), doc_engine::EditError> {
    doc.select_all();
    let result = apply(doc);
    doc.clear_selection();
    result
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RcLoader::load_from(path)?,
        None => RcLoader::load_config(),
    };
    if let Some(width) = cli.tab_width {
        config.tab_width = usize::from(width);
    }

    let mut doc = Document::with_config(config);
    if cli.file.exists() {
        doc.load_file(&cli.file)?;
    } else {
        info!(path = %cli.file.display(), "new file");
        doc.set_filename(Some(cli.file.clone()));
    }
    debug!(lines = doc.line_count(), eol = doc.line_ending().name(), "loaded");

    if let Some(eol) = cli.eol.as_deref().and_then(LineEnding::from_name) {
        doc.set_line_ending(eol);
    }
    if let Some(levels) = cli.indent {
        for_all_lines(&mut doc, |d| d.do_indent(0, i32::from(levels)))?;
    }
    if let Some(levels) = cli.unindent {
        for_all_lines(&mut doc, |d| d.do_indent(0, -i32::from(levels)))?;
    }
    if let Some(marker) = &cli.comment {
        doc.set_comment_markers(CommentMarkers::single_line(marker));
        for_all_lines(&mut doc, |d| d.do_comment(0, 1).map(|_| ()))?;
    }
    if let Some(marker) = &cli.uncomment {
        doc.set_comment_markers(CommentMarkers::single_line(marker));
        for_all_lines(&mut doc, |d| d.do_comment(0, -1).map(|_| ()))?;
    }
    if let Some(column) = cli.wrap {
        doc.wrap_text(0, doc.last_line(), column);
    }

    if let Some(pattern) = &cli.search {
        let matcher: Box<dyn LineMatcher> = if cli.regex {
            Box::new(RegexMatcher::new(pattern, !cli.ignore_case)?)
        } else {
            Box::new(PlainMatcher::new(pattern, !cli.ignore_case)?)
        };
        let matches = doc.search_all(matcher.as_ref());
        info!(count = matches.len(), "search finished");
        for m in matches {
            let text = doc.line_text(m.line).unwrap_or_default();
            println!("{}:{}: {}", m.line + 1, m.column + 1, text);
        }
    }

    match &cli.output {
        Some(path) => {
            let bytes = doc.save_as(path.clone())?;
            info!(path = %path.display(), bytes, "written");
        }
        None if cli.transforms() => print!("{}", doc.text_with_line_ending()),
        None => {}
    }

    Ok(())
}
