//! Command-line interface for rtfdiff
//! Compares one reference RTF document against one or more comparison documents.
//!
//! Usage:
//!   rtfdiff `<reference>` `<comparison>...` [--config `<file>`] [--format json|summary]
//!
//! Exit status is 0 when every comparison is identical to the reference, 1 when
//! at least one differs and 2 when the comparison could not be run.

use std::error::Error;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rtfdiff::{BatchRunner, DiffSegment, NamedDocument, Report, SegmentKind, Side};
use rtfdiff_config::Loader;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("rtfdiff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compare the text of RTF documents against a reference")
        .arg_required_else_help(true)
        .arg(
            Arg::new("reference")
                .help("Reference RTF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("comparison")
                .help("RTF files compared against the reference")
                .required(true)
                .num_args(1..)
                .index(2),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("patterns")
                .long("patterns")
                .help("YAML file with extra boilerplate patterns"),
        )
        .arg(
            Arg::new("ignore-case")
                .long("ignore-case")
                .short('i')
                .help("Compare case-insensitively")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-punctuation")
                .long("ignore-punctuation")
                .help("Drop punctuation and symbols before comparing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-boilerplate")
                .long("keep-boilerplate")
                .help("Compare headers, timestamps and page markers too")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-normalize-whitespace")
                .long("no-normalize-whitespace")
                .help("Treat whitespace differences as changes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("granularity")
                .long("granularity")
                .short('g')
                .help("Comparison unit")
                .value_parser(["word", "line"]),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["summary", "json"])
                .default_value("summary"),
        )
}

fn main() -> ExitCode {
    init_tracing();
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(report) if report.all_identical() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> Result<Report, Box<dyn Error>> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(path) = matches.get_one::<String>("patterns") {
        loader = loader.set_override("boilerplate.pattern_file", path.as_str())?;
    }
    if matches.get_flag("ignore-case") {
        loader = loader.set_override("normalization.ignore_case", true)?;
    }
    if matches.get_flag("ignore-punctuation") {
        loader = loader.set_override("normalization.ignore_punctuation", true)?;
    }
    if matches.get_flag("keep-boilerplate") {
        loader = loader.set_override("boilerplate.enabled", false)?;
    }
    if matches.get_flag("no-normalize-whitespace") {
        loader = loader.set_override("normalization.normalize_whitespace", false)?;
    }
    if let Some(granularity) = matches.get_one::<String>("granularity") {
        loader = loader.set_override("normalization.granularity", granularity.as_str())?;
    }
    let config = loader.build()?;
    tracing::debug!(?config, "loaded configuration");

    let reference = read_document(required(matches, "reference")?)?;
    let comparisons = matches
        .get_many::<String>("comparison")
        .into_iter()
        .flatten()
        .map(|path| read_document(path))
        .collect::<Result<Vec<_>, _>>()?;

    let runner = BatchRunner::new(&config.batch_options()).with_filter(config.boilerplate_filter()?);
    let report = runner.run(&reference, &comparisons)?;

    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("summary");
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", render_summary(&report)),
    }
    Ok(report)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String, Box<dyn Error>> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| format!("missing argument <{}>", name).into())
}

fn read_document(path: &str) -> Result<NamedDocument, Box<dyn Error>> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path, e))?;
    Ok(NamedDocument::new(path, bytes))
}

fn render_summary(report: &Report) -> String {
    let mut out = format!("Reference: {}\n", report.reference.name);
    for file in &report.files {
        let malformed = if file.extraction.is_malformed() {
            " [malformed]"
        } else {
            ""
        };
        if file.result.identical {
            out.push_str(&format!("{}: identical{}\n", file.identity.name, malformed));
            continue;
        }
        out.push_str(&format!(
            "{}: {} change(s){}\n",
            file.identity.name,
            file.result.counts.total_changes(),
            malformed
        ));
        for segment in file.result.changes() {
            out.push_str(&format!("  {}\n", describe(segment)));
        }
    }
    let summary = &report.summary;
    out.push_str(&format!(
        "{} compared, {} identical, {} different\n",
        summary.files_compared, summary.identical_files, summary.different_files
    ));
    out
}

fn describe(segment: &DiffSegment) -> String {
    match segment.kind {
        SegmentKind::Replaced => format!(
            "replaced: {:?} -> {:?}",
            segment.display_text(Side::Reference),
            segment.display_text(Side::Comparison)
        ),
        SegmentKind::Inserted => format!("inserted: {:?}", segment.comparison.text),
        SegmentKind::Deleted => format!("deleted: {:?}", segment.reference.text),
        SegmentKind::Equal => format!("equal: {:?}", segment.reference.text),
    }
}
