// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use indoc::{eprintdoc, indoc};
use ucd_width_sweep::hash::RunSeed;
use ucd_width_sweep::sweep;
use ucd_width_sweep::ucd::UcdDocument;
use ucd_width_sweep::width::{self, ExtractOptions};

const DEFAULT_INPUT: &str = "ucd.nounihan.grouped.xml";

const HELP: &str = indoc! {"
    Usage: ucd-width-sweep [options...] [<ucd.nounihan.grouped.xml> [<overrides.xml>...]]
      -h, --help              Prints help information
      --no-ambiguous          Treat all ambiguous characters as narrow
      --emoji-presentation    Treat characters with Emoji=Y and EPres=Y as wide
      --packed-index          Add a column with the size of a bit-packed index
      --dump=<path>           Write the raw width table to <path>, one byte per codepoint
      --seed=<hex>            Hash blocks with a fixed seed instead of a random one
      --verbose               Print details about the input to stderr

    Later inputs override earlier ones. Running without any arguments prints
    the reference report for ./ucd.nounihan.grouped.xml. Download it at:
      https://www.unicode.org/Public/UCD/latest/ucdxml/ucd.nounihan.grouped.zip
"};

#[derive(Debug, Default)]
struct Args {
    inputs: Vec<PathBuf>,
    options: ExtractOptions,
    packed_index: bool,
    dump: Option<PathBuf>,
    seed: Option<RunSeed>,
    verbose: bool,
}

fn main() -> ExitCode {
    if execute(pico_args::Arguments::from_env(), &mut std::io::stdout().lock()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// Errors take the place of the report in `out`.
fn execute(args: pico_args::Arguments, out: &mut impl Write) -> bool {
    match run(args, out) {
        Ok(()) => true,
        Err(err) => {
            _ = writeln!(out, "{err:#}");
            false
        }
    }
}

fn run(mut args: pico_args::Arguments, out: &mut impl Write) -> anyhow::Result<()> {
    if args.contains(["-h", "--help"]) {
        eprint!("{HELP}");
        return Ok(());
    }
    let args = parse_args(args)?;

    let mut documents = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        documents.push(UcdDocument::read(path)?);
    }

    let table = width::extract(&documents, &args.options)?;
    let seed = args.seed.unwrap_or_else(RunSeed::random);

    if args.verbose {
        print_summary(&documents, seed);
    }

    if let Some(path) = &args.dump {
        std::fs::write(path, table.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let rows = sweep::sweep(table.as_bytes(), seed);
    let report = sweep::render_report(&rows, args.packed_index);
    out.write_all(report.as_bytes())?;
    Ok(())
}

fn parse_args(mut args: pico_args::Arguments) -> anyhow::Result<Args> {
    let mut out = Args {
        options: ExtractOptions {
            no_ambiguous: args.contains("--no-ambiguous"),
            emoji_presentation: args.contains("--emoji-presentation"),
        },
        packed_index: args.contains("--packed-index"),
        verbose: args.contains("--verbose"),
        dump: args.opt_value_from_os_str("--dump", |s| -> Result<PathBuf, &'static str> {
            Ok(s.into())
        })?,
        seed: args.opt_value_from_fn("--seed", parse_seed)?,
        ..Default::default()
    };

    for arg in args.finish() {
        if arg.to_string_lossy().starts_with('-') {
            bail!("unrecognized argument: {:?}", arg);
        }
        out.inputs.push(arg.into());
    }
    if out.inputs.is_empty() {
        out.inputs.push(DEFAULT_INPUT.into());
    }

    Ok(out)
}

fn parse_seed(arg: &str) -> Result<RunSeed, String> {
    let digits = arg.strip_prefix("0x").unwrap_or(arg);
    // from_str_radix() would also accept a leading '+'.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid seed: {arg:?}"));
    }
    u64::from_str_radix(digits, 16).map(RunSeed::fixed).map_err(|err| err.to_string())
}

fn print_summary(documents: &[UcdDocument], seed: RunSeed) {
    let description = documents.first().map(|d| d.description.as_str()).unwrap_or_default();
    let groups: usize = documents.iter().map(|d| d.groups.len()).sum();
    let entries: usize = documents.iter().map(UcdDocument::entry_count).sum();

    eprintdoc!(
        "
        ucd-width-sweep on {}
          source:  {}
          inputs:  {} document(s), {} groups, {} entries
          seed:    {}
        ",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        description,
        documents.len(),
        groups,
        entries,
        seed,
    );
}
