use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use latex_access::{TranslatingReader, Translator};
use log::debug;

/// Translate LaTeX into braille math code or speech using translation tables
#[derive(Parser, Debug)]
#[command(name = "latex-access", version)]
struct Cli {
    /// Translation table file, may be repeated; later tables override earlier ones
    #[arg(short = 't', long = "table", value_name = "FILE")]
    tables: Vec<PathBuf>,

    /// Text emitted around each substitution
    #[arg(short = 's', long, default_value = "")]
    separator: String,

    /// Drop `$` signs from the output
    #[arg(short = 'd', long)]
    remove_dollars: bool,

    /// LaTeX to translate, one output line each. Reads stdin line by line when absent.
    latex: Vec<String>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut translator = Translator::new()
        .with_separator(cli.separator)
        .with_remove_dollars(cli.remove_dollars);
    let entries = translator.load_files(&cli.tables)?;
    debug!("{} table entries from {} files", entries, cli.tables.len());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if cli.latex.is_empty() {
        let mut reader = TranslatingReader::new(io::stdin().lock(), &translator);
        io::copy(&mut reader, &mut out)?;
    } else {
        for line in &cli.latex {
            writeln!(out, "{}", translator.translate(line))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("latex-access: {err}");
            ExitCode::FAILURE
        }
    }
}
