use std::{io::Read, path::PathBuf, process};

use clap::Parser;
use log::LevelFilter;

use texvc::{AttrMap, MathDisplay, OutputForm, TexConfig, TexConverter, TexError};

mod config_file;

use config_file::load_config_file;

/// Converts texvc-style LaTeX formulas to canonical TeX or MathML
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Specifies a single LaTeX formula; read from stdin if absent
    #[arg(short, long)]
    formula: Option<String>,

    /// Output the canonical TeX text instead of MathML
    #[arg(short, long)]
    tex: bool,

    /// Sets the display style for the formula to "inline"
    #[arg(short, long, group = "mode")]
    inline: bool,

    /// Sets the display style for the formula to "block"
    #[arg(short, long, group = "mode")]
    block: bool,

    /// Adds an attribute to the rendered formula; can be repeated
    #[arg(short, long = "attr", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    attrs: Vec<(String, String)>,

    /// Loads the converter configuration from a TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Allows chemistry notation with \ce
    #[arg(long)]
    mhchem: bool,

    /// Logs diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

fn main() {
    let args = Args::parse();
    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Trace);
    }
    logger.init();

    let mut config = match args.config {
        Some(ref path) => load_config_file(path)
            .unwrap_or_else(|e| exit_error(&e))
            .texvc,
        None => TexConfig::default(),
    };
    config.use_mhchem |= args.mhchem;
    let converter = TexConverter::new(config);

    let latex = match args.formula {
        Some(ref formula) => formula.clone(),
        None => read_stdin(),
    };
    let form = if args.tex {
        OutputForm::Tex
    } else {
        OutputForm::MathML
    };
    let display = if args.block {
        MathDisplay::Block
    } else {
        MathDisplay::Inline
    };
    let attrs = AttrMap::from(args.attrs);

    match converter.convert(latex.trim_end(), form, display, &attrs) {
        Ok(output) => println!("{output}"),
        Err(e) => exit_tex_error(&e, latex.trim_end()),
    }
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
        exit_error(&e);
    }
    buffer
}

fn exit_tex_error(e: &TexError, source: &str) -> ! {
    let report = e.to_report("<input>", true);
    if report
        .eprint(("<input>", ariadne::Source::from(source)))
        .is_err()
    {
        eprintln!("Conversion error: {e}");
    }
    process::exit(2);
}

fn exit_error(e: &dyn std::error::Error) -> ! {
    eprintln!("Error: {e}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_val("class=big"),
            Ok(("class".to_string(), "big".to_string()))
        );
        assert_eq!(
            parse_key_val("style=a=b"),
            Ok(("style".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn parse_arguments() {
        let args = Args::try_parse_from([
            "texvc", "-f", r"\frac12", "--block", "--attr", "id=eq", "-a", "class=x",
        ])
        .unwrap();
        assert_eq!(args.formula.as_deref(), Some(r"\frac12"));
        assert!(args.block);
        assert!(!args.tex);
        assert_eq!(args.attrs.len(), 2);
        assert!(!args.verbose);
        let args = Args::try_parse_from(["texvc", "-v", "-f", "x"]).unwrap();
        assert!(args.verbose);
        assert!(Args::try_parse_from(["texvc", "--inline", "--block"]).is_err());
    }
}
