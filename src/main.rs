// yolang: table-driven front end for the Yolang language

use std::fs;
use std::process::exit;

use anyhow::{Context, Result};
use clap::ArgMatches;

use yolang::config::{Config, Dialect, Entry};
use yolang::parser::parse::{Ast, Parser};
use yolang::parser::visitor::Printer;

use crate::cli_def::{input_path, main_command, DIALECT, DUMP_GRAMMAR, DUMP_TABLE, ENTRY};

mod cli_def;

/// The input does not parse
pub const DATA_ERROR: i32 = 65;
/// Grammar, wiring or builder failure
pub const SOFTWARE_ERROR: i32 = 70;

pub fn main() {
    let matches = main_command().get_matches();

    let env = env_logger::Env::default().filter("YOLANG_LOG").write_style("YOLANG_LOG_STYLE");
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Off)
        .parse_env(env)
        .init();

    match wrapped_main(&matches) {
        Ok(code) => exit(code),
        Err(err) => {
            for cause in err.chain() {
                eprintln!("error: {cause}");
            }
            exit(SOFTWARE_ERROR);
        }
    }
}

fn config(matches: &ArgMatches) -> Result<Config> {
    let dialect: Dialect = matches
        .get_one::<String>(DIALECT)
        .map_or(Ok(Dialect::default()), |s| s.parse())
        .map_err(anyhow::Error::msg)?;
    let entry: Entry = matches
        .get_one::<String>(ENTRY)
        .map_or(Ok(Entry::default()), |s| s.parse())
        .map_err(anyhow::Error::msg)?;
    Ok(Config::new(dialect, entry))
}

fn wrapped_main(matches: &ArgMatches) -> Result<i32> {
    let config = config(matches)?;
    let parser = Parser::new(&config).context("failed to build the parser")?;

    if matches.get_flag(DUMP_GRAMMAR) {
        print!("{}", parser.grammar());
    }
    if matches.get_flag(DUMP_TABLE) {
        print!("{}", parser.table());
    }

    let Some(path) = input_path(matches) else {
        return Ok(0);
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    log::info!("parsing {} as {} ({} dialect)", path.display(), config.entry, config.dialect);
    match parser.parse(&source) {
        Ok(Ast::Program(program)) => print!("{}", Printer::program(&program)),
        Ok(Ast::Statement(stmt)) => println!("{}", Printer::stmt(&stmt)),
        Ok(Ast::Expression(expr)) => println!("{}", Printer::expr(&expr)),
        Err(err) if err.is_user_error() => {
            eprintln!("{}: {err}", path.display());
            return Ok(DATA_ERROR);
        }
        Err(err) => return Err(err).with_context(|| format!("failed to parse {}", path.display())),
    }
    Ok(0)
}
