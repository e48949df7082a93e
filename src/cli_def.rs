use std::path::PathBuf;

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command, ValueHint};

pub const INPUT: &str = "input";
pub const DIALECT: &str = "dialect";
pub const ENTRY: &str = "entry";
pub const DUMP_GRAMMAR: &str = "dump-grammar";
pub const DUMP_TABLE: &str = "dump-table";

pub fn main_command() -> Command {
    Command::new("yolang")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse a Yolang source file and print its syntax tree.")
        .args([input(), dialect(), entry(), dump_grammar(), dump_table()])
        .arg_required_else_help(true)
}

fn input() -> Arg {
    Arg::new(INPUT)
        .help("The Yolang source file.")
        .value_parser(ValueParser::path_buf())
        .value_name("FILE")
        .value_hint(ValueHint::FilePath)
        .required_unless_present_any([DUMP_GRAMMAR, DUMP_TABLE])
}

fn dialect() -> Arg {
    Arg::new(DIALECT)
        .long(DIALECT)
        .short('d')
        .help("Language dialect.")
        .value_parser(["basic", "arrays"])
        .default_value("arrays")
        .num_args(1)
}

fn entry() -> Arg {
    Arg::new(ENTRY)
        .long(ENTRY)
        .short('e')
        .help("What the input contains.")
        .long_help("What the input contains.\nA whole program, a single statement or a single expression.")
        .value_parser(["program", "statement", "expression"])
        .default_value("program")
        .num_args(1)
}

fn dump_grammar() -> Arg {
    flag(DUMP_GRAMMAR).help("Print the grammar productions.")
}

fn dump_table() -> Arg {
    flag(DUMP_TABLE).help("Print the compiled parse table.")
}

fn flag(name: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).required(false)
}

pub fn input_path(matches: &clap::ArgMatches) -> Option<&PathBuf> {
    matches.get_one::<PathBuf>(INPUT)
}
