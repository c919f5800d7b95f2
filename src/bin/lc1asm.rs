// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::{self, File};
use std::io::{BufWriter, Write};

use clap::{arg, ArgMatches, Command};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::encode::pattern::PatternEncoder;

use lc1asm::error::AsmError;
use lc1asm::stmt::Stmt;
use lc1asm::{cfg, idconst, labels, parser, peephole, writer, Config};

const USAGE: &str = "\
lc1asm SOURCE_FILE...

return codes:
  0  success
  1  invalid input data or arguments
  2  internal error
";

fn main() {
    // Reproduce the original's bare-invocation help text exactly: this
    // happens before clap ever sees the arguments, since clap's own
    // "no positional args" handling doesn't match the intended wording.
    if std::env::args().count() == 1 {
        eprint!("{USAGE}");
        std::process::exit(1);
    }

    let matches = cli().get_matches();
    let verbose = matches.is_present("verbose");
    init_logging(if verbose { LevelFilter::Info } else { LevelFilter::Warn });

    match run(&matches) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("lc1asm: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn cli() -> Command {
    Command::new("lc1asm")
        .about("Assembler and optimizer for the LC1 teaching machine")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!(-o --output <PATH> "Write object output to PATH (default: stdout)").required(false))
        .arg(arg!(-U --unix2dos "Unix to DOS mode: append CR before each newline"))
        .arg(arg!(-v --verbose "Trace optimizer decisions to stderr"))
        .arg(arg!(--"O0" "Disable all optimizer passes"))
        .arg(arg!(--"OD" "Enable deep optimization"))
        .arg(arg!(<files> ... "Source files to assemble"))
}

fn run(matches: &ArgMatches) -> Result<(), AsmError> {
    let mut config = Config::default();
    if matches.is_present("O0") {
        config.disable_all_optimizations();
    }
    if matches.is_present("OD") {
        config.enable_deep();
    }
    config.unix2dos = matches.is_present("unix2dos");
    config.verbose = matches.is_present("verbose");

    let files: Vec<&String> = matches.get_many::<String>("files").unwrap().collect();
    let mut stmts: Vec<Stmt> = Vec::new();
    for file in files {
        read_file(file, &mut stmts);
    }

    if stmts.is_empty() {
        return Ok(());
    }

    run_pipeline(&mut stmts, &config)?;

    let mut sink: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    writer::write(&mut sink, &stmts, config.unix2dos)?;
    sink.flush()?;
    Ok(())
}

/// Parse one source file into `stmts`, printing (but not failing on)
/// any parse errors it contains. A missing file is a non-fatal warning,
/// matching the original's per-file `file not found` behavior.
fn read_file(path: &str, stmts: &mut Vec<Stmt>) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => {
            log::warn!("{path}: file not found");
            return;
        }
    };
    let (mut parsed, errors) = parser::parse(&source);
    for e in &errors {
        eprintln!("lc1asm: {path}: {e}");
    }
    stmts.append(&mut parsed);
}

fn run_pipeline(stmts: &mut Vec<Stmt>, config: &Config) -> Result<(), AsmError> {
    if config.peephole {
        peephole::optimize(stmts, config.verbose);
    }
    if config.deep {
        cfg::optimize(stmts, config.verbose);
        if config.peephole {
            peephole::optimize(stmts, config.verbose);
        }
    }

    let mut label_map = labels::build_map(stmts);
    labels::resolve(stmts, &label_map)?;

    if config.idconst {
        let reuse = idconst::find_reusable(stmts, config.verbose);
        label_map.extend(reuse);
    }
    labels::materialize_idconsts(stmts, &mut label_map);
    Ok(())
}

fn init_logging(level: LevelFilter) {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {m}{n}")))
        .build();
    let config = log4rs::Config::builder()
        .appender(log4rs::config::Appender::builder().build("stderr", Box::new(stderr)))
        .build(log4rs::config::Root::builder().appender("stderr").build(level))
        .expect("static logging configuration is always valid");
    let _ = log4rs::init_config(config);
}
