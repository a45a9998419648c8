use clap::{CommandFactory, Parser as CliParser, Subcommand, ValueEnum};
use clap_complete::Shell;
use hastack::codegen::{self, Target};
use hastack::interp::{self, Counts};
use hastack::typechecker::{DiagnosticMode, check_program};
use hastack::{Node, Parser, debugger, lex, repl};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::{fs, io, process};

#[derive(CliParser)]
#[command(
    name = "hastack",
    about = "The hastack concatenative language toolchain",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and type-check a source file
    Check { file: PathBuf },

    /// Compile a source file to host-language sources
    Compile {
        file: PathBuf,
        /// Host language to generate
        #[arg(long, value_enum, default_value = "c")]
        target: TargetArg,
        /// Base name for the generated program file
        #[arg(short, long, default_value = "out")]
        output: String,
    },

    /// Type-check and run a source file in the interpreter
    Run { file: PathBuf },

    /// Step through a source file one operation at a time
    Debug { file: PathBuf },

    /// Start the interactive shell
    Repl,

    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum TargetArg {
    #[default]
    C,
    Go,
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::C => Target::C,
            TargetArg::Go => Target::Go,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { file } => {
            load_checked(&file);
            println!("OK: {} type-checks", file.display());
        }

        Command::Compile {
            file,
            target,
            output,
        } => {
            let tree = load_checked(&file);
            let target = Target::from(target);
            match codegen::emit(&tree, target, &output, Path::new(".")) {
                Ok(written) => {
                    for path in &written {
                        println!("Wrote {}", path.display());
                    }
                    println!("Build with: {}", target.build_hint(&output));
                }
                Err(err) => {
                    eprintln!("{}", err);
                    process::exit(1);
                }
            }
        }

        Command::Run { file } => {
            let tree = load_checked(&file);
            let mut stack = Vec::new();
            let mut counts = Counts::default();
            let mut output = Vec::new();
            if let Err(err) = interp::eval(&tree, &mut stack, &mut counts, &mut output) {
                eprintln!("{}", err);
                process::exit(1);
            }
            for line in output {
                println!("{}", line);
            }
        }

        Command::Debug { file } => {
            let tree = load_checked(&file);
            if let Err(err) = debugger::run(&tree) {
                eprintln!("{}", err);
                process::exit(1);
            }
        }

        Command::Repl => {
            if let Err(err) = repl::run_repl() {
                eprintln!("error: {}", err);
                process::exit(1);
            }
        }

        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "hastack", &mut io::stdout());
        }
    }
}

/// Read, lex and parse a source file, exiting on any failure.
fn load(file: &Path) -> Rc<Node> {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {}", file.display(), err);
            process::exit(1);
        }
    };
    let tokens = lex(&file.to_string_lossy(), &source);
    match Parser::new(tokens).parse() {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

/// Load a file and require the whole program to check clean.
fn load_checked(file: &Path) -> Rc<Node> {
    let tree = load(file);
    if let Err(err) = check_program(&tree) {
        // Fatal mode prints the diagnostic and exits with status 1.
        let _ = DiagnosticMode::Fatal.report(err);
    }
    tree
}
