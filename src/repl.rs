/**
Interactive shell for hastack

Each input line is lexed, parsed against a persistent macro table, checked
in recoverable mode against the persistent abstract stack, then evaluated
against the persistent value stack. A type error discards the line and
resets both stacks; the session itself always survives. Line history lives
in `~/.hastack_history`.
*/
use crate::debugger::render_stack;
use crate::interp::{Counts, Value, eval};
use crate::parser::lexer::lex;
use crate::parser::parser::{MacroTable, Parser};
use crate::typechecker::checker::TypeChecker;
use crate::typechecker::types::Type;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

const PROMPT: &str = "hastack> ";

/// Session state carried across input lines.
pub struct Repl {
    checker: TypeChecker,
    macros: MacroTable,
    type_stack: Vec<Type>,
    value_stack: Vec<Value>,
}

impl Repl {
    pub fn new() -> Self {
        Repl {
            checker: TypeChecker::new(),
            macros: MacroTable::new(),
            type_stack: Vec::new(),
            value_stack: Vec::new(),
        }
    }

    /// Process one line and return what should be printed for it.
    pub fn eval_line(&mut self, line: &str) -> Vec<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        match trimmed {
            ":stack" | ":s" => return vec![render_stack(&self.value_stack)],
            ":help" | ":h" | "help" => return help_lines(),
            _ => {}
        }

        let tokens = lex("<shell>", trimmed);
        let mut parser = Parser::with_macros(tokens, std::mem::take(&mut self.macros));
        let parsed = parser.parse();
        self.macros = parser.into_macros();
        let tree = match parsed {
            // A parse error discards only the line; both stacks survive.
            Ok(tree) => tree,
            Err(err) => return vec![err.to_string()],
        };

        // Recoverable checking: a diagnostic resets the session's stacks
        // instead of terminating the process.
        let new_types = match self.checker.run(&tree, self.type_stack.clone()) {
            Ok(types) => types,
            Err(err) => {
                self.reset();
                return vec![err.to_string()];
            }
        };

        let mut counts = Counts::default();
        let mut output = Vec::new();
        if let Err(err) = eval(&tree, &mut self.value_stack, &mut counts, &mut output) {
            self.reset();
            return vec![err.to_string()];
        }
        self.type_stack = new_types;

        let mut lines = output;
        if let (Some(value), Some(ty)) = (self.value_stack.last(), self.type_stack.last()) {
            lines.push(format!("{} : {}", value, ty));
        }
        lines.push(format!(
            "Popped {} elements, pushed {}.",
            counts.popped, counts.pushed
        ));
        lines
    }

    fn reset(&mut self) {
        self.type_stack.clear();
        self.value_stack.clear();
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn help_lines() -> Vec<String> {
    vec![
        "HELP: Commands: `stack`, `quit`, `help`".to_string(),
        "    :stack      Prints an ascii representation of the Stack.".to_string(),
        "    :quit       Exits the shell.".to_string(),
        "    :help       Opens this menu.".to_string(),
    ]
}

fn history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hastack_history")
}

/// Run the interactive loop until `:quit` or end of input.
pub fn run_repl() -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history_path = history_file();
    let _ = rl.load_history(&history_path);

    let mut repl = Repl::new();

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if matches!(trimmed, ":quit" | ":q") {
                    println!("Quitting hastack shell");
                    break;
                }
                for out in repl.eval_line(trimmed) {
                    println!("{}", out);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_persist_across_lines() {
        let mut repl = Repl::new();
        repl.eval_line("1 2");
        let lines = repl.eval_line("+");
        assert!(lines.contains(&"3 : Int".to_string()));
        assert!(lines.contains(&"Popped 2 elements, pushed 1.".to_string()));
    }

    #[test]
    fn type_error_resets_both_stacks() {
        let mut repl = Repl::new();
        repl.eval_line("1");
        let lines = repl.eval_line("True +");
        assert!(lines[0].contains("TYPE ERROR"));
        assert!(repl.type_stack.is_empty());
        assert!(repl.value_stack.is_empty());

        // The session continues with a fresh stack.
        let lines = repl.eval_line("1 2 +");
        assert!(lines.contains(&"3 : Int".to_string()));
    }

    #[test]
    fn parse_error_keeps_the_stacks() {
        let mut repl = Repl::new();
        repl.eval_line("1");
        let lines = repl.eval_line("frobnicate");
        assert!(lines[0].contains("PARSE ERROR"));

        let lines = repl.eval_line("print");
        assert_eq!(lines[0], "1");
    }

    #[test]
    fn macros_persist_across_lines() {
        let mut repl = Repl::new();
        repl.eval_line("define two 2 end");
        let lines = repl.eval_line("two print");
        assert_eq!(lines[0], "2");
    }

    #[test]
    fn print_output_comes_before_the_summary() {
        let mut repl = Repl::new();
        let lines = repl.eval_line("5 print");
        assert_eq!(lines[0], "5");
        assert!(lines.last().unwrap().starts_with("Popped"));
    }

    #[test]
    fn stack_command_renders_values() {
        let mut repl = Repl::new();
        repl.eval_line("1 2");
        let lines = repl.eval_line(":stack");
        assert!(lines[0].contains('1'));
        assert!(lines[0].contains('2'));
    }
}
