/// Step debugger for hastack
///
/// Executes the top-level expression one operation at a time, redrawing an
/// ASCII rendering of the value stack between steps. The REPL borrows the
/// same rendering for its `:stack` command.
use crate::ast::Node;
use crate::interp::{Counts, RuntimeResult, Value, eval};
use std::io::{self, BufRead, Write};

const PADDING: usize = 3;
const LEFT_PAD: &str = "  ";

/// Render the stack as a column of boxes, top of stack first.
pub fn render_stack(stack: &[Value]) -> String {
    if stack.is_empty() {
        return format!(
            "{}{dash}\n{}| {} |\n{}{dash}\n",
            LEFT_PAD,
            LEFT_PAD,
            " ".repeat(PADDING.saturating_sub(2)),
            LEFT_PAD,
            dash = "-".repeat(PADDING + 4),
        );
    }

    let width = stack
        .iter()
        .map(|v| v.to_string().chars().count())
        .max()
        .unwrap_or(0)
        + PADDING;

    let mut out = String::new();
    for value in stack.iter().rev() {
        out.push_str(LEFT_PAD);
        out.push_str(&"-".repeat(width + 4));
        out.push('\n');
        out.push_str(LEFT_PAD);
        out.push_str(&format!("| {:^width$} |\n", value.to_string(), width = width));
    }
    out.push_str(LEFT_PAD);
    out.push_str(&"-".repeat(width + 4));
    out.push('\n');
    out
}

fn clear_screen() {
    print!("\x1b[2J\x1b[1;1H");
    let _ = io::stdout().flush();
}

/// Step through a checked program, pausing before every top-level node.
pub fn run(program: &Node) -> RuntimeResult<()> {
    let mut stack: Vec<Value> = Vec::new();
    let mut prev: Vec<Value> = Vec::new();
    let mut counts = Counts::default();
    let mut output: Vec<String> = Vec::new();
    let stdin = io::stdin();

    for node in program.children() {
        clear_screen();
        print!("{}", render_stack(&prev));
        for line in output.drain(..) {
            println!("{}", line);
        }
        println!("Executing node: {} (ENTER)", node);
        let mut pause = String::new();
        let _ = stdin.lock().read_line(&mut pause);

        eval(node, &mut stack, &mut counts, &mut output)?;
        print!("{}", render_stack(&stack));
        prev = stack.clone();
    }

    clear_screen();
    print!("{}", render_stack(&prev));
    for line in output.drain(..) {
        println!("{}", line);
    }
    println!("\n\nProgram finished with no abnormalities");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_values_top_first() {
        let rendered = render_stack(&[Value::Int(1), Value::Bool(true)]);
        let true_at = rendered.find("True").expect("top value shown");
        let one_at = rendered.find('1').expect("bottom value shown");
        assert!(true_at < one_at);
        assert!(rendered.contains("----"));
    }

    #[test]
    fn renders_empty_stack_as_empty_box() {
        let rendered = render_stack(&[]);
        assert!(rendered.contains("| "));
        assert!(rendered.contains("---"));
    }

    #[test]
    fn boxes_grow_with_the_widest_value() {
        let rendered = render_stack(&[Value::List(vec![Value::Int(10), Value::Int(20)])]);
        assert!(rendered.contains("[10 20]"));
    }
}
