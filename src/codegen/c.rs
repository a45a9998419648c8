/**
C code generation

Walks the checked tree and emits one runtime call per operation into
`main`. Quotes are hoisted to `void quote_N(Stack *)` functions; inner
quotes land before the quotes that push them, so everything is defined
before use. List literals build on a scratch stack that is then pushed as
one value. The output pairs with the embedded `lib.c`/`lib.h` runtime.
*/
use super::GeneratedFile;
use super::runtime::{C_HEADER, C_RUNTIME};
use crate::ast::{Node, NodeKind};
use std::fmt::Write as _;

pub struct CGenerator {
    functions: String,
    counter: usize,
}

impl CGenerator {
    pub fn new() -> Self {
        CGenerator {
            functions: String::new(),
            counter: 0,
        }
    }

    fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{}_{}", prefix, self.counter);
        self.counter += 1;
        name
    }

    /// Generate the program translation unit.
    pub fn generate(&mut self, program: &Node) -> String {
        let mut body = String::new();
        self.emit(program, &mut body, "stack");

        let mut out = String::new();
        out.push_str("#include \"lib.h\"\n\n");
        out.push_str(&self.functions);
        out.push_str("int main(void) {\n");
        out.push_str("    Stack _stack;\n");
        out.push_str("    Stack *stack = &_stack;\n");
        out.push_str("    init_stack(stack);\n");
        out.push_str(&body);
        out.push_str("    free_stack(stack);\n");
        out.push_str("    return 0;\n");
        out.push_str("}\n");
        out
    }

    fn emit(&mut self, node: &Node, out: &mut String, stack: &str) {
        match &node.kind {
            NodeKind::Noop | NodeKind::PrintType => {}

            NodeKind::PushInt(n) => {
                let _ = writeln!(out, "    push_int({}, {});", stack, n);
            }
            NodeKind::PushBool(b) => {
                let _ = writeln!(out, "    push_bool({}, {});", stack, i32::from(*b));
            }
            NodeKind::PushChar(c) => {
                let _ = writeln!(out, "    push_char({}, '{}');", stack, escape_char(*c));
            }

            NodeKind::PushQuote(body) => {
                let name = self.fresh("quote");
                let mut func = String::new();
                let _ = writeln!(func, "void {}(Stack *stack) {{", name);
                self.emit(body, &mut func, "stack");
                func.push_str("}\n\n");
                self.functions.push_str(&func);
                let _ = writeln!(out, "    push_quote({}, &{});", stack, name);
            }

            NodeKind::PushList(body) => {
                let name = self.fresh("list");
                let _ = writeln!(out, "    Stack *{} = new_stack();", name);
                self.emit(body, out, &name);
                let _ = writeln!(out, "    push_list({}, {});", stack, name);
            }

            NodeKind::Expr(nodes) => {
                for child in nodes {
                    self.emit(child, out, stack);
                }
            }

            _ => {
                let _ = writeln!(out, "    {}({});", operation_name(node), stack);
            }
        }
    }
}

impl Default for CGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn operation_name(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::Add => "add_operation",
        NodeKind::Sub => "sub_operation",
        NodeKind::Mul => "mul_operation",
        NodeKind::Div => "div_operation",
        NodeKind::Lt => "lt_operation",
        NodeKind::Gt => "gt_operation",
        NodeKind::Lte => "lte_operation",
        NodeKind::Gte => "gte_operation",
        NodeKind::Eq => "eq_operation",
        NodeKind::Not => "not_operation",
        NodeKind::Cons => "cons_operation",
        NodeKind::Dup => "dup_operation",
        NodeKind::Print => "print_operation",
        NodeKind::Eval => "eval_operation",
        NodeKind::If => "if_operation",
        NodeKind::While => "while_operation",
        _ => "noop",
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        _ => c.to_string(),
    }
}

/// Generate the C sources for a program: the program file plus the runtime.
pub fn generate(program: &Node, name: &str) -> Vec<GeneratedFile> {
    let mut generator = CGenerator::new();
    vec![
        GeneratedFile {
            name: format!("{}.c", name),
            contents: generator.generate(program),
        },
        GeneratedFile {
            name: "lib.h".to_string(),
            contents: C_HEADER.to_string(),
        },
        GeneratedFile {
            name: "lib.c".to_string(),
            contents: C_RUNTIME.to_string(),
        },
    ]
}
