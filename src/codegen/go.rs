/**
Go code generation

Emits one self-contained file: the runtime `Stack` prelude, one
`func quote_N(s *Stack)` per quote, one `func list_N() []interface{}` per
list literal, and `main` as a sequence of method calls.
*/
use super::GeneratedFile;
use super::runtime::GO_RUNTIME;
use crate::ast::{Node, NodeKind};
use std::fmt::Write as _;

pub struct GoGenerator {
    functions: String,
    counter: usize,
}

impl GoGenerator {
    pub fn new() -> Self {
        GoGenerator {
            functions: String::new(),
            counter: 0,
        }
    }

    fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{}_{}", prefix, self.counter);
        self.counter += 1;
        name
    }

    /// Generate the single Go source file.
    pub fn generate(&mut self, program: &Node) -> String {
        let mut body = String::new();
        self.emit(program, &mut body);

        let mut out = String::from(GO_RUNTIME);
        out.push('\n');
        out.push_str(&self.functions);
        out.push_str("func main() {\n");
        out.push_str("\ts := &Stack{}\n");
        out.push_str("\t_ = s\n");
        out.push_str(&body);
        out.push_str("}\n");
        out
    }

    fn emit(&mut self, node: &Node, out: &mut String) {
        match &node.kind {
            NodeKind::Noop | NodeKind::PrintType => {}

            NodeKind::PushInt(n) => {
                let _ = writeln!(out, "\ts.Push({})", n);
            }
            NodeKind::PushBool(b) => {
                let _ = writeln!(out, "\ts.Push({})", b);
            }
            NodeKind::PushChar(c) => {
                let _ = writeln!(out, "\ts.Push('{}')", escape_char(*c));
            }

            NodeKind::PushQuote(body) => {
                let name = self.fresh("quote");
                let mut func = String::new();
                let _ = writeln!(func, "func {}(s *Stack) {{", name);
                self.emit(body, &mut func);
                func.push_str("}\n\n");
                self.functions.push_str(&func);
                let _ = writeln!(out, "\ts.Push({})", name);
            }

            NodeKind::PushList(body) => {
                let name = self.fresh("list");
                let mut func = String::new();
                let _ = writeln!(func, "func {}() []interface{{}} {{", name);
                func.push_str("\ts := &Stack{}\n");
                self.emit(body, &mut func);
                func.push_str("\treturn s.Elements\n");
                func.push_str("}\n\n");
                self.functions.push_str(&func);
                let _ = writeln!(out, "\ts.Push({}())", name);
            }

            NodeKind::Expr(nodes) => {
                for child in nodes {
                    self.emit(child, out);
                }
            }

            _ => {
                let _ = writeln!(out, "\ts.{}()", method_name(node));
            }
        }
    }
}

impl Default for GoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn method_name(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::Add => "Add",
        NodeKind::Sub => "Sub",
        NodeKind::Mul => "Mul",
        NodeKind::Div => "Div",
        NodeKind::Lt => "Lt",
        NodeKind::Gt => "Gt",
        NodeKind::Lte => "Lte",
        NodeKind::Gte => "Gte",
        NodeKind::Eq => "Eq",
        NodeKind::Not => "Not",
        NodeKind::Cons => "Cons",
        NodeKind::Dup => "Dup",
        NodeKind::Print => "Print",
        NodeKind::Eval => "Eval",
        NodeKind::If => "If",
        NodeKind::While => "While",
        _ => "Noop",
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        _ => c.to_string(),
    }
}

/// Generate the Go source for a program.
pub fn generate(program: &Node, name: &str) -> Vec<GeneratedFile> {
    let mut generator = GoGenerator::new();
    vec![GeneratedFile {
        name: format!("{}.go", name),
        contents: generator.generate(program),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;
    use crate::parser::parser::Parser;

    fn generate_source(source: &str) -> String {
        let tree = Parser::new(lex("<test>", source)).parse().expect("parses");
        GoGenerator::new().generate(&tree)
    }

    #[test]
    fn emits_method_calls_per_node() {
        let go = generate_source("1 2 + print");
        assert!(go.contains("package main"));
        assert!(go.contains("s.Push(1)"));
        assert!(go.contains("s.Push(2)"));
        assert!(go.contains("s.Add()"));
        assert!(go.contains("s.Print()"));
        assert!(go.contains("func main() {"));
    }

    #[test]
    fn hoists_quotes_to_functions() {
        let go = generate_source("{1 +} ~");
        assert!(go.contains("func quote_0(s *Stack) {"));
        assert!(go.contains("s.Push(quote_0)"));
        assert!(go.contains("s.Eval()"));
    }

    #[test]
    fn lists_become_builder_functions() {
        let go = generate_source("0 [1 2] <: print");
        assert!(go.contains("func list_0() []interface{} {"));
        assert!(go.contains("s.Push(list_0())"));
        assert!(go.contains("s.Cons()"));
    }

    #[test]
    fn chars_and_bools_are_literals() {
        let go = generate_source("'x' True");
        assert!(go.contains("s.Push('x')"));
        assert!(go.contains("s.Push(true)"));
    }
}
