/**
Host-language code generation

Translates a checked program into source for one of two host languages.
Generation trusts the type checker completely: it re-derives no types and
performs no checks of its own, it only walks the tree and emits one runtime
call per node.

## Architecture

- `c` emits a `main.c`-style translation unit against the embedded
  `lib.c`/`lib.h` stack runtime.
- `go` emits one self-contained file with the runtime prelude inlined.
- `runtime` holds both runtime sources as string constants.

The driver writes the generated files to disk and reports the host-toolchain
command that builds them; it never invokes a host compiler itself.
*/
pub mod c;
pub mod error;
pub mod go;
pub mod runtime;

pub use error::{CodegenError, CodegenResult};

use crate::ast::Node;
use std::path::{Path, PathBuf};

/// Host language to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    C,
    Go,
}

impl Target {
    /// Shell command that builds the generated sources.
    pub fn build_hint(&self, name: &str) -> String {
        match self {
            Target::C => format!("cc {}.c lib.c -o {}", name, name),
            Target::Go => format!("go build {}.go", name),
        }
    }
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

/// Generate all source files for a program.
pub fn generate(program: &Node, target: Target, name: &str) -> Vec<GeneratedFile> {
    match target {
        Target::C => c::generate(program, name),
        Target::Go => go::generate(program, name),
    }
}

/// Generate and write the sources into `out_dir`, returning the paths.
pub fn emit(
    program: &Node,
    target: Target,
    name: &str,
    out_dir: &Path,
) -> CodegenResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in generate(program, target, name) {
        let path = out_dir.join(&file.name);
        std::fs::write(&path, &file.contents)?;
        written.push(path);
    }
    Ok(written)
}
