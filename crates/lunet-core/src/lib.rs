//! Lunet Core - Lua source manipulation engine
//!
//! This crate provides the core functionality:
//! - Lexer: tokenization of Lua source code
//! - AST: node definitions, printing and traversal
//! - Parser: AST construction from the token stream
//!
//! Everything is built for source-to-source rewriting: parse a file,
//! transform the tree with a visitor, print it back out as clean Lua. Output
//! is normalized rather than byte-faithful; see [`ast::pretty`] for the
//! rules.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - tokenization of Lua source code
pub mod lexer;

/// Abstract Syntax Tree - parsed representation of Lua source code
pub mod ast;

/// Parser module - converts tokens into AST
pub mod parser;

/// Convenience re-export of the tokenizer
pub use lexer::{TokenizeError, Tokenizer};

/// Convenience re-export of the parser
pub use parser::{ParseError, Parser, Settings};

/// Convenience re-export of the printing trait
pub use ast::pretty::ToLua;

use ast::visit::VisitMut;

/// Errors reported while reading, tokenizing or parsing Lua source
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Crate-wide result type
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parse a Lua file and print it back out
pub fn reprint_file(path: &Path, settings: &Settings) -> Result<String> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    reprint_source(&source, settings)
}

/// Parse Lua source and print it back out
pub fn reprint_source(source: &str, settings: &Settings) -> Result<String> {
    let block = Parser::new(source, settings.clone())?.parse_program()?;
    Ok(block.to_lua())
}

/// Parse a single expression and print it back out. Trailing input after
/// the expression is an error.
pub fn reprint_expression(source: &str, settings: &Settings) -> Result<String> {
    let mut parser = Parser::new(source, settings.clone())?;
    let expr = parser.parse_expression()?;
    parser.expect_end_of_input()?;
    Ok(expr.to_lua())
}

/// Parse Lua source, run a mutating visitor over the tree, and print the
/// rewritten result.
pub fn rewrite_source<V: VisitMut>(
    source: &str,
    settings: &Settings,
    visitor: &mut V,
) -> Result<String> {
    let mut block = Parser::new(source, settings.clone())?.parse_program()?;
    visitor.visit_block_mut(&mut block);
    Ok(block.to_lua())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::visit::walk_expr_mut;
    use ast::Expr;

    fn reprint(source: &str) -> String {
        reprint_source(source, &Settings::default()).unwrap()
    }

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn round_trip_is_idempotent() {
        let source = r#"
local counter = 0

function Account.new(balance)
    local self = setmetatable({}, Account)
    self.balance = balance or 0
    return self
end

function Account:deposit(amount)
    self.balance = self.balance + amount
    counter = counter + 1
end

for i = 1, 10, 2 do
    print(i * 2)
end

for k, v in pairs(accounts) do
    repeat
        k.balance = v
    until done(k)
end

while counter < 100 do
    if counter % 2 == 0 then
        counter = counter + 1
    elseif counter > 50 then
        break
    else
        counter = counter + 2
    end
end

return counter, "done\n"
"#;
        let first = reprint(source);
        let second = reprint(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn round_trip_is_idempotent_across_settings() {
        let source = r#"
local a, b
t = { 1, [5] = 2, 3 }

for i = 1, 10 do
    t[i] = i * 2
end

return t, a
"#;
        let variants = [
            Settings::default(),
            Settings {
                autofill_sequential_table_keys: false,
                ..Settings::default()
            },
            Settings {
                autofill_local_nil_values: false,
                ..Settings::default()
            },
            Settings {
                autofill_numeric_for_step: false,
                ..Settings::default()
            },
            Settings {
                autofill_sequential_table_keys: false,
                autofill_local_nil_values: false,
                autofill_numeric_for_step: false,
                ..Settings::default()
            },
        ];
        for settings in variants {
            let first = reprint_source(source, &settings).unwrap();
            let second = reprint_source(&first, &settings).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn reprint_normalizes_sugar() {
        assert_eq!(reprint("f 'x'"), "f(\"x\")");
        assert_eq!(
            reprint("local f = function() return 1 end"),
            "local function f()\n    return 1\nend"
        );
    }

    #[test]
    fn reprint_expression_rejects_trailing_input() {
        let settings = Settings::default();
        assert_eq!(reprint_expression("a + b", &settings).unwrap(), "(a + b)");
        assert!(reprint_expression("a b", &settings).is_err());
    }

    #[test]
    fn rewrite_renames_variables() {
        struct Rename;
        impl VisitMut for Rename {
            fn visit_expr_mut(&mut self, expr: &mut Expr) {
                if let Expr::Variable(var) = expr {
                    if var.name == "a" {
                        var.name = "b".into();
                    }
                }
                walk_expr_mut(self, expr);
            }
        }

        let out = rewrite_source("return a + a", &Settings::default(), &mut Rename).unwrap();
        assert_eq!(out, "return (b + b)");
    }

    #[test]
    fn tokenize_errors_surface() {
        assert!(matches!(
            reprint_source("a = $", &Settings::default()),
            Err(Error::Tokenize(_))
        ));
    }

    #[test]
    fn io_error_carries_path() {
        let path = Path::new("/nonexistent/input.lua");
        match reprint_file(path, &Settings::default()) {
            Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
