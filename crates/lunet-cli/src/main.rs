//! Lunet CLI - parse, normalize and reprint Lua source from the command line

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use lunet_core::{Settings, ToLua};

#[derive(Parser)]
#[command(name = "lunet")]
#[command(version = lunet_core::VERSION)]
#[command(about = "Lua source manipulation toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Render the output on a single line
    #[arg(long, global = true)]
    one_line: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a Lua file and print the normalized source
    Parse {
        /// Path to the source file
        file: PathBuf,
    },

    /// Parse a Lua expression and print its normalized form
    Expr {
        /// Expression text; multiple arguments are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(Args)]
struct SettingsArgs {
    /// Load parser settings from a JSON file
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Do not fill in number keys for sequential table entries
    #[arg(long, global = true)]
    no_autofill_table_keys: bool,

    /// Do not fill in nil values for bare local declarations
    #[arg(long, global = true)]
    no_autofill_local_nils: bool,

    /// Do not fill in the default numeric for step
    #[arg(long, global = true)]
    no_autofill_for_step: bool,

    /// Reject LuaJIT long literals (123LL)
    #[arg(long, global = true)]
    no_long_literals: bool,

    /// Imitate stock Lua syntax errors for quirks this parser accepts
    #[arg(long, global = true)]
    legacy_error_compat: bool,
}

impl SettingsArgs {
    /// Resolve the effective parser settings: JSON file first, then flag
    /// overrides on top.
    fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read settings file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse settings file {}", path.display()))?
            }
            None => Settings::default(),
        };

        if self.no_autofill_table_keys {
            settings.autofill_sequential_table_keys = false;
        }
        if self.no_autofill_local_nils {
            settings.autofill_local_nil_values = false;
        }
        if self.no_autofill_for_step {
            settings.autofill_numeric_for_step = false;
        }
        if self.no_long_literals {
            settings.enable_extended_long_literals = false;
        }
        if self.legacy_error_compat {
            settings.maintain_legacy_syntax_error_compat = true;
        }

        Ok(settings)
    }
}

fn render(node: &impl ToLua, one_line: bool) -> String {
    if one_line {
        node.to_lua_one_line()
    } else {
        node.to_lua()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings.resolve()?;

    match cli.command {
        Commands::Parse { file } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let block = lunet_core::Parser::new(&source, settings)?.parse_program()?;
            println!("{}", render(&block, cli.one_line));
        }

        Commands::Expr { text } => {
            let source = text.join(" ");
            let mut parser = lunet_core::Parser::new(&source, settings)?;
            let expr = parser.parse_expression()?;
            parser.expect_end_of_input()?;
            println!("{}", render(&expr, cli.one_line));
        }
    }

    Ok(())
}
