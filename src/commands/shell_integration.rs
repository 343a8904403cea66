//! `ghpr shell-integration`: completions plus short aliases.

use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{Shell, generate};
use indoc::indoc;

use crate::cli::Cli;
use crate::shared::env_var::EnvVars;

const ALIASES: &str = indoc! {"
    ghpc=ghpr clone
    ghpp=ghpr push
    ghpl=ghpr pull
    ghpd=ghpr diff
    ghpo=ghpr open
    ghps=ghpr show
    ghpi=ghpr init
    ghpu=ghpr upload
"};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    /// Guess from a `$SHELL` path: fish, zsh, otherwise bash.
    pub fn detect(shell: Option<&str>) -> Self {
        match shell {
            Some(s) if s.contains("fish") => Self::Fish,
            Some(s) if s.contains("zsh") => Self::Zsh,
            _ => Self::Bash,
        }
    }

    fn completion_shell(self) -> Shell {
        match self {
            Self::Bash => Shell::Bash,
            Self::Zsh => Shell::Zsh,
            Self::Fish => Shell::Fish,
        }
    }
}

#[derive(Args, Clone, PartialEq, Eq, Debug)]
pub struct ShellIntegrationArgs {
    /// Target shell (default: detected from $SHELL)
    #[arg(value_enum)]
    pub shell: Option<ShellKind>,
}

pub fn run(args: &ShellIntegrationArgs) -> anyhow::Result<()> {
    let shell = args
        .shell
        .unwrap_or_else(|| ShellKind::detect(EnvVars::load().shell.as_deref()));
    print!("{}", render(shell)?);
    Ok(())
}

fn render(shell: ShellKind) -> anyhow::Result<String> {
    let mut out = Vec::new();
    generate(
        shell.completion_shell(),
        &mut Cli::command(),
        "ghpr",
        &mut out,
    );
    let mut script = String::from_utf8(out)?;
    script.push('\n');
    script.push_str(&alias_block(shell));
    Ok(script)
}

fn alias_block(shell: ShellKind) -> String {
    let mut block = String::from("# ghpr aliases\n");
    for line in ALIASES.lines() {
        let Some((name, command)) = line.split_once('=') else {
            continue;
        };
        let alias = match shell {
            ShellKind::Fish => format!("alias {name} '{command}'\n"),
            ShellKind::Bash | ShellKind::Zsh => format!("alias {name}='{command}'\n"),
        };
        block.push_str(&alias);
    }
    block
}
