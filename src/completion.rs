//! # Shell Completion Module
//!
//! Generation of completion scripts through clap, and enhanced bash/fish
//! scripts that complete artist keys for `next` by calling the hidden
//! `complete-artists` command.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! airwaves completion bash > ~/.local/share/bash-completion/completions/airwaves
//!
//! # Generate zsh completions
//! airwaves completion zsh > ~/.config/zsh/completions/_airwaves
//!
//! # Bash completions that also complete artist keys from the catalog
//! airwaves completion-enhanced bash > ~/.local/share/bash-completion/completions/airwaves
//! ```

use crate::catalog::JsonCatalog;
use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use log::debug;
use std::io;
use std::path::Path;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

const ENHANCED_BASH_COMPLETION: &str = r##"#!/bin/bash
# Enhanced Airwaves completion script with artist completion
# Install with: airwaves completion-enhanced bash > ~/.local/share/bash-completion/completions/airwaves

_airwaves_complete_artists() {
    # Artist keys come from the catalog given on the command line, or $AIRWAVES_CATALOG
    local catalog="" i
    for ((i = 1; i < ${#COMP_WORDS[@]} - 1; i++)); do
        if [[ "${COMP_WORDS[i]}" == "--catalog" ]]; then
            catalog="${COMP_WORDS[i+1]}"
        fi
    done

    if ! command -v airwaves >/dev/null 2>&1; then
        return
    fi
    if [[ -n "$catalog" ]]; then
        airwaves complete-artists --catalog "$catalog" 2>/dev/null
    elif [[ -n "$AIRWAVES_CATALOG" ]]; then
        airwaves complete-artists 2>/dev/null
    fi
}

_airwaves() {
    local cur prev words cword
    _init_completion || return

    case "${prev}" in
        --last-artist)
            mapfile -t COMPREPLY < <(_airwaves_complete_artists | grep -- "^${cur}")
            return 0
            ;;
        --catalog|--db|--config)
            _filedir
            return 0
            ;;
        --user|--seed)
            return 0
            ;;
        completion|completion-enhanced)
            COMPREPLY=($(compgen -W "bash zsh fish power-shell elvish" -- "${cur}"))
            return 0
            ;;
    esac

    local subcommands="next history reset completion completion-enhanced help"

    if [[ $cword -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$subcommands --help --version" -- "${cur}"))
        return 0
    fi

    case "${words[1]}" in
        next)
            if [[ "${cur}" == -* ]]; then
                COMPREPLY=($(compgen -W "--last-artist --user --catalog --db --config --seed --help" -- "${cur}"))
            else
                mapfile -t COMPREPLY < <(_airwaves_complete_artists | grep -- "^${cur}")
            fi
            ;;
        history|reset)
            COMPREPLY=($(compgen -W "--db --help" -- "${cur}"))
            ;;
    esac
}

complete -F _airwaves airwaves
"##;

const ENHANCED_FISH_COMPLETION: &str = r##"# Enhanced Airwaves completion script for Fish shell with artist completion
# Install with: airwaves completion-enhanced fish > ~/.config/fish/completions/airwaves.fish

# Artist keys come from the catalog given on the command line, or $AIRWAVES_CATALOG
function __airwaves_complete_artists
    command -sq airwaves; or return
    set -l tokens (commandline -opc)
    set -l catalog
    for i in (seq (math (count $tokens) - 1))
        if test "$tokens[$i]" = --catalog
            set catalog $tokens[(math $i + 1)]
        end
    end

    if test -n "$catalog"
        airwaves complete-artists --catalog $catalog 2>/dev/null
    else if set -q AIRWAVES_CATALOG
        airwaves complete-artists 2>/dev/null
    end
end

# Clear existing completions to avoid conflicts
complete -c airwaves -e

# Global options
complete -c airwaves -s h -l help -d 'Print help information'
complete -c airwaves -s V -l version -d 'Print version information'

# Main commands
complete -c airwaves -f -n '__fish_use_subcommand' -a 'next' -d 'Pick the next track of a station'
complete -c airwaves -f -n '__fish_use_subcommand' -a 'history' -d 'Show the recently played tracks'
complete -c airwaves -f -n '__fish_use_subcommand' -a 'reset' -d 'Forget the saved station'
complete -c airwaves -f -n '__fish_use_subcommand' -a 'completion' -d 'Generate shell completions'
complete -c airwaves -f -n '__fish_use_subcommand' -a 'completion-enhanced' -d 'Generate enhanced shell completions'
complete -c airwaves -f -n '__fish_use_subcommand' -a 'help' -d 'Print help for commands'

# next command - base artist and options
complete -c airwaves -f -n '__fish_seen_subcommand_from next' -a '(__airwaves_complete_artists)' -d 'Base artist'
complete -c airwaves -f -n '__fish_seen_subcommand_from next' -l last-artist -r -a '(__airwaves_complete_artists)' -d 'Artist that played last'
complete -c airwaves -f -n '__fish_seen_subcommand_from next' -l user -r -d 'Only play from this user collection'
complete -c airwaves -n '__fish_seen_subcommand_from next' -l catalog -r -F -d 'Catalog JSON file'
complete -c airwaves -n '__fish_seen_subcommand_from next' -l config -r -F -d 'Tunables JSON file'
complete -c airwaves -f -n '__fish_seen_subcommand_from next' -l seed -r -d 'Seed for reproducible selections'

# Commands sharing the state database option
complete -c airwaves -n '__fish_seen_subcommand_from next history reset' -l db -r -F -d 'Station state database'

# completion commands - complete with shell types
complete -c airwaves -f -n '__fish_seen_subcommand_from completion' -a 'bash zsh fish power-shell elvish'
complete -c airwaves -f -n '__fish_seen_subcommand_from completion-enhanced' -a 'bash fish'
"##;

/// Enhanced completion script for `shell`, completing artist keys from the
/// catalog. Only bash and fish are supported.
///
/// # Errors
///
/// Returns an error for any other shell.
pub fn enhanced_completion_script(shell: crate::cli::Shell) -> Result<&'static str> {
    match shell {
        crate::cli::Shell::Bash => Ok(ENHANCED_BASH_COMPLETION),
        crate::cli::Shell::Fish => Ok(ENHANCED_FISH_COMPLETION),
        _ => Err(anyhow::anyhow!("Enhanced completions only supported for bash and fish")),
    }
}

/// Convert our Shell enum to `clap_complete`'s Shell enum
#[must_use]
pub const fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Artist keys of `catalog`, sorted.
#[must_use]
pub fn artist_completions(catalog: &JsonCatalog) -> Vec<String> {
    let mut keys: Vec<String> = catalog.artist_keys().map(ToString::to_string).collect();
    keys.sort();
    keys
}

/// Print the artist keys of the catalog at `path`, one per line.
///
/// A missing or unreadable catalog prints nothing, so completion never
/// spams the terminal with errors.
///
/// # Errors
///
/// Currently infallible; the `Result` matches the other command handlers.
pub fn print_artist_completions(path: &Path) -> Result<()> {
    let catalog = match JsonCatalog::from_file(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            debug!("No artist completions: {e:#}");
            return Ok(());
        }
    };

    // One key per line; the completion scripts split on newlines.
    for key in artist_completions(&catalog) {
        println!("{key}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_shell_conversion() {
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::Bash),
            CompletionShell::Bash
        );
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::Zsh),
            CompletionShell::Zsh
        );
    }

    #[test]
    fn test_enhanced_scripts_complete_artists() {
        for shell in [crate::cli::Shell::Bash, crate::cli::Shell::Fish] {
            let script = enhanced_completion_script(shell).expect("supported shell");
            assert!(script.contains("airwaves complete-artists --catalog"));
            assert!(script.contains("AIRWAVES_CATALOG"));
            assert!(script.contains("last-artist"));
        }
        assert!(enhanced_completion_script(crate::cli::Shell::Zsh).is_err());
    }

    #[test]
    fn test_enhanced_scripts_cover_every_visible_command() {
        let cmd = <crate::cli::Args as clap::CommandFactory>::command();
        let bash = enhanced_completion_script(crate::cli::Shell::Bash).expect("bash");
        let fish = enhanced_completion_script(crate::cli::Shell::Fish).expect("fish");

        for sub in cmd.get_subcommands().filter(|sub| !sub.is_hide_set()) {
            let name = sub.get_name();
            assert!(bash.contains(name), "bash script misses `{name}'");
            assert!(fish.contains(&format!("-a '{name}'")), "fish script misses `{name}'");
        }
    }

    #[test]
    fn test_artist_completions_sorted() {
        let mut catalog = JsonCatalog::new();
        catalog.add_artist("zappa", &[], vec![]).add_artist("abba", &[], vec![]);

        assert_eq!(artist_completions(&catalog), vec!["abba", "zappa"]);
    }

    #[test]
    fn test_print_artist_completions_missing_catalog() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // This should not fail even if the catalog doesn't exist
        assert!(print_artist_completions(&temp_dir.path().join("missing.json")).is_ok());
    }
}
