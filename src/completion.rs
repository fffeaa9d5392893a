//! # Shell Completion Module
//!
//! Completion scripts for the `pasos` binary, including dynamic completion of
//! graph node names for `--start`.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! pasos completion bash > ~/.local/share/bash-completion/completions/pasos
//!
//! # Generate fish completions with node names
//! pasos completion-enhanced fish > ~/.config/fish/completions/pasos.fish
//! ```

use crate::graph::GraphModel;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Node names offered for `--start`, in graph order.
pub fn node_completions(graph: &GraphModel) -> Vec<String> {
    graph.nodes().map(|node| node.name.clone()).collect()
}

/// Print node names one per line for completion scripts
pub fn print_node_completions(graph: &GraphModel) {
    for name in node_completions(graph) {
        println!("{name}");
    }
}

/// Enhanced bash completion script with node name completion
pub fn enhanced_bash_completion() -> String {
    r#"#!/bin/bash
# Enhanced Pasos completion script with node name completion
# Install with: pasos completion-enhanced bash > ~/.local/share/bash-completion/completions/pasos

_pasos() {
    local cur prev words cword
    _init_completion || return

    case "${prev}" in
        -s|--start)
            local IFS=$'\n'
            COMPREPLY=($(compgen -W "$(pasos complete-nodes 2>/dev/null)" -- "${cur}"))
            return 0
            ;;
        -o|--output|-g|--graph|--config)
            _filedir
            return 0
            ;;
        --cache-dir)
            _filedir -d
            return 0
            ;;
        -f|--format)
            COMPREPLY=($(compgen -W "wav wav-float" -- "${cur}"))
            return 0
            ;;
        completion|completion-enhanced)
            COMPREPLY=($(compgen -W "bash zsh fish power-shell elvish" -- "${cur}"))
            return 0
            ;;
    esac

    local subcommands="generate walk graph metronome completion completion-enhanced help"
    local walk_opts="--start --steps --bias --recovery --lead-in --seed --graph --quiet --config --help"

    if [[ $cword -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$subcommands --help --version" -- "${cur}"))
    else
        case "${words[1]}" in
            generate)
                COMPREPLY=($(compgen -W "$walk_opts --bpm --output --format --cache-dir --voice" -- "${cur}"))
                ;;
            walk)
                COMPREPLY=($(compgen -W "$walk_opts --json" -- "${cur}"))
                ;;
            graph)
                COMPREPLY=($(compgen -W "--graph --json --config --help" -- "${cur}"))
                ;;
            metronome)
                COMPREPLY=($(compgen -W "--bpm --beats --output --format --config --help" -- "${cur}"))
                ;;
            *)
                COMPREPLY=($(compgen -W "$subcommands" -- "${cur}"))
                ;;
        esac
    fi
} &&
complete -F _pasos pasos

# ex: filetype=sh
"#
    .to_string()
}

/// Enhanced fish completion script with node name completion
pub fn enhanced_fish_completion() -> String {
    r#"# Enhanced Pasos completion script for Fish shell with node name completion
# Install with: pasos completion-enhanced fish > ~/.config/fish/completions/pasos.fish

function __pasos_complete_nodes
    if command -sq pasos
        pasos complete-nodes 2>/dev/null
    end
end

complete -c pasos -e

complete -c pasos -s h -l help -d 'Print help information'
complete -c pasos -s V -l version -d 'Print version information'
complete -c pasos -l config -r -F -d 'Configuration file'

complete -c pasos -f -n '__fish_use_subcommand' -a 'generate' -d 'Walk the dance graph and render a practice track'
complete -c pasos -f -n '__fish_use_subcommand' -a 'walk' -d 'Walk the dance graph and print the cues'
complete -c pasos -f -n '__fish_use_subcommand' -a 'graph' -d 'Show the active dance graph'
complete -c pasos -f -n '__fish_use_subcommand' -a 'metronome' -d 'Render a metronome track'
complete -c pasos -f -n '__fish_use_subcommand' -a 'completion' -d 'Generate shell completions'
complete -c pasos -f -n '__fish_use_subcommand' -a 'completion-enhanced' -d 'Generate completions with node names'

complete -c pasos -n '__fish_seen_subcommand_from generate walk' -s s -l start -x -a '(__pasos_complete_nodes)' -d 'Start node'
complete -c pasos -n '__fish_seen_subcommand_from generate walk' -s n -l steps -x -d 'Maximum number of steps'
complete -c pasos -n '__fish_seen_subcommand_from generate metronome' -s b -l bpm -x -d 'Tempo'
complete -c pasos -n '__fish_seen_subcommand_from generate walk' -l seed -x -d 'Random seed'
complete -c pasos -n '__fish_seen_subcommand_from generate walk graph' -s g -l graph -r -F -d 'Graph definition'
complete -c pasos -n '__fish_seen_subcommand_from generate metronome' -s o -l output -r -F -d 'Output file'
complete -c pasos -n '__fish_seen_subcommand_from generate metronome' -s f -l format -x -a 'wav wav-float' -d 'Output encoding'
complete -c pasos -n '__fish_seen_subcommand_from completion completion-enhanced' -f -a 'bash zsh fish power-shell elvish'
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue;

    #[test]
    fn test_node_completions_cover_graph() {
        let graph = catalogue::salsa_graph().unwrap();
        let names = node_completions(&graph);
        assert_eq!(names.len(), graph.node_count());
        assert!(names.contains(&"Suelta position".to_string()));
    }

    #[test]
    fn test_enhanced_scripts_call_complete_nodes() {
        assert!(enhanced_bash_completion().contains("pasos complete-nodes"));
        assert!(enhanced_fish_completion().contains("pasos complete-nodes"));
    }
}
