use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    patchbundle completions --shell bash > ~/.bash_completion.d/patchbundle\n\n\
                  Generate zsh completions:\n    patchbundle completions --shell zsh > ~/.zfunc/_patchbundle\n\n\
                  Generate fish completions:\n    patchbundle completions --shell fish > ~/.config/fish/completions/patchbundle.fish")]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(long, value_enum, ignore_case = true)]
    pub shell: Shell,
}
