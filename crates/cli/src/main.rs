//! The `signet` CLI.

fn main() {
    std::process::exit(signet_cli::run());
}
