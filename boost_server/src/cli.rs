use std::{env, env::VarError};

/// There's no real CLI for the server. Any argument prints the help text and the current configuration.
///
/// Returns true if arguments were given, in which case the caller should exit.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 8] = [
        "RUST_LOG",
        "BM_HOST",
        "BM_PORT",
        "BM_DATABASE_URL",
        "BM_DB_MAX_CONNECTIONS",
        "BM_RANK_BOOST_BASE_PRICE",
        "BM_FLAT_SERVICE_BASE_PRICE",
        "BM_PLATFORM_FEE_PERCENT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
