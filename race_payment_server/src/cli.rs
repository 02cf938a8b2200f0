use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
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
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "RPG_HOST",
        "RPG_PORT",
        "RPG_DATABASE_URL",
        "RPG_BANK_ACCOUNT_NO",
        "RPG_BANK_CODE_NAME",
        "RPG_WEBHOOK_IP_WHITELIST",
        "RPG_USE_X_FORWARDED_FOR",
        "RPG_USE_FORWARDED",
        "RPG_EVENT_BUFFER_SIZE",
        "RPG_ALIMTALK_API_URL",
        "RPG_ALIMTALK_APP_KEY",
        "RPG_ALIMTALK_SENDER_KEY",
        "RPG_ALIMTALK_TEMPLATE_CODE",
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
