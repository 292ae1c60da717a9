#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Resolve,
    CheckWrite,
    Read,
    Write,
    Validate,
    Discover,
    Doctor,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "resolve" => CliVerb::Resolve,
        "check-write" => CliVerb::CheckWrite,
        "read" => CliVerb::Read,
        "write" => CliVerb::Write,
        "validate" => CliVerb::Validate,
        "discover" => CliVerb::Discover,
        "doctor" => CliVerb::Doctor,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  resolve <expr> [--bundle <id>] [--var name=/path]...  Resolve a symbolic path expression"
            .to_string(),
        "  check-write <path>                   Check a path against the output root".to_string(),
        "  read <expr> [--bundle <id>]          Print a file addressed by an expression"
            .to_string(),
        "  write <expr> <source-file> [--bundle <id>]  Copy a file into the output root"
            .to_string(),
        "  validate <file> --base <dir> [--json]  Validate an agent definition file".to_string(),
        "  discover <dir> [--json]              List valid agent definitions under a directory"
            .to_string(),
        "  doctor                               Run local config and root checks".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    let mut lines = vec![
        "bundlefs resolves symbolic bundle paths and guards agent file access.".to_string(),
        String::new(),
    ];
    lines.extend(cli_help_lines());
    lines.push(String::new());
    lines.push("Config: $BUNDLEFS_CONFIG or ~/.bundlefs/config.yaml".to_string());
    lines.push("Logging: BUNDLEFS_LOG (default `warn`)".to_string());
    lines.join("\n")
}
