use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod definitions;
pub mod doctor;
pub mod paths;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Resolve => paths::cmd_resolve(&args[1..]),
        CliVerb::CheckWrite => paths::cmd_check_write(&args[1..]),
        CliVerb::Read => paths::cmd_read(&args[1..]),
        CliVerb::Write => paths::cmd_write(&args[1..]),
        CliVerb::Validate => definitions::cmd_validate(&args[1..]),
        CliVerb::Discover => definitions::cmd_discover(&args[1..]),
        CliVerb::Doctor => doctor::cmd_doctor(),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
