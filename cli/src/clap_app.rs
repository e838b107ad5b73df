use {
    crate::{admin::AdminSubCommands, commitment::CommitmentSubCommands},
    clap::{App, AppSettings, Arg},
    goodcommit_commitment_stake::{amount::parse_token_amount, state::HabitCategory},
    solana_pubkey::Pubkey,
    std::{fmt::Display, str::FromStr},
};

pub const DEFAULT_STATE_PATH: &str = "goodcommit-state.json";

pub fn is_valid_pubkey(value: String) -> Result<(), String> {
    Pubkey::from_str(&value)
        .map(|_| ())
        .map_err(|err| format!("Invalid pubkey '{value}': {err}"))
}

pub fn is_valid_amount(value: String) -> Result<(), String> {
    parse_token_amount(&value)
        .map(|_| ())
        .map_err(|err| format!("Invalid amount '{value}': {err}"))
}

pub fn is_valid_category(value: String) -> Result<(), String> {
    HabitCategory::from_str(&value).map(|_| ())
}

pub fn is_parsable<T>(value: String) -> Result<(), String>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map(|_| ())
        .map_err(|err| format!("Unable to parse '{value}': {err}"))
}

pub fn get_clap_app<'ab, 'v>(name: &str, about: &'ab str, version: &'v str) -> App<'ab, 'v> {
    App::new(name)
        .about(about)
        .version(version)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("state")
                .long("state")
                .value_name("PATH")
                .takes_value(true)
                .global(true)
                .default_value(DEFAULT_STATE_PATH)
                .help("Ledger state file"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("TOML")
                .takes_value(true)
                .global(true)
                .help(
                    "Staking policy file. Applied to the state and kept for later \
                     invocations",
                ),
        )
        .arg(
            Arg::with_name("now")
                .long("now")
                .value_name("UNIX_TIMESTAMP")
                .takes_value(true)
                .global(true)
                .validator(is_parsable::<i64>)
                .help("Evaluate the command at this time instead of the system clock"),
        )
        .arg(
            Arg::with_name("output_format")
                .long("output")
                .value_name("FORMAT")
                .takes_value(true)
                .global(true)
                .possible_values(&["json", "json-compact"])
                .help("Return information in specified output format"),
        )
        .admin_subcommands()
        .commitment_subcommands()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators() {
        assert!(is_valid_pubkey(Pubkey::new_unique().to_string()).is_ok());
        assert!(is_valid_pubkey("not-a-key".to_string()).is_err());
        assert!(is_valid_amount("12.5".to_string()).is_ok());
        assert!(is_valid_amount("1.2.3".to_string()).is_err());
        assert!(is_valid_category("Focus".to_string()).is_ok());
        assert!(is_valid_category("sleep".to_string()).is_err());
        assert!(is_parsable::<i64>("-5".to_string()).is_ok());
        assert!(is_parsable::<u64>("-5".to_string()).is_err());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let matches = get_clap_app("goodcommit", "test", "0.0.0")
            .get_matches_from_safe(["goodcommit", "pool", "--now", "42", "--output", "json"])
            .unwrap();
        let (name, sub) = matches.subcommand();
        assert_eq!(name, "pool");
        let sub = sub.unwrap();
        assert_eq!(sub.value_of("now"), Some("42"));
        assert_eq!(sub.value_of("output_format"), Some("json"));
    }
}
