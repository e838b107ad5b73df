use {
    crate::{
        admin::{self, AdminCliCommand},
        commitment::{self, CommitmentCliCommand},
        output::OutputFormat,
        state::{CliState, StateError},
    },
    clap::ArgMatches,
    goodcommit_commitment_stake::{
        amount::{parse_token_amount, Amount, AmountError},
        clock::{Clock, ManualClock, SystemClock, UnixTimestamp},
        config::{ConfigError, StakingConfig},
        error::StakingError,
        state::HabitCategory,
    },
    log::*,
    solana_pubkey::Pubkey,
    std::{path::PathBuf, str::FromStr, sync::Arc},
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Bad parameter: {0}")]
    BadParameter(String),

    #[error("{}", staking_message(.0))]
    Staking(#[from] StakingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error("Output serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProcessResult = Result<String, CliError>;

fn staking_message(err: &StakingError) -> String {
    format!("{err} ({})", err.user_message())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub state_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub now: Option<UnixTimestamp>,
    pub output_format: OutputFormat,
}

impl CliConfig {
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.now {
            Some(now) => Arc::new(ManualClock::new(now)),
            None => Arc::new(SystemClock),
        }
    }

    /// The policy from `--config`, if given.
    pub fn policy(&self) -> Result<Option<StakingConfig>, CliError> {
        self.config_path
            .as_ref()
            .map(StakingConfig::load)
            .transpose()
            .map_err(CliError::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Admin(AdminCliCommand),
    Commitment(CommitmentCliCommand),
}

impl CliCommand {
    fn is_read_only(&self) -> bool {
        match self {
            CliCommand::Admin(command) => command.is_read_only(),
            CliCommand::Commitment(command) => command.is_read_only(),
        }
    }
}

// ── Argument Parsing ────────────────────────────────────────────────

/// Value of a global argument, preferring an occurrence after the subcommand.
fn global_value_of<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Option<&'a str> {
    match matches.subcommand() {
        (_, Some(sub)) if sub.occurrences_of(name) > 0 => sub.value_of(name),
        _ => matches.value_of(name),
    }
}

pub fn required_value<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Result<&'a str, CliError> {
    matches
        .value_of(name)
        .ok_or_else(|| CliError::BadParameter(format!("missing <{name}>")))
}

pub fn parse_value<T>(matches: &ArgMatches<'_>, name: &str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: ToString,
{
    let value = required_value(matches, name)?;
    value
        .parse()
        .map_err(|err: T::Err| CliError::BadParameter(format!("{name}: {}", err.to_string())))
}

pub fn pubkey_of(matches: &ArgMatches<'_>, name: &str) -> Result<Pubkey, CliError> {
    parse_value(matches, name)
}

pub fn category_of(matches: &ArgMatches<'_>, name: &str) -> Result<HabitCategory, CliError> {
    parse_value(matches, name)
}

pub fn amount_of(matches: &ArgMatches<'_>, name: &str) -> Result<Amount, CliError> {
    Ok(parse_token_amount(required_value(matches, name)?)?)
}

pub fn parse_args(matches: &ArgMatches<'_>) -> Result<(CliConfig, CliCommand), CliError> {
    let now = global_value_of(matches, "now")
        .map(|value| {
            value
                .parse::<UnixTimestamp>()
                .map_err(|err| CliError::BadParameter(format!("now: {err}")))
        })
        .transpose()?;
    let config = CliConfig {
        state_path: PathBuf::from(
            global_value_of(matches, "state").unwrap_or(crate::clap_app::DEFAULT_STATE_PATH),
        ),
        config_path: global_value_of(matches, "config").map(PathBuf::from),
        now,
        output_format: OutputFormat::from_matches_value(global_value_of(matches, "output_format")),
    };

    let command = match matches.subcommand() {
        (name, Some(sub)) if admin::SUBCOMMANDS.contains(&name) => {
            CliCommand::Admin(admin::parse_admin_command(name, sub)?)
        }
        (name, Some(sub)) if commitment::SUBCOMMANDS.contains(&name) => {
            CliCommand::Commitment(commitment::parse_commitment_command(name, sub)?)
        }
        (name, _) => {
            return Err(CliError::BadParameter(format!(
                "unknown command '{name}'"
            )))
        }
    };
    Ok((config, command))
}

// ── Command Processing ──────────────────────────────────────────────

pub fn process_command(config: &CliConfig, command: &CliCommand) -> ProcessResult {
    if let CliCommand::Admin(AdminCliCommand::Init {
        admin,
        escrow,
        pool,
        force,
    }) = command
    {
        return admin::process_init(config, admin, escrow, pool, *force);
    }

    let mut state = CliState::load(&config.state_path)?;
    if let Some(policy) = config.policy()? {
        info!("applying policy from {:?}", config.config_path);
        state.config = policy;
    }
    let engine = state.into_engine(config.clock())?;

    let output = match command {
        CliCommand::Admin(command) => admin::process_admin_command(&engine, config, command)?,
        CliCommand::Commitment(command) => {
            commitment::process_commitment_command(&engine, config, command)?
        }
    };

    if !command.is_read_only() || config.config_path.is_some() {
        CliState::from_engine(&engine).save(&config.state_path)?;
    }
    Ok(output)
}
