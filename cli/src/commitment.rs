//! Owner and operator commands against commitment stakes.

use {
    crate::{
        clap_app::{is_parsable, is_valid_amount, is_valid_category, is_valid_pubkey},
        cli::{amount_of, category_of, parse_value, pubkey_of, CliConfig, CliError, ProcessResult},
        output::{
            CliCheckIn, CliOverdueList, CliPayout, CliPool, CliSlash, CliStakeInfo, CliStakeList,
        },
        state::CliEngine,
    },
    clap::{App, Arg, ArgMatches, SubCommand},
    goodcommit_commitment_stake::{
        amount::{format_token_amount, Amount},
        state::{HabitCategory, StakeKey},
        token::TokenLedger,
    },
    solana_pubkey::Pubkey,
};

pub const SUBCOMMANDS: [&str; 8] = [
    "plant", "check-in", "harvest", "unstake", "slash", "info", "overdue", "pool",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitmentCliCommand {
    Plant {
        owner: Pubkey,
        category: HabitCategory,
        amount: Amount,
        duration_periods: u64,
    },
    CheckIn {
        operator: Pubkey,
        owner: Pubkey,
        category: HabitCategory,
    },
    Harvest {
        owner: Pubkey,
        category: HabitCategory,
    },
    Unstake {
        owner: Pubkey,
        category: HabitCategory,
    },
    Slash {
        operator: Pubkey,
        owner: Pubkey,
        category: HabitCategory,
    },
    Info {
        owner: Pubkey,
        category: Option<HabitCategory>,
    },
    Overdue,
    Pool,
}

impl CommitmentCliCommand {
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            CommitmentCliCommand::Info { .. }
                | CommitmentCliCommand::Overdue
                | CommitmentCliCommand::Pool
        )
    }
}

// ── Subcommand Definition (clap) ────────────────────────────────────

fn owner_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name("owner")
        .index(1)
        .value_name("OWNER")
        .takes_value(true)
        .required(true)
        .validator(is_valid_pubkey)
        .help("Owner of the stake")
}

fn category_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name("category")
        .index(2)
        .value_name("CATEGORY")
        .takes_value(true)
        .required(true)
        .validator(is_valid_category)
        .help("Habit category: health, academics, or focus")
}

fn operator_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name("operator")
        .long("operator")
        .value_name("OPERATOR")
        .takes_value(true)
        .required(true)
        .validator(is_valid_pubkey)
        .help("Registered operator submitting the call")
}

pub trait CommitmentSubCommands {
    fn commitment_subcommands(self) -> Self;
}

impl CommitmentSubCommands for App<'_, '_> {
    fn commitment_subcommands(self) -> Self {
        self.subcommand(
            SubCommand::with_name("plant")
                .about("Lock G$ against a habit for a number of days")
                .arg(owner_arg())
                .arg(category_arg())
                .arg(
                    Arg::with_name("amount")
                        .index(3)
                        .value_name("AMOUNT")
                        .takes_value(true)
                        .required(true)
                        .validator(is_valid_amount)
                        .help("Principal in G$"),
                )
                .arg(
                    Arg::with_name("duration")
                        .index(4)
                        .value_name("DAYS")
                        .takes_value(true)
                        .required(true)
                        .validator(is_parsable::<u64>)
                        .help("Number of check-in periods to commit to"),
                ),
        )
        .subcommand(
            SubCommand::with_name("check-in")
                .about("Record a verified check-in for the current period")
                .arg(operator_arg())
                .arg(owner_arg())
                .arg(category_arg()),
        )
        .subcommand(
            SubCommand::with_name("harvest")
                .about("Withdraw principal plus reward of a completed commitment")
                .arg(owner_arg())
                .arg(category_arg()),
        )
        .subcommand(
            SubCommand::with_name("unstake")
                .about("Leave an active commitment early (accrued reward is forfeited)")
                .arg(owner_arg())
                .arg(category_arg()),
        )
        .subcommand(
            SubCommand::with_name("slash")
                .about("Forfeit an overdue stake's principal to the community pool")
                .arg(operator_arg())
                .arg(owner_arg())
                .arg(category_arg()),
        )
        .subcommand(
            SubCommand::with_name("info")
                .about("Show an owner's stakes")
                .arg(owner_arg())
                .arg(category_arg().required(false).help(
                    "Habit category: health, academics, or focus [default: all live stakes]",
                )),
        )
        .subcommand(SubCommand::with_name("overdue").about("List stakes that can be slashed now"))
        .subcommand(
            SubCommand::with_name("pool").about("Show the community pool and reward treasury"),
        )
    }
}

// ── Argument Parsing ────────────────────────────────────────────────

pub fn parse_commitment_command(
    name: &str,
    matches: &ArgMatches<'_>,
) -> Result<CommitmentCliCommand, CliError> {
    let command = match name {
        "plant" => CommitmentCliCommand::Plant {
            owner: pubkey_of(matches, "owner")?,
            category: category_of(matches, "category")?,
            amount: amount_of(matches, "amount")?,
            duration_periods: parse_value(matches, "duration")?,
        },
        "check-in" => CommitmentCliCommand::CheckIn {
            operator: pubkey_of(matches, "operator")?,
            owner: pubkey_of(matches, "owner")?,
            category: category_of(matches, "category")?,
        },
        "harvest" => CommitmentCliCommand::Harvest {
            owner: pubkey_of(matches, "owner")?,
            category: category_of(matches, "category")?,
        },
        "unstake" => CommitmentCliCommand::Unstake {
            owner: pubkey_of(matches, "owner")?,
            category: category_of(matches, "category")?,
        },
        "slash" => CommitmentCliCommand::Slash {
            operator: pubkey_of(matches, "operator")?,
            owner: pubkey_of(matches, "owner")?,
            category: category_of(matches, "category")?,
        },
        "info" => CommitmentCliCommand::Info {
            owner: pubkey_of(matches, "owner")?,
            category: matches
                .is_present("category")
                .then(|| category_of(matches, "category"))
                .transpose()?,
        },
        "overdue" => CommitmentCliCommand::Overdue,
        "pool" => CommitmentCliCommand::Pool,
        _ => return Err(CliError::BadParameter(format!("unknown command '{name}'"))),
    };
    Ok(command)
}

// ── Command Processing ──────────────────────────────────────────────

fn stake_info(engine: &CliEngine, owner: &Pubkey, category: HabitCategory) -> CliStakeInfo {
    let view = engine.get_stake_info(owner, category);
    let projected = view
        .status
        .is_live()
        .then(|| engine.projected_reward(owner, category).ok())
        .flatten();
    CliStakeInfo::new(
        owner,
        category,
        &view,
        engine.is_check_in_overdue(owner, category),
        projected,
    )
}

pub fn process_commitment_command(
    engine: &CliEngine,
    config: &CliConfig,
    command: &CommitmentCliCommand,
) -> ProcessResult {
    let format = config.output_format;
    match *command {
        CommitmentCliCommand::Plant {
            owner,
            category,
            amount,
            duration_periods,
        } => {
            engine.plant(&owner, category, amount, duration_periods)?;
            format.formatted_string(&stake_info(engine, &owner, category))
        }
        CommitmentCliCommand::CheckIn {
            operator,
            owner,
            category,
        } => {
            let receipt = engine.check_in(&operator, &owner, category)?;
            format.formatted_string(&CliCheckIn::new(&StakeKey::new(owner, category), &receipt))
        }
        CommitmentCliCommand::Harvest { owner, category } => {
            let payout = engine.harvest_rewards(&owner, category)?;
            format.formatted_string(&CliPayout::new(&StakeKey::new(owner, category), &payout))
        }
        CommitmentCliCommand::Unstake { owner, category } => {
            let payout = engine.unstake(&owner, category)?;
            format.formatted_string(&CliPayout::new(&StakeKey::new(owner, category), &payout))
        }
        CommitmentCliCommand::Slash {
            operator,
            owner,
            category,
        } => {
            let slashed = engine.slash_stake(&operator, &owner, category)?;
            format.formatted_string(&CliSlash {
                owner: owner.to_string(),
                category: category.to_string(),
                slashed: format_token_amount(slashed),
                total_slashed_to_pool: format_token_amount(engine.total_slashed_to_pool()),
            })
        }
        CommitmentCliCommand::Info {
            owner,
            category: Some(category),
        } => format.formatted_string(&stake_info(engine, &owner, category)),
        CommitmentCliCommand::Info {
            owner,
            category: None,
        } => {
            let stakes = engine
                .stakes_of(&owner)
                .into_iter()
                .map(|(category, _)| stake_info(engine, &owner, category))
                .collect();
            format.formatted_string(&CliStakeList {
                owner: owner.to_string(),
                stakes,
            })
        }
        CommitmentCliCommand::Overdue => {
            let stakes = engine
                .overdue_stakes()
                .iter()
                .map(|key| stake_info(engine, &key.owner, key.category))
                .collect();
            format.formatted_string(&CliOverdueList {
                now: engine.now(),
                stakes,
            })
        }
        CommitmentCliCommand::Pool => {
            let accounts = engine.accounts();
            let balance = |id: &Pubkey| engine.token().balance_of(id).unwrap_or_default();
            format.formatted_string(&CliPool::new(
                &accounts.escrow,
                &accounts.pool,
                &engine.treasury_book(),
                balance(&accounts.escrow),
                balance(&accounts.pool),
            ))
        }
    }
}
