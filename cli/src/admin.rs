//! Ledger setup: initialisation, the in-memory token, treasury funding and
//! the operator registry.

use {
    crate::{
        clap_app::{is_valid_amount, is_valid_pubkey},
        cli::{amount_of, pubkey_of, CliConfig, CliError, ProcessResult},
        output::{CliBalance, CliMessage},
        state::{CliEngine, CliState, StateError},
    },
    clap::{App, Arg, ArgMatches, SubCommand},
    goodcommit_commitment_stake::{
        amount::{format_token_amount, Amount},
        config::EngineAccounts,
        token::TokenLedger,
    },
    log::*,
    solana_pubkey::Pubkey,
};

pub const SUBCOMMANDS: [&str; 7] = [
    "init",
    "mint",
    "approve",
    "balance",
    "fund-treasury",
    "add-operator",
    "remove-operator",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCliCommand {
    Init {
        admin: Pubkey,
        escrow: Pubkey,
        pool: Pubkey,
        force: bool,
    },
    Mint {
        to: Pubkey,
        amount: Amount,
    },
    Approve {
        owner: Pubkey,
        amount: Amount,
    },
    Balance {
        account: Pubkey,
    },
    FundTreasury {
        funder: Pubkey,
        amount: Amount,
    },
    AddOperator {
        admin: Pubkey,
        operator: Pubkey,
    },
    RemoveOperator {
        admin: Pubkey,
        operator: Pubkey,
    },
}

impl AdminCliCommand {
    pub fn is_read_only(&self) -> bool {
        matches!(self, AdminCliCommand::Balance { .. })
    }
}

// ── Subcommand Definition (clap) ────────────────────────────────────

fn pubkey_arg<'a>(name: &'a str, value_name: &'a str, help: &'a str) -> Arg<'a, 'a> {
    Arg::with_name(name)
        .value_name(value_name)
        .takes_value(true)
        .required(true)
        .validator(is_valid_pubkey)
        .help(help)
}

fn amount_arg<'a>(index: u64, help: &'a str) -> Arg<'a, 'a> {
    Arg::with_name("amount")
        .index(index)
        .value_name("AMOUNT")
        .takes_value(true)
        .required(true)
        .validator(is_valid_amount)
        .help(help)
}

pub trait AdminSubCommands {
    fn admin_subcommands(self) -> Self;
}

impl AdminSubCommands for App<'_, '_> {
    fn admin_subcommands(self) -> Self {
        self.subcommand(
            SubCommand::with_name("init")
                .about("Create a new, empty ledger state file")
                .arg(
                    pubkey_arg("admin", "ADMIN", "Identity allowed to manage operators")
                        .long("admin"),
                )
                .arg(
                    pubkey_arg(
                        "escrow",
                        "ESCROW",
                        "Token account that holds principal and treasury",
                    )
                    .long("escrow"),
                )
                .arg(
                    pubkey_arg("pool", "POOL", "Token account that receives slashed principal")
                        .long("pool"),
                )
                .arg(
                    Arg::with_name("force")
                        .long("force")
                        .takes_value(false)
                        .help("Overwrite an existing state file"),
                ),
        )
        .subcommand(
            SubCommand::with_name("mint")
                .about("Credit G$ to an account in the local token")
                .arg(pubkey_arg("to", "ADDRESS", "Account to credit").index(1))
                .arg(amount_arg(2, "Amount of G$ to mint")),
        )
        .subcommand(
            SubCommand::with_name("approve")
                .about("Set how much G$ the escrow may pull from an account")
                .arg(pubkey_arg("owner", "OWNER", "Account granting the allowance").index(1))
                .arg(amount_arg(2, "Allowance in G$; replaces any previous allowance")),
        )
        .subcommand(
            SubCommand::with_name("balance")
                .about("Show an account's G$ balance and escrow allowance")
                .arg(pubkey_arg("account", "ADDRESS", "Account to inspect").index(1)),
        )
        .subcommand(
            SubCommand::with_name("fund-treasury")
                .about("Deposit G$ into the reward treasury")
                .arg(
                    pubkey_arg("from", "FUNDER", "Account the deposit is pulled from")
                        .long("from"),
                )
                .arg(amount_arg(1, "Amount of G$ to deposit")),
        )
        .subcommand(
            SubCommand::with_name("add-operator")
                .about("Authorize an operator to check owners in and slash overdue stakes")
                .arg(pubkey_arg("admin", "ADMIN", "Registry admin").long("admin"))
                .arg(pubkey_arg("operator", "OPERATOR", "Operator to add").index(1)),
        )
        .subcommand(
            SubCommand::with_name("remove-operator")
                .about("Revoke an operator")
                .arg(pubkey_arg("admin", "ADMIN", "Registry admin").long("admin"))
                .arg(pubkey_arg("operator", "OPERATOR", "Operator to remove").index(1)),
        )
    }
}

// ── Argument Parsing ────────────────────────────────────────────────

pub fn parse_admin_command(
    name: &str,
    matches: &ArgMatches<'_>,
) -> Result<AdminCliCommand, CliError> {
    let command = match name {
        "init" => AdminCliCommand::Init {
            admin: pubkey_of(matches, "admin")?,
            escrow: pubkey_of(matches, "escrow")?,
            pool: pubkey_of(matches, "pool")?,
            force: matches.is_present("force"),
        },
        "mint" => AdminCliCommand::Mint {
            to: pubkey_of(matches, "to")?,
            amount: amount_of(matches, "amount")?,
        },
        "approve" => AdminCliCommand::Approve {
            owner: pubkey_of(matches, "owner")?,
            amount: amount_of(matches, "amount")?,
        },
        "balance" => AdminCliCommand::Balance {
            account: pubkey_of(matches, "account")?,
        },
        "fund-treasury" => AdminCliCommand::FundTreasury {
            funder: pubkey_of(matches, "from")?,
            amount: amount_of(matches, "amount")?,
        },
        "add-operator" => AdminCliCommand::AddOperator {
            admin: pubkey_of(matches, "admin")?,
            operator: pubkey_of(matches, "operator")?,
        },
        "remove-operator" => AdminCliCommand::RemoveOperator {
            admin: pubkey_of(matches, "admin")?,
            operator: pubkey_of(matches, "operator")?,
        },
        _ => return Err(CliError::BadParameter(format!("unknown command '{name}'"))),
    };
    Ok(command)
}

// ── Command Processing ──────────────────────────────────────────────

pub fn process_init(
    config: &CliConfig,
    admin: &Pubkey,
    escrow: &Pubkey,
    pool: &Pubkey,
    force: bool,
) -> ProcessResult {
    if config.state_path.exists() && !force {
        return Err(StateError::AlreadyInitialized(config.state_path.clone()).into());
    }
    if escrow == pool {
        return Err(CliError::BadParameter(
            "escrow and pool must be different accounts".to_string(),
        ));
    }
    let policy = config.policy()?.unwrap_or_default();
    policy.validate()?;

    let state = CliState::new(policy, EngineAccounts::new(*escrow, *pool), *admin);
    state.save(&config.state_path)?;
    info!("initialised ledger at {}", config.state_path.display());

    config.output_format.formatted_string(&CliMessage::ok(format!(
        "Initialised ledger at {}\n  Admin:   {admin}\n  Escrow:  {escrow}\n  Pool:    {pool}",
        config.state_path.display()
    )))
}

pub fn process_admin_command(
    engine: &CliEngine,
    config: &CliConfig,
    command: &AdminCliCommand,
) -> ProcessResult {
    let escrow = engine.accounts().escrow;
    let message = match command {
        AdminCliCommand::Init { .. } => {
            return Err(CliError::BadParameter(
                "init does not run against an existing ledger".to_string(),
            ))
        }
        AdminCliCommand::Mint { to, amount } => {
            engine
                .token()
                .mint(to, *amount)
                .map_err(|err| CliError::BadParameter(err.to_string()))?;
            CliMessage::ok(format!("Minted {} G$ to {to}", format_token_amount(*amount)))
        }
        AdminCliCommand::Approve { owner, amount } => {
            engine.token().approve(owner, &escrow, *amount);
            CliMessage::ok(format!(
                "Escrow may now pull up to {} G$ from {owner}",
                format_token_amount(*amount)
            ))
        }
        AdminCliCommand::Balance { account } => {
            let token = engine.token();
            let balance = token
                .balance_of(account)
                .map_err(|err| CliError::BadParameter(err.to_string()))?;
            let allowance = token
                .allowance(account, &escrow)
                .map_err(|err| CliError::BadParameter(err.to_string()))?;
            return config
                .output_format
                .formatted_string(&CliBalance::new(account, balance, allowance));
        }
        AdminCliCommand::FundTreasury { funder, amount } => {
            engine.fund_treasury(funder, *amount)?;
            CliMessage::ok(format!(
                "Treasury funded with {} G$; {} G$ available",
                format_token_amount(*amount),
                format_token_amount(engine.treasury_available())
            ))
        }
        AdminCliCommand::AddOperator { admin, operator } => {
            let added = engine.add_operator(admin, *operator)?;
            CliMessage::ok(if added {
                format!("Operator {operator} added")
            } else {
                format!("{operator} is already an operator")
            })
        }
        AdminCliCommand::RemoveOperator { admin, operator } => {
            let removed = engine.remove_operator(admin, operator)?;
            CliMessage::ok(if removed {
                format!("Operator {operator} removed")
            } else {
                format!("{operator} was not an operator")
            })
        }
    };
    config.output_format.formatted_string(&message)
}
