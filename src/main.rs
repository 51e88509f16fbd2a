mod bridge;
mod engine;
mod error;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use engine::classify::classify;
use engine::rules::{Action, Condition, Domain, Rule, RuleId};
use engine::search::{convert_matches, SearchFlags};
use settings::Store;

#[derive(Parser)]
#[command(name = "caseconvert", about = "Convert identifiers between snake_case and camelCase")]
struct Cli {
    /// Settings database (defaults to ~/.caseconvert/caseconvert.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Settings profile to use
    #[arg(short, long, global = true, default_value = "default")]
    profile: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert each identifier to the opposite case
    Convert {
        #[arg(required = true)]
        text: Vec<String>,

        /// Produce PascalCase instead of camelCase
        #[arg(short, long)]
        capitalize: bool,
    },

    /// Print the detected case of each identifier
    Classify {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Convert every occurrence of a search term in a file (or stdin)
    Replace {
        #[arg(short, long)]
        search: String,

        /// Read from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(long)]
        case_sensitive: bool,

        #[arg(long)]
        whole_word: bool,

        #[arg(long)]
        word_start: bool,
    },

    /// Manage conversion rules
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Set whether camelCase output starts with a capital letter
    SetCapitalize {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },

    /// Replace the profile's rules with those in an encoded rules file
    Import { file: String },

    /// Write the profile's rules to a file
    Export { file: String },

    /// List all stored profiles
    Profiles,

    /// Serve conversion requests from an editor over stdio
    Serve,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// List rules in match order
    List,

    /// Append a rule
    Add {
        #[arg(long, value_enum)]
        domain: DomainArg,

        /// `always`, `prefix:<value>` or `suffix:<value>`
        #[arg(long, default_value = "always")]
        when: String,

        #[arg(long)]
        remove_prefix: Vec<String>,

        #[arg(long)]
        remove_suffix: Vec<String>,

        #[arg(long)]
        add_prefix: Vec<String>,

        #[arg(long)]
        add_suffix: Vec<String>,

        #[arg(long)]
        label: Option<String>,
    },

    /// Delete a rule
    Remove { id: RuleId },

    /// Enable a rule
    Enable { id: RuleId },

    /// Disable a rule
    Disable { id: RuleId },

    /// Set (or clear, with an empty string) a rule's label
    Label { id: RuleId, label: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    SnakeToCamel,
    CamelToSnake,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::SnakeToCamel => Domain::SnakeToCamel,
            DomainArg::CamelToSnake => Domain::CamelToSnake,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = match &cli.db {
        Some(path) => Store::open(path)?,
        None => Store::open_default()?,
    };
    let profile = cli.profile;

    match cli.command {
        Commands::Convert { text, capitalize } => {
            let mut state = store.load_or_default(&profile)?;
            state.capitalize |= capitalize;

            let mut converted = 0;
            for item in &text {
                match state.try_convert(item) {
                    Ok(out) => {
                        println!("{out}");
                        converted += 1;
                    }
                    Err(e) => eprintln!("{item}: {e}"),
                }
            }
            if converted == 0 {
                std::process::exit(1);
            }
        }

        Commands::Classify { text } => {
            for item in &text {
                println!("{}\t{}", item, classify(item));
            }
        }

        Commands::Replace {
            search,
            file,
            case_sensitive,
            whole_word,
            word_start,
        } => {
            let state = store.load_or_default(&profile)?;
            let input = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let flags = SearchFlags {
                case_sensitive,
                whole_word,
                word_start,
            };
            let result = convert_matches(&input, &search, flags, &state);
            print!("{}", result.text);
            eprintln!("{} replacement(s)", result.replacements);
        }

        Commands::Rules { command } => run_rules_command(&store, &profile, command)?,

        Commands::SetCapitalize { value } => {
            let mut state = store.load_or_default(&profile)?;
            state.capitalize = value;
            store.save(&profile, &state)?;
            eprintln!("Profile '{}': capitalize = {}", profile, value);
        }

        Commands::Import { file } => {
            let state = store.import_from_file(&profile, &file)?;
            eprintln!(
                "Imported {} rule(s) into profile '{}'",
                state.rules.len(),
                profile
            );
        }

        Commands::Export { file } => {
            store.export_to_file(&profile, &file)?;
            eprintln!("Exported profile '{}' rules to: {}", profile, file);
        }

        Commands::Profiles => {
            let profiles = store.list()?;
            if profiles.is_empty() {
                eprintln!("No profiles in store.");
            } else {
                eprintln!("{:<20} {:<11} {:<6} {}", "PROFILE", "CAPITALIZE", "RULES", "UPDATED");
                eprintln!("{}", "-".repeat(60));
                for p in &profiles {
                    eprintln!(
                        "{:<20} {:<11} {:<6} {}",
                        p.name, p.capitalize, p.rule_count, p.updated_at
                    );
                }
            }
        }

        Commands::Serve => {
            let state = store.load_or_default(&profile)?;
            tracing::info!(
                "Loaded profile '{}' with {} rules (capitalize: {})",
                profile,
                state.rules.len(),
                state.capitalize
            );
            bridge::stdio::run(state, profile, store).await?;
        }
    }

    Ok(())
}

fn run_rules_command(store: &Store, profile: &str, command: RulesCommand) -> Result<()> {
    let mut state = store.load_or_default(profile)?;

    match command {
        RulesCommand::List => {
            if state.rules.is_empty() {
                eprintln!("No rules in profile '{profile}'.");
                return Ok(());
            }
            println!(
                "{:<4} {:<8} {:<14} {:<16} {:<20} {}",
                "ID", "ENABLED", "DOMAIN", "LABEL", "CONDITION", "ACTIONS"
            );
            for rule in state.rules.get_rules() {
                let domain = match rule.domain {
                    Domain::SnakeToCamel => "snake->camel",
                    Domain::CamelToSnake => "camel->snake",
                };
                println!(
                    "{:<4} {:<8} {:<14} {:<16} {:<20} {}",
                    rule.id,
                    rule.enabled,
                    domain,
                    rule.display_label(),
                    rule.condition.to_string(),
                    rule.describe_actions()
                );
            }
            return Ok(());
        }

        RulesCommand::Add {
            domain,
            when,
            remove_prefix,
            remove_suffix,
            add_prefix,
            add_suffix,
            label,
        } => {
            let condition = parse_condition(&when)?;
            // Same order as the fields of the rule dialog.
            let actions = remove_prefix
                .into_iter()
                .map(Action::remove_prefix)
                .chain(remove_suffix.into_iter().map(Action::remove_suffix))
                .chain(add_prefix.into_iter().map(Action::add_prefix))
                .chain(add_suffix.into_iter().map(Action::add_suffix))
                .collect();

            let mut rule = Rule::new(domain.into(), condition, actions)?;
            if let Some(label) = label.filter(|l| !l.is_empty()) {
                rule = rule.with_label(label);
            }
            let id = state.rules.add_rule(rule);
            eprintln!("Added rule {id}");
        }

        RulesCommand::Remove { id } => {
            if !state.rules.remove_rule(id) {
                anyhow::bail!("No rule with id {id}");
            }
            eprintln!("Removed rule {id}");
        }

        RulesCommand::Enable { id } => {
            state.rules.set_enabled(id, true)?;
        }

        RulesCommand::Disable { id } => {
            state.rules.set_enabled(id, false)?;
        }

        RulesCommand::Label { id, label } => {
            state.rules.set_label(id, &label)?;
        }
    }

    store.save(profile, &state)
}

/// `always`, `prefix:<value>` or `suffix:<value>`.
fn parse_condition(when: &str) -> Result<Condition> {
    if when == "always" {
        return Ok(Condition::always_true());
    }
    if let Some(value) = when.strip_prefix("prefix:") {
        return Ok(Condition::has_prefix(value)?);
    }
    if let Some(value) = when.strip_prefix("suffix:") {
        return Ok(Condition::has_suffix(value)?);
    }
    anyhow::bail!("Unknown condition '{when}', expected always, prefix:<value> or suffix:<value>")
}
