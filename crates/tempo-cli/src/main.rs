use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tempo_cli::commands::{add, change, delete, get, login, print, report, user};
use tempo_cli::{
    AddItem, AddRecord, ChangeItem, ChangeRecord, Cli, Commands, Config, DeleteItem, DeleteRecord,
    GetItem, OutputOptions, PrintItem, Session, UserAction,
};
use tempo_core::NodeKind;

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let options = OutputOptions::from_cli(&cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Login => {
            let session = Session::connect(&cli, &config)?;
            login::run(&mut out, &session)?;
        }
        Commands::User { action } => {
            let session = Session::connect(&cli, &config)?;
            match action {
                UserAction::GetInfo => user::get_info(&mut out, &session, &options)?,
                UserAction::GetSettings => user::get_settings(&mut out, &session, &options)?,
                UserAction::SetSetting { key, value } => {
                    user::set_setting(&mut out, &session, key, value, &options)?;
                }
            }
        }
        Commands::Add { item } => {
            let mut session = Session::connect(&cli, &config)?;
            match item {
                AddItem::Record { record } => match record {
                    AddRecord::Work(data) => {
                        add::record(&mut out, &mut session, data, None, &options)?;
                    }
                    AddRecord::Phonecall { data, call } => {
                        add::record(&mut out, &mut session, data, Some(call), &options)?;
                    }
                },
                AddItem::Project(data) => {
                    add::node(&mut out, &mut session, NodeKind::Project, data, &options)?;
                }
                AddItem::Folder(data) => {
                    add::node(&mut out, &mut session, NodeKind::Folder, data, &options)?;
                }
            }
        }
        Commands::Change { item } => {
            let mut session = Session::connect(&cli, &config)?;
            match item {
                ChangeItem::Record { record } => match record {
                    ChangeRecord::Any(args) => {
                        change::record(&mut out, &mut session, args, None, &options)?;
                    }
                    ChangeRecord::Work(args) => {
                        change::record(&mut out, &mut session, args, Some("work"), &options)?;
                    }
                    ChangeRecord::Phonecall(args) => {
                        change::record(&mut out, &mut session, args, Some("phonecall"), &options)?;
                    }
                },
                ChangeItem::Project(args) => {
                    change::node(&mut out, &mut session, NodeKind::Project, args, &options)?;
                }
                ChangeItem::Folder(args) => {
                    change::node(&mut out, &mut session, NodeKind::Folder, args, &options)?;
                }
            }
        }
        Commands::Delete { item } => {
            let mut session = Session::connect(&cli, &config)?;
            match item {
                DeleteItem::Record { record } => match record {
                    DeleteRecord::Any { id } => {
                        delete::record(&mut out, &session, *id, None, &options)?;
                    }
                    DeleteRecord::Work { id } => {
                        delete::record(&mut out, &session, *id, Some("work"), &options)?;
                    }
                    DeleteRecord::Phonecall { id } => {
                        delete::record(&mut out, &session, *id, Some("phonecall"), &options)?;
                    }
                },
                DeleteItem::Project { id } => {
                    delete::node(&mut out, &mut session, NodeKind::Project, id, &options)?;
                }
                DeleteItem::Folder { id } => {
                    delete::node(&mut out, &mut session, NodeKind::Folder, id, &options)?;
                }
            }
        }
        Commands::Get { what } => {
            let mut session = Session::connect(&cli, &config)?;
            match what {
                GetItem::Records { query, id, json } => {
                    get::records(&mut out, &mut session, query, id.as_deref(), *json, &options)?;
                }
                GetItem::Projects { json } => {
                    get::nodes(&mut out, &mut session, NodeKind::Project, *json, &options)?;
                }
                GetItem::Folders { json } => {
                    get::nodes(&mut out, &mut session, NodeKind::Folder, *json, &options)?;
                }
            }
        }
        Commands::Report(args) => {
            let mut session = Session::connect(&cli, &config)?;
            report::run(&mut out, &mut session, args)?;
        }
        Commands::Print { what } => match what {
            PrintItem::Time { time } => print::time(&mut out, time, &options)?,
            PrintItem::ParentId {
                name,
                project,
                folder,
            } => {
                let mut session = Session::connect(&cli, &config)?;
                print::parent_id(&mut out, &mut session, name, *project, *folder)?;
            }
            PrintItem::Hier {
                query,
                sum_time,
                no_empty,
            } => {
                let mut session = Session::connect(&cli, &config)?;
                print::hier(&mut out, &mut session, query, *sum_time, *no_empty, &options)?;
            }
            PrintItem::Sum { query, sum_total } => {
                let mut session = Session::connect(&cli, &config)?;
                print::sum(&mut out, &mut session, query, *sum_total, &options)?;
            }
        },
    }

    out.flush()?;
    Ok(())
}
