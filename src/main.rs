// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Command line front end for the Turbo Badges API
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::path::PathBuf;

use turbo_badges::config::{self, Config};
use turbo_badges::guard::{require_auth, Guard, GuardDecision, PrintNavigator, Roles};
use turbo_badges::models::UpdateProfileInput;
use turbo_badges::roster::{BadgeRoster, EntryForm};
use turbo_badges::session::PhotoUpload;
use turbo_badges::SessionManager;

/// Environment variable holding the password for `--email`
const PASSWORD_ENV: &str = "TURBO_BADGES_PASSWORD";

/// Turbo Badges client
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the Turbo Badges API
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds before expiry at which the access credential is renewed
    #[arg(long)]
    renewal_lead_secs: Option<i64>,

    /// Sign in with a local account instead of the existing server session
    #[arg(long)]
    email: Option<String>,

    /// Password of the local account
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    password: Option<String>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the signed-in user's profile
    Whoami,
    /// Print the identity provider sign-in location
    LoginUrl,
    /// Close the server-side session
    Logout,
    /// Change the first and/or last name
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Upload a new profile photo
    UploadPhoto {
        path: PathBuf,
        /// Media type to declare, guessed from the extension otherwise
        #[arg(long)]
        media_type: Option<String>,
    },
    /// List the user directory
    Users,
    /// Build a badge roster and print it as JSON
    Roster {
        /// Directory user ids to add
        #[arg(long = "add")]
        user_ids: Vec<String>,
        /// Manual entries as "First,Last,email[,commission]"
        #[arg(long = "manual")]
        manual: Vec<String>,
    },
}

fn parse_manual_entry(value: &str) -> Result<EntryForm> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    match fields.as_slice() {
        [first, last, email] | [first, last, email, _] => Ok(EntryForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            commission: fields.get(3).map(|c| c.to_string()).unwrap_or_default(),
            ..EntryForm::default()
        }),
        _ => Err(anyhow::anyhow!(
            "Invalid manual entry '{}': expected First,Last,email[,commission]",
            value
        )),
    }
}

/// Sign in with the local account when one is given, otherwise try to
/// restore the server session.
async fn open_session(session: &SessionManager, args: &Args) -> Result<()> {
    match (&args.email, &args.password) {
        (Some(email), Some(password)) => {
            session
                .login_with_local(email, password)
                .await
                .context("Local sign-in failed")?;
        }
        (Some(_), None) => {
            return Err(anyhow::anyhow!(
                "--email requires a password in {}",
                PASSWORD_ENV
            ));
        }
        _ => session.bootstrap().await,
    }
    Ok(())
}

async fn run(session: &SessionManager, args: &Args, command: &Command) -> Result<()> {
    if let Command::LoginUrl = command {
        session.login(&PrintNavigator);
        return Ok(());
    }

    if let Command::Logout = command {
        if let Err(err) = open_session(session, args).await {
            warn!("Signing out without a session: {:#}", err);
        }
        session.logout().await;
        println!("Signed out");
        return Ok(());
    }

    open_session(session, args).await?;
    let snapshot = session.snapshot().await;
    if !require_auth(&snapshot).is_authenticated {
        session.login(&PrintNavigator);
        return Err(anyhow::anyhow!("Not signed in"));
    }

    match command {
        Command::LoginUrl | Command::Logout => {}
        Command::Whoami => {
            let user = session.reload_profile().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::UpdateProfile {
            first_name,
            last_name,
        } => {
            let input = UpdateProfileInput::new(first_name.clone(), last_name.clone());
            if input.is_empty() {
                return Err(anyhow::anyhow!(
                    "Nothing to update: give --first-name and/or --last-name"
                ));
            }
            let user = session.update_profile(&input).await?;
            println!("Profile updated: {}", user.display_name());
        }
        Command::UploadPhoto { path, media_type } => {
            let photo = PhotoUpload::from_path(path, media_type.clone())?;
            match session.upload_profile_photo(&photo).await? {
                Some(url) => println!("Photo uploaded: {}", url),
                None => println!("Photo uploaded"),
            }
        }
        Command::Users => {
            let mut roster = BadgeRoster::new();
            if !roster.load_directory(session).await? {
                return Err(anyhow::anyhow!("User directory is not available"));
            }
            for user in roster.directory() {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id,
                    user.display_name(),
                    user.email,
                    user.role.name
                );
            }
        }
        Command::Roster { user_ids, manual } => {
            let guard = Guard::new().allow(Roles::Agent).redirect_to("/profile");
            if guard.enforce(&snapshot, &PrintNavigator) != GuardDecision::Granted {
                return Err(anyhow::anyhow!("Badge roster requires the agent role"));
            }

            let mut roster = BadgeRoster::new();
            roster.load_directory(session).await?;
            for user_id in user_ids {
                roster.add_existing(user_id)?;
            }
            for value in manual {
                roster.add_manual(&parse_manual_entry(value)?)?;
            }
            println!("{}", serde_json::to_string_pretty(roster.entries())?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    // Check if --show-config-schema flag is set
    if args.show_config_schema {
        return config::output_config_schema();
    }

    let command = match &args.command {
        Some(command) => command,
        None => {
            return Err(anyhow::anyhow!(
                "No command given, see --help for the available commands"
            ))
        }
    };

    // Load configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;
    config.apply_env();
    config.apply_args(args.api_url.clone(), args.renewal_lead_secs);
    config.validate()?;
    debug!("Using API at {}", config.api.base_url);

    let session = SessionManager::new(&config).context("Failed to build the HTTP client")?;
    let result = run(&session, &args, command).await;

    session.shutdown();
    info!("Done");
    result
}
