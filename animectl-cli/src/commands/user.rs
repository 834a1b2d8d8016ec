//! Account management commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use animectl_server::auth::password;
use animectl_server::db::{self, DbError, PgUserRepo, UserRepository};
use animectl_server::models::{Role, User};
use animectl_server::AppConfig;

/// Arguments for the hash-password command
#[derive(Parser, Debug)]
pub struct HashPasswordArgs {
    /// Raw password to encode
    pub password: String,
}

/// Print an encoded password suitable for the config file or the user table
pub fn run_hash_password(args: HashPasswordArgs) -> Result<()> {
    println!("{}", password::encode(&args.password));
    Ok(())
}

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account in the database
    Add(AddUserArgs),
}

#[derive(Parser, Debug)]
pub struct AddUserArgs {
    /// Login name (must be unique)
    #[arg(long)]
    pub username: String,

    /// Raw password; stored encoded
    #[arg(long)]
    pub password: String,

    /// Display name (defaults to the username)
    #[arg(long)]
    pub name: Option<String>,

    /// Roles to grant (USER, ADMIN); repeat or comma-separate
    #[arg(long, value_delimiter = ',', default_value = "USER")]
    pub roles: Vec<String>,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

fn parse_roles(raw: &[String]) -> Result<Vec<Role>> {
    let roles = raw
        .iter()
        .map(|r| r.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()?;
    if roles.is_empty() {
        bail!("at least one role is required");
    }
    Ok(roles)
}

pub async fn run_user(args: UserArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        UserCommand::Add(add) => run_add(add, config_path).await,
    }
}

async fn run_add(args: AddUserArgs, config_path: Option<&Path>) -> Result<()> {
    let roles = parse_roles(&args.roles)?;

    let config = AppConfig::load(config_path).context("Failed to load configuration")?;
    let database_url = args
        .database_url
        .or_else(|| config.database.url.clone())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or config file")?;

    let pool = db::connect(&database_url, &config.database)
        .await
        .context("Failed to create database pool")?;
    let users = PgUserRepo::new(pool);

    let user = User {
        id: None,
        name: args.name.unwrap_or_else(|| args.username.clone()),
        username: args.username,
        password: password::encode(&args.password),
        roles,
    };

    match users.create(user).await {
        Ok(created) => {
            println!(
                "Created user '{}' (id {})",
                created.username,
                created.id.unwrap_or_default()
            );
            Ok(())
        }
        Err(DbError::Conflict { id, .. }) => bail!("user '{}' already exists", id),
        Err(e) => Err(e).context("Failed to create user"),
    }
}
