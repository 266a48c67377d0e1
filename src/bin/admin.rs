use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use sales_api::cli::{keygen, migrate, seed, useradd};
use sales_config::{AuthConfig, DatabaseConfig};
use sales_db::init_db_pool;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "sales-admin")]
#[command(about = "Sales API admin - schema, seed data, users and signing keys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Load the demo users, products and sales
    Seed,
    /// Create an administrator account
    Useradd {
        /// Email address of the new user
        email: String,

        /// Password (will be prompted securely if not provided)
        password: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Generate an RSA signing key pair
    Keygen {
        /// Key id; the public key is written to `<keys dir>/<kid>.pem`
        #[arg(long)]
        kid: Option<String>,

        /// Modulus size in bits
        #[arg(long, default_value = "2048")]
        bits: usize,

        /// Overwrite an existing private key
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command).await {
        eprintln!("\n❌ Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => {
            let pool = init_db_pool(&DatabaseConfig::from_env());
            migrate(&pool).await?;
            println!("✅ Migrations complete");
        }
        Commands::Seed => {
            let pool = init_db_pool(&DatabaseConfig::from_env());
            seed(&pool).await?;
            println!("✅ Seed data complete");
        }
        Commands::Useradd {
            email,
            password,
            name,
            yes,
        } => handle_useradd(email, password, name, yes).await?,
        Commands::Keygen { kid, bits, force } => handle_keygen(kid, bits, force)?,
    }
    Ok(())
}

async fn handle_useradd(
    email: String,
    password: Option<String>,
    name: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Name")
            .interact_text()
            .context("reading name")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("reading password")?,
    };

    if !yes {
        let proceed = Confirm::new()
            .with_prompt(format!("Create admin user {} <{}>?", name, email))
            .default(false)
            .interact()
            .context("reading confirmation")?;
        if !proceed {
            println!("Aborted");
            return Ok(());
        }
    }

    let pool = init_db_pool(&DatabaseConfig::from_env());
    let user = useradd(&pool, &name, &email, &password).await?;

    println!("\n✅ User created successfully!");
    println!("   ID: {}", user.id);
    println!("   Email: {}", user.email);
    println!("   Roles: {}", user.roles.join(", "));
    Ok(())
}

fn handle_keygen(kid: Option<String>, bits: usize, force: bool) -> anyhow::Result<()> {
    let config = AuthConfig::from_env();
    let kid = kid
        .or_else(|| (!config.key_id.is_empty()).then(|| config.key_id.clone()))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let generated = keygen(
        &PathBuf::from(&config.private_key_file),
        &PathBuf::from(&config.keys_dir),
        &kid,
        bits,
        force,
    )?;

    println!("✅ Key pair generated");
    println!("   Key id: {}", kid);
    println!("   Private key: {}", generated.private_key.display());
    println!("   Public key: {}", generated.public_key.display());
    println!("   Set SALES_AUTH_KEY_ID={} to sign with it", kid);
    Ok(())
}
