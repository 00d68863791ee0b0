//! VaultDeck CLI - command line interface to a vault-management backend.
//!
//! Drives the same store a graphical frontend would, against the backend
//! endpoint printed by the server on startup (which carries the session
//! token in its fragment).

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use url::Url;

use vaultdeck_client::{
    AppOptionsPatch, HttpGateway, LogLevel, VaultCredential, VaultOptionsPatch,
};
use vaultdeck_common::SecretString;
use vaultdeck_store::{ConfigStore, ErrorChannel, VaultStore, MINIMAL_PASSWORD_LENGTH};

#[derive(Parser)]
#[command(name = "vaultdeck")]
#[command(about = "VaultDeck - vault management client")]
#[command(version)]
struct Cli {
    /// Backend endpoint, including the #token=... fragment the server
    /// prints on startup.
    #[arg(short, long, default_value = "http://127.0.0.1:9763/")]
    endpoint: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all vaults.
    List,

    /// Register an existing vault directory.
    Add {
        /// Backend path of the vault directory.
        #[arg(short, long)]
        path: String,
    },

    /// Create a new vault (prompts for a password).
    Create {
        /// Vault name.
        #[arg(short, long)]
        name: String,

        /// Backend path for the new vault.
        #[arg(short, long)]
        path: String,
    },

    /// Remove a vault from the backend registry.
    Remove {
        /// Vault id.
        id: String,
    },

    /// Lock a vault.
    Lock {
        /// Vault id.
        id: String,
    },

    /// Unlock a vault (prompts for the password).
    Unlock {
        /// Vault id.
        id: String,
    },

    /// Open the vault mountpoint in the backend's file manager.
    Reveal {
        /// Vault id.
        id: String,
    },

    /// Open the vault's encrypted directory in the backend's file manager.
    RevealVault {
        /// Vault id.
        id: String,
    },

    /// Update per-vault options; only the supplied flags are sent.
    Options {
        /// Vault id.
        id: String,

        /// Reveal the mountpoint automatically after unlock.
        #[arg(long)]
        autoreveal: Option<bool>,

        /// Mount read-only.
        #[arg(long)]
        readonly: Option<bool>,

        /// Mountpoint path.
        #[arg(long)]
        mountpoint: Option<String>,
    },

    /// Change a vault password (prompts for both).
    Passwd {
        /// Vault id.
        id: String,

        /// Authorize with the masterkey instead of the current password.
        #[arg(long)]
        with_masterkey: bool,
    },

    /// Reveal a vault masterkey (prompts for the password).
    Masterkey {
        /// Vault id.
        id: String,
    },

    /// List one level of the backend's directory tree.
    Subpaths {
        /// Directory to list.
        #[arg(short, long, default_value = "/")]
        path: String,
    },

    /// Show backend version and options.
    Config,

    /// Update backend options; only the supplied flags are sent.
    SetOptions {
        /// UI locale, e.g. "en" or "zh-Hans".
        #[arg(long)]
        locale: Option<String>,

        /// Backend log level, e.g. "INFO" or "DEBUG".
        #[arg(long)]
        loglevel: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let endpoint = Url::parse(&cli.endpoint).context("Invalid endpoint URL")?;
    let gateway = Arc::new(HttpGateway::new(endpoint)?);
    let errors = Arc::new(ErrorChannel::new());
    let store = VaultStore::new(gateway.clone(), errors.clone());
    let config = ConfigStore::new(gateway, errors);

    match cli.command {
        Commands::List => {
            store.load_vaults().await?;
            for vault in store.vaults().await {
                println!(
                    "{}  {:<10} {:<24} {}",
                    vault.id, vault.state, vault.name, vault.path
                );
            }
        }

        Commands::Add { path } => {
            store.add_vault(&path).await?;
            println!("Vault added: {}", path);
        }

        Commands::Create { name, path } => {
            let password = prompt_new_password()?;
            store.create_vault(&name, &path, &password).await?;
            println!("Vault created: {}", name);
        }

        Commands::Remove { id } => {
            store.load_vaults().await?;
            store.remove_vault(&id).await?;
            println!("Vault removed: {}", id);
        }

        Commands::Lock { id } => {
            store.load_vaults().await?;
            store.lock_vault(&id).await?;
            println!("Vault locked: {}", id);
        }

        Commands::Unlock { id } => {
            let password = SecretString::new(rpassword::prompt_password("Password: ")?);
            store.load_vaults().await?;
            store.unlock_vault(&id, &password).await?;
            println!("Vault unlocked: {}", id);
        }

        Commands::Reveal { id } => {
            store.reveal_mountpoint(&id).await?;
        }

        Commands::RevealVault { id } => {
            store.reveal_vault(&id).await?;
        }

        Commands::Options {
            id,
            autoreveal,
            readonly,
            mountpoint,
        } => {
            let patch = VaultOptionsPatch {
                autoreveal,
                readonly,
                mountpoint,
            };
            if patch.is_empty() {
                bail!("No option flags supplied");
            }
            store.load_vaults().await?;
            store.update_vault_options(&id, &patch).await?;
            println!("Options updated: {}", id);
        }

        Commands::Passwd { id, with_masterkey } => {
            let credential = if with_masterkey {
                let masterkey = rpassword::prompt_password("Masterkey: ")?;
                VaultCredential::Masterkey(SecretString::new(masterkey))
            } else {
                let current = rpassword::prompt_password("Current password: ")?;
                VaultCredential::Password(SecretString::new(current))
            };
            let new_password = prompt_new_password()?;

            store
                .change_vault_password(&id, &credential, &new_password)
                .await?;
            println!("{}", store.errors().current().message);
        }

        Commands::Masterkey { id } => {
            let password = SecretString::new(rpassword::prompt_password("Password: ")?);
            let masterkey = store.reveal_vault_masterkey(&id, &password).await?;
            // Printed on purpose; this command exists to hand the key over.
            println!("{}", masterkey.expose());
        }

        Commands::Subpaths { path } => {
            let listing = store.list_sub_paths(&path).await?;
            for item in &listing.items {
                println!("{}{}{}", listing.pwd, listing.sep, item);
            }
        }

        Commands::Config => {
            config.load_app_config().await?;
            if let Some(version) = config.version().await {
                println!("version:    {}", version.version);
                println!("git commit: {}", version.git_commit);
                println!("build time: {}", version.build_time);
            }
            let options = config.options().await;
            println!("locale:     {}", options.locale.unwrap_or_default());
            println!(
                "loglevel:   {}",
                options.loglevel.map(|l| l.to_string()).unwrap_or_default()
            );
        }

        Commands::SetOptions { locale, loglevel } => {
            let patch = AppOptionsPatch {
                locale,
                loglevel: loglevel.map(LogLevel::from),
            };
            if patch.is_empty() {
                bail!("No option flags supplied");
            }
            config.set_options(&patch).await?;
            println!("Options updated");
        }
    }

    Ok(())
}

fn prompt_new_password() -> Result<SecretString> {
    let password = rpassword::prompt_password("New password: ")?;
    if password.len() < MINIMAL_PASSWORD_LENGTH {
        bail!(
            "Password must be at least {} characters",
            MINIMAL_PASSWORD_LENGTH
        );
    }
    let confirm = rpassword::prompt_password("Repeat password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }
    Ok(SecretString::new(password))
}
