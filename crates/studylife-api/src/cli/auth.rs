//! Authentication subcommands.
//!
//! Sign-in goes through Identity Toolkit. The resulting identity (never the
//! password or tokens) is saved to `session.json` in the data directory so
//! later commands know who is signed in.

use anyhow::{Context, Result, anyhow, bail};
use clap::Subcommand;
use console::style;
use dialoguer::{Input, Password};

use studylife_core::auth::{AuthProvider, AuthSession};
use studylife_infra::auth::IdentityToolkitAuth;
use studylife_infra::filesystem::{clear_session, load_session, save_session};
use studylife_infra::secret::{FIREBASE_API_KEY, env_secret};
use studylife_types::error::AuthError;
use studylife_types::identity::{AuthIdentity, SocialProvider};

use crate::state::AppState;

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Sign in with email and password.
    Login {
        /// Account email (prompted when omitted).
        #[arg(long)]
        email: Option<String>,

        /// Sign in with a social provider instead (google, github).
        #[arg(long)]
        provider: Option<SocialProvider>,
    },

    /// Create a new account.
    Register {
        /// Display name (prompted when omitted).
        #[arg(long)]
        name: Option<String>,

        /// Account email (prompted when omitted).
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out and forget the saved session.
    Logout,

    /// Show the signed-in user.
    Whoami,
}

pub async fn handle_auth_command(cmd: AuthCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        AuthCommand::Login { email, provider } => {
            let session = AuthSession::new(identity_toolkit()?);
            let result = match provider {
                Some(provider) => session.sign_in_with(provider).await,
                None => {
                    let email = prompt_or(email, "Email")?;
                    let password = Password::new().with_prompt("Password").interact()?;
                    session.sign_in(&email, &password).await
                }
            };
            finish_sign_in(state, result, json).await
        }
        AuthCommand::Register { name, email } => {
            let session = AuthSession::new(identity_toolkit()?);
            let name = prompt_or(name, "Name")?;
            let email = prompt_or(email, "Email")?;
            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?;
            let result = session.register(&name, &email, &password).await;
            finish_sign_in(state, result, json).await
        }
        AuthCommand::Logout => {
            let current = load_session(&state.data_dir).await;
            let session = AuthSession::restore(SignedOutProvider, current);
            logout(state, &session, json).await
        }
        AuthCommand::Whoami => whoami(state, json).await,
    }
}

fn identity_toolkit() -> Result<IdentityToolkitAuth> {
    let key = env_secret(FIREBASE_API_KEY)
        .ok_or_else(|| anyhow!("{FIREBASE_API_KEY} is not set; cannot reach the sign-in service"))?;
    Ok(IdentityToolkitAuth::new(key)?)
}

fn prompt_or(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

/// Persist a successful sign-in, or report the user-facing error.
async fn finish_sign_in(
    state: &AppState,
    result: Result<AuthIdentity, AuthError>,
    json: bool,
) -> Result<()> {
    let identity = match result {
        Ok(identity) => identity,
        Err(AuthError::Cancelled) => return Ok(()),
        Err(e) => {
            tracing::debug!(error = %e, "Sign-in failed");
            bail!("{}", e.user_message());
        }
    };

    save_session(&state.data_dir, &identity)
        .await
        .context("Failed to save session")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
    } else {
        println!(
            "  {} Signed in as {}",
            style("✓").green().bold(),
            style(identity.greeting_name()).cyan()
        );
    }
    Ok(())
}

async fn logout<P: AuthProvider>(
    state: &AppState,
    session: &AuthSession<P>,
    json: bool,
) -> Result<()> {
    let was_signed_in = session.current().is_some();
    session.sign_out().await?;
    clear_session(&state.data_dir)
        .await
        .context("Failed to remove session")?;

    if json {
        println!("{}", serde_json::json!({ "signed_out": was_signed_in }));
    } else if was_signed_in {
        println!("  {} Signed out", style("✓").green().bold());
    } else {
        println!("  {}", style("Not signed in.").dim());
    }
    Ok(())
}

async fn whoami(state: &AppState, json: bool) -> Result<()> {
    let identity = load_session(&state.data_dir).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
        return Ok(());
    }
    match identity {
        Some(identity) => {
            println!("  {}  {}", style("Name").dim(), identity.greeting_name());
            if let Some(email) = &identity.email {
                println!("  {} {}", style("Email").dim(), email);
            }
            println!("  {}    {}", style("Id").dim(), style(&identity.id).dim());
        }
        None => println!("  {}", style("Not signed in.").dim()),
    }
    Ok(())
}

/// Provider for signing out of a stored session. Identity Toolkit keeps
/// no server-side session, so there is nothing to call.
struct SignedOutProvider;

impl AuthProvider for SignedOutProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthIdentity, AuthError> {
        Err(AuthError::Unsupported("sign-in".into()))
    }

    async fn register(
        &self,
        _name: &str,
        _email: &str,
        _password: &str,
    ) -> Result<AuthIdentity, AuthError> {
        Err(AuthError::Unsupported("register".into()))
    }

    async fn sign_in_with(&self, provider: SocialProvider) -> Result<AuthIdentity, AuthError> {
        Err(AuthError::Unsupported(provider.to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
