use clap::Subcommand;
use serde_json::json;

use crate::auth::RegistrationForm;
use crate::cli::app::App;
use crate::cli::utils::{output_record, output_success, prompt_secret};
use crate::cli::OutputFormat;
use crate::config::{self, BackendKind};
use crate::models::Credential;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign in with a phone number and a one-time code")]
    LoginPhone {
        #[arg(help = "Phone number")]
        phone: String,
        #[arg(help = "Previously issued one-time code")]
        code: String,
    },

    #[command(about = "Create an account and sign in")]
    Register {
        #[arg(help = "Full name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(help = "Phone number")]
        phone: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Password confirmation (will prompt if not provided)")]
        confirm: Option<String>,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show the signed-in identity")]
    Whoami,

    #[command(about = "Show session and backend status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let app = App::init().await?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_secret("Password")?,
            };
            let ok = app
                .auth
                .login(Credential::EmailPassword {
                    email: email.clone(),
                    password,
                })
                .await;
            if !ok {
                anyhow::bail!("invalid credentials");
            }
            signed_in(&app, &output_format)
        }

        AuthCommands::LoginPhone { phone, code } => {
            let ok = app.auth.login(Credential::PhoneCode { phone, code }).await;
            if !ok {
                anyhow::bail!("invalid credentials");
            }
            signed_in(&app, &output_format)
        }

        AuthCommands::Register {
            name,
            email,
            phone,
            password,
            confirm,
        } => {
            let password = match password {
                Some(password) => password,
                None => prompt_secret("Password")?,
            };
            let confirm_password = match confirm {
                Some(confirm) => confirm,
                None => prompt_secret("Confirm password")?,
            };

            // Password policy is checked here, before the auth context is
            // ever involved.
            let registration = RegistrationForm {
                name,
                email,
                phone,
                password,
                confirm_password,
            }
            .validate()
            .map_err(|e| anyhow::anyhow!(e))?;

            if !app.auth.register(registration).await {
                anyhow::bail!("registration failed");
            }
            signed_in(&app, &output_format)
        }

        AuthCommands::Logout => {
            app.auth.logout();
            output_success(&output_format, "signed out", None)
        }

        AuthCommands::Whoami => match app.auth.identity() {
            Some(identity) => output_record(
                &output_format,
                serde_json::to_value(&identity)?,
                format!(
                    "{} <{}> {}{}",
                    identity.name,
                    if identity.email.is_empty() {
                        identity.phone.as_str()
                    } else {
                        identity.email.as_str()
                    },
                    identity.phone,
                    if identity.is_administrator {
                        " [administrator]"
                    } else {
                        ""
                    }
                ),
            ),
            None => anyhow::bail!("not signed in"),
        },

        AuthCommands::Status => {
            let backend = match config::config().backend.kind {
                BackendKind::Mock => "mock",
                BackendKind::Hosted => "hosted",
            };
            let identity = app.auth.identity();
            let text = match &identity {
                Some(identity) => format!("signed in as {} (backend: {})", identity.name, backend),
                None => format!("signed out (backend: {})", backend),
            };
            output_record(
                &output_format,
                json!({
                    "signedIn": identity.is_some(),
                    "identity": identity,
                    "backend": backend,
                }),
                text,
            )
        }
    }
}

fn signed_in(app: &App, output_format: &OutputFormat) -> anyhow::Result<()> {
    let identity = app
        .auth
        .identity()
        .ok_or_else(|| anyhow::anyhow!("session state not resolved"))?;
    output_success(
        output_format,
        &format!("signed in as {}", identity.name),
        Some(json!({ "identity": identity })),
    )
}
