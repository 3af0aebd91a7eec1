use clap::Subcommand;
use serde_json::{json, Value};
use std::io::{BufRead, Write};

use crate::cli::client::ApiClient;
use crate::cli::config::{self, Session};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register a new account")]
    Register {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Login and store the session token")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Show current session status")]
    Status,

    #[command(about = "Discard the stored session token")]
    Logout,
}

pub async fn handle(
    cmd: AuthCommands,
    session: &mut Session,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { email, password } => {
            let password = password_or_prompt(password)?;
            let client = ApiClient::new(&session.server, None);

            let user = client
                .post("/auth/register", json!({ "email": email, "password": password }))
                .await?;

            output_success(output_format, &format!("Registered {}", email), Some(&user))
        }

        AuthCommands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let client = ApiClient::new(&session.server, None);

            let data = client
                .post("/auth/login", json!({ "email": email, "password": password }))
                .await?;

            session.token = data.get("token").and_then(Value::as_str).map(String::from);
            session.email = Some(email.clone());
            config::save(session)?;

            output_success(output_format, &format!("Logged in as {}", email), None)
        }

        AuthCommands::Whoami => {
            let client = ApiClient::new(&session.server, session.token.clone());
            let user = client.get("/api/auth/whoami").await?;
            output_value(output_format, &user)
        }

        AuthCommands::Status => {
            let status = json!({
                "server": session.server,
                "logged_in": session.is_logged_in(),
                "email": session.email,
            });
            match output_format {
                OutputFormat::Json => output_value(output_format, &status),
                OutputFormat::Text => {
                    println!("Server: {}", session.server);
                    match &session.email {
                        Some(email) if session.is_logged_in() => println!("Logged in as {}", email),
                        _ => println!("Not logged in"),
                    }
                    Ok(())
                }
            }
        }

        AuthCommands::Logout => {
            session.token = None;
            session.email = None;
            config::save(session)?;
            output_success(output_format, "Logged out", None)
        }
    }
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
