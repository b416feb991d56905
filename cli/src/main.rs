mod output;
mod transport;

use clap::{Args, Parser, Subcommand};
use coachhub::net::config::ApiConfig;
use coachhub::net::http::{ApiError, HttpClient};
use coachhub::net::types::{Credentials, NewUser, Role};
use coachhub::state::session::SessionStore;
use coachhub::util::guard::AccessPolicy;
use reqwest::Url;
use serde_json::{Value, json};

use crate::output::{describe_check, describe_state};
use crate::transport::ReqwestTransport;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("access denied: guard would redirect to {0}")]
    Denied(&'static str),
    #[error("--email needs a password; pass --password or set COACHHUB_PASSWORD")]
    MissingPassword,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "coachhub-cli", about = "CoachHub session and access CLI")]
struct Cli {
    #[arg(long, env = "COACHHUB_API_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Existing session cookie (`name=value`) to start from.
    #[arg(long, env = "COACHHUB_SESSION_COOKIE")]
    session_cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current session and print it.
    Whoami,
    /// Sign in and print the user plus the session cookie.
    Login(LoginArgs),
    /// Create an account without signing in.
    Register(RegisterArgs),
    /// Invalidate the session and print the resulting state.
    Logout,
    /// Evaluate an access policy against the session; exits non-zero when denied.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "COACHHUB_PASSWORD")]
    password: String,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "COACHHUB_PASSWORD")]
    password: String,
    #[arg(long, value_parser = parse_role)]
    role: Option<Role>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Allowed roles; omit to allow any signed-in user.
    #[arg(long, value_delimiter = ',', value_parser = parse_role)]
    allow: Vec<Role>,

    /// Sign in as this user first instead of reusing `--session-cookie`.
    #[arg(long)]
    email: Option<String>,
    #[arg(long, env = "COACHHUB_PASSWORD")]
    password: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role `{raw}`; expected client, coach or admin"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let origin = Url::parse(&cli.base_url).map_err(|_| CliError::InvalidBaseUrl(cli.base_url.clone()))?;
    let transport = ReqwestTransport::new(origin)?;
    if let Some(cookie) = cli.session_cookie.as_deref() {
        transport.seed_cookie(cookie);
    }
    let store = SessionStore::new(HttpClient::new(transport, ApiConfig::new(cli.base_url.as_str())));

    match cli.command {
        Command::Whoami => run_whoami(&store).await,
        Command::Login(args) => run_login(&store, args).await,
        Command::Register(args) => run_register(&store, args).await,
        Command::Logout => run_logout(&store).await,
        Command::Check(args) => run_check(&store, args).await,
    }
}

async fn run_whoami(store: &SessionStore<ReqwestTransport>) -> Result<(), CliError> {
    let state = store.bootstrap().await;
    print_json(&describe_state(&state))
}

async fn run_login(store: &SessionStore<ReqwestTransport>, args: LoginArgs) -> Result<(), CliError> {
    let user = store.login(&Credentials { email: args.email, password: args.password }).await?;
    tracing::info!(user_id = user.id, role = %user.role, "signed in");
    let cookie = store.client().transport().session_cookie();
    print_json(&json!({ "user": user, "cookie": cookie }))
}

async fn run_register(store: &SessionStore<ReqwestTransport>, args: RegisterArgs) -> Result<(), CliError> {
    let new_user = NewUser {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password: args.password,
        role: args.role,
    };
    let created = store.register(&new_user).await?;
    print_json(&serde_json::to_value(created)?)
}

async fn run_logout(store: &SessionStore<ReqwestTransport>) -> Result<(), CliError> {
    store.logout(|path| tracing::info!(path, "signed out; client would navigate")).await;
    print_json(&describe_state(&store.current_state()))
}

async fn run_check(store: &SessionStore<ReqwestTransport>, args: CheckArgs) -> Result<(), CliError> {
    let state = match (args.email, args.password) {
        (Some(email), Some(password)) => {
            store.login(&Credentials { email, password }).await?;
            store.current_state()
        }
        (Some(_), None) => return Err(CliError::MissingPassword),
        (None, _) => store.bootstrap().await,
    };
    let policy = if args.allow.is_empty() { AccessPolicy::default() } else { AccessPolicy::only(args.allow) };

    print_json(&describe_check(&state, &policy))?;
    match policy.evaluate(&state).redirect() {
        Some(target) => Err(CliError::Denied(target.path())),
        None => Ok(()),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_parses_comma_separated_roles() {
        let cli = Cli::try_parse_from(["coachhub-cli", "check", "--allow", "coach,admin"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.allow, vec![Role::Coach, Role::Admin]);
        assert!(args.email.is_none());
    }

    #[test]
    fn check_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["coachhub-cli", "check", "--allow", "owner"]).is_err());
    }

    #[test]
    fn check_accepts_inline_credentials() {
        let cli = Cli::try_parse_from([
            "coachhub-cli",
            "check",
            "--email",
            "a@b.com",
            "--password",
            "pw",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.email.as_deref(), Some("a@b.com"));
        assert_eq!(args.password.as_deref(), Some("pw"));
        assert!(args.allow.is_empty());
    }
}
