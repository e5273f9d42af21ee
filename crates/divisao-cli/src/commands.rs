use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use divisao_core::config::Config;
use divisao_core::routes::Route;
use divisao_core::{ApiError, App, Credentials, LoginOutcome};

use crate::{Command, ConfigAction};

pub(crate) async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login { usuario, senha } => login(app, usuario, senha).await,
        Command::Logout => {
            app.shell.sign_out();
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            status(app);
            Ok(())
        }
        Command::Route { path } => {
            let route = app.open(&path);
            println!("{} -> {}", path, route.path());
            Ok(())
        }
        Command::Get { path, params } => {
            let params = parse_params(&params)?;
            let result = app.api().get(&path, &params).await;
            print_response(app, result)
        }
        Command::Post { path, body } => {
            let body = parse_body(body.as_deref())?;
            let result = app.api().post(&path, &body).await;
            print_response(app, result)
        }
        Command::Put { path, body } => {
            let body = parse_body(body.as_deref())?;
            let result = app.api().put(&path, &body).await;
            print_response(app, result)
        }
        Command::Delete { path } => {
            let result = app.api().delete(&path).await;
            print_response(app, result)
        }
        Command::Config { action } => config(&app.config, action),
    }
}

fn config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Save { timeout } => {
            let mut config = config.clone();
            if timeout.is_some() {
                config.request_timeout_secs = timeout;
            }
            config.save().context("Failed to save config")?;
            println!("Saved {}", Config::config_path()?.display());
        }
    }
    Ok(())
}

async fn login(app: &App, usuario: Option<String>, senha: Option<String>) -> Result<()> {
    let usuario = match usuario {
        Some(u) => u,
        None => prompt_usuario()?,
    };
    let senha = match senha {
        Some(s) => s,
        None => rpassword::prompt_password("Senha: ")?,
    };

    eprintln!("Authenticating...");
    match app.login.submit(&Credentials::new(usuario, senha)).await {
        LoginOutcome::LoggedIn => {
            let route = app.current_route().unwrap_or(Route::Home);
            println!("Login successful -> {}", route.path());
            Ok(())
        }
        LoginOutcome::Busy => bail!("A login is already in progress"),
        LoginOutcome::Failed(message) => bail!(message),
    }
}

fn prompt_usuario() -> Result<String> {
    print!("Usuário: ");
    io::stdout().flush()?;

    let mut usuario = String::new();
    io::stdin().read_line(&mut usuario)?;
    Ok(usuario.trim().to_string())
}

fn status(app: &App) {
    if app.is_authenticated() {
        println!("Logged in ({})", app.config.api_url);
    } else {
        println!("Logged out ({})", app.config.api_url);
    }
    println!("/ -> {}", app.route_for("/").path());
}

fn print_response(app: &App, result: Result<Value, ApiError>) -> Result<()> {
    match result {
        Ok(Value::Null) => Ok(()),
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(ApiError::Unauthorized) if app.current_route() == Some(Route::Login) => {
            bail!("Session expired or missing. Run `divisao login` first.")
        }
        Err(e) => Err(e.into()),
    }
}

/// `KEY=VALUE` pairs into a query object. Values that parse as JSON keep
/// their type (`3`, `true`, `null`); anything else is a string.
fn parse_params(params: &[String]) -> Result<Map<String, Value>> {
    params
        .iter()
        .map(|param| -> Result<(String, Value)> {
            let (key, raw) = param
                .split_once('=')
                .with_context(|| format!("Expected KEY=VALUE, got {:?}", param))?;
            if key.is_empty() {
                bail!("Empty parameter name in {:?}", param);
            }
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            Ok((key.to_string(), value))
        })
        .collect()
}

fn parse_body(body: Option<&str>) -> Result<Value> {
    match body {
        Some(raw) => serde_json::from_str(raw).context("Body is not valid JSON"),
        None => Ok(Value::Object(Map::new())),
    }
}
