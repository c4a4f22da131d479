//! Session command handlers.
//!
//! This module implements the CLI commands for:
//! - `agro register` - Register a user and sign in
//! - `agro login` / `agro logout` - Start and end a session
//! - `agro whoami` - Show who new transactions will be recorded for

use crate::args::{LoginArgs, RegisterArgs};
use crate::commands::Out;
use crate::model::GUEST;
use crate::session::{Session, User};
use crate::{Config, Result};
use anyhow::Context;

/// Registers a new user and signs them in.
///
/// # Errors
/// Returns an error if a field is empty, the passwords differ or the email is already registered.
pub async fn register(config: Config, args: RegisterArgs) -> Result<Out<User>> {
    let session = Session::new(config.storage());
    let user = session
        .register(
            args.name(),
            args.email(),
            args.password(),
            args.confirm_password(),
        )
        .await
        .context("Unable to register")?;
    Ok(Out::new(
        format!("Registered and signed in as {} <{}>", user.name, user.email),
        user,
    ))
}

/// Signs in a registered user.
pub async fn login(config: Config, args: LoginArgs) -> Result<Out<User>> {
    let session = Session::new(config.storage());
    let user = session
        .login(args.email(), args.password())
        .await
        .context("Unable to sign in")?;
    Ok(Out::new(format!("Signed in as {}", user.name), user))
}

/// Ends the session. Signing out when nobody is signed in is not an error.
pub async fn logout(config: Config) -> Result<Out<()>> {
    Session::new(config.storage())
        .logout()
        .await
        .context("Unable to sign out")?;
    Ok("Signed out".into())
}

/// Reports the signed-in user, if any.
pub async fn whoami(config: Config) -> Result<Out<Option<User>>> {
    let user = Session::new(config.storage())
        .current_user()
        .await
        .context("Unable to read the session")?;
    let message = match &user {
        Some(user) => format!("Signed in as {} <{}>", user.name, user.email),
        None => format!("Not signed in, transactions are recorded as '{GUEST}'"),
    };
    Ok(Out::new(message, user))
}
