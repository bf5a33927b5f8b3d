//! `login` / `logout`: flip the persisted session flag.
use crate::context::AppContext;
use mission_core::api as core_api;

pub fn handle_login(ctx: &AppContext) -> Result<(), core_api::CliError> {
    ctx.session.login()?;
    println!("Signed in.");
    Ok(())
}

pub fn handle_logout(ctx: &AppContext) -> Result<(), core_api::CliError> {
    ctx.session.logout()?;
    println!("Signed out.");
    Ok(())
}
