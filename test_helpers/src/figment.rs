//! Shared helpers for working with `figment::Jail` in tests.
//!
//! A jail gives each test its own working directory and environment, which
//! settings discovery depends on. These helpers run a closure inside a jail
//! and surface its value as an `anyhow::Result`.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// The jail is torn down once the closure completes, even when it fails.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure returns a
/// [`figment::error::Error`].
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Writes `.upmerge.toml` into the jail's working directory.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn write_local_settings(jail: &figment::Jail, contents: &str) -> figment::error::Result<()> {
    jail.create_file(".upmerge.toml", contents).map(drop)
}

/// Converts any displayable error into a [`figment::Error`] so it can be
/// returned from a jail closure with `?`.
pub fn figment_error<E: ToString + ?Sized>(err: &E) -> figment::Error {
    figment::Error::from(err.to_string())
}
