use std::{cell::RefCell, path::Path};

use crate::{
    arch::Host,
    build_env::PathHooks,
    callback::CallBacks,
    config::Config,
    error::Result,
};

/// Composes isolated build environments.
///
/// Everything a composition needs besides the dependencies and the request is
/// held here: the [`Config`], the [`Host`] being built on, the path hooks and
/// where diagnostics go.
#[derive(Debug, Default)]
pub struct Superenv {
    pub config: Config,
    pub host: Host,
    pub(crate) callbacks: Option<Box<RefCell<dyn CallBacks>>>,
    pub(crate) hooks: Option<Box<dyn PathHooks>>,
}

impl Superenv {
    pub fn new() -> Result<Superenv> {
        let config = Config::new()?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Superenv {
        Superenv {
            config,
            ..Superenv::default()
        }
    }

    pub fn host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    /// Replaces the extra paths from the config with `hooks`.
    pub fn hooks<H: PathHooks + 'static>(mut self, hooks: H) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shims_dir(&self) -> &Path {
        &self.config.shims_dir
    }

    pub(crate) fn path_hooks(&self) -> &dyn PathHooks {
        match &self.hooks {
            Some(hooks) => hooks.as_ref(),
            None => &self.config.extra_paths,
        }
    }

    pub fn make_jobs(&self) -> usize {
        self.config.make_jobs.unwrap_or(self.host.cores).max(1)
    }
}
