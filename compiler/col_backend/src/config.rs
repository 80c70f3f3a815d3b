//! Compilation configuration.
//!
//! Optimizations are toggled with flags in the style of `-O`:
//!
//! - `all`: enable every optimization
//! - `none`: disable every optimization
//! - `<name>`: enable one optimization
//! - `no-<name>`: disable one optimization
//!
//! Flags apply left to right on top of the default, which enables
//! everything. Blank flags are ignored.

use std::fmt;

use rustc_hash::FxHashSet;

use col_diagnostic::{Problem, Result};

/// An optional transformation of the compiled output.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Optimization {
    /// Collapse a constraint block with a single child into that child.
    RedundantQuantifier,
}

impl Optimization {
    pub const ALL: [Optimization; 1] = [Optimization::RedundantQuantifier];

    pub const fn name(self) -> &'static str {
        match self {
            Optimization::RedundantQuantifier => "redundant-quantifier",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|opt| opt.name() == name)
    }
}

impl fmt::Display for Optimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings of one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    enabled: FxHashSet<Optimization>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: Optimization::ALL.into_iter().collect(),
        }
    }
}

impl Config {
    /// Configuration with every optimization disabled.
    pub fn unoptimized() -> Self {
        Config {
            enabled: FxHashSet::default(),
        }
    }

    /// Apply optimization flags on top of the default.
    ///
    /// An unknown optimization name is a fatal problem.
    pub fn from_flags<'f>(flags: impl IntoIterator<Item = &'f str>) -> Result<Self> {
        let mut config = Config::default();
        for flag in flags {
            match flag.trim() {
                "" => {}
                "all" => config.enabled.extend(Optimization::ALL),
                "none" => config.enabled.clear(),
                flag => {
                    let (name, enable) = match flag.strip_prefix("no-") {
                        Some(name) => (name, false),
                        None => (flag, true),
                    };
                    let Some(opt) = Optimization::from_name(name) else {
                        return Err(Problem::fatal_unspanned(format!(
                            "unknown optimization {name}"
                        )));
                    };
                    config.set(opt, enable);
                }
            }
        }
        tracing::debug!(config = ?config.enabled, "optimization flags applied");
        Ok(config)
    }

    pub fn set(&mut self, opt: Optimization, enable: bool) {
        if enable {
            self.enabled.insert(opt);
        } else {
            self.enabled.remove(&opt);
        }
    }

    #[must_use]
    pub fn with(mut self, opt: Optimization, enable: bool) -> Self {
        self.set(opt, enable);
        self
    }

    #[inline]
    pub fn is_enabled(&self, opt: Optimization) -> bool {
        self.enabled.contains(&opt)
    }
}
