//! The concrete plugins. Each one fixes its script names and required inputs;
//! everything else is shared through [`crate::dispatch`] and
//! [`crate::runner::submit`].

use std::fmt;
use std::str::FromStr;

use crate::dispatch::Handler;

pub mod grains;
pub mod grains_cache;
pub mod highstate;
pub mod state_list;
pub mod versions;

pub use grains::Grains;
pub use grains_cache::GrainsCache;
pub use highstate::Highstate;
pub use state_list::StateList;
pub use versions::Versions;

/// Which plugin a process is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Grains,
    GrainsCache,
    Highstate,
    StateList,
    Versions,
}

impl PluginKind {
    pub const ALL: [PluginKind; 5] = [
        PluginKind::Grains,
        PluginKind::GrainsCache,
        PluginKind::Highstate,
        PluginKind::StateList,
        PluginKind::Versions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Grains => "grains",
            PluginKind::GrainsCache => "grainscache",
            PluginKind::Highstate => "salthighstate",
            PluginKind::StateList => "statedescs",
            PluginKind::Versions => "versions",
        }
    }

    pub fn handler(&self) -> Box<dyn Handler> {
        match self {
            PluginKind::Grains => Box::new(Grains),
            PluginKind::GrainsCache => Box::new(GrainsCache),
            PluginKind::Highstate => Box::new(Highstate),
            PluginKind::StateList => Box::new(StateList),
            PluginKind::Versions => Box::new(Versions),
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown plugin '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in PluginKind::ALL {
            assert_eq!(kind.as_str().parse::<PluginKind>(), Ok(kind));
            assert_eq!(kind.handler().name(), kind.as_str());
        }
        assert!("nope".parse::<PluginKind>().is_err());
    }
}
