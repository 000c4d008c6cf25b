//! Where the monitor learns which connection is active.
//!
//! Discovering SSID/BSSID/frequency belongs to whatever owns the network
//! configuration; the monitor only consumes the answer through
//! [`TopologyProvider`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::targets::T_MONITOR;

const SYSFS_NET: &str = "/sys/class/net";

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Failed to read {path}: {source}")]
    Sysfs {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The active wireless connection as seen by the network layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkTopology {
    pub interface: String,
    pub ssid: String,
    /// Peer (AP) address text; empty when unknown.
    pub bssid: String,
    pub frequency_mhz: u32,
    /// Nominal channel width from the network layer.
    pub channel_width_mhz: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// A wireless device exists at all.
    pub available: bool,
    /// The connected link, if any.
    pub link: Option<LinkTopology>,
}

pub trait TopologyProvider: Send {
    fn current(&mut self) -> Topology;
}

impl<T: TopologyProvider + ?Sized> TopologyProvider for Box<T> {
    fn current(&mut self) -> Topology {
        (**self).current()
    }
}

/// Fixed topology, for tests and for hosts that already know the link.
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    topology: Topology,
}

impl StaticTopology {
    pub fn connected(link: LinkTopology) -> Self {
        Self {
            topology: Topology {
                available: true,
                link: Some(link),
            },
        }
    }

    pub fn disconnected() -> Self {
        Self {
            topology: Topology {
                available: true,
                link: None,
            },
        }
    }

    pub fn set(&mut self, topology: Topology) {
        self.topology = topology;
    }
}

impl TopologyProvider for StaticTopology {
    fn current(&mut self) -> Topology {
        self.topology.clone()
    }
}

/// Reads `/sys/class/net` for wireless devices and their operstate.
///
/// Sysfs carries no SSID or frequency; those come from the template link.
#[derive(Debug, Clone)]
pub struct SysfsTopology {
    root: PathBuf,
    template: LinkTopology,
}

impl SysfsTopology {
    /// `template.interface` may be empty to pick the first wireless device.
    pub fn new(template: LinkTopology) -> Self {
        Self::with_root(SYSFS_NET, template)
    }

    pub fn with_root(root: impl AsRef<Path>, template: LinkTopology) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            template,
        }
    }

    pub fn list_wireless_interfaces(&self) -> Result<Vec<String>, TopologyError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| TopologyError::Sysfs {
            path: self.root.display().to_string(),
            source,
        })?;
        let mut interfaces: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| self.root.join(name).join("wireless").exists())
            .collect();
        interfaces.sort();
        Ok(interfaces)
    }

    fn is_up(&self, interface: &str) -> bool {
        std::fs::read_to_string(self.root.join(interface).join("operstate"))
            .map(|state| state.trim() == "up")
            .unwrap_or(false)
    }

    fn resolve_interface(&self) -> Option<String> {
        if !self.template.interface.is_empty() {
            let exists = self.root.join(&self.template.interface).exists();
            return exists.then(|| self.template.interface.clone());
        }
        match self.list_wireless_interfaces() {
            Ok(interfaces) => interfaces.into_iter().next(),
            Err(err) => {
                debug!(target: T_MONITOR, "wireless interface scan failed: {}", err);
                None
            }
        }
    }
}

impl TopologyProvider for SysfsTopology {
    fn current(&mut self) -> Topology {
        let Some(interface) = self.resolve_interface() else {
            return Topology::default();
        };
        let link = self.is_up(&interface).then(|| LinkTopology {
            interface,
            ..self.template.clone()
        });
        Topology {
            available: true,
            link,
        }
    }
}
