pub mod computer_system_matcher;
pub mod ethernet_interface_mapper;
pub mod local_drive_mapper;

use std::sync::Arc;

use crate::domain::matcher::computer_system_matcher::{ComputerSystemMatcher, DefaultComputerSystemMatcher};
use crate::domain::matcher::ethernet_interface_mapper::{DefaultEthernetInterfaceMapper, EthernetInterfaceMapper};
use crate::domain::matcher::local_drive_mapper::{DefaultLocalDriveMapper, LocalDriveMapper};

/// The matcher and mappers an allocation consults.
#[derive(Debug, Clone)]
pub struct Matchers {
    pub computer_system: Arc<dyn ComputerSystemMatcher>,
    pub local_drives: Arc<dyn LocalDriveMapper>,
    pub ethernet_interfaces: Arc<dyn EthernetInterfaceMapper>,
}

impl Default for Matchers {
    fn default() -> Self {
        Self {
            computer_system: Arc::new(DefaultComputerSystemMatcher::new()),
            local_drives: Arc::new(DefaultLocalDriveMapper),
            ethernet_interfaces: Arc::new(DefaultEthernetInterfaceMapper),
        }
    }
}

impl Matchers {
    pub fn with_computer_system_matcher(mut self, matcher: Arc<dyn ComputerSystemMatcher>) -> Self {
        self.computer_system = matcher;
        self
    }
}
