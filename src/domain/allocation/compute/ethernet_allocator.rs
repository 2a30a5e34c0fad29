use crate::domain::inventory::inventory::{EthernetInterfaceKey, Inventory, SwitchPortKey, SystemKey};
use crate::domain::matcher::ethernet_interface_mapper::EthernetInterfaceMapper;
use crate::domain::node_task::NodeTask;
use crate::domain::request::requested_node::RequestedEthernetInterface;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// Plans VLAN configuration on the switch ports the chosen system is cabled to.
#[derive(Debug)]
pub struct EthernetAllocator<'a> {
    requested: &'a [RequestedEthernetInterface],
    mapper: &'a dyn EthernetInterfaceMapper,
}

impl<'a> EthernetAllocator<'a> {
    pub fn new(requested: &'a [RequestedEthernetInterface], mapper: &'a dyn EthernetInterfaceMapper) -> Self {
        Self { requested, mapper }
    }

    pub fn allocate(&self, inventory: &Inventory, system: SystemKey) -> Result<Vec<NodeTask>, AllocationError> {
        let Some(host) = inventory.systems.get(system) else {
            return Ok(Vec::new());
        };

        let mapping = self.mapper.map(self.requested, &host.ethernet_interfaces, inventory);
        if mapping.len() != self.requested.len() {
            return Err(Violations::of(format!("Requested ethernet interfaces cannot be mapped on computer system {}", host.uri)).into());
        }

        let mut tasks = Vec::new();
        for (index, interface_key) in mapping {
            let requested = &self.requested[index];
            if !requested.requests_vlans() {
                continue;
            }
            let Some(interface) = inventory.ethernet_interfaces.get(interface_key) else {
                continue;
            };

            match Self::neighbor_ports(inventory, interface_key).as_slice() {
                [port] => {
                    let Some(port) = inventory.switch_ports.get(*port) else {
                        continue;
                    };
                    tasks.push(NodeTask::CreateVlans {
                        ethernet_interface: interface.uri.clone(),
                        switch_port: port.uri.clone(),
                        primary_vlan: requested.primary_vlan,
                        vlans: requested.vlans.clone(),
                    });
                }
                [] => log::warn!("No switch port found for ethernet interface {}, VLANs will not be configured", interface.uri),
                ports => log::warn!(
                    "Ethernet interface {} is the neighbor of {} switch ports, VLANs will not be configured",
                    interface.uri,
                    ports.len()
                ),
            }
        }

        Ok(tasks)
    }

    /// Enabled and healthy switch ports whose neighbor MAC is the interface MAC.
    fn neighbor_ports(inventory: &Inventory, interface: EthernetInterfaceKey) -> Vec<SwitchPortKey> {
        let Some(mac) = inventory.ethernet_interfaces.get(interface).and_then(|i| i.mac_address.as_deref()) else {
            return Vec::new();
        };
        inventory
            .switch_ports
            .iter()
            .filter(|(_, port)| port.status.is_enabled_and_healthy())
            .filter(|(_, port)| port.neighbor_mac.as_deref().is_some_and(|neighbor| neighbor.eq_ignore_ascii_case(mac)))
            .map(|(key, _)| key)
            .collect()
    }
}
