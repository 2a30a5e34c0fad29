use std::fmt::Debug;

use crate::domain::inventory::inventory::{EthernetInterfaceKey, Inventory};
use crate::domain::inventory::resources::EthernetInterface;
use crate::domain::request::requested_node::RequestedEthernetInterface;

/// Maps requested ethernet interfaces onto the interfaces of a system.
pub trait EthernetInterfaceMapper: Debug + Send + Sync {
    /// # Returns
    /// Pairs of (index into `requested`, chosen interface); unsatisfiable requests are left out.
    fn map(&self, requested: &[RequestedEthernetInterface], available: &[EthernetInterfaceKey], inventory: &Inventory)
    -> Vec<(usize, EthernetInterfaceKey)>;
}

#[derive(Debug, Clone, Default)]
pub struct DefaultEthernetInterfaceMapper;

impl DefaultEthernetInterfaceMapper {
    fn satisfies(requested: &RequestedEthernetInterface, interface: &EthernetInterface) -> bool {
        if let Some(uri) = &requested.resource {
            return &interface.uri == uri;
        }
        let fast_enough = requested.speed_mbps.is_none_or(|speed| interface.speed_mbps.is_some_and(|s| s >= speed));
        let vlan_capable = !requested.requests_vlans() || interface.vlan_enable;

        fast_enough && vlan_capable
    }
}

impl EthernetInterfaceMapper for DefaultEthernetInterfaceMapper {
    fn map(
        &self,
        requested: &[RequestedEthernetInterface],
        available: &[EthernetInterfaceKey],
        inventory: &Inventory,
    ) -> Vec<(usize, EthernetInterfaceKey)> {
        let mut used: Vec<EthernetInterfaceKey> = Vec::new();
        let mut mapping = Vec::new();

        let mut order: Vec<usize> = (0..requested.len()).collect();
        order.sort_by_key(|i| requested[*i].resource.is_none());

        for index in order {
            let request = &requested[index];
            let found = available
                .iter()
                .copied()
                .find(|key| !used.contains(key) && inventory.ethernet_interfaces.get(*key).is_some_and(|i| Self::satisfies(request, i)));
            if let Some(key) = found {
                used.push(key);
                mapping.push((index, key));
            }
        }

        mapping.sort_by_key(|(index, _)| *index);
        mapping
    }
}
