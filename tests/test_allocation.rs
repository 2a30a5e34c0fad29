
use std::sync::Arc;

use inventory_fixture::{InventoryFixture, remote_storage, task_names};
use node_composer::domain::allocation::allocation_service::AllocationService;
use node_composer::domain::allocation::compute::computer_system_allocation_strategy::NO_SYSTEM_AVAILABLE_VIOLATION;
use node_composer::domain::allocation::remote_drive::remote_drive_strategy_factory::MULTIPLE_REMOTE_DRIVES_VIOLATION;
use node_composer::domain::allocation::remote_drive::volume_strategy::{ENDPOINT_GONE_VIOLATION, ENDPOINTS_USED_VIOLATION, VolumeStrategy};
use node_composer::domain::allocation::validation::computer_system_collector::MULTIPLE_SYSTEMS_VIOLATION;
use node_composer::domain::composed_node::{AttachedAsset, ComposedNode, ComposedNodeState};
use node_composer::domain::composer_config::ComposerConfig;
use node_composer::domain::inventory::inventory::{Inventory, SystemKey};
use node_composer::domain::inventory::resources::{EntityLink, EntityRole, ProcessorType, Protocol, ReplicaType, TpmInterfaceType};
use node_composer::domain::matcher::Matchers;
use node_composer::domain::matcher::computer_system_matcher::ComputerSystemMatcher;
use node_composer::domain::node_task::{NodeTask, ZoneMember};
use node_composer::domain::request::requested_node::{
    ProcessorConnectivity, RequestedLocalDrive, RequestedMasterDrive, RequestedMemory, RequestedNode, RequestedProcessor, RequestedRemoteDrive,
    RequestedSecurity,
};
use node_composer::domain::utils::id::ResourceUri;
use node_composer::error::AllocationError;

fn request(name: &str) -> RequestedNode {
    RequestedNode { name: name.to_string(), ..Default::default() }
}

fn remote_drive(drive: RequestedRemoteDrive) -> RequestedNode {
    RequestedNode { name: "remote".to_string(), remote_drives: vec![drive], ..Default::default() }
}

fn allocated_flags(inventory: &Inventory) -> Vec<bool> {
    let systems = inventory.systems.iter().map(|(_, s)| s.allocated);
    let processors = inventory.processors.iter().map(|(_, p)| p.allocated);
    let drives = inventory.drives.iter().map(|(_, d)| d.allocated);
    let volumes = inventory.volumes.iter().map(|(_, v)| v.allocated);
    let endpoints = inventory.endpoints.iter().map(|(_, e)| e.allocated);
    systems.chain(processors).chain(drives).chain(volumes).chain(endpoints).collect()
}

#[test]
fn test_successful_allocation_is_committed() {
    let mut fixture = InventoryFixture::new();
    let system = fixture.system("/redfish/v1/Systems/1");
    fixture.processor("/redfish/v1/Systems/1/Processors/1", ProcessorType::Cpu, system);
    let store = fixture.into_store();

    let service = AllocationService::default();
    let mut tx = store.begin();
    let context = service.create(&mut tx, &request("web-01")).unwrap();
    store.commit(tx).unwrap();

    assert_eq!(context.tasks, vec![NodeTask::mark_assembled(context.composed_node_uri.clone())]);

    let node = store.find_composed_node(&context.composed_node_uri).unwrap();
    assert_eq!(node.state, ComposedNodeState::Allocated);
    assert_eq!(node.name, "web-01");
    assert_eq!(node.computer_system, Some(ResourceUri::new("/redfish/v1/Systems/1")));
    assert!(node.clear_tpm_on_delete);
    assert!(node.clear_optane_memory_on_delete);

    let inventory = store.snapshot();
    let committed = inventory.systems.get(system).unwrap();
    assert!(committed.allocated);
    assert_eq!(committed.composed_node.as_ref(), Some(&node.uri));
    assert!(inventory.processors.iter().all(|(_, p)| p.allocated));
}

#[test]
fn test_rejected_request_leaves_inventory_untouched() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let store = fixture.into_store();
    let before = allocated_flags(&store.snapshot());

    let mut node = request("broken");
    node.memory = vec![RequestedMemory { capacity_mib: None, resource: Some(ResourceUri::new("/redfish/v1/Systems/404/Memory/1")) }];

    let service = AllocationService::default();
    let mut tx = store.begin();
    let error = service.create(&mut tx, &node).unwrap_err();

    assert!(error.violations().unwrap().contains("Specified resource (/redfish/v1/Systems/404/Memory/1) does not exist."));
    assert!(!tx.has_changes());
    drop(tx);

    assert_eq!(allocated_flags(&store.snapshot()), before);
    assert!(store.composed_nodes().is_empty());
}

#[test]
fn test_only_one_of_two_concurrent_allocations_commits() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let store = fixture.into_store();
    let service = AllocationService::default();

    let mut first = store.begin();
    let mut second = store.begin();
    service.create(&mut first, &request("a")).unwrap();
    service.create(&mut second, &request("b")).unwrap();

    store.commit(first).unwrap();
    let conflict = store.commit(second).unwrap_err();
    assert_eq!(conflict, AllocationError::Conflict(ResourceUri::new("/redfish/v1/Systems/1")));
    assert_eq!(store.composed_nodes().len(), 1);

    let mut retry = store.begin();
    let error = service.create(&mut retry, &request("b")).unwrap_err();
    assert!(error.violations().unwrap().contains(NO_SYSTEM_AVAILABLE_VIOLATION));
}

#[test]
fn test_fpga_only_request_lands_on_system_with_fpga() {
    let mut fixture = InventoryFixture::new();
    let plain = fixture.system("/redfish/v1/Systems/1");
    let with_fpga = fixture.system("/redfish/v1/Systems/2");
    fixture.processor("/redfish/v1/Systems/1/Processors/1", ProcessorType::Cpu, plain);
    fixture.processor("/redfish/v1/Systems/2/Processors/1", ProcessorType::Cpu, with_fpga);
    fixture.processor("/redfish/v1/Systems/2/Processors/2", ProcessorType::Fpga, with_fpga);
    let store = fixture.into_store();

    let mut node = request("fpga");
    node.processors = vec![RequestedProcessor { processor_type: Some(ProcessorType::Fpga), ..Default::default() }];

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    let composed = &tx.persisted_nodes()[0];
    assert_eq!(composed.uri, context.composed_node_uri);
    assert_eq!(composed.computer_system, Some(ResourceUri::new("/redfish/v1/Systems/2")));
    // Local FPGAs need no task.
    assert_eq!(task_names(&context.tasks), vec!["ChangeComposedNodeState"]);
}

#[test]
fn test_explicit_clear_flags_are_kept() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let store = fixture.into_store();

    let mut node = request("secure");
    node.security = Some(RequestedSecurity { clear_tpm_on_delete: Some(false), ..Default::default() });

    let mut tx = store.begin();
    AllocationService::default().create(&mut tx, &node).unwrap();

    let composed = &tx.persisted_nodes()[0];
    assert!(!composed.clear_tpm_on_delete);
    assert!(composed.clear_optane_memory_on_delete);
}

#[test]
fn test_master_clone_capacity_is_inherited_or_overridden() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let storage = remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    fixture.volume("/redfish/v1/StorageServices/1/Volumes/gold", storage.pool, storage.storage_service, 100, true);
    let store = fixture.into_store();

    let master = RequestedMasterDrive { replica_type: ReplicaType::Clone, resource: ResourceUri::new("/redfish/v1/StorageServices/1/Volumes/gold") };
    for (requested, expected) in [(None, 100.0), (Some(50.0), 50.0)] {
        let node = remote_drive(RequestedRemoteDrive { capacity_gib: requested, master: Some(master.clone()), ..Default::default() });

        let mut tx = store.begin();
        let context = AllocationService::default().create(&mut tx, &node).unwrap();

        let capacity = context.tasks.iter().find_map(|task| match task {
            NodeTask::CreateRemoteVolume { capacity_gib, replica, .. } => {
                assert_eq!(replica.as_ref().map(|r| r.replica_type), Some(ReplicaType::Clone));
                Some(*capacity_gib)
            }
            _ => None,
        });
        assert_eq!(capacity, Some(expected));
        assert_eq!(tx.persisted_nodes()[0].remote_drive_capacity_gib, Some(expected));
    }
}

#[test]
fn test_compute_tasks_precede_drive_tasks() {
    let mut fixture = InventoryFixture::new();
    let system = fixture.system_with("/redfish/v1/Systems/1", |s| s.pcie_connection_ids = vec!["conn-1".to_string()]);
    fixture.processor("/redfish/v1/Systems/1/Processors/1", ProcessorType::Cpu, system);
    fixture.pcie_drive("/redfish/v1/Chassis/PCIe/Drives/1", 800.0, &["conn-1"]);
    remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    let store = fixture.into_store();

    let mut node = remote_drive(RequestedRemoteDrive { capacity_gib: Some(20.0), ..Default::default() });
    node.local_drives = vec![RequestedLocalDrive { capacity_gib: Some(500.0), ..Default::default() }];

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(
        task_names(&context.tasks),
        vec!["AttachPcieDrive", "CreateRemoteVolume", "CreateInitiatorEndpoint", "CreateZone", "ChangeComposedNodeState"]
    );
    assert!(context.tasks.last().unwrap().is_mark_assembled());

    let composed = &tx.persisted_nodes()[0];
    assert!(composed.assets.contains(&AttachedAsset::Drive(ResourceUri::new("/redfish/v1/Chassis/PCIe/Drives/1"))));
    assert!(composed.storage_pools.contains(&ResourceUri::new("/redfish/v1/StorageServices/1/StoragePools/1")));
}

#[test]
fn test_zoned_pcie_drives_are_detached_before_attach() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| s.pcie_connection_ids = vec!["conn-1".to_string()]);
    let pcie_fabric = fixture.fabric("/redfish/v1/Fabrics/PCIe", Protocol::Pcie);
    let zone = fixture.zone("/redfish/v1/Fabrics/PCIe/Zones/1", pcie_fabric);
    fixture.pcie_drive("/redfish/v1/Chassis/PCIe/Drives/1", 800.0, &["conn-1"]);
    let zoned = fixture.pcie_drive("/redfish/v1/Chassis/PCIe/Drives/2", 100.0, &["conn-1"]);
    fixture.endpoint("/redfish/v1/Fabrics/PCIe/Endpoints/2", Protocol::Pcie, pcie_fabric, vec![(EntityRole::Target, EntityLink::Drive(zoned))], Some(zone));
    let store = fixture.into_store();

    let mut node = request("pcie");
    node.local_drives = vec![RequestedLocalDrive { capacity_gib: Some(500.0), ..Default::default() }];

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(task_names(&context.tasks), vec!["DetachDriveFromZone", "AttachPcieDrive", "ChangeComposedNodeState"]);
    assert_eq!(
        context.tasks[0],
        NodeTask::DetachDriveFromZone {
            drive: ResourceUri::new("/redfish/v1/Chassis/PCIe/Drives/2"),
            endpoint: ResourceUri::new("/redfish/v1/Fabrics/PCIe/Endpoints/2"),
            zone: ResourceUri::new("/redfish/v1/Fabrics/PCIe/Zones/1"),
        }
    );
}

#[test]
fn test_two_remote_drives_yield_one_violation() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let store = fixture.into_store();

    let mut node = request("two-drives");
    node.remote_drives = vec![
        RequestedRemoteDrive { capacity_gib: Some(10.0), ..Default::default() },
        RequestedRemoteDrive { capacity_gib: Some(20.0), ..Default::default() },
    ];

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    let violations = error.violations().unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations.contains(MULTIPLE_REMOTE_DRIVES_VIOLATION));
    assert!(!tx.has_changes());
}

#[test]
fn test_volume_with_used_endpoints_is_rejected() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let storage = remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    let volume = fixture.volume("/redfish/v1/StorageServices/1/Volumes/1", storage.pool, storage.storage_service, 10, false);
    let zone = fixture.zone("/redfish/v1/Fabrics/storage/Zones/1", storage.fabric);
    fixture.endpoint(
        "/redfish/v1/Fabrics/storage/Endpoints/1",
        Protocol::NvmeOverFabrics,
        storage.fabric,
        vec![(EntityRole::Target, EntityLink::Volume(volume))],
        Some(zone),
    );
    let store = fixture.into_store();

    let node = remote_drive(RequestedRemoteDrive { resource: Some(ResourceUri::new("/redfish/v1/StorageServices/1/Volumes/1")), ..Default::default() });

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    assert!(error.violations().unwrap().contains(ENDPOINTS_USED_VIOLATION));
    assert!(tx.persisted_nodes().is_empty());
    assert!(!tx.inventory().volumes.get(volume).unwrap().allocated);
}

#[test]
fn test_volume_whose_only_endpoint_is_allocated_gets_no_assets() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let storage = remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    let volume = fixture.volume("/redfish/v1/StorageServices/1/Volumes/1", storage.pool, storage.storage_service, 10, false);
    let endpoint = fixture.endpoint(
        "/redfish/v1/Fabrics/storage/Endpoints/1",
        Protocol::NvmeOverFabrics,
        storage.fabric,
        vec![(EntityRole::Target, EntityLink::Volume(volume))],
        None,
    );
    if let Some(e) = fixture.inventory.endpoints.get_mut(endpoint) {
        e.allocated = true;
    }
    let store = fixture.into_store();
    let uri = ResourceUri::new("/redfish/v1/StorageServices/1/Volumes/1");

    let node = remote_drive(RequestedRemoteDrive { resource: Some(uri.clone()), ..Default::default() });
    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    assert!(error.violations().unwrap().contains(ENDPOINTS_USED_VIOLATION));
    assert!(tx.persisted_nodes().is_empty());

    let mut composed = ComposedNode::new("direct", None);
    let error = VolumeStrategy::new(uri).allocate(&mut tx, &mut composed, None).unwrap_err();

    assert!(error.violations().unwrap().contains(ENDPOINT_GONE_VIOLATION));
    assert!(composed.assets.is_empty());
    assert!(!tx.inventory().volumes.get(volume).unwrap().allocated);
}

#[test]
fn test_unknown_remote_drive_is_reported_with_compute_violations() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let store = fixture.into_store();

    let mut node = remote_drive(RequestedRemoteDrive {
        resource: Some(ResourceUri::new("/redfish/v1/StorageServices/1/Volumes/404")),
        ..Default::default()
    });
    node.memory = vec![RequestedMemory { capacity_mib: None, resource: Some(ResourceUri::new("/redfish/v1/Systems/404/Memory/1")) }];

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    let violations = error.violations().unwrap();
    assert_eq!(violations.len(), 2);
    assert!(violations.contains("Specified resource (/redfish/v1/Systems/404/Memory/1) does not exist."));
    assert!(violations.contains("Specified resource (/redfish/v1/StorageServices/1/Volumes/404) does not exist."));
}

#[test]
fn test_endpoint_reference_reports_every_problem() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    let storage = remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    let zone = fixture.zone("/redfish/v1/Fabrics/storage/Zones/1", storage.fabric);
    let endpoint = fixture.endpoint("/redfish/v1/Fabrics/storage/Endpoints/1", Protocol::NvmeOverFabrics, storage.fabric, Vec::new(), Some(zone));
    if let Some(e) = fixture.inventory.endpoints.get_mut(endpoint) {
        e.allocated = true;
        e.achievable = false;
    }
    let store = fixture.into_store();

    let node = remote_drive(RequestedRemoteDrive { resource: Some(ResourceUri::new("/redfish/v1/Fabrics/storage/Endpoints/1")), ..Default::default() });

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    let violations = error.violations().unwrap();
    assert_eq!(violations.len(), 5);
    assert!(violations.contains("Endpoint /redfish/v1/Fabrics/storage/Endpoints/1 is not achievable"));
    assert!(violations.contains("Endpoint /redfish/v1/Fabrics/storage/Endpoints/1 is already allocated"));
    assert!(violations.contains("Endpoint /redfish/v1/Fabrics/storage/Endpoints/1 is already a member of a zone"));
    assert!(violations.contains("Endpoint /redfish/v1/Fabrics/storage/Endpoints/1 does not have the target role"));
    assert!(violations.contains("Endpoint /redfish/v1/Fabrics/storage/Endpoints/1 has no connected volume"));
}

#[test]
fn test_existing_endpoint_attaches_its_volumes() {
    let mut fixture = InventoryFixture::new();
    let system = fixture.system("/redfish/v1/Systems/1");
    let storage = remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    let volume = fixture.volume("/redfish/v1/StorageServices/1/Volumes/1", storage.pool, storage.storage_service, 10, false);
    fixture.endpoint(
        "/redfish/v1/Fabrics/storage/Endpoints/target",
        Protocol::NvmeOverFabrics,
        storage.fabric,
        vec![(EntityRole::Target, EntityLink::Volume(volume))],
        None,
    );
    fixture.endpoint(
        "/redfish/v1/Fabrics/storage/Endpoints/initiator",
        Protocol::NvmeOverFabrics,
        storage.fabric,
        vec![(EntityRole::Initiator, EntityLink::System(system))],
        None,
    );
    let store = fixture.into_store();

    let node =
        remote_drive(RequestedRemoteDrive { resource: Some(ResourceUri::new("/redfish/v1/Fabrics/storage/Endpoints/target")), ..Default::default() });

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(
        context.tasks[0],
        NodeTask::CreateZone {
            composed_node: context.composed_node_uri.clone(),
            fabric: Some(ResourceUri::new("/redfish/v1/Fabrics/storage")),
            initiator: ZoneMember::Existing { endpoint: ResourceUri::new("/redfish/v1/Fabrics/storage/Endpoints/initiator") },
            target: ZoneMember::Existing { endpoint: ResourceUri::new("/redfish/v1/Fabrics/storage/Endpoints/target") },
        }
    );
    assert!(tx.inventory().volumes.get(volume).unwrap().allocated);
    assert_eq!(tx.persisted_nodes()[0].assets.len(), 2);
}

#[test]
fn test_bootable_iscsi_volume_gets_boot_tasks() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| {
        s.network_device_functions = vec![ResourceUri::new("/redfish/v1/Systems/1/NetworkInterfaces/1/NetworkDeviceFunctions/1")]
    });
    let storage = remote_storage(&mut fixture, Protocol::Iscsi, 1000);
    fixture.volume("/redfish/v1/StorageServices/1/Volumes/boot", storage.pool, storage.storage_service, 40, true);
    let store = fixture.into_store();

    let node = remote_drive(RequestedRemoteDrive { resource: Some(ResourceUri::new("/redfish/v1/StorageServices/1/Volumes/boot")), ..Default::default() });

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(
        task_names(&context.tasks),
        vec![
            "CreateTargetEndpoint",
            "CreateInitiatorEndpoint",
            "ConfigureIscsiBoot",
            "SetBootSourceOverride",
            "CreateZone",
            "ChangeComposedNodeState"
        ]
    );
}

#[test]
fn test_new_iscsi_volume_is_not_bootable() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| {
        s.network_device_functions = vec![ResourceUri::new("/redfish/v1/Systems/1/NetworkInterfaces/1/NetworkDeviceFunctions/1")]
    });
    remote_storage(&mut fixture, Protocol::Iscsi, 1000);
    let store = fixture.into_store();

    let node = remote_drive(RequestedRemoteDrive { capacity_gib: Some(30.0), protocol: Some(Protocol::Iscsi), ..Default::default() });

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(
        task_names(&context.tasks),
        vec!["CreateRemoteVolume", "CreateInitiatorEndpoint", "ConfigureIscsiBoot", "CreateZone", "ChangeComposedNodeState"]
    );
}

#[test]
fn test_default_protocol_from_config_filters_pools() {
    let mut fixture = InventoryFixture::new();
    fixture.system("/redfish/v1/Systems/1");
    remote_storage(&mut fixture, Protocol::NvmeOverFabrics, 1000);
    let store = fixture.into_store();

    let config = ComposerConfig { default_remote_drive_protocol: Some(Protocol::Iscsi), ..Default::default() };
    let service = AllocationService::new(Matchers::default(), config);
    let node = remote_drive(RequestedRemoteDrive { capacity_gib: Some(30.0), ..Default::default() });

    let mut tx = store.begin();
    let error = service.create(&mut tx, &node).unwrap_err();

    assert!(error.violations().unwrap().contains("There is no storage pool with sufficient space available"));
}

/// Accepts every candidate, so allocation reaches checks the default matcher would have prevented.
#[derive(Debug)]
struct AcceptAllMatcher;

impl ComputerSystemMatcher for AcceptAllMatcher {
    fn matches(&self, _request: &RequestedNode, candidates: Vec<SystemKey>, _inventory: &Inventory) -> Vec<SystemKey> {
        candidates
    }
}

#[test]
fn test_missing_tpm_type_is_an_internal_error() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| s.trusted_modules = vec![InventoryFixture::trusted_module(TpmInterfaceType::Tpm2_0)]);
    let store = fixture.into_store();

    let matchers = Matchers::default().with_computer_system_matcher(Arc::new(AcceptAllMatcher));
    let service = AllocationService::new(matchers, ComposerConfig::default());
    let mut node = request("tpm");
    node.security = Some(RequestedSecurity { tpm_interface_type: Some(TpmInterfaceType::Tpm1_2), ..Default::default() });

    let mut tx = store.begin();
    let error = service.create(&mut tx, &node).unwrap_err();

    assert!(matches!(error, AllocationError::Internal(_)));
    drop(tx);
    assert!(!store.snapshot().systems.iter().any(|(_, s)| s.allocated));
}

#[test]
fn test_tpm_and_user_mode_tasks() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| {
        s.user_mode_enabled = Some(false);
        s.trusted_modules = vec![InventoryFixture::trusted_module(TpmInterfaceType::Tpm1_2), InventoryFixture::trusted_module(TpmInterfaceType::Tpm2_0)];
    });
    let store = fixture.into_store();

    let mut node = request("tpm");
    node.security = Some(RequestedSecurity { tpm_present: Some(true), txt_enabled: Some(true), ..Default::default() });

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(context.tasks[0], NodeTask::EnableUserMode { system: ResourceUri::new("/redfish/v1/Systems/1") });
    assert_eq!(
        context.tasks[1],
        NodeTask::ChangeTpmState {
            system: ResourceUri::new("/redfish/v1/Systems/1"),
            interface_type: TpmInterfaceType::Tpm2_0,
            device_enabled: true,
            txt_enabled: Some(true),
        }
    );
}

#[test]
fn test_remote_fpga_is_attached_over_pcie_fabric() {
    let mut fixture = InventoryFixture::new();
    let system = fixture.system_with("/redfish/v1/Systems/1", |s| s.pcie_connection_ids = vec!["conn-7".to_string()]);
    fixture.processor("/redfish/v1/Systems/1/Processors/1", ProcessorType::Cpu, system);
    let fabric = fixture.fabric("/redfish/v1/Fabrics/PCIe", Protocol::Pcie);
    let fpga = fixture.remote_fpga("/redfish/v1/Chassis/FPGA/Processors/1", fabric, Protocol::Pcie, &["conn-7"]);
    let store = fixture.into_store();

    let mut node = request("accelerated");
    node.processors = vec![
        RequestedProcessor { processor_type: Some(ProcessorType::Cpu), ..Default::default() },
        RequestedProcessor { processor_type: Some(ProcessorType::Fpga), ..Default::default() },
    ];

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();
    store.commit(tx).unwrap();

    assert_eq!(
        context.tasks[0],
        NodeTask::AttachRemoteProcessor {
            composed_node: context.composed_node_uri.clone(),
            system: ResourceUri::new("/redfish/v1/Systems/1"),
            processor: ResourceUri::new("/redfish/v1/Chassis/FPGA/Processors/1"),
            fabric: ResourceUri::new("/redfish/v1/Fabrics/PCIe"),
        }
    );
    assert!(store.snapshot().processors.get(fpga).unwrap().allocated);
}

#[test]
fn test_referenced_pcie_fpga_pins_the_system_sharing_its_switch() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| s.pcie_connection_ids = vec!["conn-1".to_string()]);
    fixture.system_with("/redfish/v1/Systems/2", |s| s.pcie_connection_ids = vec!["conn-2".to_string()]);
    let fabric = fixture.fabric("/redfish/v1/Fabrics/PCIe", Protocol::Pcie);
    fixture.remote_fpga("/redfish/v1/Chassis/FPGA/Processors/1", fabric, Protocol::Pcie, &["conn-2"]);
    let store = fixture.into_store();

    let mut node = request("pinned");
    node.processors = vec![RequestedProcessor { resource: Some(ResourceUri::new("/redfish/v1/Chassis/FPGA/Processors/1")), ..Default::default() }];

    let mut tx = store.begin();
    let context = AllocationService::default().create(&mut tx, &node).unwrap();

    assert_eq!(tx.persisted_nodes()[0].computer_system, Some(ResourceUri::new("/redfish/v1/Systems/2")));
    assert_eq!(task_names(&context.tasks), vec!["AttachRemoteProcessor", "ChangeComposedNodeState"]);
}

#[test]
fn test_referenced_pcie_fpga_out_of_reach_is_rejected() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| s.pcie_connection_ids = vec!["conn-1".to_string()]);
    let fabric = fixture.fabric("/redfish/v1/Fabrics/PCIe", Protocol::Pcie);
    let fpga = fixture.remote_fpga("/redfish/v1/Chassis/FPGA/Processors/1", fabric, Protocol::Pcie, &["conn-9"]);
    let store = fixture.into_store();

    let mut node = request("unreachable");
    node.processors = vec![RequestedProcessor { resource: Some(ResourceUri::new("/redfish/v1/Chassis/FPGA/Processors/1")), ..Default::default() }];

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    assert!(
        error
            .violations()
            .unwrap()
            .contains("Specified resource (/redfish/v1/Chassis/FPGA/Processors/1) is not reachable from any computer system.")
    );
    assert!(!tx.has_changes());
    assert!(!tx.inventory().processors.get(fpga).unwrap().allocated);
}

#[test]
fn test_referenced_fpga_with_other_connectivity_is_rejected() {
    let mut fixture = InventoryFixture::new();
    fixture.system_with("/redfish/v1/Systems/1", |s| s.pcie_connection_ids = vec!["conn-1".to_string()]);
    let fabric = fixture.fabric("/redfish/v1/Fabrics/PCIe", Protocol::Pcie);
    fixture.remote_fpga("/redfish/v1/Chassis/FPGA/Processors/1", fabric, Protocol::Pcie, &["conn-1"]);
    let store = fixture.into_store();

    let mut node = request("over-ethernet");
    node.processors = vec![RequestedProcessor {
        connectivity: vec![ProcessorConnectivity::Ethernet],
        resource: Some(ResourceUri::new("/redfish/v1/Chassis/FPGA/Processors/1")),
        ..Default::default()
    }];

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    assert!(error.violations().unwrap().contains("Specified resource (/redfish/v1/Chassis/FPGA/Processors/1) is not valid."));
}

#[test]
fn test_references_on_different_systems_are_rejected() {
    let mut fixture = InventoryFixture::new();
    let first = fixture.system("/redfish/v1/Systems/1");
    fixture.system("/redfish/v1/Systems/2");
    fixture.local_drive("/redfish/v1/Systems/1/Drives/1", first, 100.0);
    let store = fixture.into_store();

    let mut node = request("split");
    node.local_drives = vec![RequestedLocalDrive { resource: Some(ResourceUri::new("/redfish/v1/Systems/1/Drives/1")), ..Default::default() }];
    node.memory = vec![RequestedMemory { capacity_mib: None, resource: Some(ResourceUri::new("/redfish/v1/Systems/2/Memory/1")) }];

    let mut tx = store.begin();
    let error = AllocationService::default().create(&mut tx, &node).unwrap_err();

    assert!(error.violations().unwrap().contains(MULTIPLE_SYSTEMS_VIOLATION));
}
