mod common;

use armflow_cloud::{CloudError, ComputeResource};
use armflow_cloud_azure::locator::find_by_identifier;
use armflow_cloud_azure::model::{Disk, DiskProperties, NetworkInterface};
use common::{FakeArm, Fault, SUBSCRIPTION};

#[tokio::test]
async fn test_connection_reports_subscription() {
    let arm = FakeArm::new();
    arm.seed_subscription(SUBSCRIPTION, "Production");

    let status = arm.provider().test_connection().await.unwrap();
    assert!(status.authenticated);
    assert_eq!(
        status.account_info.unwrap(),
        format!("Production ({})", SUBSCRIPTION)
    );
    assert_eq!(arm.calls_to("sub.list").len(), 1);
}

#[tokio::test]
async fn test_connection_not_found_is_permission_error() {
    let arm = FakeArm::new();
    arm.fail("sub.list", "", Fault::NotFound);

    let err = arm.provider().test_connection().await.unwrap_err();
    match err {
        CloudError::Permission(message) => {
            assert_eq!(message, "Your permissions are insufficient")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_connection_forbidden_is_permission_error() {
    let arm = FakeArm::new();
    arm.fail("sub.list", "", Fault::Permission);

    let err = arm.provider().test_connection().await.unwrap_err();
    assert!(matches!(err, CloudError::Permission(_)));
}

#[tokio::test]
async fn test_before_create_validates_then_connects() {
    let arm = FakeArm::new();
    arm.seed_subscription(SUBSCRIPTION, "Production");

    let status = arm.provider().before_create().await.unwrap();
    assert!(status.authenticated);
}

#[tokio::test]
async fn test_locator_first_match_wins() {
    let arm = FakeArm::new();
    arm.seed_vm("rg-a", "dup");
    arm.seed_vm("rg-b", "dup");
    arm.seed_vm("rg-b", "other");

    let vm = find_by_identifier(&arm.clients(), "dup").await.unwrap();
    assert_eq!(vm.resource_group().unwrap(), "rg-a");

    let err = find_by_identifier(&arm.clients(), "missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(arm.calls_to("vm.list").len(), 2);
}

#[tokio::test]
async fn test_find_vm_by_uuid() {
    let arm = FakeArm::new();
    arm.seed_vm("rg-a", "web01");

    let vm = arm.provider().find_vm_by_uuid("web01").await.unwrap();
    assert_eq!(vm.name, "web01");
}

#[tokio::test]
async fn test_storage_accounts_filtered_by_location() {
    let arm = FakeArm::new();
    arm.seed_storage_account("rg-a", "logs", "eastus");
    arm.seed_storage_account("rg-a", "backups", "westus2");
    arm.seed_storage_account("rg-b", "images", "eastus");
    let provider = arm.provider();

    assert_eq!(provider.storage_accounts(None).await.unwrap().len(), 3);
    assert_eq!(
        provider.storage_accounts(Some("East US")).await.unwrap(),
        vec!["logs", "images"]
    );
    assert_eq!(
        provider.storage_accounts(Some("West US 2")).await.unwrap(),
        vec!["backups"]
    );
}

#[tokio::test]
async fn test_subnets_listed_per_virtual_network() {
    let arm = FakeArm::new();
    arm.seed_virtual_network("net-rg", "prod-vnet", "eastus", &["default", "backend"]);
    arm.seed_virtual_network("net-rg", "dev-vnet", "westus", &["default"]);
    let provider = arm.provider();

    let subnets = provider.subnets(None).await.unwrap();
    assert_eq!(subnets.len(), 3);
    assert_eq!(arm.calls_to("subnet.list"), vec!["prod-vnet", "dev-vnet"]);

    let east = provider.virtual_networks(Some("East US")).await.unwrap();
    assert_eq!(east.len(), 1);
    assert_eq!(east[0].name, "prod-vnet");

    let networks = provider.available_networks().await.unwrap();
    let names: Vec<&str> = networks.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["default", "backend", "default"]);
    assert!(networks[1].id.as_deref().unwrap().ends_with("/subnets/backend"));
    assert_eq!(networks[1].resource_group.as_deref(), Some("net-rg"));
}

#[tokio::test]
async fn test_resource_group_listings() {
    let arm = FakeArm::new();
    arm.seed_resource_group("web-rg", "eastus");
    arm.seed_resource_group("net-rg", "westus");
    let provider = arm.provider();

    assert_eq!(
        provider.resource_groups().await.unwrap(),
        vec!["web-rg", "net-rg"]
    );
    let groups = provider.available_resource_groups().await.unwrap();
    assert_eq!(groups[1].location.as_deref(), Some("westus"));
}

#[tokio::test]
async fn test_vm_sizes_use_normalized_location() {
    let arm = FakeArm::new();
    let sizes = arm.provider().vm_sizes("East US 2").await.unwrap();

    assert_eq!(sizes[0].name, "Standard_B2s");
    assert_eq!(arm.calls_to("vm.sizes"), vec!["eastus2"]);
}

#[tokio::test]
async fn test_available_images() {
    let arm = FakeArm::new();
    let images = arm.provider().available_images().await.unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].name, "golden");
    assert_eq!(images[0].resource_group.as_deref(), Some("img-rg"));
}

#[tokio::test]
async fn test_direct_interface_and_volume_creation() {
    let arm = FakeArm::new();
    let provider = arm.provider();

    let nic = provider
        .new_interface(
            "web-rg",
            "spare-nic",
            &NetworkInterface {
                location: "eastus".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(nic.id.ends_with("/networkInterfaces/spare-nic"));

    let disk = provider
        .new_volume(
            "web-rg",
            "scratch",
            &Disk {
                location: "eastus".to_string(),
                properties: DiskProperties {
                    disk_size_gb: Some(32),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(disk.name, "scratch");

    assert!(arm.has_nic("spare-nic"));
    assert!(arm.has_disk("scratch"));
    assert_eq!(arm.calls_to("nic.create"), vec!["spare-nic"]);
    assert_eq!(arm.calls_to("disk.create"), vec!["scratch"]);
}
