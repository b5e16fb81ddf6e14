use armflow_cloud::ComputeResource;
use armflow_cloud_azure::{AzureRmProvider, LOCATIONS};
use colored::Colorize;

pub fn handle_locations() {
    println!("{}", "利用可能なロケーション:".bold());
    for location in LOCATIONS {
        println!("  • {}", location.cyan());
    }
}

pub async fn handle_vms(provider: &AzureRmProvider) -> anyhow::Result<()> {
    let vms = provider.vms().await?;
    if vms.is_empty() {
        println!("{}", "VMが見つかりません".yellow());
        return Ok(());
    }

    println!("{}", format!("VM一覧 ({} 台):", vms.len()).bold());
    for vm in &vms {
        let group = vm.resource_group().unwrap_or_default();
        let state = vm
            .properties
            .provisioning_state
            .as_deref()
            .unwrap_or("-");
        println!(
            "  • {} [{}] {} {}",
            vm.name.cyan(),
            group,
            vm.location,
            state.dimmed()
        );
    }
    Ok(())
}

pub async fn handle_show(provider: &AzureRmProvider, name: &str) -> anyhow::Result<()> {
    let vm = provider.find_vm_by_uuid(name).await?;

    println!("{}", vm.name.cyan().bold());
    println!("  ID: {}", vm.id);
    println!("  ロケーション: {}", vm.location);
    if let Some(hardware) = &vm.properties.hardware_profile {
        println!("  サイズ: {}", hardware.vm_size);
    }
    if let Some(state) = vm.properties.provisioning_state.as_deref() {
        println!("  状態: {}", state.green());
    }
    for id in vm.network_interface_ids() {
        println!("  NIC: {}", id);
    }
    if let Some(os_disk) = vm.os_disk() {
        println!("  OSディスク: {}", os_disk.name.as_deref().unwrap_or("-"));
    }
    for disk in vm.data_disks() {
        println!(
            "  データディスク: LUN {} {}",
            disk.lun,
            disk.name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn handle_resource_groups(provider: &AzureRmProvider) -> anyhow::Result<()> {
    let groups = provider.available_resource_groups().await?;
    println!("{}", format!("リソースグループ ({} 個):", groups.len()).bold());
    for group in &groups {
        println!(
            "  • {} {}",
            group.name.cyan(),
            group.location.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

pub async fn handle_storage_accounts(
    provider: &AzureRmProvider,
    location: Option<&str>,
) -> anyhow::Result<()> {
    let accounts = provider.storage_accounts(location).await?;
    println!(
        "{}",
        format!("ストレージアカウント ({} 個):", accounts.len()).bold()
    );
    for account in &accounts {
        println!("  • {}", account.cyan());
    }
    Ok(())
}

pub async fn handle_vnets(provider: &AzureRmProvider, location: Option<&str>) -> anyhow::Result<()> {
    let networks = provider.virtual_networks(location).await?;
    println!("{}", format!("仮想ネットワーク ({} 個):", networks.len()).bold());
    for network in &networks {
        println!("  • {} {}", network.name.cyan(), network.location.dimmed());
    }
    Ok(())
}

pub async fn handle_subnets(
    provider: &AzureRmProvider,
    location: Option<&str>,
) -> anyhow::Result<()> {
    let subnets = provider.subnets(location).await?;
    println!("{}", format!("サブネット ({} 個):", subnets.len()).bold());
    for subnet in &subnets {
        println!(
            "  • {} {}",
            subnet.name.cyan(),
            subnet
                .properties
                .address_prefix
                .as_deref()
                .unwrap_or("")
                .dimmed()
        );
        println!("    {}", subnet.id.dimmed());
    }
    Ok(())
}

pub async fn handle_subscriptions(provider: &AzureRmProvider) -> anyhow::Result<()> {
    let subscriptions = provider.subscriptions().await?;
    println!(
        "{}",
        format!("サブスクリプション ({} 個):", subscriptions.len()).bold()
    );
    for subscription in &subscriptions {
        println!(
            "  • {} ({}) {}",
            subscription.display_name.cyan(),
            subscription.subscription_id,
            subscription.state.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

pub async fn handle_vm_sizes(provider: &AzureRmProvider, location: &str) -> anyhow::Result<()> {
    let sizes = provider.vm_sizes(location).await?;
    println!(
        "{}",
        format!("VMサイズ: {} ({} 種類)", location, sizes.len()).bold()
    );
    for size in &sizes {
        println!(
            "  • {} {:>3} vCPU {:>8} MB  データディスク最大 {}",
            format!("{:<24}", size.name).cyan(),
            size.number_of_cores,
            size.memory_in_mb,
            size.max_data_disk_count
        );
    }
    Ok(())
}

pub async fn handle_images(provider: &AzureRmProvider) -> anyhow::Result<()> {
    let images = provider.available_images().await?;
    println!("{}", format!("カスタムイメージ ({} 個):", images.len()).bold());
    for image in &images {
        println!(
            "  • {} {}",
            image.name.cyan(),
            image.location.as_deref().unwrap_or("").dimmed()
        );
        if let Some(id) = &image.id {
            println!("    {}", id.dimmed());
        }
    }
    Ok(())
}
