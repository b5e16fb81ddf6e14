use crate::utils;
use armflow_cloud::ComputeResource;
use armflow_cloud_azure::{AzureRmProvider, HostVmAttributes, ProvisionRequest};
use colored::Colorize;
use std::path::Path;

/// VM定義ファイルを読み込んで検証する
pub fn load_attributes(file: &Path) -> anyhow::Result<(HostVmAttributes, ProvisionRequest)> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("VM定義ファイルを読み込めません {}: {}", file.display(), e))?;
    let attrs: HostVmAttributes = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("VM定義ファイルの解析に失敗 {}: {}", file.display(), e))?;
    let request = ProvisionRequest::try_from(attrs.clone())?;
    Ok((attrs, request))
}

pub async fn handle(provider: &AzureRmProvider, file: &Path, yes: bool) -> anyhow::Result<()> {
    let (attrs, request) = load_attributes(file)?;

    println!("{}", "VM作成計画:".bold());
    println!("  名前: {}", request.vm_name.cyan());
    println!("  リソースグループ: {}", request.resource_group.cyan());
    println!("  ロケーション: {}", request.location.cyan());
    println!("  サイズ: {}", request.vm_size.cyan());
    println!("  プラットフォーム: {}", request.platform.to_string().cyan());
    println!(
        "  NIC: {} 個 / データディスク: {} 個",
        request.interfaces.len(),
        request.data_disks.len()
    );
    if request.script.is_some() {
        println!("  カスタムスクリプト: あり");
    }

    if !yes {
        utils::print_confirmation_hint("Azure上にリソースが作成され、課金が発生します");
        return Ok(());
    }

    println!();
    println!("{}", "Azureへの接続を確認中...".blue());
    provider.before_create().await?;
    println!("  ✓ 認証OK");

    println!();
    println!("{}", format!("■ {} を作成中...", request.vm_name).yellow().bold());
    match provider.create_vm(&attrs).await {
        Ok(vm) => {
            println!("  ✓ 作成完了");
            println!("  ID: {}", vm.id.cyan());
            if let Some(state) = vm.properties.provisioning_state.as_deref() {
                println!("  状態: {}", state.green());
            }
            for id in vm.network_interface_ids() {
                println!("  NIC: {}", id);
            }
            Ok(())
        }
        Err(e) => {
            println!("  {} {}", "✗".red(), "作成に失敗しました（作成済みのリソースは削除を試みました）".red());
            Err(e.into())
        }
    }
}
