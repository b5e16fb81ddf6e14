use armflow_cloud::ComputeResource;
use armflow_cloud_azure::AzureRmProvider;
use colored::Colorize;

pub async fn handle(provider: &AzureRmProvider) -> anyhow::Result<()> {
    println!("{}", "Azureへの接続を確認中...".blue());
    println!(
        "サブスクリプション: {}",
        provider.config().subscription_id.cyan()
    );

    match provider.test_connection().await {
        Ok(status) => {
            println!();
            println!("{}", "✓ 認証に成功しました".green().bold());
            if let Some(info) = status.account_info {
                println!("  アカウント: {}", info.cyan());
            }
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{}", "✗ 認証に失敗しました".red().bold());
            Err(e.into())
        }
    }
}
