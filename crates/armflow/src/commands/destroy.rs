use crate::utils;
use armflow_cloud::{CloudError, ComputeResource, StepOutcome, TeardownReport};
use armflow_cloud_azure::AzureRmProvider;
use colored::Colorize;

pub async fn handle(provider: &AzureRmProvider, name: &str, yes: bool) -> anyhow::Result<()> {
    println!("{}", format!("■ {} を削除します", name).yellow().bold());
    println!("  VM本体、NIC、パブリックIP、OSディスク、データディスクが削除されます");

    if !yes {
        utils::print_confirmation_hint("この操作は取り消せません");
        return Ok(());
    }

    println!();
    println!("{}", "削除中...".blue());
    match provider.destroy_vm(name).await {
        Ok(report) => {
            print_report(&report);
            if report.found {
                println!();
                println!("{}", format!("✓ {} を削除しました", name).green().bold());
            } else {
                println!("{}", format!("✓ {} は既に存在しません", name).green());
            }
            Ok(())
        }
        Err(CloudError::PartialTeardown(report)) => {
            print_report(&report);
            println!();
            println!(
                "{}",
                "✗ 一部のリソースを削除できませんでした。Azure Portalで確認してください"
                    .red()
                    .bold()
            );
            Err(anyhow::anyhow!("teardown incomplete: {}", report))
        }
        Err(e) => {
            println!("{}", format!("✗ {} の削除に失敗しました", name).red().bold());
            Err(e.into())
        }
    }
}

fn print_report(report: &TeardownReport) {
    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Deleted => {
                println!("  ✓ {} {}", step.kind, step.name.cyan());
            }
            StepOutcome::AlreadyGone => {
                println!("  - {} {} (既に削除済み)", step.kind, step.name);
            }
            StepOutcome::Failed(error) => {
                println!("  {} {} {}: {}", "✗".red(), step.kind, step.name, error.red());
            }
        }
    }
    println!(
        "  {} ({}ms)",
        report.summary().to_string().dimmed(),
        report.duration_ms
    );
}
