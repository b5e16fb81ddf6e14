mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "armflow")]
#[command(about = "Azure の VM を、依存リソースごと作って、片付ける。", long_about = None)]
struct Cli {
    /// 接続設定ファイル (YAML)
    #[arg(short, long, env = "ARMFLOW_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    /// サブスクリプションID (設定ファイルより優先)
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", global = true)]
    subscription: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 認証情報と権限を確認
    #[command(name = "test-connection")]
    TestConnection,
    /// VMを作成（NIC・パブリックIP・ディスクを含む）
    Create {
        /// VM定義ファイル (YAML)
        #[arg(short, long)]
        file: PathBuf,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// VMと依存リソースを削除
    Destroy {
        /// VM名
        name: String,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// VMの詳細を表示
    Show {
        /// VM名
        name: String,
    },
    /// VMの一覧を表示
    Vms,
    /// 利用可能なロケーションを表示
    Locations,
    /// リソースグループの一覧を表示
    #[command(name = "resource-groups")]
    ResourceGroups,
    /// ストレージアカウントの一覧を表示
    #[command(name = "storage-accounts")]
    StorageAccounts {
        /// ロケーションで絞り込み (例: "East US")
        #[arg(short, long)]
        location: Option<String>,
    },
    /// 仮想ネットワークの一覧を表示
    Vnets {
        /// ロケーションで絞り込み
        #[arg(short, long)]
        location: Option<String>,
    },
    /// サブネットの一覧を表示
    Subnets {
        /// ロケーションで絞り込み
        #[arg(short, long)]
        location: Option<String>,
    },
    /// サブスクリプションの一覧を表示
    Subscriptions,
    /// VMサイズの一覧を表示
    #[command(name = "vm-sizes")]
    VmSizes {
        /// ロケーション (例: "East US")
        #[arg(short, long)]
        location: String,
    },
    /// カスタムイメージの一覧を表示
    Images,
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Version・Locationsコマンドは設定ファイル不要
    match cli.command {
        Commands::Version => {
            println!("armflow {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Locations => {
            commands::list::handle_locations();
            return Ok(());
        }
        _ => {}
    }

    let config = utils::load_arm_config(cli.config.as_deref(), cli.subscription.as_deref())?;
    let provider = utils::connect(config)?;

    // コマンドディスパッチ
    match cli.command {
        Commands::TestConnection => {
            commands::connection::handle(&provider).await?;
        }
        Commands::Create { file, yes } => {
            commands::create::handle(&provider, &file, yes).await?;
        }
        Commands::Destroy { name, yes } => {
            commands::destroy::handle(&provider, &name, yes).await?;
        }
        Commands::Show { name } => {
            commands::list::handle_show(&provider, &name).await?;
        }
        Commands::Vms => {
            commands::list::handle_vms(&provider).await?;
        }
        Commands::ResourceGroups => {
            commands::list::handle_resource_groups(&provider).await?;
        }
        Commands::StorageAccounts { location } => {
            commands::list::handle_storage_accounts(&provider, location.as_deref()).await?;
        }
        Commands::Vnets { location } => {
            commands::list::handle_vnets(&provider, location.as_deref()).await?;
        }
        Commands::Subnets { location } => {
            commands::list::handle_subnets(&provider, location.as_deref()).await?;
        }
        Commands::Subscriptions => {
            commands::list::handle_subscriptions(&provider).await?;
        }
        Commands::VmSizes { location } => {
            commands::list::handle_vm_sizes(&provider, &location).await?;
        }
        Commands::Images => {
            commands::list::handle_images(&provider).await?;
        }
        // 設定読み込み前に処理済み
        Commands::Version | Commands::Locations => {}
    }

    Ok(())
}
