use armflow_cloud_azure::{ArmConfig, AzureRmProvider};
use colored::Colorize;
use std::path::Path;

/// 接続設定を読み込む
///
/// 優先順位: --subscription > AZURE_* 環境変数 > 設定ファイル
pub fn load_arm_config(
    path: Option<&Path>,
    subscription: Option<&str>,
) -> anyhow::Result<ArmConfig> {
    let config = match path {
        Some(path) => {
            let config: ArmConfig = armflow_config::load_from(path)?;
            print_loaded_config_file(path);
            config
        }
        None => match armflow_config::load::<ArmConfig>() {
            Ok((config, path)) => {
                print_loaded_config_file(&path);
                config
            }
            Err(armflow_config::ConfigError::ConfigFileNotFound) => {
                tracing::debug!("no config file found, using environment only");
                ArmConfig::from_env()
            }
            Err(e) => return Err(e.into()),
        },
    };

    let mut config = config.with_env_overrides();
    if let Some(subscription) = subscription.filter(|s| !s.is_empty()) {
        config.subscription_id = subscription.to_string();
    }

    Ok(config)
}

/// 設定を検証してプロバイダーを構築
pub fn connect(config: ArmConfig) -> anyhow::Result<AzureRmProvider> {
    AzureRmProvider::connect(config).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\n{}",
            e,
            "AZURE_CLIENT_ID / AZURE_CLIENT_SECRET / AZURE_TENANT_ID / AZURE_SUBSCRIPTION_ID を設定するか、armflow.yaml を用意してください"
                .yellow()
        )
    })
}

/// 読み込んだ設定ファイル情報を表示
fn print_loaded_config_file(path: &Path) {
    eprintln!("📄 設定ファイル: {}", path.display().to_string().cyan());
}

/// 確認フラグがない場合の案内を表示
pub fn print_confirmation_hint(action: &str) {
    println!();
    println!("{}", format!("⚠ {}", action).yellow().bold());
    println!("実行するには --yes オプションを指定してください");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CREDENTIAL_VARS: [&str; 4] = [
        "AZURE_CLIENT_ID",
        "AZURE_CLIENT_SECRET",
        "AZURE_TENANT_ID",
        "AZURE_SUBSCRIPTION_ID",
    ];

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("armflow.yaml");
        fs::write(
            &path,
            "client_id: app-1\nclient_secret: s3cret\ntenant_id: tenant-1\nsubscription_id: sub-file\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_arm_config_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path());

        temp_env::with_vars_unset(CREDENTIAL_VARS, || {
            let config = load_arm_config(Some(&path), None).unwrap();
            assert_eq!(config.client_id, "app-1");
            assert_eq!(config.subscription_id, "sub-file");
            assert_eq!(config.poll_interval_secs, 5);
        });
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path());

        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", None),
                ("AZURE_CLIENT_SECRET", Some("from-env")),
                ("AZURE_SUBSCRIPTION_ID", Some("sub-env")),
            ],
            || {
                let config = load_arm_config(Some(&path), None).unwrap();
                assert_eq!(config.client_secret, "from-env");
                assert_eq!(config.subscription_id, "sub-env");
                assert_eq!(config.client_id, "app-1");
            },
        );
    }

    #[test]
    fn test_subscription_flag_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path());

        temp_env::with_var("AZURE_SUBSCRIPTION_ID", Some("sub-env"), || {
            let config = load_arm_config(Some(&path), Some("sub-flag")).unwrap();
            assert_eq!(config.subscription_id, "sub-flag");
        });
    }

    #[test]
    fn test_connect_rejects_missing_credentials() {
        let Err(err) = connect(ArmConfig::default()) else {
            panic!("connect should fail without credentials");
        };
        assert!(err.to_string().contains("missing connection attributes"));
    }
}
