#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const CREDENTIAL_VARS: [&str; 5] = [
    "AZURE_CLIENT_ID",
    "AZURE_CLIENT_SECRET",
    "AZURE_TENANT_ID",
    "AZURE_SUBSCRIPTION_ID",
    "ARMFLOW_CONFIG_PATH",
];

/// 外部の設定・環境変数に影響されないコマンドを作る
fn isolated(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("armflow").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// ダミーの認証情報を持つコマンドを作る（ネットワークには接続しない）
fn with_credentials(dir: &Path) -> Command {
    let mut cmd = isolated(dir);
    cmd.env("AZURE_CLIENT_ID", "app-1")
        .env("AZURE_CLIENT_SECRET", "s3cret")
        .env("AZURE_TENANT_ID", "tenant-1")
        .env("AZURE_SUBSCRIPTION_ID", "sub-1");
    cmd
}

fn write_vm_file(dir: &Path, platform: &str) -> std::path::PathBuf {
    let path = dir.join("vm.yaml");
    fs::write(
        &path,
        format!(
            r#"name: web01.example.com
resource_group: web-rg
location: East US
vm_size: Standard_B2s
platform: {platform}
image_id: Canonical:0001-com-ubuntu-server-jammy:22_04-lts:latest
username: azureuser
ssh_key_data: ssh-ed25519 AAAA
interfaces_attributes:
  - network: /subscriptions/sub-1/resourceGroups/net-rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/default
    bridge: Static
  - network: /subscriptions/sub-1/resourceGroups/net-rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/backend
volumes_attributes:
  - disk_size_gb: 64
"#
        ),
    )
    .unwrap();
    path
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("armflow").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("依存リソースごと"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("test-connection"))
        .stdout(predicate::str::contains("vm-sizes"));
}

/// バージョン表示は設定なしで動作することを確認
#[test]
fn test_cli_version() {
    let temp_dir = tempfile::tempdir().unwrap();
    isolated(temp_dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("armflow"));
}

/// ロケーション一覧は設定なしで動作することを確認
#[test]
fn test_locations_without_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    isolated(temp_dir.path())
        .arg("locations")
        .assert()
        .success()
        .stdout(predicate::str::contains("East US"))
        .stdout(predicate::str::contains("West Central US"));
}

/// 存在しないコマンドはエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("armflow").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// createコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_create_help() {
    let mut cmd = Command::cargo_bin("armflow").unwrap();
    cmd.arg("create")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--yes"));
}

/// 認証情報がない場合は接続前に失敗することを確認
#[test]
fn test_missing_credentials_fail() {
    let temp_dir = tempfile::tempdir().unwrap();
    isolated(temp_dir.path())
        .arg("vms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing connection attributes"))
        .stderr(predicate::str::contains("AZURE_CLIENT_ID"));
}

/// --yes なしのcreateは計画表示のみで終了することを確認
#[test]
fn test_create_without_yes_shows_plan() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = write_vm_file(temp_dir.path(), "linux");

    with_credentials(temp_dir.path())
        .arg("create")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("web01"))
        .stdout(predicate::str::contains("eastus"))
        .stdout(predicate::str::contains("NIC: 2 個"))
        .stdout(predicate::str::contains("--yes"));
}

/// 不正なプラットフォームは作成前に拒否されることを確認
#[test]
fn test_create_rejects_unknown_platform() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = write_vm_file(temp_dir.path(), "plan9");

    with_credentials(temp_dir.path())
        .arg("create")
        .arg("--file")
        .arg(&file)
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid platform: plan9"));
}

/// --yes なしのdestroyは何も削除しないことを確認
#[test]
fn test_destroy_without_yes() {
    let temp_dir = tempfile::tempdir().unwrap();
    with_credentials(temp_dir.path())
        .arg("destroy")
        .arg("web01")
        .assert()
        .success()
        .stdout(predicate::str::contains("web01"))
        .stdout(predicate::str::contains("--yes"));
}

/// カレントディレクトリの設定ファイルが読み込まれることを確認
#[test]
fn test_config_file_in_current_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("armflow.yaml"),
        "client_id: app-1\nclient_secret: s3cret\ntenant_id: tenant-1\nsubscription_id: sub-1\n",
    )
    .unwrap();

    isolated(temp_dir.path())
        .arg("destroy")
        .arg("web01")
        .assert()
        .success()
        .stderr(predicate::str::contains("armflow.yaml"));
}

/// 壊れた設定ファイルはエラーになることを確認
#[test]
fn test_broken_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("broken.yaml");
    fs::write(&path, "client_id: [unterminated").unwrap();

    isolated(temp_dir.path())
        .arg("--config")
        .arg(&path)
        .arg("vms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yaml"));
}
