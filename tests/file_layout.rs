use std::{fs, path::Path, sync::Arc};

use glab_config::config::EnvMap;
use glab_config::{ConfigPaths, ConfigStore, FileConfig};
use pretty_assertions::assert_eq;

fn paths(root: &Path) -> ConfigPaths {
    ConfigPaths::new(root.join("config"), root.join("repo"))
}

fn load(root: &Path) -> FileConfig {
    FileConfig::load(paths(root), Arc::new(EnvMap::new())).unwrap()
}

// ---------- main file ----------

#[test]
fn test_unchanged_write_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let config = load(tmp.path());
    let file = paths(tmp.path()).config_file();
    let before = fs::read_to_string(&file).unwrap();

    config.write().unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_new_key_is_appended() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = load(tmp.path());
    let file = paths(tmp.path()).config_file();
    let before = fs::read_to_string(&file).unwrap();

    config.set("", "pager", "less").unwrap();
    config.write().unwrap();

    assert_eq!(fs::read_to_string(&file).unwrap(), format!("{before}pager: less\n"));
}

#[test]
fn test_repeated_set_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let file = paths(tmp.path()).config_file();

    let mut config = load(tmp.path());
    config.set("git.example.com", "token", "abc").unwrap();
    config.write().unwrap();
    let once = fs::read_to_string(&file).unwrap();

    config.set("git.example.com", "token", "abc").unwrap();
    config.write().unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), once);
}

#[test]
fn test_comments_survive_rewrite() {
    let tmp = tempfile::tempdir().unwrap();
    let file = paths(tmp.path()).config_file();
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(
        &file,
        "\
# preferred protocol
git_protocol: https
hosts:
    gitlab.com:
        # personal token
        token: abc
",
    )
    .unwrap();

    let mut config = load(tmp.path());
    config.set("", "git_protocol", "ssh").unwrap();
    config.write().unwrap();

    let text = fs::read_to_string(&file).unwrap();
    assert!(text.contains("# preferred protocol\ngit_protocol: ssh\n"));
    assert!(text.contains("# personal token\n"));

    let reloaded = load(tmp.path());
    assert_eq!(reloaded.get("gitlab.com", "token").unwrap(), "abc");
    assert_eq!(reloaded.get("", "git_protocol").unwrap(), "ssh");
}

// ---------- scope files ----------

#[test]
fn test_scopes_live_in_their_own_files() {
    let tmp = tempfile::tempdir().unwrap();
    let p = paths(tmp.path());

    let mut config = load(tmp.path());
    config.aliases().unwrap().set("co", "mr checkout").unwrap();
    config.local().unwrap().set("gitlab_token", "repo-token").unwrap();
    config.write().unwrap();

    assert_eq!(fs::read_to_string(p.aliases_file()).unwrap(), "co: mr checkout\n");
    assert_eq!(fs::read_to_string(p.local_file()).unwrap(), "token: repo-token\n");

    let main = fs::read_to_string(p.config_file()).unwrap();
    assert!(!main.contains("aliases"));
    assert!(!main.contains("repo-token"));

    let mut reloaded = load(tmp.path());
    assert_eq!(reloaded.aliases().unwrap().get("co").as_deref(), Some("mr checkout"));
    assert_eq!(reloaded.get("", "token").unwrap(), "repo-token");
}

#[test]
fn test_unset_host_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = load(tmp.path());
    config.set("git.example.com", "token", "abc").unwrap();
    config.write().unwrap();

    let mut config = load(tmp.path());
    config.unset_host("git.example.com");
    config.write().unwrap();

    assert_eq!(load(tmp.path()).hosts().unwrap(), ["gitlab.com"]);
}

// ---------- legacy layout ----------

const LEGACY: &str = "\
gitlab.com:
    - token: abc123
      git_protocol: https
git.example.com:
    - token: def456
editor: vim
";

#[test]
fn test_legacy_file_is_migrated_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let p = paths(tmp.path());
    fs::create_dir_all(&p.config_dir).unwrap();
    fs::write(p.config_file(), LEGACY).unwrap();

    let config = load(tmp.path());

    assert_eq!(fs::read_to_string(p.backup_file()).unwrap(), LEGACY);
    assert_eq!(config.get("gitlab.com", "token").unwrap(), "abc123");
    assert_eq!(config.get("gitlab.com", "git_protocol").unwrap(), "https");
    assert_eq!(config.get("git.example.com", "token").unwrap(), "def456");
    assert_eq!(config.get("", "editor").unwrap(), "vim");
    assert_eq!(config.hosts().unwrap(), ["gitlab.com", "git.example.com"]);

    let migrated = fs::read_to_string(p.config_file()).unwrap();
    assert!(migrated.contains("hosts:\n"));

    // a second load sees the new layout and leaves everything alone
    let again = load(tmp.path());
    assert_eq!(fs::read_to_string(p.config_file()).unwrap(), migrated);
    assert_eq!(fs::read_to_string(p.backup_file()).unwrap(), LEGACY);
    assert_eq!(again.get("git.example.com", "token").unwrap(), "def456");
}
