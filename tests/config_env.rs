// only test touching MEMSPACE_CAPACITY, kept in its own binary

use std::{env, fs};

use memspace::SpaceConfig;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn capacity_env_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memspace.json");
    fs::write(&path, r#"{ "capacity": 64 }"#).unwrap();

    env::remove_var("MEMSPACE_CAPACITY");
    assert_eq!(SpaceConfig::load_from_path(&path).unwrap().capacity, 64);

    env::set_var("MEMSPACE_CAPACITY", "2048");
    assert_eq!(SpaceConfig::load_from_path(&path).unwrap().capacity, 2048);
    assert_eq!(
        SpaceConfig::load_from_path(dir.path().join("absent.json")).unwrap().capacity,
        2048
    );

    env::set_var("MEMSPACE_CAPACITY", "lots");
    assert_eq!(SpaceConfig::load_from_path(&path).unwrap().capacity, 64);
    assert_eq!(
        SpaceConfig::load_from_path(dir.path().join("absent.json")).unwrap(),
        SpaceConfig::default()
    );

    env::remove_var("MEMSPACE_CAPACITY");
}
