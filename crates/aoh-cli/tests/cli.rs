use assert_cmd::Command;
use predicates::prelude::*;

fn aoh() -> Command {
    Command::cargo_bin("aoh").unwrap()
}

#[test]
fn test_drivers_lists_geotiff_and_filegdb() {
    aoh()
        .arg("drivers")
        .assert()
        .success()
        .stdout(predicate::str::contains("GTiff"))
        .stdout(predicate::str::contains("OpenFileGDB"));
}

#[test]
fn test_validate_without_inputs_asks_for_dem() {
    aoh()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please choose a DEM raster"));
}

#[test]
fn test_validate_without_class_raster_asks_for_it() {
    let dir = tempfile::tempdir().unwrap();
    let dem = dir.path().join("dem.tif");
    std::fs::write(&dem, b"").unwrap();

    aoh()
        .arg("validate")
        .arg("--dem")
        .arg(&dem)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please choose a class raster"));
}

#[test]
fn test_validate_reports_unreadable_dem() {
    let dir = tempfile::tempdir().unwrap();
    let dem = dir.path().join("dem.tif");
    let class = dir.path().join("class.tif");
    let habitat = dir.path().join("habitat.gdb");
    std::fs::write(&dem, b"not a raster").unwrap();
    std::fs::write(&class, b"not a raster").unwrap();
    std::fs::create_dir(&habitat).unwrap();

    aoh()
        .arg("validate")
        .arg("--dem")
        .arg(&dem)
        .arg("--class")
        .arg(&class)
        .arg("--habitat")
        .arg(&habitat)
        .arg("--new-field")
        .arg("aoh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Open DEM failed"));
}

#[test]
fn test_field_and_new_field_conflict() {
    aoh()
        .args(["validate", "--field", "aoh", "--new-field", "aoh2"])
        .assert()
        .failure();
}

#[test]
fn test_layers_on_missing_container_fails() {
    aoh()
        .args(["layers", "does-not-exist.gdb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Open habitat vector failed"));
}
