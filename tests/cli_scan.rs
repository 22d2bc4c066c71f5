use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_scan() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let prefix = temp.path().join("bact");

    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg("tests/trees/scan")
        .arg("-d")
        .arg("Bact")
        .arg("-c")
        .arg("90")
        .arg("-o")
        .arg(&prefix);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("3 of 7 trees meet the criteria"));

    let summary = fs::read_to_string(temp.path().join("bact.candidates.txt"))?;
    assert_eq!(
        summary,
        "Gene\tNum.Node(support>=90.0)\tNum.Node(support<90.0)\tTotal\n\
         P5\t2\t0\t2\n\
         Q1\t1\t1\t2\n\
         Q2\t2\t0\t2\n"
    );

    let trees = temp.path().join("bact.trees");
    assert!(trees.join("Q1.tre").is_file());
    assert!(trees.join("Q2.tre").is_file());
    assert!(!trees.join("Q3.tre").exists());
    assert!(!trees.join("Q1.tre.ingroup.txt").exists());

    // Only the first line is copied
    let p5 = fs::read_to_string(trees.join("P5_2refseq.contree"))?;
    assert_eq!(p5.lines().count(), 1);

    Ok(())
}

#[test]
fn command_scan_is_deterministic() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut outputs = vec![];
    for name in ["run1", "run2"] {
        let prefix = temp.path().join(name);
        let mut cmd = Command::cargo_bin("nestedin")?;
        cmd.arg("scan")
            .arg("tests/trees/scan")
            .arg("-d")
            .arg("Bact")
            .arg("-c")
            .arg("90")
            .arg("-p")
            .arg("4")
            .arg("-o")
            .arg(&prefix);
        cmd.assert().success();

        outputs.push(fs::read(temp.path().join(format!("{}.candidates.txt", name)))?);
    }
    assert_eq!(outputs[0], outputs[1]);

    Ok(())
}

#[test]
fn command_scan_ingroup() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let prefix = temp.path().join("bact");

    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg("tests/trees/scan")
        .arg("-d")
        .arg("Bact")
        .arg("-c")
        .arg("90")
        .arg("--ingroup")
        .arg("-o")
        .arg(&prefix);
    cmd.assert().success();

    let ingroup = fs::read_to_string(temp.path().join("bact.trees/Q1.tre.ingroup.txt"))?;
    assert_eq!(ingroup, "95.0\tBact_a\t\n60.0\tBact_a,Bact_b\t\n");

    Ok(())
}

#[test]
fn command_scan_generalized() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let prefix = temp.path().join("bact");

    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg("tests/trees/scan")
        .arg("-d")
        .arg("Bact")
        .arg("-c")
        .arg("90")
        .arg("--mode")
        .arg("generalized")
        .arg("-o")
        .arg(&prefix);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("4 of 7 trees"));

    let summary = fs::read_to_string(temp.path().join("bact.candidates.txt"))?;
    let lines: Vec<&str> = summary.lines().collect();
    assert!(lines[0].ends_with("\tTotal\tAdjusted"));
    assert_eq!(lines[1], "P5\t2\t0\t2\t0");
    assert_eq!(lines[4], "Q4\t2\t0\t2\t2");

    Ok(())
}

#[test]
fn command_scan_thresholds() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let prefix = temp.path().join("strict");

    // Two strong nodes needed, Q1 has only one
    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg("tests/trees/scan")
        .arg("-d")
        .arg("Bact")
        .arg("-c")
        .arg("90")
        .arg("--ssn")
        .arg("2")
        .arg("--asn")
        .arg("2")
        .arg("-o")
        .arg(&prefix);
    cmd.assert().success();

    let summary = fs::read_to_string(temp.path().join("strict.candidates.txt"))?;
    assert!(!summary.contains("Q1\t"));
    assert!(summary.contains("Q2\t2\t0\t2"));

    // Credited nodes of Q1 have outgroups of 3 and 2 leaves
    let prefix = temp.path().join("ogs");
    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg("tests/trees/scan")
        .arg("-d")
        .arg("Bact")
        .arg("-c")
        .arg("90")
        .arg("--ogs")
        .arg("4")
        .arg("-o")
        .arg(&prefix);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("of 7 trees"));

    let summary = fs::read_to_string(temp.path().join("ogs.candidates.txt"))?;
    assert!(!summary.contains("Q1\t"));
    assert!(summary.contains("Q2\t"));

    Ok(())
}

#[test]
fn command_scan_default_prefix() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let indir = temp.path().join("in");
    fs::create_dir(&indir)?;
    fs::copy("tests/trees/scan/Q1.tre", indir.join("Q1.tre"))?;

    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg(&indir)
        .arg("-d")
        .arg("Bact,Arch")
        .arg("-c")
        .arg("90")
        .arg("--optional")
        .arg("Plant");
    cmd.assert().success();

    assert!(temp
        .path()
        .join("in.FromBactArch_Cut90.0_WithPlant.candidates.txt")
        .is_file());
    assert!(temp
        .path()
        .join("in.FromBactArch_Cut90.0_WithPlant.trees/Q1.tre")
        .is_file());

    Ok(())
}

#[test]
fn command_scan_missing_dir() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan")
        .arg("tests/trees/no_such_dir")
        .arg("-d")
        .arg("Bact");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("input directory not found"));

    Ok(())
}

#[test]
fn command_scan_empty_donor() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("nestedin")?;
    cmd.arg("scan").arg("tests/trees/scan").arg("-d").arg(",");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no donor taxa"));

    Ok(())
}
