use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use tempfile::tempdir;

const ADMIN: &str = "asha@example.com";
const MEMBER: &str = "rima@example.com";

fn khata(dir: &Path, actor: Option<&str>, args: &[&str]) -> Command {
    let binary = assert_cmd::cargo::cargo_bin!("khata");
    let mut cmd = Command::new(binary);
    cmd.current_dir(dir);
    cmd.env("KHATA_DB_PATH", dir.join("khata.db"));
    cmd.env_remove("KHATA_CONFIG");
    cmd.env_remove("KHATA_ACTOR");
    if let Some(actor) = actor {
        cmd.args(["--actor", actor]);
    }
    cmd.args(args);
    cmd
}

fn stdout_of(cmd: &mut Command) -> Result<String> {
    let assert = cmd.assert().success();
    Ok(String::from_utf8(assert.get_output().stdout.clone())?)
}

fn register(dir: &Path) {
    khata(
        dir,
        None,
        &[
            "org",
            "register",
            "Test Mess",
            "--admin-name",
            "Asha",
            "--admin-email",
            ADMIN,
        ],
    )
    .assert()
    .success();
}

fn seed_august(dir: &Path) {
    register(dir);
    khata(dir, Some(ADMIN), &["member", "add", "Rima", MEMBER])
        .assert()
        .success();
    khata(
        dir,
        Some(ADMIN),
        &["wallet", "deposit", MEMBER, "500", "--date", "2026-08-02"],
    )
    .assert()
    .success();
    khata(
        dir,
        Some(ADMIN),
        &[
            "expense",
            "add",
            "1000",
            "groceries",
            "weekly bazar",
            "--date",
            "2026-08-03",
        ],
    )
    .assert()
    .success();
    khata(
        dir,
        Some(ADMIN),
        &[
            "meal",
            "mark",
            "--date",
            "2026-08-10",
            "--entry",
            "rima@example.com:breakfast:3",
            "--entry",
            "rima@example.com:lunch:3.5",
            "--entry",
            "rima@example.com:dinner:3.5",
        ],
    )
    .assert()
    .success();
}

#[test]
fn month_end_flow_produces_the_sheet() -> Result<()> {
    let temp = tempdir()?;
    let dir = temp.path();
    seed_august(dir);

    let rate = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &["report", "rate", "--month", "2026-08"],
    ))?;
    assert!(rate.contains("rate 100 "), "unexpected rate output: {rate}");

    let sheet = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &["report", "settle", "--month", "2026-08", "--csv"],
    ))?;
    let expected = [
        "\"Current Meal Rate: 100.00\"",
        "Member Name,Meals Consumed,Calculated Cost,Total Deposited,Adjusted Balance",
        "\"Asha\",0.0,0.00,0.00,0.00",
        "\"Rima\",10.0,1000.00,500.00,-500.00",
        "",
        "TOTALS,10.0,1000.00,500.00,-500.00",
    ]
    .join("\n");
    assert_eq!(sheet, format!("{expected}\n"));
    Ok(())
}

#[test]
fn re_marking_a_sheet_replaces_instead_of_stacking() -> Result<()> {
    let temp = tempdir()?;
    let dir = temp.path();
    seed_august(dir);

    let rerun = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &[
            "meal",
            "mark",
            "--date",
            "2026-08-10",
            "--entry",
            "rima@example.com:breakfast:3",
            "--entry",
            "rima@example.com:lunch:3.5",
            "--entry",
            "rima@example.com:dinner:3.5",
        ],
    ))?;
    assert!(
        rerun.contains("3 record(s) (0 new schedule(s))"),
        "unexpected rerun output: {rerun}"
    );

    let rate = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &["report", "rate", "--month", "2026-08"],
    ))?;
    assert!(rate.contains("rate 100 "), "unexpected rate output: {rate}");

    // Saving a lower breakfast count replaces the old one.
    khata(
        dir,
        Some(ADMIN),
        &[
            "meal",
            "mark",
            "--date",
            "2026-08-10",
            "--entry",
            "rima@example.com:breakfast:2",
        ],
    )
    .assert()
    .success();
    let sheet = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &["report", "settle", "--month", "2026-08", "--csv"],
    ))?;
    assert!(
        sheet.contains("\"Rima\",9.0,1000.00,500.00,-500.00"),
        "unexpected sheet: {sheet}"
    );
    Ok(())
}

#[test]
fn empty_month_settles_at_zero_rate() -> Result<()> {
    let temp = tempdir()?;
    let dir = temp.path();
    register(dir);

    let rate = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &["report", "rate", "--month", "2026-08"],
    ))?;
    assert!(rate.contains("rate 0 "), "unexpected rate output: {rate}");

    let sheet = stdout_of(&mut khata(
        dir,
        Some(ADMIN),
        &["report", "settle", "--month", "2026-08", "--csv"],
    ))?;
    assert!(sheet.starts_with("\"Current Meal Rate: 0.00\"\n"));
    assert!(sheet.contains("\"Asha\",0.0,0.00,0.00,0.00"));
    Ok(())
}

#[test]
fn members_cannot_run_admin_commands() -> Result<()> {
    let temp = tempdir()?;
    let dir = temp.path();
    register(dir);
    khata(dir, Some(ADMIN), &["member", "add", "Rima", MEMBER])
        .assert()
        .success();

    let assert = khata(
        dir,
        Some(MEMBER),
        &["expense", "add", "100", "groceries", "bazar"],
    )
    .assert()
    .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone())?;
    assert!(
        stderr.contains("admin privileges"),
        "unexpected stderr: {stderr}"
    );
    Ok(())
}

#[test]
fn json_mode_emits_machine_readable_output() -> Result<()> {
    let temp = tempdir()?;
    let dir = temp.path();
    register(dir);
    khata(dir, Some(ADMIN), &["member", "add", "Rima", MEMBER])
        .assert()
        .success();

    let listed = stdout_of(&mut khata(dir, Some(ADMIN), &["--json", "member", "list"]))?;
    let members: serde_json::Value = serde_json::from_str(&listed)?;
    let names: Vec<&str> = members
        .as_array()
        .expect("array of members")
        .iter()
        .map(|member| member["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Asha", "Rima"]);
    Ok(())
}

#[test]
fn config_init_prints_usable_defaults() -> Result<()> {
    let temp = tempdir()?;
    let printed = stdout_of(&mut khata(temp.path(), None, &["config-init"]))?;
    let parsed: toml::Value = toml::from_str(&printed)?;
    assert_eq!(
        parsed["db_path"].as_str(),
        Some("khata.db"),
        "unexpected config: {printed}"
    );
    assert_eq!(parsed["utc_offset_minutes"].as_integer(), Some(360));
    Ok(())
}
