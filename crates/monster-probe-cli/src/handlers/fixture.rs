//! `check-fixture`: load and validate a monster fixture

use crate::commands::CheckFixtureArgs;
use crate::error::CliResult;
use monster_probe::MonsterFixture;
use std::io::Write;

/// Validate the fixture and list its records
///
/// # Errors
///
/// Returns error if the file is unreadable or fails validation
pub fn execute_check_fixture(args: &CheckFixtureArgs, out: &mut impl Write) -> CliResult<()> {
    let fixture = MonsterFixture::load(&args.path)?;
    writeln!(
        out,
        "{}: {} monster(s)",
        args.path.display(),
        fixture.len()
    )?;
    for monster in fixture.iter() {
        writeln!(out, "  [{}] {}", monster.test_id, monster.summary())?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn check(json: &str) -> CliResult<String> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monsters.json");
        std::fs::write(&path, json).unwrap();
        let mut out = Vec::new();
        execute_check_fixture(&CheckFixtureArgs { path }, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_lists_records() {
        let out = check(
            r#"{"monsters":[{"name":"Old Shark","hp":70,"attack":80,"defense":50,"speed":60,"testId":"monster-2"}]}"#,
        )
        .unwrap();
        assert!(out.contains("1 monster(s)"));
        assert!(out.contains("[monster-2] Old Shark with HP:70, ATK:80, DEF:50, SPD:60"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let record = r#"{"name":"A","hp":1,"attack":1,"defense":1,"speed":1,"testId":"m"}"#;
        let err = check(&format!(r#"{{"monsters":[{record},{record}]}}"#)).unwrap_err();
        assert!(err.to_string().contains("duplicate testId"));
    }

    #[test]
    fn test_bundled_fixture_is_valid() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/monsters.json");
        let mut out = Vec::new();
        execute_check_fixture(&CheckFixtureArgs { path }, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("5 monster(s)"));
    }
}
