use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;

/// A `tutorhub` invocation whose local state lives in `dir`.
pub fn tutorhub(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("tutorhub"));
    cmd.env_remove("RUST_LOG")
        .env_remove("TUTORHUB_BACKEND")
        .env_remove("TUTORHUB_DB_PATH")
        .env_remove("TUTORHUB_STARTING_BALANCE")
        .env_remove("TUTORHUB_EMAIL")
        .env_remove("TUTORHUB_PASSWORD")
        .arg("--state-file")
        .arg(dir.join("state.json"));
    cmd
}

#[allow(dead_code)]
pub fn sign_up(dir: &Path, extra: &[&str]) -> Command {
    let mut cmd = tutorhub(dir);
    cmd.args(extra).args([
        "signup",
        "--name",
        "Sara Mahmoud",
        "--email",
        "sara@example.com",
        "--password",
        "secret",
    ]);
    cmd
}
