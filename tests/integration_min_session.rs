// Drives the compiled binary through a PTY, covering the real event loop and
// crossterm input handling.
//
// Needs a TTY, so these are Unix-only and ignored by default.
// Run with `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

fn spawn_clackr(args: &str) -> Result<expectrl::Session, Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("clackr");
    let session = spawn(format!("{} {args}", bin.display()))?;
    // let the app set up the alternate screen
    std::thread::sleep(Duration::from_millis(200));
    Ok(session)
}

#[test]
#[ignore]
fn custom_prompt_reaches_results_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let mut p = spawn_clackr("-p hi")?;

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));
    p.expect("(r)etry")?;

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn timed_quote_run_quits_on_ctrl_c() -> Result<(), Box<dyn std::error::Error>> {
    let mut p = spawn_clackr("-m quotes -s 15")?;

    p.expect("15s")?;
    p.send("T")?;
    std::thread::sleep(Duration::from_millis(300));

    p.send("\x03")?; // Ctrl+C
    p.expect(Eof)?;
    Ok(())
}
