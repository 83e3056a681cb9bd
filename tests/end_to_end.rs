//! Runs the `byotty` binary on a pseudo-terminal.

use rexpect::session::spawn_command;
use std::process::Command;

const TIMEOUT_MS: Option<u64> = Some(10_000);

fn spawn_byotty() -> rexpect::session::PtySession {
    let mut command = Command::new(env!("CARGO_BIN_EXE_byotty"));
    command.env_remove("BYOTTY_CONFIG").env("RUST_LOG", "off");
    let mut session = spawn_command(command, TIMEOUT_MS).expect("spawn byotty");
    session
        .exp_string("Press ⇧Z ⇧Q to quit")
        .expect("banner");
    session
}

#[test]
fn test_echoes_chords_and_quits_on_control_c() {
    let mut session = spawn_byotty();

    session.send("a").expect("send a");
    session.flush().expect("flush");
    session.exp_string(" A \"a\"").expect("echo of a");

    session.send("\x1b[A").expect("send up arrow");
    session.flush().expect("flush");
    session.exp_string(" ↑ ").expect("echo of up arrow");

    session.send_control('c').expect("send ⌃C");
    session.exp_eof().expect("exit after ⌃C");
}

#[test]
fn test_quits_on_shift_z_shift_q() {
    let mut session = spawn_byotty();

    session.send("Z").expect("send Z");
    session.flush().expect("flush");
    session.exp_string(" ⇧Z ").expect("echo of Z");

    session.send("Q").expect("send Q");
    session.flush().expect("flush");
    session.exp_eof().expect("exit after ⇧Z ⇧Q");
}
