//! Child-process execution shared by the SSH and local runners

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::domain::value_objects::{CommandResult, RunOptions};

/// Run `cmd` to completion and capture its output.
///
/// With `opts.verbose` (and not `opts.mute`) stdout is echoed line by line,
/// prefixed with `label`, as it arrives.
pub(crate) fn capture(mut cmd: Command, label: &str, opts: &RunOptions) -> io::Result<CommandResult> {
    let stream = opts.verbose && !opts.mute;

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let output = thread::scope(|scope| {
        let err_handle = scope.spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr {
                pipe.read_to_end(&mut buf)?;
            }
            Ok::<_, io::Error>(String::from_utf8_lossy(&buf).into_owned())
        });

        let out = stdout
            .map(|pipe| read_lines(pipe, stream.then_some(label)))
            .transpose()
            .map(Option::unwrap_or_default);
        if out.is_err() {
            // unblock a child still writing to the pipe we stopped draining
            let _ = child.kill();
        }

        let err = err_handle
            .join()
            .unwrap_or_else(|_| Ok(String::new()));
        Ok::<_, io::Error>((out?, err?))
    });

    // reap the child even when reading its output failed
    let status = child.wait()?;
    let (out, err) = output?;
    // killed by a signal: no exit code, report as failure
    let code = status.code().unwrap_or(-1);

    Ok(CommandResult::new(label, code, out).with_stderr(err))
}

/// Collect `pipe` line by line, echoing each line when `echo` names a label.
/// Bytes that are not UTF-8 are replaced rather than rejected.
fn read_lines(pipe: impl Read, echo: Option<&str>) -> io::Result<String> {
    let mut reader = BufReader::new(pipe);
    let console = io::stdout();
    let mut out = String::new();
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(label) = echo {
            let mut handle = console.lock();
            let _ = writeln!(handle, "[{label}] {line}");
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}
