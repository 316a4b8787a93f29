//! Line-by-line evaluation of stdin.

use std::io::{self, BufRead};

use clap::Args;

use crate::error::{MipaError, Result};
use crate::output::{plural, Printer};
use crate::parser::Location;
use crate::runtime::Flow;

use super::{Session, SessionArgs};

/// Evaluate statements read from stdin
#[derive(Args, Debug)]
pub struct ReplArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

pub fn run(args: ReplArgs, printer: &Printer) -> Result<()> {
    let mut session = Session::open(&args.session, printer)?;
    let stdin = io::stdin();
    let (lines, failures) = evaluate_lines(&mut session, stdin.lock(), printer)?;
    session.close(printer);

    printer.info(
        "Finished",
        &format!("{}, {}", plural(lines, "line", "lines"), plural(failures, "error", "errors")),
    );
    Ok(())
}

/// Feed `input` to the session one line at a time until it ends or a
/// statement exits. Values are echoed to stdout. A line that is not UTF-8
/// counts as a failed statement; read errors end the loop.
fn evaluate_lines(session: &mut Session, input: impl BufRead, printer: &Printer) -> Result<(usize, usize)> {
    let (mut lines, mut failures) = (0, 0);
    for bytes in input.split(b'\n') {
        let bytes = bytes?;
        lines += 1;
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                failures += 1;
                let error = MipaError::Parse {
                    message: format!("line is not valid UTF-8: {}", e.utf8_error()),
                    help: None,
                };
                printer.script_error("<stdin>", Some(Location::new(lines as u32, 1)), &error);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let (flow, failed) = session.run(&line, "<stdin>", printer, true);
        failures += failed;
        if let Flow::Exit = flow {
            break;
        }
    }
    Ok((lines, failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lines_stop_at_exit() {
        let printer = Printer::new();
        let mut session = Session::open(&SessionArgs::default(), &printer).unwrap();
        let input = Cursor::new("x = 1\n\ny = nope\nquit()\nz = 3\n");
        let (lines, failures) = evaluate_lines(&mut session, input, &printer).unwrap();
        session.close(&printer);

        assert_eq!(lines, 4);
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let printer = Printer::plain();
        let mut session = Session::open(&SessionArgs::default(), &printer).unwrap();
        let input = Cursor::new(b"x = 1\n\xff\xfe\ny = 2\r\n".to_vec());
        let (lines, failures) = evaluate_lines(&mut session, input, &printer).unwrap();

        assert_eq!(lines, 3);
        assert_eq!(failures, 1);
        assert!(session.interpreter.state().contains("y"));
        session.close(&printer);
    }
}
