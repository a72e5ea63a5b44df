use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use postscrape_core::{JobStatus, ProgressView};
use postscrape_engine::ScrapeController;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const VERIFICATION_PROMPT: &str =
    "Complete the verification in the browser window, then press Enter to continue.";

/// Terminal front end over the progress view: echoes log lines as they
/// appear and answers verification pauses from `input`.
pub(crate) struct Console<R, W> {
    input: R,
    output: W,
    printed: usize,
    poll: Duration,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            printed: 0,
            poll: POLL_INTERVAL,
        }
    }

    /// Poll until `done` holds for a snapshot, then return that snapshot.
    pub(crate) fn follow(
        &mut self,
        controller: &ScrapeController,
        done: impl Fn(&ProgressView) -> bool,
    ) -> io::Result<ProgressView> {
        loop {
            let view = controller.progress();
            self.print_new(&view.logs)?;
            if done(&view) {
                return Ok(view);
            }
            if view.awaiting_verification() {
                self.await_operator()?;
                controller.resume_after_verification();
                continue;
            }
            thread::sleep(self.poll);
        }
    }

    fn print_new(&mut self, logs: &[String]) -> io::Result<()> {
        // A new run clears the log.
        if logs.len() < self.printed {
            self.printed = 0;
        }
        for line in &logs[self.printed..] {
            writeln!(self.output, "{line}")?;
        }
        self.printed = logs.len();
        self.output.flush()
    }

    fn await_operator(&mut self) -> io::Result<()> {
        writeln!(self.output, "{VERIFICATION_PROMPT}")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for verification",
            ));
        }
        Ok(())
    }
}
