//! Output sink and input source used by `print`, `inputi` and `inputs`

use std::collections::VecDeque;
use std::io::{BufRead, Write};

pub trait Console {
    /// Emit one line of program output
    fn write_line(&mut self, line: &str);

    /// Read one line of input without its line terminator, or `None` once
    /// input is exhausted
    fn read_line(&mut self) -> Option<String>;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line)
    }

    fn read_line(&mut self) -> Option<String> {
        (**self).read_line()
    }
}

/// Process stdin/stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed pipe drops the line
        let _ = writeln!(out, "{}", line);
    }

    fn read_line(&mut self) -> Option<String> {
        let _ = std::io::stdout().flush();
        let mut buf = String::new();
        match std::io::stdin().lock().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(strip_terminator(buf)),
        }
    }
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// In-memory console: queued input, captured output
#[derive(Debug, Default, Clone)]
pub struct BufferedConsole {
    input: VecDeque<String>,
    output: Vec<String>,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

impl Console for BufferedConsole {
    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }
}
