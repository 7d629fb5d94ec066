//! Terminal presenter: prints questions and reads numbered choices.

use std::io::{self, Write};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use adaptest_core::report::SessionSummary;
use adaptest_core::session::{AnswerFeedback, PresentedQuestion};
use adaptest_core::traits::{Presenter, PresenterEvent};

/// What one line of input means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// 0-based choice index.
    Choice(usize),
    Quit,
    Unrecognized,
}

/// Parse a line typed at the answer prompt. Choices are numbered from 1.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Input::Quit;
    }
    match line.parse::<usize>() {
        Ok(n) if n >= 1 => Input::Choice(n - 1),
        _ => Input::Unrecognized,
    }
}

/// Reads answers line by line from `R` and writes the quiz to `W`.
///
/// A write that fails outside [`Presenter::ask`] is kept and returned by the
/// next `ask`, so a broken output stops the session.
pub struct TerminalPresenter<R, W> {
    lines: Lines<R>,
    out: W,
    write_error: Option<io::Error>,
}

impl<R, W> TerminalPresenter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            write_error: None,
        }
    }

    /// Next trimmed input line, or `None` at end of input.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let line = self
            .lines
            .next_line()
            .await
            .context("failed to read from input")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    /// Show `prompt` and read a non-empty answer.
    pub async fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            write!(self.out, "{prompt}")?;
            self.out.flush()?;
            match self.read_line().await? {
                Some(line) if line.is_empty() => continue,
                other => return Ok(other),
            }
        }
    }

    fn say(&mut self, text: std::fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn keep_error(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.write_error.get_or_insert(e);
        }
    }
}

#[async_trait]
impl<R, W> Presenter for TerminalPresenter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn ask(&mut self, question: &PresentedQuestion) -> Result<PresenterEvent> {
        if let Some(e) = self.write_error.take() {
            return Err(e).context("failed to write to output");
        }
        self.say(format_args!(
            "\nQuestion {} [{}]: {}",
            question.number,
            question.difficulty(),
            question.prompt()
        ))
        .context("failed to write to output")?;
        for (i, choice) in question.choices.iter().enumerate() {
            self.say(format_args!("  {}) {choice}", i + 1))
                .context("failed to write to output")?;
        }

        let prompt = format!("Your answer (1-{}, q to quit): ", question.choices.len());
        loop {
            let Some(line) = self.prompt(&prompt).await? else {
                return Ok(PresenterEvent::Abort);
            };
            match parse_input(&line) {
                Input::Choice(index) => return Ok(PresenterEvent::Selected(index)),
                Input::Quit => return Ok(PresenterEvent::Abort),
                Input::Unrecognized => {
                    self.say(format_args!("Please enter a choice number or q."))
                        .context("failed to write to output")?;
                }
            }
        }
    }

    fn on_answer(&mut self, feedback: &AnswerFeedback) {
        let verdict = if feedback.record.result.is_correct() {
            self.say(format_args!("Correct! ({:+})", feedback.score_delta))
        } else {
            self.say(format_args!(
                "Incorrect. The answer was {} ({:+})",
                feedback.correct_answer, feedback.score_delta
            ))
        };
        let result = verdict.and_then(|()| {
            self.say(format_args!(
                "Score: {} / {}",
                feedback.score, feedback.possible_score
            ))
        });
        self.keep_error(result);
    }

    fn on_invalid_choice(&mut self, index: usize, available: usize) {
        let result = self.say(format_args!(
            "There is no choice {}; pick 1 to {available}.",
            index + 1
        ));
        self.keep_error(result);
    }

    fn on_finish(&mut self, summary: &SessionSummary) {
        let result = self
            .say(format_args!("\nSession finished: {}", summary.end_reason))
            .and_then(|()| self.say(format_args!("{}", summary.headline())))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!("failed to write session summary: {e}");
        }
    }
}
