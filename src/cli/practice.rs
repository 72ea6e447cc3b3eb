//! Practice command for lexdrill.
//!
//! Line-based driver for a practice session. Each word is shown through its
//! definition; the user types the word. `:a` reveals the answer and `:q`
//! quits. After a correct answer, Enter moves on.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::core::{Advance, PresentedWord, Session};
use crate::error::Result;

/// Command typed to reveal the answer.
pub const REVEAL: &str = ":a";
/// Command typed to quit.
pub const QUIT: &str = ":q";

/// Options for the practice command.
#[derive(Debug, Clone, Default)]
pub struct PracticeOptions {
    /// Print a JSON summary when the run ends.
    pub json: bool,
    /// Suppress the end-of-run summary.
    pub quiet: bool,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeEnd {
    /// No more words due or fresh.
    Completed,
    /// The user quit (or input ended).
    Quit,
}

/// Summary of a practice run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeOutput {
    pub collection: String,
    /// Words answered correctly.
    pub correct: usize,
    /// Wrong attempts.
    pub wrong: usize,
    /// Answers revealed.
    pub revealed: usize,
    pub ended: PracticeEnd,
}

/// The practice command implementation.
pub struct PracticeCommand<'a> {
    session: Session<'a>,
}

impl<'a> PracticeCommand<'a> {
    /// Create a practice command over a started session.
    pub fn new(session: Session<'a>) -> Self {
        Self { session }
    }

    /// Run the interactive loop until the session terminates or the user
    /// quits.
    ///
    /// Storage failures end the run with an error.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<PracticeOutput> {
        let mut output = PracticeOutput {
            collection: self.session.collection().to_string(),
            correct: 0,
            wrong: 0,
            revealed: 0,
            ended: PracticeEnd::Completed,
        };

        'words: loop {
            let presented = match self.session.advance()? {
                Advance::Word(word) => word,
                Advance::Terminated => {
                    writeln!(out, "Nothing left to practice in '{}'.", output.collection)?;
                    break;
                }
            };
            self.render_prompt(&mut out, &presented)?;

            loop {
                write!(out, "> ")?;
                out.flush()?;
                let Some(line) = read_line(&mut input)? else {
                    output.ended = PracticeEnd::Quit;
                    break 'words;
                };

                match line.trim() {
                    QUIT => {
                        output.ended = PracticeEnd::Quit;
                        break 'words;
                    }
                    REVEAL => {
                        output.revealed += 1;
                        writeln!(out, "Answer: {}", self.session.reveal_answer()?)?;
                    }
                    "" => {}
                    answer => {
                        if self.session.submit_answer(answer)?.correct {
                            output.correct += 1;
                            writeln!(out, "Correct! (Enter to continue, {} to quit)", QUIT)?;
                            break;
                        }
                        output.wrong += 1;
                        writeln!(out, "Not quite, try again ({} reveals).", REVEAL)?;
                    }
                }
            }

            match read_line(&mut input)? {
                Some(line) if line.trim() != QUIT => {}
                _ => {
                    output.ended = PracticeEnd::Quit;
                    break;
                }
            }
        }

        self.session.quit();
        Ok(output)
    }

    fn render_prompt<W: Write>(&self, out: &mut W, presented: &PresentedWord) -> Result<()> {
        let stats = self.session.stats()?;
        let definition = &presented.definition;

        writeln!(out)?;
        writeln!(
            out,
            "[{}/{}]  mastered {}/{}  due {}  degree {}",
            presented.batch_position,
            presented.batch_len,
            stats.mastered,
            stats.total,
            stats.due_count,
            stats.current_word_degree.unwrap_or(0)
        )?;

        for p in &definition.pronunciations {
            writeln!(out, "  {} [{}]", p.region, p.phonetic)?;
        }
        for sense in definition.visible_senses() {
            writeln!(out, "  {} {}", sense.part, sense.meaning)?;
        }
        if let Some(example) = definition.cloze_examples().first() {
            writeln!(out, "  > {}", example)?;
        }
        if let Some(hint) = &definition.hint {
            writeln!(out, "  hint: {}", hint)?;
        }
        Ok(())
    }

    /// Format the end-of-run summary.
    pub fn format_output(&self, output: &PracticeOutput, options: &PracticeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        format!(
            "{}: {} correct, {} wrong, {} revealed\n",
            output.collection, output.correct, output.wrong, output.revealed
        )
    }
}

/// Read one line; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
