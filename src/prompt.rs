use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Mutex;

/// Environment variable holding a JSON array of scripted answers, consumed in
/// order by every prompt. Used for unattended demo runs.
pub const DEMO_INPUTS_VAR: &str = "LIT_REVIEW_DEMO_INPUTS";

/// Line-oriented terminal prompts, optionally fed from a script instead of
/// stdin.
pub struct Prompter {
    scripted: Option<Mutex<VecDeque<String>>>,
}

impl Prompter {
    /// Read answers from stdin.
    pub fn interactive() -> Self {
        Self { scripted: None }
    }

    /// Answer prompts from `inputs` in order. Once exhausted every prompt
    /// gets an empty answer, i.e. its default.
    pub fn scripted(inputs: Vec<String>) -> Self {
        Self {
            scripted: Some(Mutex::new(inputs.into())),
        }
    }

    /// Scripted if [`DEMO_INPUTS_VAR`] is set, interactive otherwise.
    pub fn from_env() -> Result<Self> {
        match std::env::var(DEMO_INPUTS_VAR) {
            Ok(raw) if !raw.trim().is_empty() => {
                let inputs: Vec<String> = serde_json::from_str(&raw)
                    .with_context(|| format!("{} must be a JSON array of strings", DEMO_INPUTS_VAR))?;
                tracing::info!(answers = inputs.len(), "Using scripted prompt answers");
                Ok(Self::scripted(inputs))
            }
            _ => Ok(Self::interactive()),
        }
    }

    pub fn is_scripted(&self) -> bool {
        self.scripted.is_some()
    }

    /// Next raw line, `None` at end of input.
    fn next_line(&self) -> Result<Option<String>> {
        if let Some(ref queue) = self.scripted {
            let next = queue
                .lock()
                .map_err(|_| anyhow::anyhow!("Scripted input queue poisoned"))?
                .pop_front();
            if let Some(ref answer) = next {
                println!("{}", answer);
            }
            return Ok(next);
        }

        let mut input = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
        }
    }

    /// Prompt user with a message and return their trimmed input.
    pub fn prompt(&self, message: &str) -> Result<String> {
        print!("{}", message);
        std::io::stdout().flush().context("Failed to flush stdout")?;
        Ok(self.next_line()?.unwrap_or_default().trim().to_string())
    }

    /// Prompt user with a message and a default value. Returns default if input is empty.
    pub fn prompt_with_default(&self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Prompt user with a yes/no question. Returns bool based on input and default.
    pub fn prompt_yes_no(&self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?;
        let input = input.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }

    /// Ask for a 1-based choice out of `count`, re-prompting until valid.
    pub fn prompt_choice(&self, message: &str, count: usize, default: usize) -> Result<usize> {
        loop {
            let input = self.prompt_with_default(message, &default.to_string())?;
            match input.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(n),
                _ => {
                    println!("  Invalid: enter a number between 1 and {}.", count);
                    if self.is_exhausted() {
                        return Ok(default);
                    }
                }
            }
        }
    }

    /// Free text over several lines, ended by two consecutive blank lines
    /// (or end of input). Returns the trimmed text.
    pub fn read_multiline(&self, message: &str) -> Result<String> {
        println!("{}", message);
        println!("(Finish with two empty lines)");

        let mut lines: Vec<String> = Vec::new();
        let mut blank_run = 0;
        while let Some(line) = self.next_line()? {
            if line.trim().is_empty() {
                blank_run += 1;
                if blank_run >= 2 {
                    break;
                }
            } else {
                blank_run = 0;
            }
            lines.push(line);
        }

        Ok(lines.join("\n").trim().to_string())
    }

    /// Block until the user presses Enter.
    pub fn wait_for_enter(&self, message: &str) -> Result<()> {
        self.prompt(message).map(|_| ())
    }

    fn is_exhausted(&self) -> bool {
        match self.scripted {
            Some(ref queue) => queue.lock().map(|q| q.is_empty()).unwrap_or(true),
            None => false,
        }
    }
}

/// Print text with a typewriter effect, one character at a time.
/// Scripted runs print instantly.
pub fn typewriter(text: &str, prompter: &Prompter) {
    if prompter.is_scripted() {
        println!("{}", text);
        return;
    }
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(12));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(answers: &[&str]) -> Prompter {
        Prompter::scripted(answers.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_prompt_with_default() {
        let prompter = script(&["", "custom"]);
        assert_eq!(prompter.prompt_with_default("Name", "dflt").unwrap(), "dflt");
        assert_eq!(prompter.prompt_with_default("Name", "dflt").unwrap(), "custom");
        // Exhausted: default again
        assert_eq!(prompter.prompt_with_default("Name", "dflt").unwrap(), "dflt");
    }

    #[test]
    fn test_prompt_yes_no() {
        let prompter = script(&["y", "NO", "", "yes"]);
        assert!(prompter.prompt_yes_no("Continue?", false).unwrap());
        assert!(!prompter.prompt_yes_no("Continue?", true).unwrap());
        assert!(prompter.prompt_yes_no("Continue?", true).unwrap());
        assert!(prompter.prompt_yes_no("Continue?", false).unwrap());
    }

    #[test]
    fn test_prompt_choice_retries_then_accepts() {
        let prompter = script(&["9", "abc", "2"]);
        assert_eq!(prompter.prompt_choice("Pick", 3, 1).unwrap(), 2);
    }

    #[test]
    fn test_prompt_choice_falls_back_when_exhausted() {
        let prompter = script(&["7"]);
        assert_eq!(prompter.prompt_choice("Pick", 3, 1).unwrap(), 1);
    }

    #[test]
    fn test_read_multiline_stops_at_two_blank_lines() {
        let prompter = script(&[
            "First point.",
            "",
            "Second point.",
            "",
            "",
            "not part of the comment",
        ]);
        let text = prompter.read_multiline("Comments:").unwrap();
        assert_eq!(text, "First point.\n\nSecond point.");
        assert_eq!(prompter.prompt("next: ").unwrap(), "not part of the comment");
    }

    #[test]
    fn test_read_multiline_end_of_input() {
        let prompter = script(&["only line"]);
        assert_eq!(prompter.read_multiline("Comments:").unwrap(), "only line");
    }
}
