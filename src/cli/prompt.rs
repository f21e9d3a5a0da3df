//! Interactive prompt for direct dating.
//!
//! Values given on the command line are used as-is; anything missing is asked
//! for. Invalid answers are re-prompted and `q` cancels.

use std::io::{self, BufRead, Write};

use crate::decay::{DecayRegistry, IsotopicSystem};
use crate::domain::ParentDaughter;
use crate::error::AppError;
use crate::io::ingest::parse_decimal;

/// Resolve the system and counts for `geochron age`, prompting on stdin.
pub fn resolve_direct_age_inputs<'a>(
    registry: &'a DecayRegistry,
    system: Option<&str>,
    parent: Option<f64>,
    daughter: Option<f64>,
) -> Result<(&'a IsotopicSystem, ParentDaughter), AppError> {
    let stdin = io::stdin();
    let mut prompt = Prompt {
        input: stdin.lock(),
        output: io::stdout(),
    };

    let system = match system {
        Some(id) => registry.get(id)?,
        None => prompt.system(registry)?,
    };
    let parent = match parent {
        Some(v) => v,
        None => prompt.number("Parent amount n (> 0)", |v| v > 0.0)?,
    };
    let daughter = match daughter {
        Some(v) => v,
        None => prompt.number("Daughter amount h (>= 0)", |v| v >= 0.0)?,
    };

    Ok((system, ParentDaughter { parent, daughter }))
}

/// Line-oriented prompt over any reader/writer pair.
pub struct Prompt<R, W> {
    pub input: R,
    pub output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Ask for a system by list number or id.
    pub fn system<'a>(&mut self, registry: &'a DecayRegistry) -> Result<&'a IsotopicSystem, AppError> {
        let systems = registry.systems();
        self.say("Isotopic systems:")?;
        for (idx, s) in systems.iter().enumerate() {
            self.say(&format!("{:>3}) {:<12} {}", idx + 1, s.id, s.reaction))?;
        }

        loop {
            let answer = self.ask(&format!("Select a system by number (1-{}) or id (q to quit)", systems.len()))?;

            if let Ok(choice) = answer.parse::<usize>() {
                if (1..=systems.len()).contains(&choice) {
                    return Ok(&systems[choice - 1]);
                }
                self.say(&format!("Invalid choice: {choice}. Enter a number between 1 and {}.", systems.len()))?;
                continue;
            }

            match registry.get(&answer) {
                Ok(system) => return Ok(system),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    /// Ask for a finite number satisfying `valid`. Decimal commas are accepted.
    pub fn number(&mut self, label: &str, valid: impl Fn(f64) -> bool) -> Result<f64, AppError> {
        loop {
            let answer = self.ask(&format!("{label} (q to quit)"))?;
            match parse_decimal(Some(&answer)) {
                Ok(v) if valid(v) => return Ok(v),
                Ok(v) => self.say(&format!("{v} is out of range."))?,
                Err(e) => self.say(&format!("Invalid number: {e}."))?,
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<String, AppError> {
        write!(self.output, "{question}: ").map_err(write_failed)?;
        self.output.flush().map_err(write_failed)?;

        let mut line = String::new();
        let bytes = self
            .input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass values with `geochron age -s <SYSTEM> -n <N> -d <H>`.",
            ));
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }
        Ok(answer.to_string())
    }

    fn say(&mut self, line: &str) -> Result<(), AppError> {
        writeln!(self.output, "{line}").map_err(write_failed)
    }
}

fn write_failed(e: io::Error) -> AppError {
    AppError::new(2, format!("Failed to write prompt: {e}"))
}
