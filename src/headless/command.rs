//! Line commands accepted on stdin in headless mode

use std::time::Duration;

use vista_core::prelude::*;
use vista_core::Route;

/// One parsed stdin line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `nav <path[?query]>`
    Navigate(Route),
    /// `show [ms]`
    Show(Option<Duration>),
    /// `hide`
    Hide,
    /// `full [ms]`
    ShowFullScreen(Option<Duration>),
    /// `hide-full`
    HideFullScreen,
    /// `op <ms> [fail]` - simulated async operation wrapped in the loader
    Operation { latency: Duration, fail: bool },
    /// `wait <ms>`
    Wait(Duration),
    /// `state`
    State,
    /// `q` / `quit`
    Quit,
}

impl Command {
    /// Parse a line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let command = match (verb, args.as_slice()) {
            ("nav" | "navigate", [target]) => Command::Navigate(Route::parse(target)),
            ("show", []) => Command::Show(None),
            ("show", [ms]) => Command::Show(Some(parse_millis(ms)?)),
            ("hide", []) => Command::Hide,
            ("full", []) => Command::ShowFullScreen(None),
            ("full", [ms]) => Command::ShowFullScreen(Some(parse_millis(ms)?)),
            ("hide-full", []) => Command::HideFullScreen,
            ("op", [ms]) => Command::Operation {
                latency: parse_millis(ms)?,
                fail: false,
            },
            ("op", [ms, "fail"]) => Command::Operation {
                latency: parse_millis(ms)?,
                fail: true,
            },
            ("wait", [ms]) => Command::Wait(parse_millis(ms)?),
            ("state", []) => Command::State,
            ("q" | "quit", []) => Command::Quit,
            _ => return Err(Error::command(format!("unrecognised: {}", line))),
        };
        Ok(Some(command))
    }
}

fn parse_millis(raw: &str) -> Result<Duration> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| Error::command(format!("expected milliseconds, got '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        let cmd = Command::parse("nav /listings?city=Austin").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Navigate(
                Route::new("/listings").with_param("city", "Austin")
            ))
        );
    }

    #[test]
    fn test_parse_optional_durations() {
        assert_eq!(Command::parse("show").unwrap(), Some(Command::Show(None)));
        assert_eq!(
            Command::parse("  show 250 ").unwrap(),
            Some(Command::Show(Some(Duration::from_millis(250))))
        );
        assert_eq!(
            Command::parse("full 0").unwrap(),
            Some(Command::ShowFullScreen(Some(Duration::ZERO)))
        );
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!(
            Command::parse("op 3000 fail").unwrap(),
            Some(Command::Operation {
                latency: Duration::from_millis(3000),
                fail: true,
            })
        );
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("# warm-up").unwrap(), None);
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(
            Command::parse("show soon"),
            Err(Error::Command { .. })
        ));
        assert!(Command::parse("jump /x").is_err());
        assert!(Command::parse("hide now").is_err());
        assert!(Command::parse("nav").is_err());
    }
}
