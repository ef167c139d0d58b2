//! # Operator Controls
//!
//! Text commands standing in for the dashboard's buttons, slider and pointer.
//!
//! | Line | Meaning |
//! |---|---|
//! | `adv <deg>` | move the static-advance slider |
//! | `reset` | clear the sweep log |
//! | `export` | save the sweep log as CSV |
//! | `move <x> <y>` | pointer / touch moved over the chart |
//! | `leave` / `touchend` | pointer left the chart |
//! | `resize <w> <h>` | chart surface resized |
//! | `svg <path>` | write the current chart as SVG |
//! | `status` | print the live readout |
//! | `clear-peak` | forget the peak RPM |
//! | `quit` | stop the dashboard |

use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::{DashboardError, Result};

/// One operator action
#[derive(Debug, Clone, PartialEq)]
pub enum ControlInput {
    SetStaticAdvance(i32),
    Reset,
    Export,
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    Resize { width: f64, height: f64 },
    Snapshot(PathBuf),
    Status,
    ClearPeak,
    Quit,
}

impl FromStr for ControlInput {
    type Err = DashboardError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| DashboardError::Control("empty command".to_string()))?;

        let input = match verb.to_ascii_lowercase().as_str() {
            "adv" => ControlInput::SetStaticAdvance(parse_arg(words.next(), "advance")?),
            "reset" => ControlInput::Reset,
            "export" => ControlInput::Export,
            "move" => ControlInput::PointerMove {
                x: parse_arg(words.next(), "x")?,
                y: parse_arg(words.next(), "y")?,
            },
            "leave" | "touchend" => ControlInput::PointerLeave,
            "resize" => {
                let width: f64 = parse_arg(words.next(), "width")?;
                let height: f64 = parse_arg(words.next(), "height")?;
                if width <= 0.0 || height <= 0.0 {
                    return Err(DashboardError::Control("surface size must be positive".to_string()));
                }
                ControlInput::Resize { width, height }
            }
            "svg" => {
                let path = words
                    .next()
                    .ok_or_else(|| DashboardError::Control("svg needs a file path".to_string()))?;
                ControlInput::Snapshot(PathBuf::from(path))
            }
            "status" => ControlInput::Status,
            "clear-peak" => ControlInput::ClearPeak,
            "quit" | "exit" => ControlInput::Quit,
            other => return Err(DashboardError::Control(format!("unknown command {:?}", other))),
        };

        if let Some(extra) = words.next() {
            return Err(DashboardError::Control(format!("unexpected argument {:?}", extra)));
        }
        Ok(input)
    }
}

fn parse_arg<T: FromStr>(word: Option<&str>, name: &str) -> Result<T> {
    let word = word.ok_or_else(|| DashboardError::Control(format!("missing {}", name)))?;
    word.parse()
        .map_err(|_| DashboardError::Control(format!("invalid {}: {:?}", name, word)))
}

/// Forward parsed lines from `reader` until it ends or the receiver goes away
///
/// Blank lines are skipped; unparseable lines are reported and skipped.
pub async fn read_controls<R>(reader: R, tx: mpsc::UnboundedSender<ControlInput>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ControlInput>() {
            Ok(input) => {
                if tx.send(input).is_err() {
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("adv 32".parse::<ControlInput>().unwrap(), ControlInput::SetStaticAdvance(32));
        assert_eq!("adv -4".parse::<ControlInput>().unwrap(), ControlInput::SetStaticAdvance(-4));
        assert_eq!("reset".parse::<ControlInput>().unwrap(), ControlInput::Reset);
        assert_eq!("EXPORT".parse::<ControlInput>().unwrap(), ControlInput::Export);
        assert_eq!(
            "move 120.5 80".parse::<ControlInput>().unwrap(),
            ControlInput::PointerMove { x: 120.5, y: 80.0 }
        );
        assert_eq!("touchend".parse::<ControlInput>().unwrap(), ControlInput::PointerLeave);
        assert_eq!(
            "resize 1024 600".parse::<ControlInput>().unwrap(),
            ControlInput::Resize { width: 1024.0, height: 600.0 }
        );
        assert_eq!(
            "svg /tmp/chart.svg".parse::<ControlInput>().unwrap(),
            ControlInput::Snapshot(PathBuf::from("/tmp/chart.svg"))
        );
        assert_eq!("  quit  ".parse::<ControlInput>().unwrap(), ControlInput::Quit);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "adv", "adv 3.5", "adv x", "move 1", "resize 0 10", "fly", "reset now"] {
            assert!(
                matches!(bad.parse::<ControlInput>(), Err(DashboardError::Control(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_read_controls_skips_bad_lines() {
        let input: &[u8] = b"adv 30\n\nbogus\nreset\n";
        let (tx, mut rx) = mpsc::unbounded_channel();

        read_controls(input, tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(ControlInput::SetStaticAdvance(30)));
        assert_eq!(rx.recv().await, Some(ControlInput::Reset));
        assert_eq!(rx.recv().await, None, "Sender is dropped at end of input");
    }

    #[tokio::test]
    async fn test_read_controls_split_reads() {
        // A line arriving in two reads is still one command
        let reader = tokio_test::io::Builder::new()
            .read(b"move 12")
            .read(b"0 80\nquit\n")
            .build();
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio_test::assert_ok!(read_controls(tokio::io::BufReader::new(reader), tx).await);

        assert_eq!(rx.recv().await, Some(ControlInput::PointerMove { x: 120.0, y: 80.0 }));
        assert_eq!(rx.recv().await, Some(ControlInput::Quit));
    }
}
