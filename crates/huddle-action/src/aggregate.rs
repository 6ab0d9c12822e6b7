//! Merges per-set results into one spoken summary and one chat-window text.

use crate::types::{ActionResult, AggregatedResult, Outcome};

/// Combine `results`, kept in input order, into a single response.
///
/// An empty slice is not an error; it produces a "nothing happened" response.
pub fn aggregate(results: &[ActionResult], outcome: Outcome) -> AggregatedResult {
    if results.is_empty() {
        let text = format!("No {}s have been {}.", outcome.noun, outcome.past);
        return AggregatedResult {
            spoken_summary: text.clone(),
            display_text: text,
        };
    }

    // Headlines count successes only; numbering still covers every result.
    let failed = results.iter().filter(|r| !r.succeeded).count();
    let succeeded = results.len() - failed;
    let noun = outcome.noun_for(succeeded);
    let verb = if succeeded == 1 { "has" } else { "have" };
    let headline = format!("{} {} {} been {}", succeeded, noun, verb, outcome.past);

    let mut spoken_summary = format!("{}. Check the chat window for details.", headline);
    let mut display_text = format!("Below {}", headline);
    if failed > 0 {
        spoken_summary.push_str(&format!(" {} could not be completed.", failed));
        display_text.push_str(&format!(", {} could not be completed", failed));
    }
    display_text.push(':');
    for (i, result) in results.iter().enumerate() {
        display_text.push_str(&format!("\n\n{} - {}", i + 1, result.display_text));
    }

    AggregatedResult {
        spoken_summary,
        display_text,
    }
}
