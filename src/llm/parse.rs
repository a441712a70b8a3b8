// Best-effort extraction of a planned path from a free-form model reply
//
// Strategies run in order and the first one yielding a path wins:
// 1. JSON inside a fenced code block
// 2. JSON between the first `{` and the last `}`
// 3. A literal two-move array anywhere in the text
// If none succeeds the path is empty.

use tracing::{debug, warn};

use crate::messages::{Move, PathPlan};

type Strategy = fn(&str) -> Option<Vec<Move>>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("fenced block", from_fenced_block),
    ("brace slice", from_brace_slice),
    ("literal fallback", from_literal_array),
];

/// Parse the planner reply into a sequence of moves
pub fn parse_path(raw: &str) -> Vec<Move> {
    for (i, (name, strategy)) in STRATEGIES.iter().enumerate() {
        if let Some(path) = strategy(raw) {
            debug!("Parsed path with {} strategy: {:?}", name, path);
            return path;
        }
        // Both JSON strategies failed, record the reply before falling back
        if i == 1 {
            warn!("Could not parse planner reply as JSON: {:?}", raw);
        }
    }
    warn!("No path recognized in planner reply, using empty path");
    Vec::new()
}

/// Contents of the first fenced code block, without the language tag
fn fenced_block(raw: &str) -> Option<&str> {
    let (_, rest) = raw.split_once("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let inner = match rest.split_once("```") {
        Some((inner, _)) => inner,
        None => rest,
    };
    Some(inner.trim())
}

/// Text from the first `{` through the last `}`
fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start <= end).then(|| &text[start..=end])
}

fn parse_plan(text: &str) -> Option<Vec<Move>> {
    match serde_json::from_str::<PathPlan>(text) {
        Ok(plan) => Some(plan.path),
        Err(e) => {
            debug!("JSON parse failed: {}", e);
            None
        }
    }
}

fn from_fenced_block(raw: &str) -> Option<Vec<Move>> {
    let inner = fenced_block(raw)?;
    parse_plan(brace_slice(inner).unwrap_or(inner))
}

fn from_brace_slice(raw: &str) -> Option<Vec<Move>> {
    brace_slice(raw).and_then(parse_plan)
}

fn from_literal_array(raw: &str) -> Option<Vec<Move>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains(r#"["F","F"]"#) {
        Some(vec![Move::Forward, Move::Forward])
    } else if compact.contains(r#"["B","B"]"#) {
        Some(vec![Move::Back, Move::Back])
    } else {
        None
    }
}
