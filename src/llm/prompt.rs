// Prompt templates for scouting reports.
//
// Constructs a compact, structured prompt from pre-computed engine output
// so the model focuses on tactical fit and development, not arithmetic.

use std::collections::HashMap;

use crate::engine::PlayerSnapshot;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt for all scouting report calls.
pub fn system_prompt() -> String {
    "You are a football technical director specializing in gap analysis and player fit.\n\
     \n\
     You receive a team's averaged baseline metrics, a described weakness, and one \
     candidate's profile with pre-computed numbers (including the potential gap). \
     Use the numbers as given \u{2014} do NOT do arithmetic. Be concise and concrete: \
     match scenarios over adjectives."
        .to_string()
}

// ---------------------------------------------------------------------------
// Report prompt
// ---------------------------------------------------------------------------

/// Format a team metric for prompt inclusion; NaN renders as "N/A".
pub fn fmt_metric(value: f64) -> String {
    if value.is_nan() {
        "N/A".to_string()
    } else {
        format!("{value:.1}")
    }
}

/// Build the report prompt for one candidate against the squad baseline.
pub fn build_scout_report_prompt(
    candidate: &PlayerSnapshot,
    team_weakness: &str,
    team_stats: &HashMap<String, f64>,
) -> String {
    let baseline = |metric: &str| fmt_metric(team_stats.get(metric).copied().unwrap_or(f64::NAN));

    let mut prompt = String::with_capacity(1024);

    // Section 1: team context
    prompt.push_str(&format!(
        "## CONTEXT\n\
         Team baseline: pace {} | defending {}\n\
         Weakness: {}\n\n",
        baseline("pace"),
        baseline("defending"),
        team_weakness,
    ));

    // Section 2: candidate profile
    prompt.push_str(&format!(
        "## CANDIDATE\n\
         {}, age {}, role {}\n\
         Overall {} \u{2192} Potential {} (gap {:+.0})\n\
         Key stats: pace {:.1}, physic {:.1}, defending {:.1}\n\n",
        candidate.short_name,
        candidate.age,
        candidate.player_positions,
        candidate.overall,
        candidate.potential,
        candidate.potential_gap,
        candidate.pace,
        candidate.physic,
        candidate.defending,
    ));

    // Section 3: the ask
    prompt.push_str(
        "## TASK\n\
         1) Explain how this player fixes the weakness using concrete match scenarios.\n\
         2) Describe development focus areas.\n\
         3) Give a Match Impact score out of 10 with a one-line verdict.",
    );

    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PlayerSnapshot {
        PlayerSnapshot {
            short_name: "J. Musiala".to_string(),
            player_positions: "CAM, CM".to_string(),
            age: 19,
            overall: 81,
            potential: 90,
            pace: 80.0,
            physic: 64.0,
            defending: 60.0,
            potential_gap: 9.0,
        }
    }

    fn stats(pace: f64, defending: f64) -> HashMap<String, f64> {
        HashMap::from([
            ("pace".to_string(), pace),
            ("defending".to_string(), defending),
        ])
    }

    #[test]
    fn system_prompt_sets_persona() {
        let sp = system_prompt();
        assert!(sp.contains("technical director"), "should set the persona");
        assert!(sp.contains("do NOT do arithmetic"), "should forbid arithmetic");
    }

    #[test]
    fn report_prompt_contains_sections() {
        let prompt = build_scout_report_prompt(
            &snapshot(),
            "midfield lacks recovery speed",
            &stats(71.2, 68.9),
        );

        assert!(prompt.contains("## CONTEXT"), "should have CONTEXT section");
        assert!(prompt.contains("## CANDIDATE"), "should have CANDIDATE section");
        assert!(prompt.contains("## TASK"), "should have TASK section");
        assert!(prompt.contains("J. Musiala"), "should name the candidate");
        assert!(prompt.contains("age 19"), "should show the age");
        assert!(prompt.contains("midfield lacks recovery speed"), "should carry the weakness");
        assert!(prompt.contains("pace 71.2"), "should show the baseline pace");
        assert!(prompt.contains("defending 68.9"), "should show the baseline defending");
        assert!(prompt.contains("Match Impact"), "should ask for the score");
    }

    #[test]
    fn report_prompt_shows_potential_gap() {
        let prompt = build_scout_report_prompt(&snapshot(), "w", &stats(70.0, 70.0));
        assert!(prompt.contains("Overall 81"), "should show overall");
        assert!(prompt.contains("Potential 90"), "should show potential");
        assert!(prompt.contains("(gap +9)"), "should show the signed gap");
    }

    #[test]
    fn nan_metrics_render_as_na() {
        let prompt =
            build_scout_report_prompt(&snapshot(), "w", &stats(f64::NAN, f64::NAN));
        assert!(prompt.contains("pace N/A"), "NaN pace should be N/A");
        assert!(prompt.contains("defending N/A"), "NaN defending should be N/A");
    }

    #[test]
    fn missing_metric_keys_render_as_na() {
        let prompt = build_scout_report_prompt(&snapshot(), "w", &HashMap::new());
        assert!(prompt.contains("pace N/A"));
    }

    #[test]
    fn fmt_metric_rounds_to_one_decimal() {
        assert_eq!(fmt_metric(71.24), "71.2");
        assert_eq!(fmt_metric(70.0), "70.0");
        assert_eq!(fmt_metric(f64::NAN), "N/A");
    }
}
