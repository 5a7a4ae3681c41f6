use crate::models::AnalysisResult;

const FILLED: char = '█';
const EMPTY: char = '░';
const BAR_CELLS: usize = 10;

pub const FOOTER: &str = "*Automated review by prgate*";

pub fn render_comment(result: &AnalysisResult) -> String {
    let mut output = String::from("## 🤖 AI Code Review\n\n");

    if result.approved {
        output.push_str("### ✅ Status: APPROVED\n\n");
    } else {
        output.push_str("### ❌ Status: CHANGES REQUESTED\n\n");
    }

    if let Some(score) = result.score {
        output.push_str(&format!("**Score:** {}/100 {}\n\n", score, score_bar(score)));
    }

    if let Some(summary) = result.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        output.push_str("### Summary\n\n");
        output.push_str(summary.trim());
        output.push_str("\n\n");
    }

    if !result.issues.is_empty() {
        output.push_str("### Issues to Fix\n\n");
        for (i, issue) in result.issues.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, issue));
        }
        output.push('\n');
    }

    if let Some(suggestions) = result.suggestions.as_ref().filter(|s| !s.is_empty()) {
        output.push_str("### Suggestions\n\n");
        for suggestion in suggestions {
            output.push_str(&format!("- {}\n", suggestion));
        }
        output.push('\n');
    }

    output.push_str("---\n");
    output.push_str(FOOTER);
    output.push('\n');
    output
}

pub fn score_bar(score: u8) -> String {
    let filled = (score.min(100) / 10) as usize;
    let mut bar = String::with_capacity(BAR_CELLS * 3);
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(BAR_CELLS - filled));
    bar
}
