/// Terminal rendering of analysis results

use colored::Colorize;

use crate::core::{AnalysisResult, MulePattern};

const TOP_ACCOUNTS: usize = 10;

pub fn print_analysis_summary(result: &AnalysisResult) {
    let summary = &result.summary;

    eprintln!("\n{} {}", "🕵️", "MULE DETECTION REPORT".bold());
    eprintln!("{}", "=".repeat(70));
    eprintln!("   Analysis ID: {}", result.analysis_id);
    eprintln!("   Accounts analyzed: {}", summary.total_accounts_analyzed);
    eprintln!(
        "   Suspicious accounts: {}",
        summary.suspicious_accounts_flagged.to_string().yellow()
    );
    eprintln!("   Fraud rings: {}", summary.fraud_rings_detected.to_string().red());
    eprintln!("   Masterminds: {}", summary.mastermind_accounts_identified);
    eprintln!("   Processing time: {:.3}s", summary.processing_time_seconds);

    if !result.fraud_rings.is_empty() {
        eprintln!("\n{}", "💍 FRAUD RINGS:".bold());
        for ring in &result.fraud_rings {
            eprintln!(
                "   {} {:<24} risk {} | {} members | {} txs | {:.2} total | mastermind {}",
                ring.ring_id.bold(),
                ring.pattern_type.to_string(),
                risk_label(ring.risk_score),
                ring.member_accounts.len(),
                ring.transaction_count,
                ring.total_amount,
                ring.mastermind_account.as_deref().unwrap_or("-")
            );
        }
    }

    if !result.suspicious_accounts.is_empty() {
        eprintln!("\n{}", "🚩 TOP SUSPICIOUS ACCOUNTS:".bold());
        for account in result.suspicious_accounts.iter().take(TOP_ACCOUNTS) {
            let crown = if account.is_mastermind { " 👑" } else { "" };
            eprintln!(
                "   {:<20} {} [{}] {}{}",
                account.account_id,
                risk_label(account.suspicion_score),
                pattern_list(&account.detected_patterns),
                account.ring_id.as_deref().unwrap_or("no ring"),
                crown
            );
        }
        let remaining = result.suspicious_accounts.len().saturating_sub(TOP_ACCOUNTS);
        if remaining > 0 {
            eprintln!("   ... and {} more", remaining);
        }
    }

    eprintln!("{}", "=".repeat(70));
}

fn risk_label(score: f64) -> colored::ColoredString {
    let text = format!("{:>5.1}", score);
    if score >= 80.0 {
        text.red().bold()
    } else if score >= 50.0 {
        text.yellow()
    } else {
        text.normal()
    }
}

fn pattern_list(patterns: &[MulePattern]) -> String {
    patterns
        .iter()
        .map(MulePattern::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
