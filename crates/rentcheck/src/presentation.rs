//! Persona-independent verdict metadata and the shareable result card.

use crate::persona::Persona;
use crate::scoring::{ScoreResult, Verdict};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerdictPresentation {
    pub color: &'static str,
    pub emoji: &'static str,
    pub headline: &'static str,
    pub message: &'static str,
    pub explanation: &'static str,
}

pub fn presentation(verdict: Verdict) -> &'static VerdictPresentation {
    &PRESENTATIONS[verdict.index()]
}

pub fn format_score(score: u8) -> String {
    format!("{score}/100")
}

static PRESENTATIONS: [VerdictPresentation; 4] = [
    VerdictPresentation {
        color: "#10b981",
        emoji: "✅",
        headline: "This rent respects your budget.",
        message: "You're in a healthy range — this is a sustainable living situation.",
        explanation: "Your rent sits comfortably within affordability guidelines and aligns well with local market conditions. You're not overpaying, and this deal supports long-term financial stability.",
    },
    VerdictPresentation {
        color: "#f59e0b",
        emoji: "⚠️",
        headline: "You can make this work, but it'll squeeze you.",
        message: "This rent isn't predatory, but it will put pressure on your monthly budget.",
        explanation: "You're close to the upper edge of what's considered sustainable. It's not a bad deal, but it leaves less room for savings, emergencies, or lifestyle flexibility. Negotiate if you can.",
    },
    VerdictPresentation {
        color: "#f97316",
        emoji: "🚨",
        headline: "This landlord is pushing it.",
        message: "You're paying more than the market suggests — this deal isn't in your favor.",
        explanation: "The rent exceeds typical affordability guidelines and is higher than comparable units in your area. You're not being exploited, but you're definitely overpaying. Explore alternatives or negotiate aggressively.",
    },
    VerdictPresentation {
        color: "#ef4444",
        emoji: "🔴",
        headline: "This deal is dangerous.",
        message: "This rent is financially unsafe — you should walk away.",
        explanation: "The rent severely exceeds affordability standards and is far above what similar units cost. This level of strain can lead to long-term financial harm. You deserve better — consider other options immediately.",
    },
];

/// Content of the image card users share after scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareCard {
    pub score: u8,
    pub verdict: Verdict,
    pub emoji: &'static str,
    pub color: &'static str,
    pub headline: &'static str,
    pub message: &'static str,
    pub rent: f64,
    pub income: f64,
    pub share_text: &'static str,
}

impl ShareCard {
    pub fn new(result: ScoreResult, rent: f64, income: f64, persona: Persona) -> Self {
        let meta = presentation(result.verdict);
        Self {
            score: result.score,
            verdict: result.verdict,
            emoji: meta.emoji,
            color: meta.color,
            headline: meta.headline,
            message: meta.message,
            rent,
            income,
            share_text: persona.copy(result.verdict).share_text,
        }
    }

    pub fn render_text(&self) -> String {
        format!(
            "🎯 TruthBeTold | Know your rent's truth\n\
             {} {} {}\n\
             {}\n\
             {}\n\
             Monthly Rent: {}\n\
             Monthly Income: {}\n\
             {}",
            self.emoji,
            format_score(self.score),
            self.verdict,
            self.headline,
            self.message,
            format_currency(self.rent),
            format_currency(self.income),
            self.share_text,
        )
    }
}

fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_score_out_of_hundred() {
        assert_eq!(format_score(0), "0/100");
        assert_eq!(format_score(85), "85/100");
    }

    #[test]
    fn presentation_follows_verdict() {
        assert_eq!(presentation(Verdict::Fair).emoji, "✅");
        assert_eq!(presentation(Verdict::Predatory).color, "#ef4444");
        assert_eq!(
            presentation(Verdict::Overpriced).headline,
            "This landlord is pushing it."
        );
    }

    #[test]
    fn share_card_uses_persona_share_text() {
        let result = ScoreResult {
            score: 90,
            verdict: Verdict::Fair,
        };
        let card = ShareCard::new(result, 1500.0, 5000.0, Persona::ToughCoach);

        assert_eq!(
            card.share_text,
            Persona::ToughCoach.copy(Verdict::Fair).share_text
        );

        let text = card.render_text();
        assert!(text.contains("✅ 90/100 Fair"));
        assert!(text.contains("Monthly Rent: $1,500"));
        assert!(text.contains("Monthly Income: $5,000"));
        assert!(text.ends_with(card.share_text));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "🎯 TruthBeTold | Know your rent's truth");
        assert_eq!(lines[1], "✅ 90/100 Fair");
        assert_eq!(lines[2], presentation(Verdict::Fair).headline);
        assert_eq!(lines[4], "Monthly Rent: $1,500");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(950.0), "$950");
        assert_eq!(format_currency(1234567.4), "$1,234,567");
        assert_eq!(format_currency(-2500.0), "-$2,500");
    }
}
