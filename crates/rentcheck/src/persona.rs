//! Persona voices for verdict copy.
//!
//! Personas are cosmetic: they change the wording around a result, never the score.

use crate::scoring::Verdict;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    DataAnalyst,
    ToughCoach,
    #[default]
    SupportiveFriend,
    ProtectiveAdvocate,
}

/// Catalogue entry describing a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonaProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
}

/// Display copy for one (persona, verdict) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerdictCopy {
    pub label: &'static str,
    pub color: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub moment_of_truth: &'static str,
    pub support_line: &'static str,
    pub share_text: &'static str,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::DataAnalyst,
        Persona::ToughCoach,
        Persona::SupportiveFriend,
        Persona::ProtectiveAdvocate,
    ];

    pub fn key(&self) -> &'static str {
        self.profile().id
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|persona| persona.key().eq_ignore_ascii_case(key))
    }

    pub fn profile(&self) -> &'static PersonaProfile {
        match self {
            Persona::DataAnalyst => &DATA_ANALYST_PROFILE,
            Persona::ToughCoach => &TOUGH_COACH_PROFILE,
            Persona::SupportiveFriend => &SUPPORTIVE_FRIEND_PROFILE,
            Persona::ProtectiveAdvocate => &PROTECTIVE_ADVOCATE_PROFILE,
        }
    }

    pub fn copy(&self, verdict: Verdict) -> &'static VerdictCopy {
        let table = match self {
            Persona::DataAnalyst => &DATA_ANALYST_COPY,
            Persona::ToughCoach => &TOUGH_COACH_COPY,
            Persona::SupportiveFriend => &SUPPORTIVE_FRIEND_COPY,
            Persona::ProtectiveAdvocate => &PROTECTIVE_ADVOCATE_COPY,
        };
        &table[verdict.index()]
    }
}

/// Copy lookup by persona key; unknown keys use the default persona.
pub fn verdict_copy(persona_key: &str, verdict: Verdict) -> &'static VerdictCopy {
    Persona::from_key(persona_key)
        .unwrap_or_default()
        .copy(verdict)
}

const SUCCESS: &str = "#5CB85C";
const WARNING: &str = "#F0AD4E";
const PUSHED: &str = "#F39C12";
const DANGER: &str = "#D9534F";

const SUCCESS_BG: &str = "rgba(92,184,92,0.1)";
const WARNING_BG: &str = "rgba(240,173,78,0.12)";
const PUSHED_BG: &str = "rgba(243,156,18,0.12)";
const DANGER_BG: &str = "rgba(217,83,79,0.12)";

static DATA_ANALYST_PROFILE: PersonaProfile = PersonaProfile {
    id: "data_analyst",
    name: "Data Analyst",
    emoji: "📊",
    tagline: "Just the facts",
    description: "Numbers-focused, objective analysis",
};

static TOUGH_COACH_PROFILE: PersonaProfile = PersonaProfile {
    id: "tough_coach",
    name: "Tough Love Coach",
    emoji: "💪",
    tagline: "I'll tell it straight",
    description: "Direct, no BS advice",
};

static SUPPORTIVE_FRIEND_PROFILE: PersonaProfile = PersonaProfile {
    id: "supportive_friend",
    name: "Supportive Friend",
    emoji: "🤗",
    tagline: "I've got your back",
    description: "Warm, empathetic support",
};

static PROTECTIVE_ADVOCATE_PROFILE: PersonaProfile = PersonaProfile {
    id: "protective_advocate",
    name: "Protective Advocate",
    emoji: "🛡️",
    tagline: "I'll fight for you",
    description: "Fierce defender of your interests",
};

// Tables are indexed in `Verdict::ALL` order.
static DATA_ANALYST_COPY: [VerdictCopy; 4] = [
    VerdictCopy {
        label: "GOOD",
        color: SUCCESS,
        background: SUCCESS_BG,
        text: "Your rent-to-income ratio falls within the recommended 30% guideline. This is a financially sound decision.",
        moment_of_truth: "The numbers check out.",
        support_line: "This rent aligns with standard affordability metrics.",
        share_text: "Ran the numbers on my rent with TruthBeTold — it's within guidelines! 📊",
    },
    VerdictCopy {
        label: "TIGHT",
        color: WARNING,
        background: WARNING_BG,
        text: "You're at 35-40% of income. That's above the 30% guideline but below the 50% danger zone.",
        moment_of_truth: "You're in the yellow zone.",
        support_line: "Statistically, this leaves limited room for savings.",
        share_text: "My rent analysis shows I'm at the edge of affordability guidelines ⚠️",
    },
    VerdictCopy {
        label: "PUSHED",
        color: PUSHED,
        background: PUSHED_BG,
        text: "Your rent exceeds 40% of income and is above market rate. The data suggests you're overpaying.",
        moment_of_truth: "The math doesn't add up.",
        support_line: "Comparable units average 15-20% less in your area.",
        share_text: "Analysis shows I'm paying above market rate for my rent 📈",
    },
    VerdictCopy {
        label: "DANGEROUS",
        color: DANGER,
        background: DANGER_BG,
        text: "This rent exceeds 50% of your income. Financial research shows this level creates severe instability.",
        moment_of_truth: "The data is clear: this is unsustainable.",
        support_line: "Studies show rent above 50% of income leads to financial hardship.",
        share_text: "Rent analysis: I'm in the danger zone at 50%+ of income 🚨",
    },
];

static TOUGH_COACH_COPY: [VerdictCopy; 4] = [
    VerdictCopy {
        label: "GOOD",
        color: SUCCESS,
        background: SUCCESS_BG,
        text: "You made a smart choice. This rent won't drain you. Now build that emergency fund.",
        moment_of_truth: "You did good. Don't mess it up.",
        support_line: "This is what discipline looks like.",
        share_text: "Got my rent checked — turns out I made a solid choice 💪",
    },
    VerdictCopy {
        label: "TIGHT",
        color: WARNING,
        background: WARNING_BG,
        text: "You can make this work, but you'll need to stay sharp. No room for sloppy budgeting.",
        moment_of_truth: "This is your wake-up call.",
        support_line: "Time to get serious about your money.",
        share_text: "My rent is tight — gonna need discipline to make this work ⚠️",
    },
    VerdictCopy {
        label: "PUSHED",
        color: PUSHED,
        background: PUSHED_BG,
        text: "You're paying too much. Period. Negotiate hard or walk away. You're better than this deal.",
        moment_of_truth: "Stop settling.",
        support_line: "You know what you need to do.",
        share_text: "Real talk: I'm overpaying on rent. Time to negotiate or bounce 💪",
    },
    VerdictCopy {
        label: "DANGEROUS",
        color: DANGER,
        background: DANGER_BG,
        text: "This rent will break you. I'm not sugarcoating it. Walk away. Now.",
        moment_of_truth: "You needed to hear this.",
        support_line: "Your future self will thank you for saying no.",
        share_text: "Just got the hard truth about my rent... it's bad 🚨",
    },
];

static SUPPORTIVE_FRIEND_COPY: [VerdictCopy; 4] = [
    VerdictCopy {
        label: "GOOD",
        color: SUCCESS,
        background: SUCCESS_BG,
        text: "You found a place that respects your budget! I'm so proud of you for not settling.",
        moment_of_truth: "You deserve this win.",
        support_line: "You found a sustainable deal in a tough market.",
        share_text: "Just checked my rent and I'm actually doing okay! 🤗💚",
    },
    VerdictCopy {
        label: "TIGHT",
        color: WARNING,
        background: WARNING_BG,
        text: "I know the market is tough, and you're doing your best. This is tight, but you can make it work.",
        moment_of_truth: "You're not alone in this.",
        support_line: "The market is hard right now — you're not the problem.",
        share_text: "My rent is a bit tight, but I'm gonna make it work 🤗",
    },
    VerdictCopy {
        label: "PUSHED",
        color: PUSHED,
        background: PUSHED_BG,
        text: "Hey, I care about you. This rent is asking too much. You deserve breathing room in your budget.",
        moment_of_truth: "You're worth more than this.",
        support_line: "Your financial peace matters.",
        share_text: "Friend checked my rent and says I deserve better 🧡",
    },
    VerdictCopy {
        label: "DANGEROUS",
        color: DANGER,
        background: DANGER_BG,
        text: "I'm worried about you taking this. This rent could really hurt you. Please keep looking.",
        moment_of_truth: "I'm here for you.",
        support_line: "You deserve a place that doesn't drain you.",
        share_text: "Got some tough news about my rent situation 😔",
    },
];

static PROTECTIVE_ADVOCATE_COPY: [VerdictCopy; 4] = [
    VerdictCopy {
        label: "GOOD",
        color: SUCCESS,
        background: SUCCESS_BG,
        text: "Finally, a landlord who isn't trying to squeeze you dry. This is what fair looks like.",
        moment_of_truth: "You found one of the good ones.",
        support_line: "This rent respects your worth.",
        share_text: "Found a rent that actually treats me fairly! 🛡️💚",
    },
    VerdictCopy {
        label: "TIGHT",
        color: WARNING,
        background: WARNING_BG,
        text: "This landlord is pushing it, but it's not predatory. You have leverage — use it to negotiate.",
        moment_of_truth: "Don't let them take advantage.",
        support_line: "You have more power than you think.",
        share_text: "My rent is borderline — time to negotiate 🛡️",
    },
    VerdictCopy {
        label: "PUSHED",
        color: PUSHED,
        background: PUSHED_BG,
        text: "This landlord is overcharging you. They're banking on you not knowing better. Prove them wrong.",
        moment_of_truth: "You're being taken advantage of.",
        support_line: "You deserve better than this price gouging.",
        share_text: "My landlord is overcharging me. Not okay 🛡️🧡",
    },
    VerdictCopy {
        label: "DANGEROUS",
        color: DANGER,
        background: DANGER_BG,
        text: "This is exploitation. This landlord is trying to trap you in financial hardship. Run.",
        moment_of_truth: "This is predatory pricing.",
        support_line: "You're worth more than what this landlord thinks.",
        share_text: "This rent is predatory. I deserve better 🛡️🚨",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_lookup() {
        for persona in Persona::ALL {
            assert_eq!(Persona::from_key(persona.key()), Some(persona));
        }
        assert_eq!(
            Persona::from_key(" Tough_Coach "),
            Some(Persona::ToughCoach)
        );
    }

    #[test]
    fn unknown_persona_falls_back_to_supportive_friend() {
        for verdict in Verdict::ALL {
            assert_eq!(
                verdict_copy("grumpy_landlord", verdict),
                Persona::SupportiveFriend.copy(verdict)
            );
        }
    }

    #[test]
    fn every_pair_resolves_to_verdict_specific_copy() {
        let labels = ["GOOD", "TIGHT", "PUSHED", "DANGEROUS"];
        for persona in Persona::ALL {
            for (verdict, label) in Verdict::ALL.into_iter().zip(labels) {
                let copy = persona.copy(verdict);
                assert_eq!(copy.label, label, "{persona:?}/{verdict:?}");
                assert!(!copy.share_text.is_empty());
            }
        }
    }

    #[test]
    fn persona_serializes_as_key() {
        let json = serde_json::to_string(&Persona::ProtectiveAdvocate).expect("serializes");
        assert_eq!(json, r#""protective_advocate""#);
    }
}
