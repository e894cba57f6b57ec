use std::sync::Mutex;

/// How strongly a trait reads, 0-100, clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traits {
    pub friendliness: i32,
    pub formality: i32,
    pub humor: i32,
    pub verbosity: i32,
    pub helpfulness: i32,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            friendliness: 50,
            formality: 50,
            humor: 50,
            verbosity: 50,
            helpfulness: 70,
        }
    }
}

struct State {
    traits: Traits,
    interaction_count: u64,
}

/// Nudges the bot's tone based on what users write to it.
///
/// Every tenth interaction the traits drift back toward the middle so one
/// chatty evening doesn't permanently reshape the bot.
pub struct PersonalityTracker {
    state: Mutex<State>,
}

const DRIFT_INTERVAL: u64 = 10;

impl PersonalityTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                traits: Traits::default(),
                interaction_count: 0,
            }),
        }
    }

    pub fn record_interaction(&self, content: &str) {
        let lower = content.to_lowercase();
        let mut state = self.state.lock().unwrap();

        if contains_any(&lower, &["code", "program", "function", "bug", "error"]) {
            adjust(&mut state.traits.formality, 5);
            adjust(&mut state.traits.verbosity, -3);
        }
        if contains_any(&lower, &["help", "please", "thanks", "thank you"]) {
            adjust(&mut state.traits.friendliness, 3);
        }
        if contains_any(&lower, &["lol", "haha", "funny", "😂", "🤣"]) {
            adjust(&mut state.traits.humor, 5);
            adjust(&mut state.traits.formality, -5);
        }
        if contains_any(&lower, &["explain", "detail", "elaborate"]) {
            adjust(&mut state.traits.verbosity, 5);
            adjust(&mut state.traits.helpfulness, 3);
        }
        if contains_any(&lower, &["quick", "brief", "short", "tldr"]) {
            adjust(&mut state.traits.verbosity, -5);
        }

        state.interaction_count += 1;
        if state.interaction_count % DRIFT_INTERVAL == 0 {
            drift(&mut state.traits);
        }
    }

    pub fn traits(&self) -> Traits {
        self.state.lock().unwrap().traits
    }

    /// Style guidance appended to the system prompt.
    pub fn prompt_fragment(&self) -> String {
        let traits = self.traits();
        let mut notes = Vec::new();

        notes.push(match traits.friendliness {
            70.. => "Be warm and encouraging.",
            ..=30 => "Keep a neutral, matter-of-fact tone.",
            _ => "Be friendly but not effusive.",
        });
        notes.push(match traits.formality {
            70.. => "Write in a polished, professional register.",
            ..=30 => "Keep it casual.",
            _ => "Use a relaxed but clear register.",
        });
        if traits.humor >= 70 {
            notes.push("A light joke now and then is welcome.");
        }
        notes.push(match traits.verbosity {
            70.. => "Explain thoroughly when it helps.",
            ..=30 => "Keep answers short.",
            _ => "Default to concise answers.",
        });

        notes.join(" ")
    }
}

impl Default for PersonalityTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

fn adjust(trait_value: &mut i32, amount: i32) {
    *trait_value = (*trait_value + amount).clamp(0, 100);
}

/// Pull extreme traits one step back toward 50.
fn drift(traits: &mut Traits) {
    for value in [
        &mut traits.friendliness,
        &mut traits.formality,
        &mut traits.humor,
        &mut traits.verbosity,
        &mut traits.helpfulness,
    ] {
        if *value > 60 {
            adjust(value, -1);
        } else if *value < 40 {
            adjust(value, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humor_keywords_loosen_the_tone() {
        let tracker = PersonalityTracker::new();
        tracker.record_interaction("haha that was funny");
        let traits = tracker.traits();
        assert_eq!(traits.humor, 55);
        assert_eq!(traits.formality, 45);
    }

    #[test]
    fn traits_stay_clamped() {
        let tracker = PersonalityTracker::new();
        for _ in 0..50 {
            tracker.record_interaction("lol haha funny");
        }
        let traits = tracker.traits();
        assert!(traits.humor <= 100);
        assert!(traits.formality >= 0);
    }

    #[test]
    fn drift_pulls_extremes_back_toward_the_middle() {
        let tracker = PersonalityTracker::new();
        // Nine humor pushes, then the tenth interaction triggers drift.
        for _ in 0..9 {
            tracker.record_interaction("haha");
        }
        let before = tracker.traits().humor;
        tracker.record_interaction("nothing notable here");
        assert_eq!(tracker.traits().humor, before - 1);
    }

    #[test]
    fn prompt_fragment_reflects_traits() {
        let tracker = PersonalityTracker::new();
        for _ in 0..8 {
            tracker.record_interaction("please explain in detail, thanks");
        }
        let fragment = tracker.prompt_fragment();
        assert!(fragment.contains("thoroughly"), "fragment: {fragment}");
    }
}
