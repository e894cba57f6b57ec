//! Skyblock skill analysis: XP to level conversion and profile summaries.

use serde_json::Value;

/// Cumulative XP required to reach each skill level.
const SKILL_XP_REQUIREMENTS: [u64; 61] = [
    0, 50, 175, 375, 675, 1175, 1925, 2925, 4425, 6425, 9925, 14925, 22425, 32425, 47425, 67425,
    97425, 147425, 222425, 322425, 522425, 822425, 1222425, 1722425, 2322425, 3022425, 3822425,
    4722425, 5722425, 6822425, 8022425, 9322425, 10722425, 12222425, 13822425, 15522425, 17322425,
    19222425, 21222425, 23322425, 25522425, 27822425, 30222425, 32722425, 35322425, 38072425,
    40972425, 44072425, 47472425, 51172425, 55172425, 59472425, 64072425, 68972425, 74172425,
    79672425, 85472425, 91572425, 97972425, 104672425, 111672425,
];

const SKILLS: [&str; 11] = [
    "farming",
    "mining",
    "combat",
    "foraging",
    "fishing",
    "enchanting",
    "alchemy",
    "taming",
    "carpentry",
    "runecrafting",
    "social",
];

/// Cosmetic skills that don't count toward the skill average.
const AVERAGE_EXCLUDED: [&str; 3] = ["carpentry", "runecrafting", "social"];

#[derive(Debug, Clone, PartialEq)]
pub struct SkillLevel {
    pub name: String,
    pub level: u32,
    pub xp: f64,
    /// Percent progress toward the next level, 100 at the cap.
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillAnalysis {
    pub skills: Vec<SkillLevel>,
    pub skill_average: f64,
    pub total_skill_level: u32,
}

fn level_cap(skill: &str) -> usize {
    match skill {
        "runecrafting" | "social" => 25,
        _ => 60,
    }
}

/// Level and progress-to-next for a cumulative XP amount.
pub fn skill_level(xp: f64, skill: &str) -> (u32, f64) {
    let cap = level_cap(skill);
    let mut level = 0usize;
    for (i, required) in SKILL_XP_REQUIREMENTS.iter().enumerate() {
        if i > cap {
            break;
        }
        if xp >= *required as f64 {
            level = i;
        } else {
            break;
        }
    }

    let progress = if level < cap {
        let current = SKILL_XP_REQUIREMENTS[level] as f64;
        let next = SKILL_XP_REQUIREMENTS[level + 1] as f64;
        ((xp - current) / (next - current)) * 100.0
    } else {
        100.0
    };

    (level as u32, progress)
}

/// Compute every skill's level from a profile member blob.
pub fn analyze_skills(member: &Value) -> SkillAnalysis {
    let mut skills = Vec::with_capacity(SKILLS.len());
    let mut total_skill_level = 0u32;
    let mut counted = 0u32;

    for name in SKILLS {
        let xp = member
            .get(format!("experience_skill_{name}"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let (level, progress) = skill_level(xp, name);

        if !AVERAGE_EXCLUDED.contains(&name) {
            total_skill_level += level;
            counted += 1;
        }

        skills.push(SkillLevel {
            name: name.to_string(),
            level,
            xp,
            progress,
        });
    }

    let skill_average = if counted > 0 {
        f64::from(total_skill_level) / f64::from(counted)
    } else {
        0.0
    };

    SkillAnalysis {
        skills,
        skill_average,
        total_skill_level,
    }
}

pub fn purse(member: &Value) -> f64 {
    member
        .get("coin_purse")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn format_skill_line(skill: &SkillLevel) -> String {
    let filled = (skill.progress / 10.0).clamp(0.0, 10.0) as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(10 - filled);
    let mut name: Vec<char> = skill.name.chars().collect();
    if let Some(first) = name.first_mut() {
        *first = first.to_ascii_uppercase();
    }
    let name: String = name.into_iter().collect();
    format!("**{}** {} {} {:.1}%", name, skill.level, bar, skill.progress)
}

/// Compact profile summary for chat display.
pub fn format_summary(profile_name: &str, member: &Value) -> String {
    let analysis = analyze_skills(member);

    let mut top_skills = analysis.skills.clone();
    top_skills.sort_by(|a, b| b.level.cmp(&a.level));

    let mut parts = vec![
        format!("🏝️ **Skyblock Profile: {}**", profile_name),
        format!("📊 **Skill Average:** {:.1}", analysis.skill_average),
        "**Top Skills:**".to_string(),
    ];
    for skill in top_skills.iter().take(3) {
        parts.push(format_skill_line(skill));
    }
    parts.push(format!("💰 **Purse:** {:.0} coins", purse(member)));

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_xp_is_level_zero() {
        let (level, progress) = skill_level(0.0, "mining");
        assert_eq!(level, 0);
        assert_eq!(progress, 0.0);
    }

    #[test]
    fn level_thresholds_are_inclusive() {
        assert_eq!(skill_level(50.0, "mining").0, 1);
        assert_eq!(skill_level(49.9, "mining").0, 0);
        assert_eq!(skill_level(174.0, "mining").0, 1);
        assert_eq!(skill_level(175.0, "mining").0, 2);
    }

    #[test]
    fn the_table_tops_out_at_sixty() {
        let (level, progress) = skill_level(999_999_999.0, "mining");
        assert_eq!(level, 60);
        assert_eq!(progress, 100.0);
    }

    #[test]
    fn cosmetic_skills_cap_at_twenty_five() {
        let (level, progress) = skill_level(999_999_999.0, "runecrafting");
        assert_eq!(level, 25);
        assert_eq!(progress, 100.0);
    }

    #[test]
    fn average_excludes_cosmetic_skills() {
        // XP for level 2 in the eight counted skills, huge XP in the
        // excluded three; the average must ignore the latter.
        let mut member = json!({});
        for skill in ["farming", "mining", "combat", "foraging", "fishing", "enchanting", "alchemy", "taming"] {
            member[format!("experience_skill_{skill}")] = json!(175.0);
        }
        for skill in AVERAGE_EXCLUDED {
            member[format!("experience_skill_{skill}")] = json!(999_999_999.0);
        }

        let analysis = analyze_skills(&member);
        assert_eq!(analysis.total_skill_level, 16);
        assert!((analysis.skill_average - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_xp_fields_read_as_zero() {
        let analysis = analyze_skills(&json!({}));
        assert_eq!(analysis.total_skill_level, 0);
        assert_eq!(analysis.skill_average, 0.0);
    }

    #[test]
    fn summary_mentions_profile_and_purse() {
        let member = json!({
            "experience_skill_combat": 6425.0,
            "coin_purse": 12_345.6,
        });
        let summary = format_summary("Mango", &member);
        assert!(summary.contains("Mango"));
        assert!(summary.contains("12346 coins"));
        assert!(summary.contains("Combat"));
    }
}
