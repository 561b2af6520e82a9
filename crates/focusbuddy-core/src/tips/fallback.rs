use rand::seq::SliceRandom;

/// Shown when the generator is unavailable, and to non-premium users.
pub const FALLBACK_TIPS: &[&str] = &[
    "Break big tasks into smaller, manageable pieces. You've got this!",
    "Remember: progress, not perfection. Every minute of focus counts.",
    "Your brain is like a muscle - the more you exercise focus, the stronger it gets.",
    "Take it one moment at a time. You don't have to focus for hours, just right now.",
    "ADHD brains are creative powerhouses. Use that energy to your advantage!",
    "It's okay to take breaks. Your brain needs rest to process and recharge.",
    "You're not lazy, you're differently wired. Work with your brain, not against it.",
    "Small wins add up to big achievements. Celebrate every focused minute!",
    "Your attention is a superpower. Channel it wisely and watch the magic happen.",
    "Remember why you started. Your goals are worth the effort.",
    "Focus is a skill that gets better with practice. You're doing great!",
    "Every distraction overcome is a victory. Keep going!",
    "Your unique brain wiring is your strength, not your weakness.",
    "Progress happens in small steps. Trust the process.",
    "You're building focus muscles one session at a time.",
];

pub fn random_fallback() -> &'static str {
    FALLBACK_TIPS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_TIPS[0])
}
