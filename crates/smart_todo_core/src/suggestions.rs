use rand::Rng;
use rand::seq::SliceRandom;

pub const DEFAULT_SUGGESTION_COUNT: usize = 5;

pub const IMPROVEMENT_IDEAS: [&str; 10] = [
    "Add priority levels to tasks",
    "Set due dates with reminders",
    "Group tasks into categories",
    "Support a dark mode",
    "Search and filter tasks",
    "Show completion statistics and reports",
    "Reorder tasks with drag and drop",
    "Break tasks into subtasks",
    "Create tasks from templates",
    "Sync data to the cloud",
];

/// Up to `count` distinct ideas in random order.
pub fn suggest_improvements<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static str> {
    let mut ideas = IMPROVEMENT_IDEAS.to_vec();
    ideas.shuffle(rng);
    ideas.truncate(count);
    ideas
}
