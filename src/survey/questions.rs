/// One rubric item, rated 1-5.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub title: &'static str,
    pub options: [&'static str; 5],
}

impl Question {
    /// Form field stem: "Depth Perception" -> "depth_perception".
    pub fn slug(&self) -> String {
        self.title
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

pub static RUBRIC: [Question; 5] = [
    Question {
        title: "Depth Perception",
        options: [
            "1 - Constantly overshoots target, wide swings, slow to correct",
            "2",
            "3 - Some overshooting or missing of target, but quick to correct",
            "4",
            "5 - Accurately directs instruments in the correct plane to target",
        ],
    },
    Question {
        title: "Bimanual Dexterity",
        options: [
            "1 - Uses only one hand, ignores non-dominant hand, poor coordination",
            "2",
            "3 - Uses both hands, but does not optimize interactions between hands",
            "4",
            "5 - Expertly uses both hands in a complementary way to provide best exposure",
        ],
    },
    Question {
        title: "Efficiency",
        options: [
            "1 - Inefficient efforts; many uncertain movements; constantly changing focus or persisting without progress",
            "2",
            "3 - Slow, but planned movements are reasonably organized",
            "4",
            "5 - Confident, efficient and safe conduct, maintains focus on task, fluid progression",
        ],
    },
    Question {
        title: "Force Sensitivity",
        options: [
            "1 - Rough moves, tears tissue, injures nearby structures, poor control, frequent suture breakage",
            "2",
            "3 - Handles tissues reasonably well, minor trauma to adjacent tissue, rare suture breakage",
            "4",
            "5 - Applies appropriate tension, negligible injury to adjacent structures, no suture breakage",
        ],
    },
    Question {
        title: "Robotic Control",
        options: [
            "1 - Consistently does not optimize view, hand position, or repeated collisions even with guidance",
            "2",
            "3 - View is sometimes not optimal. Occasionally needs to relocate arms. Occasional collisions and obstruction of assistant.",
            "4",
            "5 - Controls camera and hand position optimally and independently. Minimal collisions or obstruction of assistant",
        ],
    },
];
