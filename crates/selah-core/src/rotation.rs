//! The fixed liturgical rotation: 52 weekly theme descriptors covering one
//! liturgical year, plus a sparse per-week-per-day scripture table.
//!
//! Scripture lookup is keyed by `"{season}-{week_of_season}"` and day of week
//! (0 = Sunday). Most weeks have no dedicated entries and resolve to
//! [`FALLBACK_SCRIPTURE`]; the substitution happens in one visible place,
//! [`scripture_or_fallback`], so the policy stays auditable.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    Advent,
    Christmas,
    Epiphany,
    Lent,
    HolyWeek,
    Easter,
    Pentecost,
    OrdinaryTime,
}

impl Season {
    /// Stable string form used as a DB tag and as the scripture-key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Advent => "advent",
            Season::Christmas => "christmas",
            Season::Epiphany => "epiphany",
            Season::Lent => "lent",
            Season::HolyWeek => "holy-week",
            Season::Easter => "easter",
            Season::Pentecost => "pentecost",
            Season::OrdinaryTime => "ordinary-time",
        }
    }

    pub fn parse(s: &str) -> Option<Season> {
        match s {
            "advent" => Some(Season::Advent),
            "christmas" => Some(Season::Christmas),
            "epiphany" => Some(Season::Epiphany),
            "lent" => Some(Season::Lent),
            "holy-week" => Some(Season::HolyWeek),
            "easter" => Some(Season::Easter),
            "pentecost" => Some(Season::Pentecost),
            "ordinary-time" => Some(Season::OrdinaryTime),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Theme descriptors
// ---------------------------------------------------------------------------

/// One entry of the 52-week rotation.
#[derive(Debug, Clone, Copy)]
pub struct ThemeDescriptor {
    pub season: Season,
    /// 1-based ordinal of this week within its season.
    pub week_of_season: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub reflection_prompt: &'static str,
}

impl ThemeDescriptor {
    /// Key into the sparse scripture table, e.g. `"advent-1"`.
    pub fn season_key(&self) -> String {
        format!("{}-{}", self.season.as_str(), self.week_of_season)
    }
}

macro_rules! theme {
    ($season:ident, $week:expr, $title:expr, $desc:expr, $prompt:expr) => {
        ThemeDescriptor {
            season: Season::$season,
            week_of_season: $week,
            title: $title,
            description: $desc,
            reflection_prompt: $prompt,
        }
    };
}

/// The full rotation, in calendar order starting from Advent.
/// Season lengths: Advent 4, Christmas 2, Epiphany 7, Lent 6, Holy Week 1,
/// Easter 7, Pentecost 1, Ordinary Time 24 — 52 weeks in total.
pub fn rotation() -> &'static [ThemeDescriptor] {
    &ROTATION
}

static ROTATION: [ThemeDescriptor; 52] = [
    theme!(Advent, 1, "Watchful Waiting", "Advent opens with the long look toward the horizon: learning to wait without numbing.", "Where in your life are you waiting, and what does the waiting ask of you?"),
    theme!(Advent, 2, "Making Room", "Clearing the cluttered interior so something new can be born in it.", "What would you need to set down to make room this week?"),
    theme!(Advent, 3, "Joy in the Dark", "Gaudete week: joy practiced before circumstances justify it.", "When has joy surprised you in a season that looked hopeless?"),
    theme!(Advent, 4, "God With Us", "The nearness of God in ordinary flesh and ordinary days.", "Where did you sense presence rather than absence today?"),
    theme!(Christmas, 1, "Word Made Flesh", "The feast itself: glory showing up in a body, in a barn.", "What does it mean to you that the holy chose smallness?"),
    theme!(Christmas, 2, "Treasured Things", "With Mary, keeping and pondering what the season revealed.", "What from this past year do you want to treasure rather than explain?"),
    theme!(Epiphany, 1, "Following the Star", "Setting out on the strength of a small light.", "What small light are you currently following?"),
    theme!(Epiphany, 2, "Beloved First", "Baptism week: identity received before anything is achieved.", "Can you hear 'beloved' before you hear any verdict on your work?"),
    theme!(Epiphany, 3, "Water Into Wine", "Abundance appearing where the supply had plainly run out.", "Where are you living from scarcity that may not be the whole story?"),
    theme!(Epiphany, 4, "Ordinary Callings", "Nets, boats, tax booths: vocation found inside daily work.", "What is your daily work teaching you that a retreat never could?"),
    theme!(Epiphany, 5, "Salt and Light", "A quiet usefulness that seasons and illumines without announcing itself.", "Who has been salt in your life lately?"),
    theme!(Epiphany, 6, "Healing the Hidden", "The slow mending of wounds that do not show.", "What hidden place in you is asking for attention?"),
    theme!(Epiphany, 7, "Transfigured Sight", "Seeing the familiar lit from within before descending the mountain.", "When did you last see someone familiar as if for the first time?"),
    theme!(Lent, 1, "Into the Wilderness", "Lent begins in the bare place where appetites tell the truth.", "What appetite is loudest in you right now?"),
    theme!(Lent, 2, "Letting Go", "Fasting as subtraction that reveals what was load-bearing.", "What could you subtract this week as an experiment in trust?"),
    theme!(Lent, 3, "Thirst", "Meeting the deeper want underneath the surface wants.", "What are you actually thirsty for?"),
    theme!(Lent, 4, "Return", "The long walk home of the prodigal and the waiting porch.", "What would returning look like for you, concretely, this week?"),
    theme!(Lent, 5, "Unbinding", "Lazarus called out, then unbound: resurrection needs community to finish.", "What grave-clothes are you still wearing out of habit?"),
    theme!(Lent, 6, "The Downward Road", "Palms and passion held in one hand; triumph redefined as descent.", "Where might going lower be the faithful move?"),
    theme!(HolyWeek, 1, "Stay Here With Me", "Keeping watch through the week the light goes out.", "Can you stay present to pain, your own or another's, without fixing it?"),
    theme!(Easter, 1, "Early, While Still Dark", "Resurrection noticed first by those who showed up grieving.", "What has quietly come back to life in you?"),
    theme!(Easter, 2, "Wounds That Remain", "The risen body keeps its scars; so does every honest healing.", "Which of your scars has become a credential for compassion?"),
    theme!(Easter, 3, "Breakfast on the Shore", "Restoration served as an ordinary meal among friends.", "Who could you feed this week as an act of repair?"),
    theme!(Easter, 4, "Known by Name", "The shepherd's voice: being recognized rather than evaluated.", "What does it feel like to be known and not graded?"),
    theme!(Easter, 5, "Abide", "Remaining connected as the one non-negotiable practice.", "What helps you remain, when producing feels more urgent?"),
    theme!(Easter, 6, "Peace I Leave You", "A peace that is given, not achieved, and unlike the world's.", "Where do you confuse peace with control?"),
    theme!(Easter, 7, "Between Ascension and Power", "The in-between room: waiting together for what was promised.", "How do you wait well in community rather than alone?"),
    theme!(Pentecost, 1, "Tongues of Fire", "The Spirit given in wind and fire, making one story of many languages.", "What in you wants to be set alight?"),
    theme!(OrdinaryTime, 1, "Rooted and Growing", "Ordinary Time begins: long green weeks of unspectacular growth.", "What is growing in you so slowly you almost missed it?"),
    theme!(OrdinaryTime, 2, "Sabbath Rhythm", "Rest as resistance to the lie that you are what you produce.", "What would one unproductive hour of delight look like this week?"),
    theme!(OrdinaryTime, 3, "The Good Soil", "Tending receptivity: the seed is constant, the soil varies.", "What hardens your soil, and what softens it?"),
    theme!(OrdinaryTime, 4, "Mustard Seed", "Disproportionate hope: tiny beginnings, sheltering branches.", "What small faithful act could you repeat daily this week?"),
    theme!(OrdinaryTime, 5, "Treasure in a Field", "Joy that reorders priorities without being told to.", "What have you found that is worth rearranging your life around?"),
    theme!(OrdinaryTime, 6, "Bread for the Crowd", "Enough appearing as what was offered gets shared.", "Where are you hoarding what would multiply if shared?"),
    theme!(OrdinaryTime, 7, "Walking on Water", "Courage between the boat and the wave, eyes up.", "What keeps your gaze when the wind picks up?"),
    theme!(OrdinaryTime, 8, "Crumbs and Boldness", "The Canaanite woman's persistence: faith that talks back.", "Where is persistence, not politeness, the faithful posture?"),
    theme!(OrdinaryTime, 9, "Who Do You Say I Am", "The question that moves from opinion to allegiance.", "What do your calendar and bank statement say you worship?"),
    theme!(OrdinaryTime, 10, "Take Up Daily", "The unglamorous daily carrying that forms a life.", "What daily weight are you carrying that needs witnessing, not removing?"),
    theme!(OrdinaryTime, 11, "Forgive Seventy-Seven", "Forgiveness as a practice with repetitions, not a single event.", "Who are you still forgiving, one layer at a time?"),
    theme!(OrdinaryTime, 12, "Laborers at Five O'Clock", "Grace offends arithmetic; generosity is not a wage.", "Where does someone else's good fortune still sting, and why?"),
    theme!(OrdinaryTime, 13, "Two Sons", "Saying yes with your feet after saying no with your mouth.", "Where is there a gap between your stated and lived yes?"),
    theme!(OrdinaryTime, 14, "The Wedding Feast", "Invitation as the shape of grace; showing up as the response.", "What invitation have you been declining by default?"),
    theme!(OrdinaryTime, 15, "Caesar's Coin", "Sorting what belongs to whom: allegiance, money, self.", "What bears the image of God in your week, and what merely bears a logo?"),
    theme!(OrdinaryTime, 16, "The Greatest Commandment", "Love of God and neighbor as one braided practice.", "Which is harder for you right now, and what does that reveal?"),
    theme!(OrdinaryTime, 17, "Oil for the Lamps", "Keeping reserves for the long wait nobody scheduled.", "What practice refills your lamp, and when did you last do it?"),
    theme!(OrdinaryTime, 18, "Buried Talents", "Fear as the quiet reason gifts stay wrapped.", "What gift are you burying, and what fear is the shovel?"),
    theme!(OrdinaryTime, 19, "The Least of These", "Christ distributed among the hungry, the stranger, the sick.", "Who did you overlook this week, and what would noticing cost?"),
    theme!(OrdinaryTime, 20, "Seed Growing Secretly", "The farmer sleeps and rises; the growth is not his doing.", "What outcome do you need to stop supervising?"),
    theme!(OrdinaryTime, 21, "A Cup of Cold Water", "Small mercies counted in full; nothing offered is wasted.", "What is the smallest kindness you could not skip this week?"),
    theme!(OrdinaryTime, 22, "Lost and Found", "The shepherd's arithmetic: the one outweighs the ninety-nine.", "What lost part of yourself is worth going back for?"),
    theme!(OrdinaryTime, 23, "Gratitude That Returns", "The tenth leper's walk back as the completion of healing.", "What healing in your life is still waiting for its thank-you?"),
    theme!(OrdinaryTime, 24, "The Feast to Come", "The year closes leaning toward the table where all are fed.", "Looking back over this year of weeks, what thread do you see?"),
];

// ---------------------------------------------------------------------------
// Sparse scripture table
// ---------------------------------------------------------------------------

/// Scripture content for one (week, day) slot.
#[derive(Debug, Clone, Copy)]
pub struct ScriptureEntry {
    pub reference: &'static str,
    pub text: &'static str,
    pub reflection_prompt: &'static str,
    pub day_title: Option<&'static str>,
}

/// Returned for any (season key, day) the sparse table does not cover.
/// Most generated weeks legitimately carry this entry.
pub const FALLBACK_SCRIPTURE: ScriptureEntry = ScriptureEntry {
    reference: "Psalm 46:10",
    text: "Be still, and know that I am God.",
    reflection_prompt: "Sit with this verse for two minutes. What rises when you stop moving?",
    day_title: None,
};

macro_rules! entry {
    ($day:expr, $reference:expr, $text:expr, $prompt:expr) => {
        (
            $day,
            ScriptureEntry {
                reference: $reference,
                text: $text,
                reflection_prompt: $prompt,
                day_title: None,
            },
        )
    };
    ($day:expr, $reference:expr, $text:expr, $prompt:expr, $title:expr) => {
        (
            $day,
            ScriptureEntry {
                reference: $reference,
                text: $text,
                reflection_prompt: $prompt,
                day_title: Some($title),
            },
        )
    };
}

static ADVENT_1: [(u8, ScriptureEntry); 7] = [
    entry!(0, "Isaiah 40:3", "A voice of one calling: in the wilderness prepare the way for the Lord.", "What way is being prepared in you?", "Prepare"),
    entry!(1, "Psalm 130:5-6", "I wait for the Lord, my whole being waits, and in his word I put my hope.", "Name one thing you are waiting for without a deadline."),
    entry!(2, "Isaiah 9:2", "The people walking in darkness have seen a great light.", "Where did light reach you unexpectedly today?"),
    entry!(3, "Lamentations 3:25-26", "The Lord is good to those whose hope is in him; it is good to wait quietly.", "Practice one minute of quiet waiting before your next task."),
    entry!(4, "Habakkuk 2:3", "For the revelation awaits an appointed time; though it linger, wait for it.", "What lingers unanswered in your life right now?"),
    entry!(5, "Isaiah 64:4", "No ear has perceived, no eye has seen any God besides you, who acts on behalf of those who wait for him.", "How does waiting change when you believe someone is acting for you?"),
    entry!(6, "Psalm 27:14", "Wait for the Lord; be strong and take heart and wait for the Lord.", "End the week by naming where waiting made you stronger.", "Take Heart"),
];

static ADVENT_4: [(u8, ScriptureEntry); 3] = [
    entry!(0, "Matthew 1:23", "They will call him Immanuel, which means 'God with us.'", "Where was God-with-you most plausible this week?", "Immanuel"),
    entry!(3, "Luke 1:38", "I am the Lord's servant. May your word to me be fulfilled.", "What are you being asked to consent to?"),
    entry!(6, "Luke 2:19", "But Mary treasured up all these things and pondered them in her heart.", "Treasure one moment from today without analyzing it."),
];

static LENT_1: [(u8, ScriptureEntry); 7] = [
    entry!(0, "Matthew 4:1", "Then Jesus was led by the Spirit into the wilderness.", "What wilderness are you being led into?", "Led Out"),
    entry!(1, "Deuteronomy 8:3", "Man does not live on bread alone.", "What are you fed by besides bread?"),
    entry!(2, "Psalm 51:10", "Create in me a pure heart, O God, and renew a steadfast spirit within me.", "What needs renewing rather than replacing?"),
    entry!(3, "Joel 2:13", "Rend your heart and not your garments.", "What would honest, inward repentance look like today?"),
    entry!(4, "Psalm 91:1", "Whoever dwells in the shelter of the Most High will rest in the shadow of the Almighty.", "Where is your shelter when the fast gets hard?"),
    entry!(5, "Isaiah 58:6", "Is not this the kind of fasting I have chosen: to loose the chains of injustice?", "How could your fast benefit someone other than you?"),
    entry!(6, "Matthew 6:17-18", "When you fast, put oil on your head and wash your face.", "Practice one hidden discipline today with no witness.", "Hidden"),
];

static HOLY_WEEK_1: [(u8, ScriptureEntry); 4] = [
    entry!(0, "Matthew 21:9", "Hosanna to the Son of David! Blessed is he who comes in the name of the Lord!", "What kind of rescue were you expecting that didn't come?", "Palms"),
    entry!(4, "John 13:14", "Now that I, your Lord and Teacher, have washed your feet, you also should wash one another's feet.", "Whose feet, figuratively, could you wash tomorrow?", "Maundy"),
    entry!(5, "John 19:30", "It is finished.", "Sit with an ending you have not yet accepted.", "Good Friday"),
    entry!(6, "Matthew 27:59-60", "Joseph took the body and placed it in his own new tomb.", "Today is for silence. Keep some.", "The Long Quiet"),
];

static EASTER_1: [(u8, ScriptureEntry); 7] = [
    entry!(0, "John 20:1", "Early on the first day of the week, while it was still dark, Mary Magdalene went to the tomb.", "What are you still showing up for in the dark?", "Still Dark"),
    entry!(1, "Luke 24:5", "Why do you look for the living among the dead?", "What living thing are you seeking in a dead place?"),
    entry!(2, "John 20:16", "Jesus said to her, 'Mary.'", "Hear your own name said kindly. What changes?"),
    entry!(3, "Luke 24:30-31", "He took bread, gave thanks, broke it and began to give it to them. Then their eyes were opened.", "When has a shared meal opened your eyes?"),
    entry!(4, "John 20:27", "Put your finger here; see my hands.", "What proof of healing do you carry in your own body?"),
    entry!(5, "1 Corinthians 15:55", "Where, O death, is your victory? Where, O death, is your sting?", "What no longer stings the way it once did?"),
    entry!(6, "John 21:12", "Jesus said to them, 'Come and have breakfast.'", "Close the week with an ordinary meal, taken slowly.", "Breakfast"),
];

static PENTECOST_1: [(u8, ScriptureEntry); 2] = [
    entry!(0, "Acts 2:2", "Suddenly a sound like the blowing of a violent wind came from heaven and filled the whole house.", "What would you do if you were not running on your own power?", "Wind"),
    entry!(3, "Romans 8:26", "The Spirit helps us in our weakness. We do not know what we ought to pray for.", "Let a wordless sigh count as prayer today."),
];

/// Exact lookup into the sparse table. `None` when either the season key or
/// the specific day is absent.
pub fn scripture_for(season_key: &str, day_of_week: u8) -> Option<&'static ScriptureEntry> {
    let week: &[(u8, ScriptureEntry)] = match season_key {
        "advent-1" => &ADVENT_1,
        "advent-4" => &ADVENT_4,
        "lent-1" => &LENT_1,
        "holy-week-1" => &HOLY_WEEK_1,
        "easter-1" => &EASTER_1,
        "pentecost-1" => &PENTECOST_1,
        _ => return None,
    };
    week.iter()
        .find(|(d, _)| *d == day_of_week)
        .map(|(_, e)| e)
}

/// The lookup policy: exact entry when present, [`FALLBACK_SCRIPTURE`]
/// otherwise. Never fails.
pub fn scripture_or_fallback(season_key: &str, day_of_week: u8) -> &'static ScriptureEntry {
    scripture_for(season_key, day_of_week).unwrap_or(&FALLBACK_SCRIPTURE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
