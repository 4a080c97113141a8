//! Built-in canonical song dictionary.
//!
//! Maps canonical display names to known lowercase aliases. This covers the
//! songs most commonly seen across official releases and archive tapes; the
//! persisted alias table (operator-confirmed) always takes precedence over
//! this dictionary during resolution.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical name → known aliases (all lowercase for matching).
pub const CANONICAL_SONGS: &[(&str, &[&str])] = &[
    ("Aiko-Aiko", &["iko iko", "aiko aiko"]),
    ("Alabama Getaway", &[]),
    ("All Along the Watchtower", &[]),
    ("Althea", &[]),
    ("And We Bid You Goodnight", &["we bid you goodnight", "bid you goodnight"]),
    ("Around and Around", &["around & around"]),
    ("Attics of My Life", &[]),
    ("Beat It On Down the Line", &["biodtl"]),
    ("Bertha", &[]),
    ("Big Railroad Blues", &["big rr blues"]),
    ("Big River", &[]),
    ("Bird Song", &["birdsong"]),
    ("Black Peter", &[]),
    ("Black-Throated Wind", &["black throated wind"]),
    ("Box of Rain", &[]),
    ("Brokedown Palace", &[]),
    ("Brown-Eyed Women", &["brown eyed women"]),
    ("Candyman", &[]),
    ("Casey Jones", &[]),
    ("Cassidy", &[]),
    (
        "Caution (Do Not Stop on Tracks)",
        &["caution", "caution do not stop on tracks"],
    ),
    ("C.C. Rider", &["cc rider", "c c rider", "c.c.rider", "see see rider"]),
    ("China Cat Sunflower", &["china cat"]),
    ("China Doll", &[]),
    ("Cold Rain and Snow", &["cold rain & snow"]),
    ("Comes a Time", &[]),
    ("Cosmic Charlie", &[]),
    ("Crazy Fingers", &[]),
    ("Cryptical Envelopment", &[]),
    ("Cumberland Blues", &[]),
    (
        "Dancing in the Street",
        &["dancin' in the streets", "dancin in the street", "dancing in the streets"],
    ),
    ("Dark Hollow", &[]),
    ("Dark Star", &[]),
    ("Days Between", &[]),
    ("Deal", &[]),
    ("Deep Elem Blues", &["deep elem", "deep ellum blues"]),
    ("Dire Wolf", &[]),
    ("Doin' That Rag", &["doin that rag"]),
    ("Don't Ease Me In", &["dont ease me in"]),
    ("Drums", &["drums/space", "rhythm devils", "drumz"]),
    ("Dupree's Diamond Blues", &[]),
    ("El Paso", &[]),
    ("Estimated Prophet", &[]),
    ("Eyes of the World", &[]),
    ("Feedback", &[]),
    ("Fire on the Mountain", &[]),
    ("Foolish Heart", &[]),
    ("Franklin's Tower", &["franklins tower"]),
    ("Friend of the Devil", &[]),
    (
        "Going Down the Road Feeling Bad",
        &["goin' down the road feelin' bad", "goin' down the road feeling bad", "gdtrfb"],
    ),
    ("Good Lovin'", &["good lovin", "good loving"]),
    ("Greatest Story Ever Told", &["the greatest story ever told"]),
    (
        "Half-Step Mississippi Uptown Toodleloo",
        &[
            "mississippi half-step uptown toodeloo",
            "mississippi half step uptown toodeloo",
            "mississippi half-step",
            "mississippi half step",
            "half-step",
        ],
    ),
    ("He's Gone", &["hes gone"]),
    ("Hell in a Bucket", &[]),
    ("Help on the Way", &[]),
    ("Here Comes Sunshine", &[]),
    ("High Time", &[]),
    ("I Know You Rider", &["know you rider"]),
    ("I Need a Miracle", &[]),
    ("It Hurts Me Too", &["hurts me too"]),
    ("It Must Have Been the Roses", &["must have been the roses"]),
    (
        "It's All Over Now, Baby Blue",
        &["baby blue", "it's all over now baby blue"],
    ),
    ("Jack Straw", &[]),
    ("Jack-A-Roe", &["jack a roe", "jackaroe"]),
    ("Jam", &[]),
    ("Johnny B. Goode", &["johnny b goode", "johnny b. good"]),
    ("Keep Your Day Job", &["day job"]),
    (
        "Knocking on Heaven's Door",
        &["knockin' on heaven's door", "knockin on heavens door", "knocking on heavens door"],
    ),
    ("Lady with a Fan", &["terrapin station part 1"]),
    ("Lazy Lightning", &[]),
    ("Let It Grow", &[]),
    ("Little Red Rooster", &[]),
    ("Looks Like Rain", &[]),
    ("Loser", &[]),
    ("Man Smart, Woman Smarter", &["man smart woman smarter"]),
    ("Me and Bobby McGee", &["me & bobby mcgee"]),
    ("Me and My Uncle", &["me & my uncle"]),
    ("Mexicali Blues", &[]),
    ("Might as Well", &[]),
    ("Morning Dew", &[]),
    ("Mr. Charlie", &["mr charlie", "mister charlie"]),
    ("Music Never Stopped", &["the music never stopped"]),
    (
        "New Minglewood Blues",
        &["the new minglewood blues", "new minglewood", "all new minglewood blues", "minglewood blues"],
    ),
    ("New Speedway Boogie", &[]),
    ("Not Fade Away", &["nfa"]),
    ("One More Saturday Night", &[]),
    ("Other One", &["the other one", "that's it for the other one"]),
    ("Peggy-O", &["peggy o"]),
    ("Playing in the Band", &["playin' in the band", "playin in the band", "pitb"]),
    (
        "Playing in the Band Reprise",
        &["playin' in the band reprise", "playin in the band reprise", "pitb reprise"],
    ),
    ("Promised Land", &["the promised land"]),
    ("Quinn the Eskimo", &["the mighty quinn", "mighty quinn"]),
    ("Ramble On Rose", &[]),
    ("Ripple", &[]),
    ("Row Jimmy", &["row jimmy row"]),
    ("Saint Stephen", &["st. stephen", "st stephen"]),
    ("Samson and Delilah", &["samson & delilah"]),
    ("Scarlet Begonias", &[]),
    ("Shakedown Street", &[]),
    ("Ship of Fools", &[]),
    ("Slipknot!", &["slipknot"]),
    ("Space", &[]),
    ("Spanish Jam", &[]),
    ("Stagger Lee", &[]),
    ("Stella Blue", &[]),
    ("Stranger", &["feel like a stranger"]),
    ("Sugar Magnolia", &[]),
    ("Sugaree", &[]),
    ("Sunshine Daydream", &[]),
    ("Supplication", &[]),
    ("Tennessee Jed", &[]),
    ("Terrapin Station", &["terrapin"]),
    ("The Eleven", &["eleven"]),
    ("The Wheel", &["wheel"]),
    ("They Love Each Other", &[]),
    ("Throwing Stones", &[]),
    ("To Lay Me Down", &[]),
    ("Touch of Grey", &["touch of gray"]),
    ("Truckin'", &["truckin", "trucking"]),
    ("Turn On Your Lovelight", &["turn on your love light", "lovelight"]),
    ("Uncle John's Band", &["uncle johns band"]),
    ("US Blues", &["u.s. blues"]),
    ("Viola Lee Blues", &[]),
    ("Wang Dang Doodle", &[]),
    ("Weather Report Suite", &[]),
    ("West L.A. Fadeaway", &["west la fadeaway"]),
    ("Wharf Rat", &["warf rat"]),
    ("When I Paint My Masterpiece", &["masterpiece"]),
];

/// Interlude songs: improvisational segments that can interrupt a song
/// without ending it musically. A song interrupted by a contiguous block
/// of these and then resumed is one performance (a sandwich). Membership
/// is a fixed set — add new interlude types here, never infer by pattern.
pub const INTERLUDE_SONGS: &[&str] = &["Drums", "Space", "Jam"];

/// Lowercase alias → canonical name, built from [`CANONICAL_SONGS`].
/// Canonical names themselves are included as their own alias.
pub static ALIAS_MAP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (canonical, aliases) in CANONICAL_SONGS {
        map.insert(canonical.to_lowercase(), *canonical);
        for alias in *aliases {
            map.insert((*alias).to_string(), *canonical);
        }
    }
    map
});

/// Look up a cleaned, lowercased title in the built-in dictionary.
pub fn lookup(lower: &str) -> Option<&'static str> {
    ALIAS_MAP.get(lower).copied()
}

/// Whether a canonical name is in the built-in dictionary (exempt from
/// rare-song pruning).
pub fn is_known_song(canonical_name: &str) -> bool {
    ALIAS_MAP.contains_key(&canonical_name.to_lowercase())
}

/// Whether a canonical name is an interlude-type song.
pub fn is_interlude(canonical_name: &str) -> bool {
    INTERLUDE_SONGS.contains(&canonical_name)
}
