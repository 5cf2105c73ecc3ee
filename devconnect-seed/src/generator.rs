//! Fake development data
//!
//! Everything here is pure: callers pass the RNG, so a fixed seed gives the
//! same data set every run.

use chrono::{DateTime, Duration, Utc};
use devconnect_shared::models::user::{CreateProfile, SocialLinks};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

/// Creation dates fall within this many days before now
pub const HISTORY_DAYS: i64 = 30;

/// Upper bound on likes per post
pub const MAX_LIKES: usize = 9;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Dennis", "Edsger", "Frances", "Grace", "Guido", "Hedy", "Ken",
    "Linus", "Margaret", "Niklaus", "Radia", "Rob", "Sophie", "Tim", "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Dijkstra", "Hamilton", "Hopper", "Kernighan", "Lamarr", "Liskov", "Lovelace",
    "Perlman", "Pike", "Ritchie", "Rossum", "Thompson", "Torvalds", "Turing", "Wilson", "Wirth",
];

const SKILLS: &[&str] = &[
    "Rust", "JavaScript", "TypeScript", "Python", "Go", "Java", "React", "Node.js", "PostgreSQL",
    "Docker", "Kubernetes", "GraphQL",
];

const WORDS: &[&str] = &[
    "async", "borrow", "build", "cache", "compiler", "deploy", "debug", "feature", "frontend",
    "latency", "merge", "migration", "module", "pipeline", "query", "refactor", "release",
    "review", "runtime", "schema", "server", "service", "stack", "test", "trait", "type",
    "weekend", "workflow",
];

/// One generated account
#[derive(Debug, Clone)]
pub struct FakeUser {
    pub username: String,
    pub email: String,
    pub profile: CreateProfile,
}

/// Random instant between `after` and now
pub fn date_after<R: Rng + ?Sized>(rng: &mut R, after: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let span = (now - after).num_seconds();
    if span <= 0 {
        return now;
    }

    after + Duration::seconds(rng.gen_range(0..=span))
}

/// Random instant within the seeded history window
pub fn recent_date<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    date_after(rng, now - Duration::days(HISTORY_DAYS), now)
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(6..=14);
    let words: Vec<&str> = (0..len)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect();

    let mut text = words.join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text.push('.');
    text
}

/// A few sentences of filler text
pub fn paragraph<R: Rng + ?Sized>(rng: &mut R, sentences: usize) -> String {
    (0..sentences.max(1))
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generates the `index`-th account
///
/// The index is part of the username, so accounts within one run never
/// collide.
pub fn fake_user<R: Rng + ?Sized>(rng: &mut R, index: usize, now: DateTime<Utc>) -> FakeUser {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Dev");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("User");

    let username = format!("{}{}{}", first.to_lowercase(), last.to_lowercase(), index + 1);
    let email = format!("{}@example.com", username);

    let skills = SKILLS
        .choose_multiple(rng, 3)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    let profile = CreateProfile {
        name: format!("{} {}", first, last),
        bio: paragraph(rng, 2),
        skills,
        social: SocialLinks {
            github: format!("https://github.com/{}", username),
            linkedin: format!("https://linkedin.com/in/{}", username),
            twitter: format!("https://twitter.com/{}", username),
            website: format!("https://{}.dev", username),
        },
        avatar: format!("https://i.pravatar.cc/150?u={}", username),
        created_at: Some(recent_date(rng, now)),
    };

    FakeUser {
        username,
        email,
        profile,
    }
}

/// Picks up to [`MAX_LIKES`] distinct likers
pub fn pick_likers<R: Rng + ?Sized>(rng: &mut R, users: &[Uuid]) -> Vec<Uuid> {
    let count = rng.gen_range(0..=MAX_LIKES.min(users.len()));
    users.choose_multiple(rng, count).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_fake_user_is_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();

        let user = fake_user(&mut rng, 0, now);

        assert!(user.username.ends_with('1'));
        assert_eq!(user.email, format!("{}@example.com", user.username));
        assert!(!user.profile.name.is_empty());
        assert!(!user.profile.bio.is_empty());
        assert_eq!(user.profile.skills.split(", ").count(), 3);
        assert!(user.profile.social.github.contains(&user.username));

        let created = user.profile.created_at.unwrap();
        assert!(created <= now);
        assert!(created >= now - Duration::days(HISTORY_DAYS));
    }

    #[test]
    fn test_usernames_differ_by_index() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();

        let names: Vec<String> = (0..50).map(|i| fake_user(&mut rng, i, now).username).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();

        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_same_seed_same_data() {
        let now = Utc::now();

        let a = fake_user(&mut StdRng::seed_from_u64(42), 3, now);
        let b = fake_user(&mut StdRng::seed_from_u64(42), 3, now);

        assert_eq!(a.username, b.username);
        assert_eq!(a.profile.bio, b.profile.bio);
    }

    #[test]
    fn test_date_after() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc::now();
        let after = now - Duration::hours(2);

        for _ in 0..100 {
            let date = date_after(&mut rng, after, now);
            assert!(date >= after && date <= now);
        }

        // Anchor in the future collapses to now
        assert_eq!(date_after(&mut rng, now + Duration::hours(1), now), now);
    }

    #[test]
    fn test_paragraph() {
        let mut rng = StdRng::seed_from_u64(9);

        let text = paragraph(&mut rng, 3);

        assert_eq!(text.matches('.').count(), 3);
        assert!(text.chars().next().unwrap().is_ascii_uppercase());
    }

    #[test]
    fn test_pick_likers() {
        let mut rng = StdRng::seed_from_u64(11);
        let users: Vec<Uuid> = (0..20).map(|_| Uuid::new_v4()).collect();

        for _ in 0..50 {
            let mut likers = pick_likers(&mut rng, &users);
            assert!(likers.len() <= MAX_LIKES);
            likers.sort();
            likers.dedup();
            assert!(likers.iter().all(|id| users.contains(id)));
        }

        assert!(pick_likers(&mut rng, &[]).is_empty());
    }
}
