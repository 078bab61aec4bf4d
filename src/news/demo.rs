//! Static articles served when no live feed can be fetched.

use chrono::{Duration, NaiveDateTime, Timelike, Utc};

use crate::news::types::Article;

/// `(title, slug, description, image seed)` for each demo entry.
const CORPUS: [(&str, &str, &str, &str); 10] = [
    (
        "Breaking: Major Technology Breakthrough Announced",
        "technology-breakthrough",
        "Scientists have made a significant breakthrough in quantum computing technology, promising to revolutionize data processing and encryption methods worldwide.",
        "tech1",
    ),
    (
        "Global Climate Summit Reaches Historic Agreement",
        "climate-summit",
        "World leaders have signed a landmark agreement on climate action, committing to ambitious carbon reduction targets by 2030.",
        "climate1",
    ),
    (
        "Economic Growth Surpasses Expectations in Latest Quarter",
        "economic-growth",
        "The economy showed remarkable resilience with growth figures exceeding analyst predictions, driven by strong consumer spending and business investment.",
        "economy1",
    ),
    (
        "Championship Team Secures Dramatic Victory",
        "sports-victory",
        "In a thrilling finale, the home team secured victory in the final minutes, delighting fans and securing their place in history.",
        "sports1",
    ),
    (
        "New Art Exhibition Draws Record Crowds",
        "art-exhibition",
        "The highly anticipated contemporary art exhibition has broken attendance records, showcasing works from emerging and established artists alike.",
        "art1",
    ),
    (
        "Healthcare Innovation Promises Better Patient Outcomes",
        "healthcare-innovation",
        "A new medical technology has shown promising results in clinical trials, offering hope for improved treatment of chronic conditions.",
        "health1",
    ),
    (
        "Education Reform Proposals Unveiled",
        "education-reform",
        "Comprehensive education reforms have been proposed, focusing on digital literacy and preparing students for future workforce demands.",
        "education1",
    ),
    (
        "Space Exploration Mission Achieves Milestone",
        "space-mission",
        "The latest space mission has successfully achieved a critical milestone, bringing humanity closer to establishing a permanent presence beyond Earth.",
        "space1",
    ),
    (
        "Sustainability Initiative Launches in Major Cities",
        "sustainability",
        "Urban centers worldwide are implementing innovative sustainability programs, focusing on renewable energy and waste reduction.",
        "sustain1",
    ),
    (
        "Cultural Festival Celebrates Diversity and Unity",
        "cultural-festival",
        "Communities come together for an annual celebration of cultural heritage, featuring music, food, and traditions from around the world.",
        "culture1",
    ),
];

/// Number of entries in the demo corpus.
pub const DEMO_CORPUS_SIZE: usize = CORPUS.len();

/// The first `count` demo articles, stamped relative to the current time.
///
/// Entry *n* (1-based) is dated *2n* hours ago. Category filtering is not
/// applied.
pub fn demo_articles(count: usize) -> Vec<Article> {
    demo_articles_at(Utc::now().naive_utc(), count)
}

/// Same as [`demo_articles`] with an explicit reference time.
pub fn demo_articles_at(now: NaiveDateTime, count: usize) -> Vec<Article> {
    let now = now.with_nanosecond(0).unwrap_or(now);

    CORPUS
        .iter()
        .zip(1i64..)
        .take(count)
        .map(|(&(title, slug, description, seed), n)| {
            Article::new(
                title,
                format!("https://www.thetimes.co.uk/article/{slug}"),
                description,
            )
            .with_pub_date(now - Duration::hours(2 * n))
            .with_image(format!("https://picsum.photos/seed/{seed}/800/450"))
        })
        .collect()
}
