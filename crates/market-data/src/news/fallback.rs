use super::NewsItem;

/// Warning attached when no feed could be read.
pub const NEWS_FALLBACK_WARNING: &str = "Using cached news data";

const FALLBACK_NEWS: &[(&str, &str, &str, &str)] = &[
    (
        "Markets Rally on Strong FII Inflows, Nifty Eyes New Highs",
        "Indian markets surged as foreign institutional investors continued their buying spree, pushing benchmark indices to fresh highs.",
        "Jan 29, 2026",
        "Market Watch",
    ),
    (
        "RBI Maintains Repo Rate at 6.5%, Focuses on Inflation",
        "The central bank keeps interest rates unchanged, citing stable inflation outlook and maintaining growth-focused stance.",
        "Jan 28, 2026",
        "Economic Times",
    ),
    (
        "Banking Stocks Lead Market Rally, Bank Nifty Surges 2%",
        "Financial sector stocks outperform as credit growth picks up and asset quality improves across major lenders.",
        "Jan 27, 2026",
        "Moneycontrol",
    ),
    (
        "IT Sector Shows Signs of Recovery Amid Global Demand",
        "Technology stocks gain momentum as major IT companies report better-than-expected deal wins for the quarter.",
        "Jan 26, 2026",
        "Mint",
    ),
    (
        "Gold Prices Touch Record High Amid Global Uncertainty",
        "Yellow metal continues its upward trajectory as investors seek safe-haven assets amid geopolitical tensions.",
        "Jan 25, 2026",
        "Business Standard",
    ),
    (
        "SEBI Introduces New MF Categorization Guidelines",
        "New regulations aim to bring more clarity and standardization to mutual fund classifications and disclosures.",
        "Jan 24, 2026",
        "Economic Times",
    ),
];

/// Static headlines served when every feed fails.
pub fn fallback_news() -> Vec<NewsItem> {
    FALLBACK_NEWS
        .iter()
        .map(|(title, excerpt, date, source)| NewsItem {
            title: title.to_string(),
            excerpt: excerpt.to_string(),
            date: date.to_string(),
            source: source.to_string(),
            link: None,
        })
        .collect()
}
