//! Review statistics.
//!
//! Statistics are derived in a single pass over one business's reviews. The
//! average is rounded half-up to one decimal using integer arithmetic, so a
//! mean of exactly `x.x5` always rounds up regardless of float representation.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::review::{Rating, Review, MAX_RATING};

/// Aggregate statistics for a business's reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewStats {
    /// Number of reviews.
    pub total_reviews: u64,
    /// Mean rating rounded to one decimal, `0` when there are no reviews.
    pub average_rating: f64,
    /// Reviews marked published.
    pub published_reviews: u64,
    /// Reviews awaiting publication.
    pub pending_reviews: u64,
    /// Review count per star rating.
    pub rating_distribution: RatingDistribution,
}

/// Review counts per star rating.
///
/// Serialized as a map keyed by the rating as a string (`"1"` … `"5"`), which
/// is the shape the dashboard consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingDistribution([u64; MAX_RATING as usize]);

impl RatingDistribution {
    /// Count of reviews with the given rating.
    #[must_use]
    pub fn count(&self, rating: Rating) -> u64 {
        self.0[usize::from(rating.stars()) - 1]
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    fn record(&mut self, rating: Rating) {
        self.0[usize::from(rating.stars()) - 1] += 1;
    }
}

impl Serialize for RatingDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, count) in self.0.iter().enumerate() {
            map.serialize_entry(&(index + 1).to_string(), count)?;
        }
        map.end()
    }
}

/// Running totals for [`compute_stats`].
#[derive(Debug, Default)]
struct Tally {
    total: u64,
    rating_sum: u64,
    published: u64,
    distribution: RatingDistribution,
}

impl Tally {
    fn add(&mut self, rating: Rating, is_published: bool) {
        self.total += 1;
        self.rating_sum += u64::from(rating.stars());
        if is_published {
            self.published += 1;
        }
        self.distribution.record(rating);
    }

    #[allow(clippy::cast_precision_loss)] // tenths of a 1..=5 mean fit easily in f64
    fn finish(self) -> ReviewStats {
        ReviewStats {
            total_reviews: self.total,
            average_rating: average_tenths(self.rating_sum, self.total) as f64 / 10.0,
            published_reviews: self.published,
            pending_reviews: self.total - self.published,
            rating_distribution: self.distribution,
        }
    }
}

/// Compute statistics over a business's reviews.
///
/// An empty input yields all-zero statistics.
pub fn compute_stats<'a, I>(reviews: I) -> ReviewStats
where
    I: IntoIterator<Item = &'a Review>,
{
    summarize(reviews.into_iter().map(|r| (r.rating, r.is_published)))
}

/// Compute statistics from `(rating, is_published)` pairs.
///
/// Stores that only project these two columns feed them here directly.
pub fn summarize<I>(entries: I) -> ReviewStats
where
    I: IntoIterator<Item = (Rating, bool)>,
{
    let mut tally = Tally::default();
    for (rating, is_published) in entries {
        tally.add(rating, is_published);
    }
    tally.finish()
}

/// `round_half_up(sum / total * 10)`, or `0` for an empty set.
fn average_tenths(sum: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (sum * 20 + total) / (total * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::BusinessId;
    use crate::review::ReviewSubmission;

    fn reviews(ratings: &[i64]) -> Vec<Review> {
        let business_id = BusinessId::generate();
        ratings
            .iter()
            .enumerate()
            .map(|(i, &stars)| {
                let mut review = Review::new(
                    business_id,
                    ReviewSubmission::parse("Customer", stars, None).unwrap(),
                );
                review.is_published = i % 2 == 0;
                review
            })
            .collect()
    }

    fn rating(stars: i64) -> Rating {
        Rating::new(stars).unwrap()
    }

    #[test]
    fn empty_reviews_give_zero_stats() {
        let stats = compute_stats(&Vec::<Review>::new());
        assert_eq!(stats, ReviewStats::default());
        assert_eq!(stats.total_reviews, 0);
        assert!(stats.average_rating.abs() < f64::EPSILON);
        assert_eq!(stats.rating_distribution.total(), 0);
    }

    #[test]
    fn counts_published_and_pending() {
        let stats = compute_stats(&reviews(&[5, 4, 3, 2, 1]));
        assert_eq!(stats.total_reviews, 5);
        assert_eq!(stats.published_reviews, 3);
        assert_eq!(stats.pending_reviews, 2);
        assert!((stats.average_rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_rounds_half_up() {
        // 4.25 -> 4.3
        let stats = compute_stats(&reviews(&[4, 4, 4, 5]));
        assert!((stats.average_rating - 4.3).abs() < 1e-9);
        // 4.666.. -> 4.7
        let stats = compute_stats(&reviews(&[5, 5, 4]));
        assert!((stats.average_rating - 4.7).abs() < 1e-9);
        // 1.04 -> 1.0
        let mut ratings = vec![1; 24];
        ratings.push(2);
        let stats = compute_stats(&reviews(&ratings));
        assert!((stats.average_rating - 1.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_partitions_total_and_matches_mean() {
        // Deterministic pseudo-random sequences of every length up to 200.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        for len in 0..200_usize {
            let ratings: Vec<i64> = (0..len)
                .map(|_| {
                    seed ^= seed << 13;
                    seed ^= seed >> 7;
                    seed ^= seed << 17;
                    i64::try_from(seed % 5).unwrap() + 1
                })
                .collect();
            let stats = compute_stats(&reviews(&ratings));

            assert_eq!(stats.total_reviews, len as u64);
            assert_eq!(stats.rating_distribution.total(), len as u64);
            assert_eq!(stats.published_reviews + stats.pending_reviews, len as u64);
            for stars in 1..=5 {
                let expected = ratings.iter().filter(|&&r| r == stars).count() as u64;
                assert_eq!(stats.rating_distribution.count(rating(stars)), expected);
            }
            if len > 0 {
                // Nearest tenth to the exact mean, ties going up.
                let sum: i64 = ratings.iter().sum();
                let n = i64::try_from(len).unwrap();
                let tenths = (10..=50_i64)
                    .min_by_key(|&t| ((sum * 10 - t * n).abs(), -t))
                    .unwrap();
                #[allow(clippy::cast_precision_loss)]
                let expected = tenths as f64 / 10.0;
                assert!(
                    (stats.average_rating - expected).abs() < 1e-9,
                    "len={len} sum={sum} got={}",
                    stats.average_rating
                );
            }
        }
    }

    #[test]
    fn summarize_matches_compute() {
        let stats = summarize([(rating(5), true), (rating(1), false)]);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.rating_distribution.count(rating(5)), 1);
        assert_eq!(stats.rating_distribution.count(rating(1)), 1);
        assert!((stats.average_rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distribution_serializes_as_string_keyed_map() {
        let stats = summarize([(rating(5), true), (rating(5), true), (rating(2), false)]);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(
            json["rating_distribution"],
            serde_json::json!({"1": 0, "2": 1, "3": 0, "4": 0, "5": 2})
        );
        assert_eq!(json["total_reviews"], 3);
        assert_eq!(json["average_rating"], 4.0);
    }
}
