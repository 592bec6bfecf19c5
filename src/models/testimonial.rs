// src/models/testimonial.rs
// DOCUMENTATION: Testimonial data structures
// PURPOSE: Published client testimonials and their display grouping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Client testimonial, read-only from this application's perspective
/// (rows are created by the studio's back office)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub rating: i32,
    pub content: String,
    pub date: DateTime<Utc>,
    pub featured: bool,
    pub image: Option<String>,
}

/// Testimonials partitioned into the two display groups
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestimonialGroups {
    pub featured: Vec<Testimonial>,
    pub others: Vec<Testimonial>,
}

impl TestimonialGroups {
    /// Partition testimonials by the featured flag, preserving order
    pub fn partition(testimonials: Vec<Testimonial>) -> Self {
        let (featured, others) = testimonials.into_iter().partition(|t| t.featured);
        TestimonialGroups { featured, others }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn testimonial(id: i64, featured: bool) -> Testimonial {
        Testimonial {
            id,
            name: format!("Client {}", id),
            location: Some("Barcelona".to_string()),
            rating: 5,
            content: "Wonderful experience".to_string(),
            date: Utc::now(),
            featured,
            image: None,
        }
    }

    #[test]
    fn test_partition_by_featured_flag() {
        let groups = TestimonialGroups::partition(vec![
            testimonial(1, true),
            testimonial(2, false),
            testimonial(3, true),
        ]);

        assert_eq!(groups.featured.len(), 2);
        assert_eq!(groups.others.len(), 1);
        assert_eq!(groups.featured[0].id, 1);
        assert_eq!(groups.others[0].id, 2);
    }
}
