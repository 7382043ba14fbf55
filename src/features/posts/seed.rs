//! Demo posts loaded into an empty store on request.

use chrono::{DateTime, Duration, Utc};

use crate::features::posts::models::{Coordinates, NewPost, PostKind};

struct DemoPost {
    kind: PostKind,
    category: &'static str,
    title: &'static str,
    description: &'static str,
    location: &'static str,
    coordinates: (f64, f64),
    contact: &'static str,
    verified: bool,
    hearts: i32,
    age_minutes: i64,
}

const DEMO_POSTS: &[DemoPost] = &[
    DemoPost {
        kind: PostKind::Source,
        category: "Water",
        title: "Free Water Station (Brgy. Hall)",
        description: "Barangay Hall providing free drinking water. Bring your own containers. 8am - 5pm.",
        location: "Cebu City",
        coordinates: (10.3157, 123.8854),
        contact: "Maria Santos - 09123456789",
        verified: true,
        hearts: 15,
        age_minutes: 26 * 60,
    },
    DemoPost {
        kind: PostKind::Source,
        category: "Electricity",
        title: "Public Charging Station",
        description: "Public charging station with generators at Mandaue City Plaza. 2 outlets per person limit.",
        location: "Mandaue City",
        coordinates: (10.3236, 123.9415),
        contact: "Juan Dela Cruz - 09198765432",
        verified: true,
        hearts: 8,
        age_minutes: 3 * 60 + 45,
    },
    DemoPost {
        kind: PostKind::Help,
        category: "Rescue",
        title: "Family Needs Evacuation",
        description: "Family of 5 stranded on 2nd floor, need immediate rescue. Water is rising.",
        location: "Talisay City",
        coordinates: (10.2447, 123.8494),
        contact: "Ana Reyes - 09151112233",
        verified: false,
        hearts: 3,
        age_minutes: 25,
    },
    DemoPost {
        kind: PostKind::Source,
        category: "Food",
        title: "Community Kitchen - Hot Meals",
        description: "Free hot meals (lugaw) at Lapu-Lapu City elementary school gym. Available 11am-1pm and 5pm-7pm.",
        location: "Lapu-Lapu City",
        coordinates: (10.3160, 123.9787),
        contact: "LGU Relief Ops - 09271234567",
        verified: true,
        hearts: 22,
        age_minutes: 2 * 24 * 60,
    },
    DemoPost {
        kind: PostKind::Help,
        category: "Medicine",
        title: "Need Insulin for Senior",
        description: "My father is diabetic and we are running out of insulin. Needs help sourcing any available.",
        location: "Minglanilla",
        coordinates: (10.2483, 123.7865),
        contact: "Pedro Gomez - 09189998877",
        verified: false,
        hearts: 5,
        age_minutes: 75,
    },
];

/// Demo posts with timestamps relative to `now`
pub fn demo_posts(now: DateTime<Utc>) -> Vec<NewPost> {
    DEMO_POSTS
        .iter()
        .map(|demo| NewPost {
            kind: demo.kind,
            categories: vec![demo.category.to_string()],
            title: demo.title.to_string(),
            description: demo.description.to_string(),
            location: demo.location.to_string(),
            city: Some(demo.location.to_string()),
            coordinates: Coordinates::new(demo.coordinates.0, demo.coordinates.1),
            contact: demo.contact.to_string(),
            verified: demo.verified,
            hearts: demo.hearts,
            created_at: now - Duration::minutes(demo.age_minutes),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_posts_are_well_formed() {
        let now = Utc::now();
        let posts = demo_posts(now);

        assert_eq!(posts.len(), 5);
        assert!(posts.iter().all(|p| p.coordinates.is_some()));
        assert!(posts.iter().all(|p| p.created_at < now));
        assert_eq!(
            posts.iter().filter(|p| p.kind == PostKind::Help).count(),
            2
        );
    }
}
