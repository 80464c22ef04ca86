//! Recommendation derivation
//!
//! Stateless advice derived from an aggregate summary: the dominant
//! category and any increasing trend produce targeted suggestions.

use serde::Serialize;

use super::activity::Category;
use super::aggregate::{AggregateSummary, TrendDirection};

/// A single piece of advice for the user
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub category: Option<Category>,
    pub message: String,
    /// Higher means more impactful
    pub priority: u8,
}

/// Derive recommendations from a dashboard aggregate
pub fn recommend(summary: &AggregateSummary) -> Vec<Recommendation> {
    if summary.record_count == 0 {
        return vec![Recommendation {
            category: None,
            message: "Start logging your daily activities to see where your emissions come from."
                .to_string(),
            priority: 1,
        }];
    }

    let mut recommendations = Vec::new();

    let dominant = Category::ALL
        .into_iter()
        .max_by_key(|c| summary.breakdown.get(*c))
        .unwrap_or(Category::Transportation);

    if summary.breakdown.get(dominant) > 0 {
        recommendations.push(Recommendation {
            category: Some(dominant),
            message: dominant_advice(dominant).to_string(),
            priority: 3,
        });
    }

    for category in Category::ALL {
        if summary.trends.get(category) == TrendDirection::Increasing {
            recommendations.push(Recommendation {
                category: Some(category),
                message: format!(
                    "Your {} emissions rose compared to last week. {}",
                    category.as_str(),
                    trend_advice(category)
                ),
                priority: 2,
            });
        }
    }

    if summary.target.progress < 50 {
        recommendations.push(Recommendation {
            category: None,
            message: format!(
                "You are at {}% of the 2030 reduction target. Small daily changes add up.",
                summary.target.progress
            ),
            priority: 1,
        });
    }

    recommendations
}

fn dominant_advice(category: Category) -> &'static str {
    match category {
        Category::Transportation => {
            "Transportation is your largest source. Try swapping short car trips for bus, cycling, or walking."
        }
        Category::Energy => {
            "Energy is your largest source. Consider lower-carbon tariffs and cutting standby consumption."
        }
        Category::Dietary => {
            "Diet is your largest source. A few plant-based days per week make a measurable difference."
        }
    }
}

fn trend_advice(category: Category) -> &'static str {
    match category {
        Category::Transportation => "Plan an eco-friendly commute day this week.",
        Category::Energy => "Check for appliances left running and heating set too high.",
        Category::Dietary => "Try replacing one meat-heavy meal with a vegetarian option.",
    }
}
