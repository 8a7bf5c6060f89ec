//! Read-only inspection commands.

use scout_core::{Category, TrendRecord};

/// `feed`: prints stored rows, newest first. Never syncs.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_feed(
    pool: &sqlx::PgPool,
    limit: i64,
    category: Option<Category>,
) -> anyhow::Result<()> {
    let records = match category {
        Some(category) => scout_db::list_recent_trends_in_category(pool, category, limit).await?,
        None => scout_db::list_recent_trends(pool, limit).await?,
    };

    if records.is_empty() {
        println!("No trends stored.");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_record(record));
    }
    Ok(())
}

pub(crate) fn print_categories() {
    for category in Category::ALL {
        println!("{:<24} {}", category.slug(), category.label());
    }
}

pub(crate) fn format_record(record: &TrendRecord) -> String {
    let trend = &record.trend;
    let mut line = format!(
        "[{}] {} {} | {} | {} {}",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M"),
        trend.platform_icon,
        trend.topic_name,
        trend.short_description,
        trend.hashtags.join(" "),
    );
    if let Some(category) = trend.category {
        line.push_str(&format!(" ({category})"));
    }
    line
}
