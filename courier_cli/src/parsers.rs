use jiff::SpanRelativeTo;

/// Accepts ISO 8601 or friendly durations ("30s", "2m", "PT1M30S") and bare seconds.
pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    let duration = if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        duration
    } else if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        duration
    } else if let Ok(seconds) = input.parse::<i64>() {
        jiff::SignedDuration::from_secs(seconds)
    } else {
        return Err(format!("invalid duration: {input}"));
    };

    if duration.is_negative() {
        return Err(format!("duration must not be negative: {input}"));
    }

    Ok(duration)
}
