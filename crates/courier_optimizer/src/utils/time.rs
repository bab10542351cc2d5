/// Runs `$block`, then logs how long it took at debug level under `$phase`.
#[macro_export]
macro_rules! timed_phase {
    ($phase:literal, $block:expr) => {{
        let started_at = jiff::Timestamp::now();
        let result = $block;
        let elapsed = jiff::Timestamp::now().duration_since(started_at);

        tracing::debug!(phase = $phase, ?elapsed, "phase finished");

        result
    }};
}
