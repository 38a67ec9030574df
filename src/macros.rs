/// Runs `$block` and evaluates to its value. With `stats` on, the elapsed time is logged
/// under `$name` at debug level.
macro_rules! timed {
    ($name:literal, $block:block) => {{
        #[cfg(feature = "stats")]
        {
            let start = std::time::Instant::now();
            let result = $block;
            bevy::log::debug!(elapsed = ?start.elapsed(), "{}", $name);
            result
        }

        #[cfg(not(feature = "stats"))]
        {
            $block
        }
    }};
}

pub(crate) use timed;
