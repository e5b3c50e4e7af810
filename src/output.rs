use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `ACCTSCOPE_QUIET=1` (or `true`) drops banners and section dividers
/// from human output. Results and errors are always printed.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("ACCTSCOPE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
