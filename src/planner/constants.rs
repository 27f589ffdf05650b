use crate::models::Locale;

/// Upper bound on validate -> suggest -> apply passes in the repair loop.
pub const MAX_REPAIR_ITERATIONS: u32 = 3;

/// Candidate pool size, as a multiple of the requested quantity, from which
/// the least-used ingredients are drawn at random.
pub const SELECTION_POOL_FACTOR: usize = 3;

/// Default planning horizon in days.
pub const DEFAULT_NUM_DAYS: u32 = 7;

/// Default per-horizon repetition cap for a single ingredient.
pub const DEFAULT_MAX_REPETITIONS: u32 = 2;

/// Default wall-clock budget for an AI-assisted planning run, in seconds.
pub const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Localized calendar names
// ─────────────────────────────────────────────────────────────────────────────

/// Weekday names indexed Monday = 0.
const DAY_NAMES_EN: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const DAY_NAMES_ES: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

const MONTH_NAMES_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_NAMES_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Weekday name for a Monday-based index (0..7).
pub fn day_name(locale: Locale, monday_index: usize) -> &'static str {
    let names = match locale {
        Locale::En => &DAY_NAMES_EN,
        Locale::Es => &DAY_NAMES_ES,
    };
    names[monday_index % 7]
}

/// Month name for a 1-based month number.
pub fn month_name(locale: Locale, month: u32) -> &'static str {
    let names = match locale {
        Locale::En => &MONTH_NAMES_EN,
        Locale::Es => &MONTH_NAMES_ES,
    };
    names[(month.saturating_sub(1) % 12) as usize]
}
